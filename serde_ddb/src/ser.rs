//! Serialize a Rust data structure into an `HashMap<String, AttributeValue>`.

use std::collections::HashMap;

use aws_sdk_dynamodb::model::AttributeValue;
use aws_smithy_types::Blob;
use serde::ser::{self, Serialize};

use crate::error::{Error, Result};

macro_rules! impl_serialize_n {
    ($type:ty, $method:ident) => {
        fn $method(self, value: $type) -> Result<AttributeValue> {
            Ok(AttributeValue::N(value.to_string()))
        }
    };
}

/// Serialize an instance of type `T` into an `HashMap<String, AttributeValue>`.
///
/// # Errors
///
/// Fails if `T` does not serialize to a map at the top level (DynamoDB items
/// are attribute maps), or if any nested value cannot be represented as an
/// attribute value, e.g. a map keyed by something that is not a string or a
/// number.
pub fn to_hashmap<T>(value: &T) -> Result<HashMap<String, AttributeValue>>
where
    T: Serialize,
{
    match value.serialize(Serializer)? {
        AttributeValue::M(map) => Ok(map),
        _ => Err(Error::new("top-level value must serialize to a map")),
    }
}

/// Serialize an instance of type `T` into a single `AttributeValue`.
pub fn to_attribute_value<T>(value: &T) -> Result<AttributeValue>
where
    T: Serialize,
{
    value.serialize(Serializer)
}

struct Serializer;

impl ser::Serializer for Serializer {
    type Ok = AttributeValue;
    type Error = Error;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = TupleVariantSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = StructVariantSerializer;

    fn serialize_bool(self, value: bool) -> Result<AttributeValue> {
        Ok(AttributeValue::Bool(value))
    }

    impl_serialize_n!(i8, serialize_i8);
    impl_serialize_n!(i16, serialize_i16);
    impl_serialize_n!(i32, serialize_i32);
    impl_serialize_n!(i64, serialize_i64);

    impl_serialize_n!(u8, serialize_u8);
    impl_serialize_n!(u16, serialize_u16);
    impl_serialize_n!(u32, serialize_u32);
    impl_serialize_n!(u64, serialize_u64);

    impl_serialize_n!(f32, serialize_f32);
    impl_serialize_n!(f64, serialize_f64);

    fn serialize_char(self, value: char) -> Result<AttributeValue> {
        Ok(AttributeValue::S(value.to_string()))
    }

    fn serialize_str(self, value: &str) -> Result<AttributeValue> {
        Ok(AttributeValue::S(value.to_owned()))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<AttributeValue> {
        Ok(AttributeValue::B(Blob::new(value)))
    }

    fn serialize_none(self) -> Result<AttributeValue> {
        Ok(AttributeValue::Null(true))
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<AttributeValue>
    where
        T: Serialize,
    {
        value.serialize(Serializer)
    }

    fn serialize_unit(self) -> Result<AttributeValue> {
        Ok(AttributeValue::Null(true))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<AttributeValue> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<AttributeValue> {
        Ok(AttributeValue::S(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<AttributeValue>
    where
        T: Serialize,
    {
        value.serialize(Serializer)
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<AttributeValue>
    where
        T: Serialize,
    {
        let mut entries = HashMap::with_capacity(1);
        entries.insert(variant.to_owned(), value.serialize(Serializer)?);
        Ok(AttributeValue::M(entries))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer> {
        Ok(SeqSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantSerializer> {
        Ok(TupleVariantSerializer {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer> {
        Ok(MapSerializer {
            entries: HashMap::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapSerializer> {
        self.serialize_map(None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantSerializer> {
        Ok(StructVariantSerializer {
            variant,
            entries: HashMap::new(),
        })
    }
}

/// Attribute maps are keyed by strings. Number keys are accepted and stored
/// through their decimal representation; anything else is rejected.
fn map_key(key: AttributeValue) -> Result<String> {
    match key {
        AttributeValue::S(key) => Ok(key),
        AttributeValue::N(key) => Ok(key),
        _ => Err(Error::new("map keys must serialize to strings or numbers")),
    }
}

pub struct SeqSerializer {
    items: Vec<AttributeValue>,
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<AttributeValue> {
        Ok(AttributeValue::L(self.items))
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<AttributeValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<AttributeValue> {
        ser::SerializeSeq::end(self)
    }
}

pub struct TupleVariantSerializer {
    variant: &'static str,
    items: Vec<AttributeValue>,
}

impl ser::SerializeTupleVariant for TupleVariantSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<AttributeValue> {
        let mut entries = HashMap::with_capacity(1);
        entries.insert(self.variant.to_owned(), AttributeValue::L(self.items));
        Ok(AttributeValue::M(entries))
    }
}

pub struct MapSerializer {
    entries: HashMap<String, AttributeValue>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.next_key = Some(map_key(key.serialize(Serializer)?)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::new("serialize_value called before serialize_key"))?;
        self.entries.insert(key, value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<AttributeValue> {
        Ok(AttributeValue::M(self.entries))
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.entries.insert(key.to_owned(), value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<AttributeValue> {
        Ok(AttributeValue::M(self.entries))
    }
}

pub struct StructVariantSerializer {
    variant: &'static str,
    entries: HashMap<String, AttributeValue>,
}

impl ser::SerializeStructVariant for StructVariantSerializer {
    type Ok = AttributeValue;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.entries.insert(key.to_owned(), value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<AttributeValue> {
        let mut outer = HashMap::with_capacity(1);
        outer.insert(self.variant.to_owned(), AttributeValue::M(self.entries));
        Ok(AttributeValue::M(outer))
    }
}
