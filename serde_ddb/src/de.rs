//! Deserialize an `HashMap<String, AttributeValue>` into a Rust data structure.

use std::collections::HashMap;

use aws_sdk_dynamodb::model::AttributeValue;
use serde::de::{self, IntoDeserializer, Visitor};

use crate::error::{Error, Result};

macro_rules! impl_deserialize_n {
    ($type:ty, $method:ident, $visit:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            match self.value {
                AttributeValue::N(number) => {
                    visitor.$visit(number.parse::<$type>().map_err(|_| {
                        Error::new(format!("invalid number literal: {:?}", number))
                    })?)
                }
                other => Err(unexpected(&other, "a number")),
            }
        }
    };
}

/// Deserialize an instance of type `T` from an `HashMap<String, AttributeValue>`.
///
/// # Errors
///
/// This conversion can fail if the structure of the input does not match the
/// structure expected by `T`, for example if a required struct field is
/// missing from the attribute map or an attribute holds a different scalar
/// type than the field expects.
pub fn from_hashmap<T>(hm: HashMap<String, AttributeValue>) -> Result<T>
where
    T: de::DeserializeOwned,
{
    from_attribute_value(AttributeValue::M(hm))
}

/// Deserialize an instance of type `T` from a single `AttributeValue`.
pub fn from_attribute_value<T>(value: AttributeValue) -> Result<T>
where
    T: de::DeserializeOwned,
{
    T::deserialize(Deserializer { value })
}

/// Deserialize each attribute map of a query result page into a `T`.
pub fn from_items<T>(items: Vec<HashMap<String, AttributeValue>>) -> Result<Vec<T>>
where
    T: de::DeserializeOwned,
{
    items.into_iter().map(from_hashmap).collect()
}

fn unexpected(value: &AttributeValue, expected: &str) -> Error {
    Error::new(format!("expected {}, got {:?}", expected, value))
}

struct Deserializer {
    value: AttributeValue,
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::B(blob) => visitor.visit_byte_buf(blob.into_inner()),
            AttributeValue::Bool(value) => visitor.visit_bool(value),
            AttributeValue::N(number) => {
                if let Ok(int) = number.parse::<i64>() {
                    visitor.visit_i64(int)
                } else {
                    let float = number
                        .parse::<f64>()
                        .map_err(|_| Error::new(format!("invalid number literal: {:?}", number)))?;
                    visitor.visit_f64(float)
                }
            }
            AttributeValue::Null(_) => visitor.visit_unit(),
            AttributeValue::S(value) => visitor.visit_string(value),
            value @ (AttributeValue::L(_)
            | AttributeValue::Ss(_)
            | AttributeValue::Ns(_)
            | AttributeValue::Bs(_)) => Deserializer { value }.deserialize_seq(visitor),
            value @ AttributeValue::M(_) => Deserializer { value }.deserialize_map(visitor),
            other => Err(unexpected(&other, "a known attribute value")),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::Bool(value) => visitor.visit_bool(value),
            other => Err(unexpected(&other, "a boolean")),
        }
    }

    impl_deserialize_n!(i8, deserialize_i8, visit_i8);
    impl_deserialize_n!(i16, deserialize_i16, visit_i16);
    impl_deserialize_n!(i32, deserialize_i32, visit_i32);
    impl_deserialize_n!(i64, deserialize_i64, visit_i64);

    impl_deserialize_n!(u8, deserialize_u8, visit_u8);
    impl_deserialize_n!(u16, deserialize_u16, visit_u16);
    impl_deserialize_n!(u32, deserialize_u32, visit_u32);
    impl_deserialize_n!(u64, deserialize_u64, visit_u64);

    impl_deserialize_n!(f32, deserialize_f32, visit_f32);
    impl_deserialize_n!(f64, deserialize_f64, visit_f64);

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::S(value) => {
                let c = value
                    .parse::<char>()
                    .map_err(|_| Error::new(format!("invalid char literal: {:?}", value)))?;
                visitor.visit_char(c)
            }
            other => Err(unexpected(&other, "a single-character string")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::S(value) => visitor.visit_string(value),
            other => Err(unexpected(&other, "a string")),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::B(blob) => visitor.visit_byte_buf(blob.into_inner()),
            other => Err(unexpected(&other, "a binary value")),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::Null(_) => visitor.visit_none(),
            value => visitor.visit_some(Deserializer { value }),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::Null(_) => visitor.visit_unit(),
            other => Err(unexpected(&other, "a null")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let items = match self.value {
            AttributeValue::L(items) => items,
            AttributeValue::Ss(items) => items.into_iter().map(AttributeValue::S).collect(),
            AttributeValue::Ns(items) => items.into_iter().map(AttributeValue::N).collect(),
            AttributeValue::Bs(items) => items.into_iter().map(AttributeValue::B).collect(),
            other => return Err(unexpected(&other, "a sequence")),
        };
        visitor.visit_seq(SeqAccess {
            iter: items.into_iter(),
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::M(entries) => visitor.visit_map(MapAccess {
                iter: entries.into_iter(),
                value: None,
            }),
            other => Err(unexpected(&other, "a map")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::S(variant) => visitor.visit_enum(variant.into_deserializer()),
            AttributeValue::M(entries) => {
                let mut iter = entries.into_iter();
                let (variant, value) = iter
                    .next()
                    .ok_or_else(|| Error::new("expected a single-entry map for an enum"))?;
                if iter.next().is_some() {
                    return Err(Error::new("expected a single-entry map for an enum"));
                }
                visitor.visit_enum(EnumAccess { variant, value })
            }
            other => Err(unexpected(&other, "an enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            AttributeValue::S(value) => visitor.visit_string(value),
            other => Err(unexpected(&other, "an identifier")),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqAccess {
    iter: std::vec::IntoIter<AttributeValue>,
}

impl<'de> de::SeqAccess<'de> for SeqAccess {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some(value) => seed.deserialize(Deserializer { value }).map(Some),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAccess {
    iter: std::collections::hash_map::IntoIter<String, AttributeValue>,
    value: Option<AttributeValue>,
}

impl<'de> de::MapAccess<'de> for MapAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::new("next_value_seed called before next_key_seed"))?;
        seed.deserialize(Deserializer { value })
    }
}

struct EnumAccess {
    variant: String,
    value: AttributeValue,
}

impl<'de> de::EnumAccess<'de> for EnumAccess {
    type Error = Error;
    type Variant = VariantAccess;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantAccess)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        Ok((variant, VariantAccess { value: self.value }))
    }
}

struct VariantAccess {
    value: AttributeValue,
}

impl<'de> de::VariantAccess<'de> for VariantAccess {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            AttributeValue::Null(_) => Ok(()),
            other => Err(unexpected(&other, "a null for a unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(Deserializer { value: self.value })
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(Deserializer { value: self.value }, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_map(Deserializer { value: self.value }, visitor)
    }
}
