use aws_sdk_dynamodb::model::AttributeValue;
use aws_smithy_types::Blob;

/// Scalar value of a table key attribute.
///
/// DynamoDB key attributes are strings, numbers or binaries. The gateway
/// currently accepts only string keys; the other variants exist so call
/// sites state the value's type honestly, and are rejected with
/// [`GatewayError::UnsupportedKeyType`](crate::GatewayError::UnsupportedKeyType)
/// before any remote call is made.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyValue {
    String(String),
    /// Decimal representation, as DynamoDB transports numbers.
    Number(String),
    Binary(Vec<u8>),
}

impl KeyValue {
    /// Name of the variant's type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Binary(_) => "binary",
        }
    }

    /// The DynamoDB encoding of this key value.
    pub fn attribute_value(&self) -> AttributeValue {
        match self {
            Self::String(value) => AttributeValue::S(value.clone()),
            Self::Number(value) => AttributeValue::N(value.clone()),
            Self::Binary(value) => AttributeValue::B(Blob::new(value.clone())),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
