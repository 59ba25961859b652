use std::collections::HashMap;

use aws_sdk_dynamodb::model::AttributeValue;
use common_macros::hash_map;

use crate::error::GatewayError;
use crate::key::KeyValue;

/// Equality key condition for a secondary-index query.
///
/// Materializes `key == value` into the `#k = :v` expression string plus the
/// attribute-name and attribute-value placeholder maps DynamoDB expects. The
/// name placeholder keeps reserved attribute names usable as keys.
#[derive(Debug)]
pub struct EqualityCondition {
    key_name: String,
    value: AttributeValue,
}

impl EqualityCondition {
    pub fn new(key_name: impl Into<String>, value: &KeyValue) -> Result<Self, GatewayError> {
        let key_name = key_name.into();
        if key_name.is_empty() {
            return Err(GatewayError::ExpressionBuild(
                "key attribute name is empty".to_owned(),
            ));
        }
        Ok(Self {
            key_name,
            value: value.attribute_value(),
        })
    }

    pub fn expression(&self) -> &'static str {
        "#k = :v"
    }

    pub fn attribute_names(&self) -> HashMap<String, String> {
        hash_map! {
            "#k".to_owned() => self.key_name.clone(),
        }
    }

    pub fn attribute_values(&self) -> HashMap<String, AttributeValue> {
        hash_map! {
            ":v".to_owned() => self.value.clone(),
        }
    }
}
