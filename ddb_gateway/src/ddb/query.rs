use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::QueryError;
use aws_sdk_dynamodb::model::{AttributeValue, Select};
use aws_sdk_dynamodb::output::QueryOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::Adapter;

/// Single-page query against a secondary index.
///
/// Pagination is deliberately unsupported: there is no exclusive start key
/// and the output's `last_evaluated_key` is never followed.
#[derive(Debug, TypedBuilder)]
pub struct QueryInput {
    #[builder(setter(into))]
    pub table_name: String,

    #[builder(setter(into))]
    pub index_name: String,

    #[builder(setter(into))]
    pub key_condition_expression: String,

    pub expression_attribute_names: HashMap<String, String>,

    pub expression_attribute_values: HashMap<String, AttributeValue>,

    #[builder(default, setter(strip_option))]
    pub select: Option<Select>,
}

#[async_trait]
pub trait Query {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>>;
}

#[async_trait]
impl Query for Adapter {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
        self.raw
            .query()
            .table_name(input.table_name)
            .index_name(input.index_name)
            .key_condition_expression(input.key_condition_expression)
            .set_expression_attribute_names(Some(input.expression_attribute_names))
            .set_expression_attribute_values(Some(input.expression_attribute_values))
            .set_select(input.select)
            .send()
            .await
    }
}
