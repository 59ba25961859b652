use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DeleteItemError;
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::output::DeleteItemOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::Adapter;

/// Unconditional delete of a single item by its full key. Deleting a key
/// that holds no item is not an error.
#[derive(Debug, TypedBuilder)]
pub struct DeleteItemInput {
    #[builder(setter(into))]
    pub table_name: String,

    pub key: HashMap<String, AttributeValue>,
}

#[async_trait]
pub trait DeleteItem {
    async fn delete_item(
        &self,
        input: DeleteItemInput,
    ) -> Result<DeleteItemOutput, SdkError<DeleteItemError>>;
}

#[async_trait]
impl DeleteItem for Adapter {
    async fn delete_item(
        &self,
        input: DeleteItemInput,
    ) -> Result<DeleteItemOutput, SdkError<DeleteItemError>> {
        self.raw
            .delete_item()
            .table_name(input.table_name)
            .set_key(Some(input.key))
            .send()
            .await
    }
}
