pub mod delete_item;
pub mod get_item;
pub mod put_item;
pub mod query;

use aws_sdk_dynamodb::Client as RawClient;

/// Handle over a configured DynamoDB client.
///
/// Adapters are call-local values: the gateway constructs one per operation,
/// issues a single remote call through it and drops it. Nothing is pooled or
/// cached across calls.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub(crate) raw: RawClient,
}

impl From<RawClient> for Adapter {
    fn from(raw: RawClient) -> Self {
        Adapter { raw }
    }
}
