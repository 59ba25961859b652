use std::error::Error;

use thiserror::Error;

/// Errors surfaced by the gateway operations.
///
/// Nothing is retried and nothing is swallowed. An absent item on a point
/// lookup is reported by the operation as `Ok(None)`, never through this
/// enum.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unrecognized deployment context: {0:?}.")]
    UnrecognizedDeploymentContext(String),

    #[error("Invalid DynamoDB endpoint override.")]
    InvalidEndpoint(#[source] http::uri::InvalidUri),

    #[error("Unsupported key value type: {0}. Key values must be strings.")]
    UnsupportedKeyType(&'static str),

    #[error("Failed to build the query key condition: {0}.")]
    ExpressionBuild(String),

    #[error("Failed to encode the item into its attribute map.")]
    Encode(#[source] serde_ddb::Error),

    #[error("Failed to decode the stored item.")]
    Decode(#[source] serde_ddb::Error),

    #[error("The remote DynamoDB call failed.")]
    RemoteOperation(#[source] Box<dyn Error + Send + Sync + 'static>),
}
