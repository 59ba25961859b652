use std::env;
use std::str::FromStr;

use aws_sdk_dynamodb::{Endpoint, Region};

use crate::ddb::Adapter;
use crate::error::GatewayError;

/// The only deployment context this gateway recognizes.
pub const LAMBDA: &str = "lambda";

const LAMBDA_REGION: &str = "ap-southeast-2";
const ENDPOINT_VAR: &str = "DYNAMODB_ENDPOINT";

/// Resolves a deployment context to a freshly configured DynamoDB adapter.
///
/// Exactly one context is recognized, [`LAMBDA`], which binds the client to
/// the ap-southeast-2 region; any other value fails with
/// `UnrecognizedDeploymentContext` before any configuration is loaded. When
/// the `DYNAMODB_ENDPOINT` environment variable is set the client targets
/// that endpoint instead, which is how local DynamoDB is reached.
///
/// Every call re-resolves configuration and constructs a new client; nothing
/// is cached across calls.
pub async fn for_deployment(deployment: &str) -> Result<Adapter, GatewayError> {
    if deployment != LAMBDA {
        return Err(GatewayError::UnrecognizedDeploymentContext(
            deployment.to_owned(),
        ));
    }

    let shared_config = aws_config::from_env()
        .region(Region::new(LAMBDA_REGION))
        .load()
        .await;

    let dynamodb_config = if let Ok(endpoint) = env::var(ENDPOINT_VAR) {
        log::info!("Using DynamoDB with endpoint: {}.", endpoint);
        let uri = http::Uri::from_str(&endpoint).map_err(GatewayError::InvalidEndpoint)?;
        aws_sdk_dynamodb::config::Builder::from(&shared_config)
            .endpoint_resolver(Endpoint::immutable(uri))
            .build()
    } else {
        log::info!("Using DynamoDB in region: {}.", LAMBDA_REGION);
        aws_sdk_dynamodb::config::Config::new(&shared_config)
    };

    Ok(aws_sdk_dynamodb::Client::from_conf(dynamodb_config).into())
}
