pub mod client;
pub mod ddb;
pub mod error;
pub mod expression;
pub mod gateway;
pub mod key;
pub mod telemetry;

pub use error::GatewayError;
pub use gateway::{delete, fetch_by_key, fetch_by_secondary_index, upsert};
pub use key::KeyValue;
