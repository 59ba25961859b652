pub mod de;
pub mod error;
pub mod ser;

pub use de::{from_attribute_value, from_hashmap, from_items};
pub use error::Error;
pub use ser::{to_attribute_value, to_hashmap};
