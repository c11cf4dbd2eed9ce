//! Wire models for the shop backend.
//!
//! This is the single deserialization boundary between the REST API and the
//! client. Field names follow the backend contract exactly: record IDs are
//! the upper-case `ID` emitted for embedded base models, everything else is
//! snake case, and money is integer minor units. No alternative spellings
//! are accepted.

use serde::{Deserialize, Deserializer};

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartLine;
pub use order::{Order, OrderItem, OrderPage};
pub use product::Product;
pub use user::{LoginResponse, User};

/// Deserialize `null` (an empty slice on the backend) as the default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
