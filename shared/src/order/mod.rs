//! Order lifecycle types
//!
//! - [`OrderStatus`]: the persisted status of an order
//! - [`OrderAction`]: the only ways a status can change
//! - [`Relation`] / [`Party`]: who may perform an action
//!
//! The transition table lives in [`machine`] and is the single place where
//! status changes are validated.

pub mod machine;
pub mod status;

pub use machine::{OrderAction, Party, Relation, TransitionError, transition};
pub use status::{OrderStatus, ParseStatusError};
