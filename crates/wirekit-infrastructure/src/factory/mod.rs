//! Component factory
//!
//! [`DefaultFactory`] drives the whole lifecycle; [`RegistrationDelegate`]
//! fans creation hooks out to the post processors in order.

pub mod default;
pub mod delegate;
pub mod order;

pub use default::DefaultFactory;
pub use delegate::RegistrationDelegate;
pub use order::{order_key, sort_by_order};
