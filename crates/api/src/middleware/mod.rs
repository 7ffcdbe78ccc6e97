//! Request middleware.

pub mod caller;

pub use caller::{Caller, caller_middleware};
