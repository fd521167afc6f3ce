//! Core value types shared by the rest of the crate.
//!
//! - [`status`]: The four-valued [`Status`] of an asynchronous result

pub mod status;

pub use status::Status;
