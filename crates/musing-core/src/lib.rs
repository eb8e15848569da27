//! # musing-core
//!
//! Core types, traits, and error handling for the Musing daily quote client.

pub mod clock;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, HttpError, Result};
pub use types::*;
