//! # musing-service
//!
//! Quote acquisition for Musing: tries providers in a fixed order, falls back
//! to the built-in list, keeps the daily cache and the prefetch slot filled.

mod prefetch;
mod quote_service;

pub use prefetch::PrefetchHandle;
pub use quote_service::{QuoteService, QuoteServiceBuilder};
