//! # Integration Tests
//!
//! Validator set flows driven through the handler and block hooks.

pub mod committee_properties;
pub mod validator_lifecycle;
#[cfg(feature = "rocksdb")]
pub mod persistence;
