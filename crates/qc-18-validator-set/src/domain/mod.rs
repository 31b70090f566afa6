//! # Domain Layer
//!
//! Pure validator set logic. No I/O.
//!
//! - `entities`: persisted records and per-block value objects
//! - `params`: parameter set supplied per block height
//! - `committee`: admission, eviction, vacancy refill
//! - `legality`: withdrawal rules
//! - `delta`: per-block committee delta
//! - `reports`: punishment and hook outcomes
//! - `errors`: error types and result codes

pub mod committee;
pub mod delta;
pub mod entities;
pub mod errors;
pub mod legality;
pub mod params;
pub mod reports;

pub use committee::{Admission, PowerTable, Removal};
pub use entities::*;
pub use errors::{SerializationError, ValidatorSetError, ValidatorSetResult, WithdrawRefusal};
pub use params::ValidatorParams;
pub use reports::{FireReport, PunishReason, Punishment, RemovalPolicy, SigningReport};
