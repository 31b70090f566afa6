//! # Ports Layer
//!
//! - `inbound.rs` - Driving ports (API exposed to the handler and host)
//! - `outbound.rs` - Driven ports (dependencies required by the service)

pub mod inbound;
pub mod outbound;

pub use inbound::ValidatorSetApi;
pub use outbound::{BatchOperation, KeyValueStore, Ledger, ParamSource, RecordSerializer};
