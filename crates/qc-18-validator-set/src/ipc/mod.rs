//! # IPC Layer
//!
//! Boundary between the host runtime and the manager.
//!
//! - `handler`: user transactions (`ValidatorMsg`) -> `TxResult`
//! - `hooks`: begin/end block callbacks from the consensus integration

pub mod handler;
pub mod hooks;

pub use handler::{ValidatorHandler, ValidatorMsg};
pub use hooks::{BeginBlockInfo, BeginBlockOutcome, ConsensusHooks};
