//! Per-block consensus callbacks.
//!
//! ```text
//! begin_block: signing flags -> counters, then evidence + absences -> fire
//! end_block:   committee delta for the consensus engine
//! ```

use crate::domain::entities::{Evidence, SigningInfo, ValidatorUpdate};
use crate::domain::errors::ValidatorSetResult;
use crate::domain::reports::{FireReport, SigningReport};
use crate::ports::inbound::ValidatorSetApi;
use shared_types::BlockContext;

/// Consensus engine input delivered at the start of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeginBlockInfo {
    /// Signed/absent flag of every committee member for the previous block.
    pub signing: Vec<SigningInfo>,
    /// Byzantine evidence verified by the consensus engine.
    pub evidence: Vec<Evidence>,
}

/// What `begin_block` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeginBlockOutcome {
    pub signing: SigningReport,
    pub fire: FireReport,
}

/// Host runtime entry points called once per block.
pub struct ConsensusHooks<'a, M> {
    manager: &'a mut M,
}

impl<'a, M: ValidatorSetApi> ConsensusHooks<'a, M> {
    pub fn new(manager: &'a mut M) -> Self {
        Self { manager }
    }

    pub fn begin_block(
        &mut self,
        ctx: &BlockContext,
        info: &BeginBlockInfo,
    ) -> ValidatorSetResult<BeginBlockOutcome> {
        let signing = self.manager.update_signing_validators(ctx, &info.signing)?;
        let fire = self
            .manager
            .fire_incompetent_validators(ctx, &info.evidence)?;
        Ok(BeginBlockOutcome { signing, fire })
    }

    pub fn end_block(&mut self, ctx: &BlockContext) -> ValidatorSetResult<Vec<ValidatorUpdate>> {
        self.manager.compute_committee_delta(ctx)
    }
}
