//! Governance storage trait.
//!
//! Logical layout: `members(id)`, `institutions(id)`, `proposals(id, data)` and
//! `votes(proposal_id, voter)`. Proposal rows are opaque bytes; the engine owns
//! their encoding.

use crate::{StoreError, WriteBatch};
use eduverify_types::Identity;

/// Trait for persisting governor, institution and proposal state.
pub trait GovernanceStore: Send + Sync {
    /// Apply every write in `batch` atomically. On error nothing is applied.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// All governors, in insertion order.
    fn list_members(&self) -> Result<Vec<Identity>, StoreError>;

    /// All authorized institutions, in insertion order.
    fn list_institutions(&self) -> Result<Vec<Identity>, StoreError>;

    /// All proposal rows, ordered by id.
    fn list_proposals(&self) -> Result<Vec<(u64, Vec<u8>)>, StoreError>;

    /// Voters on a proposal, in the order their votes were committed.
    fn list_votes(&self, proposal_id: u64) -> Result<Vec<Identity>, StoreError>;
}
