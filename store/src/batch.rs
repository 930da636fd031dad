//! Write batching: groups the row changes of one engine operation so that a
//! backend can apply them in a single atomic commit.
//!
//! ```ignore
//! let mut batch = WriteBatch::new();
//! batch.put_proposal(id, bytes);
//! batch.put_institution(target);
//! store.commit(batch)?;
//! ```

use eduverify_types::Identity;

/// One row change in the governance tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernanceWrite {
    PutMember(Identity),
    DeleteMember(Identity),
    PutInstitution(Identity),
    DeleteInstitution(Identity),
    /// Upsert of a proposal row (encoded by the caller).
    PutProposal { id: u64, data: Vec<u8> },
    /// Insert into the `(proposal_id, voter)` vote set.
    PutVote { proposal_id: u64, voter: Identity },
}

/// Ordered list of writes applied all-or-nothing by [`crate::GovernanceStore::commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<GovernanceWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_member(&mut self, id: Identity) {
        self.writes.push(GovernanceWrite::PutMember(id));
    }

    pub fn delete_member(&mut self, id: Identity) {
        self.writes.push(GovernanceWrite::DeleteMember(id));
    }

    pub fn put_institution(&mut self, id: Identity) {
        self.writes.push(GovernanceWrite::PutInstitution(id));
    }

    pub fn delete_institution(&mut self, id: Identity) {
        self.writes.push(GovernanceWrite::DeleteInstitution(id));
    }

    pub fn put_proposal(&mut self, id: u64, data: Vec<u8>) {
        self.writes.push(GovernanceWrite::PutProposal { id, data });
    }

    pub fn put_vote(&mut self, proposal_id: u64, voter: Identity) {
        self.writes.push(GovernanceWrite::PutVote { proposal_id, voter });
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn writes(&self) -> &[GovernanceWrite] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<GovernanceWrite> {
        self.writes
    }
}
