//! Nullable store: thread-safe in-memory governance tables for testing.

use eduverify_store::{GovernanceStore, GovernanceWrite, StoreError, WriteBatch};
use eduverify_types::Identity;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Clone, Default)]
struct Tables {
    members: Vec<Identity>,
    institutions: Vec<Identity>,
    proposals: BTreeMap<u64, Vec<u8>>,
    votes: HashMap<u64, Vec<Identity>>,
}

impl Tables {
    fn apply(&mut self, write: GovernanceWrite) {
        match write {
            GovernanceWrite::PutMember(id) => {
                if !self.members.contains(&id) {
                    self.members.push(id);
                }
            }
            GovernanceWrite::DeleteMember(id) => self.members.retain(|m| *m != id),
            GovernanceWrite::PutInstitution(id) => {
                if !self.institutions.contains(&id) {
                    self.institutions.push(id);
                }
            }
            GovernanceWrite::DeleteInstitution(id) => self.institutions.retain(|i| *i != id),
            GovernanceWrite::PutProposal { id, data } => {
                self.proposals.insert(id, data);
            }
            GovernanceWrite::PutVote { proposal_id, voter } => {
                let voters = self.votes.entry(proposal_id).or_default();
                if !voters.contains(&voter) {
                    voters.push(voter);
                }
            }
        }
    }
}

/// An in-memory governance store for testing.
///
/// Commits are atomic: the batch is applied to a copy of the tables which then
/// replaces the live tables. [`NullGovernanceStore::fail_writes`] makes every
/// subsequent commit fail without applying anything.
#[derive(Default)]
pub struct NullGovernanceStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    commits: AtomicU64,
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle commit failure injection.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }
}

impl GovernanceStore for NullGovernanceStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        let mut next = tables.clone();
        for write in batch.into_writes() {
            next.apply(write);
        }
        *tables = next;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list_members(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(self.tables.lock().unwrap().members.clone())
    }

    fn list_institutions(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(self.tables.lock().unwrap().institutions.clone())
    }

    fn list_proposals(&self) -> Result<Vec<(u64, Vec<u8>)>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .proposals
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn list_votes(&self, proposal_id: u64) -> Result<Vec<Identity>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .votes
            .get(&proposal_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> Identity {
        Identity::new([byte; 20])
    }

    #[test]
    fn commit_applies_every_write() {
        let store = NullGovernanceStore::new();
        let mut batch = WriteBatch::new();
        batch.put_member(id(1));
        batch.put_member(id(2));
        batch.put_institution(id(9));
        batch.put_proposal(0, vec![42]);
        batch.put_vote(0, id(1));
        store.commit(batch).unwrap();

        assert_eq!(store.list_members().unwrap(), vec![id(1), id(2)]);
        assert_eq!(store.list_institutions().unwrap(), vec![id(9)]);
        assert_eq!(store.list_proposals().unwrap(), vec![(0, vec![42])]);
        assert_eq!(store.list_votes(0).unwrap(), vec![id(1)]);
        assert!(store.list_votes(1).unwrap().is_empty());
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn failed_commit_applies_nothing() {
        let store = NullGovernanceStore::new();
        store.fail_writes(true);
        let mut batch = WriteBatch::new();
        batch.put_member(id(1));
        assert!(store.commit(batch).is_err());
        assert!(store.list_members().unwrap().is_empty());
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn delete_preserves_order_of_remaining_rows() {
        let store = NullGovernanceStore::new();
        let mut batch = WriteBatch::new();
        for b in 1..=3 {
            batch.put_member(id(b));
        }
        batch.delete_member(id(2));
        store.commit(batch).unwrap();
        assert_eq!(store.list_members().unwrap(), vec![id(1), id(3)]);
    }
}
