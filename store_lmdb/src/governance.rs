//! LMDB implementation of GovernanceStore.
//!
//! LMDB orders keys bytewise, so the member, institution and vote tables keep
//! a per-row sequence number to return rows in insertion order. The next free
//! sequence lives in the meta table and advances inside the same transaction
//! as the rows it numbers.

use crate::{LmdbEnvironment, LmdbError};
use eduverify_store::{GovernanceStore, GovernanceWrite, StoreError, WriteBatch};
use eduverify_types::Identity;
use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};
use std::sync::Arc;
use tracing::trace;

const NEXT_SEQ_KEY: &[u8] = b"next_seq";

pub struct LmdbGovernanceStore {
    env: Arc<LmdbEnvironment>,
}

impl LmdbGovernanceStore {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self { env }
    }

    fn apply(
        &self,
        txn: &mut RwTxn<'_>,
        write: GovernanceWrite,
        seq: &mut u64,
    ) -> Result<(), LmdbError> {
        let env = &self.env;
        match write {
            GovernanceWrite::PutMember(id) => put_ordered(env.members_db, txn, id.as_bytes(), seq),
            GovernanceWrite::DeleteMember(id) => {
                env.members_db.delete(txn, id.as_bytes())?;
                Ok(())
            }
            GovernanceWrite::PutInstitution(id) => {
                put_ordered(env.institutions_db, txn, id.as_bytes(), seq)
            }
            GovernanceWrite::DeleteInstitution(id) => {
                env.institutions_db.delete(txn, id.as_bytes())?;
                Ok(())
            }
            GovernanceWrite::PutProposal { id, data } => {
                env.proposals_db.put(txn, &id.to_be_bytes(), &data)?;
                Ok(())
            }
            GovernanceWrite::PutVote { proposal_id, voter } => {
                put_ordered(env.votes_db, txn, &vote_key(proposal_id, &voter), seq)
            }
        }
    }

    fn list_ordered(
        &self,
        db: Database<Bytes, Bytes>,
        table: &'static str,
    ) -> Result<Vec<Identity>, LmdbError> {
        let rtxn = self.env.env().read_txn()?;
        let mut rows = Vec::new();
        for entry in db.iter(&rtxn)? {
            let (key, val) = entry?;
            rows.push((decode_u64(table, val)?, decode_identity(table, key)?));
        }
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, id)| id).collect())
    }
}

impl GovernanceStore for LmdbGovernanceStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let writes = batch.len();
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        let mut seq = read_next_seq(self.env.meta_db, &wtxn)?;
        for write in batch.into_writes() {
            self.apply(&mut wtxn, write, &mut seq)?;
        }
        self.env
            .meta_db
            .put(&mut wtxn, NEXT_SEQ_KEY, &seq.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        trace!(writes, "governance batch committed");
        Ok(())
    }

    fn list_members(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(self.list_ordered(self.env.members_db, "members")?)
    }

    fn list_institutions(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(self.list_ordered(self.env.institutions_db, "institutions")?)
    }

    fn list_proposals(&self) -> Result<Vec<(u64, Vec<u8>)>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let mut proposals = Vec::new();
        let iter = self.env.proposals_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            let id = decode_u64("proposals", key)?;
            proposals.push((id, val.to_vec()));
        }
        Ok(proposals)
    }

    fn list_votes(&self, proposal_id: u64) -> Result<Vec<Identity>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let prefix = proposal_id.to_be_bytes();
        let mut rows = Vec::new();
        let iter = self
            .env
            .votes_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            let voter = decode_identity("votes", &key[prefix.len()..])?;
            rows.push((decode_u64("votes", val)?, voter));
        }
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, voter)| voter).collect())
    }
}

/// Insert `key` stamped with the next sequence number. An existing row keeps
/// its original position.
fn put_ordered(
    db: Database<Bytes, Bytes>,
    txn: &mut RwTxn<'_>,
    key: &[u8],
    seq: &mut u64,
) -> Result<(), LmdbError> {
    if db.get(txn, key)?.is_none() {
        db.put(txn, key, &seq.to_be_bytes())?;
        *seq += 1;
    }
    Ok(())
}

fn read_next_seq(meta: Database<Bytes, Bytes>, txn: &RoTxn<'_>) -> Result<u64, LmdbError> {
    match meta.get(txn, NEXT_SEQ_KEY)? {
        Some(bytes) => decode_u64("meta", bytes),
        None => Ok(0),
    }
}

fn vote_key(proposal_id: u64, voter: &Identity) -> [u8; 8 + Identity::LEN] {
    let mut key = [0u8; 8 + Identity::LEN];
    key[..8].copy_from_slice(&proposal_id.to_be_bytes());
    key[8..].copy_from_slice(voter.as_bytes());
    key
}

fn decode_u64(table: &'static str, bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| LmdbError::Corrupted {
        table,
        reason: format!("expected 8 bytes, found {}", bytes.len()),
    })?;
    Ok(u64::from_be_bytes(arr))
}

fn decode_identity(table: &'static str, bytes: &[u8]) -> Result<Identity, LmdbError> {
    let arr: [u8; Identity::LEN] = bytes.try_into().map_err(|_| LmdbError::Corrupted {
        table,
        reason: format!("expected {}-byte identity, found {}", Identity::LEN, bytes.len()),
    })?;
    Ok(Identity::new(arr))
}
