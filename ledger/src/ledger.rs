//! In-memory credential ledger.

use crate::credential::{CredentialDraft, CredentialRecord, Verification};
use crate::error::LedgerError;
use eduverify_governance::GovernanceEngine;
use eduverify_types::{ContentId, Identity, Timestamp};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Answers whether an identity may write credentials.
pub trait IssuerRegistry: Send + Sync {
    fn is_authorized_issuer(&self, id: &Identity) -> bool;
}

impl IssuerRegistry for GovernanceEngine {
    fn is_authorized_issuer(&self, id: &Identity) -> bool {
        self.is_institution(id)
    }
}

#[derive(Default)]
struct LedgerTables {
    /// Records in issue order.
    records: Vec<CredentialRecord>,
    by_cid: HashMap<ContentId, usize>,
    by_credential_id: HashMap<String, usize>,
    by_student: HashMap<Identity, Vec<usize>>,
    by_issuer: HashMap<Identity, Vec<usize>>,
}

/// Credential ledger. Authorization is checked against the live institution
/// set on every write; revoking an institution does not erase what it issued.
pub struct CredentialLedger {
    registry: Arc<dyn IssuerRegistry>,
    tables: RwLock<LedgerTables>,
}

impl CredentialLedger {
    pub fn new(registry: Arc<dyn IssuerRegistry>) -> Self {
        Self {
            registry,
            tables: RwLock::new(LedgerTables::default()),
        }
    }

    /// Record a credential issued by `issuer` at `now`.
    pub fn issue(
        &self,
        issuer: &Identity,
        draft: CredentialDraft,
        now: Timestamp,
    ) -> Result<CredentialRecord, LedgerError> {
        if !self.registry.is_authorized_issuer(issuer) {
            debug!(issuer = %issuer, "credential rejected: issuer not authorized");
            return Err(LedgerError::Unauthorized(*issuer));
        }
        draft.validate()?;

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if tables.by_credential_id.contains_key(&draft.credential_id) {
            return Err(LedgerError::DuplicateCredential(draft.credential_id));
        }
        if tables.by_cid.contains_key(&draft.cid) {
            return Err(LedgerError::DuplicateContent(draft.cid));
        }

        let record = draft.into_record(*issuer, now);
        let pos = tables.records.len();
        tables.by_cid.insert(record.cid.clone(), pos);
        tables
            .by_credential_id
            .insert(record.credential_id.clone(), pos);
        tables.by_student.entry(record.student).or_default().push(pos);
        tables.by_issuer.entry(record.issuer).or_default().push(pos);
        tables.records.push(record.clone());

        info!(
            credential_id = %record.credential_id,
            issuer = %record.issuer,
            student = %record.student,
            cid = %record.cid,
            "credential issued"
        );
        Ok(record)
    }

    pub fn get_by_content_id(&self, cid: &ContentId) -> Result<CredentialRecord, LedgerError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .by_cid
            .get(cid)
            .map(|&pos| tables.records[pos].clone())
            .ok_or_else(|| LedgerError::NotFound(cid.to_string()))
    }

    pub fn get_by_credential_id(&self, credential_id: &str) -> Result<CredentialRecord, LedgerError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .by_credential_id
            .get(credential_id)
            .map(|&pos| tables.records[pos].clone())
            .ok_or_else(|| LedgerError::NotFound(credential_id.to_string()))
    }

    /// Credentials held by `student`, oldest first.
    pub fn list_by_student(&self, student: &Identity) -> Vec<CredentialRecord> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        collect(&tables, tables.by_student.get(student))
    }

    /// Credentials issued by `institution`, oldest first.
    pub fn list_by_institution(&self, institution: &Identity) -> Vec<CredentialRecord> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        collect(&tables, tables.by_issuer.get(institution))
    }

    /// Check that `cid` is a recorded credential belonging to `student`.
    /// An unknown document is an invalid verification, not an error.
    pub fn verify(&self, cid: &ContentId, student: &Identity) -> Verification {
        match self.get_by_content_id(cid) {
            Ok(record) if record.student == *student => Verification::valid(record),
            _ => Verification::invalid(),
        }
    }

    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect(tables: &LedgerTables, positions: Option<&Vec<usize>>) -> Vec<CredentialRecord> {
    positions
        .map(|ps| ps.iter().map(|&p| tables.records[p].clone()).collect())
        .unwrap_or_default()
}
