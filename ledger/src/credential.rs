//! Credential records.

use crate::error::LedgerError;
use eduverify_types::{ContentId, Identity, Timestamp};
use serde::{Deserialize, Serialize};

/// What an institution submits when issuing a credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDraft {
    /// Issuer-chosen identifier, unique across the ledger.
    pub credential_id: String,
    pub student: Identity,
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    /// Document previously uploaded to the content store.
    pub cid: ContentId,
}

impl CredentialDraft {
    pub(crate) fn validate(&self) -> Result<(), LedgerError> {
        let required = [
            ("credential_id", &self.credential_id),
            ("student_name", &self.student_name),
            ("institution_name", &self.institution_name),
            ("degree", &self.degree),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(LedgerError::InvalidArgument(format!("{field} must not be empty")));
        }
        if self.student.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "student must not be the zero identity".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn into_record(self, issuer: Identity, issued_at: Timestamp) -> CredentialRecord {
        CredentialRecord {
            credential_id: self.credential_id,
            student: self.student,
            student_name: self.student_name,
            institution_name: self.institution_name,
            degree: self.degree,
            issued_at,
            cid: self.cid,
            issuer,
        }
    }
}

/// An issued credential. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub credential_id: String,
    pub student: Identity,
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    pub issued_at: Timestamp,
    pub cid: ContentId,
    /// Institution identity that issued the record.
    pub issuer: Identity,
}

/// Outcome of checking a document against a claimed student.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<CredentialRecord>,
}

impl Verification {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            record: None,
        }
    }

    pub fn valid(record: CredentialRecord) -> Self {
        Self {
            valid: true,
            record: Some(record),
        }
    }
}
