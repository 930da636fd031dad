//! Shared handler state.

use eduverify_governance::GovernanceEngine;
use eduverify_ledger::{ContentStore, CredentialLedger};
use std::sync::Arc;

/// Everything a handler may touch. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GovernanceEngine>,
    pub ledger: Arc<CredentialLedger>,
    pub documents: Arc<dyn ContentStore>,
}

impl AppState {
    /// Wire a ledger to `engine` so institution membership gates issuance.
    pub fn new(engine: Arc<GovernanceEngine>, documents: Arc<dyn ContentStore>) -> Self {
        let ledger = Arc::new(CredentialLedger::new(engine.clone()));
        Self {
            engine,
            ledger,
            documents,
        }
    }
}
