//! Core governance engine: propose, vote and execute against the governor
//! and institution sets.
//!
//! All mutations run under one write lock covering the governor set, the
//! institution set and the proposal store, so concurrent votes never lose
//! updates and readers never see a half-applied execution. When a
//! [`GovernanceStore`] is attached, each accepted mutation is committed as a
//! single batch before the lock is released; a failed commit rolls the
//! in-memory change back.

use crate::error::GovernanceError;
use crate::members::{InstitutionSet, MemberSet};
use crate::proposal::{Proposal, ProposalAction, ProposalRecord, ProposalStore, ProposalView};
use eduverify_store::{GovernanceStore, WriteBatch};
use eduverify_types::Identity;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct GovernanceState {
    members: MemberSet,
    institutions: InstitutionSet,
    proposals: ProposalStore,
}

/// What an execution changed, kept so it can be undone if the commit fails.
#[derive(Clone, Copy, Debug)]
enum Effect {
    Unchanged,
    InstitutionAdded(Identity),
    InstitutionRemoved { id: Identity, pos: usize },
    GovernorAdded(Identity),
    GovernorRemoved { id: Identity, pos: usize },
}

impl Effect {
    fn stage(&self, batch: &mut WriteBatch) {
        match *self {
            Effect::Unchanged => {}
            Effect::InstitutionAdded(id) => batch.put_institution(id),
            Effect::InstitutionRemoved { id, .. } => batch.delete_institution(id),
            Effect::GovernorAdded(id) => batch.put_member(id),
            Effect::GovernorRemoved { id, .. } => batch.delete_member(id),
        }
    }

    fn undo(&self, members: &mut MemberSet, institutions: &mut InstitutionSet) {
        match *self {
            Effect::Unchanged => {}
            Effect::InstitutionAdded(id) => {
                let _ = institutions.remove(&id);
            }
            Effect::InstitutionRemoved { id, pos } => institutions.restore_at(pos, id),
            Effect::GovernorAdded(id) => {
                let _ = members.remove(&id);
            }
            Effect::GovernorRemoved { id, pos } => members.restore_at(pos, id),
        }
    }
}

/// Standing of an identity, answered in one query instead of probing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub governor: bool,
    pub institution: bool,
}

impl Roles {
    /// Neither governor nor institution: a student or visitor.
    pub fn is_unprivileged(&self) -> bool {
        !self.governor && !self.institution
    }
}

/// One governance domain. Independent engines share nothing.
pub struct GovernanceEngine {
    state: RwLock<GovernanceState>,
    store: Option<Arc<dyn GovernanceStore>>,
}

impl GovernanceEngine {
    /// Create an in-memory engine from its genesis governors and institutions.
    pub fn new(
        genesis_governors: impl IntoIterator<Item = Identity>,
        genesis_institutions: impl IntoIterator<Item = Identity>,
    ) -> Result<Self, GovernanceError> {
        let state = genesis_state(genesis_governors, genesis_institutions)?;
        info!(
            governors = state.members.count(),
            institutions = state.institutions.count(),
            "governance initialised from genesis"
        );
        Ok(Self {
            state: RwLock::new(state),
            store: None,
        })
    }

    /// Create an engine backed by `store`.
    ///
    /// An empty store is seeded from genesis; otherwise the persisted state is
    /// recovered and the genesis arguments are ignored.
    pub fn with_store(
        store: Arc<dyn GovernanceStore>,
        genesis_governors: impl IntoIterator<Item = Identity>,
        genesis_institutions: impl IntoIterator<Item = Identity>,
    ) -> Result<Self, GovernanceError> {
        let persisted_members = store.list_members()?;
        let state = if persisted_members.is_empty() {
            let state = genesis_state(genesis_governors, genesis_institutions)?;
            let mut batch = WriteBatch::new();
            state.members.iter().for_each(|m| batch.put_member(*m));
            state.institutions.iter().for_each(|i| batch.put_institution(*i));
            store.commit(batch)?;
            info!(
                governors = state.members.count(),
                institutions = state.institutions.count(),
                "governance store seeded from genesis"
            );
            state
        } else {
            let state = recover_state(store.as_ref(), persisted_members)?;
            info!(
                governors = state.members.count(),
                institutions = state.institutions.count(),
                proposals = state.proposals.len(),
                "governance state recovered from store"
            );
            state
        };
        Ok(Self {
            state: RwLock::new(state),
            store: Some(store),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, GovernanceState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GovernanceState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), GovernanceError> {
        match &self.store {
            Some(store) => store.commit(batch).map_err(GovernanceError::from),
            None => Ok(()),
        }
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Submit a proposal. Only governors may propose. The proposal's quorum
    /// is fixed from the governor count at this moment.
    pub fn propose(
        &self,
        caller: &Identity,
        action: ProposalAction,
        target: Identity,
    ) -> Result<u64, GovernanceError> {
        let mut guard = self.write();
        let state = &mut *guard;

        if !state.members.contains(caller) {
            debug!(actor = %caller, "propose rejected: not a governor");
            return Err(GovernanceError::Unauthorized(*caller));
        }
        let snapshot = state.members.count();
        let proposal = state.proposals.create(action, target, *caller, snapshot)?;
        let id = proposal.id();

        let mut batch = WriteBatch::new();
        let staged = proposal.to_record().encode().map(|bytes| {
            batch.put_proposal(id, bytes);
        });
        if let Err(e) = staged.and_then(|()| self.commit(batch)) {
            state.proposals.discard_last();
            warn!(proposal_id = id, error = %e, "proposal not persisted, discarded");
            return Err(e);
        }

        info!(
            proposal_id = id,
            actor = %caller,
            action = %action,
            target = %target,
            snapshot,
            "proposal created"
        );
        Ok(id)
    }

    /// Cast a yes vote. Eligibility is the caller's standing now, not at
    /// proposal time. A repeated vote is an error, never a silent no-op.
    pub fn vote(&self, caller: &Identity, proposal_id: u64) -> Result<(), GovernanceError> {
        let mut guard = self.write();
        let state = &mut *guard;

        if !state.members.contains(caller) {
            debug!(actor = %caller, proposal_id, "vote rejected: not a governor");
            return Err(GovernanceError::Unauthorized(*caller));
        }
        let proposal = state.proposals.get_mut(proposal_id)?;
        if proposal.is_executed() {
            return Err(GovernanceError::AlreadyExecuted(proposal_id));
        }
        if proposal.has_voted(caller) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id,
                voter: *caller,
            });
        }
        proposal.record_vote(*caller)?;

        let mut batch = WriteBatch::new();
        let staged = proposal.to_record().encode().map(|bytes| {
            batch.put_proposal(proposal_id, bytes);
            batch.put_vote(proposal_id, *caller);
        });
        if let Err(e) = staged.and_then(|()| self.commit(batch)) {
            proposal.retract_vote(caller);
            warn!(proposal_id, actor = %caller, error = %e, "vote not persisted, retracted");
            return Err(e);
        }

        info!(
            proposal_id,
            actor = %caller,
            yes_votes = proposal.yes_votes(),
            threshold = proposal.threshold(),
            "vote recorded"
        );
        Ok(())
    }

    /// Apply an approved proposal. Anyone may trigger this once the threshold
    /// is met. Either the whole change lands (set mutation, executed flag,
    /// persisted rows) or none of it does.
    pub fn execute(&self, caller: &Identity, proposal_id: u64) -> Result<(), GovernanceError> {
        let mut guard = self.write();
        let GovernanceState {
            members,
            institutions,
            proposals,
        } = &mut *guard;

        let proposal = proposals.get_mut(proposal_id)?;
        if proposal.is_executed() {
            return Err(GovernanceError::AlreadyExecuted(proposal_id));
        }
        let (have, need) = (proposal.yes_votes(), proposal.threshold());
        if have < need {
            return Err(GovernanceError::ThresholdNotMet {
                proposal_id,
                have,
                need,
            });
        }

        // Flag first so a duplicate call fails fast; cleared again on any failure.
        proposal.set_executed(true);
        let action = proposal.action();
        let target = proposal.target();

        let effect = match apply_action(action, target, members, institutions) {
            Ok(effect) => effect,
            Err(cause) => {
                proposal.set_executed(false);
                warn!(
                    proposal_id,
                    action = %action,
                    target = %target,
                    error = %cause,
                    "execution failed, proposal left open"
                );
                return Err(GovernanceError::ExecutionFailed {
                    proposal_id,
                    source: Box::new(cause),
                });
            }
        };

        let mut batch = WriteBatch::new();
        let staged = proposal.to_record().encode().map(|bytes| {
            batch.put_proposal(proposal_id, bytes);
            effect.stage(&mut batch);
        });
        if let Err(e) = staged.and_then(|()| self.commit(batch)) {
            effect.undo(members, institutions);
            proposal.set_executed(false);
            warn!(proposal_id, error = %e, "execution not persisted, rolled back");
            return Err(e);
        }

        info!(
            proposal_id,
            actor = %caller,
            action = %action,
            target = %target,
            "proposal executed"
        );
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_proposal(&self, proposal_id: u64) -> Result<ProposalView, GovernanceError> {
        self.read().proposals.get(proposal_id).map(Proposal::view)
    }

    /// Every proposal in id order, executed ones included.
    pub fn list_proposals(&self) -> Vec<ProposalView> {
        self.read().proposals.list().iter().map(Proposal::view).collect()
    }

    pub fn proposal_count(&self) -> u64 {
        self.read().proposals.len() as u64
    }

    pub fn has_voted(&self, proposal_id: u64, voter: &Identity) -> Result<bool, GovernanceError> {
        Ok(self.read().proposals.get(proposal_id)?.has_voted(voter))
    }

    pub fn threshold_for(&self, proposal_id: u64) -> Result<u32, GovernanceError> {
        Ok(self.read().proposals.get(proposal_id)?.threshold())
    }

    pub fn is_ready(&self, proposal_id: u64) -> Result<bool, GovernanceError> {
        Ok(self.read().proposals.get(proposal_id)?.is_ready())
    }

    pub fn list_governors(&self) -> Vec<Identity> {
        self.read().members.to_ordered_list()
    }

    pub fn list_institutions(&self) -> Vec<Identity> {
        self.read().institutions.to_ordered_list()
    }

    /// Governor at `index` in insertion order.
    pub fn governor_at(&self, index: usize) -> Option<Identity> {
        self.read().members.get(index)
    }

    pub fn governor_count(&self) -> u32 {
        self.read().members.count()
    }

    pub fn institution_count(&self) -> u32 {
        self.read().institutions.count()
    }

    pub fn is_governor(&self, id: &Identity) -> bool {
        self.read().members.contains(id)
    }

    pub fn is_institution(&self, id: &Identity) -> bool {
        self.read().institutions.contains(id)
    }

    pub fn role_of(&self, id: &Identity) -> Roles {
        let state = self.read();
        Roles {
            governor: state.members.contains(id),
            institution: state.institutions.contains(id),
        }
    }
}

fn apply_action(
    action: ProposalAction,
    target: Identity,
    members: &mut MemberSet,
    institutions: &mut InstitutionSet,
) -> Result<Effect, GovernanceError> {
    match action {
        ProposalAction::AddInstitution => match institutions.add(target) {
            Ok(()) => Ok(Effect::InstitutionAdded(target)),
            // Authorized through another path in the meantime.
            Err(GovernanceError::AlreadyMember(_)) => Ok(Effect::Unchanged),
            Err(e) => Err(e),
        },
        ProposalAction::RevokeInstitution => institutions
            .remove(&target)
            .map(|pos| Effect::InstitutionRemoved { id: target, pos }),
        ProposalAction::AddGovernor => members
            .add(target)
            .map(|()| Effect::GovernorAdded(target)),
        ProposalAction::RevokeGovernor => members
            .remove(&target)
            .map(|pos| Effect::GovernorRemoved { id: target, pos }),
    }
}

fn genesis_state(
    governors: impl IntoIterator<Item = Identity>,
    institutions: impl IntoIterator<Item = Identity>,
) -> Result<GovernanceState, GovernanceError> {
    let members: MemberSet = governors.into_iter().collect();
    if members.is_empty() {
        return Err(GovernanceError::EmptyGovernorSet);
    }
    Ok(GovernanceState {
        members,
        institutions: institutions.into_iter().collect(),
        proposals: ProposalStore::new(),
    })
}

fn recover_state(
    store: &dyn GovernanceStore,
    members: Vec<Identity>,
) -> Result<GovernanceState, GovernanceError> {
    let institutions: InstitutionSet = store.list_institutions()?.into_iter().collect();
    let mut recovered = Vec::new();
    for (id, bytes) in store.list_proposals()? {
        let record = ProposalRecord::decode(&bytes)?;
        if record.id != id {
            return Err(GovernanceError::Corrupted(format!(
                "proposal row {id} holds record for {}",
                record.id
            )));
        }
        let voters = store.list_votes(id)?;
        recovered.push(Proposal::from_record(record, voters)?);
    }
    Ok(GovernanceState {
        members: members.into_iter().collect(),
        institutions,
        proposals: ProposalStore::restore(recovered)?,
    })
}
