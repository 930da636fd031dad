//! Governance proposals and the store that sequences them.

use crate::error::GovernanceError;
use crate::members::IdentitySet;
use eduverify_types::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The change a proposal requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalAction {
    AddInstitution,
    RevokeInstitution,
    AddGovernor,
    RevokeGovernor,
}

impl ProposalAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddInstitution => "add_institution",
            Self::RevokeInstitution => "revoke_institution",
            Self::AddGovernor => "add_governor",
            Self::RevokeGovernor => "revoke_governor",
        }
    }
}

impl fmt::Display for ProposalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Minimum yes votes for a proposal created when the governor set had
/// `snapshot` members: a strict majority of the snapshot.
pub fn quorum_threshold(snapshot: u32) -> u32 {
    snapshot / 2 + 1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Open, below threshold.
    Pending,
    /// Open, threshold met, awaiting execution.
    Ready,
    /// Terminal.
    Executed,
}

/// A governance proposal.
///
/// `id`, `action`, `target`, `proposer` and the member-count snapshot are fixed
/// at creation. The tally is the voter set itself, so `yes_votes()` always
/// equals the number of distinct voters.
#[derive(Clone, Debug)]
pub struct Proposal {
    id: u64,
    action: ProposalAction,
    target: Identity,
    proposer: Identity,
    snapshot_member_count: u32,
    executed: bool,
    voters: IdentitySet,
}

impl Proposal {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn action(&self) -> ProposalAction {
        self.action
    }

    pub fn target(&self) -> Identity {
        self.target
    }

    pub fn proposer(&self) -> Identity {
        self.proposer
    }

    pub fn snapshot_member_count(&self) -> u32 {
        self.snapshot_member_count
    }

    pub fn yes_votes(&self) -> u32 {
        self.voters.count()
    }

    pub fn threshold(&self) -> u32 {
        quorum_threshold(self.snapshot_member_count)
    }

    pub fn is_ready(&self) -> bool {
        self.yes_votes() >= self.threshold()
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn has_voted(&self, voter: &Identity) -> bool {
        self.voters.contains(voter)
    }

    pub fn voters(&self) -> Vec<Identity> {
        self.voters.to_ordered_list()
    }

    pub fn status(&self) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.is_ready() {
            ProposalStatus::Ready
        } else {
            ProposalStatus::Pending
        }
    }

    pub(crate) fn record_vote(&mut self, voter: Identity) -> Result<(), GovernanceError> {
        self.voters
            .add(voter)
            .map_err(|_| GovernanceError::AlreadyVoted {
                proposal_id: self.id,
                voter,
            })
    }

    pub(crate) fn retract_vote(&mut self, voter: &Identity) {
        let _ = self.voters.remove(voter);
    }

    pub(crate) fn set_executed(&mut self, executed: bool) {
        self.executed = executed;
    }

    pub fn view(&self) -> ProposalView {
        ProposalView {
            id: self.id,
            action: self.action,
            target: self.target,
            proposer: self.proposer,
            yes_votes: self.yes_votes(),
            snapshot_member_count: self.snapshot_member_count,
            threshold: self.threshold(),
            executed: self.executed,
            status: self.status(),
            voters: self.voters(),
        }
    }

    pub(crate) fn to_record(&self) -> ProposalRecord {
        ProposalRecord {
            id: self.id,
            action: self.action,
            target: self.target,
            proposer: self.proposer,
            yes_votes: self.yes_votes(),
            snapshot_member_count: self.snapshot_member_count,
            executed: self.executed,
        }
    }

    /// Rebuild a proposal from its persisted row and vote set.
    pub(crate) fn from_record(
        record: ProposalRecord,
        voters: Vec<Identity>,
    ) -> Result<Self, GovernanceError> {
        let voters: IdentitySet = voters.into_iter().collect();
        if voters.count() != record.yes_votes {
            return Err(GovernanceError::Corrupted(format!(
                "proposal {} records {} yes votes but {} voters",
                record.id,
                record.yes_votes,
                voters.count()
            )));
        }
        Ok(Self {
            id: record.id,
            action: record.action,
            target: record.target,
            proposer: record.proposer,
            snapshot_member_count: record.snapshot_member_count,
            executed: record.executed,
            voters,
        })
    }
}

/// Read-only projection of a proposal handed to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalView {
    pub id: u64,
    pub action: ProposalAction,
    pub target: Identity,
    pub proposer: Identity,
    pub yes_votes: u32,
    pub snapshot_member_count: u32,
    pub threshold: u32,
    pub executed: bool,
    pub status: ProposalStatus,
    pub voters: Vec<Identity>,
}

/// Persisted proposal row. Voters live in the separate vote table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProposalRecord {
    pub id: u64,
    pub action: ProposalAction,
    pub target: Identity,
    pub proposer: Identity,
    pub yes_votes: u32,
    pub snapshot_member_count: u32,
    pub executed: bool,
}

impl ProposalRecord {
    pub fn encode(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Corrupted(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(bytes).map_err(|e| GovernanceError::Corrupted(e.to_string()))
    }
}

/// Proposals indexed by a dense, never-reused sequence number starting at 0.
#[derive(Clone, Debug, Default)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next proposal. Whether the action makes sense for the
    /// target is only known at execution time, so it is not checked here.
    pub fn create(
        &mut self,
        action: ProposalAction,
        target: Identity,
        proposer: Identity,
        current_member_count: u32,
    ) -> Result<&Proposal, GovernanceError> {
        if target.is_zero() {
            return Err(GovernanceError::InvalidTarget);
        }
        let id = self.proposals.len() as u64;
        self.proposals.push(Proposal {
            id,
            action,
            target,
            proposer,
            snapshot_member_count: current_member_count,
            executed: false,
            voters: IdentitySet::new(),
        });
        Ok(&self.proposals[self.proposals.len() - 1])
    }

    /// Drop the most recent proposal. Only valid before its id was handed out.
    pub(crate) fn discard_last(&mut self) {
        self.proposals.pop();
    }

    pub fn get(&self, id: u64) -> Result<&Proposal, GovernanceError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.proposals.get(i))
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut Proposal, GovernanceError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// All proposals in id order.
    pub fn list(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Rebuild from recovered proposals, which must form the dense id range.
    pub(crate) fn restore(mut proposals: Vec<Proposal>) -> Result<Self, GovernanceError> {
        proposals.sort_by_key(|p| p.id);
        for (expected, p) in proposals.iter().enumerate() {
            if p.id != expected as u64 {
                return Err(GovernanceError::Corrupted(format!(
                    "proposal ids are not dense: expected {expected}, found {}",
                    p.id
                )));
            }
        }
        Ok(Self { proposals })
    }
}
