use eduverify_store::StoreError;
use eduverify_types::Identity;
use serde::Serialize;
use thiserror::Error;

/// Coarse failure class, stable across variants. Callers (e.g. the HTTP
/// layer) branch on this rather than on individual variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Conflict,
    PreconditionFailed,
    InvalidArgument,
    ExecutionFailed,
    Storage,
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{0} is not a governor")]
    Unauthorized(Identity),

    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("{0} is already a member")]
    AlreadyMember(Identity),

    #[error("{0} is not a member")]
    NotMember(Identity),

    #[error("cannot remove {0}: last remaining governor")]
    LastMemberProtected(Identity),

    #[error("{voter} has already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: u64, voter: Identity },

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(u64),

    #[error("threshold not met for proposal {proposal_id}: {have} < {need} votes")]
    ThresholdNotMet { proposal_id: u64, have: u32, need: u32 },

    #[error("proposal target must not be the zero identity")]
    InvalidTarget,

    #[error("governance requires at least one genesis governor")]
    EmptyGovernorSet,

    #[error("execution of proposal {proposal_id} failed: {source}")]
    ExecutionFailed {
        proposal_id: u64,
        #[source]
        source: Box<GovernanceError>,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored governance state is inconsistent: {0}")]
    Corrupted(String),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::ProposalNotFound(_) | Self::NotMember(_) => ErrorKind::NotFound,
            Self::AlreadyMember(_) | Self::AlreadyVoted { .. } | Self::AlreadyExecuted(_) => {
                ErrorKind::Conflict
            }
            Self::ThresholdNotMet { .. } | Self::LastMemberProtected(_) => {
                ErrorKind::PreconditionFailed
            }
            Self::InvalidTarget | Self::EmptyGovernorSet => ErrorKind::InvalidArgument,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Self::Store(_) | Self::Corrupted(_) => ErrorKind::Storage,
        }
    }
}
