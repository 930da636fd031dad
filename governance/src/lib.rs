//! Quorum governance for EduVerify.
//!
//! Governors propose and vote on changes to two authorization sets: the
//! governors themselves and the institutions allowed to issue credentials.
//!
//! Key rules:
//! - Only current governors may propose or vote; one vote per governor per proposal.
//! - A proposal passes with `floor(snapshot / 2) + 1` yes votes, where `snapshot`
//!   is the governor count when the proposal was created.
//! - Once passed, anyone may execute it, exactly once.
//! - The last governor can never be removed.

pub mod engine;
pub mod error;
pub mod members;
pub mod proposal;

pub use engine::{GovernanceEngine, Roles};
pub use error::{ErrorKind, GovernanceError};
pub use members::{IdentitySet, InstitutionSet, MemberSet};
pub use proposal::{
    quorum_threshold, Proposal, ProposalAction, ProposalStatus, ProposalStore, ProposalView,
};
