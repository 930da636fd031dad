//! Governor and institution sets.
//!
//! Both are insertion-ordered sets of [`Identity`] so that enumeration is
//! deterministic and list-by-index views stay stable. They are only mutated
//! by the engine: at genesis, and when a proposal executes.

use crate::error::GovernanceError;
use eduverify_types::Identity;
use std::collections::HashSet;

/// Insertion-ordered set of identities with O(1) membership checks.
#[derive(Clone, Debug, Default)]
pub struct IdentitySet {
    order: Vec<Identity>,
    index: HashSet<Identity>,
}

impl IdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: Identity) -> Result<(), GovernanceError> {
        if !self.index.insert(id) {
            return Err(GovernanceError::AlreadyMember(id));
        }
        self.order.push(id);
        Ok(())
    }

    /// Remove `id`, returning the position it occupied.
    pub fn remove(&mut self, id: &Identity) -> Result<usize, GovernanceError> {
        if !self.index.remove(id) {
            return Err(GovernanceError::NotMember(*id));
        }
        let pos = self
            .order
            .iter()
            .position(|m| m == id)
            .ok_or(GovernanceError::NotMember(*id))?;
        self.order.remove(pos);
        Ok(pos)
    }

    /// Put `id` back at `pos`. Used to undo a removal exactly.
    pub(crate) fn restore_at(&mut self, pos: usize, id: Identity) {
        if self.index.insert(id) {
            let pos = pos.min(self.order.len());
            self.order.insert(pos, id);
        }
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.index.contains(id)
    }

    pub fn count(&self) -> u32 {
        self.order.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Identity> {
        self.order.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.order.iter()
    }

    pub fn to_ordered_list(&self) -> Vec<Identity> {
        self.order.clone()
    }
}

impl FromIterator<Identity> for IdentitySet {
    /// Duplicates are collapsed, keeping the first occurrence.
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            let _ = set.add(id);
        }
        set
    }
}

/// The governors. Never empty once genesis has happened.
#[derive(Clone, Debug, Default)]
pub struct MemberSet(IdentitySet);

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: Identity) -> Result<(), GovernanceError> {
        self.0.add(id)
    }

    /// Remove a governor. Removing the last one is refused, otherwise no
    /// proposal could ever reach quorum again.
    pub fn remove(&mut self, id: &Identity) -> Result<usize, GovernanceError> {
        if !self.0.contains(id) {
            return Err(GovernanceError::NotMember(*id));
        }
        if self.0.count() == 1 {
            return Err(GovernanceError::LastMemberProtected(*id));
        }
        self.0.remove(id)
    }

    pub(crate) fn restore_at(&mut self, pos: usize, id: Identity) {
        self.0.restore_at(pos, id)
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.0.contains(id)
    }

    pub fn count(&self) -> u32 {
        self.0.count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Identity> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.0.iter()
    }

    pub fn to_ordered_list(&self) -> Vec<Identity> {
        self.0.to_ordered_list()
    }
}

impl FromIterator<Identity> for MemberSet {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Institutions authorized to issue credentials.
#[derive(Clone, Debug, Default)]
pub struct InstitutionSet(IdentitySet);

impl InstitutionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: Identity) -> Result<(), GovernanceError> {
        self.0.add(id)
    }

    pub fn remove(&mut self, id: &Identity) -> Result<usize, GovernanceError> {
        self.0.remove(id)
    }

    pub(crate) fn restore_at(&mut self, pos: usize, id: Identity) {
        self.0.restore_at(pos, id)
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.0.contains(id)
    }

    pub fn count(&self) -> u32 {
        self.0.count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Identity> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.0.iter()
    }

    pub fn to_ordered_list(&self) -> Vec<Identity> {
        self.0.to_ordered_list()
    }
}

impl FromIterator<Identity> for InstitutionSet {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
