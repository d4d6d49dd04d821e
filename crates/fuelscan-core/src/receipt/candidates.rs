//! Per-field candidate collection.

use std::collections::BTreeMap;

use crate::models::receipt::{CandidateField, FieldKind};

/// At most one candidate per field kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    fields: BTreeMap<FieldKind, CandidateField>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate unless its kind is already taken.
    /// Returns whether the candidate was kept.
    pub fn insert(&mut self, candidate: CandidateField) -> bool {
        if self.fields.contains_key(&candidate.kind) {
            return false;
        }
        self.fields.insert(candidate.kind, candidate);
        true
    }

    pub fn get(&self, kind: FieldKind) -> Option<&CandidateField> {
        self.fields.get(&kind)
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.fields.contains_key(&kind)
    }

    /// Number of field kinds covered.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateField> {
        self.fields.values()
    }
}

impl FromIterator<CandidateField> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = CandidateField>>(iter: I) -> Self {
        let mut set = Self::new();
        for candidate in iter {
            set.insert(candidate);
        }
        set
    }
}
