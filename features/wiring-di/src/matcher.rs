//! Decides whether a candidate identifier satisfies a requested dependency
//!
//! Matching is asymmetric: a candidate of a subtype satisfies a request for its
//! supertype, never the other way around.

use crate::{
    definition::{Identifier, ListIdentifier},
    hierarchy::TypeHierarchy,
};

/// Which candidates satisfied a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSelection {
    /// Candidates that are elements of the list
    Elements(Vec<usize>),
    /// Candidates providing the whole list, only used if no element matched
    WholeList(Vec<usize>),
}
impl ListSelection {
    pub fn indices(&self) -> &[usize] {
        match self {
            ListSelection::Elements(indices) | ListSelection::WholeList(indices) => indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices().is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    hierarchy: &'a TypeHierarchy,
}

impl<'a> Matcher<'a> {
    pub fn new(hierarchy: &'a TypeHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Singular match: names agree and the candidate is assignable to the requested type
    pub fn matches_single(&self, requested: &Identifier, candidate: &Identifier) -> bool {
        name_matches(requested.name.as_deref(), candidate.name.as_deref())
            && self
                .hierarchy
                .is_subtype_of(candidate.type_info, requested.type_info)
    }

    /// Candidate is a single element of the requested list
    pub fn matches_element(&self, requested: &ListIdentifier, candidate: &Identifier) -> bool {
        name_matches(requested.element_name.as_deref(), candidate.name.as_deref())
            && self
                .hierarchy
                .is_subtype_of(candidate.type_info, requested.element)
    }

    /// Candidate provides the exact list type requested
    pub fn matches_whole_list(&self, requested: &ListIdentifier, candidate: &Identifier) -> bool {
        candidate.type_info == requested.list
            && name_matches(requested.name.as_deref(), candidate.name.as_deref())
    }

    /// Indices of all candidates matching a singular request
    pub fn select_single<'c>(
        &self,
        requested: &Identifier,
        candidates: impl IntoIterator<Item = &'c Identifier>,
    ) -> Vec<usize> {
        candidates
            .into_iter()
            .enumerate()
            .filter(|(_, candidate)| self.matches_single(requested, candidate))
            .map(|(index, _)| index)
            .collect()
    }

    /// Selects candidates for a list request
    ///
    /// Element matches win exclusively, whole-list providers are only considered without any.
    /// An empty selection is valid.
    pub fn select_list<'c>(
        &self,
        requested: &ListIdentifier,
        candidates: impl IntoIterator<Item = &'c Identifier> + Clone,
    ) -> ListSelection {
        let elements: Vec<usize> = candidates
            .clone()
            .into_iter()
            .enumerate()
            .filter(|(_, candidate)| self.matches_element(requested, candidate))
            .map(|(index, _)| index)
            .collect();

        if !elements.is_empty() {
            return ListSelection::Elements(elements);
        }

        ListSelection::WholeList(
            candidates
                .into_iter()
                .enumerate()
                .filter(|(_, candidate)| self.matches_whole_list(requested, candidate))
                .map(|(index, _)| index)
                .collect(),
        )
    }
}

/// No requested name matches any candidate, a requested name only matches exactly
fn name_matches(requested: Option<&str>, candidate: Option<&str>) -> bool {
    match requested {
        None => true,
        Some(requested) => candidate == Some(requested),
    }
}
