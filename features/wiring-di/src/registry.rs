use crate::{
    args::Resolved,
    definition::{Identifier, ListIdentifier},
    hierarchy::TypeHierarchy,
    matcher::{ListSelection, Matcher},
    types::Instance,
};

/// Append only list of constructed instances, in construction order
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: Vec<(Identifier, Instance)>,
}

/// Outcome of a singular lookup
pub(crate) enum SingleMatch<'r> {
    None,
    One(&'r Instance),
    Many(Vec<Identifier>),
}

impl Registry {
    pub fn register(&mut self, identifier: Identifier, instance: Instance) {
        self.entries.push((identifier, instance));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(Identifier, Instance)] {
        &self.entries
    }

    pub fn find_single(&self, hierarchy: &TypeHierarchy, requested: &Identifier) -> SingleMatch<'_> {
        let matches = Matcher::new(hierarchy).select_single(requested, self.identifiers());

        match matches.as_slice() {
            [] => SingleMatch::None,
            [index] => SingleMatch::One(&self.entries[*index].1),
            _ => SingleMatch::Many(
                matches
                    .iter()
                    .map(|index| self.entries[*index].0.clone())
                    .collect(),
            ),
        }
    }

    /// Never fails, no match resolves to an empty list
    pub fn find_list(&self, hierarchy: &TypeHierarchy, requested: &ListIdentifier) -> Resolved {
        let selection = Matcher::new(hierarchy).select_list(requested, self.identifiers());
        let instances = |indices: &[usize]| -> Vec<Instance> {
            indices
                .iter()
                .map(|index| self.entries[*index].1.clone())
                .collect()
        };

        match selection {
            ListSelection::Elements(indices) => Resolved::Elements(instances(&indices)),
            ListSelection::WholeList(indices) => Resolved::WholeList(instances(&indices)),
        }
    }

    fn identifiers(&self) -> impl Iterator<Item = &Identifier> + Clone + '_ {
        self.entries.iter().map(|(identifier, _)| identifier)
    }
}
