use std::collections::VecDeque;

use thiserror::Error;

use crate::{
    definition::{Definition, Dependency, Identifier},
    matcher::Matcher,
};

/// Graph of all enabled definitions
///
/// An edge `(provider, dependent)` means the provider has to be constructed first.
/// Edges are kept in a dense adjacency matrix indexed like `nodes`.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<Definition>,
    edges: Vec<Vec<bool>>,
}
impl DependencyGraph {
    /// Builds the graph, adding an edge from every matching provider to its dependent
    ///
    /// A definition is never a candidate for its own dependencies. Ambiguity is not
    /// checked here, a singular dependency with several candidates gets an edge from each of them.
    pub fn new(definitions: Vec<Definition>, matcher: Matcher<'_>) -> Self {
        let len = definitions.len();
        let mut graph = Self {
            nodes: definitions,
            edges: vec![vec![false; len]; len],
        };

        let identifiers: Vec<&Identifier> = graph.nodes.iter().map(|d| &d.identifier).collect();
        let mut edges = Vec::new();

        for (dependent, definition) in graph.nodes.iter().enumerate() {
            let others = identifiers
                .iter()
                .enumerate()
                .filter(move |(index, _)| *index != dependent)
                .map(|(_, identifier)| *identifier);
            // Indices into `others` skip the dependent itself
            let node = |index: usize| {
                if index < dependent {
                    index
                } else {
                    index + 1
                }
            };

            for dependency in &definition.dependencies {
                let providers = match dependency {
                    Dependency::Single(requested) => {
                        matcher.select_single(requested, others.clone())
                    }
                    Dependency::List(requested) => matcher
                        .select_list(requested, others.clone())
                        .indices()
                        .to_vec(),
                    // Resolved at construction time
                    Dependency::Property(_) => continue,
                };

                edges.extend(providers.into_iter().map(|provider| (node(provider), dependent)));
            }
        }

        for (provider, dependent) in edges {
            tracing::trace!(
                "Edge {} -> {}",
                graph.nodes[provider].identifier,
                graph.nodes[dependent].identifier
            );
            graph.edges[provider][dependent] = true;
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Definition] {
        &self.nodes
    }

    pub fn has_edge(&self, provider: usize, dependent: usize) -> bool {
        self.edges
            .get(provider)
            .and_then(|row| row.get(dependent))
            .copied()
            .unwrap_or(false)
    }

    /// All edges as `(provider, dependent)` index pairs
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().enumerate().flat_map(|(provider, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, edge)| **edge)
                .map(move |(dependent, _)| (provider, dependent))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Validate the graph
    ///
    /// Returns every cycle found, not just the first
    pub fn check(&self) -> Result<(), CycleErrors> {
        let cycles: Vec<Cycle> = find_cycles(&self.edges)
            .into_iter()
            .map(|nodes| Cycle {
                chain: nodes
                    .iter()
                    .map(|index| self.nodes[*index].identifier.clone())
                    .collect(),
                nodes,
            })
            .collect();

        if !cycles.is_empty() {
            return Err(CycleErrors { cycles });
        }

        Ok(())
    }

    /// Construction order, providers before dependents
    ///
    /// On a cyclic graph the nodes that could not be ordered are returned
    pub fn order(&self) -> Result<Vec<usize>, Vec<usize>> {
        topological_order(&self.edges)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Enumerates cycles with a three color depth first search
///
/// Whenever an in-progress node is reached again, the path from that node to the current
/// one is recorded. Every unvisited node is used as a root so disjoint cycles are all found.
pub fn find_cycles(edges: &[Vec<bool>]) -> Vec<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; edges.len()];
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for root in 0..edges.len() {
        if marks[root] == Mark::Unvisited {
            visit(root, edges, &mut marks, &mut path, &mut cycles);
        }
    }

    return cycles;

    fn visit(
        node: usize,
        edges: &[Vec<bool>],
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        cycles: &mut Vec<Vec<usize>>,
    ) {
        marks[node] = Mark::InProgress;
        path.push(node);

        for next in successors(edges, node) {
            match marks[next] {
                Mark::Unvisited => visit(next, edges, marks, path, cycles),
                Mark::InProgress => {
                    if let Some(start) = path.iter().position(|n| *n == next) {
                        cycles.push(path[start..].to_vec());
                    }
                }
                Mark::Done => {}
            }
        }

        path.pop();
        marks[node] = Mark::Done;
    }
}

/// Kahn's algorithm
///
/// Zero in-degree nodes are queued in index order, which makes the result deterministic.
/// Returns the unordered nodes if the graph has a cycle.
pub fn topological_order(edges: &[Vec<bool>]) -> Result<Vec<usize>, Vec<usize>> {
    let len = edges.len();
    let mut in_degree = vec![0_usize; len];
    for node in 0..len {
        for next in successors(edges, node) {
            in_degree[next] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..len).filter(|node| in_degree[*node] == 0).collect();
    let mut order = Vec::with_capacity(len);

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for next in successors(edges, node) {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < len {
        return Err((0..len).filter(|node| in_degree[*node] > 0).collect());
    }

    Ok(order)
}

fn successors(edges: &[Vec<bool>], node: usize) -> impl Iterator<Item = usize> + '_ {
    edges[node]
        .iter()
        .enumerate()
        .filter(|(_, edge)| **edge)
        .map(|(next, _)| next)
}

/// Closed chain of definitions depending on each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Starts at the node the back edge pointed to
    pub chain: Vec<Identifier>,
    /// Graph node index of each chain entry
    pub nodes: Vec<usize>,
}
impl std::fmt::Display for Cycle {
    /// Identifiers occurring more than once are suffixed with their node index
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entry = |position: usize| {
            let identifier = &self.chain[position];
            if self.chain.iter().filter(|other| *other == identifier).count() > 1 {
                format!("{}@{}", identifier, self.nodes[position])
            } else {
                identifier.to_string()
            }
        };

        let mut display: Vec<String> = (0..self.chain.len()).map(&entry).collect();
        if !self.chain.is_empty() {
            display.push(entry(0));
        }
        f.write_str(&display.join(" -> "))
    }
}
impl Cycle {
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.chain.contains(identifier)
    }
}

impl std::fmt::Display for CycleErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph has one or more cycles:".to_string());
        for cycle in &self.cycles {
            display.push(format!("- {}", cycle));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct CycleErrors {
    pub cycles: Vec<Cycle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{hierarchy::TypeHierarchy, types::DynError};

    fn matrix(len: usize, edges: &[(usize, usize)]) -> Vec<Vec<bool>> {
        let mut matrix = vec![vec![false; len]; len];
        for (from, to) in edges {
            matrix[*from][*to] = true;
        }
        matrix
    }

    fn provides(name: &str, dependencies: &[&str]) -> Definition {
        let mut builder = Definition::builder::<u32>().named(name);
        for dependency in dependencies {
            builder = builder.depends_on(Dependency::named::<u32>(*dependency));
        }
        builder.factory(|_| Ok::<_, DynError>(0))
    }

    #[test]
    fn order_respects_every_edge() {
        let edges = matrix(5, &[(3, 0), (0, 1), (4, 1), (1, 2), (3, 2)]);

        let order = topological_order(&edges).unwrap();

        let position = |node: usize| order.iter().position(|n| *n == node).unwrap();
        for (from, row) in edges.iter().enumerate() {
            for (to, edge) in row.iter().enumerate() {
                if *edge {
                    assert!(position(from) < position(to), "{from} before {to}");
                }
            }
        }
    }

    #[test]
    fn order_ties_break_by_index() {
        let edges = matrix(4, &[]);

        assert_eq!(topological_order(&edges).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn sorter_reports_unordered_nodes_on_cycle() {
        let edges = matrix(3, &[(0, 1), (1, 2), (2, 1)]);

        assert_eq!(topological_order(&edges).unwrap_err(), vec![1, 2]);
    }

    #[test]
    fn two_node_cycle_found_once() {
        let edges = matrix(2, &[(0, 1), (1, 0)]);

        assert_eq!(find_cycles(&edges), vec![vec![0, 1]]);
    }

    #[test]
    fn disjoint_cycles_are_reported_separately() {
        let edges = matrix(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);

        let cycles = find_cycles(&edges);

        assert_eq!(cycles, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let edges = matrix(3, &[(0, 1), (0, 2), (1, 2)]);

        assert!(find_cycles(&edges).is_empty());
    }

    #[test]
    fn graph_adds_edge_per_candidate_and_skips_self() {
        let hierarchy = TypeHierarchy::new();
        let definitions = vec![
            provides("a", &[]),
            Definition::builder::<u32>()
                .named("b")
                .depends_on(Dependency::single::<u32>())
                .factory(|_| Ok::<_, DynError>(0)),
            provides("c", &[]),
        ];

        let graph = DependencyGraph::new(definitions, Matcher::new(&hierarchy));

        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(1, 1));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn property_dependencies_add_no_edges() {
        let hierarchy = TypeHierarchy::new();
        let definitions = vec![
            provides("a", &[]),
            Definition::builder::<u64>()
                .depends_on(Dependency::property("a"))
                .factory(|_| Ok::<_, DynError>(0)),
        ];

        let graph = DependencyGraph::new(definitions, Matcher::new(&hierarchy));

        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn check_reports_all_cycles_with_identifiers() {
        let hierarchy = TypeHierarchy::new();
        let definitions = vec![
            provides("a", &["b"]),
            provides("b", &["a"]),
            provides("c", &["d"]),
            provides("d", &["c"]),
            provides("e", &[]),
        ];

        let graph = DependencyGraph::new(definitions, Matcher::new(&hierarchy));
        let errors = graph.check().unwrap_err();

        assert_eq!(errors.cycles.len(), 2);
        assert!(errors.cycles[0].contains(&Identifier::named::<u32>("a")));
        assert!(errors.cycles[0].contains(&Identifier::named::<u32>("b")));
        assert!(errors.cycles[1].contains(&Identifier::named::<u32>("c")));
        assert_eq!(errors.cycles[0].to_string(), "u32#a -> u32#b -> u32#a");
    }

    #[test]
    fn own_element_does_not_hide_whole_list_provider() {
        let hierarchy = TypeHierarchy::new();
        let definitions = vec![
            Definition::builder::<u32>()
                .named("sum")
                .depends_on(Dependency::list::<u32>())
                .factory(|_| Ok::<_, DynError>(0)),
            Definition::instance::<Vec<Arc<u32>>>(vec![Arc::new(1), Arc::new(2)]),
        ];

        let graph = DependencyGraph::new(definitions, Matcher::new(&hierarchy));

        assert!(graph.has_edge(1, 0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn cycle_display_tells_shared_identifiers_apart() {
        let hierarchy = TypeHierarchy::new();
        let definitions = vec![provides("twin", &["twin"]), provides("twin", &["twin"])];

        let graph = DependencyGraph::new(definitions, Matcher::new(&hierarchy));
        let errors = graph.check().unwrap_err();

        assert_eq!(errors.cycles.len(), 1);
        assert_eq!(errors.cycles[0].nodes, vec![0, 1]);
        assert_eq!(
            errors.cycles[0].to_string(),
            "u32#twin@0 -> u32#twin@1 -> u32#twin@0"
        );
    }
}
