use crate::domain::relation::{Endpoint, Relation, RelationKey};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use std::collections::HashMap;

/// Relation Graph - deduplicated relation set for one inference run
///
/// Nodes are endpoints (actors and types), edges are relations. At most one edge exists per
/// [`RelationKey`]; a repeated insert merges its action into the existing edge.
#[derive(Debug, Default)]
pub struct RelationGraph {
    graph: StableDiGraph<Endpoint, Relation>,
    endpoint_to_node: HashMap<Endpoint, NodeIndex>,
    edges: HashMap<RelationKey, EdgeIndex>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relation. Self-edges are dropped. Returns `true` if a new edge was created.
    pub fn insert(&mut self, relation: Relation) -> bool {
        if relation.is_self_edge() {
            return false;
        }

        let key = relation.key();
        if let Some(&edge) = self.edges.get(&key) {
            if let Some(existing) = self.graph.edge_weight_mut(edge) {
                merge_action(existing, relation.action);
            }
            return false;
        }

        let from = self.node(relation.source.clone());
        let to = self.node(Endpoint::Type(relation.target.clone()));
        let edge = self.graph.add_edge(from, to, relation);
        self.edges.insert(key, edge);
        true
    }

    fn node(&mut self, endpoint: Endpoint) -> NodeIndex {
        if let Some(&idx) = self.endpoint_to_node.get(&endpoint) {
            return idx;
        }
        let idx = self.graph.add_node(endpoint.clone());
        self.endpoint_to_node.insert(endpoint, idx);
        idx
    }

    pub fn remove(&mut self, key: &RelationKey) -> Option<Relation> {
        let edge = self.edges.remove(key)?;
        self.graph.remove_edge(edge)
    }

    pub fn get(&self, key: &RelationKey) -> Option<&Relation> {
        self.edges.get(key).and_then(|&e| self.graph.edge_weight(e))
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.graph.edge_weights()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn merge_action(existing: &mut Relation, action: Option<String>) {
    let Some(action) = action.filter(|a| !a.is_empty()) else {
        return;
    };
    match &mut existing.action {
        Some(current) => {
            current.push('\n');
            current.push_str(&action);
        }
        None => existing.action = Some(action),
    }
}
