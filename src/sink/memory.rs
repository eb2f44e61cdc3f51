use std::collections::BTreeMap;

use tracing::trace;

use crate::sink::{Edge, EdgeKind, GraphSink, Node, NodeLabel, Properties, SinkResult};

type NodeMap = BTreeMap<String, Properties>;
type EdgeMap = BTreeMap<(String, String), Properties>;

/// A [`GraphSink`] that keeps the whole graph in memory
///
/// It follows the merge semantics of a Cypher `MERGE ... SET` statement:
/// nodes and edges are created on first write, later writes overwrite the
/// given properties. Edges are only created if both endpoints exist,
/// otherwise they are dropped.
///
/// All data is kept in sorted maps, so reading is deterministic.
///
/// # Examples
///
/// ```
/// use phenograph::sink::{Edge, EdgeKind, GraphSink, MemoryGraph, Node, NodeLabel};
///
/// let mut graph = MemoryGraph::default();
/// graph.upsert_nodes(&[
///     Node::new(NodeLabel::Phenotype, "HP:0000001").with("name", "All"),
///     Node::new(NodeLabel::Phenotype, "HP:0000118"),
/// ]).unwrap();
///
/// graph.upsert_edges(&[
///     Edge::new(EdgeKind::IsA, "HP:0000118", "HP:0000001"),
///     Edge::new(EdgeKind::IsA, "HP:0000118", "HP:9999999"),
/// ]).unwrap();
///
/// assert_eq!(graph.node_count(NodeLabel::Phenotype), 2);
/// assert_eq!(graph.edge_count(EdgeKind::IsA), 1);
/// assert_eq!(graph.dropped_edges(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryGraph {
    nodes: BTreeMap<NodeLabel, NodeMap>,
    edges: BTreeMap<EdgeKind, EdgeMap>,
    dropped_edges: usize,
}

impl MemoryGraph {
    /// Constructs a new, empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the properties of a node
    pub fn node(&self, label: NodeLabel, id: &str) -> Option<&Properties> {
        self.nodes.get(&label)?.get(id)
    }

    /// Returns the properties of an edge
    pub fn edge(&self, kind: EdgeKind, from: &str, to: &str) -> Option<&Properties> {
        self.edges
            .get(&kind)?
            .get(&(from.to_string(), to.to_string()))
    }

    /// Returns the number of nodes with the label
    pub fn node_count(&self, label: NodeLabel) -> usize {
        self.nodes.get(&label).map_or(0, BTreeMap::len)
    }

    /// Returns the number of edges of the kind
    pub fn edge_count(&self, kind: EdgeKind) -> usize {
        self.edges.get(&kind).map_or(0, BTreeMap::len)
    }

    /// Returns how many edges were dropped because an endpoint was missing
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    fn contains_node(&self, label: NodeLabel, id: &str) -> bool {
        self.nodes
            .get(&label)
            .is_some_and(|nodes| nodes.contains_key(id))
    }
}

impl GraphSink for MemoryGraph {
    fn upsert_nodes(&mut self, nodes: &[Node]) -> SinkResult<()> {
        for node in nodes {
            let properties = self
                .nodes
                .entry(node.label)
                .or_default()
                .entry(node.id.clone())
                .or_default();
            for (key, value) in &node.properties {
                properties.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn upsert_edges(&mut self, edges: &[Edge]) -> SinkResult<()> {
        for edge in edges {
            let (from_label, to_label) = edge.kind.endpoints();
            if !self.contains_node(from_label, &edge.from) || !self.contains_node(to_label, &edge.to)
            {
                trace!("No match for {} {} -> {}", edge.kind, edge.from, edge.to);
                self.dropped_edges += 1;
                continue;
            }
            let properties = self
                .edges
                .entry(edge.kind)
                .or_default()
                .entry((edge.from.clone(), edge.to.clone()))
                .or_default();
            for (key, value) in &edge.properties {
                properties.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn nodes(&self, label: NodeLabel) -> SinkResult<Vec<Node>> {
        Ok(self
            .nodes
            .get(&label)
            .map(|nodes| {
                nodes
                    .iter()
                    .map(|(id, properties)| Node {
                        label,
                        id: id.clone(),
                        properties: properties.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn edges(&self, kind: EdgeKind) -> SinkResult<Vec<Edge>> {
        Ok(self
            .edges
            .get(&kind)
            .map(|edges| {
                edges
                    .iter()
                    .map(|((from, to), properties)| Edge {
                        kind,
                        from: from.clone(),
                        to: to.clone(),
                        properties: properties.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Two graphs are equal if they contain the same nodes and edges
/// with the same properties
impl PartialEq for MemoryGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sink::{Batch, Value};

    fn phenotype(id: &str) -> Node {
        Node::new(NodeLabel::Phenotype, id)
    }

    #[test]
    fn merge_overwrites_given_properties_only() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_nodes(&[phenotype("HP:0000001").with("name", "All").with("category", "Other")])
            .unwrap();
        graph
            .upsert_nodes(&[phenotype("HP:0000001").with("name", "Root")])
            .unwrap();

        let props = graph.node(NodeLabel::Phenotype, "HP:0000001").unwrap();
        assert_eq!(props.get("name"), Some(&Value::from("Root")));
        assert_eq!(props.get("category"), Some(&Value::from("Other")));
        assert_eq!(graph.node_count(NodeLabel::Phenotype), 1);
    }

    #[test]
    fn edges_are_merged_by_endpoints() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_nodes(&[phenotype("HP:0000001"), phenotype("HP:0000002")])
            .unwrap();
        let edge = Edge::new(EdgeKind::IsA, "HP:0000002", "HP:0000001").with("confidence_score", 1.0);
        graph.upsert_edges(&[edge.clone(), edge]).unwrap();
        assert_eq!(graph.edge_count(EdgeKind::IsA), 1);
        assert_eq!(graph.dropped_edges(), 0);
    }

    #[test]
    fn edges_need_matching_labels() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_nodes(&[phenotype("HP:0000001"), phenotype("OMIM:1")])
            .unwrap();
        // the source of HAS_PHENOTYPE must be a disease
        graph
            .upsert_edges(&[Edge::new(EdgeKind::HasPhenotype, "OMIM:1", "HP:0000001")])
            .unwrap();
        assert_eq!(graph.edge_count(EdgeKind::HasPhenotype), 0);
        assert_eq!(graph.dropped_edges(), 1);
    }

    #[test]
    fn commit_writes_nodes_before_edges() {
        let mut graph = MemoryGraph::new();
        let batch = Batch {
            nodes: vec![phenotype("HP:0000001"), phenotype("HP:0000002")],
            edges: vec![Edge::new(EdgeKind::IsA, "HP:0000002", "HP:0000001")],
        };
        graph.commit(&batch).unwrap();
        assert!(graph.edge(EdgeKind::IsA, "HP:0000002", "HP:0000001").is_some());
    }

    #[test]
    fn reads_are_sorted() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_nodes(&[phenotype("HP:0000003"), phenotype("HP:0000001"), phenotype("HP:0000002")])
            .unwrap();
        let ids: Vec<String> = graph
            .nodes(NodeLabel::Phenotype)
            .unwrap()
            .into_iter()
            .map(|node| node.id)
            .collect();
        assert_eq!(ids, vec!["HP:0000001", "HP:0000002", "HP:0000003"]);
        assert!(graph.nodes(NodeLabel::Disease).unwrap().is_empty());
        assert!(graph.edges(EdgeKind::IsA).unwrap().is_empty());
    }
}
