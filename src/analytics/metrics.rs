//! Composite per-phenotype metrics
//!
//! | property | value |
//! | --- | --- |
//! | `prevalence` | number of linked diseases |
//! | `connectivity` | number of incident associations |
//! | `specificity` | `1 / prevalence`, `0` for unlinked phenotypes |
//! | `hierarchical_level` | number of distinct ancestors |
//! | `leaf_node` | `true` if no term is a child of the phenotype |

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::info;

use crate::analytics::{count_incident, count_targets, phenotype_ids, ratio, write_nodes};
use crate::config::PipelineConfig;
use crate::sink::{keys, EdgeKind, GraphSink, Node, NodeLabel};
use crate::GraphResult;

/// Number of distinct terms reachable via `parents`, excluding `id`
///
/// Cyclic hierarchies are tolerated, every term is visited once.
pub(crate) fn ancestor_count(id: &str, parents: &HashMap<&str, Vec<&str>>) -> usize {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = parents.get(id).cloned().unwrap_or_default();
    while let Some(parent) = stack.pop() {
        if parent == id || !visited.insert(parent) {
            continue;
        }
        if let Some(grandparents) = parents.get(parent) {
            stack.extend(grandparents.iter().copied());
        }
    }
    visited.len()
}

/// Calculates the composite metrics of every phenotype
///
/// Returns the number of updated phenotypes.
///
/// # Errors
///
/// Returns [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink
/// cannot be read or rejects the update
pub fn compute<S: GraphSink + ?Sized>(sink: &mut S, config: &PipelineConfig) -> GraphResult<usize> {
    let ids = phenotype_ids(&*sink)?;
    let has_phenotype = sink.edges(EdgeKind::HasPhenotype)?;
    let associations = sink.edges(EdgeKind::AssociatedWith)?;
    let is_a = sink.edges(EdgeKind::IsA)?;

    let prevalence = count_targets(&has_phenotype);
    let connectivity = count_incident(&associations);
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_children: HashSet<&str> = HashSet::new();
    for edge in &is_a {
        parents
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
        has_children.insert(edge.to.as_str());
    }

    let updates: Vec<Node> = ids
        .par_iter()
        .map(|id| {
            let id = id.as_str();
            let diseases = prevalence.get(id).copied().unwrap_or_default();
            Node::new(NodeLabel::Phenotype, id)
                .with(keys::PREVALENCE, diseases)
                .with(
                    keys::CONNECTIVITY,
                    connectivity.get(id).copied().unwrap_or_default(),
                )
                .with(keys::SPECIFICITY, ratio(usize::from(diseases > 0), diseases))
                .with(keys::HIERARCHICAL_LEVEL, ancestor_count(id, &parents))
                .with(keys::LEAF_NODE, !has_children.contains(id))
        })
        .collect();
    write_nodes(sink, &updates, config)?;

    info!("Composite metrics of {} phenotypes", updates.len());
    Ok(updates.len())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analytics::test::graph_with;
    use crate::sink::{Edge, Value};

    #[test]
    fn ancestors_with_diamond_and_cycle() {
        // D -> B -> A, D -> C -> A, A -> D
        let parents: HashMap<&str, Vec<&str>> = HashMap::from([
            ("D", vec!["B", "C"]),
            ("B", vec!["A"]),
            ("C", vec!["A"]),
            ("A", vec!["D"]),
        ]);
        assert_eq!(ancestor_count("D", &parents), 3);
        assert_eq!(ancestor_count("X", &parents), 0);
    }

    #[test]
    fn metrics_of_small_graph() {
        let mut graph = graph_with(
            &["HP:0000001", "HP:0000118", "HP:0000478"],
            &["OMIM:1", "OMIM:2"],
        );
        graph
            .upsert_edges(&[
                Edge::new(EdgeKind::IsA, "HP:0000118", "HP:0000001"),
                Edge::new(EdgeKind::IsA, "HP:0000478", "HP:0000118"),
                Edge::new(EdgeKind::HasPhenotype, "OMIM:1", "HP:0000478"),
                Edge::new(EdgeKind::HasPhenotype, "OMIM:2", "HP:0000478"),
                Edge::new(EdgeKind::AssociatedWith, "HP:0000478", "HP:0000118"),
            ])
            .unwrap();
        let updated = compute(&mut graph, &PipelineConfig::default()).unwrap();
        assert_eq!(updated, 3);

        let eye = graph.node(NodeLabel::Phenotype, "HP:0000478").unwrap();
        assert_eq!(eye.get(keys::PREVALENCE), Some(&Value::Integer(2)));
        assert_eq!(eye.get(keys::SPECIFICITY), Some(&Value::Float(0.5)));
        assert_eq!(eye.get(keys::CONNECTIVITY), Some(&Value::Integer(1)));
        assert_eq!(eye.get(keys::HIERARCHICAL_LEVEL), Some(&Value::Integer(2)));
        assert_eq!(eye.get(keys::LEAF_NODE), Some(&Value::Bool(true)));

        let root = graph.node(NodeLabel::Phenotype, "HP:0000001").unwrap();
        assert_eq!(root.get(keys::PREVALENCE), Some(&Value::Integer(0)));
        assert_eq!(root.get(keys::SPECIFICITY), Some(&Value::Float(0.0)));
        assert_eq!(root.get(keys::HIERARCHICAL_LEVEL), Some(&Value::Integer(0)));
        assert_eq!(root.get(keys::LEAF_NODE), Some(&Value::Bool(false)));
    }
}
