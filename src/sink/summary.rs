use std::collections::BTreeMap;
use std::fmt::Display;

use statrs::statistics::Statistics;

use crate::sink::{keys, EdgeKind, GraphSink, Node, NodeLabel, SinkResult};

/// A single phenotype, as shown in the summary
#[derive(Debug, Clone, PartialEq)]
pub struct PhenotypeSample {
    /// The term ID
    pub id: String,
    /// The term name
    pub name: String,
    /// The category of the term
    pub category: String,
    /// Number of diseases linked to the term, if already calculated
    pub degree_centrality: Option<f64>,
}

/// A single disease, as shown in the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseSample {
    /// The disease ID
    pub id: String,
    /// The disease name
    pub name: String,
    /// Number of linked phenotypes
    pub symptom_count: usize,
}

/// Aggregated statistics of a graph
///
/// Averages are calculated over all phenotypes that have the
/// respective metric and are `None` if no phenotype has it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSummary {
    /// Number of nodes per label
    pub node_counts: BTreeMap<NodeLabel, usize>,
    /// Number of edges per kind
    pub edge_counts: BTreeMap<EdgeKind, usize>,
    /// Number of phenotypes flagged as hub
    pub hubs: usize,
    /// The average local clustering coefficient of all phenotypes
    pub avg_clustering_coefficient: Option<f64>,
    /// The average degree centrality of all phenotypes
    pub avg_degree_centrality: Option<f64>,
    /// The first phenotype, ordered by ID
    pub sample_phenotype: Option<PhenotypeSample>,
    /// The first disease, ordered by ID
    pub sample_disease: Option<DiseaseSample>,
}

fn mean_of(nodes: &[Node], key: &str) -> Option<f64> {
    let values: Vec<f64> = nodes
        .iter()
        .filter_map(|node| node.get(key).and_then(|value| value.as_f64()))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

fn text_of(node: &Node, key: &str) -> String {
    node.get(key)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

impl GraphSummary {
    /// Queries the sink and aggregates the statistics
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`](`crate::sink::SinkError`) if the sink cannot be queried
    pub fn collect<S: GraphSink + ?Sized>(sink: &S) -> SinkResult<Self> {
        let phenotypes = sink.nodes(NodeLabel::Phenotype)?;
        let diseases = sink.nodes(NodeLabel::Disease)?;
        let has_phenotype = sink.edges(EdgeKind::HasPhenotype)?;

        let mut summary = GraphSummary::default();
        summary
            .node_counts
            .insert(NodeLabel::Phenotype, phenotypes.len());
        summary.node_counts.insert(NodeLabel::Disease, diseases.len());
        summary
            .edge_counts
            .insert(EdgeKind::HasPhenotype, has_phenotype.len());
        for kind in [EdgeKind::IsA, EdgeKind::AssociatedWith] {
            summary.edge_counts.insert(kind, sink.edges(kind)?.len());
        }

        summary.hubs = phenotypes
            .iter()
            .filter(|node| {
                node.get(keys::IS_HUB)
                    .and_then(|value| value.as_bool())
                    .unwrap_or(false)
            })
            .count();
        summary.avg_clustering_coefficient = mean_of(&phenotypes, keys::CLUSTER_COEFFICIENT);
        summary.avg_degree_centrality = mean_of(&phenotypes, keys::DEGREE_CENTRALITY);

        summary.sample_phenotype = phenotypes.first().map(|node| PhenotypeSample {
            id: node.id.clone(),
            name: text_of(node, keys::NAME),
            category: text_of(node, keys::CATEGORY),
            degree_centrality: node
                .get(keys::DEGREE_CENTRALITY)
                .and_then(|value| value.as_f64()),
        });
        summary.sample_disease = diseases.first().map(|node| DiseaseSample {
            id: node.id.clone(),
            name: text_of(node, keys::NAME),
            symptom_count: has_phenotype
                .iter()
                .filter(|edge| edge.from == node.id)
                .count(),
        });

        Ok(summary)
    }

    /// Returns the number of nodes with the label
    pub fn nodes(&self, label: NodeLabel) -> usize {
        self.node_counts.get(&label).copied().unwrap_or_default()
    }

    /// Returns the number of edges of the kind
    pub fn edges(&self, kind: EdgeKind) -> usize {
        self.edge_counts.get(&kind).copied().unwrap_or_default()
    }
}

impl Display for GraphSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Node Counts:")?;
        for (label, count) in &self.node_counts {
            writeln!(f, "{label}: {count}")?;
        }
        writeln!(f, "\nRelationship Counts:")?;
        for (kind, count) in &self.edge_counts {
            writeln!(f, "{kind}: {count}")?;
        }

        writeln!(f, "\nGraph Analytics:")?;
        writeln!(f, "Total Symptoms: {}", self.nodes(NodeLabel::Phenotype))?;
        writeln!(f, "Hub Symptoms: {}", self.hubs)?;
        if let Some(avg) = self.avg_clustering_coefficient {
            writeln!(f, "Average Clustering Coefficient: {avg:.3}")?;
        }
        if let Some(avg) = self.avg_degree_centrality {
            writeln!(f, "Average Degree Centrality: {avg:.3}")?;
        }

        if let Some(sample) = &self.sample_phenotype {
            writeln!(f, "\nSample Phenotype:")?;
            writeln!(f, "- Name: {}", sample.name)?;
            writeln!(f, "- ID: {}", sample.id)?;
            writeln!(f, "- Category: {}", sample.category)?;
            if let Some(centrality) = sample.degree_centrality {
                writeln!(f, "- Centrality: {centrality}")?;
            }
        }
        if let Some(sample) = &self.sample_disease {
            writeln!(f, "\nSample Disease:")?;
            writeln!(f, "- Name: {}", sample.name)?;
            writeln!(f, "- ID: {}", sample.id)?;
            writeln!(f, "- Associated Symptoms: {}", sample.symptom_count)?;
        }
        Ok(())
    }
}
