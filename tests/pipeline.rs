use std::io::BufRead;

use phenograph::analytics::centrality;
use phenograph::parser::OboTerms;
use phenograph::sink::{
    keys, Edge, EdgeKind, GraphSink, Node, NodeLabel, SinkError, SinkResult, Value,
};
use phenograph::{Annotation, GraphError, MemoryGraph, Pipeline, PipelineConfig, QueryIndex, Term};

const OBO: &str = "tests/small.obo";
const HPOA: &str = "tests/small.hpoa";

fn config() -> PipelineConfig {
    PipelineConfig::default().timestamp(1_680_000_000)
}

fn run(config: PipelineConfig) -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    Pipeline::new(&mut graph, config)
        .unwrap()
        .run_files(OBO, HPOA)
        .unwrap();
    graph
}

fn phenotype<'a>(graph: &'a MemoryGraph, id: &str) -> &'a phenograph::sink::Properties {
    graph
        .node(NodeLabel::Phenotype, id)
        .unwrap_or_else(|| panic!("{id} is missing"))
}

#[test]
fn ingest_fixtures() {
    let mut graph = MemoryGraph::new();
    let report = Pipeline::new(&mut graph, config())
        .unwrap()
        .run_files(OBO, HPOA)
        .unwrap();

    assert_eq!(report.terms.records, 8);
    assert_eq!(report.terms.batches, 1);
    assert_eq!(report.annotations.records, 16);
    assert_eq!(report.analytics.associations.edges, 0);

    assert_eq!(report.summary.nodes(NodeLabel::Phenotype), 8);
    assert_eq!(report.summary.nodes(NodeLabel::Disease), 6);
    assert_eq!(report.summary.edges(EdgeKind::IsA), 8);
    assert_eq!(report.summary.edges(EdgeKind::HasPhenotype), 16);
    assert_eq!(report.summary.edges(EdgeKind::AssociatedWith), 0);
    assert_eq!(graph.dropped_edges(), 0);

    let seizure = phenotype(&graph, "HP:0001250");
    assert_eq!(seizure.get(keys::NAME), Some(&Value::from("Seizure")));
    assert_eq!(seizure.get(keys::CATEGORY), Some(&Value::from("Inheritance")));
    assert_eq!(seizure.get(keys::CREATED_AT), Some(&Value::Integer(1_680_000_000)));

    let cognition = phenotype(&graph, "HP:0100543");
    assert_eq!(cognition.get(keys::CATEGORY), Some(&Value::from("Other")));
    assert_eq!(cognition.get(keys::HIERARCHICAL_LEVEL), Some(&Value::Integer(4)));

    let link = graph
        .edge(EdgeKind::HasPhenotype, "OMIM:100005", "HP:0001250")
        .unwrap();
    assert_eq!(link.get(keys::QUALIFIER), Some(&Value::from("NOT")));
}

#[test]
fn ingestion_is_idempotent() {
    let mut graph = run(config());
    let first = graph.clone();

    Pipeline::new(&mut graph, config())
        .unwrap()
        .run_files(OBO, HPOA)
        .unwrap();
    assert_eq!(graph, first);

    // the batch size does not change the result
    assert_eq!(run(config().batch_size(3)), first);
}

#[test]
fn associations_of_fixtures() {
    let graph = run(config().min_co_occurrence(3));
    assert_eq!(graph.edge_count(EdgeKind::AssociatedWith), 6);

    let edge = graph
        .edge(EdgeKind::AssociatedWith, "HP:0001250", "HP:0001263")
        .unwrap();
    assert_eq!(edge.get(keys::CO_OCCURRENCE_COUNT), Some(&Value::Integer(4)));
    assert_eq!(edge.get(keys::CORRELATION_STRENGTH), Some(&Value::Float(0.8)));
    assert_eq!(edge.get(keys::CROSS_CLUSTER), Some(&Value::Bool(false)));

    let reverse = graph
        .edge(EdgeKind::AssociatedWith, "HP:0001263", "HP:0001250")
        .unwrap();
    assert_eq!(reverse.get(keys::CORRELATION_STRENGTH), Some(&Value::Float(1.0)));

    let cross = graph
        .edge(EdgeKind::AssociatedWith, "HP:0001250", "HP:0100543")
        .unwrap();
    assert_eq!(cross.get(keys::CROSS_CLUSTER), Some(&Value::Bool(true)));
    assert_eq!(
        cross.get(keys::CLUSTER_CONNECTION_STRENGTH),
        Some(&Value::Float(0.5))
    );

    assert!(graph
        .edge(EdgeKind::AssociatedWith, "HP:0001250", "HP:0000505")
        .is_none());
}

#[test]
fn analytics_of_fixtures() {
    let graph = run(config().min_co_occurrence(3));

    let seizure = phenotype(&graph, "HP:0001250");
    assert_eq!(seizure.get(keys::DEGREE_CENTRALITY), Some(&Value::Integer(5)));
    assert_eq!(seizure.get(keys::PREVALENCE), Some(&Value::Integer(5)));
    assert_eq!(seizure.get(keys::SPECIFICITY), Some(&Value::Float(0.2)));
    assert_eq!(seizure.get(keys::CONNECTIVITY), Some(&Value::Integer(4)));
    assert_eq!(seizure.get(keys::BETWEENNESS_SCORE), Some(&Value::Integer(2)));
    assert_eq!(seizure.get(keys::CLUSTER_COEFFICIENT), Some(&Value::Float(1.0)));
    assert_eq!(seizure.get(keys::CLUSTER_ID), Some(&Value::from("Inheritance")));
    assert_eq!(seizure.get(keys::CLUSTER_SIZE), Some(&Value::Integer(6)));
    assert_eq!(seizure.get(keys::IS_HUB), Some(&Value::Bool(false)));
    assert_eq!(seizure.get(keys::LEAF_NODE), Some(&Value::Bool(true)));

    let delay = phenotype(&graph, "HP:0001263");
    assert_eq!(delay.get(keys::LEAF_NODE), Some(&Value::Bool(false)));

    let vision = phenotype(&graph, "HP:0000505");
    assert_eq!(vision.get(keys::BETWEENNESS_SCORE), Some(&Value::Integer(0)));
    assert_eq!(vision.get(keys::CLUSTER_COEFFICIENT), Some(&Value::Float(0.0)));
    assert_eq!(vision.get(keys::HIERARCHICAL_LEVEL), Some(&Value::Integer(3)));

    let summary = graph.summary().unwrap();
    assert_eq!(summary.hubs, 0);
    assert_eq!(summary.avg_clustering_coefficient, Some(0.375));
    let sample = summary.sample_disease.unwrap();
    assert_eq!(sample.id, "OMIM:100001");
    assert_eq!(sample.symptom_count, 4);
}

#[test]
fn negated_annotations_can_be_skipped() {
    let graph = run(config().min_co_occurrence(3).skip_negated(true));
    assert!(graph
        .edge(EdgeKind::HasPhenotype, "OMIM:100005", "HP:0001250")
        .is_none());
    let edge = graph
        .edge(EdgeKind::AssociatedWith, "HP:0001250", "HP:0001263")
        .unwrap();
    assert_eq!(edge.get(keys::CO_OCCURRENCE_COUNT), Some(&Value::Integer(3)));
    assert_eq!(edge.get(keys::CORRELATION_STRENGTH), Some(&Value::Float(0.75)));
}

#[test]
fn co_occurrence_threshold() {
    let terms = ["HP:0000010", "HP:0000020", "HP:0000030"]
        .into_iter()
        .map(|id| Ok(Term::new(id, id)));
    let mut annotations = Vec::new();
    for disease in 1..=6 {
        for phenotype in ["HP:0000010", "HP:0000020"] {
            annotations.push(Ok(Annotation {
                disease_id: format!("OMIM:{disease}").into(),
                phenotype_id: phenotype.into(),
                ..Default::default()
            }));
        }
    }
    for phenotype in ["HP:0000010", "HP:0000030"] {
        annotations.push(Ok(Annotation {
            disease_id: "OMIM:7".into(),
            phenotype_id: phenotype.into(),
            ..Default::default()
        }));
    }

    let mut graph = MemoryGraph::new();
    let report = Pipeline::new(&mut graph, config())
        .unwrap()
        .run(terms, annotations)
        .unwrap();
    assert_eq!(report.analytics.associations.edges, 2);

    let edge = graph
        .edge(EdgeKind::AssociatedWith, "HP:0000010", "HP:0000020")
        .unwrap();
    assert_eq!(edge.get(keys::CO_OCCURRENCE_COUNT), Some(&Value::Integer(6)));
    assert_eq!(
        edge.get(keys::CORRELATION_STRENGTH),
        Some(&Value::Float(6.0 / 7.0))
    );
    assert!(graph
        .edge(EdgeKind::AssociatedWith, "HP:0000010", "HP:0000030")
        .is_none());
}

#[test]
fn hub_needs_more_than_ten_associations() {
    let mut graph = MemoryGraph::new();
    let mut nodes = vec![
        Node::new(NodeLabel::Phenotype, "HP:0000100"),
        Node::new(NodeLabel::Phenotype, "HP:0000200"),
    ];
    let mut edges = Vec::new();
    for i in 0..11 {
        let id = format!("HP:00010{i:02}");
        nodes.push(Node::new(NodeLabel::Phenotype, &id));
        edges.push(Edge::new(EdgeKind::AssociatedWith, "HP:0000100", &id));
        if i < 10 {
            edges.push(Edge::new(EdgeKind::AssociatedWith, &id, "HP:0000200"));
        }
    }
    graph.upsert_nodes(&nodes).unwrap();
    graph.upsert_edges(&edges).unwrap();

    let report = centrality::compute(&mut graph, &config()).unwrap();
    assert_eq!(report.hubs, 1);
    assert_eq!(
        phenotype(&graph, "HP:0000100").get(keys::IS_HUB),
        Some(&Value::Bool(true))
    );
    assert_eq!(
        phenotype(&graph, "HP:0000200").get(keys::IS_HUB),
        Some(&Value::Bool(false))
    );
}

#[test]
fn parent_in_same_batch() {
    let obo = "[Term]\nid: HP:0000001\nname: All\n\n[Term]\nid: HP:0000002\nname: Child\nis_a: HP:0000001 ! All\n";
    let mut graph = MemoryGraph::new();
    let mut pipeline = Pipeline::new(&mut graph, config()).unwrap();
    let report = pipeline.ingest_terms(OboTerms::new(obo.as_bytes().lines())).unwrap();
    assert_eq!(report.batches, 1);

    assert_eq!(graph.edge_count(EdgeKind::IsA), 1);
    assert!(graph
        .edge(EdgeKind::IsA, "HP:0000002", "HP:0000001")
        .is_some());
}

/// Rejects the `fail_on`th node upsert
struct FlakySink {
    inner: MemoryGraph,
    calls: usize,
    fail_on: usize,
}

impl GraphSink for FlakySink {
    fn upsert_nodes(&mut self, nodes: &[Node]) -> SinkResult<()> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(SinkError::Unavailable("connection reset".to_string()));
        }
        self.inner.upsert_nodes(nodes)
    }

    fn upsert_edges(&mut self, edges: &[Edge]) -> SinkResult<()> {
        self.inner.upsert_edges(edges)
    }

    fn nodes(&self, label: NodeLabel) -> SinkResult<Vec<Node>> {
        self.inner.nodes(label)
    }

    fn edges(&self, kind: EdgeKind) -> SinkResult<Vec<Edge>> {
        self.inner.edges(kind)
    }
}

#[test]
fn failed_batch_aborts_the_run() {
    let mut sink = FlakySink {
        inner: MemoryGraph::new(),
        calls: 0,
        fail_on: 2,
    };
    let res = Pipeline::new(&mut sink, config().batch_size(3))
        .unwrap()
        .run_files(OBO, HPOA);

    match res {
        Err(GraphError::Batch { batch, source }) => {
            assert_eq!(batch, 2);
            assert_eq!(source, SinkError::Unavailable("connection reset".to_string()));
        }
        other => panic!("expected a batch error, got {other:?}"),
    }
    assert_eq!(sink.inner.node_count(NodeLabel::Phenotype), 3);
    assert_eq!(sink.inner.node_count(NodeLabel::Disease), 0);
}

#[test]
fn dyn_sink() {
    let mut graph = MemoryGraph::new();
    {
        let sink: &mut dyn GraphSink = &mut graph;
        let mut pipeline = Pipeline::new(sink, config()).unwrap();
        pipeline.run_files(OBO, HPOA).unwrap();
    }
    assert_eq!(graph.node_count(NodeLabel::Disease), 6);
}

#[test]
fn query_index_of_fixtures() {
    let index = QueryIndex::from_files(OBO, HPOA).unwrap();
    assert_eq!(index.len(), 8);
    assert_eq!(
        index.ancestors("HP:0100543"),
        vec!["HP:0000001", "HP:0000118", "HP:0000707", "HP:0001263"]
    );
    assert_eq!(
        index.descendants("HP:0000707"),
        vec!["HP:0001250", "HP:0001263", "HP:0100543"]
    );
    assert_eq!(
        index.diseases_for_symptom("HP:0000505").to_vec(),
        vec!["OMIM:100001", "OMIM:100004", "ORPHA:1000"]
    );

    let related = index.related_symptoms("HP:0001250");
    assert_eq!(related.len(), 3);
    assert_eq!(related.get("HP:0001263"), Some(&4));
    assert_eq!(related.get("HP:0100543"), Some(&4));
    assert_eq!(related.get("HP:0000505"), Some(&2));
    assert_eq!(index.disease_name("ORPHA:1000"), Some("Zeta disease"));
}
