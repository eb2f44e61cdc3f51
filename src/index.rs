//! In-memory index for ad-hoc queries without a graph store
//!
//! [`QueryIndex`] is built from the same sources as the graph and answers
//! hierarchy and co-occurrence questions directly.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::path::Path;

use tracing::debug;

use crate::parser::{read_hpoa_file, read_obo_file};
use crate::term::{Annotation, DiseaseId, Term, TermId};
use crate::GraphResult;

/// Inserts into a sorted vector, keeping it free of duplicates
fn insert_sorted<T: Ord>(ids: &mut Vec<T>, id: T) -> bool {
    match ids.binary_search(&id) {
        Ok(_) => false,
        Err(idx) => {
            ids.insert(idx, id);
            true
        }
    }
}

fn lookup<'a, K, Q, V>(map: &'a HashMap<K, Vec<V>>, key: &Q) -> &'a [V]
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    map.get(key).map(Vec::as_slice).unwrap_or_default()
}

/// Terms, hierarchy and disease associations held in memory
///
/// All lookups are by ID string. Unknown IDs yield empty results.
///
/// # Examples
///
/// ```
/// use phenograph::{Annotation, QueryIndex, Term};
///
/// let mut index = QueryIndex::default();
/// let mut child = Term::new("HP:0000118", "Phenotypic abnormality");
/// child.add_parent("HP:0000001");
/// index.add_term(Term::new("HP:0000001", "All"));
/// index.add_term(child);
///
/// index.add_annotation(&Annotation {
///     disease_id: "OMIM:1".into(),
///     phenotype_id: "HP:0000118".into(),
///     ..Default::default()
/// });
///
/// assert_eq!(index.ancestors("HP:0000118"), vec!["HP:0000001"]);
/// assert_eq!(index.descendants("HP:0000001"), vec!["HP:0000118"]);
/// assert_eq!(index.symptoms_for_disease("OMIM:1").len(), 1);
/// assert!(index.ancestors("HP:9999999").is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct QueryIndex {
    terms: HashMap<TermId, Term>,
    parents: HashMap<TermId, Vec<TermId>>,
    children: HashMap<TermId, Vec<TermId>>,
    disease_names: HashMap<DiseaseId, String>,
    symptoms: HashMap<DiseaseId, Vec<TermId>>,
    diseases: HashMap<TermId, Vec<DiseaseId>>,
}

impl QueryIndex {
    /// Builds the index from an `hp.obo` and a `phenotype.hpoa` file
    ///
    /// # Errors
    ///
    /// - [`GraphError::CannotOpenFile`](`crate::GraphError::CannotOpenFile`): a file is missing
    /// - [`GraphError::Io`](`crate::GraphError::Io`): a file cannot be read
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(obo: P, hpoa: Q) -> GraphResult<Self> {
        Self::from_records(read_obo_file(obo)?, read_hpoa_file(hpoa)?)
    }

    /// Builds the index from parsed terms and annotations
    ///
    /// # Errors
    ///
    /// Returns the first error of either source
    pub fn from_records<T, A>(terms: T, annotations: A) -> GraphResult<Self>
    where
        T: IntoIterator<Item = GraphResult<Term>>,
        A: IntoIterator<Item = GraphResult<Annotation>>,
    {
        let mut index = Self::default();
        for term in terms {
            index.add_term(term?);
        }
        for annotation in annotations {
            index.add_annotation(&annotation?);
        }
        debug!(
            "Indexed {} terms and {} diseases",
            index.terms.len(),
            index.symptoms.len()
        );
        Ok(index)
    }

    /// Adds a term and links it to its parents
    ///
    /// Parents don't have to be known yet.
    pub fn add_term(&mut self, term: Term) {
        for parent in term.parents() {
            insert_sorted(
                self.parents.entry(term.id().clone()).or_default(),
                parent.clone(),
            );
            insert_sorted(
                self.children.entry(parent.clone()).or_default(),
                term.id().clone(),
            );
        }
        self.terms.insert(term.id().clone(), term);
    }

    /// Links a disease and a phenotype
    pub fn add_annotation(&mut self, annotation: &Annotation) {
        self.disease_names
            .entry(annotation.disease_id.clone())
            .or_insert_with(|| annotation.disease_name.clone());
        insert_sorted(
            self.symptoms
                .entry(annotation.disease_id.clone())
                .or_default(),
            annotation.phenotype_id.clone(),
        );
        insert_sorted(
            self.diseases
                .entry(annotation.phenotype_id.clone())
                .or_default(),
            annotation.disease_id.clone(),
        );
    }

    /// Returns the number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the index contains no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the term with the given ID
    pub fn term(&self, id: &str) -> Option<&Term> {
        self.terms.get(id)
    }

    /// Returns the name of a disease
    pub fn disease_name(&self, id: &str) -> Option<&str> {
        self.disease_names.get(id).map(String::as_str)
    }

    /// The direct parents of a term, sorted
    pub fn parents(&self, id: &str) -> &[TermId] {
        lookup(&self.parents, id)
    }

    /// The direct children of a term, sorted
    pub fn children(&self, id: &str) -> &[TermId] {
        lookup(&self.children, id)
    }

    /// All terms reachable via `is_a`, sorted
    pub fn ancestors(&self, id: &str) -> Vec<TermId> {
        traverse(id, &self.parents)
    }

    /// All terms that have the given term as ancestor, sorted
    pub fn descendants(&self, id: &str) -> Vec<TermId> {
        traverse(id, &self.children)
    }

    /// All diseases with the phenotype, sorted
    pub fn diseases_for_symptom(&self, id: &str) -> &[DiseaseId] {
        lookup(&self.diseases, id)
    }

    /// All phenotypes of the disease, sorted
    pub fn symptoms_for_disease(&self, id: &str) -> &[TermId] {
        lookup(&self.symptoms, id)
    }

    /// Counts in how many diseases every other phenotype co-occurs with `id`
    pub fn related_symptoms(&self, id: &str) -> BTreeMap<TermId, usize> {
        let mut related: BTreeMap<TermId, usize> = BTreeMap::new();
        for disease in self.diseases_for_symptom(id) {
            for symptom in self.symptoms_for_disease(disease.as_str()) {
                if symptom != id {
                    *related.entry(symptom.clone()).or_default() += 1;
                }
            }
        }
        related
    }
}

/// Collects all nodes reachable from `start`, without `start` itself
fn traverse(start: &str, adjacency: &HashMap<TermId, Vec<TermId>>) -> Vec<TermId> {
    let mut found: Vec<TermId> = Vec::new();
    let mut stack: Vec<&TermId> = lookup(adjacency, start).iter().collect();
    while let Some(id) = stack.pop() {
        if id == start || !insert_sorted(&mut found, id.clone()) {
            continue;
        }
        stack.extend(lookup(adjacency, id.as_str()));
    }
    found
}

#[cfg(test)]
mod test {
    use super::*;

    fn term(id: &str, parents: &[&str]) -> Term {
        let mut term = Term::new(id, id);
        for parent in parents {
            term.add_parent(*parent);
        }
        term
    }

    fn annotation(disease: &str, phenotype: &str) -> Annotation {
        Annotation {
            disease_id: disease.into(),
            disease_name: disease.to_lowercase(),
            phenotype_id: phenotype.into(),
            ..Default::default()
        }
    }

    fn index() -> QueryIndex {
        // 1 <- 2 <- 4
        // 1 <- 3 <- 4 <- 5
        let mut index = QueryIndex::default();
        index.add_term(term("HP:5", &["HP:4"]));
        index.add_term(term("HP:4", &["HP:2", "HP:3"]));
        index.add_term(term("HP:3", &["HP:1"]));
        index.add_term(term("HP:2", &["HP:1"]));
        index.add_term(term("HP:1", &[]));
        for (disease, phenotype) in [
            ("OMIM:1", "HP:4"),
            ("OMIM:1", "HP:5"),
            ("OMIM:2", "HP:4"),
            ("OMIM:2", "HP:5"),
            ("OMIM:2", "HP:2"),
            ("OMIM:2", "HP:2"),
        ] {
            index.add_annotation(&annotation(disease, phenotype));
        }
        index
    }

    #[test]
    fn hierarchy() {
        let index = index();
        assert_eq!(index.len(), 5);
        assert_eq!(
            index.parents("HP:4").to_vec(),
            vec![TermId::from("HP:2"), TermId::from("HP:3")]
        );
        assert_eq!(index.ancestors("HP:5"), vec!["HP:1", "HP:2", "HP:3", "HP:4"]);
        assert_eq!(index.descendants("HP:1"), vec!["HP:2", "HP:3", "HP:4", "HP:5"]);
        assert_eq!(index.descendants("HP:3"), vec!["HP:4", "HP:5"]);
        assert!(index.ancestors("HP:1").is_empty());
        assert!(index.descendants("HP:5").is_empty());
    }

    #[test]
    fn cyclic_hierarchy() {
        let mut index = QueryIndex::default();
        index.add_term(term("HP:1", &["HP:2"]));
        index.add_term(term("HP:2", &["HP:1"]));
        assert_eq!(index.ancestors("HP:1"), vec!["HP:2"]);
        assert_eq!(index.descendants("HP:1"), vec!["HP:2"]);
    }

    #[test]
    fn unknown_ids() {
        let index = index();
        assert!(index.term("HP:9").is_none());
        assert!(index.ancestors("HP:9").is_empty());
        assert!(index.descendants("foo").is_empty());
        assert!(index.diseases_for_symptom("HP:9").is_empty());
        assert!(index.symptoms_for_disease("OMIM:9").is_empty());
        assert!(index.related_symptoms("HP:9").is_empty());
    }

    #[test]
    fn disease_lookups() {
        let index = index();
        assert_eq!(index.symptoms_for_disease("OMIM:2").len(), 3);
        assert_eq!(index.diseases_for_symptom("HP:4").len(), 2);
        assert_eq!(index.disease_name("OMIM:1"), Some("omim:1"));
    }

    #[test]
    fn related() {
        let related = index().related_symptoms("HP:4");
        assert_eq!(related.len(), 2);
        assert_eq!(related.get("HP:5"), Some(&2));
        assert_eq!(related.get("HP:2"), Some(&1));
        assert!(related.get("HP:4").is_none());
    }
}
