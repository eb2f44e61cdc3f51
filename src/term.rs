//! Records produced by the parsers: ontology [`Term`]s and disease [`Annotation`]s

use smallvec::SmallVec;

use crate::DEFAULT_NUM_PARENTS;

pub mod category;
mod termid;

pub use category::{CategoryRule, CategoryRules};
pub use termid::{DiseaseId, TermId};

/// The direct `is_a` parents of a term
///
/// Most HPO terms have one or two parents, so they are stored inline.
pub type Parents = SmallVec<[TermId; DEFAULT_NUM_PARENTS]>;

/// A single `[Term]` record of an OBO file
///
/// Only the keys needed downstream are modeled as fields. Every other
/// `key: value` pair of the block is kept in order in [`Term::extra`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Term {
    id: TermId,
    name: String,
    definition: String,
    comment: String,
    synonyms: Vec<String>,
    xrefs: Vec<String>,
    parents: Parents,
    extra: Vec<(String, String)>,
}

impl Term {
    /// Constructs a new term without parents or any other attributes
    pub fn new<I: Into<TermId>>(id: I, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns the [`TermId`] of the term
    pub fn id(&self) -> &TermId {
        &self.id
    }

    /// Returns the name of the term
    ///
    /// e.g.: `Abnormality of the nervous system`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The definition text, without the quotes and references of the `def` line
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// The free-text comment of the term
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// All synonyms, in the order of the source file
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    /// All cross-references, in the order of the source file
    pub fn xrefs(&self) -> &[String] {
        &self.xrefs
    }

    /// The IDs of the direct `is_a` parents
    pub fn parents(&self) -> &[TermId] {
        &self.parents
    }

    /// Key/value pairs of the OBO block that have no dedicated field
    pub fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Adds a direct `is_a` parent
    pub fn add_parent<I: Into<TermId>>(&mut self, parent: I) {
        self.parents.push(parent.into());
    }

    /// Adds a synonym
    pub fn add_synonym(&mut self, synonym: &str) {
        self.synonyms.push(synonym.to_string());
    }

    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = id.into();
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn set_definition(&mut self, definition: &str) {
        self.definition = definition.to_string();
    }

    pub(crate) fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_string();
    }

    pub(crate) fn add_xref(&mut self, xref: &str) {
        self.xrefs.push(xref.to_string());
    }

    pub(crate) fn add_extra(&mut self, key: &str, value: &str) {
        self.extra.push((key.to_string(), value.to_string()));
    }
}

/// A single disease - phenotype association of a `phenotype.hpoa` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// e.g. `OMIM:619340`
    pub disease_id: DiseaseId,
    /// e.g. `Developmental and epileptic encephalopathy 96`
    pub disease_name: String,
    /// `NOT` for explicitly excluded phenotypes, empty otherwise
    pub qualifier: String,
    /// The annotated phenotype term
    pub phenotype_id: TermId,
    /// Column 6, the evidence code, e.g. `PCS` or `TAS`
    pub evidence: String,
    /// Column 9 of the row, empty if missing
    ///
    /// This is the `sex` column in current `phenotype.hpoa` releases
    /// (e.g. `FEMALE`), the frequency (e.g. `1/2`) is in column 8.
    pub frequency: String,
    /// Column 10 of the row, empty if missing
    ///
    /// This is the `modifier` column in current `phenotype.hpoa` releases
    /// (e.g. `HP:0025303`), the onset is in column 7.
    pub onset: String,
}

impl Annotation {
    /// Returns `true` if the annotation states the absence of the phenotype
    pub fn is_negated(&self) -> bool {
        self.qualifier == "NOT"
    }
}
