//! Parses `[Term]` blocks of an OBO file, e.g. `hp.obo`
//!
//! ```text
//! format-version: 1.2
//!
//! [Term]
//! id: HP:0000118
//! name: Phenotypic abnormality
//! def: "A phenotypic abnormality." [HPO:probinson]
//! synonym: "Organ abnormality" EXACT []
//! xref: UMLS:C4021819
//! is_a: HP:0000001 ! All
//!
//! [Typedef]
//! id: part_of
//! ```
use tracing::{trace, warn};

use crate::term::Term;
use crate::GraphResult;

const TERM_MARKER: &str = "[Term]";

/// The term block that is currently being parsed
///
/// Tracks which scalar keys were already seen, so that repeated
/// keys end up in [`Term::extra`] instead of overwriting the first value.
#[derive(Default)]
struct TermBlock {
    term: Term,
    has_id: bool,
    has_name: bool,
    has_def: bool,
    has_comment: bool,
}

impl TermBlock {
    fn add_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            trace!("Ignoring line without key: {}", line);
            return;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            trace!("Ignoring line without key: {}", line);
            return;
        }

        match key {
            "id" if !self.has_id => {
                self.term.set_id(value);
                self.has_id = true;
            }
            "name" if !self.has_name => {
                self.term.set_name(value);
                self.has_name = true;
            }
            "def" if !self.has_def => {
                self.term.set_definition(definition(value));
                self.has_def = true;
            }
            "comment" if !self.has_comment => {
                self.term.set_comment(value);
                self.has_comment = true;
            }
            "synonym" => self.term.add_synonym(value),
            "xref" => self.term.add_xref(value),
            "is_a" => {
                let parent = parent_id(value);
                if parent.is_empty() {
                    trace!("Ignoring empty is_a in {}", self.term.id());
                } else {
                    self.term.add_parent(parent);
                }
            }
            _ => self.term.add_extra(key, value),
        }
    }

    fn finish(self) -> Option<Term> {
        if self.has_id {
            Some(self.term)
        } else {
            warn!("Dropping term block without id: {:?}", self.term);
            None
        }
    }
}

/// Returns the quoted part of a `def` value
///
/// `"A phenotypic abnormality." [HPO:probinson]` becomes `A phenotypic abnormality.`
/// Values without quotes are returned unchanged.
fn definition(value: &str) -> &str {
    value.split('"').nth(1).unwrap_or(value)
}

/// Returns the ID of an `is_a` value
///
/// Trailing `! comments` and `{qualifier}` blocks are removed.
fn parent_id(value: &str) -> &str {
    value
        .split('!')
        .next()
        .and_then(|id| id.split_whitespace().next())
        .unwrap_or_default()
}

/// Lazy iterator of all [`Term`]s of an OBO source
///
/// The iterator consumes lines one by one and emits a [`Term`] whenever
/// a term block is complete, i.e. when the next stanza starts or the input
/// ends. Stanzas other than `[Term]` and the header are skipped.
///
/// Malformed lines are ignored, only failures of the underlying reader
/// are returned as errors.
///
/// # Examples
///
/// ```
/// use std::io::BufRead;
/// use phenograph::parser::OboTerms;
///
/// let obo = "[Term]\nid: HP:0000001\nname: All\n\n[Term]\nid: HP:0000118\nis_a: HP:0000001 ! All\n";
/// let terms: Vec<_> = OboTerms::new(obo.as_bytes().lines())
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(terms.len(), 2);
/// assert_eq!(terms[1].parents()[0], "HP:0000001");
/// ```
pub struct OboTerms<L> {
    lines: L,
    block: Option<TermBlock>,
}

impl<L> OboTerms<L>
where
    L: Iterator<Item = std::io::Result<String>>,
{
    /// Constructs a new parser from an iterator of lines
    pub fn new(lines: L) -> Self {
        Self { lines, block: None }
    }
}

impl<L> Iterator for OboTerms<L>
where
    L: Iterator<Item = std::io::Result<String>>,
{
    type Item = GraphResult<Term>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(line) = self.lines.next() else {
                // end of input closes the last block
                return self.block.take().and_then(TermBlock::finish).map(Ok);
            };
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            let line = line.trim();

            if line.starts_with('[') && line.ends_with(']') {
                let finished = self.block.take();
                if line == TERM_MARKER {
                    self.block = Some(TermBlock::default());
                } else {
                    trace!("Skipping stanza {}", line);
                }
                if let Some(term) = finished.and_then(TermBlock::finish) {
                    return Some(Ok(term));
                }
                continue;
            }

            if let Some(block) = self.block.as_mut() {
                block.add_line(line);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::BufRead;

    use super::*;
    use crate::TermId;

    fn parse(s: &str) -> Vec<Term> {
        OboTerms::new(s.as_bytes().lines())
            .collect::<GraphResult<Vec<Term>>>()
            .expect("in-memory input cannot fail")
    }

    #[test]
    fn last_term_without_trailing_marker() {
        let s = "[Term]\nid: HP:0000001\nname: All\n\n[Term]\nid: HP:0000002\nname: Abnormality of body height\nis_a: HP:0000001 ! All";
        let terms = parse(s);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].id(), "HP:0000001");
        assert_eq!(terms[1].id(), "HP:0000002");
        assert_eq!(terms[1].parents(), &[TermId::from("HP:0000001")]);
    }

    #[test]
    fn header_is_ignored() {
        let s = "format-version: 1.2\ndata-version: hp/releases/2024-01-16\nontology: hp\n\n[Term]\nid: HP:0000001\nname: All\n";
        let terms = parse(s);
        assert_eq!(terms.len(), 1);
        assert!(terms[0].extra().is_empty());
    }

    #[test]
    fn typedef_is_not_merged_into_term() {
        let s = "[Term]\nid: HP:0000001\nname: All\n\n[Typedef]\nid: part_of\nname: part of\nis_transitive: true\n";
        let terms = parse(s);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].name(), "All");
        assert!(terms[0].extra().is_empty());
    }

    #[test]
    fn term_after_typedef() {
        let s = "[Typedef]\nid: part_of\n\n[Term]\nid: HP:0000001\nname: All\n";
        let terms = parse(s);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id(), "HP:0000001");
    }

    #[test]
    fn multi_valued_keys() {
        let s = "[Term]\nid: HP:0000003\nname: Multicystic kidney dysplasia\nsynonym: \"Multicystic dysplastic kidney\" EXACT []\nsynonym: \"Multicystic kidneys\" EXACT []\nxref: SNOMEDCT_US:204962002\nxref: UMLS:C3714581\nis_a: HP:0000107 ! Renal cyst\nis_a: HP:0004719 ! Hyperechogenic kidney\n";
        let terms = parse(s);
        let term = &terms[0];
        assert_eq!(term.synonyms().len(), 2);
        assert_eq!(term.synonyms()[1], "\"Multicystic kidneys\" EXACT []");
        assert_eq!(term.xrefs(), &["SNOMEDCT_US:204962002", "UMLS:C3714581"]);
        assert_eq!(term.parents(), &[TermId::from("HP:0000107"), TermId::from("HP:0004719")]);
    }

    #[test]
    fn parent_with_qualifier_block() {
        let s = "[Term]\nid: HP:0000118\nis_a: HP:0000001 {source=\"x\"} ! All\nis_a: HP:0000002!Other\n";
        assert_eq!(
            parse(s)[0].parents(),
            &[TermId::from("HP:0000001"), TermId::from("HP:0000002")]
        );
    }

    #[test]
    fn definition_is_unquoted() {
        let s = "[Term]\nid: HP:0000118\ndef: \"A phenotypic abnormality.\" [HPO:probinson]\n";
        assert_eq!(parse(s)[0].definition(), "A phenotypic abnormality.");

        let s = "[Term]\nid: HP:0000118\ndef: no quotes here\n";
        assert_eq!(parse(s)[0].definition(), "no quotes here");
    }

    #[test]
    fn value_with_colons() {
        let s = "[Term]\nid: HP:0000118\ncomment: See: other terms\n";
        assert_eq!(parse(s)[0].comment(), "See: other terms");
    }

    #[test]
    fn repeated_scalar_and_unknown_keys() {
        let s = "[Term]\nid: HP:0000118\nname: First\nname: Second\nalt_id: HP:0000111\nalt_id: HP:0000112\n";
        let term = &parse(s)[0];
        assert_eq!(term.name(), "First");
        assert_eq!(
            term.extra(),
            &[
                ("name".to_string(), "Second".to_string()),
                ("alt_id".to_string(), "HP:0000111".to_string()),
                ("alt_id".to_string(), "HP:0000112".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let s = "[Term]\nid: HP:0000118\nthis line has no colon\n: no key\nname: Phenotypic abnormality\n";
        let terms = parse(s);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].name(), "Phenotypic abnormality");
        assert!(terms[0].extra().is_empty());
    }

    #[test]
    fn block_without_id_is_dropped() {
        let s = "[Term]\nname: Nameless\n\n[Term]\nid: HP:0000001\n";
        let terms = parse(s);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id(), "HP:0000001");
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("[Term]\n").is_empty());
    }

    #[test]
    fn windows_line_endings() {
        let s = "[Term]\r\nid: HP:0000001\r\nname: All\r\n";
        let terms = parse(s);
        assert_eq!(terms[0].id(), "HP:0000001");
        assert_eq!(terms[0].name(), "All");
    }
}
