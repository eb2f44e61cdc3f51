//! Parses disease - phenotype associations from `phenotype.hpoa`
//!
//! # Example lines
//!
//! ```text
//! #description: "HPO annotations for rare diseases [8181: OMIM; 47: DECIPHER; 4242 ORPHANET]"
//! database_id  disease_name  qualifier  hpo_id  reference  evidence  onset  frequency  sex  modifier  aspect  biocuration
//! OMIM:619340  Developmental and epileptic encephalopathy 96      HP:0011097  PMID:31675180  PCS  1/2  P  HPO:probinson[2021-06-21]
//! OMIM:609153  Pseudohyperkalemia                             NOT HP:0001878  PMID:2766660   PCS       P  HPO:lccarmody[2018-10-03]
//! ```
use tracing::trace;

use crate::term::Annotation;
use crate::GraphResult;

const MIN_COLUMNS: usize = 4;
// 0-based indices of the 6th, 9th and 10th column
const EVIDENCE_COL: usize = 5;
const FREQUENCY_COL: usize = 8;
const ONSET_COL: usize = 9;

/// Parses a single row
///
/// Returns `None` for comments, the column header and rows with
/// less than 4 columns.
fn parse_line(line: &str) -> Option<Annotation> {
    if line.starts_with('#') {
        return None;
    }
    let line = line.trim_end_matches(['\r', '\n']);
    let cols: Vec<&str> = line.split('\t').collect();

    if cols.len() < MIN_COLUMNS {
        trace!("Skipping short row: {}", line);
        return None;
    }
    if cols[0] == "database_id" {
        return None;
    }

    let col = |idx: usize| cols.get(idx).copied().unwrap_or_default().to_string();

    Some(Annotation {
        disease_id: cols[0].into(),
        disease_name: cols[1].to_string(),
        qualifier: cols[2].to_string(),
        phenotype_id: cols[3].into(),
        evidence: col(EVIDENCE_COL),
        frequency: col(FREQUENCY_COL),
        onset: col(ONSET_COL),
    })
}

/// Lazy iterator of all [`Annotation`]s of a `phenotype.hpoa` source
///
/// The first line is always treated as header and skipped.
///
/// # Examples
///
/// ```
/// use std::io::BufRead;
/// use phenograph::parser::HpoaRecords;
///
/// let hpoa = "#header\nOMIM:600171\tGonadal agenesis\t\tHP:0000055\tOMIM:600171\tTAS\nOMIM:600171\ttoo short\n";
/// let annotations: Vec<_> = HpoaRecords::new(hpoa.as_bytes().lines())
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(annotations.len(), 1);
/// assert_eq!(annotations[0].phenotype_id, "HP:0000055");
/// assert_eq!(annotations[0].evidence, "TAS");
/// ```
pub struct HpoaRecords<L> {
    lines: L,
    header_skipped: bool,
}

impl<L> HpoaRecords<L>
where
    L: Iterator<Item = std::io::Result<String>>,
{
    /// Constructs a new parser from an iterator of lines
    pub fn new(lines: L) -> Self {
        Self {
            lines,
            header_skipped: false,
        }
    }
}

impl<L> Iterator for HpoaRecords<L>
where
    L: Iterator<Item = std::io::Result<String>>,
{
    type Item = GraphResult<Annotation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if !self.header_skipped {
                self.header_skipped = true;
                continue;
            }
            if let Some(annotation) = parse_line(&line) {
                return Some(Ok(annotation));
            }
        }
    }
}
