//! Parsing the HPO master data provided by Jax
//!
//! - [`OboTerms`] reads the ontology terms from `hp.obo`
//! - [`HpoaRecords`] reads the disease - phenotype associations from `phenotype.hpoa`
//!
//! Both parsers work on any iterator of lines, so they can be used with files,
//! network streams or in-memory strings alike.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::{GraphError, GraphResult};

/// Module to parse `phenotype.hpoa` file
pub mod hpoa;
/// Module to parse `hp.obo` file
pub mod obo;

pub use hpoa::HpoaRecords;
pub use obo::OboTerms;

/// Line iterator of a buffered file
pub type FileLines = Lines<BufReader<File>>;

/// Opens a file for line-wise reading
///
/// # Errors
///
/// [`GraphError::CannotOpenFile`]: Source file not present or can't be opened
pub fn open_lines<P: AsRef<Path>>(file: P) -> GraphResult<FileLines> {
    let filename = file.as_ref().display().to_string();
    let file = File::open(file).map_err(|_| GraphError::CannotOpenFile(filename))?;
    Ok(BufReader::new(file).lines())
}

/// Returns a lazy iterator of all terms of an OBO file
///
/// # Errors
///
/// [`GraphError::CannotOpenFile`]: Source file not present or can't be opened
pub fn read_obo_file<P: AsRef<Path>>(file: P) -> GraphResult<OboTerms<FileLines>> {
    open_lines(file).map(OboTerms::new)
}

/// Returns a lazy iterator of all annotations of a `phenotype.hpoa` file
///
/// # Errors
///
/// [`GraphError::CannotOpenFile`]: Source file not present or can't be opened
pub fn read_hpoa_file<P: AsRef<Path>>(file: P) -> GraphResult<HpoaRecords<FileLines>> {
    open_lines(file).map(HpoaRecords::new)
}
