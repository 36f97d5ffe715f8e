//! Error taxonomy of the pipeline.

use crate::models::Category;
use std::io;
use thiserror::Error;

/// Failures a pipeline run can end with.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No input files supplied for {0}")]
    NoInput(Category),
    #[error("Summary needs every category analyzed first; missing: {}", join(missing))]
    MissingPrerequisite { missing: Vec<Category> },
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("Workbook export failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn join(categories: &[Category]) -> String {
    categories
        .iter()
        .map(Category::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
