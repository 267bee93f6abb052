// src/error.rs
use serde::Serialize;
use thiserror::Error;

/// Failures scoped to a single file or a single pipeline stage.
///
/// None of these are fatal to the process: decoding/parsing errors stay attached to
/// the offending file, role/column errors abort only the stage that needed them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineError {
    #[error("could not decode {file} with any of: {}", .tried.join(", "))]
    Decoding { file: String, tried: Vec<String> },

    #[error("could not read {file}: {message}")]
    Io { file: String, message: String },

    /// Maps the `csv` reader's own error. `parse_csv` reads already-decoded text with
    /// flexible record lengths, so in practice the reader never returns one.
    #[error("CSV parse error in {file} at record {record}: {message}")]
    Csv {
        file: String,
        record: usize,
        message: String,
    },

    #[error(
        "required file(s) not found: {}; available files: [{}]; expected names containing \
         'lines_with_low' + 'call_volume' and 'rooftop_information'",
        .missing.join(", "),
        .available.join(", ")
    )]
    MissingRoleFile {
        available: Vec<String>,
        missing: Vec<String>,
    },

    #[error("could not find column(s) {} in {file}; found headers: {headers:?}", .fields.join(", "))]
    MissingColumn {
        file: String,
        fields: Vec<String>,
        headers: Vec<String>,
    },

    #[error("row {row} has {found} cell(s), needs more than {needed}")]
    RowShape {
        row: usize,
        needed: usize,
        found: usize,
    },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
