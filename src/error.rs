//! Typed failures of the analysis pipeline.
//!
//! These are the conditions callers are expected to branch on; everything
//! else travels as an [`anyhow::Error`] with context attached at the call
//! site.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Unsupported file type: '{extension}'. Use CSV, Excel, or JSON.")]
    UnsupportedFormat { extension: String },

    #[error("Dataset has no columns to analyze")]
    EmptyTable,

    #[error("No rows left after cleaning")]
    EmptyResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = AnalysisError::UnsupportedFormat {
            extension: ".parquet".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported file type: '.parquet'. Use CSV, Excel, or JSON."
        );
        assert_eq!(
            AnalysisError::EmptyResult.to_string(),
            "No rows left after cleaning"
        );
    }
}
