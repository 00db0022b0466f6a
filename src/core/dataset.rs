//! Graded-assessment dataset ingestion
//!
//! Reads the delimited log of AI-graded assessments into memory. Column
//! names (including casing and spacing) are an exact contract with the
//! producer; numeric-looking fields stay raw strings here and are
//! coerced explicitly where the pipeline needs them, because missing
//! values carry different meanings for cost and for latency.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::utils::error::{ReportError, Result};

/// Columns that must be present in the input file
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "experiment_name",
    "prompt_tokens",
    "completion_tokens",
    "latency",
    "Assessment Name",
    "Student Name",
    "AI Grade",
    "category",
];

/// One row of the graded-assessment log
#[derive(Debug, Clone, Deserialize)]
pub struct GradedRecord {
    pub experiment_name: String,
    #[serde(default)]
    pub prompt_tokens: String,
    #[serde(default)]
    pub completion_tokens: String,
    #[serde(default)]
    pub latency: String,
    #[serde(rename = "Assessment Name", default)]
    pub assessment_name: String,
    #[serde(rename = "Student Name", default)]
    pub student_name: String,
    #[serde(rename = "AI Grade", default)]
    pub ai_grade: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// An immutable, ordered sequence of graded records
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<GradedRecord>,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading dataset");
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a dataset from any reader producing CSV with a header row.
    ///
    /// The header is validated before any row is deserialized: the first
    /// missing required column aborts the load with `MissingColumn`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ReportError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }

        let mut records = Vec::new();
        for row in csv_reader.deserialize() {
            let record: GradedRecord = row?;
            records.push(record);
        }
        debug!(rows = records.len(), "dataset loaded");

        Ok(Self { records })
    }

    /// All records in original file order
    pub fn records(&self) -> &[GradedRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct non-empty experiment identifiers
    pub fn experiment_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.experiment_name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// First non-empty `model` value among the experiment's rows, in
    /// original row order. `None` when the column is absent or empty
    /// for every matching row.
    pub fn detect_model(&self, experiment: &str) -> Option<String> {
        self.records
            .iter()
            .filter(|r| r.experiment_name == experiment)
            .filter_map(|r| r.model.as_deref())
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(str::to_string)
    }
}

/// Coerce a raw field to a numeric value.
///
/// Empty or unparsable input is `None`, never zero: the caller decides
/// whether a missing value defaults to 0 (token costs) or excludes the
/// row (latency statistics).
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "experiment_name,prompt_tokens,completion_tokens,latency,\
                          Assessment Name,Student Name,AI Grade,category,model";

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n\
             expA,100,50,1.5,Q1,S1,B,aligned,gpt-4o\n\
             expA,200,80,2.0,Q1,S2,A,lenient,gpt-4o\n\
             expB,10,5,0.3,Q2,S1,C,strict,\n"
        )
    }

    #[test]
    fn test_load_and_order() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records()[0].student_name, "S1");
        assert_eq!(dataset.records()[1].ai_grade, "A");
        assert_eq!(dataset.records()[2].experiment_name, "expB");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "experiment_name,prompt_tokens,completion_tokens,latency,\
                   Assessment Name,Student Name,category\n\
                   expA,1,2,0.5,Q1,S1,aligned\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            ReportError::MissingColumn { column } => assert_eq!(column, "AI Grade"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_first_missing_column_reported() {
        let csv = "prompt_tokens,completion_tokens\n1,2\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            ReportError::MissingColumn { column } => assert_eq!(column, "experiment_name"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_experiment_names_sorted_distinct() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.experiment_names(), vec!["expA", "expB"]);
    }

    #[test]
    fn test_detect_model_first_non_empty_in_row_order() {
        let csv = format!(
            "{HEADER}\n\
             expA,1,1,0.1,Q1,S1,B,aligned,\n\
             expA,1,1,0.1,Q1,S2,B,aligned,gpt-4o-mini\n\
             expA,1,1,0.1,Q1,S3,B,aligned,gpt-4o\n"
        );
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.detect_model("expA").as_deref(), Some("gpt-4o-mini"));
        assert_eq!(dataset.detect_model("expB"), None);
    }

    #[test]
    fn test_detect_model_without_model_column() {
        let csv = "experiment_name,prompt_tokens,completion_tokens,latency,\
                   Assessment Name,Student Name,AI Grade,category\n\
                   expA,1,2,0.5,Q1,S1,B,aligned\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.detect_model("expA"), None);
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_numeric("42"), Some(42.0));
        assert_eq!(coerce_numeric(" 3.5 "), Some(3.5));
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("N/A"), None);
        assert_eq!(coerce_numeric("nan"), None);
        assert_eq!(coerce_numeric("inf"), None);
    }
}
