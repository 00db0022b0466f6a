//! Report artifact storage
//!
//! Composes artifact paths from the fixed two-level convention
//! `<base>/<subject>_reports/<experiment>_final_report.png`, creates
//! subject directories on demand, and lists existing artifacts. Reports
//! are not versioned: regenerating the same (experiment, subject) pair
//! silently replaces the prior file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::error::Result;

/// Default base directory for report artifacts
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Closed set of subject tags reports are filed under
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Ela,
}

impl Subject {
    /// Every known subject, in display order
    pub const ALL: [Subject; 2] = [Subject::Math, Subject::Ela];

    /// The tag used in directory names
    pub fn tag(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Ela => "ela",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Filesystem store for rendered report images
#[derive(Debug, Clone)]
pub struct ReportStore {
    base_dir: PathBuf,
}

impl ReportStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding one subject's reports
    pub fn subject_dir(&self, subject: Subject) -> PathBuf {
        self.base_dir.join(format!("{}_reports", subject.tag()))
    }

    /// Deterministic artifact path for an (experiment, subject) pair.
    /// Writing to it overwrites any previous report for the same pair.
    pub fn report_path(&self, subject: Subject, experiment: &str) -> PathBuf {
        self.subject_dir(subject)
            .join(format!("{experiment}_final_report.png"))
    }

    /// Create the subject directory if absent and return the artifact
    /// path the renderer should write to.
    pub fn prepare(&self, subject: Subject, experiment: &str) -> Result<PathBuf> {
        let dir = self.subject_dir(subject);
        fs::create_dir_all(&dir)?;
        let path = self.report_path(subject, experiment);
        debug!(path = %path.display(), "prepared report path");
        Ok(path)
    }

    /// Existing artifacts for a subject in reverse lexicographic
    /// filename order. With the fixed suffix this approximates
    /// most-recent-experiment-name-first, not most-recent-in-time.
    /// A missing subject directory yields an empty list.
    pub fn list(&self, subject: Subject) -> Result<Vec<PathBuf>> {
        let dir = self.subject_dir(subject);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort_by(|a, b| b.cmp(a));

        Ok(names.into_iter().map(|n| dir.join(n)).collect())
    }

    /// The configured base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
