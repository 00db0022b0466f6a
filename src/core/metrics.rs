//! Metrics pipeline
//!
//! Pure computation turning a dataset, an experiment filter, and a pair
//! of per-token costs into the report's numeric facts plus the series
//! behind the four chart panels. Nothing here touches the filesystem or
//! mutates the source dataset.
//!
//! Missing-value policy, applied per call site:
//! - token counts that fail coercion count as 0 toward costs and totals
//! - latency values that fail coercion are excluded from the statistics
//!   and the histogram
//!
//! The two rules differ on purpose; collapsing them changes totals and
//! distributions in different ways.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::config::pricing::PerTokenCost;
use crate::core::dataset::{Dataset, GradedRecord, coerce_numeric};
use crate::utils::error::{ReportError, Result};

/// Number of bins in the latency histogram panel
pub const LATENCY_BINS: usize = 20;

/// Agreement categories recognized in the breakdown. Anything else
/// stays in the percentage base but gets no slice of its own.
pub const AGREEMENT_CATEGORIES: [&str; 3] = ["aligned", "lenient", "strict"];

/// Latency statistics over rows with a numeric latency value.
///
/// All three are `None` when no row qualifies; rendering shows "N/A"
/// instead of failing on an empty-set mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl LatencyStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                avg: None,
                min: None,
                max: None,
            };
        }
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            avg: Some(round_to(sum / values.len() as f64, 2)),
            min: Some(round_to(min, 2)),
            max: Some(round_to(max, 2)),
        }
    }

    /// "avg / min / max" with seconds suffix, `N/A` when undefined
    pub fn display(&self) -> String {
        let fmt = |v: Option<f64>| match v {
            Some(v) => format!("{v}s"),
            None => "N/A".to_string(),
        };
        format!(
            "{} / {} / {}",
            fmt(self.avg),
            fmt(self.min),
            fmt(self.max)
        )
    }
}

/// Distribution of non-missing latency values over equal-width bins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyHistogram {
    /// Left edge of the first bin
    pub start: f64,
    /// Width of every bin
    pub bin_width: f64,
    /// Occupancy per bin
    pub counts: Vec<u64>,
}

impl LatencyHistogram {
    /// Bin `values` into `bins` equal-width buckets spanning min..max.
    /// A degenerate range (all values equal) is widened by ±0.5 so the
    /// single spike still lands in a real bin.
    fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let bin_width = (hi - lo) / bins as f64;

        let mut counts = vec![0u64; bins];
        for &value in values {
            let mut index = ((value - lo) / bin_width) as usize;
            // the maximum value falls in the last bin, not past it
            if index >= bins {
                index = bins - 1;
            }
            counts[index] += 1;
        }

        Some(Self {
            start: lo,
            bin_width,
            counts,
        })
    }

    /// Right edge of the last bin
    pub fn end(&self) -> f64 {
        self.start + self.bin_width * self.counts.len() as f64
    }

    /// Largest bin occupancy
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// The report's numeric facts for one experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub experiment: String,
    /// Rows matching the experiment filter
    pub row_count: usize,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    /// Sum of per-row costs, rounded once to 4 decimal places
    pub total_cost_usd: f64,
    pub latency: LatencyStats,
    /// Percentage of (experiment, assessment, student) groups with
    /// exactly one distinct AI grade
    pub consistency_pct: f64,
    pub aligned_pct: f64,
    pub lenient_pct: f64,
    pub strict_pct: f64,
}

/// A labelled slice of the agreement pie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub pct: f64,
}

/// One bar of the consistency comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarEntry {
    pub label: String,
    pub pct: f64,
}

/// Metrics record plus the plot-ready series for the four panels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFigures {
    pub metrics: ReportMetrics,
    /// Pie panel: aligned / lenient / strict percentages
    pub agreement: Vec<PieSlice>,
    /// Bar panel: consistent vs inconsistent percentages
    pub consistency: Vec<BarEntry>,
    /// Histogram panel; `None` when no row has a numeric latency
    pub latency_histogram: Option<LatencyHistogram>,
}

/// Compute the metrics record and chart series for one experiment.
///
/// The dataset is read-only; filtering preserves original row order.
/// An empty filter result is the soft `NoDataForExperiment` condition.
pub fn compute_metrics(
    dataset: &Dataset,
    experiment: &str,
    cost: &PerTokenCost,
) -> Result<ReportFigures> {
    let rows: Vec<&GradedRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.experiment_name == experiment)
        .collect();

    if rows.is_empty() {
        return Err(ReportError::NoDataForExperiment {
            experiment: experiment.to_string(),
        });
    }
    debug!(experiment, rows = rows.len(), "computing metrics");

    // Token totals and cost. Missing counts default to 0 so a row with
    // one unparsable field still contributes the other side's cost.
    let mut prompt_sum = 0.0;
    let mut completion_sum = 0.0;
    let mut cost_sum = 0.0;
    for row in &rows {
        let prompt = coerce_numeric(&row.prompt_tokens).unwrap_or(0.0);
        let completion = coerce_numeric(&row.completion_tokens).unwrap_or(0.0);
        prompt_sum += prompt;
        completion_sum += completion;
        cost_sum += prompt * cost.prompt + completion * cost.completion;
    }
    // truncate to integers only at the final sum
    let total_prompt_tokens = prompt_sum as u64;
    let total_completion_tokens = completion_sum as u64;
    let total_cost_usd = round_to(cost_sum, 4);

    // Latency: rows without a numeric value are excluded, not zeroed.
    let latencies: Vec<f64> = rows
        .iter()
        .filter_map(|r| coerce_numeric(&r.latency))
        .collect();
    let latency = LatencyStats::from_values(&latencies);
    let latency_histogram = LatencyHistogram::from_values(&latencies, LATENCY_BINS);

    let consistency_pct = consistency_percentage(&rows);

    let total = rows.len() as f64;
    let category_pct = |category: &str| {
        let count = rows.iter().filter(|r| r.category == category).count();
        round_to(100.0 * count as f64 / total, 2)
    };
    let aligned_pct = category_pct("aligned");
    let lenient_pct = category_pct("lenient");
    let strict_pct = category_pct("strict");

    let metrics = ReportMetrics {
        experiment: experiment.to_string(),
        row_count: rows.len(),
        total_prompt_tokens,
        total_completion_tokens,
        total_cost_usd,
        latency,
        consistency_pct,
        aligned_pct,
        lenient_pct,
        strict_pct,
    };

    let agreement = AGREEMENT_CATEGORIES
        .iter()
        .zip([aligned_pct, lenient_pct, strict_pct])
        .map(|(label, pct)| PieSlice {
            label: capitalize(label),
            pct,
        })
        .collect();

    let consistency = vec![
        BarEntry {
            label: "Consistent".to_string(),
            pct: consistency_pct,
        },
        BarEntry {
            label: "Inconsistent".to_string(),
            pct: round_to(100.0 - consistency_pct, 2),
        },
    ];

    Ok(ReportFigures {
        metrics,
        agreement,
        consistency,
        latency_histogram,
    })
}

/// Group rows by (experiment, assessment, student) — a structured key,
/// immune to delimiter collisions in student names — and report the
/// percentage of groups with exactly one distinct AI grade. Rows with
/// an empty grade contribute no distinct value, so an all-empty group
/// counts as inconsistent.
fn consistency_percentage(rows: &[&GradedRecord]) -> f64 {
    let mut groups: HashMap<(&str, &str, &str), HashSet<&str>> = HashMap::new();
    for row in rows {
        let key = (
            row.experiment_name.as_str(),
            row.assessment_name.as_str(),
            row.student_name.as_str(),
        );
        let grades = groups.entry(key).or_default();
        if !row.ai_grade.is_empty() {
            grades.insert(row.ai_grade.as_str());
        }
    }

    let total_groups = groups.len();
    if total_groups == 0 {
        // unreachable given the empty-filter guard, but never divide by zero
        return 0.0;
    }
    let consistent = groups.values().filter(|g| g.len() == 1).count();
    round_to(100.0 * consistent as f64 / total_groups as f64, 2)
}

/// Round to `places` decimal places, applied once per published figure
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
