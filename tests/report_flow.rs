//! End-to-end flow: CSV ingestion -> pricing -> metrics -> artifact path.
//!
//! The renderer itself is exercised through the library API in normal
//! use; here the artifact contract is verified with stub bytes so the
//! suite stays independent of the host's font configuration.

use std::fs;

use grading_report::{
    Dataset, PricingTable, ReportError, ReportStore, Subject, compute_metrics,
};

const HEADER: &str = "experiment_name,prompt_tokens,completion_tokens,latency,\
                      Assessment Name,Student Name,AI Grade,category,model";

fn write_sample_csv(dir: &std::path::Path) -> std::path::PathBuf {
    let csv = format!(
        "{HEADER}\n\
         run_01,1200,400,1.8,Essay Q1,Ada,B,aligned,gpt-4o-mini\n\
         run_01,1100,380,2.2,Essay Q1,Ada,B,aligned,gpt-4o-mini\n\
         run_01,900,300,1.4,Essay Q1,Grace,A,lenient,gpt-4o-mini\n\
         run_01,N/A,500,,Essay Q2,Ada,C,other,gpt-4o-mini\n\
         run_02,10,5,0.5,Essay Q1,Ada,A,strict,gpt-4o\n"
    );
    let path = dir.join("graded_data.csv");
    fs::write(&path, csv).unwrap();
    path
}

#[test]
fn csv_to_metrics_full_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_sample_csv(tmp.path());

    let dataset = Dataset::from_csv_path(&input).unwrap();
    assert_eq!(dataset.experiment_names(), vec!["run_01", "run_02"]);
    assert_eq!(
        dataset.detect_model("run_01").as_deref(),
        Some("gpt-4o-mini")
    );

    let pricing = PricingTable::builtin();
    let cost = pricing.lookup("gpt-4o-mini").unwrap();

    let figures = compute_metrics(&dataset, "run_01", &cost).unwrap();
    let m = &figures.metrics;

    assert_eq!(m.row_count, 4);
    // the N/A prompt count defaults to 0 in the totals
    assert_eq!(m.total_prompt_tokens, 3200);
    assert_eq!(m.total_completion_tokens, 1580);
    // 3200 * 0.15/1e6 + 1580 * 0.60/1e6, rounded to 4 decimals
    assert!((m.total_cost_usd - 0.0014).abs() < 1e-12);

    // the missing latency row is excluded from the statistics
    assert_eq!(m.latency.avg, Some(1.8));
    assert_eq!(m.latency.min, Some(1.4));
    assert_eq!(m.latency.max, Some(2.2));

    // groups: (Q1, Ada) {B}, (Q1, Grace) {A}, (Q2, Ada) {C} -> all consistent
    assert_eq!(m.consistency_pct, 100.0);

    assert_eq!(m.aligned_pct, 50.0);
    assert_eq!(m.lenient_pct, 25.0);
    assert_eq!(m.strict_pct, 0.0);

    let hist = figures.latency_histogram.as_ref().unwrap();
    assert_eq!(hist.counts.iter().sum::<u64>(), 3);
}

#[test]
fn unknown_model_blocks_cost_computation() {
    let pricing = PricingTable::builtin();
    let err = pricing.lookup("gpt-imaginary").unwrap_err();
    match err {
        ReportError::UnknownModel { model, valid } => {
            assert_eq!(model, "gpt-imaginary");
            assert!(valid.contains(&"gpt-4o".to_string()));
        }
        other => panic!("expected UnknownModel, got {other:?}"),
    }
}

#[test]
fn empty_filter_writes_no_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_sample_csv(tmp.path());

    let dataset = Dataset::from_csv_path(&input).unwrap();
    let pricing = PricingTable::builtin();
    let cost = pricing.lookup("gpt-4o").unwrap();

    let err = compute_metrics(&dataset, "run_99", &cost).unwrap_err();
    assert!(err.is_soft());

    // the caller skips the store entirely on the soft condition
    let store = ReportStore::new(tmp.path().join("reports"));
    assert!(store.list(Subject::Math).unwrap().is_empty());
    assert!(!tmp.path().join("reports").exists());
}

#[test]
fn regenerating_overwrites_the_same_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ReportStore::new(tmp.path().join("reports"));

    let first = store.prepare(Subject::Ela, "run_01").unwrap();
    fs::write(&first, b"first render").unwrap();
    let second = store.prepare(Subject::Ela, "run_01").unwrap();
    fs::write(&second, b"second render").unwrap();

    assert_eq!(first, second);
    assert_eq!(store.list(Subject::Ela).unwrap().len(), 1);
    assert_eq!(fs::read(&first).unwrap(), b"second render");
}

#[test]
fn listing_is_per_subject_and_reverse_lexicographic() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ReportStore::new(tmp.path().join("reports"));

    for (subject, exp) in [
        (Subject::Math, "run_01"),
        (Subject::Math, "run_03"),
        (Subject::Math, "run_02"),
        (Subject::Ela, "run_01"),
    ] {
        let path = store.prepare(subject, exp).unwrap();
        fs::write(&path, b"png").unwrap();
    }

    let math: Vec<String> = store
        .list(Subject::Math)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        math,
        vec![
            "run_03_final_report.png",
            "run_02_final_report.png",
            "run_01_final_report.png",
        ]
    );
    assert_eq!(store.list(Subject::Ela).unwrap().len(), 1);
}
