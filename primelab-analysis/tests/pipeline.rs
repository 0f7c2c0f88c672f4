use chrono::NaiveDate;
use primelab_analysis::{
    AnalysisError, ReportWriter, SignalDetectionAnalyzer, SignificanceScheme, load_outcome_dir,
    render_csv, render_summary,
};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

const HEADER: &str = "phase,trial_index,compression_level,signal_type,response,rt,trial_outcome\n";

fn session_csv(level: &str, outcomes: &[&str]) -> String {
    let mut text = String::from(HEADER);
    text.push_str(&format!("practice,0,{level},present,m,0.4,Hit\n"));
    for (i, outcome) in outcomes.iter().enumerate() {
        let signal = if matches!(*outcome, "Hit" | "Miss") { "present" } else { "absent" };
        text.push_str(&format!("main,{i},{level},{signal},m,0.5,{outcome}\n"));
    }
    text
}

#[test]
fn directory_to_report() {
    let data = tempfile::tempdir().unwrap();
    let mut worked = vec!["Hit"; 6];
    worked.extend(["Miss", "False Alarm", "False Alarm"]);
    worked.extend(["Correct Rejection"; 5]);
    write(data.path(), "p01.csv", &session_csv("0.3", &worked));
    write(
        data.path(),
        "p02.csv",
        &session_csv("0.1", &["Hit", "Miss", "False Alarm", "Correct Rejection"]),
    );
    write(data.path(), "notes.txt", "not an outcome file");
    write(data.path(), "summary.csv", "participant,score\np01,3\n");

    let table = load_outcome_dir(data.path()).unwrap();
    assert_eq!(table.files_loaded, 2);
    assert_eq!(table.files_skipped, 1);
    assert_eq!(table.practice_rows, 2);
    assert_eq!(table.observations.len(), 18);

    let analyzer = SignalDetectionAnalyzer::default();
    let results = analyzer.analyze(&table.observations).unwrap();
    let keys: Vec<&str> = results.iter().map(|r| r.stratum.as_str()).collect();
    assert_eq!(keys, ["0.1", "0.3"]);
    assert!((results[1].d_prime - 1.6335).abs() < 1e-3);
    assert!((results[1].p_value - 0.1052).abs() < 1e-3);

    let at = NaiveDate::from_ymd_opt(2025, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .unwrap();
    let out = tempfile::tempdir().unwrap();
    let paths = ReportWriter::new(out.path(), SignificanceScheme::default())
        .write(&results, &at)
        .unwrap();
    let csv = fs::read_to_string(paths.table).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("0.3,1.63,"));
}

#[test]
fn reanalysis_produces_identical_report() {
    let data = tempfile::tempdir().unwrap();
    write(
        data.path(),
        "p01.csv",
        &session_csv("0.5", &["Hit", "Hit", "Miss", "False Alarm", "Correct Rejection"]),
    );
    let at = NaiveDate::from_ymd_opt(2025, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .unwrap();
    let render = || {
        let table = load_outcome_dir(data.path()).unwrap();
        let results = SignalDetectionAnalyzer::default()
            .analyze(&table.observations)
            .unwrap();
        let summary = render_summary(&results, SignificanceScheme::ThreeTier, &at);
        render_csv(&results) + &summary
    };
    assert_eq!(render(), render());
}

#[test]
fn missing_and_empty_directories_are_fatal() {
    let data = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_outcome_dir(data.path().join("absent")),
        Err(AnalysisError::MissingDirectory { .. })
    ));
    assert!(matches!(
        load_outcome_dir(data.path()),
        Err(AnalysisError::NoInputFiles { .. })
    ));
    write(data.path(), "p01.csv", "compression_level,trial_outcome\n0.3,NA\n");
    assert!(matches!(
        load_outcome_dir(data.path()),
        Err(AnalysisError::NoUsableRows { .. })
    ));
}

#[test]
fn one_sided_stratum_fails_the_run() {
    let data = tempfile::tempdir().unwrap();
    write(data.path(), "p01.csv", &session_csv("0.6", &["Hit", "Miss"]));
    let table = load_outcome_dir(data.path()).unwrap();
    let err = SignalDetectionAnalyzer::default()
        .analyze(&table.observations)
        .unwrap_err();
    assert!(err.to_string().contains("0.6"), "{err}");
}

#[test]
fn unreadable_file_is_fatal() {
    let data = tempfile::tempdir().unwrap();
    write(data.path(), "a.csv", &session_csv("0.3", &["Hit", "Correct Rejection"]));
    fs::write(data.path().join("b.csv"), [0x63, 0x6f, 0xff, 0xfe, 0x0a]).unwrap();

    match load_outcome_dir(data.path()) {
        Err(AnalysisError::Io { path, .. }) => assert!(path.ends_with("b.csv")),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn equal_levels_written_differently_share_a_row() {
    let data = tempfile::tempdir().unwrap();
    write(data.path(), "p01.csv", &session_csv("0.3", &["Hit", "Correct Rejection"]));
    write(data.path(), "p02.csv", &session_csv("0.30", &["Miss", "False Alarm"]));

    let table = load_outcome_dir(data.path()).unwrap();
    let results = SignalDetectionAnalyzer::default()
        .analyze(&table.observations)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].stratum.as_str(), "0.3");
    assert_eq!(results[0].n_trials, 4);
}
