//! Generated session -> simulated observer -> exported CSV -> analysis

use primelab_analysis::{SignalDetectionAnalyzer, load_outcome_dir};
use primelab_core::{AssetLibrary, AssetPool, Outcome, OutcomeRecord, Phase, Response, Signal};
use primelab_experiment::{
    ConditionSpec, DesignConfig, SequencerStep, TrialListGenerator, TrialSequencer,
    classify_trial, export,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fs::File;

fn library(config: &DesignConfig) -> AssetLibrary {
    let mut library = AssetLibrary::new();
    for name in config.pool_names() {
        let prefix = name.replace('/', "");
        let items = (0..12).map(|i| format!("{prefix}{i}_compressed.wav"));
        library.insert(AssetPool::new(name, items).unwrap());
    }
    library
}

#[test]
fn exported_session_is_analysable() {
    let config = DesignConfig {
        conditions: vec![
            ConditionSpec::new("0.2", Some("audio/0.2".into()), 2, 10),
            ConditionSpec::new("0.6", Some("audio/0.6".into()), 2, 10),
        ],
        ..DesignConfig::detection()
    };
    let lists = TrialListGenerator::new(config.clone(), StdRng::seed_from_u64(8))
        .generate(&library(&config))
        .unwrap();

    let mut observer = StdRng::seed_from_u64(99);
    let mut sequencer: TrialSequencer = TrialSequencer::from_config(lists, &config);
    loop {
        let record = match sequencer.next().unwrap() {
            SequencerStep::Present { trial, .. } => {
                let p_yes = match trial.signal() {
                    Some(Signal::Present) => 0.8,
                    _ => 0.3,
                };
                let response = if observer.random_bool(p_yes) {
                    Response::Yes
                } else {
                    Response::No
                };
                let outcome = classify_trial(trial, Some(&response), None);
                OutcomeRecord::new(Some(response), Some(0.5)).with_outcome(outcome)
            }
            _ => break,
        };
        sequencer.submit(record).unwrap();
    }
    let executed = sequencer.into_completed();
    assert_eq!(executed.len(), 24);

    let mut expected: BTreeMap<String, [usize; 2]> = BTreeMap::new();
    for run in executed.iter().filter(|e| e.trial.phase.is_main()) {
        let counts = expected.entry(run.trial.stratum.to_string()).or_default();
        match run.outcome.outcome {
            Some(Outcome::Hit) => counts[0] += 1,
            Some(Outcome::FalseAlarm) => counts[1] += 1,
            _ => {}
        }
    }

    let dir = tempfile::tempdir().unwrap();
    export::write_csv(&executed, File::create(dir.path().join("p01.csv")).unwrap()).unwrap();

    let table = load_outcome_dir(dir.path()).unwrap();
    assert_eq!(table.practice_rows, 4);
    assert!(table.malformed_rows.is_empty());

    let results = SignalDetectionAnalyzer::default()
        .analyze(&table.observations)
        .unwrap();
    assert_eq!(results.len(), 2);
    for result in &results {
        let [hits, fas] = expected[result.stratum.as_str()];
        assert_eq!(result.n_trials, 10);
        assert_eq!(result.hit_rate, hits as f64 / 5.0);
        assert_eq!(result.false_alarm_rate, fas as f64 / 5.0);
        assert!(result.d_prime.is_finite());
    }
}
