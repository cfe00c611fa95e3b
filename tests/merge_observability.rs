use std::sync::{Arc, Mutex};

use logger_merge::MergeError;
use logger_merge::ingestion::{
    CompositeObserver, FileStats, MergeContext, MergeObserver, MergeSeverity, MergeStats,
    RawLogFile, TracingObserver,
};
use logger_merge::merge::{merge_logger_files, merge_logger_paths, MergeOptions};

#[derive(Default)]
struct RecordingObserver {
    parsed: Mutex<Vec<(String, FileStats)>>,
    successes: Mutex<Vec<MergeStats>>,
    failures: Mutex<Vec<MergeSeverity>>,
    alerts: Mutex<Vec<MergeSeverity>>,
}

impl MergeObserver for RecordingObserver {
    fn on_file_parsed(&self, file: &str, stats: FileStats) {
        self.parsed.lock().unwrap().push((file.to_string(), stats));
    }

    fn on_success(&self, _ctx: &MergeContext, stats: MergeStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &MergeContext, severity: MergeSeverity, _error: &MergeError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &MergeContext, severity: MergeSeverity, _error: &MergeError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options_with(obs: Arc<RecordingObserver>, alert_at_or_above: MergeSeverity) -> MergeOptions {
    MergeOptions {
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_file_and_merge_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), MergeSeverity::Critical);

    merge_logger_paths(
        &["tests/fixtures/logger_a.csv", "tests/fixtures/logger_b.csv"],
        &opts,
    )
    .unwrap();

    let parsed = obs.parsed.lock().unwrap().clone();
    assert_eq!(
        parsed,
        vec![
            ("logger_a.csv".to_string(), FileStats { rows: 4, columns: 5 }),
            ("logger_b.csv".to_string(), FileStats { rows: 4, columns: 5 }),
        ]
    );
    assert_eq!(
        obs.successes.lock().unwrap().clone(),
        vec![MergeStats {
            files: 2,
            rows_read: 8,
            rows_dropped: 2,
            rows: 6,
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), MergeSeverity::Critical);

    let _ = merge_logger_paths(&["tests/fixtures/does_not_exist.csv"], &opts).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![MergeSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![MergeSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), MergeSeverity::Critical);

    let bad = RawLogFile::new("bad.csv", "too short");
    let _ = merge_logger_files(&[bad], &opts).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![MergeSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn empty_input_is_a_warning() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), MergeSeverity::Warning);

    let _ = merge_logger_files(&[], &opts).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![MergeSeverity::Warning]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![MergeSeverity::Warning]);
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn MergeObserver>> =
        vec![a.clone(), b.clone(), Arc::new(TracingObserver)];
    let composite = CompositeObserver::new(observers);
    let opts = MergeOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    merge_logger_paths(&["tests/fixtures/logger_a.csv"], &opts).unwrap();

    assert_eq!(a.successes.lock().unwrap().len(), 1);
    assert_eq!(b.successes.lock().unwrap().len(), 1);
    assert_eq!(b.parsed.lock().unwrap()[0].1.rows, 4);
}
