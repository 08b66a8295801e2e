//! End-to-end tests running the scope against the real platform probe.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use perfscope::{InfoSink, MeasurementScope, ScopeConfig};

#[derive(Default)]
struct CollectingSink(Mutex<Vec<String>>);

impl CollectingSink {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl InfoSink for CollectingSink {
    fn info(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

#[test]
fn near_zero_work_produces_a_well_formed_report() {
    let sink = Arc::new(CollectingSink::default());
    let scope = MeasurementScope::new(ScopeConfig::new().logger(sink.clone()));

    scope.measure(|| {}).expect("measurement should succeed");

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    let lines: Vec<&str> = messages[0].lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Execution Time: "));
    assert!(lines[0].ends_with(" sec"));
    assert!(lines[1].starts_with("Memory Usage: "));
    assert!(lines[1].ends_with(" MB"));
    assert!(lines[2].starts_with("User CPU Time: "));
    assert!(lines[2].ends_with(" sec"));
    assert!(lines[3].starts_with("System CPU Time: "));
    assert!(lines[3].ends_with(" sec"));

    let secs: f64 = lines[0]
        .strip_prefix("Execution Time: ")
        .and_then(|rest| rest.strip_suffix(" sec"))
        .unwrap()
        .parse()
        .unwrap();
    assert!((0.0..1.0).contains(&secs), "empty block took {secs}s");
}

#[test]
fn sequential_activations_append_blocks_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.log");
    let scope = MeasurementScope::new(ScopeConfig::new().log_file(&path));

    scope.measure(|| ()).expect("first activation");
    scope.measure(|| ()).expect("second activation");

    let contents = std::fs::read_to_string(&path).expect("log file was created");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 8, "two four-line blocks");
    for block in lines.chunks(4) {
        assert!(block[0].starts_with("Execution Time: "));
        assert!(block[1].starts_with("Memory Usage: "));
        assert!(block[2].starts_with("User CPU Time: "));
        assert!(block[3].starts_with("System CPU Time: "));
    }
}

#[test]
fn panic_propagates_unchanged_after_the_report() {
    let sink = Arc::new(CollectingSink::default());
    let scope = MeasurementScope::new(ScopeConfig::new().logger(sink.clone()));

    let result = catch_unwind(AssertUnwindSafe(|| {
        scope
            .measure(|| -> u32 { panic!("boom") })
            .expect("entry snapshot")
    }));

    let payload = result.expect_err("the panic must reach the caller");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
    assert_eq!(
        sink.messages().len(),
        1,
        "the report is emitted before the panic propagates"
    );
}

#[test]
fn disabled_scope_touches_no_sinks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.log");
    let sink = Arc::new(CollectingSink::default());
    let config = ScopeConfig::new()
        .enabled(false)
        .log_file(&path)
        .logger(sink.clone());
    let scope = MeasurementScope::new(config);

    let wrapped = scope.wrap(|| 1 + 1);
    assert!(wrapped.is_passthrough());
    assert_eq!(wrapped.call(), 2);

    assert!(!path.exists(), "disabled scopes never open the log file");
    assert!(sink.messages().is_empty());
}

#[test]
fn reused_scope_emits_one_record_per_activation() {
    let sink = Arc::new(CollectingSink::default());
    let scope = MeasurementScope::new(ScopeConfig::new().logger(sink.clone()));

    for _ in 0..5 {
        scope.measure(|| ()).expect("activation");
    }

    let messages = sink.messages();
    assert_eq!(messages.len(), 5);
    for message in &messages {
        assert_eq!(message.lines().count(), 4);
    }
}
