//! End-to-end submit/analyze flows against real interpreters.
//!
//! Hosts without a given toolchain are tolerated: those tests assert the
//! fail-fast `RuntimeUnavailable` path instead of skipping silently.

use codebox::{ExecutionStatus, Language, Orchestrator, SandboxConfig};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn orchestrator_in(root: &TempDir, wall_ms: u64) -> Orchestrator {
    let config = SandboxConfig {
        workspace_root: root.path().join("ws"),
        wall_time_limit_ms: wall_ms,
        ..SandboxConfig::default()
    };
    Orchestrator::new(config).expect("orchestrator construction")
}

fn workspace_entries(root: &TempDir) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(root.path().join("ws")) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn python_hello_world_completes() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let outcome = orch.submit("print(\"Hello, World!\")\n", Language::Python);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        eprintln!("python3 not on host, skipping");
        return;
    }
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.stdout, "Hello, World!\n");
    assert!(!outcome.timed_out);
    assert!(outcome.duration_ms < 10_000);
}

#[test]
fn blocked_submission_creates_no_workspace() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let outcome = orch.submit("import os\nos.system(\"id\")\n", Language::Python);
    assert_eq!(outcome.status, ExecutionStatus::Blocked);
    assert!(!outcome.violations.is_empty());
    assert_eq!(outcome.exit_code, None);
    // The sandbox was never invoked: not even the workspace root exists.
    assert!(!root.path().join("ws").exists());
}

#[test]
fn python_infinite_loop_times_out_near_limit() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 1_500);
    let start = Instant::now();
    let outcome = orch.submit("while True:\n    pass\n", Language::Python);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        return;
    }
    let elapsed = start.elapsed();
    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, None);
    assert!(elapsed >= Duration::from_millis(1_400), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(8), "kill not bounded: {elapsed:?}");
    assert!(workspace_entries(&root).is_empty());
}

#[test]
fn javascript_infinite_loop_times_out() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 1_500);
    let start = Instant::now();
    let outcome = orch.submit("while(true){}\n", Language::JavaScript);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        eprintln!("node not on host, skipping");
        return;
    }
    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert!(start.elapsed() < Duration::from_secs(8));
}

#[test]
fn timeout_preserves_output_written_before_kill() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 1_500);
    let source = "print(\"early\", flush=True)\nwhile True:\n    pass\n";
    let outcome = orch.submit(source, Language::Python);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        return;
    }
    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert_eq!(outcome.stdout, "early\n");
}

#[test]
fn workspace_removed_after_every_outcome() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 1_500);

    let completed = orch.submit("print(1)\n", Language::Python);
    if completed.status == ExecutionStatus::RuntimeUnavailable {
        return;
    }
    assert!(workspace_entries(&root).is_empty());

    let runtime_error = orch.submit("raise ValueError(\"boom\")\n", Language::Python);
    assert_eq!(runtime_error.status, ExecutionStatus::Completed);
    assert_ne!(runtime_error.exit_code, Some(0));
    assert!(workspace_entries(&root).is_empty());

    let timed_out = orch.submit("while True:\n    pass\n", Language::Python);
    assert_eq!(timed_out.status, ExecutionStatus::TimedOut);
    assert!(workspace_entries(&root).is_empty());
}

#[test]
fn nonzero_exit_reported_faithfully() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let outcome = orch.submit("raise SystemExit(3)\n", Language::Python);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        return;
    }
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.exit_code, Some(3));
}

#[test]
fn concurrent_submits_never_overlap() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let probe = orch.submit("print(1)\n", Language::Python);
    if probe.status == ExecutionStatus::RuntimeUnavailable {
        return;
    }

    let source = "import time\ntime.sleep(1)\n";
    let start = Instant::now();
    std::thread::scope(|scope| {
        let a = scope.spawn(|| orch.submit(source, Language::Python));
        let b = scope.spawn(|| orch.submit(source, Language::Python));
        assert_eq!(a.join().unwrap().status, ExecutionStatus::Completed);
        assert_eq!(b.join().unwrap().status, ExecutionStatus::Completed);
    });
    // Two one-second sleeps through a serialized sandbox cannot overlap.
    assert!(
        start.elapsed() >= Duration::from_millis(1_800),
        "executions overlapped: {:?}",
        start.elapsed()
    );
}

#[test]
fn missing_runtime_fails_fast() {
    let root = TempDir::new().unwrap();
    let config = SandboxConfig {
        workspace_root: root.path().join("ws"),
        runners: [(Language::Python, "/nonexistent/python3".to_string())]
            .into_iter()
            .collect(),
        ..SandboxConfig::default()
    };
    let orch = Orchestrator::new(config).unwrap();
    let start = Instant::now();
    let outcome = orch.submit("print(1)\n", Language::Python);
    assert_eq!(outcome.status, ExecutionStatus::RuntimeUnavailable);
    assert!(outcome.error_message.is_some());
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!root.path().join("ws").exists());
}

#[test]
fn analyze_invalid_source_still_produces_score() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let report = orch.analyze("def broken(\n", Language::Python);
    assert!(!report.syntax_valid);
    assert!(!report.errors.is_empty());
    assert!((1..=10).contains(&report.quality_score));
}

#[test]
fn analyze_is_deterministic_across_calls() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let source = "def f(a, b):\n    unused = 1\n    return a\n";
    let first = orch.analyze(source, Language::Python);
    let second = orch.analyze(source, Language::Python);
    assert_eq!(first.quality_score, second.quality_score);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn java_submission_compiles_and_runs() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let source = "public class Hello {\n    \
                  public static void main(String[] args) {\n        \
                  System.out.println(\"hi\");\n    }\n}\n";
    let outcome = orch.submit(source, Language::Java);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        eprintln!("javac/java not on host, skipping");
        return;
    }
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.stdout, "hi\n");
    assert!(workspace_entries(&root).is_empty());
}

#[test]
fn cpp_compile_error_surfaces_diagnostics() {
    let root = TempDir::new().unwrap();
    let orch = orchestrator_in(&root, 10_000);
    let source = "#include <iostream>\nint main() { this does not compile }\n";
    let outcome = orch.submit(source, Language::Cpp);
    if outcome.status == ExecutionStatus::RuntimeUnavailable {
        eprintln!("g++ not on host, skipping");
        return;
    }
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_ne!(outcome.exit_code, Some(0));
    assert!(!outcome.stderr.is_empty());
    assert!(workspace_entries(&root).is_empty());
}
