/// Security event logging
///
/// Structured records of security-relevant lifecycle points: start/end of
/// executions, blocked submissions, forced kills, cleanup failures. Events
/// are serialized to JSON and routed through `log` at a level derived from
/// their severity, so operators can grep one stream for incidents.
use crate::config::types::{ExecutionStatus, Submission};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::SystemTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditSeverity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEventType {
    ExecutionStart,
    ExecutionEnd,
    SubmissionBlocked,
    RuntimeMissing,
    ForcedKill,
    CleanupFailure,
}

impl AuditEventType {
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditEventType::ExecutionStart => AuditSeverity::Low,
            AuditEventType::ExecutionEnd => AuditSeverity::Low,
            AuditEventType::SubmissionBlocked => AuditSeverity::High,
            AuditEventType::RuntimeMissing => AuditSeverity::Medium,
            AuditEventType::ForcedKill => AuditSeverity::High,
            AuditEventType::CleanupFailure => AuditSeverity::Critical,
        }
    }
}

/// One audit record. `source_fingerprint` identifies the submission
/// without embedding user code in the log stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub severity: AuditSeverity,
    pub timestamp: SystemTime,
    pub run_id: Option<String>,
    pub language: Option<String>,
    pub source_fingerprint: Option<String>,
    pub details: String,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, details: impl Into<String>) -> Self {
        let severity = event_type.default_severity();
        Self {
            event_type,
            severity,
            timestamp: SystemTime::now(),
            run_id: None,
            language: None,
            source_fingerprint: None,
            details: details.into(),
        }
    }

    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    pub fn with_submission(mut self, submission: &Submission) -> Self {
        self.language = Some(submission.language.to_string());
        self.source_fingerprint = Some(fingerprint(&submission.source));
        self
    }

    /// Serialize and route through the logger at a severity-derived level.
    pub fn emit(self) {
        let line = serde_json::to_string(&self)
            .unwrap_or_else(|e| format!("{{\"audit_serialization_error\":\"{e}\"}}"));
        match self.severity {
            AuditSeverity::Critical => error!(target: "codebox::audit", "{line}"),
            AuditSeverity::High => warn!(target: "codebox::audit", "{line}"),
            AuditSeverity::Medium | AuditSeverity::Low => {
                info!(target: "codebox::audit", "{line}")
            }
        }
    }
}

/// Short SHA-256 fingerprint of submission source.
pub fn fingerprint(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Convenience emitters for the event types the pipeline produces.
pub mod events {
    use super::*;

    pub fn execution_start(run_id: &str, submission: &Submission) {
        AuditEvent::new(AuditEventType::ExecutionStart, "sandbox run started")
            .with_run_id(run_id)
            .with_submission(submission)
            .emit();
    }

    pub fn execution_end(run_id: &str, submission: &Submission, status: ExecutionStatus, duration_ms: u64) {
        AuditEvent::new(
            AuditEventType::ExecutionEnd,
            format!("status={status} duration_ms={duration_ms}"),
        )
        .with_run_id(run_id)
        .with_submission(submission)
        .emit();
    }

    pub fn submission_blocked(submission: &Submission, violation_count: usize) {
        AuditEvent::new(
            AuditEventType::SubmissionBlocked,
            format!("{violation_count} violation(s)"),
        )
        .with_submission(submission)
        .emit();
    }

    pub fn runtime_missing(submission: &Submission, binary: &str) {
        AuditEvent::new(
            AuditEventType::RuntimeMissing,
            format!("required binary not found: {binary}"),
        )
        .with_submission(submission)
        .emit();
    }

    pub fn forced_kill(run_id: &str, submission: &Submission, wall_limit_ms: u64) {
        AuditEvent::new(
            AuditEventType::ForcedKill,
            format!("wall clock limit {wall_limit_ms}ms exceeded, process group killed"),
        )
        .with_run_id(run_id)
        .with_submission(submission)
        .emit();
    }

    pub fn cleanup_failure(run_id: &str, error: &str) {
        AuditEvent::new(AuditEventType::CleanupFailure, error.to_string())
            .with_run_id(run_id)
            .emit();
    }
}
