//! Static analysis pipeline
//!
//! Pure computation over submission text: syntax heuristics, metrics,
//! issue detection, and a deterministic 1-10 quality score. Never spawns
//! a process and never consults the validator, so quality feedback is
//! available even for code the denylist would reject.

pub mod issues;
pub mod metrics;
pub mod syntax;

use crate::config::types::{AnalysisReport, CodeMetrics, Result, Submission};
use issues::IssueScanner;
use metrics::MetricsScanner;

/// Score deductions per finding category.
const ERROR_WEIGHT: f64 = 2.0;
const WARNING_WEIGHT: f64 = 1.0;
const SUGGESTION_WEIGHT: f64 = 0.5;

pub struct AnalysisPipeline {
    metrics: MetricsScanner,
    issues: IssueScanner,
}

impl AnalysisPipeline {
    pub fn new() -> Result<Self> {
        Ok(Self {
            metrics: MetricsScanner::new()?,
            issues: IssueScanner::new()?,
        })
    }

    /// Run every stage against the raw text. A syntax failure never
    /// aborts the later stages; they operate best-effort on whatever the
    /// user wrote.
    pub fn analyze(&self, submission: &Submission) -> AnalysisReport {
        let syntax_errors = syntax::check(submission);
        let syntax_valid = syntax_errors.is_empty();

        let metrics = self.metrics.collect(submission);
        let functions = self.metrics.functions(submission);
        let found = self.issues.scan(submission, &functions);

        let mut errors = syntax_errors;
        errors.extend(found.errors);

        let quality_score = quality_score(
            errors.len(),
            found.warnings.len(),
            found.suggestions.len(),
            &metrics,
        );

        AnalysisReport {
            syntax_valid,
            errors,
            warnings: found.warnings,
            suggestions: found.suggestions,
            metrics,
            quality_score,
        }
    }
}

/// Start at 10, subtract per finding, adjust for size and documentation,
/// clamp to 1..=10. Same input always yields the same score.
fn quality_score(
    errors: usize,
    warnings: usize,
    suggestions: usize,
    metrics: &CodeMetrics,
) -> i32 {
    let mut score = 10.0
        - ERROR_WEIGHT * errors as f64
        - WARNING_WEIGHT * warnings as f64
        - SUGGESTION_WEIGHT * suggestions as f64;

    if metrics.code_lines > 100 {
        score -= 1.0;
    }
    if metrics.comment_lines > 0 && metrics.code_lines > 0 {
        let ratio = metrics.comment_lines as f64 / metrics.code_lines as f64;
        if ratio > 0.1 {
            score += 1.0;
        }
    }

    (score as i32).clamp(1, 10)
}
