//! Security validation
//!
//! Scans a submission against the denylist rule table plus the
//! import/include checks the table cannot express, and produces a
//! [`Verdict`]. This is a fast, conservative textual filter, not a proof
//! of safety; the sandbox is the enforcement layer behind it.

use crate::config::types::{Language, Result, SandboxError, Severity, Submission, Verdict, Violation};
use crate::rules::RuleTable;
use regex::Regex;

/// Python modules that grant OS, process, or network capabilities.
static DANGEROUS_PYTHON_MODULES: &[&str] = &[
    "os",
    "sys",
    "subprocess",
    "importlib",
    "ctypes",
    "marshal",
    "pickle",
    "shelve",
    "socket",
    "urllib2",
    "httplib",
    "ftplib",
    "telnetlib",
    "smtplib",
];

/// C/C++ header fragments that grant shell, syscall, or platform access.
static DANGEROUS_CPP_INCLUDES: &[&str] = &["cstdlib", "unistd.h", "sys/", "windows.h", "winbase.h"];

/// Longest match slice echoed back in a violation.
const MATCH_EXCERPT_LEN: usize = 40;

pub struct SecurityValidator {
    table: RuleTable,
    max_source_bytes: usize,
    python_import_re: Regex,
    cpp_include_re: Regex,
}

impl SecurityValidator {
    pub fn new(table: RuleTable, max_source_bytes: usize) -> Result<Self> {
        let python_import_re =
            Regex::new(r"(?m)^\s*(?:from\s+([A-Za-z_][\w.]*)\s+import|import\s+([A-Za-z_][\w.]*))")
                .map_err(|e| SandboxError::Rule(format!("import pattern: {e}")))?;
        let cpp_include_re = Regex::new(r#"#include\s*[<"]([^>"]+)[>"]"#)
            .map_err(|e| SandboxError::Rule(format!("include pattern: {e}")))?;
        Ok(Self {
            table,
            max_source_bytes,
            python_import_re,
            cpp_include_re,
        })
    }

    /// Scan one submission. All matching rules are collected, in table
    /// order, so the verdict reports every violation rather than just the
    /// first; any Block match flips `allowed`.
    pub fn check(&self, submission: &Submission) -> Verdict {
        let mut violations = Vec::new();

        if submission.source.len() > self.max_source_bytes {
            violations.push(Violation {
                rule: format!("source exceeds {} bytes", self.max_source_bytes),
                matched_text: format!("{} bytes", submission.source.len()),
                severity: Severity::Block,
            });
        }

        for compiled in self.table.rules_for(submission.language) {
            if let Some(m) = compiled.regex.find(&submission.source) {
                violations.push(Violation {
                    rule: compiled.rule.description.clone(),
                    matched_text: excerpt(m.as_str()),
                    severity: compiled.rule.severity,
                });
            }
        }

        match submission.language {
            Language::Python => self.scan_python_imports(&submission.source, &mut violations),
            Language::Cpp => self.scan_cpp_includes(&submission.source, &mut violations),
            _ => {}
        }

        let allowed = !violations.iter().any(|v| v.severity == Severity::Block);
        if !allowed {
            log::debug!(
                "submission blocked: {} violation(s), first: {}",
                violations.len(),
                violations[0].rule
            );
        }
        Verdict {
            allowed,
            violations,
        }
    }

    fn scan_python_imports(&self, source: &str, violations: &mut Vec<Violation>) {
        for caps in self.python_import_re.captures_iter(source) {
            let module = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let base = module.split('.').next().unwrap_or_default();
            if DANGEROUS_PYTHON_MODULES.contains(&base) {
                // The rule table already names os/sys/subprocess; avoid
                // reporting the same import twice.
                if violations
                    .iter()
                    .any(|v| v.matched_text.contains(base) && v.severity == Severity::Block)
                {
                    continue;
                }
                violations.push(Violation {
                    rule: format!("import of dangerous module '{base}'"),
                    matched_text: excerpt(caps.get(0).map(|m| m.as_str()).unwrap_or(base)),
                    severity: Severity::Block,
                });
            }
        }
    }

    fn scan_cpp_includes(&self, source: &str, violations: &mut Vec<Violation>) {
        for caps in self.cpp_include_re.captures_iter(source) {
            let header = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if DANGEROUS_CPP_INCLUDES
                .iter()
                .any(|dangerous| header.contains(dangerous))
            {
                if violations
                    .iter()
                    .any(|v| v.matched_text.contains(header) && v.severity == Severity::Block)
                {
                    continue;
                }
                violations.push(Violation {
                    rule: format!("include of dangerous header '{header}'"),
                    matched_text: excerpt(caps.get(0).map(|m| m.as_str()).unwrap_or(header)),
                    severity: Severity::Block,
                });
            }
        }
    }
}

fn excerpt(matched: &str) -> String {
    let trimmed = matched.trim();
    if trimmed.len() <= MATCH_EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let mut cut = MATCH_EXCERPT_LEN;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &trimmed[..cut])
    }
}
