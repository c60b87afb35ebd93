//! Denylist rule table
//!
//! Declarative pattern/severity rules scoped per language. The table is
//! static configuration: built in by default, replaceable by a JSON file,
//! compiled once at startup and never mutated afterwards.

mod builtin;

use crate::config::types::{Language, Result, SandboxError, Severity};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable rule definition as it appears in a rules file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rule {
    /// Regex source, matched case-insensitively and multi-line.
    pub pattern: String,
    /// What the rule catches, shown to the user on a match.
    pub description: String,
    pub severity: Severity,
    /// Languages the rule applies to.
    pub languages: Vec<Language>,
}

impl Rule {
    pub fn new(
        pattern: &str,
        description: &str,
        severity: Severity,
        languages: &[Language],
    ) -> Self {
        Self {
            pattern: pattern.to_string(),
            description: description.to_string(),
            severity,
            languages: languages.to_vec(),
        }
    }
}

/// A rule with its pattern compiled, ready for scanning.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    pub rule: Rule,
    pub regex: Regex,
}

/// The loaded rule table. Rules keep their declaration order; the
/// validator reports matches in that order.
#[derive(Clone, Debug)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    /// Compile a rule list into a scan-ready table.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map_err(|e| {
                    SandboxError::Rule(format!("invalid pattern {:?}: {e}", rule.pattern))
                })?;
            compiled.push(CompiledRule { rule, regex });
        }
        Ok(Self { rules: compiled })
    }

    /// The builtin denylist covering all supported languages.
    pub fn builtin() -> Result<Self> {
        Self::from_rules(builtin::rules())
    }

    /// Load a replacement table from a JSON file (array of rules).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SandboxError::Rule(format!("failed to read {}: {e}", path.display())))?;
        let rules: Vec<Rule> = serde_json::from_str(&content)
            .map_err(|e| SandboxError::Rule(format!("failed to parse {}: {e}", path.display())))?;
        if rules.is_empty() {
            return Err(SandboxError::Rule(format!(
                "rule table {} is empty",
                path.display()
            )));
        }
        Self::from_rules(rules)
    }

    /// Rules applicable to one language, in table order.
    pub fn rules_for(&self, language: Language) -> impl Iterator<Item = &CompiledRule> {
        self.rules
            .iter()
            .filter(move |r| r.rule.languages.contains(&language))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
