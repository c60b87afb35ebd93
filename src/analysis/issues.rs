/// Heuristic issue detection
///
/// Pattern-based checks over raw source: tolerant, best-effort, never
/// fatal. Each finding lands in one of three buckets that the scorer
/// weighs differently.
use crate::analysis::metrics::FunctionInfo;
use crate::config::types::{Language, Result, SandboxError, Submission};
use regex::Regex;
use std::collections::HashSet;

/// Python line length limit (PEP 8).
const PYTHON_MAX_LINE: usize = 79;

/// Parameter count above which a function is flagged.
const MAX_FUNCTION_ARGS: usize = 5;

/// Names that look like assignments but are common builtins.
static PYTHON_BUILTINS: &[&str] = &[
    "print", "len", "range", "str", "int", "float", "list", "dict", "set", "tuple", "bool",
    "type", "min", "max", "sum", "abs", "round", "sorted", "enumerate", "zip", "map", "filter",
    "any", "all",
];

#[derive(Debug, Default, Clone)]
pub struct Issues {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct IssueScanner {
    assignment_re: Regex,
    bare_except_re: Regex,
    todo_re: Regex,
    js_var_re: Regex,
    js_loose_eq_re: Regex,
    java_class_re: Regex,
    word_re: Regex,
}

impl IssueScanner {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| SandboxError::Rule(format!("issue pattern {pattern:?}: {e}")))
        };
        Ok(Self {
            assignment_re: compile(r"(?m)^([A-Za-z_]\w*)\s*=\s*[^=\s]")?,
            bare_except_re: compile(r"(?m)^\s*except\s*:")?,
            todo_re: compile(r"(?i)(?:#|//).*\b(?:TODO|FIXME|XXX)\b")?,
            js_var_re: compile(r"\bvar\s+\w+")?,
            js_loose_eq_re: compile(r"[^=!<>]==[^=]")?,
            java_class_re: compile(r"^\s*class\s+\w+")?,
            word_re: compile(r"[A-Za-z_]\w*")?,
        })
    }

    pub fn scan(&self, submission: &Submission, functions: &[FunctionInfo]) -> Issues {
        let mut issues = Issues::default();
        match submission.language {
            Language::Python => self.scan_python(submission, functions, &mut issues),
            Language::JavaScript => self.scan_javascript(submission, &mut issues),
            Language::Java => self.scan_java(submission, &mut issues),
            Language::Cpp => self.scan_cpp(submission, &mut issues),
        }
        self.scan_todos(submission, &mut issues);
        issues
    }

    fn scan_python(
        &self,
        submission: &Submission,
        functions: &[FunctionInfo],
        issues: &mut Issues,
    ) {
        let source = &submission.source;
        let lines: Vec<&str> = source.lines().collect();

        for (idx, line) in lines.iter().enumerate() {
            if line.len() > PYTHON_MAX_LINE {
                issues.warnings.push(format!(
                    "line {}: line too long ({} > {PYTHON_MAX_LINE} characters)",
                    idx + 1,
                    line.len()
                ));
            }
        }

        // Module-level assignments whose name never appears again.
        let mut seen: HashSet<&str> = HashSet::new();
        for caps in self.assignment_re.captures_iter(source) {
            let name = match caps.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };
            if name.starts_with('_') || PYTHON_BUILTINS.contains(&name) || !seen.insert(name) {
                continue;
            }
            let uses = self
                .word_re
                .find_iter(source)
                .filter(|m| m.as_str() == name)
                .count();
            if uses == 1 {
                let line = source[..caps.get(0).map(|m| m.start()).unwrap_or(0)]
                    .matches('\n')
                    .count()
                    + 1;
                issues
                    .warnings
                    .push(format!("line {line}: variable '{name}' assigned but never used"));
            }
        }

        for m in self.bare_except_re.find_iter(source) {
            let line = source[..m.start()].matches('\n').count() + 1;
            issues.warnings.push(format!(
                "line {line}: bare 'except:' clause should specify exception type"
            ));
        }

        for function in functions {
            if function.arg_count > MAX_FUNCTION_ARGS {
                issues.warnings.push(format!(
                    "line {}: function '{}' has too many arguments ({})",
                    function.line, function.name, function.arg_count
                ));
            }
            if !has_docstring(&lines, function.line) {
                issues.suggestions.push(format!(
                    "line {}: function '{}' should have a docstring",
                    function.line, function.name
                ));
            }
        }

        if source.contains("import *") {
            issues.suggestions.push(
                "avoid wildcard imports (import *), import specific names instead".to_string(),
            );
        }
    }

    fn scan_javascript(&self, submission: &Submission, issues: &mut Issues) {
        for (idx, line) in submission.source.lines().enumerate() {
            if self.js_var_re.is_match(line) {
                issues.suggestions.push(format!(
                    "line {}: consider using 'let' or 'const' instead of 'var'",
                    idx + 1
                ));
            }
            if self.js_loose_eq_re.is_match(line) {
                issues.warnings.push(format!(
                    "line {}: consider using '===' for strict equality",
                    idx + 1
                ));
            }
        }
    }

    fn scan_java(&self, submission: &Submission, issues: &mut Issues) {
        for (idx, line) in submission.source.lines().enumerate() {
            if self.java_class_re.is_match(line) {
                issues.suggestions.push(format!(
                    "line {}: consider adding an access modifier to the class",
                    idx + 1
                ));
            }
        }
    }

    fn scan_cpp(&self, submission: &Submission, issues: &mut Issues) {
        let source = &submission.source;
        if source.contains("cout") && !source.contains("#include <iostream>") {
            issues
                .errors
                .push("missing #include <iostream> for cout usage".to_string());
        }
    }

    fn scan_todos(&self, submission: &Submission, issues: &mut Issues) {
        for (idx, line) in submission.source.lines().enumerate() {
            if self.todo_re.is_match(line) {
                issues
                    .suggestions
                    .push(format!("line {}: unresolved TODO/FIXME comment", idx + 1));
            }
        }
    }
}

/// A function has a docstring when the first non-blank line after its
/// header starts with a triple quote. Headers spanning multiple lines are
/// handled by scanning past lines until one ends with `:`.
fn has_docstring(lines: &[&str], def_line: usize) -> bool {
    let mut idx = def_line - 1;
    // Find the end of the header.
    while idx < lines.len() && !lines[idx].trim_end().ends_with(':') {
        idx += 1;
    }
    let mut body = idx + 1;
    while body < lines.len() {
        let trimmed = lines[body].trim();
        if trimmed.is_empty() {
            body += 1;
            continue;
        }
        return trimmed.starts_with("\"\"\"") || trimmed.starts_with("'''");
    }
    false
}
