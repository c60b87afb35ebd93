/// Code metrics
///
/// Line/comment counters, function and class extraction, and a
/// branching-keyword complexity proxy. Extraction is regex-based and
/// intentionally rough; the numbers feed heuristics, not correctness.
use crate::config::types::{CodeMetrics, Language, Result, SandboxError, Submission};
use regex::Regex;

/// Branching constructs counted toward the complexity proxy.
static COMPLEXITY_KEYWORDS: &[&str] = &[
    "if", "else", "elif", "for", "while", "try", "except", "catch", "switch", "case",
];

/// A function definition found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub line: usize,
    pub arg_count: usize,
}

pub struct MetricsScanner {
    python_fn: Regex,
    javascript_fn: Regex,
    java_fn: Regex,
    cpp_fn: Regex,
    python_class: Regex,
    javascript_class: Regex,
    java_class: Regex,
    cpp_class: Regex,
}

impl MetricsScanner {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| SandboxError::Rule(format!("metrics pattern {pattern:?}: {e}")))
        };
        Ok(Self {
            python_fn: compile(r"(?m)^\s*def\s+(\w+)\s*\(([^)]*)\)")?,
            javascript_fn: compile(r"function\s+(\w+)\s*\(([^)]*)\)")?,
            java_fn: compile(
                r"(?:public|private|protected)\s+(?:static\s+)?[\w<>\[\]]+\s+(\w+)\s*\(([^)]*)\)",
            )?,
            cpp_fn: compile(r"(?m)^[\w<>\[\]*&:\s]+\s(\w+)\s*\(([^)]*)\)\s*\{")?,
            python_class: compile(r"(?m)^\s*class\s+(\w+)")?,
            javascript_class: compile(r"class\s+(\w+)(?:\s+extends\s+\w+)?\s*\{")?,
            java_class: compile(r"(?:public|private)?\s*class\s+(\w+)")?,
            cpp_class: compile(r"(?m)^\s*class\s+(\w+)")?,
        })
    }

    pub fn collect(&self, submission: &Submission) -> CodeMetrics {
        let source = &submission.source;
        let prefix = submission.language.comment_prefix();
        let lines: Vec<&str> = source.lines().collect();

        let blank_lines = lines.iter().filter(|l| l.trim().is_empty()).count();
        let comment_lines = lines
            .iter()
            .filter(|l| {
                let t = l.trim();
                !t.is_empty() && t.starts_with(prefix)
            })
            .count();
        let code_lines = lines.len() - blank_lines - comment_lines;

        let complexity = lines
            .iter()
            .map(|line| {
                let lowered = line.to_lowercase();
                COMPLEXITY_KEYWORDS
                    .iter()
                    .map(|kw| lowered.matches(kw).count())
                    .sum::<usize>()
            })
            .sum();

        CodeMetrics {
            total_lines: lines.len(),
            code_lines,
            comment_lines,
            blank_lines,
            function_count: self.functions(submission).len(),
            class_count: self.class_re(submission.language).find_iter(source).count(),
            complexity,
        }
    }

    /// Extract function definitions with 1-based line numbers.
    pub fn functions(&self, submission: &Submission) -> Vec<FunctionInfo> {
        let re = self.fn_re(submission.language);
        re.captures_iter(&submission.source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?.as_str().to_string();
                let args = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                let line = submission.source[..whole.start()].matches('\n').count() + 1;
                let arg_count = args
                    .split(',')
                    .filter(|a| !a.trim().is_empty())
                    .count();
                Some(FunctionInfo {
                    name,
                    line,
                    arg_count,
                })
            })
            .collect()
    }

    fn fn_re(&self, language: Language) -> &Regex {
        match language {
            Language::Python => &self.python_fn,
            Language::JavaScript => &self.javascript_fn,
            Language::Java => &self.java_fn,
            Language::Cpp => &self.cpp_fn,
        }
    }

    fn class_re(&self, language: Language) -> &Regex {
        match language {
            Language::Python => &self.python_class,
            Language::JavaScript => &self.javascript_class,
            Language::Java => &self.java_class,
            Language::Cpp => &self.cpp_class,
        }
    }
}
