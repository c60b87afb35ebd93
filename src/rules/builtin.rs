//! Builtin denylist contents.
//!
//! Textual filters, not a proof of safety: the sandbox remains the
//! enforcement layer. Each language gets rules for the same capability
//! families (dynamic evaluation, process/OS access, filesystem access,
//! capability-granting imports) in its own syntax.

use super::Rule;
use crate::config::types::Language::{Cpp, Java, JavaScript, Python};
use crate::config::types::Severity::{Block, Warn};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        // Python: dynamic evaluation and introspection
        Rule::new(r"\beval\s*\(", "dynamic evaluation", Block, &[Python]),
        Rule::new(r"\bexec\s*\(", "dynamic execution", Block, &[Python]),
        Rule::new(r"\bcompile\s*\(", "bytecode compilation", Block, &[Python]),
        Rule::new(r"\b__import__\s*\(", "dynamic import", Block, &[Python]),
        Rule::new(
            r"\b(?:getattr|setattr|delattr)\s*\(",
            "reflective attribute access",
            Block,
            &[Python],
        ),
        Rule::new(
            r"\b(?:globals|locals|vars)\s*\(",
            "namespace introspection",
            Block,
            &[Python],
        ),
        Rule::new(r"\.__\w+__", "dunder attribute access", Block, &[Python]),
        // Python: OS, process, and filesystem access
        Rule::new(r"\bos\.", "operating-system interface", Block, &[Python]),
        Rule::new(r"\bsys\.", "interpreter internals", Block, &[Python]),
        Rule::new(r"subprocess\.", "subprocess control", Block, &[Python]),
        Rule::new(r"\bopen\s*\(", "direct file access", Block, &[Python]),
        Rule::new(
            r"(?:import\s+(?:os|sys|subprocess)\b|from\s+(?:os|sys|subprocess)\s+import)",
            "capability-granting import",
            Block,
            &[Python],
        ),
        Rule::new(
            r"\bpickle\.loads?\s*\(",
            "unsafe deserialization",
            Warn,
            &[Python],
        ),
        Rule::new(
            r"\binput\s*\(",
            "stdin read (stdin is closed in the sandbox)",
            Warn,
            &[Python],
        ),
        // JavaScript: dynamic evaluation
        Rule::new(r"\beval\s*\(", "dynamic evaluation", Block, &[JavaScript]),
        Rule::new(
            r"\bFunction\s*\(",
            "dynamic function construction",
            Block,
            &[JavaScript],
        ),
        Rule::new(
            r"\.prototype\s*[=\[]",
            "prototype manipulation",
            Block,
            &[JavaScript],
        ),
        Rule::new(
            r"\.constructor\b",
            "constructor access",
            Warn,
            &[JavaScript],
        ),
        // JavaScript: module loading, process, and network access
        Rule::new(r"\brequire\s*\(", "module loading", Block, &[JavaScript]),
        Rule::new(r"\bprocess\.", "process object access", Block, &[JavaScript]),
        Rule::new(r"child_process", "subprocess control", Block, &[JavaScript]),
        Rule::new(r"\bfetch\s*\(", "network request", Block, &[JavaScript]),
        Rule::new(r"XMLHttpRequest", "network request", Block, &[JavaScript]),
        Rule::new(
            r"\bset(?:Timeout|Interval)\s*\(",
            "timer scheduling",
            Block,
            &[JavaScript],
        ),
        // Java: process and VM control
        Rule::new(
            r"Runtime\.getRuntime\s*\(",
            "runtime process access",
            Block,
            &[Java],
        ),
        Rule::new(r"ProcessBuilder", "subprocess control", Block, &[Java]),
        Rule::new(r"System\.exit\s*\(", "VM termination", Block, &[Java]),
        // Java: reflection, filesystem, and network
        Rule::new(r"Class\.forName\s*\(", "reflective class loading", Block, &[Java]),
        Rule::new(r"java\.lang\.reflect", "reflection API", Block, &[Java]),
        Rule::new(r"\.getClass\s*\(\)", "reflective class access", Block, &[Java]),
        Rule::new(r"\bnative\s+", "native method declaration", Block, &[Java]),
        Rule::new(
            r"java\.(?:io\.File|nio\.file)",
            "filesystem access",
            Block,
            &[Java],
        ),
        Rule::new(r"java\.net\.", "network access", Block, &[Java]),
        // C++: shell and process control
        Rule::new(r"\bsystem\s*\(", "shell execution", Block, &[Cpp]),
        Rule::new(r"\bexec[lv]\w*\s*\(", "exec-family call", Block, &[Cpp]),
        Rule::new(r"\bpopen\s*\(", "process pipe", Block, &[Cpp]),
        Rule::new(r"\bfork\s*\(", "process creation", Block, &[Cpp]),
        // C++: capability-granting headers and low-level constructs
        Rule::new(
            r"#include\s*<(?:cstdlib|unistd\.h|sys/)",
            "capability-granting include",
            Block,
            &[Cpp],
        ),
        Rule::new(r"\b__?asm__?\b", "inline assembly", Block, &[Cpp]),
        Rule::new(r"\bgets\s*\(", "unbounded buffer read", Warn, &[Cpp]),
        Rule::new(
            r"\b(?:malloc|free)\s*\(",
            "manual memory management",
            Warn,
            &[Cpp],
        ),
    ]
}
