/// Syntax heuristics
///
/// A parse-free structural check: delimiter balance with string/comment
/// awareness for every language, plus block-header checks for Python.
/// Conservative by design: it reports positional errors it is confident
/// about and stays silent otherwise, so later analysis stages always run.
use crate::config::types::{Language, Submission};

/// Python keywords that open a block and require a `:` on the statement.
static PYTHON_BLOCK_KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
];

/// Check a submission; an empty result means no structural problem found.
pub fn check(submission: &Submission) -> Vec<String> {
    let mut errors = scan_delimiters(&submission.source, submission.language);
    if submission.language == Language::Python {
        errors.extend(check_python_headers(&submission.source));
    }
    errors
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => open,
    }
}

/// Balance scan skipping strings and comments.
fn scan_delimiters(source: &str, language: Language) -> Vec<String> {
    let mut errors = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    enum State {
        Normal,
        LineComment,
        BlockComment,
        Str { quote: char, triple: bool },
    }
    let mut state = State::Normal;
    let block_comments = language != Language::Python;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
        }

        match state {
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    state = State::Normal;
                    i += 1;
                }
            }
            State::Str { quote, triple } => {
                if c == '\\' {
                    i += 1;
                } else if triple {
                    if c == quote && chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)
                    {
                        state = State::Normal;
                        i += 2;
                    }
                } else if c == quote {
                    state = State::Normal;
                } else if c == '\n' && quote != '`' {
                    // Template literals span lines; ordinary strings do not.
                    errors.push(format!("line {}: unterminated string literal", line - 1));
                    state = State::Normal;
                }
            }
            State::Normal => match c {
                '#' if language == Language::Python => state = State::LineComment,
                '/' if block_comments && chars.get(i + 1) == Some(&'/') => {
                    state = State::LineComment;
                    i += 1;
                }
                '/' if block_comments && chars.get(i + 1) == Some(&'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                '"' | '\'' => {
                    let triple = language == Language::Python
                        && chars.get(i + 1) == Some(&c)
                        && chars.get(i + 2) == Some(&c);
                    if triple {
                        i += 2;
                    }
                    state = State::Str { quote: c, triple };
                }
                '`' if language == Language::JavaScript => {
                    state = State::Str {
                        quote: '`',
                        triple: false,
                    };
                }
                '(' | '[' | '{' => stack.push((c, line)),
                ')' | ']' | '}' => match stack.pop() {
                    Some((open, _)) if closer_for(open) == c => {}
                    Some((open, open_line)) => {
                        errors.push(format!(
                            "line {line}: expected '{}' to close '{open}' from line {open_line}, found '{c}'",
                            closer_for(open)
                        ));
                    }
                    None => errors.push(format!("line {line}: unexpected '{c}'")),
                },
                _ => {}
            },
        }
        i += 1;
    }

    if let State::Str { .. } = state {
        errors.push(format!("line {line}: unterminated string literal"));
    }
    for (open, open_line) in stack {
        errors.push(format!("line {open_line}: unclosed '{open}'"));
    }
    errors
}

/// Flag Python block headers missing their trailing colon.
fn check_python_headers(source: &str) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_python_comment(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.ends_with('\\') {
            continue;
        }
        let first_word: String = trimmed
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if !PYTHON_BLOCK_KEYWORDS.contains(&first_word.as_str()) {
            continue;
        }
        // Only judge headers that are complete on this physical line.
        if !brackets_balanced(trimmed) {
            continue;
        }
        if !has_toplevel_colon(trimmed) {
            errors.push(format!(
                "line {line_no}: '{first_word}' statement is missing ':'"
            ));
        }
    }
    errors
}

fn strip_python_comment(line: &str) -> String {
    let mut out = String::new();
    let mut in_string: Option<char> = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match in_string {
            Some(q) => {
                if c == '\\' {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                    continue;
                }
                if c == q {
                    in_string = None;
                }
            }
            None => {
                if c == '#' {
                    break;
                }
                if c == '"' || c == '\'' {
                    in_string = Some(c);
                }
            }
        }
        out.push(c);
    }
    out
}

fn brackets_balanced(line: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    for c in line.chars() {
        match in_string {
            Some(q) => {
                if c == q {
                    in_string = None;
                }
            }
            None => match c {
                '"' | '\'' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ => {}
            },
        }
    }
    depth == 0
}

fn has_toplevel_colon(line: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    for c in line.chars() {
        match in_string {
            Some(q) => {
                if c == q {
                    in_string = None;
                }
            }
            None => match c {
                '"' | '\'' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ':' if depth == 0 => return true,
                _ => {}
            },
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(source: &str, language: Language) -> Vec<String> {
        check(&Submission::new(source, language))
    }

    #[test]
    fn test_valid_python_passes() {
        let source = "def greet(name):\n    return f\"Hello, {name}!\"\n\nprint(greet(\"World\"))\n";
        assert!(errors(source, Language::Python).is_empty());
    }

    #[test]
    fn test_python_missing_colon_flagged() {
        let found = errors("def broken(x)\n    return x\n", Language::Python);
        assert!(!found.is_empty());
        assert!(found[0].contains("missing ':'"), "{found:?}");
    }

    #[test]
    fn test_unbalanced_brackets_flagged() {
        let found = errors("int main() { return 0;\n", Language::Cpp);
        assert!(found.iter().any(|e| e.contains("unclosed '{'")), "{found:?}");
    }

    #[test]
    fn test_mismatched_close_flagged() {
        let found = errors("const xs = [1, 2};\n", Language::JavaScript);
        assert!(!found.is_empty());
    }

    #[test]
    fn test_strings_hide_brackets() {
        assert!(errors("print(\"}} not a bracket ((\")\n", Language::Python).is_empty());
        assert!(errors("// ignore } in comments\nint main() { return 0; }\n", Language::Cpp)
            .is_empty());
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let source = "doc = \"\"\"\nmulti ( line\n\"\"\"\nprint(doc)\n";
        assert!(errors(source, Language::Python).is_empty());
    }

    #[test]
    fn test_unterminated_string_flagged() {
        let found = errors("msg = \"oops\nprint(msg)\n", Language::Python);
        assert!(found.iter().any(|e| e.contains("unterminated")), "{found:?}");
    }

    #[test]
    fn test_inline_suite_accepted() {
        assert!(errors("if x > 1: print(x)\n", Language::Python).is_empty());
    }

    #[test]
    fn test_multiline_header_not_flagged() {
        let source = "def f(\n    a,\n    b,\n):\n    return a + b\n";
        assert!(errors(source, Language::Python).is_empty());
    }
}
