use crate::config::types::Language;
use crate::languages::adapter::LanguageAdapter;
use crate::sandbox::workspace::RunWorkspace;

const DEFAULT_RUNTIME: &str = "java";
const COMPILER: &str = "javac";
const FALLBACK_CLASS: &str = "Main";

#[derive(Debug, Clone)]
pub struct JavaAdapter {
    runtime: String,
}

impl JavaAdapter {
    pub fn new(runtime: Option<&str>) -> Self {
        Self {
            runtime: runtime.unwrap_or(DEFAULT_RUNTIME).to_string(),
        }
    }
}

/// The source file must be named after the public class or javac refuses
/// to compile it.
fn public_class_name(source: &str) -> Option<String> {
    let mut words = source.split_whitespace().peekable();
    while let Some(word) = words.next() {
        if word != "public" {
            continue;
        }
        if words.peek().copied() == Some("class") {
            words.next();
            if let Some(raw) = words.next() {
                let ident: String = raw
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_')
                    .collect();
                if !ident.is_empty() {
                    return Some(ident);
                }
            }
        }
    }
    None
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn source_file_name(&self, source: &str) -> String {
        let class = public_class_name(source).unwrap_or_else(|| FALLBACK_CLASS.to_string());
        format!("{class}.java")
    }

    fn required_binaries(&self) -> Vec<String> {
        vec![COMPILER.to_string(), self.runtime.clone()]
    }

    fn compile_command(&self, workspace: &RunWorkspace, source_file: &str) -> Option<Vec<String>> {
        Some(vec![
            COMPILER.to_string(),
            workspace.path_of(source_file).to_string_lossy().to_string(),
        ])
    }

    fn run_command(&self, workspace: &RunWorkspace, source_file: &str) -> Vec<String> {
        let class = source_file.strip_suffix(".java").unwrap_or(FALLBACK_CLASS);
        vec![
            self.runtime.clone(),
            "-cp".to_string(),
            workspace.dir().to_string_lossy().to_string(),
            class.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_extraction() {
        assert_eq!(
            public_class_name("public class HelloWorld {\n}"),
            Some("HelloWorld".to_string())
        );
        assert_eq!(
            public_class_name("  public   class   Solver{ }"),
            Some("Solver".to_string())
        );
        assert_eq!(public_class_name("class Private {}"), None);
    }

    #[test]
    fn test_source_file_name_falls_back_to_main() {
        let adapter = JavaAdapter::new(None);
        assert_eq!(adapter.source_file_name("class Hidden {}"), "Main.java");
        assert_eq!(
            adapter.source_file_name("public class App {}"),
            "App.java"
        );
    }
}
