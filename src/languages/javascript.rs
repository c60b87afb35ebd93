use crate::config::types::Language;
use crate::languages::adapter::LanguageAdapter;
use crate::sandbox::workspace::RunWorkspace;

const DEFAULT_RUNTIME: &str = "node";

#[derive(Debug, Clone)]
pub struct JavaScriptAdapter {
    runtime: String,
}

impl JavaScriptAdapter {
    pub fn new(runtime: Option<&str>) -> Self {
        Self {
            runtime: runtime.unwrap_or(DEFAULT_RUNTIME).to_string(),
        }
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.js".to_string()
    }

    fn required_binaries(&self) -> Vec<String> {
        vec![self.runtime.clone()]
    }

    fn compile_command(&self, _workspace: &RunWorkspace, _source_file: &str) -> Option<Vec<String>> {
        None
    }

    fn run_command(&self, workspace: &RunWorkspace, source_file: &str) -> Vec<String> {
        vec![
            self.runtime.clone(),
            workspace.path_of(source_file).to_string_lossy().to_string(),
        ]
    }
}
