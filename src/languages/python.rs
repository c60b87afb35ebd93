use crate::config::types::Language;
use crate::languages::adapter::LanguageAdapter;
use crate::sandbox::workspace::RunWorkspace;

const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Clone)]
pub struct PythonAdapter {
    interpreter: String,
}

impl PythonAdapter {
    pub fn new(interpreter: Option<&str>) -> Self {
        Self {
            interpreter: interpreter.unwrap_or(DEFAULT_INTERPRETER).to_string(),
        }
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.py".to_string()
    }

    fn required_binaries(&self) -> Vec<String> {
        vec![self.interpreter.clone()]
    }

    fn compile_command(&self, _workspace: &RunWorkspace, _source_file: &str) -> Option<Vec<String>> {
        None
    }

    fn run_command(&self, workspace: &RunWorkspace, source_file: &str) -> Vec<String> {
        // -B: no bytecode cache files in the workspace; -S: skip site
        // customization, the submission gets the bare interpreter.
        vec![
            self.interpreter.clone(),
            "-B".to_string(),
            "-S".to_string(),
            workspace.path_of(source_file).to_string_lossy().to_string(),
        ]
    }
}
