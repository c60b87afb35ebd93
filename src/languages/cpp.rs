use crate::config::types::Language;
use crate::languages::adapter::LanguageAdapter;
use crate::sandbox::workspace::RunWorkspace;

const COMPILER: &str = "g++";
const BINARY_NAME: &str = "program";

#[derive(Debug, Clone, Default)]
pub struct CppAdapter;

impl LanguageAdapter for CppAdapter {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.cpp".to_string()
    }

    fn required_binaries(&self) -> Vec<String> {
        vec![COMPILER.to_string()]
    }

    fn compile_command(&self, workspace: &RunWorkspace, source_file: &str) -> Option<Vec<String>> {
        Some(vec![
            COMPILER.to_string(),
            "-std=c++17".to_string(),
            "-O2".to_string(),
            "-pipe".to_string(),
            "-o".to_string(),
            workspace.path_of(BINARY_NAME).to_string_lossy().to_string(),
            workspace.path_of(source_file).to_string_lossy().to_string(),
        ])
    }

    fn run_command(&self, workspace: &RunWorkspace, _source_file: &str) -> Vec<String> {
        vec![workspace.path_of(BINARY_NAME).to_string_lossy().to_string()]
    }
}
