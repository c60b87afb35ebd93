//! Language adapters.
//!
//! The sandbox stays language-agnostic. Adapters define source file
//! naming and compile/run commands for each supported language; adding a
//! language means adding one adapter, not touching the sandbox.

pub mod adapter;
pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

use crate::config::types::Language;
use adapter::LanguageAdapter;

/// Build the adapter for a language, with an optional override for the
/// run-stage binary (from `SandboxConfig::runners`).
pub fn adapter_for(language: Language, runner_override: Option<&str>) -> Box<dyn LanguageAdapter> {
    match language {
        Language::Python => Box::new(python::PythonAdapter::new(runner_override)),
        Language::JavaScript => Box::new(javascript::JavaScriptAdapter::new(runner_override)),
        Language::Java => Box::new(java::JavaAdapter::new(runner_override)),
        // The C++ run stage executes the compiled workspace binary; there
        // is no host runtime to override.
        Language::Cpp => Box::new(cpp::CppAdapter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::workspace::RunWorkspace;

    #[test]
    fn test_adapters_cover_all_languages() {
        for &lang in Language::all() {
            let adapter = adapter_for(lang, None);
            assert_eq!(adapter.language(), lang);
            assert!(!adapter.required_binaries().is_empty());
        }
    }

    #[test]
    fn test_interpreted_languages_have_no_compile_stage() {
        let base = std::env::temp_dir().join("codebox_test_adapters");
        let ws = RunWorkspace::create(&base).unwrap();
        for lang in [Language::Python, Language::JavaScript] {
            let adapter = adapter_for(lang, None);
            let file = adapter.source_file_name("");
            assert!(adapter.compile_command(&ws, &file).is_none());
            assert!(adapter.run_command(&ws, &file).len() > 1);
        }
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_compiled_languages_have_compile_stage() {
        let base = std::env::temp_dir().join("codebox_test_adapters_compiled");
        let ws = RunWorkspace::create(&base).unwrap();
        for lang in [Language::Java, Language::Cpp] {
            let adapter = adapter_for(lang, None);
            let file = adapter.source_file_name("public class Main {}");
            assert!(adapter.compile_command(&ws, &file).is_some());
        }
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_runner_override_lands_in_command() {
        let base = std::env::temp_dir().join("codebox_test_adapters_override");
        let ws = RunWorkspace::create(&base).unwrap();
        let adapter = adapter_for(Language::Python, Some("/opt/python3.12"));
        let cmd = adapter.run_command(&ws, "main.py");
        assert_eq!(cmd[0], "/opt/python3.12");
        assert_eq!(adapter.required_binaries(), vec!["/opt/python3.12"]);
        let _ = std::fs::remove_dir_all(&base);
    }
}
