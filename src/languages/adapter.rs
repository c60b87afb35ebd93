use crate::config::types::Language;
use crate::sandbox::workspace::RunWorkspace;

/// Language adapter contract for compile/run stages.
///
/// Adapters define how a submission's source lands on disk and which
/// commands turn it into a process. The sandbox stays language-agnostic.
pub trait LanguageAdapter: Send + Sync {
    fn language(&self) -> Language;

    /// File name the source is written as inside the workspace. May
    /// depend on the source (Java derives it from the public class).
    fn source_file_name(&self, source: &str) -> String;

    /// Host binaries that must resolve before anything is written or
    /// spawned. Missing binaries mean `RuntimeUnavailable`.
    fn required_binaries(&self) -> Vec<String>;

    /// Compile command, for languages with a compile stage.
    fn compile_command(&self, workspace: &RunWorkspace, source_file: &str) -> Option<Vec<String>>;

    fn run_command(&self, workspace: &RunWorkspace, source_file: &str) -> Vec<String>;
}
