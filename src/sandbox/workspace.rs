/// Run-scoped workspace management
///
/// Each execution gets a uniquely named directory under the configured
/// workspace root. Deletion on every exit path is the load-bearing
/// resource-safety property of the sandbox: callers invoke `cleanup()`
/// explicitly and `Drop` acts as a backstop for early returns.
use crate::config::types::{Result, SandboxError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct RunWorkspace {
    run_id: String,
    run_dir: PathBuf,
    cleaned: bool,
}

impl RunWorkspace {
    /// Create a fresh workspace directory for one run.
    pub fn create(base_dir: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let run_dir = base_dir.join(&run_id);

        fs::create_dir_all(&run_dir).map_err(|e| {
            SandboxError::Workspace(format!(
                "failed to create workspace {}: {e}",
                run_dir.display()
            ))
        })?;

        Ok(Self {
            run_id,
            run_dir,
            cleaned: false,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.run_dir
    }

    /// Absolute path of a file inside the workspace.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.run_dir.join(name)
    }

    /// Write the submission source into the workspace.
    pub fn write_source(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_of(file_name);
        fs::write(&path, content).map_err(|e| {
            SandboxError::Workspace(format!(
                "failed to write source file {}: {e}",
                path.display()
            ))
        })?;
        Ok(path)
    }

    /// Remove the workspace directory. Idempotent.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned {
            return Ok(());
        }
        if self.run_dir.exists() {
            fs::remove_dir_all(&self.run_dir).map_err(|e| {
                SandboxError::Workspace(format!(
                    "failed to remove workspace {}: {e}",
                    self.run_dir.display()
                ))
            })?;
        }
        self.cleaned = true;
        Ok(())
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::warn!("workspace cleanup on drop failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_create_and_cleanup() {
        let base = std::env::temp_dir().join("codebox_test_ws");
        let mut ws = RunWorkspace::create(&base).unwrap();
        assert!(ws.dir().exists());

        let source = ws.write_source("main.py", "print('hi')\n").unwrap();
        assert!(source.exists());

        ws.cleanup().unwrap();
        assert!(!source.exists());

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let base = std::env::temp_dir().join("codebox_test_ws_idem");
        let mut ws = RunWorkspace::create(&base).unwrap();
        ws.cleanup().unwrap();
        ws.cleanup().unwrap();
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_drop_removes_directory() {
        let base = std::env::temp_dir().join("codebox_test_ws_drop");
        let dir = {
            let ws = RunWorkspace::create(&base).unwrap();
            ws.dir().to_path_buf()
        };
        assert!(!dir.exists());
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_workspaces_are_unique() {
        let base = std::env::temp_dir().join("codebox_test_ws_unique");
        let a = RunWorkspace::create(&base).unwrap();
        let b = RunWorkspace::create(&base).unwrap();
        assert_ne!(a.dir(), b.dir());
        let _ = fs::remove_dir_all(&base);
    }
}
