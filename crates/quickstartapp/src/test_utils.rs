use crate::api::QuickStartApi;
use crate::config::{Config, DEFAULT_WORKSPACE_ID};
use crate::paths::StoragePaths;
use crate::workspaces::WorkspaceRegistry;
use std::path::Path;
use tempfile::TempDir;

/// A data root in a temp dir, already at the current schema with the default
/// workspace laid out.
pub struct TestEnv {
    // Keeps the directory alive for the duration of the test.
    pub _temp_dir: TempDir,
    pub paths: StoragePaths,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path().join("data"));
        paths
            .config_store()
            .save(&Config::default())
            .expect("failed to write config");
        WorkspaceRegistry::new(paths.clone())
            .ensure_layout(DEFAULT_WORKSPACE_ID)
            .expect("failed to lay out default workspace");
        Self {
            _temp_dir: temp_dir,
            paths,
        }
    }

    /// The temp dir itself, outside the data root.
    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }

    pub fn api(&self) -> QuickStartApi {
        QuickStartApi::new(self.paths.clone())
    }
}
