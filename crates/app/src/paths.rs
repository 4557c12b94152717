use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Resolved on-disk locations of one application.
///
/// Resolution order per directory: `<APP_ID>_DATA` / `<APP_ID>_CONFIG`
/// environment variables, then the platform directories, then `./.data` and
/// `./.config` as a last resort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    app_id: String,
    data_dir: PathBuf,
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn resolve(qualifier: &str, organization: &str, app_id: &str) -> Self {
        let prefix = app_id.to_uppercase();
        let project = ProjectDirs::from(qualifier, organization, app_id);

        let data_dir = env::var_os(format!("{prefix}_DATA"))
            .map(PathBuf::from)
            .or_else(|| project.as_ref().map(|p| p.data_local_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".").join(".data"));
        let config_dir = env::var_os(format!("{prefix}_CONFIG"))
            .map(PathBuf::from)
            .or_else(|| project.as_ref().map(|p| p.config_local_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".").join(".config"));

        Self::with_dirs(app_id, data_dir, config_dir)
    }

    pub fn with_dirs(app_id: &str, data_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            app_id: app_id.to_string(),
            data_dir,
            config_dir,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    /// Location of the persisted session credential.
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [self.data_dir.clone(), self.config_dir.clone(), self.logs_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
