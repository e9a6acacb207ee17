//! Configuration file discovery
//!
//! Finds `config.{toml,yaml,yml,json}` inside the global (`~/.kanban-sync/`) and
//! project (`./.kanban-sync/`) configuration directories.

use crate::CONFIG_DIR_NAME;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

const FILE_STEM: &str = "config";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// A discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub scope: ConfigScope,
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where a file was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigScope {
    /// `~/.kanban-sync/`
    Global,
    /// `./.kanban-sync/`
    Project,
}

/// File discovery service for finding configuration files
#[derive(Debug, Default)]
pub struct FileDiscovery {
    project_dir: Option<PathBuf>,
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery that resolves the standard directories at discovery time
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery over explicit directories
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
        }
    }

    /// Discover all configuration files, lowest precedence first
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let project_dir = self.project_dir.clone().or_else(resolve_project_dir);
        let global_dir = self.global_dir.clone().or_else(resolve_global_dir);

        let mut files = Vec::new();
        if let Some(dir) = global_dir {
            files.extend(search_directory(&dir, ConfigScope::Global));
        }
        if let Some(dir) = project_dir {
            files.extend(search_directory(&dir, ConfigScope::Project));
        }
        files.sort_by_key(|f| f.scope);

        debug!("Discovered {} configuration files", files.len());
        files
    }
}

fn search_directory(dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
    if !dir.exists() {
        trace!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }
    if !dir.is_dir() {
        warn!("Path exists but is not a directory: {}", dir.display());
        return Vec::new();
    }

    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{FILE_STEM}.{ext}")))
        .filter(|candidate| candidate.is_file())
        .filter_map(|path| {
            let format = ConfigFormat::from_extension(path.extension()?.to_str()?)?;
            trace!("Found config: {} ({:?})", path.display(), format);
            Some(ConfigFile {
                path,
                format,
                scope,
            })
        })
        .collect()
}

fn resolve_project_dir() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
    dir.is_dir().then_some(dir)
}

fn resolve_global_dir() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
    dir.is_dir().then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }

    #[test]
    fn test_discovers_global_before_project() {
        let global = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(global.path().join("config.toml"), "").unwrap();
        std::fs::write(project.path().join("config.yaml"), "").unwrap();
        std::fs::write(project.path().join("other.toml"), "").unwrap();

        let discovery = FileDiscovery::with_directories(
            Some(project.path().to_path_buf()),
            Some(global.path().to_path_buf()),
        );
        let files = discovery.discover_all();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].scope, ConfigScope::Global);
        assert_eq!(files[0].format, ConfigFormat::Toml);
        assert_eq!(files[1].scope, ConfigScope::Project);
        assert_eq!(files[1].format, ConfigFormat::Yaml);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let discovery =
            FileDiscovery::with_directories(Some(temp.path().join("absent")), Some(temp.path().join("gone")));
        assert!(discovery.discover_all().is_empty());
    }
}
