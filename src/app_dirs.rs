use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "ago-type";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        match ProjectDirs::from("", "", APP_NAME) {
            Some(pd) => pd.config_dir().join("config.json"),
            None => PathBuf::from("ago-type_config.json"),
        }
    }

    /// Directory for the log file; never the terminal the TUI draws on
    pub fn log_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".local").join("state").join(APP_NAME)
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(std::env::temp_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_json() {
        let path = AppDirs::config_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.json"));
    }

    #[test]
    fn log_dir_is_app_specific() {
        let dir = AppDirs::log_dir();
        assert!(dir.to_string_lossy().contains(APP_NAME) || dir == std::env::temp_dir());
    }
}
