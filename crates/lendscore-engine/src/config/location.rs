use std::path::{Path, PathBuf};

pub const HOME_ENV_VAR: &str = "LENDSCORE_HOME";
pub const SCORING_FILE_NAME: &str = "scoring.json";
pub const MAPPING_FILE_NAME: &str = "pfc_mapping.csv";

/// Resolves the configuration directory: an explicit override, then `$LENDSCORE_HOME`,
/// then `~/.lendscore`. `None` when no home directory can be determined.
pub fn resolve_config_home(home_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = home_override {
        return Some(path.to_path_buf());
    }
    if let Some(override_path) = std::env::var_os(HOME_ENV_VAR) {
        return Some(PathBuf::from(override_path));
    }
    home::home_dir().map(|home_path| home_path.join(".lendscore"))
}

pub fn default_scoring_path(home: &Path) -> PathBuf {
    home.join(SCORING_FILE_NAME)
}

pub fn default_mapping_path(home: &Path) -> PathBuf {
    home.join(MAPPING_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{default_mapping_path, default_scoring_path, resolve_config_home};

    #[test]
    fn explicit_override_wins() {
        let home = resolve_config_home(Some(Path::new("/srv/lendscore")));
        assert_eq!(home.as_deref(), Some(Path::new("/srv/lendscore")));
    }

    #[test]
    fn default_files_live_under_home() {
        let home = Path::new("/srv/lendscore");
        assert!(default_scoring_path(home).ends_with("scoring.json"));
        assert!(default_mapping_path(home).ends_with("pfc_mapping.csv"));
    }
}
