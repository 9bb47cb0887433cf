use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DexConfig {
    pub database: Option<String>,
    /// Dataset used by `load` when no path is given
    pub dataset: Option<String>,
    pub strict_duality: Option<bool>,
}

impl DexConfig {
    /// Database path from the config, or the default under `base`
    pub fn database_path_in(&self, base: &Path) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(base))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("dexgraph.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".dexgraph").join("dexgraph.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DexConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DexConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &DexConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dexgraph.toml");
        let config = DexConfig {
            database: Some("dex.db".to_string()),
            dataset: None,
            strict_duality: Some(true),
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_database_path_default() {
        let base = Path::new("/srv/dex");
        assert_eq!(
            DexConfig::default().database_path_in(base),
            PathBuf::from("/srv/dex/.dexgraph/dexgraph.db")
        );
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("dex.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
