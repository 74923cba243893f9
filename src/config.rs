use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DepographConfig {
    /// Path to the relationship-graph database
    pub relationship_db: Option<String>,
    /// Path to the deposit-log database
    pub deposit_db: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("depograph.toml")
}

pub fn default_relationship_db_in(base: &Path) -> PathBuf {
    base.join(".depograph").join("relationships.db")
}

pub fn default_deposit_db_in(base: &Path) -> PathBuf {
    base.join(".depograph").join("deposits.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DepographConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DepographConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &DepographConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
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
    fn test_load_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depograph.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depograph.toml");

        let config = DepographConfig {
            relationship_db: Some("data/relationships.db".to_string()),
            deposit_db: None,
        };
        write_config(&path, &config, false).unwrap();

        // Refuses to clobber without force
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.relationship_db.as_deref(), Some("data/relationships.db"));
        assert!(loaded.deposit_db.is_none());
    }

    #[test]
    fn test_ensure_db_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db = default_relationship_db_in(dir.path());
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().exists());
    }
}
