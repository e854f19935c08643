//! §6 "Env/config": mapping-repository connection parameters resolve from
//! environment variables by default, optionally overridden by a `--config`
//! TOML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MigratorConfig {
    pub mapping_dsn: Option<String>,
    pub mapping_user: Option<String>,
    pub mapping_password: Option<String>,
    pub template_dir: Option<String>,
}

impl MigratorConfig {
    pub fn resolve(config_file: Option<&Path>) -> Result<Self> {
        let mut config = MigratorConfig {
            mapping_dsn: std::env::var("ETL_MIGRATOR_MAPPING_DSN").ok(),
            mapping_user: std::env::var("ETL_MIGRATOR_MAPPING_USER").ok(),
            mapping_password: std::env::var("ETL_MIGRATOR_MAPPING_PASSWORD").ok(),
            template_dir: std::env::var("ETL_MIGRATOR_TEMPLATE_DIR").ok(),
        };

        if let Some(path) = config_file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let overrides: MigratorConfig =
                toml::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))?;
            config.merge(overrides);
        }

        Ok(config)
    }

    fn merge(&mut self, overrides: MigratorConfig) {
        if overrides.mapping_dsn.is_some() {
            self.mapping_dsn = overrides.mapping_dsn;
        }
        if overrides.mapping_user.is_some() {
            self.mapping_user = overrides.mapping_user;
        }
        if overrides.mapping_password.is_some() {
            self.mapping_password = overrides.mapping_password;
        }
        if overrides.template_dir.is_some() {
            self.template_dir = overrides.template_dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_overrides_take_precedence() {
        let mut base = MigratorConfig {
            mapping_dsn: Some("env-dsn".to_string()),
            mapping_user: None,
            mapping_password: None,
            template_dir: None,
        };
        base.merge(MigratorConfig {
            mapping_dsn: Some("file-dsn".to_string()),
            mapping_user: Some("file-user".to_string()),
            mapping_password: None,
            template_dir: None,
        });
        assert_eq!(base.mapping_dsn.as_deref(), Some("file-dsn"));
        assert_eq!(base.mapping_user.as_deref(), Some("file-user"));
    }
}
