use anyhow::{anyhow, bail, Context, Result};
use shuttle_secrets::SecretStore;

use crate::auth::{hash_password, DEFAULT_ADMIN_EMAIL};

pub const DEFAULT_DATABASE: &str = "cine-cornelio";

/// Which data access variant serves the movies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// In-memory catalogue seeded from the fixtures.
    Local,
    /// MongoDB-backed repository with change streams.
    Mongo { uri: String, database: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    /// Allowed CORS origin.
    pub app_url: String,
    pub admin_email: String,
    /// Argon2 PHC string.
    pub admin_password_hash: String,
}

impl AppConfig {
    /// Reads `Secrets.toml` through the Shuttle secret store.
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let app_url = lookup("APP_URL").ok_or_else(|| anyhow!("secret APP_URL was not found"))?;

        let store = match lookup("CINEMA_STORE").as_deref().unwrap_or("local") {
            "local" => StoreKind::Local,
            "mongo" => StoreKind::Mongo {
                uri: lookup("MONGODB_URI")
                    .ok_or_else(|| anyhow!("secret MONGODB_URI is required when CINEMA_STORE=mongo"))?,
                database: lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            other => bail!("unknown CINEMA_STORE {other:?}, expected \"local\" or \"mongo\""),
        };

        let admin_password_hash = match (lookup("ADMIN_PASSWORD_HASH"), lookup("ADMIN_PASSWORD")) {
            (Some(hash), _) => hash,
            (None, Some(password)) => hash_password(&password)
                .map_err(|err| anyhow!("{err}"))
                .context("failed to hash ADMIN_PASSWORD")?,
            (None, None) => bail!("either ADMIN_PASSWORD_HASH or ADMIN_PASSWORD must be set"),
        };

        Ok(AppConfig {
            store,
            app_url,
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password_hash,
        })
    }
}

#[cfg(test)]
mod app_config_tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let secrets: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| secrets.get(key).cloned())
    }

    #[rstest]
    fn it_should_default_to_the_local_store() {
        let config = load(&[("APP_URL", "http://localhost:3000"), ("ADMIN_PASSWORD_HASH", "$argon2id$x")]).unwrap();
        assert_eq!(config.store, StoreKind::Local);
        assert_eq!(config.admin_email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(config.admin_password_hash, "$argon2id$x");
    }

    #[rstest]
    fn it_should_read_the_mongo_settings() {
        let config = load(&[
            ("APP_URL", "http://localhost:3000"),
            ("ADMIN_PASSWORD_HASH", "$argon2id$x"),
            ("CINEMA_STORE", "mongo"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreKind::Mongo {
                uri: "mongodb://localhost:27017".to_string(),
                database: DEFAULT_DATABASE.to_string(),
            }
        );
    }

    #[rstest]
    fn it_should_hash_a_plain_admin_password() {
        let config = load(&[("APP_URL", "http://localhost:3000"), ("ADMIN_PASSWORD", "segredo")]).unwrap();
        assert!(config.admin_password_hash.starts_with("$argon2"));
        assert!(!config.admin_password_hash.contains("segredo"));
    }

    #[rstest]
    #[case(&[("ADMIN_PASSWORD", "segredo")])]
    #[case(&[("APP_URL", "http://localhost:3000")])]
    #[case(&[("APP_URL", "http://localhost:3000"), ("ADMIN_PASSWORD", "segredo"), ("CINEMA_STORE", "mongo")])]
    #[case(&[("APP_URL", "http://localhost:3000"), ("ADMIN_PASSWORD", "segredo"), ("CINEMA_STORE", "postgres")])]
    fn it_should_reject_incomplete_settings(#[case] pairs: &[(&str, &str)]) {
        assert!(load(pairs).is_err());
    }
}
