use actix_web::cookie::Key;
use anyhow::{bail, Context};
use std::path::PathBuf;

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub database_url: String,
    /// Raw secret used to derive the cookie signing key.
    /// None means a key is generated at startup.
    pub secret_key: Option<String>,
    pub media_dir: PathBuf,
    pub session_time: chrono::Duration,
    pub page_cache_ttl: std::time::Duration,
    pub cookie_secure: bool,
}

impl Config {
    /// Reads every setting through `lookup`, which is `std::env::var` outside of tests.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret_key = lookup("SECRET_KEY");
        if let Some(secret) = &secret_key {
            if secret.len() < 32 {
                bail!("SECRET_KEY must be at least 32 bytes long");
            }
        }

        let session_time = lookup("SESSION_TIME")
            .map(|time| {
                time.parse::<i64>()
                    .context("SESSION_TIME cannot be parsed as an integer")
            })
            .transpose()?
            .unwrap_or(1440);
        if session_time <= 0 {
            bail!("SESSION_TIME must be a positive number of minutes");
        }

        let page_cache_ttl = lookup("PAGE_CACHE_SECONDS")
            .map(|secs| {
                secs.parse::<u64>()
                    .context("PAGE_CACHE_SECONDS cannot be parsed as an integer")
            })
            .transpose()?
            .unwrap_or(20);

        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8080".to_owned()),
            database_url,
            secret_key,
            media_dir: PathBuf::from(lookup("MEDIA_DIR").unwrap_or_else(|| "./media".to_owned())),
            session_time: chrono::Duration::minutes(session_time),
            page_cache_ttl: std::time::Duration::from_secs(page_cache_ttl),
            cookie_secure,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Returns the key used to sign session cookies.
    pub fn cookie_key(&self) -> Key {
        match &self.secret_key {
            Some(secret) => Key::derive_from(secret.as_bytes()),
            None => {
                log::warn!("SECRET_KEY is not set; sessions will not survive a restart.");
                Key::generate()
            }
        }
    }

    /// Creates the media directory if it does not exist.
    pub fn ensure_media_dir(&self) -> anyhow::Result<()> {
        if !self.media_dir.exists() {
            std::fs::DirBuilder::new()
                .recursive(true)
                .create(&self.media_dir)
                .with_context(|| format!("failed to create {}", self.media_dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.session_time, chrono::Duration::minutes(1440));
        assert_eq!(config.page_cache_ttl.as_secs(), 20);
        assert!(!config.cookie_secure);
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn missing_database_url() {
        assert!(config(&[]).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("DATABASE_URL", "x"), ("SESSION_TIME", "-5")]).is_err());
        assert!(config(&[("DATABASE_URL", "x"), ("SESSION_TIME", "soon")]).is_err());
        assert!(config(&[("DATABASE_URL", "x"), ("SECRET_KEY", "short")]).is_err());
        assert!(config(&[("DATABASE_URL", "x"), ("PAGE_CACHE_SECONDS", "-1")]).is_err());
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/yatube"),
            ("BIND_ADDRESS", "0.0.0.0:80"),
            ("PAGE_CACHE_SECONDS", "0"),
            ("COOKIE_SECURE", "true"),
        ])
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:80");
        assert_eq!(config.page_cache_ttl.as_secs(), 0);
        assert!(config.cookie_secure);
    }
}
