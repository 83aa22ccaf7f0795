//! Extension pour intégrer la source IPTV dans pmoconfig
//!
//! Ce module fournit le trait `IptvConfigExt` qui ajoute à
//! `pmoconfig::Config` la lecture des réglages du pipeline (clés sous
//! `sources.iptv`).
//!
//! # Exemple
//!
//! ```no_run
//! use pmoconfig::get_config;
//! use pmoiptv::{IptvConfigExt, IptvPipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let settings = config.get_iptv_settings()?;
//! let pipeline = IptvPipeline::from_settings(&settings)?;
//! # Ok(())
//! # }
//! ```

use crate::client::DEFAULT_PLAYLIST_URL;
use crate::curation::{DEFAULT_DENYLIST, DEFAULT_INSECURE_PREFIX};
use crate::pipeline::{IptvSettings, DEFAULT_SNAPSHOT_DIRECTORY};
use crate::probe::{DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_PROBE_USER_AGENT};
use crate::scheduler::{DEFAULT_BATCH_PACING_MS, DEFAULT_BATCH_SIZE};
use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::{Number, Value};
use std::path::PathBuf;
use std::time::Duration;

const PLAYLIST_URL: &[&str] = &["sources", "iptv", "playlist_url"];
const PROBE_TIMEOUT: &[&str] = &["sources", "iptv", "probe", "timeout_secs"];
const PROBE_USER_AGENT: &[&str] = &["sources", "iptv", "probe", "user_agent"];
const BATCH_SIZE: &[&str] = &["sources", "iptv", "batch", "size"];
const BATCH_PACING: &[&str] = &["sources", "iptv", "batch", "pacing_ms"];
const DENYLIST: &[&str] = &["sources", "iptv", "curation", "denylist"];
const INSECURE_PREFIX: &[&str] = &["sources", "iptv", "curation", "insecure_prefix"];
const SNAPSHOT_DIRECTORY: &[&str] = &["sources", "iptv", "snapshot", "directory"];

/// Trait d'extension pour gérer la configuration IPTV dans pmoconfig
///
/// # Auto-persist des valeurs par défaut
///
/// Les getters persistent automatiquement les valeurs par défaut dans la
/// configuration si elles n'existent pas encore ou sont invalides.
pub trait IptvConfigExt {
    /// URL du document playlist
    fn get_iptv_playlist_url(&self) -> Result<String>;
    fn set_iptv_playlist_url(&self, url: &str) -> Result<()>;

    /// Délai maximal d'une sonde (secondes, défaut 8)
    fn get_iptv_probe_timeout_secs(&self) -> Result<u64>;
    fn set_iptv_probe_timeout_secs(&self, secs: u64) -> Result<()>;

    /// User-Agent envoyé par les sondes
    fn get_iptv_probe_user_agent(&self) -> Result<String>;
    fn set_iptv_probe_user_agent(&self, user_agent: &str) -> Result<()>;

    /// Nombre de sondes simultanées (défaut 3)
    fn get_iptv_batch_size(&self) -> Result<usize>;
    fn set_iptv_batch_size(&self, size: usize) -> Result<()>;

    /// Pause entre deux lots (millisecondes, défaut 500)
    fn get_iptv_batch_pacing_ms(&self) -> Result<u64>;
    fn set_iptv_batch_pacing_ms(&self, ms: u64) -> Result<()>;

    /// Noms de chaînes exclus (correspondance exacte)
    fn get_iptv_denylist(&self) -> Result<Vec<String>>;
    fn set_iptv_denylist(&self, names: &[String]) -> Result<()>;

    /// Préfixe des URLs non chiffrées à écarter
    fn get_iptv_insecure_prefix(&self) -> Result<String>;
    fn set_iptv_insecure_prefix(&self, prefix: &str) -> Result<()>;

    /// Répertoire du snapshot, relatif au répertoire de configuration
    ///
    /// Le répertoire est créé s'il n'existe pas.
    fn get_iptv_snapshot_dir(&self) -> Result<String>;
    fn set_iptv_snapshot_dir(&self, directory: String) -> Result<()>;

    /// Rassemble tous les réglages du pipeline
    fn get_iptv_settings(&self) -> Result<IptvSettings>;
}

fn get_string_or_default(config: &Config, path: &[&str], default: &str) -> Result<String> {
    match config.get_value(path) {
        Ok(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => {
            config.set_value(path, Value::String(default.to_string()))?;
            Ok(default.to_string())
        }
    }
}

fn get_u64_or_default(config: &Config, path: &[&str], default: u64) -> Result<u64> {
    if let Ok(Value::Number(n)) = config.get_value(path) {
        if let Some(v) = n.as_u64() {
            return Ok(v);
        }
    }
    config.set_value(path, Value::Number(Number::from(default)))?;
    Ok(default)
}

impl IptvConfigExt for Config {
    fn get_iptv_playlist_url(&self) -> Result<String> {
        get_string_or_default(self, PLAYLIST_URL, DEFAULT_PLAYLIST_URL)
    }

    fn set_iptv_playlist_url(&self, url: &str) -> Result<()> {
        self.set_value(PLAYLIST_URL, Value::String(url.to_string()))
    }

    fn get_iptv_probe_timeout_secs(&self) -> Result<u64> {
        get_u64_or_default(self, PROBE_TIMEOUT, DEFAULT_PROBE_TIMEOUT_SECS)
    }

    fn set_iptv_probe_timeout_secs(&self, secs: u64) -> Result<()> {
        self.set_value(PROBE_TIMEOUT, Value::Number(Number::from(secs)))
    }

    fn get_iptv_probe_user_agent(&self) -> Result<String> {
        get_string_or_default(self, PROBE_USER_AGENT, DEFAULT_PROBE_USER_AGENT)
    }

    fn set_iptv_probe_user_agent(&self, user_agent: &str) -> Result<()> {
        self.set_value(PROBE_USER_AGENT, Value::String(user_agent.to_string()))
    }

    fn get_iptv_batch_size(&self) -> Result<usize> {
        let size = get_u64_or_default(self, BATCH_SIZE, DEFAULT_BATCH_SIZE as u64)?;
        if size == 0 {
            // Un lot vide bloquerait le pipeline
            self.set_iptv_batch_size(DEFAULT_BATCH_SIZE)?;
            return Ok(DEFAULT_BATCH_SIZE);
        }
        Ok(usize::try_from(size).unwrap_or(DEFAULT_BATCH_SIZE))
    }

    fn set_iptv_batch_size(&self, size: usize) -> Result<()> {
        self.set_value(BATCH_SIZE, Value::Number(Number::from(size as u64)))
    }

    fn get_iptv_batch_pacing_ms(&self) -> Result<u64> {
        get_u64_or_default(self, BATCH_PACING, DEFAULT_BATCH_PACING_MS)
    }

    fn set_iptv_batch_pacing_ms(&self, ms: u64) -> Result<()> {
        self.set_value(BATCH_PACING, Value::Number(Number::from(ms)))
    }

    fn get_iptv_denylist(&self) -> Result<Vec<String>> {
        match self.get_value(DENYLIST) {
            Ok(value @ Value::Sequence(_)) => Ok(serde_yaml::from_value(value)?),
            _ => {
                let defaults: Vec<String> = DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect();
                self.set_iptv_denylist(&defaults)?;
                Ok(defaults)
            }
        }
    }

    fn set_iptv_denylist(&self, names: &[String]) -> Result<()> {
        self.set_value(DENYLIST, serde_yaml::to_value(names)?)
    }

    fn get_iptv_insecure_prefix(&self) -> Result<String> {
        // Une chaîne vide est légitime : aucun filtrage de protocole
        match self.get_value(INSECURE_PREFIX) {
            Ok(Value::String(s)) => Ok(s),
            _ => {
                self.set_iptv_insecure_prefix(DEFAULT_INSECURE_PREFIX)?;
                Ok(DEFAULT_INSECURE_PREFIX.to_string())
            }
        }
    }

    fn set_iptv_insecure_prefix(&self, prefix: &str) -> Result<()> {
        self.set_value(INSECURE_PREFIX, Value::String(prefix.to_string()))
    }

    fn get_iptv_snapshot_dir(&self) -> Result<String> {
        self.get_managed_dir(SNAPSHOT_DIRECTORY, DEFAULT_SNAPSHOT_DIRECTORY)
    }

    fn set_iptv_snapshot_dir(&self, directory: String) -> Result<()> {
        self.set_managed_dir(SNAPSHOT_DIRECTORY, directory)
    }

    fn get_iptv_settings(&self) -> Result<IptvSettings> {
        Ok(IptvSettings {
            playlist_url: self.get_iptv_playlist_url()?,
            probe_timeout: Duration::from_secs(self.get_iptv_probe_timeout_secs()?),
            probe_user_agent: self.get_iptv_probe_user_agent()?,
            batch_size: self.get_iptv_batch_size()?,
            batch_pacing: Duration::from_millis(self.get_iptv_batch_pacing_ms()?),
            denylist: self.get_iptv_denylist()?,
            insecure_prefix: self.get_iptv_insecure_prefix()?,
            snapshot_directory: PathBuf::from(self.get_iptv_snapshot_dir()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_embedded_defaults() {
        let (dir, config) = config();
        let settings = config.get_iptv_settings().unwrap();

        assert_eq!(settings.playlist_url, DEFAULT_PLAYLIST_URL);
        assert_eq!(settings.probe_timeout, Duration::from_secs(8));
        assert_eq!(settings.probe_user_agent, DEFAULT_PROBE_USER_AGENT);
        assert_eq!(settings.batch_size, 3);
        assert_eq!(settings.batch_pacing, Duration::from_millis(500));
        assert_eq!(settings.denylist.len(), 14);
        assert_eq!(settings.insecure_prefix, "http://");
        assert_eq!(settings.snapshot_directory, dir.path().join("data"));
        assert!(settings.snapshot_directory.is_dir());
    }

    #[test]
    fn test_setters_round_trip() {
        let (_dir, config) = config();

        config.set_iptv_batch_size(5).unwrap();
        config.set_iptv_batch_pacing_ms(0).unwrap();
        config
            .set_iptv_denylist(&["ONLY".to_string()])
            .unwrap();
        config.set_iptv_insecure_prefix("").unwrap();

        assert_eq!(config.get_iptv_batch_size().unwrap(), 5);
        assert_eq!(config.get_iptv_batch_pacing_ms().unwrap(), 0);
        assert_eq!(config.get_iptv_denylist().unwrap(), vec!["ONLY".to_string()]);
        assert_eq!(config.get_iptv_insecure_prefix().unwrap(), "");
    }

    #[test]
    fn test_invalid_values_fall_back_and_persist() {
        let (_dir, config) = config();

        config
            .set_value(BATCH_SIZE, Value::String("many".into()))
            .unwrap();
        config
            .set_value(PROBE_TIMEOUT, Value::Number(Number::from(-3)))
            .unwrap();

        assert_eq!(config.get_iptv_batch_size().unwrap(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.get_iptv_probe_timeout_secs().unwrap(), 8);
        assert_eq!(
            config.get_value(BATCH_SIZE).unwrap(),
            Value::Number(Number::from(3u64))
        );
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let (_dir, config) = config();
        config.set_iptv_batch_size(0).unwrap();
        assert_eq!(config.get_iptv_batch_size().unwrap(), DEFAULT_BATCH_SIZE);
    }
}
