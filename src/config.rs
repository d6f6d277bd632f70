use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub browsing: BrowsingSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_restaurants_file")]
    pub restaurants_file: String,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_reviews_file")]
    pub reviews_file: String,
    /// Seed CSV, resolved against `data_dir` when relative
    #[serde(default = "default_seed_csv")]
    pub seed_csv: Option<String>,
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            restaurants_file: default_restaurants_file(),
            users_file: default_users_file(),
            reviews_file: default_reviews_file(),
            seed_csv: default_seed_csv(),
            pretty: true,
        }
    }
}

impl StorageSettings {
    pub fn restaurants_path(&self) -> PathBuf {
        self.data_dir.join(&self.restaurants_file)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn reviews_path(&self) -> PathBuf {
        self.data_dir.join(&self.reviews_file)
    }

    pub fn seed_csv_path(&self) -> Option<PathBuf> {
        self.seed_csv
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| self.data_dir.join(s))
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_restaurants_file() -> String { "restaurants.json".to_string() }
fn default_users_file() -> String { "users.json".to_string() }
fn default_reviews_file() -> String { "reviews.json".to_string() }
fn default_seed_csv() -> Option<String> { Some("michelin_my_maps.csv".to_string()) }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct BrowsingSettings {
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    pub default_limit: Option<usize>,
}

impl Default for BrowsingSettings {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
            default_limit: None,
        }
    }
}

fn default_max_distance_km() -> f64 { 50.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySettings {
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

fn default_bcrypt_cost() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with THEKNIFE_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., THEKNIFE__STORAGE__DATA_DIR -> storage.data_dir
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("THEKNIFE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_storage_paths() {
        let storage = StorageSettings::default();
        assert_eq!(storage.restaurants_path(), PathBuf::from("data/restaurants.json"));
        assert_eq!(storage.users_path(), PathBuf::from("data/users.json"));
        assert_eq!(storage.reviews_path(), PathBuf::from("data/reviews.json"));
        assert_eq!(storage.seed_csv_path(), Some(PathBuf::from("data/michelin_my_maps.csv")));
    }

    #[test]
    fn test_default_browsing_and_logging() {
        let settings = Settings::default();
        assert_eq!(settings.browsing.max_distance_km, 50.0);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.security.bcrypt_cost, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theknife.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/tmp/knife\"\npretty = false\n\n[browsing]\nmax_distance_km = 25.0\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.storage.data_dir, PathBuf::from("/tmp/knife"));
        assert!(!settings.storage.pretty);
        assert_eq!(settings.browsing.max_distance_km, 25.0);
        assert_eq!(settings.storage.users_file, "users.json");
    }
}
