use std::{env, fmt, fs, path, time::Duration};

use logger::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::registry::Target;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config: {0}")]
    ReadFailed(#[source] std::io::Error),
    #[error("failed to write config: {0}")]
    WriteFailed(#[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config directory available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub database: DatabaseConfig,
    pub prober: ProberConfig,
    pub logging: Logging,
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: path::PathBuf,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProberConfig {
    pub interval_seconds: u64,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
}

impl Default for Server {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 3001 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "monitor.db".into(), pool_size: 8 }
    }
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self { interval_seconds: 60, timeout_ms: 5000 }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self { level: "info".into(), format: "compact".into() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: Server::default(),
            database: DatabaseConfig::default(),
            prober: ProberConfig::default(),
            logging: Logging::default(),
            targets: vec![
                Target::new(
                    "portfolio",
                    "Portfolio",
                    "Site personnel & CV (VPS/Docker)",
                    "https://calliste-portfolio.dynv6.net",
                ),
                Target::new(
                    "gdpatisserie",
                    "GD Pâtisserie (Demo)",
                    "E-commerce Next.js & Prisma",
                    "https://gd-patisserie.dynv6.net",
                ),
            ],
        }
    }
}

impl ProberConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Logging {
    pub fn level_filter(&self) -> Result<LevelFilter, Error> {
        self.level.parse().map_err(|_| Error::Invalid(format!("unknown log level `{}`", self.level)))
    }

    pub fn log_format(&self) -> Result<LogFormat, Error> {
        self.format.parse().map_err(Error::Invalid)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/pingboard/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("pingboard/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path.display())?;
        write_1(f, "Pool Size", &self.database.pool_size)?;
        write_title_1(f, "Prober")?;
        write_1(f, "Interval (s)", &self.prober.interval_seconds)?;
        write_1(f, "Timeout (ms)", &self.prober.timeout_ms)?;
        write_title_1(f, "Logging")?;
        write_1(f, "Level", &self.logging.level)?;
        write_1(f, "Format", &self.logging.format)?;
        write_title_1(f, "Targets")?;
        for target in &self.targets {
            write_1(f, target.id.as_str(), &target.name)?;
            write_2(f, "URL", &target.url)?;
        }

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/pingboard/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust,ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path = Self::resolve_path(optional_path)?;

        let config: Self = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(Error::ReadFailed)?;
            toml::from_str(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Where [`Config::from_config`] reads (or writes) the config for `optional_path`
    pub fn resolve_path(
        optional_path: Option<impl AsRef<path::Path>>,
    ) -> Result<path::PathBuf, Error> {
        match optional_path {
            Some(path) => Ok(normalize_toml_path(path.as_ref())),
            None => default_config_path(),
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(Error::WriteFailed)
    }

    /// Apply overrides from the environment (`PORT`)
    pub fn apply_env_overrides(&mut self) -> Result<(), Error> {
        if let Ok(port) = env::var("PORT") {
            self.server.port =
                port.parse().map_err(|_| Error::Invalid(format!("PORT `{port}` is not a valid port")))?;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with. Target checks live in
    /// [`crate::registry::TargetRegistry::new`].
    pub fn validate(&self) -> Result<(), Error> {
        if self.prober.interval_seconds == 0 {
            return Err(Error::Invalid("prober.interval_seconds must be positive".into()));
        }
        if self.prober.timeout_ms == 0 {
            return Err(Error::Invalid("prober.timeout_ms must be positive".into()));
        }
        if self.database.pool_size == 0 {
            return Err(Error::Invalid("database.pool_size must be positive".into()));
        }
        self.logging.level_filter()?;
        self.logging.log_format()?;
        Ok(())
    }
}
