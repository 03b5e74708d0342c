use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Inbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. "0.0.0.0:8080".
    pub bind: String,
    /// Directory served for every path other than `/suggest`.
    pub static_dir: PathBuf,
    /// Adds permissive CORS headers and answers preflight requests.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            static_dir: PathBuf::from("frontend"),
            cors: false,
        }
    }
}

/// Endpoints of the three services the pipeline calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub geocoder_url: String,
    pub weather_url: String,
    pub generation_url: String,
    /// Sent on every outbound request; the public geocoder rejects anonymous clients.
    pub user_agent: String,
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            generation_url: "http://localhost:11434/api/generate".to_string(),
            user_agent: concat!("outfit-advisor/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// request_timeout_secs = 60
///
/// [server]
/// bind = "127.0.0.1:3000"
///
/// [upstream]
/// generation_url = "http://gpu-box:11434/api/generate"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound for one whole pipeline run, across all outbound calls.
    pub request_timeout_secs: u64,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.connect_timeout_secs)
    }

    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`; a config that would fail to load again is refused.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "outfit-advisor", "outfit-advisor")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }

        let urls = [
            ("geocoder_url", &self.upstream.geocoder_url),
            ("weather_url", &self.upstream.weather_url),
            ("generation_url", &self.upstream.generation_url),
        ];
        for (name, url) in urls {
            check_url(url).with_context(|| format!("upstream.{name} is not a valid URL: '{url}'"))?;
        }

        Ok(())
    }
}

/// Accepts absolute `http`/`https` URLs, the only kind the upstream clients can call.
pub fn check_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("unsupported scheme '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_services() {
        let cfg = Config::default();

        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.server.static_dir, PathBuf::from("frontend"));
        assert!(!cfg.server.cors);
        assert_eq!(cfg.upstream.generation_url, "http://localhost:11434/api/generate");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            request_timeout_secs = 30

            [upstream]
            generation_url = "http://gpu-box:11434/api/generate"
            "#,
        )
        .expect("partial config must parse");

        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.upstream.generation_url, "http://gpu-box:11434/api/generate");
        assert_eq!(cfg.upstream.weather_url, UpstreamConfig::default().weather_url);
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml("request_timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = Config::from_toml("[upstream]\nweather_url = \"not a url\"").unwrap_err();
        assert!(format!("{err:#}").contains("upstream.weather_url"));
    }

    #[test]
    fn save_then_load_from_explicit_path() {
        let dir = std::env::temp_dir().join(format!("outfit-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.server.cors = true;
        cfg.request_timeout_secs = 45;
        cfg.save_to(&path).expect("save must succeed");

        let loaded = Config::load_from(&path).expect("load must succeed");
        assert_eq!(loaded, cfg);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_refuses_invalid_config() {
        let dir = std::env::temp_dir().join(format!("outfit-config-invalid-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.request_timeout_secs = 0;
        let err = cfg.save_to(&path).unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
        assert!(!path.exists());

        let mut cfg = Config::default();
        cfg.upstream.generation_url = "localhost:11434".into();
        assert!(cfg.save_to(&path).is_err());
        assert!(!path.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn check_url_wants_http() {
        assert!(check_url("http://localhost:11434/api/generate").is_ok());
        assert!(check_url("https://api.open-meteo.com/v1/forecast").is_ok());
        assert!(check_url("ftp://example.com/search").is_err());
        assert!(check_url("not a url").is_err());
    }

    #[test]
    fn rendered_toml_parses_back() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("[upstream]"));
        assert_eq!(Config::from_toml(&rendered).unwrap(), Config::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("outfit-config-does-not-exist.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
