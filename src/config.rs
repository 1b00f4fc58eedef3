use failure::{Error, ResultExt};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Tunables which aren't given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub github: GitHubConfig,
    pub progress: ProgressConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        debug!("Reading config from {}", path.display());

        let text = fs::read_to_string(path)
            .with_context(|_| format!("Unable to read {}", path.display()))?;

        Config::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Config, Error> {
        let cfg = toml::from_str(text).context("Invalid config")?;
        Ok(cfg)
    }

    /// A config with every setting filled out.
    pub fn example() -> Config {
        Config::default()
    }

    pub fn as_toml(&self) -> String {
        match toml::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => unreachable!("Config should always be serializable, {}", e),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct General {
    /// The maximum number of language groups being cloned at any one time.
    ///
    /// A value of `0` means every group gets its own worker.
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_root: String,
    pub agent: String,
    /// The most repositories we'll ask for.
    pub limit: usize,
}

impl GitHubConfig {
    pub const DEFAULT_API_ROOT: &'static str = "https://api.github.com";
    pub const DEFAULT_AGENT: &'static str = "githuber";
    pub const DEFAULT_LIMIT: usize = 20;
}

impl Default for GitHubConfig {
    fn default() -> GitHubConfig {
        GitHubConfig {
            api_root: GitHubConfig::DEFAULT_API_ROOT.to_string(),
            agent: GitHubConfig::DEFAULT_AGENT.to_string(),
            limit: GitHubConfig::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// How long a clone can go without a heartbeat, in seconds.
    pub heartbeat_secs: u64,
}

impl ProgressConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

impl Default for ProgressConfig {
    fn default() -> ProgressConfig {
        ProgressConfig { heartbeat_secs: 10 }
    }
}
