use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::Deserialize;
use snafu::ResultExt;

use crate::{
    error::{ConfigResult, InvalidValueSnafu, SettingsIoSnafu, SettingsParseSnafu},
    platform::Platform,
};

/// Variables that conventionally point at a runtime root.
pub const RUNTIME_HOME_VARS: [&str; 3] = ["JAVA_HOME", "JDK_HOME", "JRE_HOME"];
pub const SEARCH_PATH_VAR: &str = "PATH";
/// SDKMAN keeps one directory per installed version under `<dir>/java`.
pub const VERSION_MANAGER_VAR: &str = "SDKMAN_CANDIDATES_DIR";
pub const PROGRAM_FILES_VARS: [&str; 3] = ["ProgramFiles", "ProgramFiles(x86)", "ProgramW6432"];

pub const TIMEOUT_ENV: &str = "JVMSCAN_TIMEOUT_SECS";
pub const PLATFORM_ENV: &str = "JVMSCAN_PLATFORM";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot of the environment variables consulted during discovery.
///
/// Empty values are dropped at construction so lookups never have to
/// distinguish "unset" from "set to nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Capture every variable the collector knows about from the process environment.
    pub fn capture() -> Self {
        let names = RUNTIME_HOME_VARS
            .into_iter()
            .chain(PROGRAM_FILES_VARS)
            .chain([SEARCH_PATH_VAR, VERSION_MANAGER_VAR]);

        Self::from_pairs(names.filter_map(|name| {
            // Lossy so that one garbage byte in PATH does not hide the rest of it.
            std::env::var_os(name).map(|value| (name, value.to_string_lossy().into_owned()))
        }))
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Optional on-disk settings (`config.json` in the platform config dir).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub timeout_secs: Option<u64>,
    pub workers: Option<usize>,
    pub extra_roots: Vec<PathBuf>,
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "jvmscan", "jvmscan").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load settings from `path`. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> ConfigResult<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).context(SettingsIoSnafu {
                    path: path.to_path_buf(),
                    stage: "settings.read",
                });
            }
        };

        let settings = serde_json::from_slice(&bytes).context(SettingsParseSnafu {
            path: path.to_path_buf(),
            stage: "settings.parse",
        })?;
        Ok(Some(settings))
    }
}

/// Everything the collector and probe need, resolved once up front.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub platform: Platform,
    pub env: EnvVars,
    /// Installation directory of the runtime this tool is running from, if any.
    pub runtime_home: Option<PathBuf>,
    /// Prefix for the absolute well-known roots on Mac and Unix.
    pub sysroot: PathBuf,
    /// Ad-hoc roots searched like `/usr/lib/jvm` after the platform roots.
    pub extra_roots: Vec<PathBuf>,
    pub timeout: Duration,
    pub workers: usize,
}

impl ScanConfig {
    /// Bare configuration with defaults and no runtime home.
    pub fn new(platform: Platform, env: EnvVars) -> Self {
        Self {
            platform,
            env,
            runtime_home: None,
            sysroot: PathBuf::from("/"),
            extra_roots: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            workers: 1,
        }
    }

    /// Build the configuration for this process: detected platform, captured
    /// environment, the settings file and `JVMSCAN_*` overrides.
    pub fn from_environment() -> ConfigResult<Self> {
        let platform = match std::env::var(PLATFORM_ENV) {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => Platform::detect(),
        };

        let mut config = Self::new(platform, EnvVars::capture());
        config.runtime_home = current_runtime_home();

        if let Some(path) = Settings::default_path()
            && let Some(settings) = Settings::load(&path)?
        {
            tracing::debug!(path = %path.display(), "applying settings file");
            config.apply_settings(&settings)?;
        }

        if let Ok(value) = std::env::var(TIMEOUT_ENV)
            && !value.is_empty()
        {
            config.timeout = parse_timeout_secs(&value)?;
        }

        Ok(config)
    }

    pub fn apply_settings(&mut self, settings: &Settings) -> ConfigResult<()> {
        if let Some(secs) = settings.timeout_secs {
            self.timeout = timeout_from_secs(secs, "timeout_secs")?;
        }
        if let Some(workers) = settings.workers {
            self.workers = workers.max(1);
        }
        self.extra_roots.extend(settings.extra_roots.iter().cloned());
        Ok(())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_sysroot(mut self, sysroot: impl Into<PathBuf>) -> Self {
        self.sysroot = sysroot.into();
        self
    }

    pub fn with_runtime_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.runtime_home = Some(home.into());
        self
    }

    /// Re-root an absolute well-known path under `sysroot`.
    pub fn rooted(&self, absolute: &str) -> PathBuf {
        self.sysroot.join(absolute.trim_start_matches('/'))
    }
}

/// Whole seconds, at least one; a zero timeout would fail every probe.
pub fn parse_timeout_secs(value: &str) -> ConfigResult<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) => timeout_from_secs(secs, TIMEOUT_ENV),
        Err(_) => InvalidValueSnafu {
            name: TIMEOUT_ENV,
            value,
            stage: "config.timeout",
        }
        .fail(),
    }
}

fn timeout_from_secs(secs: u64, name: &'static str) -> ConfigResult<Duration> {
    if secs == 0 {
        return InvalidValueSnafu {
            name,
            value: "0",
            stage: "config.timeout",
        }
        .fail();
    }
    Ok(Duration::from_secs(secs))
}

/// `<home>/bin/<tool>` layout: the home is two levels above the executable.
fn current_runtime_home() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent()?.parent().map(Path::to_path_buf)
}
