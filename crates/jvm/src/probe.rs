use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use jvmscan_core::ScanConfig;
use snafu::{ResultExt, Snafu};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    time::timeout,
};
use tracing::{debug, trace, warn};

use crate::keys::PropertyKeys;

/// Arguments that make a launcher print its system properties and exit.
pub const PROBE_ARGS: [&str; 2] = ["-XshowSettings:properties", "-version"];

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProbeError {
    #[snafu(display("cannot start `{}`: {source}", path.display()))]
    Spawn {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("io failed while reading `{}`: {source}", path.display()))]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("`{}` did not exit within {timeout:?}", path.display()))]
    Timeout { path: PathBuf, timeout: Duration },
    #[snafu(display("`{}` reported none of the requested properties", path.display()))]
    NoProperties { path: PathBuf },
}

/// Requested properties reported by one runtime, in requested-key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbedProperties {
    entries: Vec<(String, String)>,
}

impl ProbedProperties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Pick the requested `key = value` lines out of a launcher's output.
///
/// Lines without `=`, or starting with it, are ignored. A key reported
/// twice keeps its last value.
pub fn parse_properties(output: &str, keys: &PropertyKeys) -> ProbedProperties {
    let mut found: HashMap<&str, &str> = HashMap::new();
    for line in output.split(is_line_break) {
        let line = line.trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let key = key.trim();
        if keys.contains(key) {
            found.insert(key, value.trim());
        }
    }

    let entries = keys
        .iter()
        .filter_map(|key| found.get(key).map(|value| (key.to_string(), value.to_string())))
        .collect();
    ProbedProperties { entries }
}

/// Runs a launcher once and reads back its properties, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct Probe {
    timeout: Duration,
}

impl Probe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `path`, collapsing every failure to an empty result.
    pub async fn probe(&self, path: &Path, keys: &PropertyKeys) -> ProbedProperties {
        match self.try_probe(path, keys).await {
            Ok(properties) => properties,
            Err(err @ ProbeError::Timeout { .. }) => {
                warn!(error = %err, "probe timed out");
                ProbedProperties::default()
            }
            Err(err) => {
                debug!(error = %err, "probe yielded nothing");
                ProbedProperties::default()
            }
        }
    }

    /// Probe `path` and say why it produced nothing.
    pub async fn try_probe(&self, path: &Path, keys: &PropertyKeys) -> ProbeResult<ProbedProperties> {
        let output = self.capture(path).await?;
        let properties = parse_properties(&output, keys);
        if properties.is_empty() {
            return NoPropertiesSnafu { path }.fail();
        }
        debug!(path = %path.display(), properties = properties.len(), "probe succeeded");
        Ok(properties)
    }

    /// Run the launcher and return stdout followed by stderr as one text.
    async fn capture(&self, path: &Path) -> ProbeResult<String> {
        let mut child = Command::new(path)
            .args(PROBE_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context(SpawnSnafu { path })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (out, err) = tokio::try_join!(drain(stdout), drain(stderr))?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        };
        let finished = timeout(self.timeout, run).await;

        match finished {
            Ok(Ok((status, out, err))) => {
                trace!(path = %path.display(), %status, "launcher exited");
                let mut text = String::from_utf8_lossy(&out).into_owned();
                text.push('\n');
                text.push_str(&String::from_utf8_lossy(&err));
                Ok(text)
            }
            Ok(Err(source)) => {
                reap(&mut child).await;
                Err(source).context(IoSnafu { path })
            }
            Err(_) => {
                reap(&mut child).await;
                TimeoutSnafu {
                    path,
                    timeout: self.timeout,
                }
                .fail()
            }
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the child and wait for it so no zombie is left behind.
async fn reap(child: &mut tokio::process::Child) {
    if let Err(err) = child.kill().await {
        debug!(error = %err, "failed to kill launcher");
    }
}
