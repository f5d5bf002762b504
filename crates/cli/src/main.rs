//! jvmscan - list every Java runtime installed on this machine.
//!
//! Usage:
//!   jvmscan java.home os.arch          # properties of this host
//!   jvmscan --list                     # scan with the default property set
//!   jvmscan --scan java.version        # scan for selected properties
//!   jvmscan --list --format json -j 4  # JSON output, four probes at once

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, ValueEnum};
use jvmscan_core::{Platform, Result, ScanConfig};
use jvmscan_jvm::{HostProperties, PropertyKeys, ScanError, Scanner};
use tracing::{debug, info};

const USAGE: &str = "Usage: jvmscan <properties...> | --list [properties...]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Discover installed Java runtimes and report their system properties.
#[derive(Debug, Parser)]
#[command(name = "jvmscan", version, about)]
struct Args {
    /// Property keys to print. In scan mode an empty list means the default set.
    #[arg(value_name = "PROPERTY")]
    properties: Vec<String>,

    /// Scan the machine for Java runtimes instead of reading host properties.
    #[arg(long, visible_alias = "scan")]
    list: bool,

    /// Output format for scan results.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Seconds to wait for each runtime before giving up on it.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Number of runtimes probed at once.
    #[arg(short = 'j', long, value_name = "N")]
    jobs: Option<usize>,

    /// Treat the host as this platform (windows, mac, unix).
    #[arg(long, value_name = "NAME")]
    platform: Option<Platform>,

    /// Installation directory of the runtime this tool belongs to.
    #[arg(long, value_name = "DIR")]
    java_home: Option<PathBuf>,

    /// Extra directory holding one runtime per subdirectory. Repeatable.
    #[arg(long = "root", value_name = "DIR")]
    roots: Vec<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<ScanConfig> {
        let mut config = ScanConfig::from_environment()?;
        if let Some(platform) = self.platform {
            config.platform = platform;
        }
        if let Some(home) = &self.java_home {
            config.runtime_home = Some(home.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(jobs) = self.jobs {
            config = config.with_workers(jobs);
        }
        config.extra_roots.extend(self.roots.iter().cloned());
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    jvmscan_core::init_tracing()?;

    let args = Args::parse();
    if !check_usage(&args, &mut io::stderr())? {
        return Ok(ExitCode::FAILURE);
    }

    let config = args.config()?;
    debug!(?config, "resolved configuration");

    if args.list {
        scan(config, &args).await
    } else {
        let host = HostProperties::current(&config);
        let mut out = io::stdout().lock();
        let all_found = lookup(&host, &args.properties, &mut out)?;
        out.flush()?;
        Ok(if all_found {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// Without `--list` at least one property is required; prints usage otherwise.
fn check_usage(args: &Args, err: &mut impl Write) -> io::Result<bool> {
    if args.list || !args.properties.is_empty() {
        return Ok(true);
    }
    writeln!(err, "{USAGE}")?;
    Ok(false)
}

async fn scan(config: ScanConfig, args: &Args) -> Result<ExitCode> {
    let keys = PropertyKeys::or_defaults(args.properties.clone());
    let report = match Scanner::new(config).scan(&keys).await {
        Ok(report) => report,
        Err(err @ ScanError::NothingFound { .. }) => {
            info!(error = %err, "nothing to report");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut out = io::stdout().lock();
    match args.format {
        Format::Text => report.write_text(&mut out)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// Print each found property. Returns `false` if any of them is missing.
fn lookup(host: &HostProperties, properties: &[String], out: &mut impl Write) -> io::Result<bool> {
    let mut missing_some = false;

    for property in properties {
        match host.get(property) {
            Some(value) => writeln!(out, "{property}={value}")?,
            None => missing_some = true,
        }
    }

    Ok(!missing_some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn scan_is_an_alias_for_list() {
        let args = Args::try_parse_from(["jvmscan", "java.version", "--scan", "os.arch"]).unwrap();
        assert!(args.list);
        assert_eq!(args.properties, vec!["java.version", "os.arch"]);
    }

    #[test]
    fn overrides_parse() {
        let args = Args::try_parse_from([
            "jvmscan",
            "--list",
            "--format",
            "json",
            "-j",
            "4",
            "--timeout",
            "2",
            "--platform",
            "Windows 10",
            "--root",
            "/srv/a",
            "--root",
            "/srv/b",
        ])
        .unwrap();
        assert_eq!(args.format, Format::Json);
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.timeout, Some(2));
        assert_eq!(args.platform, Some(Platform::Windows));
        assert_eq!(args.roots.len(), 2);
        assert!(args.properties.is_empty());
    }

    fn host() -> HostProperties {
        HostProperties::from_pairs([
            ("os.name", "Linux".to_string()),
            ("os.arch", "amd64".to_string()),
        ])
    }

    fn props(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn lookup_prints_all_found_properties() {
        let mut out = Vec::new();
        assert!(lookup(&host(), &props(&["os.arch", "os.name"]), &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "os.arch=amd64\nos.name=Linux\n");
    }

    #[test]
    fn lookup_fails_on_missing_property_but_prints_the_rest() {
        let mut out = Vec::new();
        assert!(!lookup(&host(), &props(&["os.name", "java.home", "os.arch"]), &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "os.name=Linux\nos.arch=amd64\n");
    }

    #[test]
    fn no_arguments_prints_usage_and_fails() {
        let args = Args::try_parse_from(["jvmscan"]).unwrap();
        let mut err = Vec::new();
        assert!(!check_usage(&args, &mut err).unwrap());
        assert_eq!(String::from_utf8(err).unwrap(), format!("{USAGE}\n"));

        let args = Args::try_parse_from(["jvmscan", "--list"]).unwrap();
        assert!(check_usage(&args, &mut Vec::new()).unwrap());
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        assert!(Args::try_parse_from(["jvmscan", "--list", "--timeout", "0"]).is_err());
        assert!(Args::try_parse_from(["jvmscan", "--list", "--timeout", "1"]).is_ok());
    }
}
