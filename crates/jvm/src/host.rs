//! Properties of the host this tool itself runs on, for direct lookups.

use directories::BaseDirs;
use jvmscan_core::{Platform, ScanConfig};

use crate::candidate::Candidate;

#[derive(Debug, Clone, Default)]
pub struct HostProperties {
    entries: Vec<(&'static str, String)>,
}

impl HostProperties {
    pub fn current(config: &ScanConfig) -> Self {
        let mut props = Self::default();
        let platform = config.platform;

        props.set("os.name", os_name(std::env::consts::OS));
        props.set("os.arch", os_arch(std::env::consts::ARCH));
        props.set("os.family", platform.as_str().to_string());
        props.set(
            "file.separator",
            match platform {
                Platform::Windows => "\\",
                Platform::Mac | Platform::Unix => "/",
            }
            .to_string(),
        );
        props.set("path.separator", platform.path_list_separator().to_string());
        props.set(
            "line.separator",
            match platform {
                Platform::Windows => "\r\n",
                Platform::Mac | Platform::Unix => "\n",
            }
            .to_string(),
        );
        if let Ok(dir) = std::env::current_dir() {
            props.set("user.dir", dir.display().to_string());
        }
        if let Some(dirs) = BaseDirs::new() {
            props.set("user.home", dirs.home_dir().display().to_string());
        }
        if let Some(name) = std::env::var("USER")
            .ok()
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|name| !name.is_empty())
        {
            props.set("user.name", name);
        }
        // Only a home that actually holds a launcher counts as a runtime.
        if let Some(home) = &config.runtime_home
            && Candidate::validate(&home.join("bin").join(platform.java_executable())).is_ok()
        {
            props.set("java.home", home.display().to_string());
        }
        props.set("jvmscan.version", env!("CARGO_PKG_VERSION").to_string());
        props
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    fn set(&mut self, key: &'static str, value: String) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn os_name(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "macos" => "Mac OS X".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

fn os_arch(arch: &str) -> String {
    match arch {
        "x86_64" => "amd64".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jvmscan_core::EnvVars;

    #[test]
    fn reports_separators_for_configured_platform() {
        let config = ScanConfig::new(Platform::Windows, EnvVars::default());
        let props = HostProperties::current(&config);
        assert_eq!(props.get("path.separator"), Some(";"));
        assert_eq!(props.get("file.separator"), Some("\\"));
        assert_eq!(props.get("os.family"), Some("windows"));
    }

    #[test]
    fn java_home_absent_without_configured_home() {
        let config = ScanConfig::new(Platform::Unix, EnvVars::default());
        assert_eq!(HostProperties::current(&config).get("java.home"), None);
    }

    #[test]
    fn java_home_absent_when_home_has_no_launcher() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/jvmscan"), "").unwrap();

        let config = ScanConfig::new(Platform::Unix, EnvVars::default()).with_runtime_home(dir.path());
        assert_eq!(HostProperties::current(&config).get("java.home"), None);
    }

    #[test]
    #[cfg(unix)]
    fn java_home_reported_when_home_has_launcher() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let java = dir.path().join("bin/java");
        std::fs::create_dir_all(java.parent().unwrap()).unwrap();
        std::fs::write(&java, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&java, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = ScanConfig::new(Platform::Unix, EnvVars::default()).with_runtime_home(dir.path());
        let expected = dir.path().display().to_string();
        assert_eq!(HostProperties::current(&config).get("java.home"), Some(expected.as_str()));
    }

    #[test]
    fn arch_uses_java_naming() {
        assert_eq!(os_arch("x86_64"), "amd64");
        assert_eq!(os_arch("aarch64"), "aarch64");
        assert_eq!(os_name("macos"), "Mac OS X");
    }
}
