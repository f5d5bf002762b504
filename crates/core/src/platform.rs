use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Operating-system family, which decides the executable name and the
/// well-known installation roots that get searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Mac,
    Unix,
}

impl Platform {
    /// Classify an OS name. Anything that is neither "win" nor "mac" is Unix.
    pub fn from_os_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("win") {
            Platform::Windows
        } else if name.contains("mac") {
            Platform::Mac
        } else {
            Platform::Unix
        }
    }

    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn java_executable(self) -> &'static str {
        match self {
            Platform::Windows => "java.exe",
            Platform::Mac | Platform::Unix => "java",
        }
    }

    /// Separator used between entries of the executable search path.
    pub fn path_list_separator(self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::Mac | Platform::Unix => ':',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Mac => "mac",
            Platform::Unix => "unix",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "platform",
                value: s.to_string(),
                stage: "platform.parse",
            });
        }
        Ok(Self::from_os_name(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_os_names_case_insensitively() {
        assert_eq!(Platform::from_os_name("Windows 11"), Platform::Windows);
        assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
        assert_eq!(Platform::from_os_name("Mac OS X"), Platform::Mac);
        assert_eq!(Platform::from_os_name("macos"), Platform::Mac);
        assert_eq!(Platform::from_os_name("Linux"), Platform::Unix);
        assert_eq!(Platform::from_os_name("FreeBSD"), Platform::Unix);
        assert_eq!(Platform::from_os_name(""), Platform::Unix);
    }

    #[test]
    fn executable_name_and_separator_follow_platform() {
        assert_eq!(Platform::Windows.java_executable(), "java.exe");
        assert_eq!(Platform::Unix.java_executable(), "java");
        assert_eq!(Platform::Mac.path_list_separator(), ':');
        assert_eq!(Platform::Windows.path_list_separator(), ';');
    }

    #[test]
    fn parse_rejects_blank_names() {
        assert!("  ".parse::<Platform>().is_err());
        assert_eq!("mac".parse::<Platform>().unwrap(), Platform::Mac);
    }
}
