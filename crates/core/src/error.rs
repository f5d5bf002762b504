use std::path::PathBuf;

use snafu::Snafu;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("io failed during `{stage}` for `{}`: {source}", path.display()))]
    SettingsIo {
        source: std::io::Error,
        path: PathBuf,
        stage: &'static str,
    },
    #[snafu(display("failed during `{stage}` for `{}`: {source}", path.display()))]
    SettingsParse {
        source: serde_json::Error,
        path: PathBuf,
        stage: &'static str,
    },
    #[snafu(display("invalid value `{value}` for `{name}` during `{stage}`"))]
    InvalidValue {
        name: &'static str,
        value: String,
        stage: &'static str,
    },
}
