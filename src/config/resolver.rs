//! Connectivity configuration precedence.
//!
//! 1. `--endpoint` (with `--auth-header` / `--insecure`) on the command line
//! 2. A config file passed with `--config`
//! 3. The default config file (`$DROVE_CONFIG`, else `~/.drove`)

use crate::client::SessionConfig;
use crate::config::models::DroveConfigSection;
use crate::constants;
use crate::error::Error;
use ::config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Connectivity values given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub config: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub auth_header: Option<String>,
    pub insecure: bool,
}

/// Location of the default config file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(constants::ENV_DROVE_CONFIG) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(constants::DEFAULT_CONFIG_FILE))
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Reads the `[drove]` section of an INI config file.
///
/// # Errors
/// Returns `ConfigParse` naming the file when it cannot be read, is not valid
/// INI, lacks the section, or lacks an endpoint.
pub fn load_config_file(path: &Path) -> Result<DroveConfigSection, Error> {
    debug!(target: "drove::config", path = %path.display(), "loading config file");

    let settings = Config::builder()
        .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini))
        .build()
        .map_err(|e| Error::config_parse(path, e))?;

    let section: DroveConfigSection = settings
        .get(constants::CONFIG_SECTION)
        .map_err(|e| Error::config_parse(path, e))?;

    if section.endpoint.trim().is_empty() {
        return Err(Error::config_parse(path, "endpoint must not be empty"));
    }
    Ok(section)
}

/// Resolves the session settings. Performs no network I/O.
///
/// # Errors
/// `ConfigResolution` when no endpoint can be found, `ConfigParse` when a
/// config file exists but is unusable.
pub fn resolve_session(
    overrides: &ConnectionOverrides,
    default_config: Option<&Path>,
) -> Result<SessionConfig, Error> {
    let auth_override = non_empty(overrides.auth_header.as_ref());

    if let Some(endpoint) = non_empty(overrides.endpoint.as_ref()) {
        debug!(target: "drove::config", %endpoint, "using endpoint from command line");
        return Ok(SessionConfig {
            endpoint,
            auth_header: auth_override,
            insecure: overrides.insecure,
        });
    }

    let config_file = match &overrides.config {
        Some(explicit) => {
            let path = expand_path(explicit);
            if !path.is_file() {
                return Err(Error::config_resolution(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            Some(path)
        }
        None => default_config.filter(|path| path.is_file()).map(Path::to_path_buf),
    };

    let Some(path) = config_file else {
        return Err(Error::config_resolution(constants::ERR_NO_ENDPOINT));
    };

    let section = load_config_file(&path)?;
    debug!(
        target: "drove::config",
        path = %path.display(),
        endpoint = %section.endpoint,
        "using endpoint from config file"
    );
    Ok(SessionConfig {
        auth_header: auth_override.or_else(|| section.auth_header().map(str::to_string)),
        insecure: overrides.insecure || section.is_insecure(),
        endpoint: section.endpoint.trim().to_string(),
    })
}
