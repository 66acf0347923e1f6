//! Config file location.
//!
//! A [`SearchPath`] names the directory that holds the config file; the
//! builder joins it with the file name. Only one file is ever read and
//! written, so every variant resolves to exactly one directory.

use std::path::PathBuf;

use crate::error::ClapfillError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// The full path of the config file: `{resolved location}/{file_name}`.
///
/// # Errors
///
/// [`ClapfillError::NoConfigPath`] when the location cannot be resolved.
pub fn config_path(
    location: &SearchPath,
    file_name: &str,
    app_name: &str,
) -> Result<PathBuf, ClapfillError> {
    let path = resolve_search_path(location, app_name)
        .map(|dir| dir.join(file_name))
        .ok_or(ClapfillError::NoConfigPath)?;
    tracing::debug!(path = %path.display(), "resolved config file");
    Ok(path)
}
