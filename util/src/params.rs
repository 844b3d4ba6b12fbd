//! Generic parameters functions
//!
//! Parameter files are TOML, stored in the `params` directory under the
//! software root. Parameter structs are expected to provide a default for
//! every key (`#[serde(default)]`) so that a partial file only overrides the
//! keys it names.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::de::DeserializeOwned;
use std::{fs::read_to_string, io::ErrorKind, path::{Path, PathBuf}};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable ({}) is not set", crate::host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot load the parmeter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file {0:?}: {1}")]
    DeserialiseError(PathBuf, toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the full path to a parameter file.
///
/// The file path is relative to the "params" directory in the software root.
pub fn param_file_path(param_file_path: &str) -> Result<PathBuf, LoadError> {
    let mut path = crate::host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    Ok(path)
}

/// Load a parameter file
///
/// The file path is relative to the "params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    load_from(self::param_file_path(param_file_path)?)
}

/// Load a parameter file from an explicit path.
pub fn load_from<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    let path = path.as_ref();

    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(path.to_path_buf(), e))
    };

    from_str(&params_str)
        .map_err(|e| LoadError::DeserialiseError(path.to_path_buf(), e))
}

/// Load a parameter file, falling back to the default parameters if the file
/// does not exist.
///
/// A file which exists but cannot be read or parsed is still an error.
pub fn load_or_default<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned + Default
{
    match load(param_file_path) {
        Ok(p) => Ok(p),
        Err(LoadError::FileLoadError(path, e)) if e.kind() == ErrorKind::NotFound => {
            warn!("Parameter file {:?} not found, using defaults", path);
            Ok(P::default())
        },
        Err(e) => Err(e)
    }
}

/// Parse parameters from a TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, toml::de::Error>
where
    P: DeserializeOwned
{
    toml::from_str(params_str)
}
