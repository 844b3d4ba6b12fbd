//! Host platform utility functions

use std::{env, path::PathBuf};
use thiserror::Error;

/// Environment variable pointing at the root of the software checkout. The
/// `params` and `sessions` directories are resolved relative to it.
pub const SW_ROOT_ENV_VAR: &str = "MOCON_SW_ROOT";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable ({0}) is not set")]
    SwRootNotSet(&'static str),
}

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, HostError> {
    env::var_os(SW_ROOT_ENV_VAR)
        .map(PathBuf::from)
        .ok_or(HostError::SwRootNotSet(SW_ROOT_ENV_VAR))
}
