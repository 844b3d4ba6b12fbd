//! # Path visualisation
//!
//! Controllers publish the paths they followed to a [`PathSink`] so the
//! intended and driven trajectories can be compared after a run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::path::PathBuf;

use crate::path::Path;
use util::session::SessionSaver;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Receives named paths for display.
pub trait PathSink {
    fn send_path(&mut self, path: &Path, name: &str);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Discards all paths.
#[derive(Debug, Default)]
pub struct NullPathSink;

/// Saves paths as JSON in the session directory.
pub struct SessionPathSink {
    saver: SessionSaver,

    /// Session-relative directory paths are saved into
    dir: PathBuf,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSink for NullPathSink {
    fn send_path(&mut self, _path: &Path, _name: &str) {}
}

impl SessionPathSink {
    pub fn new(saver: SessionSaver) -> Self {
        Self {
            saver,
            dir: PathBuf::from("paths"),
        }
    }
}

impl PathSink for SessionPathSink {
    fn send_path(&mut self, path: &Path, name: &str) {
        let file = self.dir.join(format!("{}.json", file_stem(name)));

        debug!("Saving \"{}\" ({} points) to {:?}", name, path.len(), file);

        self.saver.save(file, path.clone());
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a display name into a file stem, e.g. `Desired Path` into
/// `desired_path`.
fn file_stem(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            }
            else {
                '_'
            }
        })
        .collect()
}
