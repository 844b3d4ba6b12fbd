//! # Path recorder
//!
//! Records the poses driven during a run so they can be replayed later.
//! Poses are buffered in memory each cycle and only written to disk when the
//! recorder is closed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use std::{
    fs::File,
    path::{Path as FsPath, PathBuf},
};

use util::geom::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct PathRecorder {
    file_path: PathBuf,

    writer: Option<csv::Writer<File>>,

    buffer: Vec<Pose>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Cannot create the record file {0:?}: {1}")]
    CreateError(PathBuf, std::io::Error),

    #[error("Cannot write to the record file {0:?}: {1}")]
    WriteError(PathBuf, csv::Error),

    #[error("Cannot flush the record file {0:?}: {1}")]
    FlushError(PathBuf, std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathRecorder {
    pub fn new<P: AsRef<FsPath>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            writer: None,
            buffer: Vec::new(),
        }
    }

    /// Create (or truncate) the record file and clear the buffer.
    pub fn open(&mut self) -> Result<(), RecorderError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecorderError::CreateError(self.file_path.clone(), e))?;
        }

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.file_path)
            .map_err(|e| RecorderError::WriteError(self.file_path.clone(), e))?;

        self.writer = Some(writer);
        self.buffer.clear();

        debug!("Opened record file {:?}", self.file_path);

        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Append a pose to the recording.
    pub fn record(&mut self, pose: Pose) {
        if !self.is_open() {
            warn!("Attempted to record a pose while the recorder is closed");
            return;
        }

        self.buffer.push(pose);
    }

    /// Poses recorded since the recorder was opened.
    pub fn recorded(&self) -> &[Pose] {
        &self.buffer
    }

    pub fn file_path(&self) -> &FsPath {
        &self.file_path
    }

    /// Write all recorded poses and close the file.
    ///
    /// Returns the number of poses written. Closing a recorder which isn't
    /// open writes nothing.
    pub fn close(&mut self) -> Result<usize, RecorderError> {
        let mut writer = match self.writer.take() {
            Some(w) => w,
            None => return Ok(0),
        };

        for pose in self.buffer.iter() {
            writer
                .serialize((pose.x(), pose.y(), pose.heading_deg()))
                .map_err(|e| RecorderError::WriteError(self.file_path.clone(), e))?;
        }

        writer
            .flush()
            .map_err(|e| RecorderError::FlushError(self.file_path.clone(), e))?;

        debug!(
            "Wrote {} poses to record file {:?}",
            self.buffer.len(),
            self.file_path
        );

        Ok(self.buffer.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::Path;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ctrl_exec_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_record_then_load() {
        let file = temp_file("record_then_load.txt");
        let poses = vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(0.1, 1.0 / 3.0, 359.9),
            Pose::new(-12.5, 40.0, 91.25),
        ];

        let mut recorder = PathRecorder::new(&file);
        recorder.open().unwrap();
        for p in poses.iter() {
            recorder.record(*p);
        }
        assert_eq!(recorder.recorded(), &poses[..]);
        assert_eq!(recorder.close().unwrap(), 3);
        assert!(!recorder.is_open());

        let path = Path::load(&file);
        assert_eq!(path.points().unwrap(), &poses[..]);
    }

    #[test]
    fn test_reopen_truncates() {
        let file = temp_file("reopen_truncates.txt");

        let mut recorder = PathRecorder::new(&file);
        recorder.open().unwrap();
        for i in 0..5 {
            recorder.record(Pose::new(0.0, i as f64, 0.0));
        }
        recorder.close().unwrap();

        recorder.open().unwrap();
        assert!(recorder.recorded().is_empty());
        recorder.record(Pose::new(1.0, 1.0, 0.0));
        recorder.record(Pose::new(2.0, 2.0, 0.0));
        assert_eq!(recorder.close().unwrap(), 2);

        assert_eq!(Path::load(&file).len(), 2);
    }

    #[test]
    fn test_closed_recorder() {
        let mut recorder = PathRecorder::new(temp_file("never_opened.txt"));

        recorder.record(Pose::default());
        assert!(recorder.recorded().is_empty());
        assert_eq!(recorder.close().unwrap(), 0);
    }
}
