//! # Path
//!
//! A path is an ordered sequence of poses recorded while driving, which the
//! path-following controller replays. Paths are stored as CSV with one
//! `x,y,heading` record per line and no header. Lines starting with `#` are
//! comments.
//!
//! A path with fewer than 2 points, or one which failed to load, is invalid
//! and exposes no points.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod recorder;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;
use std::{fs::File, io::Read, path::Path as FsPath};

// Internal
pub use recorder::*;
use util::geom::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum number of points in a valid path.
pub const MIN_PATH_POINTS: usize = 2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An immutable sequence of poses.
#[derive(Clone, Debug, Serialize)]
pub struct Path {
    points: Vec<Pose>,
    valid: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Cannot open the path file: {0}")]
    OpenError(std::io::Error),

    #[error("Cannot parse the path: {0}")]
    ParseError(csv::Error),

    #[error("Expected at least {} points in the path, found {0}", MIN_PATH_POINTS)]
    TooFewPoints(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Load a path from a file.
    ///
    /// Never fails. If the file cannot be read or parsed the returned path is
    /// invalid and the cause is logged.
    pub fn load<P: AsRef<FsPath>>(source: P) -> Self {
        let source = source.as_ref();

        let result = File::open(source)
            .map_err(PathError::OpenError)
            .and_then(Self::try_parse);

        match result {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not load path from {:?}: {}", source, e);
                Self::invalid()
            }
        }
    }

    /// Parse a path from any reader, following the same rules as
    /// [`Path::load`].
    pub fn parse<R: Read>(reader: R) -> Self {
        match Self::try_parse(reader) {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not parse path: {}", e);
                Self::invalid()
            }
        }
    }

    /// Build a path from a list of points, which is valid if it has at least
    /// [`MIN_PATH_POINTS`] points.
    pub fn from_points(points: Vec<Pose>) -> Self {
        let valid = points.len() >= MIN_PATH_POINTS;

        if valid {
            Self { points, valid }
        }
        else {
            Self::invalid()
        }
    }

    /// An invalid path with no points.
    pub fn invalid() -> Self {
        Self {
            points: Vec::new(),
            valid: false,
        }
    }

    /// The points in the path, or `None` if the path is invalid.
    pub fn points(&self) -> Option<&[Pose]> {
        if self.valid {
            Some(&self.points)
        }
        else {
            None
        }
    }

    /// Number of points in the path, 0 if invalid.
    pub fn len(&self) -> usize {
        self.points().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Total length of the path's polyline.
    ///
    /// Units: inches
    pub fn length_in(&self) -> f64 {
        self.points().map(polyline_length).unwrap_or(0.0)
    }

    fn try_parse<R: Read>(reader: R) -> Result<Self, PathError> {
        let mut csv_reader = csv_reader_builder().from_reader(reader);

        let mut points = Vec::new();

        for record in csv_reader.deserialize::<(f64, f64, f64)>() {
            let (x, y, heading_deg) = record.map_err(PathError::ParseError)?;
            points.push(Pose::new(x, y, heading_deg));
        }

        if points.len() < MIN_PATH_POINTS {
            return Err(PathError::TooFewPoints(points.len()));
        }

        Ok(Self::from_points(points))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sum of the distances between consecutive poses.
pub fn polyline_length(poses: &[Pose]) -> f64 {
    poses
        .windows(2)
        .map(|w| w[0].distance_to(&w[1]))
        .sum()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn csv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All);

    builder
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let src = "\
# recorded path
0,0,0
0,10.5,0

-3.25,20,15.5
";
        let path = Path::parse(src.as_bytes());

        assert!(path.is_valid());
        assert_eq!(path.len(), 3);

        let points = path.points().unwrap();
        assert_eq!(points[1], Pose::new(0.0, 10.5, 0.0));
        assert_eq!(points[2], Pose::new(-3.25, 20.0, 15.5));
    }

    #[test]
    fn test_parse_wraps_heading() {
        let path = Path::parse("0,0,-90\n1,1,720\n".as_bytes());

        let points = path.points().unwrap();
        assert_eq!(points[0].heading_deg(), 270.0);
        assert_eq!(points[1].heading_deg(), 0.0);
    }

    #[test]
    fn test_invalid_paths() {
        // Single point
        let path = Path::parse("0,0,0\n".as_bytes());
        assert!(!path.is_valid());
        assert!(path.points().is_none());
        assert_eq!(path.len(), 0);

        // Empty
        assert!(!Path::parse("".as_bytes()).is_valid());

        // Bad number
        assert!(!Path::parse("0,0,0\n1,abc,0\n".as_bytes()).is_valid());

        // Wrong number of fields
        assert!(!Path::parse("0,0,0\n1,2\n".as_bytes()).is_valid());

        // Missing file
        assert!(!Path::load("/this/path/does/not/exist.txt").is_valid());
    }

    #[test]
    fn test_from_points() {
        assert!(!Path::from_points(vec![Pose::default()]).is_valid());

        let path = Path::from_points(vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(0.0, 3.0, 0.0),
            Pose::new(4.0, 6.0, 0.0),
        ]);

        assert!(path.is_valid());
        assert!((path.length_in() - 8.0).abs() < 1e-9);
        assert_eq!(Path::invalid().length_in(), 0.0);
    }
}
