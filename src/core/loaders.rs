//! Loader for closest-voxel LOR position dumps.
//!
//! Each dump is a plain text file with one 3D point per line, coordinates
//! separated by spaces, e.g. `190.048 0 145.172 \n`. The first line holds the
//! original position of the point source, every following line the voxel
//! closest to the source along one line of response.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Sub;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Parse error in {path} line {line}: {message}")]
    ParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Coordinate axis of a [`Point3D`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in x, y, z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lower-case axis label.
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// A point in scanner coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Value along `axis`.
    #[inline]
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Euclidean length of the vector from the origin to this point.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        (*self - *other).norm()
    }

    /// Coordinates as an `[x, y, z]` array.
    #[inline]
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(coords: [f64; 3]) -> Self {
        Point3D::new(coords[0], coords[1], coords[2])
    }
}

/// Parse one dump line into a point.
///
/// The line separator and any trailing delimiter are stripped before the
/// line is split on whitespace. Exactly three numeric tokens are required.
pub fn parse_coordinate_line(line: &str) -> std::result::Result<Point3D, String> {
    let stripped = line.trim_end_matches(&['\n', '\r'][..]).trim_end();
    let tokens: Vec<&str> = stripped.split_whitespace().collect();

    if tokens.len() != 3 {
        return Err(format!(
            "expected 3 coordinates, found {} in {:?}",
            tokens.len(),
            stripped
        ));
    }

    let mut coords = [0.0f64; 3];
    for (slot, token) in coords.iter_mut().zip(&tokens) {
        *slot = token
            .parse()
            .map_err(|_| format!("invalid coordinate value: {}", token))?;
    }

    Ok(Point3D::from(coords))
}

/// Load the original coordinate and the closest-voxel coordinates from a dump.
///
/// # Arguments
///
/// * `path` - Path to the text file written by the view offset test
///
/// # Returns
///
/// A tuple of the original point-source coordinate and the closest voxel
/// for every LOR, in file order.
///
/// # Errors
///
/// Returns an error if the file does not exist, has no lines, or any line
/// is not exactly three numbers.
pub fn load_lor_positions<P: AsRef<Path>>(path: P) -> Result<(Point3D, Vec<Point3D>)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoaderError::FileNotFound(path.to_path_buf()),
        _ => LoaderError::Io(e),
    })?;
    let reader = BufReader::new(file);

    let mut original: Option<Point3D> = None;
    let mut coords = Vec::with_capacity(4096);

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let point = parse_coordinate_line(&line).map_err(|message| LoaderError::ParseError {
            path: path.to_path_buf(),
            line: idx + 1,
            message,
        })?;

        if original.is_none() {
            original = Some(point);
        } else {
            coords.push(point);
        }
    }

    let original = original.ok_or_else(|| LoaderError::EmptyFile(path.to_path_buf()))?;
    log::debug!(
        "{}: original {:?}, {} closest voxels",
        path.display(),
        original.to_array(),
        coords.len()
    );

    Ok((original, coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_point_operations() {
        let a = Point3D::new(1.0, 2.0, 3.0);
        let b = Point3D::new(4.0, 6.0, 3.0);

        let diff = b - a;
        assert_eq!(diff, Point3D::new(3.0, 4.0, 0.0));
        assert_eq!(diff.norm(), 5.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.axis(Axis::Y), 6.0);
        assert_eq!(Axis::Z as usize, 2);
    }

    #[test]
    fn test_parse_line_with_trailing_delimiter() {
        let point = parse_coordinate_line("190.048 0 145.172 \n").unwrap();
        assert_eq!(point, Point3D::new(190.048, 0.0, 145.172));

        let point = parse_coordinate_line("-1.5 2 3e2").unwrap();
        assert_eq!(point, Point3D::new(-1.5, 2.0, 300.0));
    }

    #[test]
    fn test_parse_line_rejects_wrong_token_count() {
        assert!(parse_coordinate_line("1.0 2.0").is_err());
        assert!(parse_coordinate_line("1.0 2.0 3.0 4.0").is_err());
        assert!(parse_coordinate_line("").is_err());
    }

    #[test]
    fn test_parse_line_rejects_non_numeric() {
        let err = parse_coordinate_line("1.0 abc 3.0").unwrap_err();
        assert!(err.contains("abc"));
    }

    #[test]
    fn test_load_lor_positions() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0 ").unwrap();
        writeln!(file, "1 0 0 ").unwrap();
        writeln!(file, "0 2 0 ").unwrap();
        writeln!(file, "10 10 10 ").unwrap();
        file.flush().unwrap();

        let (original, coords) = load_lor_positions(file.path())?;
        assert_eq!(original, Point3D::new(0.0, 0.0, 0.0));
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0], Point3D::new(1.0, 0.0, 0.0));
        assert_eq!(coords[2], Point3D::new(10.0, 10.0, 10.0));

        Ok(())
    }

    #[test]
    fn test_load_reference_only() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "5 5 5").unwrap();
        file.flush().unwrap();

        let (original, coords) = load_lor_positions(file.path())?;
        assert_eq!(original, Point3D::new(5.0, 5.0, 5.0));
        assert!(coords.is_empty());

        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_lor_positions("/nonexistent/root_header_test1_lor_pos.txt");
        assert!(matches!(result, Err(LoaderError::FileNotFound(_))));
    }

    #[test]
    fn test_load_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let result = load_lor_positions(file.path());
        assert!(matches!(result, Err(LoaderError::EmptyFile(_))));
    }

    #[test]
    fn test_load_malformed_line_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0").unwrap();
        writeln!(file, "1 0 0").unwrap();
        writeln!(file, "1 0").unwrap();
        file.flush().unwrap();

        match load_lor_positions(file.path()) {
            Err(LoaderError::ParseError { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
