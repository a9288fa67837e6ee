use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure to bring a level file into a [`Tilemap`](crate::Tilemap).
/// The map that attempted the load is left untouched.
#[derive(Debug)]
pub enum MapLoadError {
    /// The requested level file does not exist.
    NotFound(PathBuf),
    Io { path: PathBuf, source: io::Error },
    /// The file is not valid level JSON.
    Malformed(serde_json::Error),
    /// A grid key is not of the form `"x;y"`.
    InvalidKey(String),
    InvalidTileSize(u32),
}

impl fmt::Display for MapLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "level file not found: {}", path.display()),
            Self::Io { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
            Self::Malformed(err) => write!(f, "malformed level data: {}", err),
            Self::InvalidKey(key) => write!(f, "invalid grid key {:?}", key),
            Self::InvalidTileSize(size) => write!(f, "invalid tile size {}", size),
        }
    }
}

impl std::error::Error for MapLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MapLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err)
    }
}

/// Failure to write a level file.
#[derive(Debug)]
pub enum MapSaveError {
    Io { path: PathBuf, source: io::Error },
    Encode(serde_json::Error),
}

impl fmt::Display for MapSaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to write {}: {}", path.display(), source),
            Self::Encode(err) => write!(f, "failed to encode level: {}", err),
        }
    }
}

impl std::error::Error for MapSaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for MapSaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_names_the_path() {
        let err = MapLoadError::NotFound(PathBuf::from("data/maps/7.json"));
        assert_eq!(err.to_string(), "level file not found: data/maps/7.json");
        assert!(err.source().is_none());
    }

    #[test]
    fn malformed_keeps_json_source() {
        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        let err = MapLoadError::from(json_err);
        assert!(err.to_string().starts_with("malformed level data"));
        assert!(err.source().is_some());
    }
}
