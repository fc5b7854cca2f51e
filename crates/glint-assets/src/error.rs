//! Asset loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading assets from disk.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to parse OBJ '{path}': {message}")]
    ObjParse { path: PathBuf, message: String },

    #[error("mesh '{0}' contains no geometry")]
    EmptyMesh(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_path_and_cause() {
        let err = AssetError::ObjParse {
            path: PathBuf::from("models/teapot.obj"),
            message: "bad face index".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("models/teapot.obj"));
        assert!(text.contains("bad face index"));
    }
}
