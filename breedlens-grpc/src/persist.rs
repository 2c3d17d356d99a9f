//! Writing fetched images to disk.

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default directory for saved images.
pub const DEFAULT_IMAGE_DIR: &str = "images/";

/// Suffix added to caller-chosen file names.
const IMAGE_SUFFIX: &str = ".jpg";

static FILE_STEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("file name {0:?} may only contain letters, digits, '_' or '-'")]
    InvalidFileName(String),
    #[error("cannot derive a file name from {0:?}")]
    NoFileName(String),
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Name to save an image under.
///
/// A requested name must be ASCII letters, digits, `_` or `-` and gets a `.jpg` suffix;
/// otherwise the last path segment of `image_url` is used as is.
pub fn file_name_for(image_url: &str, requested: Option<&str>) -> Result<String, PersistError> {
    match requested {
        Some(name) => {
            if !FILE_STEM.is_match(name) {
                return Err(PersistError::InvalidFileName(name.to_owned()));
            }
            Ok(format!("{}{}", name, IMAGE_SUFFIX))
        }
        None => {
            let path = image_url.split(['?', '#']).next().unwrap_or_default();
            match path.rsplit('/').next() {
                Some(segment) if !matches!(segment, "" | "." | "..") => Ok(segment.to_owned()),
                _ => Err(PersistError::NoFileName(image_url.to_owned())),
            }
        }
    }
}

/// Write `bytes` to `dir/file_name`, creating `dir` first if needed.
pub async fn save_to_disk(
    bytes: &[u8],
    file_name: &str,
    dir: &Path,
) -> Result<PathBuf, PersistError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PersistError::CreateDir { path: dir.to_path_buf(), source })?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| PersistError::Write { path: path.clone(), source })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "image saved");
    Ok(path)
}
