use std::io;
use thiserror::Error;

use super::PageNum;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("File handle already bound to: {0}")]
    AlreadyBound(String),

    #[error("File handle is not open")]
    NotOpen,

    #[error("Page out of range: page={page}, total={total}")]
    PageOutOfRange { page: PageNum, total: PageNum },

    #[error("Invalid page size: expected {expected}, got {actual}")]
    InvalidPageSize { expected: usize, actual: usize },
}

impl FileError {
    /// Map an OS error for `path`, keeping missing files distinct from other failures
    pub(crate) fn from_io_at(err: io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::FileNotFound(path.display().to_string()),
            io::ErrorKind::AlreadyExists => {
                FileError::FileAlreadyExists(path.display().to_string())
            }
            _ => FileError::Io(err),
        }
    }
}

pub type FileResult<T> = Result<T, FileError>;
