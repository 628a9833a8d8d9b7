use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use super::error::{FileError, FileResult};
use super::file_handle::FileHandle;
use super::metadata::MetadataPage;
use super::PAGE_SIZE;

/// Creates, destroys, opens and closes paged files.
///
/// Holds no state of its own; every call depends only on its arguments and
/// the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagedFileManager;

impl PagedFileManager {
    /// Create a new paged file manager
    pub fn new() -> Self {
        Self
    }

    /// Create a new file holding only an empty metadata page
    pub fn create_file<P: AsRef<Path>>(&self, path: P) -> FileResult<()> {
        let path = path.as_ref();

        if path.exists() {
            return Err(FileError::FileAlreadyExists(path.display().to_string()));
        }

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| FileError::from_io_at(e, path))?;

        let page = MetadataPage::default().to_page();
        if let Err(e) = file.write_all(&page).and_then(|_| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %cleanup, "failed to remove partial file");
            }
            return Err(e.into());
        }

        debug!(path = %path.display(), "created paged file");
        Ok(())
    }

    /// Remove (delete) a file
    pub fn destroy_file<P: AsRef<Path>>(&self, path: P) -> FileResult<()> {
        let path = path.as_ref();
        fs::remove_file(path).map_err(|e| FileError::from_io_at(e, path))?;
        debug!(path = %path.display(), "destroyed paged file");
        Ok(())
    }

    /// Bind an unbound `handle` to the file at `path`
    pub fn open_file<P: AsRef<Path>>(&self, path: P, handle: &mut FileHandle) -> FileResult<()> {
        let path = path.as_ref();

        if let Some(bound) = handle.path() {
            return Err(FileError::AlreadyBound(bound.display().to_string()));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| FileError::from_io_at(e, path))?;

        let metadata = Self::load_metadata(&mut file)?;
        handle.bind(file, path.to_path_buf(), metadata);

        debug!(path = %path.display(), ?metadata, "opened paged file");
        Ok(())
    }

    /// Flush the metadata page of `handle` and unbind it
    pub fn close_file(&self, handle: &mut FileHandle) -> FileResult<()> {
        if !handle.is_bound() {
            return Err(FileError::NotOpen);
        }
        handle.close()
    }

    /// Read the metadata page of a file without binding a handle
    pub fn read_metadata<P: AsRef<Path>>(&self, path: P) -> FileResult<MetadataPage> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| FileError::from_io_at(e, path))?;
        Self::load_metadata(&mut file)
    }

    fn load_metadata(file: &mut File) -> FileResult<MetadataPage> {
        let mut page = vec![0u8; PAGE_SIZE];
        file.read_exact(&mut page)?;
        MetadataPage::from_bytes(&page)
    }
}
