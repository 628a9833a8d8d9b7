use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{FileError, FileResult};
use super::metadata::MetadataPage;
use super::{PageNum, check_page_size, logical_page_count, physical_offset};

/// Snapshot of the per-file I/O counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCounters {
    pub read: u32,
    pub write: u32,
    pub append: u32,
}

struct FileEntry {
    file: File,
    path: PathBuf,
}

/// Page-level access to one open paged file.
///
/// A handle starts unbound, is bound by `PagedFileManager::open_file` and
/// unbound again by `PagedFileManager::close_file`. Every successful page
/// operation rewrites the metadata page so the counters stay durable.
/// Dropping a bound handle flushes the metadata on a best-effort basis.
pub struct FileHandle {
    entry: Option<FileEntry>,
    read_counter: u32,
    write_counter: u32,
    append_counter: u32,
}

impl FileHandle {
    /// Create an unbound handle
    pub fn new() -> Self {
        Self {
            entry: None,
            read_counter: 0,
            write_counter: 0,
            append_counter: 0,
        }
    }

    /// Check if the handle is bound to an open file
    pub fn is_bound(&self) -> bool {
        self.entry.is_some()
    }

    /// Path of the bound file
    pub fn path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|entry| entry.path.as_path())
    }

    /// Read logical page `page_num` into `buffer`
    pub fn read_page(&mut self, page_num: PageNum, buffer: &mut [u8]) -> FileResult<()> {
        self.check_bound()?;
        check_page_size(buffer.len())?;
        self.check_range(page_num)?;

        let entry = self.entry_mut()?;
        entry.file.seek(SeekFrom::Start(physical_offset(page_num)))?;
        entry.file.read_exact(buffer)?;

        self.count_and_persist(|handle| &mut handle.read_counter)?;
        debug!(page = page_num, "read page");
        Ok(())
    }

    /// Overwrite logical page `page_num` with `buffer`
    pub fn write_page(&mut self, page_num: PageNum, buffer: &[u8]) -> FileResult<()> {
        self.check_bound()?;
        check_page_size(buffer.len())?;
        self.check_range(page_num)?;

        let entry = self.entry_mut()?;
        entry.file.seek(SeekFrom::Start(physical_offset(page_num)))?;
        entry.file.write_all(buffer)?;
        entry.file.sync_data()?;

        self.count_and_persist(|handle| &mut handle.write_counter)?;
        debug!(page = page_num, "wrote page");
        Ok(())
    }

    /// Add `buffer` as a new page after the last logical page
    pub fn append_page(&mut self, buffer: &[u8]) -> FileResult<()> {
        self.check_bound()?;
        check_page_size(buffer.len())?;

        let page_num = self.page_count()?;
        let entry = self.entry_mut()?;
        // Same as end-of-file unless the file has a trailing partial page
        entry.file.seek(SeekFrom::Start(physical_offset(page_num)))?;
        entry.file.write_all(buffer)?;
        entry.file.sync_data()?;

        self.count_and_persist(|handle| &mut handle.append_counter)?;
        debug!(page = page_num, "appended page");
        Ok(())
    }

    /// Number of logical pages, derived from the file size.
    ///
    /// Returns 0 for an unbound handle or when the size cannot be determined.
    pub fn get_number_of_pages(&self) -> PageNum {
        self.page_count().unwrap_or(0)
    }

    pub fn collect_counter_values(&self) -> PageCounters {
        PageCounters {
            read: self.read_counter,
            write: self.write_counter,
            append: self.append_counter,
        }
    }

    /// Metadata page reflecting the current counters and page count
    pub fn metadata(&self) -> MetadataPage {
        MetadataPage {
            page_count: self.get_number_of_pages(),
            read_counter: self.read_counter,
            write_counter: self.write_counter,
            append_counter: self.append_counter,
        }
    }

    /// Bind to an opened file and adopt the counters stored in its metadata page
    pub(super) fn bind(&mut self, file: File, path: PathBuf, metadata: MetadataPage) {
        self.entry = Some(FileEntry { file, path });
        self.read_counter = metadata.read_counter;
        self.write_counter = metadata.write_counter;
        self.append_counter = metadata.append_counter;

        let derived = self.get_number_of_pages();
        if derived != metadata.page_count {
            warn!(
                stored = metadata.page_count,
                derived, "stale page count in metadata page"
            );
        }
    }

    /// Flush the metadata page and release the file.
    ///
    /// On failure the handle stays bound.
    pub(super) fn close(&mut self) -> FileResult<()> {
        self.persist_metadata()?;
        self.entry_mut()?.file.sync_all()?;

        if let Some(entry) = self.entry.take() {
            debug!(path = %entry.path.display(), "closed file");
        }
        Ok(())
    }

    /// Bump one counter and persist it, undoing the bump if the persist fails
    fn count_and_persist(&mut self, counter: fn(&mut Self) -> &mut u32) -> FileResult<()> {
        let value = counter(self);
        *value = value.wrapping_add(1);

        if let Err(e) = self.persist_metadata() {
            let value = counter(self);
            *value = value.wrapping_sub(1);
            return Err(e);
        }
        Ok(())
    }

    /// Rewrite physical page 0 from the in-memory counters
    fn persist_metadata(&mut self) -> FileResult<()> {
        let page = self.metadata().to_page();
        let entry = self.entry_mut()?;

        entry.file.seek(SeekFrom::Start(0))?;
        entry.file.write_all(&page)?;
        entry.file.sync_data()?;
        Ok(())
    }

    fn check_bound(&self) -> FileResult<()> {
        if self.entry.is_none() {
            return Err(FileError::NotOpen);
        }
        Ok(())
    }

    fn page_count(&self) -> FileResult<PageNum> {
        let entry = self.entry.as_ref().ok_or(FileError::NotOpen)?;
        Ok(logical_page_count(entry.file.metadata()?.len()))
    }

    fn check_range(&self, page_num: PageNum) -> FileResult<()> {
        let total = self.page_count()?;
        if page_num >= total {
            return Err(FileError::PageOutOfRange {
                page: page_num,
                total,
            });
        }
        Ok(())
    }

    fn entry_mut(&mut self) -> FileResult<&mut FileEntry> {
        self.entry.as_mut().ok_or(FileError::NotOpen)
    }
}

impl Default for FileHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if self.entry.is_none() {
            return;
        }
        if let Err(e) = self.persist_metadata() {
            warn!(error = %e, "failed to flush metadata page on drop");
        }
        self.entry = None;
    }
}
