mod error;
mod file_handle;
mod file_manager;
mod metadata;

pub use error::{FileError, FileResult};
pub use file_handle::{FileHandle, PageCounters};
pub use file_manager::PagedFileManager;
pub use metadata::MetadataPage;

/// Page size in bytes (4KB)
pub const PAGE_SIZE: usize = 4096;

/// Physical pages reserved at the start of every file for the metadata page
pub const METADATA_PAGES: u64 = 1;

/// Logical page number, 0-based, as seen by callers
pub type PageNum = u32;

/// Byte offset of logical page `page_num` in the underlying file.
///
/// Logical page `i` lives at physical page `i + METADATA_PAGES`, so physical
/// page 0 is never reachable through the page-level API.
pub fn physical_offset(page_num: PageNum) -> u64 {
    (page_num as u64 + METADATA_PAGES) * PAGE_SIZE as u64
}

/// Logical page count for a file of `file_size` bytes
pub fn logical_page_count(file_size: u64) -> PageNum {
    let physical = file_size / PAGE_SIZE as u64;
    physical.saturating_sub(METADATA_PAGES).min(PageNum::MAX as u64) as PageNum
}

fn check_page_size(len: usize) -> FileResult<()> {
    if len != PAGE_SIZE {
        return Err(FileError::InvalidPageSize {
            expected: PAGE_SIZE,
            actual: len,
        });
    }
    Ok(())
}
