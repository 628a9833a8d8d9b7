pub mod file;

pub use file::{
    FileError, FileHandle, FileResult, MetadataPage, PAGE_SIZE, PageCounters, PageNum,
    PagedFileManager,
};
