use serde::Serialize;

use super::error::{FileError, FileResult};
use super::{PAGE_SIZE, PageNum};

/// Header stored in physical page 0 of every paged file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetadataPage {
    pub page_count: PageNum, // 4 bytes - Logical pages when last written
    pub read_counter: u32,   // 4 bytes - Successful page reads
    pub write_counter: u32,  // 4 bytes - Successful page writes
    pub append_counter: u32, // 4 bytes - Successful page appends
}

impl MetadataPage {
    pub const SIZE: usize = 16;

    /// Encode into a full zero-padded page
    pub fn to_page(&self) -> [u8; PAGE_SIZE] {
        let mut page = [0u8; PAGE_SIZE];
        page[0..4].copy_from_slice(&self.page_count.to_le_bytes());
        page[4..8].copy_from_slice(&self.read_counter.to_le_bytes());
        page[8..12].copy_from_slice(&self.write_counter.to_le_bytes());
        page[12..16].copy_from_slice(&self.append_counter.to_le_bytes());
        page
    }

    pub fn from_bytes(data: &[u8]) -> FileResult<Self> {
        if data.len() < Self::SIZE {
            return Err(FileError::InvalidPageSize {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        let field =
            |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Ok(Self {
            page_count: field(0),
            read_counter: field(4),
            write_counter: field(8),
            append_counter: field(12),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let metadata = MetadataPage {
            page_count: 3,
            read_counter: 0x0102_0304,
            write_counter: 7,
            append_counter: u32::MAX,
        };
        let page = metadata.to_page();

        assert_eq!(&page[0..4], &[3, 0, 0, 0]);
        assert_eq!(&page[4..8], &[4, 3, 2, 1]);
        assert_eq!(&page[8..12], &[7, 0, 0, 0]);
        assert_eq!(&page[12..16], &[0xFF; 4]);
        assert!(page[MetadataPage::SIZE..].iter().all(|&b| b == 0));

        assert_eq!(MetadataPage::from_bytes(&page).unwrap(), metadata);
    }

    #[test]
    fn test_zeroed_page_is_empty_metadata() {
        let page = [0u8; PAGE_SIZE];
        assert_eq!(
            MetadataPage::from_bytes(&page).unwrap(),
            MetadataPage::default()
        );
    }

    #[test]
    fn test_short_buffer() {
        let result = MetadataPage::from_bytes(&[0u8; 10]);
        assert!(matches!(
            result,
            Err(FileError::InvalidPageSize {
                expected: MetadataPage::SIZE,
                actual: 10,
            })
        ));
    }
}
