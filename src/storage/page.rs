//! # Slotted Page
//!
//! Fixed 16,384-byte page holding variable-length encoded rows. The slot
//! directory grows forward from the header; the row heap grows backward
//! from the end of the page, so neither side moves existing rows.
//!
//! ## Layout
//!
//! ```text
//! +--------------------------------------------------+
//! | header (12B): u64 page_id | u16 num_slots        |
//! |               u16 free_start                     |
//! +--------------------------------------------------+
//! | slot directory (4B each): u16 offset, u16 length |  --> grows forward
//! +--------------------------------------------------+
//! |                  free space                      |
//! +--------------------------------------------------+
//! | row heap                                         |  <-- grows backward
//! +--------------------------------------------------+ 16384
//! ```
//!
//! A slot of `(0, 0)` is a tombstone; `get_row` on it fails `NotFound`.
//! Deletion is not implemented at the page layer in this revision — pages
//! are rebuilt from the in-memory row sequence on every save.
//!
//! `free_end` is not stored; loading a page reconstructs it as the minimum
//! row offset across live slots.

use crate::config::{PAGE_HEADER_SIZE, PAGE_SIZE, SLOT_SIZE};
use crate::error::{Error, Result};

pub struct SlottedPage {
    page_id: u64,
    num_slots: u16,
    free_start: u16,
    free_end: u16,
    data: Box<[u8; PAGE_SIZE]>,
}

impl SlottedPage {
    pub fn new(page_id: u64) -> Self {
        let mut page = Self {
            page_id,
            num_slots: 0,
            free_start: PAGE_HEADER_SIZE as u16,
            free_end: PAGE_SIZE as u16,
            data: Box::new([0u8; PAGE_SIZE]),
        };
        page.write_header();
        page
    }

    /// Reconstructs a page from a serialized image, deriving `free_end`
    /// from the slot directory.
    pub fn load(image: &[u8]) -> Result<Self> {
        if image.len() != PAGE_SIZE {
            return Err(Error::Corrupted(format!(
                "page image must be {PAGE_SIZE} bytes, got {}",
                image.len()
            )));
        }

        let mut data = Box::new([0u8; PAGE_SIZE]);
        data.copy_from_slice(image);

        let page_id = u64::from_le_bytes(data[0..8].try_into().unwrap());
        let num_slots = u16::from_le_bytes(data[8..10].try_into().unwrap());
        let free_start = u16::from_le_bytes(data[10..12].try_into().unwrap());

        let mut free_end = PAGE_SIZE as u16;
        for slot in 0..num_slots {
            let at = PAGE_HEADER_SIZE + slot as usize * SLOT_SIZE;
            let offset = u16::from_le_bytes(data[at..at + 2].try_into().unwrap());
            let length = u16::from_le_bytes(data[at + 2..at + 4].try_into().unwrap());
            if (offset, length) == (0, 0) {
                continue;
            }
            if offset < free_end {
                free_end = offset;
            }
        }

        Ok(Self {
            page_id,
            num_slots,
            free_start,
            free_end,
            data,
        })
    }

    pub fn page_id(&self) -> u64 {
        self.page_id
    }

    pub fn num_slots(&self) -> u16 {
        self.num_slots
    }

    /// True when a row of `data_len` bytes plus its slot does not fit.
    pub fn is_full(&self, data_len: usize) -> bool {
        let free = (self.free_end - self.free_start) as usize;
        free < data_len + SLOT_SIZE
    }

    /// Appends a row, returning its slot id. The caller is expected to
    /// check [`is_full`](Self::is_full) first; running out of space here
    /// means the bookkeeping diverged.
    pub fn insert_row(&mut self, row: &[u8]) -> Result<u16> {
        if self.is_full(row.len()) {
            return Err(Error::Internal("not enough space in page".into()));
        }

        let row_len = row.len() as u16;
        self.free_end -= row_len;
        let offset = self.free_end as usize;
        self.data[offset..offset + row.len()].copy_from_slice(row);

        let slot_at = self.free_start as usize;
        self.data[slot_at..slot_at + 2].copy_from_slice(&self.free_end.to_le_bytes());
        self.data[slot_at + 2..slot_at + 4].copy_from_slice(&row_len.to_le_bytes());

        let slot_id = self.num_slots;
        self.num_slots += 1;
        self.free_start += SLOT_SIZE as u16;
        self.write_header();

        Ok(slot_id)
    }

    /// Returns the row bytes at `slot_id`; tombstones and out-of-range
    /// slots fail `NotFound`.
    pub fn get_row(&self, slot_id: u16) -> Result<&[u8]> {
        if slot_id >= self.num_slots {
            return Err(Error::NotFound(format!("invalid slot id: {slot_id}")));
        }

        let at = PAGE_HEADER_SIZE + slot_id as usize * SLOT_SIZE;
        let offset = u16::from_le_bytes(self.data[at..at + 2].try_into().unwrap()) as usize;
        let length = u16::from_le_bytes(self.data[at + 2..at + 4].try_into().unwrap()) as usize;

        if offset == 0 && length == 0 {
            return Err(Error::NotFound(format!("slot {slot_id} has been deleted")));
        }

        Ok(&self.data[offset..offset + length])
    }

    /// All live rows in slot order.
    pub fn all_rows(&self) -> Vec<&[u8]> {
        (0..self.num_slots)
            .filter_map(|slot| self.get_row(slot).ok())
            .collect()
    }

    /// The serialized page image; header fields are kept in sync on every
    /// mutation, so this is always current.
    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    fn write_header(&mut self) {
        self.data[0..8].copy_from_slice(&self.page_id.to_le_bytes());
        self.data[8..10].copy_from_slice(&self.num_slots.to_le_bytes());
        self.data[10..12].copy_from_slice(&self.free_start.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_read_back_in_order() {
        let mut page = SlottedPage::new(0);
        let rows: Vec<Vec<u8>> = (0u8..5).map(|i| vec![i; (i as usize + 1) * 3]).collect();

        for (i, row) in rows.iter().enumerate() {
            assert_eq!(page.insert_row(row).unwrap(), i as u16);
        }

        let all = page.all_rows();
        assert_eq!(all.len(), rows.len());
        for (got, expected) in all.iter().zip(&rows) {
            assert_eq!(got, &expected.as_slice());
        }
    }

    #[test]
    fn rows_fill_from_the_back() {
        let mut page = SlottedPage::new(1);
        page.insert_row(&[0xAB; 10]).unwrap();
        assert_eq!(&page.as_bytes()[PAGE_SIZE - 10..], &[0xAB; 10]);
    }

    #[test]
    fn fills_until_capacity_then_reports_full() {
        let mut page = SlottedPage::new(0);
        let row = [7u8; 1000];
        let mut inserted = 0;
        while !page.is_full(row.len()) {
            page.insert_row(&row).unwrap();
            inserted += 1;
        }

        // 1000 data + 4 slot bytes per row within 16384 - 12 usable
        assert_eq!(inserted, (PAGE_SIZE - PAGE_HEADER_SIZE) / (1000 + SLOT_SIZE));
        assert!(matches!(page.insert_row(&row), Err(Error::Internal(_))));
    }

    #[test]
    fn serialized_image_round_trips() {
        let mut page = SlottedPage::new(42);
        page.insert_row(b"first").unwrap();
        page.insert_row(b"second").unwrap();

        let reloaded = SlottedPage::load(page.as_bytes().as_slice()).unwrap();
        assert_eq!(reloaded.page_id(), 42);
        assert_eq!(reloaded.num_slots(), 2);
        assert_eq!(reloaded.get_row(0).unwrap(), b"first");
        assert_eq!(reloaded.get_row(1).unwrap(), b"second");
        assert_eq!(reloaded.free_end, page.free_end);
        assert_eq!(reloaded.free_start, page.free_start);
    }

    #[test]
    fn tombstone_slot_is_not_found() {
        let mut page = SlottedPage::new(0);
        page.insert_row(b"live").unwrap();

        // hand-write a (0, 0) tombstone as slot 1
        let at = PAGE_HEADER_SIZE + SLOT_SIZE;
        page.data[at..at + 4].copy_from_slice(&[0, 0, 0, 0]);
        page.num_slots = 2;
        page.free_start += SLOT_SIZE as u16;
        page.write_header();

        assert!(matches!(page.get_row(1), Err(Error::NotFound(_))));
        assert_eq!(page.all_rows().len(), 1);

        let reloaded = SlottedPage::load(page.as_bytes().as_slice()).unwrap();
        assert_eq!(reloaded.all_rows().len(), 1);
    }

    #[test]
    fn wrong_image_size_is_corrupted() {
        assert!(matches!(
            SlottedPage::load(&[0u8; 100]),
            Err(Error::Corrupted(_))
        ));
    }
}
