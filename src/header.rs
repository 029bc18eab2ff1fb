//! The 44-byte little-endian queue state slice embedded in the database's
//! superblock/checkpoint header (§3, §4.4).

use zerocopy::byteorder::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::PageId;

pub const HEADER_SLICE_LEN: usize = size_of::<HeaderSlice>();

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Debug, Clone, Copy)]
#[repr(C)]
pub struct HeaderSlice {
    remove_page_count: U64,
    remove_node_count: U64,
    remove_head_id: U64,
    remove_head_offset: U32,
    remove_head_first_page_id: U64,
    append_head_id: U64,
}

impl HeaderSlice {
    pub fn zeroed() -> Self {
        HeaderSlice::new_zeroed()
    }

    pub fn read_from(bytes: &[u8]) -> Self {
        let (slice, _) = HeaderSlice::ref_from_prefix(bytes).expect("header slice too small");
        *slice
    }

    pub fn write_to(&self, bytes: &mut [u8]) {
        let (dst, _) = HeaderSlice::mut_from_prefix(bytes).expect("header slice too small");
        *dst = *self;
    }

    /// `exists` reports whether a valid queue is encoded at this slice —
    /// first-boot restores carry zero here (§4.4).
    pub fn exists(&self) -> bool {
        self.remove_head_id.get() != 0
    }

    pub fn remove_page_count(&self) -> u64 {
        self.remove_page_count.get()
    }

    pub fn remove_node_count(&self) -> u64 {
        self.remove_node_count.get()
    }

    pub fn remove_head_id(&self) -> PageId {
        self.remove_head_id.get()
    }

    pub fn remove_head_offset(&self) -> u32 {
        self.remove_head_offset.get()
    }

    pub fn remove_head_first_page_id(&self) -> PageId {
        self.remove_head_first_page_id.get()
    }

    pub fn append_head_id(&self) -> PageId {
        self.append_head_id.get()
    }

    pub fn set_remove_page_count(&mut self, v: u64) {
        self.remove_page_count.set(v);
    }

    pub fn set_remove_node_count(&mut self, v: u64) {
        self.remove_node_count.set(v);
    }

    pub fn set_remove_head_id(&mut self, v: PageId) {
        self.remove_head_id.set(v);
    }

    pub fn set_remove_head_offset(&mut self, v: u32) {
        self.remove_head_offset.set(v);
    }

    pub fn set_remove_head_first_page_id(&mut self, v: PageId) {
        self.remove_head_first_page_id.set(v);
    }

    pub fn set_append_head_id(&mut self, v: PageId) {
        self.append_head_id.set(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_44_bytes() {
        assert_eq!(HEADER_SLICE_LEN, 44);
    }

    #[test]
    fn round_trips_through_bytes() {
        let mut slice = HeaderSlice::zeroed();
        slice.set_remove_page_count(11);
        slice.set_remove_node_count(2);
        slice.set_remove_head_id(100);
        slice.set_remove_head_offset(16);
        slice.set_remove_head_first_page_id(2);
        slice.set_append_head_id(300);

        let mut bytes = [0u8; HEADER_SLICE_LEN];
        slice.write_to(&mut bytes);

        let restored = HeaderSlice::read_from(&bytes);
        assert_eq!(restored.remove_page_count(), 11);
        assert_eq!(restored.remove_node_count(), 2);
        assert_eq!(restored.remove_head_id(), 100);
        assert_eq!(restored.remove_head_offset(), 16);
        assert_eq!(restored.remove_head_first_page_id(), 2);
        assert_eq!(restored.append_head_id(), 300);
    }

    #[test]
    fn fresh_boot_does_not_exist() {
        assert!(!HeaderSlice::zeroed().exists());
    }

    #[test]
    fn nonzero_remove_head_exists() {
        let mut slice = HeaderSlice::zeroed();
        slice.set_remove_head_id(5);
        assert!(slice.exists());
    }
}
