//! On-disk layout and codec for a single queue node (§3, §4.1).
//!
//! A node is one full page: `next_node_id (8B BE) | first_page_id (8B BE) |
//! varint payload`. Header fields are big-endian on purpose — the rest of
//! the database uses little-endian, and the mismatch doubles as a cheap
//! tripwire: a page from elsewhere in the file is very unlikely to have a
//! zero first byte by coincidence (§9, "Big- vs little-endian mix").

use zerocopy::byteorder::big_endian::U64 as BigU64;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::varint;
use crate::PageId;

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Debug, Clone, Copy)]
#[repr(C)]
pub struct NodeHeader {
    next_node_id: BigU64,
    first_page_id: BigU64,
}

pub const HEADER_LEN: usize = size_of::<NodeHeader>();

/// Reads `(next_node_id, first_page_id)` from a node image.
pub fn read_header(buf: &[u8]) -> (PageId, PageId) {
    let (header, _) = NodeHeader::ref_from_prefix(buf).expect("node buffer too small");
    (header.next_node_id.get(), header.first_page_id.get())
}

/// Writes `next_node_id`/`first_page_id` into a node image, leaving the
/// payload bytes untouched.
pub fn write_header(buf: &mut [u8], next_node_id: PageId, first_page_id: PageId) {
    let (header, _) = NodeHeader::mut_from_prefix(buf).expect("node buffer too small");
    header.next_node_id.set(next_node_id);
    header.first_page_id.set(first_page_id);
}

/// Cursor over a node's payload, resumable across calls (§4.1: "its cursor
/// may be saved and restored"). `current_id` starts seeded from the node's
/// `first_page_id` before the first call to [`decode_next`].
#[derive(Debug, Clone, Copy)]
pub struct PayloadCursor {
    pub offset: usize,
    pub current_id: PageId,
}

impl PayloadCursor {
    pub fn at_start(first_page_id: PageId) -> Self {
        Self {
            offset: HEADER_LEN,
            current_id: first_page_id,
        }
    }
}

/// Decodes the next identifier from `buf` starting at `cursor`, advancing
/// it in place. Returns `None` at the in-band zero terminator or once the
/// page is exhausted — the two cases §4.1 treats as equivalent.
pub fn decode_next(buf: &[u8], cursor: &mut PayloadCursor) -> Option<PageId> {
    if cursor.offset >= buf.len() {
        return None;
    }
    let (delta, new_offset) = varint::decode(buf, cursor.offset)?;
    if delta == 0 {
        return None;
    }
    cursor.offset = new_offset;
    cursor.current_id = cursor.current_id.checked_add(delta)?;
    Some(cursor.current_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(size: usize) -> Vec<u8> {
        vec![0u8; size]
    }

    #[test]
    fn header_round_trips() {
        let mut buf = page(64);
        write_header(&mut buf, 77, 200);
        assert_eq!(read_header(&buf), (77, 200));
        // Big-endian, small ids: first byte of the header is zero.
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn encode_then_decode_restores_sequence() {
        let mut buf = page(64);
        let ids = [10u64, 11, 18, 1000];
        write_header(&mut buf, 0, ids[0]);

        let mut offset = HEADER_LEN;
        let mut prev = ids[0];
        for &id in &ids[1..] {
            offset = varint::encode(&mut buf, offset, id - prev).unwrap();
            prev = id;
        }

        let mut cursor = PayloadCursor::at_start(ids[0]);
        let mut decoded = vec![ids[0]];
        while let Some(id) = decode_next(&buf, &mut cursor) {
            decoded.push(id);
        }
        assert_eq!(decoded, ids);
    }

    #[test]
    fn decode_stops_at_zero_terminator() {
        let mut buf = page(32);
        write_header(&mut buf, 0, 5);
        // Payload is all zero already -> terminator immediately.
        let mut cursor = PayloadCursor::at_start(5);
        assert_eq!(decode_next(&buf, &mut cursor), None);
    }
}
