//! Tag bitfield decoding.
//!
//! River represents tags (workspace-like labels) as bits in a 32-bit field:
//! bit `i` set means tag `i` is part of the set. `view_tags` arrives on the
//! wire as a Wayland `array`, i.e. raw bytes holding one native-endian `u32`
//! per view on the output.
//!
//! Decoding is total: every possible `u32` is a valid bitfield, so there is
//! no error path here.

/// Highest valid tag index (bitfield width is fixed at 32 bits).
pub const MAX_TAG: u8 = 31;

/// Decode a tag bitfield into a sorted ascending list of set bit indices.
pub fn decode_tags(bits: u32) -> Vec<u8> {
    (0..=MAX_TAG).filter(|i| bits & (1 << i) != 0).collect()
}

/// Decode a `view_tags` payload: one `u32` bitfield per view, unioned.
///
/// The result is sorted ascending and deduplicated. An output with zero
/// views yields an empty set. A trailing partial chunk (which a conforming
/// compositor never sends) is ignored.
pub fn decode_view_tags(raw: &[u8]) -> Vec<u8> {
    let mut union = 0u32;
    for chunk in raw.chunks_exact(4) {
        union |= u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    decode_tags(union)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bitfields: &[u32]) -> Vec<u8> {
        bitfields.iter().flat_map(|b| b.to_ne_bytes()).collect()
    }

    #[test]
    fn decodes_set_bits_in_ascending_order() {
        assert_eq!(decode_tags(0b1011), vec![0, 1, 3]);
    }

    #[test]
    fn zero_bitfield_is_empty() {
        assert_eq!(decode_tags(0), Vec::<u8>::new());
    }

    #[test]
    fn full_bitfield_yields_all_tags() {
        let all: Vec<u8> = (0..=31).collect();
        assert_eq!(decode_tags(u32::MAX), all);
    }

    #[test]
    fn high_bit_maps_to_tag_31() {
        assert_eq!(decode_tags(1 << 31), vec![31]);
    }

    #[test]
    fn view_tags_union_is_sorted_and_deduped() {
        assert_eq!(decode_view_tags(&encode(&[0b0001, 0b0010])), vec![0, 1]);
        // Input order must not affect the result.
        assert_eq!(decode_view_tags(&encode(&[0b0010, 0b0001])), vec![0, 1]);
        // Overlapping bitfields dedupe.
        assert_eq!(decode_view_tags(&encode(&[0b0011, 0b0110])), vec![0, 1, 2]);
    }

    #[test]
    fn no_views_means_no_tags() {
        assert_eq!(decode_view_tags(&[]), Vec::<u8>::new());
    }

    #[test]
    fn partial_trailing_chunk_is_ignored() {
        let mut raw = encode(&[0b0100]);
        raw.extend_from_slice(&[0xff, 0xff]);
        assert_eq!(decode_view_tags(&raw), vec![2]);
    }
}
