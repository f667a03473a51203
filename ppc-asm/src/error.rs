//! Decode-time errors (spec.md §4.1: "reading out of the provided byte
//! window fails with an I/O-like error surfaced up").

/// Error surfaced when a caller asks to decode a word that does not fully
/// fit inside the byte slice it was handed.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("instruction word at address {address:#010X} extends past the end of the provided window ({available} byte(s) remaining, 4 needed)")]
    OutOfWindow { address: u32, available: usize },
}

/// Reads one big-endian `u32` instruction word at `address` out of `bytes`,
/// where `bytes[0]` corresponds to `base_address`.
pub fn read_word(bytes: &[u8], base_address: u32, address: u32) -> Result<u32, DecodeError> {
    let offset = address.wrapping_sub(base_address) as usize;
    let slice = bytes
        .get(offset..offset + 4)
        .ok_or(DecodeError::OutOfWindow { address, available: bytes.len().saturating_sub(offset) })?;
    Ok(u32::from_be_bytes(slice.try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_word() {
        let bytes = [0x38, 0x60, 0x00, 0x01];
        assert_eq!(read_word(&bytes, 0, 0).unwrap(), 0x3860_0001);
    }

    #[test]
    fn rejects_short_window() {
        let bytes = [0x38, 0x60];
        assert!(matches!(read_word(&bytes, 0, 0), Err(DecodeError::OutOfWindow { .. })));
    }
}
