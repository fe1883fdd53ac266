//! Modified UTF-8 string encoding used by execution data streams.
//!
//! Strings are stored the way `java.io.DataOutputStream` writes them: the
//! NUL character becomes the two-byte sequence `0xC0 0x80`, supplementary
//! characters are stored as CESU-8 surrogate pairs (two three-byte
//! sequences, never a four-byte sequence) and the encoded form is capped at
//! 65535 bytes by the u16 length prefix.

use crate::core::errors::{ExecMergeError, Result};

/// Maximum encoded length representable by the u16 length prefix.
pub const MAX_ENCODED_LEN: usize = 65535;

/// Encode a string into its modified UTF-8 byte representation.
pub fn encode(value: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0xC0 | (unit >> 6) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                bytes.push(0xE0 | (unit >> 12) as u8);
                bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    if bytes.len() > MAX_ENCODED_LEN {
        return Err(ExecMergeError::decode(format!(
            "Encoded string is {} bytes but the format allows at most {MAX_ENCODED_LEN}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Decode a modified UTF-8 byte sequence back into a string.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let first = bytes[i];
        let unit = match first >> 4 {
            0x0..=0x7 => {
                i += 1;
                u16::from(first)
            }
            0xC | 0xD => {
                let second = continuation(bytes, i + 1)?;
                i += 2;
                (u16::from(first & 0x1F) << 6) | u16::from(second & 0x3F)
            }
            0xE => {
                let second = continuation(bytes, i + 1)?;
                let third = continuation(bytes, i + 2)?;
                i += 3;
                (u16::from(first & 0x0F) << 12)
                    | (u16::from(second & 0x3F) << 6)
                    | u16::from(third & 0x3F)
            }
            _ => return Err(malformed(i)),
        };
        units.push(unit);
    }
    String::from_utf16(&units)
        .map_err(|_| ExecMergeError::decode("Unpaired surrogate in UTF string"))
}

fn continuation(bytes: &[u8], index: usize) -> Result<u8> {
    match bytes.get(index) {
        Some(&byte) if byte & 0xC0 == 0x80 => Ok(byte),
        _ => Err(malformed(index)),
    }
}

fn malformed(index: usize) -> ExecMergeError {
    ExecMergeError::decode(format!("Malformed UTF input around byte {index}"))
}
