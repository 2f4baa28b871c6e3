//! Decompressed-size lookups from the few bytes a registry hands back for a range request.
//!
//! Neither function decompresses anything: gzip keeps the original size in its trailer
//! and zstd may declare it in the frame header.

use crate::error::{Error, Result};

/// Number of trailing bytes holding the gzip `ISIZE` field.
pub const GZIP_TRAILER_LEN: usize = 4;

/// Largest possible zstd frame header: magic, descriptor, window, 4-byte dictionary ID and
/// 8-byte content size.
pub const ZSTD_MAX_HEADER_LEN: usize = 18;

const ZSTD_MAGIC: u32 = 0xFD2F_B528;
const FRAME_HEADER_DESCRIPTOR_OFFSET: usize = 4;

/// Original size recorded in a gzip member trailer, modulo 2^32.
///
/// The last four bytes of `buf` are read, so both the bare trailer and a full blob work.
///
/// ```
/// assert_eq!(rocisc::compression::gzip_uncompressed_size(&[0x00, 0x01, 0x00, 0x00]).unwrap(), 256);
/// ```
pub fn gzip_uncompressed_size(buf: &[u8]) -> Result<u64> {
    let start = buf
        .len()
        .checked_sub(GZIP_TRAILER_LEN)
        .ok_or(Error::TruncatedHeader {
            needed: GZIP_TRAILER_LEN,
            actual: buf.len(),
        })?;
    let bytes = read_le::<4>(buf, start)?;
    Ok(u32::from_le_bytes(bytes) as u64)
}

/// Frame content size declared in a zstd frame header.
///
/// See the [zstd frame format](https://github.com/facebook/zstd/blob/dev/doc/zstd_compression_format.md#zstandard-frames).
pub fn zstd_frame_content_size(buf: &[u8]) -> Result<u64> {
    let magic = u32::from_le_bytes(read_le::<4>(buf, 0)?);
    if magic != ZSTD_MAGIC {
        return Err(Error::InvalidZstdMagic(magic));
    }

    let [descriptor] = read_le::<1>(buf, FRAME_HEADER_DESCRIPTOR_OFFSET)?;
    let content_size_flag = descriptor >> 6;
    let single_segment = descriptor & 0b0010_0000 != 0;
    let dictionary_id_flag = descriptor & 0b0000_0011;

    let dictionary_id_len = match dictionary_id_flag {
        3 => 4,
        flag => flag as usize,
    };
    // Window_Descriptor is only present for multi-segment frames
    let window_descriptor_len = if single_segment { 0 } else { 1 };
    let offset = FRAME_HEADER_DESCRIPTOR_OFFSET + 1 + dictionary_id_len + window_descriptor_len;

    match content_size_flag {
        0 => {
            if !single_segment {
                return Err(Error::ZstdContentSizeUnavailable);
            }
            let [size] = read_le::<1>(buf, offset)?;
            Ok(size as u64)
        }
        1 => Ok(u16::from_le_bytes(read_le::<2>(buf, offset)?) as u64 + 256),
        2 => Ok(u32::from_le_bytes(read_le::<4>(buf, offset)?) as u64),
        3 => Ok(u64::from_le_bytes(read_le::<8>(buf, offset)?)),
        flag => Err(Error::InvalidContentSizeFlag(flag)),
    }
}

fn read_le<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    let needed = offset + N;
    buf.get(offset..needed)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Error::TruncatedHeader {
            needed,
            actual: buf.len(),
        })
}
