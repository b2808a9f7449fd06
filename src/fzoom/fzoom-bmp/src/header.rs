use crate::error::BitmapError;

pub const FILE_HEADER_LEN: usize = 14;
pub const INFO_HEADER_LEN: usize = 40;
pub const HEADERS_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

pub const BMP_MAGIC: u16 = 0x4D42; // "BM"
pub const BI_RGB: u32 = 0; // uncompressed
pub const GRAYSCALE_BITS: u16 = 8;

/// The fields of BITMAPFILEHEADER and BITMAPINFOHEADER the loader needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: u16,
    pub file_size: u32,
    pub pixel_offset: u32,
    pub info_size: u32,
    pub width: i32,
    pub height: i32,
    pub bit_count: u16,
    pub compression: u32,
    pub colors_used: u32,
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn i32_at(bytes: &[u8], at: usize) -> i32 {
    u32_at(bytes, at) as i32
}

/// Parse both headers from the first `HEADERS_LEN` bytes of a file
pub fn parse_header(bytes: &[u8]) -> Result<Header, BitmapError> {
    if bytes.len() < HEADERS_LEN {
        return Err(BitmapError::TruncatedHeader);
    }

    // [Magic(0-1) | Size(2-5) | Reserved(6-9) | Offset(10-13)] then the info header
    let info = &bytes[FILE_HEADER_LEN..];
    Ok(Header {
        magic: u16_at(bytes, 0),
        file_size: u32_at(bytes, 2),
        pixel_offset: u32_at(bytes, 10),
        info_size: u32_at(info, 0),
        width: i32_at(info, 4),
        height: i32_at(info, 8),
        bit_count: u16_at(info, 14),
        compression: u32_at(info, 16),
        colors_used: u32_at(info, 32),
    })
}

/// Reject anything other than uncompressed, bottom-up, 8-bit bitmaps
pub fn validate(header: &Header) -> Result<(), BitmapError> {
    if header.magic != BMP_MAGIC {
        return Err(BitmapError::NotBitmap(header.magic));
    }
    if (header.info_size as usize) < INFO_HEADER_LEN {
        return Err(BitmapError::UnsupportedHeader(header.info_size));
    }
    if header.bit_count != GRAYSCALE_BITS {
        return Err(BitmapError::UnsupportedDepth(header.bit_count));
    }
    if header.compression != BI_RGB {
        return Err(BitmapError::Compressed(header.compression));
    }
    if header.height < 0 {
        return Err(BitmapError::TopDown);
    }
    if header.width <= 0 || header.height == 0 {
        return Err(BitmapError::InvalidDimensions {
            width: header.width,
            height: header.height,
        });
    }
    Ok(())
}

/// Serialize a minimal header pair, the inverse of `parse_header`
pub fn generate_header(
    width: i32,
    height: i32,
    palette_entries: u32,
    data_len: u32,
) -> [u8; HEADERS_LEN] {
    let pixel_offset = HEADERS_LEN as u32 + palette_entries * 4;
    let mut out = [0u8; HEADERS_LEN];

    out[0..2].copy_from_slice(&BMP_MAGIC.to_le_bytes());
    out[2..6].copy_from_slice(&(pixel_offset + data_len).to_le_bytes());
    out[10..14].copy_from_slice(&pixel_offset.to_le_bytes());

    let info = &mut out[FILE_HEADER_LEN..];
    info[0..4].copy_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    info[4..8].copy_from_slice(&width.to_le_bytes());
    info[8..12].copy_from_slice(&height.to_le_bytes());
    info[12..14].copy_from_slice(&1u16.to_le_bytes()); // planes
    info[14..16].copy_from_slice(&GRAYSCALE_BITS.to_le_bytes());
    info[16..20].copy_from_slice(&BI_RGB.to_le_bytes());
    info[20..24].copy_from_slice(&data_len.to_le_bytes());
    info[32..36].copy_from_slice(&palette_entries.to_le_bytes());
    out
}
