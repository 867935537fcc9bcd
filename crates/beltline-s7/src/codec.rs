//! Big-endian S7 data-block accessors.
//!
//! All multi-byte values in S7 data blocks are big-endian. These helpers work
//! on plain byte slices so they are testable without a controller, and they
//! report out-of-range access as an error instead of panicking.

/// Errors from raw buffer access.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("offset {offset} out of range for {width}-byte access in {len}-byte buffer")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("bit index {0} out of range (0..=7)")]
    BitIndex(u8),
}

fn check(buf: &[u8], offset: usize, width: usize) -> Result<(), CodecError> {
    if offset.checked_add(width).is_none_or(|end| end > buf.len()) {
        return Err(CodecError::OutOfRange {
            offset,
            width,
            len: buf.len(),
        });
    }
    Ok(())
}

/// Read one bit out of `buf[offset]`.
pub fn get_bool(buf: &[u8], offset: usize, bit: u8) -> Result<bool, CodecError> {
    if bit > 7 {
        return Err(CodecError::BitIndex(bit));
    }
    check(buf, offset, 1)?;
    Ok((buf[offset] >> bit) & 0x01 != 0)
}

/// Set one bit in-place in `buf[offset]`.
pub fn set_bool(buf: &mut [u8], offset: usize, bit: u8, value: bool) -> Result<(), CodecError> {
    if bit > 7 {
        return Err(CodecError::BitIndex(bit));
    }
    check(buf, offset, 1)?;
    if value {
        buf[offset] |= 1 << bit;
    } else {
        buf[offset] &= !(1 << bit);
    }
    Ok(())
}

pub fn get_byte(buf: &[u8], offset: usize) -> Result<u8, CodecError> {
    check(buf, offset, 1)?;
    Ok(buf[offset])
}

pub fn set_byte(buf: &mut [u8], offset: usize, value: u8) -> Result<(), CodecError> {
    check(buf, offset, 1)?;
    buf[offset] = value;
    Ok(())
}

/// S7 INT: 16-bit signed, big-endian.
pub fn get_int(buf: &[u8], offset: usize) -> Result<i16, CodecError> {
    check(buf, offset, 2)?;
    Ok(i16::from_be_bytes([buf[offset], buf[offset + 1]]))
}

pub fn set_int(buf: &mut [u8], offset: usize, value: i16) -> Result<(), CodecError> {
    check(buf, offset, 2)?;
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// S7 DINT: 32-bit signed, big-endian.
pub fn get_dint(buf: &[u8], offset: usize) -> Result<i32, CodecError> {
    check(buf, offset, 4)?;
    Ok(i32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

pub fn set_dint(buf: &mut [u8], offset: usize, value: i32) -> Result<(), CodecError> {
    check(buf, offset, 4)?;
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// S7 REAL: IEEE-754 float32, big-endian.
pub fn get_real(buf: &[u8], offset: usize) -> Result<f32, CodecError> {
    check(buf, offset, 4)?;
    Ok(f32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

pub fn set_real(buf: &mut [u8], offset: usize, value: f32) -> Result<(), CodecError> {
    check(buf, offset, 4)?;
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    Ok(())
}
