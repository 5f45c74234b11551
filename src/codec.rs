//! Binary codec
//!
//! Little-endian stream encoding shared by the snapshot format and the
//! [`StoredValue`](crate::types::StoredValue) adapters.
//!
//! ## Snapshot Stream Format
//!
//! A snapshot is a tag-free sequence of records, one per key, until
//! end-of-stream:
//!
//! ```text
//! ┌──────────────┬───────────┬──────────────┬───────────────┐
//! │ KeyLen (var) │    Key    │ ValLen (var) │     Value     │
//! └──────────────┴───────────┴──────────────┴───────────────┘
//! ... repeated for each entry ...
//! ```
//!
//! Variable-length integers are unsigned LEB128 (7 data bits per byte,
//! high bit = continuation); signed values use zigzag on top. All
//! fixed-width values are little-endian. Both choices are part of the
//! format's compatibility contract.
//!
//! End-of-stream on a record boundary ends decoding cleanly;
//! end-of-stream inside a record is a
//! [`CorruptStream`](StrataError::CorruptStream) error.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, StrataError};

/// Longest legal LEB128 encoding of a u64 (ceil(64 / 7) bytes)
const MAX_VARINT_LEN: u32 = 10;

// =============================================================================
// Variable-length integers
// =============================================================================

/// Write an unsigned LEB128 varint
pub fn write_uvarint<W: Write + ?Sized>(w: &mut W, mut v: u64) -> Result<()> {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            w.write_all(&[byte])?;
            return Ok(());
        }
        w.write_all(&[byte | 0x80])?;
    }
}

/// Read an unsigned LEB128 varint
///
/// End-of-stream anywhere inside the value is `CorruptStream`.
pub fn read_uvarint<R: Read + ?Sized>(r: &mut R) -> Result<u64> {
    match try_read_uvarint(r)? {
        Some(v) => Ok(v),
        None => Err(StrataError::CorruptStream),
    }
}

/// Read an unsigned LEB128 varint, tolerating end-of-stream before the
/// first byte
///
/// Returns `Ok(None)` on a clean end-of-stream; end-of-stream after the
/// first byte is `CorruptStream`.
pub fn try_read_uvarint<R: Read + ?Sized>(r: &mut R) -> Result<Option<u64>> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = match read_byte(r)? {
            Some(b) => b,
            None if shift == 0 => return Ok(None),
            None => return Err(StrataError::CorruptStream),
        };
        if shift >= MAX_VARINT_LEN * 7 {
            return Err(StrataError::CorruptStream);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(Some(value));
        }
        shift += 7;
    }
}

/// Write a signed varint (zigzag-mapped LEB128)
pub fn write_ivarint<W: Write + ?Sized>(w: &mut W, v: i64) -> Result<()> {
    write_uvarint(w, ((v << 1) ^ (v >> 63)) as u64)
}

/// Read a signed varint (zigzag-mapped LEB128)
pub fn read_ivarint<R: Read + ?Sized>(r: &mut R) -> Result<i64> {
    let raw = read_uvarint(r)?;
    Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
}

// =============================================================================
// Strings
// =============================================================================

/// Write a length-prefixed UTF-8 string
pub fn write_string<W: Write + ?Sized>(w: &mut W, s: &str) -> Result<()> {
    write_uvarint(w, s.len() as u64)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string
pub fn read_string<R: Read + ?Sized>(r: &mut R) -> Result<String> {
    let len = read_uvarint(r)?;
    let raw = read_exact_len(r, len)?;
    String::from_utf8(raw).map_err(|_| StrataError::CorruptStream)
}

// =============================================================================
// Snapshot records
// =============================================================================

/// Write one `(key, value)` snapshot record
pub fn write_record<W: Write + ?Sized>(w: &mut W, key: &str, value: &[u8]) -> Result<()> {
    write_string(w, key)?;
    write_uvarint(w, value.len() as u64)?;
    w.write_all(value)?;
    Ok(())
}

/// Read the next snapshot record
///
/// Returns `Ok(None)` on a clean end-of-stream between records. An
/// end-of-stream once a record has started is `CorruptStream`.
pub fn try_read_record<R: Read + ?Sized>(r: &mut R) -> Result<Option<(String, Vec<u8>)>> {
    let key_len = match try_read_uvarint(r)? {
        Some(len) => len,
        None => return Ok(None),
    };
    let key = String::from_utf8(read_exact_len(r, key_len)?)
        .map_err(|_| StrataError::CorruptStream)?;
    let val_len = read_uvarint(r)?;
    let value = read_exact_len(r, val_len)?;
    Ok(Some((key, value)))
}

// =============================================================================
// Fixed-width primitives (little-endian)
// =============================================================================

macro_rules! fixed_width {
    ($($write_fn:ident / $read_fn:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Write a `", stringify!($ty), "` in little-endian byte order")]
            pub fn $write_fn<W: Write + ?Sized>(w: &mut W, v: $ty) -> Result<()> {
                w.write_all(&v.to_le_bytes())?;
                Ok(())
            }

            #[doc = concat!("Read a little-endian `", stringify!($ty), "`")]
            pub fn $read_fn<R: Read + ?Sized>(r: &mut R) -> Result<$ty> {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                r.read_exact(&mut buf).map_err(|e| match e.kind() {
                    ErrorKind::UnexpectedEof => StrataError::CorruptStream,
                    _ => StrataError::Io(e),
                })?;
                Ok(<$ty>::from_le_bytes(buf))
            }
        )*
    };
}

fixed_width! {
    write_u8 / read_u8 => u8,
    write_u16 / read_u16 => u16,
    write_u32 / read_u32 => u32,
    write_u64 / read_u64 => u64,
    write_i8 / read_i8 => i8,
    write_i16 / read_i16 => i16,
    write_i32 / read_i32 => i32,
    write_i64 / read_i64 => i64,
    write_f32 / read_f32 => f32,
    write_f64 / read_f64 => f64,
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Read a single byte, mapping end-of-stream to `None`
fn read_byte<R: Read + ?Sized>(r: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read exactly `len` bytes, treating a short read as `CorruptStream`
///
/// Uses `Read::take` so a corrupt length prefix cannot trigger a huge
/// up-front allocation.
fn read_exact_len<R: Read + ?Sized>(r: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    r.take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(StrataError::CorruptStream);
    }
    Ok(buf)
}
