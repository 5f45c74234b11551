//! Value adapters
//!
//! Convenience encodings for primitive values, so callers can stash a
//! counter or a label in a store without inventing their own byte
//! format. Integers and floats are fixed-width little-endian,
//! `usize`/`isize` are varints (their width is platform-dependent), and
//! strings are length-prefixed — all via [`codec`](crate::codec).
//!
//! ```
//! use stratakv::{MemStore, Store, StoredValue};
//!
//! let store = MemStore::new();
//! let mut buf = Vec::new();
//! 42u64.save(&mut buf).unwrap();
//! store.set("counter", &mut buf.as_slice()).unwrap();
//!
//! let mut out = Vec::new();
//! store.get("counter", &mut out).unwrap();
//! assert_eq!(u64::load(&mut out.as_slice()).unwrap(), 42);
//! ```

use std::io::{Read, Write};

use crate::codec;
use crate::error::Result;

/// A value with a fixed store encoding.
///
/// `load(save(v)) == Ok(v)` for every implementor.
pub trait StoredValue: Sized {
    /// Encode the value to the destination
    fn save(&self, dest: &mut dyn Write) -> Result<()>;

    /// Decode a value from the source
    fn load(src: &mut dyn Read) -> Result<Self>;
}

macro_rules! stored_value {
    ($($ty:ty => $write_fn:ident / $read_fn:ident),* $(,)?) => {
        $(
            impl StoredValue for $ty {
                fn save(&self, dest: &mut dyn Write) -> Result<()> {
                    codec::$write_fn(dest, *self)
                }

                fn load(src: &mut dyn Read) -> Result<Self> {
                    codec::$read_fn(src)
                }
            }
        )*
    };
}

stored_value! {
    u8 => write_u8 / read_u8,
    u16 => write_u16 / read_u16,
    u32 => write_u32 / read_u32,
    u64 => write_u64 / read_u64,
    i8 => write_i8 / read_i8,
    i16 => write_i16 / read_i16,
    i32 => write_i32 / read_i32,
    i64 => write_i64 / read_i64,
    f32 => write_f32 / read_f32,
    f64 => write_f64 / read_f64,
}

impl StoredValue for usize {
    fn save(&self, dest: &mut dyn Write) -> Result<()> {
        codec::write_uvarint(dest, *self as u64)
    }

    fn load(src: &mut dyn Read) -> Result<Self> {
        Ok(codec::read_uvarint(src)? as usize)
    }
}

impl StoredValue for isize {
    fn save(&self, dest: &mut dyn Write) -> Result<()> {
        codec::write_ivarint(dest, *self as i64)
    }

    fn load(src: &mut dyn Read) -> Result<Self> {
        Ok(codec::read_ivarint(src)? as isize)
    }
}

impl StoredValue for String {
    fn save(&self, dest: &mut dyn Write) -> Result<()> {
        codec::write_string(dest, self)
    }

    fn load(src: &mut dyn Read) -> Result<Self> {
        codec::read_string(src)
    }
}
