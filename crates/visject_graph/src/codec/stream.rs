// SPDX-License-Identifier: MIT OR Apache-2.0
//! Little-endian byte readers and writers.

use super::FormatError;
use uuid::Uuid;

macro_rules! read_le {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Read a little-endian `", stringify!($ty), "`")]
        pub fn $name(&mut self) -> Result<$ty, FormatError> {
            let mut raw = [0u8; std::mem::size_of::<$ty>()];
            raw.copy_from_slice(self.read_bytes(std::mem::size_of::<$ty>())?);
            Ok(<$ty>::from_le_bytes(raw))
        }
    };
}

macro_rules! write_le {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Write a little-endian `", stringify!($ty), "`")]
        pub fn $name(&mut self, value: $ty) {
            self.data.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Cursor over an encoded graph
#[derive(Debug)]
pub struct ReadStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadStream<'a> {
    /// Start reading at the beginning of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if len > self.remaining() {
            return Err(FormatError::UnexpectedEof(self.pos));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    read_le!(read_u8, u8);
    read_le!(read_i16, i16);
    read_le!(read_u16, u16);
    read_le!(read_i32, i32);
    read_le!(read_u32, u32);
    read_le!(read_i64, i64);
    read_le!(read_u64, u64);
    read_le!(read_f32, f32);
    read_le!(read_f64, f64);

    /// Read a byte as a flag
    pub fn read_bool(&mut self) -> Result<bool, FormatError> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a non-negative `int32` count, checked against the bytes left
    /// assuming each item takes at least `min_item_size` bytes
    pub fn read_count(&mut self, min_item_size: usize) -> Result<usize, FormatError> {
        let offset = self.pos;
        let len = self.read_i32()?;
        let count = usize::try_from(len).map_err(|_| FormatError::InvalidLength {
            len: len.into(),
            offset,
        })?;
        if count.saturating_mul(min_item_size) > self.remaining() {
            return Err(FormatError::UnexpectedEof(self.pos));
        }
        Ok(count)
    }

    /// Read a GUID
    pub fn read_guid(&mut self) -> Result<Uuid, FormatError> {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(self.read_bytes(16)?);
        Ok(Uuid::from_bytes(raw))
    }

    /// Read `N` floats
    pub fn read_f32s<const N: usize>(&mut self) -> Result<[f32; N], FormatError> {
        let mut out = [0.0; N];
        for v in &mut out {
            *v = self.read_f32()?;
        }
        Ok(out)
    }

    /// Read `N` doubles
    pub fn read_f64s<const N: usize>(&mut self) -> Result<[f64; N], FormatError> {
        let mut out = [0.0; N];
        for v in &mut out {
            *v = self.read_f64()?;
        }
        Ok(out)
    }

    /// Read `N` 32-bit integers
    pub fn read_i32s<const N: usize>(&mut self) -> Result<[i32; N], FormatError> {
        let mut out = [0; N];
        for v in &mut out {
            *v = self.read_i32()?;
        }
        Ok(out)
    }

    /// Read an `int32`-prefixed byte array
    pub fn read_blob(&mut self) -> Result<Vec<u8>, FormatError> {
        let len = self.read_count(1)?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Read an `int32` char count followed by UTF-16 units XOR `key`
    pub fn read_string(&mut self, key: i16) -> Result<String, FormatError> {
        let len = self.read_count(2)?;
        self.read_utf16(len, key as u16)
    }

    /// Read `len` UTF-16 units XOR `key`
    pub fn read_utf16(&mut self, len: usize, key: u16) -> Result<String, FormatError> {
        let offset = self.pos;
        let mut units = Vec::with_capacity(len);
        for _ in 0..len {
            units.push(self.read_u16()? ^ key);
        }
        String::from_utf16(&units).map_err(|_| FormatError::InvalidString(offset))
    }

    /// Read an `int32` byte count followed by bytes XOR `key`
    pub fn read_ansi(&mut self, key: u8) -> Result<String, FormatError> {
        let len = self.read_count(1)?;
        let offset = self.pos;
        let bytes: Vec<u8> = self.read_bytes(len)?.iter().map(|b| b ^ key).collect();
        String::from_utf8(bytes).map_err(|_| FormatError::InvalidString(offset))
    }
}

/// Growable output buffer
#[derive(Debug, Default)]
pub struct WriteStream {
    data: Vec<u8>,
}

impl WriteStream {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish writing
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    write_le!(write_u8, u8);
    write_le!(write_i16, i16);
    write_le!(write_u16, u16);
    write_le!(write_i32, i32);
    write_le!(write_u32, u32);
    write_le!(write_i64, i64);
    write_le!(write_u64, u64);
    write_le!(write_f32, f32);
    write_le!(write_f64, f64);

    /// Write a flag as a byte
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Write an `int32` count
    pub fn write_count(&mut self, count: usize, what: &'static str) -> Result<(), FormatError> {
        let count = i32::try_from(count).map_err(|_| FormatError::TooLarge(what))?;
        self.write_i32(count);
        Ok(())
    }

    /// Write a GUID
    pub fn write_guid(&mut self, id: &Uuid) {
        self.write_bytes(id.as_bytes());
    }

    /// Write floats
    pub fn write_f32s(&mut self, values: &[f32]) {
        for v in values {
            self.write_f32(*v);
        }
    }

    /// Write doubles
    pub fn write_f64s(&mut self, values: &[f64]) {
        for v in values {
            self.write_f64(*v);
        }
    }

    /// Write 32-bit integers
    pub fn write_i32s(&mut self, values: &[i32]) {
        for v in values {
            self.write_i32(*v);
        }
    }

    /// Write an `int32`-prefixed byte array
    pub fn write_blob(&mut self, data: &[u8]) -> Result<(), FormatError> {
        self.write_count(data.len(), "byte array")?;
        self.write_bytes(data);
        Ok(())
    }

    /// Write an `int32` char count followed by UTF-16 units XOR `key`
    pub fn write_string(&mut self, value: &str, key: i16) -> Result<(), FormatError> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_count(units.len(), "string")?;
        for unit in units {
            self.write_u16(unit ^ key as u16);
        }
        Ok(())
    }

    /// Write an `int32` byte count followed by bytes XOR `key`
    pub fn write_ansi(&mut self, value: &str, key: u8) -> Result<(), FormatError> {
        self.write_count(value.len(), "string")?;
        for b in value.bytes() {
            self.write_u8(b ^ key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_xored() {
        let mut w = WriteStream::new();
        w.write_string("Aé", 97).unwrap();
        w.write_ansi("Hi", 77).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), u16::from(b'A') ^ 97);

        let mut r = ReadStream::new(&bytes);
        assert_eq!(r.read_string(97).unwrap(), "Aé");
        assert_eq!(r.read_ansi(77).unwrap(), "Hi");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_negative_key_masks_low_bits() {
        let mut w = WriteStream::new();
        w.write_string("a", -14).unwrap();
        let bytes = w.into_inner();
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), u16::from(b'a') ^ 0xFFF2);
    }

    #[test]
    fn test_truncated_reads_fail() {
        let mut r = ReadStream::new(&[1, 2, 3]);
        assert!(matches!(r.read_u32(), Err(FormatError::UnexpectedEof(0))));

        let bytes = (-1i32).to_le_bytes();
        let mut r = ReadStream::new(&bytes);
        assert!(matches!(r.read_blob(), Err(FormatError::InvalidLength { len: -1, .. })));

        let bytes = 100i32.to_le_bytes();
        let mut r = ReadStream::new(&bytes);
        assert!(matches!(r.read_blob(), Err(FormatError::UnexpectedEof(_))));
    }
}
