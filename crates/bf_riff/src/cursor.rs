//! Endian-aware primitive reading and writing over in-memory buffers.
//!
//! The byte order is chosen once, when a container's magic has been inspected, and is then
//! carried by every [`Reader`] and [`Writer`] built for that container.

use std::io::Cursor;

use binrw::{BinRead, BinWrite, Endian};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use winnow::binary::Endianness;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Byte order of every multi-byte field in a container
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Select the byte order from the first four bytes of a buffer.
    ///
    /// The marker is read as a little-endian integer: `magic` means little-endian data, the
    /// byte-reversed value means big-endian data.
    pub fn detect(data: &[u8], magic: u32) -> Result<ByteOrder> {
        let head = data.get(..4).ok_or(Error::OutOfData {
            offset: 0,
            wanted: 4,
            available: data.len(),
        })?;

        match LittleEndian::read_u32(head) {
            value if value == magic => Ok(ByteOrder::Little),
            value if value == magic.swap_bytes() => Ok(ByteOrder::Big),
            value => Err(Error::InvalidMagic(value)),
        }
    }
}

impl From<ByteOrder> for Endian {
    fn from(value: ByteOrder) -> Self {
        match value {
            ByteOrder::Little => Endian::Little,
            ByteOrder::Big => Endian::Big,
        }
    }
}

impl From<ByteOrder> for Endianness {
    fn from(value: ByteOrder) -> Self {
        match value {
            ByteOrder::Little => Endianness::Little,
            ByteOrder::Big => Endianness::Big,
        }
    }
}

macro_rules! read_primitive {
    ($name:ident, $ty:ty, $size:expr) => {
        #[doc = concat!("Read a `", stringify!($ty), "` in the reader's byte order")]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_bytes($size)?;
            Ok(match self.order {
                ByteOrder::Little => LittleEndian::$name(bytes),
                ByteOrder::Big => BigEndian::$name(bytes),
            })
        }
    };
}

macro_rules! write_primitive {
    ($name:ident, $ty:ty, $size:expr) => {
        #[doc = concat!("Append a `", stringify!($ty), "` in the writer's byte order")]
        pub fn $name(&mut self, value: $ty) {
            let mut bytes = [0u8; $size];
            match self.order {
                ByteOrder::Little => LittleEndian::$name(&mut bytes, value),
                ByteOrder::Big => BigEndian::$name(&mut bytes, value),
            }
            self.buffer.extend_from_slice(&bytes);
        }
    };
}

/// Sequential reader over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
    base: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self::with_base(data, order, 0)
    }

    /// Create a reader whose errors report offsets relative to `base`
    pub fn with_base(data: &'a [u8], order: ByteOrder, base: usize) -> Self {
        Reader {
            data,
            position: 0,
            base,
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Switch the byte order for every following read
    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Position relative to the start of this reader's slice
    pub fn position(&self) -> usize {
        self.position
    }

    /// Position relative to the start of the file
    pub fn offset(&self) -> usize {
        self.base + self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.out_of_data(len));
        }

        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Take everything that has not been read yet
    pub fn read_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.position..];
        self.position = self.data.len();
        bytes
    }

    read_primitive!(read_u16, u16, 2);
    read_primitive!(read_i16, i16, 2);
    read_primitive!(read_u32, u32, 4);
    read_primitive!(read_i32, i32, 4);
    read_primitive!(read_u64, u64, 8);
    read_primitive!(read_i64, i64, 8);
    read_primitive!(read_f32, f32, 4);

    /// Read a `u32` and fail unless it holds the known constant
    pub fn expect_u32(&mut self, field: &'static str, expected: u32) -> Result<()> {
        let actual = self.read_u32()?;
        if actual != expected {
            return Err(Error::UnexpectedValue {
                field,
                expected: expected.into(),
                actual: actual.into(),
            });
        }
        Ok(())
    }

    /// Read a fixed layout structure using this reader's byte order
    pub fn read_struct<T>(&mut self) -> Result<T>
    where
        T: BinRead,
        for<'b> T::Args<'b>: Default,
    {
        let mut inner = Cursor::new(&self.data[self.position..]);
        let value = T::read_options(&mut inner, self.order.into(), Default::default())
            .map_err(|err| match err {
                err if err.is_eof() => self.out_of_data(std::mem::size_of::<T>()),
                err => Error::from(err),
            })?;

        self.position += inner.position() as usize;
        Ok(value)
    }

    fn out_of_data(&self, wanted: usize) -> Error {
        Error::OutOfData {
            offset: self.offset(),
            wanted,
            available: self.remaining(),
        }
    }
}

/// Growable output buffer with a fixed byte order
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buffer: Vec<u8>,
    order: ByteOrder,
}

impl Writer {
    pub fn new(order: ByteOrder) -> Self {
        Writer {
            buffer: Vec::new(),
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    write_primitive!(write_u16, u16, 2);
    write_primitive!(write_i16, i16, 2);
    write_primitive!(write_u32, u32, 4);
    write_primitive!(write_i32, i32, 4);
    write_primitive!(write_u64, u64, 8);
    write_primitive!(write_i64, i64, 8);
    write_primitive!(write_f32, f32, 4);

    /// Append a fixed layout structure using this writer's byte order
    pub fn write_struct<T>(&mut self, value: &T) -> Result<()>
    where
        T: BinWrite,
        for<'b> T::Args<'b>: Default,
    {
        let position = self.buffer.len() as u64;
        let mut inner = Cursor::new(&mut self.buffer);
        inner.set_position(position);
        value.write_options(&mut inner, self.order.into(), Default::default())?;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{ByteOrder, Reader, Writer};
    use crate::error::{Error, Result};

    #[test]
    fn read_both_orders() -> Result<()> {
        let input = [0x01, 0x02, 0x03, 0x04];

        assert_eq!(Reader::new(&input, ByteOrder::Little).read_u32()?, 0x04030201);
        assert_eq!(Reader::new(&input, ByteOrder::Big).read_u32()?, 0x01020304);
        assert_eq!(Reader::new(&input, ByteOrder::Big).read_i16()?, 0x0102);

        Ok(())
    }

    #[test]
    fn read_float() -> Result<()> {
        let input = [0x00, 0x00, 0x80, 0x3F, 0x3F, 0x80, 0x00, 0x00];
        let mut reader = Reader::new(&input, ByteOrder::Little);
        assert_eq!(reader.read_f32()?, 1.0);

        let mut reader = Reader::new(&input[4..], ByteOrder::Big);
        assert_eq!(reader.read_f32()?, 1.0);

        Ok(())
    }

    #[test]
    fn read_past_end() {
        let input = [0x00, 0x01, 0x02];
        let mut reader = Reader::with_base(&input, ByteOrder::Little, 0x10);
        assert!(reader.read_u16().is_ok());

        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfData {
                offset: 0x12,
                wanted: 4,
                available: 1
            }
        ));
    }

    #[test]
    fn read_struct_past_end() {
        let input = [0x00, 0x01, 0x02];
        let mut reader = Reader::new(&input, ByteOrder::Little);
        let err = reader.read_struct::<u64>().unwrap_err();
        assert!(matches!(err, Error::OutOfData { wanted: 8, .. }));
    }

    #[test]
    fn expect_constant() {
        let input = [0x03, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00];
        let mut reader = Reader::new(&input, ByteOrder::Little);
        assert!(reader.expect_u32("format", 3).is_ok());

        let err = reader.expect_u32("format", 3).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedValue {
                field: "format",
                expected: 3,
                actual: 5
            }
        ));
    }

    #[test]
    fn write_both_orders() -> Result<()> {
        let mut little = Writer::new(ByteOrder::Little);
        little.write_u32(0x01020304);
        little.write_u16(0x0506);
        little.write_struct(&0x0708u16)?;
        assert_eq!(little.as_slice(), [0x04, 0x03, 0x02, 0x01, 0x06, 0x05, 0x08, 0x07]);

        let mut big = Writer::new(ByteOrder::Big);
        big.write_u32(0x01020304);
        big.write_u16(0x0506);
        big.write_struct(&0x0708u16)?;
        assert_eq!(big.as_slice(), [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

        Ok(())
    }

    #[test]
    fn switch_order_mid_stream() -> Result<()> {
        let mut writer = Writer::new(ByteOrder::Little);
        writer.write_u16(0x0102);
        writer.set_order(ByteOrder::Big);
        writer.write_u16(0x0102);
        assert_eq!(writer.as_slice(), [0x02, 0x01, 0x01, 0x02]);

        let mut reader = Reader::new(writer.as_slice(), ByteOrder::Little);
        assert_eq!(reader.read_u16()?, 0x0102);
        reader.set_order(ByteOrder::Big);
        assert_eq!(reader.read_u16()?, 0x0102);
        assert_eq!(reader.order(), ByteOrder::Big);

        Ok(())
    }

    #[test]
    fn detect_order() {
        assert_eq!(
            ByteOrder::detect(b"FFIR", 0x52494646).ok(),
            Some(ByteOrder::Little)
        );
        assert_eq!(
            ByteOrder::detect(b"RIFF", 0x52494646).ok(),
            Some(ByteOrder::Big)
        );
        assert!(matches!(
            ByteOrder::detect(b"RIFX", 0x52494646),
            Err(Error::InvalidMagic(0x58464952))
        ));
        assert!(matches!(
            ByteOrder::detect(b"RI", 0x52494646),
            Err(Error::OutOfData { .. })
        ));
    }
}
