//! Typed access over any byte stream

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::instrument;

use crate::error::{Error, Result};

const INITIAL_READ_CAPACITY: usize = 64 * 1024;

/// Reference point used by [`BinaryCursor::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Offset is absolute from the start of the stream
    Start,
    /// Offset is relative to the current position
    Current,
    /// Offset is relative to the end of the stream
    End,
}

/// Wraps a stream and exposes typed little and big endian reads and writes.
///
/// The cursor keeps no state of its own, the position always belongs to the
/// wrapped stream. It also implements [`Read`], [`Write`] and [`Seek`] so it can
/// be handed directly to `binrw` derived types.
///
/// ```
/// # fn doit() -> chi_buffer::Result<()> {
/// use chi_buffer::{BinaryCursor, SeekMode};
/// use std::io::Cursor;
///
/// let mut cursor = BinaryCursor::new(Cursor::new(vec![0x54, 0x4D, 0x33, 0x00, 0x02, 0x00]));
/// assert_eq!(cursor.read_u32_le()?, 0x00334D54);
/// assert_eq!(cursor.read_u16_le()?, 2);
///
/// cursor.seek(0, SeekMode::Start)?;
/// assert_eq!(cursor.read_fixed_string(4)?, b"TM3\0");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug)]
pub struct BinaryCursor<S> {
    inner: S,
}

impl<S> BinaryCursor<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read> BinaryCursor<S> {
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<BigEndian>()?)
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16::<LittleEndian>()?)
    }

    pub fn read_i16_be(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16::<BigEndian>()?)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<BigEndian>()?)
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn read_i32_be(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(self.inner.read_u64::<LittleEndian>()?)
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        Ok(self.inner.read_u64::<BigEndian>()?)
    }

    pub fn read_i64_le(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64::<LittleEndian>()?)
    }

    pub fn read_i64_be(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64::<BigEndian>()?)
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    pub fn read_f32_be(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32::<BigEndian>()?)
    }

    /// Reads exactly `len` bytes, failing if the stream ends first.
    ///
    /// The buffer grows with the data actually read, so a corrupt length
    /// field cannot force a large allocation up front.
    #[instrument(skip(self), err)]
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(INITIAL_READ_CAPACITY));
        self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(Error::ShortRead {
                expected: len as u64,
                actual: buf.len() as u64,
            });
        }
        Ok(buf)
    }

    /// Reads a fixed width string field.
    ///
    /// The bytes are returned untouched. Trailing NULs and unprintable bytes are
    /// left for the caller to filter.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_bytes(len)
    }

    /// Copies exactly `len` bytes from the stream into `out`
    #[instrument(skip(self, out), err)]
    pub fn copy_to<W: Write + ?Sized>(&mut self, len: u64, out: &mut W) -> Result<u64> {
        let copied = io::copy(&mut self.inner.by_ref().take(len), out)?;
        if copied != len {
            return Err(Error::ShortCopy {
                expected: len,
                actual: copied,
            });
        }
        Ok(copied)
    }
}

impl<S: Write> BinaryCursor<S> {
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.inner.write_u8(value)?)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        Ok(self.inner.write_i8(value)?)
    }

    pub fn write_u16_le(&mut self, value: u16) -> Result<()> {
        Ok(self.inner.write_u16::<LittleEndian>(value)?)
    }

    pub fn write_u16_be(&mut self, value: u16) -> Result<()> {
        Ok(self.inner.write_u16::<BigEndian>(value)?)
    }

    pub fn write_i16_le(&mut self, value: i16) -> Result<()> {
        Ok(self.inner.write_i16::<LittleEndian>(value)?)
    }

    pub fn write_i16_be(&mut self, value: i16) -> Result<()> {
        Ok(self.inner.write_i16::<BigEndian>(value)?)
    }

    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        Ok(self.inner.write_u32::<LittleEndian>(value)?)
    }

    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        Ok(self.inner.write_u32::<BigEndian>(value)?)
    }

    pub fn write_i32_le(&mut self, value: i32) -> Result<()> {
        Ok(self.inner.write_i32::<LittleEndian>(value)?)
    }

    pub fn write_i32_be(&mut self, value: i32) -> Result<()> {
        Ok(self.inner.write_i32::<BigEndian>(value)?)
    }

    pub fn write_u64_le(&mut self, value: u64) -> Result<()> {
        Ok(self.inner.write_u64::<LittleEndian>(value)?)
    }

    pub fn write_u64_be(&mut self, value: u64) -> Result<()> {
        Ok(self.inner.write_u64::<BigEndian>(value)?)
    }

    pub fn write_i64_le(&mut self, value: i64) -> Result<()> {
        Ok(self.inner.write_i64::<LittleEndian>(value)?)
    }

    pub fn write_i64_be(&mut self, value: i64) -> Result<()> {
        Ok(self.inner.write_i64::<BigEndian>(value)?)
    }

    pub fn write_f32_le(&mut self, value: f32) -> Result<()> {
        Ok(self.inner.write_f32::<LittleEndian>(value)?)
    }

    pub fn write_f32_be(&mut self, value: f32) -> Result<()> {
        Ok(self.inner.write_f32::<BigEndian>(value)?)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(bytes)?)
    }

    /// Writes `len` zero bytes
    pub fn write_zeros(&mut self, len: u64) -> Result<()> {
        let copied = io::copy(&mut io::repeat(0).take(len), &mut self.inner)?;
        debug_assert_eq!(copied, len);
        Ok(())
    }
}

impl<S: Seek> BinaryCursor<S> {
    /// Moves the stream position and returns the new absolute position
    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64> {
        let from = match mode {
            SeekMode::Start => {
                SeekFrom::Start(u64::try_from(offset).map_err(|_| Error::InvalidSeek(offset))?)
            }
            SeekMode::Current => SeekFrom::Current(offset),
            SeekMode::End => SeekFrom::End(offset),
        };
        Ok(self.inner.seek(from)?)
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Length of the whole stream; the position is left where it was
    pub fn stream_len(&mut self) -> Result<u64> {
        let current = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        if current != end {
            self.inner.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }
}

impl<S: Read> Read for BinaryCursor<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<S: Write> Write for BinaryCursor<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: Seek> Seek for BinaryCursor<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use std::io::Cursor;
    use tracing_test::traced_test;

    use crate::cursor::{BinaryCursor, SeekMode};
    use crate::error::{Error, Result};

    #[test]
    fn read_mixed_endian() -> Result<()> {
        #[rustfmt::skip]
        let mut cursor = BinaryCursor::new(Cursor::new(vec![
            0x01,
            0x34, 0x12,
            0x12, 0x34,
            0x78, 0x56, 0x34, 0x12,
            0x12, 0x34, 0x56, 0x78,
            0x60, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0xFF,
        ]));

        assert_eq!(cursor.read_u8()?, 0x01);
        assert_eq!(cursor.read_u16_le()?, 0x1234);
        assert_eq!(cursor.read_u16_be()?, 0x1234);
        assert_eq!(cursor.read_u32_le()?, 0x12345678);
        assert_eq!(cursor.read_u32_be()?, 0x12345678);
        assert_eq!(cursor.read_u64_le()?, 0x260);
        assert_eq!(cursor.read_i8()?, -1);
        assert_eq!(cursor.position()?, 22);

        Ok(())
    }

    #[test]
    fn fixed_string_is_not_trimmed() -> Result<()> {
        let mut cursor = BinaryCursor::new(Cursor::new(b"ab\0\0\x01cd".to_vec()));

        assert_eq!(cursor.read_fixed_string(5)?, b"ab\0\0\x01");
        assert_eq!(cursor.read_fixed_string(2)?, b"cd");

        Ok(())
    }

    #[test]
    fn short_read_fails() {
        let mut cursor = BinaryCursor::new(Cursor::new(vec![0x01, 0x02]));

        assert!(matches!(cursor.read_u32_le(), Err(Error::IOError(_))));
        assert!(matches!(
            cursor.read_bytes(3),
            Err(Error::ShortRead {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[traced_test]
    #[test]
    fn corrupt_length_fails_without_allocating() {
        let mut cursor = BinaryCursor::new(Cursor::new(vec![0xAB; 16]));

        assert!(matches!(
            cursor.read_bytes(usize::MAX),
            Err(Error::ShortRead { actual: 16, .. })
        ));
        assert!(logs_contain("stream ended after 16 of"));
    }

    #[test]
    fn seek_modes() -> Result<()> {
        let mut cursor = BinaryCursor::new(Cursor::new((0u8..16).collect::<Vec<_>>()));

        assert_eq!(cursor.seek(4, SeekMode::Start)?, 4);
        assert_eq!(cursor.seek(2, SeekMode::Current)?, 6);
        assert_eq!(cursor.read_u8()?, 6);
        assert_eq!(cursor.seek(-1, SeekMode::End)?, 15);
        assert_eq!(cursor.read_u8()?, 15);
        assert_eq!(cursor.stream_len()?, 16);
        assert_eq!(cursor.position()?, 16);

        assert!(matches!(
            cursor.seek(-1, SeekMode::Start),
            Err(Error::InvalidSeek(-1))
        ));

        Ok(())
    }

    #[test]
    fn write_values() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x54, 0x4D, 0x33, 0x00,
            0x00, 0x02,
            0x00, 0x00, 0x00,
            0xAA, 0xBB,
        ];

        let mut cursor = BinaryCursor::new(Cursor::new(Vec::new()));
        cursor.write_u32_le(0x00334D54)?;
        cursor.write_u16_be(2)?;
        cursor.write_zeros(3)?;
        cursor.write_bytes(&[0xAA, 0xBB])?;

        assert_str_eq!(
            format!("{:02X?}", cursor.into_inner().into_inner()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn copy_exact_range() -> Result<()> {
        let mut cursor = BinaryCursor::new(Cursor::new((0u8..10).collect::<Vec<_>>()));
        cursor.seek(3, SeekMode::Start)?;

        let mut out = Vec::new();
        assert_eq!(cursor.copy_to(4, &mut out)?, 4);
        assert_eq!(out, vec![3, 4, 5, 6]);

        let mut rest = Vec::new();
        assert!(matches!(
            cursor.copy_to(8, &mut rest),
            Err(Error::ShortCopy {
                expected: 8,
                actual: 3
            })
        ));
        assert!(logs_contain("stream ended after 3 of 8 bytes"));

        Ok(())
    }
}
