use crate::chunk::ChunkTag;
use crate::error::{DecodeError, DecodeErrorKind};

// -------------------------------------------------------------------------------------------------

/// Sequential reader over a region of the input buffer.
///
/// A cursor never reads past the end of its region, even if the underlying buffer continues;
/// [`Cursor::split_off()`] produces such bounded regions for chunk content and children.
/// Every read either consumes exactly what it asked for or fails with
/// [`DecodeErrorKind::UnexpectedEnd`] and consumes nothing.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    /// Unread bytes of the region.
    bytes: &'a [u8],
    /// Offset of `bytes[0]` from the start of the whole input, for error reporting.
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Construct an error located at the current position.
    pub fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(self.offset, kind)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let Some((head, tail)) = self.bytes.split_at_checked(count) else {
            return Err(self.error(DecodeErrorKind::UnexpectedEnd {
                needed: count,
                remaining: self.bytes.len(),
            }));
        };
        self.bytes = tail;
        self.offset += count;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_array()?;
        Ok(byte)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read an `int32` which is used as a length or count, and must not be negative.
    pub fn read_len(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let start = self.offset;
        let length = self.read_i32()?;
        usize::try_from(length)
            .map_err(|_| DecodeError::new(start, DecodeErrorKind::NegativeLength { what, length }))
    }

    pub fn read_tag(&mut self) -> Result<ChunkTag, DecodeError> {
        Ok(ChunkTag(self.read_array()?))
    }

    /// Read a string with an `int32` byte length prefix.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let length = self.read_len("string")?;
        Ok(String::from_utf8_lossy(self.read_bytes(length)?).into_owned())
    }

    /// Read an `int32` element count, then that many elements using `read_element`.
    pub fn read_list<T>(
        &mut self,
        what: &'static str,
        mut read_element: impl FnMut(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let count = self.read_len(what)?;
        // Don't trust the count for allocation; every element is at least one byte.
        let mut elements = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            elements.push(read_element(self)?);
        }
        Ok(elements)
    }

    /// Consume the next `count` bytes and return a cursor over exactly those bytes.
    pub fn split_off(&mut self, count: usize) -> Result<Cursor<'a>, DecodeError> {
        let offset = self.offset;
        let bytes = self.read_bytes(count)?;
        Ok(Cursor { bytes, offset })
    }

    /// Discard all remaining bytes, returning how many there were.
    pub fn skip_rest(&mut self) -> usize {
        let count = self.bytes.len();
        self.offset += count;
        self.bytes = &[];
        count
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_primitives() {
        let mut cursor = Cursor::new(&[0x01, 0x02, 0x00, 0x00, 0xff, b'R', b'G', b'B', b'A']);
        assert_eq!(cursor.read_i32(), Ok(0x0201));
        assert_eq!(cursor.read_u8(), Ok(0xff));
        assert_eq!(cursor.read_tag(), Ok(ChunkTag::RGBA));
        assert!(cursor.is_empty());
        assert_eq!(cursor.offset(), 9);
    }

    #[test]
    fn read_negative_i32() {
        let mut cursor = Cursor::new(&[0xff, 0xff, 0xff, 0xff]);
        assert_eq!(cursor.read_i32(), Ok(-1));
    }

    #[test]
    fn read_past_end_consumes_nothing() {
        let mut cursor = Cursor::new(&[1, 2, 3]);
        assert_eq!(
            cursor.read_i32(),
            Err(DecodeError::new(
                0,
                DecodeErrorKind::UnexpectedEnd {
                    needed: 4,
                    remaining: 3
                }
            ))
        );
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.read_bytes(3), Ok(&[1, 2, 3][..]));
    }

    #[test]
    fn read_string() {
        let mut cursor = Cursor::new(b"\x05\x00\x00\x00hello\x00\x00\x00\x00");
        assert_eq!(cursor.read_string().as_deref(), Ok("hello"));
        assert_eq!(cursor.read_string().as_deref(), Ok(""));
        assert!(cursor.is_empty());
    }

    #[test]
    fn read_string_invalid_utf8_is_replaced() {
        let mut cursor = Cursor::new(b"\x02\x00\x00\x00a\xff");
        assert_eq!(cursor.read_string().as_deref(), Ok("a\u{FFFD}"));
    }

    #[test]
    fn read_string_negative_length() {
        let mut cursor = Cursor::new(b"....\xfe\xff\xff\xff");
        cursor.read_bytes(4).unwrap();
        assert_eq!(
            cursor.read_string(),
            Err(DecodeError::new(
                4,
                DecodeErrorKind::NegativeLength {
                    what: "string",
                    length: -2
                }
            ))
        );
    }

    #[test]
    fn read_list() {
        let mut cursor = Cursor::new(b"\x02\x00\x00\x00\x07\x00\x00\x00\x09\x00\x00\x00");
        assert_eq!(cursor.read_list("test", Cursor::read_i32), Ok(vec![7, 9]));
    }

    /// A huge count must fail on missing data rather than on allocation.
    #[test]
    fn read_list_count_exceeds_data() {
        let mut cursor = Cursor::new(b"\xff\xff\xff\x7f\x01\x00\x00\x00");
        assert_eq!(
            cursor.read_list("test", Cursor::read_i32),
            Err(DecodeError::new(
                8,
                DecodeErrorKind::UnexpectedEnd {
                    needed: 4,
                    remaining: 0
                }
            ))
        );
    }

    #[test]
    fn split_off_is_bounded() {
        let mut cursor = Cursor::new(&[1, 0, 0, 0, 2, 0, 0, 0]);
        let mut region = cursor.split_off(2).unwrap();
        assert_eq!(region.offset(), 0);
        assert_eq!(cursor.offset(), 2);
        assert_eq!(
            region.read_i32(),
            Err(DecodeError::new(
                0,
                DecodeErrorKind::UnexpectedEnd {
                    needed: 4,
                    remaining: 2
                }
            ))
        );
        assert_eq!(region.skip_rest(), 2);
        assert_eq!(region.offset(), 2);
    }
}
