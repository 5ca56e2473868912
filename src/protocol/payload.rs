//! Payload field access.
//!
//! MAVLink payloads are little-endian structures with fixed field offsets
//! taken from generated message metadata. `MAVLink 2` senders may drop
//! trailing zero extension bytes from the wire, so the reader zero-extends
//! past the received length instead of failing.

/// Writes little-endian fields at fixed offsets into a payload slice.
///
/// Calls chain, mirroring the order fields appear in a message definition:
///
/// ```rust
/// use mavframe::protocol::PayloadBuilder;
///
/// let mut payload = [0u8; 9];
/// PayloadBuilder::wrap(&mut payload)
///     .put_u32(0, 81_000)
///     .put_u8(4, 2)
///     .put_u8(5, 3);
/// ```
///
/// Field offsets come from message metadata; writing past the slice is a
/// programming error and panics.
pub struct PayloadBuilder<'a> {
    buf: &'a mut [u8],
}

impl<'a> PayloadBuilder<'a> {
    /// Wraps a mutable payload slice.
    pub fn wrap(buf: &'a mut [u8]) -> Self {
        Self { buf }
    }

    /// Writes an unsigned 8-bit field.
    pub fn put_u8(&mut self, offset: usize, value: u8) -> &mut Self {
        self.buf[offset] = value;
        self
    }

    /// Writes a signed 8-bit field.
    pub fn put_i8(&mut self, offset: usize, value: i8) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes an unsigned 16-bit field.
    pub fn put_u16(&mut self, offset: usize, value: u16) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes a signed 16-bit field.
    pub fn put_i16(&mut self, offset: usize, value: i16) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes an unsigned 32-bit field.
    pub fn put_u32(&mut self, offset: usize, value: u32) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes a signed 32-bit field.
    pub fn put_i32(&mut self, offset: usize, value: i32) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes an unsigned 64-bit field.
    pub fn put_u64(&mut self, offset: usize, value: u64) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes a signed 64-bit field.
    pub fn put_i64(&mut self, offset: usize, value: i64) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes a 32-bit float field.
    pub fn put_f32(&mut self, offset: usize, value: f32) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes a 64-bit float field.
    pub fn put_f64(&mut self, offset: usize, value: f64) -> &mut Self {
        self.put_le(offset, value.to_le_bytes())
    }

    /// Writes raw bytes, typically a char or byte array field.
    pub fn put_bytes(&mut self, offset: usize, values: &[u8]) -> &mut Self {
        self.buf[offset..offset + values.len()].copy_from_slice(values);
        self
    }

    fn put_le<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) -> &mut Self {
        self.buf[offset..offset + N].copy_from_slice(&bytes);
        self
    }
}

/// Reads little-endian fields from a received payload, zero-extending past
/// its end.
///
/// A `MAVLink 2` payload on the wire may be shorter than the message's
/// defined length when the sender trimmed trailing zero extension bytes;
/// reads past the received length therefore yield zeros rather than errors.
#[derive(Clone, Copy, Debug)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    /// Wraps a received payload slice.
    pub fn wrap(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Reads an unsigned 8-bit field.
    pub fn get_u8(&self, offset: usize) -> u8 {
        self.byte_at(offset)
    }

    /// Reads a signed 8-bit field.
    pub fn get_i8(&self, offset: usize) -> i8 {
        self.byte_at(offset) as i8
    }

    /// Reads an unsigned 16-bit field.
    pub fn get_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads a signed 16-bit field.
    pub fn get_i16(&self, offset: usize) -> i16 {
        i16::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads an unsigned 32-bit field.
    pub fn get_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads a signed 32-bit field.
    pub fn get_i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads an unsigned 64-bit field.
    pub fn get_u64(&self, offset: usize) -> u64 {
        u64::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads a signed 64-bit field.
    pub fn get_i64(&self, offset: usize) -> i64 {
        i64::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads a 32-bit float field.
    pub fn get_f32(&self, offset: usize) -> f32 {
        f32::from_le_bytes(self.le_bytes(offset))
    }

    /// Reads a 64-bit float field.
    pub fn get_f64(&self, offset: usize) -> f64 {
        f64::from_le_bytes(self.le_bytes(offset))
    }

    /// Fills `out` with raw bytes starting at `offset`, zero-extending.
    pub fn get_bytes(&self, offset: usize, out: &mut [u8]) {
        for (index, byte) in out.iter_mut().enumerate() {
            *byte = self.byte_at(offset + index);
        }
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> u8 {
        self.buf.get(offset).copied().unwrap_or(0)
    }

    fn le_bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut bytes = [0u8; N];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = self.byte_at(offset + index);
        }
        bytes
    }
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_round_trip() {
        let mut payload = [0u8; 32];
        PayloadBuilder::wrap(&mut payload)
            .put_u32(0, 0xDEAD_BEEF)
            .put_i16(4, -2)
            .put_u8(6, 0x7F)
            .put_f32(7, 1.5)
            .put_u64(11, u64::MAX - 1)
            .put_bytes(19, b"GCS");

        let reader = PayloadReader::wrap(&payload);
        assert_eq!(reader.get_u32(0), 0xDEAD_BEEF);
        assert_eq!(reader.get_i16(4), -2);
        assert_eq!(reader.get_u8(6), 0x7F);
        assert_eq!(reader.get_f32(7), 1.5);
        assert_eq!(reader.get_u64(11), u64::MAX - 1);

        let mut name = [0u8; 3];
        reader.get_bytes(19, &mut name);
        assert_eq!(&name, b"GCS");
    }

    #[test]
    fn fields_are_little_endian() {
        let mut payload = [0u8; 4];
        PayloadBuilder::wrap(&mut payload).put_u32(0, 0x0403_0201);
        assert_eq!(payload, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn reader_zero_extends_past_received_length() {
        // A 9-byte message received with its two zero extension bytes trimmed.
        let received = [0x10u8, 0x32, 0x54, 0x76, 0x05, 0x06, 0x07];
        let reader = PayloadReader::wrap(&received);

        assert_eq!(reader.get_u8(7), 0);
        assert_eq!(reader.get_u8(8), 0);
        // A field straddling the received end reads the tail as zeros.
        assert_eq!(reader.get_u32(5), 0x0000_0706);

        let mut tail = [0xFFu8; 4];
        reader.get_bytes(6, &mut tail);
        assert_eq!(tail, [0x07, 0, 0, 0]);
    }
}
