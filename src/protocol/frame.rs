//! MAVLink frame view.

use crate::consts::{
    CHECKSUM_LEN, HEADER_LEN_V1, HEADER_LEN_V2, INCOMPAT_FLAG_SIGNED, MAGIC_V1, MAGIC_V2,
    SIGNATURE_LEN, SIGNATURE_TIMESTAMP_LEN, SIGNATURE_VALUE_LEN,
};
use crate::protocol::crc::x25_checksum;
use crate::protocol::signature::{compute_signature, MavTimestamp, SecretKey};

/// MAVLink protocol version of a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MavlinkVersion {
    /// `MAVLink 1`, start marker [`MAGIC_V1`].
    V1,
    /// `MAVLink 2`, start marker [`MAGIC_V2`].
    V2,
}

/// Borrowed view over one MAVLink frame inside a caller-owned buffer.
///
/// A frame never owns its bytes: every field is a computed offset into the
/// underlying buffer, interpreted little-endian. The borrow ties the view to
/// the buffer for its whole lifetime, so it cannot be retained past a buffer
/// reuse; copy out any bytes that must live longer.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    buf: &'a [u8],
    start: usize,
    v2: bool,
}

impl<'a> Frame<'a> {
    /// Interprets `buf[start..]` as a frame.
    ///
    /// Returns `None` when the first byte is not a start marker or the buffer
    /// ends before the declared frame does. No CRC or signature checks are
    /// performed here; see [`Frame::validate_crc`] and
    /// [`Frame::validate_signature`].
    pub fn wrap(buf: &'a [u8], start: usize) -> Option<Self> {
        let v2 = match *buf.get(start)? {
            MAGIC_V2 => true,
            MAGIC_V1 => false,
            _ => return None,
        };

        let header_len = if v2 { HEADER_LEN_V2 } else { HEADER_LEN_V1 };
        if start + header_len > buf.len() {
            return None;
        }

        let frame = Self { buf, start, v2 };
        if start + frame.total_len() > buf.len() {
            return None;
        }
        Some(frame)
    }

    /// Protocol version derived from the start marker.
    #[inline]
    pub fn version(&self) -> MavlinkVersion {
        if self.v2 {
            MavlinkVersion::V2
        } else {
            MavlinkVersion::V1
        }
    }

    /// Offset of the start marker within the underlying buffer.
    #[inline]
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// Header length: 6 bytes for `MAVLink 1`, 10 for `MAVLink 2`.
    #[inline]
    pub fn header_len(&self) -> usize {
        if self.v2 {
            HEADER_LEN_V2
        } else {
            HEADER_LEN_V1
        }
    }

    /// Declared payload length.
    #[inline]
    pub fn payload_length(&self) -> usize {
        self.buf[self.start + 1] as usize
    }

    /// Incompatibility flags. Always `0` for `MAVLink 1` frames.
    #[inline]
    pub fn incompat_flags(&self) -> u8 {
        if self.v2 {
            self.buf[self.start + 2]
        } else {
            0
        }
    }

    /// Compatibility flags. Always `0` for `MAVLink 1` frames.
    #[inline]
    pub fn compat_flags(&self) -> u8 {
        if self.v2 {
            self.buf[self.start + 3]
        } else {
            0
        }
    }

    /// Packet sequence number.
    #[inline]
    pub fn sequence(&self) -> u8 {
        self.buf[self.start + if self.v2 { 4 } else { 2 }]
    }

    /// System `ID`.
    #[inline]
    pub fn system_id(&self) -> u8 {
        self.buf[self.start + if self.v2 { 5 } else { 3 }]
    }

    /// Component `ID`.
    #[inline]
    pub fn component_id(&self) -> u8 {
        self.buf[self.start + if self.v2 { 6 } else { 4 }]
    }

    /// Message `ID`: one byte for `MAVLink 1`, a little-endian 24-bit value
    /// for `MAVLink 2`.
    pub fn message_id(&self) -> u32 {
        if self.v2 {
            let b = &self.buf[self.start + 7..self.start + 10];
            u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16
        } else {
            u32::from(self.buf[self.start + 5])
        }
    }

    /// Offset of the first payload byte within the underlying buffer.
    #[inline]
    pub fn payload_offset(&self) -> usize {
        self.start + self.header_len()
    }

    /// Payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        let offset = self.payload_offset();
        &self.buf[offset..offset + self.payload_length()]
    }

    /// Checksum stored in the frame.
    pub fn checksum(&self) -> u16 {
        let offset = self.payload_offset() + self.payload_length();
        u16::from_le_bytes([self.buf[offset], self.buf[offset + 1]])
    }

    /// Returns `true` for `MAVLink 2` frames with the signed incompatibility
    /// flag set.
    #[inline]
    pub fn is_signed(&self) -> bool {
        self.v2 && self.incompat_flags() & INCOMPAT_FLAG_SIGNED != 0
    }

    /// Total frame length: header, payload, checksum, and signature trailer
    /// when present.
    pub fn total_len(&self) -> usize {
        let signature_len = if self.is_signed() { SIGNATURE_LEN } else { 0 };
        self.header_len() + self.payload_length() + CHECKSUM_LEN + signature_len
    }

    /// Signature link `ID`, or `None` for unsigned frames.
    pub fn link_id(&self) -> Option<u8> {
        if !self.is_signed() {
            return None;
        }
        Some(self.buf[self.signature_offset()])
    }

    /// Signature timestamp, or `None` for unsigned frames.
    pub fn timestamp(&self) -> Option<MavTimestamp> {
        if !self.is_signed() {
            return None;
        }
        let offset = self.signature_offset() + 1;
        let mut raw = [0u8; 8];
        raw[..SIGNATURE_TIMESTAMP_LEN]
            .copy_from_slice(&self.buf[offset..offset + SIGNATURE_TIMESTAMP_LEN]);
        Some(MavTimestamp::from_raw(u64::from_le_bytes(raw)))
    }

    /// Truncated hash stored in the signature trailer, or `None` for unsigned
    /// frames.
    pub fn signature_value(&self) -> Option<&'a [u8]> {
        if !self.is_signed() {
            return None;
        }
        let offset = self.signature_offset() + 1 + SIGNATURE_TIMESTAMP_LEN;
        Some(&self.buf[offset..offset + SIGNATURE_VALUE_LEN])
    }

    /// Recomputes the checksum over the frame and compares it to the stored
    /// value.
    ///
    /// The checksum covers everything from the byte after the start marker
    /// through the last payload byte, folded with the schema-derived
    /// `crc_extra`. A mismatch is a hard reject of the candidate, not a fatal
    /// error: the scanner treats it as "not a frame here" and retries at the
    /// next byte.
    pub fn validate_crc(&self, crc_extra: u8) -> bool {
        let crc_region = &self.buf[self.start + 1..self.payload_offset() + self.payload_length()];
        x25_checksum(crc_region, crc_extra) == self.checksum()
    }

    /// Recomputes the signature MAC with `key` and compares it to the stored
    /// truncated hash.
    ///
    /// Returns `false` for unsigned frames.
    pub fn validate_signature(&self, key: &SecretKey) -> bool {
        let (link_id, timestamp, stored) =
            match (self.link_id(), self.timestamp(), self.signature_value()) {
                (Some(link_id), Some(timestamp), Some(stored)) => (link_id, timestamp, stored),
                _ => return false,
            };

        let signed_region = &self.buf[self.start..self.signature_offset()];
        let expected = compute_signature(key, signed_region, link_id, timestamp);
        expected[..] == *stored
    }

    #[inline]
    fn signature_offset(&self) -> usize {
        self.payload_offset() + self.payload_length() + CHECKSUM_LEN
    }
}

impl std::fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("version", &self.version())
            .field("sequence", &self.sequence())
            .field("system_id", &self.system_id())
            .field("component_id", &self.component_id())
            .field("message_id", &self.message_id())
            .field("payload_length", &self.payload_length())
            .field("signed", &self.is_signed())
            .finish()
    }
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_frame() -> Vec<u8> {
        // magic, len, seq, sys, comp, msg, payload, checksum
        let mut frame = vec![MAGIC_V1, 3, 7, 1, 2, 42, 0xAA, 0xBB, 0xCC, 0, 0];
        let crc = x25_checksum(&frame[1..9], 11);
        frame[9..11].copy_from_slice(&crc.to_le_bytes());
        frame
    }

    #[test]
    fn wraps_v1_fields() {
        let bytes = v1_frame();
        let frame = Frame::wrap(&bytes, 0).expect("complete frame");

        assert_eq!(frame.version(), MavlinkVersion::V1);
        assert_eq!(frame.header_len(), HEADER_LEN_V1);
        assert_eq!(frame.payload_length(), 3);
        assert_eq!(frame.incompat_flags(), 0);
        assert_eq!(frame.compat_flags(), 0);
        assert_eq!(frame.sequence(), 7);
        assert_eq!(frame.system_id(), 1);
        assert_eq!(frame.component_id(), 2);
        assert_eq!(frame.message_id(), 42);
        assert_eq!(frame.payload(), &[0xAA, 0xBB, 0xCC]);
        assert_eq!(frame.total_len(), 11);
        assert!(!frame.is_signed());
        assert_eq!(frame.link_id(), None);
        assert_eq!(frame.timestamp(), None);
    }

    #[test]
    fn wraps_v2_fields() {
        let mut frame = vec![MAGIC_V2, 2, 0, 4, 9, 3, 8, 0x10, 0x32, 0x00, 0xDE, 0xAD, 0, 0];
        let crc = x25_checksum(&frame[1..12], 99);
        frame[12..14].copy_from_slice(&crc.to_le_bytes());

        let view = Frame::wrap(&frame, 0).expect("complete frame");
        assert_eq!(view.version(), MavlinkVersion::V2);
        assert_eq!(view.header_len(), HEADER_LEN_V2);
        assert_eq!(view.payload_length(), 2);
        assert_eq!(view.compat_flags(), 4);
        assert_eq!(view.sequence(), 9);
        assert_eq!(view.system_id(), 3);
        assert_eq!(view.component_id(), 8);
        assert_eq!(view.message_id(), 0x3210);
        assert_eq!(view.payload(), &[0xDE, 0xAD]);
        assert!(view.validate_crc(99));
    }

    #[test]
    fn crc_validates_and_rejects_corruption() {
        let bytes = v1_frame();
        let frame = Frame::wrap(&bytes, 0).unwrap();
        assert!(frame.validate_crc(11));
        assert!(!frame.validate_crc(12));

        for pos in 1..9 {
            let mut corrupted = v1_frame();
            corrupted[pos] ^= 0x04;
            let frame = Frame::wrap(&corrupted, 0).unwrap();
            assert!(!frame.validate_crc(11), "corruption at {pos} went undetected");
        }
    }

    #[test]
    fn rejects_bad_magic_and_truncation() {
        assert!(Frame::wrap(&[], 0).is_none());
        assert!(Frame::wrap(&[0x00, 0x01], 0).is_none());

        let bytes = v1_frame();
        assert!(Frame::wrap(&bytes[..bytes.len() - 1], 0).is_none());
        assert!(Frame::wrap(&bytes[..4], 0).is_none());
    }

    #[test]
    fn wraps_at_nonzero_offset() {
        let mut bytes = vec![0x11, 0x22, 0x33];
        bytes.extend_from_slice(&v1_frame());

        let frame = Frame::wrap(&bytes, 3).expect("complete frame");
        assert_eq!(frame.start_offset(), 3);
        assert_eq!(frame.message_id(), 42);
        assert!(frame.validate_crc(11));
    }

    #[test]
    fn signed_frame_requires_full_trailer() {
        // Signed empty-payload frame: header + crc + 13 trailer bytes.
        let mut frame = vec![0u8; HEADER_LEN_V2 + CHECKSUM_LEN + SIGNATURE_LEN];
        frame[0] = MAGIC_V2;
        frame[1] = 0;
        frame[2] = INCOMPAT_FLAG_SIGNED;

        assert!(Frame::wrap(&frame, 0).is_some());
        assert!(Frame::wrap(&frame[..frame.len() - 1], 0).is_none());

        let view = Frame::wrap(&frame, 0).unwrap();
        assert!(view.is_signed());
        assert_eq!(view.total_len(), frame.len());
        assert_eq!(view.link_id(), Some(0));
    }
}
