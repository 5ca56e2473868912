//! MAVLink frame writer.
//!
//! Mirror image of the frame view: serializes a header, payload, checksum,
//! and optional signature trailer into a caller-owned buffer. All argument
//! validation happens before the first destination byte is touched, so a
//! failed call never leaves a partial frame behind.

use crate::consts::{
    CHECKSUM_LEN, HEADER_LEN_V1, HEADER_LEN_V2, INCOMPAT_FLAG_SIGNED, MAGIC_V1, MAGIC_V2,
    MAX_MESSAGE_ID_V1, MAX_MESSAGE_ID_V2, MAX_PAYLOAD_LEN, SIGNATURE_LEN,
    SIGNATURE_TIMESTAMP_LEN,
};
use crate::errors::{FrameError, Result};
use crate::protocol::crc::x25_checksum;
use crate::protocol::signature::{compute_signature, SigningConf};

/// Header fields of an outgoing `MAVLink 2` frame.
///
/// The signed incompatibility flag is managed by the writer: it is forced on
/// when a [`SigningConf`] is supplied and must not be claimed without one.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderV2 {
    /// Packet sequence number.
    pub sequence: u8,
    /// System `ID`.
    pub system_id: u8,
    /// Component `ID`.
    pub component_id: u8,
    /// Message `ID`, at most [`MAX_MESSAGE_ID_V2`].
    pub message_id: u32,
    /// Incompatibility flags a receiver must understand.
    pub incompat_flags: u8,
    /// Compatibility flags a receiver may ignore.
    pub compat_flags: u8,
}

/// Writes a `MAVLink 1` frame into `out` at `offset`, copying `payload` in.
///
/// Returns the total number of bytes written.
#[allow(clippy::too_many_arguments)]
pub fn write_v1(
    out: &mut [u8],
    offset: usize,
    sequence: u8,
    system_id: u8,
    component_id: u8,
    message_id: u32,
    crc_extra: u8,
    payload: &[u8],
) -> Result<usize> {
    check_payload_len(payload.len())?;
    check_message_id(message_id, MAX_MESSAGE_ID_V1)?;
    ensure_capacity(out, offset, HEADER_LEN_V1 + payload.len() + CHECKSUM_LEN)?;

    out[offset + HEADER_LEN_V1..][..payload.len()].copy_from_slice(payload);
    write_v1_in_place(
        out,
        offset,
        sequence,
        system_id,
        component_id,
        message_id,
        crc_extra,
        payload.len(),
    )
}

/// Writes a `MAVLink 1` frame around a payload already resident in `out`.
///
/// The payload is expected at `out[offset + 6..]`; only the header and
/// checksum are written. Returns the total frame length.
#[allow(clippy::too_many_arguments)]
pub fn write_v1_in_place(
    out: &mut [u8],
    offset: usize,
    sequence: u8,
    system_id: u8,
    component_id: u8,
    message_id: u32,
    crc_extra: u8,
    payload_length: usize,
) -> Result<usize> {
    check_payload_len(payload_length)?;
    check_message_id(message_id, MAX_MESSAGE_ID_V1)?;

    let total_len = HEADER_LEN_V1 + payload_length + CHECKSUM_LEN;
    ensure_capacity(out, offset, total_len)?;

    out[offset] = MAGIC_V1;
    out[offset + 1] = payload_length as u8;
    out[offset + 2] = sequence;
    out[offset + 3] = system_id;
    out[offset + 4] = component_id;
    out[offset + 5] = message_id as u8;

    let crc = x25_checksum(
        &out[offset + 1..offset + HEADER_LEN_V1 + payload_length],
        crc_extra,
    );
    out[offset + HEADER_LEN_V1 + payload_length..][..CHECKSUM_LEN]
        .copy_from_slice(&crc.to_le_bytes());

    Ok(total_len)
}

/// Writes a `MAVLink 2` frame into `out` at `offset`, copying `payload` in.
///
/// When `trim_extensions` is set, trailing zero bytes are dropped from the
/// payload before it is copied, but never below `min_payload_length` (the
/// message's fixed `MAVLink 1` length). Supplying a [`SigningConf`] appends a
/// signature trailer and forces the signed incompatibility flag on; claiming
/// that flag without a key is rejected. Returns the total number of bytes
/// written.
#[allow(clippy::too_many_arguments)]
pub fn write_v2(
    out: &mut [u8],
    offset: usize,
    header: &HeaderV2,
    crc_extra: u8,
    payload: &[u8],
    min_payload_length: usize,
    trim_extensions: bool,
    signing: Option<&SigningConf>,
) -> Result<usize> {
    check_payload_len(payload.len())?;
    check_message_id(header.message_id, MAX_MESSAGE_ID_V2)?;
    check_min_payload_len(min_payload_length, payload.len())?;
    check_signed_flag(header, signing)?;

    let effective_len = if trim_extensions {
        trim_trailing_zeros(payload).max(min_payload_length)
    } else {
        payload.len()
    };
    let signature_len = if signing.is_some() { SIGNATURE_LEN } else { 0 };
    ensure_capacity(
        out,
        offset,
        HEADER_LEN_V2 + effective_len + CHECKSUM_LEN + signature_len,
    )?;

    out[offset + HEADER_LEN_V2..][..effective_len].copy_from_slice(&payload[..effective_len]);
    write_v2_in_place(
        out,
        offset,
        header,
        crc_extra,
        effective_len,
        effective_len,
        false,
        signing,
    )
}

/// Writes a `MAVLink 2` frame around a payload already resident in `out`.
///
/// The payload is expected at `out[offset + 10..]`. Extension trimming, when
/// requested, inspects the resident payload bytes. Returns the total frame
/// length, which shrinks along with the trimmed payload.
#[allow(clippy::too_many_arguments)]
pub fn write_v2_in_place(
    out: &mut [u8],
    offset: usize,
    header: &HeaderV2,
    crc_extra: u8,
    payload_length: usize,
    min_payload_length: usize,
    trim_extensions: bool,
    signing: Option<&SigningConf>,
) -> Result<usize> {
    check_payload_len(payload_length)?;
    check_message_id(header.message_id, MAX_MESSAGE_ID_V2)?;
    check_min_payload_len(min_payload_length, payload_length)?;
    check_signed_flag(header, signing)?;

    let mut effective_len = payload_length;
    if trim_extensions {
        ensure_capacity(out, offset, HEADER_LEN_V2 + payload_length)?;
        let payload_offset = offset + HEADER_LEN_V2;
        effective_len = trim_trailing_zeros(&out[payload_offset..payload_offset + payload_length])
            .max(min_payload_length);
    }

    let signature_len = if signing.is_some() { SIGNATURE_LEN } else { 0 };
    let total_len = HEADER_LEN_V2 + effective_len + CHECKSUM_LEN + signature_len;
    ensure_capacity(out, offset, total_len)?;

    let incompat_flags = if signing.is_some() {
        header.incompat_flags | INCOMPAT_FLAG_SIGNED
    } else {
        header.incompat_flags
    };

    out[offset] = MAGIC_V2;
    out[offset + 1] = effective_len as u8;
    out[offset + 2] = incompat_flags;
    out[offset + 3] = header.compat_flags;
    out[offset + 4] = header.sequence;
    out[offset + 5] = header.system_id;
    out[offset + 6] = header.component_id;
    out[offset + 7..offset + HEADER_LEN_V2].copy_from_slice(&header.message_id.to_le_bytes()[..3]);

    let crc = x25_checksum(
        &out[offset + 1..offset + HEADER_LEN_V2 + effective_len],
        crc_extra,
    );
    out[offset + HEADER_LEN_V2 + effective_len..][..CHECKSUM_LEN]
        .copy_from_slice(&crc.to_le_bytes());

    if let Some(conf) = signing {
        let signed_len = HEADER_LEN_V2 + effective_len + CHECKSUM_LEN;
        write_signature(out, offset, signed_len, conf);
    }

    Ok(total_len)
}

/// Writes the 13-byte signature trailer after the checksum.
fn write_signature(out: &mut [u8], frame_offset: usize, signed_len: usize, conf: &SigningConf) {
    let sig_offset = frame_offset + signed_len;

    out[sig_offset] = conf.link_id;
    out[sig_offset + 1..][..SIGNATURE_TIMESTAMP_LEN]
        .copy_from_slice(&conf.timestamp.as_raw().to_le_bytes()[..SIGNATURE_TIMESTAMP_LEN]);

    let mac = compute_signature(
        &conf.key,
        &out[frame_offset..frame_offset + signed_len],
        conf.link_id,
        conf.timestamp,
    );
    out[sig_offset + 1 + SIGNATURE_TIMESTAMP_LEN..][..mac.len()].copy_from_slice(&mac);
}

/// Effective length of `payload` with trailing zero bytes dropped.
fn trim_trailing_zeros(payload: &[u8]) -> usize {
    payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1)
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLong(len).into());
    }
    Ok(())
}

fn check_message_id(message_id: u32, max: u32) -> Result<()> {
    if message_id > max {
        return Err(FrameError::MessageIdOutOfRange { message_id, max }.into());
    }
    Ok(())
}

fn check_min_payload_len(min: usize, len: usize) -> Result<()> {
    if min > len {
        return Err(FrameError::MinPayloadLength { min, len }.into());
    }
    Ok(())
}

fn check_signed_flag(header: &HeaderV2, signing: Option<&SigningConf>) -> Result<()> {
    if signing.is_none() && header.incompat_flags & INCOMPAT_FLAG_SIGNED != 0 {
        return Err(FrameError::SignedWithoutKey.into());
    }
    Ok(())
}

fn ensure_capacity(out: &[u8], offset: usize, required: usize) -> Result<()> {
    let available = out.len().saturating_sub(offset);
    if available < required {
        return Err(FrameError::BufferTooSmall {
            required,
            available,
        }
        .into());
    }
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////
