//! MAVLink frame scanner.
//!
//! The scanner walks a byte buffer looking for frame start markers, builds
//! [`Frame`] views over complete candidates, and applies a configurable
//! strictness policy. A rejected candidate advances the scan by exactly one
//! byte, which guarantees forward progress and eventual resynchronization on
//! arbitrary input.

use crate::consts::{
    CHECKSUM_LEN, DEFAULT_REPLAY_MAP_CAPACITY, DEFAULT_REPLAY_MAP_LOAD_FACTOR, HEADER_LEN_V1,
    HEADER_LEN_V2, INCOMPAT_FLAG_SIGNED, MAGIC_V1, MAGIC_V2, SIGNATURE_LEN,
};
use crate::protocol::dialect::Dialect;
use crate::protocol::frame::{Frame, MavlinkVersion};
use crate::protocol::signature::SecretKey;
use crate::utils::IntMap;

/// Frame scanner configuration.
///
/// A plain immutable value, built once per [`Parser`] instance.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserOptions {
    /// Check candidates against schema lengths, CRC, and the signing policy.
    ///
    /// When disabled, any structurally complete frame is accepted without
    /// validation. This lenient mode exists for diagnostic tools that must
    /// show malformed traffic and has to be chosen explicitly.
    pub strict: bool,
    /// Accept messages the dialect has no metadata for.
    ///
    /// Length and CRC checks are skipped for such messages, since both
    /// require metadata.
    pub allow_unknown: bool,
    /// Validate signatures of signed frames; reject when validation fails or
    /// no key is configured.
    pub require_signature: bool,
    /// Reject unsigned `MAVLink 2` frames.
    pub require_signed: bool,
    /// Secret key for signature validation.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub secret_key: Option<SecretKey>,
    /// Backward tolerance of the anti-replay window, in raw timestamp units
    /// of 10 µs. `None` disables replay tracking.
    pub replay_window: Option<u64>,
    /// Initial capacity of the replay timestamp map.
    pub replay_map_capacity: usize,
    /// Load factor of the replay timestamp map.
    pub replay_map_load_factor: f32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict: true,
            allow_unknown: false,
            require_signature: false,
            require_signed: false,
            secret_key: None,
            replay_window: None,
            replay_map_capacity: DEFAULT_REPLAY_MAP_CAPACITY,
            replay_map_load_factor: DEFAULT_REPLAY_MAP_LOAD_FACTOR,
        }
    }
}

/// A complete, structurally valid frame located by [`Parser::next`].
///
/// The byte span `[start_offset, start_offset + length)` holds the whole
/// frame. The view borrows the scanned buffer; copy out any bytes that must
/// be retained beyond the next scan call, because the buffer may be reused
/// or overwritten.
#[derive(Clone, Copy, Debug)]
pub struct ParseResult<'a> {
    /// View over the accepted frame.
    pub frame: Frame<'a>,
    /// Total frame length in bytes.
    pub length: usize,
    /// Offset of the start marker within the scanned buffer.
    pub start_offset: usize,
}

/// MAVLink frame scanner.
///
/// Holds the per-instance anti-replay state, so a parser is not safe for
/// concurrent use without external synchronization. The intended usage is one
/// parser per transport connection, driven by the single task that owns that
/// connection's reads. The replay map keeps one entry per
/// (system, component, link) triple ever observed and never evicts; unbounded
/// growth over a parser's lifetime is an accepted operational trade-off.
#[derive(Clone, Debug)]
pub struct Parser {
    options: ParserOptions,
    replay: IntMap,
}

impl Parser {
    /// Creates a parser from an options value.
    ///
    /// # Panics
    ///
    /// Panics if [`ParserOptions::replay_map_load_factor`] is outside `(0, 1)`.
    pub fn new(options: ParserOptions) -> Self {
        let replay = IntMap::new(options.replay_map_capacity, options.replay_map_load_factor);
        Self { options, replay }
    }

    /// Configuration this parser was built with.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Scans `buf` from `start_offset` for the next acceptable frame.
    ///
    /// Returns `None` when no complete frame is present yet: nothing is
    /// consumed logically, and the caller retries from the same offset once
    /// more data arrives. Candidates that fail validation are skipped by
    /// advancing one byte and rescanning.
    pub fn next<'a>(
        &mut self,
        buf: &'a [u8],
        start_offset: usize,
        dialect: &dyn Dialect,
    ) -> Option<ParseResult<'a>> {
        let mut cursor = start_offset;

        while cursor < buf.len() {
            let magic = buf[cursor];
            if magic != MAGIC_V1 && magic != MAGIC_V2 {
                cursor += 1;
                continue;
            }

            let header_len = if magic == MAGIC_V2 {
                HEADER_LEN_V2
            } else {
                HEADER_LEN_V1
            };
            if cursor + header_len > buf.len() {
                return None;
            }

            let payload_len = buf[cursor + 1] as usize;
            let signature_len =
                if magic == MAGIC_V2 && buf[cursor + 2] & INCOMPAT_FLAG_SIGNED != 0 {
                    SIGNATURE_LEN
                } else {
                    0
                };
            let total_len = header_len + payload_len + CHECKSUM_LEN + signature_len;
            if cursor + total_len > buf.len() {
                return None;
            }

            // Bounds are established, so the wrap cannot fail.
            if let Some(frame) = Frame::wrap(buf, cursor) {
                if !self.options.strict || self.accept(&frame, dialect) {
                    return Some(ParseResult {
                        frame,
                        length: total_len,
                        start_offset: cursor,
                    });
                }
            }

            cursor += 1;
        }

        None
    }

    /// Returns an iterator draining every complete frame from `buf`.
    ///
    /// Suited to datagram transports, where each read is a self-contained
    /// buffer that either holds whole frames or nothing recoverable.
    pub fn iter<'a, 'p>(
        &'p mut self,
        buf: &'a [u8],
        dialect: &'p dyn Dialect,
    ) -> FrameIter<'a, 'p> {
        FrameIter {
            parser: self,
            buf,
            dialect,
            cursor: 0,
        }
    }

    /// Applies the strict-mode policy to a structurally complete candidate.
    fn accept(&mut self, frame: &Frame<'_>, dialect: &dyn Dialect) -> bool {
        if frame.incompat_flags() & !INCOMPAT_FLAG_SIGNED != 0 {
            log::trace!(
                "rejecting candidate at {}: unknown incompatibility flags {:#04x}",
                frame.start_offset(),
                frame.incompat_flags()
            );
            return false;
        }

        if self.options.require_signed
            && frame.version() == MavlinkVersion::V2
            && !frame.is_signed()
        {
            log::trace!(
                "rejecting candidate at {}: unsigned MAVLink 2 frame",
                frame.start_offset()
            );
            return false;
        }

        if frame.is_signed() && self.options.require_signature {
            let valid = match &self.options.secret_key {
                Some(key) => frame.validate_signature(key),
                None => false,
            };
            if !valid {
                log::trace!(
                    "rejecting candidate at {}: signature validation failed",
                    frame.start_offset()
                );
                return false;
            }
        }

        if frame.is_signed() {
            if let Some(window) = self.options.replay_window {
                if !self.check_replay(frame, window) {
                    return false;
                }
            }
        }

        match dialect.resolve(frame.message_id()) {
            None => {
                if !self.options.allow_unknown {
                    log::trace!(
                        "rejecting candidate at {}: unknown message ID {}",
                        frame.start_offset(),
                        frame.message_id()
                    );
                    return false;
                }
            }
            Some(meta) => {
                let payload_len = frame.payload_length();
                let length_ok = match frame.version() {
                    MavlinkVersion::V1 => payload_len == meta.length_v1 as usize,
                    MavlinkVersion::V2 => {
                        payload_len >= meta.length_v1 as usize
                            && payload_len <= meta.length_v2 as usize
                    }
                };
                if !length_ok {
                    log::trace!(
                        "rejecting candidate at {}: payload length {} outside schema range",
                        frame.start_offset(),
                        payload_len
                    );
                    return false;
                }
                if !frame.validate_crc(meta.crc_extra) {
                    log::trace!(
                        "rejecting candidate at {}: CRC mismatch",
                        frame.start_offset()
                    );
                    return false;
                }
            }
        }

        true
    }

    /// Anti-replay window check for a signed frame.
    ///
    /// Timestamps move monotonically forward per (system, component, link)
    /// triple with a bounded backward tolerance, so minor clock jitter and
    /// out-of-order delivery pass while replays of stale captured traffic are
    /// rejected.
    fn check_replay(&mut self, frame: &Frame<'_>, window: u64) -> bool {
        let (link_id, timestamp) = match (frame.link_id(), frame.timestamp()) {
            (Some(link_id), Some(timestamp)) => (link_id, timestamp.as_raw()),
            _ => return false,
        };

        let key = (u32::from(frame.system_id()) << 16)
            | (u32::from(frame.component_id()) << 8)
            | u32::from(link_id);

        let last = self.replay.get_or_default(key, 0);
        if timestamp.saturating_add(window) < last {
            log::trace!(
                "rejecting candidate at {}: replayed timestamp {} behind {}",
                frame.start_offset(),
                timestamp,
                last
            );
            return false;
        }
        if timestamp > last {
            self.replay.put(key, timestamp);
        }
        true
    }
}

/// Iterator over the complete frames of a single buffer.
///
/// Created by [`Parser::iter`].
pub struct FrameIter<'a, 'p> {
    parser: &'p mut Parser,
    buf: &'a [u8],
    dialect: &'p dyn Dialect,
    cursor: usize,
}

impl<'a> Iterator for FrameIter<'a, '_> {
    type Item = ParseResult<'a>;

    fn next(&mut self) -> Option<ParseResult<'a>> {
        let result = self.parser.next(self.buf, self.cursor, self.dialect)?;
        self.cursor = result.start_offset + result.length;
        Some(result)
    }
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////
