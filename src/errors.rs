//! # Mavframe errors
//!
//! Malformed wire input is never an error: the frame scanner resolves bad
//! candidates by resynchronizing one byte forward, and its caller only ever
//! observes "no frame found yet" versus "frame found". The errors defined
//! here cover caller-misuse conditions on the write path, which fail loudly
//! at call time and never produce a partial write.

use crate::consts::MAX_PAYLOAD_LEN;

/// Common result type returned by fallible `mavframe` operations.
pub type Result<T> = core::result::Result<T, Error>;

/// All `mavframe` errors.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// Frame encoding error.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Errors returned by the frame writer.
///
/// Every variant is an argument error on the caller's side. The writer
/// validates all arguments before touching the destination buffer, so a
/// failed call leaves the destination untouched.
#[derive(Clone, Debug, thiserror::Error)]
pub enum FrameError {
    /// Payload does not fit the single-frame limit of [`MAX_PAYLOAD_LEN`] bytes.
    #[error("payload length {0} exceeds {MAX_PAYLOAD_LEN} bytes")]
    PayloadTooLong(usize),

    /// Message `ID` does not fit the target protocol version.
    #[error("message ID {message_id} out of range: maximum is {max}")]
    MessageIdOutOfRange {
        /// Requested message `ID`.
        message_id: u32,
        /// Maximum message `ID` of the target protocol version.
        max: u32,
    },

    /// Destination buffer is shorter than the computed frame length.
    #[error("destination buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall {
        /// Total frame length in bytes.
        required: usize,
        /// Bytes available past the destination offset.
        available: usize,
    },

    /// The signed incompatibility flag was requested without a secret key.
    ///
    /// A signature trailer holds a truncated MAC that only a key can produce;
    /// claiming the flag without one is a programming error.
    #[error("signed incompatibility flag set without a secret key")]
    SignedWithoutKey,

    /// Declared minimum payload length exceeds the payload itself.
    #[error("minimum payload length {min} exceeds payload length {len}")]
    MinPayloadLength {
        /// Declared minimum (`MAVLink 1`) payload length.
        min: usize,
        /// Actual payload length.
        len: usize,
    },
}
