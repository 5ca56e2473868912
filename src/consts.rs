//! # Common constants

/// `MAVLink 1` packet start marker.
pub const MAGIC_V1: u8 = 0xFE;
/// `MAVLink 2` packet start marker.
pub const MAGIC_V2: u8 = 0xFD;

/// `MAVLink 1` header length in bytes.
pub const HEADER_LEN_V1: usize = 6;
/// `MAVLink 2` header length in bytes.
pub const HEADER_LEN_V2: usize = 10;

/// Frame checksum length in bytes.
pub const CHECKSUM_LEN: usize = 2;

/// `MAVLink 2` signature length in bytes: link `ID`, timestamp, and truncated hash.
pub const SIGNATURE_LEN: usize = 13;
/// Signature timestamp length in bytes.
pub const SIGNATURE_TIMESTAMP_LEN: usize = 6;
/// Signature truncated hash length in bytes.
pub const SIGNATURE_VALUE_LEN: usize = 6;
/// Mask of the 48-bit signature timestamp.
pub const SIGNATURE_TIMESTAMP_MASK: u64 = 0xFFFF_FFFF_FFFF;
/// Start of the MAVLink signing epoch (January 1st, 2015 GMT) as a Unix timestamp in seconds.
pub const SIGNATURE_EPOCH_UNIX_SECS: u64 = 1_420_070_400;

/// Incompatibility flag bit marking a signed `MAVLink 2` frame.
pub const INCOMPAT_FLAG_SIGNED: u8 = 0x01;

/// Maximum payload length for both protocol versions.
pub const MAX_PAYLOAD_LEN: usize = 255;
/// Maximum message `ID` of a `MAVLink 1` frame.
pub const MAX_MESSAGE_ID_V1: u32 = 0xFF;
/// Maximum message `ID` of a `MAVLink 2` frame.
pub const MAX_MESSAGE_ID_V2: u32 = 0x00FF_FFFF;

/// Maximum possible length of a `MAVLink 2` frame: header, payload, checksum, and signature.
pub const MAX_FRAME_LEN_V2: usize = HEADER_LEN_V2 + MAX_PAYLOAD_LEN + CHECKSUM_LEN + SIGNATURE_LEN;

/// Initial capacity of a stream accumulation buffer.
pub const DEFAULT_STREAM_BUFFER_CAPACITY: usize = 8192;
/// Unconsumed bytes after which a stream reassembler forces resynchronization.
pub const STREAM_RESYNC_THRESHOLD: usize = MAX_FRAME_LEN_V2 * 2;

/// Default capacity of the anti-replay timestamp map.
pub const DEFAULT_REPLAY_MAP_CAPACITY: usize = 64;
/// Default load factor of the anti-replay timestamp map.
pub const DEFAULT_REPLAY_MAP_LOAD_FACTOR: f32 = 0.75;
/// Default backward tolerance of the anti-replay window, in raw timestamp units of 10 µs.
pub const DEFAULT_REPLAY_WINDOW: u64 = 6_000_000;
