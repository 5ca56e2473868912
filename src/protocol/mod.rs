//! # MAVLink protocol engine
//!
//! Frame layout interpretation, packing, checksum, signing, and scanning.

pub mod crc;
pub mod dialect;
pub mod frame;
pub mod parser;
pub mod payload;
pub mod signature;
pub mod writer;

pub use crc::x25_checksum;
pub use dialect::{Dialect, MessageMeta};
pub use frame::{Frame, MavlinkVersion};
pub use parser::{FrameIter, ParseResult, Parser, ParserOptions};
pub use payload::{PayloadBuilder, PayloadReader};
pub use signature::{MavTimestamp, SecretKey, SigningConf, SECRET_KEY_LENGTH};
pub use writer::{write_v1, write_v1_in_place, write_v2, write_v2_in_place, HeaderV2};
