//! # Basic imports

pub use crate::errors::{Error, FrameError, Result};
pub use crate::io::StreamReassembler;
pub use crate::protocol::{
    Dialect, Frame, MavTimestamp, MavlinkVersion, MessageMeta, ParseResult, Parser, ParserOptions,
    SecretKey, SigningConf,
};
