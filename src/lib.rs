//! # Mavframe
//!
//! A low-level [MAVLink](https://mavlink.io/en/) frame engine written in Rust.
//! Mavframe covers the runtime wire layer of the protocol: frame detection
//! inside a byte stream, header/payload/checksum layout for both protocol
//! versions, packet construction with trailing-extension trimming,
//! [message signing](https://mavlink.io/en/guide/message_signing.html) with
//! anti-replay tracking, and the buffering that lets the frame detector run
//! over byte-oriented transports where frame boundaries are not preserved.
//!
//! Message definitions are out of scope: the engine consumes per-message
//! metadata through the [`protocol::Dialect`] resolver and never needs to
//! know concrete message shapes. Socket handling is equally out of scope;
//! transports hand their bytes to [`io::StreamReassembler`] (streams) or
//! [`protocol::Parser::iter`] (datagrams).
//!
//! # Usage
//!
//! Pack a heartbeat-shaped frame, then find it again with a strict parser:
//!
//! ```rust
//! use mavframe::prelude::*;
//! use mavframe::protocol::{write_v2, HeaderV2};
//!
//! struct Heartbeat;
//!
//! impl Dialect for Heartbeat {
//!     fn resolve(&self, message_id: u32) -> Option<MessageMeta> {
//!         (message_id == 0).then_some(MessageMeta {
//!             crc_extra: 50,
//!             length_v1: 9,
//!             length_v2: 9,
//!         })
//!     }
//! }
//!
//! let header = HeaderV2 {
//!     sequence: 3,
//!     system_id: 1,
//!     component_id: 1,
//!     message_id: 0,
//!     ..HeaderV2::default()
//! };
//!
//! let mut buf = [0u8; 32];
//! let len = write_v2(&mut buf, 0, &header, 50, &[0u8; 9], 9, false, None).unwrap();
//!
//! let mut parser = Parser::new(ParserOptions::default());
//! let result = parser.next(&buf[..len], 0, &Heartbeat).expect("one frame");
//!
//! assert_eq!(result.start_offset, 0);
//! assert_eq!(result.length, 21);
//! assert_eq!(result.frame.message_id(), 0);
//! assert_eq!(result.frame.sequence(), 3);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod consts;
pub mod errors;
pub mod io;
pub mod prelude;
pub mod protocol;
pub mod utils;
