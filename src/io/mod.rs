//! # I/O adapters
//!
//! Buffering that adapts byte-oriented transports to the frame scanner's
//! contiguous-buffer contract. Socket handling itself lives outside of this
//! crate; these adapters only own the bytes in between.

pub mod stream;

pub use stream::StreamReassembler;
