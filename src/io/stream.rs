//! Stream reassembly for byte-oriented transports.

use crate::consts::{
    DEFAULT_STREAM_BUFFER_CAPACITY, MAGIC_V1, MAGIC_V2, STREAM_RESYNC_THRESHOLD,
};
use crate::protocol::{Dialect, ParseResult, Parser};

/// Accumulation buffer feeding arbitrary-sized transport reads into the frame
/// scanner.
///
/// Byte-oriented transports such as TCP or radio serial links do not preserve
/// frame boundaries: a read may carry half a frame, several frames, or
/// garbage. The reassembler appends every chunk to an owned buffer, drains
/// all complete frames out of it, and compacts the unconsumed tail to the
/// front.
///
/// A stream that never yields a valid frame would otherwise grow the buffer
/// without bound, so once the unconsumed length crosses
/// [`STREAM_RESYNC_THRESHOLD`] the reassembler discards everything before the
/// next start marker, at the cost of possibly losing a few bytes of
/// legitimate but malformed-looking data.
///
/// One reassembler per connection, driven by the single task that owns that
/// connection's reads.
#[derive(Debug)]
pub struct StreamReassembler {
    buf: Vec<u8>,
}

impl StreamReassembler {
    /// Creates a reassembler with [`DEFAULT_STREAM_BUFFER_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STREAM_BUFFER_CAPACITY)
    }

    /// Creates a reassembler with a specific initial capacity.
    ///
    /// The buffer grows geometrically when a chunk does not fit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of buffered bytes not yet consumed.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Appends `chunk` and dispatches every frame that became complete.
    ///
    /// Frames are handed to `on_frame` in wire order; each view borrows the
    /// internal buffer and is only valid for the duration of the callback.
    /// Returns the number of frames dispatched.
    pub fn push<F>(
        &mut self,
        chunk: &[u8],
        parser: &mut Parser,
        dialect: &dyn Dialect,
        mut on_frame: F,
    ) -> usize
    where
        F: FnMut(ParseResult<'_>),
    {
        self.buf.extend_from_slice(chunk);

        let mut cursor = 0;
        let mut dispatched = 0;
        while let Some(result) = parser.next(&self.buf, cursor, dialect) {
            cursor = result.start_offset + result.length;
            dispatched += 1;
            on_frame(result);
        }

        if cursor > 0 {
            self.consume(cursor);
        } else if self.buf.len() >= STREAM_RESYNC_THRESHOLD {
            self.force_resync();
        }

        dispatched
    }

    /// Drops `count` leading bytes, moving the unconsumed tail to the front.
    fn consume(&mut self, count: usize) {
        let len = self.buf.len();
        self.buf.copy_within(count..len, 0);
        self.buf.truncate(len - count);
    }

    /// Discards everything before the next start marker past offset 0.
    ///
    /// The marker at offset 0 (if any) already failed to produce a frame, so
    /// the search starts one byte in. Without any marker the whole buffer is
    /// garbage and is dropped.
    fn force_resync(&mut self) {
        match self.buf[1..]
            .iter()
            .position(|&b| b == MAGIC_V1 || b == MAGIC_V2)
        {
            Some(position) => {
                let discard = position + 1;
                log::debug!("stream resynchronization: discarding {discard} bytes");
                self.consume(discard);
            }
            None => {
                log::debug!(
                    "stream resynchronization: discarding all {} buffered bytes",
                    self.buf.len()
                );
                self.buf.clear();
            }
        }
    }
}

impl Default for StreamReassembler {
    fn default() -> Self {
        Self::new()
    }
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        write_v2, Dialect, HeaderV2, MessageMeta, Parser, ParserOptions,
    };

    struct TestDialect;

    impl Dialect for TestDialect {
        fn resolve(&self, message_id: u32) -> Option<MessageMeta> {
            (message_id == 0).then_some(MessageMeta {
                crc_extra: 50,
                length_v1: 7,
                length_v2: 9,
            })
        }
    }

    fn heartbeat(sequence: u8) -> Vec<u8> {
        let mut buf = vec![0u8; 32];
        let header = HeaderV2 {
            sequence,
            system_id: 1,
            component_id: 1,
            ..HeaderV2::default()
        };
        let len = write_v2(&mut buf, 0, &header, 50, &[5, 0, 0, 0, 0, 0, 4], 7, false, None)
            .unwrap();
        buf.truncate(len);
        buf
    }

    fn collect_frames(chunks: &[&[u8]]) -> Vec<(u8, Vec<u8>)> {
        let mut parser = Parser::new(ParserOptions::default());
        let mut reassembler = StreamReassembler::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            reassembler.push(chunk, &mut parser, &TestDialect, |result| {
                frames.push((result.frame.sequence(), result.frame.payload().to_vec()));
            });
        }
        frames
    }

    #[test]
    fn one_chunk_equals_byte_at_a_time() {
        let mut wire = heartbeat(0);
        wire.extend_from_slice(&heartbeat(1));

        let whole = collect_frames(&[&wire]);
        assert_eq!(whole.len(), 2);
        assert_eq!(whole[0].0, 0);
        assert_eq!(whole[1].0, 1);

        let single_bytes: Vec<&[u8]> = wire.chunks(1).collect();
        assert_eq!(collect_frames(&single_bytes), whole);

        let odd_chunks: Vec<&[u8]> = wire.chunks(3).collect();
        assert_eq!(collect_frames(&odd_chunks), whole);
    }

    #[test]
    fn consumed_frames_leave_partial_tail_buffered() {
        let mut parser = Parser::new(ParserOptions::default());
        let mut reassembler = StreamReassembler::new();

        let mut wire = heartbeat(0);
        wire.extend_from_slice(&heartbeat(1)[..5]);

        let mut count = 0;
        reassembler.push(&wire, &mut parser, &TestDialect, |_| count += 1);
        assert_eq!(count, 1);
        assert_eq!(reassembler.buffered(), 5);

        reassembler.push(&heartbeat(1)[5..], &mut parser, &TestDialect, |_| {
            count += 1
        });
        assert_eq!(count, 2);
        assert_eq!(reassembler.buffered(), 0);
    }

    #[test]
    fn noise_before_frame_is_skipped() {
        let mut wire = vec![0x11, 0x22, 0x33, 0x44];
        wire.extend_from_slice(&heartbeat(9));

        let frames = collect_frames(&[&wire]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, 9);
    }

    #[test]
    fn garbage_stream_stays_bounded() {
        let mut parser = Parser::new(ParserOptions::default());
        let mut reassembler = StreamReassembler::new();

        let garbage = [0u8; 100];
        for _ in 0..50 {
            let dispatched =
                reassembler.push(&garbage, &mut parser, &TestDialect, |_| {
                    panic!("garbage produced a frame")
                });
            assert_eq!(dispatched, 0);
            assert!(reassembler.buffered() < STREAM_RESYNC_THRESHOLD + garbage.len());
        }
    }

    #[test]
    fn resync_recovers_frames_after_garbage_burst() {
        let mut parser = Parser::new(ParserOptions::default());
        let mut reassembler = StreamReassembler::new();

        // Enough magic-free garbage to cross the resync threshold.
        let garbage = vec![0x42u8; STREAM_RESYNC_THRESHOLD + 17];
        reassembler.push(&garbage, &mut parser, &TestDialect, |_| {
            panic!("garbage produced a frame")
        });
        assert_eq!(reassembler.buffered(), 0);

        let mut sequences = Vec::new();
        reassembler.push(&heartbeat(5), &mut parser, &TestDialect, |result| {
            sequences.push(result.frame.sequence())
        });
        assert_eq!(sequences, vec![5]);
    }
}
