//! Message metadata resolver interface.

/// Per-message wire-level metadata consumed by the frame engine.
///
/// Produced by a schema compiler outside of this crate. The generator
/// guarantees `length_v1 <= length_v2`: extension fields only ever extend a
/// message past its legacy fixed layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageMeta {
    /// Schema-derived byte folded into the frame checksum, so that CRC
    /// validation also detects message-definition mismatches between peers.
    pub crc_extra: u8,
    /// Fixed `MAVLink 1` payload length.
    pub length_v1: u8,
    /// Maximum `MAVLink 2` payload length, extension fields included.
    pub length_v2: u8,
}

/// Resolves message `ID`s to their wire-level metadata.
///
/// The engine never needs to know concrete message shapes, only the metadata
/// triple per `ID`. A dialect is read-only after initialization and can be
/// shared between parser instances without locking.
pub trait Dialect {
    /// Returns metadata for `message_id`, or `None` for unknown messages.
    fn resolve(&self, message_id: u32) -> Option<MessageMeta>;

    /// Returns `true` if this dialect defines `message_id`.
    fn supports(&self, message_id: u32) -> bool {
        self.resolve(message_id).is_some()
    }
}
