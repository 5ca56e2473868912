//! MAVLink [message signing](https://mavlink.io/en/guide/message_signing.html) primitives.
//!
//! A signature trailer carries a link `ID`, a 48-bit timestamp, and the first
//! six bytes of a keyed SHA-256 digest. The digest covers the frame from its
//! start marker through the checksum, followed by the link `ID` and timestamp,
//! so a forged signature header is detected as well.

use std::fmt::{Debug, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::consts::{
    SIGNATURE_EPOCH_UNIX_SECS, SIGNATURE_TIMESTAMP_LEN, SIGNATURE_TIMESTAMP_MASK,
    SIGNATURE_VALUE_LEN,
};

/// Length of a secret key in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Secret key for message signing.
///
/// Keys are always [`SECRET_KEY_LENGTH`] bytes long; shorter inputs are
/// zero-padded and longer inputs truncated. Key material is redacted from
/// [`Debug`] output and never serialized.
#[derive(Clone, Eq, PartialEq)]
pub struct SecretKey([u8; SECRET_KEY_LENGTH]);

impl SecretKey {
    /// Creates a secret key from raw bytes.
    pub fn new(bytes: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Key material as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SECRET_KEY_LENGTH]> for SecretKey {
    fn from(bytes: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for SecretKey {
    /// Creates a secret key from a slice, zero-padding or truncating to
    /// [`SECRET_KEY_LENGTH`] bytes.
    fn from(bytes: &[u8]) -> Self {
        let mut key = [0u8; SECRET_KEY_LENGTH];
        let len = bytes.len().min(SECRET_KEY_LENGTH);
        key[..len].copy_from_slice(&bytes[..len]);
        Self(key)
    }
}

impl From<&str> for SecretKey {
    /// Creates a secret key from a string, zero-padding or truncating to
    /// [`SECRET_KEY_LENGTH`] bytes.
    fn from(value: &str) -> Self {
        value.as_bytes().into()
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&"[redacted]").finish()
    }
}

/// 48-bit signature timestamp in units of 10 µs since January 1st, 2015 GMT.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MavTimestamp(u64);

impl MavTimestamp {
    /// Creates a timestamp from a raw value, masked to 48 bits.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw & SIGNATURE_TIMESTAMP_MASK)
    }

    /// Raw 48-bit value.
    #[inline]
    pub fn as_raw(&self) -> u64 {
        self.0
    }

    /// Timestamp corresponding to the current system time.
    pub fn now() -> Self {
        SystemTime::now().into()
    }
}

impl From<SystemTime> for MavTimestamp {
    fn from(time: SystemTime) -> Self {
        let since_unix = time
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .saturating_sub(Duration::from_secs(SIGNATURE_EPOCH_UNIX_SECS));
        Self::from_raw((since_unix.as_micros() / 10) as u64)
    }
}

/// Signing configuration applied by the frame writer.
#[derive(Clone, Debug)]
pub struct SigningConf {
    /// Link `ID` distinguishing independent signing streams sharing one
    /// system/component pair.
    pub link_id: u8,
    /// Timestamp written into the signature trailer.
    pub timestamp: MavTimestamp,
    /// Secret key the truncated MAC is derived from.
    pub key: SecretKey,
}

/// Computes the 6-byte truncated MAC stored in a signature trailer.
///
/// `signed_region` spans the frame from its start marker through the end of
/// the checksum field. The link `ID` and the little-endian timestamp are
/// hashed after it.
pub fn compute_signature(
    key: &SecretKey,
    signed_region: &[u8],
    link_id: u8,
    timestamp: MavTimestamp,
) -> [u8; SIGNATURE_VALUE_LEN] {
    let mut digest = Sha256::new();
    digest.update(key.as_bytes());
    digest.update(signed_region);
    digest.update([link_id]);
    digest.update(&timestamp.as_raw().to_le_bytes()[..SIGNATURE_TIMESTAMP_LEN]);

    let hash = digest.finalize();
    let mut mac = [0u8; SIGNATURE_VALUE_LEN];
    mac.copy_from_slice(&hash[..SIGNATURE_VALUE_LEN]);
    mac
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_short_input_is_zero_padded() {
        let key = SecretKey::from("abc");
        assert_eq!(&key.as_bytes()[..3], b"abc");
        assert!(key.as_bytes()[3..].iter().all(|&b| b == 0));
        assert_eq!(key.as_bytes().len(), SECRET_KEY_LENGTH);
    }

    #[test]
    fn key_from_long_input_is_truncated() {
        let long = [0x5Au8; 64];
        let key = SecretKey::from(&long[..]);
        assert_eq!(key.as_bytes(), &long[..SECRET_KEY_LENGTH]);
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SecretKey::from("super secret");
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("super"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn timestamp_masked_to_48_bits() {
        let timestamp = MavTimestamp::from_raw(u64::MAX);
        assert_eq!(timestamp.as_raw(), SIGNATURE_TIMESTAMP_MASK);
    }

    #[test]
    fn mac_depends_on_every_input() {
        let key = SecretKey::from("key one");
        let other_key = SecretKey::from("key two");
        let region = [0xFDu8, 0x01, 0x00, 0x00, 0x07, 0x01, 0x01, 0x00, 0x00, 0x00, 0xAA, 0x12, 0x34];
        let timestamp = MavTimestamp::from_raw(1_000_000);

        let mac = compute_signature(&key, &region, 1, timestamp);
        assert_eq!(mac, compute_signature(&key, &region, 1, timestamp));

        assert_ne!(mac, compute_signature(&other_key, &region, 1, timestamp));
        assert_ne!(mac, compute_signature(&key, &region, 2, timestamp));
        assert_ne!(
            mac,
            compute_signature(&key, &region, 1, MavTimestamp::from_raw(1_000_001))
        );

        let mut tampered = region;
        tampered[10] ^= 0x01;
        assert_ne!(mac, compute_signature(&key, &tampered, 1, timestamp));
    }
}
