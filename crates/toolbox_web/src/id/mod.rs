//! Globally-unique, time-sortable 12-byte identifiers.
//!
//! Layout (big-endian):
//!
//! ```text
//! +-----------+---------+-------+---------+
//! | timestamp | machine |  pid  | counter |
//! |  4 bytes  | 3 bytes | 2 b.  | 3 bytes |
//! +-----------+---------+-------+---------+
//! ```
//!
//! The timestamp has one-second resolution. The counter is per generator and
//! wraps at 2^24, so ids minted by one process in one second sort in
//! generation order, both as bytes and as their canonical string.

mod clock;
mod encoding;
mod generator;
mod machine;

pub use clock::{Clock, FixedClock, SystemClock};
pub use encoding::ENCODED_LEN;
pub use generator::{IdGenerator, IdGeneratorBuilder};
pub use machine::{machine_tag, process_id};

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Size of an [`Id`] in bytes.
pub const ID_LEN: usize = 12;

const COUNTER_MASK: u32 = 0x00ff_ffff;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("malformed identifier: {reason}")]
    Malformed { reason: String },
}

impl IdError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// Build an id from exactly [`ID_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdError> {
        let raw: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            IdError::malformed(format!("expected {ID_LEN} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.timestamp()), 0).unwrap_or_default()
    }

    pub fn machine(&self) -> [u8; 3] {
        [self.0[4], self.0[5], self.0[6]]
    }

    pub fn pid(&self) -> u16 {
        u16::from_be_bytes([self.0[7], self.0[8]])
    }

    /// The 3-byte counter widened to `i32`; the top byte is always zero.
    pub fn counter(&self) -> i32 {
        i32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Split the id into its display fields.
    pub fn decode(&self) -> DecodedId {
        DecodedId {
            id: self.to_string(),
            time: self.time(),
            machine: URL_SAFE.encode(self.machine()),
            pid: self.pid(),
            counter: self.counter(),
        }
    }
}

/// Decode raw bytes received from elsewhere.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedId, IdError> {
    Id::from_bytes(bytes).map(|id| id.decode())
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encoding::encode(&self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.to_string()).finish()
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        encoding::decode(s).map(Self)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display fields of an [`Id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedId {
    /// Canonical string encoding.
    pub id: String,
    pub time: DateTime<Utc>,
    /// Machine tag as URL-safe base64.
    pub machine: String,
    pub pid: u16,
    pub counter: i32,
}
