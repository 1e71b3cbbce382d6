//! Measurement samples for directed edges between named nodes.

use crate::error::{Error, Result};
use crate::identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Compact identifier for a sample, derived from `(from, to, key)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SampleId(pub u32);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Kind of probe that produced a sample.
///
/// Discriminants are part of the sample id and must never be renumbered.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SampleKind {
    /// Round trip including connection establishment.
    RttTotal = 1,
    /// Round trip of the request alone on an established connection.
    RttRequest = 2,
}

impl SampleKind {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Stable label used for metrics and logs.
    pub fn name(self) -> &'static str {
        match self {
            SampleKind::RttTotal => "rtt_total",
            SampleKind::RttRequest => "rtt_request",
        }
    }
}

impl TryFrom<u32> for SampleKind {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(SampleKind::RttTotal),
            2 => Ok(SampleKind::RttRequest),
            other => Err(Error::InvalidSampleKind(other)),
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored measurement. At most one exists per `(from, to, key)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub id: SampleId,
    pub from: String,
    pub to: String,
    pub key: SampleKind,
    /// Decimal text so the wire schema stays kind-agnostic.
    pub value: String,
    /// Unix seconds when the measurement was taken.
    pub ts: i64,
}

impl Sample {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        key: SampleKind,
        value: impl Into<String>,
        ts: i64,
    ) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: identity::sample_id(&from, &to, key),
            from,
            to,
            key,
            value: value.into(),
            ts,
        }
    }

    pub fn to_wire(&self) -> WireSample {
        WireSample {
            from: self.from.clone(),
            to: self.to.clone(),
            key: self.key,
            value: self.value.clone(),
            ts: self.ts,
        }
    }
}

/// Network representation of a sample; the id is recomputed on receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSample {
    pub from: String,
    pub to: String,
    pub key: SampleKind,
    pub value: String,
    pub ts: i64,
}

impl From<WireSample> for Sample {
    fn from(wire: WireSample) -> Self {
        Sample::new(wire.from, wire.to, wire.key, wire.value, wire.ts)
    }
}

/// Current wall-clock time in unix seconds.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
