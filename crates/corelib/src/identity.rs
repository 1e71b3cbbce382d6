//! Deterministic identifiers for nodes and samples.
//!
//! Ids are 32-bit `xxh32` digests with a fixed seed of zero, so the same input
//! yields the same id on every platform and across restarts. Nodes hash their
//! dial address only; samples hash `from ++ to ++ decimal(key)`.
//!
//! Collisions are neither detected nor corrected. Two distinct targets that
//! happen to share a digest would be merged into one record. With a 32-bit
//! space this is an accepted risk for mesh sizes in the hundreds of nodes.

use crate::node::NodeId;
use crate::sample::{SampleId, SampleKind};
use xxhash_rust::xxh32::xxh32;

const SEED: u32 = 0;

/// Hashes an arbitrary string into the 32-bit id space.
#[inline]
pub fn hash(input: &str) -> u32 {
    xxh32(input.as_bytes(), SEED)
}

/// Derives the id of a node from its dial address.
///
/// The display name never participates, so two observations of the same
/// address under different names converge to one record.
#[inline]
pub fn node_id(target: &str) -> NodeId {
    NodeId(hash(target))
}

/// Derives the id of a sample from the measured edge and the probe kind.
///
/// Value and timestamp are excluded: a new measurement of the
/// same edge and kind replaces the previous one.
pub fn sample_id(from: &str, to: &str, key: SampleKind) -> SampleId {
    let composite = format!("{}{}{}", from, to, key.as_u32());
    SampleId(hash(&composite))
}
