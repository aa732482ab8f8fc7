//! NodeId - small stable node identifier
//!
//! Node ids are assigned by the simulation host and start at 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation node identifier.
///
/// Ids are 1-based: a simulation with `N` nodes uses ids `1..=N`.
///
/// # Examples
/// ```
/// use contracts::NodeId;
///
/// let id = NodeId::new(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(id.index(5), Some(2));
/// assert_eq!(NodeId::new(0).index(5), None);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new NodeId
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Zero-based slot for this id among `node_count` nodes.
    ///
    /// Returns `None` when the id falls outside `1..=node_count`.
    #[inline]
    pub fn index(self, node_count: usize) -> Option<usize> {
        let slot = usize::try_from(self.0).ok()?.checked_sub(1)?;
        (slot < node_count).then_some(slot)
    }

    /// Id of the node stored at a zero-based slot.
    ///
    /// Slots past `u32::MAX - 1` have no id; they saturate at `u32::MAX`
    /// (and trip a debug assertion). Validated configurations stay far below.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        let id = index
            .checked_add(1)
            .and_then(|id| u32::try_from(id).ok());
        debug_assert!(id.is_some(), "node slot {index} has no u32 id");
        Self(id.unwrap_or(u32::MAX))
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bounds() {
        assert_eq!(NodeId::new(1).index(2), Some(0));
        assert_eq!(NodeId::new(2).index(2), Some(1));
        assert_eq!(NodeId::new(3).index(2), None);
        assert_eq!(NodeId::new(0).index(2), None);
        assert_eq!(NodeId::new(1).index(0), None);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(NodeId::from_index(0), NodeId::new(1));
        assert_eq!(NodeId::from_index(4).index(5), Some(4));
        assert_eq!(NodeId::from_index(u32::MAX as usize - 1), NodeId::new(u32::MAX));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "has no u32 id")]
    fn test_from_index_past_id_space() {
        let _ = NodeId::from_index(u32::MAX as usize);
    }

    #[test]
    fn test_serde() {
        let id = NodeId::new(12);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "12");

        let parsed: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
