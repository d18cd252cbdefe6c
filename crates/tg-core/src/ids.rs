//! Typed identifiers for road-graph nodes and edges.
//!
//! Graphs are arena-style: nodes and edges live in flat `Vec`s and refer to
//! each other by index.  Wrapping the index keeps a node id from being handed
//! to an edge table by accident, at zero runtime cost.

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no such id"; used by index tables for unmapped tiles.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Build an id from a `Vec` position.  Graph sizes are bounded by
            /// the tile count, so positions always fit the inner integer.
            #[inline(always)]
            pub fn from_index(i: usize) -> Self {
                $name(i as $inner)
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }
    };
}

typed_id! {
    /// Index of a road-graph node (junction, dead end, or bend).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of an undirected road-graph edge (a corridor between two nodes).
    pub struct EdgeId(u32);
}
