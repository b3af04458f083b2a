//! # Compact Collections Module
//!
//! Index-addressed containers shared by feature extraction, detection and refinement.
//!
//! ## Key Components
//!
//! - [`bitset::BitSet`] - Fixed-length packed membership set
//! - [`spatial_index::SpatialIndex`] - Uniform-grid fixed-radius neighbor search
//! - [`adjacency::AdjacencyList`] - CSR per-node incident-edge lists

pub mod adjacency;
pub mod bitset;
pub mod spatial_index;

pub use adjacency::AdjacencyList;
pub use bitset::BitSet;
pub use spatial_index::SpatialIndex;
