//! # Core Models Module
//!
//! This module contains the owned data structures used to represent molecular systems.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom with element, coordinates, charge, alternate location and model index
//! - [`builder`] - Serial-addressed incremental construction used by file readers
//! - [`element`] - Chemical element newtype with symbol and van der Waals radius tables
//! - [`residue`] - Residue grouping and classification
//! - [`chain`] - Chain organization and metadata
//! - [`system`] - Complete molecular system with all components and relationships
//! - [`topology`] - Bond connectivity and bond orders
//! - [`ids`] - Stable identifier types for atoms, residues, and chains
//!
//! ## Usage
//!
//! ```ignore
//! use ncikit::core::models::{atom::Atom, chain::ChainType, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A', ChainType::Protein);
//! let residue_id = system.add_residue(chain_id, 1, "SER").unwrap();
//! system.add_atom_to_residue(residue_id, Atom::new("OG", residue_id, Point3::origin()));
//! ```

pub mod atom;
pub mod builder;
pub mod chain;
pub mod element;
pub mod ids;
pub mod residue;
pub mod system;
pub mod topology;
