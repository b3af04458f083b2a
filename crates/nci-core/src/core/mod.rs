//! # Core Module
//!
//! This module provides the stateless building blocks of NCIKit.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains, bonds and systems
//! - **Structure View** ([`structure`]) - Dense, index-addressed read access used by the detectors
//! - **Chemistry Perception** ([`chemistry`]) - Residue tables, valence model and ring perception
//! - **Compact Collections** ([`collections`]) - Bitsets, uniform-grid spatial index, CSR adjacency
//! - **File I/O** ([`io`]) - BGF structure reading and CSV contact reports
//! - **Utilities** ([`utils`]) - Geometric primitives

pub mod chemistry;
pub mod collections;
pub mod io;
pub mod models;
pub mod structure;
pub mod utils;
