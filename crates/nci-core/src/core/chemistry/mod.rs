//! # Chemistry Perception Module
//!
//! Chemistry knowledge the interaction detectors need beyond raw coordinates.
//!
//! ## Key Components
//!
//! - [`residues`] - Static residue and atom-name tables (polymer classes, charged side chains, metal binding sites)
//! - [`valence`] - Implicit hydrogen counts and ideal bonding geometry
//! - [`rings`] - Smallest-ring perception and aromaticity

pub mod residues;
pub mod rings;
pub mod valence;
