//! # NCIKit Core Library
//!
//! A library for detecting non-covalent interactions in three-dimensional molecular
//! structures: hydrogen bonds, halogen bonds, ionic interactions, cation-pi and pi-stacking
//! contacts, hydrophobic contacts and metal coordination.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`), the read-only
//!   [`Structure`](core::structure::Structure) view consumed by the detectors, chemistry
//!   perception helpers, compact collections (bitsets, uniform-grid spatial index, CSR
//!   adjacency) and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** Interaction features, the append-only contact store,
//!   the detector families, the refinement passes and the [`ContactPipeline`](engine::interactions::pipeline::ContactPipeline)
//!   that drives them in a fixed order.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together: runs the full
//!   pipeline on a `MolecularSystem` and extracts filtered contact records for reporting.

pub mod core;
pub mod engine;
pub mod workflows;
