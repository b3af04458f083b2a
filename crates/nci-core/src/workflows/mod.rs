//! # Workflows Module
//!
//! High-level entry points that run the complete contact calculation on a
//! [`MolecularSystem`](crate::core::models::system::MolecularSystem).
//!
//! ## Overview
//!
//! A workflow validates its parameters, builds the dense structure view, runs the
//! standard [`ContactPipeline`](crate::engine::interactions::pipeline::ContactPipeline)
//! with progress reporting and turns the surviving contacts into report records.
//!
//! - **Contact Workflow** ([`contacts`]) - Detection, refinement, type and selection
//!   filtering, and per-type summaries.

pub mod contacts;
