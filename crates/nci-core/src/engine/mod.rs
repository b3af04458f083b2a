//! # Engine Module
//!
//! Contact detection engine: configuration, feature extraction, detectors,
//! refinement passes and the pipeline that drives them.
//!
//! ## Overview
//!
//! The engine takes any [`Structure`](crate::core::structure::Structure), extracts
//! typed chemical features from it, finds candidate non-covalent contacts between
//! features with a uniform-grid spatial index, validates their geometry family by
//! family, and finally narrows the candidates with a sequence of refinement passes
//! that only ever switch contacts off.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Distance and angle thresholds, enable flags, TOML loading
//! - **Interactions** ([`interactions`]) - Features, contact storage, detectors, refinement and pipeline
//! - **Progress Monitoring** ([`progress`]) - Progress callbacks for long-running workflows
//! - **Error Handling** ([`error`]) - Engine-level error type
//!
//! ## Key Capabilities
//!
//! - **Injected, ordered stages** so custom providers, detectors and passes can be plugged in
//! - **Deterministic results** independent of atom order, with fixed tie-breaking rules
//! - **Monotone refinement** where every pass clears contact bits and never sets them

pub mod config;
pub mod error;
pub mod interactions;
pub mod progress;
