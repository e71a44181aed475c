//! Spatial data structures and window manipulation
//!
//! This module contains spatial-related functionality including:
//! - Grid construction and the missing-value convention
//! - Site sets and window geometry
//! - The window merge rule

/// Grid model, site sets and window geometry
pub mod grid;
/// Candidate window merge rule
pub mod window;

pub use grid::Grid;
