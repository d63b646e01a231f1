//! # Graphics Module
//!
//! Spatial queries over the live scene. The scene graph and rendering belong to
//! the host engine; this module only needs world-space pick volumes.
//!
//! - **Picking** ([`picking`]) - Ray casts and nearest-hit selection for VR controllers

pub mod picking;

// Re-export commonly used types
pub use picking::{selection::SelectionTracker, Ray};
