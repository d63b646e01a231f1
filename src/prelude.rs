//! # Stagecraft Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use stagecraft::prelude::*;
//! ```

// Re-export the scene-view facade
pub use crate::stage::Stage;
pub use crate::config::StageConfig;
pub use crate::error::{LoadError, StageError};

// Re-export scene description types
pub use crate::scene::{
    EnvironmentDescriptor, ObjectId, SceneDescription, SceneObjectDescriptor, SceneObjectKind,
};

// Re-export asset types
pub use crate::assets::{
    resolve, AssetCache, AssetDescriptor, AssetKind, AssetLoader, DecodedModel, FileModelLoader,
    LoadReporter, LoadStatus, ProgressFormula, ResourceKey,
};

// Re-export picking and selection
pub use crate::gfx::picking::{
    nearest_hit, Bounds, Candidate, PickResult, Ray, Sphere, Triangle, AABB,
    selection::{SelectionDelta, SelectionEvent, SelectionSink, SelectionTracker},
};

// Re-export common external dependencies
pub use cgmath::{Matrix4, Vector3};
