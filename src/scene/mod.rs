//! # Scene Description Module
//!
//! Read-only view of the external scene description: the objects in the scene, what
//! kind they are, which model they reference, and the environment. The store that
//! owns and edits the description lives outside this crate; a [`SceneDescription`]
//! is a snapshot of it handed in whenever it changes.
//!
//! The main job here is deciding which objects still need a model fetched
//! ([`SceneDescription::loadable_descriptors`]).

pub mod descriptor;

// Re-export main types
pub use descriptor::{
    EnvironmentDescriptor, ObjectId, SceneDescription, SceneObjectDescriptor, SceneObjectKind,
};
