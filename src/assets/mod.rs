//! # Asset Module
//!
//! Resolution, loading and load-state tracking for scene models.
//!
//! ## Key Components
//!
//! - [`resolver`] - Maps a kind plus model reference to a canonical [`ResourceKey`]
//! - [`cache`] - The per-key load state machine ([`AssetCache`])
//! - [`loader`] - The [`AssetLoader`] seam and the on-disk [`FileModelLoader`]
//! - [`model`] - Decoded model geometry ([`DecodedModel`])
//! - [`progress`] - Progress percentages for in-flight loads
//!
//! ## Usage
//!
//! ```no_run
//! use stagecraft::assets::{AssetCache, AssetDescriptor, AssetKind, FileModelLoader};
//! use stagecraft::config::StageConfig;
//!
//! let config = StageConfig::default();
//! let loader = FileModelLoader::new(&config).expect("loader pool");
//! let mut cache = AssetCache::new(loader);
//!
//! // Whenever the scene changes
//! cache.sync(&[AssetDescriptor::new(AssetKind::Character, Some("ORC"))]);
//!
//! // Every tick
//! cache.pump();
//! ```

pub mod cache;
pub mod loader;
pub mod model;
pub mod progress;
pub mod resolver;

// Re-export main types
pub use cache::{AssetCache, LoadEntry, LoadEvent, LoadStatus};
pub use loader::{AssetLoader, FileModelLoader, LoadReporter};
pub use model::{DecodedModel, ModelMesh};
pub use progress::{LoadProgress, ProgressFormula};
pub use resolver::{resolve, AssetDescriptor, AssetKind, ResourceKey};
