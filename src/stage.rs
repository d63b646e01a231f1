//! # Stage
//!
//! A [`Stage`] is the state behind one mounted scene view: the latest scene
//! description, the asset cache that fetches its models and the selection tracker
//! for the VR controllers. It lives exactly as long as the view; dropping it
//! discards the cache. Loads still in flight at that point finish into a closed
//! channel and are ignored.
//!
//! ## Frame flow
//!
//! ```no_run
//! use stagecraft::prelude::*;
//!
//! let config = StageConfig::from_env()?;
//! let mut stage = Stage::from_config(config)?;
//!
//! let scene = SceneDescription::new()
//!     .with_object("orc", SceneObjectDescriptor::new(SceneObjectKind::Character, Some("ORC")));
//! stage.set_scene(scene);
//!
//! let mut events: Vec<SelectionEvent<ObjectId>> = Vec::new();
//! loop {
//!     stage.update();
//!     let controllers = [Ray::from_pose(&Matrix4::from_translation(Vector3::new(0.0, 1.5, 0.0)))];
//!     stage.select(&controllers, &mut events);
//!     if let Some(model) = stage.model_for("orc") {
//!         // attach model to the scene graph
//!         # let _ = model;
//!     }
//!     # break;
//! }
//! # Ok::<(), stagecraft::error::StageError>(())
//! ```

use cgmath::Vector3;

use crate::{
    assets::{
        cache::{AssetCache, LoadStatus},
        loader::{AssetLoader, FileModelLoader},
        model::DecodedModel,
        resolver::{resolve, ResourceKey},
    },
    config::StageConfig,
    error::Result,
    gfx::picking::{
        selection::{SelectionDelta, SelectionSink, SelectionTracker},
        Bounds, Candidate, Ray, Triangle, AABB,
    },
    scene::{ObjectId, SceneDescription, SceneObjectDescriptor},
};

/// Half extent of the primitive box drawn for the box sentinel
const PRIMITIVE_BOX_HALF_EXTENT: f32 = 0.5;

pub struct Stage {
    config: StageConfig,
    scene: SceneDescription,
    cache: AssetCache<DecodedModel>,
    selection: SelectionTracker<ObjectId>,
}

impl Stage {
    /// Create a stage that loads through `loader`
    pub fn new(config: StageConfig, loader: impl AssetLoader<DecodedModel> + 'static) -> Self {
        let cache = AssetCache::new(loader).with_progress_formula(config.progress_formula);
        Self {
            config,
            scene: SceneDescription::default(),
            cache,
            selection: SelectionTracker::new(),
        }
    }

    /// Create a stage that loads model files from `config.asset_root`
    pub fn from_config(config: StageConfig) -> Result<Self> {
        let loader = FileModelLoader::new(&config)?;
        log::info!("Stage assets served from {}", config.asset_root.display());
        Ok(Self::new(config, loader))
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    pub fn cache(&self) -> &AssetCache<DecodedModel> {
        &self.cache
    }

    pub fn selection(&self) -> &SelectionTracker<ObjectId> {
        &self.selection
    }

    /// Replace the scene snapshot and start loads for any new models
    pub fn set_scene(&mut self, scene: SceneDescription) {
        self.scene = scene;
        let loadable = self.scene.loadable_descriptors(&self.config.box_sentinel);
        self.cache.sync(&loadable);
    }

    /// Apply finished loader work. Call once per tick.
    pub fn update(&mut self) -> usize {
        self.cache.pump()
    }

    /// Key of the model an object is drawn with
    pub fn object_key(&self, id: &str) -> Option<ResourceKey> {
        let object = self.scene.object(id)?;
        if self.is_primitive_box(object) {
            return None;
        }
        resolve(&object.asset_descriptor())
    }

    pub fn load_status(&self, id: &str) -> Option<LoadStatus> {
        self.cache.status(&self.object_key(id)?)
    }

    /// The object's model, once it has loaded successfully
    pub fn model_for(&self, id: &str) -> Option<&DecodedModel> {
        self.cache.value(&self.object_key(id)?)
    }

    pub fn environment_model(&self) -> Option<&DecodedModel> {
        let descriptor = self.scene.environment.asset_descriptor()?;
        self.cache.value(&resolve(&descriptor)?)
    }

    fn is_primitive_box(&self, object: &SceneObjectDescriptor) -> bool {
        object.model_reference.as_deref() == Some(self.config.box_sentinel.as_str())
    }

    /// World-space pick volumes for every object that is currently drawn: loaded
    /// models by their triangles, primitive boxes by their box. Objects whose model
    /// is missing or failed are not pickable.
    pub fn pick_candidates(&self) -> Vec<Candidate<ObjectId>> {
        let mut candidates = Vec::new();

        for (id, object) in &self.scene.objects {
            if !object.kind.has_model() {
                continue;
            }
            let transform = object.transform();

            if self.is_primitive_box(object) {
                let h = PRIMITIVE_BOX_HALF_EXTENT;
                let unit = AABB::new(Vector3::new(-h, -h, -h), Vector3::new(h, h, h));
                candidates.push(Candidate::new(id.clone(), Bounds::Box(unit.transform(&transform))));
                continue;
            }

            if let Some(model) = self.model_for(id) {
                let triangles: Vec<Triangle> = model
                    .meshes
                    .iter()
                    .flat_map(|mesh| mesh.triangles())
                    .map(|t| t.transform(&transform))
                    .collect();
                if !triangles.is_empty() {
                    candidates.push(Candidate::new(id.clone(), Bounds::mesh(triangles)));
                }
            }
        }

        candidates
    }

    /// Run one selection tick against the stage's own pick volumes
    pub fn select(
        &mut self,
        rays: &[Ray],
        sink: &mut dyn SelectionSink<ObjectId>,
    ) -> SelectionDelta<ObjectId> {
        let candidates = self.pick_candidates();
        self.selection.tick(rays, &candidates, sink)
    }

    /// Run one selection tick against caller-supplied candidates
    pub fn select_among(
        &mut self,
        rays: &[Ray],
        candidates: &[Candidate<ObjectId>],
        sink: &mut dyn SelectionSink<ObjectId>,
    ) -> SelectionDelta<ObjectId> {
        self.selection.tick(rays, candidates, sink)
    }
}
