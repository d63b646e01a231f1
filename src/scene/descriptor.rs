use std::collections::BTreeMap;

use cgmath::{Deg, Matrix4, Vector3};

use crate::assets::resolver::{AssetDescriptor, AssetKind};

/// Identifier of an object in the scene description
pub type ObjectId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneObjectKind {
    Camera,
    Character,
    /// A prop
    Object,
    Light,
}

impl SceneObjectKind {
    pub fn asset_kind(self) -> AssetKind {
        match self {
            SceneObjectKind::Camera => AssetKind::Camera,
            SceneObjectKind::Character => AssetKind::Character,
            SceneObjectKind::Object => AssetKind::Object,
            SceneObjectKind::Light => AssetKind::Light,
        }
    }

    /// Whether objects of this kind are drawn from a model file
    pub fn has_model(self) -> bool {
        matches!(self, SceneObjectKind::Character | SceneObjectKind::Object)
    }
}

/// One object of the scene description, read-only to this crate
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObjectDescriptor {
    pub kind: SceneObjectKind,
    pub model_reference: Option<String>,
    /// Set by the presentation layer once the object's model is attached
    pub loaded: bool,
    pub position: Vector3<f32>,
    /// Euler angles in degrees, applied Y then X then Z
    pub rotation: Vector3<f32>,
    pub scale: f32,
}

impl SceneObjectDescriptor {
    pub fn new(kind: SceneObjectKind, model_reference: Option<impl Into<String>>) -> Self {
        Self {
            kind,
            model_reference: model_reference.map(Into::into),
            loaded: false,
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }

    pub fn asset_descriptor(&self) -> AssetDescriptor {
        AssetDescriptor {
            kind: self.kind.asset_kind(),
            model_reference: self.model_reference.clone(),
        }
    }

    /// Model-to-world transform, T * R * S
    pub fn transform(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_x(Deg(self.rotation.x))
            * Matrix4::from_angle_z(Deg(self.rotation.z));
        let s = Matrix4::from_scale(self.scale);
        t * r * s
    }

    /// Whether this object still needs a model fetched
    pub fn needs_model(&self, box_sentinel: &str) -> bool {
        self.kind.has_model()
            && !self.loaded
            && self
                .model_reference
                .as_deref()
                .is_some_and(|reference| reference != box_sentinel)
    }
}

/// Scene environment: an optional model file and a background color
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentDescriptor {
    pub file: Option<String>,
    pub background_color: [f32; 3],
}

impl Default for EnvironmentDescriptor {
    fn default() -> Self {
        Self {
            file: None,
            background_color: [0.0, 0.0, 0.0],
        }
    }
}

impl EnvironmentDescriptor {
    pub fn asset_descriptor(&self) -> Option<AssetDescriptor> {
        self.file.as_ref().map(|file| AssetDescriptor {
            kind: AssetKind::Environment,
            model_reference: Some(file.clone()),
        })
    }
}

/// Snapshot of the external scene description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    pub objects: BTreeMap<ObjectId, SceneObjectDescriptor>,
    pub environment: EnvironmentDescriptor,
}

impl SceneDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, id: impl Into<ObjectId>, object: SceneObjectDescriptor) -> Self {
        self.objects.insert(id.into(), object);
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentDescriptor) -> Self {
        self.environment = environment;
        self
    }

    pub fn object(&self, id: &str) -> Option<&SceneObjectDescriptor> {
        self.objects.get(id)
    }

    /// Descriptors whose models still have to be fetched.
    ///
    /// Skips objects already loaded, kinds without a model, missing references and
    /// the primitive-box sentinel. The environment comes last when it names a file.
    pub fn loadable_descriptors(&self, box_sentinel: &str) -> Vec<AssetDescriptor> {
        self.objects
            .values()
            .filter(|object| object.needs_model(box_sentinel))
            .map(SceneObjectDescriptor::asset_descriptor)
            .chain(self.environment.asset_descriptor())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::resolver::resolve;

    fn three_object_scene() -> SceneDescription {
        SceneDescription::new()
            .with_object("orc", SceneObjectDescriptor::new(SceneObjectKind::Character, Some("ORC")))
            .with_object("crate", SceneObjectDescriptor::new(SceneObjectKind::Object, Some("box")))
            .with_object("sun", SceneObjectDescriptor::new(SceneObjectKind::Light, None::<String>))
    }

    #[test]
    fn test_only_real_models_are_loadable() {
        let loadable = three_object_scene().loadable_descriptors("box");
        assert_eq!(
            loadable,
            vec![AssetDescriptor::new(AssetKind::Character, Some("ORC"))]
        );
        assert_eq!(
            resolve(&loadable[0]).unwrap().as_str(),
            "/data/system/dummies/gltf/ORC.glb"
        );
    }

    #[test]
    fn test_loaded_and_modelless_objects_are_skipped() {
        let scene = SceneDescription::new()
            .with_object(
                "done",
                SceneObjectDescriptor::new(SceneObjectKind::Character, Some("ORC")).with_loaded(true),
            )
            .with_object("cam", SceneObjectDescriptor::new(SceneObjectKind::Camera, Some("ORC")))
            .with_object("empty", SceneObjectDescriptor::new(SceneObjectKind::Object, None::<String>));
        assert!(scene.loadable_descriptors("box").is_empty());
    }

    #[test]
    fn test_environment_is_appended_when_set() {
        let scene = three_object_scene().with_environment(EnvironmentDescriptor {
            file: Some("scans/stage.glb".to_owned()),
            background_color: [0.1, 0.1, 0.1],
        });
        let loadable = scene.loadable_descriptors("box");
        assert_eq!(loadable.len(), 2);
        assert_eq!(
            resolve(&loadable[1]).unwrap().as_str(),
            "/data/user/environments/stage.glb"
        );
    }

    #[test]
    fn test_custom_box_sentinel() {
        let loadable = three_object_scene().loadable_descriptors("primitive:box");
        assert_eq!(loadable.len(), 2);
    }

    #[test]
    fn test_transform_places_object() {
        let object = SceneObjectDescriptor::new(SceneObjectKind::Object, Some("chair"))
            .with_position(Vector3::new(1.0, 0.0, -2.0))
            .with_scale(2.0);
        let m = object.transform();
        let origin = m * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.truncate(), Vector3::new(1.0, 0.0, -2.0));
        let unit_x = m * cgmath::Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(unit_x.truncate(), Vector3::new(3.0, 0.0, -2.0));
    }
}
