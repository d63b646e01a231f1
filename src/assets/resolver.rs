//! Maps asset descriptors onto canonical resource keys.
//!
//! A model reference containing a path separator is a user-provided file: only its
//! last path segment is kept and placed under the per-kind user directory. A bare
//! name is a system asset placed under the per-kind system directory with a `.glb`
//! extension.
//!
//! | kind        | user path                          | system path                          |
//! |-------------|------------------------------------|--------------------------------------|
//! | character   | `/data/user/characters/<filename>` | `/data/system/dummies/gltf/<name>.glb` |
//! | object      | `/data/user/objects/<filename>`    | `/data/system/objects/<name>.glb`    |
//! | environment | `/data/user/environments/<filename>` | none                               |
//! | light       | none                               | none                                 |

use std::fmt;

/// The kind of thing an asset is loaded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Camera,
    Character,
    Object,
    Light,
    Environment,
}

impl AssetKind {
    fn user_dir(self) -> Option<&'static str> {
        match self {
            AssetKind::Character => Some("/data/user/characters"),
            AssetKind::Object => Some("/data/user/objects"),
            AssetKind::Environment => Some("/data/user/environments"),
            AssetKind::Camera | AssetKind::Light => None,
        }
    }

    fn system_dir(self) -> Option<&'static str> {
        match self {
            AssetKind::Character => Some("/data/system/dummies/gltf"),
            AssetKind::Object => Some("/data/system/objects"),
            AssetKind::Camera | AssetKind::Light | AssetKind::Environment => None,
        }
    }
}

/// Something that may need a model loaded: a kind plus an optional reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetDescriptor {
    pub kind: AssetKind,
    pub model_reference: Option<String>,
}

impl AssetDescriptor {
    pub fn new(kind: AssetKind, model_reference: Option<impl Into<String>>) -> Self {
        Self {
            kind,
            model_reference: model_reference.map(Into::into),
        }
    }
}

/// Canonical identity of a loadable asset file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension of the key, lowercased
    pub fn extension(&self) -> Option<String> {
        let file_name = self.0.rsplit('/').next()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Resolve a descriptor to the key of the file it needs, or `None` when there is
/// nothing to load.
pub fn resolve(descriptor: &AssetDescriptor) -> Option<ResourceKey> {
    let reference = descriptor.model_reference.as_deref()?;

    if reference.contains(is_separator) {
        let file_name = reference.rsplit(is_separator).next()?;
        if file_name.is_empty() {
            return None;
        }
        let dir = descriptor.kind.user_dir()?;
        Some(ResourceKey(format!("{dir}/{file_name}")))
    } else {
        if reference.is_empty() {
            return None;
        }
        let dir = descriptor.kind.system_dir()?;
        Some(ResourceKey(format!("{dir}/{reference}.glb")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: AssetKind, reference: &str) -> Option<String> {
        resolve(&AssetDescriptor::new(kind, Some(reference))).map(|k| k.as_str().to_owned())
    }

    #[test]
    fn test_system_assets() {
        assert_eq!(
            key(AssetKind::Character, "ORC").as_deref(),
            Some("/data/system/dummies/gltf/ORC.glb")
        );
        assert_eq!(
            key(AssetKind::Object, "chair").as_deref(),
            Some("/data/system/objects/chair.glb")
        );
        assert_eq!(key(AssetKind::Environment, "forest"), None);
        assert_eq!(key(AssetKind::Light, "sun"), None);
        assert_eq!(key(AssetKind::Camera, "lens"), None);
    }

    #[test]
    fn test_user_assets_keep_last_segment() {
        assert_eq!(
            key(AssetKind::Object, "assets/chairs/oak.glb").as_deref(),
            Some("/data/user/objects/oak.glb")
        );
        assert_eq!(
            key(AssetKind::Character, "/home/me/hero.gltf").as_deref(),
            Some("/data/user/characters/hero.gltf")
        );
        assert_eq!(
            key(AssetKind::Environment, "C:\\scans\\room.glb").as_deref(),
            Some("/data/user/environments/room.glb")
        );
        assert_eq!(key(AssetKind::Light, "lights/spot.glb"), None);
        assert_eq!(key(AssetKind::Object, "assets/chairs/"), None);
    }

    #[test]
    fn test_null_reference_resolves_to_nothing() {
        let descriptor = AssetDescriptor::new(AssetKind::Character, None::<String>);
        assert_eq!(resolve(&descriptor), None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = AssetDescriptor::new(AssetKind::Object, Some("props/lamp.obj"));
        let b = a.clone();
        assert_eq!(resolve(&a), resolve(&b));
        assert_eq!(resolve(&a), resolve(&a));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let system = key(AssetKind::Object, "oak").unwrap();
        let user = key(AssetKind::Object, "x/oak.glb").unwrap();
        let character = key(AssetKind::Character, "oak").unwrap();
        assert_ne!(system, user);
        assert_ne!(system, character);
    }

    #[test]
    fn test_key_extension() {
        let k = resolve(&AssetDescriptor::new(AssetKind::Object, Some("a/Model.OBJ"))).unwrap();
        assert_eq!(k.extension().as_deref(), Some("obj"));
        let k = resolve(&AssetDescriptor::new(AssetKind::Object, Some("a/noext"))).unwrap();
        assert_eq!(k.extension(), None);
    }
}
