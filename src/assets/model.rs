//! Decoded model data.
//!
//! Only geometry is kept: world-space positions and triangle indices per mesh,
//! plus a bounding box usable as a pick volume. Materials and textures belong
//! to the renderer.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use base64::Engine;
use cgmath::{Matrix4, Point3, SquareMatrix, Transform, Vector3};

use super::resolver::ResourceKey;
use crate::{
    error::LoadError,
    gfx::picking::{Triangle, AABB},
};

/// One triangle mesh of a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ModelMesh {
    /// Triangles of the mesh; index triples pointing past the vertex list are skipped
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let corner = |i: u32| self.positions.get(i as usize).map(|p| Vector3::from(*p));
            Some(Triangle::new(corner(tri[0])?, corner(tri[1])?, corner(tri[2])?))
        })
    }
}

/// A fetched and decoded model file
#[derive(Debug, Clone)]
pub struct DecodedModel {
    pub meshes: Vec<ModelMesh>,
    pub bounds: AABB,
}

impl DecodedModel {
    pub fn new(meshes: Vec<ModelMesh>) -> Self {
        let all: Vec<[f32; 3]> = meshes
            .iter()
            .flat_map(|m| m.positions.iter().copied())
            .collect();
        let bounds = AABB::from_vertices(&all);
        Self { meshes, bounds }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }

    /// Decode file contents based on the key's extension.
    ///
    /// `path` is where the bytes came from; external glTF buffers are looked up
    /// next to it.
    pub fn decode(key: &ResourceKey, path: &Path, bytes: &[u8]) -> Result<Self, LoadError> {
        let decoded = match key.extension().as_deref() {
            Some("glb") | Some("gltf") => decode_gltf(bytes, path.parent()),
            Some("obj") => decode_obj(bytes),
            _ => return Err(LoadError::UnsupportedFormat { key: key.clone() }),
        };

        decoded
            .map(Self::new)
            .map_err(|e| LoadError::Decode {
                key: key.clone(),
                reason: format!("{e:#}"),
            })
    }
}

fn decode_obj(bytes: &[u8]) -> anyhow::Result<Vec<ModelMesh>> {
    let mut reader = bytes;
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        // Materials are the renderer's business
        |_: &Path| Err(tobj::LoadError::OpenFileFailed),
    )
    .context("parsing OBJ")?;

    let meshes: Vec<ModelMesh> = models
        .into_iter()
        .map(|m| ModelMesh {
            name: (!m.name.is_empty()).then_some(m.name),
            positions: m
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect(),
            indices: m.mesh.indices,
        })
        .collect();

    if meshes.is_empty() {
        bail!("OBJ contains no geometry");
    }
    Ok(meshes)
}

fn decode_gltf(bytes: &[u8], base_dir: Option<&Path>) -> anyhow::Result<Vec<ModelMesh>> {
    let gltf = gltf::Gltf::from_slice(bytes).context("parsing glTF document")?;
    let buffers = load_buffers(&gltf, base_dir)?;

    let mut meshes = Vec::new();
    let scene = gltf.default_scene().or_else(|| gltf.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                visit_node(&node, Matrix4::identity(), &buffers, &mut meshes)?;
            }
        }
        None => {
            for mesh in gltf.meshes() {
                read_mesh(&mesh, Matrix4::identity(), &buffers, &mut meshes)?;
            }
        }
    }

    if meshes.is_empty() {
        bail!("document contains no triangle meshes");
    }
    Ok(meshes)
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: Matrix4<f32>,
    buffers: &[Vec<u8>],
    out: &mut Vec<ModelMesh>,
) -> anyhow::Result<()> {
    let transform = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        read_mesh(&mesh, transform, buffers, out)?;
    }
    for child in node.children() {
        visit_node(&child, transform, buffers, out)?;
    }
    Ok(())
}

fn read_mesh(
    mesh: &gltf::Mesh<'_>,
    transform: Matrix4<f32>,
    buffers: &[Vec<u8>],
    out: &mut Vec<ModelMesh>,
) -> anyhow::Result<()> {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| anyhow!("mesh {} has a primitive without positions", mesh.index()))?
            .map(|[x, y, z]| {
                let p = transform.transform_point(Point3::new(x, y, z));
                [p.x, p.y, p.z]
            })
            .collect();

        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        out.push(ModelMesh {
            name: mesh.name().map(str::to_owned),
            positions,
            indices,
        });
    }
    Ok(())
}

fn load_buffers(gltf: &gltf::Gltf, base_dir: Option<&Path>) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut data = Vec::new();
    for buffer in gltf.buffers() {
        let bytes = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| anyhow!("GLB references a binary chunk but it is missing"))?,
            gltf::buffer::Source::Uri(uri) => {
                if let Some(data_uri) = uri.strip_prefix("data:") {
                    decode_data_uri(data_uri)?
                } else {
                    let dir = base_dir
                        .ok_or_else(|| anyhow!("external buffer {uri} without a base directory"))?;
                    std::fs::read(dir.join(uri))
                        .with_context(|| format!("reading external buffer {uri}"))?
                }
            }
        };
        if bytes.len() < buffer.length() {
            bail!(
                "buffer {} holds {} bytes, expected {}",
                buffer.index(),
                bytes.len(),
                buffer.length()
            );
        }
        data.push(bytes);
    }
    Ok(data)
}

fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| anyhow!("only base64 data URIs are supported"))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("decoding base64 buffer")
}
