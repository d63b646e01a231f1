//! # Object Picking System
//!
//! Ray casting against pick volumes, used to let VR controllers point at scene
//! objects.
//!
//! ## How it works
//!
//! 1. **Controller to Ray**: Turn a controller pose into a world-space ray ([`Ray::from_pose`])
//! 2. **Ray-Volume Intersection**: Test the ray against each candidate's [`Bounds`]
//! 3. **Selection**: Keep the closest hit per ray ([`nearest_hit`]) and track
//!    enter/exit transitions across ticks ([`selection::SelectionTracker`])
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector3;
//! use stagecraft::gfx::picking::{nearest_hit, Bounds, Candidate, Ray, AABB};
//!
//! let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
//! let candidates = vec![Candidate::new(
//!     "crate",
//!     Bounds::Box(AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0))),
//! )];
//! if let Some(hit) = nearest_hit(&ray, &candidates) {
//!     println!("Pointing at {} ({} m)", hit.id, hit.distance);
//! }
//! ```

pub mod selection;

use std::sync::Arc;

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4, Zero};

/// Determinant below which a ray counts as parallel to a triangle
const TRIANGLE_EPSILON: f32 = 1e-7;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray cast from a controller pose along its local -Z axis
    pub fn from_pose(pose: &Matrix4<f32>) -> Self {
        let origin = pose * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let forward = pose * Vector4::new(0.0, 0.0, -1.0, 0.0);
        Self::new(
            Vector3::new(origin.x, origin.y, origin.z) / origin.w,
            forward.truncate(),
        )
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Anything a ray can be tested against
pub trait Intersect {
    /// Distance along the ray to the first hit, or None if the ray misses
    fn intersect_ray(&self, ray: &Ray) -> Option<f32>;
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::from(vertices[0]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::from(*vertex);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed_corners: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| {
                let t = matrix * corner.extend(1.0);
                [t.x / t.w, t.y / t.w, t.z / t.w]
            })
            .collect();

        Self::from_vertices(&transformed_corners)
    }
}

impl Intersect for AABB {
    /// Slab test. A ray starting inside the box reports the exit distance.
    /// An axis the ray runs parallel to only checks that the origin lies within
    /// that slab, so flat boxes and rays grazing a face stay well defined.
    fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if direction == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / direction;
            let t0 = (lo - origin) * inv_dir;
            let t1 = (hi - origin) * inv_dir;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vector3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Intersect for Sphere {
    fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction);
        let c = oc.magnitude2() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let (t0, t1) = (-b - root, -b + root);
        if t1 < 0.0 {
            None
        } else if t0 >= 0.0 {
            Some(t0)
        } else {
            Some(t1)
        }
    }
}

/// Single triangle, tested with Möller–Trumbore
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vector3<f32>,
    pub b: Vector3<f32>,
    pub c: Vector3<f32>,
}

impl Triangle {
    pub fn new(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Self {
        Self { a, b, c }
    }

    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let apply = |v: Vector3<f32>| {
            let t = matrix * v.extend(1.0);
            Vector3::new(t.x / t.w, t.y / t.w, t.z / t.w)
        };
        Self::new(apply(self.a), apply(self.b), apply(self.c))
    }
}

impl Intersect for Triangle {
    fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let p = ray.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - self.a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = ray.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > TRIANGLE_EPSILON).then_some(t)
    }
}

/// World-space pick volume of one candidate
#[derive(Debug, Clone)]
pub enum Bounds {
    Box(AABB),
    Sphere(Sphere),
    /// Exact triangles behind a box used as a broad-phase reject
    Mesh {
        aabb: AABB,
        triangles: Arc<[Triangle]>,
    },
}

impl Bounds {
    /// Exact mesh bounds from world-space triangles
    pub fn mesh(triangles: impl Into<Arc<[Triangle]>>) -> Self {
        let triangles = triangles.into();
        let corners: Vec<[f32; 3]> = triangles
            .iter()
            .flat_map(|t| [t.a, t.b, t.c].map(|v| [v.x, v.y, v.z]))
            .collect();
        Self::Mesh {
            aabb: AABB::from_vertices(&corners),
            triangles,
        }
    }
}

impl Intersect for Bounds {
    fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        match self {
            Bounds::Box(aabb) => aabb.intersect_ray(ray),
            Bounds::Sphere(sphere) => sphere.intersect_ray(ray),
            Bounds::Mesh { aabb, triangles } => {
                aabb.intersect_ray(ray)?;
                triangles
                    .iter()
                    .filter_map(|t| t.intersect_ray(ray))
                    .min_by(f32::total_cmp)
            }
        }
    }
}

/// One intersectable scene primitive
#[derive(Debug, Clone)]
pub struct Candidate<Id> {
    pub id: Id,
    pub bounds: Bounds,
}

impl<Id> Candidate<Id> {
    pub fn new(id: Id, bounds: Bounds) -> Self {
        Self { id, bounds }
    }
}

/// Result of an object picking operation
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult<Id> {
    /// Id of the picked candidate
    pub id: Id,
    /// Distance from ray origin to intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Closest candidate hit by `ray`, if any. Ties keep the earlier candidate.
pub fn nearest_hit<Id: Clone>(ray: &Ray, candidates: &[Candidate<Id>]) -> Option<PickResult<Id>> {
    let mut closest: Option<(&Candidate<Id>, f32)> = None;

    for candidate in candidates {
        if let Some(distance) = candidate.bounds.intersect_ray(ray) {
            if closest.map_or(true, |(_, best)| distance < best) {
                closest = Some((candidate, distance));
            }
        }
    }

    closest.map(|(candidate, distance)| PickResult {
        id: candidate.id.clone(),
        distance,
        intersection_point: ray.point_at(distance),
    })
}
