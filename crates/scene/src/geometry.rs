use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f32::consts::{FRAC_PI_4, PI, TAU};
use towerscape_common::Rgb;

/// Primitive topology of tessellated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Shape descriptions. Flat shapes lie in the XZ plane facing +Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Axis-aligned box centered on the origin.
    Box { size: Vec3 },
    Sphere { radius: f32, segments: u32, rings: u32 },
    Plane { width: f32, depth: f32 },
    Disc { radius: f32, segments: u32 },
    Ring { inner: f32, outer: f32, segments: u32 },
    /// Line segment between two points.
    Segment { a: Vec3, b: Vec3 },
    Triangle { points: [Vec3; 3] },
    Polyline { points: Vec<Vec3>, closed: bool },
    /// Flat X-shaped marker made of two crossed bars.
    Cross { size: f32, thickness: f32 },
    /// Cell boundary lines covering a `width` x `depth` area.
    GridLines { width: f32, depth: f32, cell: f32 },
}

/// Surface appearance of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Rgb,
    /// Linear emissive term added after lighting.
    pub emissive: Vec3,
    pub opacity: f32,
    /// Draw edges instead of faces.
    pub wireframe: bool,
    /// Whether the lighting rig shades this material.
    pub lit: bool,
}

impl Material {
    /// A shaded, opaque material.
    pub fn lit(color: Rgb) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            opacity: 1.0,
            wireframe: false,
            lit: true,
        }
    }

    /// Flat color, ignores lighting.
    pub fn unlit(color: Rgb) -> Self {
        Self {
            lit: false,
            ..Self::lit(color)
        }
    }

    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// CPU-side vertex data ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub topology: Option<Topology>,
}

impl MeshData {
    fn new(topology: Topology) -> Self {
        Self {
            topology: Some(topology),
            ..Self::default()
        }
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn topology(&self) -> Topology {
        self.topology.unwrap_or(Topology::Triangles)
    }

    /// Convert a triangle mesh into its unique edges.
    pub fn into_edges(self) -> Self {
        if self.topology() == Topology::Lines {
            return self;
        }
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        Self {
            positions: self.positions,
            normals: self.normals,
            indices: edges.into_iter().flat_map(|(a, b)| [a, b]).collect(),
            topology: Some(Topology::Lines),
        }
    }
}

impl Geometry {
    /// Sphere with the segment counts used for game bodies.
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            radius,
            segments: 16,
            rings: 12,
        }
    }

    pub fn cube(size: f32) -> Self {
        Self::Box {
            size: Vec3::splat(size),
        }
    }

    /// Short lowercase name of the shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Plane { .. } => "plane",
            Self::Disc { .. } => "disc",
            Self::Ring { .. } => "ring",
            Self::Segment { .. } => "segment",
            Self::Triangle { .. } => "triangle",
            Self::Polyline { .. } => "polyline",
            Self::Cross { .. } => "cross",
            Self::GridLines { .. } => "grid",
        }
    }

    /// Tessellate into vertex data. `wireframe` turns faces into edges.
    pub fn tessellate(&self, wireframe: bool) -> MeshData {
        let mesh = match self {
            Self::Box { size } => box_mesh(*size),
            Self::Sphere {
                radius,
                segments,
                rings,
            } => sphere_mesh(*radius, (*segments).max(3), (*rings).max(2)),
            Self::Plane { width, depth } => quad_mesh(
                [
                    Vec2::new(-width / 2.0, -depth / 2.0),
                    Vec2::new(width / 2.0, -depth / 2.0),
                    Vec2::new(width / 2.0, depth / 2.0),
                    Vec2::new(-width / 2.0, depth / 2.0),
                ],
                MeshData::new(Topology::Triangles),
            ),
            Self::Disc { radius, segments } => disc_mesh(*radius, (*segments).max(3)),
            Self::Ring {
                inner,
                outer,
                segments,
            } => ring_mesh(*inner, *outer, (*segments).max(3)),
            Self::Segment { a, b } => polyline_mesh(&[*a, *b], false),
            Self::Triangle { points } => triangle_mesh(points),
            Self::Polyline { points, closed } => polyline_mesh(points, *closed),
            Self::Cross { size, thickness } => cross_mesh(*size, *thickness),
            Self::GridLines { width, depth, cell } => grid_mesh(*width, *depth, *cell),
        };
        if wireframe { mesh.into_edges() } else { mesh }
    }
}

fn box_mesh(size: Vec3) -> MeshData {
    // (normal, u axis, v axis) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let half = size / 2.0;
    let mut mesh = MeshData::new(Topology::Triangles);
    for (normal, u, v) in FACES {
        let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let base = mesh.positions.len() as u32;
        for (cu, cv) in corners {
            mesh.push((n + u * cu + v * cv) * half, n);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

fn sphere_mesh(radius: f32, segments: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    for r in 0..=rings {
        let theta = r as f32 / rings as f32 * PI;
        for s in 0..=segments {
            let phi = s as f32 / segments as f32 * TAU;
            let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.push(normal * radius, normal);
        }
    }
    let stride = segments + 1;
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            mesh.indices
                .extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    mesh
}

fn quad_mesh(corners: [Vec2; 4], mut mesh: MeshData) -> MeshData {
    let base = mesh.positions.len() as u32;
    for c in corners {
        mesh.push(Vec3::new(c.x, 0.0, c.y), Vec3::Y);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    mesh
}

fn disc_mesh(radius: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    let center = mesh.push(Vec3::ZERO, Vec3::Y);
    for s in 0..segments {
        let phi = s as f32 / segments as f32 * TAU;
        mesh.push(Vec3::new(phi.cos(), 0.0, phi.sin()) * radius, Vec3::Y);
    }
    for s in 0..segments {
        let next = (s + 1) % segments;
        mesh.indices
            .extend_from_slice(&[center, center + 1 + s, center + 1 + next]);
    }
    mesh
}

fn ring_mesh(inner: f32, outer: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    for s in 0..segments {
        let phi = s as f32 / segments as f32 * TAU;
        let dir = Vec3::new(phi.cos(), 0.0, phi.sin());
        mesh.push(dir * inner, Vec3::Y);
        mesh.push(dir * outer, Vec3::Y);
    }
    for s in 0..segments {
        let i0 = s * 2;
        let i1 = ((s + 1) % segments) * 2;
        mesh.indices
            .extend_from_slice(&[i0, i0 + 1, i1 + 1, i1 + 1, i1, i0]);
    }
    mesh
}

fn triangle_mesh(points: &[Vec3; 3]) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    let mut normal = (points[1] - points[0])
        .cross(points[2] - points[0])
        .normalize_or(Vec3::Y);
    if normal.y < 0.0 {
        normal = -normal;
    }
    for p in points {
        mesh.push(*p, normal);
    }
    mesh.indices.extend_from_slice(&[0, 1, 2]);
    mesh
}

fn polyline_mesh(points: &[Vec3], closed: bool) -> MeshData {
    let mut mesh = MeshData::new(Topology::Lines);
    for p in points {
        mesh.push(*p, Vec3::Y);
    }
    let n = points.len() as u32;
    if n < 2 {
        return mesh;
    }
    for i in 0..n - 1 {
        mesh.indices.extend_from_slice(&[i, i + 1]);
    }
    if closed && n > 2 {
        mesh.indices.extend_from_slice(&[n - 1, 0]);
    }
    mesh
}

fn cross_mesh(size: f32, thickness: f32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    let (half_len, half_w) = (size / 2.0, thickness / 2.0);
    for angle in [FRAC_PI_4, -FRAC_PI_4] {
        let along = Vec2::from_angle(angle);
        let across = along.perp();
        let corners = [
            -along * half_len - across * half_w,
            along * half_len - across * half_w,
            along * half_len + across * half_w,
            -along * half_len + across * half_w,
        ];
        mesh = quad_mesh(corners, mesh);
    }
    mesh
}

fn grid_mesh(width: f32, depth: f32, cell: f32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Lines);
    if !(cell > 0.0) {
        return mesh;
    }
    let (hw, hd) = (width / 2.0, depth / 2.0);
    let columns = (width / cell).round() as u32;
    let rows = (depth / cell).round() as u32;
    for i in 0..=columns {
        let x = -hw + i as f32 * cell;
        let a = mesh.push(Vec3::new(x, 0.0, -hd), Vec3::Y);
        let b = mesh.push(Vec3::new(x, 0.0, hd), Vec3::Y);
        mesh.indices.extend_from_slice(&[a, b]);
    }
    for j in 0..=rows {
        let z = -hd + j as f32 * cell;
        let a = mesh.push(Vec3::new(-hw, 0.0, z), Vec3::Y);
        let b = mesh.push(Vec3::new(hw, 0.0, z), Vec3::Y);
        mesh.indices.extend_from_slice(&[a, b]);
    }
    mesh
}
