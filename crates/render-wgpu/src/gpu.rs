use crate::cache::{MeshCache, MeshKey};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use towerscape_common::Rgb;
use towerscape_render::{IsometricCamera, Renderer};
use towerscape_scene::{
    GeometryId, LightingRig, Material, MeshData, Node, Scene, Topology,
};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    /// Hemisphere sky color; `w` carries the hemisphere intensity.
    sky: [f32; 4],
    ground: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, rig: &LightingRig) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            ambient: rig.ambient_term().extend(1.0).to_array(),
            sky: rig
                .hemisphere
                .sky
                .to_vec3()
                .extend(rig.hemisphere.intensity)
                .to_array(),
            ground: rig.hemisphere.ground.to_vec3().extend(1.0).to_array(),
            sun_dir: rig.sun.direction_to_light().extend(0.0).to_array(),
            sun_color: rig.sun_term().extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    /// `w` is 1.0 for lit materials.
    emissive: [f32; 4],
}

impl InstanceData {
    fn new(node: &Node, material: &Material) -> Self {
        let cols = node.transform.matrix().to_cols_array_2d();
        let lit = if material.lit { 1.0 } else { 0.0 };
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: material.color.to_vec3().extend(material.opacity).to_array(),
            emissive: material.emissive.extend(lit).to_array(),
        }
    }
}

/// Draw pass a node belongs to. Passes are drawn in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pass {
    Opaque,
    Lines,
    Transparent,
}

fn pass_for(topology: Topology, material: &Material) -> Pass {
    match topology {
        Topology::Lines => Pass::Lines,
        Topology::Triangles if material.is_transparent() => Pass::Transparent,
        Topology::Triangles => Pass::Opaque,
    }
}

/// Vertex and index buffers for one tessellated geometry.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    topology: Topology,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, id: GeometryId, mesh: &MeshData) -> Self {
        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(position, normal)| Vertex {
                position: *position,
                normal: *normal,
            })
            .collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("geometry_{}_vertices", id.0)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("geometry_{}_indices", id.0)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            topology: mesh.topology(),
        }
    }

    fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Counters for one submitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub uploaded: u32,
    pub freed: u32,
    /// Visible nodes dropped because the instance buffer was full.
    pub skipped: u32,
}

/// wgpu scene renderer.
///
/// Geometry is uploaded once per (geometry, wireframe) pair and cached until
/// the scene reports it released.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: MeshCache<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub const MAX_INSTANCES: u32 = 16_384;

    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(Mat4::IDENTITY, &LightingRig::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = |label, topology, depth_write| {
            create_pipeline(
                device,
                &pipeline_layout,
                &shader,
                surface_format,
                label,
                topology,
                depth_write,
            )
        };
        let opaque_pipeline = pipeline("opaque_pipeline", wgpu::PrimitiveTopology::TriangleList, true);
        let transparent_pipeline =
            pipeline("transparent_pipeline", wgpu::PrimitiveTopology::TriangleList, false);
        let line_pipeline = pipeline("line_pipeline", wgpu::PrimitiveTopology::LineList, false);

        let max_instances = Self::MAX_INSTANCES;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: MeshCache::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Geometries currently resident on the GPU.
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Bind this renderer to a device, queue and target for one frame.
    pub fn frame<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        view: &'a wgpu::TextureView,
    ) -> WgpuFrame<'a> {
        WgpuFrame {
            renderer: self,
            device,
            queue,
            view,
        }
    }

    /// Free buffers for geometries the scene has released.
    fn free_released(&mut self, scene: &mut Scene) -> u32 {
        let mut evicted = self.meshes.evict_released(&scene.drain_released());
        if scene.take_released_overflow() {
            evicted.extend(self.meshes.evict_dead(|id| scene.geometry(id).is_some()));
        }
        let freed = evicted.len() as u32;
        for mesh in evicted {
            mesh.destroy();
        }
        freed
    }

    fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &mut Scene,
        camera: &IsometricCamera,
    ) -> FrameStats {
        let mut stats = FrameStats {
            freed: self.free_released(scene),
            ..FrameStats::default()
        };

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(camera.view_projection(), &scene.lighting)),
        );

        // (pass, mesh key, instance index)
        let mut draws: Vec<(Pass, MeshKey, u32)> = Vec::new();
        let mut instances: Vec<InstanceData> = Vec::new();
        for (_, node) in scene.visible_nodes() {
            let (Some(geometry), Some(material)) =
                (scene.geometry(node.geometry), scene.material(node.material))
            else {
                continue;
            };
            if instances.len() >= self.max_instances as usize {
                stats.skipped += 1;
                continue;
            }
            let key = (node.geometry, material.wireframe);
            if !self.meshes.contains(&key) {
                let mesh = geometry.tessellate(material.wireframe);
                if mesh.index_count() == 0 {
                    continue;
                }
                self.meshes
                    .insert(key, GpuMesh::upload(device, node.geometry, &mesh));
                stats.uploaded += 1;
            }
            let Some(mesh) = self.meshes.get(&key) else {
                continue;
            };
            draws.push((pass_for(mesh.topology, material), key, instances.len() as u32));
            instances.push(InstanceData::new(node, material));
        }
        if stats.skipped > 0 {
            tracing::warn!(
                "instance buffer full: {} visible nodes not drawn",
                stats.skipped
            );
        }
        // stable: draw order within a pass follows node order
        draws.sort_by_key(|(pass, _, _)| *pass);

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            let mut current = None;
            for (kind, key, instance) in &draws {
                let Some(mesh) = self.meshes.get(key) else {
                    continue;
                };
                if current != Some(*kind) {
                    pass.set_pipeline(match kind {
                        Pass::Opaque => &self.opaque_pipeline,
                        Pass::Lines => &self.line_pipeline,
                        Pass::Transparent => &self.transparent_pipeline,
                    });
                    current = Some(*kind);
                }
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, *instance..instance + 1);
                stats.draw_calls += 1;
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn clear_color(background: Rgb) -> wgpu::Color {
    let [r, g, b] = background.to_array();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                        7 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            // Flat primitives are seen from either side.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// A [`WgpuRenderer`] bound to one frame's device, queue and target view.
pub struct WgpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a wgpu::TextureView,
}

impl Renderer for WgpuFrame<'_> {
    type Output = FrameStats;

    fn render(&mut self, scene: &mut Scene, camera: &IsometricCamera) -> FrameStats {
        self.renderer
            .draw(self.device, self.queue, self.view, scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use towerscape_common::Transform;
    use towerscape_scene::{Geometry, MaterialId};

    fn node(position: Vec3) -> Node {
        Node {
            geometry: GeometryId(1),
            material: MaterialId(2),
            transform: Transform::from_position(position),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            label: None,
        }
    }

    #[test]
    fn instance_carries_translation_and_lit_flag() {
        let material = Material::lit(Rgb::new(255, 0, 0)).with_emissive(Vec3::new(0.25, 0.0, 0.0));
        let data = InstanceData::new(&node(Vec3::new(1.0, 2.0, 3.0)), &material);
        assert_eq!(data.model_3, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(data.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(data.emissive, [0.25, 0.0, 0.0, 1.0]);

        let flat = InstanceData::new(&node(Vec3::ZERO), &Material::unlit(Rgb::WHITE).with_opacity(0.5));
        assert_eq!(flat.emissive[3], 0.0);
        assert_eq!(flat.color[3], 0.5);
    }

    #[test]
    fn passes_order_opaque_lines_transparent() {
        let solid = Material::lit(Rgb::WHITE);
        let glass = Material::lit(Rgb::WHITE).with_opacity(0.6);
        assert_eq!(pass_for(Topology::Triangles, &solid), Pass::Opaque);
        assert_eq!(pass_for(Topology::Triangles, &glass), Pass::Transparent);
        assert_eq!(pass_for(Topology::Lines, &glass), Pass::Lines);
        assert!(Pass::Opaque < Pass::Lines && Pass::Lines < Pass::Transparent);
    }

    #[test]
    fn wireframe_sphere_draws_as_lines() {
        let mesh = Geometry::sphere(10.0).tessellate(true);
        assert_eq!(pass_for(mesh.topology(), &Material::lit(Rgb::WHITE)), Pass::Lines);
    }

    #[test]
    fn uniforms_follow_rig() {
        let rig = LightingRig::default();
        let u = Uniforms::new(Mat4::IDENTITY, &rig);
        assert_eq!(u.sky[3], rig.hemisphere.intensity);
        assert!((u.ambient[0] - 0.55).abs() < 1e-6);
        assert!(u.sun_dir[1] > 0.0);
        assert_eq!(u.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn clear_color_is_background() {
        let c = clear_color(Rgb::new(255, 0, 51));
        assert_eq!((c.r, c.g, c.a), (1.0, 0.0, 1.0));
        assert!((c.b - 0.2).abs() < 1e-6);
    }
}
