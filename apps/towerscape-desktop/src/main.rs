mod game;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use game::{DemoGame, TOWER_KINDS};
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use towerscape_adapter::{Host, SceneAdapter};
use towerscape_common::{SceneConfig, ScreenRect};
use towerscape_input::{InputEvent, TouchPoint};
use towerscape_render_wgpu::{FrameStats, WgpuRenderer};
use towerscape_tools::SceneInspector;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    ElementState, KeyEvent, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "towerscape-desktop", about = "Towerscape desktop host")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// The window's client area, in CSS pixels, as the adapter's container.
struct WindowHost {
    container_id: String,
    rect: ScreenRect,
    scale: f32,
}

impl Host for WindowHost {
    fn container_rect(&self, id: &str) -> Option<ScreenRect> {
        (id == self.container_id).then_some(self.rect)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.scale
    }
}

fn css_rect(size: PhysicalSize<u32>, scale: f32) -> ScreenRect {
    ScreenRect::new(
        0.0,
        0.0,
        size.width as f32 / scale,
        size.height as f32 / scale,
    )
}

/// Everything that exists once the window is up.
struct Session {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    adapter: SceneAdapter,
    scale: f32,
}

impl Session {
    fn new(event_loop: &ActiveEventLoop, config: SceneConfig, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Towerscape")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let gpu = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(gpu.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("towerscape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&gpu);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let scale = window.scale_factor() as f32;
        let host = WindowHost {
            container_id: config.container_id.clone(),
            rect: css_rect(size, scale),
            scale,
        };
        let adapter = SceneAdapter::initialize(&host, config)?;

        let renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            gpu.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            renderer,
            egui_winit,
            egui_renderer,
            adapter,
            scale,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface_config.width = size.width.max(1);
        self.surface_config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.renderer
            .resize(&self.device, self.surface_config.width, self.surface_config.height);
    }
}

struct App {
    config: SceneConfig,
    game: DemoGame,
    session: Option<Session>,
    egui_ctx: EguiContext,
    cursor: Option<Vec2>,
    orbiting: bool,
    show_inspector: bool,
    last_frame: Instant,
    last_stats: FrameStats,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(mut config: SceneConfig) -> Self {
        for kind in &TOWER_KINDS {
            config
                .tower_accents
                .entry(kind.name.to_string())
                .or_insert(kind.color);
        }
        let game = DemoGame::new(config.logical_size, config.cell_size);
        Self {
            config,
            game,
            session: None,
            egui_ctx: EguiContext::default(),
            cursor: None,
            orbiting: false,
            show_inspector: true,
            last_frame: Instant::now(),
            last_stats: FrameStats::default(),
            error: None,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Digit1 => self.game.select(Some(0)),
            KeyCode::Digit2 => self.game.select(Some(1)),
            KeyCode::Digit3 => self.game.select(Some(2)),
            KeyCode::Escape => self.game.select(None),
            KeyCode::F1 => self.show_inspector = !self.show_inspector,
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.game.update(dt);

        let Some(session) = &mut self.session else {
            return;
        };

        session
            .adapter
            .set_selected_tower_type(self.game.selected().map(|k| k.name));
        session.adapter.clear();
        self.game.draw(&mut session.adapter);

        let output = match session.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                session
                    .surface
                    .configure(&session.device, &session.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.last_stats = session.adapter.render(&mut session.renderer.frame(
            &session.device,
            &session.queue,
            &view,
        ));

        let raw_input = session.egui_winit.take_egui_input(&session.window);
        let adapter = &session.adapter;
        let game = &mut self.game;
        let show_inspector = self.show_inspector;
        let stats = self.last_stats;
        let cached = session.renderer.cached_meshes();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_overlay(ctx, adapter);
            if show_inspector {
                draw_inspector(ctx, adapter, game, stats, cached);
            }
        });

        session
            .egui_winit
            .handle_platform_output(&session.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [session.surface_config.width, session.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            session
                .egui_renderer
                .update_texture(&session.device, &session.queue, *id, image_delta);
        }
        let mut encoder = session
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        session.egui_renderer.update_buffers(
            &session.device,
            &session.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            session
                .egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        session.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            session.egui_renderer.free_texture(id);
        }

        output.present();
        session.window.request_redraw();
    }
}

/// Paint the adapter's text labels. egui points are CSS pixels here.
fn paint_overlay(ctx: &EguiContext, adapter: &SceneAdapter) {
    let Some(overlay) = adapter.overlay() else {
        return;
    };
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Middle,
        egui::Id::new("text_overlay"),
    ));
    for label in overlay.labels() {
        painter.text(
            egui::pos2(label.position.x, label.position.y),
            egui::Align2::CENTER_CENTER,
            &label.text,
            egui::FontId::proportional(label.size),
            egui::Color32::from_rgb(label.color.r, label.color.g, label.color.b),
        );
    }
}

fn draw_inspector(
    ctx: &EguiContext,
    adapter: &SceneAdapter,
    game: &mut DemoGame,
    stats: FrameStats,
    cached_meshes: usize,
) {
    let summary = SceneInspector::summary(adapter.scene());

    egui::SidePanel::left("inspector")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Towerscape");
            ui.separator();
            ui.label(format!(
                "Gold: {}  Lives: {}  Kills: {}",
                game.gold, game.lives, game.kills
            ));
            ui.label(format!(
                "Towers: {}  Enemies: {}",
                game.tower_count(),
                game.enemy_count()
            ));
            let hover = adapter.hover_position();
            if hover.is_none() {
                ui.label("Hover: none");
            } else {
                ui.label(format!("Hover: ({}, {})", hover.x, hover.y));
            }
            ui.separator();

            ui.heading("Towers");
            let selected = game.selected().map(|k| k.name);
            for (index, kind) in TOWER_KINDS.iter().enumerate() {
                let text = format!("{} {} ({}g)", index + 1, kind.name, kind.cost);
                if ui
                    .selectable_label(selected == Some(kind.name), text)
                    .clicked()
                {
                    game.select(Some(index));
                }
            }
            if ui.button("Deselect (Esc)").clicked() {
                game.select(None);
            }

            ui.separator();
            ui.heading("Scene");
            ui.label(format!("Nodes: {} ({} visible)", summary.nodes, summary.visible));
            ui.label(format!(
                "Geometries: {}  Materials: {}",
                summary.geometries, summary.materials
            ));
            ui.label(format!(
                "Allocated: {}  Released: {}",
                summary.allocated_total, summary.released_total
            ));
            ui.label(format!(
                "GPU meshes: {}  Draw calls: {}",
                cached_meshes, stats.draw_calls
            ));
            let camera = adapter.camera();
            ui.label(format!(
                "Zoom: {:.2}  View: {:.0}",
                camera.zoom, camera.view_extent
            ));
            let (w, h) = adapter.surface_size();
            ui.label(format!(
                "Surface: {w}x{h} @ {:.2}",
                adapter.pixel_ratio()
            ));

            ui.separator();
            ui.small("1-3: Pick tower | LMB: Build | RMB drag: Orbit | Wheel: Zoom | F1: Inspector");
        });
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        match Session::new(event_loop, self.config.clone(), &self.egui_ctx) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                tracing::error!("failed to start: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = &mut self.session else {
            return;
        };
        let response = session.egui_winit.on_window_event(&session.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                session.scale = scale_factor as f32;
            }
            WindowEvent::Resized(new_size) => {
                session.resize(new_size);
                let resize = InputEvent::Resize {
                    rect: css_rect(new_size, session.scale),
                    pixel_ratio: session.scale,
                };
                session.adapter.handle(&resize, &mut self.game);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let css = Vec2::new(position.x as f32, position.y as f32) / session.scale;
                if self.orbiting {
                    if let Some(last) = self.cursor {
                        let delta = css - last;
                        let height = session.adapter.viewport().height;
                        let (_, controls) = session.adapter.camera_controls();
                        controls.rotate(delta.x, delta.y, height);
                    }
                }
                self.cursor = Some(css);
                session
                    .adapter
                    .handle(&InputEvent::PointerMove(css), &mut self.game);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                session
                    .adapter
                    .handle(&InputEvent::PointerLeave, &mut self.game);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Released,
                ..
            } => {
                if let Some(css) = self.cursor {
                    session.adapter.handle(&InputEvent::Click(css), &mut self.game);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.orbiting = state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                let (camera, controls) = session.adapter.camera_controls();
                controls.zoom(camera, 1.1_f32.powf(steps));
            }
            WindowEvent::Touch(Touch {
                phase,
                location,
                id,
                ..
            }) => {
                let position = Vec2::new(location.x as f32, location.y as f32) / session.scale;
                let event = match phase {
                    TouchPhase::Started | TouchPhase::Moved => {
                        InputEvent::TouchMove(vec![TouchPoint { id, position }])
                    }
                    TouchPhase::Ended => InputEvent::TouchEnd,
                    TouchPhase::Cancelled => InputEvent::PointerLeave,
                };
                session.adapter.handle(&event, &mut self.game);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.handle_key(key);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = &self.session {
            session.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    tracing::info!("towerscape-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
