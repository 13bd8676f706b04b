mod panel;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use smoke_assets::AssetPaths;
use smoke_common::{BufferSize, DEFAULT_MAX_PIXEL_RATIO, Viewport};
use smoke_input::{PointerButton, PointerEvent, PointerTracker};
use smoke_render_wgpu::{FrameStats, FrameTarget, WgpuRenderer};
use smoke_sketch::{Clock, Sketch, SystemClock};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "smoke-desktop", about = "Coffee smoke sketch")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding bakedModel.glb and perlin.png
    #[arg(long, default_value = "./static")]
    assets: PathBuf,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Upper bound on the device pixel ratio used for the draw buffer
    #[arg(long, default_value_t = DEFAULT_MAX_PIXEL_RATIO)]
    max_pixel_ratio: f64,
}

/// Everything that needs a live window and device.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(window: Arc<Window>, egui_ctx: &EguiContext, buffer: BufferSize) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("smoke_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
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

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, surface_format, buffer);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>, buffer: BufferSize) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, buffer);
    }

    /// Draw egui on top of the already presented-to `view`.
    fn paint_ui(
        &mut self,
        egui_ctx: &EguiContext,
        view: &wgpu::TextureView,
        full_output: egui::FullOutput,
    ) {
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct SmokeApp {
    sketch: Sketch,
    clock: SystemClock,
    pointer: PointerTracker,
    window_size: LogicalSize<u32>,
    max_pixel_ratio: f64,
    show_panel: bool,
    last_stats: FrameStats,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl SmokeApp {
    fn new(cli: &Cli) -> Self {
        let viewport = Viewport::new(f64::from(cli.width), f64::from(cli.height), 1.0)
            .with_max_pixel_ratio(cli.max_pixel_ratio);
        let mut sketch = Sketch::new(viewport);
        sketch.load_assets(&AssetPaths::new(&cli.assets));

        Self {
            sketch,
            clock: SystemClock::new(),
            pointer: PointerTracker::new(),
            window_size: LogicalSize::new(cli.width, cli.height),
            max_pixel_ratio: cli.max_pixel_ratio,
            show_panel: true,
            last_stats: FrameStats::default(),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }

    fn viewport_for(&self, window: &Window) -> Viewport {
        let size = window.inner_size();
        Viewport::from_physical(size.width, size.height, window.scale_factor())
            .with_max_pixel_ratio(self.max_pixel_ratio)
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let viewport = Viewport::from_physical(size.width, size.height, gpu.window.scale_factor())
            .with_max_pixel_ratio(self.max_pixel_ratio);
        let buffer = self.sketch.resize(viewport);
        gpu.resize(size, buffer);
    }

    fn redraw(&mut self) {
        self.sketch.poll_assets();
        let elapsed = self.clock.elapsed_seconds();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
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

        self.last_stats = self.sketch.frame(
            elapsed,
            &mut FrameTarget {
                renderer: &mut gpu.renderer,
                device: &gpu.device,
                queue: &gpu.queue,
                view: &view,
            },
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let show_panel = self.show_panel;
        let stats = self.last_stats;
        let sketch = &mut self.sketch;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_panel {
                panel::draw(ctx, sketch, &stats);
            }
        });
        gpu.paint_ui(&self.egui_ctx, &view, full_output);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for SmokeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Coffee Smoke")
            .with_inner_size(self.window_size);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let viewport = self.viewport_for(&window);
        let buffer = self.sketch.resize(viewport);

        match Gpu::new(window, &self.egui_ctx, buffer) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
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
        let mut over_ui = false;
        let mut scale = 1.0;
        if let Some(gpu) = &mut self.gpu {
            over_ui = gpu.egui_winit.on_window_event(&gpu.window, &event).consumed;
            scale = gpu.window.scale_factor();
        }

        if let Some(pointer) = pointer_event(&event, scale) {
            if let Some(action) = self.pointer.handle(pointer, over_ui) {
                self.sketch.orbit(action);
            }
            return;
        }
        if over_ui {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyH),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.show_panel = !self.show_panel;
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

/// Translate the pointer subset of window events.
fn pointer_event(event: &WindowEvent, scale: f64) -> Option<PointerEvent> {
    match event {
        WindowEvent::MouseInput { button, state, .. } => {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                MouseButton::Middle => PointerButton::Middle,
                _ => return None,
            };
            Some(PointerEvent::Button {
                button,
                pressed: *state == ElementState::Pressed,
            })
        }
        WindowEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f32>(scale);
            Some(PointerEvent::Moved {
                x: logical.x,
                y: logical.y,
            })
        }
        WindowEvent::CursorLeft { .. } => Some(PointerEvent::Left),
        WindowEvent::MouseWheel { delta, .. } => {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(p) => p.y as f32,
            };
            Some(PointerEvent::Wheel(lines))
        }
        _ => None,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(assets = %cli.assets.display(), "smoke-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SmokeApp::new(&cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
