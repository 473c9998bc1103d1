use std::time::Duration;

use anyhow::{Context, Result};
use trigon_engine::core::{App, AppControl, FrameCtx, InitCtx};
use trigon_engine::device::GpuInit;
use trigon_engine::paint::Color;
use trigon_engine::render::{ShaderProgram, Vertex, VertexBuffer};
use trigon_engine::time::DEFAULT_FRAME_INTERVAL;
use trigon_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::triangle;

/// Window and frame settings for the demo.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    pub frame_interval: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "OpenGL Demo".to_string(),
            width: 800,
            height: 600,
            clear_color: Color::rgb(0.2, 0.3, 0.3),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl DemoConfig {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width as f64, self.height as f64),
            frame_interval: self.frame_interval,
            ..RuntimeConfig::default()
        }
    }

    /// Double-buffered FIFO swapchain, colors written without sRGB encoding.
    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            ..GpuInit::default()
        }
    }
}

/// Escape closes the demo, on press only.
fn is_close_key(key: PhysicalKey, state: ElementState) -> bool {
    key == PhysicalKey::Code(KeyCode::Escape) && state == ElementState::Pressed
}

/// GPU objects built once at startup and used for every frame.
struct Resources {
    program: ShaderProgram,
    vertices: VertexBuffer,
}

/// Opens a window and draws one triangle every frame until it is closed.
pub struct DemoApp {
    config: DemoConfig,
    resources: Option<Resources>,
}

impl DemoApp {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            resources: None,
        }
    }

    /// Opens the window, builds the program and buffer, and runs the frame
    /// loop. Returns after the window is closed, or with the first
    /// initialization error.
    pub fn run(self) -> Result<()> {
        let runtime = self.config.runtime_config();
        let gpu_init = self.config.gpu_init();
        Runtime::run(runtime, gpu_init, self)
    }

    fn build_shader_program(ctx: &InitCtx<'_>) -> Result<ShaderProgram> {
        ShaderProgram::new(
            ctx.device,
            ctx.surface_format,
            &triangle::vertex_shader(),
            &triangle::fragment_shader(),
            &[Vertex::layout()],
        )
        .context("failed to build triangle shader program")
    }

    fn build_vertex_buffer(ctx: &InitCtx<'_>) -> Result<VertexBuffer> {
        VertexBuffer::new(ctx.device, "triangle vertices", &triangle::TRIANGLE)
    }
}

impl App for DemoApp {
    fn on_init(&mut self, ctx: &InitCtx<'_>) -> Result<()> {
        let program = Self::build_shader_program(ctx)?;
        let vertices = Self::build_vertex_buffer(ctx)?;

        log::info!(
            "demo ready: {} vertices, {}x{} surface, clear color {:?}",
            vertices.vertex_count(),
            ctx.size.width,
            ctx.size.height,
            self.config.clear_color
        );

        self.resources = Some(Resources { program, vertices });
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if is_close_key(event.physical_key, event.state) =>
            {
                log::info!("escape pressed");
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(res) = self.resources.as_ref() else {
            log::error!("frame requested before initialization");
            return AppControl::Exit;
        };

        ctx.render(self.config.clear_color, |pass| {
            res.program.bind(pass);
            res.vertices.bind(pass, 0);
            res.vertices.draw(pass);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_demo_window() {
        let cfg = DemoConfig::default();
        assert_eq!(cfg.title, "OpenGL Demo");
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert_eq!(cfg.clear_color, Color::rgba(0.2, 0.3, 0.3, 1.0));
        assert_eq!(cfg.frame_interval, Duration::from_millis(10));
    }

    #[test]
    fn runtime_config_carries_title_size_and_pacing() {
        let cfg = DemoConfig {
            title: "tri".into(),
            width: 320,
            height: 240,
            frame_interval: Duration::from_millis(16),
            ..DemoConfig::default()
        };
        let rt = cfg.runtime_config();
        assert_eq!(rt.title, "tri");
        assert_eq!(rt.initial_size, LogicalSize::new(320.0, 240.0));
        assert_eq!(rt.frame_interval, Duration::from_millis(16));
    }

    #[test]
    fn gpu_init_is_double_buffered_linear() {
        let init = DemoConfig::default().gpu_init();
        assert!(!init.prefer_srgb);
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
    }

    #[test]
    fn escape_press_closes() {
        let esc = PhysicalKey::Code(KeyCode::Escape);
        assert!(is_close_key(esc, ElementState::Pressed));
        assert!(!is_close_key(esc, ElementState::Released));
        assert!(!is_close_key(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed));
    }

    #[test]
    fn unrelated_window_events_continue() {
        let mut app = DemoApp::new(DemoConfig::default());
        assert_eq!(app.on_window_event(&WindowEvent::Focused(true)), AppControl::Continue);
        assert_eq!(app.on_window_event(&WindowEvent::CloseRequested), AppControl::Continue);
    }
}
