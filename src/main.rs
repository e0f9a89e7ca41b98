use std::fs;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use grid_raycaster::config::EngineConfig;
use grid_raycaster::input::FrameInput;
use grid_raycaster::map::{DEFAULT_LAYOUT, GridMap};
use grid_raycaster::renderer::{self, Palette};
use grid_raycaster::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut};
use grid_raycaster::session::Session;

const WINDOW_TITLE: &str = "Grid Raycaster";

/// First-person raycaster over a tile maze.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML file overriding engine tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text map: one row per line, 0 = open, 1 = wall
    #[arg(long)]
    map: Option<PathBuf>,

    /// Project straight-line ray lengths instead of perpendicular distance
    #[arg(long)]
    no_fisheye: bool,
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    session: Session,
    palette: Palette,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal buffer, one column per ray
    fb_small: Vec<u32>,
    fb_w: usize,
    fb_h: usize,

    scale_lut: ScaleLut,

    // Input and pacing
    input: FrameInput,
    frame_interval: Duration,
    next_frame: Instant,
}

impl App {
    fn new(config: &EngineConfig, session: Session) -> Self {
        Self {
            window: None,
            surface: None,
            session,
            palette: Palette::default(),

            frame_counter: 0,
            last_fps_print: Instant::now(),

            fb_small: vec![0; config.screen_width * config.screen_height],
            fb_w: config.screen_width,
            fb_h: config.screen_height,

            scale_lut: ScaleLut::empty(),

            input: FrameInput::default(),
            frame_interval: Duration::from_secs_f64(1.0 / config.target_fps as f64),
            next_frame: Instant::now(),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(self.fb_w as f64, self.fb_h as f64));

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        // SoftBufferError is not Send + Sync, so it is flattened into the message
        let context = softbuffer::Context::new(window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer context: {err}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer surface: {err}"))?;

        // Capture the pointer for mouse look
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(err) = grabbed {
            log::warn!("could not grab cursor: {err}");
        }
        window.set_cursor_visible(false);

        let size = window.inner_size();
        self.scale_lut =
            build_scale_lut(size.width as usize, size.height as usize, self.fb_w, self.fb_h);

        self.surface = Some(surface);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, id: WindowId) -> anyhow::Result<()> {
        let window = match &self.window {
            Some(w) if w.id() == id => w.clone(),
            _ => return Ok(()),
        };
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        if self.scale_lut.dst_size() != (dw.get() as usize, dh.get() as usize) {
            self.scale_lut = build_scale_lut(dw.get() as usize, dh.get() as usize, self.fb_w, self.fb_h);
        }

        surface
            .resize(dw, dh)
            .map_err(|err| anyhow!("failed to resize surface: {err}"))?;

        let frame = self.input.take_frame();
        let columns = self.session.step(&frame);
        renderer::render_frame(&mut self.fb_small, self.fb_w, self.fb_h, columns, &self.palette);

        let mut buf = surface
            .buffer_mut()
            .map_err(|err| anyhow!("failed to acquire buffer: {err}"))?;
        blit_nearest_stretch(&mut buf, dw.get() as usize, &self.fb_small, self.fb_w, &self.scale_lut);
        buf.present()
            .map_err(|err| anyhow!("failed to present frame: {err}"))?;

        self.report_fps(&window);
        Ok(())
    }

    fn report_fps(&mut self, window: &Window) {
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_counter as f32 / elapsed;
            let pose = self.session.pose();
            log::info!(
                "FPS: {:.1} pos=({:.1}, {:.1}) heading={:.3}",
                fps,
                pose.pos[0],
                pose.pos[1],
                pose.heading
            );
            window.set_title(&format!("{WINDOW_TITLE} - FPS: {fps:.0}"));
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }
}

impl ApplicationHandler for App {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame += self.frame_interval;
            let now = Instant::now();
            if self.next_frame < now {
                // Fell behind; don't try to catch up with a burst of frames
                self.next_frame = now + self.frame_interval;
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            log::error!("{err:#}");
            event_loop.exit();
            return;
        }
        self.next_frame = Instant::now() + self.frame_interval;
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if code == KeyCode::Escape && pressed {
                    log::info!("escape pressed; stopping");
                    event_loop.exit();
                    return;
                }
                self.input.intents.set_key(code, pressed);
            }

            WindowEvent::Focused(false) => {
                // Keys released while unfocused never reach us
                self.input = FrameInput::default();
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(id) {
                    log::error!("{err:#}");
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(new_size) => {
                log::debug!("resized to {}x{}", new_size.width, new_size.height);
                self.scale_lut = build_scale_lut(
                    new_size.width as usize,
                    new_size.height as usize,
                    self.fb_w,
                    self.fb_h,
                );
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, _) } = event {
            self.input.accumulate_pointer(dx);
        }
    }
}

fn load_map(path: Option<&PathBuf>, tile_size: f32) -> anyhow::Result<GridMap> {
    let layout = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read map {}", path.display()))?,
        None => DEFAULT_LAYOUT.to_owned(),
    };
    let map = GridMap::parse(&layout, tile_size).context("failed to parse map layout")?;
    Ok(map)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.no_fisheye {
        config.fisheye_correction = false;
    }

    let map = load_map(args.map.as_ref(), config.tile_size)?;
    let session = Session::new(&config, map).context("failed to start session")?;
    log::info!(
        "{}x{} view, fov {:.1} deg, {}x{} map, fisheye correction {}",
        config.screen_width,
        config.screen_height,
        config.fov.to_degrees(),
        session.map().cols(),
        session.map().rows(),
        if config.fisheye_correction { "on" } else { "off" }
    );
    log::info!("WASD: move   Mouse: look   ESC: quit");

    let mut app = App::new(&config, session);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut app)
        .context("event loop failed")?;
    Ok(())
}
