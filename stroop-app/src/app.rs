use crate::bridge::{
    ChannelKeys, InputEvent, KeyAction, UserEvent, WindowPresenter, translate_key,
};
use anyhow::{Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use stroop_core::Screen;
use stroop_experiment::{Session, SessionPlan, SessionReport, StroopConfig};
use stroop_render::SkiaRenderer;
use stroop_timing::{HighPrecisionTimer, Timer};
use tracing::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

/// Window side of the experiment: draws whatever screen the session
/// thread last sent, stamps key presses, and acknowledges each flip.
pub struct App {
    config: StroopConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    screen: Screen,
    flip_pending: bool,
    timer: HighPrecisionTimer,
    flips: Sender<u64>,
    input: Sender<InputEvent>,
}

impl App {
    fn new(
        config: StroopConfig,
        timer: HighPrecisionTimer,
        flips: Sender<u64>,
        input: Sender<InputEvent>,
    ) -> Self {
        Self {
            config,
            window: None,
            pixels: None,
            renderer: None,
            screen: Screen::Blank,
            flip_pending: false,
            timer,
            flips,
            input,
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let mut window_attributes = Window::default_attributes()
            .with_title("Stroop")
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        if window_config.fullscreen {
            window_attributes = window_attributes
                .with_fullscreen(Some(Fullscreen::Borderless(event_loop.primary_monitor())));
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = window.scale_factor(),
            fullscreen = window_config.fullscreen,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(SkiaRenderer::from_font_file(
            &self.config.font_path,
            physical_size.width,
            physical_size.height,
            window_config.background,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let stats = renderer.render_screen(&self.screen, pixels.frame_mut())?;
        pixels.render()?;
        let flipped_at = self.timer.now();

        if self.flip_pending {
            self.flip_pending = false;
            if self.screen.is_stimulus() {
                debug!(onset_ns = flipped_at, "stimulus on screen");
            }
            // The session thread may already be gone; nothing to acknowledge then.
            let _ = self.flips.send(flipped_at);
        }

        debug!(
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) -> Result<()> {
        if new_size.width == 0 || new_size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = &mut self.pixels {
            pixels.resize_surface(new_size.width, new_size.height)?;
            pixels.resize_buffer(new_size.width, new_size.height)?;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height)?;
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn abort(&mut self, event_loop: &ActiveEventLoop, reason: &str) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        let _ = self.input.send(InputEvent::Abort(reason.to_string()));
        event_loop.exit();
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to create window and surface: {e:#}");
                self.abort(event_loop, "window could not be created");
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Show(screen) => {
                self.screen = screen;
                self.flip_pending = true;
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            UserEvent::Finished => {
                if let Some(window) = &self.window {
                    window.set_cursor_visible(true);
                }
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.abort(event_loop, "window closed"),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!("render failed: {e:#}");
                    self.abort(event_loop, "rendering failed");
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                let timestamp_ns = self.timer.now();
                match translate_key(&event.logical_key) {
                    KeyAction::Press(key) => {
                        let _ = self.input.send(InputEvent::Key(stroop_experiment::KeyPress {
                            key,
                            timestamp_ns,
                        }));
                    }
                    KeyAction::Abort => self.abort(event_loop, "escape pressed"),
                    KeyAction::Ignore => {}
                }
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = self.handle_resize(size) {
                    error!("resize failed: {e:#}");
                    self.abort(event_loop, "resize failed");
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    if let Err(e) = self.handle_resize(size) {
                        error!("resize failed: {e:#}");
                        self.abort(event_loop, "resize failed");
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the window on this thread and runs the session on a worker thread
/// until it finishes or the participant aborts.
pub fn run(config: StroopConfig, plan: SessionPlan) -> Result<SessionReport> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();
    let (flip_tx, flip_rx) = mpsc::channel();
    let (input_tx, input_rx) = mpsc::channel();
    let timer = HighPrecisionTimer::new();

    let worker = {
        let config = config.clone();
        let timer = timer.clone();
        let finished = proxy.clone();
        std::thread::Builder::new()
            .name("stroop-session".to_string())
            .spawn(move || {
                let presenter = WindowPresenter::new(proxy, flip_rx);
                let keys = ChannelKeys::new(input_rx);
                let result =
                    Session::new(&config, &plan, timer, presenter, keys, rand::rng()).run();
                let _ = finished.send_event(UserEvent::Finished);
                result
            })?
    };

    let mut app = App::new(config, timer, flip_tx, input_tx);
    let loop_result = event_loop.run_app(&mut app);
    // Closing the channels unblocks a session still waiting on the window.
    drop(app);

    let report = worker
        .join()
        .map_err(|_| anyhow!("session thread panicked"))??;
    loop_result?;
    Ok(report)
}
