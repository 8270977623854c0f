use std::error::Error;
use std::num::NonZeroU32;
use std::time::Instant;

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::raw_window_handle::HasWindowHandle;
use winit::window::{CursorGrabMode, Window, WindowAttributes};

use glutin::config::{Config, ConfigTemplateBuilder, GetGlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};

use glutin_winit::{DisplayBuilder, GlWindow};

use crate::input::{Command, InputQueue};
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::settings::RenderSettings;

/// Scroll pixels per zoom degree on touchpads.
const PIXELS_PER_SCROLL_LINE: f32 = 20.0;

pub fn run_app(
    event_loop: EventLoop<()>,
    settings: RenderSettings,
    scene: Scene,
) -> Result<(), Box<dyn Error>> {
    // The final image's depth is blitted into the default framebuffer. That
    // needs the offscreen targets' depth/stencil layout and a single-sampled
    // surface, since GL 3.3 rejects blits into a multisampled framebuffer.
    let template = ConfigTemplateBuilder::new()
        .with_depth_size(24)
        .with_stencil_size(8)
        .with_multisampling(0);

    let display_builder =
        DisplayBuilder::new().with_window_attributes(Some(window_attributes(&settings)));

    let mut app = App::new(template, display_builder, settings, scene);
    event_loop.run_app(&mut app)?;

    app.exit_state
}

struct App {
    template: ConfigTemplateBuilder,
    settings: RenderSettings,
    renderer: Option<Renderer>,
    // NOTE: `AppState` carries the `Window`, thus it should be dropped after everything else.
    state: Option<AppState>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_display: GlDisplayCreationState,
    exit_state: Result<(), Box<dyn Error>>,
    scene: Scene,
    input: InputQueue,
    last_frame: Option<Instant>,
}

impl App {
    fn new(
        template: ConfigTemplateBuilder,
        display_builder: DisplayBuilder,
        settings: RenderSettings,
        scene: Scene,
    ) -> Self {
        Self {
            template,
            settings,
            gl_display: GlDisplayCreationState::Builder(display_builder),
            exit_state: Ok(()),
            gl_context: None,
            state: None,
            renderer: None,
            scene,
            input: InputQueue::default(),
            last_frame: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Box<dyn Error>) {
        error!("{err}");
        self.exit_state = Err(err);
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(AppState { window, .. }) = self.state.as_ref() {
            window.request_redraw();
        }
    }

    /// Seconds since the previous frame, zero for the first one.
    fn frame_time(&mut self) -> f32 {
        let now = Instant::now();
        self.last_frame
            .replace(now)
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta_time = self.frame_time();
        self.scene.update_time(delta_time);

        for command in self.input.drain() {
            if command == Command::Quit {
                event_loop.exit();
                return;
            }
            self.scene.apply(command);
        }
        for &action in self.input.held() {
            self.scene.apply_held(action);
        }
        self.scene.update();

        let (Some(AppState { gl_surface, .. }), Some(gl_context), Some(renderer)) = (
            self.state.as_ref(),
            self.gl_context.as_ref(),
            self.renderer.as_mut(),
        ) else {
            return;
        };
        renderer.draw(&self.scene);
        if let Err(err) = gl_surface.swap_buffers(gl_context) {
            error!("Error swapping buffers: {err}");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let (window, gl_config) = match &self.gl_display {
            // We just created the event loop, so initialize the display, pick the config, and
            // create the context.
            GlDisplayCreationState::Builder(display_builder) => {
                let (window, gl_config) = match display_builder.clone().build(
                    event_loop,
                    self.template.clone(),
                    gl_config_picker,
                ) {
                    Ok((Some(window), gl_config)) => (window, gl_config),
                    Ok((None, _)) => {
                        return self.fail(event_loop, "no window was created".into());
                    }
                    Err(err) => return self.fail(event_loop, err),
                };

                info!("Picked a config with {} samples", gl_config.num_samples());

                // Mark the display as initialized to not recreate it on resume, since the
                // display is valid until we explicitly destroy it.
                self.gl_display = GlDisplayCreationState::Init;

                match create_gl_context(&window, &gl_config) {
                    Ok(context) => self.gl_context = Some(context.treat_as_possibly_current()),
                    Err(err) => return self.fail(event_loop, err.into()),
                }

                (window, gl_config)
            }
            GlDisplayCreationState::Init => {
                debug!("Recreating window in `resumed`");
                let Some(gl_context) = self.gl_context.as_ref() else {
                    return;
                };
                // Pick the config which we already use for the context.
                let gl_config = gl_context.config();
                match glutin_winit::finalize_window(
                    event_loop,
                    window_attributes(&self.settings),
                    &gl_config,
                ) {
                    Ok(window) => (window, gl_config),
                    Err(err) => return self.fail(event_loop, err.into()),
                }
            }
        };

        let attrs = match window.build_surface_attributes(Default::default()) {
            Ok(attrs) => attrs,
            Err(err) => return self.fail(event_loop, err.into()),
        };
        let gl_surface = match unsafe {
            gl_config
                .display()
                .create_window_surface(&gl_config, &attrs)
        } {
            Ok(surface) => surface,
            Err(err) => return self.fail(event_loop, err.into()),
        };

        // The context needs to be current for the Renderer to set up shaders and
        // buffers. It also performs function loading, which needs a current context on
        // WGL.
        let Some(gl_context) = self.gl_context.as_ref() else {
            return;
        };
        if let Err(err) = gl_context.make_current(&gl_surface) {
            return self.fail(event_loop, err.into());
        }

        // Try setting vsync.
        let interval = SwapInterval::Wait(NonZeroU32::MIN);
        if let Err(res) = gl_surface.set_swap_interval(gl_context, interval) {
            warn!("Error setting vsync: {res:?}");
        }

        if self.renderer.is_none() {
            match Renderer::new(&gl_config.display(), &self.settings) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(err) => return self.fail(event_loop, err.into()),
            }
        }

        let size = window.inner_size();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(size.width as i32, size.height as i32);
        }
        self.scene.camera.set_aspect(size.width as f32, size.height as f32);

        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        match grabbed {
            Ok(()) => window.set_cursor_visible(false),
            Err(err) => warn!("Could not grab the cursor: {err}"),
        }

        self.state = Some(AppState { gl_surface, window });
        self.request_redraw();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // This event is only raised on Android, where the backing NativeWindow for a GL
        // Surface can appear and disappear at any moment.
        info!("Android window removed");

        // Destroy the GL Surface and un-current the GL Context before ndk-glue releases
        // the window back to the system.
        self.state = None;

        if let Some(gl_context) = self.gl_context.take() {
            match gl_context.make_not_current() {
                Ok(context) => self.gl_context = Some(context.treat_as_possibly_current()),
                Err(err) => error!("Failed to release the context: {err}"),
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) if size.width != 0 && size.height != 0 => {
                // Some platforms like EGL require resizing GL surface to update the size
                // Notable platforms here are Wayland and macOS, other don't require it
                // and the function is no-op, but it's wise to resize it for portability
                // reasons.
                if let (Some(AppState { gl_surface, .. }), Some(gl_context)) =
                    (self.state.as_ref(), self.gl_context.as_ref())
                {
                    let (Some(width), Some(height)) =
                        (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                    else {
                        return;
                    };
                    gl_surface.resize(gl_context, width, height);
                    self.scene.camera.set_aspect(size.width as f32, size.height as f32);

                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.resize(size.width as i32, size.height as i32);
                    }
                    self.request_redraw();
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.input.on_key(&logical_key, state, repeat),
            WindowEvent::Focused(false) => {
                self.input.release_all();
                self.scene.last_mouse = None;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.scene
                    .mouse_moved(glm::vec2(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => {
                        position.y as f32 / PIXELS_PER_SCROLL_LINE
                    }
                };
                self.scene.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.request_redraw();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GL objects are released while the context is still alive.
        self.renderer = None;

        // NOTE: The handling below is only needed due to nvidia on Wayland to not crash
        // on exit due to nvidia driver touching the Wayland display from on
        // `exit` hook.
        let _gl_display = self.gl_context.take().map(|context| context.display());

        // Clear the window.
        self.state = None;
        #[cfg(egl_backend)]
        #[allow(irrefutable_let_patterns)]
        if let Some(glutin::display::Display::Egl(display)) = _gl_display {
            unsafe {
                display.terminate();
            }
        }
    }
}

fn create_gl_context(
    window: &Window,
    gl_config: &Config,
) -> Result<NotCurrentContext, glutin::error::Error> {
    let raw_window_handle = window.window_handle().ok().map(|wh| wh.as_raw());

    // Geometry shaders and layered framebuffers need a 3.3 core context; there
    // is no fallback.
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(raw_window_handle);

    unsafe { gl_config.display().create_context(gl_config, &context_attributes) }
}

fn window_attributes(settings: &RenderSettings) -> WindowAttributes {
    Window::default_attributes()
        .with_title(settings.title)
        .with_inner_size(PhysicalSize::new(settings.width, settings.height))
}

enum GlDisplayCreationState {
    /// The display was not build yet.
    Builder(DisplayBuilder),
    /// The display was already created for the application.
    Init,
}

struct AppState {
    gl_surface: Surface<WindowSurface>,
    // NOTE: Window should be dropped after all resources created using its
    // raw-window-handle.
    window: Window,
}

// Depth blits into the window need a single-sampled surface, so take the
// config with the fewest samples.
pub fn gl_config_picker(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    fewest_samples(configs, Config::num_samples)
        // glutin only calls the picker with a non-empty set.
        .expect("no GL config matched the template")
}

fn fewest_samples<T>(configs: impl Iterator<Item = T>, samples: impl Fn(&T) -> u8) -> Option<T> {
    configs.reduce(|accum, config| {
        if samples(&config) < samples(&accum) {
            config
        } else {
            accum
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_prefers_single_sampled_configs() {
        let configs = [("msaa4", 4), ("single", 0), ("msaa8", 8), ("also_single", 0)];
        let picked = fewest_samples(configs.into_iter(), |&(_, samples)| samples);
        assert_eq!(picked, Some(("single", 0)));
    }

    #[test]
    fn picker_falls_back_to_the_lowest_sample_count() {
        let configs = [("msaa8", 8u8), ("msaa2", 2), ("msaa4", 4)];
        let picked = fewest_samples(configs.into_iter(), |&(_, samples)| samples);
        assert_eq!(picked, Some(("msaa2", 2)));
    }
}
