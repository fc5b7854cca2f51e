//! Vulkan rendering sandbox entry point.

mod app;
mod controller;

use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use glint_core::{Timer, init_logging};
use glint_platform::{InputState, KeyCode, Window};

use crate::app::Sandbox;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

#[derive(Default)]
struct App {
    window: Option<Window>,
    sandbox: Option<Sandbox>,
    input: InputState,
    timer: Timer,
    error: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Window::new(event_loop, WINDOW_WIDTH, WINDOW_HEIGHT, "glint") {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match Sandbox::new(&window) {
            Ok(sandbox) => {
                info!("Renderer initialized");
                self.sandbox = Some(sandbox);
                self.window = Some(window);
                self.timer.reset();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(window) = &mut self.window {
                    window.on_resized(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.handle_key_event(&event);
                if self.input.just_pressed(KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(sandbox), Some(window)) = (&mut self.sandbox, &mut self.window) else {
                    return;
                };
                let dt = self.timer.delta_secs();
                sandbox.update(dt, &self.input);
                if let Err(e) = sandbox.draw(window) {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.begin_frame();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app)?;

    if let Some(error) = app.error {
        return Err(error);
    }
    Ok(())
}
