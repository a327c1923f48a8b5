use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::InputState;
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "backdrop".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

impl RuntimeConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }
}

/// Runs one window until it is closed or the app asks to exit.
pub struct Runtime;

impl Runtime {
    /// Blocks on the platform event loop. Errors from window or GPU setup
    /// are returned once the loop has stopped.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut driver = Driver {
            config,
            gpu_init,
            app,
            open: None,
            exiting: false,
            fatal: None,
        };

        event_loop
            .run_app(&mut driver)
            .context("winit event loop terminated with error")?;

        driver.fatal.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct WindowEntry {
    input: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct Driver<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    open: Option<(WindowId, WindowEntry)>,
    exiting: bool,
    fatal: Option<anyhow::Error>,
}

impl<A: App> Driver<A> {
    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        let (viewport, scale) = entry.with_window(|w| window_metrics(w));
        entry.with_window(|w| w.request_redraw());
        self.open = Some((id, entry));

        let control = self.app.on_resize(id, viewport, scale);
        self.follow(control);
        Ok(())
    }

    /// Lets the app release its GPU objects, then drops the window and its
    /// device.
    fn close_window(&mut self) {
        if let Some((id, _)) = &self.open {
            self.app.on_close(*id);
        }
        self.open = None;
    }

    fn follow(&mut self, control: AppControl) {
        if control == AppControl::Exit {
            self.exiting = true;
        }
    }

    fn shutdown_if_exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            self.close_window();
            event_loop.exit();
        }
    }

    fn resized(&mut self, new_size: PhysicalSize<u32>) {
        let Some((id, entry)) = self.open.as_mut() else { return };
        entry.with_gpu_mut(|gpu| gpu.resize(new_size));
        let (viewport, scale) = entry.with_window(|w| window_metrics(w));
        entry.with_window(|w| w.request_redraw());

        let control = self.app.on_resize(*id, viewport, scale);
        self.follow(control);
    }

    fn redraw(&mut self) {
        let Some((_, entry)) = self.open.as_mut() else { return };
        let app = &mut self.app;
        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                time: fields.clock.tick(),
                window: fields.window,
                gpu: fields.gpu,
            };
            app.on_frame(&mut ctx)
        });
        self.follow(control);
    }
}

fn window_metrics(window: &Window) -> (Viewport, f32) {
    let scale = window.scale_factor();
    let logical: LogicalSize<f64> = window.inner_size().to_logical(scale);
    (
        Viewport::new(logical.width as f32, logical.height as f32),
        scale as f32,
    )
}

impl<A: App> ApplicationHandler for Driver<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.open.is_some() {
            return;
        }
        if let Err(err) = self.open_window(event_loop) {
            log::error!("failed to open window: {err:#}");
            self.fatal = Some(err);
            self.exiting = true;
        }
        self.shutdown_if_exiting(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            self.shutdown_if_exiting(event_loop);
            return;
        }

        // Effects animate continuously; redraw on every vsync.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some((_, entry)) = &self.open {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some((id, entry)) = self.open.as_mut() else { return };
        if *id != window_id {
            return;
        }

        let app = &mut self.app;
        let control = entry.with_mut(|fields| {
            let ev = translate_window_event(fields.window, fields.input, &event)?;
            fields.input.apply_event(&ev);
            Some(app.on_input(window_id, &ev))
        });
        if let Some(control) = control {
            self.follow(control);
        }

        if !self.exiting {
            match event {
                WindowEvent::CloseRequested => self.exiting = true,
                WindowEvent::Resized(new_size) => self.resized(new_size),
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = self
                        .open
                        .as_ref()
                        .map(|(_, entry)| entry.with_window(|w| w.inner_size()));
                    if let Some(size) = size {
                        self.resized(size);
                    }
                }
                WindowEvent::RedrawRequested => self.redraw(),
                _ => {}
            }
        }

        self.shutdown_if_exiting(event_loop);
    }
}
