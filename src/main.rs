//! Window front end: runs the render driver on a worker thread and shows its
//! framebuffer through wgpu.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{JoinHandle, spawn};
use std::time::Instant;

use log::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use path_tracing::accumulator::Accumulator;
use path_tracing::driver::{Driver, Presenter};
use path_tracing::framebuffer::Framebuffer;
use path_tracing::gpu::{Gpu, PresenterError, Renderer};
use path_tracing::picture::{RGB8, RGBA8};
use path_tracing::scene::Scene;
use path_tracing::settings::RenderSettings;

const TITLE: &str = "Path Tracer";

/// Copies finished passes into the buffer the event loop draws from.
struct WindowPresenter {
    display: Weak<Mutex<Framebuffer<RGBA8>>>,
    window: Arc<Window>,
    closed: Arc<AtomicBool>,
}

impl Presenter for WindowPresenter {
    fn present(&mut self, frame: &Framebuffer<RGB8>) {
        if let Some(display) = self.display.upgrade() {
            let mut target = display.lock().expect("display lock");
            let mut picture = target.picture_mut();
            for (pixel, source) in picture.buffer_mut().iter_mut().zip(frame.picture().buffer()) {
                *pixel = RGBA8::from(*source);
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.closed.load(Ordering::Relaxed) || self.display.strong_count() == 0
    }

    fn show_progress(&mut self, percent: u32) {
        self.window.set_title(&format!("{} - {}%", TITLE, percent));
    }
}

fn spawn_worker(display: &Arc<Mutex<Framebuffer<RGBA8>>>, window: Arc<Window>, closed: Arc<AtomicBool>, settings: RenderSettings) -> JoinHandle<()> {
    let mut presenter = WindowPresenter {
        display: Arc::downgrade(display),
        window,
        closed,
    };

    info!(target: "app", "Spawning worker thread");
    spawn(move || {
        let mut driver = Driver::new(Accumulator::new(Scene::cornell_box(), settings));
        let settings = driver.accumulator().settings();
        info!(target: "app", "Rendering {}x{}, {} samples, {} bounces", settings.width, settings.height, settings.samples, settings.max_depth);

        let start = Instant::now();
        driver.run(&mut presenter);
        info!(target: "app", "Worker stopping after {:?}", start.elapsed());
    })
}

async fn create_renderer(window: &Window, frame_size: (u32, u32)) -> Result<Renderer, PresenterError> {
    let (gpu, surface) = Gpu::new(window).await?;
    let size = window.inner_size();
    Renderer::new(gpu, surface, (size.width, size.height), frame_size)
}

fn run() -> Result<(), PresenterError> {
    let settings = RenderSettings::default();
    let event_loop = EventLoop::new();

    let window = Arc::new(WindowBuilder::new()
        .with_title(TITLE)
        .with_inner_size(LogicalSize::new(settings.width, settings.height))
        .with_resizable(false)
        .build(&event_loop)?);

    let mut renderer = smol::block_on(create_renderer(&window, settings.size()))?;

    let closed = Arc::new(AtomicBool::new(false));
    spawn_worker(&renderer.display(), window.clone(), closed.clone(), settings);

    event_loop.run(move |event, _, control_flow| {
        control_flow.set_poll();

        match event {
            Event::RedrawRequested(window_id) if window.id() == window_id => {
                renderer.render();
            }
            Event::RedrawEventsCleared => {
                window.request_redraw();
            }
            Event::WindowEvent { event, window_id } if window.id() == window_id => match event {
                WindowEvent::Resized(size) => {
                    renderer.surface_resize((size.width, size.height));
                }
                WindowEvent::CloseRequested => {
                    closed.store(true, Ordering::Relaxed);
                    control_flow.set_exit();
                }
                _ => {}
            }
            _ => {}
        }
    })
}

fn main() {
    env_logger::builder().target(env_logger::Target::Stdout).init();

    if let Err(err) = run() {
        error!(target: "app", "{}", err);
        std::process::exit(1);
    }
}
