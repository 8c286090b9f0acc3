//! Pendulum Sim entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use glam::IVec2;
    use pendulum_sim::platform::{EventQueue, FramePacer};
    use pendulum_sim::renderer::{DrawRequest, RenderFailure, RenderState, static_labels};
    use pendulum_sim::sim::{FrameOutcome, SimState, tick};
    use pendulum_sim::Settings;

    /// App instance holding all state
    struct App {
        settings: Settings,
        state: SimState,
        render_state: Option<RenderState>,
        queue: EventQueue,
        pacer: FramePacer,
        last_time: f64,
        /// Most recent draw request, redrawn if no tick ran this host frame
        last_draw: Option<DrawRequest>,
        running: bool,
        canvas_px: (u32, u32),
    }

    impl App {
        fn new(settings: Settings) -> Self {
            let pacer = FramePacer::new(settings.display.frame_rate);
            let canvas_px = (settings.display.width, settings.display.height);
            Self {
                settings,
                state: SimState::new(),
                render_state: None,
                queue: EventQueue::new(),
                pacer,
                last_time: 0.0,
                last_draw: None,
                running: true,
                canvas_px,
            }
        }

        /// Run as many fixed ticks as the elapsed time calls for
        fn update(&mut self, elapsed: f64) {
            let ticks = self.pacer.advance(elapsed);
            for _ in 0..ticks {
                let input = self.queue.drain();
                match tick(&mut self.state, &input, &self.settings) {
                    FrameOutcome::Continue(report) => self.last_draw = Some(report.draw),
                    FrameOutcome::Quit => {
                        self.running = false;
                        return;
                    }
                }
            }
            if self.state.frame > 0 && self.state.frame % 1000 == 0 && ticks > 0 {
                log::debug!(
                    "frame {}: θ1 = {:.3}, θ2 = {:.3}, skipped = {}",
                    self.state.frame,
                    self.state.pendulum.theta1,
                    self.state.pendulum.theta2,
                    self.state.skipped_steps
                );
            }
        }

        fn render(&mut self) {
            let (Some(render_state), Some(draw)) = (self.render_state.as_mut(), &self.last_draw)
            else {
                return;
            };
            if let Err(RenderFailure::Fatal) = render_state.render(draw) {
                log::error!("GPU context lost, stopping");
                self.running = false;
            }
        }

        /// Convert a mouse event to canvas pixels (CSS size may differ)
        fn event_pos(&self, canvas: &HtmlCanvasElement, event: &MouseEvent) -> IVec2 {
            let cw = canvas.client_width().max(1) as f64;
            let ch = canvas.client_height().max(1) as f64;
            let x = event.offset_x() as f64 * self.canvas_px.0 as f64 / cw;
            let y = event.offset_y() as f64 * self.canvas_px.1 as f64 / ch;
            IVec2::new(x as i32, y as i32)
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pendulum Sim starting...");

        let settings = Settings::load();
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = (settings.display.width, settings.display.height);
        canvas.set_width(width);
        canvas.set_height(height);

        place_labels(&document, &canvas, &settings);

        let app = Rc::new(RefCell::new(App::new(settings)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => app.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        }

        setup_input_handlers(&canvas, app.clone());
        setup_quit_handler(app.clone());

        request_animation_frame(app);

        log::info!("Pendulum Sim running!");
    }

    /// Title and instructions are static: build the DOM overlay once
    fn place_labels(document: &web_sys::Document, canvas: &HtmlCanvasElement, settings: &Settings) {
        let parent: Option<web_sys::Element> = canvas
            .parent_element()
            .or_else(|| document.body().map(Into::into));
        let Some(parent) = parent else {
            log::warn!("No container for labels");
            return;
        };

        for label in static_labels(settings) {
            let Ok(el) = document.create_element("div") else {
                continue;
            };
            let [r, g, b] = label.color;
            let style = format!(
                "position:absolute;left:{}px;top:{}px;font-size:{}px;color:rgb({},{},{});pointer-events:none;",
                label.position.x, label.position.y, label.size, r, g, b
            );
            let _ = el.set_attribute("class", "label");
            let _ = el.set_attribute("style", &style);
            el.set_text_content(Some(&label.text));
            let _ = parent.append_child(&el);
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse down - start dragging
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let pos = a.event_pos(&canvas_clone, &event);
                a.queue.pointer_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - keep pointer position fresh
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.event_pos(&canvas_clone, &event);
                a.queue.pointer_moved(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - release at this position
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.event_pos(&canvas_clone, &event);
                a.queue.pointer_up(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse leave - a held drag ends at the edge
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.event_pos(&canvas_clone, &event);
                a.queue.pointer_left(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_quit_handler(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().queue.quit();
        });
        let _ = window
            .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        let running = {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let elapsed = if a.last_time > 0.0 {
                (time - a.last_time) / 1000.0
            } else {
                a.pacer.interval()
            };
            a.last_time = time;

            a.update(elapsed);
            if a.running {
                a.render();
            }
            a.running
        };

        if running {
            request_animation_frame(app);
        } else {
            log::info!("Pendulum Sim stopped");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// How long the headless native run lasts
#[cfg(not(target_arch = "wasm32"))]
const NATIVE_RUN_SECONDS: u32 = 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pendulum_sim::Settings;
    use pendulum_sim::platform::{EventQueue, FrameClock};
    use pendulum_sim::renderer::static_labels;
    use pendulum_sim::sim::{FrameOutcome, SimState, tick, total_energy};

    env_logger::init();
    log::info!("Pendulum Sim (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the interactive version");

    let settings = Settings::load();
    if let Err(e) = settings.validate() {
        log::error!("Invalid settings: {}", e);
        std::process::exit(1);
    }
    for label in static_labels(&settings) {
        log::info!("{}", label.text);
    }

    let frame_rate = settings.display.frame_rate;
    let mut state = SimState::new();
    let mut queue = EventQueue::new();
    let mut clock = FrameClock::new(frame_rate);
    let total_frames = u64::from(frame_rate) * u64::from(NATIVE_RUN_SECONDS);

    let start_energy = total_energy(&settings.physics, &state.pendulum);
    while state.frame < total_frames {
        if state.frame + 1 == total_frames {
            queue.quit();
        }
        match tick(&mut state, &queue.drain(), &settings) {
            FrameOutcome::Continue(_) => {}
            FrameOutcome::Quit => break,
        }

        if state.frame % u64::from(frame_rate) == 0 {
            log::info!(
                "t = {:>4.1}s  θ1 = {:+.3}  θ2 = {:+.3}  ω1 = {:+.3}  ω2 = {:+.3}  E = {:.4}",
                state.frame as f64 * settings.display.frame_interval(),
                state.pendulum.theta1,
                state.pendulum.theta2,
                state.pendulum.omega1,
                state.pendulum.omega2,
                total_energy(&settings.physics, &state.pendulum)
            );
        }
        clock.wait();
    }

    log::info!(
        "Done: {} frames, {} skipped steps, energy {:.4} -> {:.4}",
        state.frame,
        state.skipped_steps,
        start_energy,
        total_energy(&settings.physics, &state.pendulum)
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
