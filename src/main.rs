//! Arcade Cabinet entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use arcade_cabinet::audio::{AudioManager, frame_sounds};
    use arcade_cabinet::consts::SIM_DT;
    use arcade_cabinet::highscores::format_date;
    use arcade_cabinet::platform::{
        BrowserStore, FrameClock, InputCollector, Key, KeyValueStore, MemoryStore, PointerButton,
    };
    use arcade_cabinet::renderer::{RenderState, Scene};
    use arcade_cabinet::{Cabinet, GameId, Phase, Route, Settings};

    type Store = Box<dyn KeyValueStore>;

    /// Everything the browser loop owns
    struct App {
        cabinet: Cabinet<Store>,
        render_state: Option<RenderState>,
        scene: Scene,
        clock: FrameClock,
        input: InputCollector,
        audio: AudioManager,
        canvas: HtmlCanvasElement,
        last_time: f64,
        /// Route currently reflected in the DOM and URL
        shown_route: Option<Route>,
        /// Menu cursor last rendered into the list
        shown_cursor: Option<usize>,
        dom: DomCache,
    }

    impl App {
        fn new(store: Store, canvas: HtmlCanvasElement) -> Self {
            let cabinet = Cabinet::new(store);
            let audio = AudioManager::new(cabinet.settings());
            Self {
                cabinet,
                render_state: None,
                scene: Scene::new(Vec2::new(800.0, 600.0)),
                clock: FrameClock::new(),
                input: InputCollector::new(),
                audio,
                canvas,
                last_time: 0.0,
                shown_route: None,
                shown_cursor: None,
                dom: DomCache::default(),
            }
        }

        /// Mount a route coming from the URL or a button
        fn navigate(&mut self, route: Route) {
            if route == self.cabinet.route() && self.shown_route.is_some() {
                return;
            }
            self.cabinet.navigate(route, js_sys::Date::now() as u64);
            self.input.release_all();
            self.clock.reset();
        }

        /// CSS pixel offset on the canvas to game space; `None` over the letterbox bars
        fn to_game(&self, css_x: f32, css_y: f32) -> Option<Vec2> {
            let game = self.cabinet.game()?;
            let render_state = self.render_state.as_ref()?;
            let ratio = self.canvas.width() as f32 / self.canvas.client_width().max(1) as f32;
            let viewport = render_state.viewport(game.size());
            let canvas_px = Vec2::new(css_x, css_y) * ratio;
            viewport
                .contains_canvas_point(canvas_px)
                .then(|| viewport.canvas_to_game(canvas_px))
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;
            self.clock.record_frame(time);

            let steps = if self.cabinet.is_paused() { 0 } else { self.clock.advance(dt) };
            let input = self.input.take_frame();
            let muted = self.cabinet.settings().muted;
            let events = self.cabinet.frame(&input, steps, SIM_DT, js_sys::Date::now());
            if self.cabinet.settings().muted != muted {
                self.audio.apply(self.cabinet.settings());
            }
            for sound in frame_sounds(&events) {
                self.audio.play(sound);
            }

            self.render();
            self.sync_dom();
        }

        fn render(&mut self) {
            let settings = self.cabinet.settings();
            match self.cabinet.game() {
                Some(game) => {
                    self.scene.begin(game.size(), settings.effects_enabled());
                    self.scene.set_background(settings.background());
                    game.draw(&mut self.scene);
                }
                None => {
                    self.scene.begin(Vec2::new(800.0, 600.0), false);
                    self.scene.set_background(settings.background());
                }
            }

            let Some(render_state) = &mut self.render_state else {
                return;
            };
            match render_state.render(&self.scene) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Mirror cabinet state into the URL and DOM overlays
        fn sync_dom(&mut self) {
            let Some(document) = document() else { return };
            let route = self.cabinet.route();

            if self.shown_route != Some(route) {
                if let Some(window) = web_sys::window() {
                    let hash = route.to_hash();
                    if window.location().hash().ok().as_deref() != Some(hash.as_str()) {
                        if let Err(e) = window.location().set_hash(&hash) {
                            log::warn!("Could not update URL to {}: {:?}", hash, e);
                        }
                    }
                }
                set_visible(&document, "menu", route == Route::Menu);
                set_visible(&document, "hud", route != Route::Menu);
                self.shown_route = Some(route);
                self.shown_cursor = None;
                self.dom.clear();
            }

            match self.cabinet.game() {
                None => self.sync_menu(&document),
                Some(_) => self.sync_hud(&document),
            }
            set_visible(&document, "hud-fps", self.cabinet.settings().show_fps);
            self.dom
                .set_text(&document, "hud-fps-value", self.clock.fps().to_string());
        }

        fn sync_menu(&mut self, document: &Document) {
            let cursor = self.cabinet.menu_cursor();
            if self.shown_cursor == Some(cursor) {
                return;
            }
            self.shown_cursor = Some(cursor);
            if let Some(list) = document.get_element_by_id("menu-list") {
                list.set_inner_html(&menu_html(&self.cabinet, cursor));
            }
            for id in ["pause-menu", "game-over", "banner"] {
                set_visible(document, id, false);
            }
        }

        fn sync_hud(&mut self, document: &Document) {
            let Some(game) = self.cabinet.game() else { return };
            let id = game.id();
            let paused = self.cabinet.is_paused();
            let phase = game.phase();
            let best = self
                .cabinet
                .scores()
                .best(id)
                .map_or_else(|| "-".to_string(), |b| b.to_string());
            let extra: String = game
                .hud()
                .iter()
                .map(|item| {
                    format!(
                        "<span class=\"hud-item\"><span class=\"hud-label\">{}</span> <span class=\"hud-value\">{}</span></span>",
                        item.label, item.value
                    )
                })
                .collect();
            let banner = game.banner();
            let score = game.score().to_string();

            self.dom.set_text(document, "hud-title", id.title().to_string());
            self.dom.set_text(document, "hud-score-label", id.score_label().to_string());
            self.dom.set_text(document, "hud-score-value", score.clone());
            self.dom.set_text(document, "hud-best-value", best);
            self.dom.set_html(document, "hud-extra", extra);
            self.dom.set_text(document, "controls", id.controls().to_string());

            set_visible(document, "pause-menu", paused);
            let over = phase.is_terminal();
            set_visible(document, "game-over", over);
            if over {
                let heading = if phase == Phase::Won { "You Win!" } else { "Game Over" };
                self.dom.set_text(document, "game-over-title", heading.to_string());
                let shown = game.result().map_or_else(|| "-".to_string(), |r| r.to_string());
                self.dom.set_text(document, "final-score", shown);
                let rank = match self.cabinet.last_rank() {
                    Some(1) => "New high score!".to_string(),
                    Some(rank) => format!("Ranked #{}", rank),
                    None => String::new(),
                };
                self.dom.set_text(document, "final-rank", rank);
            }
            let banner_text = if over || paused { None } else { banner };
            set_visible(document, "banner", banner_text.is_some());
            self.dom
                .set_text(document, "banner", banner_text.unwrap_or_default());
        }
    }

    /// Skips DOM writes when nothing changed
    #[derive(Default)]
    struct DomCache {
        written: HashMap<&'static str, String>,
    }

    impl DomCache {
        fn clear(&mut self) {
            self.written.clear();
        }

        fn changed(&mut self, id: &'static str, value: &str) -> bool {
            if self.written.get(id).map(String::as_str) == Some(value) {
                return false;
            }
            self.written.insert(id, value.to_string());
            true
        }

        fn set_text(&mut self, document: &Document, id: &'static str, text: String) {
            if self.changed(id, &text) {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&text));
                }
            }
        }

        fn set_html(&mut self, document: &Document, id: &'static str, html: String) {
            if self.changed(id, &html) {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_inner_html(&html);
                }
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Menu entries as links; following one fires `hashchange`
    fn menu_html(cabinet: &Cabinet<Store>, cursor: usize) -> String {
        let mut html = String::new();
        for (i, id) in GameId::ALL.iter().enumerate() {
            let board = cabinet.scores().board(*id);
            let best = board
                .best()
                .map_or_else(|| "-".to_string(), |b| b.to_string());
            let selected = if i == cursor { " selected" } else { "" };
            html.push_str(&format!(
                "<li><a class=\"menu-item{}\" href=\"{}\">\
                 <span class=\"menu-title\">{}</span>\
                 <span class=\"menu-blurb\">{}</span>\
                 <span class=\"menu-best\">{}: {}</span>",
                selected,
                Route::Game { id: *id, seed: None }.to_hash(),
                id.title(),
                id.blurb(),
                id.score_label(),
                best,
            ));
            if i == cursor && !board.is_empty() {
                html.push_str("<ol class=\"menu-board\">");
                for entry in &board.entries {
                    html.push_str(&format!(
                        "<li>{} <span class=\"menu-date\">{}</span></li>",
                        entry.score,
                        format_date(entry.timestamp)
                    ));
                }
                html.push_str("</ol>");
            }
            html.push_str("</a></li>");
        }
        html
    }

    fn open_store() -> Store {
        match BrowserStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), scores last this session only", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    /// Match the canvas backing store to its CSS size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Arcade Cabinet starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let (width, height) = fit_canvas(&canvas);

        let app = Rc::new(RefCell::new(App::new(open_store(), canvas.clone())));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {}", e)))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {}", e)))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get device: {}", e)))?;
        app.borrow_mut().render_state = Some(render_state);

        let route = Route::parse(&window.location().hash().unwrap_or_default());
        app.borrow_mut().navigate(route);

        setup_input_handlers(&canvas, app.clone())?;
        setup_routing(app.clone())?;
        setup_buttons(&document, app.clone());
        setup_settings(&document, app.clone());
        setup_auto_pause(app.clone())?;

        request_animation_frame(app);

        log::info!("Arcade Cabinet running!");
        Ok(())
    }

    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        event: &str,
        handler: impl FnMut(E) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard
        {
            let app = app.clone();
            listen(&window, "keydown", move |event: KeyboardEvent| {
                let Some(key) = Key::from_dom(&event.key()) else { return };
                // Keep arrows and space from scrolling the page
                if matches!(key, Key::Left | Key::Right | Key::Up | Key::Down | Key::Action | Key::Back) {
                    event.prevent_default();
                }
                let mut a = app.borrow_mut();
                a.audio.resume();
                a.input.key_down(key);
            })?;
        }
        {
            let app = app.clone();
            listen(&window, "keyup", move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    app.borrow_mut().input.key_up(key);
                }
            })?;
        }

        // Pointer
        {
            let app = app.clone();
            listen(canvas, "mousemove", move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                if let Some(pos) = a.to_game(event.offset_x() as f32, event.offset_y() as f32) {
                    a.input.pointer_move(pos);
                }
            })?;
        }
        {
            let app = app.clone();
            listen(canvas, "mousedown", move |event: MouseEvent| {
                let Some(button) = PointerButton::from_dom(event.button()) else { return };
                let mut a = app.borrow_mut();
                a.audio.resume();
                if let Some(pos) = a.to_game(event.offset_x() as f32, event.offset_y() as f32) {
                    a.input.pointer_down(pos, button);
                }
            })?;
        }
        // Right click flags mines instead of opening a menu
        listen(canvas, "contextmenu", |event: MouseEvent| event.prevent_default())?;

        // Touch acts as a primary click
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            listen(canvas, "touchstart", move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else { return };
                let rect = canvas_clone.get_bounding_client_rect();
                let x = touch.client_x() as f32 - rect.left() as f32;
                let y = touch.client_y() as f32 - rect.top() as f32;
                let mut a = app.borrow_mut();
                a.audio.resume();
                if let Some(pos) = a.to_game(x, y) {
                    a.input.pointer_down(pos, PointerButton::Primary);
                }
            })?;
        }

        // Resize
        {
            let canvas_clone = canvas.clone();
            listen(&window, "resize", move |_event: web_sys::Event| {
                let (width, height) = fit_canvas(&canvas_clone);
                if let Some(render_state) = &mut app.borrow_mut().render_state {
                    render_state.resize(width, height);
                }
            })?;
        }
        Ok(())
    }

    fn setup_routing(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        listen(&window, "hashchange", move |_event: web_sys::HashChangeEvent| {
            let hash = web_sys::window()
                .and_then(|w| w.location().hash().ok())
                .unwrap_or_default();
            app.borrow_mut().navigate(Route::parse(&hash));
        })
    }

    fn on_click(document: &Document, id: &str, app: &Rc<RefCell<App>>, action: fn(&mut App)) {
        let Some(btn) = document.get_element_by_id(id) else { return };
        let app = app.clone();
        if let Err(e) = listen(&btn, "click", move |_event: MouseEvent| action(&mut app.borrow_mut())) {
            log::warn!("Could not bind #{}: {:?}", id, e);
        }
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        on_click(document, "resume-btn", &app, |a| {
            a.cabinet.toggle_pause();
            a.clock.reset();
        });
        for id in ["restart-btn", "retry-btn"] {
            on_click(document, id, &app, |a| {
                a.cabinet.restart(js_sys::Date::now() as u64);
                a.clock.reset();
            });
        }
        for id in ["menu-btn", "quit-btn", "game-over-menu-btn"] {
            on_click(document, id, &app, |a| a.cabinet.return_to_menu());
        }
        on_click(document, "mute-btn", &app, |a| {
            a.cabinet.update_settings(|s| {
                s.toggle_mute();
            });
            a.audio.apply(a.cabinet.settings());
        });
    }

    /// Bind a settings checkbox to a boolean field
    fn bind_toggle(
        document: &Document,
        id: &str,
        app: &Rc<RefCell<App>>,
        field: fn(&mut Settings) -> &mut bool,
    ) {
        let Some(input) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        {
            let mut current = app.borrow().cabinet.settings().clone();
            input.set_checked(*field(&mut current));
        }
        let app = app.clone();
        let input_clone = input.clone();
        let bound = listen(&input, "change", move |_event: web_sys::Event| {
            let checked = input_clone.checked();
            let mut a = app.borrow_mut();
            a.cabinet.update_settings(|s| *field(s) = checked);
            a.audio.apply(a.cabinet.settings());
        });
        if let Err(e) = bound {
            log::warn!("Could not bind #{}: {:?}", id, e);
        }
    }

    /// Bind a 0..100 range input to a volume field
    fn bind_volume(
        document: &Document,
        id: &str,
        app: &Rc<RefCell<App>>,
        field: fn(&mut Settings) -> &mut f32,
    ) {
        let Some(input) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        {
            let mut current = app.borrow().cabinet.settings().clone();
            input.set_value_as_number((*field(&mut current) * 100.0) as f64);
        }
        let app = app.clone();
        let input_clone = input.clone();
        let bound = listen(&input, "change", move |_event: web_sys::Event| {
            let value = (input_clone.value_as_number() / 100.0).clamp(0.0, 1.0) as f32;
            let mut a = app.borrow_mut();
            a.cabinet.update_settings(|s| *field(s) = value);
            a.audio.apply(a.cabinet.settings());
        });
        if let Err(e) = bound {
            log::warn!("Could not bind #{}: {:?}", id, e);
        }
    }

    fn setup_settings(document: &Document, app: Rc<RefCell<App>>) {
        bind_toggle(document, "setting-muted", &app, |s| &mut s.muted);
        bind_toggle(document, "setting-mute-on-blur", &app, |s| &mut s.mute_on_blur);
        bind_toggle(document, "setting-show-fps", &app, |s| &mut s.show_fps);
        bind_toggle(document, "setting-particles", &app, |s| &mut s.particles);
        bind_toggle(document, "setting-reduced-motion", &app, |s| &mut s.reduced_motion);
        bind_toggle(document, "setting-high-contrast", &app, |s| &mut s.high_contrast);
        bind_volume(document, "setting-master-volume", &app, |s| &mut s.master_volume);
        bind_volume(document, "setting-sfx-volume", &app, |s| &mut s.sfx_volume);
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Tab switch, minimize
        {
            let app = app.clone();
            let document_clone = document.clone();
            listen(&document, "visibilitychange", move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    a.cabinet.pause();
                    a.input.release_all();
                    log::info!("Auto-paused (tab hidden)");
                }
            })?;
        }

        // Click outside the window
        {
            let app = app.clone();
            listen(&window, "blur", move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                a.cabinet.pause();
                a.input.release_all();
                if a.cabinet.settings().mute_on_blur {
                    a.audio.suspend();
                }
            })?;
        }
        listen(&window, "focus", move |_event: web_sys::FocusEvent| {
            let a = app.borrow();
            if a.cabinet.settings().mute_on_blur {
                a.audio.resume();
            }
        })
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            app.borrow_mut().frame(time);
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arcade Cabinet (native) starting...");
    log::info!("The cabinet renders in the browser - run with `trunk serve` for the web version");
    attract::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless attract mode: every game plays itself for a few seconds
#[cfg(not(target_arch = "wasm32"))]
mod attract {
    use arcade_cabinet::consts::SIM_DT;
    use arcade_cabinet::platform::{FrameInput, Key, MemoryStore};
    use arcade_cabinet::renderer::Scene;
    use arcade_cabinet::{Cabinet, GameId, Route};

    const SECONDS: u32 = 10;
    const SEED: u64 = 2024;

    /// Cycle through a few keys so each game sees some input
    fn scripted_input(frame: u32) -> FrameInput {
        const SCRIPT: [Key; 6] = [Key::Action, Key::Left, Key::Up, Key::Right, Key::Down, Key::Confirm];
        let key = SCRIPT[(frame / 20) as usize % SCRIPT.len()];
        let input = FrameInput::idle().with_held(key);
        if frame % 20 == 0 { input.with_pressed(key) } else { input }
    }

    pub fn run() {
        let mut cabinet = Cabinet::new(MemoryStore::new());
        let mut scene = Scene::new(glam::Vec2::ONE);
        for id in GameId::ALL {
            cabinet.navigate(Route::Game { id, seed: Some(SEED) }, SEED);
            let mut events = 0;
            for frame in 0..SECONDS * 60 {
                let ms = frame as f64 * SIM_DT as f64 * 1000.0;
                events += cabinet.frame(&scripted_input(frame), 1, SIM_DT, ms).len();
            }
            let Some(game) = cabinet.game() else { continue };
            scene.begin(game.size(), true);
            game.draw(&mut scene);
            log::info!(
                "{:<16} phase={:?} score={} events={} vertices={}",
                id.title(),
                game.phase(),
                game.score(),
                events,
                scene.vertices().len()
            );
        }
        cabinet.return_to_menu();
        for id in GameId::ALL {
            if let Some(best) = cabinet.scores().best(id) {
                log::info!("{} best {}: {}", id.title(), id.score_label(), best);
            }
        }
    }
}
