//! Avatar Arcade entry point
//!
//! Web: drives a game session from requestAnimationFrame.
//! Native: runs both games headless with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, PointerEvent};

    use avatar_arcade::Settings;
    use avatar_arcade::persistence::LocalStorageStore;
    use avatar_arcade::sim::{DeviceClass, GameMode, GameSession, GameSpeed, SessionPhase};

    /// Game instance holding the session and its frame loop
    struct Game {
        session: GameSession<LocalStorageStore>,
        /// Pending requestAnimationFrame handle
        frame_handle: Option<i32>,
        /// Bumped whenever the loop stops; callbacks from an older generation bail out
        generation: u32,
    }

    impl Game {
        /// Cancel the pending frame and invalidate any callback already queued
        fn stop_loop(&mut self) {
            self.generation = self.generation.wrapping_add(1);
            if let Some(handle) = self.frame_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snap = self.session.snapshot();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&snap.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                el.set_text_content(Some(&snap.high_score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-state") {
                let text = match snap.phase {
                    SessionPhase::Idle => "Press Enter to start",
                    SessionPhase::Playing => "",
                    SessionPhase::GameOver => "Game over - Enter to play again",
                };
                el.set_text_content(Some(text));
            }
        }
    }

    fn window_size() -> (f32, f32) {
        let Some(window) = web_sys::window() else {
            return (0.0, 0.0);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (w as f32, h as f32)
    }

    fn mode_from_query() -> GameMode {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .and_then(|search| {
                search
                    .trim_start_matches('?')
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("game="))
                    .and_then(GameMode::from_str)
            })
            .unwrap_or_default()
    }

    fn detect_device() -> DeviceClass {
        match web_sys::window().map(|w| w.navigator().max_touch_points()) {
            Some(points) if points > 0 => DeviceClass::Mobile,
            _ => DeviceClass::Desktop,
        }
    }

    pub fn run() {
        let store = LocalStorageStore::new();
        let mut settings = Settings::load(&store);
        settings.last_mode = mode_from_query();
        settings.device_class = detect_device();
        settings.save(&store);

        let (width, height) = window_size();
        let seed = js_sys::Date::now() as u64;
        let session = GameSession::from_settings(settings.last_mode, &settings, width, height, store, seed);
        log::info!("Avatar Arcade: {} ({}x{})", settings.last_mode.as_str(), width, height);

        let game = Rc::new(RefCell::new(Game {
            session,
            frame_handle: None,
            generation: 0,
        }));
        game.borrow().update_hud();

        setup_input_handlers(game.clone());
        setup_lifecycle_handlers(game);
    }

    /// Schedule the loop if the session is running and no frame is pending
    fn ensure_loop(game: &Rc<RefCell<Game>>) {
        let needs_frame = {
            let g = game.borrow();
            g.session.phase() == SessionPhase::Playing && g.frame_handle.is_none()
        };
        if needs_frame {
            request_animation_frame(game.clone());
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let generation = game.borrow().generation;
        let callback_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(callback_game, generation, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, generation: u32, time: f64) {
        {
            let mut g = game.borrow_mut();
            if g.generation != generation {
                return;
            }
            g.frame_handle = None;
            g.session.frame(time);
            g.update_hud();

            if g.session.phase() != SessionPhase::Playing {
                if let Some(summary) = g.session.last_summary() {
                    for id in &summary.newly_unlocked {
                        let title = g.session.achievement_title(id).unwrap_or(id.as_str());
                        log::info!("Unlocked: {}", title);
                    }
                }
                g.stop_loop();
                return;
            }
        }

        request_animation_frame(game);
    }

    fn on_impulse(game: &Rc<RefCell<Game>>) {
        game.borrow_mut().session.impulse();
        ensure_loop(game);
    }

    fn on_toggle_run(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.session.toggle_run();
            if g.session.phase() != SessionPhase::Playing {
                g.stop_loop();
            }
            g.update_hud();
        }
        ensure_loop(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " | "ArrowUp" | "w" | "W" => {
                        event.prevent_default();
                        on_impulse(&game);
                    }
                    "Enter" => on_toggle_run(&game),
                    digit @ ("1" | "2" | "3" | "4" | "5") => {
                        let level = digit.parse().unwrap_or(GameSpeed::MIN);
                        let mut g = game.borrow_mut();
                        if let Err(e) = g.session.set_game_speed(GameSpeed::new(level)) {
                            log::info!("Speed unchanged: {}", e);
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer (mouse + touch)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                on_impulse(&game);
            });
            let _ = window
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (w, h) = window_size();
                game.borrow_mut().session.resize(w, h);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().stop_loop();
                    log::info!("Frame loop cancelled (tab hidden)");
                } else {
                    ensure_loop(&game);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Navigating away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.stop_loop();
                g.session.reset();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use avatar_arcade::sim::GameMode;
    use avatar_arcade::{MemoryStore, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Avatar Arcade (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    let store = MemoryStore::new();
    let settings = Settings::load(&store);
    for mode in [GameMode::Flap, GameMode::Runner] {
        autopilot::run(mode, &settings, &store);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use avatar_arcade::consts::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, SIM_STEP_MS};
    use avatar_arcade::sim::{GameMode, GameSession, HazardKind, SessionPhase, Snapshot, WorldConfig};
    use avatar_arcade::{KeyValueStore, Settings};

    /// Give up after two minutes of simulated play
    const MAX_TICKS: u64 = 60 * 120;

    /// Play one run of `mode` with a naive bot, logging the result
    pub fn run<S: KeyValueStore>(mode: GameMode, settings: &Settings, store: S) {
        let mut session = GameSession::from_settings(
            mode,
            settings,
            DEFAULT_WORLD_WIDTH,
            DEFAULT_WORLD_HEIGHT,
            store,
            0xA11CE,
        );
        session.start();

        let mut now = 0.0;
        session.frame(now);
        while session.phase() == SessionPhase::Playing && session.snapshot().elapsed_ticks < MAX_TICKS {
            if wants_impulse(&session.snapshot(), session.config()) {
                session.impulse();
            }
            now += SIM_STEP_MS;
            session.frame(now);
        }

        let snap = session.snapshot();
        log::info!(
            "{}: score {} after {} ticks ({:?}), best {}",
            mode.as_str(),
            snap.score,
            snap.elapsed_ticks,
            snap.last_collision,
            snap.high_score
        );
        if let Some(summary) = session.last_summary() {
            for id in &summary.newly_unlocked {
                log::info!("  unlocked {}", session.achievement_title(id).unwrap_or(id.as_str()));
            }
        }
    }

    fn wants_impulse(snap: &Snapshot<'_>, config: &WorldConfig) -> bool {
        let actor_right = snap.actor_x + config.actor_width / 2.0;
        let next = snap
            .hazards
            .iter()
            .find(|h| h.right() > snap.actor_x - config.actor_width / 2.0);

        match config.mode {
            GameMode::Flap => {
                let target = match next.map(|h| h.kind) {
                    Some(HazardKind::GapPair { gap_top, gap_size }) => gap_top + gap_size * 0.65,
                    _ => config.ground_top() * 0.5,
                };
                snap.actor.position_y > target && snap.actor.velocity_y >= 0.0
            }
            GameMode::Runner => {
                let Some(hazard) = next else {
                    return false;
                };
                let distance = hazard.left() - actor_right;
                let lead = config.scroll_speed * 6.0;
                !snap.actor.is_airborne
                    && !matches!(hazard.kind, HazardKind::AirborneObstacle { .. })
                    && (0.0..lead).contains(&distance)
            }
        }
    }
}
