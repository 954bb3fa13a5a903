//! The run loop: input events in, dirty regions out.
//!
//! Ordering guarantees kept here: at most one navigation transition per key
//! event, and the resulting regions are rendered atomically (one `render`
//! call under the write lock) before the next event is considered. Ticker
//! patches and job output are applied between events, at a safe point, on
//! this thread only. The background threads never touch state themselves.

use std::io;
use std::time::Duration;

use crate::app::context::AppState;
use crate::config::AppConfig;
use crate::content::Line;
use crate::error::CoreError;
use crate::input::{InputReader, KeyKind, Shortcut};
use crate::job::JobMessage;
use crate::log_debug;
use crate::menu::MenuTree;
use crate::nav::NavEffect;
use crate::overlay::{LockState, OverlayState};
use crate::registry::{AppContext, Registry};
use crate::render::{DirtyQueue, Layout, RegionId, Renderer};
use crate::surface::{self, SurfaceGuard};
use crate::ticker::{StatusTicker, VolatilePatch};

/// Main-loop poll timeout: short enough that ticker patches and resize
/// signals are observed promptly while we wait for keys.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Acquire the terminal and drive the dashboard until quit or fatal error.
///
/// Shutdown order is fixed: the ticker thread is stopped first, the
/// terminal is restored last, on every path out of this function (the
/// surface guard is declared first so it drops last).
pub fn run(config: &AppConfig, tree: MenuTree, registry: Registry) -> Result<(), CoreError> {
    let guard = SurfaceGuard::acquire()?;
    surface::install_resize_handler()?;

    let (cols, rows) = surface::terminal_size();
    let mut renderer = Renderer::new(config.resolve_theme(), Layout::compute(cols, rows));

    let service_specs = tree.services.clone();
    let mut state = AppState::new(tree);
    state.content.set_viewport(renderer.layout().content_viewport());

    let mut queue = DirtyQueue::new();
    queue.request_full();

    let mut reader = InputReader::spawn(config.debounce_window());
    let mut ticker = StatusTicker::spawn(config.tick_period(), service_specs);
    let mut stdout = io::stdout();

    log_debug("event loop started");
    let result = loop {
        if let Some(event) = reader.next_event(INPUT_POLL) {
            let switched = dispatch_key(
                &mut state,
                &mut queue,
                &registry,
                config.lock_pass.as_deref(),
                &event.kind,
            );
            if switched {
                reader.flush();
            }
        }

        while let Some(patch) = ticker.try_recv() {
            apply_volatile(&mut state, &mut queue, patch);
        }
        poll_jobs(&mut state, &mut queue);

        if surface::take_resize() {
            let (cols, rows) = surface::terminal_size();
            handle_resize(&mut renderer, &mut state, &mut queue, cols, rows);
        }

        if !queue.is_empty() {
            let view = state.frame_view(&config.title);
            if let Err(err) = renderer.render(&mut stdout, &view, &mut queue) {
                log_debug(&format!("fatal render error: {err}"));
                break Err(err);
            }
        }

        if !state.running {
            break Ok(());
        }
    };

    ticker.stop();
    guard.release();
    log_debug("event loop finished");
    result
}

/// Route one key event. Returns true when the navigation context switched
/// and the caller must flush the input reader (ghost-key defense).
pub fn dispatch_key(
    state: &mut AppState,
    queue: &mut DirtyQueue,
    registry: &Registry,
    lock_pass: Option<&str>,
    key: &KeyKind,
) -> bool {
    if state.overlay.is_locked() {
        return dispatch_locked(state, queue, key);
    }
    if matches!(state.overlay, OverlayState::Help) {
        return dispatch_help(state, queue, key);
    }

    match key {
        KeyKind::Char('q') | KeyKind::Shortcut(Shortcut::Quit) => {
            state.running = false;
            false
        }
        KeyKind::Char('?') | KeyKind::Shortcut(Shortcut::Help) => {
            state.overlay = OverlayState::Help;
            queue.request_full();
            true
        }
        KeyKind::Shortcut(Shortcut::Lock) => match lock_pass {
            Some(pass) => {
                state.overlay = OverlayState::Lock(LockState::engage(pass));
                queue.request_full();
                true
            }
            None => false,
        },
        KeyKind::Shortcut(Shortcut::PageUp) => {
            state.content.scroll(-(state.content.viewport() as isize));
            queue.extend([RegionId::Content, RegionId::Footer]);
            false
        }
        KeyKind::Shortcut(Shortcut::PageDown) => {
            state.content.scroll(state.content.viewport() as isize);
            queue.extend([RegionId::Content, RegionId::Footer]);
            false
        }
        KeyKind::Direction(_) | KeyKind::Confirm | KeyKind::Cancel => {
            let response = state.nav.apply(key);
            queue.extend(response.dirty);
            if let Some(NavEffect::Activate(handler_key)) = response.effect {
                run_handler(state, queue, registry, &handler_key);
            }
            response.context_switched
        }
        _ => false,
    }
}

fn dispatch_locked(state: &mut AppState, queue: &mut DirtyQueue, key: &KeyKind) -> bool {
    let OverlayState::Lock(lock) = &mut state.overlay else {
        return false;
    };
    match key {
        KeyKind::Char(ch) => {
            lock.push_char(*ch);
            queue.request_full();
            false
        }
        KeyKind::Shortcut(Shortcut::Erase) => {
            lock.erase();
            queue.request_full();
            false
        }
        KeyKind::Confirm => {
            if lock.attempt() {
                // navigation state was never consulted while locked, so it
                // comes back exactly as it was
                state.overlay = OverlayState::None;
                queue.request_full();
                true
            } else {
                state.lock_failed_attempts += 1;
                log_debug("lock attempt failed");
                queue.request_full();
                false
            }
        }
        KeyKind::Cancel => {
            state.overlay = OverlayState::None;
            queue.request_full();
            true
        }
        KeyKind::Shortcut(Shortcut::Quit) => {
            state.running = false;
            false
        }
        _ => false,
    }
}

fn dispatch_help(state: &mut AppState, queue: &mut DirtyQueue, key: &KeyKind) -> bool {
    match key {
        KeyKind::Cancel
        | KeyKind::Confirm
        | KeyKind::Char('?')
        | KeyKind::Shortcut(Shortcut::Help) => {
            state.overlay = OverlayState::None;
            queue.request_full();
            true
        }
        KeyKind::Char('q') | KeyKind::Shortcut(Shortcut::Quit) => {
            state.running = false;
            false
        }
        _ => false,
    }
}

/// Run an action handler, recovering failures into the content pane;
/// a broken action must never take the dashboard down.
fn run_handler(state: &mut AppState, queue: &mut DirtyQueue, registry: &Registry, key: &str) {
    let outcome = {
        let mut ctx = AppContext {
            content: &mut state.content,
            dirty: queue,
            jobs: &mut state.jobs,
            services: &state.services,
        };
        registry.run(key, &mut ctx)
    };
    if let Err(err) = outcome {
        log_debug(&format!("handler `{key}` failed: {err}"));
        tracing::warn!(handler = key, error = %err, "handler failed");
        state.content.update_error("action failed", &err.to_string());
        queue.push(RegionId::Content);
    }
}

/// Apply one ticker patch at a safe point. Volatile data never touches
/// navigation state.
pub fn apply_volatile(state: &mut AppState, queue: &mut DirtyQueue, patch: VolatilePatch) {
    match patch {
        VolatilePatch::Clock(clock) => {
            if state.clock != clock {
                state.clock = clock;
                queue.push(RegionId::Header);
            }
        }
        VolatilePatch::Service(status) => {
            let summary = status.summary();
            let key = format!("svc:{}", status.name);
            match state.services.iter_mut().find(|s| s.name == status.name) {
                Some(existing) => {
                    if *existing != status {
                        *existing = status;
                        queue.push(RegionId::Footer);
                    }
                }
                None => {
                    state.services.push(status);
                    queue.push(RegionId::Footer);
                }
            }
            if state.content.update_volatile(&key, &summary) {
                queue.push(RegionId::Content);
            }
        }
    }
}

/// Drain finished and in-flight job output into the content pane.
pub fn poll_jobs(state: &mut AppState, queue: &mut DirtyQueue) {
    let mut touched = false;
    for job in &mut state.jobs {
        for message in job.try_drain() {
            match message {
                JobMessage::Lines(lines) => {
                    state
                        .content
                        .append(lines.into_iter().map(Line::normal).collect());
                    touched = true;
                }
                JobMessage::Finished { code: 0 } => {
                    state.content.append(vec![Line::dim("done")]);
                    touched = true;
                }
                JobMessage::Finished { code } => {
                    state.content.append(vec![Line::error(format!("exit {code}"))]);
                    touched = true;
                }
                JobMessage::Failed(err) => {
                    state.content.append(vec![Line::error(err)]);
                    touched = true;
                }
                JobMessage::Canceled => {
                    state.content.append(vec![Line::dim("canceled")]);
                    touched = true;
                }
            }
        }
    }
    state.jobs.retain(|job| !job.is_done());
    if touched {
        queue.extend([RegionId::Content, RegionId::Footer]);
    }
}

/// Resize: recompute every rectangle, force a full repaint, and leave
/// navigation state alone.
pub fn handle_resize(
    renderer: &mut Renderer,
    state: &mut AppState,
    queue: &mut DirtyQueue,
    cols: u16,
    rows: u16,
) {
    renderer.set_layout(Layout::compute(cols, rows));
    state
        .content
        .set_viewport(renderer.layout().content_viewport());
    queue.request_full();
    log_debug(&format!("resize to {cols}x{rows}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Direction;
    use crate::menu::{MenuItem, MenuSection};
    use crate::theme::Theme;

    fn leaf(id: &str, handler: &str) -> MenuItem {
        MenuItem {
            id: id.into(),
            label: id.into(),
            icon: String::new(),
            handler: Some(handler.into()),
            enabled: true,
            body: vec!["body".into()],
            items: Vec::new(),
        }
    }

    fn tree() -> MenuTree {
        MenuTree {
            sections: vec![MenuSection {
                title: "Main".into(),
                items: vec![leaf("one", "text:one"), leaf("two", "text:two")],
            }],
            services: Vec::new(),
        }
    }

    fn setup() -> (AppState, DirtyQueue, Registry) {
        let tree = tree();
        let registry = Registry::with_builtins(&tree).expect("registry");
        let mut state = AppState::new(tree);
        state.content.set_viewport(10);
        (state, DirtyQueue::new(), registry)
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let (mut state, mut queue, registry) = setup();
        dispatch_key(&mut state, &mut queue, &registry, None, &KeyKind::Char('q'));
        assert!(!state.running);
    }

    #[test]
    fn confirm_runs_the_selected_handler() {
        let (mut state, mut queue, registry) = setup();
        dispatch_key(&mut state, &mut queue, &registry, None, &KeyKind::Confirm);
        assert_eq!(state.content.title(), "one");
        assert_eq!(queue.take(), vec![RegionId::Content]);
    }

    #[test]
    fn handler_failure_is_rendered_not_fatal() {
        let tree = MenuTree {
            sections: vec![MenuSection {
                title: "Main".into(),
                items: vec![leaf("boom", "cmd:")],
            }],
            services: Vec::new(),
        };
        // `cmd:` with an empty command registers fine but fails when run
        let registry = Registry::with_builtins(&tree).expect("registry");
        let mut state = AppState::new(tree);
        state.content.set_viewport(10);
        let mut queue = DirtyQueue::new();
        dispatch_key(&mut state, &mut queue, &registry, None, &KeyKind::Confirm);
        assert!(state.running);
        assert!(state.content.title_is_error());
        assert_eq!(state.content.title(), "action failed");
    }

    #[test]
    fn lock_shortcut_is_inert_without_a_passphrase() {
        let (mut state, mut queue, registry) = setup();
        dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            None,
            &KeyKind::Shortcut(Shortcut::Lock),
        );
        assert!(!state.overlay.is_active());
    }

    #[test]
    fn scenario_c_lock_overlay_round_trip() {
        let (mut state, mut queue, registry) = setup();
        // move selection so we can prove navigation is untouched
        dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            Some("pw"),
            &KeyKind::Direction(Direction::Down),
        );
        let nav_before = (
            state.nav.section_index(),
            state.nav.selected_index(),
            state.nav.breadcrumb().to_vec(),
        );

        let switched = dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            Some("pw"),
            &KeyKind::Shortcut(Shortcut::Lock),
        );
        assert!(switched);
        assert!(state.overlay.is_locked());

        // three wrong attempts, then the right one
        for wrong in ["a", "b", "c"] {
            for ch in wrong.chars() {
                dispatch_key(
                    &mut state,
                    &mut queue,
                    &registry,
                    Some("pw"),
                    &KeyKind::Char(ch),
                );
            }
            dispatch_key(&mut state, &mut queue, &registry, Some("pw"), &KeyKind::Confirm);
            assert!(state.overlay.is_locked());
        }
        assert_eq!(state.lock_failed_attempts, 3);

        for ch in "pw".chars() {
            dispatch_key(
                &mut state,
                &mut queue,
                &registry,
                Some("pw"),
                &KeyKind::Char(ch),
            );
        }
        let switched =
            dispatch_key(&mut state, &mut queue, &registry, Some("pw"), &KeyKind::Confirm);
        assert!(switched);
        assert!(!state.overlay.is_active());
        assert_eq!(state.lock_failed_attempts, 3);

        let nav_after = (
            state.nav.section_index(),
            state.nav.selected_index(),
            state.nav.breadcrumb().to_vec(),
        );
        assert_eq!(nav_before, nav_after);
        // the overlay owned the whole screen; leaving it repaints everything
        assert_eq!(queue.take(), vec![RegionId::Full]);
    }

    #[test]
    fn locked_overlay_swallows_navigation_keys() {
        let (mut state, mut queue, registry) = setup();
        dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            Some("pw"),
            &KeyKind::Shortcut(Shortcut::Lock),
        );
        let selected = state.nav.selected_index();
        dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            Some("pw"),
            &KeyKind::Direction(Direction::Down),
        );
        assert_eq!(state.nav.selected_index(), selected);
    }

    #[test]
    fn help_overlay_toggles_and_forces_full_repaint() {
        let (mut state, mut queue, registry) = setup();
        let switched = dispatch_key(&mut state, &mut queue, &registry, None, &KeyKind::Char('?'));
        assert!(switched);
        assert!(matches!(state.overlay, OverlayState::Help));
        assert_eq!(queue.take(), vec![RegionId::Full]);

        let switched = dispatch_key(&mut state, &mut queue, &registry, None, &KeyKind::Cancel);
        assert!(switched);
        assert!(!state.overlay.is_active());
        assert_eq!(queue.take(), vec![RegionId::Full]);
    }

    #[test]
    fn clock_patch_dirties_only_the_header() {
        let (mut state, mut queue, _registry) = setup();
        apply_volatile(
            &mut state,
            &mut queue,
            VolatilePatch::Clock("10:00:00 UTC".into()),
        );
        assert_eq!(queue.take(), vec![RegionId::Header]);
        // identical clock again: nothing to repaint
        apply_volatile(
            &mut state,
            &mut queue,
            VolatilePatch::Clock("10:00:00 UTC".into()),
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn service_patch_updates_footer_and_volatile_rows() {
        use crate::ticker::ServiceStatus;
        let (mut state, mut queue, _registry) = setup();
        state.content.update(
            "services",
            vec![crate::content::Line::volatile("svc:api", "api ?")],
        );
        apply_volatile(
            &mut state,
            &mut queue,
            VolatilePatch::Service(ServiceStatus {
                name: "api".into(),
                healthy: Some(true),
                detail: "ok".into(),
            }),
        );
        let dirty = queue.take();
        assert!(dirty.contains(&RegionId::Footer));
        assert!(dirty.contains(&RegionId::Content));
        assert_eq!(state.services[0].healthy, Some(true));
    }

    #[test]
    fn scenario_d_resize_full_repaint_preserves_navigation() {
        let (mut state, mut queue, registry) = setup();
        dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            None,
            &KeyKind::Direction(Direction::Down),
        );
        queue.take();
        let nav_before = (
            state.nav.section_index(),
            state.nav.selected_index(),
            state.nav.breadcrumb().to_vec(),
        );

        let mut renderer = Renderer::new(Theme::Mono, Layout::compute(80, 24));
        handle_resize(&mut renderer, &mut state, &mut queue, 100, 40);

        assert_eq!(queue.take(), vec![RegionId::Full]);
        assert_eq!(renderer.layout().cols, 100);
        let nav_after = (
            state.nav.section_index(),
            state.nav.selected_index(),
            state.nav.breadcrumb().to_vec(),
        );
        assert_eq!(nav_before, nav_after);
    }

    #[test]
    fn page_scroll_dirties_content_and_footer() {
        let (mut state, mut queue, registry) = setup();
        state.content.update(
            "long",
            (0..40)
                .map(|i| crate::content::Line::normal(format!("{i}")))
                .collect(),
        );
        queue.take();
        dispatch_key(
            &mut state,
            &mut queue,
            &registry,
            None,
            &KeyKind::Shortcut(Shortcut::PageDown),
        );
        assert_eq!(state.content.scroll_offset(), 10);
        let dirty = queue.take();
        assert!(dirty.contains(&RegionId::Content));
        assert!(dirty.contains(&RegionId::Footer));
    }
}
