//! The single owned application state.
//!
//! Everything the renderer shows lives here, and only the main loop's
//! dispatch step mutates it. There are no module-level caches for
//! "current highlighted item" or "last sidebar hash"; collapsing that
//! state into one struct is what makes stale-highlight bugs impossible to
//! reintroduce.

use crate::content::{ContentBuffer, Line};
use crate::job::CommandJob;
use crate::menu::MenuTree;
use crate::nav::NavMachine;
use crate::overlay::OverlayState;
use crate::render::FrameView;
use crate::ticker::ServiceStatus;

pub struct AppState {
    pub nav: NavMachine,
    pub content: ContentBuffer,
    pub overlay: OverlayState,
    pub clock: String,
    pub services: Vec<ServiceStatus>,
    pub jobs: Vec<CommandJob>,
    /// Cumulative failed lock attempts, exposed for an outer throttling
    /// policy; survives disengage.
    pub lock_failed_attempts: u32,
    pub running: bool,
}

impl AppState {
    pub fn new(tree: MenuTree) -> AppState {
        let services = tree
            .services
            .iter()
            .map(|spec| ServiceStatus::pending(&spec.name))
            .collect();
        let mut content = ContentBuffer::new();
        content.update(
            "welcome",
            vec![
                Line::dim("↑↓ move · Enter select · ? help"),
                Line::dim("content appears here"),
            ],
        );
        AppState {
            nav: NavMachine::new(tree),
            content,
            overlay: OverlayState::None,
            clock: String::new(),
            services,
            jobs: Vec::new(),
            lock_failed_attempts: 0,
            running: true,
        }
    }

    /// Read-only snapshot for one render pass.
    pub fn frame_view<'a>(&'a self, app_title: &'a str) -> FrameView<'a> {
        FrameView {
            app_title,
            clock: &self.clock,
            breadcrumb: self.nav.breadcrumb(),
            items: self.nav.current_items(),
            selected: self.nav.selected_index(),
            highlight_active: self.nav.highlight_active(),
            content: &self.content,
            services: &self.services,
            overlay: &self.overlay,
        }
    }
}
