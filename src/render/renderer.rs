//! The renderer: consumes the dirty queue, repaints only what changed.
//!
//! A render lock serializes the terminal-write step so a ticker-triggered
//! partial repaint and a navigation-triggered one can never interleave
//! mid-frame. The lock covers only the write (the frame is composed into a
//! byte buffer first), so input waiting never happens under it.

use std::io::Write;
use std::sync::Mutex;

use crate::error::CoreError;
use crate::lock_or_recover;
use crate::render::frame::{paint_full, paint_overlay_screen, paint_region, FrameView};
use crate::render::regions::{DirtyQueue, DirtyRegion, Layout, RegionId};
use crate::theme::Theme;

pub struct Renderer {
    theme: Theme,
    layout: Layout,
    write_lock: Mutex<()>,
}

impl Renderer {
    pub fn new(theme: Theme, layout: Layout) -> Renderer {
        Renderer {
            theme,
            layout,
            write_lock: Mutex::new(()),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Adopt new terminal dimensions; the caller follows up with a full
    /// repaint request.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Drain the queue and repaint. Each region is painted at most once per
    /// pass; a queued `Full` (or an active overlay, which owns the screen)
    /// repaints everything.
    pub fn render(
        &self,
        out: &mut dyn Write,
        view: &FrameView<'_>,
        queue: &mut DirtyQueue,
    ) -> Result<(), CoreError> {
        let ids = queue.take();
        if ids.is_empty() {
            return Ok(());
        }

        let mut frame: Vec<u8> = Vec::new();
        if view.overlay.is_active() {
            paint_overlay_screen(&mut frame, &self.layout, view, self.theme)?;
        } else if ids.contains(&RegionId::Full) {
            paint_full(&mut frame, &self.layout, view, self.theme)?;
        } else if self.layout.is_cramped() {
            paint_full(&mut frame, &self.layout, view, self.theme)?;
        } else {
            for id in ids {
                let region = DirtyRegion {
                    id,
                    rect: self.layout.rect(id),
                };
                paint_region(&mut frame, region, &self.layout, view, self.theme)?;
            }
        }

        let _guard = lock_or_recover(&self.write_lock, "render");
        out.write_all(&frame)?;
        out.flush()?;
        Ok(())
    }
}
