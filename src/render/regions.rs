//! Named screen rectangles and the dirty-region queue.

/// The five fixed panes, plus a whole-screen request used only after resize
/// or surface re-acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionId {
    Header,
    Breadcrumb,
    Sidebar,
    Content,
    Footer,
    Full,
}

/// 1-based terminal rectangle (rows and columns as the terminal counts them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub row: u16,
    pub col: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        row: 1,
        col: 1,
        width: 0,
        height: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A repaint request: consumed within the same render pass, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRegion {
    pub id: RegionId,
    pub rect: Rect,
}

/// Terminal width breakpoints for responsive layout.
mod breakpoints {
    /// Below this the dashboard cannot be drawn meaningfully.
    pub const MINIMAL_COLS: u16 = 24;
    pub const MINIMAL_ROWS: u16 = 6;
    /// Below this the sidebar narrows.
    pub const COMPACT: u16 = 60;
    pub const SIDEBAR_FULL: u16 = 24;
    pub const SIDEBAR_COMPACT: u16 = 16;
}

/// Computed rectangles for one terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cols: u16,
    pub rows: u16,
    pub header: Rect,
    pub breadcrumb: Rect,
    pub sidebar: Rect,
    pub content: Rect,
    pub footer: Rect,
}

impl Layout {
    pub fn compute(cols: u16, rows: u16) -> Layout {
        if cols < breakpoints::MINIMAL_COLS || rows < breakpoints::MINIMAL_ROWS {
            return Layout {
                cols,
                rows,
                header: Rect::ZERO,
                breadcrumb: Rect::ZERO,
                sidebar: Rect::ZERO,
                content: Rect {
                    row: 1,
                    col: 1,
                    width: cols,
                    height: rows,
                },
                footer: Rect::ZERO,
            };
        }

        let sidebar_width = if cols < breakpoints::COMPACT {
            breakpoints::SIDEBAR_COMPACT
        } else {
            breakpoints::SIDEBAR_FULL
        }
        .min(cols / 2);
        let body_top = 3u16;
        let body_height = rows - 3;

        Layout {
            cols,
            rows,
            header: Rect {
                row: 1,
                col: 1,
                width: cols,
                height: 1,
            },
            breadcrumb: Rect {
                row: 2,
                col: 1,
                width: cols,
                height: 1,
            },
            sidebar: Rect {
                row: body_top,
                col: 1,
                width: sidebar_width,
                height: body_height,
            },
            content: Rect {
                row: body_top,
                col: sidebar_width + 1,
                width: cols - sidebar_width,
                height: body_height,
            },
            footer: Rect {
                row: rows,
                col: 1,
                width: cols,
                height: 1,
            },
        }
    }

    /// Too small for the five-pane layout; the renderer falls back to a
    /// single message.
    pub fn is_cramped(&self) -> bool {
        self.header.is_empty()
    }

    pub fn rect(&self, id: RegionId) -> Rect {
        match id {
            RegionId::Header => self.header,
            RegionId::Breadcrumb => self.breadcrumb,
            RegionId::Sidebar => self.sidebar,
            RegionId::Content => self.content,
            RegionId::Footer => self.footer,
            RegionId::Full => Rect {
                row: 1,
                col: 1,
                width: self.cols,
                height: self.rows,
            },
        }
    }

    /// Content rows available for buffer lines (one row goes to the title).
    pub fn content_viewport(&self) -> usize {
        (self.content.height as usize).saturating_sub(2)
    }
}

/// Pending repaint requests for the next frame.
///
/// Duplicates collapse and `Full` subsumes everything, so no region is ever
/// painted twice in one pass.
#[derive(Debug, Default)]
pub struct DirtyQueue {
    ids: Vec<RegionId>,
}

impl DirtyQueue {
    pub fn new() -> DirtyQueue {
        DirtyQueue::default()
    }

    pub fn push(&mut self, id: RegionId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = RegionId>) {
        for id in ids {
            self.push(id);
        }
    }

    pub fn request_full(&mut self) {
        self.ids.clear();
        self.ids.push(RegionId::Full);
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drain for one render pass. A queued `Full` wins over everything.
    pub fn take(&mut self) -> Vec<RegionId> {
        let ids = std::mem::take(&mut self.ids);
        if ids.contains(&RegionId::Full) {
            vec![RegionId::Full]
        } else {
            ids
        }
    }
}
