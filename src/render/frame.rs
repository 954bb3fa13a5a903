//! Per-region painters.
//!
//! Every painter repaints its whole rectangle with rows cut and padded to
//! exact display width, so a region clears its own stale cells without ever
//! touching a neighbouring pane (a full-line erase would). All output goes
//! through `&mut dyn Write`, which keeps the painters assertable against
//! plain byte buffers.

use std::io::{self, Write};

use crate::content::{ContentBuffer, LineKind};
use crate::menu::MenuItem;
use crate::overlay::{format_help_panel, format_lock_panel, OverlayState};
use crate::render::regions::{DirtyRegion, Layout, Rect, RegionId};
use crate::surface::{goto, write_at};
use crate::theme::Theme;
use crate::ticker::ServiceStatus;
use crate::width::{display_width, ellipsize, pad_to_width};

const BREADCRUMB_SEP: &str = " ▸ ";
const FOOTER_HINTS: &str = "q quit · ? help · ⏎ select";
const OVERLAY_PANEL_MAX_WIDTH: usize = 48;

/// Read-only snapshot handed to the renderer for one pass. Assembled by the
/// controller; nothing here can mutate application state.
pub struct FrameView<'a> {
    pub app_title: &'a str,
    pub clock: &'a str,
    pub breadcrumb: &'a [String],
    pub items: &'a [MenuItem],
    pub selected: usize,
    pub highlight_active: bool,
    pub content: &'a ContentBuffer,
    pub services: &'a [ServiceStatus],
    pub overlay: &'a OverlayState,
}

pub(super) fn paint_region(
    out: &mut dyn Write,
    region: DirtyRegion,
    layout: &Layout,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    match region.id {
        RegionId::Header => paint_header(out, region.rect, view, theme),
        RegionId::Breadcrumb => paint_breadcrumb(out, region.rect, view, theme),
        RegionId::Sidebar => paint_sidebar(out, region.rect, view, theme),
        RegionId::Content => paint_content(out, region.rect, view, theme),
        RegionId::Footer => paint_footer(out, region.rect, view, theme),
        RegionId::Full => paint_full(out, layout, view, theme),
    }
}

pub(super) fn paint_full(
    out: &mut dyn Write,
    layout: &Layout,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    out.write_all(b"\x1b[2J")?;
    if layout.is_cramped() {
        return paint_cramped(out, layout, theme);
    }
    paint_header(out, layout.header, view, theme)?;
    paint_breadcrumb(out, layout.breadcrumb, view, theme)?;
    paint_sidebar(out, layout.sidebar, view, theme)?;
    paint_content(out, layout.content, view, theme)?;
    paint_footer(out, layout.footer, view, theme)
}

/// Whole-screen overlay frame (lock or help). The overlay owns the screen,
/// so this clears everything and centers the panel.
pub(super) fn paint_overlay_screen(
    out: &mut dyn Write,
    layout: &Layout,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    out.write_all(b"\x1b[2J")?;
    let width = (layout.cols as usize).saturating_sub(4).min(OVERLAY_PANEL_MAX_WIDTH);
    let panel = match view.overlay {
        OverlayState::Lock(state) => format_lock_panel(state, theme, width),
        _ => format_help_panel(theme, width),
    };
    let start_row = (layout.rows as usize).saturating_sub(panel.len()) / 2 + 1;
    let start_col = (layout.cols as usize).saturating_sub(width) / 2 + 1;
    for (idx, line) in panel.iter().enumerate() {
        let row = (start_row + idx).min(layout.rows as usize) as u16;
        write_at(out, row, start_col as u16, line)?;
    }
    Ok(())
}

fn paint_cramped(out: &mut dyn Write, layout: &Layout, theme: Theme) -> io::Result<()> {
    let colors = theme.colors();
    out.write_all(goto(1, 1).as_bytes())?;
    let msg = pad_to_width("terminal too small", layout.cols as usize);
    out.write_all(theme.paint(colors.error, &msg).as_bytes())
}

/// Left-and-right composed single row padded to the exact rect width.
fn two_sided_row(left: &str, right: &str, width: usize) -> (String, String, String) {
    let right_cut = ellipsize(right, width / 2);
    let left_budget = width.saturating_sub(display_width(&right_cut));
    let left_cut = ellipsize(left, left_budget);
    let gap = width
        .saturating_sub(display_width(&left_cut))
        .saturating_sub(display_width(&right_cut));
    (left_cut, " ".repeat(gap), right_cut)
}

fn paint_header(
    out: &mut dyn Write,
    rect: Rect,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let colors = theme.colors();
    let left = format!(" {}", view.app_title);
    let right = format!("{} ", view.clock);
    let (left, gap, right) = two_sided_row(&left, &right, rect.width as usize);
    out.write_all(goto(rect.row, rect.col).as_bytes())?;
    out.write_all(theme.paint(colors.title, &left).as_bytes())?;
    out.write_all(gap.as_bytes())?;
    out.write_all(theme.paint(colors.dim, &right).as_bytes())
}

fn paint_breadcrumb(
    out: &mut dyn Write,
    rect: Rect,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let colors = theme.colors();
    let width = rect.width as usize;
    let (head, tail) = match view.breadcrumb {
        [] => (String::new(), String::new()),
        [only] => (String::new(), only.clone()),
        [init @ .., last] => (
            format!("{}{}", init.join(BREADCRUMB_SEP), BREADCRUMB_SEP),
            last.clone(),
        ),
    };
    let plain = format!(" {head}{tail}");
    out.write_all(goto(rect.row, rect.col).as_bytes())?;
    if display_width(&plain) <= width {
        // paint head and tail separately so only the tail carries the
        // active-submenu emphasis
        let pad = " ".repeat(width - display_width(&plain));
        out.write_all(theme.paint(colors.dim, &format!(" {head}")).as_bytes())?;
        let tail_color = if view.highlight_active {
            colors.accent
        } else {
            colors.title
        };
        out.write_all(theme.paint(tail_color, &tail).as_bytes())?;
        out.write_all(pad.as_bytes())
    } else {
        let cut = ellipsize(&plain, width);
        let pad = " ".repeat(width.saturating_sub(display_width(&cut)));
        out.write_all(theme.paint(colors.dim, &cut).as_bytes())?;
        out.write_all(pad.as_bytes())
    }
}

fn sidebar_row_text(item: &MenuItem, selected: bool, width: usize) -> String {
    let marker = if selected { "▸ " } else { "  " };
    let icon = if item.icon.is_empty() {
        String::new()
    } else {
        format!("{} ", item.icon)
    };
    pad_to_width(&format!("{marker}{icon}{}", item.label), width)
}

fn paint_sidebar(
    out: &mut dyn Write,
    rect: Rect,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let colors = theme.colors();
    // rightmost column is the pane divider
    let usable = (rect.width as usize).saturating_sub(1);
    let border = theme.paint(colors.dim, "│");

    for row in 0..rect.height {
        let body = match view.items.get(row as usize) {
            Some(item) => {
                let selected = row as usize == view.selected;
                let text = sidebar_row_text(item, selected, usable);
                if !item.enabled {
                    theme.paint(colors.dim, &text)
                } else if selected {
                    theme.paint(colors.invert, &text)
                } else {
                    text
                }
            }
            None => " ".repeat(usable),
        };
        write_at(out, rect.row + row, rect.col, &format!("{body}{border}"))?;
    }
    Ok(())
}

fn paint_content(
    out: &mut dyn Write,
    rect: Rect,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let colors = theme.colors();
    let width = rect.width as usize;
    let inner = width.saturating_sub(1);
    let content: &ContentBuffer = view.content;

    // title row
    out.write_all(goto(rect.row, rect.col).as_bytes())?;
    let title = pad_to_width(&format!(" {}", content.title()), inner);
    let title_color = if content.title_is_error() {
        colors.error
    } else {
        colors.title
    };
    out.write_all(b" ")?;
    out.write_all(theme.paint(title_color, &title).as_bytes())?;

    // separator row
    if rect.height > 1 {
        out.write_all(goto(rect.row + 1, rect.col).as_bytes())?;
        let rule: String = std::iter::once(' ')
            .chain(std::iter::repeat('─').take(inner))
            .collect();
        out.write_all(theme.paint(colors.dim, &rule).as_bytes())?;
    }

    let visible = content.visible();
    let body_rows = rect.height.saturating_sub(2);
    for row in 0..body_rows {
        let body = match visible.get(row as usize) {
            Some(line) => {
                let text = pad_to_width(&line.text, inner);
                match line.kind {
                    LineKind::Normal => text,
                    LineKind::Dim => theme.paint(colors.dim, &text),
                    LineKind::Error => theme.paint(colors.error, &text),
                }
            }
            None => " ".repeat(inner),
        };
        write_at(out, rect.row + 2 + row, rect.col, &format!(" {body}"))?;
    }
    Ok(())
}

fn paint_footer(
    out: &mut dyn Write,
    rect: Rect,
    view: &FrameView<'_>,
    theme: Theme,
) -> io::Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let colors = theme.colors();
    let mut right = String::new();
    for svc in view.services {
        let dot = match svc.healthy {
            Some(true) => theme.paint(colors.ok, "●"),
            Some(false) => theme.paint(colors.error, "●"),
            None => theme.paint(colors.dim, "○"),
        };
        right.push_str(&format!("{dot}{} ", svc.name));
    }
    let position = view.content.position_label();
    if !position.is_empty() {
        right.push_str(&theme.paint(colors.dim, &position));
        right.push(' ');
    }

    // the right side carries SGR runs, so measure the plain equivalent
    let mut plain_right = String::new();
    for svc in view.services {
        plain_right.push_str(&format!("●{} ", svc.name));
    }
    if !position.is_empty() {
        plain_right.push_str(&position);
        plain_right.push(' ');
    }

    let width = rect.width as usize;
    let left = format!(" {FOOTER_HINTS}");
    let left_budget = width.saturating_sub(display_width(&plain_right));
    let left_cut = ellipsize(&left, left_budget);
    let gap = width
        .saturating_sub(display_width(&left_cut))
        .saturating_sub(display_width(&plain_right));

    out.write_all(goto(rect.row, rect.col).as_bytes())?;
    out.write_all(theme.paint(colors.dim, &left_cut).as_bytes())?;
    out.write_all(" ".repeat(gap).as_bytes())?;
    out.write_all(right.as_bytes())
}
