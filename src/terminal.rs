//! Terminal host: paints the grid into a ratatui buffer and feeds it crossterm input.
//!
//! One terminal cell is one unit of grid space, so the demo runs the engine with
//! unit-sized rows and a theme measuring one unit per character.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, KeyModifiers, MouseButton as TermButton, MouseEvent, MouseEventKind,
};
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as Area;
use ratatui::style::{Color, Modifier, Style};
use ratatui::Terminal;
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use gridcore::clipboard::SystemClipboard;
use gridcore::draw::{StrokeStyle, TextAlign, ThemeColor};
use gridcore::{
    Bounds, DataGrid, DrawContext, DrawList, GridEvent, GridOptions, KeyCode, KeyPress, KeyResult, Modifiers,
    PointerInput, Redraw, Theme,
};

const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const POLL: Duration = Duration::from_millis(50);

/// Scale `options` and `theme` so one unit is one terminal cell.
pub fn terminal_metrics(options: &mut GridOptions, theme: &mut Theme) {
    options.row_height = 1.0;
    options.header_height = 1.0;
    options.group_header_height = Some(1.0);
    options.row_marker_width = 6.0;
    options.min_column_width = 4.0;
    options.max_column_width = options.max_column_width.min(40.0);
    options.max_column_auto_width = Some(24.0);
    theme.cell_horizontal_padding = 1.0;
    theme.cell_vertical_padding = 0.0;
    theme.char_width = 1.0;
    theme.line_height = 1.0;
    theme.show_grid = false;
}

/// A [`DrawContext`] writing into a ratatui buffer.
pub struct BufferSurface<'a> {
    buf: &'a mut Buffer,
    area: Area,
    clip: Option<Bounds>,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buf: &'a mut Buffer, area: Area) -> Self {
        Self { buf, area, clip: None }
    }

    /// Terminal cells covered by `bounds`, after clipping.
    fn cells(&self, bounds: Bounds) -> impl Iterator<Item = (u16, u16)> {
        let mut b = bounds;
        if let Some(clip) = self.clip {
            let x0 = b.x.max(clip.x);
            let y0 = b.y.max(clip.y);
            let x1 = (b.x + b.width).min(clip.x + clip.width);
            let y1 = (b.y + b.height).min(clip.y + clip.height);
            b = Bounds::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0));
        }
        let x0 = b.x.max(0.0).round() as u16;
        let y0 = b.y.max(0.0).round() as u16;
        let x1 = ((b.x + b.width).round().max(0.0) as u16).min(self.area.width);
        let y1 = ((b.y + b.height).round().max(0.0) as u16).min(self.area.height);
        let area = self.area;
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| (area.x + x, area.y + y)))
    }
}

fn to_color(color: ThemeColor) -> Option<Color> {
    let [r, g, b, a] = color.to_rgba();
    (a > 0).then_some(Color::Rgb(r, g, b))
}

/// Alpha-blend `color` over whatever background the cell already has.
fn blend(under: Color, color: ThemeColor) -> Option<Color> {
    let [r, g, b, a] = color.to_rgba();
    match (a, under) {
        (0, _) => None,
        (255, _) | (_, Color::Reset) => Some(Color::Rgb(r, g, b)),
        (a, Color::Rgb(ur, ug, ub)) => {
            let mix = |top: u8, bottom: u8| ((top as u16 * a as u16 + bottom as u16 * (255 - a as u16)) / 255) as u8;
            Some(Color::Rgb(mix(r, ur), mix(g, ug), mix(b, ub)))
        }
        _ => Some(Color::Rgb(r, g, b)),
    }
}

impl DrawContext for BufferSurface<'_> {
    fn fill_rect(&mut self, bounds: Bounds, color: ThemeColor) {
        let cells: Vec<(u16, u16)> = self.cells(bounds).collect();
        for (x, y) in cells {
            let cell = self.buf.get_mut(x, y);
            if let Some(bg) = blend(cell.bg, color) {
                cell.set_bg(bg);
            }
        }
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: ThemeColor, style: StrokeStyle) {
        let Some(fg) = to_color(color) else {
            return;
        };
        let modifier = match style {
            StrokeStyle::Solid => Modifier::UNDERLINED,
            StrokeStyle::Dashed => Modifier::UNDERLINED | Modifier::DIM,
        };
        let cells: Vec<(u16, u16)> = self.cells(bounds).collect();
        for (x, y) in cells {
            let cell = self.buf.get_mut(x, y);
            cell.set_style(Style::default().add_modifier(modifier).fg(fg));
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: ThemeColor) {
        // Rows are one cell tall; only column rules fit.
        if from.0 != to.0 {
            return;
        }
        let Some(fg) = to_color(color) else {
            return;
        };
        let bounds = Bounds::new(from.0, from.1.min(to.1), 1.0, (to.1 - from.1).abs());
        let cells: Vec<(u16, u16)> = self.cells(bounds).collect();
        for (x, y) in cells {
            let cell = self.buf.get_mut(x, y);
            if cell.symbol() == " " {
                cell.set_symbol("│").set_fg(fg);
            }
        }
    }

    fn text(&mut self, bounds: Bounds, text: &str, color: ThemeColor, align: TextAlign) {
        let Some((x, y)) = self.cells(Bounds::new(bounds.x, bounds.y, bounds.width, 1.0)).next() else {
            return;
        };
        let visible_left = x - self.area.x;
        let width = self
            .cells(Bounds::new(bounds.x, bounds.y, bounds.width, 1.0))
            .count();
        let text_width = text.width();
        let offset = match align {
            TextAlign::Left => 0,
            TextAlign::Center => width.saturating_sub(text_width) / 2,
            TextAlign::Right => width.saturating_sub(text_width),
        };
        // Text starting left of the clip keeps its tail
        let skip = (visible_left as f32 - bounds.x.round()).max(0.0) as usize;
        let shown: String = text.chars().skip(skip).collect();
        let mut style = Style::default();
        if let Some(fg) = to_color(color) {
            style = style.fg(fg);
        }
        self.buf.set_stringn(x + offset as u16, y, shown, width.saturating_sub(offset), style);
    }

    fn image(&mut self, bounds: Bounds, _url: &str) {
        self.text(bounds, "▣", ThemeColor::rgb(128, 128, 128), TextAlign::Left);
    }

    fn clip(&mut self, bounds: Bounds) {
        self.clip = Some(bounds);
    }

    fn unclip(&mut self) {
        self.clip = None;
    }
}

fn key_press(event: KeyEvent) -> Option<KeyPress> {
    use crossterm::event::KeyCode as K;

    let code = match event.code {
        K::Char(c) => KeyCode::Char(c),
        K::Enter => KeyCode::Enter,
        K::Esc => KeyCode::Escape,
        K::Tab => KeyCode::Tab,
        K::BackTab => KeyCode::Tab,
        K::Backspace => KeyCode::Backspace,
        K::Delete => KeyCode::Delete,
        K::Up => KeyCode::Up,
        K::Down => KeyCode::Down,
        K::Left => KeyCode::Left,
        K::Right => KeyCode::Right,
        K::Home => KeyCode::Home,
        K::End => KeyCode::End,
        K::PageUp => KeyCode::PageUp,
        K::PageDown => KeyCode::PageDown,
        K::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(KeyPress::new(code, modifiers(event.modifiers, event.code == K::BackTab)))
}

fn modifiers(mods: KeyModifiers, force_shift: bool) -> Modifiers {
    Modifiers {
        shift: force_shift || mods.contains(KeyModifiers::SHIFT),
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
    }
}

/// Host-side state around the grid: the status line, search prompt and click timing.
pub struct Host {
    grid: DataGrid,
    clipboard: SystemClipboard,
    status: String,
    search: Option<String>,
    last_click: Option<(Instant, u16, u16)>,
    quit: bool,
}

impl Host {
    pub fn new(grid: DataGrid, status: String) -> Self {
        Self {
            grid,
            clipboard: SystemClipboard::new(),
            status,
            search: None,
            last_click: None,
            quit: false,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let size = terminal.size()?;
        self.resize(size.width, size.height);
        let mut dirty = true;

        while !self.quit {
            // ratatui diffs whole frames, so any pending damage repaints everything.
            let pending = self.grid.paint(&mut DrawList::new(), Instant::now());
            if dirty || pending != Redraw::Nothing {
                terminal.draw(|frame| {
                    let area = frame.size();
                    let grid_area = Area::new(area.x, area.y, area.width, area.height.saturating_sub(1));
                    let mut surface = BufferSurface::new(frame.buffer_mut(), grid_area);
                    self.grid.paint_all(&mut surface, Instant::now());
                    let status = self.status_line();
                    frame
                        .buffer_mut()
                        .set_stringn(area.x, area.bottom().saturating_sub(1), status, area.width as usize, Style::default().add_modifier(Modifier::REVERSED));
                })?;
                dirty = false;
            }

            if !event::poll(POLL)? {
                continue;
            }
            dirty = true;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => self.on_key(key),
                Event::Mouse(mouse) => self.on_mouse(mouse),
                Event::Resize(width, height) => self.resize(width, height),
                _ => {}
            }
            self.drain_events();
        }
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.grid.resize(width as f32, height.saturating_sub(1) as f32);
    }

    fn status_line(&self) -> String {
        match &self.search {
            Some(query) => format!(" / {query}"),
            None => {
                let position = self
                    .grid
                    .selection()
                    .current
                    .and_then(|c| self.grid.logical_item(c))
                    .map(|l| format!("R{}C{}", l.row + 1, l.col + 1))
                    .unwrap_or_default();
                format!(" {position}  {}", self.status)
            }
        }
    }

    fn on_key(&mut self, event: KeyEvent) {
        let Some(key) = key_press(event) else {
            return;
        };
        if let Some(query) = self.search.as_mut() {
            match key.code {
                KeyCode::Escape => self.search = None,
                KeyCode::Enter => {
                    let query = self.search.take().unwrap_or_default();
                    let found = self.grid.search(&query);
                    self.grid.search_next();
                    self.status = format!("{found} matches for {query:?}");
                }
                KeyCode::Backspace => {
                    query.pop();
                }
                _ => {
                    if let Some(c) = key.printable() {
                        query.push(c);
                    }
                }
            }
            return;
        }

        match (key.code, key.mods) {
            (KeyCode::Char('q'), Modifiers::CTRL) => self.quit = true,
            (KeyCode::F(3), Modifiers::NONE) => {
                self.grid.search_next();
                self.search_status();
            }
            (KeyCode::F(3), Modifiers::SHIFT) => {
                self.grid.search_prev();
                self.search_status();
            }
            _ => match self.grid.handle_key(key) {
                KeyResult::Copy(text) => self.copy(&text),
                KeyResult::PasteRequested => self.paste(),
                KeyResult::Handled | KeyResult::Ignored => {}
            },
        }
    }

    fn search_status(&mut self) {
        if let Some((index, count)) = self.grid.search_position() {
            self.status = format!("match {index} of {count}");
        }
    }

    fn copy(&mut self, text: &str) {
        match self.clipboard.set_text(text) {
            Ok(()) => self.status = format!("Copied {} bytes", text.len()),
            Err(err) => {
                warn!(%err, "clipboard write failed");
                self.status = err.to_string();
            }
        }
    }

    fn paste(&mut self) {
        match self.clipboard.get_text() {
            Ok(text) => {
                let written = self.grid.paste_text(&text);
                self.status = format!("Pasted {written} cells");
            }
            Err(err) => {
                warn!(%err, "clipboard read failed");
                self.status = err.to_string();
            }
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column as f32 + 0.5, mouse.row as f32 + 0.5);
        let mods = modifiers(mouse.modifiers, false);
        match mouse.kind {
            MouseEventKind::Down(TermButton::Left) => {
                let now = Instant::now();
                let double = matches!(
                    self.last_click,
                    Some((at, cx, cy)) if now.duration_since(at) < DOUBLE_CLICK && (cx, cy) == (mouse.column, mouse.row)
                );
                self.last_click = (!double).then_some((now, mouse.column, mouse.row));
                let input = PointerInput::left(x, y).with_mods(mods);
                self.grid.pointer_down(if double { input.double() } else { input });
            }
            MouseEventKind::Down(TermButton::Right) => {
                self.grid.pointer_down(PointerInput::left(x, y).with_mods(mods).right());
            }
            MouseEventKind::Drag(TermButton::Left) | MouseEventKind::Moved => self.grid.pointer_move(x, y),
            MouseEventKind::Up(TermButton::Left) => self.grid.pointer_up(x, y),
            MouseEventKind::ScrollDown => {
                self.grid.scroll_by(0.0, 3.0);
            }
            MouseEventKind::ScrollUp => {
                self.grid.scroll_by(0.0, -3.0);
            }
            MouseEventKind::ScrollRight => {
                self.grid.scroll_by(4.0, 0.0);
            }
            MouseEventKind::ScrollLeft => {
                self.grid.scroll_by(-4.0, 0.0);
            }
            _ => {}
        }
    }

    /// Turn grid events into status messages.
    fn drain_events(&mut self) {
        for event in self.grid.take_events() {
            debug!(?event, "grid event");
            match event {
                GridEvent::SearchRequested => self.search = Some(String::new()),
                GridEvent::CellsEdited { count, .. } => self.status = format!("{count} cells changed"),
                GridEvent::CellEdited { col, row, .. } => self.status = format!("Edited R{}C{}", row + 1, col + 1),
                GridEvent::UndoRedoPerformed { action } => self.status = format!("{action:?}"),
                GridEvent::SortColumns { columns } => {
                    self.status = match columns.first() {
                        Some(first) => format!("Sorted by column {} {:?}", first.column + 1, first.direction),
                        None => "Sort cleared".to_string(),
                    }
                }
                GridEvent::CellContextMenu { col, row } => {
                    let labels: Vec<&str> = self.grid.cell_menu().items().map(|i| i.label.as_str()).collect();
                    self.status = format!("R{}C{}: {}", row + 1, col + 1, labels.join(" | "));
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf.get(x, y).symbol().to_string()).collect()
    }

    #[test]
    fn test_text_respects_clip_and_alignment() {
        let area = Area::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area);

        surface.clip(Bounds::new(0.0, 0.0, 4.0, 2.0));
        surface.text(Bounds::new(0.0, 0.0, 10.0, 1.0), "abcdefgh", ThemeColor::rgb(0, 0, 0), TextAlign::Left);
        surface.unclip();
        surface.text(Bounds::new(0.0, 1.0, 10.0, 1.0), "xy", ThemeColor::rgb(0, 0, 0), TextAlign::Right);

        assert_eq!(surface_text(&buf, 0), "abcd      ");
        assert_eq!(surface_text(&buf, 1), "        xy");
    }

    #[test]
    fn test_fill_blends_over_background() {
        let area = Area::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area);
        surface.fill_rect(Bounds::new(0.0, 0.0, 2.0, 1.0), ThemeColor::rgb(0, 0, 0));
        surface.fill_rect(Bounds::new(0.0, 0.0, 1.0, 1.0), ThemeColor::rgba(255, 255, 255, 255));
        surface.fill_rect(Bounds::new(1.0, 0.0, 1.0, 1.0), ThemeColor::rgba(0, 0, 0, 0));

        assert_eq!(buf.get(0, 0).bg, Color::Rgb(255, 255, 255));
        assert_eq!(buf.get(1, 0).bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_key_mapping() {
        let back_tab = KeyEvent::new(crossterm::event::KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(key_press(back_tab), Some(KeyPress::new(KeyCode::Tab, Modifiers::SHIFT)));

        let ctrl_c = KeyEvent::new(crossterm::event::KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_press(ctrl_c), Some(KeyPress::new(KeyCode::Char('c'), Modifiers::CTRL)));
    }
}
