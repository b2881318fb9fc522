//! Grid layout with fixed, size-to-content and star tracks.
//!
//! Track sizing runs per axis in priority order, each tier consuming from
//! the space left by the previous one:
//! 1. Fixed: `min(value + gutter, remaining)`.
//! 2. SizeToContent: `min(max cell measure + gutter, remaining)`, measuring
//!    the populated cells of the track against the space still available.
//! 3. Star: the pool left after tiers 1 and 2 is split by weight; shares are
//!    floored and the rounding remainder goes to the last star track. While
//!    measuring, a star track is clamped down to what its content needs.
//!
//! The gutter only applies to columns, is counted against every column but
//! the last and is rendered as blank cells. Columns are solved first; rows
//! are then solved with each cell measured at its column's content width.
//!
//! Invariants:
//! - The solved column widths sum to at most the available width; the same
//!   holds for row heights.
//! - A measured star track never exceeds its content need (plus gutter).
//! - Column and row definitions are frozen once any child has been placed.

use crate::error::LayoutError;
use crate::notify::{SubscriptionId, UpdateNotifier, forward};
use crate::view::View;
use anyhow::Result;
use core_render::{Region, Renderer, Size};
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeMode {
    Fixed,
    Star,
    SizeToContent,
}

impl SizeMode {
    pub fn from_name(name: &str) -> Result<Self, LayoutError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(SizeMode::Fixed),
            "star" | "*" => Ok(SizeMode::Star),
            "size_to_content" | "sizetocontent" | "auto" => Ok(SizeMode::SizeToContent),
            _ => Err(LayoutError::UnknownSizeMode(name.to_string())),
        }
    }
}

impl FromStr for SizeMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeMode::from_name(s)
    }
}

/// Column or row definition. `value` is a length for `Fixed`, a weight for
/// `Star` and unused for `SizeToContent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackDefinition {
    pub size_mode: SizeMode,
    pub value: u16,
}

pub type ColumnDefinition = TrackDefinition;
pub type RowDefinition = TrackDefinition;

impl TrackDefinition {
    pub const fn fixed(length: u16) -> Self {
        Self {
            size_mode: SizeMode::Fixed,
            value: length,
        }
    }

    pub const fn star(weight: u16) -> Self {
        Self {
            size_mode: SizeMode::Star,
            value: weight,
        }
    }

    pub const fn size_to_content() -> Self {
        Self {
            size_mode: SizeMode::SizeToContent,
            value: 0,
        }
    }

    /// Build from a mode name such as `"star"`.
    pub fn parse(mode: &str, value: u16) -> Result<Self, LayoutError> {
        Ok(Self {
            size_mode: SizeMode::from_name(mode)?,
            value,
        })
    }
}

impl fmt::Display for TrackDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size_mode {
            SizeMode::Fixed => write!(f, "{}", self.value),
            SizeMode::Star => write!(f, "{}*", self.value),
            SizeMode::SizeToContent => f.write_str("auto"),
        }
    }
}

/// Which pass the tracks are solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Measure,
    Render,
}

/// Solve one axis. `content(track, available)` returns the largest measured
/// extent of the populated cells of `track` when given `available` cells.
pub fn solve_tracks(
    defs: &[TrackDefinition],
    available: u16,
    gutter: u16,
    pass: Pass,
    mut content: impl FnMut(usize, u16) -> u16,
) -> Vec<u16> {
    let count = defs.len();
    let pad_of = |i: usize| if i + 1 < count { gutter } else { 0 };
    let mut sizes = vec![0u16; count];
    let mut remaining = available;

    for (i, def) in defs.iter().enumerate() {
        if def.size_mode == SizeMode::Fixed {
            let size = def.value.saturating_add(pad_of(i)).min(remaining);
            sizes[i] = size;
            remaining -= size;
        }
    }

    for (i, def) in defs.iter().enumerate() {
        if def.size_mode == SizeMode::SizeToContent {
            let pad = pad_of(i);
            let need = content(i, remaining.saturating_sub(pad));
            let size = need.saturating_add(pad).min(remaining);
            sizes[i] = size;
            remaining -= size;
        }
    }

    let stars: Vec<usize> = (0..count)
        .filter(|&i| defs[i].size_mode == SizeMode::Star)
        .collect();
    let total_weight: u32 = stars.iter().map(|&i| defs[i].value as u32).sum();
    if total_weight > 0 {
        let pool = remaining as u32;
        let mut handed_out = 0u32;
        for (n, &i) in stars.iter().enumerate() {
            let share = if n + 1 == stars.len() {
                pool - handed_out
            } else {
                pool * defs[i].value as u32 / total_weight
            };
            handed_out += share;
            let mut size = share as u16;
            if pass == Pass::Measure {
                let pad = pad_of(i);
                let need = content(i, size.saturating_sub(pad));
                size = size.min(need.saturating_add(pad));
            }
            sizes[i] = size;
        }
    }
    sizes
}

struct Cell {
    view: Arc<dyn View>,
    subscription: SubscriptionId,
}

#[derive(Default)]
struct GridState {
    columns: Vec<ColumnDefinition>,
    rows: Vec<RowDefinition>,
    /// Row-major, `rows * columns` slots.
    cells: Vec<Option<Cell>>,
    locked: bool,
}

impl GridState {
    /// Definitions in effect; an axis without definitions is one star track.
    fn effective(defs: &[TrackDefinition]) -> Vec<TrackDefinition> {
        if defs.is_empty() {
            vec![TrackDefinition::star(1)]
        } else {
            defs.to_vec()
        }
    }

    fn dims(&self) -> (usize, usize) {
        (self.columns.len().max(1), self.rows.len().max(1))
    }

    fn reset_cells(&mut self) {
        let (cols, rows) = self.dims();
        self.cells = (0..cols * rows).map(|_| None).collect();
    }
}

/// Solved track sizes for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: Vec<u16>,
    pub rows: Vec<u16>,
    pub gutter: u16,
}

impl GridLayout {
    /// Width available to the content of `column` (gutter excluded).
    pub fn content_width(&self, column: usize) -> u16 {
        let pad = if column + 1 < self.columns.len() {
            self.gutter
        } else {
            0
        };
        self.columns[column].saturating_sub(pad)
    }
}

type Snapshot = (Vec<TrackDefinition>, Vec<TrackDefinition>, Vec<Option<Arc<dyn View>>>);

pub struct GridView {
    state: RwLock<GridState>,
    gutter: u16,
    updated: UpdateNotifier,
}

impl Default for GridView {
    fn default() -> Self {
        Self::new()
    }
}

impl GridView {
    pub fn new() -> Self {
        let mut state = GridState::default();
        state.reset_cells();
        Self {
            state: RwLock::new(state),
            gutter: 0,
            updated: UpdateNotifier::new(),
        }
    }

    /// Blank columns inserted after every column but the last.
    pub fn with_gutter(mut self, gutter: u16) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn gutter(&self) -> u16 {
        self.gutter
    }

    pub fn set_columns(&self, columns: impl IntoIterator<Item = ColumnDefinition>) -> Result<(), LayoutError> {
        {
            let mut state = self.state.write();
            if state.locked {
                return Err(LayoutError::TracksLocked);
            }
            state.columns = columns.into_iter().collect();
            state.reset_cells();
        }
        self.updated.notify();
        Ok(())
    }

    pub fn set_rows(&self, rows: impl IntoIterator<Item = RowDefinition>) -> Result<(), LayoutError> {
        {
            let mut state = self.state.write();
            if state.locked {
                return Err(LayoutError::TracksLocked);
            }
            state.rows = rows.into_iter().collect();
            state.reset_cells();
        }
        self.updated.notify();
        Ok(())
    }

    pub fn columns(&self) -> Vec<ColumnDefinition> {
        self.state.read().columns.clone()
    }

    pub fn rows(&self) -> Vec<RowDefinition> {
        self.state.read().rows.clone()
    }

    /// Place `view` at (`column`, `row`). An occupied cell is replaced and
    /// its previous view unsubscribed.
    pub fn set_child(&self, view: Arc<dyn View>, column: usize, row: usize) -> Result<(), LayoutError> {
        let replaced = {
            let mut state = self.state.write();
            let (columns, rows) = state.dims();
            if column >= columns || row >= rows {
                return Err(LayoutError::CellOutOfRange {
                    column,
                    row,
                    columns,
                    rows,
                });
            }
            let subscription = forward(view.updated(), &self.updated);
            state.locked = true;
            state.cells[row * columns + column].replace(Cell { view, subscription })
        };
        if let Some(old) = replaced {
            old.view.updated().unsubscribe(old.subscription);
        }
        trace!(target: "view.grid", column, row, "child_set");
        self.updated.notify();
        Ok(())
    }

    pub fn child(&self, column: usize, row: usize) -> Option<Arc<dyn View>> {
        let state = self.state.read();
        let (columns, rows) = state.dims();
        if column >= columns || row >= rows {
            return None;
        }
        state.cells[row * columns + column]
            .as_ref()
            .map(|c| Arc::clone(&c.view))
    }

    fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        (
            GridState::effective(&state.columns),
            GridState::effective(&state.rows),
            state
                .cells
                .iter()
                .map(|c| c.as_ref().map(|c| Arc::clone(&c.view)))
                .collect(),
        )
    }

    /// Solve column widths then row heights for `available` space.
    pub fn layout(&self, renderer: &Renderer, available: Size, pass: Pass) -> GridLayout {
        let (columns, rows, cells) = self.snapshot();
        Self::solve(renderer, &columns, &rows, &cells, self.gutter, available, pass)
    }

    fn solve(
        renderer: &Renderer,
        columns: &[TrackDefinition],
        rows: &[TrackDefinition],
        cells: &[Option<Arc<dyn View>>],
        gutter: u16,
        available: Size,
        pass: Pass,
    ) -> GridLayout {
        let ncols = columns.len();
        let cell = move |c: usize, r: usize| cells[r * ncols + c].as_ref();

        let col_sizes = solve_tracks(columns, available.width, gutter, pass, |c, avail| {
            (0..rows.len())
                .filter_map(|r| cell(c, r))
                .map(|v| v.measure(renderer, Size::new(avail, available.height)).width)
                .max()
                .unwrap_or(0)
        });
        let partial = GridLayout {
            columns: col_sizes,
            rows: Vec::new(),
            gutter,
        };
        let row_sizes = solve_tracks(rows, available.height, 0, pass, |r, avail| {
            (0..ncols)
                .filter_map(|c| cell(c, r).map(|v| (c, v)))
                .map(|(c, v)| v.measure(renderer, Size::new(partial.content_width(c), avail)).height)
                .max()
                .unwrap_or(0)
        });
        GridLayout {
            rows: row_sizes,
            ..partial
        }
    }
}

impl View for GridView {
    fn measure(&self, renderer: &Renderer, max: Size) -> Size {
        let layout = self.layout(renderer, max, Pass::Measure);
        let width: u32 = layout.columns.iter().map(|&w| w as u32).sum();
        let height: u32 = layout.rows.iter().map(|&h| h as u32).sum();
        Size::new(
            width.min(max.width as u32) as u16,
            height.min(max.height as u32) as u16,
        )
    }

    fn render(&self, renderer: &mut Renderer, region: Region) -> Result<()> {
        if region.is_empty() {
            return Ok(());
        }
        let (columns, rows, cells) = self.snapshot();
        let layout = Self::solve(renderer, &columns, &rows, &cells, self.gutter, region.size(), Pass::Render);
        debug!(target: "view.grid", columns = ?layout.columns, rows = ?layout.rows, "grid_layout");
        let overwrite = region.is_overwritten_on_render;
        let ncols = columns.len();
        let mut top = region.top;
        for (r, &height) in layout.rows.iter().enumerate() {
            let mut left = region.left;
            for (c, &width) in layout.columns.iter().enumerate() {
                let content_width = layout.content_width(c);
                let target = Region::new(left, top, content_width, height).with_overwrite(overwrite);
                match &cells[r * ncols + c] {
                    Some(view) => view.render(renderer, target)?,
                    None if overwrite => renderer.clear_region(target)?,
                    None => {}
                }
                let pad = width - content_width;
                if pad > 0 && overwrite {
                    renderer.clear_region(Region::new(left.saturating_add(content_width), top, pad, height))?;
                }
                left = left.saturating_add(width);
            }
            top = top.saturating_add(height);
        }
        Ok(())
    }

    fn updated(&self) -> &UpdateNotifier {
        &self.updated
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        for cell in self.state.get_mut().cells.drain(..).flatten() {
            cell.view.updated().unsubscribe(cell.subscription);
        }
    }
}
