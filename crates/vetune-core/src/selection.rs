//! Cell Selection
//!
//! Tracks the active cell (cursor) and an optional rectangular multi-cell
//! selection over a table. Coordinates are always clamped into the table, and
//! [`Bounds`] are normalised so `min <= max` whichever corner the user
//! dragged from.
//!
//! Keyboard flow: Shift+direction starts or grows the rectangle from the
//! cursor, plain navigation or Escape drops it. Mouse flow: button-down
//! starts a drag, moves extend it, button-up freezes it.

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// A cell coordinate: `x` is the column, `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl CellPos {
    /// Cell at column `x`, row `y`
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Normalised inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Leftmost column
    pub min_x: usize,
    /// Top row
    pub min_y: usize,
    /// Rightmost column
    pub max_x: usize,
    /// Bottom row
    pub max_y: usize,
}

impl Bounds {
    /// Rectangle spanned by two corners in any order
    pub fn from_corners(a: CellPos, b: CellPos) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// One-cell rectangle
    pub fn single(cell: CellPos) -> Self {
        Self::from_corners(cell, cell)
    }

    /// Square window of `radius` around `center`, clipped to a `width`x`height` table
    pub fn around(center: CellPos, radius: usize, width: usize, height: usize) -> Self {
        Self {
            min_x: center.x.saturating_sub(radius),
            min_y: center.y.saturating_sub(radius),
            max_x: (center.x + radius).min(width.saturating_sub(1)),
            max_y: (center.y + radius).min(height.saturating_sub(1)),
        }
    }

    /// Number of columns covered
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    /// Number of rows covered
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Number of cells covered
    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Whether `(x, y)` lies inside
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether the whole rectangle lies inside a `width`x`height` table
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.max_x < width && self.max_y < height
    }

    /// All cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }
}

/// Rectangle as the user drew it: `start` is the anchor, `end` the free corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    /// Anchor corner
    pub start: CellPos,
    /// Free corner
    pub end: CellPos,
}

impl CellRange {
    /// Range from `start` to `end`
    pub fn new(start: CellPos, end: CellPos) -> Self {
        Self { start, end }
    }

    /// Normalised bounds
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.start, self.end)
    }
}

/// Arrow-key direction
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Cursor plus optional rectangular selection over one table
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    cursor: Option<CellPos>,
    range: Option<CellRange>,
    dragging: bool,
    drag_origin: Option<(f32, f32)>,
    drag_current: Option<(f32, f32)>,
    width: usize,
    height: usize,
}

impl Selection {
    /// Empty selection over a `width`x`height` table
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cursor: None,
            range: None,
            dragging: false,
            drag_origin: None,
            drag_current: None,
            width,
            height,
        }
    }

    /// Empty selection sized for `table`
    pub fn for_table(table: &Table) -> Self {
        Self::new(table.width(), table.height())
    }

    /// Adopt new table dimensions, pulling the cursor and rectangle inside
    pub fn set_limits(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cursor = self.cursor.map(|c| self.clamp_pos(c.x, c.y));
        if let Some(range) = self.range {
            self.range = Some(CellRange::new(
                self.clamp_pos(range.start.x, range.start.y),
                self.clamp_pos(range.end.x, range.end.y),
            ));
        }
    }

    /// Active single cell
    pub fn cursor(&self) -> Option<CellPos> {
        self.cursor
    }

    /// Move the active cell (clamped into the table)
    pub fn set_cursor(&mut self, x: usize, y: usize) -> CellPos {
        let pos = self.clamp_pos(x, y);
        self.cursor = Some(pos);
        pos
    }

    /// Forget the active cell
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Rectangle as drawn, if one is active
    pub fn range(&self) -> Option<CellRange> {
        self.range
    }

    /// Whether a multi-cell rectangle is active
    pub fn is_active(&self) -> bool {
        self.range.is_some()
    }

    /// Whether a mouse drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer position where the current drag started
    pub fn drag_origin(&self) -> Option<(f32, f32)> {
        self.drag_origin
    }

    /// Last pointer position seen during the drag
    pub fn drag_current(&self) -> Option<(f32, f32)> {
        self.drag_current
    }

    /// Begin a new rectangle anchored at `(x, y)`
    pub fn start(&mut self, x: usize, y: usize) {
        let pos = self.clamp_pos(x, y);
        self.range = Some(CellRange::new(pos, pos));
        self.dragging = false;
    }

    /// Move the free corner to `(x, y)`; the anchor stays put
    pub fn update(&mut self, x: usize, y: usize) {
        let pos = self.clamp_pos(x, y);
        if let Some(range) = self.range.as_mut() {
            range.end = pos;
        }
    }

    /// Freeze the rectangle
    pub fn end(&mut self) {
        self.dragging = false;
    }

    /// Drop the rectangle and any drag state. The cursor is kept.
    pub fn clear(&mut self) {
        self.range = None;
        self.dragging = false;
        self.drag_origin = None;
        self.drag_current = None;
    }

    /// Mouse button down on a cell
    pub fn begin_drag(&mut self, x: usize, y: usize, pointer: (f32, f32)) {
        self.start(x, y);
        self.cursor = Some(self.clamp_pos(x, y));
        self.dragging = true;
        self.drag_origin = Some(pointer);
        self.drag_current = Some(pointer);
    }

    /// Pointer moved to a cell while the button is held
    pub fn drag_to(&mut self, x: usize, y: usize, pointer: (f32, f32)) {
        if !self.dragging {
            return;
        }
        self.update(x, y);
        self.drag_current = Some(pointer);
    }

    /// True iff a rectangle is active and covers `(x, y)`
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.bounds().is_some_and(|b| b.contains(x, y))
    }

    /// Normalised rectangle bounds, if a rectangle is active
    pub fn bounds(&self) -> Option<Bounds> {
        self.range.map(|r| r.bounds())
    }

    /// Cells an operation would touch: the rectangle, else the cursor cell
    pub fn target_bounds(&self) -> Option<Bounds> {
        self.bounds().or_else(|| self.cursor.map(Bounds::single))
    }

    /// Rectangle size when active, 1 for a lone cursor, 0 when nothing is selected
    pub fn cell_count(&self) -> usize {
        self.target_bounds().map_or(0, |b| b.cell_count())
    }

    /// Arrow-key navigation. With `extend` the rectangle grows from the
    /// cursor, otherwise it is dropped. Returns the new cursor position.
    pub fn navigate(&mut self, direction: Direction, extend: bool) -> CellPos {
        let current = self.cursor.unwrap_or(CellPos::new(0, 0));

        if extend && self.range.is_none() {
            self.start(current.x, current.y);
        } else if !extend {
            self.clear();
        }

        let next = match direction {
            Direction::Up => CellPos::new(current.x, current.y.saturating_sub(1)),
            Direction::Down => CellPos::new(current.x, current.y + 1),
            Direction::Left => CellPos::new(current.x.saturating_sub(1), current.y),
            Direction::Right => CellPos::new(current.x + 1, current.y),
        };
        let next = self.set_cursor(next.x, next.y);

        if extend {
            self.update(next.x, next.y);
        }
        next
    }

    /// Tab navigation: step along the row and wrap to the next (or previous)
    /// row, wrapping around the whole table
    pub fn advance(&mut self, reverse: bool) -> CellPos {
        self.clear();
        let (w, h) = (self.width.max(1), self.height.max(1));
        let current = self.cursor.unwrap_or(CellPos::new(0, 0));
        let index = current.y * w + current.x;
        let total = w * h;

        let next = if reverse {
            (index + total - 1) % total
        } else {
            (index + 1) % total
        };
        self.set_cursor(next % w, next / w)
    }

    fn clamp_pos(&self, x: usize, y: usize) -> CellPos {
        CellPos::new(
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_normalised() {
        let mut sel = Selection::new(8, 8);
        sel.start(5, 5);
        sel.update(1, 1);

        assert_eq!(
            sel.bounds(),
            Some(Bounds {
                min_x: 1,
                min_y: 1,
                max_x: 5,
                max_y: 5
            })
        );
        // anchor did not move
        assert_eq!(sel.range().unwrap().start, CellPos::new(5, 5));
    }

    #[test]
    fn test_coordinates_clamped() {
        let mut sel = Selection::new(4, 3);
        sel.start(10, 10);
        assert_eq!(sel.range().unwrap().start, CellPos::new(3, 2));
        assert_eq!(sel.set_cursor(99, 0), CellPos::new(3, 0));
    }

    #[test]
    fn test_cell_count() {
        let mut sel = Selection::new(8, 8);
        assert_eq!(sel.cell_count(), 0);

        sel.set_cursor(2, 2);
        assert_eq!(sel.cell_count(), 1);

        sel.start(1, 1);
        sel.update(3, 2);
        assert_eq!(sel.cell_count(), 6);

        sel.clear();
        assert!(!sel.is_active());
        assert_eq!(sel.cell_count(), 1);
    }

    #[test]
    fn test_contains_requires_active() {
        let mut sel = Selection::new(8, 8);
        sel.set_cursor(0, 0);
        assert!(!sel.contains(0, 0));

        sel.start(2, 2);
        sel.update(0, 0);
        assert!(sel.contains(0, 0));
        assert!(sel.contains(1, 2));
        assert!(!sel.contains(3, 0));
    }

    #[test]
    fn test_mouse_drag_lifecycle() {
        let mut sel = Selection::new(8, 8);
        sel.begin_drag(1, 1, (10.0, 10.0));
        assert!(sel.is_dragging());

        sel.drag_to(3, 4, (40.0, 50.0));
        assert_eq!(sel.drag_current(), Some((40.0, 50.0)));
        assert_eq!(sel.drag_origin(), Some((10.0, 10.0)));

        sel.end();
        assert!(!sel.is_dragging());
        assert!(sel.is_active());

        // moves after release are ignored
        sel.drag_to(7, 7, (90.0, 90.0));
        assert_eq!(sel.bounds().unwrap().max_x, 3);
    }

    #[test]
    fn test_shift_navigation_grows_then_plain_clears() {
        let mut sel = Selection::new(8, 8);
        sel.set_cursor(2, 2);

        sel.navigate(Direction::Right, true);
        sel.navigate(Direction::Down, true);
        assert_eq!(
            sel.bounds(),
            Some(Bounds {
                min_x: 2,
                min_y: 2,
                max_x: 3,
                max_y: 3
            })
        );
        assert!(!sel.is_dragging());

        let pos = sel.navigate(Direction::Left, false);
        assert_eq!(pos, CellPos::new(2, 3));
        assert!(!sel.is_active());
    }

    #[test]
    fn test_navigation_stops_at_edges() {
        let mut sel = Selection::new(3, 3);
        sel.set_cursor(0, 0);
        assert_eq!(sel.navigate(Direction::Up, false), CellPos::new(0, 0));
        assert_eq!(sel.navigate(Direction::Left, false), CellPos::new(0, 0));
        sel.set_cursor(2, 2);
        assert_eq!(sel.navigate(Direction::Down, false), CellPos::new(2, 2));
        assert_eq!(sel.navigate(Direction::Right, false), CellPos::new(2, 2));
    }

    #[test]
    fn test_tab_wraps() {
        let mut sel = Selection::new(3, 2);
        sel.set_cursor(2, 0);
        assert_eq!(sel.advance(false), CellPos::new(0, 1));
        sel.set_cursor(2, 1);
        assert_eq!(sel.advance(false), CellPos::new(0, 0));
        assert_eq!(sel.advance(true), CellPos::new(2, 1));
    }

    #[test]
    fn test_set_limits_reclamps() {
        let mut sel = Selection::new(8, 8);
        sel.set_cursor(7, 7);
        sel.start(6, 6);
        sel.update(7, 7);

        sel.set_limits(4, 4);
        assert_eq!(sel.cursor(), Some(CellPos::new(3, 3)));
        assert!(sel.bounds().unwrap().fits(4, 4));
    }

    #[test]
    fn test_window_around_clipped() {
        let b = Bounds::around(CellPos::new(0, 1), 2, 4, 3);
        assert_eq!(
            b,
            Bounds {
                min_x: 0,
                min_y: 0,
                max_x: 2,
                max_y: 2
            }
        );
        assert_eq!(b.cells().count(), 9);
    }
}
