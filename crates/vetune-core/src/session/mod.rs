//! Editor Session
//!
//! Owns everything one table editor needs: the table, selection, clipboard,
//! key state, undo history and change tracking. The UI thread holds the
//! session and feeds it input events one at a time; every event is fully
//! applied before the next is looked at. Other threads reach the table only
//! through the command queue.

mod commands;

pub use commands::{CommandError, CommandSender, TableCommand};

use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::clipboard::Clipboard;
use crate::engine::{self, EditError, EditTarget, OperationArgs, TableOperation};
use crate::export::{self, ImportError};
use crate::history::{CellEdit, EditBatch, UndoHistory};
use crate::keymap::{Key, KeyBindingState, Modifiers};
use crate::selection::{CellPos, CellRange, Direction, Selection};
use crate::settings::EditorSettings;
use crate::table::{Table, TableError};
use crate::tracking::{edit_region, DirtyCells, TableChange};

/// Callback invoked after every change to the table
pub type ChangeListener = Box<dyn FnMut(&TableChange) + Send>;

/// What a key press did
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// No focus, unmapped chord or debounced repeat
    Ignored,
    /// Cursor moved (selection grown or dropped)
    Navigated(CellPos),
    /// Escape dropped the selection and any interpolation mark
    SelectionCleared,
    /// First half of a two-press interpolation
    Marked(CellPos),
    /// The operation needs a number from the user; call [`EditorSession::apply`]
    NeedsValue(TableOperation),
    /// The operation ran and wrote `cells` cells
    Applied {
        operation: TableOperation,
        cells: usize,
    },
    /// The operation was rejected; the table is unchanged
    Failed {
        operation: TableOperation,
        error: EditError,
    },
}

/// One table editor
pub struct EditorSession {
    table: Table,
    selection: Selection,
    clipboard: Clipboard,
    keys: KeyBindingState,
    history: UndoHistory,
    dirty: DirtyCells,
    listeners: Vec<ChangeListener>,
    interpolation_mark: Option<CellPos>,
    settings: EditorSettings,
    command_tx: CommandSender,
    command_rx: UnboundedReceiver<TableCommand>,
}

impl EditorSession {
    /// Session over `table` with default settings
    pub fn new(table: Table) -> Self {
        Self::with_settings(table, EditorSettings::default())
    }

    /// Session over `table` with the given settings
    pub fn with_settings(table: Table, settings: EditorSettings) -> Self {
        let (command_tx, command_rx) = commands::channel();
        let selection = Selection::for_table(&table);
        let mut session = Self {
            table,
            selection,
            clipboard: Clipboard::with_max(settings.clipboard_max),
            keys: KeyBindingState::new(),
            history: UndoHistory::new(settings.undo_capacity),
            dirty: DirtyCells::new(),
            listeners: Vec::new(),
            interpolation_mark: None,
            settings: EditorSettings::default(),
            command_tx,
            command_rx,
        };
        session.apply_settings(settings);
        session
    }

    /// The table being edited
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Current cursor and rectangle
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Copied block
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Key binding state
    pub fn keys(&self) -> &KeyBindingState {
        &self.keys
    }

    /// Undo and redo steps
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Active editor settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Pending first corner of a two-press interpolation
    pub fn interpolation_mark(&self) -> Option<CellPos> {
        self.interpolation_mark
    }

    /// Adopt new settings. The clipboard contents are kept.
    pub fn apply_settings(&mut self, settings: EditorSettings) {
        let settings = settings.sanitized();
        self.keys.increment_amount = settings.increment_amount;
        self.keys.percent_increment = settings.percent_increment;
        self.keys.repeat_suppression = settings.repeat_suppression;
        self.keys.repeat_window = settings.repeat_window();
        self.history.set_capacity(settings.undo_capacity);
        if settings.clipboard_max != self.settings.clipboard_max {
            self.clipboard = Clipboard::with_max(settings.clipboard_max);
        }
        self.settings = settings;
    }

    /// Called by the UI as the table view gains or loses focus
    pub fn set_table_focused(&mut self, focused: bool) {
        self.keys.set_table_focused(focused);
    }

    // --- Selection ---

    /// Click a cell: it becomes the cursor and any rectangle is dropped
    pub fn click(&mut self, x: usize, y: usize) -> CellPos {
        self.selection.clear();
        self.selection.set_cursor(x, y)
    }

    /// Rectangle from `start` to `end`, with the cursor on `end`
    pub fn select(&mut self, start: CellPos, end: CellPos) {
        self.selection.start(start.x, start.y);
        self.selection.update(end.x, end.y);
        self.selection.end();
        self.selection.set_cursor(end.x, end.y);
    }

    /// Mouse button pressed over a cell
    pub fn mouse_down(&mut self, x: usize, y: usize, pointer: (f32, f32)) {
        self.selection.begin_drag(x, y, pointer);
    }

    /// Pointer moved over a cell with the button held
    pub fn mouse_drag(&mut self, x: usize, y: usize, pointer: (f32, f32)) {
        if self.selection.is_dragging() {
            self.selection.drag_to(x, y, pointer);
            self.selection.set_cursor(x, y);
        }
    }

    /// Button released. A drag that never left its first cell is a click.
    pub fn mouse_up(&mut self) {
        self.selection.end();
        if let Some(range) = self.selection.range() {
            if range.start == range.end {
                self.selection.clear();
            }
        }
    }

    // --- Keyboard ---

    /// Handle a key-down event using the current time
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        self.handle_key_at(key, modifiers, Instant::now())
    }

    /// Handle a key-down event seen at `now`
    pub fn handle_key_at(&mut self, key: Key, modifiers: Modifiers, now: Instant) -> KeyOutcome {
        if !self.keys.is_table_focused() {
            return KeyOutcome::Ignored;
        }

        if let Some(outcome) = self.navigate(key, modifiers) {
            // a different key was accepted, so the next edit key is not a repeat
            self.keys.reset_repeat();
            return outcome;
        }

        let Some(operation) = self.keys.process_key_at(key, modifiers, now) else {
            return KeyOutcome::Ignored;
        };

        if operation.requires_value() {
            return KeyOutcome::NeedsValue(operation);
        }

        if operation == TableOperation::Interpolate
            && !self.selection.is_active()
            && self.interpolation_mark.is_none()
        {
            return match self.selection.cursor() {
                Some(cell) => {
                    self.interpolation_mark = Some(cell);
                    tracing::debug!("Interpolation start marked at [{},{}]", cell.x, cell.y);
                    KeyOutcome::Marked(cell)
                }
                None => KeyOutcome::Failed {
                    operation,
                    error: EditError::NoTarget,
                },
            };
        }

        match self.apply(operation, OperationArgs::none()) {
            Ok(edits) => KeyOutcome::Applied {
                operation,
                cells: edits.len(),
            },
            Err(error) => KeyOutcome::Failed { operation, error },
        }
    }

    fn navigate(&mut self, key: Key, modifiers: Modifiers) -> Option<KeyOutcome> {
        let direction = match key {
            Key::Up => Direction::Up,
            Key::Down => Direction::Down,
            Key::Left => Direction::Left,
            Key::Right => Direction::Right,
            Key::Tab => return Some(KeyOutcome::Navigated(self.selection.advance(modifiers.shift))),
            Key::Escape => {
                self.selection.clear();
                self.interpolation_mark = None;
                return Some(KeyOutcome::SelectionCleared);
            }
            _ => return None,
        };
        Some(KeyOutcome::Navigated(
            self.selection.navigate(direction, modifiers.shift),
        ))
    }

    // --- Editing ---

    /// Apply an operation to the current selection (or active cell)
    pub fn apply(
        &mut self,
        operation: TableOperation,
        args: OperationArgs,
    ) -> Result<Vec<CellEdit>, EditError> {
        let mut target = EditTarget::from_selection(&self.selection);

        let uses_mark = operation == TableOperation::Interpolate && target.range.is_none();
        if uses_mark {
            if let (Some(mark), Some(cursor)) = (self.interpolation_mark, target.cursor) {
                target.range = Some(CellRange::new(mark, cursor));
            }
        }

        let result = self.apply_to(operation, &target, args);
        if operation == TableOperation::Interpolate && result.is_ok() {
            self.interpolation_mark = None;
        }
        result
    }

    /// Apply an operation to an explicit target
    pub fn apply_to(
        &mut self,
        operation: TableOperation,
        target: &EditTarget,
        args: OperationArgs,
    ) -> Result<Vec<CellEdit>, EditError> {
        let params = self.keys.params();
        let edits = engine::apply_operation(
            operation,
            &mut self.table,
            target,
            &mut self.clipboard,
            &params,
            &args,
        )?;

        if operation.is_mutating() && !edits.is_empty() {
            self.history.push(EditBatch::new(operation, edits.clone()));
            self.record_change(Some(operation), &edits);
        }
        Ok(edits)
    }

    /// Write one cell through the undoable path. Returns the stored value.
    pub fn set_cell(&mut self, x: usize, y: usize, value: f64) -> Result<f64, EditError> {
        let edits = self.apply_to(
            TableOperation::SetTo,
            &EditTarget::cell(x, y),
            OperationArgs::value(value),
        )?;
        Ok(edits.first().map_or(value, |e| e.new_value))
    }

    /// Revert the last operation. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.table) {
            Some(edits) => {
                self.record_change(None, &edits);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone operation. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.table) {
            Some(edits) => {
                self.record_change(None, &edits);
                true
            }
            None => false,
        }
    }

    // --- Structure ---

    /// Change table dimensions. Undo history is dropped since it refers to
    /// the old layout.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), TableError> {
        self.table.resize(width, height)?;
        self.selection.set_limits(width, height);
        self.interpolation_mark = None;
        self.history.clear();
        self.record_full_change();
        Ok(())
    }

    /// Spread both axes evenly over the given spans
    pub fn set_axis_ranges(
        &mut self,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> Result<(), TableError> {
        self.table.set_axis_ranges(x_min, x_max, y_min, y_max)
    }

    /// Replace both axes with explicit breakpoints
    pub fn set_axis_bins(&mut self, x_bins: Vec<f64>, y_bins: Vec<f64>) -> Result<(), TableError> {
        self.table.set_axis_bins(x_bins, y_bins)
    }

    /// Replace the cells with the kind's demo surface
    pub fn load_demo_data(&mut self) {
        self.table.load_demo_data();
        self.history.clear();
        self.record_full_change();
    }

    /// Load CSV text into the table
    pub fn import_csv(&mut self, text: &str) -> Result<usize, ImportError> {
        let written = export::import_csv(&mut self.table, text)?;
        self.history.clear();
        self.record_full_change();
        Ok(written)
    }

    /// Table as CSV text
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.table)
    }

    // --- Change notification ---

    /// Register a callback run after every change
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&TableChange) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Cells changed since the last take
    pub fn dirty(&self) -> &DirtyCells {
        &self.dirty
    }

    /// Cells changed since the last call, in row-major order. After a
    /// whole-table change (resize, demo load, import) every cell is listed.
    pub fn take_dirty_cells(&mut self) -> Vec<CellPos> {
        let (width, height) = self.table.dimensions();
        self.dirty.take(width, height)
    }

    fn record_change(&mut self, operation: Option<TableOperation>, edits: &[CellEdit]) {
        self.dirty.mark_edits(edits);
        self.notify(TableChange {
            operation,
            region: edit_region(edits),
            revision: self.table.revision(),
        });
    }

    fn record_full_change(&mut self) {
        self.dirty.mark_all();
        self.notify(TableChange {
            operation: None,
            region: None,
            revision: self.table.revision(),
        });
    }

    fn notify(&mut self, change: TableChange) {
        for listener in self.listeners.iter_mut() {
            listener(&change);
        }
    }

    // --- Command queue ---

    /// Handle for queueing commands from other tasks or threads
    pub fn command_sender(&self) -> CommandSender {
        self.command_tx.clone()
    }

    /// Apply every queued command in arrival order. Returns how many were
    /// applied successfully; failures are logged and skipped.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.command_rx.try_recv() {
            let result = self.run_command(command);
            match result {
                Ok(()) => applied += 1,
                Err(e) => tracing::warn!("Queued command failed: {}", e),
            }
        }
        applied
    }

    fn run_command(&mut self, command: TableCommand) -> Result<(), EditError> {
        match command {
            TableCommand::SetCell { x, y, value } => {
                self.set_cell(x, y, value)?;
            }
            TableCommand::Apply {
                operation,
                target,
                args,
            } => {
                self.apply_to(operation, &target, args)?;
            }
            TableCommand::Resize { width, height } => self.resize(width, height)?,
            TableCommand::SetAxisRanges {
                x_min,
                x_max,
                y_min,
                y_max,
            } => self.set_axis_ranges(x_min, x_max, y_min, y_max)?,
            TableCommand::SetAxisBins { x_bins, y_bins } => self.set_axis_bins(x_bins, y_bins)?,
            TableCommand::LoadDemoData => self.load_demo_data(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;

    fn session() -> EditorSession {
        let mut session = EditorSession::new(Table::new(TableKind::Generic, 4, 3).unwrap());
        session.set_table_focused(true);
        session
    }

    #[test]
    fn test_unfocused_keys_ignored() {
        let mut session = session();
        session.set_table_focused(false);
        session.click(0, 0);
        assert_eq!(
            session.handle_key(Key::Char(','), Modifiers::NONE),
            KeyOutcome::Ignored
        );
        assert_eq!(session.table().value(0, 0), Some(50.0));
    }

    #[test]
    fn test_key_applies_to_cursor() {
        let mut session = session();
        session.click(1, 1);
        assert_eq!(
            session.handle_key(Key::Char(','), Modifiers::NONE),
            KeyOutcome::Applied {
                operation: TableOperation::Increment,
                cells: 1
            }
        );
        assert_eq!(session.table().value(1, 1), Some(51.0));
    }

    #[test]
    fn test_set_to_asks_for_value() {
        let mut session = session();
        session.click(0, 0);
        assert_eq!(
            session.handle_key(Key::Char('='), Modifiers::NONE),
            KeyOutcome::NeedsValue(TableOperation::SetTo)
        );
    }

    #[test]
    fn test_shift_arrows_grow_selection() {
        let mut session = session();
        session.click(0, 0);
        session.handle_key(Key::Right, Modifiers::SHIFT);
        session.handle_key(Key::Down, Modifiers::SHIFT);
        assert_eq!(session.selection().cell_count(), 4);

        assert_eq!(
            session.handle_key(Key::Escape, Modifiers::NONE),
            KeyOutcome::SelectionCleared
        );
        assert!(!session.selection().is_active());
    }

    #[test]
    fn test_two_press_interpolation() {
        let mut session = session();
        session.set_cell(0, 0, 10.0).unwrap();
        session.set_cell(3, 0, 40.0).unwrap();

        let t0 = Instant::now();
        session.click(0, 0);
        assert_eq!(
            session.handle_key_at(Key::Char('i'), Modifiers::NONE, t0),
            KeyOutcome::Marked(CellPos::new(0, 0))
        );

        session.click(3, 0);
        let outcome = session.handle_key_at(
            Key::Char('i'),
            Modifiers::NONE,
            t0 + std::time::Duration::from_millis(200),
        );
        assert_eq!(
            outcome,
            KeyOutcome::Applied {
                operation: TableOperation::Interpolate,
                cells: 4
            }
        );
        assert!(session.interpolation_mark().is_none());
        let row = session.table().row(0).unwrap().to_vec();
        assert!((row[1] - 20.0).abs() < 1e-9);
        assert!((row[2] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_mouse_click_leaves_no_rectangle() {
        let mut session = session();
        session.mouse_down(2, 1, (10.0, 10.0));
        session.mouse_up();
        assert!(!session.selection().is_active());
        assert_eq!(session.selection().cursor(), Some(CellPos::new(2, 1)));
    }

    #[test]
    fn test_mouse_drag_selects() {
        let mut session = session();
        session.mouse_down(0, 0, (0.0, 0.0));
        session.mouse_drag(2, 1, (30.0, 20.0));
        assert!(session.selection().is_dragging());
        session.mouse_up();
        assert!(!session.selection().is_dragging());
        assert_eq!(session.selection().cell_count(), 6);
    }

    #[test]
    fn test_resize_clears_history() {
        let mut session = session();
        session.set_cell(0, 0, 1.0).unwrap();
        assert!(session.history().can_undo());
        session.resize(6, 6).unwrap();
        assert!(!session.history().can_undo());
        assert!(session.dirty().is_all());

        let dirty = session.take_dirty_cells();
        assert_eq!(dirty.len(), 36);
        assert_eq!(dirty.last(), Some(&CellPos::new(5, 5)));
        assert!(!session.dirty().has_changes());
    }

    #[test]
    fn test_rectangle_interpolation_drops_pending_mark() {
        let mut session = session();
        let t0 = Instant::now();
        let later = |ms| t0 + std::time::Duration::from_millis(ms);

        session.click(0, 0);
        assert_eq!(
            session.handle_key_at(Key::Char('i'), Modifiers::NONE, t0),
            KeyOutcome::Marked(CellPos::new(0, 0))
        );

        session.select(CellPos::new(1, 1), CellPos::new(3, 2));
        assert_eq!(
            session.handle_key_at(Key::Char('i'), Modifiers::NONE, later(200)),
            KeyOutcome::Applied {
                operation: TableOperation::Interpolate,
                cells: 6
            }
        );
        assert!(session.interpolation_mark().is_none());

        session.click(3, 2);
        assert_eq!(
            session.handle_key_at(Key::Char('i'), Modifiers::NONE, later(400)),
            KeyOutcome::Marked(CellPos::new(3, 2))
        );
    }

    #[test]
    fn test_navigation_breaks_key_repeat() {
        let mut session = session();
        let t0 = Instant::now();
        let later = |ms| t0 + std::time::Duration::from_millis(ms);
        session.click(0, 0);

        assert_eq!(
            session.handle_key_at(Key::Char(','), Modifiers::NONE, t0),
            KeyOutcome::Applied {
                operation: TableOperation::Increment,
                cells: 1
            }
        );
        session.handle_key_at(Key::Right, Modifiers::NONE, later(20));
        assert_eq!(
            session.handle_key_at(Key::Char(','), Modifiers::NONE, later(40)),
            KeyOutcome::Applied {
                operation: TableOperation::Increment,
                cells: 1
            }
        );
        assert_eq!(session.table().value(0, 0), Some(51.0));
        assert_eq!(session.table().value(1, 0), Some(51.0));

        // an immediate repeat with nothing in between is still suppressed
        assert_eq!(
            session.handle_key_at(Key::Char(','), Modifiers::NONE, later(60)),
            KeyOutcome::Ignored
        );
    }
}
