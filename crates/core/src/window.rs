//! Address window and auto-advancing write cursor.
//!
//! CASET/RASET define an inclusive rectangular window in display RAM;
//! every committed pixel advances the cursor column-first, wrapping
//! column → row and last row → window start, so a full-window RAMWR
//! stream can loop indefinitely without further addressing commands.

/// Inclusive write window plus the current write position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWindow {
    pub col_start: u16,
    pub col_end: u16,
    pub row_start: u16,
    pub row_end: u16,
    /// Current write column
    pub col: u16,
    /// Current write row
    pub row: u16,
}

impl AddressWindow {
    /// Full-frame window with the cursor at the origin.
    pub fn new(max_col: u16, max_row: u16) -> Self {
        AddressWindow {
            col_start: 0,
            col_end: max_col,
            row_start: 0,
            row_end: max_row,
            col: 0,
            row: 0,
        }
    }

    /// Restore the full-frame window and home the cursor (SWRESET).
    pub fn reset(&mut self, max_col: u16, max_row: u16) {
        *self = AddressWindow::new(max_col, max_row);
    }

    /// CASET: set column bounds and rewind the cursor column. Row bounds
    /// and the cursor row are untouched.
    pub fn set_columns(&mut self, start: u16, end: u16) {
        self.col_start = start;
        self.col_end = end;
        self.col = start;
    }

    /// RASET: set row bounds and rewind the cursor row.
    pub fn set_rows(&mut self, start: u16, end: u16) {
        self.row_start = start;
        self.row_end = end;
        self.row = start;
    }

    /// Whether (col, row) lies inside the window.
    pub fn contains(&self, col: u16, row: u16) -> bool {
        (self.col_start..=self.col_end).contains(&col)
            && (self.row_start..=self.row_end).contains(&row)
    }

    /// Advance one pixel: column-first, spilling into the next row and
    /// wrapping from the last row back to the window start.
    pub fn advance(&mut self) {
        self.col += 1;
        if self.col > self.col_end {
            self.col = self.col_start;
            self.row += 1;
            if self.row > self.row_end {
                self.row = self.row_start;
            }
        }
    }
}
