//! GC9A01 240×240 round LCD display controller emulation.
//!
//! Processes command and data bytes received over SPI, multiplexed by the
//! DC line, to maintain an internal RGBA framebuffer. Supports the command
//! subset used by Adafruit-style GC9A01 drivers: software reset, sleep-out,
//! display and inversion switching, CASET/RASET address windows, and RAMWR
//! pixel streams in big-endian RGB565. Pixels outside the panel's inscribed
//! circle are forced black, modeling the round visible area.
//!
//! The parser is incremental: SPI chunks may split commands, argument lists,
//! or 16-bit pixel words at any byte boundary. CS/DC/RST line edges execute
//! synchronously between chunks, never mid-byte.

use crate::color::{self, OPAQUE_BLACK};
use crate::commands;
use crate::framebuffer::Framebuffer;
use crate::savestate::SaveState;
use crate::window::AddressWindow;

/// Fixed argument buffer size; the largest modeled command (CASET/RASET)
/// takes 4 bytes.
const ARG_BUF: usize = 16;

/// Byte-stream interpretation mode, selected by the DC line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// DC low: bytes are commands and their arguments
    Command,
    /// DC high: bytes are RGB565 pixel payload
    Data,
}

/// GC9A01 display controller state
pub struct Gc9a01 {
    pub framebuffer: Framebuffer,
    width: usize,
    height: usize,
    /// DC line state
    mode: Mode,
    /// Byte reception gate: true between CS assert and the next CS
    /// deassert or RST pulse
    receiving: bool,
    /// CS line is low (chip selected)
    cs_low: bool,
    /// Command currently collecting arguments
    command: u8,
    expected_args: u8,
    received_args: u8,
    args: [u8; ARG_BUF],
    /// True between a command byte and its last argument
    awaiting_args: bool,
    /// First half of a 16-bit pixel word
    pending_hi: Option<u8>,
    /// RAMWR transaction active
    ram_write: bool,
    window: AddressWindow,
    /// DISPON/DISPOFF flag; tracked but never gates RAM writes
    pub display_on: bool,
    /// Color inversion (INVON/INVOFF)
    pub inverted: bool,
    /// Whether the framebuffer has been updated
    pub dirty: bool,
    /// Debug: command bytes received this frame
    pub dbg_cmd_count: u32,
    /// Debug: data bytes received this frame
    pub dbg_data_count: u32,
}

impl Gc9a01 {
    pub fn new(width: usize, height: usize) -> Self {
        Gc9a01 {
            framebuffer: Framebuffer::new(width, height),
            width,
            height,
            mode: Mode::Command,
            receiving: false,
            cs_low: false,
            command: 0,
            expected_args: 0,
            received_args: 0,
            args: [0; ARG_BUF],
            awaiting_args: false,
            pending_hi: None,
            ram_write: false,
            window: AddressWindow::new((width - 1) as u16, (height - 1) as u16),
            display_on: false,
            inverted: false,
            dirty: false,
            dbg_cmd_count: 0,
            dbg_data_count: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Current DC-selected mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    // ─── Byte stream ────────────────────────────────────────────────────────

    /// Deliver an SPI chunk. Chunks may be any length, down to a single
    /// byte; parser state carries over exactly across chunk boundaries.
    /// Bytes are ignored while reception is stopped (deselected, or after
    /// an RST pulse until the next CS/DC edge).
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if !self.receiving {
            return;
        }
        for &byte in bytes {
            match self.mode {
                Mode::Command => self.command_byte(byte),
                Mode::Data => self.data_byte(byte),
            }
        }
    }

    fn command_byte(&mut self, byte: u8) {
        self.dbg_cmd_count += 1;
        if !self.awaiting_args {
            let expected = commands::arg_count(byte);
            if expected == 0 {
                self.dispatch(byte, &[]);
            } else {
                self.command = byte;
                self.expected_args = expected;
                self.received_args = 0;
                self.awaiting_args = true;
            }
        } else {
            self.args[self.received_args as usize] = byte;
            self.received_args += 1;
            if self.received_args >= self.expected_args {
                self.awaiting_args = false;
                let (command, args) = (self.command, self.args);
                self.dispatch(command, &args[..self.received_args as usize]);
            }
        }
    }

    fn data_byte(&mut self, byte: u8) {
        self.dbg_data_count += 1;
        if !self.ram_write {
            return; // data outside a RAMWR transaction is dropped
        }
        match self.pending_hi.take() {
            None => self.pending_hi = Some(byte),
            Some(hi) => self.write_pixel(u16::from_be_bytes([hi, byte])),
        }
    }

    // ─── Command dispatch ───────────────────────────────────────────────────

    /// Execute a completed command. The parser guarantees `args` holds the
    /// exact expected count, so no command can fail.
    fn dispatch(&mut self, command: u8, args: &[u8]) {
        match command {
            commands::SWRESET => self.software_reset(),
            commands::SLPOUT => {}
            commands::DISPON => self.display_on = true,
            commands::DISPOFF => self.display_on = false,
            commands::CASET => {
                if let [sh, sl, eh, el] = *args {
                    self.window
                        .set_columns(u16::from_be_bytes([sh, sl]), u16::from_be_bytes([eh, el]));
                }
            }
            commands::RASET => {
                if let [sh, sl, eh, el] = *args {
                    self.window
                        .set_rows(u16::from_be_bytes([sh, sl]), u16::from_be_bytes([eh, el]));
                }
            }
            commands::RAMWR => {
                // Cursor stays where it was; CASET/RASET rewind it
                self.ram_write = true;
                self.pending_hi = None;
            }
            // Accepted for driver compatibility; orientation and pixel
            // format are fixed in this model
            commands::MADCTL | commands::COLMOD => {}
            commands::INVOFF => self.inverted = false,
            commands::INVON => self.inverted = true,
            _ => {
                // Unknown command, ignore
            }
        }
    }

    /// SWRESET / RST pulse: black framebuffer, flags cleared, full-frame
    /// window, cursor at the origin.
    fn software_reset(&mut self) {
        self.framebuffer.fill(OPAQUE_BLACK);
        self.display_on = false;
        self.inverted = false;
        self.ram_write = false;
        self.window.reset((self.width - 1) as u16, (self.height - 1) as u16);
        self.dirty = true;
    }

    /// Commit one RGB565 pixel at the cursor and advance it.
    fn write_pixel(&mut self, packed: u16) {
        let decoded = color::decode_rgb565(packed);
        let inverted = color::apply_inversion(decoded, self.inverted);
        let (col, row) = (self.window.col, self.window.row);
        if self.window.contains(col, row) {
            let masked = color::apply_round_mask(inverted, col, row, self.width, self.height);
            let offset = (row as usize * self.width + col as usize) * 4;
            self.framebuffer.write_color(offset, masked);
            self.dirty = true;
        }
        self.window.advance();
    }

    // ─── Line edges ─────────────────────────────────────────────────────────

    /// CS line change (active low). Selecting restarts the byte stream;
    /// deselecting aborts any in-flight command or pixel word without
    /// committing partial data and ends the RAMWR transaction.
    pub fn set_chip_select(&mut self, level: bool) {
        self.cs_low = !level;
        if self.cs_low {
            self.awaiting_args = false;
            self.pending_hi = None;
            self.receiving = true;
        } else {
            self.receiving = false;
            self.ram_write = false;
            self.awaiting_args = false;
            self.pending_hi = None;
        }
    }

    /// DC line change: low selects command mode, high data mode. A mode
    /// switch always interrupts the stream, even mid-argument or mid-word;
    /// partial state for the previous mode is abandoned, and reception
    /// restarts only while selected.
    pub fn set_data_command(&mut self, level: bool) {
        self.mode = if level { Mode::Data } else { Mode::Command };
        self.receiving = false;
        self.awaiting_args = false;
        self.pending_hi = None;
        if self.cs_low {
            self.receiving = true;
        }
    }

    /// RST line change (active low). A falling edge clears the chip like
    /// SWRESET and stops the byte stream until the next CS or DC edge; the
    /// DC-selected mode is left alone.
    pub fn set_reset(&mut self, level: bool) {
        if !level {
            self.receiving = false;
            self.pending_hi = None;
            self.software_reset();
        }
    }

    // ─── Save states ────────────────────────────────────────────────────────

    /// Capture the complete controller state.
    pub fn save_state(&self) -> SaveState {
        SaveState {
            width: self.width as u32,
            height: self.height as u32,
            framebuffer: self.framebuffer.bytes().to_vec(),
            mode: match self.mode {
                Mode::Command => 0,
                Mode::Data => 1,
            },
            receiving: self.receiving,
            cs_low: self.cs_low,
            command: self.command,
            expected_args: self.expected_args,
            received_args: self.received_args,
            args: self.args,
            awaiting_args: self.awaiting_args,
            pending_hi: self.pending_hi,
            ram_write: self.ram_write,
            col_start: self.window.col_start,
            col_end: self.window.col_end,
            row_start: self.window.row_start,
            row_end: self.window.row_end,
            col: self.window.col,
            row: self.window.row,
            display_on: self.display_on,
            inverted: self.inverted,
        }
    }

    /// Restore a captured state in place. Fails only on a dimension
    /// mismatch; debug counters are not part of the state.
    pub fn load_state(&mut self, s: &SaveState) -> Result<(), String> {
        if s.width != self.width as u32 || s.height != self.height as u32 {
            return Err(format!(
                "Dimension mismatch: save={}x{} current={}x{}",
                s.width, s.height, self.width, self.height
            ));
        }
        self.framebuffer.load(&s.framebuffer);
        self.mode = if s.mode == 1 { Mode::Data } else { Mode::Command };
        self.receiving = s.receiving;
        self.cs_low = s.cs_low;
        self.command = s.command;
        self.expected_args = s.expected_args;
        self.received_args = s.received_args;
        self.args = s.args;
        self.awaiting_args = s.awaiting_args;
        self.pending_hi = s.pending_hi;
        self.ram_write = s.ram_write;
        self.window.col_start = s.col_start;
        self.window.col_end = s.col_end;
        self.window.row_start = s.row_start;
        self.window.row_end = s.row_end;
        self.window.col = s.col;
        self.window.row = s.row;
        self.display_on = s.display_on;
        self.inverted = s.inverted;
        self.dirty = true;
        Ok(())
    }

    /// Reset per-frame debug counters
    pub fn dbg_reset_counters(&mut self) {
        self.dbg_cmd_count = 0;
        self.dbg_data_count = 0;
    }
}

impl Default for Gc9a01 {
    fn default() -> Self {
        Self::new(crate::SCREEN_WIDTH, crate::SCREEN_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn selected_chip() -> Gc9a01 {
        let mut chip = Gc9a01::default();
        chip.set_chip_select(false);
        chip
    }

    /// Command byte plus arguments, all with DC low.
    fn send_command(chip: &mut Gc9a01, cmd: u8, args: &[u8]) {
        chip.set_data_command(false);
        chip.write_bytes(&[cmd]);
        chip.write_bytes(args);
    }

    /// RGB565 words with DC high.
    fn send_pixels(chip: &mut Gc9a01, words: &[u16]) {
        chip.set_data_command(true);
        for w in words {
            chip.write_bytes(&w.to_be_bytes());
        }
    }

    fn set_window(chip: &mut Gc9a01, x0: u16, x1: u16, y0: u16, y1: u16) {
        let (xs, xe) = (x0.to_be_bytes(), x1.to_be_bytes());
        send_command(chip, commands::CASET, &[xs[0], xs[1], xe[0], xe[1]]);
        let (ys, ye) = (y0.to_be_bytes(), y1.to_be_bytes());
        send_command(chip, commands::RASET, &[ys[0], ys[1], ye[0], ye[1]]);
    }

    fn pixel_at(chip: &Gc9a01, col: usize, row: usize) -> [u8; 4] {
        let offset = (row * chip.width + col) * 4;
        let b = chip.framebuffer.bytes();
        [b[offset], b[offset + 1], b[offset + 2], b[offset + 3]]
    }

    #[test]
    fn test_chip_creation() {
        let chip = Gc9a01::default();
        assert_eq!(chip.width(), 240);
        assert_eq!(chip.height(), 240);
        assert_eq!((chip.window.col_start, chip.window.col_end), (0, 239));
        assert_eq!((chip.window.row_start, chip.window.row_end), (0, 239));
        assert!(!chip.display_on);
        assert!(!chip.inverted);
        assert_eq!(pixel_at(&chip, 0, 0), BLACK);
        assert_eq!(pixel_at(&chip, 120, 120), BLACK);
    }

    #[test]
    fn test_bytes_ignored_while_deselected() {
        let mut chip = Gc9a01::default();
        chip.write_bytes(&[commands::DISPON]);
        assert!(!chip.display_on);

        chip.set_chip_select(false);
        chip.write_bytes(&[commands::DISPON]);
        assert!(chip.display_on);
    }

    #[test]
    fn test_column_window_set() {
        let mut chip = selected_chip();
        send_command(&mut chip, commands::CASET, &[0, 10, 0, 50]);
        assert_eq!((chip.window.col_start, chip.window.col_end), (10, 50));
        assert_eq!(chip.window.col, 10);
        // Row side untouched
        assert_eq!((chip.window.row_start, chip.window.row_end), (0, 239));
    }

    #[test]
    fn test_window_write_and_wrap() {
        // 2×1 window at the frame center (inside the round mask), RAMWR,
        // two RGB565 words: red then green, cursor wraps back to the start
        let mut chip = selected_chip();
        set_window(&mut chip, 120, 121, 120, 120);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0xF800, 0x07E0]);

        assert_eq!(pixel_at(&chip, 120, 120), RED);
        assert_eq!(pixel_at(&chip, 121, 120), GREEN);
        assert_eq!((chip.window.col, chip.window.row), (120, 120));
    }

    #[test]
    fn test_corner_pixels_forced_black() {
        let mut chip = selected_chip();
        set_window(&mut chip, 0, 1, 0, 0);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0xF800, 0xF800]);

        // Committed and advanced, but masked to black outside the circle
        assert_eq!(pixel_at(&chip, 0, 0), BLACK);
        assert_eq!(pixel_at(&chip, 1, 0), BLACK);
        assert_eq!((chip.window.col, chip.window.row), (0, 0));
    }

    #[test]
    fn test_ramwr_resumes_cursor() {
        let mut chip = selected_chip();
        set_window(&mut chip, 118, 121, 118, 121);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0xF800]);

        // Second RAMWR without re-addressing: continues at (119, 118)
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0x07E0]);
        assert_eq!(pixel_at(&chip, 118, 118), RED);
        assert_eq!(pixel_at(&chip, 119, 118), GREEN);
    }

    #[test]
    fn test_data_dropped_without_ramwr() {
        let mut chip = selected_chip();
        set_window(&mut chip, 120, 121, 120, 120);
        chip.set_data_command(true);
        chip.write_bytes(&[0xF8, 0x00, 0x07, 0xE0]);

        assert_eq!(chip.dbg_data_count, 4);
        assert_eq!(pixel_at(&chip, 120, 120), BLACK);
        assert_eq!((chip.window.col, chip.window.row), (120, 120));
    }

    #[test]
    fn test_unknown_command_is_noop() {
        let mut chip = selected_chip();
        chip.set_data_command(false);
        // 0x55 is not modeled: dispatched immediately with no arguments,
        // so the following DISPON is a fresh command, not an argument
        chip.write_bytes(&[0x55, commands::DISPON]);
        assert!(chip.display_on);
        assert_eq!((chip.window.col_start, chip.window.col_end), (0, 239));
    }

    #[test]
    fn test_inversion_applies_to_writes() {
        let mut chip = selected_chip();
        send_command(&mut chip, commands::INVON, &[]);
        set_window(&mut chip, 120, 120, 120, 120);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0xF800]);
        assert_eq!(pixel_at(&chip, 120, 120), [0, 255, 255, 255]);

        send_command(&mut chip, commands::INVOFF, &[]);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0xF800]);
        assert_eq!(pixel_at(&chip, 120, 120), RED);
    }

    #[test]
    fn test_swreset_clears_everything() {
        let mut chip = selected_chip();
        send_command(&mut chip, commands::DISPON, &[]);
        send_command(&mut chip, commands::INVON, &[]);
        set_window(&mut chip, 118, 121, 118, 121);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0x07FF, 0x07FF]);
        assert_ne!(pixel_at(&chip, 118, 118), BLACK);

        send_command(&mut chip, commands::SWRESET, &[]);
        for (col, row) in [(0, 0), (118, 118), (119, 118), (120, 120), (239, 239)] {
            assert_eq!(pixel_at(&chip, col, row), BLACK);
        }
        assert!(!chip.display_on);
        assert!(!chip.inverted);
        assert_eq!((chip.window.col_start, chip.window.col_end), (0, 239));
        assert_eq!((chip.window.row_start, chip.window.row_end), (0, 239));
        assert_eq!((chip.window.col, chip.window.row), (0, 0));

        // RAMWR ended: data bytes are dropped again
        send_pixels(&mut chip, &[0xFFFF]);
        assert_eq!(pixel_at(&chip, 0, 0), BLACK);
    }

    #[test]
    fn test_reset_line_stops_reception() {
        let mut chip = selected_chip();
        send_command(&mut chip, commands::DISPON, &[]);
        chip.set_reset(false);
        chip.set_reset(true);
        assert!(!chip.display_on);

        // Stream is stopped until the next CS or DC edge
        chip.write_bytes(&[commands::DISPON]);
        assert!(!chip.display_on);
        chip.set_data_command(false);
        chip.write_bytes(&[commands::DISPON]);
        assert!(chip.display_on);
    }

    #[test]
    fn test_deselect_discards_pending_high_byte() {
        let mut chip = selected_chip();
        set_window(&mut chip, 120, 121, 120, 120);
        send_command(&mut chip, commands::RAMWR, &[]);
        chip.set_data_command(true);
        chip.write_bytes(&[0xF8]); // half a pixel word

        chip.set_chip_select(true); // deselect aborts the transaction
        chip.set_chip_select(false);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0x07E0]);

        // No residual byte: the full word decodes as green at the cursor
        assert_eq!(pixel_at(&chip, 120, 120), GREEN);
        assert_eq!(pixel_at(&chip, 121, 120), BLACK);
    }

    #[test]
    fn test_mode_edge_abandons_partial_args() {
        let mut chip = selected_chip();
        chip.set_data_command(false);
        chip.write_bytes(&[commands::CASET, 0, 10]); // 2 of 4 arguments
        chip.set_data_command(true);
        chip.set_data_command(false);
        chip.write_bytes(&[commands::DISPON]);

        // DISPON executed as a command, not swallowed as a CASET argument
        assert!(chip.display_on);
        assert_eq!((chip.window.col_start, chip.window.col_end), (0, 239));
    }

    #[test]
    fn test_chunk_boundary_invariance() {
        // The same logical traffic, delivered as whole chunks vs. one byte
        // at a time, must produce identical final state
        let script: &[(bool, &[u8])] = &[
            (false, &[commands::CASET, 0, 118, 0, 121]),
            (false, &[commands::RASET, 0, 118, 0, 121]),
            (false, &[commands::RAMWR]),
            (true, &[0xF8, 0x00, 0x07, 0xE0, 0x00, 0x1F, 0xFF, 0xFF]),
            (false, &[commands::INVON, commands::RAMWR]),
            (true, &[0xF8, 0x00, 0x07, 0xE0]),
        ];

        let mut whole = selected_chip();
        for &(data, bytes) in script {
            whole.set_data_command(data);
            whole.write_bytes(bytes);
        }

        let mut split = selected_chip();
        for &(data, bytes) in script {
            split.set_data_command(data);
            for &b in bytes {
                split.write_bytes(&[b]);
            }
        }

        assert_eq!(whole.framebuffer.bytes(), split.framebuffer.bytes());
        assert_eq!(whole.window, split.window);
        assert_eq!(whole.pending_hi, split.pending_hi);
        assert_eq!(whole.ram_write, split.ram_write);
        assert_eq!(whole.inverted, split.inverted);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut chip = selected_chip();
        send_command(&mut chip, commands::INVON, &[]);
        set_window(&mut chip, 118, 121, 118, 121);
        send_command(&mut chip, commands::RAMWR, &[]);
        send_pixels(&mut chip, &[0xF800, 0x07E0, 0x001F]);
        chip.set_data_command(true);
        chip.write_bytes(&[0xAB]); // leave a pending high byte in flight

        let state = chip.save_state();
        let mut restored = Gc9a01::default();
        restored.load_state(&state).unwrap();

        assert_eq!(restored.framebuffer.bytes(), chip.framebuffer.bytes());
        assert_eq!(restored.window, chip.window);
        assert_eq!(restored.pending_hi, Some(0xAB));
        assert!(restored.ram_write);
        assert!(restored.inverted);

        // The restored chip continues the pixel word where it left off
        restored.write_bytes(&[0xCD]);
        assert_eq!(restored.pending_hi, None);
    }

    #[test]
    fn test_load_state_rejects_dimension_mismatch() {
        let chip = Gc9a01::new(240, 240);
        let state = chip.save_state();
        let mut other = Gc9a01::new(128, 128);
        assert!(other.load_state(&state).is_err());
    }
}
