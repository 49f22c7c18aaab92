//! Host-side SPI driver for the emulated panel.
//!
//! Plays the role of the MCU sketch: toggles CS/DC around command and
//! pixel traffic the way Adafruit-style GC9A01 drivers do, runs the panel
//! bring-up sequence, and draws the demo scene used by the GUI and
//! headless modes.

use gc9a01_core::{commands, Gc9a01, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Ring palette cycled by the radial test pattern (RGB888).
const RINGS: [(u8, u8, u8); 6] = [
    (0xE8, 0x3A, 0x3A),
    (0xE8, 0x9A, 0x2A),
    (0xE8, 0xE0, 0x30),
    (0x3A, 0xC8, 0x50),
    (0x2A, 0x6A, 0xE8),
    (0x8A, 0x3A, 0xD8),
];

/// Send one command with its arguments (DC low).
pub fn command(chip: &mut Gc9a01, cmd: u8, args: &[u8]) {
    chip.set_data_command(false);
    chip.write_bytes(&[cmd]);
    chip.write_bytes(args);
}

/// Stream RGB565 pixel words (DC high) after a RAMWR.
pub fn pixels(chip: &mut Gc9a01, words: &[u16]) {
    chip.set_data_command(true);
    let mut bytes = Vec::with_capacity(words.len() * 2);
    for w in words {
        bytes.extend_from_slice(&w.to_be_bytes());
    }
    chip.write_bytes(&bytes);
}

/// Pulse RST, select the chip, and run the bring-up sequence.
pub fn power_on(chip: &mut Gc9a01) {
    chip.set_chip_select(true);
    chip.set_reset(false);
    chip.set_reset(true);
    chip.set_chip_select(false);
    command(chip, commands::SWRESET, &[]);
    command(chip, commands::SLPOUT, &[]);
    command(chip, commands::COLMOD, &[0x05]); // 16 bpp
    command(chip, commands::MADCTL, &[0x48]);
    command(chip, commands::DISPON, &[]);
}

/// Set the inclusive column/row write window.
pub fn set_window(chip: &mut Gc9a01, x0: u16, x1: u16, y0: u16, y1: u16) {
    let (xs, xe) = (x0.to_be_bytes(), x1.to_be_bytes());
    command(chip, commands::CASET, &[xs[0], xs[1], xe[0], xe[1]]);
    let (ys, ye) = (y0.to_be_bytes(), y1.to_be_bytes());
    command(chip, commands::RASET, &[ys[0], ys[1], ye[0], ye[1]]);
}

/// Send INVON/INVOFF. Inversion applies to pixels written afterwards, so
/// callers redraw to see the effect.
pub fn set_inversion(chip: &mut Gc9a01, on: bool) {
    command(chip, if on { commands::INVON } else { commands::INVOFF }, &[]);
}

/// Pack 8-8-8 RGB into an RGB565 word.
pub fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Demo scene: radial ring gradient plus three windowed color bars,
/// exercising CASET/RASET, RAMWR streaming, and the round mask.
pub fn draw_scene(chip: &mut Gc9a01) {
    let w = SCREEN_WIDTH as i32;
    let h = SCREEN_HEIGHT as i32;

    set_window(chip, 0, (SCREEN_WIDTH - 1) as u16, 0, (SCREEN_HEIGHT - 1) as u16);
    command(chip, commands::RAMWR, &[]);
    let mut words = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let dx = x - w / 2;
            let dy = y - h / 2;
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            let (r, g, b) = RINGS[(dist as usize / 20) % RINGS.len()];
            words.push(rgb565(r, g, b));
        }
    }
    pixels(chip, &words);

    // Windowed bars across the center
    let bars = [(0xFF, 0x40, 0x40), (0x40, 0xFF, 0x40), (0x40, 0x40, 0xFF)];
    for (i, &(r, g, b)) in bars.iter().enumerate() {
        let y0 = 102 + (i as u16) * 12;
        set_window(chip, 80, 159, y0, y0 + 9);
        command(chip, commands::RAMWR, &[]);
        pixels(chip, &vec![rgb565(r, g, b); 80 * 10]);
    }
}
