//! GC9A01 emulator frontend.
//!
//! Renders the emulated round panel in a scaled minifb window, driving the
//! chip with the host-side SPI traffic from [`driver`].
//!
//! ## Modes
//!
//! - **GUI mode** (default): scaled window with screenshot, save/load
//!   state, inversion toggle, and reset keys.
//! - **Headless mode** (`--headless`): draws the demo scene, writes
//!   `gc9a01-headless.png`, prints the byte counters, and exits.
//!
//! ## GUI keys
//!
//! - `S` — save screenshot (PNG)
//! - `F5` / `F9` — save / load state
//! - `I` — toggle inversion (INVON/INVOFF) and redraw
//! - `R` — pulse the RST line and rerun the bring-up sequence
//! - `1`–`4` — window scale
//! - `Escape` — quit

mod driver;

use gc9a01_core::{png, savestate, Gc9a01, SCREEN_HEIGHT, SCREEN_WIDTH};
use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use std::path::Path;

const STATE_PATH: &str = "gc9a01-emu.state";

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");

    let mut chip = Gc9a01::default();
    driver::power_on(&mut chip);
    driver::draw_scene(&mut chip);

    if headless {
        run_headless(&chip);
    } else {
        run_gui(&mut chip);
    }
}

// ─── Headless Mode ──────────────────────────────────────────────────────────

fn run_headless(chip: &Gc9a01) {
    let data = png::encode_png(
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
        chip.framebuffer.bytes(),
    );
    match std::fs::write("gc9a01-headless.png", &data) {
        Ok(()) => println!("Wrote gc9a01-headless.png ({} bytes)", data.len()),
        Err(e) => eprintln!("Screenshot error: {}", e),
    }
    println!(
        "cmd_bytes={} data_bytes={} display_on={} inverted={}",
        chip.dbg_cmd_count, chip.dbg_data_count, chip.display_on, chip.inverted
    );
}

// ─── GUI Mode ───────────────────────────────────────────────────────────────

fn make_window(scale: usize) -> Window {
    let mut window = Window::new(
        "GC9A01 1.2\" Round Display",
        SCREEN_WIDTH * scale,
        SCREEN_HEIGHT * scale,
        WindowOptions {
            scale: Scale::X1,
            scale_mode: ScaleMode::AspectRatioStretch,
            resize: true,
            ..Default::default()
        },
    )
    .expect("Failed to create window");
    window.set_target_fps(60);
    window
}

fn run_gui(chip: &mut Gc9a01) {
    let mut scale = 2;
    let mut scaled_w = SCREEN_WIDTH * scale;
    let mut scaled_h = SCREEN_HEIGHT * scale;
    let mut window = make_window(scale);

    eprintln!("GUI keys: S=Screenshot F5=Save F9=Load I=Invert R=Reset 1-4=Scale Esc=Quit");

    let mut buffer = chip.framebuffer.as_pixel_buffer();
    let mut scaled_buf = vec![0u32; scaled_w * scaled_h];
    let mut needs_scale = true;
    let mut inverted = false;
    let mut screenshot_n = 0u32;
    let mut prev_s = false;
    let mut prev_f5 = false;
    let mut prev_f9 = false;
    let mut prev_i = false;
    let mut prev_r = false;
    let mut prev_num = [false; 4];

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // Scale toggle (1-4)
        let num = [
            window.is_key_down(Key::Key1),
            window.is_key_down(Key::Key2),
            window.is_key_down(Key::Key3),
            window.is_key_down(Key::Key4),
        ];
        for i in 0..4 {
            if num[i] && !prev_num[i] && scale != i + 1 {
                scale = i + 1;
                scaled_w = SCREEN_WIDTH * scale;
                scaled_h = SCREEN_HEIGHT * scale;
                scaled_buf = vec![0u32; scaled_w * scaled_h];
                window = make_window(scale);
                needs_scale = true;
            }
        }
        prev_num = num;

        // Screenshot (S)
        let s = window.is_key_down(Key::S);
        if s && !prev_s {
            let f = format!("screenshot_{:04}.png", screenshot_n);
            let data = png::encode_png(
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
                chip.framebuffer.bytes(),
            );
            match std::fs::write(&f, &data) {
                Ok(()) => {
                    eprintln!("Screenshot: {}", f);
                    screenshot_n += 1;
                }
                Err(e) => eprintln!("Screenshot error: {}", e),
            }
        }
        prev_s = s;

        // Save state (F5)
        let f5 = window.is_key_down(Key::F5);
        if f5 && !prev_f5 {
            match savestate::save_to_file(&chip.save_state(), Path::new(STATE_PATH)) {
                Ok(()) => eprintln!("State saved: {}", STATE_PATH),
                Err(e) => eprintln!("Save error: {}", e),
            }
        }
        prev_f5 = f5;

        // Load state (F9)
        let f9 = window.is_key_down(Key::F9);
        if f9 && !prev_f9 {
            match savestate::load_from_file(Path::new(STATE_PATH))
                .and_then(|state| chip.load_state(&state))
            {
                Ok(()) => {
                    inverted = chip.inverted;
                    eprintln!("State loaded: {}", STATE_PATH);
                }
                Err(e) => eprintln!("Load error: {}", e),
            }
        }
        prev_f9 = f9;

        // Inversion toggle (I): the flag only affects pixels written
        // afterwards, so redraw the scene through the protocol
        let i = window.is_key_down(Key::I);
        if i && !prev_i {
            inverted = !inverted;
            driver::set_inversion(chip, inverted);
            driver::draw_scene(chip);
        }
        prev_i = i;

        // Reset (R): RST pulse plus bring-up, like a host power cycle
        let r = window.is_key_down(Key::R);
        if r && !prev_r {
            driver::power_on(chip);
            driver::draw_scene(chip);
            inverted = false;
        }
        prev_r = r;

        if chip.dirty {
            chip.dirty = false;
            buffer = chip.framebuffer.as_pixel_buffer();
            needs_scale = true;
        }

        if needs_scale {
            needs_scale = false;
            for y in 0..SCREEN_HEIGHT {
                for x in 0..SCREEN_WIDTH {
                    let c = buffer[y * SCREEN_WIDTH + x];
                    for sy in 0..scale {
                        let base = (y * scale + sy) * scaled_w + x * scale;
                        scaled_buf[base..base + scale].fill(c);
                    }
                }
            }
        }

        window
            .update_with_buffer(&scaled_buf, scaled_w, scaled_h)
            .expect("update");
    }
}
