//! Save state (quick save / quick load) for the GC9A01 emulator.
//!
//! Captures the complete controller state to a file using bincode
//! serialization with deflate compression, so a drawing session can be
//! resumed later, including mid-transaction parser state.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "GCES"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes identifying a gc9a01-emu save state file.
const MAGIC: &[u8; 4] = b"GCES";
/// Current save state format version.
const FORMAT_VERSION: u32 = 1;

/// Complete controller state as captured by [`Gc9a01::save_state`].
///
/// [`Gc9a01::save_state`]: crate::Gc9a01::save_state
#[derive(Serialize, Deserialize)]
pub struct SaveState {
    pub width: u32,
    pub height: u32,
    pub framebuffer: Vec<u8>,
    /// 0 = command mode, 1 = data mode
    pub mode: u8,
    pub receiving: bool,
    pub cs_low: bool,
    pub command: u8,
    pub expected_args: u8,
    pub received_args: u8,
    pub args: [u8; 16],
    pub awaiting_args: bool,
    pub pending_hi: Option<u8>,
    pub ram_write: bool,
    pub col_start: u16,
    pub col_end: u16,
    pub row_start: u16,
    pub row_end: u16,
    pub col: u16,
    pub row: u16,
    pub display_on: bool,
    pub inverted: bool,
}

/// Save state to file with header and deflate compression.
pub fn save_to_file(state: &SaveState, path: &Path) -> Result<(), String> {
    let payload = bincode::serialize(state).map_err(|e| format!("Serialize error: {}", e))?;

    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

    let mut out = Vec::with_capacity(8 + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);

    std::fs::write(path, &out).map_err(|e| format!("Write error: {}", e))
}

/// Load state from file, verifying magic and version.
pub fn load_from_file(path: &Path) -> Result<SaveState, String> {
    let data = std::fs::read(path).map_err(|e| format!("Read error: {}", e))?;

    if data.len() < 8 {
        return Err("File too small".into());
    }
    if &data[0..4] != MAGIC {
        return Err("Invalid save state file (bad magic)".into());
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(format!(
            "Unsupported save state version {} (expected {})",
            version, FORMAT_VERSION
        ));
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[8..])
        .map_err(|e| format!("Decompress error: {:?}", e))?;

    bincode::deserialize(&decompressed).map_err(|e| format!("Deserialize error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{commands, Gc9a01};

    #[test]
    fn test_file_round_trip() {
        let mut chip = Gc9a01::default();
        chip.set_chip_select(false);
        chip.set_data_command(false);
        chip.write_bytes(&[commands::INVON, commands::DISPON]);

        let path = std::env::temp_dir().join("gc9a01_core_test.state");
        save_to_file(&chip.save_state(), &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.width, 240);
        assert_eq!(loaded.height, 240);
        assert!(loaded.inverted);
        assert!(loaded.display_on);
        assert_eq!(loaded.framebuffer, chip.framebuffer.bytes());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let path = std::env::temp_dir().join("gc9a01_core_test.badmagic");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00garbage").unwrap();
        let result = load_from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_file_rejected() {
        let path = std::env::temp_dir().join("gc9a01_core_test.short");
        std::fs::write(&path, b"GCES").unwrap();
        let result = load_from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
