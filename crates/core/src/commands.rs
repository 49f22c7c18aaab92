//! GC9A01 command codes and argument counts.
//!
//! Only the subset exercised by common driver libraries is modeled. Every
//! other code is treated as a zero-argument no-op, so an unknown command
//! never desynchronizes the stream.

/// Software reset
pub const SWRESET: u8 = 0x01;
/// Sleep out
pub const SLPOUT: u8 = 0x11;
/// Display inversion off
pub const INVOFF: u8 = 0x20;
/// Display inversion on
pub const INVON: u8 = 0x21;
/// Display off
pub const DISPOFF: u8 = 0x28;
/// Display on
pub const DISPON: u8 = 0x29;
/// Column address set – 4 args (startHi, startLo, endHi, endLo)
pub const CASET: u8 = 0x2A;
/// Row address set – 4 args
pub const RASET: u8 = 0x2B;
/// Memory write
pub const RAMWR: u8 = 0x2C;
/// Memory access control – 1 arg
pub const MADCTL: u8 = 0x36;
/// Pixel format set – 1 arg
pub const COLMOD: u8 = 0x3A;

/// Number of argument bytes that follow a command byte.
pub fn arg_count(command: u8) -> u8 {
    match command {
        CASET | RASET => 4,
        MADCTL | COLMOD => 1,
        _ => 0,
    }
}
