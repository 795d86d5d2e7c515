//! SSD1309 command bytes and the power-on initialisation sequence.
//!
//! Multi-byte commands are sent as a command byte followed by its argument
//! byte(s), all with the data/command line held in command mode.

// ── Fundamental commands ─────────────────────────────────────────────────

/// Set contrast control; followed by one argument byte.
pub const SET_CONTRAST: u8 = 0x81;
/// Resume to RAM content display (output follows the frame buffer).
pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
/// Normal (non-inverted) display.
pub const NORMAL_DISPLAY: u8 = 0xA6;
/// Panel off (sleep).
pub const DISPLAY_OFF: u8 = 0xAE;
/// Panel on.
pub const DISPLAY_ON: u8 = 0xAF;

// ── Addressing ───────────────────────────────────────────────────────────

/// Memory addressing mode; followed by one argument byte.
pub const SET_ADDRESSING_MODE: u8 = 0x20;
/// Lower column start nibble (page addressing mode), OR'd with the nibble.
pub const SET_LOW_COLUMN: u8 = 0x00;
/// Upper column start nibble (page addressing mode), OR'd with the nibble.
pub const SET_HIGH_COLUMN: u8 = 0x10;
/// Page start address (page addressing mode), OR'd with the page index.
pub const SET_PAGE_START: u8 = 0xB0;

// ── Hardware configuration ───────────────────────────────────────────────

/// Display start line 0.
pub const SET_START_LINE: u8 = 0x40;
/// Column 127 mapped to SEG0.
pub const SEGMENT_REMAP: u8 = 0xA1;
/// Multiplex ratio; followed by one argument byte.
pub const SET_MULTIPLEX: u8 = 0xA8;
/// Scan from COM[N-1] to COM0.
pub const COM_SCAN_DEC: u8 = 0xC8;
/// Vertical display offset; followed by one argument byte.
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
/// COM pins hardware configuration; followed by one argument byte.
pub const SET_COM_PINS: u8 = 0xDA;

// ── Timing and driving scheme ────────────────────────────────────────────

/// Clock divide ratio / oscillator frequency; followed by one argument byte.
pub const SET_CLOCK_DIV: u8 = 0xD5;
/// Pre-charge period; followed by one argument byte.
pub const SET_PRECHARGE: u8 = 0xD9;
/// VCOMH deselect level; followed by one argument byte.
pub const SET_VCOMH: u8 = 0xDB;
/// Charge pump setting; followed by one argument byte.
pub const CHARGE_PUMP: u8 = 0x8D;

/// Default contrast written by [`INIT_SEQUENCE`].
pub const DEFAULT_CONTRAST: u8 = 0x7F;

/// Controller initialisation stream, sent once after reset.
///
/// Every byte goes out as a command. The order and values are what the
/// SSD1309 panel expects for a 128×64 module with the internal charge pump.
#[rustfmt::skip]
pub const INIT_SEQUENCE: [u8; 25] = [
    DISPLAY_OFF,
    SET_CLOCK_DIV, 0x80,
    SET_MULTIPLEX, 0x3F,
    SET_DISPLAY_OFFSET, 0x00,
    SET_START_LINE,
    CHARGE_PUMP, 0x14,
    SET_ADDRESSING_MODE, 0x00,
    SEGMENT_REMAP,
    COM_SCAN_DEC,
    SET_COM_PINS, 0x12,
    SET_CONTRAST, DEFAULT_CONTRAST,
    SET_PRECHARGE, 0x22,
    SET_VCOMH, 0x20,
    ENTIRE_DISPLAY_RESUME,
    NORMAL_DISPLAY,
    DISPLAY_ON,
];

/// Page-select command for `page` (0–7).
pub const fn page_address(page: u8) -> u8 {
    SET_PAGE_START | (page & 0x07)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_sequence_matches_panel_bytes() {
        assert_eq!(
            INIT_SEQUENCE,
            [
                0xAE, 0xD5, 0x80, 0xA8, 0x3F, 0xD3, 0x00, 0x40, 0x8D, 0x14, 0x20, 0x00, 0xA1,
                0xC8, 0xDA, 0x12, 0x81, 0x7F, 0xD9, 0x22, 0xDB, 0x20, 0xA4, 0xA6, 0xAF,
            ]
        );
    }

    #[test]
    fn init_sequence_starts_off_and_ends_on() {
        assert_eq!(INIT_SEQUENCE[0], DISPLAY_OFF);
        assert_eq!(INIT_SEQUENCE[INIT_SEQUENCE.len() - 1], DISPLAY_ON);
    }

    #[test]
    fn page_addresses() {
        assert_eq!(page_address(0), 0xB0);
        assert_eq!(page_address(7), 0xB7);
    }
}
