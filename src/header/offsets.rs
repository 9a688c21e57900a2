//! Cartridge header layout: field offsets and the logo bitmap.
//!
//! Offsets are absolute cart addresses, per
//! [Pan Docs](https://gbdev.io/pandocs/The_Cartridge_Header.html).

/// Nintendo logo bitmap: 0x104-0x133.
pub const LOGO: usize = 0x104;
pub const LOGO_LEN: usize = 0x30;
/// Title: up to 16 bytes, NUL padded.
pub const TITLE: usize = 0x134;
pub const TITLE_LEN: usize = 16;
pub const CGB_FLAG: usize = 0x143;   // Bit 7: CGB support, bit 6: CGB only
pub const SGB_FLAG: usize = 0x146;   // 0x03 when SGB functions are supported
pub const ROM_SIZE: usize = 0x148;
pub const RAM_SIZE: usize = 0x149;
pub const REGION: usize = 0x14A;     // 0x00 Japan, 0x01 overseas
pub const OLD_LICENSEE: usize = 0x14B;
pub const VERSION: usize = 0x14C;
/// Header checksum the boot ROM verifies.
pub const CHECKSUM: usize = 0x14D;

/// Bytes to read when inspecting a bank's header.
pub const HEADER_READ_LEN: usize = 512;

/// The logo bitmap the boot ROM compares against.
pub const NINTENDO_LOGO: [u8; LOGO_LEN] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B,
    0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E,
    0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC,
    0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];
