//! Cartridge header parsing and validation.
//!
//! Pan Docs: [The Cartridge Header](https://gbdev.io/pandocs/The_Cartridge_Header.html).
//! Logo compare, header checksum, hardware flags, ROM size decoding.

pub mod header;
pub mod offsets;
