//! Emsflash: a flasher for the EMS 64 Mbit USB Game Boy cart.
//!
//! Reads back and flashes the cart's two 4 MiB flash banks and its 128 KiB
//! save RAM, and validates the
//! [cartridge header](https://gbdev.io/pandocs/The_Cartridge_Header.html)
//! the way the Game Boy boot ROM does.
//!
//! ## Modules (Pan Docs references)
//!
//! - **device** – address spaces, bank geometry, the block transport trait
//! - **ems** – the EMS cart behind its device node
//! - **header** – [The Cartridge Header](https://gbdev.io/pandocs/The_Cartridge_Header.html):
//!   Nintendo logo, checksum, hardware flags, ROM size
//! - **transfer** – bounded block streaming between cart and image file

pub mod device;
pub mod ems;
pub mod header;
pub mod transfer;
