//! Address spaces and block transport for the EMS cart.
//!
//! The cart holds two 4 MiB flash banks and a separate 128 KiB save RAM.
//! Everything above block granularity goes through the [`CartIo`] trait.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One flash bank: 32 megabits, two per cart.
pub const BANK_SIZE: u32 = 0x40_0000;
/// Save RAM: 128 KiB.
pub const SRAM_SIZE: u32 = 0x2_0000;

/// Which of the cart's two address spaces a transfer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    Rom,
    Sram,
}

impl Space {
    /// Capacity of the space, the hard bound on any transfer.
    pub fn size(self) -> u32 {
        match self {
            Space::Rom => BANK_SIZE,
            Space::Sram => SRAM_SIZE,
        }
    }

    /// Pick a space from the image filename: a `.sav` suffix (any case)
    /// means save RAM, everything else flash.
    pub fn from_filename(name: &str) -> Space {
        let bytes = name.as_bytes();
        if bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".sav") {
            Space::Sram
        } else {
            Space::Rom
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::Rom => f.write_str("ROM"),
            Space::Sram => f.write_str("SRAM"),
        }
    }
}

/// Device-level failure: claiming the cart or moving a block.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("can't open device {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Block transport into the cart.
///
/// Blocking, and atomic at block granularity: a call either moves the
/// whole block or fails.
pub trait CartIo {
    fn read_block(&mut self, space: Space, addr: u32, buf: &mut [u8]) -> Result<(), DeviceError>;
    fn write_block(&mut self, space: Space, addr: u32, data: &[u8]) -> Result<(), DeviceError>;
}

/// A mutable reference to a transport is itself a transport.
impl<D: CartIo + ?Sized> CartIo for &mut D {
    fn read_block(&mut self, space: Space, addr: u32, buf: &mut [u8]) -> Result<(), DeviceError> {
        (**self).read_block(space, addr, buf)
    }

    fn write_block(&mut self, space: Space, addr: u32, data: &[u8]) -> Result<(), DeviceError> {
        (**self).write_block(space, addr, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sav_extension_selects_sram() {
        assert_eq!(Space::from_filename("zelda.sav"), Space::Sram);
        assert_eq!(Space::from_filename("ZELDA.SAV"), Space::Sram);
        assert_eq!(Space::from_filename("mixed.SaV"), Space::Sram);
    }

    #[test]
    fn other_names_select_rom() {
        assert_eq!(Space::from_filename("zelda.gb"), Space::Rom);
        assert_eq!(Space::from_filename("backup.sav.gz"), Space::Rom);
        assert_eq!(Space::from_filename("sav"), Space::Rom);
        assert_eq!(Space::from_filename(""), Space::Rom);
    }

    #[test]
    fn space_sizes_match_the_cart_geometry() {
        assert_eq!(Space::Rom.size(), BANK_SIZE);
        assert_eq!(Space::Sram.size(), SRAM_SIZE);
    }
}
