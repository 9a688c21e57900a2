//! The EMS 64 Mbit USB cart, reached through its device node.
//!
//! The node maps the flash at offset 0 (both banks back to back) and the
//! save RAM window at 0x80_0000. One seek plus one exact-length transfer
//! per block.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::device::{CartIo, DeviceError, Space};

/// Node offset of the 128 KiB save RAM window.
const SRAM_WINDOW: u64 = 0x80_0000;

/// An open EMS cart.
pub struct EmsDevice {
    node: File,
}

impl EmsDevice {
    /// Claim the cart at the given device node.
    pub fn open(path: &Path) -> Result<EmsDevice, DeviceError> {
        let node = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| DeviceError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(EmsDevice { node })
    }

    fn node_offset(space: Space, addr: u32) -> u64 {
        match space {
            Space::Rom => addr as u64,
            Space::Sram => SRAM_WINDOW + addr as u64,
        }
    }
}

impl CartIo for EmsDevice {
    fn read_block(&mut self, space: Space, addr: u32, buf: &mut [u8]) -> Result<(), DeviceError> {
        self.node
            .seek(SeekFrom::Start(Self::node_offset(space, addr)))?;
        self.node.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&mut self, space: Space, addr: u32, data: &[u8]) -> Result<(), DeviceError> {
        self.node
            .seek(SeekFrom::Start(Self::node_offset(space, addr)))?;
        self.node.write_all(data)?;
        Ok(())
    }
}
