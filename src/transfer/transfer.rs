//! Transfer session: bounded block streaming in either direction.
//!
//! Never moves a partial block and never crosses the space bound. ROM
//! dumps narrow their bound once, when the block holding the header's
//! ROM size byte has been read.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::device::{BANK_SIZE, CartIo, DeviceError, SRAM_SIZE, Space};
use crate::header::header::rom_size_bytes;
use crate::header::offsets;

/// Default block size when reading the cart.
pub const READ_BLOCKSIZE: u32 = 4096;
/// Default block size when writing; flash writes go in small chunks.
pub const WRITE_BLOCKSIZE: u32 = 32;

/// Transfer failure. Device and file errors carry the offset and block
/// size that were in flight.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("can't read {len} bytes at offset {offset}: {source}")]
    DeviceRead {
        offset: u32,
        len: u32,
        source: DeviceError,
    },
    #[error("can't write {len} bytes at offset {offset}: {source}")]
    DeviceWrite {
        offset: u32,
        len: u32,
        source: DeviceError,
    },
    #[error("can't read {len} bytes from the file at offset {offset}: {source}")]
    FileRead {
        offset: u32,
        len: u32,
        source: io::Error,
    },
    #[error("can't write {len} bytes into the file at offset {offset}: {source}")]
    FileWrite {
        offset: u32,
        len: u32,
        source: io::Error,
    },
    #[error("image is {size} bytes large, {space} holds at most {max}")]
    TooLarge { size: u64, space: Space, max: u32 },
}

/// Read bound for a dump: probing until the header's ROM size byte has
/// been seen, then set for good.
#[derive(Debug, Clone, Copy)]
enum ReadUntil {
    Probing(u32),
    Set(u32),
}

impl ReadUntil {
    fn bound(self) -> u32 {
        match self {
            ReadUntil::Probing(n) | ReadUntil::Set(n) => n,
        }
    }
}

/// One bounded transfer against the cart.
///
/// Owns the device for its lifetime; `dump` and `flash` consume the
/// session, so the device is released when either returns.
pub struct TransferSession<D: CartIo> {
    device: D,
    space: Space,
    base: u32,
    block_size: u32,
    show_progress: bool,
}

impl<D: CartIo> TransferSession<D> {
    /// Set up a transfer over `space`; `bank` is 0-based and `block_size`
    /// must be nonzero.
    pub fn new(device: D, space: Space, bank: u32, block_size: u32) -> TransferSession<D> {
        let base = bank * BANK_SIZE;
        log::debug!("base address is {base:#x}");
        TransferSession {
            device,
            space,
            base,
            block_size,
            show_progress: false,
        }
    }

    /// Show carriage-return progress on stdout while transferring.
    pub fn with_progress(mut self) -> TransferSession<D> {
        self.show_progress = true;
        self
    }

    /// Stream the space into `out`. ROM dumps stop at the size the header
    /// declares; SRAM dumps always cover the whole window. Returns the
    /// bytes transferred.
    pub fn dump<W: Write>(mut self, out: &mut W) -> Result<u32, TransferError> {
        let mut until = match self.space {
            Space::Rom => ReadUntil::Probing(BANK_SIZE),
            Space::Sram => ReadUntil::Set(SRAM_SIZE),
        };
        let mut buf = vec![0u8; self.block_size as usize];
        let mut offset: u32 = 0;
        while offset + self.block_size <= until.bound() {
            self.device
                .read_block(self.space, self.base + offset, &mut buf)
                .map_err(|source| TransferError::DeviceRead {
                    offset,
                    len: self.block_size,
                    source,
                })?;
            out.write_all(&buf).map_err(|source| TransferError::FileWrite {
                offset,
                len: self.block_size,
                source,
            })?;
            offset += self.block_size;
            self.progress("Saving", offset, until.bound());

            // The block covering the ROM size byte settles the bound, once
            if let ReadUntil::Probing(bound) = until {
                let start = offset - self.block_size;
                let size_at = offsets::ROM_SIZE as u32;
                if start <= size_at && size_at < offset {
                    let code = buf[(size_at - start) as usize];
                    // Never narrow below what has already been written out
                    let declared = rom_size_bytes(code).map_or(bound, |n| n.max(offset));
                    log::debug!("ROM size code {code:#04x}, reading until {declared:#x}");
                    until = ReadUntil::Set(declared);
                }
            }
        }
        log::debug!("dump finished at offset {offset:#x}");
        Ok(offset)
    }

    /// Stream `input` onto the cart. `input_len` is checked against the
    /// space's capacity before anything is written; a trailing partial
    /// block is dropped. Returns the bytes transferred.
    pub fn flash<R: Read>(mut self, input: &mut R, input_len: u64) -> Result<u32, TransferError> {
        let max = self.space.size();
        if input_len > max as u64 {
            return Err(TransferError::TooLarge {
                size: input_len,
                space: self.space,
                max,
            });
        }
        let mut buf = vec![0u8; self.block_size as usize];
        let mut offset: u32 = 0;
        while offset + self.block_size <= max {
            match input.read_exact(&mut buf) {
                Ok(()) => {}
                // A short trailing block ends the transfer
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(source) => {
                    return Err(TransferError::FileRead {
                        offset,
                        len: self.block_size,
                        source,
                    });
                }
            }
            self.device
                .write_block(self.space, self.base + offset, &buf)
                .map_err(|source| TransferError::DeviceWrite {
                    offset,
                    len: self.block_size,
                    source,
                })?;
            offset += self.block_size;
            self.progress("Writing", offset, input_len as u32);
        }
        log::debug!("flash finished at offset {offset:#x}");
        Ok(offset)
    }

    fn progress(&self, verb: &str, done: u32, total: u32) {
        if !self.show_progress {
            return;
        }
        print!("{verb}: {:.2}%\r", f64::from(done) / f64::from(total) * 100.0);
        let _ = io::stdout().flush();
    }
}
