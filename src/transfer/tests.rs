use crate::device::{BANK_SIZE, CartIo, DeviceError, SRAM_SIZE, Space};
use crate::header::offsets::ROM_SIZE;
use crate::transfer::transfer::{TransferError, TransferSession};

/// In-memory cart with fault injection and a write log.
struct MemCart {
    rom: Vec<u8>,
    sram: Vec<u8>,
    fail_read_at: Option<u32>,
    fail_write_at: Option<u32>,
    writes: Vec<(Space, u32, usize)>,
}

impl MemCart {
    fn new() -> Self {
        MemCart {
            rom: vec![0; BANK_SIZE as usize],
            sram: vec![0; SRAM_SIZE as usize],
            fail_read_at: None,
            fail_write_at: None,
            writes: Vec::new(),
        }
    }

    fn with_banks(n: u32) -> Self {
        let mut cart = MemCart::new();
        cart.rom = vec![0; (n * BANK_SIZE) as usize];
        cart
    }
}

impl CartIo for MemCart {
    fn read_block(&mut self, space: Space, addr: u32, buf: &mut [u8]) -> Result<(), DeviceError> {
        if self.fail_read_at.is_some_and(|at| addr >= at) {
            return Err(DeviceError::Io(std::io::Error::other("injected fault")));
        }
        let mem = match space {
            Space::Rom => &self.rom,
            Space::Sram => &self.sram,
        };
        let start = addr as usize;
        buf.copy_from_slice(&mem[start..start + buf.len()]);
        Ok(())
    }

    fn write_block(&mut self, space: Space, addr: u32, data: &[u8]) -> Result<(), DeviceError> {
        if self.fail_write_at.is_some_and(|at| addr >= at) {
            return Err(DeviceError::Io(std::io::Error::other("injected fault")));
        }
        self.writes.push((space, addr, data.len()));
        let mem = match space {
            Space::Rom => &mut self.rom,
            Space::Sram => &mut self.sram,
        };
        let start = addr as usize;
        mem[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// File reader that always fails, standing in for a bad disk.
struct FailingReader;

impl std::io::Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("disk fault"))
    }
}

#[test]
fn rom_dump_stops_at_the_declared_size() {
    let mut cart = MemCart::new();
    for (i, b) in cart.rom.iter_mut().enumerate().take(0x8000) {
        *b = (i % 251) as u8;
    }
    cart.rom[ROM_SIZE] = 0x00; // 32 KB

    let mut out = Vec::new();
    let total = TransferSession::new(&mut cart, Space::Rom, 0, 4096)
        .dump(&mut out)
        .unwrap();

    assert_eq!(total, 0x8000);
    assert_eq!(out, &cart.rom[..0x8000]);
}

#[test]
fn unknown_size_code_reads_the_whole_bank() {
    let mut cart = MemCart::new();
    cart.rom[ROM_SIZE] = 0xFF;

    let mut out = Vec::new();
    let total = TransferSession::new(&mut cart, Space::Rom, 0, 0x8_0000)
        .dump(&mut out)
        .unwrap();

    assert_eq!(total, BANK_SIZE);
    assert_eq!(out.len(), BANK_SIZE as usize);
}

#[test]
fn sram_dump_reads_the_full_window() {
    let mut cart = MemCart::new();
    cart.sram[0] = 0xAA;
    cart.sram[SRAM_SIZE as usize - 1] = 0x55;
    // A ROM size code in save RAM must not narrow the bound
    cart.sram[ROM_SIZE] = 0x00;

    let mut out = Vec::new();
    let total = TransferSession::new(&mut cart, Space::Sram, 0, 0x1000)
        .dump(&mut out)
        .unwrap();

    assert_eq!(total, SRAM_SIZE);
    assert_eq!(out, cart.sram);
}

#[test]
fn dump_total_is_a_multiple_of_the_block_size() {
    let mut cart = MemCart::new();
    cart.rom[ROM_SIZE] = 0x00; // 32 KB, not divisible by the block size below

    let mut out = Vec::new();
    let total = TransferSession::new(&mut cart, Space::Rom, 0, 0x600)
        .dump(&mut out)
        .unwrap();

    assert_eq!(total, 0x7E00);
    assert_eq!(total % 0x600, 0);
    assert!(total <= 0x8000);
}

#[test]
fn bank_sized_block_reads_the_bank_in_one_piece() {
    let mut cart = MemCart::new();
    cart.rom[ROM_SIZE] = 0x00; // declares 32 KB, but the block is the whole bank

    let mut out = Vec::new();
    let total = TransferSession::new(&mut cart, Space::Rom, 0, BANK_SIZE)
        .dump(&mut out)
        .unwrap();

    assert_eq!(total, BANK_SIZE);
    assert_eq!(out.len(), BANK_SIZE as usize);
}

#[test]
fn bank_one_dump_reads_the_second_bank() {
    let mut cart = MemCart::with_banks(2);
    let base = BANK_SIZE as usize;
    cart.rom[base] = 0xC3;
    cart.rom[base + ROM_SIZE] = 0x00;
    cart.rom[base + 0x7FFF] = 0x99;

    let mut out = Vec::new();
    let total = TransferSession::new(&mut cart, Space::Rom, 1, 0x1000)
        .dump(&mut out)
        .unwrap();

    assert_eq!(total, 0x8000);
    assert_eq!(out, &cart.rom[base..base + 0x8000]);
}

#[test]
fn dump_reports_the_failing_read_offset() {
    let mut cart = MemCart::new();
    cart.rom[ROM_SIZE] = 0x02; // 128 KB
    cart.fail_read_at = Some(0x2000);

    let mut out = Vec::new();
    let err = TransferSession::new(&mut cart, Space::Rom, 0, 0x1000)
        .dump(&mut out)
        .unwrap_err();

    match err {
        TransferError::DeviceRead { offset, len, .. } => {
            assert_eq!(offset, 0x2000);
            assert_eq!(len, 0x1000);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(out.len(), 0x2000);
}

#[test]
fn flash_rejects_an_image_larger_than_the_rom() {
    let mut cart = MemCart::new();
    let err = TransferSession::new(&mut cart, Space::Rom, 0, 32)
        .flash(&mut std::io::empty(), 5 * 1024 * 1024)
        .unwrap_err();

    assert!(matches!(err, TransferError::TooLarge { .. }));
    assert!(cart.writes.is_empty());
}

#[test]
fn flash_rejects_an_image_larger_than_the_sram() {
    let mut cart = MemCart::new();
    let err = TransferSession::new(&mut cart, Space::Sram, 0, 32)
        .flash(&mut std::io::empty(), SRAM_SIZE as u64 + 1)
        .unwrap_err();

    assert!(matches!(err, TransferError::TooLarge { .. }));
    assert!(cart.writes.is_empty());
}

#[test]
fn flash_streams_whole_blocks_and_drops_the_tail() {
    let mut cart = MemCart::new();
    let image: Vec<u8> = (0..3 * 32 + 7).map(|i| i as u8).collect();

    let total = TransferSession::new(&mut cart, Space::Rom, 0, 32)
        .flash(&mut image.as_slice(), image.len() as u64)
        .unwrap();

    assert_eq!(total, 96);
    assert_eq!(
        cart.writes,
        vec![(Space::Rom, 0, 32), (Space::Rom, 32, 32), (Space::Rom, 64, 32)]
    );
    assert_eq!(&cart.rom[..96], &image[..96]);
    assert_eq!(cart.rom[96], 0);
}

#[test]
fn flash_fills_the_sram_exactly() {
    let mut cart = MemCart::new();
    let image = vec![0x5A; SRAM_SIZE as usize];

    let total = TransferSession::new(&mut cart, Space::Sram, 0, 4096)
        .flash(&mut image.as_slice(), image.len() as u64)
        .unwrap();

    assert_eq!(total, SRAM_SIZE);
    assert_eq!(cart.sram, image);
}

#[test]
fn bank_one_flash_writes_to_the_second_bank() {
    let mut cart = MemCart::with_banks(2);
    let image = vec![0xE7; 64];

    let total = TransferSession::new(&mut cart, Space::Rom, 1, 32)
        .flash(&mut image.as_slice(), 64)
        .unwrap();

    assert_eq!(total, 64);
    assert_eq!(cart.writes[0].1, BANK_SIZE);
    let base = BANK_SIZE as usize;
    assert_eq!(&cart.rom[base..base + 64], &image[..]);
}

#[test]
fn flash_reports_the_failing_write_offset() {
    let mut cart = MemCart::new();
    cart.fail_write_at = Some(64);
    let image = vec![0u8; 256];

    let err = TransferSession::new(&mut cart, Space::Rom, 0, 32)
        .flash(&mut image.as_slice(), image.len() as u64)
        .unwrap_err();

    match err {
        TransferError::DeviceWrite { offset, len, .. } => {
            assert_eq!(offset, 64);
            assert_eq!(len, 32);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(cart.writes.len(), 2);
}

#[test]
fn empty_input_writes_nothing() {
    let mut cart = MemCart::new();
    let total = TransferSession::new(&mut cart, Space::Rom, 0, 32)
        .flash(&mut std::io::empty(), 0)
        .unwrap();

    assert_eq!(total, 0);
    assert!(cart.writes.is_empty());
}

#[test]
fn input_errors_abort_the_flash() {
    let mut cart = MemCart::new();
    let err = TransferSession::new(&mut cart, Space::Rom, 0, 32)
        .flash(&mut FailingReader, 1024)
        .unwrap_err();

    assert!(matches!(err, TransferError::FileRead { .. }));
    assert!(cart.writes.is_empty());
}
