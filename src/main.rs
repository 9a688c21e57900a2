//! EMS flasher entry point.
//!
//! Dumps and flashes the EMS 64 Mbit USB cart, or reports the cart header
//! of both ROM banks.
//! Usage: emsflash <--read | --write | --title> [options] [file]

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser};
use emsflash::device::{BANK_SIZE, CartIo, Space};
use emsflash::ems::EmsDevice;
use emsflash::header::header::CartridgeHeader;
use emsflash::header::offsets::HEADER_READ_LEN;
use emsflash::transfer::transfer::{READ_BLOCKSIZE, TransferSession, WRITE_BLOCKSIZE};
use log::LevelFilter;

/// Writes a ROM or SAV file to the EMS 64 Mbit USB flash cart
#[derive(Parser)]
#[command(version, about, group = ArgGroup::new("mode").required(true))]
struct Args {
    /// Read entire cart into file
    #[arg(short, long, group = "mode", requires = "file")]
    read: bool,

    /// Write ROM file to cart
    #[arg(short, long, group = "mode", requires = "file")]
    write: bool,

    /// Title of the ROM in both banks
    #[arg(short, long, group = "mode")]
    title: bool,

    /// Select cart bank (1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=2))]
    bank: u32,

    /// Force transfer to/from SRAM
    #[arg(long, group = "space")]
    save: bool,

    /// Force transfer to/from Flash ROM
    #[arg(long, group = "space")]
    rom: bool,

    /// Bytes per block (default: 4096 read, 32 write)
    #[arg(short = 's', long, value_parser = clap::value_parser!(u32).range(1..=BANK_SIZE as i64))]
    blocksize: Option<u32>,

    /// Device node of the cart
    #[arg(long, default_value = "/dev/ems64")]
    device: PathBuf,

    /// Log transfer detail
    #[arg(short, long)]
    verbose: bool,

    /// ROM or SAV image file
    file: Option<String>,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    log::info!("trying to find EMS cart at {}", args.device.display());
    let device = EmsDevice::open(&args.device)?;
    log::info!("claimed EMS cart");

    if args.title {
        return print_header_reports(device);
    }

    let Some(file) = args.file.as_deref() else {
        // clap enforces this for --read / --write already
        return Err("an image file is required".into());
    };
    let space = if args.save {
        Space::Sram
    } else if args.rom {
        Space::Rom
    } else {
        Space::from_filename(file)
    };
    let block_size = args
        .blocksize
        .unwrap_or(if args.read { READ_BLOCKSIZE } else { WRITE_BLOCKSIZE });
    let session = TransferSession::new(device, space, args.bank - 1, block_size).with_progress();

    let what = match space {
        Space::Rom => "ROM",
        Space::Sram => "SAVE",
    };

    if args.read {
        let mut out = BufWriter::new(
            File::create(file).map_err(|e| format!("can't open {file} for writing: {e}"))?,
        );
        log::info!("saving {what} into {file}");
        let total = session.dump(&mut out)?;
        out.flush()?;
        println!("Successfully wrote {total} bytes into {file}");
    } else {
        let input_file =
            File::open(file).map_err(|e| format!("can't open {what} file {file}: {e}"))?;
        let len = input_file.metadata()?.len();
        let mut input = BufReader::new(input_file);
        log::info!("writing {what} file {file}");
        let total = session.flash(&mut input, len)?;
        println!("Successfully wrote {total} bytes from {file}");
    }
    Ok(())
}

/// Read 512 bytes at each bank's base and print both header reports.
fn print_header_reports(mut device: EmsDevice) -> Result<(), Box<dyn Error>> {
    let mut buf = [0u8; HEADER_READ_LEN];
    for bank in 0..2u32 {
        if bank > 0 {
            println!();
        }
        device
            .read_block(Space::Rom, bank * BANK_SIZE, &mut buf)
            .map_err(|e| {
                format!("couldn't read ROM header at bank {bank}, offset 0, len {HEADER_READ_LEN}: {e}")
            })?;
        let report = CartridgeHeader::new(&buf)?.validate();
        println!("Bank {bank}: ");
        print!("{}", report.print());
    }
    Ok(())
}
