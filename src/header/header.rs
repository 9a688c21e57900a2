//! Header view and validation report.
//!
//! Checks what the boot ROM checks (logo, checksum) plus the hardware
//! flag and ROM size fields, and renders the report the flasher prints.

use std::fmt;

use ansi_term::Colour::{Green, Red};
use thiserror::Error;

use crate::header::offsets::{
    CGB_FLAG, CHECKSUM, LOGO, LOGO_LEN, NINTENDO_LOGO, OLD_LICENSEE, RAM_SIZE, REGION, ROM_SIZE,
    SGB_FLAG, TITLE, TITLE_LEN, VERSION,
};

/// Why a buffer cannot be read as a cartridge header.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("cartridge header needs at least 0x14E bytes, got {len}")]
    TooShort { len: usize },
}

/// Borrowing view over a buffer that starts at cart address 0.
///
/// Construction checks the length once; the accessors then index freely.
pub struct CartridgeHeader<'a> {
    data: &'a [u8],
}

impl<'a> CartridgeHeader<'a> {
    /// Wrap a buffer; it must cover the whole header block.
    pub fn new(data: &'a [u8]) -> Result<CartridgeHeader<'a>, HeaderError> {
        if data.len() <= CHECKSUM {
            return Err(HeaderError::TooShort { len: data.len() });
        }
        Ok(CartridgeHeader { data })
    }

    /// Title, cut at the first NUL and limited to printable ASCII.
    /// `None` when the field's first byte is 0.
    pub fn title(&self) -> Option<String> {
        let raw = &self.data[TITLE..TITLE + TITLE_LEN];
        if raw[0] == 0 {
            return None;
        }
        Some(
            raw.iter()
                .take_while(|&&b| b != 0)
                .filter(|&&b| (0x20..0x7F).contains(&b))
                .map(|&b| b as char)
                .collect(),
        )
    }

    /// Leading bytes of the logo that match the reference bitmap.
    pub fn logo_matched(&self) -> usize {
        self.data[LOGO..LOGO + LOGO_LEN]
            .iter()
            .zip(NINTENDO_LOGO.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Boot ROM check: bytes 0x134..=0x14D plus 25 must wrap to zero.
    pub fn checksum_ok(&self) -> bool {
        let mut sum = 25u8;
        for &b in &self.data[TITLE..=CHECKSUM] {
            sum = sum.wrapping_add(b);
        }
        sum == 0
    }

    pub fn cgb_flag(&self) -> u8 {
        self.data[CGB_FLAG]
    }

    pub fn sgb_flag(&self) -> u8 {
        self.data[SGB_FLAG]
    }

    pub fn rom_size_code(&self) -> u8 {
        self.data[ROM_SIZE]
    }

    pub fn ram_size_code(&self) -> u8 {
        self.data[RAM_SIZE]
    }

    pub fn region(&self) -> u8 {
        self.data[REGION]
    }

    pub fn old_licensee(&self) -> u8 {
        self.data[OLD_LICENSEE]
    }

    pub fn version(&self) -> u8 {
        self.data[VERSION]
    }

    /// Run every header check and produce the report.
    pub fn validate(&self) -> ValidationReport {
        let logo_matched = self.logo_matched();
        let logo = if logo_matched == LOGO_LEN {
            LogoTier::Full
        } else if logo_matched > LOGO_LEN / 2 {
            LogoTier::Partial
        } else {
            LogoTier::Fail
        };
        let checksum_ok = self.checksum_ok();
        let verdict = if logo == LogoTier::Fail || !checksum_ok {
            BootVerdict::None
        } else if logo == LogoTier::Partial {
            BootVerdict::CgbOnly
        } else {
            BootVerdict::Universal
        };
        let rom_size_code = self.rom_size_code();
        ValidationReport {
            title: self.title(),
            logo_matched,
            logo,
            hardware: classify(self.cgb_flag(), self.sgb_flag()),
            checksum_ok,
            rom_size_code,
            rom_size: rom_size_bytes(rom_size_code),
            verdict,
        }
    }
}

/// How far the logo matched: the DMG boot ROM needs all of it, the CGB
/// one only checks the top half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoTier {
    Full,
    /// More than half matched, short of the whole bitmap.
    Partial,
    Fail,
}

/// Hardware the cart declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardware {
    Cgb,
    DmgCgbSgb,
    DmgCgb,
    DmgSgb,
    Dmg,
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hardware::Cgb => "CGB",
            Hardware::DmgCgbSgb => "DMG <+CGB, +SGB>",
            Hardware::DmgCgb => "DMG <+CGB>",
            Hardware::DmgSgb => "DMG <+SGB>",
            Hardware::Dmg => "DMG",
        };
        f.write_str(s)
    }
}

/// Whether the header lets the game boot, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootVerdict {
    Universal,
    CgbOnly,
    None,
}

/// Hardware support from the CGB and SGB flag bytes, most capable first.
fn classify(cgb: u8, sgb: u8) -> Hardware {
    if cgb & 0x80 != 0 && cgb & 0x40 != 0 {
        Hardware::Cgb
    } else if cgb & 0x80 != 0 && sgb == 0x03 {
        Hardware::DmgCgbSgb
    } else if cgb & 0x80 != 0 {
        Hardware::DmgCgb
    } else if sgb == 0x03 {
        Hardware::DmgSgb
    } else {
        Hardware::Dmg
    }
}

/// Decode the ROM size code to a byte count, `None` for unknown codes.
pub fn rom_size_bytes(code: u8) -> Option<u32> {
    match code {
        0x00..=0x07 => Some((32 << code) * 1024),
        0x52 => Some(1152 * 1024),
        0x53 => Some(1280 * 1024),
        0x54 => Some(1536 * 1024),
        _ => None,
    }
}

/// Everything the validator found, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub title: Option<String>,
    pub logo_matched: usize,
    pub logo: LogoTier,
    pub hardware: Hardware,
    pub checksum_ok: bool,
    pub rom_size_code: u8,
    pub rom_size: Option<u32>,
    pub verdict: BootVerdict,
}

impl ValidationReport {
    /// Returns the printable report block, one tab-indented line per field.
    pub fn print(&self) -> String {
        let logo = match self.logo {
            LogoTier::Full => Green.paint("PASS").to_string(),
            LogoTier::Partial => format!("{}, but will boot on CGB", Red.paint("FAIL")),
            LogoTier::Fail => Red.paint("FAIL").to_string(),
        };
        let checksum = if self.checksum_ok {
            Green.paint("PASS").to_string()
        } else {
            Red.paint("FAIL").to_string()
        };
        let size = match self.rom_size {
            Some(bytes) => format!("{} KB ROM", bytes / 1024),
            None => "Unknown ROM size code".to_string(),
        };
        let boot = match self.verdict {
            BootVerdict::None => "This game will not boot on any system.",
            BootVerdict::CgbOnly => "This game will only boot on CGB.",
            BootVerdict::Universal => "This game will work on any system.",
        };
        format!(
            "\tTitle: {}\n\
             \tNintendo logo: {}\n\
             \tHardware support: {}\n\
             \tHeader checksum: {}\n\
             \tRom size: {}\n\
             \tBoot status: {}\n",
            self.title.as_deref().unwrap_or("NONE"),
            logo,
            self.hardware,
            checksum,
            size,
            boot
        )
    }
}
