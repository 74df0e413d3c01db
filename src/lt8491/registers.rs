//! LT8491 register map.
//!
//! Every register the part documents is listed here with its command
//! address, transfer width and, for the ones carrying a physical quantity,
//! the fixed-point scale applied to the raw word. Addresses are the SMBus
//! command byte; multi-byte registers occupy consecutive commands starting
//! at the listed address, least significant byte first.

/// Default 7-bit bus address of the LT8491.
pub const DEFAULT_ADDRESS: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
    DoubleWord,
}

impl Width {
    pub const fn bytes(self) -> u8 {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
            Width::DoubleWord => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Read only, refreshed by the part.
    Telemetry,
    /// Read only.
    Status,
    /// Write triggers.
    Control,
    /// Read/write calibration and charging profile.
    Configuration,
    Manufacturer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Watt,
    Percent,
    Ampere,
    Volt,
    Milliohm,
    Kiloohm,
}

impl Unit {
    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Watt => "W",
            Unit::Percent => "%",
            Unit::Ampere => "A",
            Unit::Volt => "V",
            Unit::Milliohm => "mΩ",
            Unit::Kiloohm => "kΩ",
        }
    }
}

/// Fixed-point scaling of a 16 bit register: `physical = raw / divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub divisor: u16,
    pub unit: Unit,
    pub signed: bool,
}

impl Scale {
    const fn unsigned(divisor: u16, unit: Unit) -> Scale {
        Scale { divisor, unit, signed: false }
    }

    const fn signed(divisor: u16, unit: Unit) -> Scale {
        Scale { divisor, unit, signed: true }
    }

    /// Converts a physical value into the register encoding, truncating
    /// toward zero.
    pub fn encode(self, physical: f64) -> u16 {
        (physical * self.divisor as f64) as u16
    }
}

/// A raw register word together with the scale it is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledValue {
    pub raw: u16,
    pub scale: Scale,
}

impl ScaledValue {
    pub fn new(raw: u16, scale: Scale) -> ScaledValue {
        ScaledValue { raw, scale }
    }

    pub fn value(&self) -> f32 {
        let raw = if self.scale.signed {
            self.raw as i16 as f32
        } else {
            self.raw as f32
        };
        raw / self.scale.divisor as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub name: &'static str,
    pub address: u8,
    pub width: Width,
    pub namespace: Namespace,
    pub scale: Option<Scale>,
}

impl Register {
    const fn new(name: &'static str, address: u8, width: Width, namespace: Namespace) -> Register {
        Register { name, address, width, namespace, scale: None }
    }

    const fn scaled(name: &'static str, address: u8, namespace: Namespace, scale: Scale) -> Register {
        Register { name, address, width: Width::Word, namespace, scale: Some(scale) }
    }

    /// Address of the last byte this register occupies.
    pub const fn last_address(&self) -> u8 {
        self.address + self.width.bytes() - 1
    }
}

use Namespace::*;
use Width::*;

// Telemetry
pub const TELE_TBAT: Register = Register::scaled("TELE_TBAT", 0x00, Telemetry, Scale::signed(10, Unit::Celsius));
pub const TELE_POUT: Register = Register::scaled("TELE_POUT", 0x02, Telemetry, Scale::unsigned(100, Unit::Watt));
pub const TELE_PIN: Register = Register::scaled("TELE_PIN", 0x04, Telemetry, Scale::unsigned(100, Unit::Watt));
pub const TELE_EFF: Register = Register::scaled("TELE_EFF", 0x06, Telemetry, Scale::unsigned(100, Unit::Percent));
pub const TELE_IOUT: Register = Register::scaled("TELE_IOUT", 0x08, Telemetry, Scale::unsigned(1000, Unit::Ampere));
pub const TELE_IIN: Register = Register::scaled("TELE_IIN", 0x0A, Telemetry, Scale::unsigned(1000, Unit::Ampere));
pub const TELE_VBAT: Register = Register::scaled("TELE_VBAT", 0x0C, Telemetry, Scale::unsigned(100, Unit::Volt));
pub const TELE_VIN: Register = Register::scaled("TELE_VIN", 0x0E, Telemetry, Scale::unsigned(100, Unit::Volt));
pub const TELE_VINR: Register = Register::scaled("TELE_VINR", 0x10, Telemetry, Scale::unsigned(100, Unit::Volt));

// Status
pub const STAT_CHARGER: Register = Register::new("STAT_CHARGER", 0x12, Byte, Status);
pub const STAT_SYSTEM: Register = Register::new("STAT_SYSTEM", 0x13, Byte, Status);
pub const STAT_SUPPLY: Register = Register::new("STAT_SUPPLY", 0x14, Byte, Status);
pub const STAT_TS0_REMAIN: Register = Register::new("STAT_TS0_REMAIN", 0x15, Byte, Status);
pub const STAT_TS1_REMAIN: Register = Register::new("STAT_TS1_REMAIN", 0x16, Byte, Status);
pub const STAT_TS2_REMAIN: Register = Register::new("STAT_TS2_REMAIN", 0x17, Byte, Status);
pub const STAT_TS3_REMAIN: Register = Register::new("STAT_TS3_REMAIN", 0x18, Byte, Status);
pub const STAT_CHRG_FAULTS: Register = Register::new("STAT_CHRG_FAULTS", 0x19, Byte, Status);
pub const STAT_VERSION: Register = Register::new("STAT_VERSION", 0x1A, Word, Status);
pub const STAT_BOOT_CRC: Register = Register::new("STAT_BOOT_CRC", 0x1C, Word, Status);
pub const STAT_CFG_CRC: Register = Register::new("STAT_CFG_CRC", 0x1E, Word, Status);

// Control
pub const CTRL_WRT_TO_BOOT: Register = Register::new("CTRL_WRT_TO_BOOT", 0x20, Byte, Control);
pub const CTRL_EE_WRT_EN: Register = Register::new("CTRL_EE_WRT_EN", 0x21, Byte, Control);
pub const CTRL_HALT_STARTUP: Register = Register::new("CTRL_HALT_STARTUP", 0x22, Byte, Control);
pub const CTRL_CHRG_EN: Register = Register::new("CTRL_CHRG_EN", 0x23, Byte, Control);
pub const CTRL_RESTART_CHIP: Register = Register::new("CTRL_RESTART_CHIP", 0x24, Byte, Control);
pub const CTRL_RESET_FLAG: Register = Register::new("CTRL_RESET_FLAG", 0x25, Byte, Control);
pub const CTRL_UPDATE_TELEM: Register = Register::new("CTRL_UPDATE_TELEM", 0x26, Byte, Control);

// Configuration: calibration resistors
pub const CFG_RSENSE1: Register = Register::scaled("CFG_RSENSE1", 0x28, Configuration, Scale::unsigned(100, Unit::Milliohm));
pub const CFG_RIMON_OUT: Register = Register::scaled("CFG_RIMON_OUT", 0x2A, Configuration, Scale::unsigned(100, Unit::Kiloohm));
pub const CFG_RSENSE2: Register = Register::scaled("CFG_RSENSE2", 0x2C, Configuration, Scale::unsigned(100, Unit::Milliohm));
pub const CFG_RDACO: Register = Register::scaled("CFG_RDACO", 0x2E, Configuration, Scale::unsigned(100, Unit::Kiloohm));
pub const CFG_RFBOUT1: Register = Register::scaled("CFG_RFBOUT1", 0x30, Configuration, Scale::unsigned(10, Unit::Kiloohm));
pub const CFG_RFBOUT2: Register = Register::scaled("CFG_RFBOUT2", 0x32, Configuration, Scale::unsigned(100, Unit::Kiloohm));
pub const CFG_RDACI: Register = Register::scaled("CFG_RDACI", 0x34, Configuration, Scale::unsigned(100, Unit::Kiloohm));
pub const CFG_RFBIN2: Register = Register::scaled("CFG_RFBIN2", 0x36, Configuration, Scale::unsigned(100, Unit::Kiloohm));
pub const CFG_RFBIN1: Register = Register::scaled("CFG_RFBIN1", 0x38, Configuration, Scale::unsigned(10, Unit::Kiloohm));

// Configuration: charging profile
pub const CFG_INIT_CHRG_EN: Register = Register::new("CFG_INIT_CHRG_EN", 0x3A, Byte, Configuration);
pub const CFG_VS3_25C: Register = Register::new("CFG_VS3_25C", 0x3B, Byte, Configuration);
pub const CFG_UV_S0: Register = Register::new("CFG_UV_S0", 0x3C, Byte, Configuration);
pub const CFG_S0_UV: Register = Register::new("CFG_S0_UV", 0x3D, Byte, Configuration);
pub const CFG_S0_S1: Register = Register::new("CFG_S0_S1", 0x3E, Byte, Configuration);
pub const CFG_S1_S0: Register = Register::new("CFG_S1_S0", 0x3F, Byte, Configuration);
pub const CFG_TBAT_MIN: Register = Register::new("CFG_TBAT_MIN", 0x40, Byte, Configuration);
pub const CFG_TBAT_MAX: Register = Register::new("CFG_TBAT_MAX", 0x41, Byte, Configuration);
pub const CFG_TMR_S0: Register = Register::new("CFG_TMR_S0", 0x42, Byte, Configuration);
pub const CFG_TMR_S1: Register = Register::new("CFG_TMR_S1", 0x43, Byte, Configuration);
pub const CFG_TMR_S2: Register = Register::new("CFG_TMR_S2", 0x44, Byte, Configuration);
pub const CFG_TMR_S3: Register = Register::new("CFG_TMR_S3", 0x45, Byte, Configuration);
pub const CFG_RSTRT_IN_FLT: Register = Register::new("CFG_RSTRT_IN_FLT", 0x46, Byte, Configuration);
pub const CFG_RSTRT_IN_DONEA: Register = Register::new("CFG_RSTRT_IN_DONEA", 0x47, Byte, Configuration);
pub const CFG_RSTRT_IN_DONEB: Register = Register::new("CFG_RSTRT_IN_DONEB", 0x48, Byte, Configuration);
pub const CFG_RSTRT_IN_S3: Register = Register::new("CFG_RSTRT_IN_S3", 0x49, Byte, Configuration);
pub const CFG_TERMINATE: Register = Register::new("CFG_TERMINATE", 0x4A, Byte, Configuration);
pub const CFG_SCAN_RATE_LP: Register = Register::new("CFG_SCAN_RATE_LP", 0x4B, Byte, Configuration);
pub const CFG_SCAN_RATE: Register = Register::new("CFG_SCAN_RATE", 0x4C, Byte, Configuration);
pub const CFG_CHRG_MISC: Register = Register::new("CFG_CHRG_MISC", 0x4D, Byte, Configuration);
pub const CFG_TC3: Register = Register::new("CFG_TC3", 0x4E, DoubleWord, Configuration);
pub const CFG_TC2: Register = Register::new("CFG_TC2", 0x52, DoubleWord, Configuration);
pub const CFG_TC1: Register = Register::new("CFG_TC1", 0x56, DoubleWord, Configuration);
pub const CFG_USER_CODE: Register = Register::new("CFG_USER_CODE", 0x5A, Word, Configuration);

pub const MFR_DATA1: Register = Register::new("MFR_DATA1", 0x5C, Word, Manufacturer);
pub const MFR_DATA2: Register = Register::new("MFR_DATA2", 0x5E, Word, Manufacturer);
pub const MFR_DATA3: Register = Register::new("MFR_DATA3", 0x60, Word, Manufacturer);

/// Every register, in address order.
pub const ALL: &[Register] = &[
    TELE_TBAT, TELE_POUT, TELE_PIN, TELE_EFF, TELE_IOUT, TELE_IIN, TELE_VBAT, TELE_VIN, TELE_VINR,
    STAT_CHARGER, STAT_SYSTEM, STAT_SUPPLY, STAT_TS0_REMAIN, STAT_TS1_REMAIN, STAT_TS2_REMAIN,
    STAT_TS3_REMAIN, STAT_CHRG_FAULTS, STAT_VERSION, STAT_BOOT_CRC, STAT_CFG_CRC,
    CTRL_WRT_TO_BOOT, CTRL_EE_WRT_EN, CTRL_HALT_STARTUP, CTRL_CHRG_EN, CTRL_RESTART_CHIP,
    CTRL_RESET_FLAG, CTRL_UPDATE_TELEM,
    CFG_RSENSE1, CFG_RIMON_OUT, CFG_RSENSE2, CFG_RDACO, CFG_RFBOUT1, CFG_RFBOUT2, CFG_RDACI,
    CFG_RFBIN2, CFG_RFBIN1,
    CFG_INIT_CHRG_EN, CFG_VS3_25C, CFG_UV_S0, CFG_S0_UV, CFG_S0_S1, CFG_S1_S0, CFG_TBAT_MIN,
    CFG_TBAT_MAX, CFG_TMR_S0, CFG_TMR_S1, CFG_TMR_S2, CFG_TMR_S3, CFG_RSTRT_IN_FLT,
    CFG_RSTRT_IN_DONEA, CFG_RSTRT_IN_DONEB, CFG_RSTRT_IN_S3, CFG_TERMINATE, CFG_SCAN_RATE_LP,
    CFG_SCAN_RATE, CFG_CHRG_MISC, CFG_TC3, CFG_TC2, CFG_TC1, CFG_USER_CODE,
    MFR_DATA1, MFR_DATA2, MFR_DATA3,
];

/// True when the table is sorted by address and no two registers share a byte.
const fn non_overlapping(map: &[Register]) -> bool {
    let mut i = 1;
    while i < map.len() {
        if map[i].address <= map[i - 1].last_address() {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(non_overlapping(ALL), "LT8491 register map overlaps");

/// Looks a register up by its datasheet name.
pub fn by_name(name: &str) -> Option<&'static Register> {
    ALL.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}

/// Looks a register up by the command byte it starts at.
pub fn by_address(address: u8) -> Option<&'static Register> {
    ALL.iter().find(|r| r.address == address)
}

// STAT_CHARGER fields
pub const CHARGING: u8 = 1 << 0;
pub const CHRG_STAGE_MASK: u8 = 0b0000_1110; // <<1
pub const CHRG_STAGE_SHIFT: u8 = 1;
pub const CHRG_FAULT: u8 = 1 << 4;

// STAT_SUPPLY fields
pub const VIN_UVLO: u8 = 1 << 0;
pub const SOLAR_STATE_MASK: u8 = 0b0000_1110; // <<1
pub const SOLAR_STATE_SHIFT: u8 = 1;

/// Key written to CTRL_UPDATE_TELEM to request a telemetry refresh.
pub const UPDATE_TELEM_KEY: u8 = 0xAA;
