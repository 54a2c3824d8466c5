/// Register map and bit-field encodings of the TSL2591.
///
/// Datasheet: https://cdn-shop.adafruit.com/datasheets/TSL25911_Datasheet_EN_v1.pdf
use embedded_hal::i2c::SevenBitAddress;
use serde::Deserialize;

pub const I2C_ADDR: SevenBitAddress = 0x29;

/// 0b1010_0000: CMD bit plus "normal operation" transaction type. OR'd onto every register address.
pub const COMMAND_BIT: u8 = 0xA0;

pub const DEVICE_ID: u8 = 0x50;

/// Registers the driver touches. Interrupt thresholds and the persistence filter are not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Enable = 0x00,
    Control = 0x01,
    DeviceId = 0x12,
    Chan0Low = 0x14,
    Chan1Low = 0x16,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// First byte of every transaction addressing this register.
    pub const fn command(self) -> u8 {
        self.addr() | COMMAND_BIT
    }
}

pub mod enable {
    pub const POWER_OFF: u8 = 0x00;
    pub const POWER_ON: u8 = 0x01;
    /// ALS enable
    pub const AEN: u8 = 0x02;
    /// ALS interrupt enable (subject to the persist filter)
    pub const AIEN: u8 = 0x10;
    /// no-persist interrupt enable
    pub const NPIEN: u8 = 0x80;

    pub const ENABLED: u8 = POWER_ON | AEN | AIEN | NPIEN;
}

/// Bits of CONTROL that survive a gain update (AGAIN lives in bits 4-5).
pub const GAIN_PRESERVE_MASK: u8 = 0b1100_1111;
/// Bits of CONTROL that survive a timing update (ATIME lives in bits 0-2).
pub const TIMING_PRESERVE_MASK: u8 = 0b1111_1000;

/// Analog gain of the ADC.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum Gain {
    /// 1x
    Low,
    /// 25x
    #[default]
    Medium,
    /// 428x
    High,
    /// 9876x
    Max,
}

impl Gain {
    pub const ALL: [Gain; 4] = [Gain::Low, Gain::Medium, Gain::High, Gain::Max];

    /// Field value as it sits in the CONTROL register.
    pub const fn bits(self) -> u8 {
        match self {
            Gain::Low => 0x00,
            Gain::Medium => 0x10,
            Gain::High => 0x20,
            Gain::Max => 0x30,
        }
    }

    pub const fn multiplier(self) -> u16 {
        match self {
            Gain::Low => 1,
            Gain::Medium => 25,
            Gain::High => 428,
            Gain::Max => 9876,
        }
    }

    pub const fn from_control(control: u8) -> Self {
        match control & !GAIN_PRESERVE_MASK {
            0x00 => Gain::Low,
            0x10 => Gain::Medium,
            0x20 => Gain::High,
            _ => Gain::Max,
        }
    }
}

/// ADC integration time, 100ms to 600ms.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum IntegrationTime {
    #[default]
    #[value(name = "100ms")]
    Ms100,
    #[value(name = "200ms")]
    Ms200,
    #[value(name = "300ms")]
    Ms300,
    #[value(name = "400ms")]
    Ms400,
    #[value(name = "500ms")]
    Ms500,
    #[value(name = "600ms")]
    Ms600,
}

impl IntegrationTime {
    pub const ALL: [IntegrationTime; 6] = [
        IntegrationTime::Ms100,
        IntegrationTime::Ms200,
        IntegrationTime::Ms300,
        IntegrationTime::Ms400,
        IntegrationTime::Ms500,
        IntegrationTime::Ms600,
    ];

    pub const fn bits(self) -> u8 {
        match self {
            IntegrationTime::Ms100 => 0x00,
            IntegrationTime::Ms200 => 0x01,
            IntegrationTime::Ms300 => 0x02,
            IntegrationTime::Ms400 => 0x03,
            IntegrationTime::Ms500 => 0x04,
            IntegrationTime::Ms600 => 0x05,
        }
    }

    pub const fn millis(self) -> u16 {
        100 * self.bits() as u16 + 100
    }

    /// Counts at or above this are treated as saturated.
    pub const fn max_counts(self) -> u16 {
        match self {
            IntegrationTime::Ms100 => 0x8FFF,
            _ => 0xFFFF,
        }
    }

    /// Decode the ATIME field. Codes 6 and 7 are reserved by the device.
    pub const fn from_control(control: u8) -> Option<Self> {
        match control & !TIMING_PRESERVE_MASK {
            0x00 => Some(IntegrationTime::Ms100),
            0x01 => Some(IntegrationTime::Ms200),
            0x02 => Some(IntegrationTime::Ms300),
            0x03 => Some(IntegrationTime::Ms400),
            0x04 => Some(IntegrationTime::Ms500),
            0x05 => Some(IntegrationTime::Ms600),
            _ => None,
        }
    }
}

/// Replace the gain field of a CONTROL byte, leaving every other bit as is.
pub const fn merge_gain(control: u8, gain: Gain) -> u8 {
    (control & GAIN_PRESERVE_MASK) | gain.bits()
}

/// Replace the integration time field of a CONTROL byte, leaving every other bit as is.
pub const fn merge_timing(control: u8, time: IntegrationTime) -> u8 {
    (control & TIMING_PRESERVE_MASK) | time.bits()
}
