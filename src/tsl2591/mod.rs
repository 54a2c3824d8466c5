/// Represents a TSL2591 sensor and provides convenience methods to control & read from it over I2C.
///
/// Datasheet for the sensor: https://cdn-shop.adafruit.com/datasheets/TSL25911_Datasheet_EN_v1.pdf
///
/// The driver does no locking: gain and timing updates are a read followed by a write of the shared
/// CONTROL register, so all access to one sensor has to go through a single `&mut TSL2591`.
use embedded_hal::i2c::I2c;
use serde::Deserialize;

mod bus;
mod error;
pub mod register;

pub use error::{Error, Operation, Overflow};
pub use register::{Gain, IntegrationTime, merge_gain, merge_timing};

use register::{DEVICE_ID, Register, enable};

/// Lux coefficient ("LuxDF") from the Adafruit library.
const LUX_DF: f64 = 408.0;
const LUX_COEF_B: f64 = 1.64;
const LUX_COEF_C: f64 = 0.59;
const LUX_COEF_D: f64 = 0.86;

/// Gain and integration time, as last written to the CONTROL register.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
}

/// Raw channel counts from a single measurement.
///  - channel0 = "full spectrum" (visible + infrared)
///  - channel1 = infrared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReading {
    pub channel0: u16,
    pub channel1: u16,
}

impl RawReading {
    /// Both channels packed into one word: channel 1 in the high half, channel 0 in the low half.
    pub fn full_spectrum(&self) -> u32 {
        (self.channel1 as u32) << 16 | self.channel0 as u32
    }

    pub fn infrared(&self) -> u16 {
        self.channel1
    }

    pub fn visible(&self) -> u32 {
        self.full_spectrum() - self.channel1 as u32
    }

    /// Calculate lux from the values of the two sensor channels.
    ///
    /// Based on the adafruit circuitpython library:
    ///     https://github.com/adafruit/Adafruit_CircuitPython_TSL2591/blob/main/adafruit_tsl2591.py
    /// which is in turn based on their arduino library:
    ///     https://github.com/adafruit/Adafruit_TSL2591_Library/blob/master/Adafruit_TSL2591.cpp
    ///
    /// Both lux estimates are computed and the larger one wins.
    pub fn lux(&self, config: &SensorConfig) -> Result<f64, Overflow> {
        let max_counts = config.integration_time.max_counts();
        if self.channel0 >= max_counts || self.channel1 >= max_counts {
            return Err(Overflow {
                channel0: self.channel0,
                channel1: self.channel1,
            });
        }

        let ch0 = self.channel0 as f64;
        let ch1 = self.channel1 as f64;
        let atime = config.integration_time.millis() as f64;
        let again = config.gain.multiplier() as f64;
        let cpl = (atime * again) / LUX_DF;

        let lux1 = (ch0 - LUX_COEF_B * ch1) / cpl;
        let lux2 = (LUX_COEF_C * ch0 - LUX_COEF_D * ch1) / cpl;

        Ok(f64::max(lux1, lux2))
    }
}

/// Every value derivable from one raw reading. `lux` is `None` when the channels overflowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedReading {
    pub raw: RawReading,
    pub full_spectrum: u32,
    pub visible: u32,
    pub infrared: u16,
    pub lux: Option<f64>,
}

impl DerivedReading {
    pub fn new(raw: RawReading, config: &SensorConfig) -> Self {
        DerivedReading {
            raw,
            full_spectrum: raw.full_spectrum(),
            visible: raw.visible(),
            infrared: raw.infrared(),
            lux: raw.lux(config).ok(),
        }
    }
}

pub struct TSL2591<I: I2c> {
    i2c: I,

    // always matches the device after a successful write
    config: SensorConfig,
    enabled: bool,
}

impl<I: I2c> TSL2591<I> {
    /// Check the chip is what we expect, write gain & integration time, then turn it on.
    pub fn new(mut i2c: I, config: SensorConfig) -> Result<Self, Error<I::Error>> {
        let id = bus::read_u8(&mut i2c, Register::DeviceId)?;
        if id != DEVICE_ID {
            return Err(Error::UnexpectedDeviceId {
                expected: DEVICE_ID,
                actual: id,
            });
        }

        let mut sensor = TSL2591 {
            i2c,
            config,
            enabled: false,
        };
        sensor.configure(config)?;
        sensor.enable()?;

        log::info!(
            "TSL2591 ready: gain={:?}, integration time={}ms",
            sensor.config.gain,
            sensor.config.integration_time.millis()
        );
        Ok(sensor)
    }

    /// Medium gain, 100ms integration time.
    pub fn with_defaults(i2c: I) -> Result<Self, Error<I::Error>> {
        Self::new(i2c, SensorConfig::default())
    }

    /// Give the bus back. The sensor is left in whatever power state it was in.
    pub fn release(self) -> I {
        self.i2c
    }

    pub fn config(&self) -> SensorConfig {
        self.config
    }

    pub fn gain(&self) -> Gain {
        self.config.gain
    }

    pub fn integration_time(&self) -> IntegrationTime {
        self.config.integration_time
    }

    /// Whether the last successful enable/disable call turned the sensor on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Power on with the ALS and both interrupt sources enabled.
    pub fn enable(&mut self) -> Result<(), Error<I::Error>> {
        bus::write_u8(&mut self.i2c, Register::Enable, enable::ENABLED)?;
        self.enabled = true;
        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), Error<I::Error>> {
        bus::write_u8(&mut self.i2c, Register::Enable, enable::POWER_OFF)?;
        self.enabled = false;
        Ok(())
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<I::Error>> {
        let control = bus::read_u8(&mut self.i2c, Register::Control)?;
        bus::write_u8(&mut self.i2c, Register::Control, merge_gain(control, gain))?;
        self.config.gain = gain;
        Ok(())
    }

    pub fn set_timing(&mut self, time: IntegrationTime) -> Result<(), Error<I::Error>> {
        let control = bus::read_u8(&mut self.i2c, Register::Control)?;
        bus::write_u8(&mut self.i2c, Register::Control, merge_timing(control, time))?;
        self.config.integration_time = time;
        Ok(())
    }

    /// Set gain and integration time with a single CONTROL write. Does not touch the enable state.
    pub fn configure(&mut self, config: SensorConfig) -> Result<(), Error<I::Error>> {
        let control = bus::read_u8(&mut self.i2c, Register::Control)?;
        let control = merge_timing(merge_gain(control, config.gain), config.integration_time);
        bus::write_u8(&mut self.i2c, Register::Control, control)?;
        self.config = config;
        Ok(())
    }

    /// Read both channels. Channel 0 is read first; a failure on either aborts the read.
    pub fn raw_luminosity(&mut self) -> Result<RawReading, Error<I::Error>> {
        let channel0 = bus::read_u16(&mut self.i2c, Register::Chan0Low)?;
        let channel1 = bus::read_u16(&mut self.i2c, Register::Chan1Low)?;
        Ok(RawReading { channel0, channel1 })
    }

    pub fn full_spectrum(&mut self) -> Result<u32, Error<I::Error>> {
        Ok(self.raw_luminosity()?.full_spectrum())
    }

    pub fn infrared(&mut self) -> Result<u16, Error<I::Error>> {
        Ok(self.raw_luminosity()?.infrared())
    }

    pub fn visible(&mut self) -> Result<u32, Error<I::Error>> {
        Ok(self.raw_luminosity()?.visible())
    }

    /// Read current brightness value from the sensor
    pub fn lux(&mut self) -> Result<f64, Error<I::Error>> {
        let raw = self.raw_luminosity()?;
        Ok(raw.lux(&self.config)?)
    }

    /// One raw read, every derived value.
    pub fn read(&mut self) -> Result<DerivedReading, Error<I::Error>> {
        let raw = self.raw_luminosity()?;
        Ok(DerivedReading::new(raw, &self.config))
    }
}
