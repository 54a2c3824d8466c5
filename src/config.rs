use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::tsl2591::SensorConfig;

pub const DEFAULT_CONFIG: &str = r#"
(
sensor: (
    gain: Medium,
    integration_time: Ms100,
),
device: (
    vendor_id: 0x0403,
    product_id: 0x6014,
    interface: A,
),
poll_interval_ms: 1000,
)
"#;

/// Interface of a multi-channel FTDI chip the I2C bus hangs off.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum FtdiInterface {
    #[default]
    A,
    B,
    C,
    D,
}

impl From<FtdiInterface> for ftdi::Interface {
    fn from(interface: FtdiInterface) -> Self {
        match interface {
            FtdiInterface::A => ftdi::Interface::A,
            FtdiInterface::B => ftdi::Interface::B,
            FtdiInterface::C => ftdi::Interface::C,
            FtdiInterface::D => ftdi::Interface::D,
        }
    }
}

/// USB-to-I2C bridge the sensor is attached to. Defaults to an FT232H.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface: FtdiInterface,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            vendor_id: 0x0403,
            product_id: 0x6014,
            interface: FtdiInterface::A,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorConfig,
    pub device: DeviceConfig,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sensor: SensorConfig::default(),
            device: DeviceConfig::default(),
            poll_interval_ms: 1000,
        }
    }
}

impl Config {
    pub fn from_str(conf: &str) -> Result<Self, anyhow::Error> {
        Ok(ron::from_str::<Config>(conf)?)
    }

    pub fn read_from_file<P: AsRef<Path>>(file: P) -> Result<Self, anyhow::Error> {
        Ok(ron::de::from_reader(BufReader::new(File::open(file)?))?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
