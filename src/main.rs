// in-crate imports
use tsl2591_lux::config::{Config, DEFAULT_CONFIG};
use tsl2591_lux::tsl2591::{DerivedReading, Gain, IntegrationTime, TSL2591};

// my libraries
use xdg_dirs::{dirs, xdg_location_of, xdg_user_dir};

// STD
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use std::{fs, thread};

// 3rd party libraries
use anyhow::Context;
use clap::{Parser, Subcommand};
use embedded_hal::i2c::I2c;
use ftdi_embedded_hal as hal;

const CONFIG_PATH: &str = "tsl2591/config.ron";

#[derive(Debug, Subcommand, PartialEq)]
enum Command {
    #[command(
        about = "(default) Poll the sensor and print lux, infrared, visible and full spectrum readings."
    )]
    Run {
        #[arg(long, help = "Override the configured gain")]
        gain: Option<Gain>,

        #[arg(long, help = "Override the configured integration time")]
        integration_time: Option<IntegrationTime>,

        #[arg(
            short = 'n',
            long,
            help = "Stop and power the sensor down after this many samples"
        )]
        count: Option<u64>,
    },

    #[command(about = "Check configuration file syntax and print out the settings that will be applied.")]
    Check,

    #[command(about = "Generate a default config file")]
    GenConfig,
}

#[derive(Debug, Parser, PartialEq)]
#[command(
    about = "Read illuminance from a TSL2591 light sensor attached through an FTDI USB-I2C bridge",
    version
)]
struct Args {
    #[arg(
        global = true,
        short,
        long = "config",
        help = format!("Path to configuration file. Defaults to `{CONFIG_PATH}` under the user's config directory."),
    )]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    /// Get the config path, and verify the file exists. This is the either the path passed as an arg, or from the XDG directory if not specified.
    ///
    /// This returns error if the path does not exist.
    fn get_config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config_path {
            Some(path) => path
                .canonicalize()
                .with_context(|| format!("Could not open config file `{0}`", path.display())),
            None => xdg_location_of(&dirs::CONFIG, CONFIG_PATH)
                .with_context(|| "Could not open config file"),
        }
    }
}

/// Load the configuration based on arguments.
/// Uses the file supplied to the CLI, or in the default location if not specified, or the default config if there is no file.
fn get_config(args: &Args) -> anyhow::Result<Config> {
    match args.get_config_path() {
        Ok(path) => {
            log::info!("Reading config from {path}", path = path.display());
            Config::read_from_file(&path)
                .with_context(|| format!("Failed to parse config file {0}", path.display()))
        }
        Err(err) => {
            log::warn!(
                "Config file not found in any standard locations, using default configuration."
            );
            log::warn!("  Config search error: {err}");
            Config::from_str(DEFAULT_CONFIG)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    log::debug!("args = {args:?}");

    match &args.command {
        None => run(&args, None, None, None),
        Some(Command::Run {
            gain,
            integration_time,
            count,
        }) => run(&args, *gain, *integration_time, *count),

        // Test config file: make sure it exists, can be read, and can be parsed
        Some(Command::Check) => check_config(&args),

        // Generate config file: if the file does not already exist, write
        Some(Command::GenConfig) => gen_config_file(&args),
    }
}

/// Verify the config file: Make sure it can be found at the expected location (passed through CLI or using XDG config location), and parses properly.
fn check_config(args: &Args) -> anyhow::Result<()> {
    let path = args
        .get_config_path()
        .with_context(|| "Failed to find config file")?;

    println!("Attempting to load config from `{0}`", path.display());
    let config = Config::read_from_file(path).with_context(|| "Failed to parse configuration")?;

    println!("Successfully read config: {config:#?}");
    println!(
        "Sensor: gain {:?} ({}x), integration time {}ms; polling every {:?}",
        config.sensor.gain,
        config.sensor.gain.multiplier(),
        config.sensor.integration_time.millis(),
        config.poll_interval(),
    );

    Ok(())
}

/// Generate a default configuration file, at the expected location based on args or environment variables.
fn gen_config_file(args: &Args) -> anyhow::Result<()> {
    // CLI arg path, or default from environment
    let path = args
        .config_path
        .clone()
        .map_or_else(|| xdg_user_dir(&dirs::CONFIG, CONFIG_PATH), Ok)
        .with_context(|| "Could not determine location for config file")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create parent directory of the new config file {0}",
                path.display()
            )
        })?;
    }

    // Never overwrite an existing file
    let mut file = File::create_new(&path)
        .with_context(|| format!("Failed to create new config file {0}", path.display()))?;

    write!(file, "{}", DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write the new config file {0}", path.display()))?;

    println!("Wrote default config to {0}", path.display());
    Ok(())
}

/// Open the bridge, bring up the sensor, then print readings until `count` samples were taken
/// (or forever). The sensor is powered down on the way out.
fn run(
    args: &Args,
    gain: Option<Gain>,
    integration_time: Option<IntegrationTime>,
    count: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = get_config(args)?;
    if let Some(gain) = gain {
        config.sensor.gain = gain;
    }
    if let Some(time) = integration_time {
        config.sensor.integration_time = time;
    }
    log::info!("Loaded configuration: {config:?}");

    // Connect to the brightness sensor
    let device = ftdi::find_by_vid_pid(config.device.vendor_id, config.device.product_id)
        .interface(config.device.interface.into())
        .open()?;
    let i2c = hal::FtHal::init_default(device)?.i2c()?;
    let mut sensor = TSL2591::new(i2c, config.sensor)
        .map_err(|e| anyhow::anyhow!("Failed to initialize TSL2591: {e}"))?;

    let result = poll(&mut sensor, count, config.poll_interval());

    match sensor.disable() {
        Ok(()) => log::info!("Sensor disabled"),
        Err(e) => log::warn!("Failed to disable sensor: {e}"),
    }

    result
}

fn poll<I: I2c>(
    sensor: &mut TSL2591<I>,
    count: Option<u64>,
    interval: Duration,
) -> anyhow::Result<()> {
    let mut samples = 0u64;
    loop {
        let reading = sensor
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to read sensor: {e}"))?;

        if reading.lux.is_none() {
            log::warn!(
                "Sensor saturated (ch0={:#06x}, ch1={:#06x}); reduce gain or integration time",
                reading.raw.channel0,
                reading.raw.channel1
            );
        }
        println!("{}", describe(&reading));

        samples += 1;
        if count.is_some_and(|n| samples >= n) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn describe(reading: &DerivedReading) -> String {
    let lux = match reading.lux {
        Some(lux) => format!("{lux:.3} lux"),
        None => "overflow".to_string(),
    };
    format!(
        "Total light: {lux}\nInfrared light: {}\nVisible light: {}\nFull spectrum (IR + visible) light: {}",
        reading.infrared, reading.visible, reading.full_spectrum
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsl2591_lux::tsl2591::{RawReading, SensorConfig};

    #[test]
    fn test_arg_parsing() {
        assert_eq!(
            Args {
                config_path: None,
                command: None,
            },
            Args::try_parse_from(&["executable"]).unwrap()
        );

        assert_eq!(
            Args {
                config_path: Some(PathBuf::from("/some/file")),
                command: Some(Command::Check),
            },
            Args::try_parse_from(&["executable", "check", "--config", "/some/file"]).unwrap()
        );

        assert_eq!(
            Args {
                config_path: Some(PathBuf::from("/some/file")),
                command: Some(Command::Run {
                    gain: Some(Gain::High),
                    integration_time: Some(IntegrationTime::Ms300),
                    count: Some(5),
                }),
            },
            Args::try_parse_from(&[
                "executable",
                "--config",
                "/some/file",
                "run",
                "--gain",
                "high",
                "--integration-time",
                "300ms",
                "-n",
                "5",
            ])
            .unwrap()
        );

        assert_eq!(
            Args {
                config_path: None,
                command: Some(Command::GenConfig),
            },
            Args::try_parse_from(&["executable", "gen-config"]).unwrap()
        );
    }

    #[test]
    fn test_invalid_gain_rejected() {
        assert!(Args::try_parse_from(&["executable", "run", "--gain", "huge"]).is_err());
        assert!(
            Args::try_parse_from(&["executable", "run", "--integration-time", "700ms"]).is_err()
        );
    }

    #[test]
    fn test_describe_reading() {
        let config = SensorConfig {
            gain: Gain::Low,
            integration_time: IntegrationTime::Ms100,
        };
        let reading = DerivedReading::new(
            RawReading {
                channel0: 51,
                channel1: 14,
            },
            &config,
        );
        assert_eq!(
            "Total light: 114.403 lux\nInfrared light: 14\nVisible light: 917541\nFull spectrum (IR + visible) light: 917555",
            describe(&reading)
        );

        let saturated = DerivedReading::new(
            RawReading {
                channel0: 0x9000,
                channel1: 14,
            },
            &config,
        );
        assert!(describe(&saturated).starts_with("Total light: overflow\n"));
    }
}
