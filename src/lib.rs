/*!
 # BlinkM MaxM Light Module Controller Library

 A Rust library for controlling BlinkM "MaxM" I2C light modules and for
 deciding, from a daily wake/sleep schedule, whether the lights should
 currently be running.

 ## Features

 * Power on/off control (script playback / blackout)
 * RGB color control (immediate and fading)
 * Fade speed and time-adjust control
 * Light script upload and playback
 * Wake-period scheduling with a resumable forward-only scan
 * Mask-addressed indicator LEDs

 ## Example

 ```no_run
 use maxm_light_controller::*;
 use rppal::{hal::Delay, i2c::I2c};

 fn main() -> Result<()> {
     // Initialize tracing for logs
     tracing_subscriber::fmt::init();

     // Open the I2C bus and attach the module at its default address
     let bus = I2c::new().map_err(|e| Error::I2c(e.to_string()))?;
     let mut device = MaxmDevice::new(bus, Delay::new(), DeviceConfig::default());

     // Basic operations
     device.power_on()?;
     device.set_color(255, 0, 0)?; // Set to red
     device.set_fade_speed(20)?;   // Slow fades

     Ok(())
 }
 ```
*/

use thiserror::Error;

/// Custom error types for the MaxM light controller library
#[derive(Error, Debug)]
pub enum Error {
    /// I2C bus communication error
    #[error("I2C communication error: {0}")]
    I2c(String),

    /// GPIO pin error
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Value out of range
    #[error("Value {0} out of range ({1}..{2})")]
    ValueOutOfRange(u32, u32, u32),

    /// Light script does not fit in the module's script slot
    #[error("Light script too long: {0} lines (max {1})")]
    ScriptTooLong(usize, usize),

    /// General error
    #[error("Error: {0}")]
    General(String),

    /// Other errors
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

// Import needed for Result type extension
pub type Result<T> = std::result::Result<T, Error>;

// Re-export modules
pub mod device;
pub mod indicator;
pub mod schedule;
pub mod script;

// Re-export key types
pub use device::{DeviceConfig, MaxmDevice, MAXM_ADDRESS};
pub use indicator::{IndicatorLeds, LED_A, LED_B, LED_BOTH};
pub use schedule::{minutes_since_midnight, WakePeriod, WakeSchedule, WakeState, BENCH_PERIODS};
pub use script::{ScriptLine, AIM_LIGHTS, DAY_FADE};
