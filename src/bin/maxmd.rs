use chrono::Local;
use maxm_light_controller::*;
use rppal::{gpio::Gpio, hal::Delay, i2c::I2c};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// BCM pin numbers of the two indicator LEDs
const LED_A_PIN: u8 = 23;
const LED_B_PIN: u8 = 24;

/// How often the schedule is re-evaluated
const POLL_SECONDS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("maxm_light_controller=info,maxmd=info")),
        )
        .compact()
        .init();

    // Attach the light module
    let bus = I2c::new().map_err(|e| Error::I2c(e.to_string()))?;
    let mut device = MaxmDevice::new(bus, Delay::new(), DeviceConfig::default());

    // Attach the indicator LEDs
    let gpio = Gpio::new().map_err(|e| Error::Gpio(e.to_string()))?;
    let led_a = gpio
        .get(LED_A_PIN)
        .map_err(|e| Error::Gpio(e.to_string()))?
        .into_output();
    let led_b = gpio
        .get(LED_B_PIN)
        .map_err(|e| Error::Gpio(e.to_string()))?
        .into_output();
    let mut leds = IndicatorLeds::new(led_a, led_b, Delay::new());

    let mut schedule = WakeSchedule::new(BENCH_PERIODS);
    info!("Controlling {} wake periods", BENCH_PERIODS.len());

    // Start from a known-dark state; the first tick switches the lights
    // on if we are already inside a period
    device.power_off()?;
    let mut was_awake = false;

    let mut ticker = interval(Duration::from_secs(POLL_SECONDS));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c, shutting down");
                break;
            }
        }

        let now = Local::now();
        let state = schedule.check_datetime(&now);
        debug!(%state, "Schedule checked");

        match (state.is_awake(), was_awake) {
            (true, false) => {
                info!("Wake period started, running the light script");
                device.power_on()?;
                leds.flash(LED_BOTH, 2)?;
                was_awake = true;
            }
            (false, true) => {
                info!("Wake period ended, stopping the lights");
                device.power_off()?;
                leds.flash(LED_A, 1)?;
                was_awake = false;
                if schedule.is_exhausted() {
                    warn!("All wake periods have passed; asleep until restart");
                }
            }
            _ => {}
        }
    }

    // Leave the bench dark on the way out
    device.power_off()?;
    leds.set(LED_BOTH, false)?;
    Ok(())
}
