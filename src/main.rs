use chrono::{Datelike, Local, Timelike};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use maxm_light_controller::*;
use rppal::{hal::Delay, i2c::I2c};
use tokio::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum ScriptKind {
    /// Bright white for aiming the fixtures, then off
    Aim,
    /// Dark to bright to a slow evening fade
    DayFade,
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptKind::Aim => write!(f, "aim"),
            ScriptKind::DayFade => write!(f, "day_fade"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Demonstration of light module features
    Demo {
        /// Duration of each demo step in seconds
        #[arg(short, long, default_value_t = 5)]
        duration: u64,
    },
    /// Turn the lights on (play the stored script)
    On,
    /// Turn the lights off
    Off,
    /// Set a custom RGB color
    Color {
        /// Red value (0-255)
        #[arg(short, long, default_value_t = 255)]
        red: u8,
        /// Green value (0-255)
        #[arg(short, long, default_value_t = 255)]
        green: u8,
        /// Blue value (0-255)
        #[arg(short, long, default_value_t = 255)]
        blue: u8,
    },
    /// Fade to an RGB color at the current fade speed
    Fade {
        /// Red value (0-255)
        #[arg(short, long, default_value_t = 255)]
        red: u8,
        /// Green value (0-255)
        #[arg(short, long, default_value_t = 255)]
        green: u8,
        /// Blue value (0-255)
        #[arg(short, long, default_value_t = 255)]
        blue: u8,
    },
    /// Set the fade speed
    FadeSpeed {
        /// Fade speed (1-255)
        #[arg(short, long, default_value_t = 20)]
        speed: u8,
    },
    /// Upload a canned light script and play it
    Script {
        /// Which script to upload (available options shown in description)
        #[arg(short, long, value_enum, default_value_t = ScriptKind::DayFade)]
        kind: ScriptKind,
        /// Number of repeats, 0 to loop forever
        #[arg(short, long, default_value_t = 1)]
        repeats: u8,
    },
    /// Play a script already stored on the module
    Play {
        /// Script id (0 is the writable slot, 1-18 are built in)
        #[arg(short, long, default_value_t = 0)]
        script: u8,
        /// Number of repeats, 0 to loop forever
        #[arg(short, long, default_value_t = 1)]
        repeats: u8,
    },
    /// Stop script playback
    Stop,
    /// Check the wake schedule for a given day and time
    Check {
        /// Day of the month (defaults to today)
        #[arg(short, long)]
        day: Option<u32>,
        /// Hour (0-23, defaults to now)
        #[arg(long)]
        hour: Option<u32>,
        /// Minute (0-59, defaults to now)
        #[arg(short, long)]
        minute: Option<u32>,
    },
}

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    // Initialize tracing with pretty colors
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("maxm_light_controller=info")),
        )
        .compact()
        .init();

    // Initialize color-eyre for pretty error reporting
    color_eyre::install()?;

    let cli = Cli::parse();
    debug!("Parsed command line arguments");

    let command = cli.command.unwrap_or(Commands::Demo { duration: 5 });

    // The schedule check needs no hardware, so handle it before opening
    // the bus
    if let Commands::Check { day, hour, minute } = &command {
        let now = Local::now();
        let day = day.unwrap_or_else(|| now.day());
        let hour = hour.unwrap_or_else(|| now.hour());
        let minute = minute.unwrap_or_else(|| now.minute());

        let mut schedule = WakeSchedule::new(BENCH_PERIODS);
        let state = schedule.check(day, minutes_since_midnight(hour, minute));
        println!("{state}");
        return Ok(());
    }

    let bus = I2c::new()?;
    let mut device = MaxmDevice::new(bus, Delay::new(), DeviceConfig::default());

    match command {
        Commands::Demo { duration } => {
            run_demo(&mut device, duration).await?;
        }
        Commands::On => {
            device.power_on()?;
        }
        Commands::Off => {
            device.power_off()?;
        }
        Commands::Color { red, green, blue } => {
            device.set_color(red, green, blue)?;
        }
        Commands::Fade { red, green, blue } => {
            device.fade_to_color(red, green, blue)?;
        }
        Commands::FadeSpeed { speed } => {
            device.set_fade_speed(speed)?;
        }
        Commands::Script { kind, repeats } => {
            let lines = match kind {
                ScriptKind::Aim => AIM_LIGHTS,
                ScriptKind::DayFade => DAY_FADE,
            };
            debug!("Uploading {} script ({} lines)", kind, lines.len());
            device.write_script(lines, repeats)?;
            device.play_script(0, repeats, 0)?;
        }
        Commands::Play { script, repeats } => {
            device.play_script(script, repeats, 0)?;
        }
        Commands::Stop => {
            device.stop_script()?;
        }
        Commands::Check { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Sleep for specified number of seconds
async fn sleep(seconds: u64) {
    tokio::time::sleep(Duration::from_secs(seconds)).await;
}

/// Run a demonstration of the light module features
#[instrument(skip(device))]
async fn run_demo<I2C, D>(
    device: &mut MaxmDevice<I2C, D>,
    duration: u64,
) -> maxm_light_controller::Result<()>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    info!("Running light module demo with {}s intervals", duration);

    // Start dark
    info!("Blacking out the module");
    device.power_off()?;
    sleep(duration).await;

    // Set static colors
    info!("Setting color to red");
    device.set_color(255, 0, 0)?;
    sleep(duration).await;

    info!("Setting color to green");
    device.set_color(0, 255, 0)?;
    sleep(duration).await;

    info!("Setting color to blue");
    device.set_color(0, 0, 255)?;
    sleep(duration).await;

    // Fades
    info!("Slow fade to white");
    device.set_fade_speed(5)?;
    device.fade_to_color(255, 255, 255)?;
    sleep(duration).await;

    info!("Fast fade to black");
    device.set_fade_speed(200)?;
    device.fade_to_color(0, 0, 0)?;
    sleep(duration).await;

    // Script playback
    info!("Uploading and playing the day-fade script");
    device.write_script(DAY_FADE, 1)?;
    device.play_script(0, 1, 0)?;
    sleep(duration).await;

    info!("Stopping script playback");
    device.stop_script()?;

    // End demo by turning off the lights
    info!("Turning lights off to end demo");
    device.power_off()?;

    info!("Demo completed!");
    Ok(())
}
