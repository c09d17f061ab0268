use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use tracing::{debug, info, instrument, trace, warn};

// Import our custom error type
use crate::script::ScriptLine;
use crate::{Error, Result};

/// Factory-default I2C address of a BlinkM/MaxM module
pub const MAXM_ADDRESS: u8 = 0x09;

/// Highest script id the module knows; 0 is the writable script, the
/// rest are built in
const SCRIPT_ID_MAX: u32 = 18;

/// Capacity of the writable script slot, in lines
pub const SCRIPT_MAX_LINES: usize = 49;

/// Configuration for a connected module
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// I2C address of the module
    pub address: u8,
    /// Pause after each command, in milliseconds
    pub command_delay_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: MAXM_ADDRESS,
            command_delay_ms: 10,
        }
    }
}

/// Main struct for controlling a MaxM light module over I2C
///
/// Generic over the bus and delay so it runs against any
/// `embedded-hal` implementation, such as `rppal` on a Raspberry Pi.
pub struct MaxmDevice<I2C, D> {
    /// The I2C bus the module is attached to
    bus: I2C,
    /// Delay provider used to pace commands
    delay: D,
    /// Device-specific configuration
    config: DeviceConfig,
    /// Current power state
    pub is_on: bool,
    /// Current RGB color (red, green, blue)
    pub color: (u8, u8, u8),
    /// Current fade speed, if one has been set
    pub fade_speed: Option<u8>,
    /// Script id currently playing, if any
    pub playing_script: Option<u8>,
}

impl<I2C: I2c, D: DelayNs> MaxmDevice<I2C, D> {
    /// Creates a driver for a module on the given bus
    pub fn new(bus: I2C, delay: D, config: DeviceConfig) -> Self {
        debug!(address = config.address, "attaching MaxM module");
        Self {
            bus,
            delay,
            config,
            is_on: false,
            color: (0, 0, 0),
            fade_speed: None,
            playing_script: None,
        }
    }

    /// Turns the lights on by playing the module's stored script once
    #[instrument(skip(self))]
    pub fn power_on(&mut self) -> Result<()> {
        debug!("Turning light module on");
        self.play_script(0, 1, 0)?;
        info!("Light module powered on");
        Ok(())
    }

    /// Turns the lights off: stops any playing script, then blacks out
    #[instrument(skip(self))]
    pub fn power_off(&mut self) -> Result<()> {
        debug!("Turning light module off");
        self.stop_script()?;
        self.set_color(0, 0, 0)?;
        self.is_on = false;
        info!("Light module powered off");
        Ok(())
    }

    /// Sets the RGB color immediately
    ///
    /// # Arguments
    ///
    /// * `red_value` - Red component (0-255)
    /// * `green_value` - Green component (0-255)
    /// * `blue_value` - Blue component (0-255)
    #[instrument(skip(self))]
    pub fn set_color(&mut self, red_value: u8, green_value: u8, blue_value: u8) -> Result<()> {
        debug!(
            "Setting color to RGB({}, {}, {})",
            red_value, green_value, blue_value
        );
        self.send_command(&[b'n', red_value, green_value, blue_value])?;
        self.color = (red_value, green_value, blue_value);
        Ok(())
    }

    /// Fades to the given RGB color at the current fade speed
    #[instrument(skip(self))]
    pub fn fade_to_color(&mut self, red_value: u8, green_value: u8, blue_value: u8) -> Result<()> {
        debug!(
            "Fading to RGB({}, {}, {})",
            red_value, green_value, blue_value
        );
        self.send_command(&[b'c', red_value, green_value, blue_value])?;
        self.color = (red_value, green_value, blue_value);
        Ok(())
    }

    /// Sets the fade speed used by fades and scripts
    ///
    /// # Arguments
    ///
    /// * `value` - Fade speed (1-255; 0 is rejected by the module)
    #[instrument(skip(self))]
    pub fn set_fade_speed(&mut self, value: u8) -> Result<()> {
        let limited_value = value.max(1);
        if value == 0 {
            warn!("Fade speed 0 is not accepted by the module, using 1");
        }

        debug!("Setting fade speed to {}", limited_value);
        self.send_command(&[b'f', limited_value])?;
        self.fade_speed = Some(limited_value);
        Ok(())
    }

    /// Adjusts the script playback rate; negative values slow scripts
    /// down, positive values speed them up
    #[instrument(skip(self))]
    pub fn set_time_adjust(&mut self, adjust: i8) -> Result<()> {
        debug!("Setting time adjust to {}", adjust);
        self.send_command(&[b't', adjust as u8])?;
        Ok(())
    }

    /// Plays a light script stored on the module
    ///
    /// # Arguments
    ///
    /// * `script_id` - Script to play (0 is the writable slot, 1-18 are built in)
    /// * `repeats` - Number of repeats, 0 to loop forever
    /// * `start_line` - Line to start from
    #[instrument(skip(self))]
    pub fn play_script(&mut self, script_id: u8, repeats: u8, start_line: u8) -> Result<()> {
        if u32::from(script_id) > SCRIPT_ID_MAX {
            return Err(Error::ValueOutOfRange(u32::from(script_id), 0, SCRIPT_ID_MAX));
        }

        debug!(
            "Playing script {} ({} repeats, from line {})",
            script_id, repeats, start_line
        );
        self.send_command(&[b'p', script_id, repeats, start_line])?;
        self.playing_script = Some(script_id);
        self.is_on = true;
        info!("Script {} playing", script_id);
        Ok(())
    }

    /// Stops script playback, leaving the current color showing
    #[instrument(skip(self))]
    pub fn stop_script(&mut self) -> Result<()> {
        debug!("Stopping script playback");
        self.send_command(&[b'o'])?;
        self.playing_script = None;
        Ok(())
    }

    /// Uploads a light script into the module's writable slot
    ///
    /// Each line is written in place, then the script length and repeat
    /// count are set. Play it afterwards with script id 0.
    ///
    /// # Arguments
    ///
    /// * `lines` - The script to upload (at most [`SCRIPT_MAX_LINES`] lines)
    /// * `repeats` - Repeat count stored with the script, 0 to loop forever
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub fn write_script(&mut self, lines: &[ScriptLine], repeats: u8) -> Result<()> {
        if lines.len() > SCRIPT_MAX_LINES {
            return Err(Error::ScriptTooLong(lines.len(), SCRIPT_MAX_LINES));
        }

        debug!("Uploading {} script lines", lines.len());
        for (position, line) in lines.iter().enumerate() {
            self.send_command(&[
                b'W',
                0,
                position as u8,
                line.dur,
                line.cmd[0],
                line.cmd[1],
                line.cmd[2],
                line.cmd[3],
            ])?;
        }

        // Set script length and repeats so playback knows where to stop
        self.send_command(&[b'L', 0, lines.len() as u8, repeats])?;

        info!("Uploaded {} line script", lines.len());
        Ok(())
    }

    /// Helper funneling every command through one write with pacing
    #[instrument(skip(self, command), fields(cmd = ?(command[0] as char), cmd_length = command.len()))]
    fn send_command(&mut self, command: &[u8]) -> Result<()> {
        trace!("Sending I2C command");
        self.bus
            .write(self.config.address, command)
            .map_err(|e| Error::I2c(format!("{e:?}")))?;

        // The module drops back-to-back commands without a short pause
        self.delay.delay_ms(self.config.command_delay_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, Operation};

    #[derive(Default)]
    struct FakeBus {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl embedded_hal::i2c::ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> std::result::Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn device() -> MaxmDevice<FakeBus, NoopDelay> {
        MaxmDevice::new(FakeBus::default(), NoopDelay, DeviceConfig::default())
    }

    #[test]
    fn power_on_plays_stored_script() {
        let mut dev = device();
        dev.power_on().unwrap();

        assert!(dev.is_on);
        assert_eq!(dev.playing_script, Some(0));
        assert_eq!(dev.bus.writes, vec![(MAXM_ADDRESS, vec![b'p', 0, 1, 0])]);
    }

    #[test]
    fn power_off_stops_then_blacks_out() {
        let mut dev = device();
        dev.power_on().unwrap();
        dev.bus.writes.clear();

        dev.power_off().unwrap();

        assert!(!dev.is_on);
        assert_eq!(dev.playing_script, None);
        assert_eq!(dev.color, (0, 0, 0));
        assert_eq!(
            dev.bus.writes,
            vec![
                (MAXM_ADDRESS, vec![b'o']),
                (MAXM_ADDRESS, vec![b'n', 0, 0, 0]),
            ]
        );
    }

    #[test]
    fn set_color_sends_color_now() {
        let mut dev = device();
        dev.set_color(10, 20, 30).unwrap();

        assert_eq!(dev.color, (10, 20, 30));
        assert_eq!(dev.bus.writes, vec![(MAXM_ADDRESS, vec![b'n', 10, 20, 30])]);
    }

    #[test]
    fn fade_to_color_sends_fade() {
        let mut dev = device();
        dev.fade_to_color(0xff, 0x80, 0x00).unwrap();

        assert_eq!(
            dev.bus.writes,
            vec![(MAXM_ADDRESS, vec![b'c', 0xff, 0x80, 0x00])]
        );
    }

    #[test]
    fn zero_fade_speed_is_bumped_to_one() {
        let mut dev = device();
        dev.set_fade_speed(0).unwrap();

        assert_eq!(dev.fade_speed, Some(1));
        assert_eq!(dev.bus.writes, vec![(MAXM_ADDRESS, vec![b'f', 1])]);
    }

    #[test]
    fn time_adjust_reinterprets_sign() {
        let mut dev = device();
        dev.set_time_adjust(-1).unwrap();

        assert_eq!(dev.bus.writes, vec![(MAXM_ADDRESS, vec![b't', 0xff])]);
    }

    #[test]
    fn unknown_script_id_is_rejected() {
        let mut dev = device();
        let err = dev.play_script(19, 0, 0).unwrap_err();

        assert!(matches!(err, Error::ValueOutOfRange(19, 0, 18)));
        assert!(dev.bus.writes.is_empty());
    }

    #[test]
    fn write_script_uploads_lines_then_length() {
        let script = [
            ScriptLine {
                dur: 1,
                cmd: [b'f', 10, 0, 0],
            },
            ScriptLine {
                dur: 50,
                cmd: [b'c', 0xff, 0xff, 0xff],
            },
        ];

        let mut dev = device();
        dev.write_script(&script, 1).unwrap();

        assert_eq!(
            dev.bus.writes,
            vec![
                (MAXM_ADDRESS, vec![b'W', 0, 0, 1, b'f', 10, 0, 0]),
                (MAXM_ADDRESS, vec![b'W', 0, 1, 50, b'c', 0xff, 0xff, 0xff]),
                (MAXM_ADDRESS, vec![b'L', 0, 2, 1]),
            ]
        );
    }

    #[test]
    fn oversized_script_is_rejected() {
        let line = ScriptLine {
            dur: 1,
            cmd: [b'n', 0, 0, 0],
        };
        let script = vec![line; SCRIPT_MAX_LINES + 1];

        let mut dev = device();
        let err = dev.write_script(&script, 0).unwrap_err();

        assert!(matches!(err, Error::ScriptTooLong(50, SCRIPT_MAX_LINES)));
        assert!(dev.bus.writes.is_empty());
    }

    #[test]
    fn custom_address_is_used() {
        let config = DeviceConfig {
            address: 0x0c,
            command_delay_ms: 0,
        };
        let mut dev = MaxmDevice::new(FakeBus::default(), NoopDelay, config);
        dev.stop_script().unwrap();

        assert_eq!(dev.bus.writes, vec![(0x0c, vec![b'o'])]);
    }
}
