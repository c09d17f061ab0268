/*!
 # Light scripts for MaxM modules

 This module defines the light-script line format understood by the
 module and the canned scripts this controller ships with. A script is
 uploaded to the module's script slot 0 and played back on-module, so
 the host can sleep while the lights run.
*/

/// One light-script line: a duration in ticks followed by a command
/// byte and its three arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine {
    /// How long to stay on this line, in module ticks
    pub dur: u8,
    /// Command plus three arguments, unused arguments zero
    pub cmd: [u8; 4],
}

/// Daylight script: start dark, hold bright through mid-day, then
/// slowly fade away
pub const DAY_FADE: &[ScriptLine] = &[
    ScriptLine {
        dur: 1,
        cmd: [b'f', 1, 0, 0], // fade speed (slow)
    },
    ScriptLine {
        dur: 1,
        cmd: [b't', 1, 0, 0], // time adjust (slower)
    },
    ScriptLine {
        dur: 255,
        cmd: [b'c', 0xff, 0xff, 0xff], // stay bright for mid-day
    },
    ScriptLine {
        dur: 100,
        cmd: [b'c', 0x00, 0x00, 0x00], // fade to black
    },
];

/// Aiming script: full white long enough to aim the fixtures, then off
pub const AIM_LIGHTS: &[ScriptLine] = &[
    ScriptLine {
        dur: 1,
        cmd: [b'f', 255, 0, 0], // fade speed (instant)
    },
    ScriptLine {
        dur: 225,
        cmd: [b'n', 0xff, 0xff, 0xff],
    },
    ScriptLine {
        dur: 1,
        cmd: [b'n', 0x00, 0x00, 0x00],
    },
];
