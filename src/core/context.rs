//! Stream context - modal machine state shared with stages during a run

use crate::core::gcode;
use serde::{Deserialize, Serialize};

/// Active motion mode (G0..G3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    Rapid,
    Linear,
    ArcClockwise,
    ArcCounterClockwise,
}

impl MotionMode {
    /// Motion mode selected by a G word, if it selects one
    pub fn from_code(code: f64) -> Option<Self> {
        match code {
            c if c == 0.0 => Some(MotionMode::Rapid),
            c if c == 1.0 => Some(MotionMode::Linear),
            c if c == 2.0 => Some(MotionMode::ArcClockwise),
            c if c == 3.0 => Some(MotionMode::ArcCounterClockwise),
            _ => None,
        }
    }

    /// Whether the move runs at the programmed feed rate
    pub fn is_feed_motion(self) -> bool {
        !matches!(self, MotionMode::Rapid)
    }

    pub fn is_arc(self) -> bool {
        matches!(self, MotionMode::ArcClockwise | MotionMode::ArcCounterClockwise)
    }
}

/// Arc plane (G17/G18/G19)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    XY,
    ZX,
    YZ,
}

impl Plane {
    /// Axis indices (first, second, linear) with X=0, Y=1, Z=2
    pub fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::ZX => (2, 0, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// Programming units (G20/G21)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Millimeters,
    Inches,
}

/// Modal state of the controller as implied by the records sent so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    /// Current X, Y, Z in program units
    pub position: [f64; 3],

    /// G90 (true) or G91 (false)
    pub absolute: bool,

    pub motion: Option<MotionMode>,

    pub plane: Plane,

    pub units: Units,

    pub feed: Option<f64>,
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            absolute: true,
            motion: None,
            plane: Plane::XY,
            units: Units::Millimeters,
            feed: None,
        }
    }
}

/// Codes whose axis words do not describe a move to a new position
const NON_MOTION_AXIS_CODES: [f64; 6] = [4.0, 10.0, 28.0, 30.0, 53.0, 92.0];

impl MachineState {
    /// Update the state from a command the controller will receive
    pub fn apply(&mut self, record: &str) {
        let words = gcode::line_words(record);
        let mut suppress_move = false;

        for &(letter, value) in &words {
            if letter != 'G' {
                continue;
            }
            if let Some(mode) = MotionMode::from_code(value) {
                self.motion = Some(mode);
            } else if value == 17.0 {
                self.plane = Plane::XY;
            } else if value == 18.0 {
                self.plane = Plane::ZX;
            } else if value == 19.0 {
                self.plane = Plane::YZ;
            } else if value == 20.0 {
                self.units = Units::Inches;
            } else if value == 21.0 {
                self.units = Units::Millimeters;
            } else if value == 90.0 {
                self.absolute = true;
            } else if value == 91.0 {
                self.absolute = false;
            } else if NON_MOTION_AXIS_CODES.contains(&value) {
                suppress_move = true;
            }
        }

        for &(letter, value) in &words {
            match letter {
                'F' => self.feed = Some(value),
                'X' | 'Y' | 'Z' if !suppress_move && self.motion.is_some() => {
                    let axis = axis_index(letter);
                    if self.absolute {
                        self.position[axis] = value;
                    } else {
                        self.position[axis] += value;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Index of an axis letter, X=0, Y=1, Z=2
pub fn axis_index(letter: char) -> usize {
    match letter {
        'X' => 0,
        'Y' => 1,
        _ => 2,
    }
}

/// Execution context passed to every stage for every record
///
/// Owned by a single pipeline run; the executor advances it as records
/// leave the last stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamContext {
    /// One-based number of the input record being processed
    pub line_number: usize,

    /// Machine state before the current input record
    pub machine: MachineState,
}

impl StreamContext {
    /// Create a context for a fresh run
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a command left the pipeline
    pub fn commit(&mut self, record: &str) {
        self.machine.apply(record);
    }
}
