//! Arc expansion into line segments

use crate::core::context::{axis_index, MachineState, MotionMode, Plane, Units};
use crate::core::gcode;
use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};
use std::f64::consts::TAU;

pub(crate) const LENGTH: &str = "length";

const MM_PER_INCH: f64 = 25.4;
const EPSILON: f64 = 1e-9;
const DECIMALS: usize = 4;

/// Arcs needing more segments than this are rejected
pub const MAX_SEGMENTS: usize = 100_000;

/// Words consumed by the expansion; everything else is passed on
const ARC_WORDS: [char; 9] = ['X', 'Y', 'Z', 'I', 'J', 'K', 'R', 'F', 'N'];
const AXIS_LETTERS: [char; 3] = ['X', 'Y', 'Z'];

/// Replaces G2/G3 arcs with G1 segments no longer than `segment_length` (mm)
#[derive(Debug)]
pub struct ArcExpander {
    segment_length: f64,

    /// Motion mode last selected by a command reaching this stage. The
    /// controller never sees the arc codes, so the context cannot track it.
    modal_motion: Option<MotionMode>,
}

impl ArcExpander {
    pub fn new(segment_length: f64) -> Self {
        Self {
            segment_length,
            modal_motion: None,
        }
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }
}

pub(crate) fn construct(args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(ArcExpander::new(args.positive_f64(LENGTH)?)))
}

/// An arc command resolved against the machine state
struct Arc {
    clockwise: bool,
    plane: Plane,
    absolute: bool,
    start: [f64; 3],
    end: [f64; 3],
    center: (f64, f64),
    radius: f64,
    feed: Option<String>,
}

impl Arc {
    fn resolve(
        words: &[gcode::Word<'_>],
        motion: MotionMode,
        machine: &MachineState,
    ) -> Result<Self, ProcessError> {
        let mut plane = machine.plane;
        let mut absolute = machine.absolute;
        for word in words.iter().filter(|w| w.letter == 'G') {
            match word.value {
                v if v == 17.0 => plane = Plane::XY,
                v if v == 18.0 => plane = Plane::ZX,
                v if v == 19.0 => plane = Plane::YZ,
                v if v == 90.0 => absolute = true,
                v if v == 91.0 => absolute = false,
                _ => {}
            }
        }

        let start = machine.position;
        let mut end = start;
        let mut offsets: [Option<f64>; 3] = [None; 3];
        let mut radius_word = None;
        let mut feed = None;

        for word in words {
            match word.letter {
                'X' | 'Y' | 'Z' => {
                    let axis = axis_index(word.letter);
                    end[axis] = if absolute {
                        word.value
                    } else {
                        start[axis] + word.value
                    };
                }
                'I' => offsets[0] = Some(word.value),
                'J' => offsets[1] = Some(word.value),
                'K' => offsets[2] = Some(word.value),
                'R' => radius_word = Some(word.value),
                'F' => feed = Some(word.number_text().to_string()),
                _ => {}
            }
        }

        let clockwise = motion == MotionMode::ArcClockwise;
        let (a0, a1, _) = plane.axes();
        let center = if offsets[a0].is_some() || offsets[a1].is_some() {
            (
                start[a0] + offsets[a0].unwrap_or(0.0),
                start[a1] + offsets[a1].unwrap_or(0.0),
            )
        } else if let Some(r) = radius_word {
            center_from_radius(start, end, plane, r, clockwise)?
        } else {
            return Err(ProcessError::Malformed(
                "arc has neither center offsets nor radius".to_string(),
            ));
        };

        let radius = (start[a0] - center.0).hypot(start[a1] - center.1);
        if radius < EPSILON {
            return Err(ProcessError::Malformed("arc radius is zero".to_string()));
        }

        Ok(Self {
            clockwise,
            plane,
            absolute,
            start,
            end,
            center,
            radius,
            feed,
        })
    }

    /// Signed angular travel, negative for clockwise
    fn sweep(&self) -> (f64, f64) {
        let (a0, a1, _) = self.plane.axes();
        let angle_start = (self.start[a1] - self.center.1).atan2(self.start[a0] - self.center.0);
        let angle_end = (self.end[a1] - self.center.1).atan2(self.end[a0] - self.center.0);

        let mut sweep = angle_end - angle_start;
        if self.clockwise {
            if sweep >= -EPSILON {
                sweep -= TAU;
            }
        } else if sweep <= EPSILON {
            sweep += TAU;
        }
        (angle_start, sweep)
    }

    /// End points of each segment, the last one exactly at the arc end
    fn points(&self, segment_length: f64) -> Result<Vec<[f64; 3]>, ProcessError> {
        let (a0, a1, linear) = self.plane.axes();
        let (angle_start, sweep) = self.sweep();
        let travel = self.end[linear] - self.start[linear];
        let path = (sweep.abs() * self.radius).hypot(travel);

        let segments = (path / segment_length).ceil();
        if !segments.is_finite() || segments > MAX_SEGMENTS as f64 {
            return Err(ProcessError::Malformed(format!(
                "arc of length {} needs more than {} segments of length {}",
                gcode::format_number(path, DECIMALS),
                MAX_SEGMENTS,
                segment_length
            )));
        }
        let count = (segments as usize).max(1);

        Ok((1..=count)
            .map(|i| {
                if i == count {
                    return self.end;
                }
                let fraction = i as f64 / count as f64;
                let angle = angle_start + sweep * fraction;
                let mut point = self.start;
                point[a0] = self.center.0 + self.radius * angle.cos();
                point[a1] = self.center.1 + self.radius * angle.sin();
                point[linear] = self.start[linear] + travel * fraction;
                point
            })
            .collect())
    }
}

/// Round to the precision segments are written with
fn round(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS as i32);
    (value * scale).round() / scale
}

/// Center of an R-form arc (negative R selects the longer arc)
fn center_from_radius(
    start: [f64; 3],
    end: [f64; 3],
    plane: Plane,
    radius: f64,
    clockwise: bool,
) -> Result<(f64, f64), ProcessError> {
    let (a0, a1, _) = plane.axes();
    let x = end[a0] - start[a0];
    let y = end[a1] - start[a1];
    let chord = x.hypot(y);
    if chord < EPSILON {
        return Err(ProcessError::Malformed(
            "radius arc needs distinct start and end points".to_string(),
        ));
    }

    let discriminant = 4.0 * radius * radius - x * x - y * y;
    if discriminant < -EPSILON {
        return Err(ProcessError::Malformed(format!(
            "arc radius {} is too small for its end point",
            radius
        )));
    }

    let mut h = -discriminant.max(0.0).sqrt() / chord;
    if !clockwise {
        h = -h;
    }
    if radius < 0.0 {
        h = -h;
    }
    Ok((
        start[a0] + 0.5 * (x - y * h),
        start[a1] + 0.5 * (y + x * h),
    ))
}

impl Stage for ArcExpander {
    fn kind(&self) -> StageKind {
        StageKind::ArcExpander
    }

    fn process(
        &mut self,
        record: &str,
        context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        let code = gcode::strip_comments(record);
        let words = gcode::words(&code);

        let mut explicit = None;
        let mut units = context.machine.units;
        let mut remainder = Vec::new();
        for word in &words {
            if word.letter == 'G' {
                if let Some(mode) = MotionMode::from_code(word.value) {
                    explicit = Some(mode);
                    continue;
                }
                if word.value == 20.0 {
                    units = Units::Inches;
                } else if word.value == 21.0 {
                    units = Units::Millimeters;
                }
            }
            if !ARC_WORDS.contains(&word.letter) {
                remainder.push(word.raw.trim());
            }
        }

        if explicit.is_some() {
            self.modal_motion = explicit;
        }
        let motion = explicit.or(self.modal_motion).or(context.machine.motion);
        let has_motion_words = words
            .iter()
            .any(|w| matches!(w.letter, 'X' | 'Y' | 'Z' | 'I' | 'J' | 'K' | 'R'));

        let motion = match motion {
            Some(mode) if mode.is_arc() && (explicit.is_some() || has_motion_words) => mode,
            _ => return Ok(vec![record.to_string()]),
        };

        let arc = Arc::resolve(&words, motion, &context.machine)?;
        let segment_length = match units {
            Units::Millimeters => self.segment_length,
            Units::Inches => self.segment_length / MM_PER_INCH,
        };

        let points = arc.points(segment_length)?;
        let mut commands = Vec::with_capacity(points.len() + 1);
        if !remainder.is_empty() {
            commands.push(remainder.join(" "));
        }

        let (_, _, linear) = arc.plane.axes();
        let helical = (arc.end[linear] - arc.start[linear]).abs() > EPSILON;
        // Where the emitted relative moves have actually taken the machine
        let mut reached = arc.start;
        for (i, point) in points.into_iter().enumerate() {
            let mut command = String::from("G1");
            for (axis, letter) in AXIS_LETTERS.iter().enumerate() {
                if axis == linear && !helical {
                    continue;
                }
                let value = if arc.absolute {
                    point[axis]
                } else {
                    let delta = round(point[axis] - reached[axis]);
                    reached[axis] += delta;
                    delta
                };
                command.push(' ');
                command.push(*letter);
                command.push_str(&gcode::format_number(value, DECIMALS));
            }
            if i == 0 {
                if let Some(feed) = &arc.feed {
                    command.push_str(" F");
                    command.push_str(feed);
                }
            }
            commands.push(command);
        }

        Ok(commands)
    }

    fn reset(&mut self) {
        self.modal_motion = None;
    }
}
