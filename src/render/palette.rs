//! Colour ramps keyed on the orbit colour label

use crate::io::error::{Result, invalid_parameter};
use serde::{Deserialize, Serialize};

/// Colour at a position of a ramp, channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position of the stop in [0, 1]
    pub position: f64,
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
}

impl ColorStop {
    /// Stop at `position` with channels `(r, g, b)`
    pub const fn new(position: f64, r: f64, g: f64, b: f64) -> Self {
        Self { position, r, g, b }
    }
}

/// Named built-in ramps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinRamp {
    /// Blue through green and yellow to red
    Autumn,
    /// Cyan, magenta, yellow, cyan
    Cmy,
    /// Red, green, blue, red
    Rgb,
    /// Pastel cyan, magenta, yellow
    LightCmy,
    /// Dark green, olive, maroon, navy
    Dark,
    /// Many-stop multicoloured cycle
    Rich,
    /// Yellow to azure
    #[default]
    Fast,
}

/// Sequence of stops sampled by linear interpolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::builtin(BuiltinRamp::default())
    }
}

impl ColorRamp {
    /// Ramp over `stops`, which should be ordered by position
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two stops are given
    pub fn new(stops: Vec<ColorStop>) -> Result<Self> {
        if stops.len() < 2 {
            return Err(invalid_parameter(
                "color_map",
                &stops.len(),
                &"a colour ramp needs at least two stops",
            ));
        }
        Ok(Self { stops })
    }

    /// One of the named ramps
    pub fn builtin(ramp: BuiltinRamp) -> Self {
        let table: &[[f64; 4]] = match ramp {
            BuiltinRamp::Autumn => &[
                [0.00, 0.000, 0.595, 1.000],
                [0.38, 0.567, 1.000, 0.000],
                [0.60, 1.000, 1.000, 0.000],
                [1.00, 0.915, 0.000, 0.058],
            ],
            BuiltinRamp::Cmy => &[
                [0.0, 0.0, 1.0, 1.0],
                [0.333_333, 1.0, 0.0, 1.0],
                [0.666_667, 1.0, 1.0, 0.0],
                [1.0, 0.0, 1.0, 1.0],
            ],
            BuiltinRamp::Rgb => &[
                [0.0, 1.0, 0.0, 0.0],
                [0.333_333, 0.0, 1.0, 0.0],
                [0.666_667, 0.0, 0.0, 1.0],
                [1.0, 1.0, 0.0, 0.0],
            ],
            BuiltinRamp::LightCmy => &[
                [0.0, 0.5, 1.0, 1.0],
                [0.333_333, 1.0, 0.5, 1.0],
                [0.666_667, 1.0, 1.0, 0.5],
                [1.0, 0.5, 1.0, 1.0],
            ],
            BuiltinRamp::Dark => &[
                [0.0, 0.00, 0.32, 0.00],
                [0.333_333, 0.58, 0.58, 0.00],
                [0.666_667, 0.43, 0.00, 0.00],
                [1.0, 0.00, 0.00, 0.47],
            ],
            BuiltinRamp::Rich => &RICH,
            BuiltinRamp::Fast => &[[0.0, 1.0, 1.0, 0.0], [1.0, 0.0, 0.5, 1.0]],
        };
        Self {
            stops: table
                .iter()
                .map(|&[position, r, g, b]| ColorStop::new(position, r, g, b))
                .collect(),
        }
    }

    /// Parse stops written as `[position color rgbt <r, g, b, t>]`
    ///
    /// Text outside brackets is ignored, as are bracketed entries without
    /// three channels; the transparency channel is optional and unused.
    ///
    /// # Errors
    ///
    /// Returns an error if a position or channel is not a number, or fewer
    /// than two stops are found
    pub fn parse(text: &str) -> Result<Self> {
        let mut stops = Vec::new();
        for entry in text.split('[').skip(1) {
            let entry = entry.split(']').next().unwrap_or_default();
            let (Some(open), Some(close)) = (entry.find('<'), entry.find('>')) else {
                continue;
            };
            let channels: Vec<&str> = entry
                .get(open + 1..close)
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .collect();
            let [r, g, b, ..] = channels.as_slice() else {
                continue;
            };
            let position = entry.split_whitespace().next().unwrap_or_default();
            stops.push(ColorStop::new(
                parse_number("position", position)?,
                parse_number("red", r)?,
                parse_number("green", g)?,
                parse_number("blue", b)?,
            ));
        }
        Self::new(stops)
    }

    /// Stops of the ramp
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Interpolated colour at `position`; black if no pair of stops brackets it
    pub fn sample(&self, position: f64) -> [f64; 3] {
        self.stops
            .windows(2)
            .find_map(|pair| match pair {
                [low, high] if low.position <= position && position <= high.position => {
                    let span = high.position - low.position;
                    let t = if span > 0.0 { (position - low.position) / span } else { 0.0 };
                    let mix = |p: f64, q: f64| t.mul_add(q - p, p);
                    Some([mix(low.r, high.r), mix(low.g, high.g), mix(low.b, high.b)])
                }
                _ => None,
            })
            .unwrap_or([0.0; 3])
    }

    /// Text form accepted by `parse`
    pub fn to_text(&self) -> String {
        self.stops
            .iter()
            .map(|s| format!("[{} color rgbt <{}, {}, {}, 0>]", s.position, s.r, s.g, s.b))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_number(channel: &'static str, token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .ok()
        .ok_or_else(|| invalid_parameter(channel, &token, &"not a number in colour map"))
}

const RICH: [[f64; 4]; 29] = [
    [0.000_000, 0.459_018, 0.815_603, 0.242_469],
    [0.035_714, 0.570_534, 0.529_856, 0.253_161],
    [0.071_429, 0.682_050, 0.244_109, 0.263_853],
    [0.107_143, 0.736_788, 0.396_304, 0.209_489],
    [0.142_857, 0.791_525, 0.548_498, 0.155_124],
    [0.178_571, 0.754_719, 0.689_115, 0.577_562],
    [0.214_286, 0.717_913, 0.829_731, 1.000_000],
    [0.250_000, 0.823_495, 0.871_860, 0.561_662],
    [0.285_714, 0.929_078, 0.913_989, 0.123_323],
    [0.321_429, 0.577_779, 0.889_619, 0.171_096],
    [0.357_143, 0.226_480, 0.865_248, 0.218_870],
    [0.392_857, 0.329_124, 0.679_513, 0.485_321],
    [0.428_571, 0.431_768, 0.493_777, 0.751_773],
    [0.464_286, 0.680_423, 0.706_713, 0.739_927],
    [0.500_000, 0.929_078, 0.919_648, 0.728_080],
    [0.535_714, 0.824_186, 0.571_752, 0.507_281],
    [0.571_429, 0.719_293, 0.223_855, 0.286_481],
    [0.607_143, 0.684_035, 0.537_460, 0.440_468],
    [0.642_857, 0.648_777, 0.851_064, 0.594_454],
    [0.678_571, 0.631_586, 0.907_801, 0.499_426],
    [0.714_286, 0.614_394, 0.964_539, 0.404_399],
    [0.750_000, 0.469_942, 0.572_466, 0.535_533],
    [0.785_714, 0.325_490, 0.180_392, 0.666_667],
    [0.821_429, 0.645_015, 0.382_967, 0.333_333],
    [0.857_143, 0.964_539, 0.585_541, 0.000_000],
    [0.892_857, 0.953_901, 0.740_186, 0.117_787],
    [0.928_571, 0.943_262, 0.894_831, 0.235_574],
    [0.964_286, 0.701_140, 0.855_217, 0.239_021],
    [1.000_000, 0.459_018, 0.815_603, 0.242_469],
];
