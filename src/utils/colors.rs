use std::collections::{BTreeMap, HashMap};
use std::fmt;
use itertools::Itertools;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use crate::error::{CodepNetError, Result};

/// Colour with channels in `[0, 1]`, the form colormaps hand out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb { r, g, b }
    }

    pub fn to_rgba(self, alpha: u8) -> Rgba {
        let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba::new(channel(self.r), channel(self.g), channel(self.b), alpha)
    }

    pub fn to_hex(self) -> String {
        let rgba = self.to_rgba(u8::MAX);
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| CodepNetError::InvalidColor(hex.to_string()))?;

        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(CodepNetError::InvalidColor(hex.to_string()));
        }

        let channel = |start: usize| {
            u8::from_str_radix(&digits[start..start + 2], 16)
                .map_err(|_| CodepNetError::InvalidColor(hex.to_string()))
        };

        let alpha = if digits.len() == 8 { channel(6)? } else { u8::MAX };
        Ok(Rgba::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    pub fn to_hex(self) -> String {
        if self.a == u8::MAX {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS functional notation, understood by every plotting backend.
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f64 / 255.0
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Rgb> for Rgba {
    fn from(color: Rgb) -> Self {
        color.to_rgba(u8::MAX)
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Rgba::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

pub const POSITIVE_ROOT_EDGE_COLOR: Rgba = Rgba::new(0xff, 0x00, 0x00, 0x66);
pub const NEGATIVE_ROOT_EDGE_COLOR: Rgba = Rgba::new(0x00, 0x00, 0xff, 0x66);

/// A continuous colour ramp over `[0, 1]`.
pub trait ColorRamp: Send + Sync {
    fn sample(&self, t: f64) -> Rgb;
}

/// Piecewise-linear ramp through a sorted list of anchor stops.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    stops: Vec<(f64, Rgb)>,
}

impl LinearRamp {
    pub fn new(mut stops: Vec<(f64, Rgb)>) -> Self {
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        LinearRamp { stops }
    }

    fn from_evenly_spaced(colors: &[[f64; 3]]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        LinearRamp::new(
            colors
                .iter()
                .enumerate()
                .map(|(idx, c)| (idx as f64 / last, Rgb::new(c[0], c[1], c[2])))
                .collect(),
        )
    }
}

impl ColorRamp for LinearRamp {
    fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgb::new(0.0, 0.0, 0.0),
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for (lower, upper) in self.stops.iter().tuple_windows() {
            if t <= upper.0 {
                let span = upper.0 - lower.0;
                let frac = if span > 0.0 { (t - lower.0) / span } else { 0.0 };
                let lerp = |a: f64, b: f64| a + (b - a) * frac;
                return Rgb::new(
                    lerp(lower.1.r, upper.1.r),
                    lerp(lower.1.g, upper.1.g),
                    lerp(lower.1.b, upper.1.b),
                );
            }
        }
        last.1
    }
}

lazy_static! {
    static ref COLORMAPS: HashMap<&'static str, LinearRamp> = {
        let mut colormaps = HashMap::new();
        colormaps.insert("viridis", LinearRamp::from_evenly_spaced(&[
            [0.267004, 0.004874, 0.329415],
            [0.282623, 0.140926, 0.457517],
            [0.253935, 0.265254, 0.529983],
            [0.206756, 0.371758, 0.553117],
            [0.163625, 0.471133, 0.558148],
            [0.127568, 0.566949, 0.550556],
            [0.134692, 0.658636, 0.517649],
            [0.266941, 0.748751, 0.440573],
            [0.477504, 0.821444, 0.318195],
            [0.741388, 0.873449, 0.149561],
            [0.993248, 0.906157, 0.143936],
        ]));
        colormaps.insert("plasma", LinearRamp::from_evenly_spaced(&[
            [0.050383, 0.029803, 0.527975],
            [0.494877, 0.011990, 0.657865],
            [0.798216, 0.280197, 0.469538],
            [0.973416, 0.585761, 0.251540],
            [0.940015, 0.975158, 0.131326],
        ]));
        colormaps.insert("magma", LinearRamp::from_evenly_spaced(&[
            [0.001462, 0.000466, 0.013866],
            [0.316654, 0.071690, 0.485380],
            [0.716387, 0.214982, 0.475290],
            [0.986700, 0.535582, 0.382210],
            [0.987053, 0.991438, 0.749504],
        ]));
        colormaps.insert("coolwarm", LinearRamp::from_evenly_spaced(&[
            [0.229806, 0.298718, 0.753683],
            [0.865003, 0.865003, 0.865003],
            [0.705673, 0.015556, 0.150233],
        ]));
        colormaps.insert("greys", LinearRamp::from_evenly_spaced(&[
            [1.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
        ]));
        colormaps
    };
}

/// Looks a colormap up by name in the built-in, read-only registry.
pub fn colormap(name: &str) -> Result<&'static LinearRamp> {
    COLORMAPS
        .get(name.to_lowercase().as_str())
        .ok_or_else(|| CodepNetError::UnknownColormap(name.to_string()))
}

pub fn colormap_names() -> Vec<&'static str> {
    COLORMAPS.keys().copied().sorted().collect()
}

/// Assigns every distinct value a colour spread evenly along the ramp.
///
/// Values are ordered ascending and sampled on `linspace(0.01, 0.99, n)`,
/// keeping clear of the ramp's extreme ends.
pub fn colors_for_values<K, I>(values: I, ramp: &dyn ColorRamp) -> BTreeMap<K, Rgb>
where
    K: Ord + Clone,
    I: IntoIterator<Item = K>,
{
    let distinct: Vec<K> = values.into_iter().sorted().dedup().collect();
    let n = distinct.len();
    let step = if n > 1 { (0.99 - 0.01) / (n - 1) as f64 } else { 0.0 };

    distinct
        .into_iter()
        .enumerate()
        .map(|(idx, value)| (value, ramp.sample(0.01 + step * idx as f64)))
        .collect()
}
