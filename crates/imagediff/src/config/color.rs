use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 3 or 4 comma-separated channels (R,G,B[,A]), got {0}")]
    Arity(usize),

    #[error("channel value {0:?} is not an integer between 0 and 255")]
    Channel(String),

    #[error("invalid colour object: {0}")]
    Json(String),
}

/// An 8-bit RGBA colour as written by users. Alpha defaults to 255.
///
/// Accepted forms: `"R,G,B"`, `"R,G,B,A"`, `[r, g, b]`, `[r, g, b, a]`
/// and `{"R": .., "G": .., "B": .., "A": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct ColorSpec {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorSpec {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn from_channels(channels: &[u8]) -> Result<Self, ColorParseError> {
        match *channels {
            [r, g, b] => Ok(Self::rgba(r, g, b, 255)),
            [r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
            _ => Err(ColorParseError::Arity(channels.len())),
        }
    }
}

impl From<ColorSpec> for Rgba<u8> {
    fn from(c: ColorSpec) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }
}

impl From<Rgba<u8>> for ColorSpec {
    fn from(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<ColorSpec> for String {
    fn from(c: ColorSpec) -> Self {
        c.to_string()
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for ColorSpec {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('{') {
            return serde_json::from_str(s).map_err(|e| ColorParseError::Json(e.to_string()));
        }
        let channels = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<u8>()
                    .map_err(|_| ColorParseError::Channel(part.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_channels(&channels)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Text(String),
    Channels(Vec<u8>),
    Object {
        #[serde(rename = "R", alias = "r")]
        r: u8,
        #[serde(rename = "G", alias = "g")]
        g: u8,
        #[serde(rename = "B", alias = "b")]
        b: u8,
        #[serde(rename = "A", alias = "a", default = "opaque")]
        a: u8,
    },
}

fn opaque() -> u8 {
    255
}

impl TryFrom<ColorRepr> for ColorSpec {
    type Error = ColorParseError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Text(s) => s.parse(),
            ColorRepr::Channels(channels) => Self::from_channels(&channels),
            ColorRepr::Object { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
        }
    }
}
