//! Bodies, observing perspective, output frame and the query record.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EphemError;

/// Bodies with a tracked ecliptic longitude.
///
/// The mean lunar nodes are computed points, not physical bodies; they only
/// have a geocentric longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MeanNorthNode,
    MeanSouthNode,
}

/// Every body, in display order.
pub const ALL_BODIES: [Body; 13] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Earth,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
    Body::MeanNorthNode,
    Body::MeanSouthNode,
];

impl Body {
    /// Lower-case name used in CSV headers and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::Mercury => "mercury",
            Self::Venus => "venus",
            Self::Earth => "earth",
            Self::Mars => "mars",
            Self::Jupiter => "jupiter",
            Self::Saturn => "saturn",
            Self::Uranus => "uranus",
            Self::Neptune => "neptune",
            Self::Pluto => "pluto",
            Self::MeanNorthNode => "mean-north-node",
            Self::MeanSouthNode => "mean-south-node",
        }
    }

    /// Whether the body has a position from `perspective`.
    pub const fn supports(self, perspective: Perspective) -> bool {
        match perspective {
            Perspective::Geocentric => !matches!(self, Self::Earth),
            Perspective::Heliocentric => !matches!(
                self,
                Self::Sun | Self::Moon | Self::MeanNorthNode | Self::MeanSouthNode
            ),
        }
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = EphemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        let body = match key.as_str() {
            "sun" => Self::Sun,
            "moon" => Self::Moon,
            "mercury" => Self::Mercury,
            "venus" => Self::Venus,
            "earth" => Self::Earth,
            "mars" => Self::Mars,
            "jupiter" => Self::Jupiter,
            "saturn" => Self::Saturn,
            "uranus" => Self::Uranus,
            "neptune" => Self::Neptune,
            "pluto" => Self::Pluto,
            "meannorthnode" | "northnode" | "meannode" => Self::MeanNorthNode,
            "meansouthnode" | "southnode" => Self::MeanSouthNode,
            _ => return Err(EphemError::UnknownBody(s.to_string())),
        };
        Ok(body)
    }
}

/// Where longitudes are measured from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Perspective {
    #[default]
    Geocentric,
    Heliocentric,
}

impl Perspective {
    /// Short tag used in CSV column names.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Geocentric => "geo",
            Self::Heliocentric => "helio",
        }
    }
}

impl Display for Perspective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geocentric => f.write_str("geocentric"),
            Self::Heliocentric => f.write_str("heliocentric"),
        }
    }
}

impl FromStr for Perspective {
    type Err = EphemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geo" | "geocentric" => Ok(Self::Geocentric),
            "helio" | "heliocentric" => Ok(Self::Heliocentric),
            _ => Err(EphemError::UnknownPerspective(s.to_string())),
        }
    }
}

/// Reference frame of returned longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frame {
    /// Mean ecliptic and equinox of J2000.0.
    EclipticJ2000,
    /// Mean equinox of date (tropical zodiac as usually quoted).
    #[default]
    EclipticOfDate,
}

/// Single ephemeris request. Epochs are Julian Dates in UT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub body: Body,
    pub perspective: Perspective,
    pub frame: Frame,
    pub jd_ut: f64,
}

impl Query {
    pub fn new(body: Body, perspective: Perspective, frame: Frame, jd_ut: f64) -> Self {
        Self {
            body,
            perspective,
            frame,
            jd_ut,
        }
    }

    /// Geocentric, of-date query.
    pub fn geocentric(body: Body, jd_ut: f64) -> Self {
        Self::new(body, Perspective::Geocentric, Frame::EclipticOfDate, jd_ut)
    }

    /// Heliocentric, of-date query.
    pub fn heliocentric(body: Body, jd_ut: f64) -> Self {
        Self::new(body, Perspective::Heliocentric, Frame::EclipticOfDate, jd_ut)
    }

    /// Same query at another epoch.
    pub fn at(&self, jd_ut: f64) -> Self {
        Self { jd_ut, ..*self }
    }

    pub(crate) fn check_supported(&self) -> Result<(), EphemError> {
        if self.body.supports(self.perspective) {
            Ok(())
        } else {
            Err(EphemError::UnsupportedQuery {
                body: self.body,
                perspective: self.perspective,
            })
        }
    }
}
