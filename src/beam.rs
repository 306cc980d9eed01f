//! Electron beam source
//!
//! The initial ray ensemble is a deterministic function of the beam type, the
//! number of rays and the beam shape parameter: the semi-angle for a point
//! source or the radius for a parallel beam.

use std::{f64::consts::PI, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::{
    linspace,
    ray::{ray, Rays},
};

#[derive(thiserror::Error, Debug)]
pub enum BeamError {
    #[error("the beam needs at least one ray")]
    NoRays,
    #[error("beam shape parameter {0} is not valid, expected a finite non-negative value")]
    Shape(f64),
    #[error("beam position z={0} is not finite")]
    Position(f64),
    #[error(r#"beam type {0} is not recognized, expected "point", "cone", "x_axial", "y_axial" or "paraxial""#)]
    BeamType(String),
}
type Result<T> = std::result::Result<T, BeamError>;

/// Beam emission geometry
#[derive(EnumIter, Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamType {
    /// Point source, the x slopes are uniformly swept across `[-a,a]`
    #[default]
    Point,
    /// Point source, the slopes fill the disc of radius `a`
    Cone,
    /// Parallel beam, the x coordinates are uniformly swept across `[-r,r]`
    XAxial,
    /// Parallel beam, the y coordinates are uniformly swept across `[-r,r]`
    YAxial,
    /// Parallel beam, the (x,y) coordinates fill the disc of radius `r`
    Paraxial,
}
impl fmt::Display for BeamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BeamType::*;
        match self {
            Point => write!(f, "point"),
            Cone => write!(f, "cone"),
            XAxial => write!(f, "x_axial"),
            YAxial => write!(f, "y_axial"),
            Paraxial => write!(f, "paraxial"),
        }
    }
}
impl FromStr for BeamType {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self> {
        use BeamType::*;
        match s.to_lowercase().as_str() {
            "point" => Ok(Point),
            "cone" => Ok(Cone),
            "x_axial" => Ok(XAxial),
            "y_axial" => Ok(YAxial),
            "paraxial" => Ok(Paraxial),
            _ => Err(BeamError::BeamType(s.to_string())),
        }
    }
}

/// Uniform sweep of `n` values across `[-a,a]`, a single value is on axis
fn sweep(n: usize, a: f64) -> Vec<f64> {
    if n == 1 {
        vec![0f64]
    } else {
        linspace(-a, a, n).collect()
    }
}
/// Sunflower sampling of `n` points on the disc of radius `a`, a single point is on axis
fn sunflower(n: usize, a: f64) -> Vec<(f64, f64)> {
    if n == 1 {
        return vec![(0f64, 0f64)];
    }
    let golden_angle = PI * (3f64 - 5f64.sqrt());
    (0..n)
        .map(|k| {
            let r = a * ((k as f64 + 0.5) / n as f64).sqrt();
            let (s, c) = (k as f64 * golden_angle).sin_cos();
            (r * c, r * s)
        })
        .collect()
}

/// Electron beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    beam_type: BeamType,
    z: f64,
    num_rays: usize,
    shape: f64,
}
impl Beam {
    /// Creates a beam of `num_rays` rays starting at `z`
    ///
    /// `shape` is the semi-angle of a point source or the radius of a parallel beam.
    pub fn new(beam_type: BeamType, z: f64, num_rays: usize, shape: f64) -> Result<Self> {
        if num_rays == 0 {
            return Err(BeamError::NoRays);
        }
        if !(shape.is_finite() && shape >= 0f64) {
            return Err(BeamError::Shape(shape));
        }
        if !z.is_finite() {
            return Err(BeamError::Position(z));
        }
        Ok(Self {
            beam_type,
            z,
            num_rays,
            shape,
        })
    }
    pub fn beam_type(&self) -> BeamType {
        self.beam_type
    }
    pub fn z(&self) -> f64 {
        self.z
    }
    pub fn num_rays(&self) -> usize {
        self.num_rays
    }
    /// Semi-angle or radius
    pub fn shape(&self) -> f64 {
        self.shape
    }
    /// Initial ray ensemble at the beam plane
    pub fn generate(&self) -> Rays {
        let (n, a) = (self.num_rays, self.shape);
        let rays: Vec<_> = match self.beam_type {
            BeamType::Point => sweep(n, a)
                .into_iter()
                .map(|tx| ray(0f64, tx, 0f64, 0f64))
                .collect(),
            BeamType::Cone => sunflower(n, a)
                .into_iter()
                .map(|(tx, ty)| ray(0f64, tx, 0f64, ty))
                .collect(),
            BeamType::XAxial => sweep(n, a)
                .into_iter()
                .map(|x| ray(x, 0f64, 0f64, 0f64))
                .collect(),
            BeamType::YAxial => sweep(n, a)
                .into_iter()
                .map(|y| ray(0f64, 0f64, y, 0f64))
                .collect(),
            BeamType::Paraxial => sunflower(n, a)
                .into_iter()
                .map(|(x, y)| ray(x, 0f64, y, 0f64))
                .collect(),
        };
        Rays::from_columns(&rays)
    }
}
impl fmt::Display for Beam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} beam of {} rays @ z={:.3} ({:.3e})",
            self.beam_type, self.num_rays, self.z, self.shape
        )
    }
}
