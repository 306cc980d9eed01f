//! Optical components of the column
//!
//! Every component owns its axial position, its optical parameters and the ray
//! transfer matrix derived from them. The parameters are changed through
//! setters that validate the new values and recompute the transfer matrix
//! before the new values are stored, so a component never holds a stale matrix.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::{ray::TransferMatrix, shapes};

mod aperture;
pub use aperture::Aperture;
mod biprism;
pub use biprism::{Biprism, WireOrientation};
mod deflector;
pub use deflector::{Deflector, DoubleDeflector};
mod lens;
pub use lens::{AstigmaticLens, Lens, Quadrupole};
mod sample;
pub use sample::Sample;

#[derive(thiserror::Error, Debug)]
pub enum ComponentError {
    #[error("focal length {0} is not valid, expected a non-zero value")]
    FocalLength(f64),
    #[error("aperture radii ({inner},{outer}) are not valid, expected 0 <= inner <= outer")]
    ApertureRadii { inner: f64, outer: f64 },
    #[error("upper deflector plane z={z_up} must lie above the lower plane z={z_low}")]
    DeflectorPlanes { z_up: f64, z_low: f64 },
    #[error("pivot plane z={0} coincides with the lower deflector plane")]
    Pivot(f64),
    #[error("axial position {0} is not finite")]
    Position(f64),
    #[error("{0} transfer matrix has non-finite entries")]
    NonFinite(ComponentKind),
}
pub(crate) type Result<T> = std::result::Result<T, ComponentError>;

/// Returns `matrix` if all its entries are finite
pub(crate) fn finite(kind: ComponentKind, matrix: TransferMatrix) -> Result<TransferMatrix> {
    if crate::ray::is_finite(&matrix) {
        Ok(matrix)
    } else {
        Err(ComponentError::NonFinite(kind))
    }
}
/// Returns `z` if it is finite
pub(crate) fn position(z: f64) -> Result<f64> {
    if z.is_finite() {
        Ok(z)
    } else {
        Err(ComponentError::Position(z))
    }
}

/// Component types
#[derive(EnumIter, Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ComponentKind {
    Lens,
    AstigmaticLens,
    Quadrupole,
    Deflector,
    DoubleDeflector,
    Biprism,
    Aperture,
    Sample,
}
impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ComponentKind::*;
        match self {
            Lens => write!(f, "Lens"),
            AstigmaticLens => write!(f, "Astigmatic Lens"),
            Quadrupole => write!(f, "Quadrupole"),
            Deflector => write!(f, "Deflector"),
            DoubleDeflector => write!(f, "Double Deflector"),
            Biprism => write!(f, "Biprism"),
            Aperture => write!(f, "Aperture"),
            Sample => write!(f, "Sample"),
        }
    }
}

/// Rendering geometry of a component
///
/// None of these values enter the ray transfer computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// radius of the 3D model
    pub radius: f64,
    /// distance from the optic axis of the component label
    pub label_radius: f64,
    /// number of points of the 3D model outline
    pub num_points: usize,
    /// width of the 3D model (biprism wire, sample)
    pub width: f64,
}
impl Default for Geometry {
    fn default() -> Self {
        Self {
            radius: 0.25,
            label_radius: 0.3,
            num_points: 50,
            width: 0.01,
        }
    }
}

/// Axial plane of a component
///
/// All the components have a single plane except the double deflector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Single,
    Upper,
    Lower,
}

/// Optical component
#[derive(Debug, Clone)]
pub enum Component {
    Lens(Lens),
    AstigmaticLens(AstigmaticLens),
    Quadrupole(Quadrupole),
    Deflector(Deflector),
    DoubleDeflector(DoubleDeflector),
    Biprism(Biprism),
    Aperture(Aperture),
    Sample(Sample),
}

macro_rules! dispatch {
    ($component:expr, $c:ident => $body:expr) => {
        match $component {
            Component::Lens($c) => $body,
            Component::AstigmaticLens($c) => $body,
            Component::Quadrupole($c) => $body,
            Component::Deflector($c) => $body,
            Component::DoubleDeflector($c) => $body,
            Component::Biprism($c) => $body,
            Component::Aperture($c) => $body,
            Component::Sample($c) => $body,
        }
    };
}

impl Component {
    /// Returns the component type
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Lens(_) => ComponentKind::Lens,
            Component::AstigmaticLens(_) => ComponentKind::AstigmaticLens,
            Component::Quadrupole(_) => ComponentKind::Quadrupole,
            Component::Deflector(_) => ComponentKind::Deflector,
            Component::DoubleDeflector(_) => ComponentKind::DoubleDeflector,
            Component::Biprism(_) => ComponentKind::Biprism,
            Component::Aperture(_) => ComponentKind::Aperture,
            Component::Sample(_) => ComponentKind::Sample,
        }
    }
    pub fn name(&self) -> &str {
        dispatch!(self, c => &c.name)
    }
    pub fn geometry(&self) -> &Geometry {
        dispatch!(self, c => &c.geometry)
    }
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        dispatch!(self, c => &mut c.geometry)
    }
    /// Axial position, the upper plane for a double deflector
    pub fn z(&self) -> f64 {
        match self {
            Component::DoubleDeflector(c) => c.z_up(),
            Component::Lens(c) => c.z,
            Component::AstigmaticLens(c) => c.z,
            Component::Quadrupole(c) => c.z,
            Component::Deflector(c) => c.z,
            Component::Biprism(c) => c.z,
            Component::Aperture(c) => c.z,
            Component::Sample(c) => c.z,
        }
    }
    /// Axial planes the rays are stopped at
    pub fn planes(&self) -> Vec<(Plane, f64)> {
        match self {
            Component::DoubleDeflector(c) => {
                vec![(Plane::Upper, c.z_up()), (Plane::Lower, c.z_low())]
            }
            _ => vec![(Plane::Single, self.z())],
        }
    }
    /// Ray transfer matrix of the component
    ///
    /// For a double deflector, this is the transfer matrix from the upper
    /// plane to the lower plane, including the propagation between them.
    pub fn transfer_operator(&self) -> TransferMatrix {
        match self {
            Component::DoubleDeflector(c) => c.transfer_operator(),
            _ => self.plane_operator(Plane::Single),
        }
    }
    /// Ray transfer matrix at one of the component planes
    pub fn plane_operator(&self, plane: Plane) -> TransferMatrix {
        match (self, plane) {
            (Component::DoubleDeflector(c), Plane::Lower) => *c.low_matrix(),
            (Component::DoubleDeflector(c), _) => *c.up_matrix(),
            (Component::Lens(c), _) => *c.matrix(),
            (Component::AstigmaticLens(c), _) => *c.matrix(),
            (Component::Quadrupole(c), _) => *c.matrix(),
            (Component::Deflector(c), _) => *c.matrix(),
            (Component::Biprism(c), _) => *c.matrix(),
            (Component::Aperture(c), _) => *c.matrix(),
            (Component::Sample(c), _) => *c.matrix(),
        }
    }
    /// Indices of the rays stopped by this component during the last propagation
    pub fn blocked_ray_idcs(&self) -> &[usize] {
        dispatch!(self, c => &c.blocked_ray_idcs)
    }
    pub(crate) fn clear_blocked(&mut self) {
        dispatch!(self, c => c.blocked_ray_idcs.clear())
    }
    pub(crate) fn extend_blocked(&mut self, idcs: &[usize]) {
        dispatch!(self, c => c.blocked_ray_idcs.extend_from_slice(idcs))
    }
    /// Wire model of the component, a list of polylines of `[x,y,z]` points
    pub fn outline(&self) -> Vec<Vec<[f64; 3]>> {
        let Geometry {
            radius,
            num_points,
            width,
            ..
        } = *self.geometry();
        match self {
            Component::Lens(c) => vec![shapes::lens(radius, c.z, num_points)],
            Component::AstigmaticLens(c) => vec![shapes::lens(radius, c.z, num_points)],
            Component::Quadrupole(c) => {
                shapes::quadrupole(radius, shapes::QUADRUPOLE_ARC, c.z, num_points).to_vec()
            }
            Component::Deflector(c) => {
                shapes::deflector(radius, shapes::DEFLECTOR_ARC, c.z, num_points).to_vec()
            }
            Component::DoubleDeflector(c) => [c.z_up(), c.z_low()]
                .into_iter()
                .flat_map(|z| shapes::deflector(radius, shapes::DEFLECTOR_ARC, z, num_points))
                .collect(),
            Component::Biprism(c) => vec![shapes::biprism(radius, c.z, c.orientation().angle())],
            Component::Aperture(c) => {
                let (x, y) = c.center();
                [c.radius_inner(), c.radius_outer()]
                    .into_iter()
                    .map(|r| shapes::circle(r, x, y, c.z, num_points))
                    .collect()
            }
            Component::Sample(c) => vec![vec![
                [c.x() - 0.5 * width, 0f64, c.z],
                [c.x() + 0.5 * width, 0f64, c.z],
            ]],
        }
    }
}
impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name().is_empty() {
            write!(f, "{} @ z={:.3}", self.kind(), self.z())
        } else {
            write!(f, "{} ({}) @ z={:.3}", self.name(), self.kind(), self.z())
        }
    }
}

macro_rules! into_component {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Component {
                fn from(value: $variant) -> Self {
                    Component::$variant(value)
                }
            }
        )*
    };
}
into_component!(
    Lens,
    AstigmaticLens,
    Quadrupole,
    Deflector,
    DoubleDeflector,
    Biprism,
    Aperture,
    Sample
);
