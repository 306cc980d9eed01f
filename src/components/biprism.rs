use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use super::{finite, position, ComponentKind, Geometry, Result};
use crate::ray::{TransferMatrix, HOMOGENEOUS, SLOPE_X, SLOPE_Y, X, Y};

/// Biprism wire orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WireOrientation {
    /// 0 degree
    #[default]
    Zero,
    /// 90 degree
    HalfPi,
}
impl WireOrientation {
    /// Wire angle in radians
    pub fn angle(&self) -> f64 {
        match self {
            WireOrientation::Zero => 0f64,
            WireOrientation::HalfPi => FRAC_PI_2,
        }
    }
    /// Row of the ray coordinate which sign sets the kick direction
    pub fn sign_axis(&self) -> usize {
        match self {
            WireOrientation::Zero => X,
            WireOrientation::HalfPi => Y,
        }
    }
}

/// Electron biprism
///
/// The stored transfer matrix holds the unsigned kick
/// `(deflection sin(theta), deflection cos(theta))`.
/// Rays on either side of the wire are kicked in opposite directions, so the
/// matrix applied to a ray is [Biprism::signed_operator] with the sign given
/// by [Biprism::kick_sign] of the ray coordinate along [WireOrientation::sign_axis].
#[derive(Debug, Clone)]
pub struct Biprism {
    pub(crate) name: String,
    pub(crate) z: f64,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    deflection: f64,
    orientation: WireOrientation,
    matrix: TransferMatrix,
}

fn biprism_matrix(deflection: f64, orientation: WireOrientation) -> Result<TransferMatrix> {
    let (s, c) = orientation.angle().sin_cos();
    let mut matrix = TransferMatrix::identity();
    matrix[(SLOPE_X, HOMOGENEOUS)] = deflection * s;
    matrix[(SLOPE_Y, HOMOGENEOUS)] = deflection * c;
    finite(ComponentKind::Biprism, matrix)
}

impl Biprism {
    /// Creates a biprism at `z` with the slope kick `deflection`
    pub fn new(z: f64, deflection: f64, orientation: WireOrientation) -> Result<Self> {
        Ok(Self {
            name: String::new(),
            z: position(z)?,
            geometry: Geometry::default(),
            blocked_ray_idcs: Vec::new(),
            deflection,
            orientation,
            matrix: biprism_matrix(deflection, orientation)?,
        })
    }
    pub fn with_name(self, name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ..self
        }
    }
    pub fn with_geometry(self, geometry: Geometry) -> Self {
        Self { geometry, ..self }
    }
    pub fn z(&self) -> f64 {
        self.z
    }
    pub fn deflection(&self) -> f64 {
        self.deflection
    }
    pub fn orientation(&self) -> WireOrientation {
        self.orientation
    }
    pub fn set_deflection(&mut self, deflection: f64) -> Result<()> {
        self.matrix = biprism_matrix(deflection, self.orientation)?;
        self.deflection = deflection;
        Ok(())
    }
    pub fn set_orientation(&mut self, orientation: WireOrientation) -> Result<()> {
        self.matrix = biprism_matrix(self.deflection, orientation)?;
        self.orientation = orientation;
        Ok(())
    }
    /// Unsigned transfer matrix
    pub fn matrix(&self) -> &TransferMatrix {
        &self.matrix
    }
    /// Sign of the kick for a ray at `coordinate` along the sign axis
    ///
    /// A ray exactly on the wire axis is kicked with the positive sign.
    pub fn kick_sign(coordinate: f64) -> f64 {
        if coordinate < 0f64 {
            -1f64
        } else {
            1f64
        }
    }
    /// Transfer matrix with the kick multiplied by `sign`
    pub fn signed_operator(&self, sign: f64) -> TransferMatrix {
        let mut matrix = self.matrix;
        matrix[(SLOPE_X, HOMOGENEOUS)] *= sign;
        matrix[(SLOPE_Y, HOMOGENEOUS)] *= sign;
        matrix
    }
}
