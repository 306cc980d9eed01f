use super::{position, Geometry, Result};
use crate::ray::TransferMatrix;

/// Sample plane
///
/// The sample is a marker: it has no effect on the rays.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(crate) name: String,
    pub(crate) z: f64,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    x: f64,
    matrix: TransferMatrix,
}
impl Sample {
    /// Creates a sample of width `width` at `z`, centered on `x`
    pub fn new(z: f64, x: f64, width: f64) -> Result<Self> {
        Ok(Self {
            name: String::from("Sample"),
            z: position(z)?,
            geometry: Geometry {
                width,
                ..Default::default()
            },
            blocked_ray_idcs: Vec::new(),
            x: position(x)?,
            matrix: TransferMatrix::identity(),
        })
    }
    pub fn with_name(self, name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ..self
        }
    }
    pub fn z(&self) -> f64 {
        self.z
    }
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn width(&self) -> f64 {
        self.geometry.width
    }
    pub fn set_x(&mut self, x: f64) -> Result<()> {
        self.x = position(x)?;
        Ok(())
    }
    /// Identity matrix
    pub fn matrix(&self) -> &TransferMatrix {
        &self.matrix
    }
}
