use super::{position, ComponentError, Geometry, Result};
use crate::ray::TransferMatrix;

fn radii(inner: f64, outer: f64) -> Result<(f64, f64)> {
    if inner >= 0f64 && inner <= outer && outer.is_finite() {
        Ok((inner, outer))
    } else {
        Err(ComponentError::ApertureRadii { inner, outer })
    }
}

/// Annular aperture
///
/// The aperture propagates the rays unchanged, the rays outside the annulus
/// `[radius_inner, radius_outer]` centered on `(x,y)` are blocked.
#[derive(Debug, Clone)]
pub struct Aperture {
    pub(crate) name: String,
    pub(crate) z: f64,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    x: f64,
    y: f64,
    radius_inner: f64,
    radius_outer: f64,
    matrix: TransferMatrix,
}
impl Aperture {
    /// Creates an aperture centered on the optic axis at `z`
    pub fn new(z: f64, radius_inner: f64, radius_outer: f64) -> Result<Self> {
        let (radius_inner, radius_outer) = radii(radius_inner, radius_outer)?;
        Ok(Self {
            name: String::from("Aperture"),
            z: position(z)?,
            geometry: Geometry::default(),
            blocked_ray_idcs: Vec::new(),
            x: 0f64,
            y: 0f64,
            radius_inner,
            radius_outer,
            matrix: TransferMatrix::identity(),
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
    /// Moves the aperture center to `(x,y)`
    pub fn with_center(self, x: f64, y: f64) -> Result<Self> {
        let mut this = self;
        this.set_center(x, y)?;
        Ok(this)
    }
    pub fn z(&self) -> f64 {
        self.z
    }
    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y)
    }
    pub fn radius_inner(&self) -> f64 {
        self.radius_inner
    }
    pub fn radius_outer(&self) -> f64 {
        self.radius_outer
    }
    pub fn set_center(&mut self, x: f64, y: f64) -> Result<()> {
        (self.x, self.y) = (position(x)?, position(y)?);
        Ok(())
    }
    pub fn set_radii(&mut self, radius_inner: f64, radius_outer: f64) -> Result<()> {
        (self.radius_inner, self.radius_outer) = radii(radius_inner, radius_outer)?;
        Ok(())
    }
    /// Identity matrix
    pub fn matrix(&self) -> &TransferMatrix {
        &self.matrix
    }
    /// Checks if a ray at `(x,y)` goes through the aperture
    pub fn passes(&self, x: f64, y: f64) -> bool {
        let r = (x - self.x).hypot(y - self.y);
        r >= self.radius_inner && r <= self.radius_outer
    }
}
