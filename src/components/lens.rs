use std::ops::{Deref, DerefMut};

use super::{finite, position, ComponentError, ComponentKind, Geometry, Result};
use crate::ray::{TransferMatrix, SLOPE_X, SLOPE_Y, X, Y};

/// Thin lens transfer matrix with focal lengths `fx` and `fy`
///
/// An infinite focal length gives the identity along that axis.
pub(crate) fn thin_lens(fx: f64, fy: f64) -> Result<TransferMatrix> {
    if let Some(&f) = [fx, fy].iter().find(|f| **f == 0f64 || f.is_nan()) {
        return Err(ComponentError::FocalLength(f));
    }
    let mut matrix = TransferMatrix::identity();
    matrix[(SLOPE_X, X)] = -fx.recip();
    matrix[(SLOPE_Y, Y)] = -fy.recip();
    Ok(matrix)
}

/// Round magnetic lens
#[derive(Debug, Clone)]
pub struct Lens {
    pub(crate) name: String,
    pub(crate) z: f64,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    f: f64,
    matrix: TransferMatrix,
}
impl Lens {
    /// Creates a lens at `z` with focal length `f`
    pub fn new(z: f64, f: f64) -> Result<Self> {
        Ok(Self {
            name: String::new(),
            z: position(z)?,
            geometry: Geometry::default(),
            blocked_ray_idcs: Vec::new(),
            f,
            matrix: finite(ComponentKind::Lens, thin_lens(f, f)?)?,
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
    /// Focal length
    pub fn f(&self) -> f64 {
        self.f
    }
    /// Sets the focal length
    pub fn set_f(&mut self, f: f64) -> Result<()> {
        self.matrix = finite(ComponentKind::Lens, thin_lens(f, f)?)?;
        self.f = f;
        Ok(())
    }
    pub fn matrix(&self) -> &TransferMatrix {
        &self.matrix
    }
}

/// Lens with different focal lengths along x and y
#[derive(Debug, Clone)]
pub struct AstigmaticLens {
    pub(crate) name: String,
    pub(crate) z: f64,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    fx: f64,
    fy: f64,
    matrix: TransferMatrix,
}
impl AstigmaticLens {
    /// Creates an astigmatic lens at `z` with focal lengths `fx` and `fy`
    pub fn new(z: f64, fx: f64, fy: f64) -> Result<Self> {
        Ok(Self {
            name: String::new(),
            z: position(z)?,
            geometry: Geometry::default(),
            blocked_ray_idcs: Vec::new(),
            fx,
            fy,
            matrix: finite(ComponentKind::AstigmaticLens, thin_lens(fx, fy)?)?,
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
    /// Focal lengths along x and y
    pub fn focal_lengths(&self) -> (f64, f64) {
        (self.fx, self.fy)
    }
    /// Sets the focal lengths along x and y
    pub fn set_focal_lengths(&mut self, fx: f64, fy: f64) -> Result<()> {
        self.matrix = finite(ComponentKind::AstigmaticLens, thin_lens(fx, fy)?)?;
        self.fx = fx;
        self.fy = fy;
        Ok(())
    }
    pub fn set_fx(&mut self, fx: f64) -> Result<()> {
        self.set_focal_lengths(fx, self.fy)
    }
    pub fn set_fy(&mut self, fy: f64) -> Result<()> {
        self.set_focal_lengths(self.fx, fy)
    }
    pub fn matrix(&self) -> &TransferMatrix {
        &self.matrix
    }
}

/// Quadrupole lens
///
/// Optically identical to [AstigmaticLens], it is kept as a separate type for
/// labeling and rendering.
#[derive(Debug, Clone)]
pub struct Quadrupole(AstigmaticLens);
impl Quadrupole {
    /// Creates a quadrupole at `z` with focal lengths `fx` and `fy`
    pub fn new(z: f64, fx: f64, fy: f64) -> Result<Self> {
        AstigmaticLens::new(z, fx, fy).map(Self)
    }
    pub fn with_name(self, name: impl ToString) -> Self {
        Self(self.0.with_name(name))
    }
    pub fn with_geometry(self, geometry: Geometry) -> Self {
        Self(self.0.with_geometry(geometry))
    }
}
impl Deref for Quadrupole {
    type Target = AstigmaticLens;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for Quadrupole {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray::ray;

    #[test]
    fn zero_focal_length() {
        assert!(matches!(
            Lens::new(1., 0.),
            Err(ComponentError::FocalLength(f)) if f == 0.
        ));
        assert!(AstigmaticLens::new(1., 0.5, 0.).is_err());
        assert!(Quadrupole::new(1., f64::NAN, 0.5).is_err());
    }

    #[test]
    fn lens_focuses_parallel_rays() {
        let lens = Lens::new(1., 0.5).unwrap();
        let r = lens.matrix() * ray(0.1, 0., -0.2, 0.);
        assert!((r[SLOPE_X] + 0.2).abs() < 1e-12, "{r}");
        assert!((r[SLOPE_Y] - 0.4).abs() < 1e-12, "{r}");
        assert_eq!(r[X], 0.1);
    }

    #[test]
    fn failed_update_keeps_previous_state() {
        let mut lens = Lens::new(1., 0.5).unwrap();
        let before = *lens.matrix();
        assert!(lens.set_f(0.).is_err());
        assert_eq!(lens.f(), 0.5);
        assert_eq!(*lens.matrix(), before);
    }

    #[test]
    fn updates_recompute_matrix() {
        let mut lens = Lens::new(1., 0.5).unwrap();
        lens.set_f(0.25).unwrap();
        assert_eq!(lens.matrix()[(SLOPE_X, X)], -4.);
        let mut quad = Quadrupole::new(0.9, 0.5, -0.5).unwrap();
        quad.set_fy(0.1).unwrap();
        assert_eq!(quad.focal_lengths(), (0.5, 0.1));
        assert!((quad.matrix()[(SLOPE_Y, Y)] + 10.).abs() < 1e-12);
        assert_eq!(quad.matrix()[(SLOPE_X, X)], -2.);
    }
}
