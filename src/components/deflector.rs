use super::{finite, position, ComponentError, ComponentKind, Geometry, Result};
use crate::ray::{deflection, drift, rotation, TransferMatrix};

/// Single deflector
#[derive(Debug, Clone)]
pub struct Deflector {
    pub(crate) name: String,
    pub(crate) z: f64,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    defx: f64,
    defy: f64,
    matrix: TransferMatrix,
}
impl Deflector {
    /// Creates a deflector at `z` with the slope kicks `defx` and `defy`
    pub fn new(z: f64, defx: f64, defy: f64) -> Result<Self> {
        Ok(Self {
            name: String::new(),
            z: position(z)?,
            geometry: Geometry::default(),
            blocked_ray_idcs: Vec::new(),
            defx,
            defy,
            matrix: finite(ComponentKind::Deflector, deflection(defx, defy))?,
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
    /// Slope kicks along x and y
    pub fn deflection(&self) -> (f64, f64) {
        (self.defx, self.defy)
    }
    pub fn set_deflection(&mut self, defx: f64, defy: f64) -> Result<()> {
        self.matrix = finite(ComponentKind::Deflector, deflection(defx, defy))?;
        self.defx = defx;
        self.defy = defy;
        Ok(())
    }
    pub fn matrix(&self) -> &TransferMatrix {
        &self.matrix
    }
}

/// Pair of deflectors at 2 different axial positions
///
/// The kick of the lower deflector is followed by the scan rotation of the
/// ray coordinates.
/// When the upper kick is set with [DoubleDeflector::set_up_deflection], the
/// lower kick follows as `ratio * upper kick`.
/// The default ratio of -1 cancels the net slope and shifts the beam.
#[derive(Debug, Clone)]
pub struct DoubleDeflector {
    pub(crate) name: String,
    pub(crate) geometry: Geometry,
    pub(crate) blocked_ray_idcs: Vec<usize>,
    z_up: f64,
    z_low: f64,
    updef: (f64, f64),
    lowdef: (f64, f64),
    defratio: (f64, f64),
    scan_rotation: f64,
    up_matrix: TransferMatrix,
    low_matrix: TransferMatrix,
}

fn deflector_matrices(
    updef: (f64, f64),
    lowdef: (f64, f64),
    scan_rotation: f64,
) -> Result<(TransferMatrix, TransferMatrix)> {
    let up = deflection(updef.0, updef.1);
    let low = rotation(scan_rotation) * deflection(lowdef.0, lowdef.1);
    Ok((
        finite(ComponentKind::DoubleDeflector, up)?,
        finite(ComponentKind::DoubleDeflector, low)?,
    ))
}

impl DoubleDeflector {
    /// Creates a double deflector with planes at `z_up` and `z_low` and no deflection
    pub fn new(z_up: f64, z_low: f64) -> Result<Self> {
        let (z_up, z_low) = (position(z_up)?, position(z_low)?);
        if z_up <= z_low {
            return Err(ComponentError::DeflectorPlanes { z_up, z_low });
        }
        Ok(Self {
            name: String::new(),
            geometry: Geometry::default(),
            blocked_ray_idcs: Vec::new(),
            z_up,
            z_low,
            updef: (0f64, 0f64),
            lowdef: (0f64, 0f64),
            defratio: (-1f64, -1f64),
            scan_rotation: 0f64,
            up_matrix: TransferMatrix::identity(),
            low_matrix: TransferMatrix::identity(),
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
    pub fn z_up(&self) -> f64 {
        self.z_up
    }
    pub fn z_low(&self) -> f64 {
        self.z_low
    }
    /// Axial distance between the 2 deflectors
    pub fn dist(&self) -> f64 {
        self.z_up - self.z_low
    }
    /// Upper deflector slope kicks
    pub fn up_deflection(&self) -> (f64, f64) {
        self.updef
    }
    /// Lower deflector slope kicks
    pub fn low_deflection(&self) -> (f64, f64) {
        self.lowdef
    }
    /// Lower to upper kick ratios along x and y
    pub fn deflection_ratio(&self) -> (f64, f64) {
        self.defratio
    }
    /// Scan rotation in degree
    pub fn scan_rotation(&self) -> f64 {
        self.scan_rotation
    }
    fn update(&mut self, updef: (f64, f64), lowdef: (f64, f64), scan_rotation: f64) -> Result<()> {
        let (up_matrix, low_matrix) = deflector_matrices(updef, lowdef, scan_rotation)?;
        self.up_matrix = up_matrix;
        self.low_matrix = low_matrix;
        self.updef = updef;
        self.lowdef = lowdef;
        self.scan_rotation = scan_rotation;
        Ok(())
    }
    /// Sets the upper kicks, the lower kicks are set to the upper kicks times the deflection ratios
    pub fn set_up_deflection(&mut self, defx: f64, defy: f64) -> Result<()> {
        let lowdef = (self.defratio.0 * defx, self.defratio.1 * defy);
        self.update((defx, defy), lowdef, self.scan_rotation)
    }
    /// Sets the lower kicks independently of the upper kicks
    pub fn set_low_deflection(&mut self, defx: f64, defy: f64) -> Result<()> {
        self.update(self.updef, (defx, defy), self.scan_rotation)
    }
    /// Sets the deflection ratios and couples the lower kicks to the upper kicks
    pub fn set_deflection_ratio(&mut self, ratiox: f64, ratioy: f64) -> Result<()> {
        let lowdef = (ratiox * self.updef.0, ratioy * self.updef.1);
        self.update(self.updef, lowdef, self.scan_rotation)?;
        self.defratio = (ratiox, ratioy);
        Ok(())
    }
    pub fn set_scan_rotation(&mut self, scan_rotation: f64) -> Result<()> {
        self.update(self.updef, self.lowdef, scan_rotation)
    }
    /// Deflection ratio that makes the beam pivot about the plane at `z_pivot`
    ///
    /// The pivot is exact without scan rotation.
    pub fn pivot_ratio(&self, z_pivot: f64) -> Result<f64> {
        let l = self.z_low - z_pivot;
        if l == 0f64 || !l.is_finite() {
            return Err(ComponentError::Pivot(z_pivot));
        }
        Ok(-(self.z_up - z_pivot) / l)
    }
    /// Retargets the deflection ratios so that the beam pivots about the plane at `z_pivot`
    pub fn retarget(&mut self, z_pivot: f64) -> Result<()> {
        let ratio = self.pivot_ratio(z_pivot)?;
        self.set_deflection_ratio(ratio, ratio)
    }
    pub fn up_matrix(&self) -> &TransferMatrix {
        &self.up_matrix
    }
    pub fn low_matrix(&self) -> &TransferMatrix {
        &self.low_matrix
    }
    /// Transfer matrix from the upper plane to the lower plane
    pub fn transfer_operator(&self) -> TransferMatrix {
        self.low_matrix * drift(self.dist()) * self.up_matrix
    }
}
