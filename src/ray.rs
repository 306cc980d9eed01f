//! Ray states and the elementary ray transfer matrices
//!
//! A ray is the homogeneous column vector `[x, θx, y, θy, 1]`.
//! An ensemble of N rays is stored column-wise in a 5×N matrix so that a
//! transfer matrix is applied to every ray with a single matrix product.

use nalgebra::{Matrix5, Matrix5xX, Vector5};

/// Ray state `[x, θx, y, θy, 1]`
pub type Ray = Vector5<f64>;
/// Ray ensemble, one ray per column
pub type Rays = Matrix5xX<f64>;
/// 5×5 ray transfer matrix
pub type TransferMatrix = Matrix5<f64>;

/// Row of the x coordinate
pub const X: usize = 0;
/// Row of the x slope
pub const SLOPE_X: usize = 1;
/// Row of the y coordinate
pub const Y: usize = 2;
/// Row of the y slope
pub const SLOPE_Y: usize = 3;
/// Row of the homogeneous constant
pub const HOMOGENEOUS: usize = 4;

/// Returns the ray at `(x,y)` with slopes `(slope_x,slope_y)`
pub fn ray(x: f64, slope_x: f64, y: f64, slope_y: f64) -> Ray {
    Ray::new(x, slope_x, y, slope_y, 1f64)
}

/// Free space propagation over the axial distance `distance`
pub fn drift(distance: f64) -> TransferMatrix {
    let mut matrix = TransferMatrix::identity();
    matrix[(X, SLOPE_X)] = distance;
    matrix[(Y, SLOPE_Y)] = distance;
    matrix
}

/// Constant slope kick `(def_x,def_y)`
pub fn deflection(def_x: f64, def_y: f64) -> TransferMatrix {
    let mut matrix = TransferMatrix::identity();
    matrix[(SLOPE_X, HOMOGENEOUS)] = def_x;
    matrix[(SLOPE_Y, HOMOGENEOUS)] = def_y;
    matrix
}

/// Rotation of the ray (x,y) coordinates about the optic axis by `angle` degree
///
/// The slopes and the homogeneous constant are left untouched.
pub fn rotation(angle: f64) -> TransferMatrix {
    let (s, c) = angle.to_radians().sin_cos();
    let mut matrix = TransferMatrix::identity();
    matrix[(X, X)] = c;
    matrix[(X, Y)] = -s;
    matrix[(Y, X)] = s;
    matrix[(Y, Y)] = c;
    matrix
}

/// Checks that the last row of the matrix is `[0,0,0,0,1]`
pub fn is_homogeneous(matrix: &TransferMatrix) -> bool {
    matrix
        .row(HOMOGENEOUS)
        .iter()
        .take(HOMOGENEOUS)
        .all(|&v| v == 0f64)
        && matrix[(HOMOGENEOUS, HOMOGENEOUS)] == 1f64
}

/// Checks that all the matrix entries are finite
pub fn is_finite(matrix: &TransferMatrix) -> bool {
    matrix.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn drift_shears_positions() {
        let r = drift(0.5) * ray(0.1, 0.2, -0.1, -0.4);
        assert!((r[X] - 0.2).abs() < EPS, "x: {}", r[X]);
        assert!((r[Y] + 0.3).abs() < EPS, "y: {}", r[Y]);
        assert_eq!(r[SLOPE_X], 0.2);
        assert_eq!(r[SLOPE_Y], -0.4);
        assert_eq!(r[HOMOGENEOUS], 1f64);
    }

    #[test]
    fn deflection_kicks_slopes() {
        let r = deflection(0.01, -0.02) * ray(0.3, 0., 0.3, 0.);
        assert_eq!(r[X], 0.3);
        assert_eq!(r[SLOPE_X], 0.01);
        assert_eq!(r[SLOPE_Y], -0.02);
    }

    #[test]
    fn quarter_turn_rotation() {
        let r = rotation(90.) * ray(1., 0.3, 0., -0.2);
        assert!(r[X].abs() < EPS, "x: {}", r[X]);
        assert!((r[Y] - 1.).abs() < EPS, "y: {}", r[Y]);
        assert_eq!(r[SLOPE_X], 0.3);
        assert_eq!(r[SLOPE_Y], -0.2);
    }

    #[test]
    fn elementary_matrices_are_homogeneous() {
        for m in [drift(1.2), deflection(0.3, 0.1), rotation(33.)] {
            assert!(is_homogeneous(&m), "{m}");
            assert!(is_finite(&m), "{m}");
        }
        let mut m = TransferMatrix::identity();
        m[(HOMOGENEOUS, X)] = 1e-3;
        assert!(!is_homogeneous(&m));
    }
}
