//! Wire models of the components
//!
//! Every shape is a polyline of `[x,y,z]` points in the plane of the component.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::linspace;

/// Half angular width of a deflector arc
pub const DEFLECTOR_ARC: f64 = FRAC_PI_2;
/// Half angular width of a quadrupole arc
pub const QUADRUPOLE_ARC: f64 = FRAC_PI_4;

fn arc(r: f64, z: f64, angles: impl Iterator<Item = f64>) -> Vec<[f64; 3]> {
    angles
        .map(|theta| {
            let (s, c) = theta.sin_cos();
            [r * c, r * s, z]
        })
        .collect()
}

/// Circle of radius `r` centered on the optic axis
pub fn lens(r: f64, z: f64, n_arc: usize) -> Vec<[f64; 3]> {
    circle(r, 0f64, 0f64, z, n_arc)
}

/// Circle of radius `r` centered on `(x,y)`
pub fn circle(r: f64, x: f64, y: f64, z: f64, n_arc: usize) -> Vec<[f64; 3]> {
    arc(r, z, linspace(0f64, 2f64 * PI, n_arc))
        .into_iter()
        .map(|[px, py, pz]| [px + x, py + y, pz])
        .collect()
}

/// 2 opposite arcs of half width `phi`
pub fn deflector(r: f64, phi: f64, z: f64, n_arc: usize) -> [Vec<[f64; 3]>; 2] {
    [
        arc(r, z, linspace(-phi, phi, n_arc)),
        arc(r, z, linspace(-phi, phi, n_arc).map(|theta| theta + PI)),
    ]
}

/// 4 arcs of half width `phi` at right angle from each other
pub fn quadrupole(r: f64, phi: f64, z: f64, n_arc: usize) -> [Vec<[f64; 3]>; 4] {
    let quadrant = |k: usize| {
        let offset = k as f64 * FRAC_PI_2;
        arc(r, z, linspace(-phi, phi, n_arc).map(move |theta| theta + offset))
    };
    [quadrant(0), quadrant(2), quadrant(1), quadrant(3)]
}

/// Wire of half length `r` at angle `theta`
pub fn biprism(r: f64, z: f64, theta: f64) -> Vec<[f64; 3]> {
    arc(r, z, [theta, theta + PI].into_iter())
}
