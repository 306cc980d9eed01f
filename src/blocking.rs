//! Ray occlusion
//!
//! Apertures stop the rays outside their annulus.
//! The other components, the biprism included, never stop a ray: the biprism
//! only kicks the rays on either side of its wire in opposite directions.

use crate::{
    components::{Aperture, Component},
    ray::{Rays, X, Y},
};

/// Returns the indices, taken from `allowed`, of the rays stopped by `component`
///
/// `rays` is the ensemble at the plane of the component.
pub fn blocked_rays(component: &Component, rays: &Rays, allowed: &[usize]) -> Vec<usize> {
    match component {
        Component::Aperture(aperture) => aperture_blocks(aperture, rays, allowed),
        _ => Vec::new(),
    }
}

fn aperture_blocks(aperture: &Aperture, rays: &Rays, allowed: &[usize]) -> Vec<usize> {
    allowed
        .iter()
        .copied()
        .filter(|&i| !aperture.passes(rays[(X, i)], rays[(Y, i)]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{Biprism, Geometry, Lens, WireOrientation},
        ray::ray,
    };

    fn rays() -> Rays {
        Rays::from_columns(&[
            ray(0., 0., 0., 0.),
            ray(0.1, 0., 0., 0.),
            ray(0.3, 0., 0., 0.),
            ray(-0.004, 0., 0.2, 0.),
        ])
    }

    #[test]
    fn aperture_annulus() {
        let aperture: Component = Aperture::new(0.1, 0.05, 0.25).unwrap().into();
        assert_eq!(blocked_rays(&aperture, &rays(), &[0, 1, 2, 3]), vec![0, 2]);
    }

    #[test]
    fn only_allowed_rays_are_tested() {
        let aperture: Component = Aperture::new(0.1, 0.05, 0.25).unwrap().into();
        assert_eq!(blocked_rays(&aperture, &rays(), &[1, 2]), vec![2]);
        assert!(blocked_rays(&aperture, &rays(), &[]).is_empty());
    }

    #[test]
    fn biprism_blocks_nothing() {
        // rays on and next to the wire are kicked, not stopped
        let biprism: Component = Biprism::new(0.4, 0.1, WireOrientation::Zero)
            .unwrap()
            .with_geometry(Geometry {
                width: 0.5,
                ..Default::default()
            })
            .into();
        assert!(blocked_rays(&biprism, &rays(), &[0, 1, 2, 3]).is_empty());
    }

    #[test]
    fn lens_blocks_nothing() {
        let lens: Component = Lens::new(0.4, 0.1).unwrap().into();
        assert!(blocked_rays(&lens, &rays(), &[0, 1, 2, 3]).is_empty());
    }
}
