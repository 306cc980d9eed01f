//! Ray propagation through the column
//!
//! At each stop, the rays still travelling are drifted from the previous stop,
//! transformed by the transfer matrix of the component at that stop and
//! checked against the component occlusion rule.
//! The rays that are stopped keep the state they had at the plane of the
//! component that blocked them for the rest of the column.

use itertools::Itertools;

use crate::{
    blocking::blocked_rays,
    column::{Stop, StopKind},
    components::{Biprism, Component},
    ray::{drift, Ray, Rays, TransferMatrix, X, Y},
};

/// Ray states at every stop of the column
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    z: Vec<f64>,
    states: Vec<Rays>,
    allowed: Vec<Vec<usize>>,
}
impl Trajectory {
    fn with_capacity(n: usize) -> Self {
        Self {
            z: Vec::with_capacity(n),
            states: Vec::with_capacity(n),
            allowed: Vec::with_capacity(n),
        }
    }
    fn record(&mut self, z: f64, rays: &Rays, allowed: &[usize]) {
        self.z.push(z);
        self.states.push(rays.clone());
        self.allowed.push(allowed.to_vec());
    }
    /// Number of stops
    pub fn len(&self) -> usize {
        self.z.len()
    }
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
    pub fn num_rays(&self) -> usize {
        self.states.first().map_or(0, |rays| rays.ncols())
    }
    /// Axial positions of the stops
    pub fn z(&self) -> &[f64] {
        &self.z
    }
    /// Ray ensemble at a stop
    pub fn state(&self, stop: usize) -> &Rays {
        &self.states[stop]
    }
    /// Ray states at every stop
    pub fn states(&self) -> &[Rays] {
        &self.states
    }
    /// State of one ray at a stop
    pub fn ray(&self, stop: usize, idx: usize) -> Ray {
        self.states[stop].column(idx).into_owned()
    }
    /// x coordinates of all the rays at a stop
    pub fn x(&self, stop: usize) -> Vec<f64> {
        self.states[stop].row(X).iter().copied().collect()
    }
    /// y coordinates of all the rays at a stop
    pub fn y(&self, stop: usize) -> Vec<f64> {
        self.states[stop].row(Y).iter().copied().collect()
    }
    /// Indices of the rays that went through the component at a stop, in increasing order
    pub fn allowed(&self, stop: usize) -> &[usize] {
        &self.allowed[stop]
    }
    /// Bounds of the contiguous ranges of allowed rays at a stop
    ///
    /// The bounds come in pairs `[first_0, last_0, first_1, last_1, ...]`.
    pub fn edge_rays(&self, stop: usize) -> Vec<usize> {
        let allowed = &self.allowed[stop];
        let (Some(&first), Some(&last)) = (allowed.first(), allowed.last()) else {
            return Vec::new();
        };
        let mut edges = vec![first];
        for (&a, &b) in allowed.iter().tuple_windows() {
            if b - a != 1 {
                edges.extend([a, b]);
            }
        }
        edges.push(last);
        edges
    }
    /// Checks if all the rays are blocked before reaching the detector
    pub fn all_blocked(&self) -> bool {
        self.allowed.last().map_or(true, |allowed| allowed.is_empty())
    }
    /// Index and (x,y) coordinates of the rays reaching the detector
    pub fn detector_positions(&self) -> Vec<(usize, f64, f64)> {
        match (self.states.last(), self.allowed.last()) {
            (Some(rays), Some(allowed)) => allowed
                .iter()
                .map(|&i| (i, rays[(X, i)], rays[(Y, i)]))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Applies `matrix` to the `allowed` rays
fn transfer(rays: &mut Rays, matrix: &TransferMatrix, allowed: &[usize]) {
    let next = matrix * &*rays;
    for &i in allowed {
        rays.set_column(i, &next.column(i));
    }
}

/// Applies the biprism kick to the `allowed` rays, signed by the side of the wire each ray is on
fn biprism_transfer(rays: &mut Rays, biprism: &Biprism, allowed: &[usize]) {
    let axis = biprism.orientation().sign_axis();
    for &i in allowed {
        let matrix = biprism.signed_operator(Biprism::kick_sign(rays[(axis, i)]));
        let next = matrix * rays.column(i);
        rays.set_column(i, &next);
    }
}

/// Propagates the rays through the column stops
///
/// The first stop is the plane of the initial ray ensemble `rays`.
/// The blocked ray indices of all the components are reset and then filled
/// with the rays each component stops.
pub fn propagate(stops: &[Stop], components: &mut [Component], rays: Rays) -> Trajectory {
    components.iter_mut().for_each(Component::clear_blocked);
    let mut rays = rays;
    let mut allowed: Vec<usize> = (0..rays.ncols()).collect();
    let mut trajectory = Trajectory::with_capacity(stops.len());
    let Some(first) = stops.first() else {
        return trajectory;
    };
    trajectory.record(first.z, &rays, &allowed);
    for (previous, stop) in stops.iter().tuple_windows() {
        transfer(&mut rays, &drift(previous.z - stop.z), &allowed);
        if let StopKind::Component { index, plane } = stop.kind {
            let component = &mut components[index];
            match &*component {
                Component::Biprism(biprism) => biprism_transfer(&mut rays, biprism, &allowed),
                _ => transfer(&mut rays, &component.plane_operator(plane), &allowed),
            }
            let blocked = blocked_rays(component, &rays, &allowed);
            if !blocked.is_empty() {
                log::debug!(
                    "{} blocked {} rays at z={:.4}",
                    component,
                    blocked.len(),
                    stop.z
                );
                allowed.retain(|i| blocked.binary_search(i).is_err());
                component.extend_blocked(&blocked);
            }
        }
        log::debug!("z={:.4}: {} rays", stop.z, allowed.len());
        trajectory.record(stop.z, &rays, &allowed);
    }
    if allowed.is_empty() {
        log::warn!("all the rays are blocked before reaching the detector");
    }
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        beam::{Beam, BeamType},
        column::assemble,
        components::{Aperture, Lens, WireOrientation},
        ray::{ray, SLOPE_X, SLOPE_Y},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::error::Error;

    type Result = std::result::Result<(), Box<dyn Error>>;

    #[test]
    fn free_space() -> Result {
        let stops = assemble(&[], 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 8, 0.03)?.generate();
        let trajectory = propagate(&stops, &mut [], rays.clone());
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.state(1), &(drift(1.5) * rays));
        assert_eq!(trajectory.allowed(1), &[0, 1, 2, 3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn lens_focuses_point_source() -> Result {
        let mut components: Vec<Component> = vec![Lens::new(1., 0.25)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 9, 0.03)?.generate();
        let trajectory = propagate(&stops, &mut components, rays);
        // 1/0.5 + 1/v = 1/0.25 => image at v=0.5, ie z=0.5
        let image = drift(0.5) * trajectory.state(1);
        assert!(image.row(X).iter().all(|x| x.abs() < 1e-12), "{image}");
        Ok(())
    }

    #[test]
    fn biprism_antisymmetric_kicks() -> Result {
        let mut components: Vec<Component> =
            vec![Biprism::new(0.4, 0.5, WireOrientation::Zero)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Rays::from_columns(&[ray(0.1, 0., 0., 0.), ray(-0.1, 0., 0., 0.)]);
        let trajectory = propagate(&stops, &mut components, rays.clone());
        let kicks = trajectory.state(1) - rays;
        assert_eq!(kicks[(SLOPE_Y, 0)], 0.5);
        assert_eq!(kicks[(SLOPE_Y, 1)], -0.5);
        assert_eq!(kicks[(SLOPE_X, 0)], -kicks[(SLOPE_X, 1)]);
        Ok(())
    }

    #[test]
    fn rotated_biprism_kicks_along_x() -> Result {
        let mut components: Vec<Component> =
            vec![Biprism::new(0.4, 0.2, WireOrientation::HalfPi)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::YAxial, 1.5, 5, 0.1)?.generate();
        let trajectory = propagate(&stops, &mut components, rays.clone());
        let kicks = trajectory.state(1) - rays;
        // y: -0.1, -0.05, 0, 0.05, 0.1
        for (i, sign) in [-1., -1., 1., 1., 1.].into_iter().enumerate() {
            assert!((kicks[(SLOPE_X, i)] - sign * 0.2).abs() < 1e-15, "{kicks}");
            assert!(kicks[(SLOPE_Y, i)].abs() < 1e-15, "{kicks}");
        }
        assert_eq!(trajectory.allowed(2).len(), 5);
        Ok(())
    }

    #[test]
    fn on_axis_ray_crosses_biprism() -> Result {
        let mut components: Vec<Component> =
            vec![Biprism::new(0.4, 0.5, WireOrientation::Zero)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 33, 0.03)?.generate();
        assert_eq!(rays[(SLOPE_X, 16)], 0.);
        let trajectory = propagate(&stops, &mut components, rays);
        assert!(components[0].blocked_ray_idcs().is_empty());
        assert_eq!(trajectory.allowed(2), (0..33).collect::<Vec<_>>().as_slice());
        let detector = trajectory.state(2);
        assert_eq!(detector[(SLOPE_Y, 16)], 0.5);
        assert!((detector[(Y, 16)] - 0.2).abs() < 1e-12);
        assert!((0..16).all(|i| detector[(SLOPE_Y, i)] == -0.5));
        assert!((17..33).all(|i| detector[(SLOPE_Y, i)] == 0.5));
        Ok(())
    }

    #[test]
    fn blocked_rays_are_frozen() -> Result {
        let mut components: Vec<Component> = vec![
            Aperture::new(0.5, 0., 0.01)?.into(),
            Lens::new(0.3, 0.2)?.into(),
        ];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 11, 0.03)?.generate();
        let trajectory = propagate(&stops, &mut components, rays);
        let blocked = components[0].blocked_ray_idcs().to_vec();
        assert!(!blocked.is_empty());
        for &i in &blocked {
            let at_aperture = trajectory.ray(1, i);
            for stop in 2..trajectory.len() {
                assert_eq!(trajectory.ray(stop, i), at_aperture);
            }
        }
        assert!(trajectory.states().iter().all(|s| s.iter().all(|v| v.is_finite())));
        Ok(())
    }

    #[test]
    fn all_blocked() -> Result {
        let mut components: Vec<Component> = vec![Aperture::new(0.5, 0.5, 0.6)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 4, 0.03)?.generate();
        let trajectory = propagate(&stops, &mut components, rays);
        assert!(trajectory.all_blocked());
        assert!(trajectory.detector_positions().is_empty());
        assert!(trajectory.edge_rays(2).is_empty());
        assert_eq!(trajectory.num_rays(), 4);
        Ok(())
    }

    #[test]
    fn edge_rays_of_obstructed_beam() -> Result {
        let mut components: Vec<Component> = vec![Aperture::new(0.5, 0.01, 1.)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 11, 0.03)?.generate();
        let trajectory = propagate(&stops, &mut components, rays);
        // slopes: -0.03, -0.024, ..., 0.03 ; |x| at z=0.5 below 0.01 for |slope| < 0.01
        assert_eq!(components[0].blocked_ray_idcs(), &[4, 5, 6]);
        assert_eq!(trajectory.edge_rays(0), vec![0, 10]);
        assert_eq!(trajectory.edge_rays(1), vec![0, 3, 7, 10]);
        Ok(())
    }

    #[test]
    fn monotonic_blocking() -> Result {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut components: Vec<Component> = (0..4)
                .map(|k| {
                    let outer = rng.gen_range(0.005..0.05);
                    let inner = rng.gen_range(0.0..0.5) * outer;
                    let x = rng.gen_range(-0.01..0.01);
                    Aperture::new(1.2 - 0.25 * k as f64, inner, outer)
                        .and_then(|a| a.with_center(x, 0.))
                        .map(Component::from)
                })
                .collect::<std::result::Result<_, _>>()?;
            let stops = assemble(&components, 1.5, 0.)?;
            let rays = Beam::new(BeamType::Cone, 1.5, 64, 0.05)?.generate();
            let trajectory = propagate(&stops, &mut components, rays);
            for k in 1..trajectory.len() {
                let previous = trajectory.allowed(k - 1);
                assert!(trajectory
                    .allowed(k)
                    .iter()
                    .all(|i| previous.binary_search(i).is_ok()));
            }
            let blocked: usize = components.iter().map(|c| c.blocked_ray_idcs().len()).sum();
            assert_eq!(blocked + trajectory.allowed(trajectory.len() - 1).len(), 64);
        }
        Ok(())
    }

    #[test]
    fn reset_between_runs() -> Result {
        let mut components: Vec<Component> = vec![Aperture::new(0.5, 0., 0.01)?.into()];
        let stops = assemble(&components, 1.5, 0.)?;
        let rays = Beam::new(BeamType::Point, 1.5, 11, 0.03)?.generate();
        let first = propagate(&stops, &mut components, rays.clone());
        let blocked = components[0].blocked_ray_idcs().to_vec();
        let second = propagate(&stops, &mut components, rays);
        assert_eq!(first, second);
        assert_eq!(components[0].blocked_ray_idcs(), blocked.as_slice());
        Ok(())
    }
}
