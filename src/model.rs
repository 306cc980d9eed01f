//! Microscope model
//!
//! A [Model] holds the column components and the electron beam.
//! Each call to [Model::step] regenerates the beam, reassembles the column
//! and propagates the rays from the beam plane to the detector.

use crate::{
    beam::{Beam, BeamType},
    column::{assemble, Stop},
    components::Component,
    error::Result,
    stepper::{propagate, Trajectory},
};

/// [Model] builder
///
/// Defaults: point source at z=1.5 with 32 rays and a semi-angle of 0.03,
/// detector of size 0.5 at z=0.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    components: Vec<Component>,
    beam_z: f64,
    beam_type: BeamType,
    num_rays: usize,
    beam_semi_angle: f64,
    detector_z: f64,
    detector_size: f64,
}
impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            beam_z: 1.5,
            beam_type: BeamType::Point,
            num_rays: 32,
            beam_semi_angle: 0.03,
            detector_z: 0f64,
            detector_size: 0.5,
        }
    }
}
impl ModelBuilder {
    pub fn components(self, components: Vec<Component>) -> Self {
        Self { components, ..self }
    }
    pub fn beam_z(self, beam_z: f64) -> Self {
        Self { beam_z, ..self }
    }
    pub fn beam_type(self, beam_type: BeamType) -> Self {
        Self { beam_type, ..self }
    }
    pub fn num_rays(self, num_rays: usize) -> Self {
        Self { num_rays, ..self }
    }
    /// Semi-angle of a point source or radius of a parallel beam
    pub fn beam_semi_angle(self, beam_semi_angle: f64) -> Self {
        Self {
            beam_semi_angle,
            ..self
        }
    }
    pub fn detector_z(self, detector_z: f64) -> Self {
        Self { detector_z, ..self }
    }
    pub fn detector_size(self, detector_size: f64) -> Self {
        Self {
            detector_size,
            ..self
        }
    }
    /// Validates the beam and the column and returns the [Model]
    pub fn build(self) -> Result<Model> {
        let beam = Beam::new(
            self.beam_type,
            self.beam_z,
            self.num_rays,
            self.beam_semi_angle,
        )?;
        let stops = assemble(&self.components, beam.z(), self.detector_z)?;
        log::info!(
            "{} through {} components ({} stops)",
            beam,
            self.components.len(),
            stops.len()
        );
        Ok(Model {
            components: self.components,
            stops,
            beam,
            detector_z: self.detector_z,
            detector_size: self.detector_size,
        })
    }
}

/// Electron microscope column model
#[derive(Debug, Clone)]
pub struct Model {
    components: Vec<Component>,
    stops: Vec<Stop>,
    beam: Beam,
    detector_z: f64,
    detector_size: f64,
}
impl Model {
    pub fn builder(components: Vec<Component>) -> ModelBuilder {
        ModelBuilder::default().components(components)
    }
    /// Components in the order they were given
    pub fn components(&self) -> &[Component] {
        &self.components
    }
    /// Mutable access to a component parameters
    ///
    /// The axial position of a component is fixed: moving it means replacing
    /// the component with a new one built at the new position, which is
    /// checked against the other stops at the next [Model::step].
    pub fn component_mut(&mut self, index: usize) -> Option<&mut Component> {
        self.components.get_mut(index)
    }
    /// Axial positions of the stops, from the beam to the detector
    pub fn z_positions(&self) -> Vec<f64> {
        self.stops.iter().map(|stop| stop.z).collect()
    }
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }
    pub fn beam(&self) -> &Beam {
        &self.beam
    }
    pub fn num_rays(&self) -> usize {
        self.beam.num_rays()
    }
    pub fn beam_z(&self) -> f64 {
        self.beam.z()
    }
    pub fn beam_type(&self) -> BeamType {
        self.beam.beam_type()
    }
    pub fn detector_z(&self) -> f64 {
        self.detector_z
    }
    pub fn detector_size(&self) -> f64 {
        self.detector_size
    }
    /// Propagates a new ray ensemble through the column
    ///
    /// The blocked ray indices of the components are overwritten.
    pub fn step(&mut self) -> Result<Trajectory> {
        self.stops = assemble(&self.components, self.beam.z(), self.detector_z)?;
        let trajectory = propagate(&self.stops, &mut self.components, self.beam.generate());
        Ok(trajectory)
    }
}

/// Builds a [Model] of the column `components` with a beam of `num_rays` rays
///
/// `beam_semi_angle` is the semi-angle of a point source or the radius of a parallel beam.
pub fn run(
    components: Vec<Component>,
    beam_z: f64,
    beam_type: BeamType,
    num_rays: usize,
    beam_semi_angle: f64,
) -> Result<Model> {
    Model::builder(components)
        .beam_z(beam_z)
        .beam_type(beam_type)
        .num_rays(num_rays)
        .beam_semi_angle(beam_semi_angle)
        .build()
}
