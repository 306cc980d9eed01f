//! # TEMGym Lite
//!
//! First-order ray tracing of an electron beam through the column of a
//! transmission electron microscope.
//!
//! The column components (lenses, deflectors, biprisms, apertures, ...) are
//! represented by 5×5 ray transfer matrices acting on the homogeneous ray
//! state `[x, θx, y, θy, 1]`.
//! A [Model] propagates an ensemble of rays from the electron gun to the
//! detector and records the state of every ray at every component plane.
//!
//! ```no_run
//! use temgym_lite::{components::{Aperture, Lens}, run, BeamType, Component};
//!
//! # fn main() -> temgym_lite::Result<()> {
//! let components: Vec<Component> = vec![
//!     Lens::new(1.0, 0.5)?.with_name("Lens").into(),
//!     Aperture::new(0.1, 0.05, 0.25)?.into(),
//! ];
//! let mut model = run(components, 1.5, BeamType::Point, 32, 0.03)?;
//! let trajectory = model.step()?;
//! println!("{:?}", trajectory.detector_positions());
//! # Ok(())
//! # }
//! ```

pub mod beam;
pub mod blocking;
pub mod column;
pub mod components;
mod error;
pub mod model;
pub mod ray;
pub mod shapes;
pub mod stepper;

pub use beam::{Beam, BeamType};
pub use components::{Component, ComponentKind};
pub use error::{Error, Result};
pub use model::{run, Model, ModelBuilder};
pub use stepper::Trajectory;

/// `n` evenly spaced values from `start` to `end` included
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0f64
    };
    (0..n).map(move |k| start + k as f64 * step)
}
