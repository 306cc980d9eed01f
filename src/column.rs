//! Column assembly
//!
//! The column is the ordered sequence of axial stops the rays are propagated
//! to: the beam plane, the plane(s) of every component sorted by decreasing
//! `z`, and the detector plane.

use itertools::Itertools;

use crate::components::{Component, Plane};

#[derive(thiserror::Error, Debug)]
pub enum ColumnError {
    #[error("the beam plane z={beam_z} must lie above the detector plane z={detector_z}")]
    Inverted { beam_z: f64, detector_z: f64 },
    #[error("{name} at z={z} lies outside the column ]{detector_z},{beam_z}[")]
    OutOfColumn {
        name: String,
        z: f64,
        beam_z: f64,
        detector_z: f64,
    },
    #[error("{first} and {second} share the axial position z={z}")]
    SharedPosition {
        first: String,
        second: String,
        z: f64,
    },
}
type Result<T> = std::result::Result<T, ColumnError>;

/// What the rays meet at a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Source,
    /// `index` is the position of the component in the column components
    Component { index: usize, plane: Plane },
    Detector,
}

/// Axial stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub z: f64,
    pub kind: StopKind,
}

fn label(components: &[Component], stop: &Stop) -> String {
    match stop.kind {
        StopKind::Component { index, plane } => match plane {
            Plane::Single => components[index].to_string(),
            Plane::Upper => format!("upper plane of {}", components[index]),
            Plane::Lower => format!("lower plane of {}", components[index]),
        },
        StopKind::Source => String::from("beam"),
        StopKind::Detector => String::from("detector"),
    }
}

/// Orders the component planes between the beam plane and the detector plane
///
/// Fails if any plane lies outside the column or if 2 planes share the same position.
pub fn assemble(components: &[Component], beam_z: f64, detector_z: f64) -> Result<Vec<Stop>> {
    if !(beam_z > detector_z) {
        return Err(ColumnError::Inverted { beam_z, detector_z });
    }
    let mut stops: Vec<Stop> = components
        .iter()
        .enumerate()
        .flat_map(|(index, component)| {
            component.planes().into_iter().map(move |(plane, z)| Stop {
                z,
                kind: StopKind::Component { index, plane },
            })
        })
        .collect();
    if let Some(stop) = stops.iter().find(|s| !(s.z < beam_z && s.z > detector_z)) {
        return Err(ColumnError::OutOfColumn {
            name: label(components, stop),
            z: stop.z,
            beam_z,
            detector_z,
        });
    }
    stops.sort_by(|a, b| b.z.total_cmp(&a.z));
    if let Some((a, b)) = stops.iter().tuple_windows().find(|(a, b)| a.z == b.z) {
        return Err(ColumnError::SharedPosition {
            first: label(components, a),
            second: label(components, b),
            z: a.z,
        });
    }
    let source = Stop {
        z: beam_z,
        kind: StopKind::Source,
    };
    let detector = Stop {
        z: detector_z,
        kind: StopKind::Detector,
    };
    Ok(std::iter::once(source)
        .chain(stops)
        .chain(std::iter::once(detector))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Aperture, DoubleDeflector, Lens};
    use std::error::Error;

    #[test]
    fn sorted_stops() -> std::result::Result<(), Box<dyn Error>> {
        let components: Vec<Component> = vec![
            Aperture::new(0.1, 0.05, 0.25)?.into(),
            Lens::new(1.0, 0.5)?.into(),
            DoubleDeflector::new(0.7, 0.65)?.into(),
        ];
        let stops = assemble(&components, 1.5, 0.)?;
        let z: Vec<f64> = stops.iter().map(|s| s.z).collect();
        assert_eq!(z, vec![1.5, 1.0, 0.7, 0.65, 0.1, 0.]);
        assert_eq!(stops[0].kind, StopKind::Source);
        assert_eq!(
            stops[1].kind,
            StopKind::Component {
                index: 1,
                plane: Plane::Single
            }
        );
        assert_eq!(
            stops[3].kind,
            StopKind::Component {
                index: 2,
                plane: Plane::Lower
            }
        );
        assert_eq!(stops[5].kind, StopKind::Detector);
        Ok(())
    }

    #[test]
    fn shared_position() -> std::result::Result<(), Box<dyn Error>> {
        let components: Vec<Component> = vec![
            Lens::new(0.65, 0.5)?.into(),
            DoubleDeflector::new(0.7, 0.65)?.into(),
        ];
        assert!(matches!(
            assemble(&components, 1.5, 0.),
            Err(ColumnError::SharedPosition { z, .. }) if z == 0.65
        ));
        Ok(())
    }

    #[test]
    fn outside_column() -> std::result::Result<(), Box<dyn Error>> {
        let above: Vec<Component> = vec![Lens::new(1.6, 0.5)?.into()];
        assert!(matches!(
            assemble(&above, 1.5, 0.),
            Err(ColumnError::OutOfColumn { .. })
        ));
        let on_detector: Vec<Component> = vec![Lens::new(0., 0.5)?.into()];
        assert!(assemble(&on_detector, 1.5, 0.).is_err());
        assert!(matches!(
            assemble(&[], 0., 1.5),
            Err(ColumnError::Inverted { .. })
        ));
        Ok(())
    }

    #[test]
    fn empty_column() -> std::result::Result<(), Box<dyn Error>> {
        let stops = assemble(&[], 1.5, 0.)?;
        assert_eq!(stops.len(), 2);
        Ok(())
    }
}
