use std::path::PathBuf;

use serde::Serialize;
use structopt::StructOpt;
use temgym_lite::{
    components::{
        Aperture, AstigmaticLens, Biprism, Deflector, DoubleDeflector, Lens, Quadrupole,
        WireOrientation,
    },
    ray::{SLOPE_X, SLOPE_Y, X, Y},
    BeamType, Component, Model, Trajectory,
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "temgym-lite",
    about = "First-order electron ray tracing through a TEM column"
)]
struct Opt {
    /// Beam type: point, cone, x_axial, y_axial or paraxial
    #[structopt(short = "t", long, default_value = "point")]
    beam_type: BeamType,
    /// Number of rays
    #[structopt(short, long, default_value = "32")]
    num_rays: usize,
    /// Electron gun axial position
    #[structopt(short = "z", long, default_value = "1.5")]
    beam_z: f64,
    /// Beam semi-angle (point & cone) or radius (parallel beams)
    #[structopt(short, long, default_value = "0.03")]
    semi_angle: f64,
    /// Saves the rays at every stop to a CSV file
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Record {
    #[serde(rename = "Stop")]
    stop: usize,
    #[serde(rename = "Z")]
    z: f64,
    #[serde(rename = "Ray")]
    ray: usize,
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "X slope")]
    slope_x: f64,
    #[serde(rename = "Y")]
    y: f64,
    #[serde(rename = "Y slope")]
    slope_y: f64,
    #[serde(rename = "Allowed")]
    allowed: bool,
}

/// One of each component
fn all_components() -> anyhow::Result<Vec<Component>> {
    Ok(vec![
        AstigmaticLens::new(1.2, -0.5, -0.5)?
            .with_name("Astigmatic Lens")
            .into(),
        Lens::new(1.0, 0.5)?.with_name("Lens").into(),
        Quadrupole::new(0.9, -0.5, -0.5)?
            .with_name("Quadrupole")
            .into(),
        DoubleDeflector::new(0.70, 0.65)?
            .with_name("Double Deflector")
            .into(),
        Deflector::new(0.6, 0., 0.)?.with_name("Deflector").into(),
        Biprism::new(0.4, 0.5, WireOrientation::Zero)?
            .with_name("Biprism")
            .into(),
        Aperture::new(0.1, 0.05, 0.25)?.with_name("Aperture").into(),
    ])
}

fn summary(model: &Model, trajectory: &Trajectory) {
    println!("SUMMARY:");
    println!(" - beam: {}", model.beam());
    println!(" - # of stops: {}", trajectory.len());
    println!("    {:^32}: {:^8}", "COMPONENT", "BLOCKED");
    for component in model.components() {
        println!(
            "  - {:32}: {:^8}",
            component.to_string(),
            component.blocked_ray_idcs().len()
        );
    }
    let detector = trajectory.detector_positions();
    println!(
        " - # of rays on the detector: {}/{}",
        detector.len(),
        model.num_rays()
    );
    if trajectory.all_blocked() {
        println!(" - all the rays are blocked before the detector");
    } else {
        let x_range = detector
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &(_, x, _)| {
                (a.min(x), b.max(x))
            });
        println!(" - detector x range: [{:8.4},{:8.4}]", x_range.0, x_range.1);
        println!(
            " - detector edge rays: {:?}",
            trajectory.edge_rays(trajectory.len() - 1)
        );
    }
}

fn to_csv(trajectory: &Trajectory, path: PathBuf) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for (stop, &z) in trajectory.z().iter().enumerate() {
        let state = trajectory.state(stop);
        let allowed = trajectory.allowed(stop);
        for ray in 0..trajectory.num_rays() {
            wtr.serialize(Record {
                stop,
                z,
                ray,
                x: state[(X, ray)],
                slope_x: state[(SLOPE_X, ray)],
                y: state[(Y, ray)],
                slope_y: state[(SLOPE_Y, ray)],
                allowed: allowed.binary_search(&ray).is_ok(),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut model = Model::builder(all_components()?)
        .beam_type(opt.beam_type)
        .num_rays(opt.num_rays)
        .beam_z(opt.beam_z)
        .beam_semi_angle(opt.semi_angle)
        .build()?;
    let trajectory = model.step()?;
    summary(&model, &trajectory);

    if let Some(path) = opt.output {
        log::info!("Writing rays to {:?}", path);
        to_csv(&trajectory, path)?;
    }

    Ok(())
}
