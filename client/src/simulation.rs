//! Drives the physics simulation from Bevy's frame clock.
//!
//! The [`sim::Simulation`] lives in a resource and is advanced once per `Update` with the
//! frame's real elapsed time; fixed stepping happens inside it. Presentation systems (render
//! sync, camera) run in [`SimSystems::Present`], after the step.

use bevy::{input::mouse::AccumulatedMouseMotion, prelude::*};
use leafwing_input_manager::prelude::ActionState;
use sim::{FrameReport, MeshLibrary, SimConfig, Simulation};

use crate::{
    input::{InputAction, frame_input},
    world::{SimMeshes, load_meshes},
};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SimSystems {
    /// Advance the simulation by the frame's elapsed time.
    Advance,
    /// Mirror simulation state onto Bevy entities.
    Present,
}

/// Tuning the simulation starts with. Insert before `Startup` to override.
#[derive(Resource, Default)]
pub struct SimSettings(pub SimConfig);

/// The running simulation. `None` before startup and once it has been shut down.
#[derive(Resource, Default)]
pub struct SimulationRes(pub Option<Simulation>);

/// Outcome of the most recent frame, for presentation systems.
#[derive(Resource, Default)]
pub struct LastFrame(pub FrameReport);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<SimSettings>();
    app.init_resource::<SimulationRes>();
    app.init_resource::<LastFrame>();

    app.add_systems(Startup, start_simulation.after(load_meshes));

    app.configure_sets(Update, (SimSystems::Advance, SimSystems::Present).chain());
    app.add_systems(Update, advance.in_set(SimSystems::Advance));
    app.add_systems(Last, shutdown_on_exit);
}

/// Build the scene, refusing to start unless every mesh it draws is loaded.
fn start_simulation(
    settings: Res<SimSettings>,
    meshes: Option<Res<SimMeshes>>,
    mut simulation: ResMut<SimulationRes>,
    mut exit: MessageWriter<AppExit>,
) {
    let sim = Simulation::with_default_scene(settings.0);

    let ready = match meshes {
        Some(meshes) => sim.require_meshes(&meshes.0),
        None => sim.require_meshes(&MeshLibrary::<()>::default()),
    };
    if let Err(err) = ready {
        error!("Simulation meshes are not loaded: {err}");
        exit.write(AppExit::error());
        return;
    }

    info!(
        "Simulation started with {} entities, stepping every {:?}",
        sim.registry().len(),
        settings.0.fixed_step
    );
    simulation.0 = Some(sim);
}

fn advance(
    time: Res<Time>,
    actions: Res<ActionState<InputAction>>,
    mouse: Res<AccumulatedMouseMotion>,
    mut simulation: ResMut<SimulationRes>,
    mut last_frame: ResMut<LastFrame>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(sim) = simulation.0.as_mut() else {
        return;
    };

    let input = frame_input(&actions, &mouse);
    let report = match sim.frame(time.delta(), input) {
        Ok(report) => report,
        Err(err) => {
            error!("Simulation frame failed: {err}");
            exit.write(AppExit::error());
            return;
        }
    };

    if !report.spawned.is_empty() || !report.despawned.is_empty() {
        debug!(
            "Frame spawned {:?}, despawned {:?}",
            report.spawned, report.despawned
        );
    }
    if report.quit_requested {
        info!("Quit requested");
        exit.write(AppExit::Success);
    }

    last_frame.0 = report;
}

/// Tear the simulation down in order (entities first, then the world) once the app is exiting.
fn shutdown_on_exit(mut exits: MessageReader<AppExit>, mut simulation: ResMut<SimulationRes>) {
    if exits.read().next().is_none() {
        return;
    }
    let Some(sim) = simulation.0.take() else {
        return;
    };
    match sim.shutdown() {
        Ok(()) => info!("Simulation shut down"),
        Err(err) => error!("Simulation shutdown failed: {err}"),
    }
}
