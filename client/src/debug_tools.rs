//! Performance overlay and simulation diagnostics for native dev builds.
//!
//! Gated behind `dev_native` in `main.rs`.

use bevy::diagnostic::{
    Diagnostic, DiagnosticPath, Diagnostics, EntityCountDiagnosticsPlugin,
    FrameTimeDiagnosticsPlugin, RegisterDiagnostic, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

use crate::simulation::{LastFrame, SimSystems, SimulationRes};

/// Physics steps run per frame.
const SIM_STEPS: DiagnosticPath = DiagnosticPath::const_new("sim/steps_per_frame");
/// Simulated milliseconds dropped by the catch-up clamp.
const SIM_DROPPED_MS: DiagnosticPath = DiagnosticPath::const_new("sim/dropped_ms");
const SIM_BODIES: DiagnosticPath = DiagnosticPath::const_new("sim/bodies");

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.register_diagnostic(Diagnostic::new(SIM_STEPS))
        .register_diagnostic(Diagnostic::new(SIM_DROPPED_MS).with_suffix("ms"))
        .register_diagnostic(Diagnostic::new(SIM_BODIES));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, measure_simulation.after(SimSystems::Advance));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn measure_simulation(
    mut diagnostics: Diagnostics,
    last_frame: Res<LastFrame>,
    simulation: Res<SimulationRes>,
) {
    let report = &last_frame.0;
    diagnostics.add_measurement(&SIM_STEPS, || f64::from(report.steps.steps));
    diagnostics.add_measurement(&SIM_DROPPED_MS, || {
        report.steps.dropped.as_secs_f64() * 1000.0
    });
    if let Some(sim) = simulation.0.as_ref() {
        diagnostics.add_measurement(&SIM_BODIES, || sim.world().body_count() as f64);
    }
}
