use bevy::{camera::Exposure, prelude::*};

use crate::{
    render::to_quat,
    simulation::{SimSystems, SimulationRes},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(Update, follow_rig.in_set(SimSystems::Present));
}

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure { ev100: 9.7 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_xyz(0.0, 2.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                300.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

/// Place the Bevy camera exactly where the simulation's camera rig is.
fn follow_rig(
    mut camera: Single<&mut Transform, With<Camera3d>>,
    simulation: Res<SimulationRes>,
) {
    let Some(sim) = simulation.0.as_ref() else {
        return;
    };
    let rig = sim.camera();

    camera.translation = Vec3::new(rig.position.x, rig.position.y, rig.position.z);
    camera.rotation = to_quat(&rig.orientation());
}
