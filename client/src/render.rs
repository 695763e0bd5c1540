//! Mirrors simulation entities onto Bevy mesh entities.
//!
//! Each simulation entity draws itself through a [`Shader`]; here the "shader" records the
//! uploaded model matrix, color and mesh, and the result is written onto the entity's visual.

use bevy::{platform::collections::HashMap, prelude::*};
use nalgebra::{Matrix4, UnitQuaternion};
use sim::{EntityId, Rgba, Shader};

use crate::{
    simulation::{LastFrame, SimSystems, SimulationRes},
    world::SimMeshes,
};

/// Simulation entity id to its Bevy visual.
#[derive(Resource, Default)]
pub struct EntityVisuals(pub HashMap<EntityId, Entity>);

#[derive(Component)]
pub struct SimVisual(pub EntityId);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<EntityVisuals>();
    app.add_systems(
        Update,
        (despawn_removed, draw_entities)
            .chain()
            .in_set(SimSystems::Present),
    );
}

/// What one entity uploaded while drawing.
#[derive(Default)]
struct Drawn {
    transform: Transform,
    color: Color,
    mesh: Option<Handle<Mesh>>,
}

impl Shader for Drawn {
    type Mesh = Handle<Mesh>;

    fn load_model_matrix(&mut self, model: &Matrix4<f32>) {
        self.transform = to_transform(model);
    }

    fn load_color(&mut self, color: Rgba) {
        self.color = to_color(color);
    }

    fn draw_mesh(&mut self, mesh: &Handle<Mesh>) {
        self.mesh = Some(mesh.clone());
    }
}

fn despawn_removed(
    mut commands: Commands,
    last_frame: Res<LastFrame>,
    mut visuals: ResMut<EntityVisuals>,
) {
    for id in &last_frame.0.despawned {
        if let Some(visual) = visuals.0.remove(id) {
            commands.entity(visual).despawn();
        }
    }
}

fn draw_entities(
    mut commands: Commands,
    simulation: Res<SimulationRes>,
    meshes: Option<Res<SimMeshes>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visuals: ResMut<EntityVisuals>,
    mut transforms: Query<&mut Transform, With<SimVisual>>,
) {
    let (Some(sim), Some(meshes)) = (simulation.0.as_ref(), meshes) else {
        return;
    };

    for entity in sim.registry().iter() {
        let mut drawn = Drawn::default();
        if let Err(err) = entity.draw(sim.world(), &meshes.0, &mut drawn) {
            warn!("Failed to draw entity {} '{}': {err}", entity.id(), entity.name());
            continue;
        }
        let Some(mesh) = drawn.mesh else {
            continue;
        };

        if let Some(&visual) = visuals.0.get(&entity.id()) {
            if let Ok(mut transform) = transforms.get_mut(visual) {
                *transform = drawn.transform;
            }
            continue;
        }

        let visual = commands
            .spawn((
                Name::new(entity.name().to_string()),
                SimVisual(entity.id()),
                Mesh3d(mesh),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: drawn.color,
                    perceptual_roughness: 0.9,
                    ..default()
                })),
                drawn.transform,
            ))
            .id();
        visuals.0.insert(entity.id(), visual);
    }
}

/// nalgebra matrices are column-major, as is `Mat4::from_cols_slice`.
pub fn to_transform(model: &Matrix4<f32>) -> Transform {
    Transform::from_matrix(Mat4::from_cols_slice(model.as_slice()))
}

pub fn to_quat(rotation: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w)
}

pub fn to_color([r, g, b, a]: Rgba) -> Color {
    Color::linear_rgba(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use nalgebra::{Isometry3, Translation3, Vector3};

    use super::*;

    #[test]
    fn model_matrix_converts_to_matching_transform() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5);
        let pose = Isometry3::from_parts(Translation3::new(1.0, 2.0, 3.0), rotation);
        let model = pose.to_homogeneous() * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 4.0, 2.0));

        let transform = to_transform(&model);

        assert!(transform.translation.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1.0e-5));
        assert!(transform.scale.abs_diff_eq(Vec3::new(2.0, 4.0, 2.0), 1.0e-5));
        assert!(transform.rotation.abs_diff_eq(to_quat(&rotation), 1.0e-5));
    }

    #[test]
    fn shader_records_last_upload() {
        let mut drawn = Drawn::default();
        drawn.load_model_matrix(&Matrix4::new_translation(&Vector3::new(0.0, 5.0, 0.0)));
        drawn.load_color([1.0, 0.0, 0.0, 1.0]);
        drawn.draw_mesh(&Handle::default());

        assert_eq!(drawn.transform.translation, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(drawn.color, Color::linear_rgba(1.0, 0.0, 0.0, 1.0));
        assert!(drawn.mesh.is_some());
    }
}
