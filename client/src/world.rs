use bevy::prelude::*;
use sim::{MeshKind, MeshLibrary};

/// One shared render mesh per simulation shape, unit-sized so the entity scale sizes it.
#[derive(Resource)]
pub struct SimMeshes(pub MeshLibrary<Handle<Mesh>>);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (load_meshes, setup_lighting));
}

pub(crate) fn load_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let mut library = MeshLibrary::default();
    for kind in MeshKind::ALL {
        library.insert(kind, meshes.add(unit_mesh(kind)));
    }

    info!("Loaded {} simulation meshes", MeshKind::ALL.len());
    commands.insert_resource(SimMeshes(library));
}

/// Bevy mesh matching the collider `sim` builds for `kind` at unit scale.
fn unit_mesh(kind: MeshKind) -> Mesh {
    match kind {
        MeshKind::Box => Cuboid::new(1.0, 1.0, 1.0).into(),
        MeshKind::Sphere => Sphere::new(0.5).into(),
        MeshKind::Capsule => Capsule3d::new(0.5, 1.0).into(),
        MeshKind::Plane => Plane3d::default().mesh().size(1.0, 1.0).build(),
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
