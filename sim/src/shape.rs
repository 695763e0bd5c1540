use nalgebra::Vector3;
use rapier3d::prelude::*;

/// Shape family shared by a render mesh and the collider built for it.
///
/// Every mesh is unit sized (a 1m cube, a 1m diameter sphere, a capsule of radius 0.5m and
/// cylinder length 1m, a 1m square plane); an entity's scale stretches both the mesh and its
/// collider the same way.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    /// Unit cube. Collider half extents are `scale / 2`.
    Box,
    /// Unit-diameter sphere. Collider radius is `scale.x / 2`.
    Sphere,
    /// Y-aligned capsule. Collider radius is `scale.x / 2`, cylinder half height `scale.y / 2`.
    Capsule,
    /// Ground plane.
    ///
    /// The collider is an infinite half-space whose normal is the body's local +Y. The X/Z size
    /// of the render mesh is purely visual.
    Plane,
}

impl MeshKind {
    pub const ALL: [MeshKind; 4] = [
        MeshKind::Box,
        MeshKind::Sphere,
        MeshKind::Capsule,
        MeshKind::Plane,
    ];
}

/// Build the collider for a mesh kind at the given scale.
///
/// The collider has identity local transform; its pose comes from the parent body.
pub fn collider_for(mesh: MeshKind, scale: &Vector3<f32>) -> ColliderBuilder {
    match mesh {
        MeshKind::Box => ColliderBuilder::cuboid(scale.x * 0.5, scale.y * 0.5, scale.z * 0.5),
        MeshKind::Sphere => ColliderBuilder::ball(scale.x * 0.5),
        MeshKind::Capsule => ColliderBuilder::capsule_y(scale.y * 0.5, scale.x * 0.5),
        MeshKind::Plane => ColliderBuilder::halfspace(Vector::y_axis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_collider_uses_half_scale() {
        let collider = collider_for(MeshKind::Box, &Vector3::new(2.0, 4.0, 6.0)).build();
        let cuboid = collider.shape().as_cuboid().expect("cuboid");
        assert!((cuboid.half_extents - Vector3::new(1.0, 2.0, 3.0)).norm() < 1.0e-6);
    }

    #[test]
    fn capsule_collider_is_y_aligned() {
        let collider = collider_for(MeshKind::Capsule, &Vector3::new(1.0, 1.0, 1.0)).build();
        let capsule = collider.shape().as_capsule().expect("capsule");
        assert!((capsule.radius - 0.5).abs() < 1.0e-6);
        assert!((capsule.half_height() - 0.5).abs() < 1.0e-6);
        assert!(capsule.segment.b.x.abs() < 1.0e-6);
    }

    #[test]
    fn plane_collider_faces_up() {
        let collider = collider_for(MeshKind::Plane, &Vector3::new(50.0, 1.0, 50.0)).build();
        let half_space = collider.shape().as_halfspace().expect("half-space");
        assert!((half_space.normal.into_inner() - Vector3::y()).norm() < 1.0e-6);
    }
}
