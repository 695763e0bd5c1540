use nalgebra::{Point3, UnitQuaternion, Vector2, Vector3};

/// First-person camera: an eye position plus yaw/pitch.
///
/// Conventions
/// - Yaw 0 looks down -Z; positive yaw turns left (counter-clockwise seen from above).
/// - Positive pitch looks up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraRig {
    pub position: Point3<f32>,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl CameraRig {
    pub fn new(position: Point3<f32>, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn orientation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch)
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Horizontal right vector (never tilted by pitch).
    pub fn right(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vector3::new(cos_yaw, 0.0, -sin_yaw)
    }

    /// Turn by a mouse delta. Screen +X turns right, screen +Y looks down.
    pub fn look(&mut self, delta: Vector2<f32>, sensitivity: f32, pitch_limit: f32) {
        self.yaw -= delta.x * sensitivity;
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-pitch_limit, pitch_limit);
    }

    /// Place the eye `eye_height` above `target`.
    pub fn follow(&mut self, target: Point3<f32>, eye_height: f32) {
        self.position = target + Vector3::new(0.0, eye_height, 0.0);
    }
}
