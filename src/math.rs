//! Rotation and vector helpers shared by every profile.
//!
//! Euler triples follow the host convention: yaw rotates about Z, pitch about Y
//! and roll about X, composed in Z-Y-X order.

use nalgebra as na;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MathError {
    #[error("vector has zero length and no direction")]
    DegenerateVector,
    #[error("up vector is parallel to forward vector")]
    ParallelUp,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_degrees(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self::new(yaw.to_radians(), pitch.to_radians(), roll.to_radians())
    }

    pub fn to_quaternion(self) -> na::UnitQuaternion<f32> {
        euler_to_quaternion(self)
    }

    pub fn lerp(self, target: EulerAngles, t: f32) -> Self {
        Self {
            yaw: lerp(self.yaw, target.yaw, t),
            pitch: lerp(self.pitch, target.pitch, t),
            roll: lerp(self.roll, target.roll, t),
        }
    }

    pub fn move_towards(self, target: EulerAngles, max_step: f32) -> Self {
        Self {
            yaw: move_towards(self.yaw, target.yaw, max_step),
            pitch: move_towards(self.pitch, target.pitch, max_step),
            roll: move_towards(self.roll, target.roll, max_step),
        }
    }
}

/// Half angle formula. Every real input is valid.
pub fn euler_to_quaternion(angles: EulerAngles) -> na::UnitQuaternion<f32> {
    let (sy, cy) = (angles.yaw * 0.5).sin_cos();
    let (sp, cp) = (angles.pitch * 0.5).sin_cos();
    let (sr, cr) = (angles.roll * 0.5).sin_cos();

    let x = cy * sr * cp - sy * cr * sp;
    let y = cy * cr * sp + sy * sr * cp;
    let z = sy * cr * cp - cy * sr * sp;
    let w = cy * cr * cp + sy * sr * sp;
    // product of unit rotations is already unit length
    na::UnitQuaternion::new_unchecked(na::Quaternion::new(w, x, y, z))
}

/// At gimbal lock (|sin(pitch)| >= 1) pitch is clamped to +-PI/2 with the sign
/// of the input and yaw/roll take whatever `atan2` yields for the degenerate
/// terms.
pub fn quaternion_to_euler(q: &na::UnitQuaternion<f32>) -> EulerAngles {
    let (x, y, z, w) = (q.i, q.j, q.k, q.w);

    let sinr = 2.0 * (w * x + y * z);
    let cosr = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr.atan2(cosr);

    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        std::f32::consts::FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny = 2.0 * (w * z + x * y);
    let cosy = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny.atan2(cosy);

    EulerAngles { yaw, pitch, roll }
}

pub fn rotate_vector(orientation: EulerAngles, vector: na::Vector3<f32>) -> na::Vector3<f32> {
    // nalgebra applies q * v * q^-1 here
    euler_to_quaternion(orientation) * vector
}

/// Orientation whose local +Z points along `forward` with local +Y as close to
/// `up` as the basis allows.
pub fn look_rotation(
    forward: na::Vector3<f32>,
    up: na::Vector3<f32>,
) -> Result<na::UnitQuaternion<f32>, MathError> {
    let forward = forward
        .try_normalize(f32::EPSILON)
        .ok_or(MathError::DegenerateVector)?;
    let right = up
        .cross(&forward)
        .try_normalize(f32::EPSILON)
        .ok_or(MathError::ParallelUp)?;
    let local_up = forward.cross(&right);

    let (m00, m01, m02) = (right.x, right.y, right.z);
    let (m10, m11, m12) = (local_up.x, local_up.y, local_up.z);
    let (m20, m21, m22) = (forward.x, forward.y, forward.z);

    let trace = m00 + m11 + m22;
    let (x, y, z, w) = if trace > 0.0 {
        let s = (trace + 1.0).sqrt();
        let w = s * 0.5;
        let s = 0.5 / s;
        ((m12 - m21) * s, (m20 - m02) * s, (m01 - m10) * s, w)
    } else if m00 >= m11 && m00 >= m22 {
        let s = (1.0 + m00 - m11 - m22).sqrt();
        let inv = 0.5 / s;
        (
            0.5 * s,
            (m01 + m10) * inv,
            (m02 + m20) * inv,
            (m12 - m21) * inv,
        )
    } else if m11 > m22 {
        let s = (1.0 + m11 - m00 - m22).sqrt();
        let inv = 0.5 / s;
        (
            (m10 + m01) * inv,
            0.5 * s,
            (m21 + m12) * inv,
            (m20 - m02) * inv,
        )
    } else {
        let s = (1.0 + m22 - m00 - m11).sqrt();
        let inv = 0.5 / s;
        (
            (m20 + m02) * inv,
            (m21 + m12) * inv,
            0.5 * s,
            (m01 - m10) * inv,
        )
    };

    Ok(na::UnitQuaternion::from_quaternion(na::Quaternion::new(
        w, x, y, z,
    )))
}

/// Zero length input yields the zero vector instead of NaN.
pub fn normalize_or_zero(vector: na::Vector3<f32>) -> na::Vector3<f32> {
    vector
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(na::Vector3::zeros)
}

pub fn clamp_magnitude(vector: na::Vector3<f32>, max: f32) -> na::Vector3<f32> {
    if vector.norm_squared() > max * max {
        normalize_or_zero(vector) * max
    } else {
        vector
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

pub fn lerp_vector(a: na::Vector3<f32>, b: na::Vector3<f32>, t: f32) -> na::Vector3<f32> {
    a * (1.0 - t) + b * t
}

pub fn move_towards(current: f32, target: f32, max_step: f32) -> f32 {
    if target > current {
        current + (target - current).min(max_step)
    } else {
        current + (target - current).max(-max_step)
    }
}
