use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{controller_input, ButtonMapper, Hand, PressedButtons};
use crate::types::{DevicePoseUpdate, Pose};

/// Engine-side transform of a tracked device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Conversion from engine transforms to the wire pose convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConvention {
    /// Added to the Y axis of every outbound position.
    pub up_offset: f32,
}

impl PoseConvention {
    pub fn to_wire(&self, transform: &Transform) -> Pose {
        let position = transform.position + Vec3::Y * self.up_offset;
        Pose {
            position: position.to_array(),
            rotation: transform.rotation.normalize().to_array(),
        }
    }
}

/// Local head and hand state sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceRig {
    pub hmd: Transform,
    pub left: Transform,
    pub right: Transform,
    pub left_buttons: PressedButtons,
    pub right_buttons: PressedButtons,
}

impl DeviceRig {
    /// Put every tracked transform back at the origin. Held buttons survive.
    pub fn reset_transforms(&mut self) {
        self.hmd = Transform::IDENTITY;
        self.left = Transform::IDENTITY;
        self.right = Transform::IDENTITY;
    }

    pub fn buttons_mut(&mut self, hand: Hand) -> &mut PressedButtons {
        match hand {
            Hand::Left => &mut self.left_buttons,
            Hand::Right => &mut self.right_buttons,
        }
    }

    pub fn capture(&self, convention: &PoseConvention, mapper: ButtonMapper) -> DevicePoseUpdate {
        DevicePoseUpdate {
            hmd: convention.to_wire(&self.hmd),
            left: convention.to_wire(&self.left),
            right: convention.to_wire(&self.right),
            left_input: controller_input(Hand::Left, self.left_buttons, mapper),
            right_input: controller_input(Hand::Right, self.right_buttons, mapper),
        }
    }
}
