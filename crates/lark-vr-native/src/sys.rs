//! `#[repr(C)]` mirrors of the lark_xr C ABI.

use std::ffi::{c_char, c_void};

use lark_vr::{
    ControllerInputState, DeviceType, HwRenderTexture, Pose, TextureHandle, TrackingFrame,
};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawQuat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for RawQuat {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPose {
    pub position: RawVec3,
    pub rotation: RawQuat,
}

impl From<Pose> for RawPose {
    fn from(pose: Pose) -> Self {
        let [x, y, z] = pose.position;
        let [qx, qy, qz, qw] = pose.rotation;
        Self {
            position: RawVec3 { x, y, z },
            rotation: RawQuat {
                x: qx,
                y: qy,
                z: qz,
                w: qw,
            },
        }
    }
}

impl From<RawPose> for Pose {
    fn from(raw: RawPose) -> Self {
        Self {
            position: [raw.position.x, raw.position.y, raw.position.z],
            rotation: [raw.rotation.x, raw.rotation.y, raw.rotation.z, raw.rotation.w],
        }
    }
}

/// C `bool` written by the library, read as a byte so any non-zero value is
/// true.
pub type CBool = u8;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTrackingFrame {
    pub available: CBool,
    pub frame_index: u64,
    pub fetch_time: u64,
    pub display_time: f64,
    pub pose: RawPose,
}

impl From<RawTrackingFrame> for TrackingFrame {
    fn from(raw: RawTrackingFrame) -> Self {
        if raw.available == 0 {
            return TrackingFrame::unavailable();
        }
        Self {
            available: true,
            frame_index: raw.frame_index,
            fetch_time: raw.fetch_time,
            display_time: raw.display_time,
            pose: raw.pose.into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawHwRenderTexture {
    pub kind: i32,
    pub slot1: *mut c_void,
    pub slot2: *mut c_void,
    pub width: u32,
    pub height: u32,
}

impl Default for RawHwRenderTexture {
    fn default() -> Self {
        Self {
            kind: 0,
            slot1: std::ptr::null_mut(),
            slot2: std::ptr::null_mut(),
            width: 0,
            height: 0,
        }
    }
}

impl From<RawHwRenderTexture> for HwRenderTexture {
    fn from(raw: RawHwRenderTexture) -> Self {
        Self {
            kind: raw.kind,
            slot1: TextureHandle(raw.slot1 as usize as u64),
            slot2: TextureHandle(raw.slot2 as usize as u64),
            width: raw.width,
            height: raw.height,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawDevicePose {
    pub device_type: i32,
    pub pose: RawPose,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawControllerInputState {
    pub device_type: i32,
    pub is_connected: bool,
    pub buttons: u64,
    pub touch_pad_axis: [f32; 2],
    pub trigger_value: f32,
    pub grip_value: f32,
    pub battery_percent_remaining: u32,
}

impl From<&ControllerInputState> for RawControllerInputState {
    fn from(state: &ControllerInputState) -> Self {
        Self {
            device_type: state.device_type as i32,
            is_connected: state.is_connected,
            buttons: state.buttons.bits(),
            touch_pad_axis: state.touch_pad_axis,
            trigger_value: state.trigger_value,
            grip_value: state.grip_value,
            battery_percent_remaining: state.battery_percent_remaining,
        }
    }
}

pub fn raw_device_pose(device: DeviceType, pose: Pose) -> RawDevicePose {
    RawDevicePose {
        device_type: device as i32,
        pose: pose.into(),
    }
}

pub type InitContextFn = unsafe extern "C" fn() -> i32;
pub type VoidFn = unsafe extern "C" fn();
pub type BoolFn = unsafe extern "C" fn() -> CBool;
pub type GetLastErrorFn = unsafe extern "C" fn() -> i32;
pub type AuthorizeFn = unsafe extern "C" fn(*const c_char, *const c_char) -> CBool;
pub type SetU32Fn = unsafe extern "C" fn(u32);
pub type SetI32Fn = unsafe extern "C" fn(i32);
pub type SetBoolFn = unsafe extern "C" fn(bool);
pub type SetF32Fn = unsafe extern "C" fn(f32);
pub type SetResolutionFn = unsafe extern "C" fn(u32, u32);
pub type SetColorCorrectionFn = unsafe extern "C" fn(f32, f32, f32, f32);
pub type GetHwRenderTextureFn = unsafe extern "C" fn(*mut RawHwRenderTexture) -> CBool;
pub type WaitForNewFrameFn = unsafe extern "C" fn(i64) -> CBool;
pub type RenderFn = unsafe extern "C" fn(*mut RawTrackingFrame) -> CBool;
pub type RenderQueueFn = unsafe extern "C" fn(*mut RawTrackingFrame, *mut RawHwRenderTexture) -> CBool;
pub type RenderEventFn = unsafe extern "C" fn(i32);
pub type GetRenderEventFuncFn = unsafe extern "C" fn() -> Option<RenderEventFn>;
pub type UpdateDevicePoseFn = unsafe extern "C" fn(*const RawDevicePose);
pub type UpdateControllerInputFn = unsafe extern "C" fn(*const RawControllerInputState);
pub type SendDevicePairFn = unsafe extern "C" fn(u64);
pub type SubmitLatencyFn = unsafe extern "C" fn(u64, f32);

#[cfg(test)]
mod tests {
    use super::*;
    use lark_vr::{Hand, InputButtons};

    #[test]
    fn test_unavailable_frame_discards_fields() {
        let raw = RawTrackingFrame {
            available: 0,
            frame_index: 99,
            ..RawTrackingFrame::default()
        };
        let frame: TrackingFrame = raw.into();
        assert!(!frame.available);
        assert_eq!(frame.frame_index, 0);
    }

    #[test]
    fn test_any_nonzero_byte_is_available() {
        let raw = RawTrackingFrame {
            available: 0xff,
            frame_index: 12,
            ..RawTrackingFrame::default()
        };
        let frame: TrackingFrame = raw.into();
        assert!(frame.available);
        assert_eq!(frame.frame_index, 12);
    }

    #[test]
    fn test_null_slots_map_to_null_handles() {
        let hw: HwRenderTexture = RawHwRenderTexture::default().into();
        assert!(hw.slot1.is_null() && hw.slot2.is_null());
    }

    #[test]
    fn test_controller_state_bits_pass_through() {
        let state = lark_vr::input::controller_input(
            Hand::Right,
            {
                let mut pressed = lark_vr::input::PressedButtons::default();
                pressed.press(lark_vr::VirtualButton::A);
                pressed
            },
            lark_vr::ControllerProfile::Standard.mapper(),
        );
        let raw = RawControllerInputState::from(&state);
        assert_eq!(raw.buttons, 1 << 7);
        assert_eq!(raw.device_type, 2);
        assert_eq!(InputButtons::from_bits_truncate(raw.buttons), InputButtons::A_CLICK);
    }

    #[test]
    fn test_pose_round_trip_layout() {
        let pose = Pose {
            position: [1.0, 2.0, 3.0],
            rotation: [0.0, 0.7071, 0.0, 0.7071],
        };
        let raw = raw_device_pose(DeviceType::Hmd, pose);
        assert_eq!(raw.device_type, 0);
        assert_eq!(raw.pose.position.y, 2.0);
        assert_eq!(raw.pose.rotation.w, 0.7071);
    }
}
