#![allow(unsafe_code)]

//! [`NativeSession`] backed by the `lark_xr` shared library.
//!
//! The library is opened at runtime and every symbol is resolved up front, so
//! a missing or mismatched library fails once at load time instead of in the
//! middle of a tick.

pub mod sys;

use std::ffi::{CString, OsStr};
use std::path::Path;
use std::time::Duration;

use libloading::Library;
use tracing::{debug, info, warn};

use lark_vr::config::StreamSettings;
use lark_vr::{
    ControllerInputState, DeviceType, HwRenderTexture, NativeSession, Pose, QueuedFrame,
    TrackingFrame, VrError, VrResult,
};

use crate::sys::*;

/// Base name of the streaming library, without platform prefix/suffix.
pub const LIBRARY_NAME: &str = "lark_xr";

macro_rules! sym {
    ($lib:expr, $ty:ty, $name:literal) => {{
        let symbol = unsafe { $lib.get::<$ty>(concat!($name, "\0").as_bytes()) }
            .map_err(|e| VrError::Unavailable(format!("missing symbol {}: {e}", $name)))?;
        *symbol
    }};
}

struct Api {
    init_context: InitContextFn,
    release_context: VoidFn,
    init_sdk_authorization: AuthorizeFn,
    get_last_error: GetLastErrorFn,
    set_video_bitrate_kbps: SetU32Fn,
    set_video_resolution: SetResolutionFn,
    set_fov: SetF32Fn,
    set_quick_config_level: SetI32Fn,
    set_use_multiview: SetBoolFn,
    set_color_correction: SetColorCorrectionFn,
    set_render_queue_size: SetI32Fn,
    on_pause: VoidFn,
    on_resume: VoidFn,
    is_connected: BoolFn,
    is_frame_initialized: BoolFn,
    get_hw_render_texture: GetHwRenderTextureFn,
    wait_for_new_frame: WaitForNewFrameFn,
    render: RenderFn,
    render_queue: RenderQueueFn,
    release_render_queue: VoidFn,
    get_render_event_func: GetRenderEventFuncFn,
    update_device_pose: UpdateDevicePoseFn,
    update_controller_input: UpdateControllerInputFn,
    send_device_pair: SendDevicePairFn,
    submit_latency: SubmitLatencyFn,
}

impl Api {
    fn load(lib: &Library) -> VrResult<Self> {
        Ok(Self {
            init_context: sym!(lib, InitContextFn, "larkxr_InitContext"),
            release_context: sym!(lib, VoidFn, "larkxr_ReleaseContext"),
            init_sdk_authorization: sym!(lib, AuthorizeFn, "larkxr_InitSdkAuthorization"),
            get_last_error: sym!(lib, GetLastErrorFn, "larkxr_GetLastError"),
            set_video_bitrate_kbps: sym!(lib, SetU32Fn, "larkxr_SetVideoBitrateKbps"),
            set_video_resolution: sym!(lib, SetResolutionFn, "larkxr_SetVideoResolution"),
            set_fov: sym!(lib, SetF32Fn, "larkxr_SetFov"),
            set_quick_config_level: sym!(lib, SetI32Fn, "larkxr_SetQuickConfigLevel"),
            set_use_multiview: sym!(lib, SetBoolFn, "larkxr_SetUseMultiview"),
            set_color_correction: sym!(lib, SetColorCorrectionFn, "larkxr_SetColorCorrection"),
            set_render_queue_size: sym!(lib, SetI32Fn, "larkxr_SetRenderQueueSize"),
            on_pause: sym!(lib, VoidFn, "larkxr_OnPause"),
            on_resume: sym!(lib, VoidFn, "larkxr_OnResume"),
            is_connected: sym!(lib, BoolFn, "larkxr_IsConnected"),
            is_frame_initialized: sym!(lib, BoolFn, "larkxr_IsFrameInitialized"),
            get_hw_render_texture: sym!(lib, GetHwRenderTextureFn, "larkxr_GetHwRenderTexture"),
            wait_for_new_frame: sym!(lib, WaitForNewFrameFn, "larkxr_WaitForNewFrame"),
            render: sym!(lib, RenderFn, "larkxr_Render"),
            render_queue: sym!(lib, RenderQueueFn, "larkxr_RenderQueue"),
            release_render_queue: sym!(lib, VoidFn, "larkxr_ReleaseRenderQueue"),
            get_render_event_func: sym!(lib, GetRenderEventFuncFn, "larkxr_GetRenderEventFunc"),
            update_device_pose: sym!(lib, UpdateDevicePoseFn, "larkxr_UpdateDevicePose"),
            update_controller_input: sym!(lib, UpdateControllerInputFn, "larkxr_UpdateControllerInputState"),
            send_device_pair: sym!(lib, SendDevicePairFn, "larkxr_SendDevicePair"),
            submit_latency: sym!(lib, SubmitLatencyFn, "larkxr_SubmitLatency"),
        })
    }
}

pub struct LarkNative {
    api: Api,
    render_event: Option<RenderEventFn>,
    // Keeps the function pointers in `api` valid; must outlive every call.
    _lib: Library,
}

impl LarkNative {
    /// Open the streaming library from `path`, or by its platform file name
    /// on the default search path.
    pub fn load(path: Option<&Path>) -> VrResult<Self> {
        let default_name = libloading::library_filename(LIBRARY_NAME);
        let target: &OsStr = match path {
            Some(path) => path.as_os_str(),
            None => &default_name,
        };
        let lib = unsafe { Library::new(target) }.map_err(|e| {
            VrError::Unavailable(format!("cannot open {}: {e}", target.to_string_lossy()))
        })?;
        let api = Api::load(&lib)?;
        info!(library = %target.to_string_lossy(), "lark_xr library loaded");
        Ok(Self {
            api,
            render_event: None,
            _lib: lib,
        })
    }

    fn last_error(&self) -> i32 {
        unsafe { (self.api.get_last_error)() }
    }
}

impl NativeSession for LarkNative {
    fn init_context(&mut self) -> VrResult<()> {
        let code = unsafe { (self.api.init_context)() };
        if code != 0 {
            return Err(VrError::Native {
                code,
                context: "larkxr_InitContext".into(),
            });
        }
        self.render_event = unsafe { (self.api.get_render_event_func)() };
        if self.render_event.is_none() {
            debug!("library exposes no render event callback");
        }
        Ok(())
    }

    fn release_context(&mut self) {
        unsafe { (self.api.release_context)() };
        self.render_event = None;
    }

    fn authorize(&mut self, app_key: &str, app_secret: &str) -> VrResult<()> {
        let key = CString::new(app_key)
            .map_err(|_| VrError::Adapter("app key contains a NUL byte".into()))?;
        let secret = CString::new(app_secret)
            .map_err(|_| VrError::Adapter("app secret contains a NUL byte".into()))?;
        let ok = unsafe { (self.api.init_sdk_authorization)(key.as_ptr(), secret.as_ptr()) };
        if ok != 0 {
            Ok(())
        } else {
            Err(VrError::Native {
                code: self.last_error(),
                context: "larkxr_InitSdkAuthorization".into(),
            })
        }
    }

    fn configure(&mut self, settings: &StreamSettings) {
        unsafe {
            if let Some(kbps) = settings.bitrate_kbps {
                (self.api.set_video_bitrate_kbps)(kbps);
            }
            if let Some(resolution) = settings.resolution {
                (self.api.set_video_resolution)(resolution.width, resolution.height);
            }
            if let Some(fov) = settings.fov_degrees {
                (self.api.set_fov)(fov);
            }
            if let Some(level) = settings.quick_config_level {
                (self.api.set_quick_config_level)(level as i32);
            }
            if let Some(multiview) = settings.use_multiview {
                (self.api.set_use_multiview)(multiview);
            }
            if let Some(cc) = settings.color_correction {
                (self.api.set_color_correction)(cc.brightness, cc.contrast, cc.saturation, cc.gamma);
            }
        }
    }

    fn set_render_queue_size(&mut self, size: u32) {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        unsafe { (self.api.set_render_queue_size)(size) };
    }

    fn on_pause(&mut self) {
        unsafe { (self.api.on_pause)() };
    }

    fn on_resume(&mut self) {
        unsafe { (self.api.on_resume)() };
    }

    fn is_connected(&self) -> bool {
        unsafe { (self.api.is_connected)() != 0 }
    }

    fn is_frame_initialized(&self) -> bool {
        unsafe { (self.api.is_frame_initialized)() != 0 }
    }

    fn hw_render_texture(&self) -> Option<HwRenderTexture> {
        let mut raw = RawHwRenderTexture::default();
        let ok = unsafe { (self.api.get_hw_render_texture)(&mut raw) };
        (ok != 0).then(|| raw.into())
    }

    fn wait_for_new_frame(&mut self, timeout: Duration) -> bool {
        let timeout_ms = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        unsafe { (self.api.wait_for_new_frame)(timeout_ms) != 0 }
    }

    fn render(&mut self) -> TrackingFrame {
        let mut raw = RawTrackingFrame::default();
        if unsafe { (self.api.render)(&mut raw) } != 0 {
            raw.into()
        } else {
            TrackingFrame::unavailable()
        }
    }

    fn render_queue(&mut self) -> Option<QueuedFrame> {
        let mut frame = RawTrackingFrame::default();
        let mut texture = RawHwRenderTexture::default();
        let ok = unsafe { (self.api.render_queue)(&mut frame, &mut texture) };
        (ok != 0).then(|| QueuedFrame {
            texture: texture.into(),
            frame: frame.into(),
        })
    }

    fn release_render_queue(&mut self) {
        unsafe { (self.api.release_render_queue)() };
    }

    fn issue_plugin_event(&mut self, event_id: i32) {
        match self.render_event {
            Some(callback) => unsafe { callback(event_id) },
            None => warn!(event_id, "plugin event requested but no render event callback"),
        }
    }

    fn update_device_pose(&mut self, device: DeviceType, pose: Pose) {
        let raw = raw_device_pose(device, pose);
        unsafe { (self.api.update_device_pose)(&raw) };
    }

    fn update_controller_input(&mut self, state: &ControllerInputState) {
        let raw = RawControllerInputState::from(state);
        unsafe { (self.api.update_controller_input)(&raw) };
    }

    fn send_device_pair(&mut self, counter: u64) {
        unsafe { (self.api.send_device_pair)(counter) };
    }

    fn submit_latency(&mut self, frame_index: u64, black_degree: f32) {
        unsafe { (self.api.submit_latency)(frame_index, black_degree) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_unavailable() {
        let result = LarkNative::load(Some(Path::new("/nonexistent/liblark_xr_missing.so")));
        assert!(matches!(result, Err(VrError::Unavailable(_))));
    }
}
