use std::time::Duration;

use crate::config::StreamSettings;
use crate::types::{
    ControllerInputState, DeviceType, HwRenderTexture, Pose, QueuedFrame, TrackingFrame,
};
use crate::VrResult;

/// The streaming library as seen by the per-tick loop.
///
/// Everything here is synchronous from the caller's point of view. Apart from
/// context setup and authorization, failures surface only as sentinels:
/// `false`, `None` or an unavailable [`TrackingFrame`].
pub trait NativeSession {
    // Lifecycle
    fn init_context(&mut self) -> VrResult<()>;
    fn release_context(&mut self);
    fn authorize(&mut self, app_key: &str, app_secret: &str) -> VrResult<()>;
    fn configure(&mut self, settings: &StreamSettings);
    fn set_render_queue_size(&mut self, size: u32);
    fn on_pause(&mut self);
    fn on_resume(&mut self);

    // Session and texture queries
    fn is_connected(&self) -> bool;
    fn is_frame_initialized(&self) -> bool;
    fn hw_render_texture(&self) -> Option<HwRenderTexture>;

    // Frame fetch
    /// Returns false if `timeout` elapsed without a new-frame signal.
    fn wait_for_new_frame(&mut self, timeout: Duration) -> bool;
    fn render(&mut self) -> TrackingFrame;
    /// Oldest buffered pair, or `None` when the queue is empty.
    fn render_queue(&mut self) -> Option<QueuedFrame>;
    /// Hand the slot returned by the last [`render_queue`](Self::render_queue)
    /// back to the decoder.
    fn release_render_queue(&mut self);
    fn issue_plugin_event(&mut self, event_id: i32);

    // Upstream
    fn update_device_pose(&mut self, device: DeviceType, pose: Pose);
    fn update_controller_input(&mut self, state: &ControllerInputState);
    fn send_device_pair(&mut self, counter: u64);
    fn submit_latency(&mut self, frame_index: u64, black_degree: f32);
}
