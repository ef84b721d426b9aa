//! Scripted in-process backend for tests and the `--mock` CLI mode.

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::StreamSettings;
use crate::native::NativeSession;
use crate::types::{
    ControllerInputState, DeviceType, HwRenderTexture, HwTextureKind, Pose, QueuedFrame,
    TextureHandle, TrackingFrame,
};
use crate::{VrError, VrResult};

/// Every outbound call the mock has seen, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    InitContext,
    ReleaseContext,
    Authorize,
    Configure(StreamSettings),
    SetRenderQueueSize(u32),
    Pause,
    Resume,
    WaitForNewFrame(Duration),
    Render,
    RenderQueue,
    ReleaseRenderQueue,
    PluginEvent(i32),
    DevicePose(DeviceType, Pose),
    ControllerInput(ControllerInputState),
    DevicePair(u64),
    Latency(u64, f32),
}

#[derive(Debug, Default)]
pub struct MockNative {
    pub connected: bool,
    pub frame_initialized: bool,
    pub hw_texture: Option<HwRenderTexture>,
    /// Result of every `wait_for_new_frame`.
    pub wait_result: bool,
    /// Frames returned by `render`; an empty script yields unavailable frames
    /// unless `auto_frames` is set.
    pub frames: VecDeque<TrackingFrame>,
    /// Pairs returned by `render_queue` ahead of any synthesized ones.
    pub queue: VecDeque<QueuedFrame>,
    /// Synthesize an available frame whenever the script runs dry. In queue
    /// mode this needs `hw_texture` and a size from `set_render_queue_size`.
    pub auto_frames: bool,
    /// Last size passed to `set_render_queue_size`.
    pub render_queue_size: Option<u32>,
    pub init_error: Option<i32>,
    pub auth_error: Option<i32>,
    pub calls: Vec<NativeCall>,
    pub(crate) hw_texture_queries: Cell<u64>,
    pub(crate) next_index: u64,
    pub(crate) outstanding: u32,
}

impl MockNative {
    /// A backend that is already connected and decoding a stereo pair.
    pub fn streaming_stereo(width: u32, height: u32) -> Self {
        Self {
            connected: true,
            frame_initialized: true,
            wait_result: true,
            auto_frames: true,
            hw_texture: Some(HwRenderTexture {
                kind: HwTextureKind::D3d11Stereo as i32,
                slot1: TextureHandle(0x1000),
                slot2: TextureHandle(0x2000),
                width,
                height,
            }),
            ..Self::default()
        }
    }

    pub fn frame(index: u64) -> TrackingFrame {
        TrackingFrame {
            available: true,
            frame_index: index,
            fetch_time: index * 16_667,
            display_time: index as f64 / 60.0,
            pose: Pose::IDENTITY,
        }
    }

    pub fn push_frame(&mut self, frame: TrackingFrame) {
        self.frames.push_back(frame);
    }

    /// Dequeued pairs not yet handed back with `release_render_queue`.
    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    fn next_frame(&mut self) -> TrackingFrame {
        self.next_index += 1;
        Self::frame(self.next_index)
    }

    pub fn hw_texture_queries(&self) -> u64 {
        self.hw_texture_queries.get()
    }

    pub fn count(&self, pred: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl NativeSession for MockNative {
    fn init_context(&mut self) -> VrResult<()> {
        self.calls.push(NativeCall::InitContext);
        match self.init_error {
            Some(code) => Err(VrError::Native {
                code,
                context: "init_context".into(),
            }),
            None => Ok(()),
        }
    }

    fn release_context(&mut self) {
        self.calls.push(NativeCall::ReleaseContext);
    }

    fn authorize(&mut self, _app_key: &str, _app_secret: &str) -> VrResult<()> {
        self.calls.push(NativeCall::Authorize);
        match self.auth_error {
            Some(code) => Err(VrError::Native {
                code,
                context: "authorize".into(),
            }),
            None => Ok(()),
        }
    }

    fn configure(&mut self, settings: &StreamSettings) {
        self.calls.push(NativeCall::Configure(*settings));
    }

    fn set_render_queue_size(&mut self, size: u32) {
        self.calls.push(NativeCall::SetRenderQueueSize(size));
        self.render_queue_size = Some(size);
    }

    fn on_pause(&mut self) {
        self.calls.push(NativeCall::Pause);
    }

    fn on_resume(&mut self) {
        self.calls.push(NativeCall::Resume);
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_frame_initialized(&self) -> bool {
        self.frame_initialized
    }

    fn hw_render_texture(&self) -> Option<HwRenderTexture> {
        self.hw_texture_queries.set(self.hw_texture_queries.get() + 1);
        self.hw_texture
    }

    fn wait_for_new_frame(&mut self, timeout: Duration) -> bool {
        self.calls.push(NativeCall::WaitForNewFrame(timeout));
        self.wait_result
    }

    fn render(&mut self) -> TrackingFrame {
        self.calls.push(NativeCall::Render);
        if let Some(frame) = self.frames.pop_front() {
            return frame;
        }
        if self.auto_frames {
            return self.next_frame();
        }
        TrackingFrame::unavailable()
    }

    fn render_queue(&mut self) -> Option<QueuedFrame> {
        self.calls.push(NativeCall::RenderQueue);
        let queued = match self.queue.pop_front() {
            Some(queued) => queued,
            None => {
                let capacity = self.render_queue_size.unwrap_or(0);
                let texture = self.hw_texture.filter(|_| self.auto_frames)?;
                if self.outstanding >= capacity {
                    return None;
                }
                QueuedFrame {
                    texture,
                    frame: self.next_frame(),
                }
            }
        };
        self.outstanding += 1;
        Some(queued)
    }

    fn release_render_queue(&mut self) {
        self.calls.push(NativeCall::ReleaseRenderQueue);
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    fn issue_plugin_event(&mut self, event_id: i32) {
        self.calls.push(NativeCall::PluginEvent(event_id));
    }

    fn update_device_pose(&mut self, device: DeviceType, pose: Pose) {
        self.calls.push(NativeCall::DevicePose(device, pose));
    }

    fn update_controller_input(&mut self, state: &ControllerInputState) {
        self.calls.push(NativeCall::ControllerInput(*state));
    }

    fn send_device_pair(&mut self, counter: u64) {
        self.calls.push(NativeCall::DevicePair(counter));
    }

    fn submit_latency(&mut self, frame_index: u64, black_degree: f32) {
        self.calls.push(NativeCall::Latency(frame_index, black_degree));
    }
}
