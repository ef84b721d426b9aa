//! The per-tick frame/pose pump.
//!
//! One tick: wait for (or dequeue) the next decoded frame, refresh the
//! engine's textures, announce the tracking frame, report latency, then push
//! the freshest local pose and input upstream.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, RenderMode};
use crate::input::ButtonMapper;
use crate::listener::Listeners;
use crate::native::NativeSession;
use crate::pose::{DeviceRig, PoseConvention};
use crate::session::Session;
use crate::texture::{TextureAcquisition, TextureSink};
use crate::types::{DeviceType, TrackingFrame};

/// Black-screen ratio reported with every latency sample.
const BLACK_DEGREE: f32 = 0.0;

/// Running counters kept by the pump, reported by `lark run` on exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    /// Ticks that reached the pump with a ready session.
    pub ticks: u64,
    pub frames_rendered: u64,
    /// Ticks whose frame came back unavailable.
    pub frames_skipped: u64,
    pub wait_timeouts: u64,
    pub empty_queue_ticks: u64,
    pub pose_pushes: u64,
    pub latency_submits: u64,
}

/// What one `update` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not connected.
    Inactive,
    /// Connected, still waiting for the first decoded texture.
    Acquiring,
    /// Queue mode found nothing buffered; the rest of the tick was skipped.
    EmptyQueue,
    Rendered { frame_index: u64 },
    /// No frame to show, poses were still pushed.
    Skipped,
}

/// Drives the per-tick frame and pose exchange once the session has a
/// decoded texture.
///
/// The render mode, button mapper and pose convention are fixed at
/// construction; only the device-pair counter and stats change afterwards.
#[derive(Debug)]
pub struct FramePump {
    mode: RenderMode,
    wait_timeout: Duration,
    plugin_event: Option<i32>,
    mapper: ButtonMapper,
    convention: PoseConvention,
    device_pair: u64,
    stats: TickStats,
}

impl FramePump {
    /// Build a pump from the client configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            mode: config.render_mode(),
            wait_timeout: config.wait_frame_timeout(),
            plugin_event: config.plugin_event,
            mapper: config.controller_profile.mapper(),
            convention: config.pose,
            device_pair: 0,
            stats: TickStats::default(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Last device-pair counter sent upstream.
    pub fn device_pair(&self) -> u64 {
        self.device_pair
    }

    /// Run one tick against `native`.
    ///
    /// Returns early with `Inactive` or `Acquiring` when the session is not
    /// ready. An empty render queue retries texture acquisition and skips
    /// everything else, pose push included. Latency is only reported for an
    /// available frame that was newly signalled or dequeued.
    #[allow(clippy::too_many_arguments)]
    pub fn tick<N: NativeSession + ?Sized>(
        &mut self,
        native: &mut N,
        session: &mut Session,
        acquisition: &mut TextureAcquisition,
        listeners: &Listeners,
        sink: &mut dyn TextureSink,
        rig: &DeviceRig,
    ) -> TickOutcome {
        if !session.connected {
            return TickOutcome::Inactive;
        }
        if !session.frame_initialized {
            return TickOutcome::Acquiring;
        }
        self.stats.ticks += 1;

        let (frame, has_new_frame, dequeued) = match self.mode {
            RenderMode::Direct => {
                let signalled = native.wait_for_new_frame(self.wait_timeout);
                if !signalled {
                    self.stats.wait_timeouts += 1;
                    debug!(timeout_ms = self.wait_timeout.as_millis() as u64, "timed out waiting for new frame");
                }
                (native.render(), signalled, false)
            }
            RenderMode::Queue { .. } => match native.render_queue() {
                Some(queued) => {
                    let texture = session.texture.as_mut().filter(|_| queued.frame.available);
                    if let Some(texture) = texture {
                        if !texture.refresh_from(&queued.texture) {
                            warn!(
                                kind = queued.texture.kind,
                                "queued texture does not match the session layout or has a null slot"
                            );
                        }
                    }
                    (queued.frame, true, true)
                }
                None => {
                    self.stats.empty_queue_ticks += 1;
                    debug!("render queue empty");
                    acquisition.try_acquire(&*native, session, listeners);
                    return TickOutcome::EmptyQueue;
                }
            },
        };

        let outcome = if frame.available {
            if let Some(texture) = session.texture.as_ref() {
                sink.refresh(texture);
            }
            if let Some(event_id) = self.plugin_event {
                native.issue_plugin_event(event_id);
            }
            self.stats.frames_rendered += 1;
            TickOutcome::Rendered {
                frame_index: frame.frame_index,
            }
        } else {
            self.stats.frames_skipped += 1;
            TickOutcome::Skipped
        };

        if dequeued {
            native.release_render_queue();
        }

        listeners.tracking_frame(&frame);

        if has_new_frame && frame.available {
            self.submit_latency(native, &frame);
        }

        self.push_poses(native, rig);
        outcome
    }

    fn submit_latency<N: NativeSession + ?Sized>(&mut self, native: &mut N, frame: &TrackingFrame) {
        native.submit_latency(frame.frame_index, BLACK_DEGREE);
        self.stats.latency_submits += 1;
    }

    fn push_poses<N: NativeSession + ?Sized>(&mut self, native: &mut N, rig: &DeviceRig) {
        let update = rig.capture(&self.convention, self.mapper);

        native.update_device_pose(DeviceType::Hmd, update.hmd);
        native.update_device_pose(DeviceType::ControllerLeft, update.left);
        native.update_device_pose(DeviceType::ControllerRight, update.right);
        native.update_controller_input(&update.left_input);
        native.update_controller_input(&update.right_input);

        self.device_pair += 1;
        native.send_device_pair(self.device_pair);
        self.stats.pose_pushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderQueueConfig;
    use crate::mock::{MockNative, NativeCall};
    use crate::texture::NullSink;

    fn ready(native: &MockNative) -> (Session, TextureAcquisition) {
        let mut session = Session {
            connected: true,
            ..Session::default()
        };
        let mut acquisition = TextureAcquisition::default();
        assert!(acquisition
            .try_acquire(native, &mut session, &Listeners::default())
            .is_acquired());
        (session, acquisition)
    }

    #[test]
    fn test_inactive_until_ready() {
        let mut native = MockNative::default();
        let mut session = Session::default();
        let mut pump = FramePump::new(&ClientConfig::default());
        let outcome = pump.tick(
            &mut native,
            &mut session,
            &mut TextureAcquisition::default(),
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(outcome, TickOutcome::Inactive);

        session.connected = true;
        let outcome = pump.tick(
            &mut native,
            &mut session,
            &mut TextureAcquisition::default(),
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(outcome, TickOutcome::Acquiring);
        assert!(native.calls.is_empty());
    }

    #[test]
    fn test_direct_tick_call_order() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        let (mut session, mut acquisition) = ready(&native);
        let mut pump = FramePump::new(&ClientConfig::default());

        let outcome = pump.tick(
            &mut native,
            &mut session,
            &mut acquisition,
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(outcome, TickOutcome::Rendered { frame_index: 1 });

        let kinds: Vec<_> = native
            .calls
            .iter()
            .map(|call| std::mem::discriminant(call))
            .collect();
        let expected = [
            NativeCall::WaitForNewFrame(Duration::from_millis(33)),
            NativeCall::Render,
            NativeCall::Latency(1, 0.0),
        ];
        for (index, call) in expected.iter().enumerate() {
            assert_eq!(kinds[index], std::mem::discriminant(call));
        }
        assert_eq!(native.calls.last(), Some(&NativeCall::DevicePair(1)));
    }

    #[test]
    fn test_timeout_still_renders_fetched_frame_without_latency() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        native.wait_result = false;
        let (mut session, mut acquisition) = ready(&native);
        let mut pump = FramePump::new(&ClientConfig::default());
        pump.tick(
            &mut native,
            &mut session,
            &mut acquisition,
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(pump.stats().wait_timeouts, 1);
        assert_eq!(pump.stats().latency_submits, 0);
        assert_eq!(native.count(|c| matches!(c, NativeCall::Latency(..))), 0);
        assert_eq!(native.count(|c| matches!(c, NativeCall::DevicePair(_))), 1);
    }

    #[test]
    fn test_plugin_event_issued_after_refresh() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        let (mut session, mut acquisition) = ready(&native);
        let config = ClientConfig {
            plugin_event: Some(7),
            ..ClientConfig::default()
        };
        let mut pump = FramePump::new(&config);
        pump.tick(
            &mut native,
            &mut session,
            &mut acquisition,
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        let render = native.calls.iter().position(|c| *c == NativeCall::Render);
        let event = native.calls.iter().position(|c| *c == NativeCall::PluginEvent(7));
        assert!(render.is_some() && event > render);
    }

    #[test]
    fn test_queue_mode_releases_slot() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        let (mut session, mut acquisition) = ready(&native);
        let hw = native.hw_texture.unwrap();
        native.queue.push_back(crate::types::QueuedFrame {
            texture: hw,
            frame: MockNative::frame(5),
        });
        let config = ClientConfig {
            render_queue: RenderQueueConfig {
                enabled: true,
                size: 2,
            },
            ..ClientConfig::default()
        };
        let mut pump = FramePump::new(&config);
        let outcome = pump.tick(
            &mut native,
            &mut session,
            &mut acquisition,
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(outcome, TickOutcome::Rendered { frame_index: 5 });
        assert_eq!(native.count(|c| *c == NativeCall::ReleaseRenderQueue), 1);
        assert_eq!(native.count(|c| matches!(c, NativeCall::WaitForNewFrame(_))), 0);
        assert_eq!(native.count(|c| *c == NativeCall::Latency(5, 0.0)), 1);
    }

    #[test]
    fn test_device_pair_counter_increments() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        let (mut session, mut acquisition) = ready(&native);
        let mut pump = FramePump::new(&ClientConfig::default());
        for _ in 0..3 {
            pump.tick(
                &mut native,
                &mut session,
                &mut acquisition,
                &Listeners::default(),
                &mut NullSink,
                &DeviceRig::default(),
            );
        }
        assert_eq!(pump.device_pair(), 3);
        let pairs: Vec<_> = native
            .calls
            .iter()
            .filter_map(|c| match c {
                NativeCall::DevicePair(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(pairs, vec![1, 2, 3]);
    }

    #[test]
    fn test_unavailable_frame_reports_no_latency() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        native.push_frame(TrackingFrame::unavailable());
        let (mut session, mut acquisition) = ready(&native);
        let mut pump = FramePump::new(&ClientConfig::default());
        let outcome = pump.tick(
            &mut native,
            &mut session,
            &mut acquisition,
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(outcome, TickOutcome::Skipped);
        assert_eq!(native.count(|c| matches!(c, NativeCall::Latency(..))), 0);
        assert_eq!(pump.stats().latency_submits, 0);
        assert_eq!(native.count(|c| matches!(c, NativeCall::DevicePair(_))), 1);
    }

    #[test]
    fn test_queued_texture_with_other_layout_is_ignored() {
        let mut native = MockNative::streaming_stereo(1920, 1080);
        let (mut session, mut acquisition) = ready(&native);
        let before = session.handles();
        native.queue.push_back(crate::types::QueuedFrame {
            texture: crate::types::HwRenderTexture {
                kind: crate::types::HwTextureKind::D3d11Multiview as i32,
                slot1: crate::types::TextureHandle(0x9000),
                slot2: crate::types::TextureHandle::NULL,
                width: 1920,
                height: 1080,
            },
            frame: MockNative::frame(3),
        });
        let config = ClientConfig {
            render_queue: RenderQueueConfig {
                enabled: true,
                size: 2,
            },
            ..ClientConfig::default()
        };
        let mut pump = FramePump::new(&config);
        pump.tick(
            &mut native,
            &mut session,
            &mut acquisition,
            &Listeners::default(),
            &mut NullSink,
            &DeviceRig::default(),
        );
        assert_eq!(session.handles(), before);
        assert!(session.is_stereo_texture);
    }
}
