use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::ControllerProfile;
use crate::pose::PoseConvention;

pub const DEFAULT_WAIT_FRAME_TIMEOUT_MS: u64 = 33;
pub const DEFAULT_RENDER_QUEUE_SIZE: u32 = 2;
pub const DEFAULT_TARGET_TICK_RATE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How long a direct-mode tick waits for the decoder to signal a frame.
    pub wait_frame_timeout_ms: u64,
    pub render_queue: RenderQueueConfig,
    pub target_tick_rate: u32,
    pub controller_profile: ControllerProfile,
    /// GPU plugin event issued after each texture refresh, for platforms
    /// where decode and render run on different GL contexts.
    pub plugin_event: Option<i32>,
    pub pose: PoseConvention,
    pub stream: StreamSettings,
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            wait_frame_timeout_ms: DEFAULT_WAIT_FRAME_TIMEOUT_MS,
            render_queue: RenderQueueConfig::default(),
            target_tick_rate: DEFAULT_TARGET_TICK_RATE,
            controller_profile: ControllerProfile::default(),
            plugin_event: None,
            pose: PoseConvention::default(),
            stream: StreamSettings::default(),
            app_key: None,
            app_secret: None,
        }
    }
}

impl ClientConfig {
    pub fn wait_frame_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_frame_timeout_ms)
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.render_queue.enabled {
            RenderMode::Queue {
                size: self.render_queue.size.max(1),
            }
        } else {
            RenderMode::Direct
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderQueueConfig {
    pub enabled: bool,
    pub size: u32,
}

impl Default for RenderQueueConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size: DEFAULT_RENDER_QUEUE_SIZE,
        }
    }
}

/// How the pump obtains frames from the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Wait for a frame signal, then fetch synchronously.
    Direct,
    /// Dequeue from a bounded buffer of at most `size` decoded frames.
    Queue { size: u32 },
}

/// Stream parameters pushed to the native layer. Unset fields keep the
/// library's own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub bitrate_kbps: Option<u32>,
    pub resolution: Option<Resolution>,
    pub fov_degrees: Option<f32>,
    pub quick_config_level: Option<QuickConfigLevel>,
    pub use_multiview: Option<bool>,
    pub color_correction: Option<ColorCorrection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickConfigLevel {
    Manual = 0,
    Fast = 1,
    Normal = 2,
    Extreme = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorCorrection {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub gamma: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.wait_frame_timeout(), Duration::from_millis(33));
        assert_eq!(config.render_mode(), RenderMode::Direct);
        assert_eq!(config.target_tick_rate, 60);
        assert_eq!(config.render_queue.size, 2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{ "render_queue": { "enabled": true }, "controller_profile": "alternate" }"#,
        )
        .unwrap();
        assert_eq!(config.render_mode(), RenderMode::Queue { size: 2 });
        assert_eq!(config.controller_profile, ControllerProfile::Alternate);
        assert_eq!(config.wait_frame_timeout_ms, 33);
    }

    #[test]
    fn test_zero_queue_size_clamped() {
        let mut config = ClientConfig::default();
        config.render_queue = RenderQueueConfig {
            enabled: true,
            size: 0,
        };
        assert_eq!(config.render_mode(), RenderMode::Queue { size: 1 });
    }

    #[test]
    fn test_stream_settings_json() {
        let settings: StreamSettings = serde_json::from_str(
            r#"{ "bitrate_kbps": 40000, "resolution": { "width": 3664, "height": 1920 }, "quick_config_level": "normal" }"#,
        )
        .unwrap();
        assert_eq!(settings.bitrate_kbps, Some(40_000));
        assert_eq!(settings.quick_config_level, Some(QuickConfigLevel::Normal));
        assert!(settings.fov_degrees.is_none());
    }
}
