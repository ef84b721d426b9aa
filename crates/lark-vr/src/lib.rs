#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod input;
pub mod listener;
pub mod mock;
pub mod native;
pub mod pose;
pub mod pump;
pub mod session;
pub mod texture;
pub mod types;

pub use client::XrClient;
pub use config::{ClientConfig, RenderMode, StreamSettings};
pub use input::{ControllerProfile, Hand, InputButtons, InputId, VirtualButton};
pub use listener::{Listeners, SessionListener};
pub use native::NativeSession;
pub use pose::{DeviceRig, PoseConvention, Transform};
pub use pump::{FramePump, TickOutcome, TickStats};
pub use session::{Session, SessionGate, Transition};
pub use texture::{AcquireOutcome, NullSink, TextureAcquisition, TextureSink};
pub use types::{
    ControllerInputState, DecodedTexture, DevicePoseUpdate, DeviceType, HwRenderTexture,
    HwTextureKind, Pose, QueuedFrame, TextureHandle, TextureHandles, TextureLayout, TrackingFrame,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VrError {
    #[error("streaming library unavailable: {0}")]
    Unavailable(String),
    #[error("native call {context} failed with code {code}")]
    Native { code: i32, context: String },
    #[error("adapter error: {0}")]
    Adapter(String),
}

pub type VrResult<T> = Result<T, VrError>;
