//! First-frame texture acquisition and the renderer-facing refresh sink.

use tracing::{debug, info, warn};

use crate::listener::Listeners;
use crate::native::NativeSession;
use crate::session::Session;
use crate::types::{DecodedTexture, HwTextureKind, TextureLayout};

/// Receives the current native handles every rendered tick so the engine can
/// point its textures at them.
pub trait TextureSink {
    fn refresh(&mut self, texture: &DecodedTexture);
}

/// Sink for hosts that sample the handles themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TextureSink for NullSink {
    fn refresh(&mut self, _texture: &DecodedTexture) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Texture classified and announced; the session is now ready.
    Acquired(TextureLayout),
    /// Already ready; cached handles re-read from the decoder, no events.
    Refreshed,
    /// Already ready and the decoder had nothing usable this tick.
    AlreadyReady,
    NotConnected,
    /// The decoder has not produced its first frame yet.
    NotInitialized,
    NoDescriptor,
    /// A slot the layout needs is still null.
    NullSlot(TextureLayout),
    Unsupported(i32),
}

impl AcquireOutcome {
    pub fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired(_))
    }
}

#[derive(Debug, Default)]
pub struct TextureAcquisition {
    attempts: u64,
}

impl TextureAcquisition {
    /// Attempts made since the last successful acquisition or disconnect.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Poll the decoder for its texture descriptor.
    ///
    /// The first success per connection fires `on_texture_2d` or
    /// `on_texture_2d_stereo`, then `on_media_ready`. Once ready, later calls
    /// only refresh the cached handles in place and never re-fire or
    /// reclassify.
    pub fn try_acquire<N: NativeSession + ?Sized>(
        &mut self,
        native: &N,
        session: &mut Session,
        listeners: &Listeners,
    ) -> AcquireOutcome {
        if !session.connected {
            return AcquireOutcome::NotConnected;
        }
        if session.frame_initialized {
            return Self::refresh_ready(native, session);
        }

        self.attempts += 1;
        if !native.is_frame_initialized() {
            debug!(attempts = self.attempts, "decoder not initialized yet");
            return AcquireOutcome::NotInitialized;
        }
        let Some(hw) = native.hw_render_texture() else {
            debug!(attempts = self.attempts, "no hw render texture yet");
            return AcquireOutcome::NoDescriptor;
        };
        let Some(kind) = HwTextureKind::from_raw(hw.kind) else {
            warn!(kind = hw.kind, "unsupported hw render texture type");
            return AcquireOutcome::Unsupported(hw.kind);
        };

        let layout = kind.layout();
        let Some(texture) = DecodedTexture::from_hw(layout, &hw) else {
            warn!(?kind, slot1 = hw.slot1.0, slot2 = hw.slot2.0, "hw render texture slot is null");
            return AcquireOutcome::NullSlot(layout);
        };

        session.texture = Some(texture);
        session.frame_initialized = true;
        session.is_stereo_texture = layout == TextureLayout::Stereo;
        info!(
            ?kind,
            width = texture.width,
            height = texture.height,
            attempts = self.attempts,
            "decoded texture ready"
        );
        self.attempts = 0;

        match layout {
            TextureLayout::Mono => listeners.texture_2d(&texture),
            TextureLayout::Stereo => listeners.texture_2d_stereo(&texture),
        }
        listeners.media_ready();
        AcquireOutcome::Acquired(layout)
    }

    fn refresh_ready<N: NativeSession + ?Sized>(native: &N, session: &mut Session) -> AcquireOutcome {
        let (Some(texture), Some(hw)) = (session.texture.as_mut(), native.hw_render_texture())
        else {
            return AcquireOutcome::AlreadyReady;
        };
        if texture.refresh_from(&hw) {
            AcquireOutcome::Refreshed
        } else {
            debug!(kind = hw.kind, "ignoring hw render texture that does not match the session layout");
            AcquireOutcome::AlreadyReady
        }
    }

    /// Forget failed attempts from a previous connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
