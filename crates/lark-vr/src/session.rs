//! Connection state and the edge-triggered gate that drives it.

use tracing::info;

use crate::listener::Listeners;
use crate::native::NativeSession;
use crate::types::{DecodedTexture, TextureHandles};

/// Logical connection to the cloud render host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub connected: bool,
    pub frame_initialized: bool,
    pub is_stereo_texture: bool,
    pub(crate) texture: Option<DecodedTexture>,
}

impl Session {
    pub fn texture(&self) -> Option<&DecodedTexture> {
        self.texture.as_ref()
    }

    /// Cached handles; all null until a texture has been acquired.
    pub fn handles(&self) -> TextureHandles {
        self.texture.map(|t| t.handles).unwrap_or_default()
    }

    fn clear_media(&mut self) {
        self.frame_initialized = false;
        self.is_stereo_texture = false;
        self.texture = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Connected,
    Disconnected,
}

/// Turns the level-triggered "is connected" query into connect/close edges.
#[derive(Debug, Default)]
pub struct SessionGate {
    connects: u64,
}

impl SessionGate {
    /// Number of false→true edges observed so far.
    pub fn connects(&self) -> u64 {
        self.connects
    }

    pub fn poll<N: NativeSession + ?Sized>(
        &mut self,
        native: &N,
        session: &mut Session,
        listeners: &Listeners,
    ) -> Transition {
        let live = native.is_connected();
        match (session.connected, live) {
            (false, true) => {
                session.connected = true;
                self.connects += 1;
                info!(connects = self.connects, "cloud session connected");
                listeners.connected();
                Transition::Connected
            }
            (true, false) => {
                session.connected = false;
                session.clear_media();
                info!("cloud session closed");
                listeners.close();
                Transition::Disconnected
            }
            _ => Transition::None,
        }
    }
}
