use std::sync::Arc;

use tracing::{error, info};

use crate::config::{ClientConfig, RenderMode};
use crate::listener::{Listeners, SessionListener};
use crate::native::NativeSession;
use crate::pose::DeviceRig;
use crate::pump::{FramePump, TickOutcome, TickStats};
use crate::session::{Session, SessionGate, Transition};
use crate::texture::{NullSink, TextureAcquisition, TextureSink};
use crate::VrResult;

/// One streaming context per process: the native session plus all state the
/// per-tick loop needs. Construct once and hand references to whoever needs
/// it.
pub struct XrClient<N: NativeSession> {
    native: N,
    config: ClientConfig,
    session: Session,
    gate: SessionGate,
    acquisition: TextureAcquisition,
    pump: FramePump,
    listeners: Listeners,
    sink: Box<dyn TextureSink>,
    rig: DeviceRig,
}

impl<N: NativeSession> XrClient<N> {
    pub fn new(mut native: N, config: ClientConfig) -> VrResult<Self> {
        native.init_context()?;
        info!(mode = ?config.render_mode(), profile = ?config.controller_profile, "streaming context created");
        let pump = FramePump::new(&config);
        Ok(Self {
            native,
            config,
            session: Session::default(),
            gate: SessionGate::default(),
            acquisition: TextureAcquisition::default(),
            pump,
            listeners: Listeners::default(),
            sink: Box::new(NullSink),
            rig: DeviceRig::default(),
        })
    }

    pub fn with_sink(mut self, sink: impl TextureSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SessionListener>) {
        self.listeners.add(listener);
    }

    /// Authorize against the SDK with the configured credentials.
    ///
    /// Failure is logged and returned; the context stays usable but the
    /// server will refuse to stream.
    pub fn authorize(&mut self) -> VrResult<()> {
        let (Some(key), Some(secret)) = (&self.config.app_key, &self.config.app_secret) else {
            info!("no SDK credentials configured, skipping authorization");
            return Ok(());
        };
        match self.native.authorize(key, secret) {
            Ok(()) => {
                info!("SDK authorized");
                Ok(())
            }
            Err(err) => {
                error!(%err, "SDK authorization failed, streaming will not start");
                Err(err)
            }
        }
    }

    /// Push stream settings and the render-queue size to the native layer.
    pub fn apply_stream_settings(&mut self) {
        self.native.configure(&self.config.stream);
        if let RenderMode::Queue { size } = self.pump.mode() {
            self.native.set_render_queue_size(size);
        }
    }

    /// Run one engine tick.
    ///
    /// Polls the connection edge first. A fresh connection resets the local
    /// transforms, a lost one forgets acquisition attempts. Until a decoded
    /// texture is acquired the tick only retries acquisition; afterwards it
    /// hands off to the [`FramePump`].
    pub fn update(&mut self) -> TickOutcome {
        match self.gate.poll(&self.native, &mut self.session, &self.listeners) {
            Transition::Connected => self.rig.reset_transforms(),
            Transition::Disconnected => self.acquisition.reset(),
            Transition::None => {}
        }
        if !self.session.connected {
            return TickOutcome::Inactive;
        }
        if !self.session.frame_initialized {
            self.acquisition
                .try_acquire(&self.native, &mut self.session, &self.listeners);
            return TickOutcome::Acquiring;
        }
        self.pump.tick(
            &mut self.native,
            &mut self.session,
            &mut self.acquisition,
            &self.listeners,
            self.sink.as_mut(),
            &self.rig,
        )
    }

    pub fn pause(&mut self) {
        info!("streaming paused");
        self.native.on_pause();
    }

    pub fn resume(&mut self) {
        info!("streaming resumed");
        self.native.on_resume();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn acquisition(&self) -> &TextureAcquisition {
        &self.acquisition
    }

    pub fn rig(&self) -> &DeviceRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut DeviceRig {
        &mut self.rig
    }

    pub fn stats(&self) -> TickStats {
        self.pump.stats()
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut N {
        &mut self.native
    }
}

impl<N: NativeSession> Drop for XrClient<N> {
    fn drop(&mut self) {
        self.native.release_context();
        info!("streaming context released");
    }
}
