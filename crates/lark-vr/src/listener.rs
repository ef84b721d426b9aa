use std::fmt;
use std::sync::Arc;

use crate::types::{DecodedTexture, TrackingFrame};

/// Session events delivered to the engine side. All methods default to no-ops.
pub trait SessionListener: Send + Sync {
    fn on_connected(&self) {}
    fn on_close(&self) {}
    fn on_texture_2d(&self, _texture: &DecodedTexture) {}
    /// Stereo textures carry both eyes in `texture.handles.left/right`.
    fn on_texture_2d_stereo(&self, _texture: &DecodedTexture) {}
    fn on_media_ready(&self) {}
    fn on_tracking_frame(&self, _frame: &TrackingFrame) {}
}

/// Ordered fan-out to registered listeners. Delivery is synchronous.
#[derive(Default, Clone)]
pub struct Listeners {
    inner: Vec<Arc<dyn SessionListener>>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.inner.len())
            .finish()
    }
}

impl Listeners {
    pub fn add(&mut self, listener: Arc<dyn SessionListener>) {
        self.inner.push(listener);
    }

    pub fn connected(&self) {
        self.inner.iter().for_each(|l| l.on_connected());
    }

    pub fn close(&self) {
        self.inner.iter().for_each(|l| l.on_close());
    }

    pub fn texture_2d(&self, texture: &DecodedTexture) {
        self.inner.iter().for_each(|l| l.on_texture_2d(texture));
    }

    pub fn texture_2d_stereo(&self, texture: &DecodedTexture) {
        self.inner.iter().for_each(|l| l.on_texture_2d_stereo(texture));
    }

    pub fn media_ready(&self) {
        self.inner.iter().for_each(|l| l.on_media_ready());
    }

    pub fn tracking_frame(&self, frame: &TrackingFrame) {
        self.inner.iter().for_each(|l| l.on_tracking_frame(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SessionListener for Tagged {
        fn on_connected(&self) {
            self.log.lock().unwrap().push(self.tag);
        }
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        for tag in ["first", "second", "third"] {
            listeners.add(Arc::new(Tagged {
                tag,
                log: log.clone(),
            }));
        }
        listeners.connected();
        listeners.close();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }
}
