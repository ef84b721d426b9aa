use crate::input::InputButtons;

/// Wire pose: position in meters, rotation as an `(x, y, z, w)` quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: [0.0; 3],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Hmd = 0,
    ControllerLeft = 1,
    ControllerRight = 2,
}

/// One server-rendered frame paired with the pose it was rendered with.
///
/// When `available` is false every other field is garbage and the frame must
/// be skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingFrame {
    pub available: bool,
    pub frame_index: u64,
    pub fetch_time: u64,
    pub display_time: f64,
    pub pose: Pose,
}

impl TrackingFrame {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            frame_index: 0,
            fetch_time: 0,
            display_time: 0.0,
            pose: Pose::IDENTITY,
        }
    }
}

/// Opaque native texture pointer. Zero means "not available yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Hardware render texture type tags reported by the decoder.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwTextureKind {
    AndroidMultiview = 1,
    AndroidStereo = 2,
    D3d11Multiview = 3,
    D3d11Stereo = 4,
}

impl HwTextureKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::AndroidMultiview),
            2 => Some(Self::AndroidStereo),
            3 => Some(Self::D3d11Multiview),
            4 => Some(Self::D3d11Stereo),
            _ => None,
        }
    }

    pub fn layout(self) -> TextureLayout {
        match self {
            Self::AndroidMultiview | Self::D3d11Multiview => TextureLayout::Mono,
            Self::AndroidStereo | Self::D3d11Stereo => TextureLayout::Stereo,
        }
    }
}

/// Descriptor returned by the native "get hw render texture" query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwRenderTexture {
    /// Raw type tag; see [`HwTextureKind`].
    pub kind: i32,
    pub slot1: TextureHandle,
    pub slot2: TextureHandle,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureLayout {
    /// Single texture carrying both eyes (multiview).
    Mono,
    /// Independent left/right eye textures.
    Stereo,
}

/// The cached texture handles the renderer samples from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureHandles {
    pub left: TextureHandle,
    pub right: TextureHandle,
    pub all: TextureHandle,
}

impl TextureHandles {
    pub fn is_cleared(&self) -> bool {
        self.left.is_null() && self.right.is_null() && self.all.is_null()
    }
}

/// GPU-resident decoded video planes for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTexture {
    pub layout: TextureLayout,
    pub width: u32,
    pub height: u32,
    pub handles: TextureHandles,
}

impl DecodedTexture {
    /// Build from a descriptor, or `None` if a slot the layout needs is null.
    pub fn from_hw(layout: TextureLayout, hw: &HwRenderTexture) -> Option<Self> {
        let handles = handles_for(layout, hw)?;
        Some(Self {
            layout,
            width: hw.width,
            height: hw.height,
            handles,
        })
    }

    /// Point the existing texture at new native handles, keeping its layout.
    ///
    /// Returns false and leaves the texture untouched when the descriptor's
    /// kind tag maps to a different layout or a required slot is null.
    pub fn refresh_from(&mut self, hw: &HwRenderTexture) -> bool {
        if HwTextureKind::from_raw(hw.kind).map(HwTextureKind::layout) != Some(self.layout) {
            return false;
        }
        match handles_for(self.layout, hw) {
            Some(handles) => {
                self.handles = handles;
                self.width = hw.width;
                self.height = hw.height;
                true
            }
            None => false,
        }
    }
}

fn handles_for(layout: TextureLayout, hw: &HwRenderTexture) -> Option<TextureHandles> {
    match layout {
        TextureLayout::Mono => {
            if hw.slot1.is_null() {
                return None;
            }
            Some(TextureHandles {
                all: hw.slot1,
                ..TextureHandles::default()
            })
        }
        TextureLayout::Stereo => {
            if hw.slot1.is_null() || hw.slot2.is_null() {
                return None;
            }
            Some(TextureHandles {
                left: hw.slot1,
                right: hw.slot2,
                all: TextureHandle::NULL,
            })
        }
    }
}

/// A buffered `(texture, frame)` pair handed out by the render queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedFrame {
    pub texture: HwRenderTexture,
    pub frame: TrackingFrame,
}

/// Per-controller input state sent upstream every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerInputState {
    pub device_type: DeviceType,
    pub is_connected: bool,
    pub buttons: InputButtons,
    pub touch_pad_axis: [f32; 2],
    pub trigger_value: f32,
    pub grip_value: f32,
    pub battery_percent_remaining: u32,
}

/// Everything pushed upstream after a tick: three poses plus both
/// controllers' input state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePoseUpdate {
    pub hmd: Pose,
    pub left: Pose,
    pub right: Pose,
    pub left_input: ControllerInputState,
    pub right_input: ControllerInputState,
}
