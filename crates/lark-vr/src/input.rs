//! Controller input: the shared button bit layout, the engine-side virtual
//! buttons and the two profiles that map one onto the other.
//!
//! Button bits are `1 << InputId` and are shared with the render server, so
//! the discriminants below must never be reordered.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::{ControllerInputState, DeviceType};

/// Input identifiers as indexed by the server.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputId {
    SystemClick = 0,
    ApplicationMenuClick = 1,
    GripClick = 2,
    DpadLeftClick = 3,
    DpadUpClick = 4,
    DpadRightClick = 5,
    DpadDownClick = 6,
    AClick = 7,
    ATouch = 8,
    BClick = 9,
    BTouch = 10,
    XClick = 11,
    XTouch = 12,
    YClick = 13,
    YTouch = 14,
    TriggerLeftValue = 15,
    TriggerRightValue = 16,
    ShoulderLeftClick = 17,
    ShoulderRightClick = 18,
    JoystickLeftClick = 19,
    JoystickLeftX = 20,
    JoystickLeftY = 21,
    JoystickRightClick = 22,
    JoystickRightX = 23,
    JoystickRightY = 24,
    JoystickClick = 25,
    JoystickX = 26,
    JoystickY = 27,
    JoystickTouch = 28,
    BackClick = 29,
    GuideClick = 30,
    StartClick = 31,
    TriggerClick = 32,
    TriggerValue = 33,
    TriggerTouch = 34,
    TrackpadX = 35,
    TrackpadY = 36,
    TrackpadClick = 37,
    TrackpadTouch = 38,
}

impl InputId {
    pub const fn bit(self) -> u64 {
        1u64 << self as u64
    }
}

bitflags! {
    /// Outbound controller button bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputButtons: u64 {
        const SYSTEM_CLICK = InputId::SystemClick.bit();
        const APPLICATION_MENU_CLICK = InputId::ApplicationMenuClick.bit();
        const GRIP_CLICK = InputId::GripClick.bit();
        const DPAD_LEFT_CLICK = InputId::DpadLeftClick.bit();
        const DPAD_UP_CLICK = InputId::DpadUpClick.bit();
        const DPAD_RIGHT_CLICK = InputId::DpadRightClick.bit();
        const DPAD_DOWN_CLICK = InputId::DpadDownClick.bit();
        const A_CLICK = InputId::AClick.bit();
        const A_TOUCH = InputId::ATouch.bit();
        const B_CLICK = InputId::BClick.bit();
        const B_TOUCH = InputId::BTouch.bit();
        const X_CLICK = InputId::XClick.bit();
        const X_TOUCH = InputId::XTouch.bit();
        const Y_CLICK = InputId::YClick.bit();
        const Y_TOUCH = InputId::YTouch.bit();
        const TRIGGER_LEFT_VALUE = InputId::TriggerLeftValue.bit();
        const TRIGGER_RIGHT_VALUE = InputId::TriggerRightValue.bit();
        const SHOULDER_LEFT_CLICK = InputId::ShoulderLeftClick.bit();
        const SHOULDER_RIGHT_CLICK = InputId::ShoulderRightClick.bit();
        const JOYSTICK_LEFT_CLICK = InputId::JoystickLeftClick.bit();
        const JOYSTICK_LEFT_X = InputId::JoystickLeftX.bit();
        const JOYSTICK_LEFT_Y = InputId::JoystickLeftY.bit();
        const JOYSTICK_RIGHT_CLICK = InputId::JoystickRightClick.bit();
        const JOYSTICK_RIGHT_X = InputId::JoystickRightX.bit();
        const JOYSTICK_RIGHT_Y = InputId::JoystickRightY.bit();
        const JOYSTICK_CLICK = InputId::JoystickClick.bit();
        const JOYSTICK_X = InputId::JoystickX.bit();
        const JOYSTICK_Y = InputId::JoystickY.bit();
        const JOYSTICK_TOUCH = InputId::JoystickTouch.bit();
        const BACK_CLICK = InputId::BackClick.bit();
        const GUIDE_CLICK = InputId::GuideClick.bit();
        const START_CLICK = InputId::StartClick.bit();
        const TRIGGER_CLICK = InputId::TriggerClick.bit();
        const TRIGGER_VALUE = InputId::TriggerValue.bit();
        const TRIGGER_TOUCH = InputId::TriggerTouch.bit();
        const TRACKPAD_X = InputId::TrackpadX.bit();
        const TRACKPAD_Y = InputId::TrackpadY.bit();
        const TRACKPAD_CLICK = InputId::TrackpadClick.bit();
        const TRACKPAD_TOUCH = InputId::TrackpadTouch.bit();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn device_type(self) -> DeviceType {
        match self {
            Self::Left => DeviceType::ControllerLeft,
            Self::Right => DeviceType::ControllerRight,
        }
    }
}

/// On-screen / engine-side buttons a user can hold.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualButton {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    Joystick = 4,
    Menu = 5,
    Trigger = 6,
    Grip = 7,
}

impl VirtualButton {
    pub const ALL: [Self; 8] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Joystick,
        Self::Menu,
        Self::Trigger,
        Self::Grip,
    ];
}

/// Set of virtual buttons currently held on one hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedButtons(u8);

impl PressedButtons {
    pub fn press(&mut self, button: VirtualButton) {
        self.0 |= 1 << button as u8;
    }

    pub fn release(&mut self, button: VirtualButton) {
        self.0 &= !(1 << button as u8);
    }

    pub fn set(&mut self, button: VirtualButton, pressed: bool) {
        if pressed {
            self.press(button);
        } else {
            self.release(button);
        }
    }

    pub fn is_pressed(self, button: VirtualButton) -> bool {
        self.0 & (1 << button as u8) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = VirtualButton> {
        VirtualButton::ALL
            .into_iter()
            .filter(move |button| self.is_pressed(*button))
    }
}

/// Maps one held virtual button on a hand to its wire bits.
pub type ButtonMapper = fn(Hand, VirtualButton) -> InputButtons;

/// Which controller button semantics to report to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerProfile {
    /// Touch-style controllers: A/B on the right hand, X/Y on the left.
    #[default]
    Standard,
    /// Wand-style controllers: trackpad, trigger, menu and grip only.
    Alternate,
}

impl ControllerProfile {
    pub fn mapper(self) -> ButtonMapper {
        match self {
            Self::Standard => map_standard,
            Self::Alternate => map_alternate,
        }
    }
}

fn map_standard(hand: Hand, button: VirtualButton) -> InputButtons {
    match (hand, button) {
        (Hand::Right, VirtualButton::A) => InputButtons::A_CLICK,
        (Hand::Right, VirtualButton::B) => InputButtons::B_CLICK,
        (Hand::Left, VirtualButton::X) => InputButtons::X_CLICK,
        (Hand::Left, VirtualButton::Y) => InputButtons::Y_CLICK,
        (_, VirtualButton::Joystick) => InputButtons::JOYSTICK_CLICK,
        (_, VirtualButton::Menu) => InputButtons::APPLICATION_MENU_CLICK,
        (_, VirtualButton::Trigger) => InputButtons::TRIGGER_CLICK,
        (_, VirtualButton::Grip) => InputButtons::GRIP_CLICK,
        _ => InputButtons::empty(),
    }
}

fn map_alternate(_hand: Hand, button: VirtualButton) -> InputButtons {
    match button {
        VirtualButton::Joystick => InputButtons::TRACKPAD_CLICK,
        VirtualButton::Trigger => InputButtons::TRIGGER_CLICK,
        VirtualButton::Menu => InputButtons::APPLICATION_MENU_CLICK,
        VirtualButton::Grip => InputButtons::GRIP_CLICK,
        _ => InputButtons::empty(),
    }
}

/// Build the outbound input state for one hand.
///
/// Analog trigger/grip are forced to 0.0/1.0 from the digital buttons and the
/// touchpad reports full-up while the joystick is held.
pub fn controller_input(
    hand: Hand,
    pressed: PressedButtons,
    mapper: ButtonMapper,
) -> ControllerInputState {
    let buttons = pressed
        .iter()
        .fold(InputButtons::empty(), |acc, button| acc | mapper(hand, button));
    let analog = |button| if pressed.is_pressed(button) { 1.0 } else { 0.0 };
    let touch_pad_axis = if pressed.is_pressed(VirtualButton::Joystick) {
        [0.0, 1.0]
    } else {
        [0.0, 0.0]
    };

    ControllerInputState {
        device_type: hand.device_type(),
        is_connected: true,
        buttons,
        touch_pad_axis,
        trigger_value: analog(VirtualButton::Trigger),
        grip_value: analog(VirtualButton::Grip),
        battery_percent_remaining: 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout_is_fixed() {
        assert_eq!(InputButtons::SYSTEM_CLICK.bits(), 1);
        assert_eq!(InputButtons::GRIP_CLICK.bits(), 1 << 2);
        assert_eq!(InputButtons::A_CLICK.bits(), 1 << 7);
        assert_eq!(InputButtons::X_CLICK.bits(), 1 << 11);
        assert_eq!(InputButtons::JOYSTICK_CLICK.bits(), 1 << 25);
        assert_eq!(InputButtons::TRIGGER_CLICK.bits(), 1 << 32);
        assert_eq!(InputButtons::TRACKPAD_TOUCH.bits(), 1 << 38);
    }

    #[test]
    fn test_pressed_buttons_press_release() {
        let mut pressed = PressedButtons::default();
        pressed.press(VirtualButton::Grip);
        pressed.press(VirtualButton::A);
        assert!(pressed.is_pressed(VirtualButton::Grip));
        pressed.release(VirtualButton::Grip);
        assert!(!pressed.is_pressed(VirtualButton::Grip));
        assert_eq!(pressed.iter().collect::<Vec<_>>(), vec![VirtualButton::A]);
    }

    #[test]
    fn test_standard_respects_handedness() {
        let map = ControllerProfile::Standard.mapper();
        assert_eq!(map(Hand::Right, VirtualButton::A), InputButtons::A_CLICK);
        assert!(map(Hand::Left, VirtualButton::A).is_empty());
        assert_eq!(map(Hand::Left, VirtualButton::Y), InputButtons::Y_CLICK);
        assert!(map(Hand::Right, VirtualButton::Y).is_empty());
    }

    #[test]
    fn test_alternate_maps_joystick_to_trackpad() {
        let map = ControllerProfile::Alternate.mapper();
        assert_eq!(
            map(Hand::Left, VirtualButton::Joystick),
            InputButtons::TRACKPAD_CLICK
        );
        for button in [VirtualButton::A, VirtualButton::B, VirtualButton::X, VirtualButton::Y] {
            assert!(map(Hand::Right, button).is_empty());
        }
    }

    #[test]
    fn test_standard_single_bit_per_button() {
        let map = ControllerProfile::Standard.mapper();
        for hand in [Hand::Left, Hand::Right] {
            for button in VirtualButton::ALL {
                let bits = map(hand, button);
                if bits.is_empty() {
                    continue;
                }
                let mut pressed = PressedButtons::default();
                pressed.press(button);
                let state = controller_input(hand, pressed, map);
                assert_eq!(state.buttons, bits, "{hand:?} {button:?}");
                assert_eq!(state.buttons.bits().count_ones(), 1);

                pressed.release(button);
                let state = controller_input(hand, pressed, map);
                assert!(state.buttons.is_empty());
            }
        }
    }

    #[test]
    fn test_analog_values_forced_binary() {
        let map = ControllerProfile::Standard.mapper();
        let mut pressed = PressedButtons::default();
        let idle = controller_input(Hand::Left, pressed, map);
        assert_eq!((idle.trigger_value, idle.grip_value), (0.0, 0.0));
        assert_eq!(idle.touch_pad_axis, [0.0, 0.0]);

        pressed.press(VirtualButton::Trigger);
        pressed.press(VirtualButton::Joystick);
        let held = controller_input(Hand::Left, pressed, map);
        assert_eq!((held.trigger_value, held.grip_value), (1.0, 0.0));
        assert_eq!(held.touch_pad_axis, [0.0, 1.0]);
        assert_eq!(held.device_type, DeviceType::ControllerLeft);
        assert_eq!(held.battery_percent_remaining, 100);
    }

    #[test]
    fn test_profile_serde_names() {
        let profile: ControllerProfile = serde_json::from_str("\"alternate\"").unwrap();
        assert_eq!(profile, ControllerProfile::Alternate);
    }
}
