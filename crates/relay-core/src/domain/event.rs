//! Portable representation of one captured low-level mouse event.
//!
//! A [`RawInputEvent`] is created inside the OS hook callback at the moment the
//! OS delivers the event, handed by reference to every observer, and dropped
//! when dispatch returns.  It is never mutated and never reused for a second
//! physical event.
//!
//! The paired [`HookDispatchResult`] is the only mutable state of a dispatch
//! cycle: observers set `handled` to stop propagation and suppress the event.

use serde::{Deserialize, Serialize};

/// Screen position in virtual screen coordinates (multi-monitor aware).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Bitmask describing what happened in a [`RawInputEvent`].
///
/// Bit values follow the Win32 `MOUSEEVENTF_*` layout so the Windows hook can
/// translate window messages without a lookup table.  Bits above the low word
/// are reserved for capture metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventFlags(pub u32);

impl EventFlags {
    pub const MOVE: u32 = 0x0001;
    pub const LEFT_DOWN: u32 = 0x0002;
    pub const LEFT_UP: u32 = 0x0004;
    pub const RIGHT_DOWN: u32 = 0x0008;
    pub const RIGHT_UP: u32 = 0x0010;
    pub const MIDDLE_DOWN: u32 = 0x0020;
    pub const MIDDLE_UP: u32 = 0x0040;
    pub const X_DOWN: u32 = 0x0080;
    pub const X_UP: u32 = 0x0100;
    pub const WHEEL: u32 = 0x0800;
    pub const HWHEEL: u32 = 0x1000;
    /// The event was synthesized by software rather than a physical device.
    pub const INJECTED: u32 = 0x0001_0000;

    const BUTTON_DOWN_MASK: u32 =
        Self::LEFT_DOWN | Self::RIGHT_DOWN | Self::MIDDLE_DOWN | Self::X_DOWN;
    const BUTTON_UP_MASK: u32 = Self::LEFT_UP | Self::RIGHT_UP | Self::MIDDLE_UP | Self::X_UP;

    /// Returns the raw bit pattern.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit in `bits` is set.
    pub const fn contains(self, bits: u32) -> bool {
        bits != 0 && self.0 & bits == bits
    }

    /// Returns `true` if any button-down bit is set.
    pub fn is_button_down(self) -> bool {
        self.0 & Self::BUTTON_DOWN_MASK != 0
    }

    /// Returns `true` if any button-up bit is set.
    pub fn is_button_up(self) -> bool {
        self.0 & Self::BUTTON_UP_MASK != 0
    }

    /// Returns `true` if either wheel bit is set.
    pub fn is_wheel(self) -> bool {
        self.0 & (Self::WHEEL | Self::HWHEEL) != 0
    }

    /// Returns `true` if the event was synthesized by software.
    pub fn is_injected(self) -> bool {
        self.contains(Self::INJECTED)
    }
}

impl std::ops::BitOr<u32> for EventFlags {
    type Output = EventFlags;

    fn bitor(self, rhs: u32) -> Self::Output {
        EventFlags(self.0 | rhs)
    }
}

impl From<u32> for EventFlags {
    fn from(bits: u32) -> Self {
        EventFlags(bits)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

/// Decoded meaning of a [`RawInputEvent`]'s flags and auxiliary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    /// The cursor moved to [`RawInputEvent::position`].
    Move,
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Vertical wheel; positive = away from user.
    Wheel { delta: i16 },
    /// Horizontal wheel; positive = right.
    HorizontalWheel { delta: i16 },
    /// No recognised action bit is set.
    Unknown,
}

/// One low-level input event, immutable after construction.
///
/// Fields are private; accessors return copies.  The OS hook builds exactly one
/// instance per physical event and observers only ever see `&RawInputEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInputEvent {
    position: Point,
    auxiliary_data: u32,
    flags: EventFlags,
    timestamp_ms: u32,
    extra: u64,
}

impl RawInputEvent {
    /// Creates an event from the values the OS delivered.
    pub fn new(
        position: Point,
        auxiliary_data: u32,
        flags: EventFlags,
        timestamp_ms: u32,
        extra: u64,
    ) -> Self {
        Self {
            position,
            auxiliary_data,
            flags,
            timestamp_ms,
            extra,
        }
    }

    /// Absolute cursor position at the time of the event.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Device-specific data: wheel delta or X-button id in the high word.
    pub fn auxiliary_data(&self) -> u32 {
        self.auxiliary_data
    }

    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// OS tick count (milliseconds) at capture.
    pub fn timestamp_ms(&self) -> u32 {
        self.timestamp_ms
    }

    /// Platform-reserved value (`dwExtraInfo` on Windows).
    pub fn extra(&self) -> u64 {
        self.extra
    }

    /// Signed high word of the auxiliary data, as used by wheel events.
    pub fn wheel_delta(&self) -> i16 {
        (self.auxiliary_data >> 16) as u16 as i16
    }

    /// Decodes the flag bitmask into a single [`MouseAction`].
    ///
    /// Button transitions take precedence over wheel bits, which take
    /// precedence over movement.
    pub fn action(&self) -> MouseAction {
        let f = self.flags;
        let x_button = || {
            if (self.auxiliary_data >> 16) as u16 == 2 {
                MouseButton::X2
            } else {
                MouseButton::X1
            }
        };

        if f.contains(EventFlags::LEFT_DOWN) {
            MouseAction::ButtonDown(MouseButton::Left)
        } else if f.contains(EventFlags::LEFT_UP) {
            MouseAction::ButtonUp(MouseButton::Left)
        } else if f.contains(EventFlags::RIGHT_DOWN) {
            MouseAction::ButtonDown(MouseButton::Right)
        } else if f.contains(EventFlags::RIGHT_UP) {
            MouseAction::ButtonUp(MouseButton::Right)
        } else if f.contains(EventFlags::MIDDLE_DOWN) {
            MouseAction::ButtonDown(MouseButton::Middle)
        } else if f.contains(EventFlags::MIDDLE_UP) {
            MouseAction::ButtonUp(MouseButton::Middle)
        } else if f.contains(EventFlags::X_DOWN) {
            MouseAction::ButtonDown(x_button())
        } else if f.contains(EventFlags::X_UP) {
            MouseAction::ButtonUp(x_button())
        } else if f.contains(EventFlags::WHEEL) {
            MouseAction::Wheel {
                delta: self.wheel_delta(),
            }
        } else if f.contains(EventFlags::HWHEEL) {
            MouseAction::HorizontalWheel {
                delta: self.wheel_delta(),
            }
        } else if f.contains(EventFlags::MOVE) {
            MouseAction::Move
        } else {
            MouseAction::Unknown
        }
    }
}

/// Outcome of dispatching one [`RawInputEvent`] to the observers.
///
/// Created fresh for every event by the dispatcher; never shared.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HookDispatchResult {
    /// Set to `true` to stop dispatch and suppress default OS processing.
    pub handled: bool,
}

impl HookDispatchResult {
    pub fn new() -> Self {
        Self::default()
    }
}
