//! Joysticks and gamepads
//!
//! Joystick state arrays are owned by the native library and invalidated by
//! the next poll or disconnection, so they are returned as snapshots. An absent
//! joystick is not an error: every query degrades to empty or `None`, and
//! [`Glfw::joystick_present`] tells the two cases apart.

use std::os::raw::{c_int, c_void};

use bitflags::bitflags;

use crate::error::Result;
use crate::input::Action;
use crate::library::Glfw;
use crate::marshal::{borrow, snapshot, to_c_string, BorrowedStr, OwnedSlice, SnapshotAlloc};
use crate::sys;

/// Joystick slot id, `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Joystick(c_int);

impl Joystick {
    /// First slot.
    pub const FIRST: Self = Self(0);

    /// Slot by index; `None` past the last slot.
    pub const fn new(id: c_int) -> Option<Self> {
        if id >= 0 && id <= sys::JOYSTICK_LAST {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Every slot, in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=sys::JOYSTICK_LAST).map(Self)
    }

    /// The native id.
    pub const fn raw(self) -> c_int {
        self.0
    }
}

bitflags! {
    /// Direction of a joystick hat. Diagonals combine two bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Hat: u8 {
        /// Up.
        const UP = 0x01;
        /// Right.
        const RIGHT = 0x02;
        /// Down.
        const DOWN = 0x04;
        /// Left.
        const LEFT = 0x08;
    }
}

/// Button indices of a mapped gamepad, Xbox layout.
pub mod gamepad_button {
    /// A / cross.
    pub const A: usize = 0;
    /// B / circle.
    pub const B: usize = 1;
    /// X / square.
    pub const X: usize = 2;
    /// Y / triangle.
    pub const Y: usize = 3;
    /// Left bumper.
    pub const LEFT_BUMPER: usize = 4;
    /// Right bumper.
    pub const RIGHT_BUMPER: usize = 5;
    /// Back.
    pub const BACK: usize = 6;
    /// Start.
    pub const START: usize = 7;
    /// Guide.
    pub const GUIDE: usize = 8;
    /// Left stick press.
    pub const LEFT_THUMB: usize = 9;
    /// Right stick press.
    pub const RIGHT_THUMB: usize = 10;
    /// D-pad up.
    pub const DPAD_UP: usize = 11;
    /// D-pad right.
    pub const DPAD_RIGHT: usize = 12;
    /// D-pad down.
    pub const DPAD_DOWN: usize = 13;
    /// D-pad left.
    pub const DPAD_LEFT: usize = 14;
}

/// Axis indices of a mapped gamepad.
pub mod gamepad_axis {
    /// Left stick X.
    pub const LEFT_X: usize = 0;
    /// Left stick Y.
    pub const LEFT_Y: usize = 1;
    /// Right stick X.
    pub const RIGHT_X: usize = 2;
    /// Right stick Y.
    pub const RIGHT_Y: usize = 3;
    /// Left trigger.
    pub const LEFT_TRIGGER: usize = 4;
    /// Right trigger.
    pub const RIGHT_TRIGGER: usize = 5;
}

/// Gamepad input mapped to the standard layout. A plain copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadState {
    /// Indexed by [`gamepad_button`].
    pub buttons: [Action; 15],
    /// Indexed by [`gamepad_axis`], each in `-1.0..=1.0`.
    pub axes: [f32; 6],
}

impl From<&sys::GLFWgamepadstate> for GamepadState {
    fn from(state: &sys::GLFWgamepadstate) -> Self {
        Self {
            buttons: state
                .buttons
                .map(|b| Action::from_raw(c_int::from(b)).unwrap_or(Action::Release)),
            axes: state.axes,
        }
    }
}

impl GamepadState {
    /// Whether a button is held.
    pub fn pressed(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|&b| b == Action::Press)
    }
}

impl<A: SnapshotAlloc> Glfw<A> {
    /// Whether a joystick is connected in the slot.
    pub fn joystick_present(&self, joystick: Joystick) -> bool {
        // SAFETY: main-thread call.
        unsafe { (self.api().joystick_present)(joystick.raw()) != sys::FALSE }
    }

    /// Snapshot of the axis positions. Empty when absent.
    pub fn joystick_axes(&self, joystick: Joystick) -> Result<OwnedSlice<f32, A>> {
        let mut count: c_int = 0;
        // SAFETY: main-thread call; the out-pointer refers to a live local.
        let axes = unsafe { (self.api().get_joystick_axes)(joystick.raw(), &mut count) };
        // SAFETY: the array holds `count` values and is copied at once.
        unsafe { snapshot(axes, count, self.snapshot_alloc(), |&v| v) }
    }

    /// Snapshot of the button states. Empty when absent.
    pub fn joystick_buttons(&self, joystick: Joystick) -> Result<OwnedSlice<Action, A>> {
        let mut count: c_int = 0;
        // SAFETY: main-thread call; the out-pointer refers to a live local.
        let buttons = unsafe { (self.api().get_joystick_buttons)(joystick.raw(), &mut count) };
        // SAFETY: the array holds `count` values and is copied at once.
        unsafe {
            snapshot(buttons, count, self.snapshot_alloc(), |&b| {
                Action::from_raw(c_int::from(b)).unwrap_or(Action::Release)
            })
        }
    }

    /// Snapshot of the hat directions. Empty when absent.
    pub fn joystick_hats(&self, joystick: Joystick) -> Result<OwnedSlice<Hat, A>> {
        let mut count: c_int = 0;
        // SAFETY: main-thread call; the out-pointer refers to a live local.
        let hats = unsafe { (self.api().get_joystick_hats)(joystick.raw(), &mut count) };
        // SAFETY: the array holds `count` values and is copied at once.
        unsafe { snapshot(hats, count, self.snapshot_alloc(), |&h| Hat::from_bits_truncate(h)) }
    }

    /// Joystick name. Freed on disconnection, which any later joystick query
    /// or event poll may detect, so the result holds the session exclusively.
    pub fn joystick_name(&mut self, joystick: Joystick) -> Option<BorrowedStr<'_>> {
        // SAFETY: main-thread call; `'_` is an exclusive borrow of the session.
        unsafe { borrow((self.api().get_joystick_name)(joystick.raw())) }
    }

    /// SDL-compatible GUID. Freed on disconnection, like [`Glfw::joystick_name`].
    pub fn joystick_guid(&mut self, joystick: Joystick) -> Option<BorrowedStr<'_>> {
        // SAFETY: main-thread call; `'_` is an exclusive borrow of the session.
        unsafe { borrow((self.api().get_joystick_guid)(joystick.raw())) }
    }

    /// Attach an opaque pointer to a connected joystick.
    pub fn set_joystick_user_pointer(&self, joystick: Joystick, pointer: *mut c_void) {
        // SAFETY: the pointer is stored, not read.
        unsafe { (self.api().set_joystick_user_pointer)(joystick.raw(), pointer) };
    }

    /// The joystick's user pointer; null when unset or absent.
    pub fn joystick_user_pointer(&self, joystick: Joystick) -> *mut c_void {
        // SAFETY: main-thread call.
        unsafe { (self.api().get_joystick_user_pointer)(joystick.raw()) }
    }

    /// Whether the joystick is present and has a gamepad mapping.
    pub fn joystick_is_gamepad(&self, joystick: Joystick) -> bool {
        // SAFETY: main-thread call.
        unsafe { (self.api().joystick_is_gamepad)(joystick.raw()) != sys::FALSE }
    }

    /// Add or replace gamepad mappings from SDL `gamecontrollerdb.txt` text.
    pub fn update_gamepad_mappings(&self, mappings: &str) -> Result<()> {
        let text = to_c_string(mappings)?;
        // SAFETY: main-thread call; the text outlives the call.
        if unsafe { (self.api().update_gamepad_mappings)(text.as_ptr()) } == sys::FALSE {
            return Err(self.call_failed("glfwUpdateGamepadMappings"));
        }
        log::debug!("Updated gamepad mappings");
        Ok(())
    }

    /// Name from the gamepad mapping, `None` without a mapping.
    ///
    /// Freed by disconnection or by [`Glfw::update_gamepad_mappings`]:
    ///
    /// ```compile_fail
    /// # use glfw_marshal::Library;
    /// # use glfw_marshal::config::InitConfig;
    /// # use glfw_marshal::joystick::Joystick;
    /// let mut glfw = Library::glfw().init(&InitConfig::default()).unwrap();
    /// let name = glfw.gamepad_name(Joystick::FIRST);
    /// glfw.update_gamepad_mappings("").unwrap();
    /// assert!(name.is_none());
    /// ```
    pub fn gamepad_name(&mut self, joystick: Joystick) -> Option<BorrowedStr<'_>> {
        // SAFETY: main-thread call; `'_` is an exclusive borrow of the session.
        unsafe { borrow((self.api().get_gamepad_name)(joystick.raw())) }
    }

    /// Mapped gamepad state; `None` when absent or unmapped.
    pub fn gamepad_state(&self, joystick: Joystick) -> Option<GamepadState> {
        let mut state = sys::GLFWgamepadstate {
            buttons: [0; 15],
            axes: [0.0; 6],
        };
        // SAFETY: main-thread call; the out-pointer refers to a live local.
        let mapped = unsafe { (self.api().get_gamepad_state)(joystick.raw(), &mut state) };
        (mapped != sys::FALSE).then(|| GamepadState::from(&state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitConfig;
    use crate::error::{Error, ErrorCode};
    use crate::headless::{self, SimulatedJoystick};
    use crate::library::Library;

    const GUID: &str = "030000005e040000ea02000000000000";

    fn session() -> Glfw {
        headless::reset();
        let config = InitConfig {
            log_native_errors: false,
            ..InitConfig::default()
        };
        Library::new(headless::api()).init(&config).unwrap()
    }

    fn pad() -> SimulatedJoystick {
        SimulatedJoystick {
            name: "Headless Pad".to_string(),
            guid: GUID.to_string(),
            axes: vec![0.5, -1.0],
            buttons: vec![1, 0, 1],
            hats: vec![0x03],
        }
    }

    fn connect(description: SimulatedJoystick) -> Joystick {
        Joystick::new(headless::connect_joystick(description).unwrap()).unwrap()
    }

    #[test]
    fn test_absent_joystick_is_empty_not_error() {
        let mut glfw = session();
        assert!(!glfw.joystick_present(Joystick::FIRST));
        assert!(glfw.joystick_axes(Joystick::FIRST).unwrap().is_empty());
        assert!(glfw.joystick_name(Joystick::FIRST).is_none());
        assert!(glfw.gamepad_state(Joystick::FIRST).is_none());
        assert!(glfw.take_last_error().is_none());
    }

    #[test]
    fn test_state_snapshots() {
        let mut glfw = session();
        let joystick = connect(pad());
        assert!(glfw.joystick_present(joystick));

        let axes = glfw.joystick_axes(joystick).unwrap();
        approx::assert_relative_eq!(axes[0], 0.5);
        approx::assert_relative_eq!(axes[1], -1.0);
        assert_eq!(&*glfw.joystick_buttons(joystick).unwrap(), &[Action::Press, Action::Release, Action::Press][..]);
        assert_eq!(glfw.joystick_hats(joystick).unwrap()[0], Hat::UP | Hat::RIGHT);
        assert_eq!(glfw.joystick_name(joystick).unwrap(), "Headless Pad");
        assert_eq!(glfw.joystick_guid(joystick).unwrap(), GUID);

        headless::disconnect_joystick(joystick.raw());
        assert_eq!(axes.len(), 2);
        assert!(!glfw.joystick_present(joystick));
    }

    #[test]
    fn test_gamepad_mapping() {
        let mut glfw = session();
        let joystick = connect(pad());
        assert!(!glfw.joystick_is_gamepad(joystick));
        assert!(glfw.gamepad_state(joystick).is_none());

        glfw.update_gamepad_mappings(&format!("# comment\n{GUID},Test Controller,a:b0,b:b1,\n"))
            .unwrap();
        assert!(glfw.joystick_is_gamepad(joystick));
        assert_eq!(glfw.gamepad_name(joystick).unwrap(), "Test Controller");

        let state = glfw.gamepad_state(joystick).unwrap();
        assert!(state.pressed(gamepad_button::A));
        assert!(!state.pressed(gamepad_button::B));
        approx::assert_relative_eq!(state.axes[gamepad_axis::LEFT_X], 0.5);
    }

    #[test]
    fn test_bad_mapping_reports_cause() {
        let glfw = session();
        let err = glfw.update_gamepad_mappings("not-a-guid,Broken").unwrap_err();
        match err {
            Error::CallFailed { call, cause } => {
                assert_eq!(call, "glfwUpdateGamepadMappings");
                assert_eq!(cause.unwrap().classification, Some(ErrorCode::InvalidValue));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_connection_callback() {
        use std::sync::atomic::{AtomicI32, Ordering};
        static LAST: AtomicI32 = AtomicI32::new(-1);
        extern "C" fn on_joystick(jid: c_int, event: c_int) {
            LAST.store(jid * 0x10 + i32::from(event == sys::CONNECTED), Ordering::SeqCst);
        }

        let glfw = session();
        glfw.set_joystick_callback(Some(on_joystick));
        let joystick = connect(pad());
        assert_eq!(LAST.load(Ordering::SeqCst), -1);
        glfw.poll_events();
        assert_eq!(LAST.load(Ordering::SeqCst), joystick.raw() * 0x10 + 1);

        headless::disconnect_joystick(joystick.raw());
        glfw.poll_events();
        assert_eq!(LAST.load(Ordering::SeqCst), joystick.raw() * 0x10);
    }

    #[test]
    fn test_user_pointer() {
        let glfw = session();
        let joystick = connect(pad());
        let mut slot = 7u32;
        let address: *mut c_void = std::ptr::from_mut(&mut slot).cast();
        glfw.set_joystick_user_pointer(joystick, address);
        assert_eq!(glfw.joystick_user_pointer(joystick), address);
    }

    #[test]
    fn test_slot_range() {
        assert_eq!(Joystick::all().count(), 16);
        assert!(Joystick::new(16).is_none());
        assert!(Joystick::new(-1).is_none());
    }
}
