//! Keyboard, mouse, cursor and clipboard
//!
//! Raw tokens from the native library are given closed Rust types where the
//! set of values is fixed (actions, cursor modes, standard shapes) and thin
//! newtypes where it is open-ended (keys, mouse buttons).
//!
//! Window and cursor handles passed here must be live; see
//! [handle validity](crate::Glfw#handle-validity).

use std::os::raw::c_int;

use bitflags::bitflags;

use crate::config::native_bool;
use crate::error::Result;
use crate::geometry::{out2, CursorPos, Position};
use crate::handle::{cursor_ptr, CursorHandle, WindowHandle};
use crate::library::Glfw;
use crate::marshal::{borrow, to_c_string, BorrowedStr, SnapshotAlloc};
use crate::sys;
use crate::window::Image;

/// State transition of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Released.
    Release,
    /// Pressed.
    Press,
    /// Held down long enough to repeat.
    Repeat,
}

impl Action {
    /// Decode a native action token.
    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            sys::RELEASE => Some(Self::Release),
            sys::PRESS => Some(Self::Press),
            sys::REPEAT => Some(Self::Repeat),
            _ => None,
        }
    }

    /// The native token.
    pub const fn raw(self) -> c_int {
        match self {
            Self::Release => sys::RELEASE,
            Self::Press => sys::PRESS,
            Self::Repeat => sys::REPEAT,
        }
    }
}

bitflags! {
    /// Modifier keys held during a key or mouse button event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: c_int {
        /// Either Shift key.
        const SHIFT = sys::MOD_SHIFT;
        /// Either Control key.
        const CONTROL = sys::MOD_CONTROL;
        /// Either Alt key.
        const ALT = sys::MOD_ALT;
        /// Either Super key.
        const SUPER = sys::MOD_SUPER;
        /// Caps Lock is on. Reported only with lock key mods enabled.
        const CAPS_LOCK = sys::MOD_CAPS_LOCK;
        /// Num Lock is on. Reported only with lock key mods enabled.
        const NUM_LOCK = sys::MOD_NUM_LOCK;
    }
}

impl Modifiers {
    /// Decode a callback's modifier parameter, dropping unknown bits.
    pub const fn from_raw(raw: c_int) -> Self {
        Self::from_bits_truncate(raw)
    }
}

/// A keyboard key token. Layout-independent: names the physical US key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub c_int);

impl Key {
    /// Key the platform could not map.
    pub const UNKNOWN: Self = Self(sys::KEY_UNKNOWN);
    /// Space bar.
    pub const SPACE: Self = Self(32);
    /// `A`.
    pub const A: Self = Self(sys::KEY_A);
    /// `Z`.
    pub const Z: Self = Self(sys::KEY_Z);
    /// Escape.
    pub const ESCAPE: Self = Self(256);
    /// Enter.
    pub const ENTER: Self = Self(257);
    /// Tab.
    pub const TAB: Self = Self(258);
    /// Backspace.
    pub const BACKSPACE: Self = Self(259);
    /// Right arrow.
    pub const RIGHT: Self = Self(262);
    /// Left arrow.
    pub const LEFT: Self = Self(263);
    /// Down arrow.
    pub const DOWN: Self = Self(264);
    /// Up arrow.
    pub const UP: Self = Self(265);
    /// F1.
    pub const F1: Self = Self(290);
    /// Left Shift.
    pub const LEFT_SHIFT: Self = Self(340);
    /// Left Control.
    pub const LEFT_CONTROL: Self = Self(341);
    /// Highest valid key token.
    pub const LAST: Self = Self(sys::KEY_LAST);

    /// Letter key for an ASCII letter, either case.
    pub const fn letter(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Self(upper as c_int))
        } else {
            None
        }
    }
}

/// A mouse button, `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MouseButton(c_int);

impl MouseButton {
    /// Primary button.
    pub const LEFT: Self = Self(0);
    /// Secondary button.
    pub const RIGHT: Self = Self(1);
    /// Middle button.
    pub const MIDDLE: Self = Self(2);

    /// Button by index; `None` past the last supported button.
    pub const fn new(index: c_int) -> Option<Self> {
        if index >= 0 && index <= sys::MOUSE_BUTTON_LAST {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The native token.
    pub const fn raw(self) -> c_int {
        self.0
    }
}

/// How the cursor behaves over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorMode {
    /// Visible and unconstrained.
    Normal,
    /// Invisible over the content area.
    Hidden,
    /// Hidden and locked to the window, for unbounded motion.
    Disabled,
}

impl CursorMode {
    const fn raw(self) -> c_int {
        match self {
            Self::Normal => sys::CURSOR_NORMAL,
            Self::Hidden => sys::CURSOR_HIDDEN,
            Self::Disabled => sys::CURSOR_DISABLED,
        }
    }

    const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            sys::CURSOR_NORMAL => Some(Self::Normal),
            sys::CURSOR_HIDDEN => Some(Self::Hidden),
            sys::CURSOR_DISABLED => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// A per-window input mode together with its value.
///
/// When passed to [`Glfw::input_mode`] only the variant matters; the payload
/// of the result carries the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Cursor behaviour.
    Cursor(CursorMode),
    /// Keep key presses readable until polled.
    StickyKeys(bool),
    /// Keep button presses readable until polled.
    StickyMouseButtons(bool),
    /// Report Caps Lock and Num Lock in modifiers.
    LockKeyMods(bool),
    /// Unscaled, unaccelerated motion while the cursor is disabled. Check
    /// [`Glfw::raw_mouse_motion_supported`] first.
    RawMouseMotion(bool),
}

impl InputMode {
    const fn token(self) -> c_int {
        match self {
            Self::Cursor(_) => sys::CURSOR,
            Self::StickyKeys(_) => sys::STICKY_KEYS,
            Self::StickyMouseButtons(_) => sys::STICKY_MOUSE_BUTTONS,
            Self::LockKeyMods(_) => sys::LOCK_KEY_MODS,
            Self::RawMouseMotion(_) => sys::RAW_MOUSE_MOTION,
        }
    }

    const fn value(self) -> c_int {
        match self {
            Self::Cursor(mode) => mode.raw(),
            Self::StickyKeys(on) | Self::StickyMouseButtons(on) | Self::LockKeyMods(on) | Self::RawMouseMotion(on) => {
                native_bool(on)
            }
        }
    }

    const fn with_value(self, raw: c_int) -> Option<Self> {
        let on = raw != sys::FALSE;
        Some(match self {
            Self::Cursor(_) => match CursorMode::from_raw(raw) {
                Some(mode) => Self::Cursor(mode),
                None => return None,
            },
            Self::StickyKeys(_) => Self::StickyKeys(on),
            Self::StickyMouseButtons(_) => Self::StickyMouseButtons(on),
            Self::LockKeyMods(_) => Self::LockKeyMods(on),
            Self::RawMouseMotion(_) => Self::RawMouseMotion(on),
        })
    }
}

/// Cursor shapes provided by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardCursor {
    /// Regular arrow.
    Arrow,
    /// Text input I-beam.
    IBeam,
    /// Crosshair.
    Crosshair,
    /// Pointing hand.
    Hand,
    /// Horizontal resize arrows.
    HResize,
    /// Vertical resize arrows.
    VResize,
}

impl StandardCursor {
    const fn raw(self) -> c_int {
        match self {
            Self::Arrow => sys::ARROW_CURSOR,
            Self::IBeam => sys::IBEAM_CURSOR,
            Self::Crosshair => sys::CROSSHAIR_CURSOR,
            Self::Hand => sys::HAND_CURSOR,
            Self::HResize => sys::HRESIZE_CURSOR,
            Self::VResize => sys::VRESIZE_CURSOR,
        }
    }
}

impl<A: SnapshotAlloc> Glfw<A> {
    /// Current value of an input mode; `None` if the native value is not one
    /// this crate knows.
    pub fn input_mode(&self, window: WindowHandle, mode: InputMode) -> Option<InputMode> {
        // SAFETY: live handle.
        let raw = unsafe { (self.api().get_input_mode)(window.as_ptr(), mode.token()) };
        mode.with_value(raw)
    }

    /// Set an input mode.
    pub fn set_input_mode(&self, window: WindowHandle, mode: InputMode) {
        // SAFETY: live handle.
        unsafe { (self.api().set_input_mode)(window.as_ptr(), mode.token(), mode.value()) };
    }

    /// Whether raw mouse motion is available on this system.
    pub fn raw_mouse_motion_supported(&self) -> bool {
        // SAFETY: main-thread call.
        unsafe { (self.api().raw_mouse_motion_supported)() != sys::FALSE }
    }

    /// Last reported state of a key. With sticky keys on, a press stays
    /// visible until read once.
    pub fn key(&self, window: WindowHandle, key: Key) -> Action {
        // SAFETY: live handle.
        let raw = unsafe { (self.api().get_key)(window.as_ptr(), key.0) };
        Action::from_raw(raw).unwrap_or(Action::Release)
    }

    /// Last reported state of a mouse button.
    pub fn mouse_button(&self, window: WindowHandle, button: MouseButton) -> Action {
        // SAFETY: live handle.
        let raw = unsafe { (self.api().get_mouse_button)(window.as_ptr(), button.raw()) };
        Action::from_raw(raw).unwrap_or(Action::Release)
    }

    /// Layout-specific name of a printable key, looked up by `scancode` when
    /// `key` is [`Key::UNKNOWN`]. `None` for non-printable keys.
    ///
    /// The native text is replaced by the next call to this function or by a
    /// layout change during event processing, so the result holds the session
    /// exclusively.
    pub fn key_name(&mut self, key: Key, scancode: i32) -> Option<BorrowedStr<'_>> {
        // SAFETY: main-thread call; `'_` is an exclusive borrow of the session,
        // so no native call can replace the text while it is alive.
        unsafe { borrow((self.api().get_key_name)(key.0, scancode)) }
    }

    /// Platform scancode of a key, `None` when the key has none.
    pub fn key_scancode(&self, key: Key) -> Option<i32> {
        // SAFETY: main-thread call.
        let scancode = unsafe { (self.api().get_key_scancode)(key.0) };
        (scancode != -1).then_some(scancode)
    }

    /// Cursor position relative to the content area.
    pub fn cursor_pos(&self, window: WindowHandle) -> CursorPos {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (x, y) = out2(|x, y| unsafe { (self.api().get_cursor_pos)(window.as_ptr(), x, y) });
        CursorPos { x, y }
    }

    /// Move the cursor within the content area.
    pub fn set_cursor_pos(&self, window: WindowHandle, pos: CursorPos) {
        // SAFETY: live handle.
        unsafe { (self.api().set_cursor_pos)(window.as_ptr(), pos.x, pos.y) };
    }

    /// Create a cursor from an image, with its hotspot in pixels from the top
    /// left corner.
    pub fn create_cursor(&self, image: &Image<'_>, hotspot: Position) -> Result<CursorHandle> {
        let native = image.to_native()?;
        // SAFETY: the image and its pixels outlive the call; the native side
        // copies them.
        let raw = unsafe { (self.api().create_cursor)(&native, hotspot.x, hotspot.y) };
        let cursor = CursorHandle::created(raw, || self.take_last_error())?;
        log::debug!("Created cursor {cursor:?} {}x{}", image.width, image.height);
        Ok(cursor)
    }

    /// Create a cursor with a platform-provided shape.
    pub fn create_standard_cursor(&self, shape: StandardCursor) -> Result<CursorHandle> {
        // SAFETY: main-thread call.
        let raw = unsafe { (self.api().create_standard_cursor)(shape.raw()) };
        CursorHandle::created(raw, || self.take_last_error())
    }

    /// Destroy a cursor. Windows using it revert to the default cursor.
    ///
    /// Every copy of `cursor` is stale afterwards; see
    /// [handle validity](Glfw#handle-validity).
    pub fn destroy_cursor(&self, cursor: CursorHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().destroy_cursor)(cursor.as_ptr()) };
    }

    /// Set the cursor shown over the window; `None` restores the default.
    pub fn set_cursor(&self, window: WindowHandle, cursor: Option<CursorHandle>) {
        // SAFETY: live handles.
        unsafe { (self.api().set_cursor)(window.as_ptr(), cursor_ptr(cursor)) };
    }

    /// Put UTF-8 text on the system clipboard.
    pub fn set_clipboard_string(&self, window: WindowHandle, text: &str) -> Result<()> {
        let text = to_c_string(text)?;
        // SAFETY: live handle; the native side copies the text.
        unsafe { (self.api().set_clipboard_string)(window.as_ptr(), text.as_ptr()) };
        Ok(())
    }

    /// Clipboard contents. `None` means the clipboard is empty or not text.
    ///
    /// The native text is freed by the next clipboard call, so the result
    /// holds the session exclusively:
    ///
    /// ```compile_fail
    /// # use glfw_marshal::Library;
    /// # use glfw_marshal::config::{InitConfig, WindowConfig};
    /// let mut glfw = Library::glfw().init(&InitConfig::default()).unwrap();
    /// let window = glfw.create_window(&WindowConfig::new(64, 64, "clip"), None, None).unwrap();
    /// glfw.set_clipboard_string(window, "first").unwrap();
    /// let first = glfw.clipboard_string(window);
    /// glfw.set_clipboard_string(window, "second").unwrap();
    /// assert_eq!(first.map(|text| text.len()), Some(5));
    /// ```
    pub fn clipboard_string(&mut self, window: WindowHandle) -> Option<BorrowedStr<'_>> {
        // SAFETY: live handle; `'_` is an exclusive borrow of the session, so
        // no clipboard call can free the text while it is alive.
        unsafe { borrow((self.api().get_clipboard_string)(window.as_ptr())) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitConfig, WindowConfig};
    use crate::error::{Error, ErrorCode, ObjectKind};
    use crate::headless;
    use crate::library::Library;
    use crate::window::Rgba;

    fn session() -> (Glfw, WindowHandle) {
        headless::reset();
        let config = InitConfig {
            log_native_errors: false,
            ..InitConfig::default()
        };
        let glfw = Library::new(headless::api()).init(&config).unwrap();
        let window = glfw.create_window(&WindowConfig::new(320, 240, "input"), None, None).unwrap();
        (glfw, window)
    }

    #[test]
    fn test_key_state_follows_events() {
        let (glfw, window) = session();
        assert_eq!(glfw.key(window, Key::A), Action::Release);
        headless::key_event(window, Key::A.0, sys::PRESS, 0);
        glfw.poll_events();
        assert_eq!(glfw.key(window, Key::A), Action::Press);
        headless::key_event(window, Key::A.0, sys::RELEASE, 0);
        glfw.poll_events();
        assert_eq!(glfw.key(window, Key::A), Action::Release);
    }

    #[test]
    fn test_sticky_keys_hold_press_until_read() {
        let (glfw, window) = session();
        glfw.set_input_mode(window, InputMode::StickyKeys(true));
        assert_eq!(
            glfw.input_mode(window, InputMode::StickyKeys(false)),
            Some(InputMode::StickyKeys(true))
        );

        headless::key_event(window, Key::SPACE.0, sys::PRESS, 0);
        headless::key_event(window, Key::SPACE.0, sys::RELEASE, 0);
        glfw.poll_events();
        assert_eq!(glfw.key(window, Key::SPACE), Action::Press);
        assert_eq!(glfw.key(window, Key::SPACE), Action::Release);
    }

    #[test]
    fn test_sticky_mouse_buttons() {
        let (glfw, window) = session();
        glfw.set_input_mode(window, InputMode::StickyMouseButtons(true));
        headless::mouse_button_event(window, MouseButton::LEFT.raw(), sys::PRESS, 0);
        headless::mouse_button_event(window, MouseButton::LEFT.raw(), sys::RELEASE, 0);
        glfw.poll_events();
        assert_eq!(glfw.mouse_button(window, MouseButton::LEFT), Action::Press);
        assert_eq!(glfw.mouse_button(window, MouseButton::LEFT), Action::Release);
    }

    #[test]
    fn test_cursor_mode_round_trip() {
        let (glfw, window) = session();
        assert_eq!(
            glfw.input_mode(window, InputMode::Cursor(CursorMode::Hidden)),
            Some(InputMode::Cursor(CursorMode::Normal))
        );
        glfw.set_input_mode(window, InputMode::Cursor(CursorMode::Disabled));
        assert_eq!(
            glfw.input_mode(window, InputMode::Cursor(CursorMode::Normal)),
            Some(InputMode::Cursor(CursorMode::Disabled))
        );
    }

    #[test]
    fn test_raw_motion_needs_support() {
        let (glfw, window) = session();
        assert!(!glfw.raw_mouse_motion_supported());
        glfw.set_input_mode(window, InputMode::RawMouseMotion(true));
        assert_eq!(
            glfw.take_last_error().and_then(|e| e.classification),
            Some(ErrorCode::PlatformError)
        );

        headless::set_raw_mouse_motion_supported(true);
        assert!(glfw.raw_mouse_motion_supported());
        glfw.set_input_mode(window, InputMode::RawMouseMotion(true));
        assert!(glfw.take_last_error().is_none());
    }

    #[test]
    fn test_key_name_absent_for_non_printable() {
        let (mut glfw, _window) = session();
        assert_eq!(glfw.key_name(Key::letter('q').unwrap(), 0).unwrap(), "q");
        assert!(glfw.key_name(Key::ESCAPE, 0).is_none());
        assert!(glfw.take_last_error().is_none());

        let scancode = glfw.key_scancode(Key::A).unwrap();
        assert_eq!(glfw.key_name(Key::UNKNOWN, scancode).unwrap(), "a");
    }

    #[test]
    fn test_cursor_position() {
        let (glfw, window) = session();
        glfw.set_cursor_pos(window, CursorPos { x: 12.5, y: 40.0 });
        let pos = glfw.cursor_pos(window);
        approx::assert_relative_eq!(pos.x, 12.5);
        approx::assert_relative_eq!(pos.y, 40.0);

        headless::cursor_event(window, 100.0, 50.0);
        glfw.poll_events();
        approx::assert_relative_eq!(glfw.cursor_pos(window).x, 100.0);
    }

    #[test]
    fn test_cursor_lifecycle() {
        let (glfw, window) = session();
        let pixels = [Rgba::default(); 16 * 16];
        let image = Image::new(16, 16, &pixels).unwrap();
        let custom = glfw.create_cursor(&image, Position::new(8, 8)).unwrap();
        let hand = glfw.create_standard_cursor(StandardCursor::Hand).unwrap();
        assert_ne!(custom, hand);

        glfw.set_cursor(window, Some(custom));
        assert_eq!(headless::window_cursor(window).as_deref(), Some("custom 16x16 at 8,8"));
        glfw.destroy_cursor(custom);
        assert_eq!(headless::window_cursor(window), None);

        glfw.set_cursor(window, Some(hand));
        assert!(headless::window_cursor(window).unwrap().starts_with("standard"));
        glfw.set_cursor(window, None);
        glfw.destroy_cursor(hand);
    }

    #[test]
    fn test_empty_cursor_image_fails_creation() {
        let (glfw, _window) = session();
        let image = Image::new(0, 0, &[]).unwrap();
        let err = glfw.create_cursor(&image, Position::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::CreationFailed {
                object: ObjectKind::Cursor,
                cause: Some(_)
            }
        ));
    }

    #[test]
    fn test_empty_clipboard_is_not_an_error() {
        let (mut glfw, window) = session();
        assert!(glfw.clipboard_string(window).is_none());
        assert!(glfw.take_last_error().is_none());

        glfw.set_clipboard_string(window, "copied text").unwrap();
        assert_eq!(glfw.clipboard_string(window).unwrap(), "copied text");
    }

    #[test]
    fn test_modifiers_from_raw() {
        let mods = Modifiers::from_raw(sys::MOD_SHIFT | sys::MOD_ALT | 0x4000);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::ALT);
        assert!(Modifiers::from_raw(0).is_empty());
    }

    #[test]
    fn test_lock_mods_hidden_unless_requested() {
        use std::sync::atomic::{AtomicI32, Ordering};
        static SEEN: AtomicI32 = AtomicI32::new(-1);
        extern "C" fn on_key(_: WindowHandle, _: c_int, _: c_int, _: c_int, mods: c_int) {
            SEEN.store(mods, Ordering::SeqCst);
        }

        let (glfw, window) = session();
        glfw.set_key_callback(window, Some(on_key));
        let raw = sys::MOD_SHIFT | sys::MOD_CAPS_LOCK;

        headless::key_event(window, Key::A.0, sys::PRESS, raw);
        glfw.poll_events();
        assert_eq!(Modifiers::from_raw(SEEN.load(Ordering::SeqCst)), Modifiers::SHIFT);

        glfw.set_input_mode(window, InputMode::LockKeyMods(true));
        headless::key_event(window, Key::A.0, sys::RELEASE, raw);
        glfw.poll_events();
        assert_eq!(
            Modifiers::from_raw(SEEN.load(Ordering::SeqCst)),
            Modifiers::SHIFT | Modifiers::CAPS_LOCK
        );
    }

    #[test]
    fn test_letter_keys() {
        assert_eq!(Key::letter('a'), Some(Key::A));
        assert_eq!(Key::letter('Z'), Some(Key::Z));
        assert_eq!(Key::letter('1'), None);
        assert_eq!(MouseButton::new(8), None);
        assert_eq!(Action::from_raw(Action::Repeat.raw()), Some(Action::Repeat));
    }
}
