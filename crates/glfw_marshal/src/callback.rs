//! Callback registration bridge
//!
//! Each native event kind has exactly one function-pointer shape. The typed
//! shapes here take [`WindowHandle`], [`MonitorHandle`] and [`BorrowedStr`]
//! where the native shapes take raw pointers; since those wrappers are
//! `#[repr(transparent)]` over non-null pointers, each typed shape has the
//! same C ABI as its native counterpart and converts without a trampoline.
//!
//! Registration is a pass-through: the native setter swaps the slot and hands
//! back what was there, and the bridge converts that back into the typed
//! shape. Callbacks get only the object handle and event parameters; per-object
//! application state is reached through the object's user pointer.
//!
//! A panic escaping an `extern "C"` callback aborts the process.

use std::os::raw::{c_char, c_double, c_float, c_int, c_uint};

use crate::error::{ErrorCode, Result};
use crate::handle::{MonitorHandle, WindowHandle};
use crate::library::Glfw;
use crate::marshal::{snapshot_strings, BorrowedStr, OwnedSlice, SnapshotAlloc};
use crate::sys;

/// Global error callback: raw code and borrowed description.
pub type ErrorFn = for<'a> extern "C" fn(c_int, Option<BorrowedStr<'a>>);

/// Monitor connection callback: monitor and raw [`ConnectionEvent`].
pub type MonitorFn = extern "C" fn(MonitorHandle, c_int);

/// Joystick connection callback: raw joystick id and raw [`ConnectionEvent`].
pub type JoystickFn = extern "C" fn(c_int, c_int);

/// Device connection state reported to monitor and joystick callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The device was connected.
    Connected,
    /// The device was disconnected.
    Disconnected,
}

impl ConnectionEvent {
    /// Decode a raw event value.
    pub const fn from_raw(event: c_int) -> Option<Self> {
        match event {
            sys::CONNECTED => Some(Self::Connected),
            sys::DISCONNECTED => Some(Self::Disconnected),
            _ => None,
        }
    }
}

/// Error callback that forwards native errors to the `log` facade.
pub extern "C" fn log_native_errors(code: c_int, description: Option<BorrowedStr<'_>>) {
    let class = ErrorCode::classify(code).map_or_else(|| "unclassified".to_string(), |c| c.to_string());
    let text = description.map(|d| d.to_string_lossy()).unwrap_or_default();
    log::error!("GLFW {class} ({code:#x}): {text}");
}

/// Marshal the path array handed to a [`DropFn`] into an owned array of
/// borrowed strings.
///
/// # Safety
/// Only call with the arguments of a running drop callback; the strings are
/// valid until that callback returns.
pub unsafe fn drop_paths<'a>(count: c_int, paths: *mut *const c_char) -> Result<OwnedSlice<BorrowedStr<'a>>> {
    // SAFETY: the native dispatcher passes `count` valid string pointers.
    unsafe { snapshot_strings(paths.cast_const(), count, std::alloc::System) }
}

macro_rules! window_callbacks {
    ($(
        $(#[$doc:meta])*
        $typed:ident($($arg:ty),*) => $native:ty, $setter:ident, $field:ident;
    )*) => {
        $(
            $(#[$doc])*
            pub type $typed = extern "C" fn(WindowHandle $(, $arg)*);

            // The typed shape must stay layout-compatible with the native one.
            const _: () = assert!(std::mem::size_of::<Option<$typed>>() == std::mem::size_of::<Option<$native>>());
        )*

        impl<A: SnapshotAlloc> Glfw<A> {
            $(
                #[doc = concat!("Register the [`", stringify!($typed), "`] callback of `window`, returning the previous one. `None` clears the slot.")]
                pub fn $setter(&self, window: WindowHandle, callback: Option<$typed>) -> Option<$typed> {
                    // SAFETY: the typed shape differs from the native one only by
                    // `WindowHandle`, a transparent non-null wrapper of the
                    // window pointer the native dispatcher passes.
                    unsafe {
                        let native = std::mem::transmute::<Option<$typed>, Option<$native>>(callback);
                        let previous = (self.api().$field)(window.as_ptr(), native);
                        std::mem::transmute::<Option<$native>, Option<$typed>>(previous)
                    }
                }
            )*
        }
    };
}

window_callbacks! {
    /// Window moved: new content-area position.
    WindowPosFn(c_int, c_int) => sys::GLFWwindowposfun, set_window_pos_callback, set_window_pos_callback;
    /// Window resized: new content-area size in screen coordinates.
    WindowSizeFn(c_int, c_int) => sys::GLFWwindowsizefun, set_window_size_callback, set_window_size_callback;
    /// Close requested by the user.
    WindowCloseFn() => sys::GLFWwindowclosefun, set_window_close_callback, set_window_close_callback;
    /// Content area needs redrawing.
    WindowRefreshFn() => sys::GLFWwindowrefreshfun, set_window_refresh_callback, set_window_refresh_callback;
    /// Focus gained (`1`) or lost (`0`).
    WindowFocusFn(c_int) => sys::GLFWwindowfocusfun, set_window_focus_callback, set_window_focus_callback;
    /// Iconified (`1`) or restored (`0`).
    WindowIconifyFn(c_int) => sys::GLFWwindowiconifyfun, set_window_iconify_callback, set_window_iconify_callback;
    /// Maximized (`1`) or restored (`0`).
    WindowMaximizeFn(c_int) => sys::GLFWwindowmaximizefun, set_window_maximize_callback, set_window_maximize_callback;
    /// Framebuffer resized: new size in pixels.
    FramebufferSizeFn(c_int, c_int) => sys::GLFWframebuffersizefun, set_framebuffer_size_callback, set_framebuffer_size_callback;
    /// Content scale changed.
    WindowContentScaleFn(c_float, c_float) => sys::GLFWwindowcontentscalefun, set_window_content_scale_callback, set_window_content_scale_callback;
    /// Key event: key, scancode, raw action, raw modifier bits.
    KeyFn(c_int, c_int, c_int, c_int) => sys::GLFWkeyfun, set_key_callback, set_key_callback;
    /// Unicode character input.
    CharFn(c_uint) => sys::GLFWcharfun, set_char_callback, set_char_callback;
    /// Mouse button event: button, raw action, raw modifier bits.
    MouseButtonFn(c_int, c_int, c_int) => sys::GLFWmousebuttonfun, set_mouse_button_callback, set_mouse_button_callback;
    /// Cursor moved, relative to the content area.
    CursorPosFn(c_double, c_double) => sys::GLFWcursorposfun, set_cursor_pos_callback, set_cursor_pos_callback;
    /// Cursor entered (`1`) or left (`0`) the content area.
    CursorEnterFn(c_int) => sys::GLFWcursorenterfun, set_cursor_enter_callback, set_cursor_enter_callback;
    /// Scroll offsets.
    ScrollFn(c_double, c_double) => sys::GLFWscrollfun, set_scroll_callback, set_scroll_callback;
    /// Paths dropped on the window; see [`drop_paths`].
    DropFn(c_int, *mut *const c_char) => sys::GLFWdropfun, set_drop_callback, set_drop_callback;
}

impl<A: SnapshotAlloc> Glfw<A> {
    /// Register the monitor connection callback, returning the previous one.
    pub fn set_monitor_callback(&self, callback: Option<MonitorFn>) -> Option<MonitorFn> {
        // SAFETY: `MonitorHandle` is a transparent non-null wrapper of the
        // monitor pointer the native dispatcher passes.
        unsafe {
            let native = std::mem::transmute::<Option<MonitorFn>, Option<sys::GLFWmonitorfun>>(callback);
            let previous = (self.api().set_monitor_callback)(native);
            std::mem::transmute::<Option<sys::GLFWmonitorfun>, Option<MonitorFn>>(previous)
        }
    }

    /// Register the joystick connection callback, returning the previous one.
    pub fn set_joystick_callback(&self, callback: Option<JoystickFn>) -> Option<JoystickFn> {
        // SAFETY: identical shapes; no conversion needed.
        unsafe { (self.api().set_joystick_callback)(callback) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitConfig, WindowConfig};
    use crate::headless;
    use crate::library::Library;
    use std::cell::{Cell, RefCell};

    extern "C" fn first_pos(_: WindowHandle, _: c_int, _: c_int) {}
    extern "C" fn second_pos(_: WindowHandle, _: c_int, _: c_int) {}

    extern "C" fn count_closes(window: WindowHandle) {
        let counter = headless::window_user_pointer(window).cast::<Cell<u32>>();
        // SAFETY: the test stores a live `Cell<u32>` in the user pointer.
        unsafe { (*counter).set((*counter).get() + 1) };
    }

    extern "C" fn collect_drops(window: WindowHandle, count: c_int, paths: *mut *const c_char) {
        let collected = headless::window_user_pointer(window).cast::<RefCell<Vec<String>>>();
        // SAFETY: the arguments come straight from the native dispatcher.
        if let Ok(paths) = unsafe { drop_paths(count, paths) } {
            // SAFETY: the test stores a live `RefCell` in the user pointer.
            let collected = unsafe { &*collected };
            collected
                .borrow_mut()
                .extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        }
    }

    extern "C" fn quiet_errors(_: c_int, _: Option<BorrowedStr<'_>>) {}

    fn session() -> Glfw {
        headless::reset();
        let config = InitConfig {
            log_native_errors: false,
            ..InitConfig::default()
        };
        Library::new(headless::api()).init(&config).unwrap()
    }

    #[test]
    fn test_register_returns_previous() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "cb"), None, None).unwrap();

        assert!(glfw.set_window_pos_callback(window, Some(first_pos)).is_none());
        let previous = glfw.set_window_pos_callback(window, Some(second_pos));
        assert_eq!(previous.map(|f| f as usize), Some(first_pos as usize));
        let previous = glfw.set_window_pos_callback(window, None);
        assert_eq!(previous.map(|f| f as usize), Some(second_pos as usize));
        assert!(glfw.set_window_pos_callback(window, None).is_none());
    }

    #[test]
    fn test_slots_are_per_window() {
        let glfw = session();
        let a = glfw.create_window(&WindowConfig::new(64, 64, "a"), None, None).unwrap();
        let b = glfw.create_window(&WindowConfig::new(64, 64, "b"), None, None).unwrap();

        glfw.set_window_pos_callback(a, Some(first_pos));
        assert!(glfw.set_window_pos_callback(b, None).is_none());
        assert!(glfw.set_window_pos_callback(a, None).is_some());
    }

    #[test]
    fn test_callback_recovers_context_from_user_pointer() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "close"), None, None).unwrap();
        let closes = Cell::new(0u32);
        glfw.set_window_user_pointer(window, std::ptr::from_ref(&closes).cast_mut().cast());
        glfw.set_window_close_callback(window, Some(count_closes));

        headless::request_close(window);
        glfw.poll_events();

        assert_eq!(closes.get(), 1);
        assert!(glfw.window_should_close(window));
    }

    #[test]
    fn test_drop_paths_are_marshaled() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "drop"), None, None).unwrap();
        let collected = RefCell::new(Vec::<String>::new());
        glfw.set_window_user_pointer(window, std::ptr::from_ref(&collected).cast_mut().cast());
        assert!(glfw.set_drop_callback(window, Some(collect_drops)).is_none());

        headless::drop_event(window, &["/tmp/a.txt", "/tmp/b.png"]);
        assert!(collected.borrow().is_empty());
        glfw.poll_events();

        assert_eq!(*collected.borrow(), ["/tmp/a.txt", "/tmp/b.png"]);
        glfw.set_window_user_pointer(window, std::ptr::null_mut());
    }

    #[test]
    fn test_error_callback_chain() {
        let glfw = session();
        assert!(glfw.set_error_callback(Some(quiet_errors)).is_none());
        let previous = glfw.set_error_callback(Some(log_native_errors));
        assert_eq!(previous.map(|f| f as usize), Some(quiet_errors as usize));
        let previous = glfw.set_error_callback(None);
        assert_eq!(previous.map(|f| f as usize), Some(log_native_errors as usize));
    }

    #[test]
    fn test_connection_event_decoding() {
        assert_eq!(ConnectionEvent::from_raw(sys::CONNECTED), Some(ConnectionEvent::Connected));
        assert_eq!(ConnectionEvent::from_raw(sys::DISCONNECTED), Some(ConnectionEvent::Disconnected));
        assert_eq!(ConnectionEvent::from_raw(0), None);
    }
}
