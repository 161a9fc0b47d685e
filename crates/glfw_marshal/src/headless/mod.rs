//! Headless native simulation
//!
//! An in-process implementation of the native contract behind a
//! [`NativeApi`] table, for tests and machines without a display. It keeps the
//! native library's observable rules: a single read-once error slot whose
//! descriptions live forever, `NOT_INITIALIZED` for calls made before init,
//! out-parameters zeroed on failure, arrays owned by the library and valid
//! until the next call that changes them, and callbacks that fire only while
//! events are processed.
//!
//! State is per thread, like the main-thread model of the real library, so
//! parallel tests do not see each other. The raw timer is process-global.
//!
//! The functions at module level drive the simulated hardware: plugging in
//! monitors and joysticks, injecting input and forcing failures.

mod context;
mod input;
mod monitor;
mod window;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int, c_uint, c_void};
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use crate::geometry::VideoMode;
use crate::handle::{MonitorHandle, WindowHandle};
use crate::native::NativeApi;
use crate::sys::{self, GLFWerrorfun, GLFWjoystickfun, GLFWmonitor, GLFWmonitorfun, GLFWwindow};

use input::{Cursor, Joystick};
use monitor::Monitor;
use window::Window;

/// Error code and static description, as stored in the slot.
type Fault = (c_int, &'static CStr);

const NOT_INITIALIZED: Fault = (sys::NOT_INITIALIZED, c"The GLFW library is not initialized");
const UNKNOWN_WINDOW: Fault = (sys::INVALID_VALUE, c"Headless: unknown window handle");
const UNKNOWN_MONITOR: Fault = (sys::INVALID_VALUE, c"Headless: unknown monitor handle");
const INIT_FAILURE: Fault = (sys::PLATFORM_ERROR, c"Headless: simulated platform initialization failure");
const INVALID_INIT_HINT: Fault = (sys::INVALID_ENUM, c"Invalid init hint");

/// Ticks per second of the raw timer.
const TIMER_FREQUENCY: u64 = 1_000_000_000;

static EPOCH: OnceLock<Instant> = OnceLock::new();
static POSTED_EVENTS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::default());
}

/// A queued event, dispatched by the next event poll.
enum Event {
    Close(*mut GLFWwindow),
    Refresh(*mut GLFWwindow),
    Pos(*mut GLFWwindow, c_int, c_int),
    Size(*mut GLFWwindow, c_int, c_int),
    FramebufferSize(*mut GLFWwindow, c_int, c_int),
    Focus(*mut GLFWwindow, bool),
    Iconify(*mut GLFWwindow, bool),
    Maximize(*mut GLFWwindow, bool),
    Key {
        window: *mut GLFWwindow,
        key: c_int,
        scancode: c_int,
        action: c_int,
        mods: c_int,
    },
    Char(*mut GLFWwindow, c_uint),
    MouseButton {
        window: *mut GLFWwindow,
        button: c_int,
        action: c_int,
        mods: c_int,
    },
    CursorPos(*mut GLFWwindow, c_double, c_double),
    CursorEnter(*mut GLFWwindow, bool),
    Scroll(*mut GLFWwindow, c_double, c_double),
    Drop(*mut GLFWwindow, Vec<CString>),
    Monitor(*mut GLFWmonitor, c_int),
    Joystick(c_int, c_int),
}

impl Event {
    fn window(&self) -> Option<*mut GLFWwindow> {
        match *self {
            Self::Close(w)
            | Self::Refresh(w)
            | Self::Pos(w, ..)
            | Self::Size(w, ..)
            | Self::FramebufferSize(w, ..)
            | Self::Focus(w, _)
            | Self::Iconify(w, _)
            | Self::Maximize(w, _)
            | Self::Key { window: w, .. }
            | Self::Char(w, _)
            | Self::MouseButton { window: w, .. }
            | Self::CursorPos(w, ..)
            | Self::CursorEnter(w, _)
            | Self::Scroll(w, ..)
            | Self::Drop(w, _) => Some(w),
            Self::Monitor(..) | Self::Joystick(..) => None,
        }
    }
}

struct State {
    session: bool,
    initialized: bool,
    fail_next_init: bool,
    error: Option<Fault>,
    error_callback: Option<GLFWerrorfun>,
    init_hints: HashMap<c_int, c_int>,
    window_hints: HashMap<c_int, c_int>,
    timer_offset: u64,

    windows: Vec<Box<Window>>,
    cursors: Vec<Box<Cursor>>,
    current_context: *mut GLFWwindow,
    swap_interval: c_int,
    clipboard: Option<CString>,
    raw_mouse_motion: bool,

    monitors: Vec<Box<Monitor>>,
    monitor_array: Vec<*mut GLFWmonitor>,
    retired_monitors: Vec<Box<Monitor>>,
    monitor_callback: Option<GLFWmonitorfun>,

    joysticks: [Option<Joystick>; 16],
    gamepad_mappings: HashMap<String, CString>,
    joystick_callback: Option<GLFWjoystickfun>,

    vulkan_extensions: Option<Vec<CString>>,
    vulkan_extension_array: Vec<*const c_char>,
    next_surface: u64,

    events: VecDeque<Event>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            session: false,
            initialized: false,
            fail_next_init: false,
            error: None,
            error_callback: None,
            init_hints: HashMap::new(),
            window_hints: window::default_hints(),
            timer_offset: 0,
            windows: Vec::new(),
            cursors: Vec::new(),
            current_context: ptr::null_mut(),
            swap_interval: 0,
            clipboard: None,
            raw_mouse_motion: false,
            monitors: Vec::new(),
            monitor_array: Vec::new(),
            retired_monitors: Vec::new(),
            monitor_callback: None,
            joysticks: std::array::from_fn(|_| None),
            gamepad_mappings: HashMap::new(),
            joystick_callback: None,
            vulkan_extensions: None,
            vulkan_extension_array: Vec::new(),
            next_surface: 1,
            events: VecDeque::new(),
        }
    }
}

impl State {
    fn window_mut(&mut self, window: *mut GLFWwindow) -> Result<&mut Window, Fault> {
        self.windows
            .iter_mut()
            .find(|w| w.ptr() == window)
            .map(|w| &mut **w)
            .ok_or(UNKNOWN_WINDOW)
    }

    fn monitor_mut(&mut self, monitor: *mut GLFWmonitor) -> Result<&mut Monitor, Fault> {
        self.monitors
            .iter_mut()
            .find(|m| m.ptr() == monitor)
            .map(|m| &mut **m)
            .ok_or(UNKNOWN_MONITOR)
    }

    fn rebuild_monitor_array(&mut self) {
        self.monitor_array = self.monitors.iter().map(|m| m.ptr()).collect();
    }

    fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }
}

fn with_state<T>(f: impl FnOnce(&mut State) -> T) -> T {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Simulated state is per thread, so sessions are too.
fn claim_session() -> bool {
    with_state(|s| !std::mem::replace(&mut s.session, true))
}

fn release_session() {
    with_state(|s| s.session = false);
}

/// Store an error in the slot, then run the error callback outside the state
/// borrow so it may call back into the library.
fn raise((code, description): Fault) {
    let callback = with_state(|s| {
        s.error = Some((code, description));
        s.error_callback
    });
    if let Some(callback) = callback {
        callback(code, description.as_ptr());
    }
}

/// Run `f` on initialized state. A fault is reported through the error slot
/// and `fallback` is returned in its place.
fn live<T>(fallback: T, f: impl FnOnce(&mut State) -> Result<T, Fault>) -> T {
    let result = with_state(|s| if s.initialized { f(s) } else { Err(NOT_INITIALIZED) });
    result.unwrap_or_else(|fault| {
        raise(fault);
        fallback
    })
}

/// Write an out-parameter if the caller supplied one.
unsafe fn put<T>(out: *mut T, value: T) {
    if !out.is_null() {
        // SAFETY: non-null out-parameters point to writable storage.
        unsafe { out.write(value) };
    }
}

/// Read a caller's C string, treating null as empty.
unsafe fn read_str(text: *const c_char) -> String {
    if text.is_null() {
        return String::new();
    }
    // SAFETY: non-null strings handed to the library are NUL-terminated.
    unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
}

fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

fn timer_value() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

unsafe extern "C" fn init() -> c_int {
    let outcome = with_state(|s| {
        if s.initialized {
            return Ok(());
        }
        if std::mem::take(&mut s.fail_next_init) {
            return Err(INIT_FAILURE);
        }
        s.initialized = true;
        s.timer_offset = timer_value();
        s.window_hints = window::default_hints();
        s.rebuild_monitor_array();
        Ok(())
    });
    match outcome {
        Ok(()) => sys::TRUE,
        Err(fault) => {
            raise(fault);
            sys::FALSE
        }
    }
}

unsafe extern "C" fn terminate() {
    with_state(|s| {
        if !s.initialized {
            return;
        }
        s.windows.clear();
        s.cursors.clear();
        s.current_context = ptr::null_mut();
        s.clipboard = None;
        s.monitor_callback = None;
        s.joystick_callback = None;
        s.retired_monitors.clear();
        s.events.clear();
        s.error = None;
        s.initialized = false;
    });
}

unsafe extern "C" fn init_hint(hint: c_int, value: c_int) {
    let known = [sys::JOYSTICK_HAT_BUTTONS, sys::COCOA_CHDIR_RESOURCES, sys::COCOA_MENUBAR];
    if known.contains(&hint) {
        with_state(|s| s.init_hints.insert(hint, value));
    } else {
        raise(INVALID_INIT_HINT);
    }
}

unsafe extern "C" fn get_version(major: *mut c_int, minor: *mut c_int, revision: *mut c_int) {
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(major, 3);
        put(minor, 3);
        put(revision, 8);
    }
}

unsafe extern "C" fn get_version_string() -> *const c_char {
    c"3.3.8 Headless null".as_ptr()
}

unsafe extern "C" fn get_error(description: *mut *const c_char) -> c_int {
    let (code, text) = with_state(|s| s.error.take()).map_or((sys::NO_ERROR, ptr::null()), |(code, text)| {
        (code, text.as_ptr())
    });
    // SAFETY: out-parameter is null or writable.
    unsafe { put(description, text) };
    code
}

unsafe extern "C" fn set_error_callback(callback: Option<GLFWerrorfun>) -> Option<GLFWerrorfun> {
    with_state(|s| std::mem::replace(&mut s.error_callback, callback))
}

unsafe extern "C" fn poll_events() {
    if !live(false, |_| Ok(true)) {
        return;
    }
    let batch = with_state(|s| std::mem::take(&mut s.events));
    for event in batch {
        dispatch(event);
    }
}

unsafe extern "C" fn wait_events() {
    // SAFETY: forwards to the same contract.
    unsafe { poll_events() };
}

unsafe extern "C" fn wait_events_timeout(timeout: c_double) {
    if !(timeout.is_finite() && timeout >= 0.0) {
        raise((sys::INVALID_VALUE, c"Invalid time"));
        return;
    }
    // SAFETY: forwards to the same contract.
    unsafe { poll_events() };
}

unsafe extern "C" fn post_empty_event() {
    POSTED_EVENTS.fetch_add(1, Ordering::Relaxed);
}

unsafe extern "C" fn get_time() -> c_double {
    live(0.0, |s| Ok(timer_value().wrapping_sub(s.timer_offset) as f64 / TIMER_FREQUENCY as f64))
}

unsafe extern "C" fn set_time(time: c_double) {
    live((), |s| {
        if !(time.is_finite() && (0.0..=18_446_744_073.0).contains(&time)) {
            return Err((sys::INVALID_VALUE, c"Invalid time"));
        }
        s.timer_offset = timer_value().wrapping_sub((time * TIMER_FREQUENCY as f64) as u64);
        Ok(())
    });
}

unsafe extern "C" fn get_timer_value() -> u64 {
    timer_value()
}

unsafe extern "C" fn get_timer_frequency() -> u64 {
    TIMER_FREQUENCY
}

/// Deliver one queued event. State changes are applied first; the callback is
/// looked up and invoked after the state borrow is released.
fn dispatch(event: Event) {
    if let Some(window) = event.window() {
        if with_state(|s| s.window_mut(window).is_err()) {
            return;
        }
    }
    match event {
        Event::Monitor(monitor, change) => {
            if let Some(callback) = with_state(|s| s.monitor_callback) {
                callback(monitor, change);
            }
        }
        Event::Joystick(jid, change) => {
            if let Some(callback) = with_state(|s| s.joystick_callback) {
                callback(jid, change);
            }
        }
        other => window::dispatch(other),
    }
}

static HEADLESS: NativeApi = NativeApi {
    init,
    terminate,
    init_hint,
    get_version,
    get_version_string,
    get_error,
    set_error_callback,

    get_monitors: monitor::get_monitors,
    get_primary_monitor: monitor::get_primary_monitor,
    get_monitor_pos: monitor::get_monitor_pos,
    get_monitor_workarea: monitor::get_monitor_workarea,
    get_monitor_physical_size: monitor::get_monitor_physical_size,
    get_monitor_content_scale: monitor::get_monitor_content_scale,
    get_monitor_name: monitor::get_monitor_name,
    set_monitor_user_pointer: monitor::set_monitor_user_pointer,
    get_monitor_user_pointer: monitor::get_monitor_user_pointer,
    set_monitor_callback: monitor::set_monitor_callback,
    get_video_modes: monitor::get_video_modes,
    get_video_mode: monitor::get_video_mode,
    set_gamma: monitor::set_gamma,
    get_gamma_ramp: monitor::get_gamma_ramp,
    set_gamma_ramp: monitor::set_gamma_ramp,

    default_window_hints: window::default_window_hints,
    window_hint: window::window_hint,
    create_window: window::create_window,
    destroy_window: window::destroy_window,
    window_should_close: window::window_should_close,
    set_window_should_close: window::set_window_should_close,
    set_window_title: window::set_window_title,
    set_window_icon: window::set_window_icon,
    get_window_pos: window::get_window_pos,
    set_window_pos: window::set_window_pos,
    get_window_size: window::get_window_size,
    set_window_size_limits: window::set_window_size_limits,
    set_window_aspect_ratio: window::set_window_aspect_ratio,
    set_window_size: window::set_window_size,
    get_framebuffer_size: window::get_framebuffer_size,
    get_window_frame_size: window::get_window_frame_size,
    get_window_content_scale: window::get_window_content_scale,
    get_window_opacity: window::get_window_opacity,
    set_window_opacity: window::set_window_opacity,
    iconify_window: window::iconify_window,
    restore_window: window::restore_window,
    maximize_window: window::maximize_window,
    show_window: window::show_window,
    hide_window: window::hide_window,
    focus_window: window::focus_window,
    request_window_attention: window::request_window_attention,
    get_window_monitor: window::get_window_monitor,
    set_window_monitor: window::set_window_monitor,
    get_window_attrib: window::get_window_attrib,
    set_window_attrib: window::set_window_attrib,
    set_window_user_pointer: window::set_window_user_pointer,
    get_window_user_pointer: window::get_window_user_pointer,

    set_window_pos_callback: window::set_window_pos_callback,
    set_window_size_callback: window::set_window_size_callback,
    set_window_close_callback: window::set_window_close_callback,
    set_window_refresh_callback: window::set_window_refresh_callback,
    set_window_focus_callback: window::set_window_focus_callback,
    set_window_iconify_callback: window::set_window_iconify_callback,
    set_window_maximize_callback: window::set_window_maximize_callback,
    set_framebuffer_size_callback: window::set_framebuffer_size_callback,
    set_window_content_scale_callback: window::set_window_content_scale_callback,
    set_key_callback: window::set_key_callback,
    set_char_callback: window::set_char_callback,
    set_mouse_button_callback: window::set_mouse_button_callback,
    set_cursor_pos_callback: window::set_cursor_pos_callback,
    set_cursor_enter_callback: window::set_cursor_enter_callback,
    set_scroll_callback: window::set_scroll_callback,
    set_drop_callback: window::set_drop_callback,

    poll_events,
    wait_events,
    wait_events_timeout,
    post_empty_event,

    get_input_mode: input::get_input_mode,
    set_input_mode: input::set_input_mode,
    raw_mouse_motion_supported: input::raw_mouse_motion_supported,
    get_key_name: input::get_key_name,
    get_key_scancode: input::get_key_scancode,
    get_key: input::get_key,
    get_mouse_button: input::get_mouse_button,
    get_cursor_pos: input::get_cursor_pos,
    set_cursor_pos: input::set_cursor_pos,
    create_cursor: input::create_cursor,
    create_standard_cursor: input::create_standard_cursor,
    destroy_cursor: input::destroy_cursor,
    set_cursor: input::set_cursor,

    joystick_present: input::joystick_present,
    get_joystick_axes: input::get_joystick_axes,
    get_joystick_buttons: input::get_joystick_buttons,
    get_joystick_hats: input::get_joystick_hats,
    get_joystick_name: input::get_joystick_name,
    get_joystick_guid: input::get_joystick_guid,
    set_joystick_user_pointer: input::set_joystick_user_pointer,
    get_joystick_user_pointer: input::get_joystick_user_pointer,
    joystick_is_gamepad: input::joystick_is_gamepad,
    set_joystick_callback: input::set_joystick_callback,
    update_gamepad_mappings: input::update_gamepad_mappings,
    get_gamepad_name: input::get_gamepad_name,
    get_gamepad_state: input::get_gamepad_state,

    set_clipboard_string: input::set_clipboard_string,
    get_clipboard_string: input::get_clipboard_string,

    get_time,
    set_time,
    get_timer_value,
    get_timer_frequency,

    make_context_current: context::make_context_current,
    get_current_context: context::get_current_context,
    swap_buffers: context::swap_buffers,
    swap_interval: context::swap_interval,
    extension_supported: context::extension_supported,
    get_proc_address: context::get_proc_address,

    vulkan_supported: context::vulkan_supported,
    get_required_instance_extensions: context::get_required_instance_extensions,
    get_instance_proc_address: context::get_instance_proc_address,
    get_physical_device_presentation_support: context::get_physical_device_presentation_support,
    create_window_surface: context::create_window_surface,

    claim_session,
    release_session,
};

/// The native table bound to the simulation.
pub fn api() -> &'static NativeApi {
    &HEADLESS
}

/// Discard all simulated state on this thread: windows, devices, the error
/// slot and every callback.
pub fn reset() {
    with_state(|s| *s = State::default());
}

/// Whether the simulated library is initialized on this thread.
pub fn is_initialized() -> bool {
    with_state(|s| s.initialized)
}

/// Make the next initialization fail with a platform error.
pub fn fail_next_init() {
    with_state(|s| s.fail_next_init = true);
}

/// Report an arbitrary error, as the native library would from a failing call.
pub fn raise_error(code: c_int, description: &'static CStr) {
    raise((code, description));
}

/// Number of empty events posted from any thread.
pub fn posted_events() -> u64 {
    POSTED_EVENTS.load(Ordering::Relaxed)
}

/// Whether raw mouse motion is reported as supported.
pub fn set_raw_mouse_motion_supported(supported: bool) {
    with_state(|s| s.raw_mouse_motion = supported);
}

/// Make Vulkan available, requiring the given instance extensions.
pub fn enable_vulkan(extensions: &[&str]) {
    with_state(|s| {
        let owned: Vec<CString> = extensions.iter().map(|e| c_string(e)).collect();
        s.vulkan_extension_array = owned.iter().map(|e| e.as_ptr()).collect();
        s.vulkan_extensions = Some(owned);
    });
}

/// Description of a simulated display.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedMonitor {
    /// Human-readable name.
    pub name: String,
    /// Position of the monitor on the virtual desktop.
    pub position: (i32, i32),
    /// Physical size in millimetres.
    pub physical_size_mm: (i32, i32),
    /// Content scale.
    pub content_scale: (f32, f32),
    /// Supported video modes; the last one is current.
    pub modes: Vec<VideoMode>,
}

impl Default for SimulatedMonitor {
    fn default() -> Self {
        let mode = |width, height| VideoMode {
            width,
            height,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            refresh_rate: 60,
        };
        Self {
            name: "Headless Display".to_string(),
            position: (0, 0),
            physical_size_mm: (527, 296),
            content_scale: (1.0, 1.0),
            modes: vec![mode(1280, 720), mode(1920, 1080)],
        }
    }
}

/// Plug in a monitor. It is appended to the monitor list; the first connected
/// monitor is primary. The connection callback fires on the next event poll.
pub fn connect_monitor(description: SimulatedMonitor) -> MonitorHandle {
    let monitor = Box::new(Monitor::new(&description));
    with_state(|s| {
        let raw = monitor.ptr();
        s.monitors.push(monitor);
        s.rebuild_monitor_array();
        if s.initialized {
            s.push(Event::Monitor(raw, sys::CONNECTED));
        }
        // SAFETY: a boxed monitor's address is never null.
        unsafe { MonitorHandle::from_raw_unchecked(raw) }
    })
}

/// Unplug a monitor. Windows fullscreen on it become windowed. The handle
/// stays valid until the disconnection callback has run.
pub fn disconnect_monitor(monitor: MonitorHandle) {
    let raw = monitor.as_ptr();
    with_state(|s| {
        let Some(index) = s.monitors.iter().position(|m| m.ptr() == raw) else {
            return;
        };
        let removed = s.monitors.remove(index);
        s.retired_monitors.push(removed);
        s.rebuild_monitor_array();
        for window in &mut s.windows {
            if window.monitor == raw {
                window.monitor = ptr::null_mut();
            }
        }
        if s.initialized {
            s.push(Event::Monitor(raw, sys::DISCONNECTED));
        }
    });
}

/// Description of a simulated joystick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulatedJoystick {
    /// Human-readable name.
    pub name: String,
    /// SDL-style GUID used to look up gamepad mappings.
    pub guid: String,
    /// Axis positions in `-1.0..=1.0`.
    pub axes: Vec<f32>,
    /// Button states (`GLFW_PRESS`/`GLFW_RELEASE`).
    pub buttons: Vec<u8>,
    /// Hat states.
    pub hats: Vec<u8>,
}

/// Plug in a joystick, returning its id, or `None` when every slot is taken.
pub fn connect_joystick(description: SimulatedJoystick) -> Option<c_int> {
    with_state(|s| {
        let slot = s.joysticks.iter().position(Option::is_none)?;
        s.joysticks[slot] = Some(Joystick::new(&description));
        let jid = slot as c_int;
        if s.initialized {
            s.push(Event::Joystick(jid, sys::CONNECTED));
        }
        Some(jid)
    })
}

/// Unplug a joystick.
pub fn disconnect_joystick(jid: c_int) {
    with_state(|s| {
        let Some(slot) = usize::try_from(jid).ok().and_then(|i| s.joysticks.get_mut(i)) else {
            return;
        };
        if slot.take().is_some() && s.initialized {
            s.push(Event::Joystick(jid, sys::DISCONNECTED));
        }
    });
}

fn queue(event: Event) {
    with_state(|s| s.push(event));
}

/// Queue a close request from the user.
pub fn request_close(window: WindowHandle) {
    queue(Event::Close(window.as_ptr()));
}

/// Queue a key event. The scancode is derived from the key.
pub fn key_event(window: WindowHandle, key: c_int, action: c_int, mods: c_int) {
    queue(Event::Key {
        window: window.as_ptr(),
        key,
        scancode: input::scancode_of(key),
        action,
        mods,
    });
}

/// Queue a Unicode character input.
pub fn char_event(window: WindowHandle, codepoint: char) {
    queue(Event::Char(window.as_ptr(), codepoint as c_uint));
}

/// Queue a mouse button event.
pub fn mouse_button_event(window: WindowHandle, button: c_int, action: c_int, mods: c_int) {
    queue(Event::MouseButton {
        window: window.as_ptr(),
        button,
        action,
        mods,
    });
}

/// Queue cursor motion.
pub fn cursor_event(window: WindowHandle, x: f64, y: f64) {
    queue(Event::CursorPos(window.as_ptr(), x, y));
}

/// Queue the cursor entering or leaving the content area.
pub fn cursor_enter_event(window: WindowHandle, entered: bool) {
    queue(Event::CursorEnter(window.as_ptr(), entered));
}

/// Queue a scroll.
pub fn scroll_event(window: WindowHandle, x: f64, y: f64) {
    queue(Event::Scroll(window.as_ptr(), x, y));
}

/// Queue paths dropped onto the window.
pub fn drop_event(window: WindowHandle, paths: &[&str]) {
    queue(Event::Drop(window.as_ptr(), paths.iter().map(|p| c_string(p)).collect()));
}

/// Queue a refresh request.
pub fn refresh_event(window: WindowHandle) {
    queue(Event::Refresh(window.as_ptr()));
}

/// Current title of a window.
pub fn window_title(window: WindowHandle) -> Option<String> {
    with_state(|s| {
        let target = s.window_mut(window.as_ptr()).ok()?;
        Some(target.title.to_string_lossy().into_owned())
    })
}

/// Number of images in a window's icon set.
pub fn window_icon_count(window: WindowHandle) -> c_int {
    with_state(|s| s.window_mut(window.as_ptr()).map_or(0, |w| w.icon_count))
}

/// Description of the cursor image set on a window, `None` for the default.
pub fn window_cursor(window: WindowHandle) -> Option<String> {
    with_state(|s| {
        let cursor = s.window_mut(window.as_ptr()).ok()?.cursor_image;
        input::describe_cursor(s, cursor)
    })
}

/// User pointer of a window, readable from inside a callback.
pub fn window_user_pointer(window: WindowHandle) -> *mut c_void {
    // SAFETY: the simulation validates the handle.
    unsafe { window::get_window_user_pointer(window.as_ptr()) }
}
