use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::{c_char, c_double, c_float, c_int, c_void};
use std::ptr;

use crate::sys::{self, *};

use super::{live, put, raise, read_str, with_state, Event, Fault, State};

const INVALID_HINT: Fault = (sys::INVALID_ENUM, c"Invalid window hint");
const INVALID_ATTRIB: Fault = (sys::INVALID_ENUM, c"Invalid window attribute");
const INVALID_SIZE: Fault = (sys::INVALID_VALUE, c"Invalid window size");
const INVALID_OPACITY: Fault = (sys::INVALID_VALUE, c"Invalid window opacity");
const INVALID_LIMITS: Fault = (sys::INVALID_VALUE, c"Invalid window size limits");
const INVALID_RATIO: Fault = (sys::INVALID_VALUE, c"Invalid window aspect ratio");
const INVALID_ICON: Fault = (sys::INVALID_VALUE, c"Invalid image dimensions for window icon");
const INVALID_REFRESH: Fault = (sys::INVALID_VALUE, c"Invalid refresh rate");
const VERSION_UNAVAILABLE: Fault = (sys::VERSION_UNAVAILABLE, c"Requested OpenGL version unavailable");

/// Frame insets of a decorated windowed-mode window.
const FRAME: [c_int; 4] = [5, 30, 5, 5];

/// Attributes a window reports, seeded from the creation hints.
const REPORTED: [c_int; 14] = [
    sys::FOCUSED,
    sys::RESIZABLE,
    sys::VISIBLE,
    sys::DECORATED,
    sys::AUTO_ICONIFY,
    sys::FLOATING,
    sys::MAXIMIZED,
    sys::TRANSPARENT_FRAMEBUFFER,
    sys::FOCUS_ON_SHOW,
    sys::CLIENT_API,
    sys::CONTEXT_VERSION_MAJOR,
    sys::CONTEXT_VERSION_MINOR,
    sys::OPENGL_PROFILE,
    sys::OPENGL_FORWARD_COMPAT,
];

/// Attributes that may be changed after creation.
const SETTABLE: [c_int; 5] = [
    sys::DECORATED,
    sys::RESIZABLE,
    sys::FLOATING,
    sys::AUTO_ICONIFY,
    sys::FOCUS_ON_SHOW,
];

pub(super) fn default_hints() -> HashMap<c_int, c_int> {
    HashMap::from([
        (sys::FOCUSED, sys::TRUE),
        (sys::RESIZABLE, sys::TRUE),
        (sys::VISIBLE, sys::TRUE),
        (sys::DECORATED, sys::TRUE),
        (sys::AUTO_ICONIFY, sys::TRUE),
        (sys::FLOATING, sys::FALSE),
        (sys::MAXIMIZED, sys::FALSE),
        (sys::CENTER_CURSOR, sys::TRUE),
        (sys::TRANSPARENT_FRAMEBUFFER, sys::FALSE),
        (sys::FOCUS_ON_SHOW, sys::TRUE),
        (sys::SCALE_TO_MONITOR, sys::FALSE),
        (sys::RED_BITS, 8),
        (sys::GREEN_BITS, 8),
        (sys::BLUE_BITS, 8),
        (sys::ALPHA_BITS, 8),
        (sys::DEPTH_BITS, 24),
        (sys::STENCIL_BITS, 8),
        (sys::SAMPLES, 0),
        (sys::SRGB_CAPABLE, sys::FALSE),
        (sys::REFRESH_RATE, sys::DONT_CARE),
        (sys::DOUBLEBUFFER, sys::TRUE),
        (sys::CLIENT_API, sys::OPENGL_API),
        (sys::CONTEXT_VERSION_MAJOR, 1),
        (sys::CONTEXT_VERSION_MINOR, 0),
        (sys::OPENGL_FORWARD_COMPAT, sys::FALSE),
        (sys::OPENGL_DEBUG_CONTEXT, sys::FALSE),
        (sys::OPENGL_PROFILE, sys::OPENGL_ANY_PROFILE),
    ])
}

#[derive(Default, Clone, Copy)]
pub(super) struct Callbacks {
    pos: Option<GLFWwindowposfun>,
    size: Option<GLFWwindowsizefun>,
    close: Option<GLFWwindowclosefun>,
    refresh: Option<GLFWwindowrefreshfun>,
    focus: Option<GLFWwindowfocusfun>,
    iconify: Option<GLFWwindowiconifyfun>,
    maximize: Option<GLFWwindowmaximizefun>,
    framebuffer_size: Option<GLFWframebuffersizefun>,
    content_scale: Option<GLFWwindowcontentscalefun>,
    key: Option<GLFWkeyfun>,
    character: Option<GLFWcharfun>,
    mouse_button: Option<GLFWmousebuttonfun>,
    cursor_pos: Option<GLFWcursorposfun>,
    cursor_enter: Option<GLFWcursorenterfun>,
    scroll: Option<GLFWscrollfun>,
    drop: Option<GLFWdropfun>,
}

pub(super) struct Window {
    pub(super) title: CString,
    pub(super) pos: (c_int, c_int),
    pub(super) size: (c_int, c_int),
    pub(super) limits: [c_int; 4],
    pub(super) aspect: (c_int, c_int),
    pub(super) opacity: c_float,
    pub(super) should_close: bool,
    pub(super) icon_count: c_int,
    pub(super) attribs: HashMap<c_int, c_int>,
    pub(super) monitor: *mut GLFWmonitor,
    pub(super) user: *mut c_void,
    pub(super) callbacks: Callbacks,
    pub(super) keys: HashMap<c_int, c_int>,
    pub(super) buttons: [c_int; 8],
    pub(super) cursor: (c_double, c_double),
    pub(super) input_modes: HashMap<c_int, c_int>,
    pub(super) cursor_image: *mut GLFWcursor,
}

impl Window {
    pub(super) fn ptr(&self) -> *mut GLFWwindow {
        ptr::from_ref(self).cast_mut().cast()
    }

    pub(super) fn attrib(&self, attrib: c_int) -> c_int {
        self.attribs.get(&attrib).copied().unwrap_or(sys::FALSE)
    }

    pub(super) fn has_context(&self) -> bool {
        self.attrib(sys::CLIENT_API) != sys::NO_API
    }

    fn set_flag(&mut self, attrib: c_int, value: bool) -> bool {
        let raw = if value { sys::TRUE } else { sys::FALSE };
        self.attribs.insert(attrib, raw) != Some(raw)
    }

    fn clamp(&self, (width, height): (c_int, c_int)) -> (c_int, c_int) {
        let bound = |value: c_int, min: c_int, max: c_int| {
            let value = if min == sys::DONT_CARE { value } else { value.max(min) };
            if max == sys::DONT_CARE {
                value
            } else {
                value.min(max)
            }
        };
        let [min_w, min_h, max_w, max_h] = self.limits;
        let width = bound(width, min_w, max_w);
        let height = match self.aspect {
            (numer, denom) if numer > 0 && denom > 0 => width * denom / numer,
            _ => height,
        };
        (width, bound(height, min_h, max_h))
    }
}

fn resize(s: &mut State, window: *mut GLFWwindow, size: (c_int, c_int)) -> Result<(), Fault> {
    let target = s.window_mut(window)?;
    let size = target.clamp(size);
    if target.size != size {
        target.size = size;
        s.push(Event::Size(window, size.0, size.1));
        s.push(Event::FramebufferSize(window, size.0, size.1));
    }
    Ok(())
}

pub(super) unsafe extern "C" fn default_window_hints() {
    live((), |s| {
        s.window_hints = default_hints();
        Ok(())
    });
}

pub(super) unsafe extern "C" fn window_hint(hint: c_int, value: c_int) {
    live((), |s| match s.window_hints.get_mut(&hint) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(INVALID_HINT),
    });
}

pub(super) unsafe extern "C" fn create_window(
    width: c_int,
    height: c_int,
    title: *const c_char,
    monitor: *mut GLFWmonitor,
    share: *mut GLFWwindow,
) -> *mut GLFWwindow {
    // SAFETY: the title is a NUL-terminated string.
    let title = unsafe { read_str(title) };
    live(ptr::null_mut(), |s| {
        if width <= 0 || height <= 0 {
            return Err(INVALID_SIZE);
        }
        if !share.is_null() {
            s.window_mut(share)?;
        }
        let hints = s.window_hints.clone();
        let hint = |h: c_int| hints.get(&h).copied().unwrap_or(sys::FALSE);

        let client_api = hint(sys::CLIENT_API);
        let (major, minor) = (hint(sys::CONTEXT_VERSION_MAJOR), hint(sys::CONTEXT_VERSION_MINOR));
        if client_api == sys::OPENGL_API && (major > 4 || (major == 4 && minor > 6)) {
            return Err(VERSION_UNAVAILABLE);
        }

        let (pos, fullscreen) = if monitor.is_null() {
            ((64, 64), ptr::null_mut())
        } else {
            (s.monitor_mut(monitor)?.pos, monitor)
        };

        let mut attribs: HashMap<c_int, c_int> = REPORTED.iter().map(|&a| (a, hint(a))).collect();
        attribs.insert(sys::ICONIFIED, sys::FALSE);
        attribs.insert(sys::HOVERED, sys::FALSE);
        if client_api == sys::NO_API {
            for attrib in [sys::CONTEXT_VERSION_MAJOR, sys::CONTEXT_VERSION_MINOR, sys::OPENGL_PROFILE] {
                attribs.insert(attrib, 0);
            }
        }
        let focused = hint(sys::VISIBLE) == sys::TRUE && hint(sys::FOCUSED) == sys::TRUE;
        attribs.insert(sys::FOCUSED, i32::from(focused));

        let window = Box::new(Window {
            title: super::c_string(&title),
            pos,
            size: (width, height),
            limits: [sys::DONT_CARE; 4],
            aspect: (sys::DONT_CARE, sys::DONT_CARE),
            opacity: 1.0,
            should_close: false,
            icon_count: 0,
            attribs,
            monitor: fullscreen,
            user: ptr::null_mut(),
            callbacks: Callbacks::default(),
            keys: HashMap::new(),
            buttons: [sys::RELEASE; 8],
            cursor: (0.0, 0.0),
            input_modes: super::input::default_modes(),
            cursor_image: ptr::null_mut(),
        });
        let raw = window.ptr();
        if focused {
            for other in &mut s.windows {
                other.set_flag(sys::FOCUSED, false);
            }
        }
        s.windows.push(window);
        Ok(raw)
    })
}

pub(super) unsafe extern "C" fn destroy_window(window: *mut GLFWwindow) {
    if window.is_null() {
        return;
    }
    live((), |s| {
        let index = s.windows.iter().position(|w| w.ptr() == window).ok_or(super::UNKNOWN_WINDOW)?;
        s.windows.remove(index);
        if s.current_context == window {
            s.current_context = ptr::null_mut();
        }
        s.events.retain(|event| event.window() != Some(window));
        Ok(())
    });
}

pub(super) unsafe extern "C" fn window_should_close(window: *mut GLFWwindow) -> c_int {
    live(0, |s| Ok(c_int::from(s.window_mut(window)?.should_close)))
}

pub(super) unsafe extern "C" fn set_window_should_close(window: *mut GLFWwindow, value: c_int) {
    live((), |s| {
        s.window_mut(window)?.should_close = value != sys::FALSE;
        Ok(())
    });
}

pub(super) unsafe extern "C" fn set_window_title(window: *mut GLFWwindow, title: *const c_char) {
    // SAFETY: the title is a NUL-terminated string.
    let title = unsafe { read_str(title) };
    live((), |s| {
        s.window_mut(window)?.title = super::c_string(&title);
        Ok(())
    });
}

pub(super) unsafe extern "C" fn set_window_icon(window: *mut GLFWwindow, count: c_int, images: *const GLFWimage) {
    let valid = if count < 0 {
        false
    } else if count == 0 || images.is_null() {
        true
    } else {
        // SAFETY: `images` points to `count` image records.
        let images = unsafe { std::slice::from_raw_parts(images, count as usize) };
        images.iter().all(|i| i.width > 0 && i.height > 0 && !i.pixels.is_null())
    };
    live((), |s| {
        if !valid {
            return Err(INVALID_ICON);
        }
        s.window_mut(window)?.icon_count = if images.is_null() { 0 } else { count };
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_window_pos(window: *mut GLFWwindow, x: *mut c_int, y: *mut c_int) {
    let (px, py) = live((0, 0), |s| Ok(s.window_mut(window)?.pos));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(x, px);
        put(y, py);
    }
}

pub(super) unsafe extern "C" fn set_window_pos(window: *mut GLFWwindow, x: c_int, y: c_int) {
    live((), |s| {
        let target = s.window_mut(window)?;
        if !target.monitor.is_null() || target.pos == (x, y) {
            return Ok(());
        }
        target.pos = (x, y);
        s.push(Event::Pos(window, x, y));
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_window_size(window: *mut GLFWwindow, width: *mut c_int, height: *mut c_int) {
    let (w, h) = live((0, 0), |s| Ok(s.window_mut(window)?.size));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(width, w);
        put(height, h);
    }
}

pub(super) unsafe extern "C" fn set_window_size_limits(
    window: *mut GLFWwindow,
    min_width: c_int,
    min_height: c_int,
    max_width: c_int,
    max_height: c_int,
) {
    live((), |s| {
        let set = |v: c_int| v != sys::DONT_CARE;
        if [min_width, min_height, max_width, max_height].iter().any(|&v| set(v) && v < 0)
            || (set(min_width) && set(max_width) && max_width < min_width)
            || (set(min_height) && set(max_height) && max_height < min_height)
        {
            return Err(INVALID_LIMITS);
        }
        let target = s.window_mut(window)?;
        target.limits = [min_width, min_height, max_width, max_height];
        let size = target.size;
        resize(s, window, size)
    });
}

pub(super) unsafe extern "C" fn set_window_aspect_ratio(window: *mut GLFWwindow, numer: c_int, denom: c_int) {
    live((), |s| {
        let unset = numer == sys::DONT_CARE && denom == sys::DONT_CARE;
        if !unset && (numer <= 0 || denom <= 0) {
            return Err(INVALID_RATIO);
        }
        s.window_mut(window)?.aspect = (numer, denom);
        Ok(())
    });
}

pub(super) unsafe extern "C" fn set_window_size(window: *mut GLFWwindow, width: c_int, height: c_int) {
    live((), |s| {
        if width <= 0 || height <= 0 {
            return Err(INVALID_SIZE);
        }
        resize(s, window, (width, height))
    });
}

pub(super) unsafe extern "C" fn get_framebuffer_size(window: *mut GLFWwindow, width: *mut c_int, height: *mut c_int) {
    // Content scale is 1:1, so the framebuffer matches the content area.
    // SAFETY: forwarded out-parameters.
    unsafe { get_window_size(window, width, height) };
}

pub(super) unsafe extern "C" fn get_window_frame_size(
    window: *mut GLFWwindow,
    left: *mut c_int,
    top: *mut c_int,
    right: *mut c_int,
    bottom: *mut c_int,
) {
    let frame = live([0; 4], |s| {
        let target = s.window_mut(window)?;
        let framed = target.monitor.is_null() && target.attrib(sys::DECORATED) == sys::TRUE;
        Ok(if framed { FRAME } else { [0; 4] })
    });
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(left, frame[0]);
        put(top, frame[1]);
        put(right, frame[2]);
        put(bottom, frame[3]);
    }
}

pub(super) unsafe extern "C" fn get_window_content_scale(window: *mut GLFWwindow, x: *mut c_float, y: *mut c_float) {
    let scale = live(0.0, |s| s.window_mut(window).map(|_| 1.0));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(x, scale);
        put(y, scale);
    }
}

pub(super) unsafe extern "C" fn get_window_opacity(window: *mut GLFWwindow) -> c_float {
    live(1.0, |s| Ok(s.window_mut(window)?.opacity))
}

pub(super) unsafe extern "C" fn set_window_opacity(window: *mut GLFWwindow, opacity: c_float) {
    live((), |s| {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(INVALID_OPACITY);
        }
        s.window_mut(window)?.opacity = opacity;
        Ok(())
    });
}

/// Change the iconified/maximized pair, queueing the matching events.
fn set_state(s: &mut State, window: *mut GLFWwindow, iconified: bool, maximized: bool) -> Result<(), Fault> {
    let target = s.window_mut(window)?;
    let iconify_changed = target.set_flag(sys::ICONIFIED, iconified);
    let maximize_changed = target.set_flag(sys::MAXIMIZED, maximized);
    if iconify_changed {
        s.push(Event::Iconify(window, iconified));
    }
    if maximize_changed {
        s.push(Event::Maximize(window, maximized));
    }
    Ok(())
}

pub(super) unsafe extern "C" fn iconify_window(window: *mut GLFWwindow) {
    live((), |s| set_state(s, window, true, false));
}

pub(super) unsafe extern "C" fn restore_window(window: *mut GLFWwindow) {
    live((), |s| set_state(s, window, false, false));
}

pub(super) unsafe extern "C" fn maximize_window(window: *mut GLFWwindow) {
    live((), |s| {
        if !s.window_mut(window)?.monitor.is_null() {
            return Ok(());
        }
        set_state(s, window, false, true)
    });
}

pub(super) unsafe extern "C" fn show_window(window: *mut GLFWwindow) {
    live((), |s| {
        let target = s.window_mut(window)?;
        target.set_flag(sys::VISIBLE, true);
        if target.attrib(sys::FOCUS_ON_SHOW) == sys::TRUE {
            focus(s, window)?;
        }
        Ok(())
    });
}

pub(super) unsafe extern "C" fn hide_window(window: *mut GLFWwindow) {
    live((), |s| {
        let target = s.window_mut(window)?;
        target.set_flag(sys::VISIBLE, false);
        if target.set_flag(sys::FOCUSED, false) {
            s.push(Event::Focus(window, false));
        }
        Ok(())
    });
}

fn focus(s: &mut State, window: *mut GLFWwindow) -> Result<(), Fault> {
    if !s.window_mut(window)?.set_flag(sys::FOCUSED, true) {
        return Ok(());
    }
    let mut lost = Vec::new();
    for other in s.windows.iter_mut().filter(|w| w.ptr() != window) {
        if other.set_flag(sys::FOCUSED, false) {
            lost.push(other.ptr());
        }
    }
    for other in lost {
        s.push(Event::Focus(other, false));
    }
    s.push(Event::Focus(window, true));
    Ok(())
}

pub(super) unsafe extern "C" fn focus_window(window: *mut GLFWwindow) {
    live((), |s| focus(s, window));
}

pub(super) unsafe extern "C" fn request_window_attention(window: *mut GLFWwindow) {
    live((), |s| s.window_mut(window).map(|_| ()));
}

pub(super) unsafe extern "C" fn get_window_monitor(window: *mut GLFWwindow) -> *mut GLFWmonitor {
    live(ptr::null_mut(), |s| Ok(s.window_mut(window)?.monitor))
}

pub(super) unsafe extern "C" fn set_window_monitor(
    window: *mut GLFWwindow,
    monitor: *mut GLFWmonitor,
    x: c_int,
    y: c_int,
    width: c_int,
    height: c_int,
    refresh_rate: c_int,
) {
    live((), |s| {
        if width <= 0 || height <= 0 {
            return Err(INVALID_SIZE);
        }
        if refresh_rate < 0 && refresh_rate != sys::DONT_CARE {
            return Err(INVALID_REFRESH);
        }
        let pos = if monitor.is_null() {
            (x, y)
        } else {
            let m = s.monitor_mut(monitor)?;
            if let Some(mode) = m.modes.iter().find(|mode| (mode.width, mode.height) == (width, height)) {
                m.current = super::monitor::copy_mode(mode);
            }
            m.pos
        };
        let target = s.window_mut(window)?;
        target.monitor = monitor;
        if target.pos != pos {
            target.pos = pos;
            s.push(Event::Pos(window, pos.0, pos.1));
        }
        resize(s, window, (width, height))
    });
}

pub(super) unsafe extern "C" fn get_window_attrib(window: *mut GLFWwindow, attrib: c_int) -> c_int {
    live(0, |s| s.window_mut(window)?.attribs.get(&attrib).copied().ok_or(INVALID_ATTRIB))
}

pub(super) unsafe extern "C" fn set_window_attrib(window: *mut GLFWwindow, attrib: c_int, value: c_int) {
    live((), |s| {
        if !SETTABLE.contains(&attrib) {
            return Err(INVALID_ATTRIB);
        }
        s.window_mut(window)?.set_flag(attrib, value != sys::FALSE);
        Ok(())
    });
}

pub(super) unsafe extern "C" fn set_window_user_pointer(window: *mut GLFWwindow, pointer: *mut c_void) {
    live((), |s| {
        s.window_mut(window)?.user = pointer;
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_window_user_pointer(window: *mut GLFWwindow) -> *mut c_void {
    live(ptr::null_mut(), |s| Ok(s.window_mut(window)?.user))
}

macro_rules! callback_setters {
    ($($setter:ident => $slot:ident: $ty:ty;)*) => {$(
        pub(super) unsafe extern "C" fn $setter(window: *mut GLFWwindow, callback: Option<$ty>) -> Option<$ty> {
            live(None, |s| Ok(std::mem::replace(&mut s.window_mut(window)?.callbacks.$slot, callback)))
        }
    )*};
}

callback_setters! {
    set_window_pos_callback => pos: GLFWwindowposfun;
    set_window_size_callback => size: GLFWwindowsizefun;
    set_window_close_callback => close: GLFWwindowclosefun;
    set_window_refresh_callback => refresh: GLFWwindowrefreshfun;
    set_window_focus_callback => focus: GLFWwindowfocusfun;
    set_window_iconify_callback => iconify: GLFWwindowiconifyfun;
    set_window_maximize_callback => maximize: GLFWwindowmaximizefun;
    set_framebuffer_size_callback => framebuffer_size: GLFWframebuffersizefun;
    set_window_content_scale_callback => content_scale: GLFWwindowcontentscalefun;
    set_key_callback => key: GLFWkeyfun;
    set_char_callback => character: GLFWcharfun;
    set_mouse_button_callback => mouse_button: GLFWmousebuttonfun;
    set_cursor_pos_callback => cursor_pos: GLFWcursorposfun;
    set_cursor_enter_callback => cursor_enter: GLFWcursorenterfun;
    set_scroll_callback => scroll: GLFWscrollfun;
    set_drop_callback => drop: GLFWdropfun;
}

/// Apply `update` to a live window and return its callbacks, all under one
/// short borrow.
fn update(window: *mut GLFWwindow, update: impl FnOnce(&mut Window)) -> Option<Callbacks> {
    with_state(|s| {
        let target = s.window_mut(window).ok()?;
        update(target);
        Some(target.callbacks)
    })
}

const fn bit(value: bool) -> c_int {
    if value {
        sys::TRUE
    } else {
        sys::FALSE
    }
}

/// Deliver a window event: record its effect on window state, then run the
/// registered callback, if any.
pub(super) fn dispatch(event: Event) {
    match event {
        Event::Close(w) => {
            if let Some(f) = update(w, |win| win.should_close = true).and_then(|c| c.close) {
                f(w);
            }
        }
        Event::Refresh(w) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.refresh) {
                f(w);
            }
        }
        Event::Pos(w, x, y) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.pos) {
                f(w, x, y);
            }
        }
        Event::Size(w, width, height) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.size) {
                f(w, width, height);
            }
        }
        Event::FramebufferSize(w, width, height) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.framebuffer_size) {
                f(w, width, height);
            }
        }
        Event::Focus(w, focused) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.focus) {
                f(w, bit(focused));
            }
        }
        Event::Iconify(w, iconified) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.iconify) {
                f(w, bit(iconified));
            }
        }
        Event::Maximize(w, maximized) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.maximize) {
                f(w, bit(maximized));
            }
        }
        Event::Key {
            window,
            key,
            scancode,
            action,
            mods,
        } => {
            let mut delivered = (action, mods);
            let callbacks = update(window, |win| delivered = super::input::record_key(win, key, action, mods));
            if let Some(f) = callbacks.and_then(|c| c.key) {
                f(window, key, scancode, delivered.0, delivered.1);
            }
        }
        Event::Char(w, codepoint) => {
            let printable = !(codepoint < 32 || (127..160).contains(&codepoint));
            if let Some(f) = update(w, |_| {}).and_then(|c| c.character).filter(|_| printable) {
                f(w, codepoint);
            }
        }
        Event::MouseButton {
            window,
            button,
            action,
            mods,
        } => {
            let mut delivered = mods;
            let callbacks = update(window, |win| delivered = super::input::record_button(win, button, action, mods));
            if let Some(f) = callbacks.and_then(|c| c.mouse_button) {
                f(window, button, action, delivered);
            }
        }
        Event::CursorPos(w, x, y) => {
            if let Some(f) = update(w, |win| win.cursor = (x, y)).and_then(|c| c.cursor_pos) {
                f(w, x, y);
            }
        }
        Event::CursorEnter(w, entered) => {
            let callbacks = update(w, |win| {
                win.set_flag(sys::HOVERED, entered);
            });
            if let Some(f) = callbacks.and_then(|c| c.cursor_enter) {
                f(w, bit(entered));
            }
        }
        Event::Scroll(w, x, y) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.scroll) {
                f(w, x, y);
            }
        }
        Event::Drop(w, paths) => {
            if let Some(f) = update(w, |_| {}).and_then(|c| c.drop) {
                let mut pointers: Vec<*const c_char> = paths.iter().map(|p| p.as_ptr()).collect();
                f(w, pointers.len() as c_int, pointers.as_mut_ptr());
            }
        }
        Event::Monitor(..) | Event::Joystick(..) => raise((sys::INVALID_VALUE, c"Headless: misrouted event")),
    }
}
