use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_float, c_int, c_uchar, c_void};
use std::ptr;

use crate::sys::{self, GLFWcursor, GLFWgamepadstate, GLFWimage, GLFWjoystickfun, GLFWwindow};

use super::window::Window;
use super::{c_string, live, put, read_str, Fault, SimulatedJoystick, State};

const INVALID_KEY: Fault = (sys::INVALID_ENUM, c"Invalid key");
const INVALID_BUTTON: Fault = (sys::INVALID_ENUM, c"Invalid mouse button");
const INVALID_MODE: Fault = (sys::INVALID_ENUM, c"Invalid input mode");
const INVALID_CURSOR_MODE: Fault = (sys::INVALID_ENUM, c"Invalid cursor mode");
const INVALID_SHAPE: Fault = (sys::INVALID_ENUM, c"Invalid standard cursor");
const INVALID_IMAGE: Fault = (sys::INVALID_VALUE, c"Invalid image dimensions for cursor");
const UNKNOWN_CURSOR: Fault = (sys::INVALID_VALUE, c"Headless: unknown cursor handle");
const INVALID_JOYSTICK: Fault = (sys::INVALID_ENUM, c"Invalid joystick ID");
const INVALID_MAPPING: Fault = (sys::INVALID_VALUE, c"Invalid gamepad mapping");
const NO_RAW_MOTION: Fault = (sys::PLATFORM_ERROR, c"Raw mouse motion is not supported on this system");

/// Key or button released since the last query while sticky mode is on.
const STICK: c_int = 3;

/// Offset between key tokens and simulated scancodes.
const SCANCODE_OFFSET: c_int = 8;

const LETTER_NAMES: [&CStr; 26] = [
    c"a", c"b", c"c", c"d", c"e", c"f", c"g", c"h", c"i", c"j", c"k", c"l", c"m", c"n", c"o", c"p", c"q", c"r", c"s",
    c"t", c"u", c"v", c"w", c"x", c"y", c"z",
];

pub(super) enum Cursor {
    Standard(c_int),
    Custom {
        width: c_int,
        height: c_int,
        hotspot: (c_int, c_int),
    },
}

impl Cursor {
    fn ptr(&self) -> *mut GLFWcursor {
        ptr::from_ref(self).cast_mut().cast()
    }
}

pub(super) struct Joystick {
    name: CString,
    guid: CString,
    axes: Vec<c_float>,
    buttons: Vec<c_uchar>,
    hats: Vec<c_uchar>,
    user: *mut c_void,
}

impl Joystick {
    pub(super) fn new(description: &SimulatedJoystick) -> Self {
        Self {
            name: c_string(&description.name),
            guid: c_string(&description.guid),
            axes: description.axes.clone(),
            buttons: description.buttons.clone(),
            hats: description.hats.clone(),
            user: ptr::null_mut(),
        }
    }
}

pub(super) fn default_modes() -> HashMap<c_int, c_int> {
    HashMap::from([
        (sys::CURSOR, sys::CURSOR_NORMAL),
        (sys::STICKY_KEYS, sys::FALSE),
        (sys::STICKY_MOUSE_BUTTONS, sys::FALSE),
        (sys::LOCK_KEY_MODS, sys::FALSE),
        (sys::RAW_MOUSE_MOTION, sys::FALSE),
    ])
}

pub(super) const fn scancode_of(key: c_int) -> c_int {
    if key < 0 || key > sys::KEY_LAST {
        -1
    } else {
        key + SCANCODE_OFFSET
    }
}

fn mode(window: &Window, mode: c_int) -> bool {
    window.input_modes.get(&mode).copied() == Some(sys::TRUE)
}

/// Strip lock modifiers unless the window asked for them.
fn visible_mods(window: &Window, mods: c_int) -> c_int {
    if mode(window, sys::LOCK_KEY_MODS) {
        mods
    } else {
        mods & !(sys::MOD_CAPS_LOCK | sys::MOD_NUM_LOCK)
    }
}

/// Record a key transition; returns the action and modifiers to report.
pub(super) fn record_key(window: &mut Window, key: c_int, action: c_int, mods: c_int) -> (c_int, c_int) {
    let previous = window.keys.get(&key).copied().unwrap_or(sys::RELEASE);
    let action = if action == sys::PRESS && previous == sys::PRESS {
        sys::REPEAT
    } else {
        action
    };
    let stored = match action {
        sys::RELEASE if mode(window, sys::STICKY_KEYS) && previous == sys::PRESS => STICK,
        sys::REPEAT => sys::PRESS,
        other => other,
    };
    window.keys.insert(key, stored);
    (action, visible_mods(window, mods))
}

/// Record a button transition; returns the modifiers to report.
pub(super) fn record_button(window: &mut Window, button: c_int, action: c_int, mods: c_int) -> c_int {
    let sticky = mode(window, sys::STICKY_MOUSE_BUTTONS);
    if let Some(state) = usize::try_from(button).ok().and_then(|b| window.buttons.get_mut(b)) {
        *state = if action == sys::RELEASE && sticky && *state == sys::PRESS {
            STICK
        } else {
            action
        };
    }
    visible_mods(window, mods)
}

/// Read a sticky-aware state slot, consuming a stuck press.
fn read_state(slot: &mut c_int) -> c_int {
    if *slot == STICK {
        *slot = sys::RELEASE;
        sys::PRESS
    } else {
        *slot
    }
}

pub(super) unsafe extern "C" fn get_input_mode(window: *mut GLFWwindow, mode: c_int) -> c_int {
    live(0, |s| s.window_mut(window)?.input_modes.get(&mode).copied().ok_or(INVALID_MODE))
}

pub(super) unsafe extern "C" fn set_input_mode(window: *mut GLFWwindow, mode: c_int, value: c_int) {
    live((), |s| {
        let raw_supported = s.raw_mouse_motion;
        let target = s.window_mut(window)?;
        let value = match mode {
            sys::CURSOR => {
                if ![sys::CURSOR_NORMAL, sys::CURSOR_HIDDEN, sys::CURSOR_DISABLED].contains(&value) {
                    return Err(INVALID_CURSOR_MODE);
                }
                value
            }
            sys::RAW_MOUSE_MOTION if !raw_supported => return Err(NO_RAW_MOTION),
            sys::STICKY_KEYS | sys::STICKY_MOUSE_BUTTONS | sys::LOCK_KEY_MODS | sys::RAW_MOUSE_MOTION => {
                c_int::from(value != sys::FALSE)
            }
            _ => return Err(INVALID_MODE),
        };
        if mode == sys::STICKY_KEYS && value == sys::FALSE {
            target.keys.retain(|_, state| *state != STICK);
        }
        if mode == sys::STICKY_MOUSE_BUTTONS && value == sys::FALSE {
            for state in &mut target.buttons {
                if *state == STICK {
                    *state = sys::RELEASE;
                }
            }
        }
        target.input_modes.insert(mode, value);
        Ok(())
    });
}

pub(super) unsafe extern "C" fn raw_mouse_motion_supported() -> c_int {
    live(sys::FALSE, |s| Ok(c_int::from(s.raw_mouse_motion)))
}

pub(super) unsafe extern "C" fn get_key_name(key: c_int, scancode: c_int) -> *const c_char {
    live(ptr::null(), |_| {
        let key = if key == sys::KEY_UNKNOWN { scancode - SCANCODE_OFFSET } else { key };
        if key == sys::KEY_UNKNOWN || key > sys::KEY_LAST || key < 0 {
            return Err(INVALID_KEY);
        }
        Ok(match key {
            sys::KEY_A..=sys::KEY_Z => LETTER_NAMES[(key - sys::KEY_A) as usize].as_ptr(),
            _ => ptr::null(),
        })
    })
}

pub(super) unsafe extern "C" fn get_key_scancode(key: c_int) -> c_int {
    live(-1, |_| match scancode_of(key) {
        -1 => Err(INVALID_KEY),
        scancode => Ok(scancode),
    })
}

pub(super) unsafe extern "C" fn get_key(window: *mut GLFWwindow, key: c_int) -> c_int {
    live(sys::RELEASE, |s| {
        if !(0..=sys::KEY_LAST).contains(&key) {
            return Err(INVALID_KEY);
        }
        let target = s.window_mut(window)?;
        let state = target.keys.entry(key).or_insert(sys::RELEASE);
        Ok(read_state(state))
    })
}

pub(super) unsafe extern "C" fn get_mouse_button(window: *mut GLFWwindow, button: c_int) -> c_int {
    live(sys::RELEASE, |s| {
        let index = usize::try_from(button)
            .ok()
            .filter(|&b| b <= sys::MOUSE_BUTTON_LAST as usize)
            .ok_or(INVALID_BUTTON)?;
        Ok(read_state(&mut s.window_mut(window)?.buttons[index]))
    })
}

pub(super) unsafe extern "C" fn get_cursor_pos(window: *mut GLFWwindow, x: *mut c_double, y: *mut c_double) {
    let (cx, cy) = live((0.0, 0.0), |s| Ok(s.window_mut(window)?.cursor));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(x, cx);
        put(y, cy);
    }
}

pub(super) unsafe extern "C" fn set_cursor_pos(window: *mut GLFWwindow, x: c_double, y: c_double) {
    live((), |s| {
        if !(x.is_finite() && y.is_finite()) {
            return Err((sys::INVALID_VALUE, c"Invalid cursor position"));
        }
        s.window_mut(window)?.cursor = (x, y);
        Ok(())
    });
}

fn add_cursor(s: &mut State, cursor: Cursor) -> *mut GLFWcursor {
    let cursor = Box::new(cursor);
    let raw = cursor.ptr();
    s.cursors.push(cursor);
    raw
}

pub(super) unsafe extern "C" fn create_cursor(image: *const GLFWimage, xhot: c_int, yhot: c_int) -> *mut GLFWcursor {
    // SAFETY: `image` is null or points to an image record.
    let image = unsafe { image.as_ref() }.map(|i| (i.width, i.height, i.pixels.is_null()));
    live(ptr::null_mut(), |s| {
        let (width, height, _) = image
            .filter(|&(width, height, empty)| width > 0 && height > 0 && !empty)
            .ok_or(INVALID_IMAGE)?;
        Ok(add_cursor(
            s,
            Cursor::Custom {
                width,
                height,
                hotspot: (xhot, yhot),
            },
        ))
    })
}

pub(super) unsafe extern "C" fn create_standard_cursor(shape: c_int) -> *mut GLFWcursor {
    live(ptr::null_mut(), |s| {
        if !(sys::ARROW_CURSOR..=sys::VRESIZE_CURSOR).contains(&shape) {
            return Err(INVALID_SHAPE);
        }
        Ok(add_cursor(s, Cursor::Standard(shape)))
    })
}

pub(super) unsafe extern "C" fn destroy_cursor(cursor: *mut GLFWcursor) {
    if cursor.is_null() {
        return;
    }
    live((), |s| {
        let index = s.cursors.iter().position(|c| c.ptr() == cursor).ok_or(UNKNOWN_CURSOR)?;
        s.cursors.remove(index);
        for window in &mut s.windows {
            if window.cursor_image == cursor {
                window.cursor_image = ptr::null_mut();
            }
        }
        Ok(())
    });
}

pub(super) unsafe extern "C" fn set_cursor(window: *mut GLFWwindow, cursor: *mut GLFWcursor) {
    live((), |s| {
        if !cursor.is_null() && !s.cursors.iter().any(|c| c.ptr() == cursor) {
            return Err(UNKNOWN_CURSOR);
        }
        s.window_mut(window)?.cursor_image = cursor;
        Ok(())
    });
}

/// Describe a cursor for inspection.
pub(super) fn describe_cursor(s: &State, cursor: *mut GLFWcursor) -> Option<String> {
    s.cursors.iter().find(|c| c.ptr() == cursor).map(|c| match **c {
        Cursor::Standard(shape) => format!("standard {shape:#x}"),
        Cursor::Custom { width, height, hotspot } => {
            format!("custom {width}x{height} at {},{}", hotspot.0, hotspot.1)
        }
    })
}

fn slot(jid: c_int) -> Result<usize, Fault> {
    usize::try_from(jid)
        .ok()
        .filter(|&j| j <= sys::JOYSTICK_LAST as usize)
        .ok_or(INVALID_JOYSTICK)
}

/// Run `f` on a present joystick; an absent one yields `fallback` without error.
fn on_joystick<T>(jid: c_int, fallback: T, f: impl FnOnce(&mut State, usize) -> T) -> T {
    let result = live(None, |s| {
        let index = slot(jid)?;
        Ok(if s.joysticks[index].is_some() { Some(f(s, index)) } else { None })
    });
    result.unwrap_or(fallback)
}

pub(super) unsafe extern "C" fn joystick_present(jid: c_int) -> c_int {
    on_joystick(jid, sys::FALSE, |_, _| sys::TRUE)
}

/// Hand out a joystick array: pointer and length, or null and zero when absent.
unsafe fn joystick_array<T>(jid: c_int, count: *mut c_int, pick: impl FnOnce(&Joystick) -> &Vec<T>) -> *const T {
    let (len, data) = on_joystick(jid, (0, ptr::null()), |s, index| {
        s.joysticks[index].as_ref().map_or((0, ptr::null()), |joystick| {
            let values = pick(joystick);
            (values.len() as c_int, values.as_ptr())
        })
    });
    // SAFETY: out-parameter is null or writable.
    unsafe { put(count, len) };
    if len == 0 {
        ptr::null()
    } else {
        data
    }
}

pub(super) unsafe extern "C" fn get_joystick_axes(jid: c_int, count: *mut c_int) -> *const c_float {
    // SAFETY: forwarded out-parameter.
    unsafe { joystick_array(jid, count, |j| &j.axes) }
}

pub(super) unsafe extern "C" fn get_joystick_buttons(jid: c_int, count: *mut c_int) -> *const c_uchar {
    // SAFETY: forwarded out-parameter.
    unsafe { joystick_array(jid, count, |j| &j.buttons) }
}

pub(super) unsafe extern "C" fn get_joystick_hats(jid: c_int, count: *mut c_int) -> *const c_uchar {
    // SAFETY: forwarded out-parameter.
    unsafe { joystick_array(jid, count, |j| &j.hats) }
}

pub(super) unsafe extern "C" fn get_joystick_name(jid: c_int) -> *const c_char {
    on_joystick(jid, ptr::null(), |s, index| s.joysticks[index].as_ref().map_or(ptr::null(), |j| j.name.as_ptr()))
}

pub(super) unsafe extern "C" fn get_joystick_guid(jid: c_int) -> *const c_char {
    on_joystick(jid, ptr::null(), |s, index| s.joysticks[index].as_ref().map_or(ptr::null(), |j| j.guid.as_ptr()))
}

pub(super) unsafe extern "C" fn set_joystick_user_pointer(jid: c_int, pointer: *mut c_void) {
    on_joystick(jid, (), |s, index| {
        if let Some(joystick) = s.joysticks[index].as_mut() {
            joystick.user = pointer;
        }
    });
}

pub(super) unsafe extern "C" fn get_joystick_user_pointer(jid: c_int) -> *mut c_void {
    on_joystick(jid, ptr::null_mut(), |s, index| s.joysticks[index].as_ref().map_or(ptr::null_mut(), |j| j.user))
}

fn mapping_of(s: &State, index: usize) -> Option<&CString> {
    let joystick = s.joysticks[index].as_ref()?;
    s.gamepad_mappings.get(joystick.guid.to_str().ok()?)
}

pub(super) unsafe extern "C" fn joystick_is_gamepad(jid: c_int) -> c_int {
    on_joystick(jid, sys::FALSE, |s, index| c_int::from(mapping_of(s, index).is_some()))
}

pub(super) unsafe extern "C" fn set_joystick_callback(callback: Option<GLFWjoystickfun>) -> Option<GLFWjoystickfun> {
    live(None, |s| Ok(std::mem::replace(&mut s.joystick_callback, callback)))
}

/// Parse SDL-style mapping lines: `guid,name,bindings...`. Blank lines and
/// `#` comments are skipped.
fn parse_mappings(text: &str) -> Option<Vec<(String, String)>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let mut fields = line.split(',');
            let guid = fields.next().filter(|g| g.len() == 32 && g.chars().all(|c| c.is_ascii_hexdigit()))?;
            let name = fields.next().filter(|n| !n.is_empty())?;
            Some((guid.to_string(), name.to_string()))
        })
        .collect()
}

pub(super) unsafe extern "C" fn update_gamepad_mappings(text: *const c_char) -> c_int {
    // SAFETY: the mapping text is a NUL-terminated string.
    let text = unsafe { read_str(text) };
    live(sys::FALSE, |s| {
        let mappings = parse_mappings(&text).ok_or(INVALID_MAPPING)?;
        for (guid, name) in mappings {
            s.gamepad_mappings.insert(guid, c_string(&name));
        }
        Ok(sys::TRUE)
    })
}

pub(super) unsafe extern "C" fn get_gamepad_name(jid: c_int) -> *const c_char {
    on_joystick(jid, ptr::null(), |s, index| mapping_of(s, index).map_or(ptr::null(), |name| name.as_ptr()))
}

pub(super) unsafe extern "C" fn get_gamepad_state(jid: c_int, state: *mut GLFWgamepadstate) -> c_int {
    let mapped = on_joystick(jid, None, |s, index| {
        mapping_of(s, index)?;
        let joystick = s.joysticks[index].as_ref()?;
        let mut mapped = released_gamepad();
        for (to, from) in mapped.buttons.iter_mut().zip(&joystick.buttons) {
            *to = *from;
        }
        for (to, from) in mapped.axes.iter_mut().zip(&joystick.axes) {
            *to = *from;
        }
        Some(mapped)
    });
    let present = mapped.is_some();
    // SAFETY: out-parameter is null or writable.
    unsafe { put(state, mapped.unwrap_or_else(released_gamepad)) };
    c_int::from(present)
}

const fn released_gamepad() -> GLFWgamepadstate {
    GLFWgamepadstate {
        buttons: [0; 15],
        axes: [0.0; 6],
    }
}

pub(super) unsafe extern "C" fn set_clipboard_string(_window: *mut GLFWwindow, text: *const c_char) {
    // SAFETY: the text is a NUL-terminated string.
    let text = unsafe { read_str(text) };
    live((), |s| {
        s.clipboard = Some(c_string(&text));
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_clipboard_string(_window: *mut GLFWwindow) -> *const c_char {
    live(ptr::null(), |s| Ok(s.clipboard.as_ref().map_or(ptr::null(), |text| text.as_ptr())))
}
