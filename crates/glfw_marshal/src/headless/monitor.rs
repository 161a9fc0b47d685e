use std::ffi::CString;
use std::os::raw::{c_char, c_float, c_int, c_ushort, c_void};
use std::ptr;

use crate::geometry::VideoMode;
use crate::sys::{self, GLFWgammaramp, GLFWmonitor, GLFWmonitorfun, GLFWvidmode};

use super::{c_string, live, put, Fault, SimulatedMonitor};

const INVALID_GAMMA: Fault = (sys::INVALID_VALUE, c"Invalid gamma value");
const INVALID_RAMP: Fault = (sys::INVALID_VALUE, c"Invalid gamma ramp size");

/// Entries in a generated gamma ramp.
const RAMP_SIZE: usize = 256;

pub(super) struct Monitor {
    pub(super) name: CString,
    pub(super) pos: (c_int, c_int),
    pub(super) physical_mm: (c_int, c_int),
    pub(super) scale: (c_float, c_float),
    pub(super) modes: Vec<GLFWvidmode>,
    pub(super) current: GLFWvidmode,
    pub(super) user: *mut c_void,
    red: Vec<c_ushort>,
    green: Vec<c_ushort>,
    blue: Vec<c_ushort>,
    ramp: GLFWgammaramp,
}

impl Monitor {
    pub(super) fn new(description: &SimulatedMonitor) -> Self {
        let mut described = description.modes.clone();
        let current = native_mode(&described.last().copied().unwrap_or_default());
        described.sort_by_key(|m| (m.width * m.height, m.width, m.refresh_rate));
        described.dedup();
        let modes = described.iter().map(native_mode).collect();

        let mut monitor = Self {
            name: c_string(&description.name),
            pos: description.position,
            physical_mm: description.physical_size_mm,
            scale: description.content_scale,
            modes,
            current,
            user: ptr::null_mut(),
            red: Vec::new(),
            green: Vec::new(),
            blue: Vec::new(),
            ramp: GLFWgammaramp {
                red: ptr::null_mut(),
                green: ptr::null_mut(),
                blue: ptr::null_mut(),
                size: 0,
            },
        };
        monitor.load_ramp(&gamma_ramp(1.0), &gamma_ramp(1.0), &gamma_ramp(1.0));
        monitor
    }

    pub(super) fn ptr(&self) -> *mut GLFWmonitor {
        ptr::from_ref(self).cast_mut().cast()
    }

    fn load_ramp(&mut self, red: &[c_ushort], green: &[c_ushort], blue: &[c_ushort]) {
        self.red = red.to_vec();
        self.green = green.to_vec();
        self.blue = blue.to_vec();
        self.ramp = GLFWgammaramp {
            red: self.red.as_mut_ptr(),
            green: self.green.as_mut_ptr(),
            blue: self.blue.as_mut_ptr(),
            size: red.len() as _,
        };
    }
}

const fn native_mode(mode: &VideoMode) -> GLFWvidmode {
    GLFWvidmode {
        width: mode.width,
        height: mode.height,
        redBits: mode.red_bits,
        greenBits: mode.green_bits,
        blueBits: mode.blue_bits,
        refreshRate: mode.refresh_rate,
    }
}

/// Field-wise copy; the native record is not `Copy`.
pub(super) const fn copy_mode(mode: &GLFWvidmode) -> GLFWvidmode {
    GLFWvidmode {
        width: mode.width,
        height: mode.height,
        redBits: mode.redBits,
        greenBits: mode.greenBits,
        blueBits: mode.blueBits,
        refreshRate: mode.refreshRate,
    }
}

/// Ramp for an exponent, computed the way the native library does.
fn gamma_ramp(gamma: f32) -> Vec<c_ushort> {
    (0..RAMP_SIZE)
        .map(|i| {
            let value = (i as f64 / (RAMP_SIZE - 1) as f64).powf(1.0 / f64::from(gamma)) * 65535.0 + 0.5;
            value.min(65535.0) as c_ushort
        })
        .collect()
}

pub(super) unsafe extern "C" fn get_monitors(count: *mut c_int) -> *mut *mut GLFWmonitor {
    let (len, array) = live((0, ptr::null_mut()), |s| {
        let len = s.monitor_array.len() as c_int;
        let array = if len == 0 { ptr::null_mut() } else { s.monitor_array.as_mut_ptr() };
        Ok((len, array))
    });
    // SAFETY: out-parameter is null or writable.
    unsafe { put(count, len) };
    array
}

pub(super) unsafe extern "C" fn get_primary_monitor() -> *mut GLFWmonitor {
    live(ptr::null_mut(), |s| Ok(s.monitor_array.first().copied().unwrap_or(ptr::null_mut())))
}

pub(super) unsafe extern "C" fn get_monitor_pos(monitor: *mut GLFWmonitor, x: *mut c_int, y: *mut c_int) {
    let (px, py) = live((0, 0), |s| Ok(s.monitor_mut(monitor)?.pos));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(x, px);
        put(y, py);
    }
}

pub(super) unsafe extern "C" fn get_monitor_workarea(
    monitor: *mut GLFWmonitor,
    x: *mut c_int,
    y: *mut c_int,
    width: *mut c_int,
    height: *mut c_int,
) {
    // The bottom 40 rows are taken by a simulated task bar.
    let area = live([0; 4], |s| {
        let m = s.monitor_mut(monitor)?;
        Ok([m.pos.0, m.pos.1, m.current.width, (m.current.height - 40).max(0)])
    });
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(x, area[0]);
        put(y, area[1]);
        put(width, area[2]);
        put(height, area[3]);
    }
}

pub(super) unsafe extern "C" fn get_monitor_physical_size(monitor: *mut GLFWmonitor, width: *mut c_int, height: *mut c_int) {
    let (w, h) = live((0, 0), |s| Ok(s.monitor_mut(monitor)?.physical_mm));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(width, w);
        put(height, h);
    }
}

pub(super) unsafe extern "C" fn get_monitor_content_scale(monitor: *mut GLFWmonitor, x: *mut c_float, y: *mut c_float) {
    let (sx, sy) = live((0.0, 0.0), |s| Ok(s.monitor_mut(monitor)?.scale));
    // SAFETY: out-parameters are null or writable.
    unsafe {
        put(x, sx);
        put(y, sy);
    }
}

pub(super) unsafe extern "C" fn get_monitor_name(monitor: *mut GLFWmonitor) -> *const c_char {
    live(ptr::null(), |s| Ok(s.monitor_mut(monitor)?.name.as_ptr()))
}

pub(super) unsafe extern "C" fn set_monitor_user_pointer(monitor: *mut GLFWmonitor, pointer: *mut c_void) {
    live((), |s| {
        s.monitor_mut(monitor)?.user = pointer;
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_monitor_user_pointer(monitor: *mut GLFWmonitor) -> *mut c_void {
    live(ptr::null_mut(), |s| Ok(s.monitor_mut(monitor)?.user))
}

pub(super) unsafe extern "C" fn set_monitor_callback(callback: Option<GLFWmonitorfun>) -> Option<GLFWmonitorfun> {
    live(None, |s| Ok(std::mem::replace(&mut s.monitor_callback, callback)))
}

pub(super) unsafe extern "C" fn get_video_modes(monitor: *mut GLFWmonitor, count: *mut c_int) -> *const GLFWvidmode {
    let (len, modes) = live((0, ptr::null()), |s| {
        let m = s.monitor_mut(monitor)?;
        Ok((m.modes.len() as c_int, m.modes.as_ptr()))
    });
    // SAFETY: out-parameter is null or writable.
    unsafe { put(count, len) };
    if len == 0 {
        ptr::null()
    } else {
        modes
    }
}

pub(super) unsafe extern "C" fn get_video_mode(monitor: *mut GLFWmonitor) -> *const GLFWvidmode {
    live(ptr::null(), |s| Ok(ptr::from_ref(&s.monitor_mut(monitor)?.current)))
}

pub(super) unsafe extern "C" fn set_gamma(monitor: *mut GLFWmonitor, gamma: c_float) {
    live((), |s| {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(INVALID_GAMMA);
        }
        let ramp = gamma_ramp(gamma);
        s.monitor_mut(monitor)?.load_ramp(&ramp, &ramp, &ramp);
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_gamma_ramp(monitor: *mut GLFWmonitor) -> *const GLFWgammaramp {
    live(ptr::null(), |s| Ok(ptr::from_ref(&s.monitor_mut(monitor)?.ramp)))
}

pub(super) unsafe extern "C" fn set_gamma_ramp(monitor: *mut GLFWmonitor, ramp: *const GLFWgammaramp) {
    // SAFETY: `ramp` is null or points to a ramp whose channels hold `size`
    // entries each.
    let channels = unsafe { ramp.as_ref() }.filter(|r| r.size > 0 && !r.red.is_null() && !r.green.is_null() && !r.blue.is_null()).map(|r| unsafe {
        let size = r.size as usize;
        (
            std::slice::from_raw_parts(r.red, size).to_vec(),
            std::slice::from_raw_parts(r.green, size).to_vec(),
            std::slice::from_raw_parts(r.blue, size).to_vec(),
        )
    });
    live((), |s| {
        let (red, green, blue) = channels.ok_or(INVALID_RAMP)?;
        s.monitor_mut(monitor)?.load_ramp(&red, &green, &blue);
        Ok(())
    });
}

