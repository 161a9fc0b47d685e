//! Monitor queries
//!
//! The monitor list and video mode arrays come back from the native library as
//! borrowed arrays that the next configuration change invalidates, so they are
//! always handed out as owned snapshots. Names stay borrowed and hold the
//! session exclusively while in use.
//!
//! A [`MonitorHandle`] is stale once its disconnection has been processed; see
//! [handle validity](crate::Glfw#handle-validity).

use std::os::raw::{c_int, c_ushort, c_void};

use crate::error::{Error, Result};
use crate::geometry::{out2, out4, ContentScale, PhysicalSize, Position, VideoMode, Workarea};
use crate::handle::MonitorHandle;
use crate::library::Glfw;
use crate::marshal::{borrow, snapshot, BorrowedStr, OwnedSlice, SnapshotAlloc};
use crate::sys;

/// Owned copy of a monitor's gamma ramp.
#[derive(Debug)]
pub struct GammaRamp<A: SnapshotAlloc> {
    /// Red channel response.
    pub red: OwnedSlice<u16, A>,
    /// Green channel response.
    pub green: OwnedSlice<u16, A>,
    /// Blue channel response.
    pub blue: OwnedSlice<u16, A>,
}

impl<A: SnapshotAlloc> GammaRamp<A> {
    /// Entries per channel.
    pub fn len(&self) -> usize {
        self.red.len()
    }

    /// Whether the ramp has no entries.
    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }
}

impl<A: SnapshotAlloc> Glfw<A> {
    /// Snapshot of the currently connected monitors, primary first.
    ///
    /// No monitors is an empty slice, not an error.
    pub fn monitors(&self) -> Result<OwnedSlice<MonitorHandle, A>> {
        let mut count: c_int = 0;
        // SAFETY: main-thread call; the out-pointer refers to a live local.
        let monitors = unsafe { (self.api().get_monitors)(&mut count) };
        // SAFETY: the native array holds `count` non-null handles and is
        // copied before any other native call.
        unsafe {
            snapshot(monitors.cast_const(), count, self.snapshot_alloc(), |&raw| {
                MonitorHandle::from_raw_unchecked(raw)
            })
        }
    }

    /// The primary monitor, `None` when no monitor is connected.
    pub fn primary_monitor(&self) -> Option<MonitorHandle> {
        // SAFETY: main-thread call.
        MonitorHandle::from_raw(unsafe { (self.api().get_primary_monitor)() })
    }

    /// Position of the monitor on the virtual desktop.
    pub fn monitor_pos(&self, monitor: MonitorHandle) -> Position {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (x, y) = out2(|x, y| unsafe { (self.api().get_monitor_pos)(monitor.as_ptr(), x, y) });
        Position { x, y }
    }

    /// Area of the monitor not occupied by task bars or menu bars.
    pub fn monitor_workarea(&self, monitor: MonitorHandle) -> Workarea {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (x, y, width, height) =
            out4(|x, y, w, h| unsafe { (self.api().get_monitor_workarea)(monitor.as_ptr(), x, y, w, h) });
        Workarea { x, y, width, height }
    }

    /// Physical size in millimetres; zero when the platform cannot tell.
    pub fn monitor_physical_size(&self, monitor: MonitorHandle) -> PhysicalSize {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (width_mm, height_mm) =
            out2(|w, h| unsafe { (self.api().get_monitor_physical_size)(monitor.as_ptr(), w, h) });
        PhysicalSize { width_mm, height_mm }
    }

    /// Content scale of the monitor.
    pub fn monitor_content_scale(&self, monitor: MonitorHandle) -> ContentScale {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (x, y) = out2(|x, y| unsafe { (self.api().get_monitor_content_scale)(monitor.as_ptr(), x, y) });
        ContentScale { x, y }
    }

    /// Human-readable name. The native text is freed when the monitor is
    /// disconnected during event processing, so the result holds the session
    /// exclusively:
    ///
    /// ```compile_fail
    /// # use glfw_marshal::Library;
    /// # use glfw_marshal::config::InitConfig;
    /// let mut glfw = Library::glfw().init(&InitConfig::default()).unwrap();
    /// let monitor = glfw.primary_monitor().unwrap();
    /// let name = glfw.monitor_name(monitor);
    /// glfw.poll_events();
    /// assert!(name.is_some_and(|name| !name.is_empty()));
    /// ```
    pub fn monitor_name(&mut self, monitor: MonitorHandle) -> Option<BorrowedStr<'_>> {
        // SAFETY: live handle; `'_` is an exclusive borrow of the session, so
        // no event processing can disconnect the monitor while it is alive.
        unsafe { borrow((self.api().get_monitor_name)(monitor.as_ptr())) }
    }

    /// Every video mode the monitor supports, sorted ascending.
    pub fn video_modes(&self, monitor: MonitorHandle) -> Result<OwnedSlice<VideoMode, A>> {
        let mut count: c_int = 0;
        // SAFETY: live handle; the out-pointer refers to a live local.
        let modes = unsafe { (self.api().get_video_modes)(monitor.as_ptr(), &mut count) };
        // SAFETY: the native array holds `count` modes and is copied at once.
        unsafe { snapshot(modes, count, self.snapshot_alloc(), |mode| VideoMode::from(mode)) }
    }

    /// Current video mode, `None` when the query failed.
    pub fn video_mode(&self, monitor: MonitorHandle) -> Option<VideoMode> {
        // SAFETY: live handle; the returned record is copied at once.
        unsafe { (self.api().get_video_mode)(monitor.as_ptr()).as_ref() }.map(VideoMode::from)
    }

    /// Generate and apply a gamma ramp for the given exponent.
    pub fn set_gamma(&self, monitor: MonitorHandle, gamma: f32) {
        // SAFETY: live handle; the value is validated natively.
        unsafe { (self.api().set_gamma)(monitor.as_ptr(), gamma) };
    }

    /// Snapshot of the current gamma ramp.
    pub fn gamma_ramp(&self, monitor: MonitorHandle) -> Result<GammaRamp<A>> {
        // SAFETY: live handle.
        let ramp = unsafe { (self.api().get_gamma_ramp)(monitor.as_ptr()) };
        // SAFETY: a non-null ramp points to three channels of `size` entries,
        // valid until the next gamma call.
        let Some(ramp) = (unsafe { ramp.as_ref() }) else {
            return Err(self.call_failed("glfwGetGammaRamp"));
        };
        let size = i64::from(ramp.size);
        let channel = |data: *mut c_ushort| {
            // SAFETY: as above.
            unsafe { snapshot(data.cast_const(), size, self.snapshot_alloc(), |&v| v) }
        };
        Ok(GammaRamp {
            red: channel(ramp.red)?,
            green: channel(ramp.green)?,
            blue: channel(ramp.blue)?,
        })
    }

    /// Apply a gamma ramp. The channels must be non-empty and equal in length.
    pub fn set_gamma_ramp(&self, monitor: MonitorHandle, red: &[u16], green: &[u16], blue: &[u16]) -> Result<()> {
        let mismatch = || Error::RampSize {
            red: red.len(),
            green: green.len(),
            blue: blue.len(),
        };
        if red.is_empty() || red.len() != green.len() || red.len() != blue.len() {
            return Err(mismatch());
        }
        let size = u32::try_from(red.len()).map_err(|_| mismatch())?;
        let ramp = sys::GLFWgammaramp {
            red: red.as_ptr().cast_mut(),
            green: green.as_ptr().cast_mut(),
            blue: blue.as_ptr().cast_mut(),
            size: size as _,
        };
        // SAFETY: live handle; the channels outlive the call and are only read.
        unsafe { (self.api().set_gamma_ramp)(monitor.as_ptr(), &ramp) };
        Ok(())
    }

    /// Attach an opaque pointer to the monitor.
    pub fn set_monitor_user_pointer(&self, monitor: MonitorHandle, pointer: *mut c_void) {
        // SAFETY: live handle; the pointer is stored, not read.
        unsafe { (self.api().set_monitor_user_pointer)(monitor.as_ptr(), pointer) };
    }

    /// The monitor's user pointer; null when unset.
    pub fn monitor_user_pointer(&self, monitor: MonitorHandle) -> *mut c_void {
        // SAFETY: live handle.
        unsafe { (self.api().get_monitor_user_pointer)(monitor.as_ptr()) }
    }
}
