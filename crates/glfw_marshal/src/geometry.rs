//! Query and geometry adapters
//!
//! Native queries write several scalars through out-pointers. Each adapter
//! here runs exactly one native call against zeroed caller-local scratch and
//! folds the outputs into a single named aggregate. The native library zeroes
//! every output when a call fails, so a failed query reads as the all-zero
//! aggregate rather than a partial one.

use std::os::raw::c_int;

use crate::sys;

/// Run one native call with two zeroed out-parameters.
pub(crate) fn out2<T: Default>(call: impl FnOnce(*mut T, *mut T)) -> (T, T) {
    let (mut a, mut b) = (T::default(), T::default());
    call(&mut a as *mut T, &mut b as *mut T);
    (a, b)
}

/// Run one native call with four zeroed out-parameters.
pub(crate) fn out4<T: Default>(call: impl FnOnce(*mut T, *mut T, *mut T, *mut T)) -> (T, T, T, T) {
    let (mut a, mut b, mut c, mut d) = (T::default(), T::default(), T::default(), T::default());
    call(&mut a as *mut T, &mut b as *mut T, &mut c as *mut T, &mut d as *mut T);
    (a, b, c, d)
}

/// Screen-space position in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// Create a position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height, in screen coordinates or pixels depending on the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Size {
    /// Create a size
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Distances from each edge of the content area to the outer window frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrameSize {
    /// Left edge inset.
    pub left: i32,
    /// Top edge inset (usually the title bar).
    pub top: i32,
    /// Right edge inset.
    pub right: i32,
    /// Bottom edge inset.
    pub bottom: i32,
}

/// Monitor work area: the region not covered by task bars and docks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Workarea {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

/// Physical size in millimetres, as reported by the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PhysicalSize {
    /// Width in millimetres.
    pub width_mm: i32,
    /// Height in millimetres.
    pub height_mm: i32,
}

/// Ratio between current DPI and the platform's default DPI.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContentScale {
    /// Horizontal scale.
    pub x: f32,
    /// Vertical scale.
    pub y: f32,
}

/// Cursor position relative to the content area's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPos {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Minimum and maximum content-area size; `None` leaves a bound unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeLimits {
    /// Minimum size.
    pub min: Option<Size>,
    /// Maximum size.
    pub max: Option<Size>,
}

impl SizeLimits {
    pub(crate) fn to_raw(self) -> [c_int; 4] {
        let split = |size: Option<Size>| {
            size.map_or((sys::DONT_CARE, sys::DONT_CARE), |s| (s.width, s.height))
        };
        let (min_w, min_h) = split(self.min);
        let (max_w, max_h) = split(self.max);
        [min_w, min_h, max_w, max_h]
    }
}

/// Native library version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version.
    pub major: i32,
    /// Minor version.
    pub minor: i32,
    /// Revision.
    pub revision: i32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// A monitor video mode. Always a deep copy of the native record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VideoMode {
    /// Width in screen coordinates.
    pub width: i32,
    /// Height in screen coordinates.
    pub height: i32,
    /// Red channel bit depth.
    pub red_bits: i32,
    /// Green channel bit depth.
    pub green_bits: i32,
    /// Blue channel bit depth.
    pub blue_bits: i32,
    /// Refresh rate in Hz.
    pub refresh_rate: i32,
}

impl From<&sys::GLFWvidmode> for VideoMode {
    fn from(mode: &sys::GLFWvidmode) -> Self {
        Self {
            width: mode.width,
            height: mode.height,
            red_bits: mode.redBits,
            green_bits: mode.greenBits,
            blue_bits: mode.blueBits,
            refresh_rate: mode.refreshRate,
        }
    }
}

impl VideoMode {
    /// Size of the mode.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out2_single_call() {
        let mut calls = 0;
        let (x, y) = out2(|x: *mut i32, y: *mut i32| {
            calls += 1;
            unsafe {
                *x = 640;
                *y = 480;
            }
        });
        assert_eq!((x, y), (640, 480));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_untouched_outputs_read_as_zero() {
        let (a, b, c, d) = out4(|_: *mut i32, _, _, _| {});
        assert_eq!(FrameSize { left: a, top: b, right: c, bottom: d }, FrameSize::default());
    }

    #[test]
    fn test_size_limits_use_dont_care() {
        let limits = SizeLimits {
            min: Some(Size::new(200, 100)),
            max: None,
        };
        assert_eq!(limits.to_raw(), [200, 100, sys::DONT_CARE, sys::DONT_CARE]);
    }

    #[test]
    fn test_video_mode_copies_native_record() {
        let native = sys::GLFWvidmode {
            width: 1920,
            height: 1080,
            redBits: 8,
            greenBits: 8,
            blueBits: 8,
            refreshRate: 60,
        };
        let mode = VideoMode::from(&native);
        assert_eq!(mode.size(), Size::new(1920, 1080));
        assert_eq!(mode.refresh_rate, 60);
    }

    #[test]
    fn test_version_display() {
        let version = Version { major: 3, minor: 3, revision: 10 };
        assert_eq!(version.to_string(), "3.3.10");
    }
}
