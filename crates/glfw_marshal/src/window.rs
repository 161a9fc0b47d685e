//! Window operations
//!
//! Thin adapters over the native window calls. Creation goes through
//! [`WindowConfig`] so hints never leak between windows; every query folds its
//! out-parameters into one geometry aggregate. Mutations report failures
//! through the error slot, as the native library does, except where marshaling
//! an argument can itself fail.
//!
//! Every method here expects a live [`WindowHandle`]; see
//! [handle validity](crate::Glfw#handle-validity).

use std::os::raw::{c_int, c_void};

use crate::config::{native_bool, WindowConfig};
use crate::error::{Error, Result};
use crate::geometry::{out2, out4, ContentScale, FrameSize, Position, Size, SizeLimits};
use crate::handle::{monitor_ptr, window_ptr, MonitorHandle, WindowHandle};
use crate::library::Glfw;
use crate::marshal::{to_c_string, SnapshotAlloc};
use crate::sys;

/// One RGBA pixel, 8 bits per channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

// SAFETY: four `u8` fields, no padding, every bit pattern valid.
unsafe impl bytemuck::Pod for Rgba {}
// SAFETY: all-zero is a valid pixel.
unsafe impl bytemuck::Zeroable for Rgba {}

/// Borrowed image data for icons and cursors, rows top to bottom.
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height` pixels.
    pub pixels: &'a [Rgba],
}

impl<'a> Image<'a> {
    /// Wrap pixel data, checking it matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: &'a [Rgba]) -> Result<Self> {
        let image = Self { width, height, pixels };
        image.validate()?;
        Ok(image)
    }

    /// Wrap tightly packed RGBA bytes.
    pub fn from_bytes(width: u32, height: u32, bytes: &'a [u8]) -> Result<Self> {
        let expected = width as usize * height as usize;
        let pixels: &[Rgba] = bytemuck::try_cast_slice(bytes).map_err(|_| Error::ImageSize {
            width,
            height,
            expected,
            actual: bytes.len() / 4,
        })?;
        Self::new(width, height, pixels)
    }

    fn validate(&self) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() == expected && i32::try_from(self.width).is_ok() && i32::try_from(self.height).is_ok() {
            Ok(())
        } else {
            Err(Error::ImageSize {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            })
        }
    }

    /// Native view of the image. The pointer borrows `self.pixels`; the
    /// native side only reads through it.
    pub(crate) fn to_native(self) -> Result<sys::GLFWimage> {
        self.validate()?;
        let bytes: &[u8] = bytemuck::cast_slice(self.pixels);
        Ok(sys::GLFWimage {
            width: self.width as c_int,
            height: self.height as c_int,
            pixels: bytes.as_ptr(),
        })
    }
}

/// Window attributes that can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowAttribute {
    /// Has input focus.
    Focused,
    /// Iconified.
    Iconified,
    /// User-resizable. Settable.
    Resizable,
    /// Visible.
    Visible,
    /// Has decorations. Settable.
    Decorated,
    /// Iconifies on focus loss in fullscreen. Settable.
    AutoIconify,
    /// Always on top. Settable.
    Floating,
    /// Maximized.
    Maximized,
    /// Framebuffer is transparent.
    TransparentFramebuffer,
    /// Cursor is over the content area.
    Hovered,
    /// Takes focus when shown. Settable.
    FocusOnShow,
    /// Context client API, raw value.
    ClientApi,
    /// Context major version.
    ContextVersionMajor,
    /// Context minor version.
    ContextVersionMinor,
    /// OpenGL profile, raw value.
    OpenGlProfile,
    /// Forward-compatible OpenGL context.
    OpenGlForwardCompat,
}

impl WindowAttribute {
    /// The native attribute token.
    pub const fn raw(self) -> c_int {
        match self {
            Self::Focused => sys::FOCUSED,
            Self::Iconified => sys::ICONIFIED,
            Self::Resizable => sys::RESIZABLE,
            Self::Visible => sys::VISIBLE,
            Self::Decorated => sys::DECORATED,
            Self::AutoIconify => sys::AUTO_ICONIFY,
            Self::Floating => sys::FLOATING,
            Self::Maximized => sys::MAXIMIZED,
            Self::TransparentFramebuffer => sys::TRANSPARENT_FRAMEBUFFER,
            Self::Hovered => sys::HOVERED,
            Self::FocusOnShow => sys::FOCUS_ON_SHOW,
            Self::ClientApi => sys::CLIENT_API,
            Self::ContextVersionMajor => sys::CONTEXT_VERSION_MAJOR,
            Self::ContextVersionMinor => sys::CONTEXT_VERSION_MINOR,
            Self::OpenGlProfile => sys::OPENGL_PROFILE,
            Self::OpenGlForwardCompat => sys::OPENGL_FORWARD_COMPAT,
        }
    }
}

/// Where a window lives: on the desktop, or fullscreen on a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Windowed at the given content-area position.
    Windowed(Position),
    /// Fullscreen on a monitor, with an optional refresh rate.
    Fullscreen {
        /// Target monitor.
        monitor: MonitorHandle,
        /// Refresh rate in Hz; `None` picks the highest available.
        refresh_rate: Option<i32>,
    },
}

impl<A: SnapshotAlloc> Glfw<A> {
    /// Create a window. Hints are reset to their defaults before the config's
    /// own hints are applied.
    ///
    /// Passing a monitor creates a fullscreen window; `share` names a window
    /// whose context objects the new context shares.
    pub fn create_window(
        &self,
        config: &WindowConfig,
        monitor: Option<MonitorHandle>,
        share: Option<WindowHandle>,
    ) -> Result<WindowHandle> {
        let title = to_c_string(&config.title)?;
        let api = self.api();
        // SAFETY: main-thread calls on an initialized library; the title
        // outlives the create call.
        let raw = unsafe {
            (api.default_window_hints)();
            for (hint, value) in config.hints() {
                (api.window_hint)(hint, value);
            }
            (api.create_window)(config.width, config.height, title.as_ptr(), monitor_ptr(monitor), window_ptr(share))
        };
        let window = WindowHandle::created(raw, || self.take_last_error())?;
        log::debug!("Created window {window:?} \"{}\" {}x{}", config.title, config.width, config.height);
        Ok(window)
    }

    /// Destroy a window and its context.
    ///
    /// Every copy of `window` is stale afterwards; passing one to any method,
    /// including this one, is undefined behaviour in the native library. See
    /// [handle validity](Glfw#handle-validity).
    pub fn destroy_window(&self, window: WindowHandle) {
        // SAFETY: main-thread call with a live handle.
        unsafe { (self.api().destroy_window)(window.as_ptr()) };
        log::debug!("Destroyed window {window:?}");
    }

    /// Whether the close flag is set.
    pub fn window_should_close(&self, window: WindowHandle) -> bool {
        // SAFETY: live handle.
        unsafe { (self.api().window_should_close)(window.as_ptr()) != sys::FALSE }
    }

    /// Set or clear the close flag.
    pub fn set_window_should_close(&self, window: WindowHandle, value: bool) {
        // SAFETY: live handle.
        unsafe { (self.api().set_window_should_close)(window.as_ptr(), native_bool(value)) };
    }

    /// Set the window title.
    pub fn set_window_title(&self, window: WindowHandle, title: &str) -> Result<()> {
        let title = to_c_string(title)?;
        // SAFETY: live handle; the native side copies the string.
        unsafe { (self.api().set_window_title)(window.as_ptr(), title.as_ptr()) };
        Ok(())
    }

    /// Set the icon candidates; an empty slice restores the default icon.
    pub fn set_window_icon(&self, window: WindowHandle, images: &[Image<'_>]) -> Result<()> {
        let native = images.iter().map(|image| image.to_native()).collect::<Result<Vec<_>>>()?;
        let images_ptr = if native.is_empty() { std::ptr::null() } else { native.as_ptr() };
        // SAFETY: `native` and the pixel data it points to outlive the call;
        // the native side copies them.
        unsafe { (self.api().set_window_icon)(window.as_ptr(), native.len() as c_int, images_ptr) };
        Ok(())
    }

    /// Content-area position in screen coordinates.
    pub fn window_pos(&self, window: WindowHandle) -> Position {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (x, y) = out2(|x, y| unsafe { (self.api().get_window_pos)(window.as_ptr(), x, y) });
        Position { x, y }
    }

    /// Move the content area.
    pub fn set_window_pos(&self, window: WindowHandle, pos: Position) {
        // SAFETY: live handle.
        unsafe { (self.api().set_window_pos)(window.as_ptr(), pos.x, pos.y) };
    }

    /// Content-area size in screen coordinates.
    pub fn window_size(&self, window: WindowHandle) -> Size {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (width, height) = out2(|w, h| unsafe { (self.api().get_window_size)(window.as_ptr(), w, h) });
        Size { width, height }
    }

    /// Resize the content area.
    pub fn set_window_size(&self, window: WindowHandle, size: Size) {
        // SAFETY: live handle.
        unsafe { (self.api().set_window_size)(window.as_ptr(), size.width, size.height) };
    }

    /// Constrain the content-area size.
    pub fn set_window_size_limits(&self, window: WindowHandle, limits: SizeLimits) {
        let [min_w, min_h, max_w, max_h] = limits.to_raw();
        // SAFETY: live handle.
        unsafe { (self.api().set_window_size_limits)(window.as_ptr(), min_w, min_h, max_w, max_h) };
    }

    /// Lock the content-area aspect ratio, or unlock it with `None`.
    pub fn set_window_aspect_ratio(&self, window: WindowHandle, ratio: Option<(i32, i32)>) {
        let (numer, denom) = ratio.unwrap_or((sys::DONT_CARE, sys::DONT_CARE));
        // SAFETY: live handle.
        unsafe { (self.api().set_window_aspect_ratio)(window.as_ptr(), numer, denom) };
    }

    /// Framebuffer size in pixels.
    pub fn framebuffer_size(&self, window: WindowHandle) -> Size {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (width, height) = out2(|w, h| unsafe { (self.api().get_framebuffer_size)(window.as_ptr(), w, h) });
        Size { width, height }
    }

    /// Insets from the content area to the outer frame.
    pub fn window_frame_size(&self, window: WindowHandle) -> FrameSize {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (left, top, right, bottom) =
            out4(|l, t, r, b| unsafe { (self.api().get_window_frame_size)(window.as_ptr(), l, t, r, b) });
        FrameSize { left, top, right, bottom }
    }

    /// Content scale of the window.
    pub fn window_content_scale(&self, window: WindowHandle) -> ContentScale {
        // SAFETY: live handle; out-parameters are scratch locals.
        let (x, y) = out2(|x, y| unsafe { (self.api().get_window_content_scale)(window.as_ptr(), x, y) });
        ContentScale { x, y }
    }

    /// Whole-window opacity in `0.0..=1.0`.
    pub fn window_opacity(&self, window: WindowHandle) -> f32 {
        // SAFETY: live handle.
        unsafe { (self.api().get_window_opacity)(window.as_ptr()) }
    }

    /// Set whole-window opacity.
    pub fn set_window_opacity(&self, window: WindowHandle, opacity: f32) {
        // SAFETY: live handle; range is checked natively.
        unsafe { (self.api().set_window_opacity)(window.as_ptr(), opacity) };
    }

    /// Minimize the window.
    pub fn iconify_window(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().iconify_window)(window.as_ptr()) };
    }

    /// Undo iconification or maximization.
    pub fn restore_window(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().restore_window)(window.as_ptr()) };
    }

    /// Maximize the window.
    pub fn maximize_window(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().maximize_window)(window.as_ptr()) };
    }

    /// Make the window visible.
    pub fn show_window(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().show_window)(window.as_ptr()) };
    }

    /// Hide the window.
    pub fn hide_window(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().hide_window)(window.as_ptr()) };
    }

    /// Bring the window to front and give it input focus.
    pub fn focus_window(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().focus_window)(window.as_ptr()) };
    }

    /// Ask for the user's attention.
    pub fn request_window_attention(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().request_window_attention)(window.as_ptr()) };
    }

    /// Raw value of a window attribute.
    pub fn window_attrib(&self, window: WindowHandle, attribute: WindowAttribute) -> i32 {
        // SAFETY: live handle.
        unsafe { (self.api().get_window_attrib)(window.as_ptr(), attribute.raw()) }
    }

    /// Whether a boolean window attribute is set.
    pub fn window_flag(&self, window: WindowHandle, attribute: WindowAttribute) -> bool {
        self.window_attrib(window, attribute) != sys::FALSE
    }

    /// Change a settable boolean attribute.
    pub fn set_window_attrib(&self, window: WindowHandle, attribute: WindowAttribute, value: bool) {
        // SAFETY: live handle; unsettable attributes are rejected natively.
        unsafe { (self.api().set_window_attrib)(window.as_ptr(), attribute.raw(), native_bool(value)) };
    }

    /// Monitor of a fullscreen window, `None` when windowed.
    pub fn window_monitor(&self, window: WindowHandle) -> Option<MonitorHandle> {
        // SAFETY: live handle.
        MonitorHandle::from_raw(unsafe { (self.api().get_window_monitor)(window.as_ptr()) })
    }

    /// Switch between windowed and fullscreen mode.
    pub fn set_window_mode(&self, window: WindowHandle, mode: WindowMode, size: Size) {
        let (monitor, pos, refresh_rate) = match mode {
            WindowMode::Windowed(pos) => (None, pos, sys::DONT_CARE),
            WindowMode::Fullscreen { monitor, refresh_rate } => {
                (Some(monitor), Position::default(), refresh_rate.unwrap_or(sys::DONT_CARE))
            }
        };
        // SAFETY: live handles.
        unsafe {
            (self.api().set_window_monitor)(
                window.as_ptr(),
                monitor_ptr(monitor),
                pos.x,
                pos.y,
                size.width,
                size.height,
                refresh_rate,
            );
        }
    }

    /// Attach an opaque pointer to the window. Never dereferenced here.
    pub fn set_window_user_pointer(&self, window: WindowHandle, pointer: *mut c_void) {
        // SAFETY: live handle; the pointer is stored, not read.
        unsafe { (self.api().set_window_user_pointer)(window.as_ptr(), pointer) };
    }

    /// The window's user pointer; null when unset.
    pub fn window_user_pointer(&self, window: WindowHandle) -> *mut c_void {
        // SAFETY: live handle.
        unsafe { (self.api().get_window_user_pointer)(window.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitConfig;
    use crate::error::{ErrorCode, ObjectKind};
    use crate::headless;
    use crate::library::Library;

    fn session() -> Glfw {
        headless::reset();
        let config = InitConfig {
            log_native_errors: false,
            ..InitConfig::default()
        };
        Library::new(headless::api()).init(&config).unwrap()
    }

    #[test]
    fn test_size_round_trip() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(640, 480, "size"), None, None).unwrap();
        assert_eq!(glfw.window_size(window), Size::new(640, 480));

        glfw.set_window_size(window, Size::new(320, 200));
        assert_eq!(glfw.window_size(window), Size::new(320, 200));
        assert_eq!(glfw.framebuffer_size(window), Size::new(320, 200));
    }

    #[test]
    fn test_destroyed_window_handle_is_stale() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "gone"), None, None).unwrap();
        let copy = window;
        glfw.destroy_window(window);
        assert!(glfw.take_last_error().is_none());

        assert_eq!(glfw.window_size(copy), Size::new(0, 0));
        assert_eq!(
            glfw.take_last_error().and_then(|e| e.classification),
            Some(ErrorCode::InvalidValue)
        );
    }

    #[test]
    fn test_invalid_size_reports_creation_failure() {
        let glfw = session();
        let err = glfw.create_window(&WindowConfig::new(0, 480, "bad"), None, None).unwrap_err();
        match err {
            Error::CreationFailed { object, cause } => {
                assert_eq!(object, ObjectKind::Window);
                assert_eq!(cause.unwrap().classification, Some(ErrorCode::InvalidValue));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unavailable_context_version() {
        let glfw = session();
        let config = WindowConfig {
            context_version: Some((9, 0)),
            ..WindowConfig::default()
        };
        let err = glfw.create_window(&config, None, None).unwrap_err();
        assert!(matches!(
            err,
            Error::CreationFailed { cause: Some(ref c), .. } if c.classification == Some(ErrorCode::VersionUnavailable)
        ));
    }

    #[test]
    fn test_hints_do_not_leak_between_windows() {
        let glfw = session();
        let fixed = WindowConfig {
            resizable: Some(false),
            ..WindowConfig::new(100, 100, "fixed")
        };
        let a = glfw.create_window(&fixed, None, None).unwrap();
        let b = glfw
            .create_window(&WindowConfig { resizable: None, ..WindowConfig::new(100, 100, "default") }, None, None)
            .unwrap();
        assert!(!glfw.window_flag(a, WindowAttribute::Resizable));
        assert!(glfw.window_flag(b, WindowAttribute::Resizable));
    }

    #[test]
    fn test_frame_size_is_single_aggregate() {
        let glfw = session();
        let decorated = glfw.create_window(&WindowConfig::new(100, 100, "framed"), None, None).unwrap();
        let frame = glfw.window_frame_size(decorated);
        assert!(frame.top > 0 && frame.left >= 0);

        glfw.set_window_attrib(decorated, WindowAttribute::Decorated, false);
        assert_eq!(glfw.window_frame_size(decorated), FrameSize::default());
    }

    #[test]
    fn test_user_pointer_survives_unrelated_queries() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(100, 100, "ptr"), None, None).unwrap();
        let mut token = 42u64;
        let address: *mut c_void = std::ptr::from_mut(&mut token).cast();

        assert!(glfw.window_user_pointer(window).is_null());
        glfw.set_window_user_pointer(window, address);
        assert_eq!(glfw.window_user_pointer(window), address);
        let _ = glfw.window_pos(window);
        let _ = glfw.window_content_scale(window);
        assert_eq!(glfw.window_user_pointer(window), address);
    }

    #[test]
    fn test_title_and_icon() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(100, 100, "before"), None, None).unwrap();
        glfw.set_window_title(window, "after").unwrap();
        assert_eq!(headless::window_title(window).as_deref(), Some("after"));
        assert!(matches!(glfw.set_window_title(window, "nul\0byte"), Err(Error::InteriorNul(_))));

        let pixels = [Rgba { r: 255, g: 0, b: 0, a: 255 }; 4];
        let icon = Image::new(2, 2, &pixels).unwrap();
        glfw.set_window_icon(window, &[icon]).unwrap();
        assert_eq!(headless::window_icon_count(window), 1);
        glfw.set_window_icon(window, &[]).unwrap();
        assert_eq!(headless::window_icon_count(window), 0);
    }

    #[test]
    fn test_image_dimensions_are_checked() {
        let pixels = [Rgba::default(); 3];
        assert!(matches!(
            Image::new(2, 2, &pixels),
            Err(Error::ImageSize { expected: 4, actual: 3, .. })
        ));
        let bytes = [0u8; 16];
        assert_eq!(Image::from_bytes(2, 2, &bytes).unwrap().pixels.len(), 4);
    }

    #[test]
    fn test_size_limits_clamp() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(800, 600, "limits"), None, None).unwrap();
        glfw.set_window_size_limits(
            window,
            SizeLimits {
                min: None,
                max: Some(Size::new(400, 300)),
            },
        );
        assert_eq!(glfw.window_size(window), Size::new(400, 300));
    }

    #[test]
    fn test_iconify_and_restore() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(100, 100, "state"), None, None).unwrap();
        glfw.iconify_window(window);
        assert!(glfw.window_flag(window, WindowAttribute::Iconified));
        glfw.maximize_window(window);
        assert!(!glfw.window_flag(window, WindowAttribute::Iconified));
        assert!(glfw.window_flag(window, WindowAttribute::Maximized));
        glfw.restore_window(window);
        assert!(!glfw.window_flag(window, WindowAttribute::Maximized));
    }

    #[test]
    fn test_fullscreen_switch() {
        let glfw = session();
        let monitor = headless::connect_monitor(headless::SimulatedMonitor::default());
        let window = glfw.create_window(&WindowConfig::new(640, 480, "fs"), None, None).unwrap();
        assert_eq!(glfw.window_monitor(window), None);

        glfw.set_window_mode(
            window,
            WindowMode::Fullscreen {
                monitor,
                refresh_rate: Some(60),
            },
            Size::new(1280, 720),
        );
        assert_eq!(glfw.window_monitor(window), Some(monitor));
        assert_eq!(glfw.window_size(window), Size::new(1280, 720));

        glfw.set_window_mode(window, WindowMode::Windowed(Position::new(10, 20)), Size::new(640, 480));
        assert_eq!(glfw.window_monitor(window), None);
        assert_eq!(glfw.window_pos(window), Position::new(10, 20));
    }

    #[test]
    fn test_close_flag() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(100, 100, "close"), None, None).unwrap();
        assert!(!glfw.window_should_close(window));
        glfw.set_window_should_close(window, true);
        assert!(glfw.window_should_close(window));
        glfw.destroy_window(window);
    }

    #[test]
    fn test_opacity() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(100, 100, "opacity"), None, None).unwrap();
        glfw.set_window_opacity(window, 0.5);
        approx::assert_relative_eq!(glfw.window_opacity(window), 0.5);
        glfw.set_window_opacity(window, 2.0);
        approx::assert_relative_eq!(glfw.window_opacity(window), 0.5);
        assert_eq!(glfw.take_last_error().and_then(|e| e.classification), Some(ErrorCode::InvalidValue));
    }
}
