//! OpenGL and OpenGL ES context operations

use std::os::raw::c_void;

use crate::error::Result;
use crate::handle::{window_ptr, WindowHandle};
use crate::library::Glfw;
use crate::marshal::{to_c_string, SnapshotAlloc};
use crate::sys;

impl<A: SnapshotAlloc> Glfw<A> {
    /// Make a window's context current on this thread, or detach with `None`.
    pub fn make_context_current(&self, window: Option<WindowHandle>) {
        // SAFETY: main-thread call with a live or null handle.
        unsafe { (self.api().make_context_current)(window_ptr(window)) };
    }

    /// Window whose context is current on this thread.
    pub fn current_context(&self) -> Option<WindowHandle> {
        // SAFETY: main-thread call.
        WindowHandle::from_raw(unsafe { (self.api().get_current_context)() })
    }

    /// Swap front and back buffers.
    pub fn swap_buffers(&self, window: WindowHandle) {
        // SAFETY: live handle.
        unsafe { (self.api().swap_buffers)(window.as_ptr()) };
    }

    /// Screen updates to wait for before swapping, for the current context.
    pub fn swap_interval(&self, interval: i32) {
        // SAFETY: main-thread call.
        unsafe { (self.api().swap_interval)(interval) };
    }

    /// Whether the current context supports an API extension.
    pub fn extension_supported(&self, name: &str) -> Result<bool> {
        let name = to_c_string(name)?;
        // SAFETY: main-thread call; the name outlives the call.
        Ok(unsafe { (self.api().extension_supported)(name.as_ptr()) } != sys::FALSE)
    }

    /// Address of a client API function for the current context, `None` for an
    /// unknown symbol.
    pub fn proc_address(&self, name: &str) -> Result<Option<*const c_void>> {
        let name = to_c_string(name)?;
        // SAFETY: main-thread call; the name outlives the call.
        let proc = unsafe { (self.api().get_proc_address)(name.as_ptr()) };
        Ok((!proc.is_null()).then_some(proc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitConfig, WindowConfig};
    use crate::error::ErrorCode;
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
    fn test_make_current_and_detach() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "gl"), None, None).unwrap();
        assert_eq!(glfw.current_context(), None);
        glfw.make_context_current(Some(window));
        assert_eq!(glfw.current_context(), Some(window));
        glfw.swap_interval(1);
        glfw.swap_buffers(window);
        assert!(glfw.take_last_error().is_none());

        glfw.make_context_current(None);
        assert_eq!(glfw.current_context(), None);
    }

    #[test]
    fn test_window_without_context() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "vk").for_vulkan(), None, None).unwrap();
        glfw.make_context_current(Some(window));
        assert_eq!(glfw.current_context(), None);
        assert_eq!(
            glfw.take_last_error().and_then(|e| e.classification),
            Some(ErrorCode::NoWindowContext)
        );
    }

    #[test]
    fn test_extensions_need_current_context() {
        let glfw = session();
        assert!(!glfw.extension_supported("GL_KHR_debug").unwrap());
        assert_eq!(
            glfw.take_last_error().and_then(|e| e.classification),
            Some(ErrorCode::NoCurrentContext)
        );

        let window = glfw.create_window(&WindowConfig::new(64, 64, "gl"), None, None).unwrap();
        glfw.make_context_current(Some(window));
        assert!(glfw.extension_supported("GL_KHR_debug").unwrap());
        assert!(!glfw.extension_supported("GL_NV_imaginary").unwrap());
    }

    #[test]
    fn test_unknown_symbol_is_absent() {
        let glfw = session();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "gl"), None, None).unwrap();
        glfw.make_context_current(Some(window));
        assert!(glfw.proc_address("glClear").unwrap().is_some());
        assert!(glfw.proc_address("glNotARealCall").unwrap().is_none());
        assert!(glfw.take_last_error().is_none());
    }
}
