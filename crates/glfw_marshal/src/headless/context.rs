use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

use ash::vk::{self, Handle};

use crate::sys::{self, GLFWglproc, GLFWvkproc, GLFWwindow};

use super::{live, put, read_str, Fault};

const NO_CURRENT_CONTEXT: Fault = (sys::NO_CURRENT_CONTEXT, c"Cannot query entry point without a current OpenGL or OpenGL ES context");
const NO_WINDOW_CONTEXT: Fault = (sys::NO_WINDOW_CONTEXT, c"Cannot make current with a window that has no OpenGL or OpenGL ES context");
const NO_VULKAN: Fault = (sys::API_UNAVAILABLE, c"Vulkan: Loader not found");
const INVALID_EXTENSION: Fault = (sys::INVALID_VALUE, c"Extension name cannot be an empty string");
const SURFACE_NEEDS_NO_API: Fault = (
    sys::INVALID_VALUE,
    c"Vulkan: Window surface creation requires the window to have the client API set to GLFW_NO_API",
);

const GL_EXTENSIONS: [&str; 3] = ["GL_ARB_debug_output", "GL_KHR_debug", "GL_ARB_framebuffer_sRGB"];
const GL_SYMBOLS: [&str; 4] = ["glClear", "glClearColor", "glViewport", "glGetString"];

/// Stand-in entry point returned for every known symbol.
unsafe extern "C" fn entry_point() {}

fn entry_point_address() -> *const c_void {
    entry_point as unsafe extern "C" fn() as *const c_void
}

pub(super) unsafe extern "C" fn make_context_current(window: *mut GLFWwindow) {
    live((), |s| {
        if !window.is_null() && !s.window_mut(window)?.has_context() {
            return Err(NO_WINDOW_CONTEXT);
        }
        s.current_context = window;
        Ok(())
    });
}

pub(super) unsafe extern "C" fn get_current_context() -> *mut GLFWwindow {
    live(ptr::null_mut(), |s| Ok(s.current_context))
}

pub(super) unsafe extern "C" fn swap_buffers(window: *mut GLFWwindow) {
    live((), |s| {
        if s.window_mut(window)?.has_context() {
            Ok(())
        } else {
            Err((sys::NO_WINDOW_CONTEXT, c"Cannot swap buffers of a window that has no OpenGL or OpenGL ES context"))
        }
    });
}

pub(super) unsafe extern "C" fn swap_interval(interval: c_int) {
    live((), |s| {
        if s.current_context.is_null() {
            return Err((sys::NO_CURRENT_CONTEXT, c"Cannot set swap interval without a current OpenGL or OpenGL ES context"));
        }
        s.swap_interval = interval;
        Ok(())
    });
}

pub(super) unsafe extern "C" fn extension_supported(name: *const c_char) -> c_int {
    // SAFETY: the name is a NUL-terminated string.
    let name = unsafe { read_str(name) };
    live(sys::FALSE, |s| {
        if s.current_context.is_null() {
            return Err(NO_CURRENT_CONTEXT);
        }
        if name.is_empty() {
            return Err(INVALID_EXTENSION);
        }
        Ok(c_int::from(GL_EXTENSIONS.contains(&name.as_str())))
    })
}

pub(super) unsafe extern "C" fn get_proc_address(name: *const c_char) -> GLFWglproc {
    // SAFETY: the name is a NUL-terminated string.
    let name = unsafe { read_str(name) };
    live(ptr::null(), |s| {
        if s.current_context.is_null() {
            return Err(NO_CURRENT_CONTEXT);
        }
        Ok(if GL_SYMBOLS.contains(&name.as_str()) { entry_point_address() } else { ptr::null() })
    })
}

pub(super) unsafe extern "C" fn vulkan_supported() -> c_int {
    live(sys::FALSE, |s| Ok(c_int::from(s.vulkan_extensions.is_some())))
}

pub(super) unsafe extern "C" fn get_required_instance_extensions(count: *mut u32) -> *const *const c_char {
    let (len, names) = live((0, ptr::null()), |s| {
        if s.vulkan_extensions.is_none() {
            return Err(NO_VULKAN);
        }
        let len = s.vulkan_extension_array.len() as u32;
        Ok((len, if len == 0 { ptr::null() } else { s.vulkan_extension_array.as_ptr() }))
    });
    // SAFETY: out-parameter is null or writable.
    unsafe { put(count, len) };
    names
}

pub(super) unsafe extern "C" fn get_instance_proc_address(_instance: vk::Instance, name: *const c_char) -> GLFWvkproc {
    // SAFETY: the name is a NUL-terminated string.
    let name = unsafe { read_str(name) };
    live(ptr::null(), |s| {
        if s.vulkan_extensions.is_none() {
            return Err(NO_VULKAN);
        }
        Ok(if name.starts_with("vk") { entry_point_address() } else { ptr::null() })
    })
}

pub(super) unsafe extern "C" fn get_physical_device_presentation_support(
    _instance: vk::Instance,
    _device: vk::PhysicalDevice,
    _queue_family: u32,
) -> c_int {
    live(sys::FALSE, |s| {
        if s.vulkan_extensions.is_none() {
            return Err(NO_VULKAN);
        }
        Ok(sys::TRUE)
    })
}

pub(super) unsafe extern "C" fn create_window_surface(
    _instance: vk::Instance,
    window: *mut GLFWwindow,
    _allocator: *const vk::AllocationCallbacks,
    surface: *mut vk::SurfaceKHR,
) -> vk::Result {
    let outcome = live(Err(vk::Result::ERROR_INITIALIZATION_FAILED), |s| {
        if s.vulkan_extensions.is_none() {
            return Err(NO_VULKAN);
        }
        if s.window_mut(window)?.has_context() {
            return Ok(Err(vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR));
        }
        let handle = s.next_surface;
        s.next_surface += 1;
        Ok(Ok(vk::SurfaceKHR::from_raw(handle)))
    });
    let (created, result) = match outcome {
        Ok(created) => (created, vk::Result::SUCCESS),
        Err(result) => (vk::SurfaceKHR::null(), result),
    };
    if result == vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR {
        super::raise(SURFACE_NEEDS_NO_API);
    }
    // SAFETY: out-parameter is null or writable.
    unsafe { put(surface, created) };
    result
}
