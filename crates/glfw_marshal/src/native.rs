//! Native function table
//!
//! Every call the marshaling layer makes into the windowing library goes through
//! a [`NativeApi`]: a plain table of C-ABI function pointers whose signatures
//! match `glfw3.h` exactly. [`NativeApi::glfw`] binds the table to the linked
//! GLFW library; `headless::api` (feature `headless`) binds it to the in-process
//! simulation.
//! The table carries no state of its own.

use std::os::raw::{c_char, c_double, c_float, c_int, c_uchar, c_void};
use std::sync::atomic::{AtomicBool, Ordering};

use ash::vk;

use crate::sys::{self, *};

/// Table of native entry points, one field per C function.
///
/// The fields are public so that alternative implementations of the native
/// contract can be plugged in; calling any of them is `unsafe` and subject to
/// the native library's own preconditions (main thread, valid handles).
#[allow(missing_docs)]
#[derive(Clone, Copy)]
pub struct NativeApi {
    pub init: unsafe extern "C" fn() -> c_int,
    pub terminate: unsafe extern "C" fn(),
    pub init_hint: unsafe extern "C" fn(c_int, c_int),
    pub get_version: unsafe extern "C" fn(*mut c_int, *mut c_int, *mut c_int),
    pub get_version_string: unsafe extern "C" fn() -> *const c_char,
    pub get_error: unsafe extern "C" fn(*mut *const c_char) -> c_int,
    pub set_error_callback: unsafe extern "C" fn(Option<GLFWerrorfun>) -> Option<GLFWerrorfun>,

    pub get_monitors: unsafe extern "C" fn(*mut c_int) -> *mut *mut GLFWmonitor,
    pub get_primary_monitor: unsafe extern "C" fn() -> *mut GLFWmonitor,
    pub get_monitor_pos: unsafe extern "C" fn(*mut GLFWmonitor, *mut c_int, *mut c_int),
    pub get_monitor_workarea:
        unsafe extern "C" fn(*mut GLFWmonitor, *mut c_int, *mut c_int, *mut c_int, *mut c_int),
    pub get_monitor_physical_size: unsafe extern "C" fn(*mut GLFWmonitor, *mut c_int, *mut c_int),
    pub get_monitor_content_scale: unsafe extern "C" fn(*mut GLFWmonitor, *mut c_float, *mut c_float),
    pub get_monitor_name: unsafe extern "C" fn(*mut GLFWmonitor) -> *const c_char,
    pub set_monitor_user_pointer: unsafe extern "C" fn(*mut GLFWmonitor, *mut c_void),
    pub get_monitor_user_pointer: unsafe extern "C" fn(*mut GLFWmonitor) -> *mut c_void,
    pub set_monitor_callback: unsafe extern "C" fn(Option<GLFWmonitorfun>) -> Option<GLFWmonitorfun>,
    pub get_video_modes: unsafe extern "C" fn(*mut GLFWmonitor, *mut c_int) -> *const GLFWvidmode,
    pub get_video_mode: unsafe extern "C" fn(*mut GLFWmonitor) -> *const GLFWvidmode,
    pub set_gamma: unsafe extern "C" fn(*mut GLFWmonitor, c_float),
    pub get_gamma_ramp: unsafe extern "C" fn(*mut GLFWmonitor) -> *const GLFWgammaramp,
    pub set_gamma_ramp: unsafe extern "C" fn(*mut GLFWmonitor, *const GLFWgammaramp),

    pub default_window_hints: unsafe extern "C" fn(),
    pub window_hint: unsafe extern "C" fn(c_int, c_int),
    pub create_window: unsafe extern "C" fn(
        c_int,
        c_int,
        *const c_char,
        *mut GLFWmonitor,
        *mut GLFWwindow,
    ) -> *mut GLFWwindow,
    pub destroy_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub window_should_close: unsafe extern "C" fn(*mut GLFWwindow) -> c_int,
    pub set_window_should_close: unsafe extern "C" fn(*mut GLFWwindow, c_int),
    pub set_window_title: unsafe extern "C" fn(*mut GLFWwindow, *const c_char),
    pub set_window_icon: unsafe extern "C" fn(*mut GLFWwindow, c_int, *const GLFWimage),
    pub get_window_pos: unsafe extern "C" fn(*mut GLFWwindow, *mut c_int, *mut c_int),
    pub set_window_pos: unsafe extern "C" fn(*mut GLFWwindow, c_int, c_int),
    pub get_window_size: unsafe extern "C" fn(*mut GLFWwindow, *mut c_int, *mut c_int),
    pub set_window_size_limits: unsafe extern "C" fn(*mut GLFWwindow, c_int, c_int, c_int, c_int),
    pub set_window_aspect_ratio: unsafe extern "C" fn(*mut GLFWwindow, c_int, c_int),
    pub set_window_size: unsafe extern "C" fn(*mut GLFWwindow, c_int, c_int),
    pub get_framebuffer_size: unsafe extern "C" fn(*mut GLFWwindow, *mut c_int, *mut c_int),
    pub get_window_frame_size:
        unsafe extern "C" fn(*mut GLFWwindow, *mut c_int, *mut c_int, *mut c_int, *mut c_int),
    pub get_window_content_scale: unsafe extern "C" fn(*mut GLFWwindow, *mut c_float, *mut c_float),
    pub get_window_opacity: unsafe extern "C" fn(*mut GLFWwindow) -> c_float,
    pub set_window_opacity: unsafe extern "C" fn(*mut GLFWwindow, c_float),
    pub iconify_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub restore_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub maximize_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub show_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub hide_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub focus_window: unsafe extern "C" fn(*mut GLFWwindow),
    pub request_window_attention: unsafe extern "C" fn(*mut GLFWwindow),
    pub get_window_monitor: unsafe extern "C" fn(*mut GLFWwindow) -> *mut GLFWmonitor,
    pub set_window_monitor:
        unsafe extern "C" fn(*mut GLFWwindow, *mut GLFWmonitor, c_int, c_int, c_int, c_int, c_int),
    pub get_window_attrib: unsafe extern "C" fn(*mut GLFWwindow, c_int) -> c_int,
    pub set_window_attrib: unsafe extern "C" fn(*mut GLFWwindow, c_int, c_int),
    pub set_window_user_pointer: unsafe extern "C" fn(*mut GLFWwindow, *mut c_void),
    pub get_window_user_pointer: unsafe extern "C" fn(*mut GLFWwindow) -> *mut c_void,

    pub set_window_pos_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowposfun>) -> Option<GLFWwindowposfun>,
    pub set_window_size_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowsizefun>) -> Option<GLFWwindowsizefun>,
    pub set_window_close_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowclosefun>) -> Option<GLFWwindowclosefun>,
    pub set_window_refresh_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowrefreshfun>) -> Option<GLFWwindowrefreshfun>,
    pub set_window_focus_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowfocusfun>) -> Option<GLFWwindowfocusfun>,
    pub set_window_iconify_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowiconifyfun>) -> Option<GLFWwindowiconifyfun>,
    pub set_window_maximize_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWwindowmaximizefun>) -> Option<GLFWwindowmaximizefun>,
    pub set_framebuffer_size_callback: unsafe extern "C" fn(
        *mut GLFWwindow,
        Option<GLFWframebuffersizefun>,
    ) -> Option<GLFWframebuffersizefun>,
    pub set_window_content_scale_callback: unsafe extern "C" fn(
        *mut GLFWwindow,
        Option<GLFWwindowcontentscalefun>,
    ) -> Option<GLFWwindowcontentscalefun>,
    pub set_key_callback: unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWkeyfun>) -> Option<GLFWkeyfun>,
    pub set_char_callback: unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWcharfun>) -> Option<GLFWcharfun>,
    pub set_mouse_button_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWmousebuttonfun>) -> Option<GLFWmousebuttonfun>,
    pub set_cursor_pos_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWcursorposfun>) -> Option<GLFWcursorposfun>,
    pub set_cursor_enter_callback:
        unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWcursorenterfun>) -> Option<GLFWcursorenterfun>,
    pub set_scroll_callback: unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWscrollfun>) -> Option<GLFWscrollfun>,
    pub set_drop_callback: unsafe extern "C" fn(*mut GLFWwindow, Option<GLFWdropfun>) -> Option<GLFWdropfun>,

    pub poll_events: unsafe extern "C" fn(),
    pub wait_events: unsafe extern "C" fn(),
    pub wait_events_timeout: unsafe extern "C" fn(c_double),
    pub post_empty_event: unsafe extern "C" fn(),

    pub get_input_mode: unsafe extern "C" fn(*mut GLFWwindow, c_int) -> c_int,
    pub set_input_mode: unsafe extern "C" fn(*mut GLFWwindow, c_int, c_int),
    pub raw_mouse_motion_supported: unsafe extern "C" fn() -> c_int,
    pub get_key_name: unsafe extern "C" fn(c_int, c_int) -> *const c_char,
    pub get_key_scancode: unsafe extern "C" fn(c_int) -> c_int,
    pub get_key: unsafe extern "C" fn(*mut GLFWwindow, c_int) -> c_int,
    pub get_mouse_button: unsafe extern "C" fn(*mut GLFWwindow, c_int) -> c_int,
    pub get_cursor_pos: unsafe extern "C" fn(*mut GLFWwindow, *mut c_double, *mut c_double),
    pub set_cursor_pos: unsafe extern "C" fn(*mut GLFWwindow, c_double, c_double),
    pub create_cursor: unsafe extern "C" fn(*const GLFWimage, c_int, c_int) -> *mut GLFWcursor,
    pub create_standard_cursor: unsafe extern "C" fn(c_int) -> *mut GLFWcursor,
    pub destroy_cursor: unsafe extern "C" fn(*mut GLFWcursor),
    pub set_cursor: unsafe extern "C" fn(*mut GLFWwindow, *mut GLFWcursor),

    pub joystick_present: unsafe extern "C" fn(c_int) -> c_int,
    pub get_joystick_axes: unsafe extern "C" fn(c_int, *mut c_int) -> *const c_float,
    pub get_joystick_buttons: unsafe extern "C" fn(c_int, *mut c_int) -> *const c_uchar,
    pub get_joystick_hats: unsafe extern "C" fn(c_int, *mut c_int) -> *const c_uchar,
    pub get_joystick_name: unsafe extern "C" fn(c_int) -> *const c_char,
    pub get_joystick_guid: unsafe extern "C" fn(c_int) -> *const c_char,
    pub set_joystick_user_pointer: unsafe extern "C" fn(c_int, *mut c_void),
    pub get_joystick_user_pointer: unsafe extern "C" fn(c_int) -> *mut c_void,
    pub joystick_is_gamepad: unsafe extern "C" fn(c_int) -> c_int,
    pub set_joystick_callback: unsafe extern "C" fn(Option<GLFWjoystickfun>) -> Option<GLFWjoystickfun>,
    pub update_gamepad_mappings: unsafe extern "C" fn(*const c_char) -> c_int,
    pub get_gamepad_name: unsafe extern "C" fn(c_int) -> *const c_char,
    pub get_gamepad_state: unsafe extern "C" fn(c_int, *mut GLFWgamepadstate) -> c_int,

    pub set_clipboard_string: unsafe extern "C" fn(*mut GLFWwindow, *const c_char),
    pub get_clipboard_string: unsafe extern "C" fn(*mut GLFWwindow) -> *const c_char,

    pub get_time: unsafe extern "C" fn() -> c_double,
    pub set_time: unsafe extern "C" fn(c_double),
    pub get_timer_value: unsafe extern "C" fn() -> u64,
    pub get_timer_frequency: unsafe extern "C" fn() -> u64,

    pub make_context_current: unsafe extern "C" fn(*mut GLFWwindow),
    pub get_current_context: unsafe extern "C" fn() -> *mut GLFWwindow,
    pub swap_buffers: unsafe extern "C" fn(*mut GLFWwindow),
    pub swap_interval: unsafe extern "C" fn(c_int),
    pub extension_supported: unsafe extern "C" fn(*const c_char) -> c_int,
    pub get_proc_address: unsafe extern "C" fn(*const c_char) -> GLFWglproc,

    pub vulkan_supported: unsafe extern "C" fn() -> c_int,
    pub get_required_instance_extensions: unsafe extern "C" fn(*mut u32) -> *const *const c_char,
    pub get_instance_proc_address: unsafe extern "C" fn(vk::Instance, *const c_char) -> GLFWvkproc,
    pub get_physical_device_presentation_support:
        unsafe extern "C" fn(vk::Instance, vk::PhysicalDevice, u32) -> c_int,
    pub create_window_surface: unsafe extern "C" fn(
        vk::Instance,
        *mut GLFWwindow,
        *const vk::AllocationCallbacks,
        *mut vk::SurfaceKHR,
    ) -> vk::Result,

    /// Claim the single session the bound native state allows. `false` while
    /// another session holds it.
    pub claim_session: fn() -> bool,
    /// Give back a session claimed with `claim_session`.
    pub release_session: fn(),
}

/// Set while a session of the linked library is alive; its state is
/// process-global.
static GLFW_SESSION: AtomicBool = AtomicBool::new(false);

fn claim_glfw_session() -> bool {
    GLFW_SESSION
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

fn release_glfw_session() {
    GLFW_SESSION.store(false, Ordering::Release);
}

static GLFW: NativeApi = NativeApi {
    init: sys::glfwInit,
    terminate: sys::glfwTerminate,
    init_hint: sys::glfwInitHint,
    get_version: sys::glfwGetVersion,
    get_version_string: sys::glfwGetVersionString,
    get_error: sys::glfwGetError,
    set_error_callback: sys::glfwSetErrorCallback,

    get_monitors: sys::glfwGetMonitors,
    get_primary_monitor: sys::glfwGetPrimaryMonitor,
    get_monitor_pos: sys::glfwGetMonitorPos,
    get_monitor_workarea: sys::glfwGetMonitorWorkarea,
    get_monitor_physical_size: sys::glfwGetMonitorPhysicalSize,
    get_monitor_content_scale: sys::glfwGetMonitorContentScale,
    get_monitor_name: sys::glfwGetMonitorName,
    set_monitor_user_pointer: sys::glfwSetMonitorUserPointer,
    get_monitor_user_pointer: sys::glfwGetMonitorUserPointer,
    set_monitor_callback: sys::glfwSetMonitorCallback,
    get_video_modes: sys::glfwGetVideoModes,
    get_video_mode: sys::glfwGetVideoMode,
    set_gamma: sys::glfwSetGamma,
    get_gamma_ramp: sys::glfwGetGammaRamp,
    set_gamma_ramp: sys::glfwSetGammaRamp,

    default_window_hints: sys::glfwDefaultWindowHints,
    window_hint: sys::glfwWindowHint,
    create_window: sys::glfwCreateWindow,
    destroy_window: sys::glfwDestroyWindow,
    window_should_close: sys::glfwWindowShouldClose,
    set_window_should_close: sys::glfwSetWindowShouldClose,
    set_window_title: sys::glfwSetWindowTitle,
    set_window_icon: sys::glfwSetWindowIcon,
    get_window_pos: sys::glfwGetWindowPos,
    set_window_pos: sys::glfwSetWindowPos,
    get_window_size: sys::glfwGetWindowSize,
    set_window_size_limits: sys::glfwSetWindowSizeLimits,
    set_window_aspect_ratio: sys::glfwSetWindowAspectRatio,
    set_window_size: sys::glfwSetWindowSize,
    get_framebuffer_size: sys::glfwGetFramebufferSize,
    get_window_frame_size: sys::glfwGetWindowFrameSize,
    get_window_content_scale: sys::glfwGetWindowContentScale,
    get_window_opacity: sys::glfwGetWindowOpacity,
    set_window_opacity: sys::glfwSetWindowOpacity,
    iconify_window: sys::glfwIconifyWindow,
    restore_window: sys::glfwRestoreWindow,
    maximize_window: sys::glfwMaximizeWindow,
    show_window: sys::glfwShowWindow,
    hide_window: sys::glfwHideWindow,
    focus_window: sys::glfwFocusWindow,
    request_window_attention: sys::glfwRequestWindowAttention,
    get_window_monitor: sys::glfwGetWindowMonitor,
    set_window_monitor: sys::glfwSetWindowMonitor,
    get_window_attrib: sys::glfwGetWindowAttrib,
    set_window_attrib: sys::glfwSetWindowAttrib,
    set_window_user_pointer: sys::glfwSetWindowUserPointer,
    get_window_user_pointer: sys::glfwGetWindowUserPointer,

    set_window_pos_callback: sys::glfwSetWindowPosCallback,
    set_window_size_callback: sys::glfwSetWindowSizeCallback,
    set_window_close_callback: sys::glfwSetWindowCloseCallback,
    set_window_refresh_callback: sys::glfwSetWindowRefreshCallback,
    set_window_focus_callback: sys::glfwSetWindowFocusCallback,
    set_window_iconify_callback: sys::glfwSetWindowIconifyCallback,
    set_window_maximize_callback: sys::glfwSetWindowMaximizeCallback,
    set_framebuffer_size_callback: sys::glfwSetFramebufferSizeCallback,
    set_window_content_scale_callback: sys::glfwSetWindowContentScaleCallback,
    set_key_callback: sys::glfwSetKeyCallback,
    set_char_callback: sys::glfwSetCharCallback,
    set_mouse_button_callback: sys::glfwSetMouseButtonCallback,
    set_cursor_pos_callback: sys::glfwSetCursorPosCallback,
    set_cursor_enter_callback: sys::glfwSetCursorEnterCallback,
    set_scroll_callback: sys::glfwSetScrollCallback,
    set_drop_callback: sys::glfwSetDropCallback,

    poll_events: sys::glfwPollEvents,
    wait_events: sys::glfwWaitEvents,
    wait_events_timeout: sys::glfwWaitEventsTimeout,
    post_empty_event: sys::glfwPostEmptyEvent,

    get_input_mode: sys::glfwGetInputMode,
    set_input_mode: sys::glfwSetInputMode,
    raw_mouse_motion_supported: sys::glfwRawMouseMotionSupported,
    get_key_name: sys::glfwGetKeyName,
    get_key_scancode: sys::glfwGetKeyScancode,
    get_key: sys::glfwGetKey,
    get_mouse_button: sys::glfwGetMouseButton,
    get_cursor_pos: sys::glfwGetCursorPos,
    set_cursor_pos: sys::glfwSetCursorPos,
    create_cursor: sys::glfwCreateCursor,
    create_standard_cursor: sys::glfwCreateStandardCursor,
    destroy_cursor: sys::glfwDestroyCursor,
    set_cursor: sys::glfwSetCursor,

    joystick_present: sys::glfwJoystickPresent,
    get_joystick_axes: sys::glfwGetJoystickAxes,
    get_joystick_buttons: sys::glfwGetJoystickButtons,
    get_joystick_hats: sys::glfwGetJoystickHats,
    get_joystick_name: sys::glfwGetJoystickName,
    get_joystick_guid: sys::glfwGetJoystickGUID,
    set_joystick_user_pointer: sys::glfwSetJoystickUserPointer,
    get_joystick_user_pointer: sys::glfwGetJoystickUserPointer,
    joystick_is_gamepad: sys::glfwJoystickIsGamepad,
    set_joystick_callback: sys::glfwSetJoystickCallback,
    update_gamepad_mappings: sys::glfwUpdateGamepadMappings,
    get_gamepad_name: sys::glfwGetGamepadName,
    get_gamepad_state: sys::glfwGetGamepadState,

    set_clipboard_string: sys::glfwSetClipboardString,
    get_clipboard_string: sys::glfwGetClipboardString,

    get_time: sys::glfwGetTime,
    set_time: sys::glfwSetTime,
    get_timer_value: sys::glfwGetTimerValue,
    get_timer_frequency: sys::glfwGetTimerFrequency,

    make_context_current: sys::glfwMakeContextCurrent,
    get_current_context: sys::glfwGetCurrentContext,
    swap_buffers: sys::glfwSwapBuffers,
    swap_interval: sys::glfwSwapInterval,
    extension_supported: sys::glfwExtensionSupported,
    get_proc_address: sys::glfwGetProcAddress,

    vulkan_supported: sys::glfwVulkanSupported,
    get_required_instance_extensions: sys::glfwGetRequiredInstanceExtensions,
    get_instance_proc_address: sys::glfwGetInstanceProcAddress,
    get_physical_device_presentation_support: sys::glfwGetPhysicalDevicePresentationSupport,
    create_window_surface: sys::glfwCreateWindowSurface,

    claim_session: claim_glfw_session,
    release_session: release_glfw_session,
};

impl NativeApi {
    /// The table bound to the linked GLFW library.
    pub fn glfw() -> &'static Self {
        &GLFW
    }
}

impl std::fmt::Debug for NativeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeApi")
            .field("init", &(self.init as *const ()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_library_allows_one_session() {
        let api = NativeApi::glfw();
        assert!((api.claim_session)());
        assert!(!(api.claim_session)());
        (api.release_session)();
        assert!((api.claim_session)());
        (api.release_session)();
    }
}
