//! Vulkan interop
//!
//! Surface creation and loader queries, typed with `ash::vk`. The native
//! library only loads the Vulkan loader; instances and devices stay with the
//! caller.

use std::os::raw::c_void;

use ash::vk::{self, Handle};

use crate::error::{Error, Result};
use crate::handle::WindowHandle;
use crate::library::Glfw;
use crate::marshal::{snapshot_strings, to_c_string, BorrowedStr, OwnedSlice, SnapshotAlloc};
use crate::sys;

impl<A: SnapshotAlloc> Glfw<A> {
    /// Whether a Vulkan loader and a minimally functional ICD were found.
    pub fn vulkan_supported(&self) -> bool {
        // SAFETY: main-thread call.
        unsafe { (self.api().vulkan_supported)() != sys::FALSE }
    }

    /// Instance extensions needed to create window surfaces.
    ///
    /// The array is owned; the names are borrowed from the native library and
    /// valid until it terminates. Empty both when none are needed and when
    /// Vulkan is unavailable: check [`Glfw::vulkan_supported`].
    pub fn required_instance_extensions(&self) -> Result<OwnedSlice<BorrowedStr<'_>, A>> {
        let mut count: u32 = 0;
        // SAFETY: main-thread call; the out-pointer refers to a live local.
        let names = unsafe { (self.api().get_required_instance_extensions)(&mut count) };
        // SAFETY: the array holds `count` static strings valid for the session.
        let extensions = unsafe { snapshot_strings(names, count, self.snapshot_alloc()) }?;
        log::debug!("Required Vulkan instance extensions: {:?}", &*extensions);
        Ok(extensions)
    }

    /// Address of a Vulkan function, `None` for an unknown symbol. Pass a null
    /// instance for global functions.
    pub fn instance_proc_address(&self, instance: vk::Instance, name: &str) -> Result<Option<*const c_void>> {
        let name = to_c_string(name)?;
        // SAFETY: main-thread call; the name outlives the call.
        let proc = unsafe { (self.api().get_instance_proc_address)(instance, name.as_ptr()) };
        Ok((!proc.is_null()).then_some(proc))
    }

    /// Whether a queue family of the device can present to this platform.
    pub fn physical_device_presentation_support(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
        queue_family: u32,
    ) -> bool {
        // SAFETY: main-thread call with caller-provided Vulkan handles.
        unsafe { (self.api().get_physical_device_presentation_support)(instance, device, queue_family) != sys::FALSE }
    }

    /// Create a Vulkan surface for a window created without a client API.
    pub fn create_window_surface(&self, instance: vk::Instance, window: WindowHandle) -> Result<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        // SAFETY: live window handle; the out-pointer refers to a live local.
        let result = unsafe {
            (self.api().create_window_surface)(instance, window.as_ptr(), std::ptr::null(), &mut surface)
        };
        if result != vk::Result::SUCCESS {
            let cause = self.take_last_error();
            log::warn!("Vulkan surface creation failed: {result:?} {cause:?}");
            return Err(Error::Vulkan { result, cause });
        }
        log::debug!("Created Vulkan surface {:#x} for {window:?}", surface.as_raw());
        Ok(surface)
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
    fn test_unsupported_vulkan_is_empty_list() {
        let glfw = session();
        assert!(!glfw.vulkan_supported());
        assert!(glfw.required_instance_extensions().unwrap().is_empty());
        assert_eq!(
            glfw.take_last_error().and_then(|e| e.classification),
            Some(ErrorCode::ApiUnavailable)
        );
    }

    #[test]
    fn test_required_extensions() {
        let glfw = session();
        headless::enable_vulkan(&["VK_KHR_surface", "VK_KHR_xcb_surface"]);
        assert!(glfw.vulkan_supported());
        let extensions = glfw.required_instance_extensions().unwrap();
        let names: Vec<String> = extensions.iter().map(|e| e.to_string_lossy().into_owned()).collect();
        assert_eq!(names, ["VK_KHR_surface", "VK_KHR_xcb_surface"]);
    }

    #[test]
    fn test_supported_without_extensions() {
        let glfw = session();
        headless::enable_vulkan(&[]);
        assert!(glfw.vulkan_supported());
        assert!(glfw.required_instance_extensions().unwrap().is_empty());
        assert!(glfw.take_last_error().is_none());
    }

    #[test]
    fn test_surface_creation() {
        let glfw = session();
        headless::enable_vulkan(&["VK_KHR_surface"]);
        let window = glfw.create_window(&WindowConfig::new(64, 64, "vk").for_vulkan(), None, None).unwrap();
        let surface = glfw.create_window_surface(vk::Instance::null(), window).unwrap();
        assert_ne!(surface, vk::SurfaceKHR::null());
        assert!(glfw.physical_device_presentation_support(vk::Instance::null(), vk::PhysicalDevice::null(), 0));
        assert!(glfw.instance_proc_address(vk::Instance::null(), "vkCreateInstance").unwrap().is_some());
    }

    #[test]
    fn test_surface_needs_window_without_context() {
        let glfw = session();
        headless::enable_vulkan(&["VK_KHR_surface"]);
        let window = glfw.create_window(&WindowConfig::new(64, 64, "gl"), None, None).unwrap();
        match glfw.create_window_surface(vk::Instance::null(), window) {
            Err(Error::Vulkan { result, cause }) => {
                assert_eq!(result, vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR);
                assert_eq!(cause.unwrap().classification, Some(ErrorCode::InvalidValue));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
