//! Opaque native object handles
//!
//! A handle is nothing but the non-null address the native library returned
//! from its "create" call. Handles are `Copy`, compare by address and are never
//! dereferenced by this crate. Each wrapper is `#[repr(transparent)]` over
//! `NonNull`, so it is ABI-identical to the raw pointer the native side passes
//! to callbacks.
//!
//! Handles do not track liveness: using a handle after its matching destroy call
//! is a caller error that the native library does not detect either.

use std::fmt;
use std::ptr::NonNull;

use crate::error::{Error, NativeError, ObjectKind};
use crate::sys::{GLFWcursor, GLFWmonitor, GLFWwindow};

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident => $raw:ty, $kind:expr) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonNull<$raw>);

        impl $name {
            /// Wrap a raw native pointer; null yields `None`.
            pub fn from_raw(ptr: *mut $raw) -> Option<Self> {
                NonNull::new(ptr).map(Self)
            }

            /// Wrap a pointer the native contract guarantees to be non-null.
            ///
            /// # Safety
            /// `ptr` must not be null.
            pub unsafe fn from_raw_unchecked(ptr: *mut $raw) -> Self {
                debug_assert!(!ptr.is_null());
                // SAFETY: upheld by the caller.
                Self(unsafe { NonNull::new_unchecked(ptr) })
            }

            /// Wrap the result of a native "create" call. Null is reported as
            /// [`Error::CreationFailed`] carrying whatever the error slot held.
            pub(crate) fn created(ptr: *mut $raw, cause: impl FnOnce() -> Option<NativeError>) -> Result<Self, Error> {
                Self::from_raw(ptr).ok_or_else(|| {
                    let cause = cause();
                    log::warn!("{} creation failed: {:?}", $kind, cause);
                    Error::CreationFailed { object: $kind, cause }
                })
            }

            /// The raw native pointer, for passing back across the boundary.
            pub fn as_ptr(self) -> *mut $raw {
                self.0.as_ptr()
            }

            /// Pointer value, useful for logging and identity checks.
            pub fn addr(self) -> usize {
                self.0.as_ptr() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x})", stringify!($name), self.addr())
            }
        }
    };
}

opaque_handle!(
    /// Handle to a native window (and its context, if it has one).
    WindowHandle => GLFWwindow, ObjectKind::Window
);

opaque_handle!(
    /// Handle to a connected monitor. Invalidated by disconnection.
    MonitorHandle => GLFWmonitor, ObjectKind::Monitor
);

opaque_handle!(
    /// Handle to a native cursor image.
    CursorHandle => GLFWcursor, ObjectKind::Cursor
);

/// Raw pointer for an optional handle; `None` becomes null.
pub(crate) fn window_ptr(window: Option<WindowHandle>) -> *mut GLFWwindow {
    window.map_or(std::ptr::null_mut(), WindowHandle::as_ptr)
}

pub(crate) fn monitor_ptr(monitor: Option<MonitorHandle>) -> *mut GLFWmonitor {
    monitor.map_or(std::ptr::null_mut(), MonitorHandle::as_ptr)
}

pub(crate) fn cursor_ptr(cursor: Option<CursorHandle>) -> *mut GLFWcursor {
    cursor.map_or(std::ptr::null_mut(), CursorHandle::as_ptr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_absent() {
        assert!(WindowHandle::from_raw(std::ptr::null_mut()).is_none());
        assert!(monitor_ptr(None).is_null());
    }

    #[test]
    fn test_identity_is_address() {
        let mut slot = 0u8;
        let raw = (&mut slot as *mut u8).cast::<GLFWwindow>();
        let a = WindowHandle::from_raw(raw).unwrap();
        let b = WindowHandle::from_raw(raw).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_ptr(), raw);
        assert_eq!(window_ptr(Some(a)), raw);
    }

    #[test]
    fn test_created_null_reports_creation_failure() {
        let result = CursorHandle::created(std::ptr::null_mut(), || None);
        assert!(matches!(
            result,
            Err(Error::CreationFailed { object: ObjectKind::Cursor, cause: None })
        ));
    }

    #[test]
    fn test_handle_has_pointer_layout() {
        assert_eq!(std::mem::size_of::<WindowHandle>(), std::mem::size_of::<*mut GLFWwindow>());
        assert_eq!(std::mem::size_of::<Option<MonitorHandle>>(), std::mem::size_of::<*mut GLFWmonitor>());
    }
}
