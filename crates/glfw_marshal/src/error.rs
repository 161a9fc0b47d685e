//! Error and diagnostics bridge
//!
//! The native library keeps a single, read-once error slot: any failing call
//! stores `(code, description)`, overwriting what was there, and querying the
//! slot hands the value back and clears it. [`query_last_error`] adapts that
//! query into an [`ErrorInfo`]; [`Error`] is the crate-wide failure type that
//! keeps native failures, snapshot allocation failures and null "create"
//! results apart.

use std::fmt;
use std::os::raw::{c_char, c_int};
use std::ptr;

use ash::vk;
use thiserror::Error;

use crate::config::ConfigError;
use crate::marshal::{borrow, BorrowedStr};
use crate::native::NativeApi;
use crate::sys;

/// The documented native error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// The library was not initialized.
    NotInitialized = sys::NOT_INITIALIZED,
    /// No context is current on the calling thread.
    NoCurrentContext = sys::NO_CURRENT_CONTEXT,
    /// An enum argument was not one the function accepts.
    InvalidEnum = sys::INVALID_ENUM,
    /// An argument value was out of range.
    InvalidValue = sys::INVALID_VALUE,
    /// A native allocation failed.
    OutOfMemory = sys::OUT_OF_MEMORY,
    /// The requested client API is not available.
    ApiUnavailable = sys::API_UNAVAILABLE,
    /// The requested context version is not available.
    VersionUnavailable = sys::VERSION_UNAVAILABLE,
    /// A platform-specific error occurred.
    PlatformError = sys::PLATFORM_ERROR,
    /// The requested pixel or clipboard format is not available.
    FormatUnavailable = sys::FORMAT_UNAVAILABLE,
    /// The window has no context.
    NoWindowContext = sys::NO_WINDOW_CONTEXT,
    /// The requested standard cursor shape is not available.
    CursorUnavailable = sys::CURSOR_UNAVAILABLE,
    /// The platform does not provide the requested feature.
    FeatureUnavailable = sys::FEATURE_UNAVAILABLE,
    /// The library does not implement the feature on this platform.
    FeatureUnimplemented = sys::FEATURE_UNIMPLEMENTED,
    /// The requested platform backend is not available.
    PlatformUnavailable = sys::PLATFORM_UNAVAILABLE,
}

impl ErrorCode {
    /// Every documented code, in numeric order.
    pub const ALL: [Self; 14] = [
        Self::NotInitialized,
        Self::NoCurrentContext,
        Self::InvalidEnum,
        Self::InvalidValue,
        Self::OutOfMemory,
        Self::ApiUnavailable,
        Self::VersionUnavailable,
        Self::PlatformError,
        Self::FormatUnavailable,
        Self::NoWindowContext,
        Self::CursorUnavailable,
        Self::FeatureUnavailable,
        Self::FeatureUnimplemented,
        Self::PlatformUnavailable,
    ];

    /// Map a raw code onto the documented set. Codes outside it are
    /// unclassified and yield `None`; this never fails.
    pub fn classify(raw: c_int) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.raw() == raw)
    }

    /// The raw native value.
    pub const fn raw(self) -> c_int {
        self as c_int
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotInitialized => "not initialized",
            Self::NoCurrentContext => "no current context",
            Self::InvalidEnum => "invalid enum",
            Self::InvalidValue => "invalid value",
            Self::OutOfMemory => "out of memory",
            Self::ApiUnavailable => "API unavailable",
            Self::VersionUnavailable => "version unavailable",
            Self::PlatformError => "platform error",
            Self::FormatUnavailable => "format unavailable",
            Self::NoWindowContext => "no window context",
            Self::CursorUnavailable => "cursor unavailable",
            Self::FeatureUnavailable => "feature unavailable",
            Self::FeatureUnimplemented => "feature unimplemented",
            Self::PlatformUnavailable => "platform unavailable",
        };
        f.write_str(name)
    }
}

/// A pending native error, as read out of the error slot.
///
/// The description is borrowed from the native library and is valid until the
/// next native error or library shutdown; call [`ErrorInfo::to_owned_error`] to
/// keep it longer.
#[derive(Debug, Clone, Copy)]
pub struct ErrorInfo<'a> {
    /// Raw native code.
    pub code: c_int,
    /// Documented classification, `None` when the code is unclassified.
    pub classification: Option<ErrorCode>,
    /// Native description, absent when the library supplied none.
    pub description: Option<BorrowedStr<'a>>,
}

impl ErrorInfo<'_> {
    /// Build from the raw pieces the native side reports.
    ///
    /// # Safety
    /// `description` must be null or point to a NUL-terminated string that
    /// stays valid for the returned lifetime.
    pub unsafe fn from_raw<'a>(code: c_int, description: *const c_char) -> ErrorInfo<'a> {
        ErrorInfo {
            code,
            classification: ErrorCode::classify(code),
            // SAFETY: forwarded from the caller.
            description: unsafe { borrow(description) },
        }
    }

    /// Copy into an owned error that no longer depends on native memory.
    pub fn to_owned_error(&self) -> NativeError {
        NativeError {
            code: self.code,
            classification: self.classification,
            description: self.description.map(|d| d.to_string_lossy().into_owned()),
        }
    }
}

/// Read and clear the native error slot.
///
/// Returns `None` when the slot is empty; in that case nothing else is touched.
///
/// # Safety
/// The caller picks `'a`; it must not extend past the next native error or
/// library shutdown.
pub(crate) unsafe fn query_last_error<'a>(api: &NativeApi) -> Option<ErrorInfo<'a>> {
    let mut description: *const c_char = ptr::null();
    // SAFETY: the out-pointer refers to a live local.
    let code = unsafe { (api.get_error)(&mut description) };
    if code == sys::NO_ERROR {
        return None;
    }
    // SAFETY: the native contract keeps the description alive until the next
    // error or shutdown, which bounds `'a`.
    Some(unsafe { ErrorInfo::from_raw(code, description) })
}

/// Drain the error slot into an owned value.
pub(crate) fn take_last_error(api: &NativeApi) -> Option<NativeError> {
    // SAFETY: the borrowed description is copied before returning.
    unsafe { query_last_error(api) }.map(|info| info.to_owned_error())
}

/// Owned copy of a native error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Raw native code.
    pub code: c_int,
    /// Documented classification, `None` when unclassified.
    pub classification: Option<ErrorCode>,
    /// Copied description.
    pub description: Option<String>,
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.classification {
            Some(class) => write!(f, "{class} ({:#x})", self.code)?,
            None => write!(f, "unclassified error {:#x}", self.code)?,
        }
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NativeError {}

/// Kind of native object a "create" call was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A window.
    Window,
    /// A monitor.
    Monitor,
    /// A cursor.
    Cursor,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Window => "window",
            Self::Monitor => "monitor",
            Self::Cursor => "cursor",
        })
    }
}

/// Marshaling layer errors
#[derive(Error, Debug)]
pub enum Error {
    /// The native library reported a failure through its error slot.
    #[error("native error: {0}")]
    Native(NativeError),

    /// Allocating an owned snapshot failed.
    #[error("snapshot allocation of {count} elements of {elem_size} bytes failed")]
    AllocationFailed {
        /// Requested element count.
        count: usize,
        /// Size of one element.
        elem_size: usize,
    },

    /// A native "create" call returned null.
    #[error("{object} creation failed{}", display_cause(.cause))]
    CreationFailed {
        /// What was being created.
        object: ObjectKind,
        /// The error slot's content right after the failed call, if any.
        cause: Option<NativeError>,
    },

    /// A native call returned its failure value.
    #[error("{call} failed{}", display_cause(.cause))]
    CallFailed {
        /// Name of the failed operation.
        call: &'static str,
        /// The error slot's content right after the call, if any.
        cause: Option<NativeError>,
    },

    /// Native initialization returned false.
    #[error("initialization failed{}", display_cause(.0))]
    InitializationFailed(Option<NativeError>),

    /// Another session of the same native library is still alive.
    #[error("the native library is already initialized by a live session")]
    AlreadyInitialized,

    /// A Vulkan call made through the native library did not succeed.
    #[error("Vulkan call returned {result:?}{}", display_cause(.cause))]
    Vulkan {
        /// The Vulkan result code.
        result: vk::Result,
        /// The error slot's content right after the call, if any.
        cause: Option<NativeError>,
    },

    /// Image pixel data does not match its declared dimensions.
    #[error("image of {width}x{height} needs {expected} pixels, got {actual}")]
    ImageSize {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Pixels the dimensions require.
        expected: usize,
        /// Pixels supplied.
        actual: usize,
    },

    /// Gamma ramp channels differ in length, or are empty.
    #[error("gamma ramp channels must be non-empty and equal in length, got {red}/{green}/{blue}")]
    RampSize {
        /// Red channel length.
        red: usize,
        /// Green channel length.
        green: usize,
        /// Blue channel length.
        blue: usize,
    },

    /// A string argument could not be passed as a C string.
    #[error("string contains an interior NUL byte")]
    InteriorNul(#[from] std::ffi::NulError),

    /// Configuration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn display_cause(cause: &Option<NativeError>) -> String {
    cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default()
}

impl From<NativeError> for Error {
    fn from(error: NativeError) -> Self {
        Self::Native(error)
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_round_trips() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::classify(code.raw()), Some(code));
        }
    }

    #[test]
    fn test_unknown_code_is_unclassified() {
        assert_eq!(ErrorCode::classify(0x0001_00FF), None);
        assert_eq!(ErrorCode::classify(-7), None);
        assert_eq!(ErrorCode::classify(sys::NO_ERROR), None);
    }

    #[test]
    fn test_null_description_is_absent() {
        let info = unsafe { ErrorInfo::from_raw(sys::INVALID_ENUM, ptr::null()) };
        assert_eq!(info.classification, Some(ErrorCode::InvalidEnum));
        assert!(info.description.is_none());
        assert_eq!(info.to_owned_error().description, None);
    }

    #[test]
    fn test_owned_error_copies_description() {
        let text = c"Invalid window hint 0x1234";
        let owned = unsafe { ErrorInfo::from_raw(sys::INVALID_ENUM, text.as_ptr()) }.to_owned_error();
        assert_eq!(owned.description.as_deref(), Some("Invalid window hint 0x1234"));
        assert_eq!(owned.to_string(), "invalid enum (0x10003): Invalid window hint 0x1234");
    }

    #[test]
    fn test_error_display_includes_cause() {
        let err = Error::CreationFailed {
            object: ObjectKind::Window,
            cause: Some(NativeError {
                code: 0x0001_2345,
                classification: None,
                description: None,
            }),
        };
        assert_eq!(err.to_string(), "window creation failed: unclassified error 0x12345");
    }
}
