//! # glfw_marshal
//!
//! A memory-safe marshaling layer over the GLFW C API.
//!
//! ## Features
//!
//! - **Typed handles**: windows, monitors and cursors as `Copy` address-identity
//!   handles, ABI-identical to the native pointers
//! - **Error bridge**: the native read-once error slot as [`ErrorInfo`], plus a
//!   crate-wide [`Error`] that keeps native, allocation and creation failures apart
//! - **Explicit ownership**: native strings come back as [`BorrowedStr`], native
//!   arrays as [`OwnedSlice`] snapshots made through an injectable allocator
//! - **Geometry adapters**: every multi-out-parameter query returns one aggregate
//! - **Typed callbacks**: one fixed `extern "C"` shape per event kind, each
//!   setter returning the previous registration
//! - **Headless backend** (feature `headless`): an in-process simulation of the
//!   native contract for tests and machines without a display
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glfw_marshal::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     glfw_marshal::logging::init();
//!
//!     let glfw = Library::glfw().init(&InitConfig::default())?;
//!     let window = glfw.create_window(&WindowConfig::new(640, 480, "Hello").for_vulkan(), None, None)?;
//!
//!     while !glfw.window_should_close(window) {
//!         glfw.wait_events();
//!     }
//!     glfw.destroy_window(window);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod sys;

pub mod callback;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod handle;
#[cfg(any(test, feature = "headless"))]
pub mod headless;
pub mod input;
pub mod joystick;
pub mod library;
pub mod logging;
pub mod marshal;
pub mod monitor;
pub mod native;
pub mod vulkan;
pub mod window;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorCode, ErrorInfo, NativeError, ObjectKind, Result};
pub use handle::{CursorHandle, MonitorHandle, WindowHandle};
pub use library::{EventPoster, Glfw, Library, RawTimer};
pub use marshal::{BorrowedStr, OwnedSlice, SnapshotAlloc};
pub use native::NativeApi;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        callback::{ConnectionEvent, DropFn, ErrorFn, JoystickFn, KeyFn, MonitorFn},
        config::{ClientApi, Config, InitConfig, OpenGlProfile, WindowConfig},
        geometry::{ContentScale, CursorPos, FrameSize, PhysicalSize, Position, Size, SizeLimits, VideoMode, Workarea},
        input::{Action, CursorMode, InputMode, Key, Modifiers, MouseButton, StandardCursor},
        joystick::{GamepadState, Joystick},
        monitor::GammaRamp,
        window::{Image, Rgba, WindowAttribute, WindowMode},
        BorrowedStr, CursorHandle, Error, ErrorCode, Glfw, Library, MonitorHandle, OwnedSlice, Result, WindowHandle,
    };
}
