//! Raw GLFW C declarations
//!
//! The prototypes, opaque object types, plain-data structs, callback pointer
//! types and constants are the ones `glfw::ffi` declares against the library
//! glfw-sys builds and links. Nothing in here is safe to call directly; the rest
//! of the crate reaches these through [`crate::native::NativeApi`].

#![allow(non_camel_case_types, non_snake_case, missing_docs)]

use std::os::raw::c_int;

pub use glfw::ffi::*;

// Error codes newer than the 3.3 header `glfw::ffi` follows. The classifier
// still has to recognise them when a newer runtime reports them.
pub const CURSOR_UNAVAILABLE: c_int = 0x0001_000B;
pub const FEATURE_UNAVAILABLE: c_int = 0x0001_000C;
pub const FEATURE_UNIMPLEMENTED: c_int = 0x0001_000D;
pub const PLATFORM_UNAVAILABLE: c_int = 0x0001_000E;
