//! End-to-end scenarios against the headless backend

use std::alloc::System;
use std::os::raw::{c_int, c_void};

use crate::config::{InitConfig, WindowConfig};
use crate::error::{Error, ErrorCode};
use crate::geometry::Size;
use crate::headless;
use crate::library::{Glfw, Library};
use crate::marshal::snapshot;

fn quiet() -> InitConfig {
    InitConfig {
        log_native_errors: false,
        ..InitConfig::default()
    }
}

fn session() -> Glfw {
    crate::logging::init_for_tests();
    headless::reset();
    Library::new(headless::api()).init(&quiet()).unwrap()
}

#[test]
fn test_resize_window() {
    let glfw = session();
    let window = glfw.create_window(&WindowConfig::new(640, 480, "resize"), None, None).unwrap();
    assert_eq!(glfw.window_size(window), Size::new(640, 480));

    glfw.set_window_size(window, Size::new(320, 200));
    assert_eq!(glfw.window_size(window), Size::new(320, 200));
}

#[test]
fn test_zero_monitors() {
    let glfw = session();
    let monitors = glfw.monitors().unwrap();
    assert_eq!(monitors.len(), 0);
    assert!(glfw.primary_monitor().is_none());
    assert!(glfw.take_last_error().is_none());
}

#[test]
fn test_query_before_init_reports_not_initialized() {
    crate::logging::init_for_tests();
    headless::reset();
    let mut library = Library::new(headless::api());

    let mut count: c_int = -1;
    // SAFETY: a query-class call with a live out-parameter.
    let monitors = unsafe { (library.api().get_monitors)(&mut count) };
    assert!(monitors.is_null());
    assert_eq!(count, 0);

    let info = library.query_last_error().unwrap();
    assert_eq!(info.classification, Some(ErrorCode::NotInitialized));
    assert_eq!(info.code, ErrorCode::NotInitialized.raw());
    assert!(info.description.is_some());
}

#[test]
fn test_error_slot_is_read_once() {
    let mut glfw = session();
    glfw.set_window_opacity(
        glfw.create_window(&WindowConfig::new(10, 10, "w"), None, None).unwrap(),
        -3.0,
    );
    assert!(glfw.query_last_error().is_some());
    assert!(glfw.query_last_error().is_none());
}

#[test]
fn test_last_error_wins() {
    let mut glfw = session();
    headless::raise_error(ErrorCode::InvalidEnum.raw(), c"first");
    headless::raise_error(0x0001_0FFF, c"second");

    let info = glfw.query_last_error().unwrap();
    assert_eq!(info.code, 0x0001_0FFF);
    assert_eq!(info.classification, None);
    assert_eq!(info.description.unwrap(), "second");
}

#[test]
fn test_user_pointer_untouched_by_geometry_queries() {
    let glfw = session();
    let window = glfw.create_window(&WindowConfig::new(200, 100, "ptr"), None, None).unwrap();
    let mut context = [0u8; 4];
    let address: *mut c_void = context.as_mut_ptr().cast();

    glfw.set_window_user_pointer(window, address);
    let before = glfw.window_user_pointer(window);
    let _ = glfw.window_frame_size(window);
    let _ = glfw.framebuffer_size(window);
    let after = glfw.window_user_pointer(window);
    assert_eq!(before, address);
    assert_eq!(after, address);
}

#[test]
fn test_snapshots_share_no_storage() {
    let source = [1u32, 2, 3];
    // SAFETY: `source` holds three readable elements.
    let first = unsafe { snapshot(source.as_ptr(), 3, System, |&v| v) }.unwrap();
    // SAFETY: as above.
    let second = unsafe { snapshot(source.as_ptr(), 3, System, |&v| v * 10) }.unwrap();
    assert_ne!(first.as_ptr(), second.as_ptr());
    drop(first);
    assert_eq!(&*second, &[10, 20, 30][..]);

    // SAFETY: a null source is always accepted.
    let empty = unsafe { snapshot(std::ptr::null::<u32>(), 0, System, |&v| v) }.unwrap();
    assert!(empty.is_empty());
    assert!(!empty.as_ptr().is_null());
}

#[test]
fn test_failed_init_carries_cause() {
    crate::logging::init_for_tests();
    headless::reset();
    headless::fail_next_init();
    match Library::new(headless::api()).init(&quiet()) {
        Err(Error::InitializationFailed(Some(cause))) => {
            assert_eq!(cause.classification, Some(ErrorCode::PlatformError));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!headless::is_initialized());
}

#[test]
fn test_dropping_session_terminates() {
    let glfw = session();
    let _window = glfw.create_window(&WindowConfig::new(32, 32, "drop"), None, None).unwrap();
    assert!(headless::is_initialized());
    drop(glfw);
    assert!(!headless::is_initialized());
}

#[test]
fn test_close_request_through_callback_and_poll() {
    extern "C" fn on_close(window: crate::handle::WindowHandle) {
        let hits = headless::window_user_pointer(window).cast::<u32>();
        // SAFETY: the test stores a live `u32` in the user pointer.
        unsafe { *hits += 1 };
    }

    let glfw = session();
    let window = glfw.create_window(&WindowConfig::new(32, 32, "close"), None, None).unwrap();
    let mut hits = 0u32;
    glfw.set_window_user_pointer(window, std::ptr::from_mut(&mut hits).cast());
    glfw.set_window_close_callback(window, Some(on_close));

    headless::request_close(window);
    assert!(!glfw.window_should_close(window));
    glfw.poll_events();
    assert!(glfw.window_should_close(window));
    glfw.set_window_user_pointer(window, std::ptr::null_mut());
    assert_eq!(hits, 1);
}

#[test]
fn test_custom_snapshot_allocator() {
    #[derive(Clone, Copy)]
    struct Passthrough;

    // SAFETY: forwards to the system allocator unchanged.
    unsafe impl std::alloc::GlobalAlloc for Passthrough {
        unsafe fn alloc(&self, layout: std::alloc::Layout) -> *mut u8 {
            // SAFETY: forwarded from the caller.
            unsafe { System.alloc(layout) }
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: std::alloc::Layout) {
            // SAFETY: forwarded from the caller.
            unsafe { System.dealloc(ptr, layout) }
        }
    }

    headless::reset();
    let glfw = Library::new(headless::api())
        .init_with_allocator(&quiet(), Passthrough)
        .unwrap();
    headless::connect_monitor(headless::SimulatedMonitor::default());
    let monitors = glfw.monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    let modes = glfw.video_modes(monitors[0]).unwrap();
    approx::assert_relative_eq!(modes[1].width as f32 / modes[1].height as f32, 16.0 / 9.0, epsilon = 1e-3);
}

#[test]
fn test_borrowed_text_copied_before_invalidation() {
    let mut glfw = session();
    let window = glfw.create_window(&WindowConfig::new(32, 32, "clip"), None, None).unwrap();

    glfw.set_clipboard_string(window, "AAAAAAAA").unwrap();
    let before = glfw.clipboard_string(window).unwrap().to_string_lossy().into_owned();
    glfw.set_clipboard_string(window, "BBBBBBBB").unwrap();
    assert_eq!(before, "AAAAAAAA");
    assert_eq!(glfw.clipboard_string(window).unwrap(), "BBBBBBBB");

    let monitor = headless::connect_monitor(headless::SimulatedMonitor::default());
    glfw.poll_events();
    let name = glfw.monitor_name(monitor).unwrap().to_string_lossy().into_owned();
    headless::disconnect_monitor(monitor);
    glfw.poll_events();
    assert_eq!(name, "Headless Display");
    assert!(glfw.monitors().unwrap().is_empty());
}

#[test]
fn test_one_session_per_thread() {
    let glfw = session();
    let window = glfw.create_window(&WindowConfig::new(32, 32, "only"), None, None).unwrap();
    assert!(matches!(
        Library::new(headless::api()).init(&quiet()),
        Err(Error::AlreadyInitialized)
    ));
    assert!(!glfw.window_should_close(window));
    assert!(glfw.take_last_error().is_none());
}
