//! Library lifecycle and the session façade
//!
//! [`Library`] is the surface available before initialization: version
//! queries, the error slot and the error callback. [`Library::init`] turns it
//! into a [`Glfw`] session, through which every other operation is reached.
//! Both are `!Send` and `!Sync`: the native library must be driven from the
//! thread that initialized it. The few calls the native library allows from
//! any thread are split out into [`RawTimer`] and [`EventPoster`].

use std::alloc::System;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::time::Duration;

use crate::callback::{log_native_errors, ErrorFn};
use crate::config::InitConfig;
use crate::error::{query_last_error, take_last_error, Error, ErrorInfo, NativeError, Result};
use crate::geometry::Version;
use crate::marshal::{borrow, BorrowedStr, SnapshotAlloc};
use crate::native::NativeApi;
use crate::sys;

/// The native library before initialization.
pub struct Library {
    api: &'static NativeApi,
    _main_thread: PhantomData<*const ()>,
}

impl Library {
    /// Wrap a native function table.
    pub fn new(api: &'static NativeApi) -> Self {
        Self {
            api,
            _main_thread: PhantomData,
        }
    }

    /// The linked GLFW library.
    pub fn glfw() -> Self {
        Self::new(NativeApi::glfw())
    }

    /// The native function table in use.
    pub fn api(&self) -> &'static NativeApi {
        self.api
    }

    /// Version of the native library.
    pub fn version(&self) -> Version {
        let (mut major, mut minor, mut revision) = (0, 0, 0);
        // SAFETY: callable at any time; out-pointers refer to live locals.
        unsafe { (self.api.get_version)(&mut major, &mut minor, &mut revision) };
        Version { major, minor, revision }
    }

    /// Compile-time version string of the native library.
    pub fn version_string(&self) -> Option<BorrowedStr<'static>> {
        // SAFETY: the native library returns a static string.
        unsafe { borrow((self.api.get_version_string)()) }
    }

    /// Read and clear the native error slot.
    ///
    /// Returns `None` when no error is pending. The borrowed description keeps
    /// `self` mutably borrowed, so no further native call can invalidate it
    /// while it is in use.
    pub fn query_last_error(&mut self) -> Option<ErrorInfo<'_>> {
        // SAFETY: `'_` is tied to an exclusive borrow of the session.
        unsafe { query_last_error(self.api) }
    }

    /// Read and clear the native error slot, copying the description.
    pub fn take_last_error(&self) -> Option<NativeError> {
        take_last_error(self.api)
    }

    /// Install the global error callback, returning the previous one.
    ///
    /// The callback runs on the thread that triggered the error, before the
    /// failing call returns. The error slot is filled regardless.
    pub fn set_error_callback(&self, callback: Option<ErrorFn>) -> Option<ErrorFn> {
        // SAFETY: `ErrorFn` differs from the native pointer type only in taking
        // `Option<BorrowedStr>`, which has the ABI of `const char *`.
        unsafe {
            let native = std::mem::transmute::<Option<ErrorFn>, Option<sys::GLFWerrorfun>>(callback);
            let previous = (self.api.set_error_callback)(native);
            std::mem::transmute::<Option<sys::GLFWerrorfun>, Option<ErrorFn>>(previous)
        }
    }

    /// Thread-safe handle to the raw monotonic timer.
    pub fn raw_timer(&self) -> RawTimer {
        RawTimer { api: self.api }
    }

    /// Initialize the native library with the default snapshot allocator.
    pub fn init(self, config: &InitConfig) -> Result<Glfw> {
        self.init_with_allocator(config, System)
    }

    /// Initialize the native library, allocating owned snapshots with `alloc`.
    ///
    /// Only one session per native library can be alive at a time; a second
    /// `init` fails with [`Error::AlreadyInitialized`] and leaves the live
    /// session untouched.
    pub fn init_with_allocator<A: SnapshotAlloc>(self, config: &InitConfig, alloc: A) -> Result<Glfw<A>> {
        if !(self.api.claim_session)() {
            log::warn!("Refusing to initialize: a session is already alive");
            return Err(Error::AlreadyInitialized);
        }
        config.apply(self.api);
        if config.log_native_errors {
            self.set_error_callback(Some(log_native_errors as ErrorFn));
        }

        // SAFETY: called on the thread that owns this `Library`.
        if unsafe { (self.api.init)() } == sys::FALSE {
            let cause = self.take_last_error();
            (self.api.release_session)();
            log::error!("Native initialization failed: {cause:?}");
            return Err(Error::InitializationFailed(cause));
        }

        log::debug!("Native library {} initialized", self.version());
        Ok(Glfw { library: self, alloc })
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library").field("api", self.api).finish()
    }
}

/// An initialized native library session.
///
/// Dropping the session terminates the native library, destroying every
/// remaining window and cursor. Values borrowed from the session cannot
/// outlive it.
///
/// # Handle validity
///
/// Methods taking a [`WindowHandle`](crate::WindowHandle),
/// [`MonitorHandle`](crate::MonitorHandle) or
/// [`CursorHandle`](crate::CursorHandle) are safe to call, but the handle must
/// still be live: created by this session and not yet destroyed, or for
/// monitors, not yet reported disconnected. Handles are `Copy` and carry no
/// liveness; passing a stale one is undefined behaviour inside the native
/// library, exactly as in C.
pub struct Glfw<A: SnapshotAlloc = System> {
    library: Library,
    alloc: A,
}

impl<A: SnapshotAlloc> Deref for Glfw<A> {
    type Target = Library;

    fn deref(&self) -> &Library {
        &self.library
    }
}

impl<A: SnapshotAlloc> DerefMut for Glfw<A> {
    fn deref_mut(&mut self) -> &mut Library {
        &mut self.library
    }
}

impl<A: SnapshotAlloc> Glfw<A> {
    /// Allocator used for owned snapshots.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub(crate) fn snapshot_alloc(&self) -> A {
        self.alloc.clone()
    }

    /// Build the error for a native call that returned its failure value,
    /// draining the error slot into the cause.
    pub(crate) fn call_failed(&self, call: &'static str) -> Error {
        let cause = self.take_last_error();
        log::warn!("{call} failed: {cause:?}");
        Error::CallFailed { call, cause }
    }

    /// Process pending events and return immediately.
    pub fn poll_events(&self) {
        // SAFETY: main-thread call on an initialized library.
        unsafe { (self.api().poll_events)() };
    }

    /// Block until at least one event is available, then process events.
    pub fn wait_events(&self) {
        // SAFETY: main-thread call on an initialized library.
        unsafe { (self.api().wait_events)() };
    }

    /// Like [`Glfw::wait_events`], but return after `timeout` at the latest.
    pub fn wait_events_timeout(&self, timeout: Duration) {
        // SAFETY: main-thread call; a `Duration` is never negative or NaN.
        unsafe { (self.api().wait_events_timeout)(timeout.as_secs_f64()) };
    }

    /// Wake a thread blocked in [`Glfw::wait_events`].
    pub fn post_empty_event(&self) {
        self.event_poster().post();
    }

    /// Thread-safe handle for waking the event loop from other threads.
    pub fn event_poster(&self) -> EventPoster {
        EventPoster { api: self.api() }
    }

    /// Seconds since initialization or the last [`Glfw::set_time`].
    pub fn time(&self) -> f64 {
        // SAFETY: initialized library.
        unsafe { (self.api().get_time)() }
    }

    /// Reset the library timer.
    pub fn set_time(&self, seconds: f64) {
        // SAFETY: initialized library; out-of-range values are reported via
        // the error slot.
        unsafe { (self.api().set_time)(seconds) };
    }

    /// Terminate the native library and hand back the pre-init surface.
    pub fn terminate(self) -> Library {
        let api = self.api();
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used again; the allocator is dropped exactly once.
        unsafe {
            (api.terminate)();
            ptr::drop_in_place(&mut this.alloc);
        }
        (api.release_session)();
        log::debug!("Native library terminated");
        Library::new(api)
    }
}

impl<A: SnapshotAlloc> Drop for Glfw<A> {
    fn drop(&mut self) {
        // SAFETY: the session owns the initialization.
        unsafe { (self.api().terminate)() };
        (self.api().release_session)();
        log::debug!("Native library terminated");
    }
}

impl<A: SnapshotAlloc> std::fmt::Debug for Glfw<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glfw").field("library", &self.library).finish_non_exhaustive()
    }
}

/// Raw monotonic timer, callable from any thread.
#[derive(Debug, Clone, Copy)]
pub struct RawTimer {
    api: &'static NativeApi,
}

impl RawTimer {
    /// Current raw timer value, in ticks.
    pub fn value(&self) -> u64 {
        // SAFETY: documented as thread-safe.
        unsafe { (self.api.get_timer_value)() }
    }

    /// Ticks per second.
    pub fn frequency(&self) -> u64 {
        // SAFETY: documented as thread-safe.
        unsafe { (self.api.get_timer_frequency)() }
    }

    /// Time between two raw values taken from this timer.
    pub fn elapsed(&self, start: u64, end: u64) -> Duration {
        match self.frequency() {
            0 => Duration::ZERO,
            frequency => Duration::from_secs_f64(end.saturating_sub(start) as f64 / frequency as f64),
        }
    }
}

/// Posts empty events to wake the event loop; callable from any thread.
#[derive(Debug, Clone, Copy)]
pub struct EventPoster {
    api: &'static NativeApi,
}

impl EventPoster {
    /// Post an empty event.
    pub fn post(&self) {
        // SAFETY: documented as thread-safe.
        unsafe { (self.api.post_empty_event)() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use crate::error::ErrorCode;
    use crate::geometry::Size;
    use crate::headless;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_thread_safe_handles() {
        assert_send_sync::<RawTimer>();
        assert_send_sync::<EventPoster>();
    }

    #[test]
    fn test_init_and_terminate() {
        headless::reset();
        let glfw = Library::new(headless::api()).init(&InitConfig::default()).unwrap();
        assert!(headless::is_initialized());
        let library = glfw.terminate();
        assert!(!headless::is_initialized());
        assert!(library.take_last_error().is_none());
    }

    #[test]
    fn test_drop_terminates() {
        headless::reset();
        {
            let _glfw = Library::new(headless::api()).init(&InitConfig::default()).unwrap();
            assert!(headless::is_initialized());
        }
        assert!(!headless::is_initialized());
    }

    #[test]
    fn test_second_session_is_refused() {
        headless::reset();
        let glfw = Library::new(headless::api()).init(&InitConfig::default()).unwrap();
        let window = glfw.create_window(&WindowConfig::new(64, 64, "first"), None, None).unwrap();
        glfw.set_clipboard_string(window, "kept").unwrap();

        match Library::new(headless::api()).init(&InitConfig::default()) {
            Err(Error::AlreadyInitialized) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(headless::is_initialized());
        assert_eq!(glfw.window_size(window), Size::new(64, 64));
        assert_eq!(headless::window_title(window).as_deref(), Some("first"));

        drop(glfw);
        assert!(Library::new(headless::api()).init(&InitConfig::default()).is_ok());
    }

    #[test]
    fn test_terminate_releases_session() {
        headless::reset();
        let glfw = Library::new(headless::api()).init(&InitConfig::default()).unwrap();
        let glfw = glfw.terminate().init(&InitConfig::default()).unwrap();
        assert!(headless::is_initialized());
        drop(glfw);
    }

    #[test]
    fn test_failed_init_releases_session() {
        headless::reset();
        headless::fail_next_init();
        assert!(Library::new(headless::api()).init(&InitConfig::default()).is_err());
        assert!(Library::new(headless::api()).init(&InitConfig::default()).is_ok());
    }

    #[test]
    fn test_init_failure_carries_cause() {
        headless::reset();
        headless::fail_next_init();
        let err = Library::new(headless::api()).init(&InitConfig::default()).unwrap_err();
        match err {
            Error::InitializationFailed(Some(cause)) => {
                assert_eq!(cause.classification, Some(ErrorCode::PlatformError));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_version_is_available_before_init() {
        headless::reset();
        let library = Library::new(headless::api());
        assert_eq!(library.version().major, 3);
        let text = library.version_string().unwrap();
        assert!(text.to_str().unwrap().starts_with("3.3"));
    }

    #[test]
    fn test_time_can_be_reset() {
        headless::reset();
        let glfw = Library::new(headless::api()).init(&InitConfig::default()).unwrap();
        glfw.set_time(10.0);
        let now = glfw.time();
        assert!((10.0..11.0).contains(&now));
    }

    #[test]
    fn test_time_set_ahead_of_process_clock() {
        headless::reset();
        let glfw = Library::new(headless::api()).init(&InitConfig::default()).unwrap();
        glfw.set_time(86_400.0);
        let now = glfw.time();
        assert!((86_400.0..86_401.0).contains(&now));
        glfw.set_time(0.0);
        assert!(glfw.time() < 1.0);
    }

    #[test]
    fn test_raw_timer_from_another_thread() {
        let timer = Library::new(headless::api()).raw_timer();
        let handle = std::thread::spawn(move || (timer.value(), timer.frequency()));
        let (value, frequency) = handle.join().unwrap();
        assert!(frequency > 0);
        assert!(timer.value() >= value);
        assert_eq!(timer.elapsed(0, frequency), Duration::from_secs(1));
    }
}
