//! String and array marshaling
//!
//! Native memory crosses the boundary under one of two ownership regimes, and
//! each has its own type:
//!
//! - [`BorrowedStr`]: a view of a NUL-terminated string owned by the native
//!   library. Never freed here; valid only inside the window the native
//!   contract documents for the call that produced it.
//! - [`OwnedSlice`]: a heap copy taken at one point in time from a native array,
//!   allocated through an injectable [`GlobalAlloc`]. Owned by the caller and
//!   independent of native lifetime.
//!
//! The two axes combine: `OwnedSlice<BorrowedStr<'a>>` is an owned array whose
//! elements still point at native text.

use std::alloc::{GlobalAlloc, Layout, System};
use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};
use std::str::Utf8Error;

use crate::error::{Error, Result};

/// Borrowed, NUL-terminated native string.
///
/// Thin and `#[repr(transparent)]` over a non-null `char` pointer, so
/// `Option<BorrowedStr>` has the same ABI as `const char *`. The length is
/// found by scanning to the terminator on access; nothing is copied.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct BorrowedStr<'a> {
    ptr: NonNull<c_char>,
    _native: PhantomData<&'a CStr>,
}

impl<'a> BorrowedStr<'a> {
    /// View the text as a `CStr`.
    pub fn as_c_str(&self) -> &'a CStr {
        // SAFETY: construction guarantees a valid NUL-terminated string for `'a`.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// View the text as UTF-8.
    pub fn to_str(&self) -> std::result::Result<&'a str, Utf8Error> {
        self.as_c_str().to_str()
    }

    /// UTF-8 view, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        self.as_c_str().to_string_lossy()
    }

    /// Byte length, excluding the terminator.
    pub fn len(&self) -> usize {
        self.as_c_str().to_bytes().len()
    }

    /// Whether the string is empty (present but zero-length).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw native pointer.
    pub fn as_ptr(&self) -> *const c_char {
        self.ptr.as_ptr()
    }
}

impl fmt::Debug for BorrowedStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_c_str(), f)
    }
}

impl fmt::Display for BorrowedStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl PartialEq<str> for BorrowedStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_c_str().to_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for BorrowedStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

/// Borrow a native string. Null yields `None`; an empty string yields a
/// present, zero-length view.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid and
/// unmodified for `'a`.
pub unsafe fn borrow<'a>(ptr: *const c_char) -> Option<BorrowedStr<'a>> {
    NonNull::new(ptr.cast_mut()).map(|ptr| BorrowedStr {
        ptr,
        _native: PhantomData,
    })
}

/// Allocators usable for owned snapshots.
pub trait SnapshotAlloc: GlobalAlloc + Clone {}

impl<A: GlobalAlloc + Clone> SnapshotAlloc for A {}

/// Heap copy of a native array, owned by the caller.
///
/// Always backed by a valid pointer, even when empty. Dropping it releases the
/// memory through the allocator it was created with.
pub struct OwnedSlice<T: Copy, A: SnapshotAlloc = System> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: A,
}

// SAFETY: the slice exclusively owns its elements and allocator handle.
unsafe impl<T: Copy + Send, A: SnapshotAlloc + Send> Send for OwnedSlice<T, A> {}
// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: Copy + Sync, A: SnapshotAlloc + Sync> Sync for OwnedSlice<T, A> {}

impl<T: Copy, A: SnapshotAlloc> OwnedSlice<T, A> {
    /// An empty slice; allocates nothing.
    pub fn empty(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
        }
    }

    fn with_capacity(count: usize, alloc: A) -> Result<Self> {
        let failed = || Error::AllocationFailed {
            count,
            elem_size: std::mem::size_of::<T>(),
        };
        let layout = Layout::array::<T>(count).map_err(|_| failed())?;
        if layout.size() == 0 {
            let mut slice = Self::empty(alloc);
            slice.cap = count;
            return Ok(slice);
        }
        // SAFETY: `layout` has non-zero size.
        let raw = unsafe { alloc.alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or_else(failed)?;
        Ok(Self {
            ptr,
            len: 0,
            cap: count,
            alloc,
        })
    }

    fn push_within_capacity(&mut self, value: T) {
        debug_assert!(self.len < self.cap);
        // SAFETY: `len < cap` and the buffer holds `cap` elements.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Copy into a `Vec` on the global heap.
    pub fn to_vec(&self) -> Vec<T> {
        self.deref().to_vec()
    }

    /// The allocator backing this slice.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<T: Copy, A: SnapshotAlloc> Deref for OwnedSlice<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: the first `len` elements are initialized; the pointer is
        // dangling-but-aligned when nothing was allocated.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy, A: SnapshotAlloc> Drop for OwnedSlice<T, A> {
    fn drop(&mut self) {
        let Ok(layout) = Layout::array::<T>(self.cap) else {
            return;
        };
        if layout.size() != 0 {
            // SAFETY: allocated by `self.alloc` with this exact layout.
            unsafe { self.alloc.dealloc(self.ptr.as_ptr().cast(), layout) };
        }
    }
}

impl<T: Copy + fmt::Debug, A: SnapshotAlloc> fmt::Debug for OwnedSlice<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy + PartialEq, A: SnapshotAlloc> PartialEq<[T]> for OwnedSlice<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.deref() == other
    }
}

impl<'s, T: Copy, A: SnapshotAlloc> IntoIterator for &'s OwnedSlice<T, A> {
    type Item = &'s T;
    type IntoIter = std::slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Copy `count` elements out of a native array into a new [`OwnedSlice`].
///
/// A null array or a non-positive count yields an empty slice: "no items" is a
/// normal outcome, not an error. Allocation failure is the only failure.
///
/// # Safety
/// When `src` is non-null and `count > 0`, `src` must point to `count`
/// readable, initialized elements.
pub unsafe fn snapshot<S, T, A>(
    src: *const S,
    count: impl Into<i64>,
    alloc: A,
    mut copy: impl FnMut(&S) -> T,
) -> Result<OwnedSlice<T, A>>
where
    T: Copy,
    A: SnapshotAlloc,
{
    let count = count.into();
    if count <= 0 || src.is_null() {
        return Ok(OwnedSlice::empty(alloc));
    }
    let count = usize::try_from(count).map_err(|_| Error::AllocationFailed {
        count: usize::MAX,
        elem_size: std::mem::size_of::<T>(),
    })?;
    let mut slice = OwnedSlice::with_capacity(count, alloc)?;
    for i in 0..count {
        // SAFETY: `i < count` and the caller guarantees `count` readable elements.
        let element = unsafe { &*src.add(i) };
        slice.push_within_capacity(copy(element));
    }
    log::trace!("snapshot of {count} x {} bytes", std::mem::size_of::<T>());
    Ok(slice)
}

/// Snapshot an array of native string pointers: the array is owned, each
/// string stays borrowed. Null entries are kept out of the result.
///
/// # Safety
/// As for [`snapshot`], and every non-null entry must satisfy the contract of
/// [`borrow`] for `'a`.
pub unsafe fn snapshot_strings<'a, A: SnapshotAlloc>(
    src: *const *const c_char,
    count: impl Into<i64>,
    alloc: A,
) -> Result<OwnedSlice<BorrowedStr<'a>, A>> {
    let count = count.into();
    if count <= 0 || src.is_null() {
        return Ok(OwnedSlice::empty(alloc));
    }
    let count = count as usize;
    // SAFETY: `src` holds `count` readable entries.
    let entries = unsafe { std::slice::from_raw_parts(src, count) };
    let present = entries.iter().filter(|entry| !entry.is_null()).count();
    let mut slice = OwnedSlice::with_capacity(present, alloc)?;
    for &entry in entries {
        // SAFETY: non-null entries satisfy `borrow`'s contract.
        if let Some(text) = unsafe { borrow(entry) } {
            slice.push_within_capacity(text);
        }
    }
    log::trace!("snapshot of {present} borrowed strings");
    Ok(slice)
}

/// Encode a Rust string for a native call.
pub(crate) fn to_c_string(text: &str) -> Result<std::ffi::CString> {
    Ok(std::ffi::CString::new(text)?)
}

/// Pointer to an optional C string; `None` becomes null.
pub(crate) fn opt_ptr(text: Option<&std::ffi::CString>) -> *const c_char {
    text.map_or(ptr::null(), |t| t.as_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Allocator that counts live allocations.
    #[derive(Clone, Default)]
    struct CountingAlloc {
        live: Arc<AtomicUsize>,
        fail: bool,
    }

    unsafe impl GlobalAlloc for CountingAlloc {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            if self.fail {
                return ptr::null_mut();
            }
            self.live.fetch_add(1, Ordering::SeqCst);
            unsafe { System.alloc(layout) }
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            self.live.fetch_sub(1, Ordering::SeqCst);
            unsafe { System.dealloc(ptr, layout) }
        }
    }

    #[test]
    fn test_borrow_null_is_absent() {
        assert!(unsafe { borrow(ptr::null()) }.is_none());
    }

    #[test]
    fn test_borrow_empty_is_present() {
        let empty = unsafe { borrow(c"".as_ptr()) }.unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty, "");
    }

    #[test]
    fn test_borrow_scans_to_terminator() {
        let text = unsafe { borrow(c"Generic Monitor".as_ptr()) }.unwrap();
        assert_eq!(text.len(), 15);
        assert_eq!(text.to_str().unwrap(), "Generic Monitor");
        assert_eq!(text.to_string(), "Generic Monitor");
    }

    #[test]
    fn test_snapshot_zero_count_is_empty() {
        let src = [1u32, 2, 3];
        let slice = unsafe { snapshot(src.as_ptr(), 0, System, |&v| v) }.unwrap();
        assert!(slice.is_empty());
        assert!(!slice.as_ptr().is_null());

        let slice = unsafe { snapshot(ptr::null::<u32>(), 5, System, |&v| v) }.unwrap();
        assert!(slice.is_empty());

        let slice = unsafe { snapshot(src.as_ptr(), -1, System, |&v| v) }.unwrap();
        assert!(slice.is_empty());
    }

    #[test]
    fn test_snapshot_copies_elements() {
        let src = [3i32, 1, 4, 1, 5];
        let slice = unsafe { snapshot(src.as_ptr(), 5, System, |&v| v * 2) }.unwrap();
        assert_eq!(&*slice, &[6, 2, 8, 2, 10]);
    }

    #[test]
    fn test_snapshots_do_not_share_storage() {
        let alloc = CountingAlloc::default();
        let src = [10u16, 20, 30];
        let first = unsafe { snapshot(src.as_ptr(), 3, alloc.clone(), |&v| v) }.unwrap();
        let second = unsafe { snapshot(src.as_ptr(), 3, alloc.clone(), |&v| v) }.unwrap();
        assert_ne!(first.as_ptr(), second.as_ptr());
        assert_eq!(alloc.live.load(Ordering::SeqCst), 2);

        drop(first);
        assert_eq!(alloc.live.load(Ordering::SeqCst), 1);
        assert_eq!(&*second, &[10, 20, 30]);

        let third = unsafe { snapshot(src.as_ptr(), 2, alloc.clone(), |&v| v + 1) }.unwrap();
        assert_eq!(&*third, &[11, 21]);
        drop(second);
        drop(third);
        assert_eq!(alloc.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_snapshot_allocates_nothing() {
        let alloc = CountingAlloc::default();
        let slice = unsafe { snapshot(ptr::null::<f32>(), 0, alloc.clone(), |&v| v) }.unwrap();
        assert_eq!(alloc.live.load(Ordering::SeqCst), 0);
        drop(slice);
        assert_eq!(alloc.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let alloc = CountingAlloc {
            fail: true,
            ..CountingAlloc::default()
        };
        let src = [1u64, 2];
        let result = unsafe { snapshot(src.as_ptr(), 2, alloc, |&v| v) };
        assert!(matches!(
            result,
            Err(Error::AllocationFailed { count: 2, elem_size: 8 })
        ));
    }

    #[test]
    fn test_snapshot_strings_keeps_text_borrowed() {
        let names = [c"VK_KHR_surface".as_ptr(), c"VK_KHR_xcb_surface".as_ptr()];
        let slice = unsafe { snapshot_strings(names.as_ptr(), 2u32, System) }.unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].as_ptr(), names[0]);
        assert_eq!(slice[1], "VK_KHR_xcb_surface");
    }

    #[test]
    fn test_snapshot_strings_skips_null_entries() {
        let names = [c"a.png".as_ptr(), ptr::null(), c"b.png".as_ptr()];
        let slice = unsafe { snapshot_strings(names.as_ptr(), 3, System) }.unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[1], "b.png");
    }
}
