/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Owned buffers of plain scalars, allocated on a fixed alignment boundary.
//!
//! The buffers only ever grow.  Asking for less capacity than is already
//! allocated is a no-op, so a caller that shrinks and regrows within the
//! old bound never touches the allocator.

#[macro_use]
extern crate log;
extern crate thiserror;

use ::std::alloc::{self, Layout};
use ::std::fmt;
use ::std::marker::PhantomData;
use ::std::mem;
use ::std::ops::{Deref, DerefMut};
use ::std::ptr::{self, NonNull};
use ::std::slice;

use ::thiserror::Error;

/// Alignment used when none is requested explicitly.
///
/// Set `DENSEMAT_ALIGNMENT` at compile time to override the platform default.
pub const DEFAULT_ALIGNMENT: usize = match option_env!("DENSEMAT_ALIGNMENT") {
    Some(s) => parse_alignment(s),
    None => PLATFORM_ALIGNMENT,
};

// one cache line; also enough for any AVX-512 load
#[cfg(target_arch = "x86_64")]
const PLATFORM_ALIGNMENT: usize = 64;
#[cfg(not(target_arch = "x86_64"))]
const PLATFORM_ALIGNMENT: usize = 16;

const fn parse_alignment(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut value = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < b'0' || b > b'9' {
            panic!("DENSEMAT_ALIGNMENT must be a decimal integer");
        }
        value = value * 10 + (b - b'0') as usize;
        i += 1;
    }
    if !value.is_power_of_two() {
        panic!("DENSEMAT_ALIGNMENT must be a power of two");
    }
    value
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("alignment {0} is not a power of two")]
    BadAlignment(usize),
    #[error("a buffer of {elems} elements (alignment {align}) does not fit in the address space")]
    CapacityOverflow { elems: usize, align: usize },
    #[error("out of memory while allocating {bytes} bytes (alignment {align})")]
    Exhausted { bytes: usize, align: usize },
}

/// Scalars for which the all-zero bit pattern is a valid value.
///
/// Every element of an [`AlignedBuf`] is always initialized; fresh memory
/// is zeroed, which is only sound for types like these.
pub unsafe trait Zeroable: Copy + Send + Sync + 'static {}

macro_rules! impl_zeroable {
    ($($T:ty),*) => { $( unsafe impl Zeroable for $T {} )* };
}
impl_zeroable!(f32, f64, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Owned, contiguous, aligned storage for `capacity()` elements.
///
/// Derefs to the full capacity.  Callers that track a smaller logical
/// length are expected to slice it themselves.
pub struct AlignedBuf<T: Zeroable> {
    // invariant: aligned to `align`; dangling iff cap == 0
    ptr: NonNull<T>,
    cap: usize,
    // invariant: power of two, >= align_of::<T>()
    align: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Zeroable> Send for AlignedBuf<T> {}
unsafe impl<T: Zeroable> Sync for AlignedBuf<T> {}

fn layout_for<T>(cap: usize, align: usize) -> Result<Layout, AllocError> {
    let overflow = || AllocError::CapacityOverflow { elems: cap, align };
    let bytes = cap.checked_mul(mem::size_of::<T>()).ok_or_else(overflow)?;
    Layout::from_size_align(bytes, align).map_err(|_| overflow())
}

fn effective_alignment<T>(align: usize) -> Result<usize, AllocError> {
    if !align.is_power_of_two() {
        return Err(AllocError::BadAlignment(align));
    }
    Ok(usize::max(align, mem::align_of::<T>()))
}

impl<T: Zeroable> AlignedBuf<T> {
    fn dangling(align: usize) -> Self {
        // an address equal to the alignment is trivially aligned and non-null
        let ptr = unsafe { NonNull::new_unchecked(align as *mut T) };
        AlignedBuf { ptr, cap: 0, align, _marker: PhantomData }
    }

    /// Allocate `cap` zeroed elements with the default alignment.
    pub fn zeroed(cap: usize) -> Result<Self, AllocError> {
        Self::zeroed_aligned(cap, DEFAULT_ALIGNMENT)
    }

    /// Allocate `cap` zeroed elements aligned to at least `align` bytes.
    ///
    /// Alignments smaller than the natural alignment of `T` are raised to it.
    pub fn zeroed_aligned(cap: usize, align: usize) -> Result<Self, AllocError> {
        let align = effective_alignment::<T>(align)?;
        let layout = layout_for::<T>(cap, align)?;
        if layout.size() == 0 {
            return Ok(AlignedBuf::dangling(align));
        }

        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut T)
            .ok_or(AllocError::Exhausted { bytes: layout.size(), align })?;
        Ok(AlignedBuf { ptr, cap, align, _marker: PhantomData })
    }

    pub fn capacity(&self) -> usize { self.cap }
    pub fn alignment(&self) -> usize { self.align }
    pub fn as_ptr(&self) -> *const T { self.ptr.as_ptr() }

    /// Ensure room for at least `new_cap` elements.
    ///
    /// Existing elements keep their values; the extension is zeroed.
    /// Requests at or below the current capacity do nothing.  On failure
    /// the buffer is left exactly as it was.
    pub fn grow(&mut self, new_cap: usize) -> Result<(), AllocError> {
        if new_cap <= self.cap {
            return Ok(());
        }
        let align = self.align;
        let new_layout = layout_for::<T>(new_cap, align)?;

        let raw = if self.cap == 0 {
            unsafe { alloc::alloc_zeroed(new_layout) }
        } else {
            // this layout was already validated when it was allocated
            let old_layout = unsafe {
                Layout::from_size_align_unchecked(self.cap * mem::size_of::<T>(), align)
            };
            let raw = unsafe {
                alloc::realloc(self.ptr.as_ptr() as *mut u8, old_layout, new_layout.size())
            };
            if !raw.is_null() {
                unsafe {
                    let tail = (raw as *mut T).add(self.cap);
                    ptr::write_bytes(tail, 0, new_cap - self.cap);
                }
            }
            raw
        };

        let ptr = NonNull::new(raw as *mut T)
            .ok_or(AllocError::Exhausted { bytes: new_layout.size(), align })?;
        trace!("grew aligned buffer from {} to {} elements", self.cap, new_cap);
        self.ptr = ptr;
        self.cap = new_cap;
        Ok(())
    }
}

impl<T: Zeroable> Drop for AlignedBuf<T> {
    fn drop(&mut self) {
        if self.cap == 0 {
            return;
        }
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.cap * mem::size_of::<T>(), self.align);
            alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

impl<T: Zeroable> Deref for AlignedBuf<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.cap) }
    }
}

impl<T: Zeroable> DerefMut for AlignedBuf<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.cap) }
    }
}

impl<T: Zeroable + fmt::Debug> fmt::Debug for AlignedBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AlignedBuf")
            .field("capacity", &self.cap)
            .field("alignment", &self.align)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_aligned<T>(ptr: *const T, align: usize) -> bool {
        ptr as usize % align == 0
    }

    #[test]
    fn fresh_buffers_are_zeroed_and_aligned() {
        for &align in &[8, 16, 64, 256, 4096] {
            let buf = AlignedBuf::<f64>::zeroed_aligned(37, align).unwrap();
            assert_eq!(buf.capacity(), 37);
            assert_eq!(buf.alignment(), align);
            assert!(is_aligned(buf.as_ptr(), align));
            assert!(buf.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn small_alignment_is_raised() {
        let buf = AlignedBuf::<u64>::zeroed_aligned(4, 1).unwrap();
        assert_eq!(buf.alignment(), mem::align_of::<u64>());
    }

    #[test]
    fn bad_alignment() {
        assert_eq!(
            AlignedBuf::<f32>::zeroed_aligned(4, 24).unwrap_err(),
            AllocError::BadAlignment(24),
        );
    }

    #[test]
    fn overflow_is_an_error() {
        match AlignedBuf::<f64>::zeroed(usize::max_value() / 2) {
            Err(AllocError::CapacityOverflow { .. }) => {},
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn empty_buffers_do_not_allocate() {
        let buf = AlignedBuf::<f32>::zeroed_aligned(0, 128).unwrap();
        assert_eq!(buf.len(), 0);
        assert!(is_aligned(buf.as_ptr(), 128));

        let mut buf = AlignedBuf::<u32>::zeroed(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        buf.grow(3).unwrap();
        assert_eq!(&buf[..], &[0, 0, 0]);
    }

    #[test]
    fn grow_preserves_prefix_and_zeroes_tail() {
        use ::rand::Rng;
        let mut rng = ::rand::thread_rng();

        for _ in 0..50 {
            let old = rng.gen_range(0, 100);
            let new = old + rng.gen_range(1, 100);
            let values: Vec<u32> = (0..old).map(|_| rng.gen_range(1, 1000)).collect();

            let mut buf = AlignedBuf::<u32>::zeroed_aligned(old, 32).unwrap();
            buf.copy_from_slice(&values);
            buf.grow(new).unwrap();

            assert_eq!(buf.capacity(), new);
            assert!(is_aligned(buf.as_ptr(), 32));
            assert_eq!(&buf[..old], &values[..]);
            assert!(buf[old..].iter().all(|&x| x == 0));
        }
    }

    #[test]
    fn grow_never_shrinks() {
        let mut buf = AlignedBuf::<f32>::zeroed(10).unwrap();
        buf[9] = 3.0;
        let ptr = buf.as_ptr();
        buf.grow(4).unwrap();
        buf.grow(10).unwrap();
        assert_eq!(buf.capacity(), 10);
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(buf[9], 3.0);
    }

    #[test]
    fn failed_grow_leaves_buffer_intact() {
        let mut buf = AlignedBuf::<f64>::zeroed(3).unwrap();
        buf[2] = 1.5;
        assert!(buf.grow(usize::max_value() / 4).is_err());
        assert_eq!(buf.capacity(), 3);
        assert_eq!(&buf[..], &[0.0, 0.0, 1.5]);
    }

    #[test]
    fn parse() {
        assert_eq!(parse_alignment("16"), 16);
        assert_eq!(parse_alignment("4096"), 4096);
        assert!(DEFAULT_ALIGNMENT.is_power_of_two());
    }
}
