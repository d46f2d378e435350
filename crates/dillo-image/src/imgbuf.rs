//! The reference-counted row store a [`crate::dicache::DicacheEntry`]
//! decodes into and a viewer blits out of.

use std::cell::RefCell;
use std::rc::Rc;

/// A two-dimensional store of 24-bit RGB rows, shared between a
/// decoding [`crate::dicache::DicacheEntry`] and every attached viewer.
///
/// Allocation failure for the backing row store is treated as fatal to
/// the process (matching the source, which calls `MSG_ERR` then aborts
/// rather than letting a partially-allocated image corrupt later
/// drawing) rather than returned as a recoverable error.
pub struct ImgBuf {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    width: u32,
    height: u32,
    rows: Vec<Box<[u8]>>,
}

impl ImgBuf {
    /// Allocates a buffer for `width x height` RGB rows. Aborts the
    /// process if the backing allocation fails.
    pub fn new(width: u32, height: u32) -> ImgBuf {
        let row_bytes = width as usize * 3;
        let mut rows = Vec::new();
        if rows.try_reserve_exact(height as usize).is_err() {
            std::process::abort();
        }
        for _ in 0..height {
            let mut row = Vec::new();
            if row.try_reserve_exact(row_bytes).is_err() {
                std::process::abort();
            }
            row.resize(row_bytes, 0);
            rows.push(row.into_boxed_slice());
        }
        ImgBuf { inner: Rc::new(RefCell::new(Inner { width, height, rows })) }
    }

    pub fn width(&self) -> u32 {
        self.inner.borrow().width
    }

    pub fn height(&self) -> u32 {
        self.inner.borrow().height
    }

    /// Overwrites row `y` with `rgb`, which must be exactly `width * 3`
    /// bytes. Out-of-range `y` or a mismatched length is a caller bug.
    pub fn copy_row(&self, y: u32, rgb: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        let expected = inner.width as usize * 3;
        assert_eq!(rgb.len(), expected, "row byte length must match width*3");
        assert!(y < inner.height, "row index out of bounds");
        inner.rows[y as usize].copy_from_slice(rgb);
    }

    pub fn row(&self, y: u32) -> Box<[u8]> {
        self.inner.borrow().rows[y as usize].clone()
    }

    /// The number of outstanding handles to this buffer, including `self`.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Whether `self` is the last surviving handle.
    pub fn last_reference(&self) -> bool {
        self.ref_count() == 1
    }
}

impl Clone for ImgBuf {
    fn clone(&self) -> ImgBuf {
        ImgBuf { inner: Rc::clone(&self.inner) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_zeroed() {
        let buf = ImgBuf::new(2, 2);
        assert_eq!(&*buf.row(0), &[0u8; 6][..]);
    }

    #[test]
    fn copy_row_round_trips() {
        let buf = ImgBuf::new(2, 1);
        buf.copy_row(0, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&*buf.row(0), &[1, 2, 3, 4, 5, 6][..]);
    }

    #[test]
    fn clone_shares_storage() {
        let a = ImgBuf::new(1, 1);
        let b = a.clone();
        a.copy_row(0, &[9, 9, 9]);
        assert_eq!(&*b.row(0), &[9, 9, 9][..]);
        assert_eq!(a.ref_count(), 2);
    }

    #[test]
    fn last_reference_detects_sole_owner() {
        let a = ImgBuf::new(1, 1);
        assert!(a.last_reference());
        let b = a.clone();
        assert!(!a.last_reference());
        drop(b);
        assert!(a.last_reference());
    }
}
