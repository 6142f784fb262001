use std::cell::Cell;

use crate::float::Float;

use super::BytecodeTape;

thread_local! {
    static TAPE_F32: Cell<*mut BytecodeTape<f32>> = const { Cell::new(std::ptr::null_mut()) };
    static TAPE_F64: Cell<*mut BytecodeTape<f64>> = const { Cell::new(std::ptr::null_mut()) };
}

/// Trait to select the correct thread-local for a given float type.
///
/// Implemented for `f32` and `f64`, enabling `Active<F>` to record onto
/// tapes over these base types.
pub trait TapeThreadLocal: Float {
    fn tape_cell() -> &'static std::thread::LocalKey<Cell<*mut BytecodeTape<Self>>>;
}

impl TapeThreadLocal for f32 {
    fn tape_cell() -> &'static std::thread::LocalKey<Cell<*mut BytecodeTape<Self>>> {
        &TAPE_F32
    }
}

impl TapeThreadLocal for f64 {
    fn tape_cell() -> &'static std::thread::LocalKey<Cell<*mut BytecodeTape<Self>>> {
        &TAPE_F64
    }
}

/// Whether this thread currently records onto a tape over `F`.
#[inline]
pub fn is_recording<F: TapeThreadLocal>() -> bool {
    F::tape_cell().with(|cell| !cell.get().is_null())
}

/// Access the active bytecode tape for the current thread.
///
/// # Panics
///
/// Panics if no tape is active: arithmetic on a tracked `Active` value
/// outside its recording is a caller bug.
#[inline]
pub fn with_active_tape<F: TapeThreadLocal, R>(f: impl FnOnce(&mut BytecodeTape<F>) -> R) -> R {
    F::tape_cell().with(|cell| {
        let ptr = cell.get();
        assert!(
            !ptr.is_null(),
            "No active tape. Tracked values can only be combined inside a Recording."
        );
        // SAFETY: `Recording` keeps the tape boxed at a stable address and
        // clears this pointer before the box is released; the pointer is only
        // reachable from the owning thread.
        let tape = unsafe { &mut *ptr };
        f(tape)
    })
}

/// Install `tape` as this thread's active tape. Returns `false` (and leaves
/// the slot untouched) if another tape is already active.
pub(super) fn activate<F: TapeThreadLocal>(tape: *mut BytecodeTape<F>) -> bool {
    F::tape_cell().with(|cell| {
        if !cell.get().is_null() {
            return false;
        }
        cell.set(tape);
        true
    })
}

/// Clear this thread's active tape if it is `tape`.
pub(super) fn deactivate<F: TapeThreadLocal>(tape: *mut BytecodeTape<F>) {
    F::tape_cell().with(|cell| {
        if cell.get() == tape {
            cell.set(std::ptr::null_mut());
        }
    });
}
