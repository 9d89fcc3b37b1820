//! Thread-local construction frames.
//!
//! The registry opens a frame before it calls an initializer. A seal can only be
//! claimed against the innermost open frame of the current thread, which is how
//! out-of-band construction is told apart from the registry's own path.

use std::any::TypeId;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy)]
struct Frame {
    family: TypeId,
    target: TypeId,
    target_name: &'static str,
    ordinal: Option<usize>,
    claimed: bool,
}

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Outcome of a seal claim against the current thread's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// The innermost frame expects exactly this type.
    Granted { ordinal: Option<usize> },
    /// A frame is open, but for another type or family.
    Mismatch { expected: &'static str },
    /// No registration is in progress on this thread.
    Outside,
}

/// Pops its frame on drop, so a panicking initializer cannot leave one behind.
#[derive(Debug)]
pub(crate) struct FrameGuard {
    depth: usize,
}

impl FrameGuard {
    /// Whether the initializer run under this frame claimed its seal.
    pub(crate) fn claimed(&self) -> bool {
        FRAMES.with_borrow(|frames| frames.get(self.depth).is_some_and(|f| f.claimed))
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with_borrow_mut(|frames| frames.truncate(self.depth));
    }
}

pub(crate) fn enter(
    family: TypeId,
    target: TypeId,
    target_name: &'static str,
    ordinal: Option<usize>,
) -> FrameGuard {
    FRAMES.with_borrow_mut(|frames| {
        let depth = frames.len();
        frames.push(Frame { family, target, target_name, ordinal, claimed: false });
        FrameGuard { depth }
    })
}

pub(crate) fn claim(family: TypeId, target: TypeId) -> Claim {
    FRAMES.with_borrow_mut(|frames| match frames.last_mut() {
        Some(frame) if frame.family == family && frame.target == target => {
            frame.claimed = true;
            Claim::Granted { ordinal: frame.ordinal }
        },
        Some(frame) => Claim::Mismatch { expected: frame.target_name },
        None => Claim::Outside,
    })
}

/// Whether `family` is being registered further up this thread's stack.
pub(crate) fn is_registering(family: TypeId) -> bool {
    FRAMES.with_borrow(|frames| frames.iter().any(|f| f.family == family))
}
