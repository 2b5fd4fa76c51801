//! Re-entrancy guard between the model and the property panel
//!
//! While the model writes a value into the panel, the panel's own
//! value-changed notification must not be written back into the model.
//! `SyncFlag::suppress` raises the flag for the lifetime of the returned
//! guard; dropping the guard lowers it on every exit path, including early
//! returns and unwinding.

use std::cell::Cell;
use std::rc::Rc;

/// Shared suppress-sync flag
///
/// Clones observe the same flag, so widget adapters can hold one and drop
/// notifications raised by the model's own writes.
#[derive(Debug, Clone, Default)]
pub struct SyncFlag(Rc<Cell<bool>>);

impl SyncFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self) -> bool {
        self.0.get()
    }

    /// Raise the flag until the guard is dropped
    ///
    /// Nested guards restore the state they found.
    #[must_use = "the flag is lowered as soon as the guard is dropped"]
    pub fn suppress(&self) -> SuppressGuard {
        let previous = self.0.replace(true);
        SuppressGuard {
            flag: self.0.clone(),
            previous,
        }
    }
}

/// Scoped suppression; see `SyncFlag::suppress`
#[derive(Debug)]
pub struct SuppressGuard {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_scope() {
        let flag = SyncFlag::new();
        let observer = flag.clone();
        {
            let _guard = flag.suppress();
            assert!(observer.is_suppressed());
        }
        assert!(!observer.is_suppressed());
    }

    #[test]
    fn test_nested_guards_restore_outer_state() {
        let flag = SyncFlag::new();
        let outer = flag.suppress();
        {
            let _inner = flag.suppress();
        }
        assert!(flag.is_suppressed());
        drop(outer);
        assert!(!flag.is_suppressed());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let flag = SyncFlag::new();
        let inner = flag.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = inner.suppress();
            panic!("write failed");
        }));
        assert!(result.is_err());
        assert!(!flag.is_suppressed());
    }
}
