//! Account-wide call-depth lock
//!
//! Operations that hand control to an external party hold a
//! [`ReentrancyLock`] for their whole body. A nested guarded call made by that
//! party while the lock is held is refused. The lock is released when the
//! guard value is dropped, so every return path (including `?` and unwinding)
//! releases it.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::GuardError;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: Rc<Cell<bool>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_entered(&self) -> bool {
        self.entered.get()
    }

    pub fn enter(&self) -> Result<ReentrancyLock, GuardError> {
        if self.entered.replace(true) {
            return Err(GuardError::Reentrancy);
        }
        Ok(ReentrancyLock {
            entered: Rc::clone(&self.entered),
        })
    }
}

/// Held while a guarded operation runs.
#[must_use = "the lock is released as soon as it is dropped"]
#[derive(Debug)]
pub struct ReentrancyLock {
    entered: Rc<Cell<bool>>,
}

impl Drop for ReentrancyLock {
    fn drop(&mut self) {
        self.entered.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_enter_rejected() {
        let guard = ReentrancyGuard::new();
        let lock = guard.enter().unwrap();
        assert!(guard.is_entered());
        assert_eq!(guard.enter().unwrap_err(), GuardError::Reentrancy);
        // A refused attempt must not release the outer lock
        assert!(guard.is_entered());
        drop(lock);
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_released_on_error_path() {
        fn guarded(guard: &ReentrancyGuard, fail: bool) -> Result<(), GuardError> {
            let _lock = guard.enter()?;
            if fail {
                return Err(GuardError::NotFound);
            }
            Ok(())
        }

        let guard = ReentrancyGuard::new();
        assert_eq!(guarded(&guard, true), Err(GuardError::NotFound));
        assert!(!guard.is_entered());
        assert!(guarded(&guard, false).is_ok());
        assert!(!guard.is_entered());
    }

    #[test]
    fn test_released_on_unwind() {
        let guard = ReentrancyGuard::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _lock = guard.enter().unwrap();
            panic!("handoff blew up");
        }));
        assert!(result.is_err());
        assert!(!guard.is_entered());
    }
}
