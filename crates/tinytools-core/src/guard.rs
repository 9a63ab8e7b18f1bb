//! Pair an initialization with its teardown.

use std::fmt;

/// Runs an init closure on construction and a destroy closure on drop.
///
/// Meant for libraries with global `init()`/`shutdown()` pairs: the init result
/// (often a previous setting or a handle) is kept and handed to the destroy
/// closure.
///
/// ```
/// use tinytools_core::{colors, guard::InitGuard};
///
/// {
///     let _plain = InitGuard::new(|| colors::set_enabled(false), |previous| {
///         colors::set_enabled(*previous);
///     });
///     assert_eq!(colors::red("x"), "x");
/// }
/// ```
pub struct InitGuard<T, D: FnOnce(&mut T)> {
    value: T,
    destroy: Option<D>,
}

impl<T, D: FnOnce(&mut T)> InitGuard<T, D> {
    /// Run `init` now and arrange for `destroy` to run on drop.
    pub fn new(init: impl FnOnce() -> T, destroy: D) -> Self {
        Self {
            value: init(),
            destroy: Some(destroy),
        }
    }

    /// What `init` returned.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// What `init` returned, mutable.
    pub const fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T, D: FnOnce(&mut T)> Drop for InitGuard<T, D> {
    fn drop(&mut self) {
        if let Some(destroy) = self.destroy.take() {
            destroy(&mut self.value);
        }
    }
}

impl<T: fmt::Debug, D: FnOnce(&mut T)> fmt::Debug for InitGuard<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitGuard")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Owns a plain value and runs a deleter on it when dropped.
///
/// Like `Box` with a custom deleter, but for handles that are values rather
/// than pointers (file descriptors, ids from a C API). Assigning a new
/// `UniqueVal` over an old one deletes the old value first.
pub struct UniqueVal<T, D: FnMut(&mut T)> {
    value: T,
    deleter: D,
    armed: bool,
}

impl<T, D: FnMut(&mut T)> UniqueVal<T, D> {
    /// Take ownership of `value`.
    pub const fn new(value: T, deleter: D) -> Self {
        Self {
            value,
            deleter,
            armed: true,
        }
    }

    /// The owned value.
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// The owned value, mutable.
    pub const fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Stop the deleter from running; the caller now owns the underlying resource.
    pub const fn release(&mut self) {
        self.armed = false;
    }

    /// Whether the deleter will run on drop.
    pub const fn is_armed(&self) -> bool {
        self.armed
    }
}

impl<T, D: FnMut(&mut T)> Drop for UniqueVal<T, D> {
    fn drop(&mut self) {
        if self.armed {
            (self.deleter)(&mut self.value);
        }
    }
}

impl<T: fmt::Debug, D: FnMut(&mut T)> fmt::Debug for UniqueVal<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueVal")
            .field("value", &self.value)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn init_guard_runs_init_then_destroy() {
        let log = RefCell::new(Vec::new());
        {
            let guard = InitGuard::new(
                || {
                    log.borrow_mut().push("init".to_string());
                    42
                },
                |value| log.borrow_mut().push(format!("destroy {value}")),
            );
            assert_eq!(*guard.value(), 42);
            assert_eq!(*log.borrow(), vec!["init".to_string()]);
        }
        assert_eq!(
            *log.borrow(),
            vec!["init".to_string(), "destroy 42".to_string()]
        );
    }

    #[test]
    fn init_guard_destroy_sees_mutations() {
        let seen = RefCell::new(0);
        {
            let mut guard = InitGuard::new(|| 1, |value| *seen.borrow_mut() = *value);
            *guard.value_mut() = 5;
        }
        assert_eq!(*seen.borrow(), 5);
    }

    #[test]
    fn init_guard_with_unit_init() {
        let destroyed = RefCell::new(false);
        drop(InitGuard::new(|| (), |()| *destroyed.borrow_mut() = true));
        assert!(*destroyed.borrow());
    }

    #[test]
    fn unique_val_deletes_on_drop() {
        let closed = RefCell::new(Vec::new());
        {
            let fd = UniqueVal::new(3, |fd: &mut i32| closed.borrow_mut().push(*fd));
            assert_eq!(*fd.get(), 3);
            assert!(fd.is_armed());
        }
        assert_eq!(*closed.borrow(), vec![3]);
    }

    #[test]
    fn released_value_is_not_deleted() {
        let closed = RefCell::new(Vec::new());
        {
            let mut fd = UniqueVal::new(4, |fd: &mut i32| closed.borrow_mut().push(*fd));
            fd.release();
            assert!(!fd.is_armed());
        }
        assert!(closed.borrow().is_empty());
    }

    #[test]
    fn overwriting_deletes_the_old_value_once() {
        let closed = RefCell::new(Vec::new());
        let deleter = |fd: &mut i32| closed.borrow_mut().push(*fd);
        {
            let mut fd = UniqueVal::new(5, deleter);
            assert_eq!(*fd.get(), 5);
            fd = UniqueVal::new(6, deleter);
            assert_eq!(*closed.borrow(), vec![5]);
            *fd.get_mut() += 1;
        }
        assert_eq!(*closed.borrow(), vec![5, 7]);
    }

    #[test]
    fn moving_transfers_ownership_without_deleting() {
        let closed = RefCell::new(Vec::new());
        let fd = UniqueVal::new(8, |fd: &mut i32| closed.borrow_mut().push(*fd));
        let moved = fd;
        assert!(closed.borrow().is_empty());
        drop(moved);
        assert_eq!(*closed.borrow(), vec![8]);
    }
}
