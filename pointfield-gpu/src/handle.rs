use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle ID generator
static HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Type-safe resource handle
pub struct Handle<T> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Allocate a handle with a process-unique id.
    pub fn next() -> Self {
        Self::new(HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// Manual impls: derives would require `T: Copy` etc. and wgpu resources are not.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", std::any::type_name::<T>(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_handles_are_unique() {
        let a = Handle::<u32>::next();
        let b = Handle::<u32>::next();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_handle_is_copy_for_non_copy_types() {
        let a: Handle<String> = Handle::new(7);
        let b = a;
        assert_eq!(a, b);
        let debug = format!("{a:?}");
        assert!(debug.contains("String"));
        assert!(debug.ends_with("(7)"));
    }
}
