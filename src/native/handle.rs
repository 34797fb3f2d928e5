use std::{fmt, sync::Arc};

use crate::native::{NativeLibrary, ResourceId, ResourceKind};

/// Owns exactly one native reference and gives it back on drop.
///
/// Several handles may name the same resource; each holds its own reference
/// and releases it independently.
pub struct NativeHandle {
    lib: Arc<dyn NativeLibrary>,
    kind: ResourceKind,
    id: ResourceId,
}

impl NativeHandle {
    /// Wraps `id`. With `add_ref` the resource's count is incremented first;
    /// without it the caller hands over a reference it already owns.
    pub fn acquire(
        lib: Arc<dyn NativeLibrary>,
        kind: ResourceKind,
        id: ResourceId,
        add_ref: bool,
    ) -> Self {
        if add_ref {
            lib.add_ref(kind, id);
        }
        log::trace!("acquired {kind} {id} (add_ref: {add_ref})");
        Self { lib, kind, id }
    }

    pub fn retain(lib: Arc<dyn NativeLibrary>, kind: ResourceKind, id: ResourceId) -> Self {
        Self::acquire(lib, kind, id, true)
    }

    pub fn adopt(lib: Arc<dyn NativeLibrary>, kind: ResourceKind, id: ResourceId) -> Self {
        Self::acquire(lib, kind, id, false)
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn lib(&self) -> &dyn NativeLibrary {
        self.lib.as_ref()
    }
}

impl Clone for NativeHandle {
    fn clone(&self) -> Self {
        Self::retain(self.lib.clone(), self.kind, self.id)
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        log::trace!("releasing {} {}", self.kind, self.id);
        self.lib.release(self.kind, self.id);
    }
}

impl PartialEq for NativeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

impl Eq for NativeHandle {}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
