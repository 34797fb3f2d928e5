use std::fmt;

use crate::{
    domain::{link::Link, loadable::Loadable},
    error::{ErrorType, Result},
    native::{NativeHandle, NativeLibrary, ResourceId, ResourceKind, from_native},
    session::SessionGate,
};

#[derive(Clone)]
pub struct Artist {
    handle: NativeHandle,
    gate: SessionGate,
}

impl Artist {
    pub fn new(gate: SessionGate, sp_artist: ResourceId, add_ref: bool) -> Self {
        let handle = NativeHandle::acquire(gate.lib(), ResourceKind::Artist, sp_artist, add_ref);
        Self { handle, gate }
    }

    pub fn id(&self) -> ResourceId {
        self.handle.id()
    }

    pub(crate) fn gate(&self) -> &SessionGate {
        &self.gate
    }

    fn lib(&self) -> &dyn NativeLibrary {
        self.handle.lib()
    }

    /// `None` until the artist is loaded.
    pub fn name(&self) -> Option<String> {
        from_native(self.lib().artist_name(self.id()))
    }

    pub fn link(&self) -> Result<Link> {
        Link::from_artist(self)
    }
}

impl Loadable for Artist {
    fn is_loaded(&self) -> bool {
        self.lib().artist_is_loaded(self.id())
    }

    /// Native artists carry no error code.
    fn error(&self) -> ErrorType {
        ErrorType::Ok
    }
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Artist {}

impl fmt::Debug for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artist").field("id", &self.id()).finish()
    }
}
