use std::fmt;

use crate::{
    domain::{artist::Artist, link::Link, loadable::Loadable},
    error::{ErrorType, Result},
    native::{NativeHandle, NativeLibrary, ResourceId, ResourceKind, from_native, native_enum},
    session::SessionGate,
};

native_enum! {
    pub enum AlbumType: "SP_ALBUMTYPE_" {
        Album = 0,
        Single = 1,
        Compilation = 2,
        Unknown = 3,
    }
}

/// An album. Fields read as `None` until the album is loaded.
#[derive(Clone)]
pub struct Album {
    handle: NativeHandle,
    gate: SessionGate,
}

impl Album {
    pub fn new(gate: SessionGate, sp_album: ResourceId, add_ref: bool) -> Self {
        let handle = NativeHandle::acquire(gate.lib(), ResourceKind::Album, sp_album, add_ref);
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

    /// Whether the album can be played in the user's region.
    pub fn is_available(&self) -> bool {
        self.lib().album_is_available(self.id())
    }

    pub fn artist(&self) -> Option<Artist> {
        self.lib()
            .album_artist(self.id())
            .map(|sp_artist| Artist::new(self.gate.clone(), sp_artist, true))
    }

    pub fn name(&self) -> Option<String> {
        from_native(self.lib().album_name(self.id()))
    }

    pub fn year(&self) -> Option<u32> {
        u32::try_from(self.lib().album_year(self.id()))
            .ok()
            .filter(|year| *year != 0)
    }

    pub fn album_type(&self) -> AlbumType {
        AlbumType::from_raw(self.lib().album_type(self.id()))
    }

    pub fn link(&self) -> Result<Link> {
        Link::from_album(self)
    }
}

impl Loadable for Album {
    fn is_loaded(&self) -> bool {
        self.lib().album_is_loaded(self.id())
    }

    /// Native albums carry no error code.
    fn error(&self) -> ErrorType {
        ErrorType::Ok
    }
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Album {}

impl fmt::Debug for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Album").field("id", &self.id()).finish()
    }
}
