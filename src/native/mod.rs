//! Contract with the native streaming-client library.
//!
//! Everything the metadata objects know about the native layer goes through
//! [`NativeLibrary`]. Resources are opaque [`ResourceId`] tokens whose lifetime
//! is governed by the library's own reference counts.

use std::{
    ffi::{CStr, CString},
    fmt::Display,
    num::NonZeroU64,
};

use crate::error::Result;

pub(crate) mod enums;
pub mod handle;
pub mod memory;

pub(crate) use enums::native_enum;
pub use handle::NativeHandle;
pub use memory::MemoryLibrary;

/// Opaque token naming one native resource. A null pointer is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub NonZeroU64);

impl ResourceId {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Session,
    Track,
    Album,
    Artist,
    Link,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Session => "session",
            ResourceKind::Track => "track",
            ResourceKind::Album => "album",
            ResourceKind::Artist => "artist",
            ResourceKind::Link => "link",
        };
        write!(f, "{name}")
    }
}

/// Calls consumed from the native library.
///
/// Integer results are the raw native values; callers decode them. Reads that
/// would dereference a null pointer on the native side return `None`.
pub trait NativeLibrary: Send + Sync {
    fn add_ref(&self, kind: ResourceKind, id: ResourceId);
    fn release(&self, kind: ResourceKind, id: ResourceId);

    fn track_is_loaded(&self, track: ResourceId) -> bool;
    fn track_error(&self, track: ResourceId) -> i32;
    fn track_offline_status(&self, track: ResourceId) -> i32;
    fn track_availability(&self, session: ResourceId, track: ResourceId) -> i32;
    fn track_is_local(&self, session: ResourceId, track: ResourceId) -> bool;
    fn track_is_autolinked(&self, session: ResourceId, track: ResourceId) -> bool;
    fn track_playable(&self, session: ResourceId, track: ResourceId) -> Option<ResourceId>;
    fn track_is_placeholder(&self, track: ResourceId) -> bool;
    fn track_is_starred(&self, session: ResourceId, track: ResourceId) -> bool;
    fn track_set_starred(&self, session: ResourceId, tracks: &[ResourceId], star: bool) -> i32;
    fn track_album(&self, track: ResourceId) -> Option<ResourceId>;
    fn track_num_artists(&self, track: ResourceId) -> i32;
    fn track_artist(&self, track: ResourceId, index: i32) -> Option<ResourceId>;
    fn track_name(&self, track: ResourceId) -> Option<CString>;
    fn track_duration(&self, track: ResourceId) -> i32;
    fn track_popularity(&self, track: ResourceId) -> i32;
    fn track_disc(&self, track: ResourceId) -> i32;
    fn track_index(&self, track: ResourceId) -> i32;

    /// Vends one owned reference to a new local track.
    fn localtrack_create(
        &self,
        artist: Option<&CStr>,
        title: Option<&CStr>,
        album: Option<&CStr>,
        length: i32,
    ) -> Option<ResourceId>;

    fn album_is_loaded(&self, album: ResourceId) -> bool;
    fn album_is_available(&self, album: ResourceId) -> bool;
    fn album_artist(&self, album: ResourceId) -> Option<ResourceId>;
    fn album_name(&self, album: ResourceId) -> Option<CString>;
    fn album_year(&self, album: ResourceId) -> i32;
    fn album_type(&self, album: ResourceId) -> i32;

    fn artist_is_loaded(&self, artist: ResourceId) -> bool;
    fn artist_name(&self, artist: ResourceId) -> Option<CString>;

    // Every `link_create_*` call vends one owned reference.
    fn link_create_from_string(&self, uri: &CStr) -> Option<ResourceId>;
    fn link_create_from_track(&self, track: ResourceId, offset: i32) -> Option<ResourceId>;
    fn link_create_from_album(&self, album: ResourceId) -> Option<ResourceId>;
    fn link_create_from_artist(&self, artist: ResourceId) -> Option<ResourceId>;
    fn link_as_string(&self, link: ResourceId) -> CString;
    fn link_type(&self, link: ResourceId) -> i32;
    fn link_as_track(&self, link: ResourceId) -> Option<ResourceId>;
    fn link_as_track_offset(&self, link: ResourceId) -> i32;
    fn link_as_album(&self, link: ResourceId) -> Option<ResourceId>;
    fn link_as_artist(&self, link: ResourceId) -> Option<ResourceId>;
}

/// Encodes an optional string to the native text form; `None` stays null.
pub fn to_native(value: Option<&str>) -> Result<Option<CString>> {
    Ok(value.map(CString::new).transpose()?)
}

/// Decodes native text; a null pointer or an empty string is absence.
pub fn from_native(value: Option<CString>) -> Option<String> {
    value
        .map(|text| text.to_string_lossy().into_owned())
        .filter(|text| !text.is_empty())
}
