use std::{ffi::CString, fmt};

use crate::{
    domain::{album::Album, artist::Artist, track::Track},
    error::{Error, Result},
    native::{NativeHandle, NativeLibrary, ResourceId, ResourceKind, native_enum},
    session::SessionGate,
};

native_enum! {
    pub enum LinkType: "SP_LINKTYPE_" {
        Invalid = 0,
        Track = 1,
        Album = 2,
        Artist = 3,
        Search = 4,
        Playlist = 5,
        Profile = 6,
        Starred = 7,
        #[strum(serialize = "LOCALTRACK")]
        LocalTrack = 8,
        Image = 9,
    }
}

/// A `spotify:` uri locating a track (with an offset), album or artist.
#[derive(Clone)]
pub struct Link {
    handle: NativeHandle,
    gate: SessionGate,
}

impl Link {
    /// Every native link creation call vends the reference we keep.
    fn adopt(gate: SessionGate, sp_link: ResourceId) -> Self {
        let handle = NativeHandle::adopt(gate.lib(), ResourceKind::Link, sp_link);
        Self { handle, gate }
    }

    /// Parses `uri`. Needs a live session.
    pub fn from_string(gate: &SessionGate, uri: &str) -> Result<Self> {
        gate.require()?;
        let native = CString::new(uri)?;
        let sp_link = gate
            .lib()
            .link_create_from_string(&native)
            .ok_or_else(|| Error::InvalidLink(uri.to_string()))?;
        Ok(Self::adopt(gate.clone(), sp_link))
    }

    /// A link to `track`, `offset` milliseconds in.
    pub fn from_track(track: &Track, offset: u32) -> Result<Self> {
        let offset = i32::try_from(offset)
            .map_err(|_| Error::InvalidArgument(format!("link offset of {offset} ms")))?;
        let gate = track.gate();
        let sp_link = gate
            .lib()
            .link_create_from_track(track.id(), offset)
            .ok_or(Error::NullResource(ResourceKind::Link))?;
        Ok(Self::adopt(gate.clone(), sp_link))
    }

    pub fn from_album(album: &Album) -> Result<Self> {
        let gate = album.gate();
        let sp_link = gate
            .lib()
            .link_create_from_album(album.id())
            .ok_or(Error::NullResource(ResourceKind::Link))?;
        Ok(Self::adopt(gate.clone(), sp_link))
    }

    pub fn from_artist(artist: &Artist) -> Result<Self> {
        let gate = artist.gate();
        let sp_link = gate
            .lib()
            .link_create_from_artist(artist.id())
            .ok_or(Error::NullResource(ResourceKind::Link))?;
        Ok(Self::adopt(gate.clone(), sp_link))
    }

    pub fn id(&self) -> ResourceId {
        self.handle.id()
    }

    fn lib(&self) -> &dyn NativeLibrary {
        self.handle.lib()
    }

    pub fn uri(&self) -> String {
        self.lib()
            .link_as_string(self.id())
            .to_string_lossy()
            .into_owned()
    }

    pub fn link_type(&self) -> LinkType {
        LinkType::from_raw(self.lib().link_type(self.id()))
    }

    pub fn as_track(&self) -> Option<Track> {
        self.lib()
            .link_as_track(self.id())
            .map(|sp_track| Track::new(self.gate.clone(), sp_track, true))
    }

    /// Offset into the track in milliseconds; `None` for non-track links.
    pub fn as_track_offset(&self) -> Option<u32> {
        self.lib().link_as_track(self.id())?;
        u32::try_from(self.lib().link_as_track_offset(self.id())).ok()
    }

    pub fn as_album(&self) -> Option<Album> {
        self.lib()
            .link_as_album(self.id())
            .map(|sp_album| Album::new(self.gate.clone(), sp_album, true))
    }

    pub fn as_artist(&self) -> Option<Artist> {
        self.lib()
            .link_as_artist(self.id())
            .map(|sp_artist| Artist::new(self.gate.clone(), sp_artist, true))
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.uri() == other.uri()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("uri", &self.uri()).finish()
    }
}
