//! In-process native layer backed by an in-memory catalog.
//!
//! Used by the inspection binary and as the native double in tests. It keeps
//! per-resource reference counts and counts every call so callers can check
//! which native reads actually happened.

use std::{
    collections::HashMap,
    ffi::{CStr, CString},
    num::NonZeroU64,
    sync::{Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, anyhow};

use crate::{
    config::{AlbumEntry, ArtistEntry, Catalog, TrackEntry},
    domain::{
        album::AlbumType,
        link::LinkType,
        track::{TrackAvailability, TrackOfflineStatus},
    },
    error::ErrorType,
    native::{NativeLibrary, ResourceId, ResourceKind},
};

const URI_SCHEME: &str = "spotify";

#[derive(Debug, Clone)]
pub struct TrackRecord {
    /// Filled with a generated `spotify:track:` uri on insert when empty.
    pub uri: String,
    pub loaded: bool,
    pub error: ErrorType,
    pub name: Option<String>,
    pub duration: i32,
    pub popularity: i32,
    pub disc: i32,
    pub index: i32,
    pub album: Option<ResourceId>,
    pub artists: Vec<ResourceId>,
    pub availability: TrackAvailability,
    pub offline_status: TrackOfflineStatus,
    pub local: bool,
    pub autolinked_to: Option<ResourceId>,
    pub placeholder: bool,
    pub starred: bool,
}

impl Default for TrackRecord {
    fn default() -> Self {
        Self {
            uri: String::new(),
            loaded: false,
            error: ErrorType::Ok,
            name: None,
            duration: 0,
            popularity: 0,
            disc: 0,
            index: 0,
            album: None,
            artists: Vec::new(),
            availability: TrackAvailability::Unavailable,
            offline_status: TrackOfflineStatus::No,
            local: false,
            autolinked_to: None,
            placeholder: false,
            starred: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlbumRecord {
    pub uri: String,
    pub loaded: bool,
    pub available: bool,
    pub name: Option<String>,
    pub artist: Option<ResourceId>,
    pub year: i32,
    pub album_type: AlbumType,
}

impl Default for AlbumRecord {
    fn default() -> Self {
        Self {
            uri: String::new(),
            loaded: false,
            available: false,
            name: None,
            artist: None,
            year: 0,
            album_type: AlbumType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtistRecord {
    pub uri: String,
    pub loaded: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum LinkTarget {
    Track { track: ResourceId, offset: i32 },
    Album(ResourceId),
    Artist(ResourceId),
}

#[derive(Debug)]
enum Resource {
    Session,
    Track(TrackRecord),
    Album(AlbumRecord),
    Artist(ArtistRecord),
    Link(LinkTarget),
}

impl Resource {
    fn kind(&self) -> ResourceKind {
        match self {
            Resource::Session => ResourceKind::Session,
            Resource::Track(_) => ResourceKind::Track,
            Resource::Album(_) => ResourceKind::Album,
            Resource::Artist(_) => ResourceKind::Artist,
            Resource::Link(_) => ResourceKind::Link,
        }
    }
}

#[derive(Debug)]
struct Entry {
    refcount: usize,
    resource: Resource,
}

#[derive(Debug, Default)]
struct State {
    last_id: u64,
    entries: HashMap<ResourceId, Entry>,
    by_uri: HashMap<String, ResourceId>,
    native_calls: usize,
    field_reads: usize,
    invalid_releases: usize,
    refuse_creation: bool,
}

impl State {
    fn next_id(&mut self) -> ResourceId {
        let id = ResourceId(NonZeroU64::MIN.saturating_add(self.last_id));
        self.last_id += 1;
        id
    }

    fn insert(&mut self, resource: Resource, refcount: usize) -> ResourceId {
        let id = self.next_id();
        self.entries.insert(id, Entry { refcount, resource });
        id
    }

    fn insert_track(&mut self, mut record: TrackRecord, refcount: usize) -> ResourceId {
        let id = self.next_id();
        if record.uri.is_empty() {
            record.uri = format!("{URI_SCHEME}:track:{:016x}", id.get());
        }
        self.by_uri.insert(record.uri.clone(), id);
        let resource = Resource::Track(record);
        self.entries.insert(id, Entry { refcount, resource });
        id
    }

    fn insert_album(&mut self, mut record: AlbumRecord) -> ResourceId {
        let id = self.next_id();
        if record.uri.is_empty() {
            record.uri = format!("{URI_SCHEME}:album:{:016x}", id.get());
        }
        self.by_uri.insert(record.uri.clone(), id);
        self.entries.insert(id, Entry { refcount: 0, resource: Resource::Album(record) });
        id
    }

    fn insert_artist(&mut self, mut record: ArtistRecord) -> ResourceId {
        let id = self.next_id();
        if record.uri.is_empty() {
            record.uri = format!("{URI_SCHEME}:artist:{:016x}", id.get());
        }
        self.by_uri.insert(record.uri.clone(), id);
        self.entries.insert(id, Entry { refcount: 0, resource: Resource::Artist(record) });
        id
    }

    fn track(&self, id: ResourceId) -> Option<&TrackRecord> {
        match self.entries.get(&id).map(|e| &e.resource) {
            Some(Resource::Track(track)) => Some(track),
            _ => {
                log::warn!("no native track {id}");
                None
            }
        }
    }

    fn album(&self, id: ResourceId) -> Option<&AlbumRecord> {
        match self.entries.get(&id).map(|e| &e.resource) {
            Some(Resource::Album(album)) => Some(album),
            _ => {
                log::warn!("no native album {id}");
                None
            }
        }
    }

    fn artist(&self, id: ResourceId) -> Option<&ArtistRecord> {
        match self.entries.get(&id).map(|e| &e.resource) {
            Some(Resource::Artist(artist)) => Some(artist),
            _ => {
                log::warn!("no native artist {id}");
                None
            }
        }
    }

    fn link(&self, id: ResourceId) -> Option<LinkTarget> {
        match self.entries.get(&id).map(|e| &e.resource) {
            Some(Resource::Link(target)) => Some(*target),
            _ => {
                log::warn!("no native link {id}");
                None
            }
        }
    }

    fn is_session(&self, id: ResourceId) -> bool {
        let live = matches!(
            self.entries.get(&id),
            Some(Entry {
                resource: Resource::Session,
                refcount: 1..,
            })
        );
        if !live {
            log::warn!("no live native session {id}");
        }
        live
    }

    fn new_link(&mut self, target: LinkTarget) -> Option<ResourceId> {
        if self.refuse_creation {
            return None;
        }
        Some(self.insert(Resource::Link(target), 1))
    }

    /// Resolves a uri, registering unknown tracks, albums and artists as
    /// fresh unloaded resources.
    fn parse_link(&mut self, uri: &str) -> Option<LinkTarget> {
        let (uri, offset) = match uri.split_once('#') {
            Some((uri, offset)) => (uri, parse_offset(offset)?),
            None => (uri, 0),
        };

        let mut parts = uri.splitn(3, ':');
        if parts.next() != Some(URI_SCHEME) {
            return None;
        }
        let kind = parts.next()?;
        let rest = parts.next()?;

        if kind == "local" {
            let id = *self.by_uri.get(&canonical_local_uri(rest)?)?;
            return Some(LinkTarget::Track { track: id, offset });
        }

        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        let known = self.by_uri.get(uri).copied();
        match kind {
            "track" => {
                let track = known.unwrap_or_else(|| {
                    log::debug!("registering unloaded track {uri}");
                    self.insert_track(
                        TrackRecord {
                            uri: uri.to_string(),
                            ..Default::default()
                        },
                        0,
                    )
                });
                Some(LinkTarget::Track { track, offset })
            }
            "album" if offset == 0 => {
                let album = known.unwrap_or_else(|| {
                    self.insert_album(AlbumRecord {
                        uri: uri.to_string(),
                        ..Default::default()
                    })
                });
                Some(LinkTarget::Album(album))
            }
            "artist" if offset == 0 => {
                let artist = known.unwrap_or_else(|| {
                    self.insert_artist(ArtistRecord {
                        uri: uri.to_string(),
                        ..Default::default()
                    })
                });
                Some(LinkTarget::Artist(artist))
            }
            _ => None,
        }
    }

    fn link_uri(&self, target: LinkTarget) -> String {
        match target {
            LinkTarget::Track { track, offset } => {
                let uri = self.track(track).map(|t| t.uri.clone()).unwrap_or_default();
                if offset > 0 {
                    let seconds = offset / 1000;
                    format!("{uri}#{}:{:02}", seconds / 60, seconds % 60)
                } else {
                    uri
                }
            }
            LinkTarget::Album(album) => self.album(album).map(|a| a.uri.clone()).unwrap_or_default(),
            LinkTarget::Artist(artist) => {
                self.artist(artist).map(|a| a.uri.clone()).unwrap_or_default()
            }
        }
    }
}

/// Parses a `m:ss` link offset into milliseconds.
fn parse_offset(offset: &str) -> Option<i32> {
    let (minutes, seconds) = offset.split_once(':')?;
    let (minutes, seconds) = (digits(minutes)?, digits(seconds)?);
    if seconds >= 60 {
        return None;
    }
    let ms = minutes.checked_mul(60)?.checked_add(seconds)?.checked_mul(1000)?;
    i32::try_from(ms).ok()
}

/// A non-empty run of ASCII digits; signs are rejected.
fn digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Percent-encodes one local uri field, spaces as `+`.
fn encode_field(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

fn decode_field(field: &str) -> Option<String> {
    urlencoding::decode(&field.replace('+', " "))
        .ok()
        .map(|text| text.into_owned())
}

fn local_uri(artist: &str, album: &str, title: &str, seconds: u32) -> String {
    format!(
        "{URI_SCHEME}:local:{}:{}:{}:{seconds}",
        encode_field(artist),
        encode_field(album),
        encode_field(title),
    )
}

/// Re-encodes the `artist:album:title:seconds` part of a local uri so
/// equivalent spellings find the same track.
fn canonical_local_uri(rest: &str) -> Option<String> {
    let mut fields = rest.split(':');
    let artist = decode_field(fields.next()?)?;
    let album = decode_field(fields.next()?)?;
    let title = decode_field(fields.next()?)?;
    let seconds = digits(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(local_uri(&artist, &album, &title, seconds))
}

fn to_cstring(text: &Option<String>) -> Option<CString> {
    text.as_deref().and_then(|t| CString::new(t).ok())
}

/// A [`NativeLibrary`] living entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    state: Mutex<State>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Any native call that is not reference counting.
    fn call<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state();
        state.native_calls += 1;
        f(&mut state)
    }

    /// A field read on a track; unloaded tracks answer with empty values.
    fn read_track<T: Default>(&self, id: ResourceId, f: impl FnOnce(&TrackRecord) -> T) -> T {
        self.call(|state| {
            state.field_reads += 1;
            match state.track(id) {
                Some(track) if track.loaded => f(track),
                _ => T::default(),
            }
        })
    }

    /// Like `read_track`, but answers empty values without a live session.
    fn read_session_track<T: Default>(
        &self,
        session: ResourceId,
        id: ResourceId,
        f: impl FnOnce(&TrackRecord) -> T,
    ) -> T {
        self.call(|state| {
            state.field_reads += 1;
            if !state.is_session(session) {
                return T::default();
            }
            match state.track(id) {
                Some(track) if track.loaded => f(track),
                _ => T::default(),
            }
        })
    }

    fn read_album<T: Default>(&self, id: ResourceId, f: impl FnOnce(&AlbumRecord) -> T) -> T {
        self.call(|state| {
            state.field_reads += 1;
            match state.album(id) {
                Some(album) if album.loaded => f(album),
                _ => T::default(),
            }
        })
    }

    fn read_artist<T: Default>(&self, id: ResourceId, f: impl FnOnce(&ArtistRecord) -> T) -> T {
        self.call(|state| {
            state.field_reads += 1;
            match state.artist(id) {
                Some(artist) if artist.loaded => f(artist),
                _ => T::default(),
            }
        })
    }

    /// Registers a track owned by the library itself (reference count 0).
    pub fn insert_track(&self, record: TrackRecord) -> ResourceId {
        self.state().insert_track(record, 0)
    }

    /// Registers a track and vends one owned reference to the caller.
    pub fn create_track(&self, record: TrackRecord) -> ResourceId {
        self.state().insert_track(record, 1)
    }

    pub fn insert_album(&self, record: AlbumRecord) -> ResourceId {
        self.state().insert_album(record)
    }

    pub fn insert_artist(&self, record: ArtistRecord) -> ResourceId {
        self.state().insert_artist(record)
    }

    /// Creates a native session and vends one owned reference to it.
    pub fn create_session(&self) -> ResourceId {
        self.state().insert(Resource::Session, 1)
    }

    /// Mutates a track in place, e.g. to simulate it finishing loading.
    /// Returns `false` if there is no such track.
    pub fn update_track(&self, id: ResourceId, f: impl FnOnce(&mut TrackRecord)) -> bool {
        let mut state = self.state();
        match state.entries.get_mut(&id).map(|e| &mut e.resource) {
            Some(Resource::Track(track)) => {
                f(track);
                true
            }
            _ => false,
        }
    }

    pub fn track_record(&self, id: ResourceId) -> Option<TrackRecord> {
        self.state().track(id).cloned()
    }

    pub fn lookup(&self, uri: &str) -> Option<ResourceId> {
        self.state().by_uri.get(uri).copied()
    }

    /// Ids of all tracks with a catalog uri, in insertion order.
    pub fn track_ids(&self) -> Vec<ResourceId> {
        let state = self.state();
        let mut ids = state
            .entries
            .iter()
            .filter(|(_, e)| matches!(&e.resource, Resource::Track(t) if !t.local))
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Makes every creation call (local tracks, links) vend no resource.
    pub fn refuse_creation(&self, refuse: bool) {
        self.state().refuse_creation = refuse;
    }

    pub fn refcount(&self, id: ResourceId) -> usize {
        self.state()
            .entries
            .get(&id)
            .map(|e| e.refcount)
            .unwrap_or_default()
    }

    /// Number of releases that found no reference to give back.
    pub fn invalid_releases(&self) -> usize {
        self.state().invalid_releases
    }

    /// Number of calls other than `add_ref`/`release`.
    pub fn native_calls(&self) -> usize {
        self.state().native_calls
    }

    /// Number of field reads, i.e. calls other than `add_ref`/`release`,
    /// `*_is_loaded` and `track_error`.
    pub fn field_reads(&self) -> usize {
        self.state().field_reads
    }

    /// Builds a library holding every resource the catalog describes.
    pub fn from_catalog(catalog: &Catalog) -> anyhow::Result<Self> {
        let lib = Self::new();
        {
            let mut state = lib.state();
            for artist in &catalog.artists {
                state.insert_artist(artist_record(artist));
            }
            for album in &catalog.albums {
                let record = album_record(&state, album)?;
                state.insert_album(record);
            }
            for track in &catalog.tracks {
                let record = track_record(&state, track)?;
                state.insert_track(record, 0);
            }
            // autolinks may point at tracks declared later
            for track in &catalog.tracks {
                let Some(target) = &track.autolink else {
                    continue;
                };
                let target = resolve(&state, target, ResourceKind::Track)
                    .with_context(|| format!("track {} autolinks to {target}", track.uri))?;
                let id = resolve(&state, &track.uri, ResourceKind::Track)?;
                if let Some(Entry {
                    resource: Resource::Track(record),
                    ..
                }) = state.entries.get_mut(&id)
                {
                    record.autolinked_to = Some(target);
                }
            }
        }
        Ok(lib)
    }
}

fn resolve(state: &State, uri: &str, kind: ResourceKind) -> anyhow::Result<ResourceId> {
    let id = state
        .by_uri
        .get(uri)
        .copied()
        .ok_or_else(|| anyhow!("unknown {kind} {uri}"))?;
    match state.entries.get(&id).map(|e| e.resource.kind()) {
        Some(found) if found == kind => Ok(id),
        _ => Err(anyhow!("{uri} is not a {kind}")),
    }
}

fn native_int(value: Option<u32>, what: &str) -> anyhow::Result<i32> {
    i32::try_from(value.unwrap_or_default()).with_context(|| format!("{what} out of range"))
}

fn artist_record(entry: &ArtistEntry) -> ArtistRecord {
    ArtistRecord {
        uri: entry.uri.clone(),
        loaded: entry.loaded,
        name: entry.name.clone(),
    }
}

fn album_record(state: &State, entry: &AlbumEntry) -> anyhow::Result<AlbumRecord> {
    let artist = entry
        .artist
        .as_deref()
        .map(|uri| resolve(state, uri, ResourceKind::Artist))
        .transpose()
        .with_context(|| format!("album {}", entry.uri))?;
    Ok(AlbumRecord {
        uri: entry.uri.clone(),
        loaded: entry.loaded,
        available: entry.available,
        name: entry.name.clone(),
        artist,
        year: native_int(entry.year, "year")?,
        album_type: AlbumType::from_raw(entry.album_type),
    })
}

fn track_record(state: &State, entry: &TrackEntry) -> anyhow::Result<TrackRecord> {
    let context = || format!("track {}", entry.uri);
    let album = entry
        .album
        .as_deref()
        .map(|uri| resolve(state, uri, ResourceKind::Album))
        .transpose()
        .with_context(context)?;
    let artists = entry
        .artists
        .iter()
        .map(|uri| resolve(state, uri, ResourceKind::Artist))
        .collect::<anyhow::Result<Vec<_>>>()
        .with_context(context)?;

    Ok(TrackRecord {
        uri: entry.uri.clone(),
        loaded: entry.loaded,
        error: ErrorType::from_raw(entry.error),
        name: entry.name.clone(),
        duration: native_int(entry.duration, "duration").with_context(context)?,
        popularity: native_int(entry.popularity, "popularity").with_context(context)?,
        disc: native_int(entry.disc, "disc").with_context(context)?,
        index: native_int(entry.index, "index").with_context(context)?,
        album,
        artists,
        availability: TrackAvailability::from_raw(entry.availability),
        offline_status: TrackOfflineStatus::from_raw(entry.offline_status),
        local: entry.local,
        autolinked_to: None,
        placeholder: entry.placeholder,
        starred: entry.starred,
    })
}

impl NativeLibrary for MemoryLibrary {
    fn add_ref(&self, kind: ResourceKind, id: ResourceId) {
        let mut state = self.state();
        match state.entries.get_mut(&id) {
            Some(entry) if entry.resource.kind() == kind => entry.refcount += 1,
            _ => log::warn!("add_ref on unknown {kind} {id}"),
        }
    }

    fn release(&self, kind: ResourceKind, id: ResourceId) {
        let mut state = self.state();
        let released = match state.entries.get_mut(&id) {
            Some(entry) if entry.resource.kind() == kind && entry.refcount > 0 => {
                entry.refcount -= 1;
                true
            }
            _ => false,
        };
        if !released {
            log::error!("release of {kind} {id} without a reference");
            state.invalid_releases += 1;
        }
    }

    fn track_is_loaded(&self, track: ResourceId) -> bool {
        self.call(|state| state.track(track).is_some_and(|t| t.loaded))
    }

    fn track_error(&self, track: ResourceId) -> i32 {
        self.call(|state| {
            state
                .track(track)
                .map(|t| t.error)
                .unwrap_or(ErrorType::InvalidIndata)
                .raw()
        })
    }

    fn track_offline_status(&self, track: ResourceId) -> i32 {
        self.read_track(track, |t| t.offline_status.raw())
    }

    fn track_availability(&self, session: ResourceId, track: ResourceId) -> i32 {
        self.read_session_track(session, track, |t| t.availability.raw())
    }

    fn track_is_local(&self, session: ResourceId, track: ResourceId) -> bool {
        self.read_session_track(session, track, |t| t.local)
    }

    fn track_is_autolinked(&self, session: ResourceId, track: ResourceId) -> bool {
        self.read_session_track(session, track, |t| t.autolinked_to.is_some())
    }

    fn track_playable(&self, session: ResourceId, track: ResourceId) -> Option<ResourceId> {
        self.call(|state| {
            state.field_reads += 1;
            if !state.is_session(session) {
                return None;
            }
            let record = state.track(track)?;
            Some(record.autolinked_to.unwrap_or(track))
        })
    }

    fn track_is_placeholder(&self, track: ResourceId) -> bool {
        self.read_track(track, |t| t.placeholder)
    }

    fn track_is_starred(&self, session: ResourceId, track: ResourceId) -> bool {
        self.read_session_track(session, track, |t| t.starred)
    }

    fn track_set_starred(&self, session: ResourceId, tracks: &[ResourceId], star: bool) -> i32 {
        self.call(|state| {
            if !state.is_session(session) {
                return ErrorType::PermissionDenied.raw();
            }
            if tracks.iter().any(|id| state.track(*id).is_none()) {
                return ErrorType::InvalidIndata.raw();
            }
            for id in tracks {
                if let Some(Entry {
                    resource: Resource::Track(track),
                    ..
                }) = state.entries.get_mut(id)
                {
                    track.starred = star;
                }
            }
            ErrorType::Ok.raw()
        })
    }

    fn track_album(&self, track: ResourceId) -> Option<ResourceId> {
        self.read_track(track, |t| t.album)
    }

    fn track_num_artists(&self, track: ResourceId) -> i32 {
        self.read_track(track, |t| i32::try_from(t.artists.len()).unwrap_or(i32::MAX))
    }

    fn track_artist(&self, track: ResourceId, index: i32) -> Option<ResourceId> {
        let index = usize::try_from(index).ok()?;
        self.read_track(track, |t| t.artists.get(index).copied())
    }

    fn track_name(&self, track: ResourceId) -> Option<CString> {
        self.read_track(track, |t| to_cstring(&t.name))
    }

    fn track_duration(&self, track: ResourceId) -> i32 {
        self.read_track(track, |t| t.duration)
    }

    fn track_popularity(&self, track: ResourceId) -> i32 {
        self.read_track(track, |t| t.popularity)
    }

    fn track_disc(&self, track: ResourceId) -> i32 {
        self.read_track(track, |t| t.disc)
    }

    fn track_index(&self, track: ResourceId) -> i32 {
        self.read_track(track, |t| t.index)
    }

    fn localtrack_create(
        &self,
        artist: Option<&CStr>,
        title: Option<&CStr>,
        album: Option<&CStr>,
        length: i32,
    ) -> Option<ResourceId> {
        let decode = |text: Option<&CStr>| text.map(|t| t.to_string_lossy().into_owned());
        let (artist, title, album) = (decode(artist), decode(title), decode(album));

        self.call(|state| {
            if state.refuse_creation {
                return None;
            }
            let artist_id = artist.as_ref().map(|name| {
                state.insert_artist(ArtistRecord {
                    loaded: true,
                    name: Some(name.clone()),
                    ..Default::default()
                })
            });
            let album_id = album.as_ref().map(|name| {
                state.insert_album(AlbumRecord {
                    loaded: true,
                    available: true,
                    name: Some(name.clone()),
                    artist: artist_id,
                    ..Default::default()
                })
            });
            let uri = local_uri(
                artist.as_deref().unwrap_or_default(),
                album.as_deref().unwrap_or_default(),
                title.as_deref().unwrap_or_default(),
                u32::try_from(length / 1000).unwrap_or_default(),
            );
            let id = state.insert_track(
                TrackRecord {
                    uri,
                    loaded: true,
                    name: title,
                    duration: length,
                    album: album_id,
                    artists: artist_id.into_iter().collect(),
                    availability: TrackAvailability::Available,
                    local: true,
                    ..Default::default()
                },
                1,
            );
            log::debug!("created local track {id}");
            Some(id)
        })
    }

    fn album_is_loaded(&self, album: ResourceId) -> bool {
        self.call(|state| state.album(album).is_some_and(|a| a.loaded))
    }

    fn album_is_available(&self, album: ResourceId) -> bool {
        self.read_album(album, |a| a.available)
    }

    fn album_artist(&self, album: ResourceId) -> Option<ResourceId> {
        self.read_album(album, |a| a.artist)
    }

    fn album_name(&self, album: ResourceId) -> Option<CString> {
        self.read_album(album, |a| to_cstring(&a.name))
    }

    fn album_year(&self, album: ResourceId) -> i32 {
        self.read_album(album, |a| a.year)
    }

    fn album_type(&self, album: ResourceId) -> i32 {
        self.call(|state| {
            state.field_reads += 1;
            match state.album(album) {
                Some(a) if a.loaded => a.album_type.raw(),
                _ => AlbumType::Unknown.raw(),
            }
        })
    }

    fn artist_is_loaded(&self, artist: ResourceId) -> bool {
        self.call(|state| state.artist(artist).is_some_and(|a| a.loaded))
    }

    fn artist_name(&self, artist: ResourceId) -> Option<CString> {
        self.read_artist(artist, |a| to_cstring(&a.name))
    }

    fn link_create_from_string(&self, uri: &CStr) -> Option<ResourceId> {
        let uri = uri.to_str().ok()?;
        self.call(|state| {
            let target = state.parse_link(uri)?;
            state.new_link(target)
        })
    }

    fn link_create_from_track(&self, track: ResourceId, offset: i32) -> Option<ResourceId> {
        self.call(|state| {
            state.track(track)?;
            state.new_link(LinkTarget::Track {
                track,
                offset: offset.max(0),
            })
        })
    }

    fn link_create_from_album(&self, album: ResourceId) -> Option<ResourceId> {
        self.call(|state| {
            state.album(album)?;
            state.new_link(LinkTarget::Album(album))
        })
    }

    fn link_create_from_artist(&self, artist: ResourceId) -> Option<ResourceId> {
        self.call(|state| {
            state.artist(artist)?;
            state.new_link(LinkTarget::Artist(artist))
        })
    }

    fn link_as_string(&self, link: ResourceId) -> CString {
        self.call(|state| {
            let uri = state
                .link(link)
                .map(|target| state.link_uri(target))
                .unwrap_or_default();
            CString::new(uri).unwrap_or_default()
        })
    }

    fn link_type(&self, link: ResourceId) -> i32 {
        self.call(|state| {
            let link_type = match state.link(link) {
                Some(LinkTarget::Track { track, .. }) => {
                    if state.track(track).is_some_and(|t| t.local) {
                        LinkType::LocalTrack
                    } else {
                        LinkType::Track
                    }
                }
                Some(LinkTarget::Album(_)) => LinkType::Album,
                Some(LinkTarget::Artist(_)) => LinkType::Artist,
                None => LinkType::Invalid,
            };
            link_type.raw()
        })
    }

    fn link_as_track(&self, link: ResourceId) -> Option<ResourceId> {
        self.call(|state| match state.link(link)? {
            LinkTarget::Track { track, .. } => Some(track),
            _ => None,
        })
    }

    fn link_as_track_offset(&self, link: ResourceId) -> i32 {
        self.call(|state| match state.link(link) {
            Some(LinkTarget::Track { offset, .. }) => offset,
            _ => 0,
        })
    }

    fn link_as_album(&self, link: ResourceId) -> Option<ResourceId> {
        self.call(|state| match state.link(link)? {
            LinkTarget::Album(album) => Some(album),
            _ => None,
        })
    }

    fn link_as_artist(&self, link: ResourceId) -> Option<ResourceId> {
        self.call(|state| match state.link(link)? {
            LinkTarget::Artist(artist) => Some(artist),
            _ => None,
        })
    }
}
