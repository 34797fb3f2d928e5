use std::{fmt, ops::Deref};

use crate::{
    domain::{album::Album, artist::Artist, link::Link, loadable::Loadable},
    error::{Error, ErrorType, Result},
    native::{
        NativeHandle, NativeLibrary, ResourceId, ResourceKind, from_native, native_enum, to_native,
    },
    session::SessionGate,
};

/// Native length of a local track whose duration is not known.
const UNSPECIFIED_LENGTH: i32 = -1;

native_enum! {
    pub enum TrackAvailability: "SP_TRACK_AVAILABILITY_" {
        Unavailable = 0,
        Available = 1,
        NotStreamable = 2,
        BannedByArtist = 3,
    }
}

native_enum! {
    pub enum TrackOfflineStatus: "SP_TRACK_OFFLINE_" {
        No = 0,
        Waiting = 1,
        Downloading = 2,
        Done = 3,
        Error = 4,
        DoneExpired = 5,
        LimitExceeded = 6,
        DoneResync = 7,
    }
}

/// A track, wrapping one reference to a native track resource.
///
/// Most fields are unknown until the session has loaded the track. Accessors
/// check, in order: session liveness (where the native call is session
/// scoped), the track's error code, then load state, and only then read the
/// native field. Fields whose native value is empty (null, zero) read as
/// `None`, which cannot tell "not loaded yet" from "legitimately zero".
#[derive(Clone)]
pub struct Track {
    handle: NativeHandle,
    gate: SessionGate,
}

impl Track {
    /// Wraps `sp_track`, adding a reference unless the caller hands over one
    /// it already owns.
    pub fn new(gate: SessionGate, sp_track: ResourceId, add_ref: bool) -> Self {
        let handle = NativeHandle::acquire(gate.lib(), ResourceKind::Track, sp_track, add_ref);
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

    /// Session-scoped flag that is `None` while the track is unloaded.
    fn session_flag(
        &self,
        read: impl FnOnce(&dyn NativeLibrary, ResourceId, ResourceId) -> bool,
    ) -> Result<Option<bool>> {
        let session = self.gate.require()?;
        self.check_error()?;
        if !self.is_loaded() {
            return Ok(None);
        }
        Ok(Some(read(self.lib(), session.id(), self.id())))
    }

    /// The offline sync status. Changes are announced through the session's
    /// metadata-updated notification.
    pub fn offline_status(&self) -> Result<TrackOfflineStatus> {
        self.gate.require()?;
        self.check_error()?;
        let raw = self.lib().track_offline_status(self.id());
        Ok(TrackOfflineStatus::from_raw(raw))
    }

    pub fn availability(&self) -> Result<TrackAvailability> {
        let session = self.gate.require()?;
        self.check_error()?;
        let raw = self.lib().track_availability(session.id(), self.id());
        Ok(TrackAvailability::from_raw(raw))
    }

    pub fn is_local(&self) -> Result<Option<bool>> {
        self.session_flag(|lib, session, track| lib.track_is_local(session, track))
    }

    /// Whether the track is redirected to another one; see [`Track::playable`].
    pub fn is_autolinked(&self) -> Result<Option<bool>> {
        self.session_flag(|lib, session, track| lib.track_is_autolinked(session, track))
    }

    /// The track that is actually played when this one is, as a new wrapper
    /// holding its own reference.
    pub fn playable(&self) -> Result<Option<Track>> {
        let session = self.gate.require()?;
        self.check_error()?;
        let playable = self.lib().track_playable(session.id(), self.id());
        Ok(playable.map(|sp_track| Track::new(self.gate.clone(), sp_track, true)))
    }

    /// Whether the track stands in for a non-track object in a playlist.
    /// Resolve the real object through [`Track::link`].
    pub fn is_placeholder(&self) -> Result<bool> {
        self.check_error()?;
        Ok(self.lib().track_is_placeholder(self.id()))
    }

    pub fn is_starred(&self) -> Result<Option<bool>> {
        self.session_flag(|lib, session, track| lib.track_is_starred(session, track))
    }

    pub fn set_starred(&self, star: bool) -> Result<()> {
        Self::set_all_starred(std::slice::from_ref(self), star)
    }

    /// Stars or unstars several tracks in one native call. Every track must
    /// belong to the same live session.
    pub fn set_all_starred(tracks: &[Track], star: bool) -> Result<()> {
        let Some(first) = tracks.first() else {
            return Ok(());
        };
        let session = first.gate.require()?;
        for track in &tracks[1..] {
            if track.gate.require()?.id() != session.id() {
                return Err(Error::InvalidArgument(
                    "tracks to star belong to different sessions".to_string(),
                ));
            }
        }
        let ids = tracks.iter().map(Track::id).collect::<Vec<_>>();
        let raw = first.lib().track_set_starred(session.id(), &ids, star);
        ErrorType::from_raw(raw).check()
    }

    pub fn album(&self) -> Result<Option<Album>> {
        self.check_error()?;
        let album = self.lib().track_album(self.id());
        Ok(album.map(|sp_album| Album::new(self.gate.clone(), sp_album, true)))
    }

    pub fn artists(&self) -> Result<Vec<Artist>> {
        self.check_error()?;
        let count = self.lib().track_num_artists(self.id());
        let artists = (0..count)
            .filter_map(|index| self.lib().track_artist(self.id(), index))
            .map(|sp_artist| Artist::new(self.gate.clone(), sp_artist, true))
            .collect();
        Ok(artists)
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.check_error()?;
        Ok(from_native(self.lib().track_name(self.id())))
    }

    /// Duration in milliseconds.
    pub fn duration(&self) -> Result<Option<u32>> {
        self.check_error()?;
        Ok(non_zero(self.lib().track_duration(self.id())))
    }

    /// Popularity in the range 0-100, 0 if undefined.
    pub fn popularity(&self) -> Result<Option<u32>> {
        self.check_error()?;
        if !self.is_loaded() {
            return Ok(None);
        }
        Ok(u32::try_from(self.lib().track_popularity(self.id())).ok())
    }

    /// Disc number, 1 or higher. Only known for tracks reached through an
    /// album or artist browser.
    pub fn disc(&self) -> Result<Option<u32>> {
        self.check_error()?;
        Ok(non_zero(self.lib().track_disc(self.id())))
    }

    /// Position on the disc, 1 or higher. Only known for tracks reached
    /// through an album or artist browser.
    pub fn index(&self) -> Result<Option<u32>> {
        self.check_error()?;
        Ok(non_zero(self.lib().track_index(self.id())))
    }

    pub fn link(&self) -> Result<Link> {
        self.link_with_offset(0)
    }

    /// A link pointing `offset` milliseconds into the track.
    pub fn link_with_offset(&self, offset: u32) -> Result<Link> {
        Link::from_track(self, offset)
    }
}

/// Native sentinel decoding: zero and negative values mean "no value".
fn non_zero(value: i32) -> Option<u32> {
    u32::try_from(value).ok().filter(|value| *value != 0)
}

impl Loadable for Track {
    fn is_loaded(&self) -> bool {
        self.lib().track_is_loaded(self.id())
    }

    fn error(&self) -> ErrorType {
        ErrorType::from_raw(self.lib().track_error(self.id()))
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Track {}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track").field("id", &self.id()).finish()
    }
}

/// Fields of a track that lives outside the streaming catalog.
#[derive(Debug, Clone, Default)]
pub struct LocalTrackInfo {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    /// Milliseconds.
    pub duration: Option<u32>,
}

/// A track created from local metadata rather than resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack(Track);

impl LocalTrack {
    pub fn new(gate: SessionGate, info: &LocalTrackInfo) -> Result<Self> {
        let artist = to_native(info.artist.as_deref())?;
        let title = to_native(info.title.as_deref())?;
        let album = to_native(info.album.as_deref())?;
        let length = match info.duration {
            Some(ms) => i32::try_from(ms)
                .map_err(|_| Error::InvalidArgument(format!("duration of {ms} ms")))?,
            None => UNSPECIFIED_LENGTH,
        };

        let sp_track = gate
            .lib()
            .localtrack_create(artist.as_deref(), title.as_deref(), album.as_deref(), length)
            .ok_or(Error::NullResource(ResourceKind::Track))?;
        log::debug!("created local track {sp_track}");

        // the creation call already vended the reference we keep
        Ok(Self(Track::new(gate, sp_track, false)))
    }

    pub fn into_track(self) -> Track {
        self.0
    }
}

impl Deref for LocalTrack {
    type Target = Track;

    fn deref(&self) -> &Track {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use strum::IntoEnumIterator;

    use crate::{
        domain::{
            loadable::Loadable,
            track::{LocalTrack, LocalTrackInfo, Track, TrackAvailability, TrackOfflineStatus},
        },
        error::{Error, ErrorType},
        native::{
            MemoryLibrary, NativeLibrary,
            memory::{AlbumRecord, ArtistRecord, TrackRecord},
        },
        session::{Session, SessionGate},
    };

    fn setup() -> (Arc<MemoryLibrary>, Session) {
        let lib = Arc::new(MemoryLibrary::new());
        let sp_session = lib.create_session();
        let session = Session::new(lib.clone(), sp_session, false);
        (lib, session)
    }

    fn loaded(name: &str) -> TrackRecord {
        TrackRecord {
            loaded: true,
            name: Some(name.to_string()),
            duration: 210_000,
            popularity: 42,
            disc: 1,
            index: 3,
            availability: TrackAvailability::Available,
            offline_status: TrackOfflineStatus::Done,
            ..Default::default()
        }
    }

    #[test]
    fn retained_track_holds_exactly_one_reference() {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord::default());

        let track = session.track(id, true);
        assert_eq!(lib.refcount(id), 1);

        let copy = track.clone();
        assert_eq!(lib.refcount(id), 2);
        assert_eq!(track, copy);

        drop(track);
        drop(copy);
        assert_eq!(lib.refcount(id), 0);
        assert_eq!(lib.invalid_releases(), 0);
    }

    #[test]
    fn adopted_track_releases_the_vended_reference() {
        let (lib, session) = setup();
        let id = lib.create_track(TrackRecord::default());

        let track = session.track(id, false);
        assert_eq!(lib.refcount(id), 1);

        drop(track);
        assert_eq!(lib.refcount(id), 0);
        assert_eq!(lib.invalid_releases(), 0);
    }

    #[test]
    fn unloaded_track_reads_as_absent() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord::default());
        let track = session.track(id, true);

        assert!(!track.is_loaded());
        assert_eq!(track.error(), ErrorType::Ok);
        assert_eq!(track.name()?, None);
        assert_eq!(track.duration()?, None);
        assert_eq!(track.popularity()?, None);
        assert_eq!(track.disc()?, None);
        assert_eq!(track.index()?, None);
        assert!(track.album()?.is_none());
        assert!(track.artists()?.is_empty());

        assert_eq!(track.is_starred()?, None);
        assert_eq!(track.is_local()?, None);
        assert_eq!(track.is_autolinked()?, None);
        Ok(())
    }

    #[test]
    fn fields_appear_once_loaded() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord::default());
        let track = session.track(id, true);
        assert_eq!(track.duration()?, None);

        lib.update_track(id, |t| *t = loaded("Army of Me"));

        assert!(track.is_loaded());
        assert_eq!(track.name()?.as_deref(), Some("Army of Me"));
        assert_eq!(track.duration()?, Some(210_000));
        assert_eq!(track.disc()?, Some(1));
        assert_eq!(track.index()?, Some(3));
        assert_eq!(track.popularity()?, Some(42));
        assert_eq!(track.availability()?, TrackAvailability::Available);
        assert_eq!(track.offline_status()?, TrackOfflineStatus::Done);
        assert_eq!(track.is_starred()?, Some(false));
        assert_eq!(track.is_local()?, Some(false));
        assert_eq!(track.is_autolinked()?, Some(false));
        assert!(!track.is_placeholder()?);
        Ok(())
    }

    #[test]
    fn zero_popularity_is_a_value_once_loaded() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord {
            popularity: 0,
            disc: 0,
            ..loaded("B-side")
        });
        let track = session.track(id, true);

        assert_eq!(track.popularity()?, Some(0));
        assert_eq!(track.disc()?, None);
        Ok(())
    }

    #[test]
    fn native_error_fails_gated_accessors_without_reading_fields() {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord {
            error: ErrorType::OtherPermanent,
            ..loaded("Broken")
        });
        let track = session.track(id, true);

        assert!(track.is_loaded());
        assert_eq!(track.error(), ErrorType::OtherPermanent);

        let reads = lib.field_reads();
        let failures = [
            track.name().err(),
            track.album().err(),
            track.duration().err(),
            track.popularity().err(),
            track.disc().err(),
            track.index().err(),
            track.artists().err(),
            track.is_placeholder().err(),
            track.offline_status().err(),
            track.availability().err(),
            track.is_local().err(),
            track.is_autolinked().err(),
            track.is_starred().err(),
            track.playable().err(),
        ];
        for failure in failures {
            assert!(matches!(
                failure,
                Some(Error::Native(ErrorType::OtherPermanent))
            ));
        }
        assert_eq!(lib.field_reads(), reads);
    }

    #[test]
    fn session_scoped_accessors_need_a_live_session() {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord {
            error: ErrorType::OtherPermanent,
            ..Default::default()
        });
        let track = session.track(id, true);
        session.shutdown();

        let calls = lib.native_calls();
        assert!(matches!(track.availability(), Err(Error::SessionRequired)));
        assert!(matches!(track.offline_status(), Err(Error::SessionRequired)));
        assert!(matches!(track.is_local(), Err(Error::SessionRequired)));
        assert!(matches!(track.is_autolinked(), Err(Error::SessionRequired)));
        assert!(matches!(track.is_starred(), Err(Error::SessionRequired)));
        assert!(matches!(track.playable(), Err(Error::SessionRequired)));
        assert!(matches!(track.set_starred(true), Err(Error::SessionRequired)));
        assert_eq!(lib.native_calls(), calls);

        // not session scoped, so the error code wins
        assert!(matches!(
            track.name(),
            Err(Error::Native(ErrorType::OtherPermanent))
        ));
    }

    #[test]
    fn detached_track_fails_liveness_whatever_its_state() {
        let lib = Arc::new(MemoryLibrary::new());
        let id = lib.insert_track(loaded("Isobel"));
        let native: Arc<dyn NativeLibrary> = lib.clone();
        let track = Track::new(SessionGate::detached(native), id, true);

        assert!(matches!(track.availability(), Err(Error::SessionRequired)));
        assert_eq!(track.name().unwrap().as_deref(), Some("Isobel"));
    }

    #[test]
    fn playable_follows_autolinks_into_a_new_wrapper() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let target = lib.insert_track(loaded("Hunter (remaster)"));
        let original = lib.insert_track(TrackRecord {
            autolinked_to: Some(target),
            ..loaded("Hunter")
        });
        let track = session.track(original, true);

        assert_eq!(track.is_autolinked()?, Some(true));
        let playable = track.playable()?.unwrap();
        assert_ne!(playable, track);
        assert_eq!(playable.id(), target);
        assert_eq!(lib.refcount(target), 1);
        assert_eq!(playable.name()?.as_deref(), Some("Hunter (remaster)"));

        let plain = session.track(target, true);
        assert_eq!(plain.playable()?.unwrap(), plain);

        drop(playable);
        drop(plain);
        assert_eq!(lib.refcount(target), 0);
        Ok(())
    }

    #[test]
    fn album_and_artists_are_retained_wrappers() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let artist = lib.insert_artist(ArtistRecord {
            loaded: true,
            name: Some("Björk".into()),
            ..Default::default()
        });
        let album = lib.insert_album(AlbumRecord {
            loaded: true,
            name: Some("Post".into()),
            artist: Some(artist),
            ..Default::default()
        });
        let id = lib.insert_track(TrackRecord {
            album: Some(album),
            artists: vec![artist],
            ..loaded("Isobel")
        });
        let track = session.track(id, true);

        let track_album = track.album()?.unwrap();
        assert_eq!(track_album.name().as_deref(), Some("Post"));
        assert_eq!(lib.refcount(album), 1);

        let artists = track.artists()?;
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].name().as_deref(), Some("Björk"));
        assert_eq!(lib.refcount(artist), 1);

        drop(track_album);
        drop(artists);
        assert_eq!(lib.refcount(album), 0);
        assert_eq!(lib.refcount(artist), 0);
        Ok(())
    }

    #[test]
    fn starring_goes_through_the_session() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let first = session.track(lib.insert_track(loaded("Joga")), true);
        let second = session.track(lib.insert_track(loaded("Bachelorette")), true);

        first.set_starred(true)?;
        assert_eq!(first.is_starred()?, Some(true));
        assert_eq!(second.is_starred()?, Some(false));

        Track::set_all_starred(&[first.clone(), second.clone()], true)?;
        assert_eq!(second.is_starred()?, Some(true));

        Track::set_all_starred(&[], false)?;
        Ok(())
    }

    #[test]
    fn starring_needs_every_track_in_one_live_session() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let other = Session::new(lib.clone(), lib.create_session(), false);
        let ours = session.track(lib.insert_track(loaded("Joga")), true);
        let theirs = other.track(lib.insert_track(loaded("Hunter")), true);

        assert!(matches!(
            Track::set_all_starred(&[ours.clone(), theirs.clone()], true),
            Err(Error::InvalidArgument(_))
        ));

        other.shutdown();
        assert!(matches!(
            Track::set_all_starred(&[ours.clone(), theirs.clone()], true),
            Err(Error::SessionRequired)
        ));
        assert_eq!(ours.is_starred()?, Some(false));
        assert!(!lib.track_record(theirs.id()).unwrap().starred);
        Ok(())
    }

    #[test]
    fn local_track_round_trip() -> anyhow::Result<()> {
        let (lib, session) = setup();

        let local = session.local_track(&LocalTrackInfo {
            artist: Some("A".into()),
            title: Some("T".into()),
            album: Some("Alb".into()),
            duration: None,
        })?;
        let id = local.id();
        assert_eq!(lib.refcount(id), 1);
        assert_eq!(lib.track_record(id).unwrap().duration, -1);

        assert_eq!(local.name()?.as_deref(), Some("T"));
        assert_eq!(local.album()?.unwrap().name().as_deref(), Some("Alb"));
        assert_eq!(local.artists()?[0].name().as_deref(), Some("A"));
        assert_eq!(local.duration()?, None);
        assert_eq!(local.is_local()?, Some(true));

        drop(local);
        assert_eq!(lib.refcount(id), 0);
        assert_eq!(lib.invalid_releases(), 0);
        Ok(())
    }

    #[test]
    fn local_track_fields_are_optional() -> anyhow::Result<()> {
        let (_lib, session) = setup();

        let local = session.local_track(&LocalTrackInfo {
            duration: Some(0),
            ..Default::default()
        })?;

        assert_eq!(local.name()?, None);
        assert!(local.album()?.is_none());
        assert!(local.artists()?.is_empty());
        assert_eq!(local.duration()?, None);

        let track: Track = local.into_track();
        assert!(track.is_loaded());
        Ok(())
    }

    #[test]
    fn local_track_creation_failures() {
        let (lib, session) = setup();

        let err = session
            .local_track(&LocalTrackInfo {
                title: Some("nul\0byte".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidText(_)));

        let err = session
            .local_track(&LocalTrackInfo {
                duration: Some(u32::MAX),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        lib.refuse_creation(true);
        let err = session.local_track(&LocalTrackInfo::default()).unwrap_err();
        assert!(matches!(err, Error::NullResource(_)));
    }

    #[test]
    fn unrecognized_native_values_are_kept() -> anyhow::Result<()> {
        let (lib, session) = setup();
        let id = lib.insert_track(TrackRecord {
            availability: TrackAvailability::from_raw(12),
            ..loaded("Future")
        });
        let track = session.track(id, true);

        assert_eq!(track.availability()?, TrackAvailability::Unrecognized(12));
        Ok(())
    }

    #[test]
    fn enum_tables_strip_their_prefix() {
        assert_eq!(
            TrackAvailability::from_native_name("SP_TRACK_AVAILABILITY_BANNED_BY_ARTIST"),
            Some(TrackAvailability::BannedByArtist)
        );
        assert_eq!(
            TrackOfflineStatus::DoneResync.native_name().as_deref(),
            Some("SP_TRACK_OFFLINE_DONE_RESYNC")
        );
        for status in TrackOfflineStatus::iter() {
            assert_eq!(TrackOfflineStatus::from_raw(status.raw()), status);
        }
    }
}
