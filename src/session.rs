//! The active session and the liveness gate handed to metadata objects.
//!
//! Instead of a process-wide session slot, every metadata object carries a
//! [`SessionGate`]: the native library plus a weak reference to the session
//! that created it. Once the [`Session`] is shut down the gate stops opening
//! and session-scoped accessors fail with [`Error::SessionRequired`].

use std::sync::{Arc, Weak};

use crate::{
    domain::{
        album::Album,
        artist::Artist,
        link::Link,
        track::{LocalTrack, LocalTrackInfo, Track},
    },
    error::{Error, Result},
    native::{NativeHandle, NativeLibrary, ResourceId, ResourceKind},
};

/// A live native session. Dropping it ends the session.
pub struct Session {
    handle: Arc<NativeHandle>,
    lib: Arc<dyn NativeLibrary>,
}

impl Session {
    /// Wraps a native session resource created by the session bootstrap.
    pub fn new(lib: Arc<dyn NativeLibrary>, sp_session: ResourceId, add_ref: bool) -> Self {
        let handle = NativeHandle::acquire(lib.clone(), ResourceKind::Session, sp_session, add_ref);
        log::info!("session {sp_session} started");
        Self {
            handle: Arc::new(handle),
            lib,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.handle.id()
    }

    pub fn gate(&self) -> SessionGate {
        SessionGate {
            lib: self.lib.clone(),
            session: Arc::downgrade(&self.handle),
        }
    }

    pub fn track(&self, sp_track: ResourceId, add_ref: bool) -> Track {
        Track::new(self.gate(), sp_track, add_ref)
    }

    pub fn album(&self, sp_album: ResourceId, add_ref: bool) -> Album {
        Album::new(self.gate(), sp_album, add_ref)
    }

    pub fn artist(&self, sp_artist: ResourceId, add_ref: bool) -> Artist {
        Artist::new(self.gate(), sp_artist, add_ref)
    }

    pub fn local_track(&self, info: &LocalTrackInfo) -> Result<LocalTrack> {
        LocalTrack::new(self.gate(), info)
    }

    pub fn link(&self, uri: &str) -> Result<Link> {
        Link::from_string(&self.gate(), uri)
    }

    /// Ends the session. Gates handed out earlier stop opening.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        log::info!("session {} shut down", self.handle.id());
    }
}

/// Liveness check plus native library access, carried by metadata objects.
#[derive(Clone)]
pub struct SessionGate {
    lib: Arc<dyn NativeLibrary>,
    session: Weak<NativeHandle>,
}

impl SessionGate {
    /// A gate with no session behind it; it never opens.
    pub fn detached(lib: Arc<dyn NativeLibrary>) -> Self {
        Self {
            lib,
            session: Weak::new(),
        }
    }

    pub fn lib(&self) -> Arc<dyn NativeLibrary> {
        self.lib.clone()
    }

    pub fn is_active(&self) -> bool {
        self.session.strong_count() > 0
    }

    /// The active session, or the liveness fault.
    pub fn require(&self) -> Result<Arc<NativeHandle>> {
        self.session.upgrade().ok_or(Error::SessionRequired)
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("active", &self.is_active())
            .finish()
    }
}
