//! Reference-counted, lazily loaded handles to music metadata (tracks,
//! albums, artists, links) held by a native streaming-client library.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod native;
pub mod session;

pub use domain::{
    Album, AlbumType, Artist, Link, LinkType, Loadable, LocalTrack, LocalTrackInfo, Track,
    TrackAvailability, TrackOfflineStatus,
};
pub use error::{Error, ErrorType, Result};
pub use session::{Session, SessionGate};
