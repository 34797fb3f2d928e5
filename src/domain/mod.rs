//! Metadata objects wrapping native resources.

pub mod album;
pub mod artist;
pub mod link;
pub mod loadable;
pub mod track;

pub use album::{Album, AlbumType};
pub use artist::Artist;
pub use link::{Link, LinkType};
pub use loadable::Loadable;
pub use track::{LocalTrack, LocalTrackInfo, Track, TrackAvailability, TrackOfflineStatus};
