use std::fmt::Display;

use serde::Serialize;

use crate::{
    domain::{Loadable, Track},
    error::Result,
};

/// An accessor's outcome, with errors kept as their message.
pub type Field<T> = Result<T, String>;

fn field<T>(value: Result<T>) -> Field<T> {
    value.map_err(|e| e.to_string())
}

/// Snapshot of everything a track exposes.
#[derive(Debug, Serialize)]
pub struct TrackReport {
    pub link: Field<String>,
    pub is_loaded: bool,
    pub error: String,
    pub name: Field<Option<String>>,
    pub album: Field<Option<String>>,
    pub artists: Field<Vec<String>>,
    pub duration: Field<Option<u32>>,
    pub popularity: Field<Option<u32>>,
    pub disc: Field<Option<u32>>,
    pub index: Field<Option<u32>>,
    pub availability: Field<String>,
    pub offline_status: Field<String>,
    pub is_local: Field<Option<bool>>,
    pub is_autolinked: Field<Option<bool>>,
    pub is_starred: Field<Option<bool>>,
    pub is_placeholder: Field<bool>,
    pub playable: Field<Option<String>>,
}

impl TrackReport {
    pub fn from_track(track: &Track, offset: u32) -> Self {
        Self {
            link: field(track.link_with_offset(offset).map(|link| link.uri())),
            is_loaded: track.is_loaded(),
            error: track.error().to_string(),
            name: field(track.name()),
            album: field(track.album().map(|album| album.and_then(|a| a.name()))),
            artists: field(
                track
                    .artists()
                    .map(|artists| artists.iter().filter_map(|a| a.name()).collect()),
            ),
            duration: field(track.duration()),
            popularity: field(track.popularity()),
            disc: field(track.disc()),
            index: field(track.index()),
            availability: field(track.availability().map(|a| a.to_string())),
            offline_status: field(track.offline_status().map(|s| s.to_string())),
            is_local: field(track.is_local()),
            is_autolinked: field(track.is_autolinked()),
            is_starred: field(track.is_starred()),
            is_placeholder: field(track.is_placeholder()),
            playable: field(track.playable().and_then(|playable| {
                playable.map(|t| t.link().map(|link| link.uri())).transpose()
            })),
        }
    }

    pub fn print(&self) {
        println!("Track: {}", show(&self.link));
        println!("  loaded:         {}", self.is_loaded);
        println!("  error:          {}", self.error);
        println!("  name:           {}", show_opt(&self.name));
        println!("  album:          {}", show_opt(&self.album));
        println!(
            "  artists:        {}",
            show(&self.artists.as_ref().map(|a| a.join(", ")).map_err(|e| e.clone()))
        );
        println!("  duration (ms):  {}", show_opt(&self.duration));
        println!("  popularity:     {}", show_opt(&self.popularity));
        println!("  disc:           {}", show_opt(&self.disc));
        println!("  index:          {}", show_opt(&self.index));
        println!("  availability:   {}", show(&self.availability));
        println!("  offline status: {}", show(&self.offline_status));
        println!("  local:          {}", show_opt(&self.is_local));
        println!("  autolinked:     {}", show_opt(&self.is_autolinked));
        println!("  starred:        {}", show_opt(&self.is_starred));
        println!("  placeholder:    {}", show(&self.is_placeholder));
        println!("  playable:       {}", show_opt(&self.playable));
    }
}

fn show<T: Display>(value: &Field<T>) -> String {
    match value {
        Ok(value) => value.to_string(),
        Err(e) => format!("<{e}>"),
    }
}

fn show_opt<T: Display>(value: &Field<Option<T>>) -> String {
    match value {
        Ok(Some(value)) => value.to_string(),
        Ok(None) => "-".to_string(),
        Err(e) => format!("<{e}>"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        cli::report::{TrackReport, show_opt},
        error::ErrorType,
        native::{MemoryLibrary, memory::TrackRecord},
        session::Session,
    };

    #[test]
    fn report_of_a_loaded_track() {
        let lib = Arc::new(MemoryLibrary::new());
        let session = Session::new(lib.clone(), lib.create_session(), false);
        let id = lib.insert_track(TrackRecord {
            uri: "spotify:track:abc".into(),
            loaded: true,
            name: Some("Glory Box".into()),
            duration: 306_000,
            ..Default::default()
        });

        let report = TrackReport::from_track(&session.track(id, true), 5_000);

        assert_eq!(report.link.as_deref(), Ok("spotify:track:abc#0:05"));
        assert_eq!(report.name, Ok(Some("Glory Box".to_string())));
        assert_eq!(report.duration, Ok(Some(306_000)));
        assert_eq!(report.disc, Ok(None));
        assert_eq!(report.availability.as_deref(), Ok("UNAVAILABLE"));
        assert_eq!(report.playable, Ok(Some("spotify:track:abc".to_string())));
        assert_eq!(show_opt(&report.disc), "-");
    }

    #[test]
    fn report_keeps_failures() {
        let lib = Arc::new(MemoryLibrary::new());
        let session = Session::new(lib.clone(), lib.create_session(), false);
        let id = lib.insert_track(TrackRecord {
            error: ErrorType::OtherTransient,
            ..Default::default()
        });
        let track = session.track(id, true);
        session.shutdown();

        let report = TrackReport::from_track(&track, 0);

        assert_eq!(report.error, "OTHER_TRANSIENT");
        assert_eq!(
            report.name,
            Err("native error: OTHER_TRANSIENT".to_string())
        );
        assert_eq!(
            report.is_starred,
            Err("operation requires an initialized session".to_string())
        );
        assert!(report.link.is_ok());
        assert_eq!(
            show_opt(&report.is_starred),
            "<operation requires an initialized session>"
        );
    }
}
