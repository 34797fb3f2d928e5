use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use crate::{
    config,
    domain::{Link, LinkType, Loadable, LocalTrack, LocalTrackInfo, Track},
    native::{MemoryLibrary, NativeLibrary},
    session::{Session, SessionGate},
};

pub mod report;

use report::TrackReport;

#[derive(Parser)]
#[command(name = "spotmeta")]
#[command(version = "0.1")]
#[command(about = "Inspect music metadata held by the native client library")]
pub struct Cli {
    /// Path to the catalog TOML file
    #[arg(short, long, default_value = "catalog.toml")]
    pub config: PathBuf,

    /// Run without an active session
    #[arg(long)]
    pub no_session: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tracks in the catalog
    List,
    /// Show everything known about a track
    Track {
        uri: String,
        /// Offset into the track in milliseconds, used for the printed link
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a local track and show it
    Local {
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        album: Option<String>,
        /// Duration in milliseconds
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Resolve a link and show what it points at
    Link { uri: String },
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config)?;
    let lib = Arc::new(
        MemoryLibrary::from_catalog(&cfg.catalog).context("Failed to build catalog")?,
    );
    let native: Arc<dyn NativeLibrary> = lib.clone();

    let session = (cfg.session.active && !cli.no_session)
        .then(|| Session::new(native.clone(), lib.create_session(), false));
    let gate = match &session {
        Some(session) => session.gate(),
        None => {
            log::warn!("running without a session");
            SessionGate::detached(native.clone())
        }
    };

    match &cli.command {
        Commands::List => {
            for id in lib.track_ids() {
                let track = Track::new(gate.clone(), id, true);
                let report = TrackReport::from_track(&track, 0);
                println!(
                    "{}  {}  {}",
                    report.link.unwrap_or_default(),
                    report.name.ok().flatten().unwrap_or_else(|| "-".into()),
                    report
                        .duration
                        .ok()
                        .flatten()
                        .map(format_duration)
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }

        Commands::Track { uri, offset, json } => {
            let track = resolve_track(&lib, &gate, uri)?;
            let report = TrackReport::from_track(&track, *offset);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
        }

        Commands::Local {
            artist,
            title,
            album,
            duration,
        } => {
            let info = LocalTrackInfo {
                artist: artist.clone(),
                title: title.clone(),
                album: album.clone(),
                duration: *duration,
            };
            let local = LocalTrack::new(gate.clone(), &info)?;
            TrackReport::from_track(&local, 0).print();
        }

        Commands::Link { uri } => {
            let link = Link::from_string(&gate, uri)?;
            println!("Link: {link}");
            println!("  type: {}", link.link_type());
            match link.link_type() {
                LinkType::Track | LinkType::LocalTrack => {
                    let track = link
                        .as_track()
                        .ok_or_else(|| anyhow!("{uri} resolves to no track"))?;
                    println!("  offset (ms): {}", link.as_track_offset().unwrap_or_default());
                    println!("  loaded: {}", track.is_loaded());
                    println!("  name: {}", track.name()?.unwrap_or_else(|| "-".into()));
                }
                LinkType::Album => {
                    let album = link
                        .as_album()
                        .ok_or_else(|| anyhow!("{uri} resolves to no album"))?;
                    println!("  loaded: {}", album.is_loaded());
                    println!("  name: {}", album.name().unwrap_or_else(|| "-".into()));
                }
                LinkType::Artist => {
                    let artist = link
                        .as_artist()
                        .ok_or_else(|| anyhow!("{uri} resolves to no artist"))?;
                    println!("  loaded: {}", artist.is_loaded());
                    println!("  name: {}", artist.name().unwrap_or_else(|| "-".into()));
                }
                other => println!("  unsupported link type {other}"),
            }
        }
    }

    if let Some(session) = session {
        session.shutdown();
    }
    Ok(())
}

/// Resolves through a link when a session is up, otherwise straight from
/// the catalog.
fn resolve_track(lib: &MemoryLibrary, gate: &SessionGate, uri: &str) -> anyhow::Result<Track> {
    if gate.is_active() {
        let link = Link::from_string(gate, uri)?;
        return link
            .as_track()
            .ok_or_else(|| anyhow!("{uri} does not point at a track"));
    }
    let id = lib
        .lookup(uri)
        .with_context(|| format!("track {uri} not in catalog"))?;
    Ok(Track::new(gate.clone(), id, true))
}

fn format_duration(ms: u32) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
