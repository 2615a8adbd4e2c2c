//! Kodi JSON-RPC request and response types
//!
//! See: https://kodi.wiki/view/JSON-RPC_API/v12

use core_library::models::{Episode, Movie, ResumeState, WatchState};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const GET_MOVIES: &str = "VideoLibrary.GetMovies";
pub const GET_EPISODES: &str = "VideoLibrary.GetEpisodes";
pub const SET_MOVIE_DETAILS: &str = "VideoLibrary.SetMovieDetails";
pub const SET_EPISODE_DETAILS: &str = "VideoLibrary.SetEpisodeDetails";

pub const MOVIES_REQUEST_ID: &str = "libMovies";
pub const EPISODES_REQUEST_ID: &str = "libEpisodes";

pub const MOVIE_PROPERTIES: &[&str] = &["year", "resume", "imdbnumber", "playcount"];
pub const EPISODE_PROPERTIES: &[&str] = &["title", "showtitle", "resume", "uniqueid", "playcount"];

// =============================================================================
// Requests
// =============================================================================

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: &'static str,
}

impl<P> JsonRpcRequest<P> {
    pub fn new(method: &'static str, params: P, id: &'static str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

/// Sort clause for list queries
#[derive(Debug, Clone, Serialize)]
pub struct Sort {
    pub order: &'static str,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignorearticle: Option<bool>,
}

/// Parameters of `GetMovies` / `GetEpisodes`
#[derive(Debug, Clone, Serialize)]
pub struct ListParams {
    pub properties: &'static [&'static str],
    pub sort: Sort,
}

impl ListParams {
    /// Movies sorted by label, ignoring leading articles
    pub fn movies() -> Self {
        Self {
            properties: MOVIE_PROPERTIES,
            sort: Sort {
                order: "ascending",
                method: "label",
                ignorearticle: Some(true),
            },
        }
    }

    /// Episodes sorted by label
    pub fn episodes() -> Self {
        Self {
            properties: EPISODE_PROPERTIES,
            sort: Sort {
                order: "ascending",
                method: "label",
                ignorearticle: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeParam {
    pub position: u64,
}

/// Parameters of `SetMovieDetails` / `SetEpisodeDetails`.
///
/// Exactly one of the two ids is set; absent fields are omitted so Kodi
/// leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetDetailsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movieid: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodeid: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub playcount: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeParam>,
}

// =============================================================================
// Responses
// =============================================================================

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct JsonRpcResponse<R> {
    #[serde(default)]
    pub id: Option<Value>,

    #[serde(default)]
    pub result: Option<R>,

    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// `GetMovies` result; a library without movies omits the array
#[derive(Debug, Default, Deserialize)]
pub struct MoviesResult {
    #[serde(default)]
    pub movies: Vec<KodiMovie>,
}

/// `GetEpisodes` result; a library without episodes omits the array
#[derive(Debug, Default, Deserialize)]
pub struct EpisodesResult {
    #[serde(default)]
    pub episodes: Vec<KodiEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KodiResume {
    #[serde(default, deserialize_with = "whole_seconds")]
    pub position: u64,

    #[serde(default, deserialize_with = "whole_seconds")]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KodiMovie {
    pub movieid: u64,

    #[serde(default)]
    pub label: String,

    #[serde(default, deserialize_with = "loose_string")]
    pub year: String,

    #[serde(default, deserialize_with = "loose_string")]
    pub imdbnumber: String,

    #[serde(default, deserialize_with = "play_count")]
    pub playcount: u32,

    #[serde(default)]
    pub resume: KodiResume,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KodiEpisode {
    pub episodeid: u64,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub showtitle: String,

    #[serde(default, deserialize_with = "play_count")]
    pub playcount: u32,

    #[serde(default)]
    pub resume: KodiResume,
}

impl From<KodiResume> for ResumeState {
    fn from(resume: KodiResume) -> Self {
        ResumeState::new(resume.position, resume.total)
    }
}

impl From<KodiMovie> for Movie {
    fn from(movie: KodiMovie) -> Self {
        Movie {
            library_id: movie.movieid,
            external_number: movie.imdbnumber,
            year: movie.year,
            state: WatchState {
                label: movie.label,
                resume: movie.resume.into(),
                play_count: movie.playcount,
                ..Default::default()
            },
        }
    }
}

impl From<KodiEpisode> for Episode {
    fn from(episode: KodiEpisode) -> Self {
        // Kodi fills label from title, older versions leave it empty
        let label = if episode.label.is_empty() {
            episode.title
        } else {
            episode.label
        };

        Episode {
            library_id: episode.episodeid,
            show_title: episode.showtitle,
            state: WatchState {
                label,
                resume: episode.resume.into(),
                play_count: episode.playcount,
                ..Default::default()
            },
        }
    }
}

// =============================================================================
// Tolerant decoders
// =============================================================================

/// Accept a string, a number or null as a string
fn loose_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn number_as_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| *f > 0.0)
            .map(|f| f.trunc() as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Resume values arrive as floating point seconds; keep whole seconds
fn whole_seconds<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_as_u64(&Value::deserialize(deserializer)?))
}

fn play_count<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = number_as_u64(&Value::deserialize(deserializer)?);
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}
