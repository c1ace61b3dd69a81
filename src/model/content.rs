//! Records decoded from SoundCloud API responses

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use reqwest::Url;
use serde::Deserialize;

use crate::config::Config;

/// Timestamp layout the API uses, e.g. `2009/08/13 18:30:10 +0000`
const CREATED_AT_FORMAT: &str = "%Y/%m/%d %H:%M:%S %z";

/// The account that uploaded a track
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub uri: String,
    pub permalink_url: Option<String>,
    pub avatar_url: Option<String>,
}

/// A track from search results
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Track {
    pub id: u64,
    pub created_at: String,
    pub user: User,
    pub streamable: bool,
    pub downloadable: bool,

    pub permalink_url: String,
    pub purchase_url: Option<String>,
    pub artwork_url: Option<String>,
    pub stream_url: Option<String>,
    pub download_url: Option<String>,
    pub video_url: Option<String>,

    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub label_name: Option<String>,
    /// Length in milliseconds
    pub duration: u64,
    pub license: Option<String>,
}

impl Track {
    /// Discriminator value of track items in heterogeneous result lists
    pub const KIND: &'static str = "track";

    /// Cover art, falling back to the uploader's avatar
    pub fn artwork(&self) -> Option<&str> {
        self.artwork_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or(self.user.avatar_url.as_deref())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT).ok()
    }

    /// Playable stream address; anonymous playback needs the client id attached
    pub fn stream_url_for(&self, config: &Config) -> Option<Url> {
        let mut url = Url::parse(self.stream_url.as_deref()?).ok()?;
        if !config.authenticated {
            url.query_pairs_mut()
                .append_pair("client_id", &config.client_id);
        }
        Some(url)
    }
}
