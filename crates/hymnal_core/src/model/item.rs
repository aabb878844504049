//! Catalog item and mood vocabulary.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable identifier of one catalog item.
pub type ItemId = u32;

/// One hymn in the catalog.
///
/// The external catalog document has used several field spellings over time;
/// aliases accept all of them so one record shape covers every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Inline lyrics, when the catalog ships them.
    #[serde(default, alias = "lyrics", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Reference for lazily fetched lyrics.
    #[serde(
        default,
        rename = "bodyRef",
        alias = "lyricsFile",
        alias = "body_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub body_ref: Option<String>,
    #[serde(default, rename = "audioRef", alias = "audio", alias = "audio_ref")]
    pub audio_ref: String,
    /// Author-assigned mood. Distinct from the user's own mood tag.
    #[serde(
        default,
        rename = "category",
        alias = "mood",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: None,
            body_ref: None,
            audio_ref: String::new(),
            category: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_body_ref(mut self, body_ref: impl Into<String>) -> Self {
        self.body_ref = Some(body_ref.into());
        self
    }

    pub fn with_audio(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = audio_ref.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Display number, zero-padded to three digits (`7` -> `"007"`).
    pub fn number_label(&self) -> String {
        format!("{:03}", self.id)
    }
}

/// Fixed vocabulary for user mood tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Worshipful,
    Calm,
    Happy,
    Reflective,
    Hopeful,
    Joyful,
    Sorrowful,
    Thankful,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Worshipful,
        Mood::Calm,
        Mood::Happy,
        Mood::Reflective,
        Mood::Hopeful,
        Mood::Joyful,
        Mood::Sorrowful,
        Mood::Thankful,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Worshipful => "worshipful",
            Mood::Calm => "calm",
            Mood::Happy => "happy",
            Mood::Reflective => "reflective",
            Mood::Hopeful => "hopeful",
            Mood::Joyful => "joyful",
            Mood::Sorrowful => "sorrowful",
            Mood::Thankful => "thankful",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood label outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMood(pub String);

impl Display for UnknownMood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown mood `{}`", self.0)
    }
}

impl Error for UnknownMood {}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == normalized)
            .ok_or_else(|| UnknownMood(value.trim().to_string()))
    }
}
