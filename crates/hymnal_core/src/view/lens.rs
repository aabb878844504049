//! View-selection rules.

use crate::model::item::{Mood, UnknownMood};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Mood lens filter. `Any` shows the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoodFilter {
    #[default]
    Any,
    Only(Mood),
}

/// Named rule deciding which items a container displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lens {
    All,
    Favorites,
    Notes,
    Mood(MoodFilter),
}

impl Display for Lens {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Lens::All => f.write_str("all"),
            Lens::Favorites => f.write_str("favorites"),
            Lens::Notes => f.write_str("notes"),
            Lens::Mood(MoodFilter::Any) => f.write_str("mood:all"),
            Lens::Mood(MoodFilter::Only(mood)) => write!(f, "mood:{mood}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LensParseError {
    UnknownLens(String),
    UnknownMood(UnknownMood),
}

impl Display for LensParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLens(value) => write!(
                f,
                "unknown view `{value}`; expected all|favorites|notes|mood:<label>"
            ),
            Self::UnknownMood(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LensParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownMood(err) => Some(err),
            Self::UnknownLens(_) => None,
        }
    }
}

impl FromStr for Lens {
    type Err = LensParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "all" => Ok(Lens::All),
            "favorites" => Ok(Lens::Favorites),
            "notes" => Ok(Lens::Notes),
            other => {
                let label = other
                    .strip_prefix("mood:")
                    .ok_or_else(|| LensParseError::UnknownLens(value.trim().to_string()))?;
                if label == "all" {
                    return Ok(Lens::Mood(MoodFilter::Any));
                }
                label
                    .parse::<Mood>()
                    .map(|mood| Lens::Mood(MoodFilter::Only(mood)))
                    .map_err(LensParseError::UnknownMood)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lens, LensParseError, MoodFilter};
    use crate::model::item::Mood;

    #[test]
    fn parses_every_lens_form_and_displays_back() {
        for (raw, lens) in [
            ("all", Lens::All),
            ("Favorites", Lens::Favorites),
            ("notes", Lens::Notes),
            ("mood:all", Lens::Mood(MoodFilter::Any)),
            ("mood:calm", Lens::Mood(MoodFilter::Only(Mood::Calm))),
        ] {
            let parsed = raw.parse::<Lens>().unwrap();
            assert_eq!(parsed, lens);
            assert_eq!(parsed.to_string(), raw.to_ascii_lowercase());
        }
    }

    #[test]
    fn rejects_unknown_lens_and_mood() {
        assert!(matches!(
            "recent".parse::<Lens>(),
            Err(LensParseError::UnknownLens(_))
        ));
        assert!(matches!(
            "mood:angry".parse::<Lens>(),
            Err(LensParseError::UnknownMood(_))
        ));
    }
}
