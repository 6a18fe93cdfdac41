use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use validator::Validate;

use crate::{error::CinemaError, utils::deserialize_some};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRating {
    #[serde(rename = "L")]
    Free,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "12")]
    Twelve,
    #[serde(rename = "14")]
    Fourteen,
    #[serde(rename = "16")]
    Sixteen,
    #[serde(rename = "18")]
    Eighteen,
}

impl AgeRating {
    pub fn label(&self) -> &'static str {
        match self {
            AgeRating::Free => "L",
            AgeRating::Ten => "10",
            AgeRating::Twelve => "12",
            AgeRating::Fourteen => "14",
            AgeRating::Sixteen => "16",
            AgeRating::Eighteen => "18",
        }
    }

    /// Text shown on the rating badge.
    pub fn badge(&self) -> String {
        match self {
            AgeRating::Free => "Livre".to_string(),
            other => format!("{}+", other.label()),
        }
    }
}

impl FromStr for AgeRating {
    type Err = CinemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L" => Ok(AgeRating::Free),
            "10" => Ok(AgeRating::Ten),
            "12" => Ok(AgeRating::Twelve),
            "14" => Ok(AgeRating::Fourteen),
            "16" => Ok(AgeRating::Sixteen),
            "18" => Ok(AgeRating::Eighteen),
            other => Err(CinemaError::validation(format!("unknown age rating: {other:?}"))),
        }
    }
}

impl fmt::Display for AgeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dubbed or subtitled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "DUB")]
    Dubbed,
    #[serde(rename = "LEG")]
    Subtitled,
}

impl FromStr for SessionType {
    type Err = CinemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DUB" => Ok(SessionType::Dubbed),
            "LEG" => Ok(SessionType::Subtitled),
            other => Err(CinemaError::validation(format!("unknown session type: {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tech {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

impl FromStr for Tech {
    type Err = CinemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2D" => Ok(Tech::TwoD),
            "3D" => Ok(Tech::ThreeD),
            other => Err(CinemaError::validation(format!("unknown projection: {other:?}"))),
        }
    }
}

/// A recurring showtime, without its owning movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showtime {
    pub time: String,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub tech: Tech,
    #[serde(default)]
    pub highlight: bool,
}

impl Showtime {
    pub fn new(time: impl Into<String>, session_type: SessionType, tech: Tech) -> Self {
        Showtime {
            time: time.into(),
            days: Vec::new(),
            session_type,
            tech,
            highlight: false,
        }
    }

    /// An empty `days` list means the showtime runs every day.
    pub fn runs_on(&self, weekday: &str) -> bool {
        self.days.is_empty() || self.days.iter().any(|day| day == weekday)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub movie_id: String,
    #[serde(flatten)]
    pub showtime: Showtime,
}

/// Every scalar field of a movie. Shared by stored movies, new movies and storage rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MovieDetails {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub poster_url: String,
    #[serde(default)]
    pub hero_image_url: Option<String>,
    pub age_rating: AgeRating,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast_members: Vec<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub is_coming_soon: bool,
}

impl MovieDetails {
    pub fn new(title: impl Into<String>, poster_url: impl Into<String>, age_rating: AgeRating) -> Self {
        MovieDetails {
            title: title.into(),
            poster_url: poster_url.into(),
            hero_image_url: None,
            age_rating,
            genres: Vec::new(),
            duration: None,
            synopsis: None,
            director: None,
            cast_members: Vec::new(),
            trailer_url: None,
            is_coming_soon: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    #[serde(flatten)]
    pub details: MovieDetails,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Movie {
    /// Builds a movie that owns the given showtimes.
    pub fn assemble(id: impl Into<String>, details: MovieDetails, showtimes: Vec<Showtime>) -> Self {
        let id = id.into();
        let sessions = showtimes
            .into_iter()
            .map(|showtime| Session {
                movie_id: id.clone(),
                showtime,
            })
            .collect();
        Movie {
            id,
            details,
            sessions,
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.details.genres.iter().any(|g| g == genre)
    }

    /// Featured movies are the ones with a hero image for the carousel.
    pub fn is_featured(&self) -> bool {
        self.details.hero_image_url.is_some()
    }

    pub fn showtimes(&self) -> impl Iterator<Item = &Showtime> {
        self.sessions.iter().map(|session| &session.showtime)
    }

    pub fn replace_sessions(&mut self, showtimes: Vec<Showtime>) {
        self.sessions = showtimes
            .into_iter()
            .map(|showtime| Session {
                movie_id: self.id.clone(),
                showtime,
            })
            .collect();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewMovie {
    #[serde(flatten)]
    #[validate(nested)]
    pub details: MovieDetails,
    #[serde(default)]
    pub sessions: Vec<Showtime>,
}

/// Partial movie record. Absent fields are kept; `null` clears a nullable field.
///
/// `sessions`, when present, replaces the whole session set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MovieUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub poster_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_rating: Option<AgeRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub director: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_members: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_coming_soon: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<Showtime>>,
}

impl MovieUpdate {
    /// An update that overwrites every field, sessions included.
    pub fn replacing(movie: NewMovie) -> Self {
        let NewMovie { details, sessions } = movie;
        MovieUpdate {
            title: Some(details.title),
            poster_url: Some(details.poster_url),
            hero_image_url: Some(details.hero_image_url),
            age_rating: Some(details.age_rating),
            genres: Some(details.genres),
            duration: Some(details.duration),
            synopsis: Some(details.synopsis),
            director: Some(details.director),
            cast_members: Some(details.cast_members),
            trailer_url: Some(details.trailer_url),
            is_coming_soon: Some(details.is_coming_soon),
            sessions: Some(sessions),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        MovieUpdate {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Trims the required text fields, so a whitespace-only title fails validation.
    pub fn trimmed(mut self) -> Self {
        for field in [&mut self.title, &mut self.poster_url].into_iter().flatten() {
            *field = field.trim().to_string();
        }
        self
    }

    /// Merges the scalar fields into `details`. Sessions are left to the caller.
    pub fn apply_to(&self, details: &mut MovieDetails) {
        if let Some(title) = &self.title {
            details.title = title.clone();
        }
        if let Some(poster_url) = &self.poster_url {
            details.poster_url = poster_url.clone();
        }
        if let Some(hero_image_url) = &self.hero_image_url {
            details.hero_image_url = hero_image_url.clone();
        }
        if let Some(age_rating) = self.age_rating {
            details.age_rating = age_rating;
        }
        if let Some(genres) = &self.genres {
            details.genres = genres.clone();
        }
        if let Some(duration) = &self.duration {
            details.duration = duration.clone();
        }
        if let Some(synopsis) = &self.synopsis {
            details.synopsis = synopsis.clone();
        }
        if let Some(director) = &self.director {
            details.director = director.clone();
        }
        if let Some(cast_members) = &self.cast_members {
            details.cast_members = cast_members.clone();
        }
        if let Some(trailer_url) = &self.trailer_url {
            details.trailer_url = trailer_url.clone();
        }
        if let Some(is_coming_soon) = self.is_coming_soon {
            details.is_coming_soon = is_coming_soon;
        }
    }

    /// The scalar part of the update as a JSON object, `sessions` excluded.
    pub fn scalar_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        fields.remove("sessions");
        fields
    }
}
