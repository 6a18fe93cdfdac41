//! Programme selection: which movies to show for a day, a genre and a weekday.
//!
//! All selections keep the input order and an empty result is a normal outcome.

use serde::{Deserialize, Serialize};

use crate::fixtures::ALL_GENRES;
use crate::models::movie_model::Movie;

/// Movies for the day tab at `day_offset` (0 = today).
///
/// Positional rule used by the day tabs: today shows the
/// whole catalogue, tomorrow positions 1 to 6, any later day position 2 onward.
/// It does not look at the sessions' `days`; see [`showing_on`] for that.
pub fn by_day_offset(movies: &[Movie], day_offset: usize) -> &[Movie] {
    let len = movies.len();
    match day_offset {
        0 => movies,
        1 => &movies[1.min(len)..7.min(len)],
        _ => &movies[2.min(len)..],
    }
}

/// `"Todos"` keeps everything; any other label is an exact, case-sensitive match.
pub fn by_genre<'a>(movies: impl IntoIterator<Item = &'a Movie>, genre: &str) -> Vec<&'a Movie> {
    movies
        .into_iter()
        .filter(|movie| genre == ALL_GENRES || movie.has_genre(genre))
        .collect()
}

/// Movies with at least one session on `weekday` (a session without days runs every day).
pub fn showing_on<'a>(movies: impl IntoIterator<Item = &'a Movie>, weekday: &str) -> Vec<&'a Movie> {
    movies
        .into_iter()
        .filter(|movie| movie.showtimes().any(|showtime| showtime.runs_on(weekday)))
        .collect()
}

/// Carousel candidates: movies with a hero image.
pub fn featured(movies: &[Movie]) -> Vec<&Movie> {
    movies.iter().filter(|movie| movie.is_featured()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Programacao {
    pub now_showing: Vec<Movie>,
    pub coming_soon: Vec<Movie>,
}

pub fn partition_coming_soon(movies: &[Movie]) -> Programacao {
    let (coming_soon, now_showing): (Vec<Movie>, Vec<Movie>) =
        movies.iter().cloned().partition(|movie| movie.details.is_coming_soon);
    Programacao {
        now_showing,
        coming_soon,
    }
}

/// The user's current selection on the programme page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Selection {
    pub day: Option<usize>,
    pub genre: Option<String>,
    pub weekday: Option<String>,
}

impl Selection {
    /// The "clear filters" state.
    pub fn cleared() -> Self {
        Selection {
            day: Some(0),
            genre: Some(ALL_GENRES.to_string()),
            weekday: None,
        }
    }

    /// Splits off coming-soon movies, then narrows the now-showing set.
    pub fn apply(&self, movies: &[Movie]) -> Programacao {
        let Programacao {
            now_showing,
            coming_soon,
        } = partition_coming_soon(movies);

        let day_slice = by_day_offset(&now_showing, self.day.unwrap_or(0));
        let mut selected: Vec<&Movie> = by_genre(day_slice, self.genre.as_deref().unwrap_or(ALL_GENRES));
        if let Some(weekday) = &self.weekday {
            selected = showing_on(selected, weekday);
        }

        Programacao {
            now_showing: selected.into_iter().cloned().collect(),
            coming_soon,
        }
    }
}
