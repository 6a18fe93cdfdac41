//! Admin form boundary.
//!
//! The admin modals submit every field as text. These types turn that text into
//! validated entities; anything malformed is a `Validation` error and never reaches
//! a repository.

use serde::Deserialize;
use validator::Validate;

use crate::error::CinemaError;
use crate::models::movie_model::{MovieDetails, NewMovie, Showtime};
use crate::models::snack_model::NewSnack;
use crate::utils::{non_blank, split_list};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionForm {
    pub time: String,
    /// Comma separated weekday labels, e.g. "Qui, Sex, Sáb".
    pub days: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub tech: String,
    pub highlight: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct MovieForm {
    #[validate(length(min = 1))]
    pub title: String,
    pub poster: String,
    pub hero_image: String,
    pub age_rating: String,
    /// Comma separated.
    #[validate(length(min = 1))]
    pub genre: String,
    pub duration: String,
    pub synopsis: String,
    pub director: String,
    /// Comma separated.
    pub cast: String,
    pub trailer_url: String,
    pub is_coming_soon: bool,
    pub sessions: Vec<SessionForm>,
}

impl MovieForm {
    pub fn parse(self) -> Result<NewMovie, CinemaError> {
        let form = MovieForm {
            title: self.title.trim().to_string(),
            genre: self.genre.trim().to_string(),
            ..self
        };
        form.validate()?;

        let details = MovieDetails {
            title: form.title,
            poster_url: non_blank(&form.poster).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            hero_image_url: non_blank(&form.hero_image),
            age_rating: form.age_rating.parse()?,
            genres: split_list(&form.genre),
            duration: non_blank(&form.duration),
            synopsis: non_blank(&form.synopsis),
            director: non_blank(&form.director),
            cast_members: split_list(&form.cast),
            trailer_url: non_blank(&form.trailer_url),
            is_coming_soon: form.is_coming_soon,
        };

        // Rows left without a time are blank rows of the form, not sessions.
        let sessions = form
            .sessions
            .into_iter()
            .filter(|session| !session.time.trim().is_empty())
            .map(|session| {
                Ok(Showtime {
                    time: session.time.trim().to_string(),
                    days: split_list(&session.days),
                    session_type: session.session_type.parse()?,
                    tech: session.tech.parse()?,
                    highlight: session.highlight,
                })
            })
            .collect::<Result<Vec<_>, CinemaError>>()?;

        let movie = NewMovie { details, sessions };
        movie.validate()?;
        Ok(movie)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SnackForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    /// As typed, e.g. "29,90".
    pub price: String,
    pub image: String,
    pub category: String,
}

impl SnackForm {
    pub fn parse(self) -> Result<NewSnack, CinemaError> {
        let form = SnackForm {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        };
        form.validate()?;

        let snack = NewSnack {
            name: form.name,
            description: form.description,
            price: form.price.parse()?,
            image_url: non_blank(&form.image).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            category: form.category.parse()?,
        };
        snack.validate()?;
        Ok(snack)
    }
}

#[cfg(test)]
mod forms_tests {
    use super::*;
    use crate::models::movie_model::{AgeRating, SessionType, Tech};
    use crate::models::snack_model::{Price, SnackCategory};
    use rstest::{fixture, rstest};

    #[fixture]
    fn movie_form() -> MovieForm {
        MovieForm {
            title: " Horizonte Infinito ".into(),
            age_rating: "12".into(),
            genre: "Ficção Científica, Aventura".into(),
            duration: "2h 28min".into(),
            cast: "Pedro Almeida, Carla Santos,".into(),
            sessions: vec![
                SessionForm {
                    time: "14:30".into(),
                    days: "Qui, Sex".into(),
                    session_type: "DUB".into(),
                    tech: "3D".into(),
                    highlight: true,
                },
                SessionForm {
                    time: "  ".into(),
                    session_type: "LEG".into(),
                    tech: "2D".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[fixture]
    fn snack_form() -> SnackForm {
        SnackForm {
            name: "Combo Casal".into(),
            description: "1 Pipoca Média + 2 Refrigerantes".into(),
            price: "29,90".into(),
            image: "".into(),
            category: "combo".into(),
        }
    }

    #[rstest]
    fn it_should_turn_the_movie_form_into_a_new_movie(movie_form: MovieForm) {
        let movie = movie_form.parse().unwrap();
        assert_eq!(movie.details.title, "Horizonte Infinito");
        assert_eq!(movie.details.poster_url, PLACEHOLDER_IMAGE);
        assert_eq!(movie.details.age_rating, AgeRating::Twelve);
        assert_eq!(movie.details.genres, vec!["Ficção Científica", "Aventura"]);
        assert_eq!(movie.details.cast_members, vec!["Pedro Almeida", "Carla Santos"]);
        assert_eq!(movie.details.synopsis, None);
        assert_eq!(movie.details.hero_image_url, None);
    }

    #[rstest]
    fn it_should_drop_session_rows_without_a_time(movie_form: MovieForm) {
        let movie = movie_form.parse().unwrap();
        assert_eq!(movie.sessions.len(), 1);
        let session = &movie.sessions[0];
        assert_eq!(session.days, vec!["Qui", "Sex"]);
        assert_eq!(session.session_type, SessionType::Dubbed);
        assert_eq!(session.tech, Tech::ThreeD);
        assert!(session.highlight);
    }

    #[rstest]
    fn it_should_require_a_title(movie_form: MovieForm) {
        let form = MovieForm {
            title: "   ".into(),
            ..movie_form
        };
        match form.parse() {
            Err(CinemaError::Validation(message)) => assert!(message.contains("title")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("13", "3D")]
    #[case("12", "4D")]
    fn it_should_reject_unknown_labels(movie_form: MovieForm, #[case] rating: &str, #[case] tech: &str) {
        let mut form = movie_form;
        form.age_rating = rating.into();
        form.sessions[0].tech = tech.into();
        assert!(matches!(form.parse(), Err(CinemaError::Validation(_))));
    }

    #[rstest]
    fn it_should_turn_the_snack_form_into_a_new_snack(snack_form: SnackForm) {
        let snack = snack_form.parse().unwrap();
        assert_eq!(snack.price, Price::from_cents(2990));
        assert_eq!(snack.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(snack.category, SnackCategory::Combo);
    }

    #[rstest]
    #[case("vinte")]
    #[case("-3,00")]
    fn it_should_reject_bad_prices(snack_form: SnackForm, #[case] price: &str) {
        let form = SnackForm {
            price: price.into(),
            ..snack_form
        };
        assert!(matches!(form.parse(), Err(CinemaError::Validation(_))));
    }

    #[rstest]
    fn it_should_require_a_description(snack_form: SnackForm) {
        let form = SnackForm {
            description: "".into(),
            ..snack_form
        };
        assert!(matches!(form.parse(), Err(CinemaError::Validation(_))));
    }
}
