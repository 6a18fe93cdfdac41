pub mod movie_model;
pub mod snack_model;
