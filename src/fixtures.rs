//! Seed catalogue for the local store.

use crate::models::movie_model::{AgeRating, MovieDetails, NewMovie, SessionType, Showtime, Tech};
use crate::models::snack_model::{NewSnack, Price, SnackCategory};

/// Genre filter labels, "Todos" first.
pub const GENRES: [&str; 11] = [
    "Todos",
    "Ação",
    "Aventura",
    "Animação",
    "Comédia",
    "Drama",
    "Família",
    "Ficção Científica",
    "Romance",
    "Suspense",
    "Terror",
];

pub const ALL_GENRES: &str = "Todos";

struct Seed {
    title: &'static str,
    poster: &'static str,
    hero: Option<&'static str>,
    rating: AgeRating,
    genres: &'static [&'static str],
    duration: &'static str,
    synopsis: &'static str,
    director: &'static str,
    cast: &'static [&'static str],
    trailer: Option<&'static str>,
    sessions: &'static [(&'static str, SessionType, Tech)],
}

impl Seed {
    fn into_new_movie(self) -> NewMovie {
        let details = MovieDetails {
            title: self.title.to_string(),
            poster_url: self.poster.to_string(),
            hero_image_url: self.hero.map(str::to_string),
            age_rating: self.rating,
            genres: self.genres.iter().map(|g| g.to_string()).collect(),
            duration: Some(self.duration.to_string()),
            synopsis: Some(self.synopsis.to_string()),
            director: Some(self.director.to_string()),
            cast_members: self.cast.iter().map(|c| c.to_string()).collect(),
            trailer_url: self.trailer.map(str::to_string),
            is_coming_soon: false,
        };
        let sessions = self
            .sessions
            .iter()
            .map(|(time, session_type, tech)| Showtime::new(*time, *session_type, *tech))
            .collect();
        NewMovie { details, sessions }
    }
}

use SessionType::{Dubbed as DUB, Subtitled as LEG};
use Tech::{ThreeD, TwoD};

/// The nine movies on the programme, featured ones first.
pub fn movies() -> Vec<NewMovie> {
    let seeds = [
        Seed {
            title: "Horizonte Infinito",
            poster: "/assets/movie-poster-4.jpg",
            hero: Some("/assets/hero-movie-1.jpg"),
            rating: AgeRating::Twelve,
            genres: &["Ficção Científica", "Aventura"],
            duration: "2h 28min",
            synopsis: "Em 2157, o astronauta Marcus Cole embarca em uma missão para encontrar um novo lar para a humanidade.",
            director: "Ana Rodrigues",
            cast: &["Pedro Almeida", "Carla Santos", "João Victor"],
            trailer: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            sessions: &[("14:30", DUB, ThreeD), ("17:00", LEG, ThreeD), ("19:30", DUB, TwoD), ("22:00", LEG, ThreeD)],
        },
        Seed {
            title: "Amor em Paris",
            poster: "/assets/movie-poster-5.jpg",
            hero: Some("/assets/hero-movie-2.jpg"),
            rating: AgeRating::Twelve,
            genres: &["Romance", "Drama"],
            duration: "1h 54min",
            synopsis: "Marina e Lucas se encontram por acaso nas ruas de Paris.",
            director: "Fernanda Costa",
            cast: &["Maria Silva", "Bruno Martins", "Lúcia Ferreira"],
            trailer: None,
            sessions: &[("15:00", DUB, TwoD), ("17:30", LEG, TwoD), ("20:00", DUB, TwoD)],
        },
        Seed {
            title: "Sombras da Noite",
            poster: "/assets/movie-poster-2.jpg",
            hero: Some("/assets/hero-movie-3.jpg"),
            rating: AgeRating::Sixteen,
            genres: &["Suspense", "Ação"],
            duration: "2h 05min",
            synopsis: "Detetive Maia enfrenta seu caso mais perigoso quando uma série de crimes conecta figuras poderosas da cidade.",
            director: "Ricardo Neves",
            cast: &["Paula Oliveira", "Thiago Mendes", "Cláudio Ribeiro"],
            trailer: None,
            sessions: &[("16:00", LEG, TwoD), ("19:00", DUB, TwoD), ("21:30", LEG, TwoD)],
        },
        Seed {
            title: "A Grande Aventura",
            poster: "/assets/movie-poster-1.jpg",
            hero: None,
            rating: AgeRating::Free,
            genres: &["Animação", "Aventura", "Família"],
            duration: "1h 42min",
            synopsis: "Um grupo improvável de amigos animais embarca em uma jornada épica pela selva.",
            director: "Marcos Lima",
            cast: &["Débora Luz", "Carlos Drummond", "Ana Paula"],
            trailer: None,
            sessions: &[("13:00", DUB, TwoD), ("15:30", DUB, ThreeD), ("17:45", DUB, TwoD)],
        },
        Seed {
            title: "O Casarão",
            poster: "/assets/movie-poster-2.jpg",
            hero: None,
            rating: AgeRating::Sixteen,
            genres: &["Terror", "Suspense"],
            duration: "1h 58min",
            synopsis: "Uma família se muda para uma antiga mansão no interior do Paraná.",
            director: "Julia Mendonça",
            cast: &["Fernanda Torres", "Lázaro Ramos", "Dira Paes"],
            trailer: None,
            sessions: &[("21:00", DUB, TwoD), ("23:30", LEG, TwoD)],
        },
        Seed {
            title: "Confusões em Família",
            poster: "/assets/movie-poster-3.jpg",
            hero: None,
            rating: AgeRating::Twelve,
            genres: &["Comédia"],
            duration: "1h 36min",
            synopsis: "O patriarca da família Souza decide reunir todos para o Natal.",
            director: "Eduardo Gonzaga",
            cast: &["Leandro Hassum", "Paulo Gustavo", "Tatá Werneck"],
            trailer: None,
            sessions: &[("14:00", DUB, TwoD), ("16:30", DUB, TwoD), ("19:00", DUB, TwoD), ("21:15", DUB, TwoD)],
        },
        Seed {
            title: "Velocidade Máxima",
            poster: "/assets/movie-poster-4.jpg",
            hero: None,
            rating: AgeRating::Fourteen,
            genres: &["Ação", "Aventura"],
            duration: "2h 12min",
            synopsis: "Piloto aposentado é chamado de volta para uma última missão impossível.",
            director: "Roberto Santucci",
            cast: &["Rodrigo Santoro", "Paolla Oliveira", "Bruno Gagliasso"],
            trailer: None,
            sessions: &[("15:00", DUB, ThreeD), ("18:00", LEG, ThreeD), ("20:30", DUB, ThreeD), ("23:00", LEG, TwoD)],
        },
        Seed {
            title: "Entre Silêncios",
            poster: "/assets/movie-poster-5.jpg",
            hero: None,
            rating: AgeRating::Fourteen,
            genres: &["Drama"],
            duration: "2h 01min",
            synopsis: "A história de uma pianista que perde a audição e precisa redescobrir sua conexão com a música.",
            director: "Cláudia Abreu",
            cast: &["Sônia Braga", "Caio Blat", "Débora Falabella"],
            trailer: None,
            sessions: &[("16:00", LEG, TwoD), ("18:30", DUB, TwoD)],
        },
        Seed {
            title: "O Guardião",
            poster: "/assets/movie-poster-6.jpg",
            hero: None,
            rating: AgeRating::Twelve,
            genres: &["Ação", "Ficção Científica"],
            duration: "2h 20min",
            synopsis: "Quando uma ameaça alienígena surge, um jovem comum descobre ter poderes extraordinários.",
            director: "Pedro Moreira",
            cast: &["Chay Suede", "Juliana Paes", "Cauã Reymond"],
            trailer: None,
            sessions: &[("14:30", DUB, ThreeD), ("17:15", LEG, ThreeD), ("20:00", DUB, ThreeD), ("22:30", DUB, TwoD)],
        },
    ];
    seeds.into_iter().map(Seed::into_new_movie).collect()
}

pub fn snacks() -> Vec<NewSnack> {
    let seeds = [
        ("Combo Família", "1 Pipoca Grande + 4 Refrigerantes 500ml + 1 Balde colecionável", 6990, "/assets/combo-1.jpg", SnackCategory::Combo),
        ("Combo Nacho Deluxe", "Nachos com queijo cheddar cremoso + Jalapeños + Refrigerante 700ml", 3990, "/assets/combo-2.jpg", SnackCategory::Combo),
        ("Combo Hot Dog", "Hot Dog tradicional + Batata frita + Refrigerante 500ml", 3490, "/assets/combo-3.jpg", SnackCategory::Combo),
        ("Combo Doce", "Chocolate importado + Balas sortidas + Refrigerante 300ml", 2990, "/assets/combo-4.jpg", SnackCategory::Combo),
        ("Pipoca Grande", "Balde grande de pipoca com manteiga", 2800, "/assets/combo-1.jpg", SnackCategory::Pipoca),
        ("Pipoca Média", "Saco médio de pipoca com manteiga", 2000, "/assets/combo-1.jpg", SnackCategory::Pipoca),
    ];
    seeds
        .into_iter()
        .map(|(name, description, cents, image, category)| NewSnack {
            name: name.to_string(),
            description: description.to_string(),
            price: Price::from_cents(cents),
            image_url: image.to_string(),
            category,
        })
        .collect()
}
