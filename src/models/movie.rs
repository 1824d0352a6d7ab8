use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: String,
    /// Длительность в минутах.
    pub duration: u32,
    pub poster: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theater {
    pub id: i64,
    pub name: String,
    pub capacity: u32,
}

/// Показ одного фильма в одном зале. После загрузки не меняется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    pub id: i64,
    pub movie: Movie,
    pub theater: Theater,
    #[serde(rename = "date_time")]
    pub starts_at: DateTime<Utc>,
}

impl Showtime {
    pub fn label(&self) -> String {
        format!("{} - {}", self.theater.name, self.starts_at.format("%Y-%m-%d %H:%M"))
    }
}

/// Страница фильма: сам фильм и только его сеансы.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub movie: Movie,
    pub showtimes: Vec<Showtime>,
}

pub fn showtimes_for_movie(showtimes: Vec<Showtime>, movie_id: i64) -> Vec<Showtime> {
    showtimes
        .into_iter()
        .filter(|showtime| showtime.movie.id == movie_id)
        .collect()
}
