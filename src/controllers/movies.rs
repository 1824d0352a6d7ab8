use futures::try_join;
use tracing::info;

use crate::{
    error::ClientResult,
    models::{movie::showtimes_for_movie, Movie, MovieDetail, Showtime},
    services::api::ApiClient,
};

/// Фильмы и сеансы только для чтения. Кэша нет, каждый вызов идёт на сервер.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn movies(&self) -> ClientResult<Vec<Movie>> {
        self.api.list_movies().await
    }

    pub async fn showtimes_for(&self, movie_id: i64) -> ClientResult<Vec<Showtime>> {
        let showtimes = self.api.list_showtimes().await?;
        Ok(showtimes_for_movie(showtimes, movie_id))
    }

    // Фильм и сеансы запрашиваются параллельно; ошибка любого запроса - ошибка страницы.
    pub async fn movie_detail(&self, movie_id: i64) -> ClientResult<MovieDetail> {
        let (movie, showtimes) = try_join!(self.api.movie(movie_id), self.api.list_showtimes())?;
        let showtimes = showtimes_for_movie(showtimes, movie_id);
        info!("Movie {} has {} showtime(s)", movie.title, showtimes.len());
        Ok(MovieDetail { movie, showtimes })
    }
}
