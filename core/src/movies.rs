//! Movie domain service.
//!
//! Every method builds a request with `TmdbClient`, executes it through the
//! `Transport` and decodes the body. Errors pass straight through.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::TmdbClient;
use crate::decode::decode;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::Transport;
use crate::types::{Genre, GenreList, MovieDetails, MovieList, MoviePage, StatusResponse};

#[derive(Clone)]
pub struct MovieService {
    client: TmdbClient,
    transport: Transport,
}

impl MovieService {
    pub fn new(client: TmdbClient, transport: Transport) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TmdbClient {
        &self.client
    }

    pub async fn list(&self, list: MovieList, page: u32) -> Result<MoviePage, ApiError> {
        self.fetch(self.client.build_movie_list(list, page)?).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.list(MovieList::NowPlaying, page).await
    }

    pub async fn popular(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.list(MovieList::Popular, page).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.list(MovieList::TopRated, page).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.list(MovieList::Upcoming, page).await
    }

    /// Search by title. A blank query returns an empty page without a request.
    pub async fn search(&self, query: &str, page: u32) -> Result<MoviePage, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            debug!("blank search query, skipping request");
            return Ok(MoviePage::empty());
        }
        self.fetch(self.client.build_search_movies(query, page)?).await
    }

    pub async fn details(&self, id: i64) -> Result<MovieDetails, ApiError> {
        self.fetch(self.client.build_movie_details(id)?).await
    }

    pub async fn similar(&self, id: i64, page: u32) -> Result<MoviePage, ApiError> {
        self.fetch(self.client.build_similar_movies(id, page)?).await
    }

    pub async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let list: GenreList = self.fetch(self.client.build_genres()?).await?;
        Ok(list.genres)
    }

    pub async fn rate(
        &self,
        id: i64,
        value: f64,
        guest_session_id: Option<&str>,
    ) -> Result<StatusResponse, ApiError> {
        self.fetch(self.client.build_rate_movie(id, value, guest_session_id)?)
            .await
    }

    pub async fn delete_rating(
        &self,
        id: i64,
        guest_session_id: Option<&str>,
    ) -> Result<StatusResponse, ApiError> {
        self.fetch(self.client.build_delete_rating(id, guest_session_id)?)
            .await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let body = self.transport.execute(request).await?;
        decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::config::ApiConfig;
    use crate::http::HttpResponse;
    use crate::transport::HttpBackend;

    const NOW_PLAYING: &[u8] = include_bytes!("../../test-vectors/tmdb/now_playing.json");
    const GENRES: &[u8] = include_bytes!("../../test-vectors/tmdb/genres.json");

    /// Answers every request with the same status and body.
    struct Fixed {
        status: u16,
        body: &'static [u8],
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpBackend for Fixed {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.urls.lock().push(request.url);
            Ok(HttpResponse::new(self.status, self.body.to_vec()))
        }
    }

    fn service(status: u16, body: &'static [u8]) -> (MovieService, Arc<Fixed>) {
        let backend = Arc::new(Fixed {
            status,
            body,
            urls: Mutex::new(Vec::new()),
        });
        let service = MovieService::new(
            TmdbClient::new(ApiConfig::new("KEY")),
            Transport::new(backend.clone()),
        );
        (service, backend)
    }

    #[tokio::test]
    async fn now_playing_matches_fixture() {
        let (service, backend) = service(200, NOW_PLAYING);
        let page = service.now_playing(1).await.unwrap();

        assert_eq!(page.results.len(), 3);
        assert_eq!(page.total_results, 3);
        let first = &page.results[0];
        assert_eq!(first.id, 1022789);
        assert_eq!(first.title, "Inside Out 2");
        assert_eq!(first.poster_path.as_deref(), Some("/vpnVM9B6NMmQpWeZvzLvDESb2QY.jpg"));
        assert_eq!(first.release_date.as_deref(), Some("2024-06-11"));
        assert_eq!(first.vote_average, 7.6);
        assert_eq!(first.vote_count, 3201);
        assert_eq!(first.genre_ids, vec![16, 10751, 12, 35]);

        assert_eq!(
            backend.urls.lock().as_slice(),
            ["https://api.themoviedb.org/3/movie/now_playing?api_key=KEY&page=1"]
        );
    }

    #[tokio::test]
    async fn genres_unwraps_the_list() {
        let (service, _) = service(200, GENRES);
        let genres = service.genres().await.unwrap();
        assert_eq!(genres.len(), 9);
        assert_eq!(genres[0], Genre { id: 28, name: "Action".to_string() });
    }

    #[tokio::test]
    async fn blank_search_skips_the_network() {
        let (service, backend) = service(200, NOW_PLAYING);
        let page = service.search("   ", 1).await.unwrap();
        assert!(page.results.is_empty());
        assert!(backend.urls.lock().is_empty());
    }

    #[tokio::test]
    async fn search_trims_the_query() {
        let (service, backend) = service(200, NOW_PLAYING);
        service.search(" Matrix ", 1).await.unwrap();
        assert!(backend.urls.lock()[0].contains("api_key=KEY&query=Matrix&page=1"));
    }

    #[tokio::test]
    async fn server_errors_pass_through() {
        let (service, _) = service(500, b"oops");
        let err = service.details(603).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidStatusCode { status: 500, .. }));
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_decoding_error() {
        let (service, _) = service(200, GENRES);
        let err = service.details(603).await.unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)));
    }
}
