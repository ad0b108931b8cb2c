use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

// Parameters the original storefront sent on every request.
const LANGUAGE: &str = "en-US";
const REGION: &str = "ID";

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn now_playing(&self, page: u32) -> Result<MoviePage>;
    async fn fetch_movie(&self, id: i64) -> Result<MovieDetail>;
    async fn recommendations(&self, id: i64) -> Result<Vec<MovieSummary>>;
    async fn similar(&self, id: i64) -> Result<Vec<MovieSummary>>;
    async fn genre_list(&self) -> Result<Vec<Genre>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct MoviePage {
    pub page: u32,
    pub total_pages: u32,
    pub movies: Vec<MovieSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub rating: f64,
    pub genre_ids: Vec<i64>,
    pub release_date: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub rating: f64,
    pub genres: Vec<Genre>,
    pub languages: Vec<String>,
    pub release_date: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl TmdbClient {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }

    async fn fetch_movie_list(&self, url: &str) -> Result<Vec<MovieSummary>> {
        let data: PageResponse = self.get_json(url).await?;
        Ok(data.results.into_iter().map(map_summary).collect())
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn now_playing(&self, page: u32) -> Result<MoviePage> {
        // The storefront's "Now Playing" listing rides the discovery
        // endpoint, newest releases first, the way the original site did.
        let url = format!(
            "{TMDB_BASE}/discover/movie?api_key={}&language={LANGUAGE}&region={REGION}&sort_by=release_date.desc&include_video=true&page={page}",
            self.api_key
        );
        let data: PageResponse = self.get_json(&url).await?;
        Ok(MoviePage {
            page: data.page,
            total_pages: data.total_pages,
            movies: data.results.into_iter().map(map_summary).collect(),
        })
    }

    async fn fetch_movie(&self, id: i64) -> Result<MovieDetail> {
        let url = format!(
            "{TMDB_BASE}/movie/{id}?api_key={}&language={LANGUAGE}",
            self.api_key
        );
        let detail: RawMovieDetail = self.get_json(&url).await?;
        Ok(map_detail(detail))
    }

    async fn recommendations(&self, id: i64) -> Result<Vec<MovieSummary>> {
        let url = format!(
            "{TMDB_BASE}/movie/{id}/recommendations?api_key={}&language={LANGUAGE}",
            self.api_key
        );
        self.fetch_movie_list(&url).await
    }

    async fn similar(&self, id: i64) -> Result<Vec<MovieSummary>> {
        let url = format!(
            "{TMDB_BASE}/movie/{id}/similar?api_key={}&language={LANGUAGE}",
            self.api_key
        );
        self.fetch_movie_list(&url).await
    }

    async fn genre_list(&self) -> Result<Vec<Genre>> {
        let url = format!(
            "{TMDB_BASE}/genre/movie/list?api_key={}&language={LANGUAGE}",
            self.api_key
        );
        let data: GenreListResponse = self.get_json(&url).await?;
        Ok(data
            .genres
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect())
    }
}

pub fn genre_lookup(genres: Vec<Genre>) -> HashMap<i64, String> {
    genres.into_iter().map(|g| (g.id, g.name)).collect()
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    page: u32,
    total_pages: u32,
    results: Vec<RawMovieSummary>,
}

#[derive(Debug, Deserialize)]
struct RawMovieSummary {
    id: i64,
    title: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genre_ids: Vec<i64>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMovieDetail {
    id: i64,
    title: String,
    tagline: Option<String>,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    vote_average: f64,
    genres: Option<Vec<RawGenre>>,
    spoken_languages: Option<Vec<RawLanguage>>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGenre {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawLanguage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<RawGenre>,
}

fn map_summary(raw: RawMovieSummary) -> MovieSummary {
    MovieSummary {
        id: raw.id,
        title: raw.title,
        overview: raw.overview,
        rating: clamp_rating(raw.vote_average),
        genre_ids: raw.genre_ids,
        release_date: raw.release_date.filter(|d| !d.is_empty()),
        poster: raw.poster_path.as_deref().map(image_url),
        backdrop: raw.backdrop_path.as_deref().map(image_url),
    }
}

fn map_detail(raw: RawMovieDetail) -> MovieDetail {
    MovieDetail {
        id: raw.id,
        title: raw.title,
        tagline: raw.tagline.filter(|t| !t.is_empty()),
        overview: raw.overview,
        rating: clamp_rating(raw.vote_average),
        genres: raw
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect(),
        languages: raw
            .spoken_languages
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.name)
            .collect(),
        release_date: raw.release_date.filter(|d| !d.is_empty()),
        poster: raw.poster_path.as_deref().map(image_url),
        backdrop: raw.backdrop_path.as_deref().map(image_url),
    }
}

/// Pricing requires a rating in [0, 10]; TMDB stays inside that range but
/// the clamp enforces it at the boundary so bad data cannot leak further in.
fn clamp_rating(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 10.0)
}

fn image_url(path: &str) -> String {
    format!("{IMAGE_BASE}{path}")
}
