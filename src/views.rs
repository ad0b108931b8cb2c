//! Pure derivation of display records from raw catalog data, the genre
//! lookup and a wallet snapshot. Handlers compose these; nothing in here
//! performs I/O.

use crate::pricing::{format_rupiah, price_for, PricingError};
use crate::tmdb::{MovieDetail, MovieSummary};
use crate::wallet::Wallet;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct MovieCard {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub rating: f64,
    pub genres: Vec<String>,
    pub release_date: Option<String>,
    pub poster: Option<String>,
    pub price: i64,
    pub price_label: String,
    pub owned: bool,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieView {
    pub id: i64,
    pub title: String,
    pub tagline: Option<String>,
    pub rating: f64,
    pub genre_text: String,
    pub language: String,
    pub release_date: Option<String>,
    pub overview: String,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub price: i64,
    pub price_label: String,
    pub owned: bool,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_path: Option<String>,
    pub next_path: Option<String>,
}

pub fn movie_card(
    movie: &MovieSummary,
    genres: &HashMap<i64, String>,
    wallet: &Wallet,
) -> Result<MovieCard, PricingError> {
    let price = price_for(movie.rating)?;
    Ok(MovieCard {
        id: movie.id,
        title: movie.title.clone(),
        overview: movie.overview.clone(),
        rating: movie.rating,
        genres: movie
            .genre_ids
            .iter()
            .filter_map(|id| genres.get(id).cloned())
            .collect(),
        release_date: movie.release_date.clone(),
        poster: movie.poster.clone(),
        price,
        price_label: format_rupiah(price),
        owned: wallet.is_owned(movie.id),
        path: title_path(movie.id, &movie.title),
    })
}

pub fn detail_view(movie: &MovieDetail, wallet: &Wallet) -> Result<MovieView, PricingError> {
    let price = price_for(movie.rating)?;
    Ok(MovieView {
        id: movie.id,
        title: movie.title.clone(),
        tagline: movie.tagline.clone(),
        rating: movie.rating,
        genre_text: movie
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        language: movie.languages.join(", "),
        release_date: movie.release_date.as_deref().map(format_release_date),
        overview: movie.overview.clone(),
        poster: movie.poster.clone(),
        backdrop: movie.backdrop.clone(),
        price,
        price_label: format_rupiah(price),
        owned: wallet.is_owned(movie.id),
        path: title_path(movie.id, &movie.title),
    })
}

/// Detail route for a movie: "/{id}-{slug}".
pub fn title_path(id: i64, title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("/{id}")
    } else {
        format!("/{id}-{slug}")
    }
}

/// Extracts the movie id from a "{id}-{slug}" path segment; the id is
/// everything before the first '-'.
pub fn parse_movie_id(segment: &str) -> Option<i64> {
    let id_part = segment.split('-').next()?;
    if id_part.is_empty() || !id_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    id_part.parse().ok()
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// "1999-03-31" -> "31 March 1999"; unparsable dates pass through untouched.
pub fn format_release_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d %B %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn paginate(current_page: u32, total_pages: u32) -> Pagination {
    let has_prev = current_page > 1;
    let has_next = current_page < total_pages;
    // Going back to page 1 returns to the unparameterized route.
    let prev_path = has_prev.then(|| {
        if current_page - 1 <= 1 {
            "/".to_string()
        } else {
            format!("/?page={}", current_page - 1)
        }
    });
    let next_path = has_next.then(|| format!("/?page={}", current_page + 1));
    Pagination {
        current_page,
        total_pages,
        has_prev,
        has_next,
        prev_path,
        next_path,
    }
}
