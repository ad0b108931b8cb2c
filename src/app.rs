use crate::pricing::{format_rupiah, price_for};
use crate::tmdb::{genre_lookup, CatalogApi, MoviePage, MovieSummary, TmdbClient};
use crate::views::{self, MovieCard};
use crate::wallet::{PurchaseError, Wallet};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::HashMap, env, net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_STARTING_BALANCE: i64 = 200_000;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogApi>,
    pub genres: Arc<HashMap<i64, String>>,
    pub wallet: Arc<Mutex<Wallet>>,
}

pub async fn run_server() -> Result<()> {
    let catalog: Arc<dyn CatalogApi> = Arc::new(TmdbClient::from_env()?);

    // Genres are fetched once; names degrade to empty if the lookup fails.
    let genres = match catalog.genre_list().await {
        Ok(list) => {
            info!("Loaded {} catalog genres", list.len());
            Arc::new(genre_lookup(list))
        }
        Err(e) => {
            warn!("Failed to fetch genre list, genre names will be empty: {}", e);
            Arc::new(HashMap::new())
        }
    };

    let starting_balance = env::var("TOKOFLIX_STARTING_BALANCE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_STARTING_BALANCE);
    info!("Wallet starts at {}", format_rupiah(starting_balance));

    let state = AppState {
        catalog,
        genres,
        wallet: Arc::new(Mutex::new(Wallet::new(starting_balance))),
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3175));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_movies))
        .route("/health", get(health))
        .route("/:title_path", get(movie_detail))
        .route("/:title_path/buy", post(buy_movie))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<u32>,
}

async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    let current_page = query.page.unwrap_or(1).max(1);
    let page = match state.catalog.now_playing(current_page).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Failed to fetch now-playing page {}: {}", current_page, e);
            MoviePage {
                page: current_page,
                total_pages: 1,
                movies: Vec::new(),
            }
        }
    };

    let wallet = state.wallet.lock().await;
    let movies = collect_cards(&page.movies, &state, &wallet);
    let balance = wallet.balance();
    drop(wallet);

    Json(json!({
        "movies": movies,
        "pagination": views::paginate(page.page, page.total_pages),
        "balance": balance,
        "balance_label": format_rupiah(balance),
    }))
}

async fn movie_detail(
    State(state): State<AppState>,
    Path(title_path): Path<String>,
) -> (StatusCode, Json<Value>) {
    let Some(id) = views::parse_movie_id(&title_path) else {
        return not_found("not a movie path");
    };

    // Detail, recommendations and similar are fired together; the two list
    // fetches degrade to empty independently of each other.
    let (detail, recommendations, similar) = tokio::join!(
        state.catalog.fetch_movie(id),
        state.catalog.recommendations(id),
        state.catalog.similar(id),
    );

    let detail = match detail {
        Ok(d) => d,
        Err(e) => {
            warn!("Failed to fetch movie {}: {}", id, e);
            return not_found("movie not found");
        }
    };
    let recommendations = recommendations.unwrap_or_else(|e| {
        warn!("Failed to fetch recommendations for {}: {}", id, e);
        Vec::new()
    });
    let similar = similar.unwrap_or_else(|e| {
        warn!("Failed to fetch similar titles for {}: {}", id, e);
        Vec::new()
    });

    let wallet = state.wallet.lock().await;
    let movie = match views::detail_view(&detail, &wallet) {
        Ok(view) => view,
        Err(e) => {
            warn!("Cannot derive a price for '{}': {}", detail.title, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            );
        }
    };
    let recommendations = collect_cards(&recommendations, &state, &wallet);
    let similar = collect_cards(&similar, &state, &wallet);
    let balance = wallet.balance();
    drop(wallet);

    (
        StatusCode::OK,
        Json(json!({
            "movie": movie,
            "recommendations": recommendations,
            "similar": similar,
            "balance": balance,
            "balance_label": format_rupiah(balance),
        })),
    )
}

async fn buy_movie(
    State(state): State<AppState>,
    Path(title_path): Path<String>,
) -> (StatusCode, Json<Value>) {
    let Some(id) = views::parse_movie_id(&title_path) else {
        return not_found("not a movie path");
    };

    // The price is always derived from the catalog's current rating, never
    // taken from the request.
    let detail = match state.catalog.fetch_movie(id).await {
        Ok(d) => d,
        Err(e) => {
            warn!("Failed to fetch movie {} for purchase: {}", id, e);
            return not_found("movie not found");
        }
    };
    let price = match price_for(detail.rating) {
        Ok(p) => p,
        Err(e) => {
            warn!("Cannot derive a price for '{}': {}", detail.title, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            );
        }
    };

    let mut wallet = state.wallet.lock().await;
    match wallet.purchase(id, price) {
        Ok(balance) => {
            info!(
                "Purchased '{}' for {}, balance is now {}",
                detail.title,
                format_rupiah(price),
                format_rupiah(balance)
            );
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "movie_id": id,
                    "price": price,
                    "price_label": format_rupiah(price),
                    "balance": balance,
                    "balance_label": format_rupiah(balance),
                })),
            )
        }
        Err(e) => {
            let status = match e {
                PurchaseError::AlreadyOwned => StatusCode::CONFLICT,
                PurchaseError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            };
            warn!("Purchase of '{}' rejected: {}", detail.title, e);
            (
                status,
                Json(json!({
                    "status": "error",
                    "message": e.to_string(),
                    "balance": wallet.balance(),
                    "balance_label": format_rupiah(wallet.balance()),
                })),
            )
        }
    }
}

fn collect_cards(
    movies: &[MovieSummary],
    state: &AppState,
    wallet: &Wallet,
) -> Vec<MovieCard> {
    movies
        .iter()
        .filter_map(|m| match views::movie_card(m, &state.genres, wallet) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!("Skipping '{}': {}", m.title, e);
                None
            }
        })
        .collect()
}

fn not_found(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"status": "error", "message": message})),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
