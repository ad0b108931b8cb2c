pub mod app;
pub mod pricing;
pub mod tmdb;
pub mod views;
pub mod wallet;
