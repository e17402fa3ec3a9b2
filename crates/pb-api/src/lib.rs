//! # pb-api
//!
//! The web routing layer for the proposal board.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the board.
///
/// # Developer Note
/// `/posts/main` is registered before `/posts/{id}` so the landing page is not
/// parsed as a post id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/posts")
            .route("", web::post().to(handlers::create_post))
            .route("", web::get().to(handlers::list_posts))
            .route("/main", web::get().to(handlers::landing))
            .route("/{id}", web::get().to(handlers::get_post))
            .route("/{id}", web::put().to(handlers::update_post))
            .route("/{id}", web::delete().to(handlers::delete_post))
            .route("/{id}/vote", web::post().to(handlers::vote)),
    );
}
