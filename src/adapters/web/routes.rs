use super::{cors::build_cors_layer, handlers, AppState};
use crate::config::ServerConfig;
use crate::utils::error::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    let raster = Router::new()
        .route("/", get(handlers::raster_metadata))
        .route("/files", get(handlers::raster_files))
        .route("/density/images", get(handlers::density_images))
        .route("/png", get(handlers::raster_png))
        .route("/convert", get(handlers::convert_url))
        .route(
            "/upload",
            post(handlers::convert_upload).layer(DefaultBodyLimit::max(server.max_upload_bytes)),
        );

    let layers = Router::new()
        .route("/", get(handlers::list_layers).post(handlers::save_layer))
        .route("/type/{type}", get(handlers::layers_by_type))
        .route("/{id}", delete(handlers::delete_layer));

    let graphics = Router::new()
        .route(
            "/",
            get(handlers::graphics_by_name)
                .post(handlers::save_graphics)
                .delete(handlers::delete_graphics),
        )
        .route("/urls", get(handlers::graphic_urls));

    Ok(Router::new()
        .route("/status", get(handlers::status))
        .nest("/raster", raster)
        .nest("/layers", layers)
        .nest("/graphics", graphics)
        .layer(build_cors_layer(&server.cors_origins)?)
        .with_state(state))
}
