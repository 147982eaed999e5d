// Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod api;
mod pages;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/categories", get(api::get_categories))
        .route("/categories/:slug/listings", get(api::get_category_listings))
        .route("/categories/:slug/filter-state", post(api::change_filter_state))
        .route("/filters/:category", get(api::get_filters))
        .route("/vehicles/brands", get(api::get_brands))
        .route("/vehicles/:brand/models", get(api::get_models))
        .route("/listings/:id", get(api::get_listing))
        .route("/sellers/workspace", get(api::get_workspace))
        .route("/sellers/listings/:id/status", post(api::change_listing_status))
        .with_state(app_state.clone());

    // `/categories/cars/...` is served by the same dynamic routes; the handlers
    // branch on the slug.
    Router::new()
        .route("/", get(pages::home_page))
        .route("/categories", get(pages::categories_page))
        .route("/categories/:slug", get(pages::category_page))
        .route("/categories/:slug/:brand", get(pages::brand_page))
        .route("/categories/:slug/:brand/:model", get(pages::model_page))
        .route("/listings/:id", get(pages::listing_page))
        .route("/sellers", get(pages::sellers_page))
        .route("/sellers/register", post(pages::register_seller))
        .route("/sellers/listings", post(pages::submit_listing))
        .route("/sellers/listings/:id/status", post(pages::change_listing_status))
        .nest("/api", api_router)
        .fallback(pages::fallback)
        .with_state(app_state)
}
