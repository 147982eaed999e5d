// JSON endpoints mirroring the page data

use axum::{
    extract::{Json as JsonExtract, Path, RawQuery, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
    filters::{filter_listings, ActiveFilter, FilterState, FilterSync, QueryParams},
    models::{CategoryNode, FilterDefinition, ListingDetail, ListingSummary, VehicleModel},
    seller::{AuditEntry, ListingStatus, ManagedListing, SellerWorkspace},
};

fn category_filters(catalog: &Catalog, slug: &str) -> AppResult<Vec<FilterDefinition>> {
    let slug = if slug == "cars" { "vehicles" } else { slug };
    if catalog.find_category(slug).is_none() {
        return Err(AppError::NotFound(format!("Category '{}' not found", slug)));
    }
    Ok(catalog.filters_for(slug).to_vec())
}

pub async fn get_categories(State(catalog): State<Arc<Catalog>>) -> Json<Vec<CategoryNode>> {
    Json(catalog.categories().to_vec())
}

pub async fn get_filters(
    State(catalog): State<Arc<Catalog>>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<FilterDefinition>>> {
    Ok(Json(category_filters(&catalog, &category)?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListingsResponse {
    category: String,
    query: String,
    state: FilterState,
    visible_filters: Vec<String>,
    active_filters: Vec<ActiveFilter>,
    total: usize,
    matched: usize,
    listings: Vec<ListingSummary>,
}

pub async fn get_category_listings(
    State(catalog): State<Arc<Catalog>>,
    Path(slug): Path<String>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<CategoryListingsResponse>> {
    let query = QueryParams::parse(raw.as_deref().unwrap_or_default());
    let sync = FilterSync::new(category_filters(&catalog, &slug)?, &query);

    let all = catalog.listings_in_category(&slug);
    let matched = filter_listings(all.iter().map(|l| &l.summary), sync.state());
    tracing::debug!(category = %slug, total = all.len(), matched = matched.len(), "Filtered category listings");

    Ok(Json(CategoryListingsResponse {
        category: slug,
        query: sync.to_query(&query).to_query_string(),
        state: sync.state().clone(),
        visible_filters: sync.visible().iter().map(|d| d.key.clone()).collect(),
        active_filters: sync.active_filters(),
        total: all.len(),
        matched: matched.len(),
        listings: matched.into_iter().cloned().collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FilterChangeRequest {
    #[serde(default)]
    query: String,
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Serialize)]
pub struct FilterChangeResponse {
    changed: bool,
    query: String,
    state: FilterState,
}

/// Applies one filter edit and returns the rewritten query string.
/// An edit that leaves the state untouched reports `changed: false` and echoes the query.
pub async fn change_filter_state(
    State(catalog): State<Arc<Catalog>>,
    Path(slug): Path<String>,
    JsonExtract(request): JsonExtract<FilterChangeRequest>,
) -> AppResult<Json<FilterChangeResponse>> {
    let existing = QueryParams::parse(&request.query);
    let mut sync = FilterSync::new(category_filters(&catalog, &slug)?, &existing);

    let response = match sync.set_value(&request.key, &request.value, &existing) {
        Some(next) => FilterChangeResponse {
            changed: true,
            query: next.to_query_string(),
            state: sync.state().clone(),
        },
        None => FilterChangeResponse {
            changed: false,
            query: existing.to_query_string(),
            state: sync.state().clone(),
        },
    };
    Ok(Json(response))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    brand: String,
    label: String,
    origin: String,
    popular_in_ksa: bool,
    model_count: usize,
}

pub async fn get_brands(State(catalog): State<Arc<Catalog>>) -> Json<Vec<BrandSummary>> {
    Json(
        catalog
            .brands()
            .iter()
            .map(|b| BrandSummary {
                brand: b.brand.clone(),
                label: b.label.clone(),
                origin: b.origin.clone(),
                popular_in_ksa: b.popular_in_ksa,
                model_count: b.models.len(),
            })
            .collect(),
    )
}

pub async fn get_models(
    State(catalog): State<Arc<Catalog>>,
    Path(brand): Path<String>,
) -> AppResult<Json<Vec<VehicleModel>>> {
    let brand = catalog
        .find_brand(&brand)
        .ok_or_else(|| AppError::NotFound(format!("Brand '{}' not found", brand)))?;
    Ok(Json(brand.models.clone()))
}

#[derive(Serialize)]
pub struct ListingResponse {
    listing: ListingDetail,
    related: Vec<ListingSummary>,
}

pub async fn get_listing(
    State(catalog): State<Arc<Catalog>>,
    Path(id): Path<String>,
) -> AppResult<Json<ListingResponse>> {
    let listing = catalog
        .find_listing(&id)
        .ok_or_else(|| AppError::NotFound(format!("Listing '{}' not found", id)))?;
    Ok(Json(ListingResponse {
        related: catalog
            .related_listings(listing)
            .into_iter()
            .map(|l| l.summary.clone())
            .collect(),
        listing: listing.clone(),
    }))
}

pub async fn get_workspace(State(workspace): State<Arc<Mutex<SellerWorkspace>>>) -> Json<SellerWorkspace> {
    Json(workspace.lock().await.clone())
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    status: ListingStatus,
}

#[derive(Serialize)]
pub struct StatusChangeResponse {
    listing: ManagedListing,
    audit: AuditEntry,
}

pub async fn change_listing_status(
    State(workspace): State<Arc<Mutex<SellerWorkspace>>>,
    Path(id): Path<String>,
    JsonExtract(request): JsonExtract<StatusChangeRequest>,
) -> AppResult<Json<StatusChangeResponse>> {
    let mut workspace = workspace.lock().await;
    workspace.change_status(&id, request.status, chrono::Utc::now())?;

    let listing = workspace
        .managed_listings
        .iter()
        .find(|l| l.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Listing '{}' not found", id)))?;
    let audit = workspace
        .audit_trail
        .front()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("Audit trail empty after status change")))?;
    Ok(Json(StatusChangeResponse { listing, audit }))
}
