// Marketplace front end: catalog browsing, faceted filters, listing pages and
// the seller workspace, plus the data tooling behind them.

use axum::extract::FromRef;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod format;
pub mod generator;
pub mod integrity;
pub mod logging;
pub mod models;
pub mod routes;
pub mod schema;
pub mod seller;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::seller::SellerWorkspace;

// Shared application state, handed to every handler via axum's State extractor
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub catalog: Arc<Catalog>,
    pub workspace: Arc<Mutex<SellerWorkspace>>,
}

impl AppState {
    pub fn new(settings: Settings, catalog: Catalog) -> Self {
        let workspace = SellerWorkspace::seeded(&catalog, &settings.seller_name, chrono::Utc::now());
        AppState {
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            workspace: Arc::new(Mutex::new(workspace)),
        }
    }
}
