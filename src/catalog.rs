// Static marketplace data, loaded once at startup and shared read-only

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::models::{
    CategoriesData, CategoryNode, FilterDefinition, FiltersData, ListingDetail, ListingsData,
    VehicleBrand, VehicleModel, VehiclesData,
};

const RELATED_LISTINGS_LIMIT: usize = 4;

// The cars landing page is an alias for the vehicles category
const CARS_ALIAS: &str = "cars";
const VEHICLES_CATEGORY: &str = "vehicles";

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: CategoriesData,
    filters: FiltersData,
    vehicles: VehiclesData,
    listings: ListingsData,
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

impl Catalog {
    pub fn new(
        categories: CategoriesData,
        filters: FiltersData,
        vehicles: VehiclesData,
        listings: ListingsData,
    ) -> Self {
        Catalog {
            categories,
            filters,
            vehicles,
            listings,
        }
    }

    pub async fn load(data_dir: &Path) -> Result<Self> {
        let categories_path = data_dir.join("categories.json");
        let filters_path = data_dir.join("filters.json");
        let vehicles_path = data_dir.join("vehicles").join("vehicles.json");
        let listings_path = data_dir.join("listings.json");

        let (categories, filters, vehicles, listings) = futures::try_join!(
            read_json::<CategoriesData>(&categories_path),
            read_json::<FiltersData>(&filters_path),
            read_json::<VehiclesData>(&vehicles_path),
            read_json::<ListingsData>(&listings_path),
        )?;

        tracing::info!(
            categories = categories.categories.len(),
            filter_sets = filters.filters.len(),
            brands = vehicles.brands.len(),
            listings = listings.listings.len(),
            "Catalog loaded from {}",
            data_dir.display()
        );
        Ok(Catalog::new(categories, filters, vehicles, listings))
    }

    pub fn categories(&self) -> &[CategoryNode] {
        &self.categories.categories
    }

    pub fn find_category(&self, slug: &str) -> Option<&CategoryNode> {
        self.categories.categories.iter().find(|c| c.slug == slug)
    }

    pub fn category_label(&self, slug: &str) -> Option<&str> {
        self.find_category(slug).map(|c| c.label.as_str())
    }

    pub fn filters_for(&self, category: &str) -> &[FilterDefinition] {
        self.filters
            .filters
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn vehicles(&self) -> &VehiclesData {
        &self.vehicles
    }

    pub fn brands(&self) -> &[VehicleBrand] {
        &self.vehicles.brands
    }

    pub fn find_brand(&self, slug: &str) -> Option<&VehicleBrand> {
        self.vehicles.brands.iter().find(|b| b.brand == slug)
    }

    pub fn find_model(&self, brand: &str, model: &str) -> Option<(&VehicleBrand, &VehicleModel)> {
        let brand = self.find_brand(brand)?;
        let model = brand.models.iter().find(|m| m.model == model)?;
        Some((brand, model))
    }

    pub fn listings(&self) -> &[ListingDetail] {
        &self.listings.listings
    }

    pub fn find_listing(&self, id: &str) -> Option<&ListingDetail> {
        self.listings.listings.iter().find(|l| l.summary.id == id)
    }

    pub fn listings_in_category(&self, slug: &str) -> Vec<&ListingDetail> {
        let slug = if slug == CARS_ALIAS { VEHICLES_CATEGORY } else { slug };
        self.listings
            .listings
            .iter()
            .filter(|l| l.summary.category_slug.as_deref() == Some(slug))
            .collect()
    }

    pub fn featured_listings(&self, limit: usize) -> Vec<&ListingDetail> {
        self.listings_in_category(VEHICLES_CATEGORY)
            .into_iter()
            .take(limit)
            .collect()
    }

    /// Related ids resolved in order; unknown ids and the listing itself are skipped.
    pub fn related_listings(&self, listing: &ListingDetail) -> Vec<&ListingDetail> {
        listing
            .related_listing_ids
            .iter()
            .filter_map(|id| self.find_listing(id))
            .filter(|candidate| candidate.summary.id != listing.summary.id)
            .take(RELATED_LISTINGS_LIMIT)
            .collect()
    }

    pub fn listings_by_seller(&self, seller_name: &str) -> Vec<&ListingDetail> {
        self.listings
            .listings
            .iter()
            .filter(|l| l.seller.name == seller_name)
            .collect()
    }
}
