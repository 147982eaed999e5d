// Seller onboarding and listing-management workspace.
// Everything lives in memory; submissions only mutate this state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::models::{Condition, VehicleBrand, VehicleModel, VehicleTrim, VehiclesData};

const SEEDED_LISTINGS: usize = 3;
const SEED_WATCHERS: u32 = 42;
const SEED_WATCHER_STEP: u32 = 7;

// The workspace is shared by every visitor, so both histories are bounded
const AUDIT_RETENTION: usize = 50;
const DRAFT_RETENTION: usize = 20;
const DRAFT_PREFIX: &str = "draft-";

const REGISTRATION_CONFIRMATION: &str = "Verification workflow triggered. Expect email confirmation within 1 business day while dashboard shows Pending Verification.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SellerError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("Unknown brand '{0}'")]
    UnknownBrand(String),
    #[error("Unknown model '{model}' for brand '{brand}'")]
    UnknownModel { brand: String, model: String },
    #[error("Year {year} is outside the {model} range {min}-{max}")]
    YearOutOfRange { model: String, year: String, min: i32, max: i32 },
    #[error("Unknown trim '{0}'")]
    UnknownTrim(String),
    #[error("Price must be a positive amount, got '{0}'")]
    InvalidPrice(String),
    #[error("Photo count must be a whole number, got '{0}'")]
    InvalidPhotoCount(String),
    #[error("Listing '{0}' not found")]
    UnknownListing(String),
}

// --- Registration ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    #[default]
    Upload,
    Code,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub business_name: String,
    pub cr_number: String,
    pub city: String,
    pub email: String,
    pub phone: String,
    pub verification_method: VerificationMethod,
    pub verification_code: String,
    pub license_file_name: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), SellerError> {
        let required = [
            ("Business name", &self.business_name),
            ("Commercial registration number", &self.cr_number),
            ("City", &self.city),
            ("Email", &self.email),
            ("Phone", &self.phone),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SellerError::MissingField(name));
            }
        }
        if !self.email.contains('@') {
            return Err(SellerError::InvalidEmail(self.email.clone()));
        }
        if self.verification_method == VerificationMethod::Code && self.verification_code.trim().is_empty() {
            return Err(SellerError::MissingField("Verification code"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Draft,
    Submitted,
}

impl RegistrationStatus {
    pub fn badge(&self) -> &'static str {
        match self {
            RegistrationStatus::Draft => "Complete your profile",
            RegistrationStatus::Submitted => "Pending Verification",
        }
    }
}

// --- Listing form ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingForm {
    pub brand_slug: String,
    pub model_slug: String,
    pub year: String,
    pub trim: String,
    pub condition: Condition,
    pub mileage: String,
    pub price_sar: String,
    pub inspection_ready: bool,
    pub photo_count: u32,
    pub inspection_document: bool,
}

impl Default for ListingForm {
    fn default() -> Self {
        ListingForm {
            brand_slug: String::new(),
            model_slug: String::new(),
            year: String::new(),
            trim: String::new(),
            condition: Condition::Used,
            mileage: String::new(),
            price_sar: String::new(),
            inspection_ready: true,
            photo_count: 6,
            inspection_document: true,
        }
    }
}

/// A single edit to the listing form.
#[derive(Debug, Clone)]
pub enum ListingFieldChange {
    Brand(String),
    Model(String),
    Year(String),
    Trim(String),
    Condition(Condition),
    Mileage(String),
    PriceSar(String),
    InspectionReady(bool),
    InspectionDocument(bool),
    PhotoCount(u32),
}

impl ListingForm {
    /// Applies an edit. Choosing a brand clears the model, trim and year;
    /// choosing a model clears trim and year; a new vehicle has zero mileage.
    pub fn apply(&mut self, change: ListingFieldChange) {
        match change {
            ListingFieldChange::Brand(brand) => {
                self.brand_slug = brand;
                self.model_slug.clear();
                self.trim.clear();
                self.year.clear();
            }
            ListingFieldChange::Model(model) => {
                self.model_slug = model;
                self.trim.clear();
                self.year.clear();
            }
            ListingFieldChange::Year(year) => self.year = year,
            ListingFieldChange::Trim(trim) => self.trim = trim,
            ListingFieldChange::Condition(condition) => {
                self.condition = condition;
                if condition == Condition::New {
                    self.mileage = "0".to_string();
                }
            }
            ListingFieldChange::Mileage(mileage) => self.mileage = mileage,
            ListingFieldChange::PriceSar(price) => self.price_sar = price,
            ListingFieldChange::InspectionReady(ready) => self.inspection_ready = ready,
            ListingFieldChange::InspectionDocument(ready) => self.inspection_document = ready,
            ListingFieldChange::PhotoCount(count) => self.photo_count = count,
        }
    }
}

pub fn find_brand<'a>(vehicles: &'a VehiclesData, slug: &str) -> Option<&'a VehicleBrand> {
    vehicles.brands.iter().find(|b| b.brand == slug)
}

// Newest model year first
pub fn years_for_model(model: &VehicleModel) -> Vec<i32> {
    (model.year_min..=model.year_max).rev().collect()
}

pub fn trims_for_model(model: &VehicleModel) -> &[VehicleTrim] {
    &model.trims
}

// --- Managed listings ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    Active,
    Paused,
    Sold,
    #[serde(rename = "Pending Review")]
    PendingReview,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "Active",
            ListingStatus::Paused => "Paused",
            ListingStatus::Sold => "Sold",
            ListingStatus::PendingReview => "Pending Review",
        }
    }

    pub fn audit_note(&self) -> &'static str {
        match self {
            ListingStatus::Paused => "Followers will be notified that the listing is paused.",
            ListingStatus::Sold => "Followers notified of sale and listing archived.",
            ListingStatus::Active => "Listing reactivated and sent for moderation review.",
            ListingStatus::PendingReview => "Listing awaiting moderation.",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(ListingStatus::Active),
            "Paused" => Some(ListingStatus::Paused),
            "Sold" => Some(ListingStatus::Sold),
            "Pending Review" => Some(ListingStatus::PendingReview),
            _ => None,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedListing {
    pub id: String,
    pub title: String,
    pub status: ListingStatus,
    pub watchers: u32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    pub title: String,
    pub status: ListingStatus,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SellerWorkspace {
    pub registration: RegistrationForm,
    pub registration_status: RegistrationStatus,
    pub registration_message: Option<String>,
    pub listing_form: ListingForm,
    pub last_submission: Option<ListingForm>,
    pub managed_listings: Vec<ManagedListing>,
    pub audit_trail: VecDeque<AuditEntry>,
}

impl SellerWorkspace {
    /// Workspace pre-filled with the seller's first catalog listings, all active.
    pub fn seeded(catalog: &Catalog, seller_name: &str, now: DateTime<Utc>) -> Self {
        let managed_listings = catalog
            .listings_by_seller(seller_name)
            .into_iter()
            .take(SEEDED_LISTINGS)
            .enumerate()
            .map(|(index, listing)| ManagedListing {
                id: listing.summary.id.clone(),
                title: listing.summary.title.clone(),
                status: ListingStatus::Active,
                watchers: SEED_WATCHERS.saturating_sub(SEED_WATCHER_STEP * index as u32),
                last_updated: now,
            })
            .collect();

        SellerWorkspace {
            managed_listings,
            ..Default::default()
        }
    }

    pub fn submit_registration(&mut self, form: RegistrationForm) -> Result<(), SellerError> {
        form.validate()?;
        tracing::info!(business = %form.business_name, method = ?form.verification_method, "Seller registration submitted");
        self.registration = form;
        self.registration_status = RegistrationStatus::Submitted;
        self.registration_message = Some(REGISTRATION_CONFIRMATION.to_string());
        Ok(())
    }

    /// Validates the form against the taxonomy and queues a draft for moderation.
    pub fn submit_listing(
        &mut self,
        form: ListingForm,
        vehicles: &VehiclesData,
        now: DateTime<Utc>,
    ) -> Result<&ManagedListing, SellerError> {
        let title = validate_listing(&form, vehicles)?;
        let id = self.unique_draft_id(now);

        self.managed_listings.insert(
            0,
            ManagedListing {
                id: id.clone(),
                title: title.clone(),
                status: ListingStatus::PendingReview,
                watchers: 0,
                last_updated: now,
            },
        );
        self.prune_drafts();
        self.record(AuditEntry {
            id,
            title,
            status: ListingStatus::PendingReview,
            note: "Listing entered moderation queue with 24h SLA.".to_string(),
            timestamp: now,
        });
        self.listing_form = form.clone();
        self.last_submission = Some(form);

        Ok(&self.managed_listings[0])
    }

    pub fn change_status(&mut self, id: &str, status: ListingStatus, now: DateTime<Utc>) -> Result<(), SellerError> {
        let listing = self
            .managed_listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| SellerError::UnknownListing(id.to_string()))?;

        listing.status = status;
        listing.last_updated = now;
        let title = listing.title.clone();
        tracing::info!(listing = id, status = %status, "Managed listing status changed");

        self.record(AuditEntry {
            id: id.to_string(),
            title,
            status,
            note: status.audit_note().to_string(),
            timestamp: now,
        });
        Ok(())
    }

    /// Newest entries first.
    pub fn recent_audit(&self, limit: usize) -> impl Iterator<Item = &AuditEntry> {
        self.audit_trail.iter().take(limit)
    }

    fn record(&mut self, entry: AuditEntry) {
        self.audit_trail.push_front(entry);
        self.audit_trail.truncate(AUDIT_RETENTION);
    }

    // Millisecond ids collide when two visitors submit together; suffix until free
    fn unique_draft_id(&self, now: DateTime<Utc>) -> String {
        let base = format!("{}{}", DRAFT_PREFIX, now.timestamp_millis());
        let taken = |id: &str| self.managed_listings.iter().any(|l| l.id == id);
        if !taken(&base) {
            return base;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if !taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    // Drops the oldest drafts beyond the retention limit; seeded listings stay
    fn prune_drafts(&mut self) {
        let mut drafts = 0;
        self.managed_listings.retain(|l| {
            if !l.id.starts_with(DRAFT_PREFIX) {
                return true;
            }
            drafts += 1;
            drafts <= DRAFT_RETENTION
        });
    }
}

/// Blank keeps the form's current count; anything else must parse as a whole number.
pub fn parse_photo_count(raw: &str) -> Result<Option<u32>, SellerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| SellerError::InvalidPhotoCount(raw.to_string()))
}

// Returns the draft title on success
fn validate_listing(form: &ListingForm, vehicles: &VehiclesData) -> Result<String, SellerError> {
    if form.brand_slug.is_empty() {
        return Err(SellerError::MissingField("Brand"));
    }
    let brand = find_brand(vehicles, &form.brand_slug)
        .ok_or_else(|| SellerError::UnknownBrand(form.brand_slug.clone()))?;

    if form.model_slug.is_empty() {
        return Err(SellerError::MissingField("Model"));
    }
    let model = brand
        .models
        .iter()
        .find(|m| m.model == form.model_slug)
        .ok_or_else(|| SellerError::UnknownModel {
            brand: form.brand_slug.clone(),
            model: form.model_slug.clone(),
        })?;

    if form.year.is_empty() {
        return Err(SellerError::MissingField("Year"));
    }
    let in_range = form
        .year
        .trim()
        .parse::<i32>()
        .is_ok_and(|year| year >= model.year_min && year <= model.year_max);
    if !in_range {
        return Err(SellerError::YearOutOfRange {
            model: model.label.clone(),
            year: form.year.clone(),
            min: model.year_min,
            max: model.year_max,
        });
    }

    if form.trim.is_empty() {
        return Err(SellerError::MissingField("Trim"));
    }
    if !trims_for_model(model).iter().any(|t| t.trim == form.trim) {
        return Err(SellerError::UnknownTrim(form.trim.clone()));
    }

    if form.condition == Condition::Used && form.mileage.trim().is_empty() {
        return Err(SellerError::MissingField("Mileage"));
    }

    let price_ok = form
        .price_sar
        .trim()
        .parse::<f64>()
        .is_ok_and(|price| price.is_finite() && price > 0.0);
    if !price_ok {
        return Err(SellerError::InvalidPrice(form.price_sar.clone()));
    }

    Ok(format!("{} {} {}", brand.label, model.label, form.year).trim().to_string())
}
