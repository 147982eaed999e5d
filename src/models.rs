// Data structures for the static marketplace files
// (categories.json, filters.json, vehicles.json, listings.json)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// --- Categories ---

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub slug: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub featured_filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoriesData {
    pub version: String,
    pub categories: Vec<CategoryNode>,
}

// --- Filters ---

// Options come either as a bare value or as a value/label pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FilterOption {
    Raw(String),
    Labeled { value: String, label: String },
}

impl FilterOption {
    pub fn value(&self) -> &str {
        match self {
            FilterOption::Raw(value) => value,
            FilterOption::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FilterOption::Raw(value) => value,
            FilterOption::Labeled { label, .. } => label,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Select,
    Range,
    Segmented,
    Number,
    Date,
    Text,
}

/// A scalar used for filter defaults and `visibleWhen` clauses.
///
/// Filter state only ever holds strings, so comparisons go through the
/// `Display` rendering (`2020`, `true`, `used`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FilterScalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for FilterScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterScalar::Bool(b) => write!(f, "{}", b),
            FilterScalar::Number(n) => match n.as_f64() {
                // `2020.0` in JSON must match the query value `2020`
                Some(v) if n.is_f64() && v == 0.0 => f.write_str("0"),
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e21 => write!(f, "{:.0}", v),
                _ => write!(f, "{}", n),
            },
            FilterScalar::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FilterScalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<BTreeMap<String, FilterScalar>>,
}

impl FilterDefinition {
    // Range filters own two derived state keys
    pub fn min_key(&self) -> String {
        format!("{}_min", self.key)
    }

    pub fn max_key(&self) -> String {
        format!("{}_max", self.key)
    }

    pub fn is_range(&self) -> bool {
        self.kind == FilterKind::Range
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FiltersData {
    pub version: String,
    pub filters: BTreeMap<String, Vec<FilterDefinition>>,
}

// --- Vehicle taxonomy ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VehicleTrim {
    pub trim: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivetrain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UsedOnlyAttribute {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCondition {
    pub options: Vec<String>,
    pub used_only_attributes: Vec<UsedOnlyAttribute>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModel {
    pub model: String,
    pub label: String,
    pub body_type: String,
    #[serde(rename = "year_min")] // snake_case in vehicles.json
    pub year_min: i32,
    #[serde(rename = "year_max")]
    pub year_max: i32,
    pub trims: Vec<VehicleTrim>,
    pub condition: VehicleCondition,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleBrand {
    pub brand: String,
    pub label: String,
    pub origin: String,
    pub popular_in_ksa: bool,
    pub models: Vec<VehicleModel>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehiclesData {
    pub version: String,
    pub generated_at: String,
    pub brands: Vec<VehicleBrand>,
}

// --- Listings ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Flattened projection used for cards and filter matching
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: String,
    pub title: String,
    pub price_sar: u64,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_slug: Option<String>,
    pub condition: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage_km: Option<u32>,
    #[serde(default)]
    pub certified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owners: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accident_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListingMedia {
    pub id: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    Pass,
    Attention,
    Fail,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Pass => "pass",
            InspectionStatus::Attention => "attention",
            InspectionStatus::Fail => "fail",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InspectionChecklistItem {
    pub item: String,
    pub status: InspectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingInspection {
    pub certified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub checklist: Vec<InspectionChecklistItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingSeller {
    pub name: String,
    pub rating: f64,
    pub total_sales: u32,
    pub response_time: String,
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub summary: ListingSummary,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivetrain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interior_color: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub photos: Vec<ListingMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection: Option<ListingInspection>,
    pub seller: ListingSeller,
    #[serde(default)]
    pub related_listing_ids: Vec<String>,
}

impl ListingDetail {
    // Certified either directly or through a certified inspection record
    pub fn is_certified(&self) -> bool {
        self.summary.certified || self.inspection.as_ref().is_some_and(|i| i.certified)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListingsData {
    pub version: String,
    pub listings: Vec<ListingDetail>,
}
