// Server-rendered pages (askama templates under templates/)

use askama::Template;
use axum::{
    extract::{Form, Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
    filters::{filter_listings, FilterState, FilterSync, QueryParams},
    format::{
        category_href, format_accident_history, format_sar, format_warranty, humanize_key, listing_breadcrumbs,
        Breadcrumb,
    },
    models::{CategoryNode, Condition, FilterDefinition, FilterKind, ListingSummary},
    seller::{
        self, ListingFieldChange, ListingForm, ListingStatus, RegistrationForm, SellerError, SellerWorkspace,
        VerificationMethod,
    },
};

const FEATURED_LISTINGS: usize = 4;
const BRAND_PREVIEW_MODELS: usize = 3;
const AUDIT_ENTRIES_SHOWN: usize = 6;
const VEHICLES_CATEGORY: &str = "vehicles";

// --- Shared view models ---

pub struct ListingCard {
    pub href: String,
    pub title: String,
    pub price: String,
    pub city: String,
    pub condition: String,
    pub year: String,
    pub mileage: String,
    pub certified: bool,
}

impl ListingCard {
    fn from_summary(summary: &ListingSummary) -> Self {
        ListingCard {
            href: format!("/listings/{}", summary.id),
            title: summary.title.clone(),
            price: format_sar(summary.price_sar),
            city: summary.city.clone(),
            condition: summary.condition.to_string(),
            year: summary.year.map(|y| y.to_string()).unwrap_or_default(),
            mileage: summary
                .mileage_km
                .map(|km| format!("{} km", format_sar(u64::from(km))))
                .unwrap_or_default(),
            certified: summary.certified,
        }
    }
}

pub struct CategoryLink {
    pub label: String,
    pub href: String,
    pub description: String,
    pub children: Vec<CategoryLink>,
}

impl CategoryLink {
    fn from_node(node: &CategoryNode, parent: Option<&str>) -> Self {
        CategoryLink {
            label: node.label.clone(),
            href: category_href(&node.slug, parent),
            description: node.description.clone().unwrap_or_default(),
            children: node
                .children
                .iter()
                .map(|child| CategoryLink::from_node(child, Some(&node.slug)))
                .collect(),
        }
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, current: &str) -> Self {
        SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current,
        }
    }
}

pub struct FilterField {
    pub key: String,
    pub label: String,
    pub kind: &'static str,
    pub options: Vec<SelectOption>,
    pub value: String,
    pub min_key: String,
    pub max_key: String,
    pub min_value: String,
    pub max_value: String,
    pub min_bound: String,
    pub max_bound: String,
    pub unit: String,
}

pub struct HiddenParam {
    pub name: String,
    pub value: String,
}

pub struct FilterPanel {
    pub title: String,
    pub action: String,
    pub reset_href: String,
    pub fields: Vec<FilterField>,
    pub hidden: Vec<HiddenParam>,
}

pub struct FilterChip {
    pub label: String,
    pub removable: bool,
    pub remove_href: String,
}

pub struct FocusChip {
    pub label: String,
    pub href: String,
    pub active: bool,
}

fn kind_name(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Select => "select",
        FilterKind::Range => "range",
        FilterKind::Segmented => "segmented",
        FilterKind::Number => "number",
        FilterKind::Date => "date",
        FilterKind::Text => "text",
    }
}

fn bound(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// Inline options win; otherwise options come from the vehicle taxonomy
fn field_options(catalog: &Catalog, def: &FilterDefinition, state: &FilterState) -> Vec<(String, String)> {
    if !def.options.is_empty() {
        return def
            .options
            .iter()
            .map(|o| (o.value().to_string(), o.label().to_string()))
            .collect();
    }
    match def.source.as_deref() {
        Some("vehicles.brands") => catalog
            .brands()
            .iter()
            .map(|b| (b.brand.clone(), b.label.clone()))
            .collect(),
        Some("vehicles.models") => state
            .value("brand")
            .and_then(|brand| catalog.find_brand(brand))
            .map(|brand| {
                brand
                    .models
                    .iter()
                    .map(|m| (m.model.clone(), m.label.clone()))
                    .collect()
            })
            .unwrap_or_default(),
        Some("vehicles.trims") => match (state.value("brand"), state.value("model")) {
            (Some(brand), Some(model)) => catalog
                .find_model(brand, model)
                .map(|(_, model)| {
                    model
                        .trims
                        .iter()
                        .map(|t| (t.trim.clone(), t.label.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn filter_field(catalog: &Catalog, def: &FilterDefinition, state: &FilterState) -> FilterField {
    let value = state.get(&def.key).unwrap_or_default().to_string();
    let options = field_options(catalog, def, state)
        .iter()
        .map(|(v, l)| SelectOption::new(v, l, &value))
        .collect();
    let (min_key, max_key) = (def.min_key(), def.max_key());
    FilterField {
        key: def.key.clone(),
        label: humanize_key(&def.key),
        kind: kind_name(def.kind),
        options,
        min_value: state.get(&min_key).unwrap_or_default().to_string(),
        max_value: state.get(&max_key).unwrap_or_default().to_string(),
        min_key,
        max_key,
        value,
        min_bound: bound(def.min),
        max_bound: bound(def.max),
        unit: def.unit.clone().unwrap_or_default(),
    }
}

// The panel is a GET form back to the page; non-filter params ride along as hidden inputs
fn filter_panel(catalog: &Catalog, sync: &FilterSync, query: &QueryParams, action: &str, title: &str) -> FilterPanel {
    let keep: QueryParams = query
        .iter()
        .filter(|(key, _)| !sync.recognized_keys().contains(*key))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    FilterPanel {
        title: title.to_string(),
        action: action.to_string(),
        reset_href: keep.to_href(action),
        fields: sync
            .visible()
            .into_iter()
            .map(|def| filter_field(catalog, def, sync.state()))
            .collect(),
        hidden: keep
            .iter()
            .map(|(name, value)| HiddenParam {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

fn render<T: Template>(template: &T) -> AppResult<Response> {
    Ok(Html(template.render()?).into_response())
}

// --- Not found ---

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate;

pub fn not_found() -> Response {
    match NotFoundTemplate.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render not-found template: {}", e);
            (StatusCode::NOT_FOUND, "Page not found").into_response()
        }
    }
}

pub async fn fallback() -> Response {
    not_found()
}

// --- Home & categories ---

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    categories: Vec<CategoryLink>,
    featured: Vec<ListingCard>,
}

pub async fn home_page(State(catalog): State<Arc<Catalog>>) -> AppResult<Response> {
    let template = HomeTemplate {
        categories: catalog
            .categories()
            .iter()
            .map(|c| CategoryLink::from_node(c, None))
            .collect(),
        featured: catalog
            .featured_listings(FEATURED_LISTINGS)
            .into_iter()
            .map(|l| ListingCard::from_summary(&l.summary))
            .collect(),
    };
    render(&template)
}

#[derive(Template)]
#[template(path = "categories.html")]
struct CategoriesTemplate {
    categories: Vec<CategoryLink>,
}

pub async fn categories_page(State(catalog): State<Arc<Catalog>>) -> AppResult<Response> {
    let template = CategoriesTemplate {
        categories: catalog
            .categories()
            .iter()
            .map(|c| CategoryLink::from_node(c, None))
            .collect(),
    };
    render(&template)
}

#[derive(Template)]
#[template(path = "category.html")]
struct CategoryTemplate {
    breadcrumbs: Vec<Breadcrumb>,
    label: String,
    description: String,
    focus_label: String,
    subcategories: Vec<FocusChip>,
    shown: usize,
    total: usize,
    chips: Vec<FilterChip>,
    listings: Vec<ListingCard>,
    panel: FilterPanel,
}

pub async fn category_page(
    State(catalog): State<Arc<Catalog>>,
    Path(slug): Path<String>,
    RawQuery(raw): RawQuery,
) -> AppResult<Response> {
    if slug == "cars" {
        return cars_page(&catalog);
    }
    let Some(category) = catalog.find_category(&slug) else {
        return Ok(not_found());
    };

    let path = format!("/categories/{}", category.slug);
    let query = QueryParams::parse(raw.as_deref().unwrap_or_default());
    let sync = FilterSync::new(catalog.filters_for(&category.slug).to_vec(), &query);

    let focus = query.get("focus");
    let focused = focus.and_then(|f| category.children.iter().find(|c| c.slug == f));
    tracing::info!(target: "analytics", event = "category_view", category = %category.slug, focus = ?focus);

    let all = catalog.listings_in_category(&category.slug);
    let matched = filter_listings(all.iter().map(|l| &l.summary), sync.state());

    let mut breadcrumbs = vec![
        Breadcrumb { label: "Home".into(), href: Some("/".into()) },
        Breadcrumb { label: "Categories".into(), href: Some("/categories".into()) },
        Breadcrumb { label: category.label.clone(), href: Some(path.clone()) },
    ];
    if let Some(child) = focused {
        breadcrumbs.push(Breadcrumb {
            label: child.label.clone(),
            href: Some(category_href(&child.slug, Some(&category.slug))),
        });
    }

    let template = CategoryTemplate {
        breadcrumbs,
        label: category.label.clone(),
        description: category.description.clone().unwrap_or_default(),
        focus_label: focused.map(|c| c.label.clone()).unwrap_or_default(),
        subcategories: category
            .children
            .iter()
            .map(|child| FocusChip {
                label: child.label.clone(),
                href: category_href(&child.slug, Some(&category.slug)),
                active: focus == Some(child.slug.as_str()),
            })
            .collect(),
        shown: matched.len(),
        total: all.len(),
        chips: sync
            .active_filters()
            .into_iter()
            .map(|active| {
                let remove_href = sync.query_without(&active.key, &query).map(|q| q.to_href(&path));
                FilterChip {
                    removable: remove_href.is_some(),
                    remove_href: remove_href.unwrap_or_default(),
                    label: active.label,
                }
            })
            .collect(),
        listings: matched.into_iter().map(ListingCard::from_summary).collect(),
        panel: filter_panel(&catalog, &sync, &query, &path, "Filter"),
    };
    render(&template)
}

// --- Vehicle taxonomy ---

pub struct BrandCard {
    pub href: String,
    pub label: String,
    pub origin: String,
    pub popular: bool,
    pub models: Vec<String>,
}

#[derive(Template)]
#[template(path = "cars.html")]
struct CarsTemplate {
    brands: Vec<BrandCard>,
}

fn cars_page(catalog: &Catalog) -> AppResult<Response> {
    let template = CarsTemplate {
        brands: catalog
            .brands()
            .iter()
            .map(|brand| BrandCard {
                href: format!("/categories/cars/{}", brand.brand),
                label: brand.label.clone(),
                origin: brand.origin.clone(),
                popular: brand.popular_in_ksa,
                models: brand
                    .models
                    .iter()
                    .take(BRAND_PREVIEW_MODELS)
                    .map(|m| m.label.clone())
                    .collect(),
            })
            .collect(),
    };
    render(&template)
}

pub struct ModelCard {
    pub href: String,
    pub label: String,
    pub body_type: String,
    pub years: String,
    pub trim_count: usize,
}

#[derive(Template)]
#[template(path = "brand.html")]
struct BrandTemplate {
    label: String,
    origin: String,
    popular: bool,
    models: Vec<ModelCard>,
}

pub async fn brand_page(
    State(catalog): State<Arc<Catalog>>,
    Path((slug, brand)): Path<(String, String)>,
) -> AppResult<Response> {
    let Some(brand) = catalog.find_brand(&brand).filter(|_| slug == "cars") else {
        return Ok(not_found());
    };
    let template = BrandTemplate {
        label: brand.label.clone(),
        origin: brand.origin.clone(),
        popular: brand.popular_in_ksa,
        models: brand
            .models
            .iter()
            .map(|model| ModelCard {
                href: format!("/categories/cars/{}/{}", brand.brand, model.model),
                label: model.label.clone(),
                body_type: model.body_type.clone(),
                years: format!("{} – {}", model.year_min, model.year_max),
                trim_count: model.trims.len(),
            })
            .collect(),
    };
    render(&template)
}

pub struct TrimCard {
    pub label: String,
    pub specs: Vec<String>,
    pub years: String,
}

#[derive(Template)]
#[template(path = "model.html")]
struct ModelTemplate {
    brand_label: String,
    brand_href: String,
    label: String,
    body_type: String,
    year_min: i32,
    year_max: i32,
    trims: Vec<TrimCard>,
    disclosures: Vec<String>,
    panel: FilterPanel,
}

pub async fn model_page(
    State(catalog): State<Arc<Catalog>>,
    Path((slug, brand, model)): Path<(String, String, String)>,
    RawQuery(raw): RawQuery,
) -> AppResult<Response> {
    let Some((brand, model)) = catalog.find_model(&brand, &model).filter(|_| slug == "cars") else {
        return Ok(not_found());
    };

    let path = format!("/categories/cars/{}/{}", brand.brand, model.model);
    let query = QueryParams::parse(raw.as_deref().unwrap_or_default());
    let sync = FilterSync::new(catalog.filters_for(VEHICLES_CATEGORY).to_vec(), &query);

    let trims = model
        .trims
        .iter()
        .map(|trim| {
            let specs = [
                ("Engine", &trim.engine),
                ("Drivetrain", &trim.drivetrain),
                ("Transmission", &trim.transmission),
                ("Fuel", &trim.fuel),
            ]
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}: {}", name, v)))
            .collect();
            let years: Vec<String> = trim.years.iter().map(i32::to_string).collect();
            TrimCard {
                label: trim.label.clone(),
                specs,
                years: years.join(", "),
            }
        })
        .collect();

    let template = ModelTemplate {
        brand_label: brand.label.clone(),
        brand_href: format!("/categories/cars/{}", brand.brand),
        label: model.label.clone(),
        body_type: model.body_type.clone(),
        year_min: model.year_min,
        year_max: model.year_max,
        trims,
        disclosures: model
            .condition
            .used_only_attributes
            .iter()
            .map(|a| a.label.clone())
            .collect(),
        panel: filter_panel(&catalog, &sync, &query, &path, "Vehicle filters"),
    };
    render(&template)
}

// --- Listing detail ---

pub struct DetailRow {
    pub label: String,
    pub value: String,
}

pub struct ChecklistRow {
    pub item: String,
    pub status: &'static str,
    pub notes: String,
}

pub struct InspectionView {
    pub certified: bool,
    pub date: String,
    pub inspector: String,
    pub summary: String,
    pub checklist: Vec<ChecklistRow>,
}

#[derive(Template)]
#[template(path = "listing.html")]
struct ListingTemplate {
    breadcrumbs: Vec<Breadcrumb>,
    title: String,
    price: String,
    city: String,
    condition: String,
    certified: bool,
    description: String,
    photos: Vec<String>,
    specs: Vec<DetailRow>,
    history: Vec<DetailRow>,
    features: Vec<String>,
    inspection: Vec<InspectionView>,
    seller_name: String,
    seller_rating: String,
    seller_sales: u32,
    seller_response: String,
    seller_verified: bool,
    related: Vec<ListingCard>,
}

fn row(label: &str, value: Option<String>) -> Option<DetailRow> {
    value.map(|value| DetailRow {
        label: label.to_string(),
        value,
    })
}

pub async fn listing_page(State(catalog): State<Arc<Catalog>>, Path(id): Path<String>) -> AppResult<Response> {
    let Some(listing) = catalog.find_listing(&id) else {
        return Ok(not_found());
    };
    let summary = &listing.summary;
    tracing::info!(target: "analytics", event = "listing_view", listing = %summary.id, category = ?summary.category_slug);

    let category_label = summary
        .category_slug
        .as_deref()
        .and_then(|slug| catalog.category_label(slug));

    let specs = [
        row("Body type", listing.body_type.clone()),
        row("Transmission", listing.transmission.clone()),
        row("Drivetrain", listing.drivetrain.clone()),
        row("Fuel type", listing.fuel_type.clone()),
        row("Exterior color", listing.exterior_color.clone()),
        row("Interior color", listing.interior_color.clone()),
    ];
    let history = [
        row(
            "Mileage",
            summary
                .mileage_km
                .filter(|km| *km > 0)
                .map(|km| format!("{} km", format_sar(u64::from(km)))),
        ),
        row("Previous owners", summary.owners.map(|o| o.to_string())),
        row(
            "Accident history",
            Some(format_accident_history(summary.accident_history.as_deref())),
        ),
        row("Warranty", Some(format_warranty(summary.warranty_status.as_deref()))),
    ];

    let inspection = listing
        .inspection
        .iter()
        .map(|inspection| InspectionView {
            certified: inspection.certified,
            date: inspection.inspection_date.clone().unwrap_or_default(),
            inspector: inspection.inspector.clone().unwrap_or_default(),
            summary: inspection.summary.clone(),
            checklist: inspection
                .checklist
                .iter()
                .map(|item| ChecklistRow {
                    item: item.item.clone(),
                    status: item.status.as_str(),
                    notes: item.notes.clone().unwrap_or_default(),
                })
                .collect(),
        })
        .collect();

    let template = ListingTemplate {
        breadcrumbs: listing_breadcrumbs(listing, category_label),
        title: summary.title.clone(),
        price: format_sar(summary.price_sar),
        city: summary.city.clone(),
        condition: summary.condition.to_string(),
        certified: listing.is_certified(),
        description: listing.description.clone(),
        photos: listing.photos.iter().map(|p| p.caption.clone()).collect(),
        specs: specs.into_iter().flatten().collect(),
        history: history.into_iter().flatten().collect(),
        features: listing.features.clone(),
        inspection,
        seller_name: listing.seller.name.clone(),
        seller_rating: format!("{:.1}", listing.seller.rating),
        seller_sales: listing.seller.total_sales,
        seller_response: listing.seller.response_time.clone(),
        seller_verified: listing.seller.verified,
        related: catalog
            .related_listings(listing)
            .into_iter()
            .map(|l| ListingCard::from_summary(&l.summary))
            .collect(),
    };
    render(&template)
}

// --- Seller workspace ---

pub struct ManagedRow {
    pub id: String,
    pub title: String,
    pub status: String,
    pub watchers: u32,
    pub last_updated: String,
    pub actions: Vec<&'static str>,
}

pub struct AuditRow {
    pub title: String,
    pub status: String,
    pub note: String,
    pub timestamp: String,
}

#[derive(Template)]
#[template(path = "sellers.html")]
struct SellersTemplate {
    notice: String,
    error: String,
    registration_badge: &'static str,
    registration_message: String,
    registration: RegistrationForm,
    code_selected: bool,
    form: ListingForm,
    used: bool,
    brands: Vec<SelectOption>,
    models: Vec<SelectOption>,
    years: Vec<SelectOption>,
    trims: Vec<SelectOption>,
    managed: Vec<ManagedRow>,
    audit: Vec<AuditRow>,
}

const STATUS_ACTIONS: [ListingStatus; 3] = [ListingStatus::Active, ListingStatus::Paused, ListingStatus::Sold];

/// Rebuilds the cascading listing form from the "Load models & trims" GET submit.
fn listing_form_from_query(query: &QueryParams) -> ListingForm {
    let mut form = ListingForm::default();
    let edits: [(&str, fn(String) -> ListingFieldChange); 6] = [
        ("brandSlug", ListingFieldChange::Brand),
        ("modelSlug", ListingFieldChange::Model),
        ("year", ListingFieldChange::Year),
        ("trim", ListingFieldChange::Trim),
        ("mileage", ListingFieldChange::Mileage),
        ("priceSar", ListingFieldChange::PriceSar),
    ];
    for (key, change) in edits {
        if let Some(value) = query.get(key).filter(|v| !v.is_empty()) {
            form.apply(change(value.to_string()));
        }
    }
    if query.get("condition") == Some("new") {
        form.apply(ListingFieldChange::Condition(Condition::New));
    }
    form
}

fn sellers_template(catalog: &Catalog, workspace: &SellerWorkspace, query: &QueryParams) -> SellersTemplate {
    let form = listing_form_from_query(query);
    let model = catalog.find_model(&form.brand_slug, &form.model_slug).map(|(_, m)| m);

    SellersTemplate {
        notice: query.get("notice").unwrap_or_default().to_string(),
        error: query.get("error").unwrap_or_default().to_string(),
        registration_badge: workspace.registration_status.badge(),
        registration_message: workspace.registration_message.clone().unwrap_or_default(),
        registration: workspace.registration.clone(),
        code_selected: workspace.registration.verification_method == VerificationMethod::Code,
        used: form.condition == Condition::Used,
        brands: catalog
            .brands()
            .iter()
            .map(|b| SelectOption::new(&b.brand, &b.label, &form.brand_slug))
            .collect(),
        models: catalog
            .find_brand(&form.brand_slug)
            .map(|b| {
                b.models
                    .iter()
                    .map(|m| SelectOption::new(&m.model, &m.label, &form.model_slug))
                    .collect()
            })
            .unwrap_or_default(),
        years: model
            .map(|m| {
                seller::years_for_model(m)
                    .into_iter()
                    .map(|y| {
                        let year = y.to_string();
                        SelectOption::new(&year, &year, &form.year)
                    })
                    .collect()
            })
            .unwrap_or_default(),
        trims: model
            .map(|m| {
                seller::trims_for_model(m)
                    .iter()
                    .map(|t| SelectOption::new(&t.trim, &t.label, &form.trim))
                    .collect()
            })
            .unwrap_or_default(),
        form,
        managed: workspace
            .managed_listings
            .iter()
            .map(|l| ManagedRow {
                id: l.id.clone(),
                title: l.title.clone(),
                status: l.status.to_string(),
                watchers: l.watchers,
                last_updated: l.last_updated.format("%Y-%m-%d %H:%M").to_string(),
                actions: STATUS_ACTIONS
                    .iter()
                    .filter(|s| **s != l.status)
                    .map(ListingStatus::as_str)
                    .collect(),
            })
            .collect(),
        audit: workspace
            .recent_audit(AUDIT_ENTRIES_SHOWN)
            .map(|e| AuditRow {
                title: e.title.clone(),
                status: e.status.to_string(),
                note: e.note.clone(),
                timestamp: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            })
            .collect(),
    }
}

pub async fn sellers_page(
    State(catalog): State<Arc<Catalog>>,
    State(workspace): State<Arc<Mutex<SellerWorkspace>>>,
    RawQuery(raw): RawQuery,
) -> AppResult<Response> {
    let query = QueryParams::parse(raw.as_deref().unwrap_or_default());
    let workspace = workspace.lock().await;
    let template = sellers_template(&catalog, &workspace, &query);
    render(&template)
}

fn redirect_with(params: &[(&str, &str)]) -> Redirect {
    let query: QueryParams = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Redirect::to(&query.to_href("/sellers"))
}

pub async fn register_seller(
    State(workspace): State<Arc<Mutex<SellerWorkspace>>>,
    Form(form): Form<RegistrationForm>,
) -> Redirect {
    let mut workspace = workspace.lock().await;
    match workspace.submit_registration(form) {
        Ok(()) => redirect_with(&[("notice", "Registration submitted")]),
        Err(e) => {
            tracing::warn!("Seller registration rejected: {}", e);
            let message = e.to_string();
            redirect_with(&[("error", message.as_str())])
        }
    }
}

// Checkbox fields only arrive when ticked
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSubmission {
    #[serde(default)]
    brand_slug: String,
    #[serde(default)]
    model_slug: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    trim: String,
    condition: Condition,
    #[serde(default)]
    mileage: String,
    #[serde(default)]
    price_sar: String,
    #[serde(default)]
    photo_count: String,
    inspection_ready: Option<String>,
    inspection_document: Option<String>,
}

impl ListingSubmission {
    fn into_form(self) -> Result<ListingForm, SellerError> {
        let mut form = ListingForm::default();
        form.apply(ListingFieldChange::Brand(self.brand_slug));
        form.apply(ListingFieldChange::Model(self.model_slug));
        form.apply(ListingFieldChange::Year(self.year));
        form.apply(ListingFieldChange::Trim(self.trim));
        form.apply(ListingFieldChange::Mileage(self.mileage));
        form.apply(ListingFieldChange::Condition(self.condition));
        form.apply(ListingFieldChange::PriceSar(self.price_sar));
        if let Some(count) = seller::parse_photo_count(&self.photo_count)? {
            form.apply(ListingFieldChange::PhotoCount(count));
        }
        form.apply(ListingFieldChange::InspectionReady(self.inspection_ready.is_some()));
        form.apply(ListingFieldChange::InspectionDocument(self.inspection_document.is_some()));
        Ok(form)
    }
}

pub async fn submit_listing(
    State(catalog): State<Arc<Catalog>>,
    State(workspace): State<Arc<Mutex<SellerWorkspace>>>,
    Form(submission): Form<ListingSubmission>,
) -> Redirect {
    let (brand_slug, model_slug) = (submission.brand_slug.clone(), submission.model_slug.clone());
    let mut workspace = workspace.lock().await;
    let submitted = match submission.into_form() {
        Ok(form) => workspace.submit_listing(form, catalog.vehicles(), chrono::Utc::now()),
        Err(e) => Err(e),
    };
    match submitted {
        Ok(draft) => {
            tracing::info!(listing = %draft.id, "Listing draft queued for moderation");
            redirect_with(&[("notice", "Listing submitted for review")])
        }
        Err(e) => {
            tracing::warn!("Listing submission rejected: {}", e);
            let message = e.to_string();
            redirect_with(&[
                ("error", message.as_str()),
                ("brandSlug", brand_slug.as_str()),
                ("modelSlug", model_slug.as_str()),
            ])
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    status: String,
}

pub async fn change_listing_status(
    State(workspace): State<Arc<Mutex<SellerWorkspace>>>,
    Path(id): Path<String>,
    Form(change): Form<StatusChange>,
) -> AppResult<Redirect> {
    let status = ListingStatus::parse(&change.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown listing status '{}'", change.status)))?;
    workspace.lock().await.change_status(&id, status, chrono::Utc::now())?;
    Ok(redirect_with(&[("notice", "Listing status updated")]))
}
