// Display helpers shared by the page templates and the JSON API

use crate::models::ListingDetail;

pub use crate::filters::state::humanize_key;

/// `305000` -> `305,000`
pub fn format_sar(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_accident_history(value: Option<&str>) -> String {
    match value {
        None | Some("") => "Unknown".to_string(),
        Some("no-accidents") => "No accidents reported".to_string(),
        Some("minor") => "Minor incidents disclosed".to_string(),
        Some("major") => "Major incidents disclosed".to_string(),
        Some(other) => other.replace('-', " "),
    }
}

pub fn format_warranty(value: Option<&str>) -> String {
    match value {
        None | Some("") => "Not specified".to_string(),
        Some("manufacturer") => "Manufacturer warranty".to_string(),
        Some("extended") => "Extended warranty".to_string(),
        Some("none") => "No warranty".to_string(),
        Some(other) => other.replace('-', " "),
    }
}

// Cars have a dedicated taxonomy landing page; children focus their parent
pub fn category_href(slug: &str, parent: Option<&str>) -> String {
    if slug == "cars" {
        return "/categories/cars".to_string();
    }
    match parent {
        Some(parent) => format!("/categories/{}?focus={}", parent, slug),
        None => format!("/categories/{}", slug),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub href: Option<String>,
}

impl Breadcrumb {
    fn link(label: &str, href: String) -> Self {
        Breadcrumb { label: label.to_string(), href: Some(href) }
    }
}

pub fn listing_breadcrumbs(listing: &ListingDetail, category_label: Option<&str>) -> Vec<Breadcrumb> {
    let summary = &listing.summary;
    let mut items = vec![Breadcrumb::link("Home", "/".to_string())];

    if let Some(category) = summary.category_slug.as_deref() {
        items.push(Breadcrumb::link(
            category_label.unwrap_or("Marketplace"),
            format!("/categories/{}", category),
        ));
    }

    if let Some(brand) = summary.brand_slug.as_deref() {
        if let Some(brand_label) = summary.brand_label.as_deref() {
            items.push(Breadcrumb::link(brand_label, format!("/categories/cars/{}", brand)));
        }
        if let (Some(model), Some(model_label)) = (summary.model_slug.as_deref(), summary.model_label.as_deref()) {
            items.push(Breadcrumb::link(model_label, format!("/categories/cars/{}/{}", brand, model)));
        }
    }

    items.push(Breadcrumb { label: summary.title.clone(), href: None });
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sar_grouping() {
        assert_eq!(format_sar(0), "0");
        assert_eq!(format_sar(999), "999");
        assert_eq!(format_sar(1000), "1,000");
        assert_eq!(format_sar(305000), "305,000");
        assert_eq!(format_sar(1234567), "1,234,567");
    }

    #[test]
    fn history_and_warranty_labels() {
        assert_eq!(format_accident_history(None), "Unknown");
        assert_eq!(format_accident_history(Some("no-accidents")), "No accidents reported");
        assert_eq!(format_accident_history(Some("flood-damage")), "flood damage");
        assert_eq!(format_warranty(Some("extended")), "Extended warranty");
        assert_eq!(format_warranty(None), "Not specified");
    }

    #[test]
    fn category_links() {
        assert_eq!(category_href("cars", None), "/categories/cars");
        assert_eq!(category_href("suv", Some("vehicles")), "/categories/vehicles?focus=suv");
        assert_eq!(category_href("real-estate", None), "/categories/real-estate");
    }

    #[test]
    fn breadcrumbs_walk_category_brand_model() {
        let catalog = crate::catalog::fixtures::catalog();
        let listing = catalog.find_listing("a").unwrap();
        let crumbs = listing_breadcrumbs(listing, Some("Vehicles"));
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Home", "Vehicles", "Toyota", "Camry", "toyota listing a"]);
        assert_eq!(crumbs[3].href.as_deref(), Some("/categories/cars/toyota/camry"));
        assert!(crumbs[4].href.is_none());
    }
}
