// Listing predicate matcher: decides whether a listing survives the active filter state

use super::state::FilterState;
use crate::models::ListingSummary;

/// Lenient numeric bound parse.
///
/// Unparsable or non-finite input means "no constraint" for that bound, so a
/// half-typed value never empties the result list.
pub fn parse_bound(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

// Set filter + missing slug on the listing fails the filter
fn slug_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual.is_some_and(|a| !a.is_empty() && a == expected),
    }
}

fn within_bounds(actual: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(actual) = actual else {
        return false;
    };
    if min.is_some_and(|min| actual < min) {
        return false;
    }
    if max.is_some_and(|max| actual > max) {
        return false;
    }
    true
}

pub fn matches(listing: &ListingSummary, state: &FilterState) -> bool {
    if let Some(condition) = state.value("condition") {
        if listing.condition.as_str() != condition {
            return false;
        }
    }

    let categorical = [
        ("brand", listing.brand_slug.as_deref()),
        ("model", listing.model_slug.as_deref()),
        ("trim", listing.trim.as_deref()),
        ("city", listing.city_slug.as_deref()),
        ("accident_history", listing.accident_history.as_deref()),
        ("warranty_status", listing.warranty_status.as_deref()),
    ];
    if !categorical
        .iter()
        .all(|(key, actual)| slug_matches(state.value(key), *actual))
    {
        return false;
    }

    let year = listing.year.map(f64::from);
    if !within_bounds(
        year,
        parse_bound(state.value("year_min")),
        parse_bound(state.value("year_max")),
    ) {
        return false;
    }

    let mileage = listing.mileage_km.map(f64::from);
    if !within_bounds(
        mileage,
        parse_bound(state.value("mileage_min")),
        parse_bound(state.value("mileage_max")),
    ) {
        return false;
    }

    // Owners is an "at most N owners" filter; there is no lower bound
    let owners = listing.owners.map(f64::from);
    within_bounds(owners, None, parse_bound(state.value("owners")))
}

pub fn filter_listings<'a, I>(listings: I, state: &FilterState) -> Vec<&'a ListingSummary>
where
    I: IntoIterator<Item = &'a ListingSummary>,
{
    listings.into_iter().filter(|listing| matches(listing, state)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Condition;

    fn listing() -> ListingSummary {
        ListingSummary {
            id: "l-1".into(),
            title: "2021 Toyota Camry GLE".into(),
            price_sar: 98_000,
            city: "Riyadh".into(),
            city_slug: Some("riyadh".into()),
            condition: Condition::Used,
            mileage_km: Some(41_000),
            certified: true,
            image_url: None,
            category_slug: Some("vehicles".into()),
            subcategory_slug: None,
            brand_slug: Some("toyota".into()),
            brand_label: Some("Toyota".into()),
            model_slug: Some("camry".into()),
            model_label: Some("Camry".into()),
            year: Some(2021),
            trim: Some("gle".into()),
            trim_label: Some("GLE".into()),
            owners: Some(2),
            accident_history: Some("no-accidents".into()),
            warranty_status: None,
        }
    }

    fn state(pairs: &[(&str, &str)]) -> FilterState {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_state_matches_everything() {
        assert!(matches(&listing(), &FilterState::new()));
    }

    #[test]
    fn condition_is_exact() {
        assert!(matches(&listing(), &state(&[("condition", "used")])));
        assert!(!matches(&listing(), &state(&[("condition", "new")])));
    }

    #[test]
    fn categorical_filters_require_the_slug() {
        assert!(matches(&listing(), &state(&[("brand", "toyota"), ("model", "camry"), ("trim", "gle")])));
        assert!(!matches(&listing(), &state(&[("brand", "nissan")])));

        let mut no_city = listing();
        no_city.city_slug = None;
        assert!(!matches(&no_city, &state(&[("city", "riyadh")])));

        let mut empty_brand = listing();
        empty_brand.brand_slug = Some(String::new());
        assert!(!matches(&empty_brand, &state(&[("brand", "toyota")])));
    }

    #[test]
    fn history_tags_must_be_present_and_equal() {
        assert!(matches(&listing(), &state(&[("accident_history", "no-accidents")])));
        assert!(!matches(&listing(), &state(&[("accident_history", "minor")])));
        assert!(!matches(&listing(), &state(&[("warranty_status", "manufacturer")])));
    }

    #[test]
    fn year_bounds_are_inclusive() {
        assert!(matches(&listing(), &state(&[("year_max", "2021")])));
        assert!(matches(&listing(), &state(&[("year_min", "2021")])));

        let mut newer = listing();
        newer.year = Some(2022);
        assert!(!matches(&newer, &state(&[("year_max", "2021")])));

        let mut undated = listing();
        undated.year = None;
        assert!(!matches(&undated, &state(&[("year_min", "2000")])));
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let mut undated = listing();
        undated.year = None;
        let malformed = state(&[("year_min", "not-a-number"), ("mileage_max", "inf")]);
        assert!(matches(&listing(), &malformed));
        assert!(matches(&undated, &malformed));
    }

    #[test]
    fn mileage_range_and_owner_cap() {
        assert!(matches(&listing(), &state(&[("mileage_min", "40000"), ("mileage_max", "41000")])));
        assert!(!matches(&listing(), &state(&[("mileage_max", "40999.5")])));
        assert!(matches(&listing(), &state(&[("owners", "2")])));
        assert!(!matches(&listing(), &state(&[("owners", "1")])));

        let mut unknown_owners = listing();
        unknown_owners.owners = None;
        assert!(!matches(&unknown_owners, &state(&[("owners", "3")])));
    }

    #[test]
    fn filter_listings_keeps_matching_cards() {
        let mut nissan = listing();
        nissan.id = "l-2".into();
        nissan.brand_slug = Some("nissan".into());
        let all = vec![listing(), nissan];

        let found = filter_listings(&all, &state(&[("brand", "nissan")]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "l-2");
    }

    #[test]
    fn parse_bound_trims_whitespace() {
        assert_eq!(parse_bound(Some(" 2019 ")), Some(2019.0));
        assert_eq!(parse_bound(Some("NaN")), None);
        assert_eq!(parse_bound(None), None);
    }
}
