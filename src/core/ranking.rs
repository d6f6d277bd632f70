use crate::core::{
    distance::{calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box},
    filters::{matches_filters, matches_search},
};
use crate::models::{Coordinate, FilterOptions, RankedRestaurant, Restaurant, SortOrder};
use std::cmp::Ordering;

/// Radius used for distance ordering when nothing else is configured
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// What to browse and how to order it
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    pub filters: FilterOptions,
    pub search: Option<String>,
    pub order: SortOrder,
    /// Restrict to restaurants owned by this username
    pub owned_by: Option<String>,
    pub limit: Option<usize>,
}

/// Result of a browse
#[derive(Debug)]
pub struct BrowseResult {
    pub restaurants: Vec<RankedRestaurant>,
    pub total_candidates: usize,
}

/// Filter-and-rank pipeline over the restaurant catalog
///
/// # Pipeline Stages
/// 1. Ownership scope
/// 2. Filter predicate and free-text search
/// 3. Bounding box pre-filter and distance radius (distance order only)
/// 4. Ordering and limit
#[derive(Debug, Clone)]
pub struct Ranker {
    max_distance_km: f64,
}

impl Ranker {
    pub fn new(max_distance_km: f64) -> Self {
        Self { max_distance_km }
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km
    }

    /// Distance ordering from `reference` using the configured radius
    pub fn by_distance(&self, reference: Coordinate) -> SortOrder {
        SortOrder::Distance {
            reference,
            max_km: self.max_distance_km,
        }
    }

    /// Filter, order and limit `candidates` according to `query`
    pub fn rank(&self, query: &BrowseQuery, candidates: Vec<Restaurant>) -> BrowseResult {
        let total_candidates = candidates.len();

        let bounding_box = match query.order {
            SortOrder::Distance { reference, max_km } => Some(calculate_bounding_box(
                reference.latitude,
                reference.longitude,
                max_km,
            )),
            SortOrder::Name => None,
        };

        let mut ranked: Vec<RankedRestaurant> = candidates
            .into_iter()
            // Stage 1: owners only see their own restaurants
            .filter(|r| match &query.owned_by {
                Some(owner) => r.is_owned_by(owner),
                None => true,
            })
            // Stage 2: filter predicate and search
            .filter(|r| matches_filters(r, &query.filters))
            .filter(|r| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |q| matches_search(r, q))
            })
            // Stage 3: distance
            .filter_map(|restaurant| {
                let distance_km = match (query.order, &bounding_box) {
                    (SortOrder::Distance { reference, max_km }, Some(bbox)) => {
                        let coordinate = restaurant.coordinate()?;
                        if !is_within_bounding_box(coordinate.latitude, coordinate.longitude, bbox) {
                            return None;
                        }
                        // Radius on the exact distance; the rounded km is for display and order
                        let exact = haversine_distance(
                            reference.latitude,
                            reference.longitude,
                            coordinate.latitude,
                            coordinate.longitude,
                        );
                        if exact > max_km {
                            return None;
                        }
                        Some(distance_km(Some(reference), Some(coordinate)))
                    }
                    _ => None,
                };

                let average_stars = restaurant.average_stars();
                let review_count = restaurant.reviews.len();

                Some(RankedRestaurant {
                    restaurant,
                    distance_km,
                    average_stars,
                    review_count,
                })
            })
            .collect();

        // Stage 4: ordering
        match query.order {
            SortOrder::Name => ranked.sort_by(compare_names),
            SortOrder::Distance { .. } => ranked.sort_by(|a, b| {
                a.distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| compare_names(a, b))
            }),
        }

        if let Some(limit) = query.limit {
            ranked.truncate(limit);
        }

        tracing::debug!(
            "Ranked {} of {} restaurants ({:?})",
            ranked.len(),
            total_candidates,
            query.order
        );

        BrowseResult {
            restaurants: ranked,
            total_candidates,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM)
    }
}

fn compare_names(a: &RankedRestaurant, b: &RankedRestaurant) -> Ordering {
    a.restaurant
        .name
        .to_lowercase()
        .cmp(&b.restaurant.name.to_lowercase())
        .then_with(|| a.restaurant.id.cmp(&b.restaurant.id))
}
