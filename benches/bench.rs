// Criterion benchmarks for TheKnife

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use theknife::core::{
    distance::{calculate_bounding_box, haversine_distance},
    matches_filters, BrowseQuery, Ranker,
};
use theknife::models::{Coordinate, FilterOptions, Restaurant, Review};

const MILAN: (f64, f64) = (45.4642, 9.1900);

fn create_restaurant(id: usize, lat: f64, lon: f64) -> Restaurant {
    let name = format!("Restaurant {}", id);
    let mut restaurant = Restaurant {
        id: Restaurant::derive_id(&name, Some(lat), Some(lon)),
        name,
        address: String::new(),
        location: if id % 4 == 0 { "Monza" } else { "Milano" }.to_string(),
        price: ["€", "€€", "€€€", "€€€€"][id % 4].to_string(),
        cuisine: if id % 3 == 0 { "Italian" } else { "Japanese" }.to_string(),
        latitude: Some(lat),
        longitude: Some(lon),
        phone: None,
        michelin_url: None,
        website_url: None,
        award: None,
        green_star: id % 10 == 0,
        facilities: if id % 2 == 0 { "Delivery,Online booking" } else { "Terrace" }.to_string(),
        description: String::new(),
        owner: None,
        reviews: vec![],
    };
    restaurant.reviews = (0..id % 5)
        .map(|r| Review::new(&format!("user{}", r), &restaurant.id, "ok".to_string(), (r % 5 + 1) as u8))
        .collect();
    restaurant
}

fn create_catalog(count: usize) -> Vec<Restaurant> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.8;
            let lon_offset = (i as f64 * 0.0013) % 0.8;
            create_restaurant(i, MILAN.0 - 0.4 + lat_offset, MILAN.1 - 0.4 + lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(MILAN.0),
                black_box(MILAN.1),
                black_box(45.47),
                black_box(9.2),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| calculate_bounding_box(black_box(MILAN.0), black_box(MILAN.1), black_box(50.0)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let ranker = Ranker::default();
    let query = BrowseQuery {
        filters: FilterOptions::default().with_location("Milano"),
        order: ranker.by_distance(Coordinate::new(MILAN.0, MILAN.1)),
        ..Default::default()
    };

    let mut group = c.benchmark_group("ranking");

    for count in [100, 1000, 5000].iter() {
        let catalog = create_catalog(*count);

        group.bench_with_input(BenchmarkId::new("by_distance", count), count, |b, _| {
            b.iter(|| ranker.rank(black_box(&query), black_box(catalog.clone())));
        });
    }

    group.finish();
}

fn bench_filtering_pipeline(c: &mut Criterion) {
    let catalog = create_catalog(1000);
    let filters = FilterOptions::default()
        .with_cuisine("Italian")
        .with_price("€€")
        .with_delivery()
        .with_stars(2);

    c.bench_function("filtering_pipeline_1000_restaurants", |b| {
        b.iter(|| {
            let matched = catalog
                .iter()
                .filter(|r| matches_filters(r, black_box(&filters)))
                .count();
            black_box(matched)
        });
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_ranking,
    bench_filtering_pipeline
);

criterion_main!(benches);
