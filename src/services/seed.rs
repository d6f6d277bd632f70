use crate::models::Restaurant;
use crate::services::store::StorageError;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of the bundled Michelin CSV
#[derive(Debug, Deserialize)]
struct CsvRestaurant {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Address", default)]
    address: Option<String>,
    #[serde(rename = "Location", default)]
    location: Option<String>,
    #[serde(rename = "Price", default)]
    price: Option<String>,
    #[serde(rename = "Cuisine", default)]
    cuisine: Option<String>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<f64>,
    #[serde(rename = "Latitude", default)]
    latitude: Option<f64>,
    #[serde(rename = "PhoneNumber", default)]
    phone: Option<String>,
    #[serde(rename = "Url", default)]
    michelin_url: Option<String>,
    #[serde(rename = "WebsiteUrl", default)]
    website_url: Option<String>,
    #[serde(rename = "Award", default)]
    award: Option<String>,
    #[serde(rename = "GreenStar", default)]
    green_star: Option<u8>,
    #[serde(rename = "FacilitiesAndServices", default)]
    facilities: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
}

impl From<CsvRestaurant> for Restaurant {
    fn from(row: CsvRestaurant) -> Self {
        Restaurant {
            id: Restaurant::derive_id(&row.name, row.latitude, row.longitude),
            name: row.name,
            address: row.address.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            price: row.price.unwrap_or_default(),
            cuisine: row.cuisine.unwrap_or_default(),
            latitude: row.latitude,
            longitude: row.longitude,
            phone: row.phone,
            michelin_url: row.michelin_url,
            website_url: row.website_url,
            award: row.award,
            green_star: row.green_star.unwrap_or(0) == 1,
            facilities: row.facilities.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            owner: None,
            reviews: Vec::new(),
        }
    }
}

/// Parse restaurants from CSV with a header row
pub fn read_restaurants<R: Read>(reader: R) -> Result<Vec<Restaurant>, StorageError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut restaurants = Vec::new();
    for row in csv.deserialize::<CsvRestaurant>() {
        restaurants.push(row?.into());
    }
    Ok(restaurants)
}

/// Parse restaurants from a CSV file on disk
pub fn read_restaurants_file(path: &Path) -> Result<Vec<Restaurant>, StorageError> {
    let file = std::fs::File::open(path)?;
    let restaurants = read_restaurants(file)?;
    tracing::info!("Read {} restaurants from {}", restaurants.len(), path.display());
    Ok(restaurants)
}
