use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;
use theknife::config::Settings;
use theknife::core::{parse_price, parse_stars, FilterParseError};
use theknife::{
    Catalog, CatalogError, FilterOptions, NewRestaurant, RankedRestaurant, RegisterUser, Restaurant,
    ReviewDraft, Role, Session, SortOrder, StorageError,
};
use thiserror::Error;

#[derive(Parser)]
#[command(name = "theknife")]
#[command(about = "Browse and review Michelin-listed restaurants", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Configuration file (defaults to config/default.toml)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Credentials for commands that act on behalf of a user
#[derive(Args)]
pub struct Credentials {
    #[arg(short, long, env = "THEKNIFE_USER", help = "Username")]
    pub user: String,

    #[arg(short, long, env = "THEKNIFE_PASSWORD", hide_env_values = true, help = "Password")]
    pub password: String,
}

/// Optional credentials; browsing works for guests too
#[derive(Args)]
pub struct MaybeCredentials {
    #[arg(short, long, env = "THEKNIFE_USER", help = "Username")]
    pub user: Option<String>,

    #[arg(short, long, env = "THEKNIFE_PASSWORD", hide_env_values = true, help = "Password")]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(short, long, help = "City to browse (defaults to the user's city)")]
    pub location: Option<String>,

    #[arg(long, help = "Cuisine type")]
    pub cuisine: Option<String>,

    #[arg(long, help = "Price range, e.g. €€ or $$$")]
    pub price: Option<String>,

    #[arg(long, help = "Average review stars, 1 to 5")]
    pub stars: Option<String>,

    #[arg(long, help = "Only restaurants offering delivery")]
    pub delivery: bool,

    #[arg(long, help = "Only restaurants with online booking")]
    pub booking: bool,

    #[arg(long, help = "Order by distance from the location instead of by name")]
    pub nearest: bool,
}

#[derive(Args)]
pub struct RestaurantArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long)]
    pub location: String,
    #[arg(long, default_value = "")]
    pub price: String,
    #[arg(long, default_value = "")]
    pub cuisine: String,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub award: Option<String>,
    #[arg(long, help = "1 if the restaurant holds a green star")]
    pub green_star: Option<u8>,
    #[arg(long, default_value = "")]
    pub facilities: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Import restaurants from a Michelin CSV file")]
    Seed {
        #[arg(help = "CSV file (defaults to the configured seed file)")]
        csv: Option<PathBuf>,
    },

    #[command(about = "List the cities with at least one restaurant")]
    Locations,

    #[command(about = "Browse restaurants with optional filters")]
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        auth: MaybeCredentials,
    },

    #[command(about = "Search restaurants by name, city or cuisine")]
    Search {
        query: String,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        auth: MaybeCredentials,
    },

    #[command(about = "Create an account")]
    Register {
        #[arg(short, long)]
        user: String,
        #[arg(short, long, env = "THEKNIFE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, help = "Birth date as YYYY-MM-DD")]
        birth_date: String,
        #[arg(long)]
        city: String,
        #[arg(long, help = "Register as a restaurant owner")]
        owner: bool,
    },

    #[command(about = "Show a restaurant with its reviews")]
    Show { id: String },

    #[command(about = "Review a restaurant")]
    Review {
        restaurant: String,
        #[arg(short, long)]
        stars: u8,
        #[arg(short, long)]
        text: String,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Change one of your reviews")]
    EditReview {
        review: String,
        #[arg(short, long)]
        stars: u8,
        #[arg(short, long)]
        text: String,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Delete one of your reviews")]
    DeleteReview {
        review: String,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Answer a review of one of your restaurants")]
    Answer {
        review: String,
        #[arg(short, long)]
        text: String,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Add or remove a restaurant from your favourites")]
    Favorite {
        restaurant: String,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "List your favourite restaurants")]
    Favorites {
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "List the restaurants you reviewed")]
    Reviewed {
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Add a restaurant you own")]
    AddRestaurant {
        #[command(flatten)]
        restaurant: RestaurantArgs,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Replace the details of a restaurant you own")]
    EditRestaurant {
        id: String,
        #[command(flatten)]
        restaurant: RestaurantArgs,
        #[command(flatten)]
        auth: Credentials,
    },

    #[command(about = "Delete a restaurant you own together with its reviews")]
    DeleteRestaurant {
        id: String,
        #[command(flatten)]
        auth: Credentials,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Filter(#[from] FilterParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid birth date: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("No seed CSV configured")]
    NoSeed,
}

impl From<RestaurantArgs> for NewRestaurant {
    fn from(args: RestaurantArgs) -> Self {
        NewRestaurant {
            name: args.name,
            address: args.address,
            location: args.location,
            price: args.price,
            cuisine: args.cuisine,
            latitude: args.latitude,
            longitude: args.longitude,
            phone: args.phone,
            website_url: args.website,
            award: args.award,
            green_star: args.green_star,
            facilities: args.facilities,
            description: args.description,
        }
    }
}

impl FilterArgs {
    fn to_options(&self) -> Result<FilterOptions, FilterParseError> {
        Ok(FilterOptions {
            cuisine: self.cuisine.clone(),
            location: self.location.clone(),
            price: match &self.price {
                Some(price) => parse_price(price)?,
                None => None,
            },
            stars: match &self.stars {
                Some(stars) => parse_stars(stars)?,
                None => None,
            },
            delivery_available: self.delivery,
            online_booking_available: self.booking,
        })
    }
}

fn login(catalog: &Catalog, auth: &Credentials) -> Result<Session, CatalogError> {
    catalog.login(&auth.user, &auth.password)
}

fn maybe_login(catalog: &Catalog, auth: &MaybeCredentials) -> Result<Session, CatalogError> {
    match (&auth.user, &auth.password) {
        (Some(user), Some(password)) => catalog.login(user, password),
        (Some(_), None) => Err(CatalogError::Auth),
        _ => Ok(Session::guest()),
    }
}

/// Execute a parsed command against the catalog
pub fn run(command: Commands, settings: &Settings) -> Result<(), CliError> {
    let catalog = Catalog::from_settings(settings);

    match command {
        Commands::Seed { csv } => {
            let csv = csv
                .or_else(|| settings.storage.seed_csv_path())
                .ok_or(CliError::NoSeed)?;
            let added = catalog.restaurants().import_csv(&csv)?;
            println!("✅ Imported {} restaurants from {}", added, csv.display());
        }
        Commands::Locations => {
            for location in catalog.locations() {
                println!("{}", location);
            }
        }
        Commands::Browse { filters, auth } => {
            browse(&catalog, &filters, &auth, None)?;
        }
        Commands::Search { query, filters, auth } => {
            browse(&catalog, &filters, &auth, Some(&query))?;
        }
        Commands::Register {
            user,
            password,
            first_name,
            last_name,
            birth_date,
            city,
            owner,
        } => {
            let request = RegisterUser {
                username: user,
                first_name,
                last_name,
                password,
                birth_date: NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d")?,
                city,
                role: if owner { Role::RestaurantOwner } else { Role::Customer },
            };
            let session = catalog.register(request)?;
            if let Some(user) = session.viewer.user() {
                println!("✅ Registered {} as {}", user.username, user.role);
            }
        }
        Commands::Show { id } => {
            let restaurant = catalog.restaurant(&id)?;
            print_restaurant(&restaurant);
        }
        Commands::Review {
            restaurant,
            stars,
            text,
            auth,
        } => {
            let mut session = login(&catalog, &auth)?;
            let review = catalog.add_review(&mut session, &restaurant, ReviewDraft { content: text, stars })?;
            println!("✅ Review saved ({})", review.id);
        }
        Commands::EditReview {
            review,
            stars,
            text,
            auth,
        } => {
            let session = login(&catalog, &auth)?;
            catalog.edit_review(&session, &review, ReviewDraft { content: text, stars })?;
            println!("✅ Review updated");
        }
        Commands::DeleteReview { review, auth } => {
            let mut session = login(&catalog, &auth)?;
            catalog.delete_review(&mut session, &review)?;
            println!("✅ Review deleted");
        }
        Commands::Answer { review, text, auth } => {
            let session = login(&catalog, &auth)?;
            catalog.answer_review(&session, &review, &text)?;
            println!("✅ Answer saved");
        }
        Commands::Favorite { restaurant, auth } => {
            let mut session = login(&catalog, &auth)?;
            if catalog.toggle_favorite(&mut session, &restaurant)? {
                println!("⭐ Added to favourites");
            } else {
                println!("Removed from favourites");
            }
        }
        Commands::Favorites { auth } => {
            let session = login(&catalog, &auth)?;
            print_list(&catalog.favorites(&session)?, "📭 No favourites yet.");
        }
        Commands::Reviewed { auth } => {
            let session = login(&catalog, &auth)?;
            print_list(&catalog.reviewed(&session)?, "📭 No reviews yet.");
        }
        Commands::AddRestaurant { restaurant, auth } => {
            let mut session = login(&catalog, &auth)?;
            let restaurant = catalog.add_restaurant(&mut session, restaurant.into())?;
            println!("✅ Added {} ({})", restaurant.name, restaurant.id);
        }
        Commands::EditRestaurant {
            id,
            restaurant,
            auth,
        } => {
            let session = login(&catalog, &auth)?;
            let restaurant = catalog.edit_restaurant(&session, &id, restaurant.into())?;
            println!("✅ Updated {}", restaurant.name);
        }
        Commands::DeleteRestaurant { id, auth } => {
            let mut session = login(&catalog, &auth)?;
            catalog.delete_restaurant(&mut session, &id)?;
            println!("✅ Deleted {}", id);
        }
    }

    Ok(())
}

fn browse(
    catalog: &Catalog,
    filters: &FilterArgs,
    auth: &MaybeCredentials,
    query: Option<&str>,
) -> Result<(), CliError> {
    let mut session = maybe_login(catalog, auth)?.with_filters(filters.to_options()?);
    if let Some(location) = &filters.location {
        session = session.with_location(location.clone());
    }

    let order = if filters.nearest {
        match catalog.distance_order(&session) {
            Some(order) => order,
            None => {
                tracing::warn!("No coordinates known for {:?}, ordering by name", session.location);
                SortOrder::Name
            }
        }
    } else {
        SortOrder::Name
    };

    let result = catalog.browse(&session, order, query);
    if result.restaurants.is_empty() {
        println!("📭 No restaurants found.");
        return Ok(());
    }

    println!(
        "\n🍽  Restaurants ({} of {})\n",
        result.restaurants.len(),
        result.total_candidates
    );
    print_ranked(&result.restaurants);
    Ok(())
}

fn print_ranked(restaurants: &[RankedRestaurant]) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("City"),
        Cell::new("Cuisine"),
        Cell::new("Price"),
        Cell::new("Stars"),
        Cell::new("Km"),
    ]));

    for ranked in restaurants {
        let r = &ranked.restaurant;
        table.add_row(Row::new(vec![
            Cell::new(&r.id),
            Cell::new(&r.name),
            Cell::new(&r.location),
            Cell::new(&r.cuisine),
            Cell::new(&r.price),
            Cell::new(&format_stars(ranked.average_stars, ranked.review_count)),
            Cell::new(&format_km(ranked.distance_km)),
        ]));
    }

    table.printstd();
    println!();
}

fn print_list(restaurants: &[Restaurant], empty: &str) {
    if restaurants.is_empty() {
        println!("{}", empty);
        return;
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("City"),
        Cell::new("Stars"),
    ]));
    for r in restaurants {
        table.add_row(Row::new(vec![
            Cell::new(&r.id),
            Cell::new(&r.name),
            Cell::new(&r.location),
            Cell::new(&format_stars(r.average_stars(), r.reviews.len())),
        ]));
    }
    table.printstd();
    println!();
}

fn print_restaurant(r: &Restaurant) {
    println!("\n{}", r.name);
    println!("   {}, {}", r.address, r.location);
    println!("   {} · {}", r.cuisine, r.price);
    if let Some(award) = &r.award {
        println!("   Award: {}{}", award, if r.green_star { " 🌿" } else { "" });
    }
    if let Some(phone) = &r.phone {
        println!("   Phone: {}", phone);
    }
    if let Some(website) = &r.website_url {
        println!("   Web: {}", website);
    }
    if !r.facilities.is_empty() {
        println!("   Services: {}", r.facilities);
    }
    if !r.description.is_empty() {
        println!("\n{}", r.description);
    }

    println!("\nReviews: {}", format_stars(r.average_stars(), r.reviews.len()));
    if r.reviews.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("User"),
        Cell::new("Stars"),
        Cell::new("Review"),
        Cell::new("Answer"),
    ]));
    for review in &r.reviews {
        table.add_row(Row::new(vec![
            Cell::new(&review.id),
            Cell::new(&review.author),
            Cell::new(&"★".repeat(review.stars as usize)),
            Cell::new(&review.content),
            Cell::new(review.answer.as_deref().unwrap_or("-")),
        ]));
    }
    table.printstd();
    println!();
}

/// Distances are already whole kilometres
fn format_km(distance: Option<f64>) -> String {
    distance.map_or_else(|| "-".to_string(), |d| format!("{:.0}", d))
}

fn format_stars(average: Option<f64>, count: usize) -> String {
    match average {
        Some(avg) => format!("{:.1} ({})", avg, count),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_args_parse_symbols() {
        let cli = Cli::parse_from(["theknife", "browse", "--price", "€€", "--stars", "3★", "--delivery"]);
        match cli.command {
            Commands::Browse { filters, .. } => {
                let options = filters.to_options().unwrap();
                assert_eq!(options.price.as_deref(), Some("€€"));
                assert_eq!(options.stars, Some(3));
                assert!(options.delivery_available);
            }
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn test_any_price_is_unset() {
        let cli = Cli::parse_from(["theknife", "browse", "--price", "Qualsiasi"]);
        match cli.command {
            Commands::Browse { filters, .. } => {
                assert_eq!(filters.to_options().unwrap().price, None);
            }
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn test_distance_shown_in_whole_km() {
        assert_eq!(format_km(Some(21.0)), "21");
        assert_eq!(format_km(None), "-");
    }
}
