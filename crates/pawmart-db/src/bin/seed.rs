//! # Seed Data Generator
//!
//! Populates the database with demo accounts and listings for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./pawmart.db (default)
//! cargo run -p pawmart-db --bin seed
//!
//! # Specify database path
//! cargo run -p pawmart-db --bin seed -- --db ./data/pawmart.db
//! ```
//!
//! ## Generated Data
//! ```text
//! admin@pawmart.dev    admin
//! seller@pawmart.dev   seller  ── shop "Happy Tails Supplies" + products
//! ngo@pawmart.dev      ngo     ── pets for adoption + one rescue
//! buyer@pawmart.dev    buyer
//! ```
//!
//! Every account uses the password `password123`.

use std::env;

use pawmart_core::types::{
    Gender, Health, Location, NewPet, NewProduct, NewRescue, NewShop, PetSize, ProductCategory,
    RescuedAnimal, Role, Species, User,
};
use pawmart_core::Money;
use pawmart_db::password::hash_password;
use pawmart_db::{Database, DbConfig};

const DEMO_PASSWORD: &str = "password123";

/// (name, species, breed, age, gender, size, fee in cents)
const PETS: &[(&str, Species, &str, u32, Gender, PetSize, i64)] = &[
    ("Biscuit", Species::Dog, "Golden Retriever", 2, Gender::Male, PetSize::Large, 15000),
    ("Luna", Species::Cat, "Tabby", 1, Gender::Female, PetSize::Small, 7500),
    ("Pepper", Species::Dog, "Beagle Mix", 4, Gender::Female, PetSize::Medium, 10000),
    ("Kiwi", Species::Bird, "Budgerigar", 1, Gender::Unknown, PetSize::Small, 2500),
    ("Thumper", Species::Rabbit, "Holland Lop", 3, Gender::Male, PetSize::Small, 4000),
    ("Shadow", Species::Cat, "Domestic Shorthair", 6, Gender::Male, PetSize::Medium, 0),
];

/// (name, category, price in cents, stock, pet types)
const PRODUCTS: &[(&str, ProductCategory, i64, i64, &[Species])] = &[
    ("Salmon Kibble 5kg", ProductCategory::Food, 3499, 40, &[Species::Dog]),
    ("Indoor Cat Food 2kg", ProductCategory::Food, 1899, 25, &[Species::Cat]),
    ("Rope Tug Toy", ProductCategory::Toys, 799, 60, &[Species::Dog]),
    ("Feather Wand", ProductCategory::Toys, 599, 35, &[Species::Cat]),
    ("Adjustable Harness", ProductCategory::Accessories, 2499, 15, &[Species::Dog]),
    ("Flea & Tick Drops", ProductCategory::Health, 2999, 20, &[Species::Dog, Species::Cat]),
    ("Slicker Brush", ProductCategory::Grooming, 1299, 30, &[Species::Dog, Species::Cat]),
    ("Hutch Bedding", ProductCategory::Housing, 999, 0, &[Species::Rabbit]),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawmart_db=warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./pawmart.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PawMart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pawmart.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PawMart Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.users().find_by_email("admin@pawmart.dev").await?.is_some() {
        println!("⚠ Demo accounts already exist");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Accounts
    let password_hash = hash_password(DEMO_PASSWORD)?;
    let account = |name: &str, email: &str, role: Role| {
        User::new(name, email, password_hash.clone(), role)
    };

    let admin = account("PawMart Admin", "admin@pawmart.dev", Role::Admin);
    let seller = account("Sam Seller", "seller@pawmart.dev", Role::Seller);
    let mut ngo = account("Second Chance Rescue", "ngo@pawmart.dev", Role::Ngo);
    ngo.organization = Some("Second Chance Animal Rescue".to_string());
    let buyer = account("Bea Buyer", "buyer@pawmart.dev", Role::Buyer);

    for user in [&admin, &seller, &ngo, &buyer] {
        db.users().create(user).await?;
    }
    println!("✓ Created 4 accounts (password: {})", DEMO_PASSWORD);

    // Shop and products
    let shop = NewShop {
        name: "Happy Tails Supplies".to_string(),
        description: "Food, toys and care for every companion".to_string(),
        address: None,
        phone: None,
        email: Some("shop@pawmart.dev".to_string()),
        logo: None,
        categories: vec!["food".to_string(), "toys".to_string()],
    }
    .into_shop(&seller.id);
    db.shops().create(&shop).await?;

    for (name, category, price, stock, pet_types) in PRODUCTS {
        let product = NewProduct {
            name: name.to_string(),
            description: String::new(),
            category: *category,
            price: Money::from_cents(*price),
            stock: *stock,
            images: vec![],
            pet_types: pet_types.to_vec(),
            brand: None,
            sku: None,
        }
        .into_product(&shop.id);
        db.products().create(&product).await?;
    }
    println!("✓ Created shop with {} products", PRODUCTS.len());

    // Pets
    let shelter = Location {
        city: Some("Portland".to_string()),
        state: Some("OR".to_string()),
        country: Some("USA".to_string()),
        ..Default::default()
    };
    for (name, species, breed, age, gender, size, fee) in PETS {
        let pet = NewPet {
            name: name.to_string(),
            species: *species,
            breed: breed.to_string(),
            age: *age,
            gender: *gender,
            size: *size,
            color: None,
            description: format!("{} is looking for a loving home.", name),
            images: vec![],
            health: Health {
                vaccinated: true,
                neutered: *age > 1,
                medical_notes: None,
            },
            adoption_fee: Money::from_cents(*fee),
            location: Some(shelter.clone()),
        }
        .into_pet(&ngo.id);
        db.pets().create(&pet).await?;
    }
    println!("✓ Created {} pets", PETS.len());

    // Rescue
    let rescue = NewRescue {
        title: "Riverside Colony Rescue".to_string(),
        description: "Trap, treat and rehome a colony of strays by the river.".to_string(),
        ngo: None,
        location: shelter,
        animals: vec![RescuedAnimal {
            species: "cat".to_string(),
            count: 12,
            condition: Some("Malnourished".to_string()),
            notes: None,
        }],
        resources: Default::default(),
        funding_required: Money::from_cents(250_000),
        planned_date: None,
    }
    .into_rescue(&ngo.id);
    db.rescues().create(&rescue).await?;
    println!("✓ Created 1 rescue");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
