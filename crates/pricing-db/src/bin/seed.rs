//! # Demo Catalog Seeder
//!
//! Populates a database with a demo catalog and prints a sample quote.
//!
//! ## Usage
//! ```bash
//! # Seed ./pricing.db and quote 150 cards
//! cargo run -p pricing-db --bin seed
//!
//! # Custom database and quote inputs
//! cargo run -p pricing-db --bin seed -- --db ./data/pricing.db --cards 40 --users 12 --sso
//! ```
//!
//! ## Demo Catalog
//! - Setup: project kick-off, SSO integration (auto-added), on-site installation
//! - Licenses: card licenses and user seats, both tiered with auto quantity
//! - Support: standard and premium monthly support

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pricing_core::{
    AutoAddRule, Category, ClientConfig, ConfigField, ConfigValue, Discount, DiscountApplication,
    DiscountRate, FieldType, Money, PricingItem, PricingTier, Tag,
};
use pricing_db::{CatalogRepository, Database, QuoteService, SimulatorConfig};

/// Seed a demo pricing catalog and print a sample quote.
#[derive(Parser, Debug)]
#[command(name = "seed", version, about = "Pricing simulator demo seeder")]
struct Args {
    /// Database file (overrides simulator.toml and PRICING_DB_PATH)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Path to simulator.toml
    #[arg(short, long, env = "PRICING_CONFIG")]
    config: Option<PathBuf>,

    /// Client name on the sample quote
    #[arg(long, default_value = "Demo Client")]
    client: String,

    /// Number of access cards on the sample quote
    #[arg(long, default_value_t = 150)]
    cards: i64,

    /// Number of named users on the sample quote
    #[arg(long, default_value_t = 25)]
    users: i64,

    /// Client needs single sign-on
    #[arg(long)]
    sso: bool,

    /// Skip printing the sample quote
    #[arg(long)]
    no_quote: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = SimulatorConfig::load(args.config.clone())?;
    if let Some(db) = &args.db {
        config.database.path = db.clone();
    }

    println!("Pricing Simulator Seed");
    println!("======================");
    println!("Database: {}", config.database.path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    let catalog = db.catalog();

    let existing = catalog.count_services().await?;
    if existing > 0 {
        warn!(existing, "Catalog already seeded, skipping inserts");
        println!("Database already has {} services, skipping seed.", existing);
    } else {
        seed_catalog(&catalog).await?;
        println!("Seeded {} services.", catalog.count_services().await?);
    }

    if !args.no_quote {
        let quotes = QuoteService::new(catalog, db.scenarios(), config.classifier());
        print_sample_quote(&quotes, &args).await?;
    }

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pricing_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// Demo Catalog
// =============================================================================

async fn seed_catalog(catalog: &impl CatalogRepository) -> Result<(), Box<dyn std::error::Error>> {
    let categories = [
        ("setup", "Setup", 0),
        ("licenses", "Licenses", 1),
        ("support", "Support", 2),
    ];
    for (id, name, order) in categories {
        let mut category = Category::new(id, name);
        category.sort_order = order;
        catalog.save_category(&category).await?;
    }

    for (id, name, color) in [("hardware", "Hardware", "#8a5a00"), ("cloud", "Cloud", "#1f6feb")] {
        catalog
            .save_tag(&Tag {
                id: id.to_string(),
                name: name.to_string(),
                color: Some(color.to_string()),
            })
            .await?;
    }

    let fields = [
        number_field("cards", "Access cards", "cards", 0),
        number_field("users", "Named users", "users", 1),
        flag_field("needs_sso", "Single sign-on", 2),
        flag_field("onsite_installation", "On-site installation", 3),
    ];
    for field in &fields {
        catalog.save_config_field(field).await?;
    }

    let mut kickoff = PricingItem::new(
        "kickoff",
        "Project kick-off",
        "setup",
        "per_project",
        Money::from_cents(150_000),
    );
    kickoff.description = "Workshop and rollout plan".to_string();

    let sso = PricingItem::new(
        "sso_integration",
        "SSO integration",
        "setup",
        "onetime",
        Money::from_cents(80_000),
    )
    .with_auto_add(AutoAddRule::when_flag("needs_sso", true));

    let mut installation = PricingItem::new(
        "installation",
        "On-site installation",
        "setup",
        "per_installation",
        Money::from_cents(45_000),
    )
    .with_auto_add(AutoAddRule::when_flag("onsite_installation", true));
    installation.tags = vec!["hardware".to_string()];

    let mut cards = PricingItem::new(
        "card_licenses",
        "Card licenses",
        "licenses",
        "per_card",
        Money::from_cents(500),
    )
    .with_tiers(vec![
        PricingTier::new("cards_1", 1, Some(99), Money::from_cents(400)),
        PricingTier::new("cards_100", 100, Some(499), Money::from_cents(300)),
        PricingTier::new("cards_500", 500, None, Money::from_cents(200)),
    ])
    .with_quantity_sources(["cards"]);
    cards.tags = vec!["hardware".to_string()];

    let mut seats = PricingItem::new(
        "user_seats",
        "User seats",
        "licenses",
        "per_user",
        Money::from_cents(1_200),
    )
    .with_tiers(vec![
        PricingTier::new("seats_1", 1, Some(49), Money::from_cents(1_000)),
        PricingTier::new("seats_50", 50, None, Money::from_cents(800)),
    ])
    .with_quantity_sources(["users"]);
    seats.tags = vec!["cloud".to_string()];

    let support = PricingItem::new(
        "support_standard",
        "Standard support",
        "support",
        "per_month",
        Money::from_cents(5_000),
    );
    let premium = PricingItem::new(
        "support_premium",
        "Premium support",
        "support",
        "per_month",
        Money::from_cents(15_000),
    );

    for (order, mut service) in [kickoff, sso, installation, cards, seats, support, premium]
        .into_iter()
        .enumerate()
    {
        service.sort_order = order as i64;
        catalog.save_service(&service).await?;
    }

    info!("Demo catalog seeded");
    Ok(())
}

fn number_field(id: &str, name: &str, unit: &str, sort_order: i64) -> ConfigField {
    ConfigField {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        field_type: FieldType::Number,
        options: Vec::new(),
        default_value: Some(ConfigValue::Number(0.0)),
        unit: Some(unit.to_string()),
        sort_order,
        is_active: true,
    }
}

fn flag_field(id: &str, name: &str, sort_order: i64) -> ConfigField {
    ConfigField {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        field_type: FieldType::Boolean,
        options: Vec::new(),
        default_value: Some(ConfigValue::Bool(false)),
        unit: None,
        sort_order,
        is_active: true,
    }
}

// =============================================================================
// Sample Quote
// =============================================================================

async fn print_sample_quote<C, S>(
    quotes: &QuoteService<C, S>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: CatalogRepository,
    S: pricing_db::ScenarioRepository,
{
    let catalog = quotes.load_catalog().await?;
    let config = ClientConfig::new()
        .with("cards", args.cards)
        .with("users", args.users)
        .with("needs_sso", args.sso);

    let mut scenario = quotes
        .start_scenario(Some(args.client.clone()), config)
        .await?;

    for id in ["kickoff", "card_licenses", "user_seats", "support_standard"] {
        scenario.add_service(catalog.require_service(id)?, 1)?;
    }

    if let Some(kickoff_id) = scenario.find_service("kickoff").map(|s| s.id.clone()) {
        scenario.set_discount(
            &kickoff_id,
            Discount::Percentage(DiscountRate::from_percentage(10.0)),
            DiscountApplication::Total,
        )?;
    }

    let summary = quotes.summarize(&scenario).await?;

    println!();
    println!("Sample quote for {}", args.client);
    println!("{:-<64}", "");
    for (selected, line) in scenario.line_totals() {
        println!(
            "{:<28} {:>6} x {:>10} = {:>12}{}",
            selected.item.name,
            selected.quantity,
            selected.unit_price.to_string(),
            line.total.to_string(),
            if selected.auto_added { "  (auto)" } else { "" }
        );
    }
    println!("{:-<64}", "");
    println!("One-time total:      {:>12}", summary.one_time_total.to_string());
    println!("Monthly total:       {:>12}", summary.monthly_total.to_string());
    println!("Yearly total:        {:>12}", summary.yearly_total.to_string());
    println!("Total project cost:  {:>12}", summary.total_project_cost.to_string());
    println!("Discount savings:    {:>12}", summary.savings.discount_savings.to_string());

    let stored = quotes.submit(&scenario).await?;
    println!();
    println!("Stored as scenario {}", stored.id);

    Ok(())
}
