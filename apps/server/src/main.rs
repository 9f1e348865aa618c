use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use smileboard_api::build_router;
use smileboard_auth::{AuthError, Registration};
use smileboard_config::load as load_config;
use smileboard_database::{
    CampaignChannel, CampaignRepository, ConnectionRepository, ContactOrigin, ContactRepository,
    CreateCampaignRequest, CreateContactRequest, Plan, ReviewRepository, UserRepository,
};
use smileboard_runtime::{shutdown_signal, telemetry, BackendServices};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "smileboard-backend")]
#[command(about = "Smileboard clinic reputation backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Create a demo clinic with contacts and a campaign
    SeedData {
        #[arg(long, default_value = "demo@smileboard.test")]
        email: String,
        #[arg(long, default_value = "smileboard-demo")]
        password: String,
    },
    /// Print users, connections and campaigns
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::SeedData { email, password } => seed_data(&email, &password).await,
        Commands::DumpData => dump_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Smileboard backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let app = build_router(services.app_state(&config));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data(email: &str, password: &str) -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let registration = Registration {
        email,
        password,
        display_name: Some("Dr. Demo"),
        clinic_name: Some("Demo Dental"),
    };

    let user = match services
        .authenticator
        .register_with_password(registration)
        .await
    {
        Ok(user) => user,
        Err(AuthError::UserExists) => {
            warn!(%email, "demo clinic already exists; nothing seeded");
            return Ok(());
        }
        Err(error) => return Err(error).context("failed to create demo clinic"),
    };

    let users = UserRepository::new(services.db_pool.clone());
    users
        .set_plan(user.id, Plan::Pro, None)
        .await
        .context("failed to upgrade demo clinic")?;
    users
        .complete_onboarding(user.id)
        .await
        .context("failed to complete demo onboarding")?;

    let contacts = ContactRepository::new(services.db_pool.clone());
    for (name, phone, tags) in [
        ("Ana Lima", "+351910000001", vec!["implant", "vip"]),
        ("Bruno Costa", "+351910000002", vec!["cleaning"]),
        ("Carla Dias", "+351910000003", vec!["ortho"]),
    ] {
        contacts
            .create(
                user.id,
                &CreateContactRequest {
                    name: name.to_string(),
                    email: None,
                    phone: Some(phone.to_string()),
                    origin: ContactOrigin::Manual,
                    tags: tags.into_iter().map(str::to_string).collect(),
                    notes: None,
                },
            )
            .await
            .with_context(|| format!("failed to insert contact {name}"))?;
    }

    let campaign = CampaignRepository::new(services.db_pool.clone())
        .create(
            user.id,
            &CreateCampaignRequest {
                name: "After your visit".to_string(),
                channel: CampaignChannel::Whatsapp,
                message_template: "Hi {{name}}, thanks for visiting {{clinic}}! How did we do? {{link}}"
                    .to_string(),
                min_redirect_rating: 4,
                redirect_url: Some("https://g.page/r/demo-dental/review".to_string()),
                is_active: true,
            },
        )
        .await
        .context("failed to insert demo campaign")?;

    println!("Database seeded with demo data:");
    println!("- clinic owner {email} (plan: pro)");
    println!("- 3 contacts");
    println!("- campaign {} ({})", campaign.name, campaign.public_id);
    println!("Run 'dump-data' to see the inserted data");

    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    info!("dumping clinic data from database");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let users = sqlx::query(
        r#"
        SELECT id, public_id, email, clinic_name, plan, plan_expires_at, created_at
        FROM users
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
        return Ok(());
    }

    println!(
        "{:<5} {:<26} {:<30} {:<24} {:<8} {:<26}",
        "ID", "Public ID", "Email", "Clinic", "Plan", "Plan Expires"
    );
    println!("{}", "-".repeat(124));

    let mut user_ids = Vec::with_capacity(users.len());
    for row in &users {
        let id: i64 = row.get("id");
        let public_id: String = row.get("public_id");
        let email: Option<String> = row.get("email");
        let clinic_name: Option<String> = row.get("clinic_name");
        let plan: String = row.get("plan");
        let plan_expires_at: Option<String> = row.get("plan_expires_at");

        println!(
            "{:<5} {:<26} {:<30} {:<24} {:<8} {:<26}",
            id,
            public_id,
            email.as_deref().unwrap_or("NULL"),
            clinic_name.as_deref().unwrap_or("NULL"),
            plan,
            plan_expires_at.as_deref().unwrap_or("never"),
        );
        user_ids.push((id, public_id));
    }

    let connections = ConnectionRepository::new(services.db_pool.clone());
    let reviews = ReviewRepository::new(services.db_pool.clone());

    for (user_id, public_id) in user_ids {
        println!("\n=== {public_id} ===");

        let user_connections = connections
            .list_for_user(user_id)
            .await
            .context("failed to fetch connections")?;
        if user_connections.is_empty() {
            println!("connections: none");
        }
        for connection in user_connections {
            println!(
                "connection {:<16} {:<32} {:<8} expires {}",
                connection.provider.as_str(),
                connection.email,
                connection.status.as_str(),
                connection
                    .expires_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string()),
            );
        }

        let summary = reviews
            .summary_for_user(user_id)
            .await
            .context("failed to summarise reviews")?;
        if summary.is_empty() {
            println!("campaigns: none");
        }
        for campaign in summary {
            println!(
                "campaign {:<30} reviews {:<5} average {}",
                campaign.campaign_name,
                campaign.review_count,
                campaign
                    .average_rating
                    .map(|rating| format!("{rating:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    Ok(())
}
