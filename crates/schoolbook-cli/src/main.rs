use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

use schoolbook_cli::admin::{self, NewAdmin};
use schoolbook_cli::seeder::{self, SeedConfig};

#[derive(Parser)]
#[command(name = "schoolbook-cli")]
#[command(about = "Schoolbook CLI - Administrative tools for Schoolbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Set a new password for an existing user
    ResetPassword {
        #[arg(short = 'u', long)]
        username: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake classes and students
    Seed {
        /// Number of classes to create
        #[arg(short = 'c', long, default_value = "6")]
        classes: usize,

        /// Number of students to create
        #[arg(short = 's', long, default_value = "120")]
        students: usize,
    },
    /// Remove seeded classes and students (real records are kept)
    Clear,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| fail("DATABASE_URL must be set"));
    let pool = schoolbook_db::init_db_pool(&database_url)
        .await
        .unwrap_or_else(|e| fail(&format!("Failed to connect to database: {}", e)));

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let admin = NewAdmin {
                username: username.unwrap_or_else(|| prompt("Username")),
                email: email.unwrap_or_else(|| prompt("Email address")),
                first_name: first_name.unwrap_or_else(|| prompt("First name")),
                last_name: last_name.unwrap_or_else(|| prompt("Last name")),
                password: password.unwrap_or_else(prompt_password),
            };
            handle_create_admin(&pool, admin).await
        }
        Commands::ResetPassword { username, password } => {
            let password = password.unwrap_or_else(prompt_password);
            handle_reset_password(&pool, &username, &password).await
        }
        Commands::Seed { classes, students } => {
            handle_seed(&pool, SeedConfig { classes, students }).await
        }
        Commands::Clear => handle_clear(&pool).await,
    }
}

fn fail(message: &str) -> ! {
    eprintln!("\n❌ {}", message);
    std::process::exit(1);
}

fn prompt(label: &str) -> String {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .unwrap_or_else(|e| fail(&format!("Failed to read {}: {}", label.to_lowercase(), e)))
}

fn prompt_password() -> String {
    Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords don't match")
        .interact()
        .unwrap_or_else(|e| fail(&format!("Failed to read password: {}", e)))
}

async fn handle_create_admin(pool: &PgPool, admin: NewAdmin) {
    match admin::create_admin(pool, &admin).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Username: {}", admin.username);
            println!("   Email: {}", admin.email);
            println!("   Name: {} {}", admin.first_name, admin.last_name);
        }
        Err(e) => fail(&format!("Error creating admin: {}", e)),
    }
}

async fn handle_reset_password(pool: &PgPool, username: &str, password: &str) {
    match admin::reset_password(pool, username, password).await {
        Ok(()) => println!("\n✅ Password updated for '{}'", username),
        Err(e) => fail(&format!("Error resetting password: {}", e)),
    }
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) {
    if let Err(e) = seeder::seed_all(pool, config).await {
        fail(&format!("Error seeding database: {}", e));
    }
}

async fn handle_clear(pool: &PgPool) {
    if let Err(e) = seeder::clear_all(pool).await {
        fail(&format!("Error clearing seeded data: {}", e));
    }
}
