mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use docbase_db::Database;
use docbase_types::Role;

#[derive(Parser)]
#[command(name = "docbase", about = "Multi-role document registry", version)]
struct Cli {
    /// Path to the registry database (overrides DOCBASE_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new user account
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        username: String,
        /// Prompted for interactively when omitted
        #[arg(long)]
        password: Option<String>,
        #[arg(long, value_enum, default_value_t = RoleArg::Regular)]
        role: RoleArg,
    },
    /// Verify credentials and report the granted role
    Login {
        #[command(flatten)]
        auth: Auth,
    },
    /// Document catalog operations
    #[command(subcommand)]
    Doc(DocCommand),
    /// List registered users (administrators only)
    Users {
        #[command(flatten)]
        auth: Auth,
    },
    /// Export the user table to users_report.csv (administrators only)
    Report {
        #[command(flatten)]
        auth: Auth,
        /// Directory the report is written into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum DocCommand {
    /// Add a document to the catalog (administrators only)
    Add {
        #[command(flatten)]
        auth: Auth,
        #[arg(long)]
        name: String,
        #[arg(long)]
        content: String,
        /// Comma-separated tag list
        #[arg(long)]
        keywords: String,
        #[arg(long)]
        category: String,
    },
    /// List the full catalog
    List {
        #[command(flatten)]
        auth: Auth,
        #[arg(long)]
        json: bool,
    },
    /// Filter the catalog by a case-insensitive name substring
    Search {
        #[command(flatten)]
        auth: Auth,
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a document by id (administrators only)
    Delete {
        #[command(flatten)]
        auth: Auth,
        id: i64,
    },
}

/// Credentials accepted by every role-gated subcommand. There is no session
/// flow; each invocation authenticates afresh.
#[derive(Args)]
struct Auth {
    #[arg(long, short)]
    username: String,
    /// Prompted for interactively when omitted
    #[arg(long, short)]
    password: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Regular,
    Administrator,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Regular => Role::Regular,
            RoleArg::Administrator => Role::Administrator,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docbase=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::var("DOCBASE_DB").unwrap_or_else(|_| "docbase.db".into()).into());
    let db = Arc::new(Database::open(&db_path)?);
    info!("Using database at {}", db_path.display());

    commands::run(cli.command, db)
}
