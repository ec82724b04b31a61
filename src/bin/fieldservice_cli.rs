use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use fieldservice_api::{
    auth::{AuthConfig, AuthService, Role},
    config::{self, AppConfig},
    db,
};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    match cli.command {
        Commands::Migrate => handle_migrate(&cfg).await?,
        Commands::IssueToken(args) => handle_issue_token(&cfg, args, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "fieldservice",
    about = "Administrative commands for the field service API",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending database migration
    Migrate,
    /// Mint a bearer token for a user
    IssueToken(IssueTokenArgs),
}

#[derive(Args)]
struct IssueTokenArgs {
    #[arg(long, help = "User id placed in the token subject")]
    user: Uuid,
    #[arg(
        long,
        value_parser = parse_role,
        help = "Role granted by the token (engineer, manager, admin); repeatable"
    )]
    role: Vec<Role>,
    #[arg(long, help = "Display name carried in the token")]
    name: Option<String>,
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::from_str(value).map_err(|_| format!("unknown role `{}`", value))
}

async fn handle_migrate(cfg: &AppConfig) -> Result<()> {
    let pool = db::establish_connection_from_app_config(cfg)
        .await
        .context("failed to connect to the database")?;
    db::run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;
    info!("Migrations applied");
    println!("migrations applied");
    Ok(())
}

fn handle_issue_token(cfg: &AppConfig, args: IssueTokenArgs, json: bool) -> Result<()> {
    let roles = if args.role.is_empty() {
        vec![Role::Engineer]
    } else {
        args.role
    };

    let auth = AuthService::new(AuthConfig::from(cfg));
    let token = auth
        .issue_token(args.user, args.name, &roles)
        .context("failed to issue token")?;

    if json {
        let payload = serde_json::json!({
            "user_id": args.user,
            "roles": roles.iter().map(Role::to_string).collect::<Vec<_>>(),
            "expires_in": cfg.jwt_expiration_secs,
            "token": token,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", token);
    }
    Ok(())
}
