//! Service Monitor CLI
//!
//! Runs the auth/users server and drives the service-inventory dashboard
//! from the terminal.
//!
//! ```sh
//! # Run the server with default config (~/.config/service-monitor/config.toml)
//! service-monitor serve
//!
//! # Validate config and database without starting
//! service-monitor serve --check
//!
//! # Dashboard
//! service-monitor login admin
//! service-monitor services list
//! service-monitor services add --name "Edge proxy" --cost 12.5
//! service-monitor theme toggle
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use service_monitor::config::{default_config_path, AppConfig, LoggingConfig};
use service_monitor::dashboard::{time_ago, Dashboard, HttpAuthClient, DEFAULT_SERVER_URL};
use service_monitor::domain::{ServiceDraft, UserRole, CLOUD_PROVIDERS};
use service_monitor::infrastructure::storage::FileStorage;
use service_monitor::server::{init_tracing, preflight, ServerHandle, ServerOptions};

/// Service Monitor: service inventory dashboard with role-based access.
#[derive(Parser, Debug)]
#[command(
    name = "service-monitor",
    version,
    about = "Service inventory dashboard: auth server and terminal client"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = "SERVICE_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Dashboard state file.
    #[arg(long, global = true, env = "SERVICE_MONITOR_STORE")]
    store: Option<PathBuf>,

    /// Auth server base URL used by the dashboard commands.
    #[arg(long, global = true, env = "SERVICE_MONITOR_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the auth/users REST server.
    Serve(ServeArgs),

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    #[command(flatten)]
    Client(ClientCommand),
}

/// Dashboard commands, run against the local store
#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// Log in and remember the session token.
    Login {
        username: String,
        /// Prompted for (without echo) when omitted.
        #[arg(long, env = "SERVICE_MONITOR_PASSWORD")]
        password: Option<String>,
    },

    /// Forget the stored session.
    Logout,

    /// Show session, inventory and theme summary.
    Status,

    /// Service inventory.
    Services {
        #[command(subcommand)]
        action: ServicesAction,
    },

    /// User management (admin only).
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Light/dark theme preference.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Override the listen port.
    #[arg(short, long, env = "SERVICE_MONITOR_PORT")]
    port: Option<u16>,

    /// Validate the configuration and database, then exit.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip seeding the default admin and reader accounts.
    #[arg(long)]
    no_seed: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct ServiceFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    ip: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Cloud provider (see `services providers`).
    #[arg(long, value_parser = PossibleValuesParser::new(CLOUD_PROVIDERS.iter().copied()))]
    cloud: Option<String>,
    /// Monthly cost.
    #[arg(long)]
    cost: Option<f64>,
    /// Owning team.
    #[arg(long)]
    supported_by: Option<String>,
}

impl ServiceFields {
    fn apply(self, draft: &mut ServiceDraft) {
        let ServiceFields {
            name,
            project,
            url,
            ip,
            description,
            cloud,
            cost,
            supported_by,
        } = self;
        if let Some(v) = name {
            draft.name = v;
        }
        if let Some(v) = project {
            draft.project_name = v;
        }
        if let Some(v) = url {
            draft.url = v;
        }
        if let Some(v) = ip {
            draft.ip = v;
        }
        if let Some(v) = description {
            draft.description = v;
        }
        if let Some(v) = cloud {
            draft.cloud_provider = v;
        }
        if let Some(v) = cost {
            draft.monthly_cost = v;
        }
        if let Some(v) = supported_by {
            draft.supported_by = v;
        }
    }
}

#[derive(Subcommand, Debug)]
enum ServicesAction {
    /// List all services.
    List,
    /// Add a service (admin).
    Add(ServiceFields),
    /// Edit fields of a service (admin).
    Edit {
        id: String,
        #[command(flatten)]
        fields: ServiceFields,
    },
    /// "Check Now": flip a service's active flag (admin).
    Check { id: String },
    /// Restamp the check time of every service.
    CheckAll,
    /// List the cloud providers a service can run on.
    Providers,
}

#[derive(Subcommand, Debug)]
enum UsersAction {
    /// Create a user on the server.
    Create {
        username: String,
        #[arg(long, env = "SERVICE_MONITOR_NEW_PASSWORD")]
        password: Option<String>,
        #[arg(long, default_value = "reader")]
        role: UserRole,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    /// Print the effective theme.
    Show {
        /// Treat the OS as preferring dark mode.
        #[arg(long)]
        os_dark: bool,
    },
    /// Flip the theme and remember the choice.
    Toggle {
        #[arg(long)]
        os_dark: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    match cli.command {
        Command::Serve(args) => serve(config_path, cli.log_level, args).await,
        Command::Config { action } => match action {
            ConfigAction::Init { force } => config_init(&config_path, force),
        },
        Command::Client(command) => {
            // Client commands stay quiet unless asked otherwise
            init_tracing(&AppConfig {
                logging: LoggingConfig {
                    level: cli.log_level.unwrap_or_else(|| "warn".to_string()),
                    ..LoggingConfig::default()
                },
                ..AppConfig::default()
            });
            let store_path = cli.store.unwrap_or_else(FileStorage::default_path);
            run_client(command, store_path, cli.server).await
        }
    }
}

// ── Server ─────────────────────────────────────────────────────────

async fn serve(config_path: PathBuf, log_level: Option<String>, args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(level) = log_level {
        config.logging.level = level;
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(port) = args.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    // ── Config validation mode ─────────────────────────────────
    if args.check {
        let report = preflight(&config)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .context("Preflight check failed")?;
        println!("Configuration is valid");
        println!("   Config file        : {}", config_path.display());
        println!("   Listen address     : {}", config.server.address());
        println!("   Allowed origin     : {}", config.server.allowed_origin);
        println!("   Database           : {}", report.database_url);
        println!("   Pending migrations : {}", report.pending_migrations);
        println!("   Log level          : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !args.no_migrate,
        seed: !args.no_seed,
    })
    .await
    .map_err(|e| anyhow::anyhow!(e))?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.wait().await;
    Ok(())
}

fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    AppConfig::default().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    println!("Set security.jwt_secret and the seed passwords before exposing the server.");
    Ok(())
}

// ── Dashboard ──────────────────────────────────────────────────────

type CliDashboard = Dashboard<FileStorage, HttpAuthClient>;

fn open_dashboard(store_path: &Path, server: &str, os_dark: bool) -> Result<CliDashboard> {
    let store = FileStorage::open(store_path)
        .with_context(|| format!("Failed to open {}", store_path.display()))?;
    Ok(Dashboard::load(
        store,
        HttpAuthClient::new(server),
        os_dark,
        Utc::now(),
    )?)
}

async fn run_client(command: ClientCommand, store_path: PathBuf, server: String) -> Result<()> {
    let os_dark = match &command {
        ClientCommand::Theme {
            action: ThemeAction::Show { os_dark } | ThemeAction::Toggle { os_dark },
        } => *os_dark,
        _ => false,
    };
    let mut dash = open_dashboard(&store_path, &server, os_dark)?;

    match command {
        ClientCommand::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password")?,
            };
            let session = dash.login(&username, &password).await?;
            println!("Logged in as {} ({})", username, session.role);
        }
        ClientCommand::Logout => {
            dash.logout()?;
            println!("Logged out");
        }
        ClientCommand::Status => print_status(&dash, &store_path),
        ClientCommand::Services { action } => services(&mut dash, action)?,
        ClientCommand::Users {
            action:
                UsersAction::Create {
                    username,
                    password,
                    role,
                },
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password(&format!("Password for {username}"))?,
            };
            let message = dash.create_user(&username, &password, role).await?;
            println!("{message}");
        }
        ClientCommand::Theme { action } => {
            if let ThemeAction::Toggle { .. } = action {
                dash.toggle_theme()?;
            }
            print_theme(&dash);
        }
    }
    Ok(())
}

fn services(dash: &mut CliDashboard, action: ServicesAction) -> Result<()> {
    let now = Utc::now();
    match action {
        ServicesAction::List => {
            dash.require_session()?;
            print_services(dash);
        }
        ServicesAction::Add(fields) => {
            if fields.name.is_none() {
                bail!("--name is required");
            }
            let mut draft = ServiceDraft::default();
            fields.apply(&mut draft);
            let service = dash.add_service(draft, now)?;
            println!("Added {} ({})", service.name, service.id);
        }
        ServicesAction::Edit { id, fields } => {
            let Some(existing) = dash.inventory().get(&id).cloned() else {
                bail!("No service with id {id}");
            };
            let mut draft = existing.draft();
            fields.apply(&mut draft);
            let mut updated = existing;
            updated.apply_draft(draft);
            dash.edit_service(updated)?;
            println!("Updated {id}");
        }
        ServicesAction::Check { id } => {
            let service = dash.check_service(&id, now)?;
            println!(
                "{} is now {}",
                service.name,
                if service.is_active { "active" } else { "inactive" }
            );
        }
        ServicesAction::CheckAll => {
            dash.check_all(now)?;
            println!("Checked {} services", dash.services().len());
        }
        ServicesAction::Providers => {
            for provider in CLOUD_PROVIDERS {
                println!("{provider}");
            }
        }
    }
    Ok(())
}

fn print_services(dash: &CliDashboard) {
    let services = dash.services();
    if services.is_empty() {
        println!("No services added yet");
        return;
    }

    let now = Utc::now();
    println!(
        "{:<38} {:<24} {:<22} {:<14} {:>10}  {:<8}  LAST CHECK",
        "ID", "NAME", "PROJECT", "CLOUD", "COST/MO", "STATUS"
    );
    for s in services {
        println!(
            "{:<38} {:<24} {:<22} {:<14} {:>10.2}  {:<8}  {}",
            s.id,
            s.name,
            s.project_name,
            s.cloud_provider,
            s.monthly_cost,
            if s.is_active { "active" } else { "inactive" },
            time_ago(s.last_check, now)
        );
    }
    let inventory = dash.inventory();
    println!(
        "\n{} services, {} active, {:.2} per month",
        inventory.len(),
        inventory.active_count(),
        inventory.total_monthly_cost()
    );
}

fn print_status(dash: &CliDashboard, store_path: &std::path::Path) {
    match dash.session() {
        Some(session) => println!("Session : logged in ({})", session.role),
        None => println!("Session : not logged in"),
    }
    println!("Store   : {}", store_path.display());
    println!(
        "Services: {} ({} active)",
        dash.services().len(),
        dash.inventory().active_count()
    );
    print_theme(dash);
}

fn print_theme(dash: &CliDashboard) {
    let theme = dash.theme();
    let mode = if theme.is_dark() { "dark" } else { "light" };
    let source = if theme.preference().is_explicit() {
        "explicit choice"
    } else {
        "follows OS"
    };
    println!("Theme   : {mode} ({source})");
}

fn prompt_password(label: &str) -> Result<String> {
    let password = dialoguer::Password::new().with_prompt(label).interact()?;
    Ok(password)
}
