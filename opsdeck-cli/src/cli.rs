use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use opsdeck_core::{
    CoreResult,
    confirm::{ConfirmationFlow, Outcome},
    query::{SortDirection, SortKey, SortSpec, StatusFilter, UserQuery},
    roles::{Permission, RoleRegistry},
    store::JsonFileStore,
    users::UserRegistry,
};

use crate::config::{AppConfig, Theme};
use crate::logging;
use crate::render;

#[derive(Parser)]
#[command(name = "opsdeck")]
#[command(version, about = "opsdeck - user and role administration from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    #[command(subcommand)]
    Users(UsersCommands),

    /// Manage roles and their permissions
    #[command(subcommand)]
    Roles(RolesCommands),

    /// Show or switch the dashboard theme
    Theme {
        /// Theme to switch to; prints the current theme when omitted
        #[arg(value_enum)]
        theme: Option<Theme>,
    },
}

#[derive(Subcommand)]
enum UsersCommands {
    /// List users, optionally searched, filtered and sorted
    List {
        /// Case-insensitive substring match on name, email and role
        #[arg(long)]
        search: Option<String>,

        /// Keep only active or inactive users
        #[arg(long, value_enum, default_value = "all")]
        status: StatusArg,

        /// Column to sort by
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Add a user
    Add {
        name: String,
        email: String,
        /// Role name; see `opsdeck roles list`
        role: String,
        #[arg(long)]
        active: bool,
    },

    /// Edit an existing user (unset flags keep the current value)
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },

    /// Remove a user
    Remove {
        id: u64,
        /// Skip the confirmation delay
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RolesCommands {
    /// List roles
    List,

    /// Add a role
    Add {
        name: String,
        /// Comma-separated: read, write, delete
        #[arg(long, value_delimiter = ',', required = true)]
        permissions: Vec<String>,
    },

    /// Edit an existing role (unset flags keep the current value)
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        permissions: Option<Vec<String>>,
    },

    /// Remove a role (users referencing it keep the stale name)
    Remove {
        id: u64,
        /// Skip the confirmation delay
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Inactive,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Inactive => StatusFilter::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Email,
    Role,
    Active,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Email => SortKey::Email,
            SortArg::Role => SortKey::Role,
            SortArg::Active => SortKey::Active,
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    logging::init_logging(&config.log_level);

    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => JsonFileStore::default_dir()?,
    };
    let store = JsonFileStore::open(data_dir);

    match cli.command {
        Commands::Users(cmd) => run_users(cmd, store, &config).await,
        Commands::Roles(cmd) => run_roles(cmd, store, &config).await,
        Commands::Theme { theme } => {
            match theme {
                Some(theme) => {
                    config.theme = theme;
                    config.save()?;
                    println!("Theme set to {}", theme.as_str());
                }
                None => println!("{}", config.theme.as_str()),
            }
            Ok(())
        }
    }
}

async fn run_users(cmd: UsersCommands, store: JsonFileStore, config: &AppConfig) -> Result<()> {
    let mut users = UserRegistry::open(store.clone());

    match cmd {
        UsersCommands::List {
            search,
            status,
            sort,
            desc,
        } => {
            let query = UserQuery {
                search: search.unwrap_or_default(),
                status: status.into(),
                sort: sort.map(|key| SortSpec {
                    key: key.into(),
                    direction: if desc {
                        SortDirection::Descending
                    } else {
                        SortDirection::Ascending
                    },
                }),
            };
            render::print_users(&query.apply(users.list()));
        }

        UsersCommands::Add {
            name,
            email,
            role,
            active,
        } => {
            let roles = RoleRegistry::open(store);
            if !roles.list().iter().any(|r| r.name == role) {
                let known: Vec<&str> = roles.list().iter().map(|r| r.name.as_str()).collect();
                warn!("Role \"{}\" does not exist (known roles: {:?})", role, known);
            }

            let user = users.create(&name, &email, &role, active)?;
            println!("Added user {} (id {})", user.name, user.id);
        }

        UsersCommands::Edit {
            id,
            name,
            email,
            role,
            active,
        } => {
            let Some(current) = users.get(id).cloned() else {
                return Err(anyhow!("No user with id {id}"));
            };

            let user = users.update(
                id,
                &name.unwrap_or(current.name),
                &email.unwrap_or(current.email),
                &role.unwrap_or(current.role),
                active.unwrap_or(current.active),
            )?;
            println!("Updated user {} (id {})", user.name, user.id);
        }

        UsersCommands::Remove { id, yes } => {
            let Some(user) = users.get(id).cloned() else {
                println!("No user with id {id}");
                return Ok(());
            };

            let removed = confirm_remove(
                &format!("About to delete user \"{}\"", user.name),
                yes,
                config.confirm_delay_ms,
                || users.delete(id),
            )
            .await?;
            if removed {
                println!("Removed user {} (id {})", user.name, id);
            }
        }
    }

    Ok(())
}

async fn run_roles(cmd: RolesCommands, store: JsonFileStore, config: &AppConfig) -> Result<()> {
    let mut roles = RoleRegistry::open(store);

    match cmd {
        RolesCommands::List => render::print_roles(roles.list()),

        RolesCommands::Add { name, permissions } => {
            let role = roles.create(&name, parse_permissions(&permissions)?)?;
            println!("Added role {} (id {})", role.name, role.id);
        }

        RolesCommands::Edit {
            id,
            name,
            permissions,
        } => {
            let Some(current) = roles.get(id).cloned() else {
                return Err(anyhow!("No role with id {id}"));
            };

            let permissions = match permissions {
                Some(raw) => parse_permissions(&raw)?,
                None => current.permissions,
            };
            let role = roles.update(id, &name.unwrap_or(current.name), permissions)?;
            println!("Updated role {} (id {})", role.name, role.id);
        }

        RolesCommands::Remove { id, yes } => {
            let Some(role) = roles.get(id).cloned() else {
                println!("No role with id {id}");
                return Ok(());
            };

            let removed = confirm_remove(
                &format!(
                    "About to delete role \"{}\". Users referencing it keep the stale name.",
                    role.name
                ),
                yes,
                config.confirm_delay_ms,
                || roles.delete(id),
            )
            .await?;
            if removed {
                println!("Removed role {} (id {})", role.name, id);
            }
        }
    }

    Ok(())
}

fn parse_permissions(raw: &[String]) -> Result<Vec<Permission>> {
    raw.iter()
        .map(|s| Permission::from_str(s.trim()).map_err(|e| anyhow!(e)))
        .collect()
}

/// Runs `op` behind the confirmation gate. Ctrl-C within the delay window
/// cancels; `--yes` bypasses the gate entirely. Returns whether `op` ran.
async fn confirm_remove(
    message: &str,
    yes: bool,
    delay_ms: u64,
    op: impl FnOnce() -> CoreResult<()>,
) -> Result<bool> {
    if yes {
        op()?;
        return Ok(true);
    }

    let mut flow = ConfirmationFlow::new(Duration::from_millis(delay_ms));
    let cancel = flow.arm()?;

    println!("{message}");
    println!(
        "Confirming in {:.1}s, press Ctrl-C to cancel",
        delay_ms as f64 / 1000.0
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match flow.resolve(op).await? {
        Outcome::Confirmed(result) => {
            result?;
            Ok(true)
        }
        Outcome::Cancelled => {
            println!("Cancelled");
            Ok(false)
        }
    }
}
