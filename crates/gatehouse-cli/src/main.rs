mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::HeldSource;

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(about = "Wildcard permission evaluation and role management")]
#[command(version)]
struct Cli {
    /// Path to the gatehouse config directory (default: ~/.gatehouse)
    #[arg(long, global = true, env = "GATEHOUSE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the role store
    Init,

    /// Evaluate required permissions against a held set
    Check {
        /// Required permissions
        #[arg(required = true)]
        required: Vec<String>,
        #[command(flatten)]
        held: HeldSource,
        /// Require every permission instead of any one
        #[arg(long)]
        all: bool,
    },

    /// Expand a `module.*` wildcard into concrete permissions
    Expand {
        wildcard: String,
        /// Comma-separated actions (default: from config)
        #[arg(long, value_delimiter = ',')]
        actions: Vec<String>,
        /// List the matrix permissions the wildcard covers instead
        #[arg(long)]
        within_matrix: bool,
    },

    /// Print human-readable labels
    Label {
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Group permissions by top-level module
    Group {
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Show module grids of the permission matrix
    Matrix {
        /// Role whose held set is rendered
        #[arg(long)]
        role: Option<String>,
        /// Only this module
        #[arg(long)]
        module: Option<String>,
    },

    /// Manage roles
    Role {
        #[command(subcommand)]
        command: commands::role::RoleCommand,
    },

    /// Manage users and role assignments
    User {
        #[command(subcommand)]
        command: commands::user::UserCommand,
    },

    /// List the dashboard tabs a role or user can see
    Tabs {
        #[command(flatten)]
        held: HeldSource,
    },

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gatehouse=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => gatehouse_auth::GatehouseConfig::default_base_dir()?,
    };

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Init => rt.block_on(commands::init::run(&base_dir)),
        Commands::Check {
            ref required,
            ref held,
            all,
        } => {
            let allowed = rt.block_on(commands::check::run(
                &base_dir, required, held, all, cli.json,
            ))?;
            if !allowed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Expand {
            ref wildcard,
            ref actions,
            within_matrix,
        } => commands::expand::run(&base_dir, wildcard, actions, within_matrix, cli.json),
        Commands::Label { ref permissions } => commands::label::run(permissions, cli.json),
        Commands::Group { ref permissions } => commands::group::run(permissions, cli.json),
        Commands::Matrix {
            ref role,
            ref module,
        } => rt.block_on(commands::matrix::run(
            &base_dir,
            role.as_deref(),
            module.as_deref(),
            cli.json,
        )),
        Commands::Role { ref command } => {
            rt.block_on(commands::role::run(&base_dir, command, cli.json))
        }
        Commands::User { ref command } => {
            rt.block_on(commands::user::run(&base_dir, command, cli.json))
        }
        Commands::Tabs { ref held } => rt.block_on(commands::tabs::run(&base_dir, held, cli.json)),
        Commands::Config => commands::config::run(&base_dir),
    }
}
