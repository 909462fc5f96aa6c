mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use clc_api::Session;
use clc_config::ClientConfig;
use clc_v2::ServerOperation;

#[derive(Parser)]
#[command(name = "clc")]
#[command(about = "CenturyLink Cloud v2 client", long_about = None)]
struct Cli {
    /// Account alias (defaults to CLC_ALIAS or the alias returned at login)
    #[arg(short, long, global = true)]
    alias: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage anti-affinity policies
    #[command(subcommand)]
    Policy(PolicyCommands),
    /// Inspect and operate servers
    #[command(subcommand)]
    Server(ServerCommands),
    /// Track queued operations
    #[command(subcommand)]
    Operation(OperationCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// List policies, all locations unless one is given
    List {
        /// Datacenter, e.g. WA1
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Create an empty policy
    Create {
        /// Policy name
        name: String,
        /// Datacenter (defaults to CLC_LOCATION or the login location)
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Rename a policy
    Rename {
        /// Policy id
        id: String,
        /// New name
        name: String,
    },
    /// Delete a policy
    Delete {
        /// Policy id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ServerCommands {
    /// Show a server summary
    Show {
        /// Server id, e.g. WA1BTDIWEB01
        id: String,
    },
    /// Print a single server field as JSON
    Attr {
        /// Server id
        id: String,
        /// Field name, top level or within details (e.g. cpu, powerState)
        field: String,
    },
    /// Queue a power operation
    Power {
        /// Server id
        id: String,
        action: PowerAction,
    },
    /// Queue a snapshot
    Snapshot {
        /// Server id
        id: String,
        /// Days to keep the snapshot
        #[arg(short, long, default_value_t = clc_v2::DEFAULT_SNAPSHOT_EXPIRATION_DAYS)]
        days: u32,
    },
}

#[derive(Subcommand)]
pub enum OperationCommands {
    /// Show the status of a queued operation
    Status {
        /// Operation id from the status link, e.g. wa1-126437
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerAction {
    Pause,
    ShutDown,
    Reboot,
    Reset,
    On,
    Off,
}

impl From<PowerAction> for ServerOperation {
    fn from(action: PowerAction) -> Self {
        match action {
            PowerAction::Pause => ServerOperation::Pause,
            PowerAction::ShutDown => ServerOperation::ShutDown,
            PowerAction::Reboot => ServerOperation::Reboot,
            PowerAction::Reset => ServerOperation::Reset,
            PowerAction::On => ServerOperation::PowerOn,
            PowerAction::Off => ServerOperation::PowerOff,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Version needs no login
    if matches!(cli.command, Commands::Version) {
        println!("clc {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ClientConfig::load()?;
    let session = Session::login(&config).await?;
    tracing::debug!(
        "Logged in as alias {} at {}",
        session.alias(),
        session.location()
    );

    let alias = cli.alias.as_deref();
    match cli.command {
        Commands::Policy(cmd) => commands::policy::handle(&session, cmd, alias).await?,
        Commands::Server(cmd) => commands::server::handle(&session, cmd, alias).await?,
        Commands::Operation(cmd) => commands::operation::handle(&session, cmd, alias).await?,
        Commands::Version => unreachable!("Version is handled before login"),
    }

    Ok(())
}
