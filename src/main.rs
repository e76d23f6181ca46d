use clap::{Parser, Subcommand};
use segment_cluster::config::{RpcTimeouts, TimeoutArgs, dedup_nodes};
use segment_cluster::membership::coordinator::ClusterCoordinator;
use segment_cluster::membership::handlers::admin_router;
use segment_cluster::storage::client::HttpStorageClient;
use segment_cluster::storage::disk::NodeStore;
use segment_cluster::storage::handlers::router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "segment-cluster", version, about = "Consistent-hashing storage for media segments")]
struct Cli {
    /// Log verbosity (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "SEGMENT_LOG_LEVEL", default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a storage node serving one local directory.
    Storage {
        /// Address the storage service listens on.
        #[arg(long, env = "SEGMENT_BIND", default_value = "127.0.0.1:8090")]
        bind: SocketAddr,

        /// Directory holding one subdirectory per collection.
        #[arg(env = "SEGMENT_BASE_DIR")]
        base_dir: PathBuf,
    },

    /// Run the coordinator and its admin service.
    Coordinator {
        /// Address the admin service listens on.
        #[arg(long, env = "SEGMENT_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Initial storage nodes, comma separated.
        #[arg(long, env = "SEGMENT_NODES", value_delimiter = ',')]
        nodes: Vec<String>,

        #[command(flatten)]
        timeouts: TimeoutArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();

    match cli.command {
        Command::Storage { bind, base_dir } => run_storage(bind, base_dir).await,
        Command::Coordinator {
            bind,
            nodes,
            timeouts,
        } => run_coordinator(bind, nodes, timeouts.into()).await,
    }
}

async fn run_storage(bind: SocketAddr, base_dir: PathBuf) -> anyhow::Result<()> {
    let store = NodeStore::open(base_dir)?;
    tracing::info!("Storage node serving {}", store.base_dir().display());

    let app = router(Arc::new(store));

    tracing::info!("Storage service listening on {}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_coordinator(
    bind: SocketAddr,
    nodes: Vec<String>,
    timeouts: RpcTimeouts,
) -> anyhow::Result<()> {
    let nodes = dedup_nodes(nodes);
    if nodes.is_empty() {
        tracing::warn!("Starting with an empty ring; add nodes before writing content");
    } else {
        tracing::info!("Storage nodes: {:?}", nodes);
    }
    tracing::info!(
        "RPC budgets: read={:?} write={:?} admin={:?}",
        timeouts.read,
        timeouts.write,
        timeouts.admin
    );

    let client = Arc::new(HttpStorageClient::new()?);
    let coordinator = Arc::new(ClusterCoordinator::new(nodes, client, timeouts));
    let app = admin_router(coordinator);

    tracing::info!("Admin service listening on {}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
