use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use segment_cluster::config::{ContentBackend, TimeoutArgs, parse_duration};
use segment_cluster::content::{self, ContentService, publish_outputs};
use segment_cluster::membership::protocol::{
    ENDPOINT_NODES, ENDPOINT_REBALANCE, ENDPOINT_REMOVE_NODE, ErrorResponse, ListNodesResponse,
    MigrationResponse, NodeRequest,
};
use segment_cluster::ring::types::FileKey;
use segment_cluster::storage::client::HttpStorageClient;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "segctl", version, about = "Operate a segment cluster")]
struct Cli {
    #[arg(long, global = true, env = "SEGCTL_LOG_LEVEL", default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Membership calls against a running coordinator.
    #[command(flatten)]
    Admin(AdminCommand),

    /// Content calls through a local directory or directly through the cluster.
    Content {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(subcommand)]
        command: ContentCommand,
    },

    /// Check a storage node's health endpoint.
    Health {
        node: String,

        #[arg(long, default_value = "5s", value_parser = parse_duration)]
        timeout: Duration,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List member nodes in ring order.
    Nodes {
        #[command(flatten)]
        target: CoordinatorArgs,
    },
    /// Add a node and migrate the files it now owns.
    AddNode {
        #[command(flatten)]
        target: CoordinatorArgs,
        address: String,
    },
    /// Remove a node and migrate all of its files away.
    RemoveNode {
        #[command(flatten)]
        target: CoordinatorArgs,
        address: String,
    },
    /// Move every misplaced file under the current ring.
    Rebalance {
        #[command(flatten)]
        target: CoordinatorArgs,
    },
}

#[derive(clap::Args, Debug)]
struct CoordinatorArgs {
    /// Admin address of the coordinator.
    #[arg(long, env = "SEGCTL_COORDINATOR", default_value = "127.0.0.1:8080")]
    coordinator: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendKind {
    Local,
    Cluster,
}

#[derive(clap::Args, Debug)]
struct BackendArgs {
    #[arg(long, value_enum, env = "SEGCTL_BACKEND", default_value = "cluster")]
    backend: BackendKind,

    /// Content directory for the local backend.
    #[arg(long, env = "SEGCTL_DIR", required_if_eq("backend", "local"))]
    dir: Option<PathBuf>,

    /// Storage nodes for the cluster backend, comma separated.
    #[arg(long, env = "SEGCTL_NODES", value_delimiter = ',')]
    nodes: Vec<String>,

    #[command(flatten)]
    timeouts: TimeoutArgs,
}

impl BackendArgs {
    fn backend(&self) -> anyhow::Result<ContentBackend> {
        match self.backend {
            BackendKind::Local => {
                let base_dir = self.dir.clone().context("--dir is required for --backend local")?;
                Ok(ContentBackend::Local { base_dir })
            }
            BackendKind::Cluster => {
                if self.nodes.is_empty() {
                    bail!("--nodes is required for --backend cluster");
                }
                Ok(ContentBackend::Cluster {
                    nodes: self.nodes.clone(),
                })
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum ContentCommand {
    /// Upload files into a collection, in the order given.
    Put {
        collection: String,
        files: Vec<PathBuf>,
    },
    /// Download one file; writes to stdout unless --output is given.
    Get {
        collection: String,
        filename: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete one file.
    Rm { collection: String, filename: String },
    /// List the files of a collection.
    Ls { collection: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Admin(command) => run_admin(command).await,
        Command::Content { backend, command } => run_content(backend, command).await,
        Command::Health { node, timeout } => {
            HttpStorageClient::new()?.health(&node, timeout).await?;
            println!("{} is healthy", node);
            Ok(())
        }
    }
}

// --- Admin commands ---

async fn run_admin(command: AdminCommand) -> anyhow::Result<()> {
    let http = reqwest::Client::new();

    match command {
        AdminCommand::Nodes { target } => {
            let response = http.get(admin_url(&target, ENDPOINT_NODES)).send().await?;
            let nodes: ListNodesResponse = decode(response).await?;
            for node in nodes.nodes {
                println!("{}", node);
            }
            for node in nodes.draining {
                println!("{} (draining)", node);
            }
        }
        AdminCommand::AddNode { target, address } => {
            let response = http
                .post(admin_url(&target, ENDPOINT_NODES))
                .json(&NodeRequest { address })
                .send()
                .await?;
            print_migration(decode(response).await?);
        }
        AdminCommand::RemoveNode { target, address } => {
            let response = http
                .post(admin_url(&target, ENDPOINT_REMOVE_NODE))
                .json(&NodeRequest { address })
                .send()
                .await?;
            print_migration(decode(response).await?);
        }
        AdminCommand::Rebalance { target } => {
            let response = http
                .post(admin_url(&target, ENDPOINT_REBALANCE))
                .send()
                .await?;
            print_migration(decode(response).await?);
        }
    }

    Ok(())
}

fn admin_url(target: &CoordinatorArgs, endpoint: &str) -> String {
    let base = target.coordinator.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}{}", base, endpoint)
    } else {
        format!("http://{}{}", base, endpoint)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse {
            error,
            migrated_file_count: Some(migrated),
        }) => bail!("{} ({} file(s) were migrated before the failure)", error, migrated),
        Ok(ErrorResponse { error, .. }) => bail!("{}: {}", status, error),
        Err(_) => bail!("{}: {}", status, body),
    }
}

fn print_migration(response: MigrationResponse) {
    println!("{}", json!({ "migrated_file_count": response.migrated_file_count }));
}

// --- Content commands ---

async fn run_content(args: BackendArgs, command: ContentCommand) -> anyhow::Result<()> {
    let service = content::build(&args.backend()?, args.timeouts.clone().into())?;

    match command {
        ContentCommand::Put { collection, files } => {
            let mut outputs = Vec::with_capacity(files.len());
            for path in files {
                let filename = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .with_context(|| format!("{} has no usable file name", path.display()))?
                    .to_string();
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                outputs.push((filename, data));
            }
            let written = publish_outputs(service.as_ref(), &collection, outputs).await?;
            println!("wrote {} file(s) to {}", written, collection);
        }
        ContentCommand::Get {
            collection,
            filename,
            output,
        } => {
            let data = service.read(&FileKey::new(collection, filename)).await?;
            match output {
                Some(path) => tokio::fs::write(&path, data).await?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&data)?;
                }
            }
        }
        ContentCommand::Rm {
            collection,
            filename,
        } => {
            service.delete(&FileKey::new(collection, filename)).await?;
        }
        ContentCommand::Ls { collection } => {
            for filename in service.list_files(&collection).await? {
                println!("{}", filename);
            }
        }
    }

    Ok(())
}
