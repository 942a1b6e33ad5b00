//! gantry — track container image metadata and update Kubernetes
//! deployment images.
//!
//! # Usage
//!
//! ```text
//! gantry image store my-api:v1.2.3 ./metadata.json
//! gantry image get my-api
//! gantry image delete my-api:v1.2.3
//! gantry deployment list
//! gantry deployment update my-api web my-api:v1.2.3
//! gantry serve --port 8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gantry_cluster::{ClusterApi, KubeConnection, kubeconfig};
use gantry_core::GantryConfig;
use gantry_store::{ImageStore, StoreRegistry};

mod commands;

#[derive(Parser)]
#[command(
    name = "gantry",
    about = "Track container image metadata and manage Kubernetes Deployment images",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Config file (default: ./gantry.toml, then $HOME/.gantry.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Kubernetes namespace (overrides the config file)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored information about images
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
    /// Read and update cluster deployments
    Deployment {
        #[command(subcommand)]
        action: DeploymentAction,
    },
    /// Run the HTTP API server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ImageAction {
    /// Store metadata about an image version.
    ///
    /// Repeated stores of the same NAME:VERSION on the same day keep only
    /// the newest; different days are kept separately.
    Store {
        /// Image identifier, formatted as NAME:VERSION
        key: String,
        /// Path to a JSON metadata document
        path: PathBuf,
    },
    /// Get all stored records for an image name, across versions and days
    Get {
        /// Image name (without version)
        name: String,
    },
    /// Delete all records for NAME:VERSION
    Delete {
        /// Image identifier, formatted as NAME:VERSION
        key: String,
    },
}

#[derive(Subcommand)]
enum DeploymentAction {
    /// List deployments in the namespace
    List,
    /// Show one deployment
    Get { name: String },
    /// Set a container's image in a deployment
    Update {
        /// Deployment name
        name: String,
        /// Container name within the pod template
        container: String,
        /// New image reference
        image: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(&cli.log_level)
            .context("invalid log level")?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = GantryConfig::load(cli.config.as_deref())?;
    let namespace = cli
        .namespace
        .clone()
        .unwrap_or_else(|| config.cluster.namespace.clone());

    match cli.command {
        Commands::Image { action } => {
            let store = resolve_store(&config).await?;
            let result = match action {
                ImageAction::Store { key, path } => {
                    commands::image::store(&store, &key, &path).await
                }
                ImageAction::Get { name } => commands::image::get(&store, &name).await,
                ImageAction::Delete { key } => commands::image::delete(&store, &key).await,
            };
            store.cleanup().await;
            result
        }
        Commands::Deployment { action } => {
            let cluster = connect_cluster(&config)?;
            match action {
                DeploymentAction::List => {
                    commands::deployment::list(cluster.as_ref(), &namespace).await
                }
                DeploymentAction::Get { name } => {
                    commands::deployment::get(cluster.as_ref(), &namespace, &name).await
                }
                DeploymentAction::Update {
                    name,
                    container,
                    image,
                } => {
                    commands::deployment::update(
                        cluster.as_ref(),
                        &namespace,
                        &name,
                        &container,
                        &image,
                    )
                    .await
                }
            }
        }
        Commands::Serve { port } => {
            let store = resolve_store(&config).await?;
            let cluster = connect_cluster(&config)?;
            let port = port.unwrap_or(config.server.port);
            let result = commands::serve::run(store.clone(), cluster, namespace, port).await;
            store.cleanup().await;
            result
        }
    }
}

/// Resolve the configured datastore once; an unknown type is fatal.
async fn resolve_store(config: &GantryConfig) -> anyhow::Result<Arc<ImageStore>> {
    let registry = StoreRegistry::with_defaults();
    let store = registry
        .resolve(config)
        .await
        .context("could not resolve datastore")?;
    Ok(store)
}

/// Build the cluster connector from the kubeconfig; missing or invalid
/// credentials are fatal.
fn connect_cluster(config: &GantryConfig) -> anyhow::Result<Arc<dyn ClusterApi>> {
    let path = match &config.cluster.kubeconfig {
        Some(path) => path.clone(),
        None => kubeconfig::default_path()?,
    };
    let credentials = kubeconfig::load(&path)?;
    let connection = KubeConnection::connect(&credentials)?;
    Ok(Arc::new(connection))
}
