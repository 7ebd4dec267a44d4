//! apigw-openapi CLI
//!
//! Command-line interface for exporting OpenAPI documents with Amazon API
//! Gateway integrations from a route manifest.

use anyhow::{Context, Result};
use apigw_openapi_authorizers::SecurityScheme;
use apigw_openapi_common::CorsConfig;
use apigw_openapi_export::{ExportPipeline, FsSink, OutputTarget};
use apigw_openapi_router::openapi::{DEFAULT_OPENAPI_VERSION, DEFAULT_TITLE, DEFAULT_VERSION};
use apigw_openapi_router::{DocumentInfo, Manifest};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apigw-openapi")]
#[command(version, about = "Export OpenAPI documents with Amazon API Gateway integrations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the private and public OpenAPI documents of a router
    #[command(after_help = "EXAMPLES:\n  \
        # Public document on stdout\n  \
        apigw-openapi export routes.yaml\n\n  \
        # Both documents to files, one router out of several\n  \
        apigw-openapi export routes.yaml \\\n    \
        --router users \\\n    \
        --title \"Users API\" -V 1.2.0 \\\n    \
        --out-public public.json \\\n    \
        --out-private private.json\n\n  \
        # Restrict CORS origins\n  \
        CORS_ORIGINS=https://app.example.com apigw-openapi export routes.yaml")]
    Export {
        /// Route manifest (.yaml, .yml or .json)
        manifest: PathBuf,

        /// Router to export (required when the manifest declares several)
        #[arg(long)]
        router: Option<String>,

        /// Title of the API
        #[arg(short, long, default_value = DEFAULT_TITLE)]
        title: String,

        /// Version of the API
        #[arg(short = 'V', long = "api-version", default_value = DEFAULT_VERSION)]
        api_version: String,

        /// Description of the API
        #[arg(long)]
        description: Option<String>,

        /// Public document, API Gateway extensions removed ("-" for stdout)
        #[arg(long, default_value = "-")]
        out_public: String,

        /// Private document with every API Gateway extension
        #[arg(long)]
        out_private: Option<String>,

        /// Include CORS pre-flight routes and response headers (default)
        #[arg(long, overrides_with = "no_cors")]
        cors: bool,

        /// Leave CORS out of the documents
        #[arg(long, overrides_with = "cors")]
        no_cors: bool,

        /// OpenAPI version written to the documents
        #[arg(long, env = "OPENAPI_VERSION", default_value = DEFAULT_OPENAPI_VERSION)]
        openapi_version: String,

        /// Comma-separated allowed origins
        #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
        cors_origins: String,
    },

    /// Validate a manifest and list its routes
    Check {
        /// Route manifest (.yaml, .yml or .json)
        manifest: PathBuf,

        /// Only check this router
        #[arg(long)]
        router: Option<String>,
    },
}

struct ExportConfig<'a> {
    manifest: &'a Path,
    router: Option<&'a str>,
    info: DocumentInfo,
    out_public: &'a str,
    out_private: Option<&'a str>,
    cors: Option<CorsConfig>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            manifest,
            router,
            title,
            api_version,
            description,
            out_public,
            out_private,
            cors: _,
            no_cors,
            openapi_version,
            cors_origins,
        } => {
            let info = DocumentInfo {
                title,
                version: api_version,
                openapi_version,
                description,
            };
            export_command(ExportConfig {
                manifest: manifest.as_path(),
                router: router.as_deref(),
                info,
                out_public: &out_public,
                out_private: out_private.as_deref(),
                cors: (!no_cors).then(|| CorsConfig::from_origins_csv(&cors_origins)),
            })
        }
        Commands::Check { manifest, router } => {
            check_command(manifest.as_path(), router.as_deref(), cli.verbose)
        }
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    eprintln!("{} Loading manifest: {}", "→".cyan(), path.display());
    Manifest::from_path(path).with_context(|| format!("Failed to load manifest {}", path.display()))
}

fn export_command(config: ExportConfig) -> Result<()> {
    let manifest = load_manifest(config.manifest)?;
    let name = manifest
        .select(config.router)
        .context("No router to export")?;
    eprintln!("{} Using router: {}", "→".cyan(), name.yellow());

    let router = manifest
        .build_router(name)
        .with_context(|| format!("Failed to build router '{}'", name))?;
    debug!(routes = router.routes().len(), "router ready");

    let public: OutputTarget = config
        .out_public
        .parse()
        .context("Invalid --out-public")?;
    let private: Option<OutputTarget> = config
        .out_private
        .map(str::parse)
        .transpose()
        .context("Invalid --out-private")?;

    let mut pipeline = ExportPipeline::new(config.info);
    if let Some(cors) = config.cors {
        eprintln!(
            "{} CORS enabled for origins: {}",
            "→".cyan(),
            cors.origin_value().yellow()
        );
        pipeline = pipeline.with_cors(cors);
    }

    let docs = pipeline
        .build(&router)
        .context("Failed to build OpenAPI document")?;
    pipeline
        .write(&docs, &mut FsSink, &public, private.as_ref())
        .context("Failed to write OpenAPI documents")?;

    if let Some(private) = &private {
        eprintln!("{} Private document: {}", "✓".green(), private);
    }
    eprintln!("{} Public document: {}", "✓".green(), public);
    eprintln!("\n{}", "✓ Export complete!".green().bold());

    Ok(())
}

fn check_command(path: &Path, router: Option<&str>, verbose: bool) -> Result<()> {
    let manifest = load_manifest(path)?;

    let names: Vec<String> = match router {
        Some(name) => vec![manifest.select(Some(name))?.to_string()],
        None => manifest.router_names().map(String::from).collect(),
    };

    let mut total = 0;
    for name in &names {
        let router = manifest
            .build_router(name)
            .with_context(|| format!("Failed to build router '{}'", name))?;
        router
            .openapi(&DocumentInfo::default())
            .with_context(|| format!("Failed to render router '{}'", name))?;

        println!("\n{} ({} routes)", name.bold(), router.routes().len());
        for route in router.routes() {
            println!(
                "  • {:<7} {} {}",
                route.method().to_string().cyan(),
                route.path(),
                route.integration_type().unwrap_or("-").yellow()
            );
            if verbose {
                println!("    endpoint: {}", route.endpoint());
                if !route.authorizers().is_empty() {
                    let names: Vec<&str> = route
                        .authorizers()
                        .iter()
                        .map(|a| a.scheme_name())
                        .collect();
                    println!("    authorizers: {}", names.join(", "));
                }
            }
        }
        total += router.routes().len();
    }

    println!(
        "\n{} {} routers, {} routes",
        "✓ Manifest is valid:".green().bold(),
        names.len(),
        total
    );
    Ok(())
}
