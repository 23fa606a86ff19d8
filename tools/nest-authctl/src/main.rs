//! nest-authctl: operator CLI for internal service trust.
//!
//! Usage:
//!   nest-authctl keygen --out-dir ./keys
//!   nest-authctl issue --public-key ./keys/public.pem --service billing
//!   nest-authctl verify --private-key ./keys/private.pem <token>
//!   nest-authctl seal-claim --public-key ./keys/public.pem --user-id 42
//!   nest-authctl serve --config trust.toml --listen 127.0.0.1:8080

use anyhow::Result;
use clap::{Parser, Subcommand};
use nest_authctl::commands;
use nest_service_auth::domain::config::parse_duration;
use nest_telemetry::{init_logging, TelemetryConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "nest-authctl")]
#[command(about = "Keys, service tokens and gateway claims for internal service trust")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key pair (public.pem + private.pem)
    Keygen {
        /// Modulus size in bits
        #[arg(long, default_value_t = 2048)]
        bits: usize,

        /// Directory to write the PEM files into
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Issue a service token
    Issue {
        /// SPKI public key PEM
        #[arg(long)]
        public_key: PathBuf,

        /// Name of the calling service, embedded in the claim
        #[arg(long)]
        service: Option<String>,

        /// Token lifetime (e.g. 10s, 500ms, 2m)
        #[arg(long, default_value = "10s", value_parser = parse_duration)]
        ttl: Duration,
    },
    /// Validate a service token and print its claim
    Verify {
        /// PKCS#1 private key PEM
        #[arg(long)]
        private_key: PathBuf,

        /// Token lifetime the verifier expects
        #[arg(long, default_value = "10s", value_parser = parse_duration)]
        ttl: Duration,

        /// Token to validate
        token: String,
    },
    /// Seal a gateway identity claim into a header value
    SealClaim {
        /// SPKI public key PEM
        #[arg(long)]
        public_key: PathBuf,

        /// Authenticated user id
        #[arg(long)]
        user_id: u64,

        /// Mark the user as admin
        #[arg(long)]
        admin: bool,
    },
    /// Serve /health and trust-protected /internal routes
    Serve {
        /// TOML trust configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        listen: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { bits, out_dir } => {
            let written = commands::keys::keygen(bits, &out_dir)?;
            println!("{}", written.public.display());
            println!("{}", written.private.display());
        }

        Commands::Issue {
            public_key,
            service,
            ttl,
        } => println!(
            "{}",
            commands::tokens::issue(&public_key, service.as_deref(), ttl)?
        ),

        Commands::Verify {
            private_key,
            ttl,
            token,
        } => {
            let claim = commands::tokens::verify(&private_key, ttl, &token)?;
            println!("{}", serde_json::to_string_pretty(&claim)?);
        }

        Commands::SealClaim {
            public_key,
            user_id,
            admin,
        } => println!(
            "{}",
            commands::tokens::seal_claim(&public_key, user_id, admin)?
        ),

        Commands::Serve { config, listen } => {
            init_logging(&TelemetryConfig::for_service("nest-authctl"))?;
            commands::serve::serve(config.as_deref(), listen).await?
        }
    }

    Ok(())
}
