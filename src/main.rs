//! safe-batcher CLI
//!
//! Assembles multisig transaction batches, signs their digests, and
//! drives signature collection against a remote queue service. A command
//! ends in exactly one of: its result on stdout with exit code 0, or an
//! error message on stderr with a nonzero exit code.

use clap::{Parser, Subcommand};
use safe_batcher::cli::{self, CliResult};
use safe_batcher::crypto::Address;
use safe_batcher::gateway::HttpQueueGateway;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "safe-batcher")]
#[command(version = "0.1.0")]
#[command(about = "Off-chain multisig batch assembly and signature collection", long_about = None)]
struct Cli {
    /// Base URL of the transaction-queue service
    #[arg(long, default_value = "http://localhost:8100")]
    queue_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the digest of a batch file
    Hash {
        /// Batch specification (JSON)
        batch: PathBuf,
    },

    /// Sign a batch file or a raw digest with a local private key
    Sign {
        /// Batch specification (JSON)
        #[arg(short, long, conflicts_with = "digest")]
        batch: Option<PathBuf>,

        /// 32-byte digest as hex
        #[arg(short, long)]
        digest: Option<String>,

        /// Hex-encoded private key
        #[arg(short, long)]
        key: String,

        /// Sign the personal-message-prefixed digest instead of the raw one
        #[arg(long)]
        eth_sign: bool,
    },

    /// Build a proposal from a batch file, sign it, and submit it
    Propose {
        /// Batch specification (JSON)
        batch: PathBuf,

        /// Hex-encoded private keys to sign with (repeatable)
        #[arg(short, long = "key")]
        keys: Vec<String>,

        /// Required number of signatures
        #[arg(short, long, default_value = "1")]
        threshold: usize,
    },

    /// List pending batches the queue service holds for a contract
    Pending {
        /// EIP-155 chain id
        #[arg(short, long)]
        chain_id: u64,

        /// Multisig contract address
        #[arg(short = 'a', long)]
        contract: Address,
    },

    /// Withdraw a proposal from the queue service
    Delete {
        /// Proposal id assigned by the queue service
        proposal_id: String,
    },

    /// Report collection progress for a batch file and signature blobs
    Status {
        /// Batch specification (JSON)
        batch: PathBuf,

        /// Required number of signatures
        #[arg(short, long, default_value = "1")]
        threshold: usize,

        /// 65-byte signatures as hex (repeatable)
        #[arg(short, long = "signature")]
        signatures: Vec<String>,
    },
}

async fn run(cli: Cli) -> CliResult<String> {
    let gateway = HttpQueueGateway::new(&cli.queue_url);

    match cli.command {
        Commands::Hash { batch } => cli::cmd_hash(&batch),
        Commands::Sign {
            batch,
            digest,
            key,
            eth_sign,
        } => cli::cmd_sign(batch.as_deref(), digest.as_deref(), &key, eth_sign).await,
        Commands::Propose {
            batch,
            keys,
            threshold,
        } => cli::cmd_propose(&gateway, &batch, &keys, threshold).await,
        Commands::Pending { chain_id, contract } => {
            cli::cmd_pending(&gateway, chain_id, &contract).await
        }
        Commands::Delete { proposal_id } => cli::cmd_delete(&gateway, &proposal_id).await,
        Commands::Status {
            batch,
            threshold,
            signatures,
        } => cli::cmd_status(&batch, threshold, &signatures),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
