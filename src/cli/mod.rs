//! Command-line interface for the Guarana NFT contract.
//!
//! Each subcommand drives the same pipeline as the HTTP gateway, but signs
//! locally with a secret key passed on the command line instead of handing
//! the envelope to a wallet.

mod create;
mod mint;
mod query;
mod transfer;

use crate::config::Config;
use crate::contract::NftContractClient;
use crate::rpc::SorobanRpc;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "guarana", about = "NFT collections on Soroban", version)]
pub struct Cli {
    /// Soroban RPC endpoint override
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Network passphrase override
    #[arg(long, global = true)]
    network_passphrase: Option<String>,

    /// Contract id override (C...)
    #[arg(long, global = true)]
    contract_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new NFT collection
    CreateCollection(create::CreateCollectionArgs),
    /// Mint an NFT into an existing collection
    Mint(mint::MintArgs),
    /// Transfer an NFT to another account
    Transfer(transfer::TransferArgs),
    /// Read contract state without submitting anything
    #[command(subcommand)]
    Query(query::QueryCommand),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(rpc_url) = self.rpc_url {
            config.rpc_url = rpc_url;
        }
        if let Some(passphrase) = self.network_passphrase {
            config.network_passphrase = passphrase;
        }
        if let Some(contract_id) = self.contract_id {
            config.contract_id = contract_id;
        }
        let rpc = Arc::new(SorobanRpc::new(&config.rpc_url));
        let contract = NftContractClient::new(rpc, config.network());

        match self.command {
            Commands::CreateCollection(args) => create::run(&contract, args).await,
            Commands::Mint(args) => mint::run(&contract, args).await,
            Commands::Transfer(args) => transfer::run(&contract, args).await,
            Commands::Query(command) => query::run(&contract, command).await,
        }
    }
}
