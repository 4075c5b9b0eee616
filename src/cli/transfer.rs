use crate::config::explorer_tx_url;
use crate::contract::NftContractClient;
use crate::signer::LocalSigner;
use clap::Args;

#[derive(Args)]
pub struct TransferArgs {
    /// Collection holding the token
    pub collection_id: u32,
    /// Token to transfer
    pub token_id: u32,
    /// Recipient account (G...)
    pub recipient: String,
    /// Secret key (S...) of the current owner
    pub secret: String,
}

pub async fn run(contract: &NftContractClient, args: TransferArgs) -> anyhow::Result<()> {
    let signer = LocalSigner::from_secret(&args.secret)?;
    let from = signer.address();

    let tx = contract
        .build_transfer(&from, &args.recipient, args.collection_id, args.token_id)
        .await?;
    let confirmation = contract.execute(tx, &signer).await?;

    println!("NFT transferred.");
    println!(
        "  token:    {}/{}",
        args.collection_id, args.token_id
    );
    println!("  from:     {from}");
    println!("  to:       {}", args.recipient);
    println!("  tx hash:  {}", confirmation.tx_hash);
    println!("  explorer: {}", explorer_tx_url(&confirmation.tx_hash));
    Ok(())
}
