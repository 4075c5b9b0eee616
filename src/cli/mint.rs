use crate::config::explorer_tx_url;
use crate::contract::NftContractClient;
use crate::signer::LocalSigner;
use clap::Args;

#[derive(Args)]
pub struct MintArgs {
    /// Collection to mint into
    pub collection_id: u32,
    /// Recipient account (G...)
    pub recipient: String,
    /// Secret key (S...) of the minter account
    pub secret: String,
    /// Metadata URI stored on chain with the token
    pub metadata_uri: Option<String>,
}

pub async fn run(contract: &NftContractClient, args: MintArgs) -> anyhow::Result<()> {
    let signer = LocalSigner::from_secret(&args.secret)?;
    let minter = signer.address();

    let (tx, preview) = contract
        .build_mint(
            &minter,
            args.collection_id,
            &args.recipient,
            args.metadata_uri.as_deref(),
        )
        .await?;
    let confirmation = contract.execute(tx, &signer).await?;

    println!("NFT minted.");
    println!("  collection: {}", args.collection_id);
    println!("  token id:   {}", preview.expected_token_id);
    println!("  owner:      {}", args.recipient);
    if !preview.expected_uri.is_empty() {
        println!("  uri:        {}", preview.expected_uri);
    }
    println!("  tx hash:    {}", confirmation.tx_hash);
    println!("  explorer:   {}", explorer_tx_url(&confirmation.tx_hash));
    Ok(())
}
