use crate::config::explorer_tx_url;
use crate::contract::NftContractClient;
use crate::signer::LocalSigner;
use clap::Args;

#[derive(Args)]
pub struct CreateCollectionArgs {
    /// Collection name
    pub name: String,
    /// Collection symbol (3-10 characters)
    pub symbol: String,
    /// Base URI prepended to token ids for display. Pass "" for none.
    pub base_uri: String,
    /// Secret key (S...) of the creator account
    pub secret: String,
}

pub async fn run(contract: &NftContractClient, args: CreateCollectionArgs) -> anyhow::Result<()> {
    let signer = LocalSigner::from_secret(&args.secret)?;
    let creator = signer.address();

    // An empty base URI on the command line means "no base URI".
    let base_uri = Some(args.base_uri.as_str()).filter(|s| !s.is_empty());

    let (tx, preview) = contract
        .build_create_collection(&creator, &args.name, &args.symbol, base_uri)
        .await?;
    let confirmation = contract.execute(tx, &signer).await?;

    println!("Collection created.");
    println!("  creator:       {creator}");
    println!("  name:          {} ({})", args.name, args.symbol);
    println!("  collection id: {}", preview.expected_collection_id);
    println!("  tx hash:       {}", confirmation.tx_hash);
    println!("  explorer:      {}", explorer_tx_url(&confirmation.tx_hash));
    Ok(())
}
