use crate::contract::NftContractClient;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum QueryCommand {
    /// Number of collections created so far
    TotalCollections,
    /// Collection metadata
    Collection {
        collection_id: u32,
    },
    /// Number of tokens minted in a collection
    TotalTokens {
        collection_id: u32,
    },
    /// Token owner and display URI
    Token {
        collection_id: u32,
        token_id: u32,
    },
    /// Current owner of a token
    Owner {
        collection_id: u32,
        token_id: u32,
    },
    /// All tokens held by an account
    Tokens {
        /// Account address (G...)
        address: String,
    },
}

pub async fn run(contract: &NftContractClient, command: QueryCommand) -> anyhow::Result<()> {
    let query = contract.query();
    match command {
        QueryCommand::TotalCollections => {
            println!("{}", query.total_collections().await?);
        }
        QueryCommand::Collection { collection_id } => {
            match query.get_collection(collection_id).await? {
                Some(collection) => {
                    println!("name:     {}", collection.name);
                    println!("symbol:   {}", collection.symbol);
                    println!("owner:    {}", collection.owner);
                    println!(
                        "base uri: {}",
                        collection.base_uri.as_deref().unwrap_or("(none)")
                    );
                }
                None => println!("collection {collection_id} not found"),
            }
        }
        QueryCommand::TotalTokens { collection_id } => {
            println!("{}", query.total_tokens_in_collection(collection_id).await?);
        }
        QueryCommand::Token {
            collection_id,
            token_id,
        } => match query.get_token(collection_id, token_id).await? {
            Some(token) => {
                println!("owner: {}", token.owner);
                println!("uri:   {}", token.uri);
            }
            None => println!("token {collection_id}/{token_id} not found"),
        },
        QueryCommand::Owner {
            collection_id,
            token_id,
        } => match query.owner_of(collection_id, token_id).await? {
            Some(owner) => println!("{owner}"),
            None => println!("token {collection_id}/{token_id} has no owner"),
        },
        QueryCommand::Tokens { address } => {
            let tokens = query.tokens_of(&address).await?;
            if tokens.is_empty() {
                println!("no tokens held by {address}");
            }
            for id in tokens {
                println!("{}/{}", id.collection_id, id.token_id);
            }
        }
    }
    Ok(())
}
