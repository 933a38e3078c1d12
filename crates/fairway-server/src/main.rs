//! Development server: in-memory repository seeded with demo data.

use std::sync::Arc;

use fairway::GatewayServerBuilder;
use fairway_protocol::GameMode;
use fairway_store::{MemStore, Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(MemStore::new());

    // Demo data so a freshly started server is immediately playable.
    let alice = store.create_user("Player1").await?;
    let bob = store.create_user("Player2").await?;
    let game = store
        .create_game(alice.id, "Sunday round", GameMode::TwoPlayer, 0)
        .await?;
    store.add_player(game.id, alice.id, 0).await?;
    store.add_player(game.id, bob.id, 0).await?;

    let addr = std::env::var("FAIRWAY_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    tracing::info!(%addr, game_id = %game.id, "starting fairway server");

    let server = GatewayServerBuilder::new().bind(&addr).build(store).await?;
    server.run().await?;
    Ok(())
}
