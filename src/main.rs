#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    market_clock::run().await
}
