use discordbots_group_rs::{GatewayClient, GatewayOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Create client; handlers are registered before the first connection
    let builder = GatewayClient::builder(GatewayOptions::new(["your-bot-token"]))?;
    builder.events().on_connected(|| println!("Connected!"));
    builder.events().on_upvote(|vote| {
        println!("{} upvoted {}", vote.user, vote.bot);
    });

    println!("Connecting to the discordbots.group gateway...");
    let client = builder.build();

    // Keep connection alive
    tokio::signal::ctrl_c().await?;

    // Disconnect
    println!("Disconnecting...");
    client.shutdown().await;
    println!("Disconnected!");

    Ok(())
}
