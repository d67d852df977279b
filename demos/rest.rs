use discordbots_group_rs::RestClient;

/// Query the REST API; DBG_BOT_ID is required, DBG_TOKENS enables authenticated calls
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("🦀 Testing the discordbots.group REST API\n");

    let bot_id = std::env::var("DBG_BOT_ID").expect("DBG_BOT_ID must be set in .env");
    let token = std::env::var("DBG_TOKENS")
        .ok()
        .and_then(|tokens| tokens.split(',').next().map(|t| t.trim().to_string()));

    let client = RestClient::new(bot_id, token.clone())?;

    println!("📊 Stats: {}", client.get_stats().await?);
    println!("🤖 Current bot: {}\n", client.get_current().await?);

    if token.is_some() {
        println!("✅ Updating server count...");
        client.update_count(1).await?;

        let votes = client.get_votes().await?;
        println!("🗳  Votes: {}", votes);
    } else {
        println!("💡 Set DBG_TOKENS to try update_count and get_votes");
    }

    println!("\n🎉 Done!");

    Ok(())
}
