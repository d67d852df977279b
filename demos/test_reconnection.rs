use discordbots_group_rs::{ChannelState, GatewayClient, GatewayOptions};
use std::time::Duration;

/// Test reconnection behavior against the live gateway
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing to see logs
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Testing Reconnection with discordbots.group\n");

    let options = GatewayOptions::from_env()?.with_backoff();
    println!("📡 Connecting to: {}\n", options.endpoint);

    let builder = GatewayClient::builder(options)?;
    builder.events().on_disconnected(|info| {
        println!("\n🔴 Disconnected ({}): {}", info.code, info.reason);
    });
    builder
        .events()
        .on_reconnecting(|| println!("🔄 Reconnecting..."));
    builder.events().on_error(|err| println!("⚠️  {}", err));
    let client = builder.build();

    // Test 1: Connect and verify
    println!("✅ Test 1: Initial connection...");
    client.wait_for_state(ChannelState::Open).await?;
    println!("✅ Connected successfully!\n");

    println!("💡 To test automatic reconnection:");
    println!("   1. While this is running, disable your network");
    println!("   2. Re-enable it after a few seconds");
    println!("   3. Watch the logs for reconnection attempts\n");

    // Monitor connection status for 30 seconds
    let mut states = client.state_changes();
    for i in 1..=30 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let state = *states.borrow_and_update();
        print!(
            "\r⏱  Second {}/30 - Status: {}",
            i,
            if state == ChannelState::Open {
                "🟢 Connected".to_string()
            } else {
                format!("🔴 {}", state)
            }
        );
        std::io::Write::flush(&mut std::io::stdout())?;
    }
    println!("\n");

    // Test 2: Shutdown should NOT trigger reconnection
    println!("✅ Test 2: Shutdown (should NOT auto-reconnect)...");
    client.shutdown().await;

    println!("⏳ Waiting 5 seconds to verify no auto-reconnect...");
    tokio::time::sleep(Duration::from_secs(5)).await;

    if client.state() == ChannelState::Terminated {
        println!("✅ Correctly stayed terminated after shutdown!\n");
    } else {
        return Err("Should NOT reconnect after shutdown".into());
    }

    println!("🎉 Reconnection tests completed!");

    Ok(())
}
