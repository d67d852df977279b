use discordbots_group_rs::{ChannelState, GatewayClient, GatewayOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    // Initialize tracing to see heartbeat logs
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Testing Heartbeat Mechanism With discordbots.group\n");

    // DBG_TOKENS is required
    let options = GatewayOptions::from_env()?.with_heartbeat_interval(5);
    println!("📡 Connecting to: {}\n", options.endpoint);

    let acks = Arc::new(AtomicUsize::new(0));
    let builder = GatewayClient::builder(options)?;
    {
        let acks = Arc::clone(&acks);
        builder.events().on_heartbeat_ack(move || {
            let n = acks.fetch_add(1, Ordering::SeqCst) + 1;
            println!("💓 Heartbeat ack #{}", n);
        });
    }
    let client = builder.build();

    println!("✅ Test 1: Connecting with heartbeat enabled...");
    client.wait_for_state(ChannelState::Open).await?;
    println!("✅ Connected!\n");

    println!("⏳ Waiting 16 seconds to observe heartbeats...");
    println!("   (Watch for 'Sent heartbeat' in logs)\n");

    tokio::time::sleep(Duration::from_secs(16)).await;
    println!("📋 Received {} heartbeat acks", acks.load(Ordering::SeqCst));

    println!("\n✅ Test 2: Shutting down (should stop heartbeats)...");
    client.shutdown().await;
    println!("✅ Shut down!\n");

    let before = acks.load(Ordering::SeqCst);
    println!("⏳ Waiting 6 seconds to confirm heartbeat stopped...");
    tokio::time::sleep(Duration::from_secs(6)).await;
    if acks.load(Ordering::SeqCst) != before {
        return Err("Heartbeats continued after shutdown".into());
    }
    println!("✅ No more heartbeats - timer was properly disarmed!\n");

    println!("🎉 All tests passed!");

    Ok(())
}
