use roku_ecp::{DiscoveryOptions, Roku};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = DiscoveryOptions::default()
        .with_timeout(Duration::from_secs(3))
        .with_retries(2);

    let rokus = Roku::discover(&options).await?;
    if rokus.is_empty() {
        println!("No Roku found on the local network");
        return Ok(());
    }

    for roku in &rokus {
        let kind = if roku.is_tv() { "TV" } else { "player" };
        println!("{} ({})", roku.id(), kind);

        match roku.device_info().await {
            Ok(info) => println!("  {}", info),
            Err(e) => println!("  device info unavailable: {}", e),
        }

        if let Some(tv) = roku.tv() {
            match tv.current_power_mode().await {
                Ok(mode) => println!("  power mode: {}", mode),
                Err(e) => println!("  power mode unavailable: {}", e),
            }
        }

        match roku.current_app().await {
            Ok(Some(app)) => println!("  running: {}", app),
            Ok(None) => println!("  running: home screen"),
            Err(e) => println!("  active app unavailable: {}", e),
        }

        for app in roku.apps().await? {
            println!("  - {}", app);
        }
    }

    Ok(())
}
