use crate::backend::select_backend;
use anyhow::Result;
use deskpilot_runtime::PilotConfig;
use deskpilot_tools::DeviceBackend;

pub async fn run(config: &PilotConfig) -> Result<()> {
    println!("🏥 Deskpilot check\n");
    let mut healthy = true;

    print!("🖥️  Device backend... ");
    match select_backend(config.backend, config.device_timeout_ms) {
        Ok(backend) => match backend.check().await {
            Ok(()) => println!("✓ ({})", backend.name()),
            Err(e) => {
                println!("✗ ({}: {})", backend.name(), e);
                healthy = false;
            }
        },
        Err(e) => {
            println!("✗ ({})", e);
            healthy = false;
        }
    }

    print!("🔑 API key... ");
    match config.require_api_key() {
        Ok(_) => println!("✓"),
        Err(e) => {
            println!("✗ ({})", e);
            healthy = false;
        }
    }

    println!(
        "📐 Logical display: {}x{}",
        config.display.width, config.display.height
    );
    println!("🧠 Model: {}", config.model);

    println!();
    if healthy {
        println!("✅ All checks passed");
        Ok(())
    } else {
        anyhow::bail!("Check failed");
    }
}
