//! zonewatch - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `zonewatch run` | Start the scheduler and publisher (default) |
//! | `zonewatch analyze <zone>` | Analyze one zone now and print the result |
//! | `zonewatch check-config` | Validate configuration and print the effective file |
//! | `zonewatch status` | List configured providers and zones |

use clap::Parser;
use zonewatch::cli::{Cli, execute};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    execute(cli).await
}
