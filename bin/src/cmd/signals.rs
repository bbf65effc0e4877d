//! Signal listing command implementation.

use anyhow::Result;
use ronda_signals::registry::{available_categories, signals_by_category};

/// List available signals, optionally filtered by category.
pub(crate) fn list_signals(category: Option<&str>, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Factors                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for cat in available_categories() {
        let cat_name = format!("{cat:?}");
        if let Some(filter) = category
            && !cat_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        println!("{cat_name}: {}", cat.description());
        println!("{}", "-".repeat(60));

        for info in signals_by_category(&cat) {
            if verbose {
                println!(
                    "  {:12} - {} (lookback: {} months{}{})",
                    info.name,
                    info.description,
                    info.typical_lookback_months,
                    if info.requires_fundamentals { ", fundamentals" } else { "" },
                    if info.higher_is_better { "" } else { ", lower is better" },
                );
            } else {
                println!("  {}", info.name);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for detailed factor descriptions.\n");
    }

    Ok(())
}
