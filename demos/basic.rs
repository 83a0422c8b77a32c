//! Basic example demonstrating the Weblate API client.
//!
//! Run with:
//! ```
//! WLC_URL=https://hosted.weblate.org/api/ WLC_KEY=your-key cargo run --example basic
//! ```

use wlc::{Changes, Config, Weblate};

fn main() -> wlc::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Configuration files first, environment on top
    let config = Config::load(None, "weblate")?.with_overrides(
        std::env::var("WLC_URL").ok(),
        std::env::var("WLC_KEY").ok(),
    );
    let weblate = Weblate::from_config(&config)?;
    println!("Connected to: {}", config.url);

    // First few projects; later pages are never requested
    println!("\n--- Listing Projects ---");
    let mut first = None;
    for project in weblate.list_projects().take(5) {
        let project = project?;
        println!("  - {} ({})", project.name()?, project.slug()?);
        first.get_or_insert(project);
    }

    let Some(mut project) = first else {
        println!("No projects found");
        return Ok(());
    };

    println!("\n--- Components of {} ---", project.slug()?);
    let mut component = None;
    for item in project.list_components()?.take(5) {
        let item = item?;
        println!("  - {}", item.full_slug()?);
        component.get_or_insert(item);
    }

    if let Some(mut component) = component {
        println!("\n--- Translations of {} ---", component.full_slug()?);
        for translation in component.list_translations()?.take(10) {
            let mut translation = translation?;
            let stats = translation.statistics()?;
            println!(
                "  {:<8} {:>6.1}% translated ({} of {})",
                translation.language_code()?,
                stats.translated_percent,
                stats.translated,
                stats.total
            );
        }
    }

    println!("\n--- Recent Changes ---");
    for change in project.list_changes()?.take(5) {
        let change = change?;
        println!("  {} {}", change.timestamp()?, change.action_name()?);
    }

    println!("\nDone!");
    Ok(())
}
