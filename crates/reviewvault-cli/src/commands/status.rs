use super::config::load_run_config;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use review_sync_store::{MongoReviewStore, ReviewStore};
use serde_json::json;

pub async fn run_status(limit: i64, output: &Output) -> Result<()> {
    let config = load_run_config()?;

    let store = MongoReviewStore::connect(&config.storage)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to storage: {}", e))?;

    let total = store
        .count()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to count stored reviews: {}", e))?;
    let checkpoint = store
        .latest_review_date()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load checkpoint: {}", e))?;
    let recent = store
        .recent(limit)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load recent reviews: {}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut summary_table = Table::new();
            summary_table.set_header(vec![Cell::new("Review Storage")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            summary_table.add_row(vec![
                Cell::new("Profile"),
                Cell::new(&config.source.profile),
            ]);
            summary_table.add_row(vec![
                Cell::new("Collection"),
                Cell::new(format!(
                    "{}.{}",
                    config.storage.database, config.storage.collection
                )),
            ]);
            summary_table.add_row(vec![
                Cell::new("Stored Reviews"),
                Cell::new(total.to_string()),
            ]);
            summary_table.add_row(vec![
                Cell::new("Checkpoint"),
                Cell::new(
                    checkpoint
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "<none>".to_string()),
                ),
            ]);
            summary_table.load_preset(comfy_table::presets::UTF8_FULL);
            summary_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", summary_table);
            println!();

            if recent.is_empty() {
                output.info("No reviews stored yet. Run 'reviewvault harvest' to seed the collection.");
            } else {
                let mut recent_table = Table::new();
                recent_table.set_header(vec![
                    Cell::new("Date").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Name").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Message").add_attribute(comfy_table::Attribute::Bold),
                ]);
                for review in &recent {
                    recent_table.add_row(vec![
                        Cell::new(
                            review
                                .date
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                        ),
                        Cell::new(
                            review
                                .rating
                                .map(|r| r.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                        ),
                        Cell::new(review.name.as_deref().unwrap_or("-")),
                        Cell::new(truncate(review.message.as_deref().unwrap_or("-"), 60)),
                    ]);
                }
                recent_table.load_preset(comfy_table::presets::UTF8_FULL);
                recent_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                println!("{}", recent_table);
            }
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            let json_status = json!({
                "profile": config.source.profile,
                "database": config.storage.database,
                "collection": config.storage.collection,
                "stored_reviews": total,
                "checkpoint": checkpoint.map(|d| d.to_string()),
                "recent": recent,
            });
            output.json(&json_status);
        }
    }

    Ok(())
}

/// Shorten long messages to keep the table readable; cuts on a character
/// boundary so multibyte text cannot split mid-codepoint.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("great tool", 60), "great tool");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "a".repeat(80);
        let result = truncate(&long, 60);

        assert_eq!(result.len(), 63);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte_text() {
        let text = "отличный продукт, рекомендую всем";
        let result = truncate(text, 10);

        assert_eq!(result, "отличный п...");
    }
}
