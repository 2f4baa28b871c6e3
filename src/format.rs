use bytesize::ByteSize;
use clap::ValueEnum;
use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

use crate::models::{Comparison, ImageStatistics, ImageSummary};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

const STATS_HEADER: [&str; 5] = [
    "Image",
    "Num Layers",
    "Compressed Size",
    "Uncompressed Size",
    "Space Savings",
];

pub fn format_size(bytes: u64) -> String {
    ByteSize(bytes).to_string_as(true)
}

pub fn format_size_delta(delta: i64) -> String {
    if delta == 0 {
        "unchanged".to_string()
    } else if delta > 0 {
        format!("+{}", format_size(delta as u64)).red().to_string()
    } else {
        format!("-{}", format_size(delta.unsigned_abs()))
            .green()
            .to_string()
    }
}

pub fn format_count_delta(delta: i64) -> String {
    match delta {
        0 => "unchanged".to_string(),
        d if d > 0 => format!("+{d}").red().to_string(),
        d => d.to_string().green().to_string(),
    }
}

/// Percentage with at most 4 significant digits, e.g. `0.63142` as `63.14%`.
pub fn format_percent(ratio: f64) -> String {
    let percent = ratio * 100.0;
    if percent == 0.0 || !percent.is_finite() {
        return format!("{percent}%");
    }
    let integer_digits = percent.abs().log10().floor() as i32 + 1;
    let decimals = (4 - integer_digits).max(0) as usize;
    let text = format!("{percent:.decimals$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    format!("{text}%")
}

fn summary_record(summary: &ImageSummary) -> [String; 5] {
    [
        summary.image.clone(),
        summary.layers.to_string(),
        format_size(summary.compressed_size),
        format_size(summary.uncompressed_size),
        format_percent(summary.space_savings),
    ]
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

/// One row per image, in the given order.
pub fn stats_table(stats: &[ImageStatistics]) -> String {
    let mut builder = Builder::default();
    builder.push_record(STATS_HEADER);
    for image in stats {
        builder.push_record(summary_record(&image.summary()));
    }
    render(builder)
}

pub fn comparison_table(comparison: &Comparison) -> String {
    let mut builder = Builder::default();
    builder.push_record(STATS_HEADER);
    builder.push_record(summary_record(&comparison.before));
    builder.push_record(summary_record(&comparison.after));
    builder.push_record([
        "Change".to_string(),
        format_count_delta(comparison.layers_delta),
        format_size_delta(comparison.compressed_delta),
        format_size_delta(comparison.uncompressed_delta),
        format!("{:+.2} pp", comparison.savings_delta),
    ]);
    render(builder)
}

pub fn print_stats(stats: &[ImageStatistics], format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Table => {
            println!("\n{}", "Image Statistics".bold().underline());
            println!("{}", stats_table(stats));
        }
        OutputFormat::Json => {
            let summaries: Vec<ImageSummary> = stats.iter().map(|s| s.summary()).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }
    Ok(())
}

pub fn print_comparison(comparison: &Comparison, format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Table => {
            println!("\n{}", "Image Comparison".bold().underline());
            println!("Before: {}", comparison.before.image.bright_cyan());
            println!("After: {}", comparison.after.image.bright_cyan());
            println!("{}", comparison_table(comparison));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(comparison)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use crate::models::LayerSize;
    use crate::reference::ImageReference;

    fn ubuntu() -> ImageStatistics {
        ImageStatistics::new(
            ImageReference::new("library/ubuntu", "24.04"),
            &[LayerSize {
                compressed: 29_716_000,
                uncompressed: 80_625_303,
            }],
            1_632,
        )
    }

    #[test]
    fn percent_significant_digits() {
        assert_eq!(format_percent(1.0 - 29_717_632.0 / 80_626_935.0), "63.14%");
        assert_eq!(format_percent(0.5), "50%");
        assert_eq!(format_percent(0.001234), "0.1234%");
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(1.0), "100%");
    }

    #[test]
    fn deltas_without_color() {
        colored::control::set_override(false);
        assert_eq!(format_size_delta(0), "unchanged");
        assert!(format_size_delta(2_048).starts_with('+'));
        assert!(format_size_delta(-2_048).starts_with('-'));
        assert_eq!(format_count_delta(2), "+2");
        assert_eq!(format_count_delta(-2), "-2");
    }

    #[test]
    fn stats_table_rows() {
        let table = stats_table(&[ubuntu()]);
        assert!(table.contains("Num Layers"));
        assert!(table.contains("library/ubuntu:24.04"));
        assert!(table.contains("63.14%"));
        assert_eq!(table.lines().filter(|l| l.contains("library/")).count(), 1);
    }

    #[test]
    fn comparison_table_has_change_row() {
        colored::control::set_override(false);
        let before = ubuntu();
        let after = ImageStatistics::new(
            ImageReference::new("library/ubuntu", "25.04"),
            &[LayerSize {
                compressed: 29_716_000,
                uncompressed: 80_625_303,
            }],
            1_632,
        );
        let table = comparison_table(&compare(&before, &after));
        assert!(table.contains("library/ubuntu:25.04"));
        assert!(table.contains("Change"));
        assert!(table.contains("+0.00 pp"));
    }
}
