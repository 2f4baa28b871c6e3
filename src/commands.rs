use anyhow::{Context, Result};

use rocisc::compare::compare;
use rocisc::format::{print_comparison, print_stats, OutputFormat};
use rocisc::{ImageReference, Platform, RegistryClient};

pub async fn show_stats(
    registry: &RegistryClient,
    platform: &Platform,
    images: &[ImageReference],
    format: OutputFormat,
) -> Result<()> {
    let stats = registry
        .get_all_image_statistics(platform, images)
        .await
        .context(format!("Failed to get statistics for {platform}"))?;

    print_stats(&stats, format)?;

    Ok(())
}

pub async fn compare_images(
    registry: &RegistryClient,
    platform: &Platform,
    before: &ImageReference,
    after: &ImageReference,
    format: OutputFormat,
) -> Result<()> {
    let (before_stats, after_stats) = tokio::try_join!(
        registry.get_image_statistics(platform, before),
        registry.get_image_statistics(platform, after),
    )
    .context(format!("Failed to compare {before} with {after}"))?;

    let comparison = compare(&before_stats, &after_stats);
    print_comparison(&comparison, format)?;

    Ok(())
}
