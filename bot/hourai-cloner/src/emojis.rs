use crate::{cloner::CloneContext, guild::GuildSnapshot, stats::PhaseReport};
use anyhow::Result;
use hourai::models::id::GuildId;

pub async fn clone_emojis(
    ctx: &CloneContext<'_>,
    source: &GuildSnapshot,
    target: GuildId,
) -> PhaseReport {
    ctx.progress.send("😀 Cloning emojis...").await;

    let mut report = PhaseReport::default();
    for emoji in source.emojis.iter() {
        match upload_emoji(ctx, target, &emoji.name, &emoji.url).await {
            Ok(()) => {
                report.success();
                // The emoji endpoints are far more strictly rate limited.
                tokio::time::sleep(ctx.config.emoji_delay()).await;
            }
            Err(err) => {
                tracing::warn!("Failed to clone emoji {} ({}): {}", emoji.name, emoji.id, err);
                report.failure();
            }
        }
    }
    report
}

async fn upload_emoji(ctx: &CloneContext<'_>, target: GuildId, name: &str, url: &str) -> Result<()> {
    let image = ctx.assets.fetch_data_uri(url).await?;
    ctx.service.create_emoji(target, name, &image).await?;
    Ok(())
}
