use crate::{cloner::CloneContext, guild::GuildSnapshot, stats::PhaseReport};
use hourai::models::id::GuildId;

/// Copies the icon and name of `source` onto `target`.
pub async fn clone_identity(
    ctx: &CloneContext<'_>,
    source: &GuildSnapshot,
    target: GuildId,
) -> PhaseReport {
    let mut report = PhaseReport::default();

    if let Some(url) = source.icon_url.as_deref() {
        let result = match ctx.assets.fetch_data_uri(url).await {
            Ok(icon) => ctx.service.set_icon(target, &icon).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => report.success(),
            Err(err) => {
                tracing::warn!("Failed to copy the icon of {} to {}: {}", source.id, target, err);
                report.failure();
            }
        }
    }

    match ctx.service.set_name(target, &source.name).await {
        Ok(()) => report.success(),
        Err(err) => {
            tracing::warn!("Failed to rename {} to {}: {}", target, source.name, err);
            report.failure();
        }
    }

    report
}
