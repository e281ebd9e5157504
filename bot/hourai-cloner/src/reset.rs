use crate::{
    guild::{ChannelInfo, GuildSnapshot},
    service::GuildService,
    stats::PhaseReport,
};

/// Removes every deletable channel and every editable non-default role from
/// the target. Returns the channels that were left behind.
pub async fn reset_guild(
    service: &(dyn GuildService + Send + Sync),
    target: &GuildSnapshot,
) -> (PhaseReport, Vec<ChannelInfo>) {
    let mut report = PhaseReport::default();
    let mut remaining = Vec::new();

    for channel in target.channels.iter() {
        if !channel.deletable {
            remaining.push(channel.clone());
            continue;
        }
        match service.delete_channel(channel.id).await {
            Ok(()) => report.success(),
            Err(err) => {
                tracing::warn!("Failed to delete channel {} ({}): {}", channel.name, channel.id, err);
                report.failure();
                remaining.push(channel.clone());
            }
        }
    }

    for role in target.clonable_roles().filter(|role| role.editable) {
        if let Err(err) = service.delete_role(target.id, role.id).await {
            tracing::warn!("Failed to delete role {} ({}): {}", role.name, role.id, err);
            report.failure();
        } else {
            report.success();
        }
    }

    (report, remaining)
}
