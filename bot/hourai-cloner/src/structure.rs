use crate::{
    cloner::CloneContext,
    guild::{ChannelInfo, ChannelKind, GuildSnapshot},
    stats::PhaseReport,
};
use hourai::models::id::{ChannelId, GuildId};
use std::collections::HashMap;

/// Category names in the target guild, mapped to their IDs. The first
/// category registered under a name wins.
#[derive(Clone, Debug, Default)]
pub struct CategoryIndex(HashMap<String, ChannelId>);

impl CategoryIndex {
    pub fn insert(&mut self, name: &str, channel_id: ChannelId) {
        self.0.entry(name.to_owned()).or_insert(channel_id);
    }

    pub fn resolve(&self, name: Option<&str>) -> Option<ChannelId> {
        name.and_then(|name| self.0.get(name)).copied()
    }
}

#[cfg(test)]
impl CategoryIndex {
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Creates every source category in the target, without an explicit position.
///
/// `remaining` holds the target's channels that survived the reset. Leftover
/// categories are indexed after the new ones, so a newly created category
/// always wins a name collision.
pub async fn clone_categories(
    ctx: &CloneContext<'_>,
    source: &GuildSnapshot,
    target: GuildId,
    remaining: &[ChannelInfo],
) -> (PhaseReport, CategoryIndex) {
    ctx.progress.send("📁 Cloning categories...").await;

    let mut report = PhaseReport::default();
    let mut index = CategoryIndex::default();
    for category in source.channels_by_position(&[ChannelKind::Category]) {
        match ctx.service.create_category(target, &category.name).await {
            Ok(channel_id) => {
                index.insert(&category.name, channel_id);
                report.success();
            }
            Err(err) => {
                tracing::warn!("Failed to create category {}: {}", category.name, err);
                report.failure();
            }
        }
    }

    for leftover in remaining.iter().filter(|ch| ch.kind == ChannelKind::Category) {
        index.insert(&leftover.name, leftover.id);
    }

    (report, index)
}

/// Creates every text and voice channel, reattaching each to the target
/// category with the same name as its source parent.
pub async fn clone_channels(
    ctx: &CloneContext<'_>,
    source: &GuildSnapshot,
    target: GuildId,
    categories: &CategoryIndex,
) -> PhaseReport {
    ctx.progress.send("💬 Cloning channels...").await;

    let mut report = PhaseReport::default();
    for channel in source.channels_by_position(&[ChannelKind::Text, ChannelKind::Voice]) {
        let parent_id = categories.resolve(channel.parent_name.as_deref());
        if parent_id.is_none() {
            if let Some(parent) = channel.parent_name.as_deref() {
                tracing::debug!(
                    "No category named {} in {}. Creating {} without a parent.",
                    parent,
                    target,
                    channel.name
                );
            }
        }

        match ctx.service.create_channel(target, channel, parent_id).await {
            Ok(_) => report.success(),
            Err(err) => {
                tracing::warn!("Failed to create channel {}: {}", channel.name, err);
                report.failure();
            }
        }
    }
    report
}
