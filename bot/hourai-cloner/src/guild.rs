use hourai::models::{
    guild::{Permissions, Role},
    id::*,
};
use std::collections::HashMap;

/// A read-only view of a guild's clonable structure.
#[derive(Clone, Debug)]
pub struct GuildSnapshot {
    pub id: GuildId,
    pub name: String,
    pub icon_url: Option<String>,
    pub roles: Vec<RoleInfo>,
    pub channels: Vec<ChannelInfo>,
    pub emojis: Vec<EmojiInfo>,
}

impl GuildSnapshot {
    /// Iterates over every role except the guild's default (@everyone) role.
    pub fn clonable_roles(&self) -> impl Iterator<Item = &RoleInfo> {
        let guild_id = self.id;
        self.roles.iter().filter(move |role| !role.is_default(guild_id))
    }

    /// Channels of the given kind, stable sorted by position.
    pub fn channels_by_position(&self, kinds: &[ChannelKind]) -> Vec<&ChannelInfo> {
        let mut channels: Vec<&ChannelInfo> = self
            .channels
            .iter()
            .filter(|ch| kinds.contains(&ch.kind))
            .collect();
        channels.sort_by_key(|ch| ch.position);
        channels
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    pub color: u32,
    pub permissions: Permissions,
    pub hoist: bool,
    pub mentionable: bool,
    pub position: i64,
    /// Whether the bot is able to modify or delete this role.
    pub editable: bool,
}

impl RoleInfo {
    /// The @everyone role shares its ID with the guild.
    pub fn is_default(&self, guild_id: GuildId) -> bool {
        self.id.get() == guild_id.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Category,
    Text,
    Voice,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<ChannelId>,
    pub parent_name: Option<String>,
    pub position: i64,
    pub topic: Option<String>,
    pub nsfw: Option<bool>,
    pub bitrate: Option<u32>,
    pub user_limit: Option<u32>,
    pub deletable: bool,
}

/// Fills in `parent_name` from the categories present in the same guild.
pub fn resolve_parent_names(channels: &mut [ChannelInfo]) {
    let categories: HashMap<ChannelId, String> = channels
        .iter()
        .filter(|ch| ch.kind == ChannelKind::Category)
        .map(|ch| (ch.id, ch.name.clone()))
        .collect();
    for channel in channels.iter_mut() {
        channel.parent_name = channel
            .parent_id
            .and_then(|id| categories.get(&id))
            .cloned();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmojiInfo {
    pub id: EmojiId,
    pub name: String,
    pub url: String,
}

/// What the bot itself is allowed to do in a guild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BotPermissions {
    pub permissions: Permissions,
    pub highest_position: i64,
}

impl BotPermissions {
    pub fn compute(guild_id: GuildId, is_owner: bool, roles: &[Role], member_roles: &[RoleId]) -> Self {
        let mut permissions = Permissions::empty();
        let mut highest_position = 0;
        for role in roles {
            if role.id.get() == guild_id.get() || member_roles.contains(&role.id) {
                permissions |= role.permissions;
                highest_position = highest_position.max(role.position);
            }
        }
        if is_owner || permissions.contains(Permissions::ADMINISTRATOR) {
            permissions = Permissions::all();
        }
        if is_owner {
            highest_position = i64::MAX;
        }
        Self {
            permissions,
            highest_position,
        }
    }

    pub fn can_delete_channels(&self) -> bool {
        self.permissions.contains(Permissions::MANAGE_CHANNELS)
    }

    /// Managed roles belong to integrations and cannot be touched. Otherwise a
    /// role is editable when it sits strictly below the bot's highest role.
    pub fn can_edit_role(&self, role: &Role) -> bool {
        self.permissions.contains(Permissions::MANAGE_ROLES)
            && !role.managed
            && role.position < self.highest_position
    }
}
