use crate::guild::*;
use anyhow::Result;
use async_trait::async_trait;
use hourai::{
    http::{error::ErrorType, request::AuditLogReason, Client},
    models::{
        cdn,
        channel::{Channel, ChannelType},
        guild::Emoji,
        id::*,
    },
};
use std::sync::Arc;

pub type BoxedGuildService = Arc<dyn GuildService + Send + Sync + 'static>;

/// Every read and write a cloning run performs against Discord.
#[async_trait]
pub trait GuildService {
    /// Returns `None` if the guild does not exist or is not visible to the bot.
    async fn fetch_guild(&self, guild_id: GuildId) -> Result<Option<GuildSnapshot>>;

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<()>;
    async fn delete_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<()>;

    async fn create_role(&self, guild_id: GuildId, role: &RoleInfo, reason: &str) -> Result<RoleId>;

    /// Sets the positions of many roles in a single request.
    async fn update_role_positions(&self, guild_id: GuildId, positions: &[(RoleId, u64)]) -> Result<()>;

    async fn create_category(&self, guild_id: GuildId, name: &str) -> Result<ChannelId>;
    async fn create_channel(
        &self,
        guild_id: GuildId,
        channel: &ChannelInfo,
        parent_id: Option<ChannelId>,
    ) -> Result<ChannelId>;

    /// `image` is a data URI as produced by the asset fetcher.
    async fn create_emoji(&self, guild_id: GuildId, name: &str, image: &str) -> Result<EmojiId>;

    async fn set_icon(&self, guild_id: GuildId, icon: &str) -> Result<()>;
    async fn set_name(&self, guild_id: GuildId, name: &str) -> Result<()>;

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()>;
}

pub struct TwilightService {
    http: Arc<Client>,
    user_id: UserId,
    icon_size: u16,
}

impl TwilightService {
    pub fn new(http: Arc<Client>, user_id: UserId, icon_size: u16) -> Self {
        Self {
            http,
            user_id,
            icon_size,
        }
    }

    fn is_missing(err: &hourai::http::Error) -> bool {
        matches!(
            err.kind(),
            ErrorType::Response { status, .. } if matches!(status.get(), 403 | 404)
        )
    }

    fn channel_info(channel: &Channel, perms: &BotPermissions) -> ChannelInfo {
        let kind = match channel.kind {
            ChannelType::GuildCategory => ChannelKind::Category,
            ChannelType::GuildText => ChannelKind::Text,
            ChannelType::GuildVoice => ChannelKind::Voice,
            _ => ChannelKind::Other,
        };
        ChannelInfo {
            id: channel.id,
            name: channel.name.clone().unwrap_or_default(),
            kind,
            parent_id: channel.parent_id,
            parent_name: None,
            position: channel.position.map(i64::from).unwrap_or(0),
            topic: channel.topic.clone(),
            nsfw: channel.nsfw,
            bitrate: channel.bitrate,
            user_limit: channel.user_limit,
            deletable: perms.can_delete_channels(),
        }
    }

    fn emoji_info(emoji: &Emoji) -> EmojiInfo {
        EmojiInfo {
            id: emoji.id,
            name: emoji.name.clone(),
            url: cdn::emoji_url(emoji.id, emoji.animated),
        }
    }
}

#[async_trait]
impl GuildService for TwilightService {
    async fn fetch_guild(&self, guild_id: GuildId) -> Result<Option<GuildSnapshot>> {
        let guild = match self.http.guild(guild_id).await {
            Ok(response) => response.model().await?,
            Err(err) if Self::is_missing(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let channels = self.http.guild_channels(guild_id).await?.models().await?;
        let member = self
            .http
            .guild_member(guild_id, self.user_id)
            .await?
            .model()
            .await?;

        let perms = BotPermissions::compute(
            guild_id,
            guild.owner_id == self.user_id,
            &guild.roles,
            &member.roles,
        );

        let roles = guild
            .roles
            .iter()
            .map(|role| RoleInfo {
                id: role.id,
                name: role.name.clone(),
                color: role.color,
                permissions: role.permissions,
                hoist: role.hoist,
                mentionable: role.mentionable,
                position: role.position,
                editable: perms.can_edit_role(role),
            })
            .collect();

        let mut channels: Vec<ChannelInfo> = channels
            .iter()
            .map(|ch| Self::channel_info(ch, &perms))
            .collect();
        resolve_parent_names(&mut channels);

        Ok(Some(GuildSnapshot {
            id: guild.id,
            name: guild.name.clone(),
            icon_url: guild
                .icon
                .as_ref()
                .map(|icon| cdn::guild_icon_url(guild.id, icon, self.icon_size)),
            roles,
            channels,
            emojis: guild.emojis.iter().map(Self::emoji_info).collect(),
        }))
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<()> {
        self.http.delete_channel(channel_id).await?;
        Ok(())
    }

    async fn delete_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<()> {
        self.http.delete_role(guild_id, role_id).await?;
        Ok(())
    }

    async fn create_role(&self, guild_id: GuildId, role: &RoleInfo, reason: &str) -> Result<RoleId> {
        let created = self
            .http
            .create_role(guild_id)
            .name(&role.name)
            .color(role.color)
            .permissions(role.permissions)
            .hoist(role.hoist)
            .mentionable(role.mentionable)
            .reason(reason)?
            .await?
            .model()
            .await?;
        Ok(created.id)
    }

    async fn update_role_positions(&self, guild_id: GuildId, positions: &[(RoleId, u64)]) -> Result<()> {
        self.http.update_role_positions(guild_id, positions).await?;
        Ok(())
    }

    async fn create_category(&self, guild_id: GuildId, name: &str) -> Result<ChannelId> {
        let created = self
            .http
            .create_guild_channel(guild_id, name)?
            .kind(ChannelType::GuildCategory)
            .await?
            .model()
            .await?;
        Ok(created.id)
    }

    async fn create_channel(
        &self,
        guild_id: GuildId,
        channel: &ChannelInfo,
        parent_id: Option<ChannelId>,
    ) -> Result<ChannelId> {
        let kind = match channel.kind {
            ChannelKind::Voice => ChannelType::GuildVoice,
            _ => ChannelType::GuildText,
        };
        let mut request = self
            .http
            .create_guild_channel(guild_id, &channel.name)?
            .kind(kind);
        if let Some(parent_id) = parent_id {
            request = request.parent_id(parent_id);
        }
        if let Some(topic) = channel.topic.as_deref() {
            request = request.topic(topic)?;
        }
        if let Some(nsfw) = channel.nsfw {
            request = request.nsfw(nsfw);
        }
        if let Some(bitrate) = channel.bitrate {
            request = request.bitrate(bitrate)?;
        }
        if let Some(user_limit) = channel.user_limit.and_then(|l| u16::try_from(l).ok()) {
            request = request.user_limit(user_limit);
        }
        let created = request.await?.model().await?;
        Ok(created.id)
    }

    async fn create_emoji(&self, guild_id: GuildId, name: &str, image: &str) -> Result<EmojiId> {
        let created = self
            .http
            .create_emoji(guild_id, name, image)
            .await?
            .model()
            .await?;
        Ok(created.id)
    }

    async fn set_icon(&self, guild_id: GuildId, icon: &str) -> Result<()> {
        self.http.update_guild(guild_id).icon(Some(icon)).await?;
        Ok(())
    }

    async fn set_name(&self, guild_id: GuildId, name: &str) -> Result<()> {
        self.http.update_guild(guild_id).name(name)?.await?;
        Ok(())
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        self.http
            .create_message(channel_id)
            .content(content)?
            .await?;
        Ok(())
    }
}
