//! In-memory stand-ins for Discord used by the unit tests.

use crate::{
    assets::AssetSource,
    cloner::{CloneContext, ServerCloner},
    guild::*,
    progress::Progress,
    service::GuildService,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use hourai::{
    config::ClonerConfig,
    models::{guild::Permissions, id::*},
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    guilds: HashMap<GuildId, GuildSnapshot>,
    next_id: u64,
    failing_names: HashSet<String>,
    roles_at_bottom: bool,
    fail_reorder: bool,
    fail_deletes: bool,
    fail_identity: bool,
    fail_messages: bool,
    role_creations: Vec<String>,
    reorders: Vec<Vec<(RoleId, u64)>>,
    messages: Vec<(ChannelId, String)>,
}

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        10_000 + self.next_id
    }

    fn guild_mut(&mut self, guild_id: GuildId) -> Result<&mut GuildSnapshot> {
        self.guilds
            .get_mut(&guild_id)
            .ok_or_else(|| anyhow!("Unknown guild {}", guild_id))
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if self.failing_names.contains(name) {
            bail!("Injected failure for {}", name);
        }
        Ok(())
    }
}

/// Behaves like Discord: every newly created role lands at the top of the
/// hierarchy regardless of the order in which roles are created.
#[derive(Default)]
pub struct FakeGuildService {
    state: Mutex<FakeState>,
}

impl FakeGuildService {
    pub fn with_guilds(guilds: impl IntoIterator<Item = GuildSnapshot>) -> Self {
        let service = Self::default();
        for guild in guilds {
            service.state.lock().unwrap().guilds.insert(guild.id, guild);
        }
        service
    }

    pub fn guild(&self, guild_id: GuildId) -> GuildSnapshot {
        self.state.lock().unwrap().guilds[&guild_id].clone()
    }

    /// Any role, channel, category, or emoji created with this name fails.
    pub fn fail_name(&self, name: &str) {
        self.state.lock().unwrap().failing_names.insert(name.to_owned());
    }

    /// New roles are placed directly above @everyone instead of at the top,
    /// which reverses the creation order.
    pub fn place_new_roles_at_bottom(&self) {
        self.state.lock().unwrap().roles_at_bottom = true;
    }

    pub fn fail_reorder(&self) {
        self.state.lock().unwrap().fail_reorder = true;
    }

    pub fn fail_deletes(&self) {
        self.state.lock().unwrap().fail_deletes = true;
    }

    pub fn fail_identity(&self) {
        self.state.lock().unwrap().fail_identity = true;
    }

    pub fn fail_messages(&self) {
        self.state.lock().unwrap().fail_messages = true;
    }

    pub fn role_creations(&self) -> Vec<String> {
        self.state.lock().unwrap().role_creations.clone()
    }

    pub fn reorders(&self) -> Vec<Vec<(RoleId, u64)>> {
        self.state.lock().unwrap().reorders.clone()
    }

    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Names of the non-default roles in a guild, lowest position first.
    pub fn role_names_by_position(&self, guild_id: GuildId) -> Vec<String> {
        let guild = self.guild(guild_id);
        let mut roles: Vec<&RoleInfo> = guild.clonable_roles().collect();
        roles.sort_by_key(|role| role.position);
        roles.iter().map(|role| role.name.clone()).collect()
    }
}

#[async_trait]
impl GuildService for FakeGuildService {
    async fn fetch_guild(&self, guild_id: GuildId) -> Result<Option<GuildSnapshot>> {
        Ok(self.state.lock().unwrap().guilds.get(&guild_id).cloned())
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            bail!("Injected delete failure");
        }
        for guild in state.guilds.values_mut() {
            if let Some(idx) = guild.channels.iter().position(|ch| ch.id == channel_id) {
                guild.channels.remove(idx);
                return Ok(());
            }
        }
        bail!("Unknown channel {}", channel_id)
    }

    async fn delete_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            bail!("Injected delete failure");
        }
        let guild = state.guild_mut(guild_id)?;
        let idx = guild
            .roles
            .iter()
            .position(|role| role.id == role_id)
            .ok_or_else(|| anyhow!("Unknown role {}", role_id))?;
        guild.roles.remove(idx);
        Ok(())
    }

    async fn create_role(&self, guild_id: GuildId, role: &RoleInfo, _reason: &str) -> Result<RoleId> {
        let mut state = self.state.lock().unwrap();
        state.role_creations.push(role.name.clone());
        state.check_name(&role.name)?;
        let id = RoleId::new(state.next_id());
        let at_bottom = state.roles_at_bottom;
        let guild = state.guild_mut(guild_id)?;
        let position = if at_bottom {
            let default_id = guild.id.get();
            for existing in guild.roles.iter_mut() {
                if existing.id.get() != default_id {
                    existing.position += 1;
                }
            }
            1
        } else {
            guild.roles.iter().map(|r| r.position).max().unwrap_or(0) + 1
        };
        guild.roles.push(RoleInfo {
            id,
            position,
            editable: true,
            ..role.clone()
        });
        Ok(id)
    }

    async fn update_role_positions(&self, guild_id: GuildId, positions: &[(RoleId, u64)]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.reorders.push(positions.to_vec());
        if state.fail_reorder {
            bail!("Injected reorder failure");
        }
        let guild = state.guild_mut(guild_id)?;
        for (role_id, position) in positions {
            let role = guild
                .roles
                .iter_mut()
                .find(|role| role.id == *role_id)
                .ok_or_else(|| anyhow!("Unknown role {}", role_id))?;
            role.position = *position as i64;
        }
        Ok(())
    }

    async fn create_category(&self, guild_id: GuildId, name: &str) -> Result<ChannelId> {
        let mut state = self.state.lock().unwrap();
        state.check_name(name)?;
        let id = ChannelId::new(state.next_id());
        let guild = state.guild_mut(guild_id)?;
        let position = guild.channels.len() as i64;
        guild.channels.push(ChannelInfo {
            id,
            name: name.to_owned(),
            kind: ChannelKind::Category,
            parent_id: None,
            parent_name: None,
            position,
            topic: None,
            nsfw: None,
            bitrate: None,
            user_limit: None,
            deletable: true,
        });
        Ok(id)
    }

    async fn create_channel(
        &self,
        guild_id: GuildId,
        channel: &ChannelInfo,
        parent_id: Option<ChannelId>,
    ) -> Result<ChannelId> {
        let mut state = self.state.lock().unwrap();
        state.check_name(&channel.name)?;
        let id = ChannelId::new(state.next_id());
        let guild = state.guild_mut(guild_id)?;
        let position = guild.channels.len() as i64;
        guild.channels.push(ChannelInfo {
            id,
            parent_id,
            parent_name: None,
            position,
            deletable: true,
            ..channel.clone()
        });
        resolve_parent_names(&mut guild.channels);
        Ok(id)
    }

    async fn create_emoji(&self, guild_id: GuildId, name: &str, image: &str) -> Result<EmojiId> {
        let mut state = self.state.lock().unwrap();
        state.check_name(name)?;
        let id = EmojiId::new(state.next_id());
        let guild = state.guild_mut(guild_id)?;
        guild.emojis.push(EmojiInfo {
            id,
            name: name.to_owned(),
            url: image.to_owned(),
        });
        Ok(id)
    }

    async fn set_icon(&self, guild_id: GuildId, icon: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_identity {
            bail!("Injected identity failure");
        }
        state.guild_mut(guild_id)?.icon_url = Some(icon.to_owned());
        Ok(())
    }

    async fn set_name(&self, guild_id: GuildId, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_identity {
            bail!("Injected identity failure");
        }
        state.guild_mut(guild_id)?.name = name.to_owned();
        Ok(())
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_messages {
            bail!("Injected message failure");
        }
        state.messages.push((channel_id, content.to_owned()));
        Ok(())
    }
}

/// Serves `data:image/png;base64,<url>` for every URL not marked as failing.
#[derive(Default)]
pub struct FakeAssetSource {
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeAssetSource {
    pub fn fail_url(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_owned());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetSource for FakeAssetSource {
    async fn fetch_data_uri(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_owned());
        if self.failing.lock().unwrap().contains(url) {
            bail!("Injected download failure for {}", url);
        }
        Ok(format!("data:image/png;base64,{}", url))
    }
}

pub fn source_id() -> GuildId {
    GuildId::new(1)
}

pub fn target_id() -> GuildId {
    GuildId::new(2)
}

pub fn guild(id: u64, name: &str) -> GuildSnapshot {
    GuildSnapshot {
        id: GuildId::new(id),
        name: name.to_owned(),
        icon_url: None,
        roles: vec![role(id, "@everyone", 0)],
        channels: vec![],
        emojis: vec![],
    }
}

pub fn role(id: u64, name: &str, position: i64) -> RoleInfo {
    RoleInfo {
        id: RoleId::new(id),
        name: name.to_owned(),
        color: 0x00ff_00ff,
        permissions: Permissions::SEND_MESSAGES,
        hoist: false,
        mentionable: true,
        position,
        editable: true,
    }
}

pub fn channel(id: u64, name: &str, kind: ChannelKind, position: i64) -> ChannelInfo {
    ChannelInfo {
        id: ChannelId::new(id),
        name: name.to_owned(),
        kind,
        parent_id: None,
        parent_name: None,
        position,
        topic: None,
        nsfw: None,
        bitrate: None,
        user_limit: None,
        deletable: true,
    }
}

pub fn emoji(id: u64, name: &str) -> EmojiInfo {
    EmojiInfo {
        id: EmojiId::new(id),
        name: name.to_owned(),
        url: format!("https://cdn.discordapp.com/emojis/{}.png", id),
    }
}

pub const PROGRESS_CHANNEL: u64 = 99;

/// Wires the fakes together the same way `main` wires the real services.
pub struct Harness {
    pub service: Arc<FakeGuildService>,
    pub assets: Arc<FakeAssetSource>,
    pub config: ClonerConfig,
    pub progress: Progress,
}

impl Harness {
    pub fn new(guilds: impl IntoIterator<Item = GuildSnapshot>) -> Self {
        let service = Arc::new(FakeGuildService::with_guilds(guilds));
        let progress = Progress::new(service.clone(), Some(ChannelId::new(PROGRESS_CHANNEL)));
        Self {
            service,
            assets: Arc::new(FakeAssetSource::default()),
            config: ClonerConfig {
                role_delay_ms: 0,
                emoji_delay_ms: 0,
                ..ClonerConfig::default()
            },
            progress,
        }
    }

    pub fn context(&self) -> CloneContext<'_> {
        CloneContext {
            service: self.service.as_ref(),
            assets: self.assets.as_ref(),
            config: &self.config,
            progress: &self.progress,
        }
    }

    pub fn cloner(&self) -> ServerCloner {
        ServerCloner::new(self.service.clone(), self.assets.clone(), self.config.clone())
    }

    /// Everything posted to the progress channel so far.
    pub fn progress_messages(&self) -> Vec<String> {
        self.service
            .messages()
            .into_iter()
            .filter(|(channel_id, _)| channel_id.get() == PROGRESS_CHANNEL)
            .map(|(_, content)| content)
            .collect()
    }
}
