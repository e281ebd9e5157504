pub mod cdn;

pub use twilight_model::channel;
pub use twilight_model::guild;

pub mod id {
    pub use twilight_model::id::Id;
    use twilight_model::id::marker::*;

    pub type ChannelId = Id<ChannelMarker>;
    pub type EmojiId = Id<EmojiMarker>;
    pub type GuildId = Id<GuildMarker>;
    pub type RoleId = Id<RoleMarker>;
    pub type UserId = Id<UserMarker>;
}
