//! Links to images hosted on Discord's CDN.

use super::id::{EmojiId, GuildId};
use twilight_model::util::ImageHash;

const CDN_BASE: &str = "https://cdn.discordapp.com";

fn extension(animated: bool) -> &'static str {
    if animated {
        "gif"
    } else {
        "png"
    }
}

/// Gets the URL of a guild's icon at the given size. Animated icons link to the GIF.
pub fn guild_icon_url(guild_id: GuildId, icon: &ImageHash, size: u16) -> String {
    format!(
        "{}/icons/{}/{}.{}?size={}",
        CDN_BASE,
        guild_id,
        icon,
        extension(icon.is_animated()),
        size
    )
}

pub fn emoji_url(emoji_id: EmojiId, animated: bool) -> String {
    format!("{}/emojis/{}.{}", CDN_BASE, emoji_id, extension(animated))
}
