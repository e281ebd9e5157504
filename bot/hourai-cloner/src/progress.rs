use crate::service::BoxedGuildService;
use hourai::models::id::ChannelId;
use regex::Regex;

lazy_static! {
    static ref PUNCTUATION_REGEX: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Reports the status of a cloning run back to the channel that requested it.
pub struct Progress {
    service: BoxedGuildService,
    channel_id: Option<ChannelId>,
}

impl Progress {
    pub fn new(service: BoxedGuildService, channel_id: Option<ChannelId>) -> Self {
        Self {
            service,
            channel_id,
        }
    }

    /// Posts a status line. Failing to post never interrupts the run.
    pub async fn send(&self, message: &str) {
        if let Some(channel_id) = self.channel_id {
            if let Err(err) = self.service.send_message(channel_id, message).await {
                tracing::debug!("Failed to post progress to {}: {}", channel_id, err);
            }
        }
        tracing::info!("{}", log_line(message));
    }
}

/// Strips emoji and punctuation for the console copy of a status line.
pub fn log_line(message: &str) -> String {
    PUNCTUATION_REGEX.replace_all(message, "").trim().to_owned()
}
