use crate::cloner::CloneJob;
use dashmap::DashMap;
use hourai::{
    commands::{self, prelude::*, Command, Parser},
    models::id::{ChannelId, GuildId, UserId},
};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

pub const CLONE_PROMPT: &str = "Proceed? (y/n)";
pub const EMOJI_PROMPT: &str = "Clone emojis? (y/n)";

const CLONE_COMMAND: &str = "clone";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingCloneConfirmation,
    AwaitingEmojiChoice,
    Running,
}

#[derive(Clone, Debug)]
struct Conversation {
    state: ConversationState,
    channel_id: ChannelId,
    source: GuildId,
    target: GuildId,
    /// Running conversations never expire.
    expires_at: Option<Instant>,
}

impl Conversation {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|deadline| now >= deadline).unwrap_or(false)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Ignore,
    Prompt(&'static str),
    Start(CloneJob),
}

enum Step {
    Reply(Reply),
    Abort,
    Expired,
}

/// Tracks the clone confirmation dialogue with each requester.
///
/// Only the requester's messages in the channel the command was issued in
/// advance their dialogue. Any answer other than "y" or "yes" to the first
/// prompt silently drops it.
pub struct Conversations {
    states: DashMap<UserId, Conversation>,
    parser: Parser<'static>,
    timeout: Duration,
}

impl Conversations {
    pub fn new(prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            states: DashMap::new(),
            parser: commands::parser(prefix, &[CLONE_COMMAND]),
            timeout,
        }
    }

    pub fn handle(
        &self,
        author: UserId,
        channel_id: ChannelId,
        content: &str,
        now: Instant,
    ) -> Reply {
        let step = match self.states.get_mut(&author) {
            Some(mut convo) => Some(self.advance(convo.value_mut(), channel_id, content, now)),
            None => None,
        };

        match step {
            Some(Step::Reply(reply)) => return reply,
            Some(Step::Abort) => {
                tracing::info!("Clone request from {} was not confirmed", author);
                self.states.remove(&author);
                return Reply::Ignore;
            }
            Some(Step::Expired) => {
                tracing::debug!("Clone request from {} expired", author);
                self.states.remove(&author);
            }
            None => {}
        }

        match self.parse_trigger(content) {
            Some((source, target)) => {
                self.states.insert(
                    author,
                    Conversation {
                        state: ConversationState::AwaitingCloneConfirmation,
                        channel_id,
                        source,
                        target,
                        expires_at: Some(now + self.timeout),
                    },
                );
                Reply::Prompt(CLONE_PROMPT)
            }
            None => Reply::Ignore,
        }
    }

    /// Holds `user_id` in the running state until the returned guard is
    /// dropped, even if the run unwinds.
    pub fn release_on_drop(self: &Arc<Self>, user_id: UserId) -> RunningRequest {
        RunningRequest {
            conversations: self.clone(),
            user_id,
        }
    }

    fn finish(&self, user_id: UserId) {
        self.states.remove(&user_id);
    }

    /// Drops every dialogue that timed out. Returns how many were dropped.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.states.len();
        self.states.retain(|_, convo| !convo.is_expired(now));
        before.saturating_sub(self.states.len())
    }

    fn advance(
        &self,
        convo: &mut Conversation,
        channel_id: ChannelId,
        content: &str,
        now: Instant,
    ) -> Step {
        if convo.is_expired(now) {
            return Step::Expired;
        }
        if convo.channel_id != channel_id {
            return Step::Reply(Reply::Ignore);
        }
        match convo.state {
            ConversationState::Running => Step::Reply(Reply::Ignore),
            ConversationState::AwaitingCloneConfirmation => {
                if !is_affirmative(content) {
                    return Step::Abort;
                }
                convo.state = ConversationState::AwaitingEmojiChoice;
                convo.expires_at = Some(now + self.timeout);
                Step::Reply(Reply::Prompt(EMOJI_PROMPT))
            }
            ConversationState::AwaitingEmojiChoice => {
                convo.state = ConversationState::Running;
                convo.expires_at = None;
                Step::Reply(Reply::Start(CloneJob {
                    source: convo.source,
                    target: convo.target,
                    clone_emojis: is_affirmative(content),
                }))
            }
        }
    }

    fn parse_trigger(&self, content: &str) -> Option<(GuildId, GuildId)> {
        match self.parser.parse(content)? {
            Command {
                name: CLONE_COMMAND,
                mut arguments,
                ..
            } => {
                let source = arguments.parse_next_opt::<GuildId>()?;
                let target = arguments.parse_next_opt::<GuildId>()?;
                Some((source, target))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
impl Conversations {
    pub fn state(&self, user_id: UserId) -> Option<ConversationState> {
        self.states.get(&user_id).map(|convo| convo.state)
    }
}

/// Returns a requester to idle when dropped.
pub struct RunningRequest {
    conversations: Arc<Conversations>,
    user_id: UserId,
}

impl Drop for RunningRequest {
    fn drop(&mut self) {
        self.conversations.finish(self.user_id);
    }
}

pub fn is_affirmative(content: &str) -> bool {
    matches!(content.trim().to_lowercase().as_str(), "y" | "yes")
}
