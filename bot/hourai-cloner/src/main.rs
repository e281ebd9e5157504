#[macro_use]
extern crate lazy_static;

mod assets;
mod cloner;
mod conversation;
mod emojis;
mod guild;
mod identity;
mod progress;
mod reset;
mod roles;
mod service;
mod stats;
mod structure;

#[cfg(test)]
mod testing;

use crate::{
    assets::{BoxedAssetSource, HttpAssetFetcher},
    cloner::{CloneJob, ServerCloner},
    conversation::{Conversations, Reply},
    service::{BoxedGuildService, TwilightService},
};
use futures::stream::StreamExt;
use hourai::{
    config,
    gateway::{Event, EventTypeFlags, Intents},
    init,
    models::{
        channel::Message,
        id::{ChannelId, UserId},
    },
    prelude::*,
};
use tokio::time::Instant;

const BOT_INTENTS: Intents = Intents::from_bits_truncate(
    Intents::GUILDS.bits()
        | Intents::GUILD_MESSAGES.bits()
        | Intents::DIRECT_MESSAGES.bits()
        | Intents::MESSAGE_CONTENT.bits(),
);

const BOT_EVENTS: EventTypeFlags = EventTypeFlags::from_bits_truncate(
    EventTypeFlags::READY.bits() | EventTypeFlags::MESSAGE_CREATE.bits(),
);

#[tokio::main]
async fn main() {
    let config = config::load_config(config::get_config_path().as_ref())
        .expect("Failed to load the bot config");

    init::init(&config);
    let http_client = Arc::new(init::http_client(&config));

    let user = http_client
        .current_user()
        .await
        .expect("Current user should not fail to load.")
        .model()
        .await
        .expect("Failed to deserialize bot CurrentUser.");

    let service: BoxedGuildService = Arc::new(TwilightService::new(
        http_client.clone(),
        user.id,
        config.cloner.icon_size,
    ));
    let assets: BoxedAssetSource = Arc::new(HttpAssetFetcher::new(reqwest::Client::new()));

    let client = Client(Arc::new(ClientRef {
        cloner: ServerCloner::new(service, assets, config.cloner.clone()),
        conversations: Arc::new(Conversations::new(
            config.command_prefix.clone(),
            config.cloner.confirmation_timeout(),
        )),
    }));

    let (gateway, mut events) = init::cluster(&config, BOT_INTENTS, http_client.clone())
        .event_types(BOT_EVENTS)
        .build()
        .await
        .expect("Failed to connect to the Discord gateway");
    let gateway = Arc::new(gateway);

    info!("Starting gateway...");
    gateway.up().await;
    info!("Client started.");

    tokio::spawn(client.clone().purge_conversations(config.cloner.confirmation_timeout()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            res = events.next() => {
                if let Some((shard_id, evt)) = res {
                    client.consume_event(shard_id, evt);
                } else {
                    break;
                }
            }
        }
    }

    info!("Shutting down gateway...");
    gateway.down();
    info!("Client stopped.");
}

struct ClientRef {
    pub cloner: ServerCloner,
    pub conversations: Arc<Conversations>,
}

#[derive(Clone)]
pub struct Client(Arc<ClientRef>);

impl Client {
    fn consume_event(&self, shard_id: u64, event: Event) {
        match event {
            Event::Ready(evt) => {
                info!("Shard {} ready as {}", shard_id, evt.user.name);
            }
            Event::MessageCreate(evt) => self.on_message_create(evt.0),
            _ => {}
        }
    }

    /// Advances the requester's dialogue in place so that replies are handled
    /// in the order they arrive. Network work is pushed onto separate tasks.
    fn on_message_create(&self, msg: Message) {
        if msg.author.bot {
            return;
        }
        let reply = self.0.conversations.handle(
            msg.author.id,
            msg.channel_id,
            &msg.content,
            Instant::now(),
        );
        match reply {
            Reply::Ignore => {}
            Reply::Prompt(prompt) => {
                tokio::spawn(self.clone().send_prompt(msg.channel_id, prompt));
            }
            Reply::Start(job) => {
                tokio::spawn(self.clone().run_clone(msg.author.id, msg.channel_id, job));
            }
        }
    }

    async fn send_prompt(self, channel_id: ChannelId, prompt: &'static str) {
        let result = self
            .0
            .cloner
            .service()
            .send_message(channel_id, prompt)
            .await;
        if let Err(err) = result {
            error!("Error while prompting in {}: {} ({:?})", channel_id, err, err);
        }
    }

    async fn run_clone(self, user_id: UserId, channel_id: ChannelId, job: CloneJob) {
        let _request = self.0.conversations.release_on_drop(user_id);
        info!("{} started cloning {} into {}", user_id, job.source, job.target);
        let progress = self.0.cloner.progress(Some(channel_id));
        match self.0.cloner.clone_server(&job, &progress).await {
            Ok(report) => {
                info!(
                    "Finished cloning {} into {}: {} (mapped roles: {}, reordered: {})",
                    job.source,
                    job.target,
                    report.stats,
                    report.roles.len(),
                    report.reordered
                );
            }
            Err(err) => {
                error!(
                    "Error while cloning {} into {}: {} ({:?})",
                    job.source, job.target, err, err
                );
                progress.send(&format!("❌ Clone failed: {}", err)).await;
            }
        }
    }

    async fn purge_conversations(self, period: Duration) {
        let period = period.max(Duration::from_secs(1));
        loop {
            tokio::time::sleep(period).await;
            let purged = self.0.conversations.purge_expired(Instant::now());
            if purged > 0 {
                debug!("Dropped {} expired clone requests", purged);
            }
        }
    }
}
