use crate::{
    assets::{AssetSource, BoxedAssetSource},
    emojis, identity,
    progress::Progress,
    reset, roles,
    service::{BoxedGuildService, GuildService},
    stats::{CloneStats, Phase, RoleMapping},
    structure,
};
use dashmap::{mapref::entry::Entry, DashMap};
use hourai::{
    config::ClonerConfig,
    models::id::{ChannelId, GuildId},
};
use metrics::increment_counter;
use std::sync::Arc;
use thiserror::Error;

/// Errors that abort a cloning run before anything is changed.
#[derive(Error, Debug)]
pub enum CloneError {
    #[error("Source server {} not found", .0)]
    SourceNotFound(GuildId),
    #[error("Target server {} not found", .0)]
    TargetNotFound(GuildId),
    #[error("Source and target are the same server ({})", .0)]
    SameGuild(GuildId),
    #[error("A clone into {} is already running", .0)]
    AlreadyRunning(GuildId),
    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}

/// Everything a cloning phase needs to talk to Discord and report back.
pub struct CloneContext<'a> {
    pub service: &'a (dyn GuildService + Send + Sync),
    pub assets: &'a (dyn AssetSource + Send + Sync),
    pub config: &'a ClonerConfig,
    pub progress: &'a Progress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloneJob {
    pub source: GuildId,
    pub target: GuildId,
    pub clone_emojis: bool,
}

#[derive(Debug)]
pub struct CloneReport {
    pub stats: CloneStats,
    pub roles: RoleMapping,
    pub reordered: bool,
}

#[derive(Clone)]
pub struct ServerCloner {
    service: BoxedGuildService,
    assets: BoxedAssetSource,
    config: ClonerConfig,
    active: Arc<DashMap<GuildId, ()>>,
}

/// Marks a target guild as busy until dropped.
struct ActiveRun {
    active: Arc<DashMap<GuildId, ()>>,
    target: GuildId,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.active.remove(&self.target);
    }
}

impl ServerCloner {
    pub fn new(service: BoxedGuildService, assets: BoxedAssetSource, config: ClonerConfig) -> Self {
        Self {
            service,
            assets,
            config,
            active: Arc::new(DashMap::new()),
        }
    }

    #[inline(always)]
    pub fn service(&self) -> &BoxedGuildService {
        &self.service
    }

    pub fn progress(&self, channel_id: Option<ChannelId>) -> Progress {
        Progress::new(self.service.clone(), channel_id)
    }

    /// Wipes `job.target` and rebuilds it from `job.source`. Only the checks
    /// made before the target is touched can fail the run. Every later
    /// failure is counted in the returned stats instead.
    pub async fn clone_server(
        &self,
        job: &CloneJob,
        progress: &Progress,
    ) -> Result<CloneReport, CloneError> {
        if job.source == job.target {
            return Err(CloneError::SameGuild(job.source));
        }
        let _run = self.claim(job.target)?;

        let source = self
            .service
            .fetch_guild(job.source)
            .await?
            .ok_or(CloneError::SourceNotFound(job.source))?;
        let target = self
            .service
            .fetch_guild(job.target)
            .await?
            .ok_or(CloneError::TargetNotFound(job.target))?;

        tracing::info!(
            "Cloning {} ({}) into {} ({}), emojis: {}",
            source.name,
            source.id,
            target.name,
            target.id,
            job.clone_emojis
        );
        increment_counter!("hourai_clone_runs_total");

        let ctx = CloneContext {
            service: self.service.as_ref(),
            assets: self.assets.as_ref(),
            config: &self.config,
            progress,
        };
        let mut stats = CloneStats::default();

        progress.send("🗑️ Cleaning target server...").await;
        let (report, remaining) = reset::reset_guild(ctx.service, &target).await;
        stats.record(Phase::Reset, report);

        let roles = roles::clone_roles(&ctx, &source, target.id).await;
        stats.record(Phase::Roles, roles.report);

        let (report, categories) =
            structure::clone_categories(&ctx, &source, target.id, &remaining).await;
        stats.record(Phase::Categories, report);

        let report = structure::clone_channels(&ctx, &source, target.id, &categories).await;
        stats.record(Phase::Channels, report);

        if job.clone_emojis {
            let report = emojis::clone_emojis(&ctx, &source, target.id).await;
            stats.record(Phase::Emojis, report);
        }

        let report = identity::clone_identity(&ctx, &source, target.id).await;
        stats.record(Phase::Identity, report);

        progress
            .send(&format!("🎉 Cloning completed successfully! ({})", stats))
            .await;

        Ok(CloneReport {
            stats,
            roles: roles.mapping,
            reordered: roles.reordered,
        })
    }

    fn claim(&self, target: GuildId) -> Result<ActiveRun, CloneError> {
        match self.active.entry(target) {
            Entry::Occupied(_) => Err(CloneError::AlreadyRunning(target)),
            Entry::Vacant(entry) => {
                entry.insert(());
                Ok(ActiveRun {
                    active: self.active.clone(),
                    target,
                })
            }
        }
    }
}
