use crate::{
    cloner::CloneContext,
    guild::{GuildSnapshot, RoleInfo},
    stats::{PhaseReport, RoleMapping},
};
use hourai::models::id::{GuildId, RoleId};

pub struct RoleCloneOutcome {
    pub report: PhaseReport,
    pub mapping: RoleMapping,
    pub reordered: bool,
}

/// Recreates every non-default role of `source` in `target`, lowest first,
/// then fixes the final hierarchy with a single bulk reorder.
///
/// Discord does not place newly created roles where they are intended to go,
/// so the order produced while creating them cannot be trusted. Only the
/// bulk reorder at the end determines the final ranks.
pub async fn clone_roles(
    ctx: &CloneContext<'_>,
    source: &GuildSnapshot,
    target: GuildId,
) -> RoleCloneOutcome {
    ctx.progress.send("👑 Cloning roles...").await;

    let mut report = PhaseReport::default();
    let mut mapping = RoleMapping::default();
    let mut created: Vec<RoleId> = Vec::new();

    for role in creation_order(source) {
        match ctx
            .service
            .create_role(target, role, &ctx.config.audit_reason)
            .await
        {
            Ok(role_id) => {
                mapping.insert(role.id, role_id);
                created.push(role_id);
                report.success();
                ctx.progress
                    .send(&format!("Created role: {}", role.name))
                    .await;
                tokio::time::sleep(ctx.config.role_delay()).await;
            }
            Err(err) => {
                tracing::warn!("Failed to create role {} ({}): {}", role.name, role.id, err);
                report.failure();
            }
        }
    }

    let positions = rank_positions(&created);
    let mut reordered = false;
    if !positions.is_empty() {
        match ctx.service.update_role_positions(target, &positions).await {
            Ok(()) => reordered = true,
            Err(err) => {
                tracing::warn!("Failed to reorder {} roles in {}: {}", positions.len(), target, err);
                report.failure();
            }
        }
    }

    ctx.progress.send("✅ Role order fixed correctly").await;

    RoleCloneOutcome {
        report,
        mapping,
        reordered,
    }
}

/// Non-default roles sorted from least to most senior.
pub fn creation_order(source: &GuildSnapshot) -> Vec<&RoleInfo> {
    let mut roles: Vec<&RoleInfo> = source.clonable_roles().collect();
    roles.sort_by_key(|role| (role.position, role.id));
    roles
}

/// Position 0 belongs to @everyone, so created roles start at 1.
pub fn rank_positions(created: &[RoleId]) -> Vec<(RoleId, u64)> {
    created
        .iter()
        .enumerate()
        .map(|(idx, role_id)| (*role_id, idx as u64 + 1))
        .collect()
}
