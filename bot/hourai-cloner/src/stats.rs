use hourai::models::id::RoleId;
use metrics::counter;
use std::collections::HashMap;
use std::fmt;

/// The outcome of a single cloning phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseReport {
    pub succeeded: u32,
    pub failed: u32,
}

impl PhaseReport {
    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    pub fn failure(&mut self) {
        self.failed += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Reset,
    Roles,
    Categories,
    Channels,
    Emojis,
    Identity,
}

/// Per-run counters. Only ever incremented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloneStats {
    pub roles: u32,
    pub categories: u32,
    pub channels: u32,
    pub emojis: u32,
    pub failed: u32,
}

impl CloneStats {
    /// Folds a phase's outcome into the run totals. Deletions and identity
    /// updates only feed their metrics, the totals only track what was copied.
    pub fn record(&mut self, phase: Phase, report: PhaseReport) {
        let (field, metric) = match phase {
            Phase::Reset => (None, "hourai_clone_deleted_total"),
            Phase::Roles => (Some(&mut self.roles), "hourai_clone_roles_total"),
            Phase::Categories => (Some(&mut self.categories), "hourai_clone_categories_total"),
            Phase::Channels => (Some(&mut self.channels), "hourai_clone_channels_total"),
            Phase::Emojis => (Some(&mut self.emojis), "hourai_clone_emojis_total"),
            Phase::Identity => (None, "hourai_clone_identity_total"),
        };
        if let Some(field) = field {
            *field += report.succeeded;
        }
        counter!(metric, u64::from(report.succeeded));
        self.failed += report.failed;
        counter!("hourai_clone_failed_total", u64::from(report.failed));
    }
}

impl fmt::Display for CloneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "roles: {}, categories: {}, channels: {}, emojis: {}, failed: {}",
            self.roles, self.categories, self.channels, self.emojis, self.failed
        )
    }
}

/// Source role ID to the ID of its copy in the target guild.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleMapping(HashMap<RoleId, RoleId>);

impl RoleMapping {
    pub fn insert(&mut self, source: RoleId, target: RoleId) {
        self.0.insert(source, target);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
impl RoleMapping {
    pub fn get(&self, source: RoleId) -> Option<RoleId> {
        self.0.get(&source).copied()
    }
}
