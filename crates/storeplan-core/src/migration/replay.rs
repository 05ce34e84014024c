//! Replaying emitted actions over a structural layout.

use super::plan::{MigrationPlan, MigrationStep};
use crate::catalog::SchemaLayout;
use crate::error::{MigrationError, Result};
use tracing::debug;

/// Apply steps to a layout in order, as an executor would.
///
/// Stops at the first action that does not fit the layout.
pub fn replay<'a, I>(steps: I, layout: &mut SchemaLayout) -> Result<()>
where
    I: IntoIterator<Item = &'a MigrationStep>,
{
    for step in steps {
        for (index, action) in step.actions.iter().enumerate() {
            action
                .apply_to_layout(layout)
                .map_err(|source| MigrationError::Rejected {
                    version: step.version,
                    index,
                    operation: None,
                    source,
                })?;
        }
        debug!(version = step.version, actions = step.actions.len(), "Step replayed");
    }
    Ok(())
}

impl MigrationPlan {
    /// Replay every step onto an empty layout.
    ///
    /// For an accepted plan this matches `self.model().layout()`.
    pub fn replay_layout(&self) -> Result<SchemaLayout> {
        let mut layout = SchemaLayout::default();
        replay(self.steps(), &mut layout)?;
        Ok(layout)
    }
}
