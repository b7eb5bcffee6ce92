//! Cucumber world for Drupal scenarios

use cucumber::World;

use crate::context::{SessionAccess, StepContext};
use crate::{Error, Result};

/// Per-scenario world
///
/// Starts empty; the runner attaches a [`StepContext`] in a `before` hook.
#[derive(Debug, Default, World)]
pub struct DrupalWorld {
    ctx: Option<StepContext>,
}

impl DrupalWorld {
    /// Attach the context the steps of this scenario run against
    pub fn attach(&mut self, ctx: StepContext) {
        self.ctx = Some(ctx);
    }

    /// Detach the context, typically to clean it up after the scenario
    pub fn detach(&mut self) -> Option<StepContext> {
        self.ctx.take()
    }

    /// Mutable access to the attached context
    pub fn context_mut(&mut self) -> Result<&mut StepContext> {
        self.ctx.as_mut().ok_or_else(detached)
    }
}

impl SessionAccess for DrupalWorld {
    fn context(&self) -> Result<&StepContext> {
        self.ctx.as_ref().ok_or_else(detached)
    }
}

fn detached() -> Error {
    Error::configuration("No step context attached to the world")
}

/// Split a comma separated list, dropping blanks
pub(crate) fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
