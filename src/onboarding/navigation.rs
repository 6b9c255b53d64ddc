//! Step Navigation State Machine
//!
//! Holds the wizard cursor and per-step flags. The three transitions are
//! total: out-of-range requests leave the state untouched and return
//! `false` instead of failing. Gating is the caller's job.

use super::steps::{registry, Step, WizardStep};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// 1-based index into `steps`
    pub current_step: usize,
    pub steps: Vec<Step>,
    /// True iff the last step is the current one
    pub is_completed: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationState {
    /// Fresh navigation at step 1
    pub fn new() -> Self {
        Self::with_steps(registry())
    }

    /// Build over an arbitrary registry (must be non-empty and 1-based contiguous)
    pub fn with_steps(mut steps: Vec<Step>) -> Self {
        for (i, step) in steps.iter_mut().enumerate() {
            step.active = i == 0;
        }
        let is_completed = steps.len() == 1;
        Self {
            current_step: 1,
            steps,
            is_completed,
        }
    }

    /// Number of steps in the registry
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Identifier of the current step
    pub fn current(&self) -> WizardStep {
        self.steps
            .get(self.current_step.saturating_sub(1))
            .map(|s| s.kind)
            .unwrap_or(WizardStep::AssetType)
    }

    pub fn step(&self, number: usize) -> Option<&Step> {
        number.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    fn step_mut(&mut self, number: usize) -> Option<&mut Step> {
        number.checked_sub(1).and_then(|i| self.steps.get_mut(i))
    }

    /// Complete the current step and move forward one.
    /// No-op at the last step.
    pub fn advance(&mut self) -> bool {
        let n = self.len();
        if self.current_step >= n {
            self.is_completed = self.current_step == n;
            return false;
        }

        let from = self.current_step;
        if let Some(step) = self.step_mut(from) {
            step.completed = true;
            step.active = false;
        }
        self.current_step += 1;
        let to = self.current_step;
        if let Some(step) = self.step_mut(to) {
            step.active = true;
        }
        self.is_completed = to == n;

        tracing::debug!("Wizard advanced {} -> {}", from, to);
        true
    }

    /// Move back one step. Completed flags are left as they are so the
    /// sidebar keeps showing history. No-op at step 1.
    pub fn retreat(&mut self) -> bool {
        if self.current_step <= 1 {
            return false;
        }

        let from = self.current_step;
        if let Some(step) = self.step_mut(from) {
            step.active = false;
        }
        self.current_step -= 1;
        let to = self.current_step;
        if let Some(step) = self.step_mut(to) {
            step.active = true;
        }
        self.is_completed = false;

        tracing::debug!("Wizard retreated {} -> {}", from, to);
        true
    }

    /// Jump directly to `target` without completing the step being left.
    /// Rejects targets outside `1..=N` by doing nothing.
    pub fn jump(&mut self, target: usize) -> bool {
        let n = self.len();
        if target < 1 || target > n {
            tracing::warn!("Rejected jump to step {} (valid range 1..={})", target, n);
            return false;
        }

        let from = self.current_step;
        if let Some(step) = self.step_mut(from) {
            step.active = false;
        }
        if let Some(step) = self.step_mut(target) {
            step.active = true;
        }
        self.current_step = target;
        self.is_completed = target == n;

        tracing::debug!("Wizard jumped {} -> {}", from, target);
        true
    }

    /// Repair a deserialized state so that the cursor indexes a real step
    /// and exactly that step is active.
    pub fn normalize(&mut self) {
        let n = self.len();
        if n == 0 {
            *self = Self::new();
            return;
        }
        self.current_step = self.current_step.clamp(1, n);
        let current = self.current_step;
        for step in &mut self.steps {
            step.active = step.id == current;
        }
        self.is_completed = current == n;
    }
}
