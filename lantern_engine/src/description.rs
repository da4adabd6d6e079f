//! State-dependent description selection.
//!
//! Scenes, objects and interaction messages all share one table shape: a
//! default text, ordered conditional overrides, and optional dark and
//! return-visit variants.

use crate::condition::Condition;
use crate::flags::FlagStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionTable {
    pub default: String,
    pub overrides: Vec<(Condition, String)>,
    pub dark: Option<String>,
    pub visited: Option<String>,
}

impl DescriptionTable {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            default: text.into(),
            ..Self::default()
        }
    }

    /// Pick the text for the current state.
    ///
    /// Dark text wins when there is no light; otherwise the first override
    /// whose condition holds, then the visited text on a return visit, then
    /// the default.
    pub fn select(&self, flags: &FlagStore, lit: bool, visited: bool) -> &str {
        if !lit && let Some(dark) = &self.dark {
            return dark;
        }
        if let Some((_, text)) = self.overrides.iter().find(|(cond, _)| cond.evaluate(flags)) {
            return text;
        }
        if visited && let Some(text) = &self.visited {
            return text;
        }
        &self.default
    }
}
