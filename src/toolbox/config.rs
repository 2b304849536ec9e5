//! Toolbox configuration.

/// Environment variable overriding [`ToolBoxConfig::max_parallelism`].
pub const ENV_MAX_PARALLELISM: &str = "AI_TOOLBOX_MAX_PARALLELISM";
/// Environment variable overriding [`ToolBoxConfig::debug`] (`1`/`true`/`yes`/`on`).
pub const ENV_DEBUG: &str = "AI_TOOLBOX_DEBUG";

const DEFAULT_MAX_PARALLELISM: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBoxConfig {
    /// Upper bound on tool calls running at once in a batch.
    pub max_parallelism: usize,
    /// Trace every call, its arguments and its output at `info` level instead of `debug`.
    pub debug: bool,
}

impl Default for ToolBoxConfig {
    fn default() -> Self {
        Self {
            max_parallelism: DEFAULT_MAX_PARALLELISM,
            debug: false,
        }
    }
}

impl ToolBoxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by `AI_TOOLBOX_MAX_PARALLELISM` and `AI_TOOLBOX_DEBUG` when set.
    pub fn from_env() -> Self {
        Self::default().apply_overrides(
            std::env::var(ENV_MAX_PARALLELISM).ok().as_deref(),
            std::env::var(ENV_DEBUG).ok().as_deref(),
        )
    }

    fn apply_overrides(mut self, parallelism: Option<&str>, debug: Option<&str>) -> Self {
        if let Some(n) = parallelism
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
        {
            self.max_parallelism = n;
        }
        if let Some(flag) = debug {
            self.debug = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        self
    }

    pub fn with_max_parallelism(mut self, n: usize) -> Self {
        self.max_parallelism = n.max(1);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
