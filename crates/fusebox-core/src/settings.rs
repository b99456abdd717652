//! Execution settings
//!
//! An immutable snapshot is handed to every runner at construction time.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Settings read when a compiled runner is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Assume the runner was compiled ahead of time and only execute it
    pub pre_compile: bool,

    /// Swap SIGINT/SIGTERM to default handling around delegated execution
    pub enable_signal_handler_overrides: bool,

    /// Whether the fusion pass marks subgraphs at all
    pub fusion_enabled: bool,

    /// Smallest run of supported nodes worth delegating
    pub min_fusion_group_size: usize,

    /// Node kinds (qualified names) the fuser must never absorb
    pub op_blacklist: Vec<String>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            pre_compile: false,
            enable_signal_handler_overrides: true,
            fusion_enabled: true,
            min_fusion_group_size: 1,
            op_blacklist: Vec::new(),
        }
    }
}

impl ExecutionSettings {
    pub fn with_pre_compile(mut self, enable: bool) -> Self {
        self.pre_compile = enable;
        self
    }

    pub fn with_signal_handler_overrides(mut self, enable: bool) -> Self {
        self.enable_signal_handler_overrides = enable;
        self
    }

    pub fn with_fusion_enabled(mut self, enable: bool) -> Self {
        self.fusion_enabled = enable;
        self
    }

    pub fn with_min_fusion_group_size(mut self, size: usize) -> Self {
        self.min_fusion_group_size = size;
        self
    }

    pub fn with_blacklisted_op(mut self, qualified: impl Into<String>) -> Self {
        self.op_blacklist.push(qualified.into());
        self
    }

    pub fn is_blacklisted(&self, qualified: &str) -> bool {
        self.op_blacklist.iter().any(|op| op == qualified)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_fusion_group_size == 0 {
            return Err(CoreError::InvalidSettings(
                "min_fusion_group_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
