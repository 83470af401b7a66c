use crate::config::{Config, ToolsConfig};

pub struct PipelineConfig {
    pub tools: ToolsConfig,
    /// Grey line at the bottom of the index.
    pub index_footer: String,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tools: config.tools.clone(),
            index_footer: config.index_footer.clone(),
        }
    }
}
