use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::pipeline::DownloadPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<DownloadPipeline>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, pipeline: DownloadPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
