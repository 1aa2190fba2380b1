//! Shared application state for all routes.

use crate::config::{resolve, QueryConfig, ResolvedModel};
use crate::criteria::QueryParser;
use crate::error::ConfigError;
use crate::service::Executor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn Executor>,
    pub model: Arc<ResolvedModel>,
    pub parser: Arc<QueryParser>,
}

impl AppState {
    /// Validates and resolves `config`, and builds the parser from its reserved keys.
    pub fn new(executor: Arc<dyn Executor>, config: &QueryConfig) -> Result<Self, ConfigError> {
        Ok(AppState {
            executor,
            model: Arc::new(resolve(config)?),
            parser: Arc::new(config.parser()),
        })
    }
}
