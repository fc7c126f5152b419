mod runner;
mod shutdown;

use std::sync::Arc;

use crate::{controllers::http_api::HttpApiRouter, sync::SyncEngine};

pub(crate) struct RuntimeDeps {
    pub(crate) sync_engine: Arc<SyncEngine>,
    pub(crate) http_router: Option<HttpApiRouter>,
}

pub(crate) use runner::run;
