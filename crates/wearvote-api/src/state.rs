use std::path::PathBuf;
use std::sync::Arc;

use wearvote_db::Store;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<Store>,
    /// Where uploaded media is written; served under `/uploads`.
    pub uploads_dir: PathBuf,
}

impl AppStateInner {
    /// Run a store call off the async runtime.
    pub(crate) async fn blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> wearvote_db::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
    }
}
