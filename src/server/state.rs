use crate::core::search::DogSearch;
use crate::domain::ports::DogApi;
use std::sync::Arc;

pub struct AppState {
    pub api: Arc<dyn DogApi>,
    pub search: DogSearch<dyn DogApi>,
    pub cookie_name: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(api: Arc<dyn DogApi>, cookie_name: impl Into<String>) -> SharedState {
        Arc::new(Self {
            search: DogSearch::new(Arc::clone(&api)),
            api,
            cookie_name: cookie_name.into(),
        })
    }
}
