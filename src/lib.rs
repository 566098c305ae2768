pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod infra;
pub mod view;

use crate::infra::store::StoreClient;

#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
}
