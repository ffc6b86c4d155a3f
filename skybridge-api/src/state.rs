use skybridge_core::Coordinator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}
