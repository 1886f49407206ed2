use serde::Deserialize;

use crate::store::RecordStore;
use crate::tasks::TaskTable;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: RecordStore,
    pub tasks: TaskTable,
}

impl AppState {
    pub fn new() -> AppState {
        AppState {
            store: RecordStore::new(),
            tasks: TaskTable::new(),
        }
    }
}
