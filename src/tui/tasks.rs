//! Background execution of backend commands
//!
//! Each search or lookup runs as its own task and reports back over an
//! unbounded channel. Superseded searches are not cancelled; the controller
//! discards their completions by epoch.

use crate::api::SearchApi;
use crate::app::Command;
use crate::controller::Epoch;
use crate::error::ApiResult;
use crate::types::{Candidate, ItemDetail};
use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Network completion delivered back to the event loop
#[derive(Debug)]
pub enum Completion {
    Search {
        epoch: Epoch,
        result: ApiResult<Vec<Candidate>>,
    },
    Lookup {
        id: String,
        result: ApiResult<ItemDetail>,
    },
}

pub async fn run_search(api: &dyn SearchApi, epoch: Epoch, query: &str, limit: usize) -> Completion {
    let result = api
        .search(query, limit)
        .await
        .map(|response| response.results);
    Completion::Search { epoch, result }
}

pub async fn run_lookup(api: &dyn SearchApi, id: &str) -> Completion {
    let result = api.fetch_by_id(id).await;
    Completion::Lookup {
        id: id.to_string(),
        result,
    }
}

/// Spawn the task for `command`. `Quit` has no task.
pub fn spawn_command(
    api: Arc<dyn SearchApi>,
    command: Command,
    limit: usize,
    completion_tx: mpsc::UnboundedSender<Completion>,
) -> Option<JoinHandle<()>> {
    let handle = match command {
        Command::Search { epoch, query } => tokio::spawn(async move {
            let completion = run_search(api.as_ref(), epoch, &query, limit).await;
            if completion_tx.send(completion).is_err() {
                debug!("Search completion for epoch {} dropped after shutdown", epoch);
            }
        }),
        Command::Lookup { id } => tokio::spawn(async move {
            let completion = run_lookup(api.as_ref(), &id).await;
            if completion_tx.send(completion).is_err() {
                debug!("Lookup completion for {} dropped after shutdown", id);
            }
        }),
        Command::Quit => return None,
    };
    Some(handle)
}
