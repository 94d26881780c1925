/// Concurrent gather of independent view calls
use crate::caller::ContractCaller;
use crate::error::CallError;
use crate::types::{Value, ViewCallRequest};
use futures::future::join_all;
use tracing::debug;

/// One request of a batch with its own outcome
#[derive(Debug)]
pub struct BatchEntry {
    pub request: ViewCallRequest,
    pub result: Result<Value, CallError>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Issue every request concurrently.
///
/// Returns one entry per request, in request order; a failing call never
/// affects its siblings.
pub async fn call_views(caller: &dyn ContractCaller, requests: Vec<ViewCallRequest>) -> Vec<BatchEntry> {
    let calls = requests.iter().map(|req| caller.call_view(&req.contract, &req.method, &req.args));
    let results = join_all(calls).await;

    let entries: Vec<BatchEntry> = requests
        .into_iter()
        .zip(results)
        .map(|(request, result)| BatchEntry { request, result })
        .collect();

    debug!(
        total = entries.len(),
        failed = entries.iter().filter(|e| !e.is_ok()).count(),
        "Batch completed"
    );
    entries
}
