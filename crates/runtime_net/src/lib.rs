use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};
use std::thread::{self, JoinHandle};

use bus::{CoreCommand, CoreEvent};
use core_types::RequestId;
use net::{FetchResult, NetConfig, build_client, fetch_text};

type CancelFlags = Arc<Mutex<HashMap<RequestId, Arc<AtomicBool>>>>;

/// Serve `CoreCommand`s until every sender is dropped.
///
/// Each fetch runs on its own worker; the outcome comes back as exactly one
/// `FetchDone` or `FetchError`, unless the request was cancelled first, in
/// which case nothing is sent.
pub fn start_net_runtime(
    cmd_rx: Receiver<CoreCommand>,
    evt_tx: Sender<CoreEvent>,
    config: NetConfig,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let client = match build_client(&config) {
            Ok(c) => c,
            Err(err) => {
                log::error!(target: "runtime_net", "{err}");
                return;
            }
        };

        // one cancel flag per in-flight request_id
        let cancels: CancelFlags = Arc::new(Mutex::new(HashMap::new()));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                CoreCommand::Fetch {
                    request_id,
                    kind,
                    url,
                } => {
                    let cancel = Arc::new(AtomicBool::new(false));
                    if let Ok(mut map) = cancels.lock() {
                        map.insert(request_id, cancel.clone());
                    }
                    log::debug!(target: "runtime_net", "fetch #{request_id} {kind:?} {url}");

                    let evt_tx = evt_tx.clone();
                    let cancels = cancels.clone();
                    let limit = if kind.wants_body() {
                        config.max_body_bytes
                    } else {
                        0
                    };

                    fetch_text(
                        client.clone(),
                        url,
                        limit,
                        cancel,
                        Arc::new(move |r: FetchResult| {
                            if let Ok(mut map) = cancels.lock() {
                                map.remove(&request_id);
                            }
                            let evt = match (r.status, r.error) {
                                (Some(status), None) => CoreEvent::FetchDone {
                                    request_id,
                                    kind,
                                    url: r.requested_url,
                                    status,
                                    body: r.body,
                                },
                                (_, error) => CoreEvent::FetchError {
                                    request_id,
                                    kind,
                                    url: r.requested_url,
                                    error: error.unwrap_or_else(|| "no response".to_string()),
                                },
                            };
                            let _ = evt_tx.send(evt);
                        }),
                    );
                }

                CoreCommand::CancelRequest { request_id } => {
                    let flag = cancels.lock().ok().and_then(|mut map| map.remove(&request_id));
                    if let Some(flag) = flag {
                        log::debug!(target: "runtime_net", "cancel #{request_id}");
                        flag.store(true, Ordering::Release);
                    }
                }
            }
        }
    })
}
