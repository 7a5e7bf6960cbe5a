//! In-memory camera and discovery doubles shared by the unit tests.

use crate::camera::{
    BrowseRequest, BrowseResponse, Camera, CameraClient, CameraDiscovery, DeviceInfo,
    ServiceEndpoint,
};
use crate::error::{ContentDirectoryError, FetchError};
use crate::media::{MediaClass, RemoteObject, Resource};
use crate::notifier::{CommandExecutor, CommandOutcome};
use crate::upnp::didl::render_didl;
use crate::upnp::CONTENT_DIRECTORY_SERVICE;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Browse { start: u32, count: u32 },
    Destroy(String),
    Download(String),
}

#[derive(Default)]
struct FakeState {
    objects: Vec<RemoteObject>,
    payloads: HashMap<String, Vec<u8>>,
    failing_downloads: HashSet<String>,
    failing_deletes: HashSet<String>,
    browse_failures: u32,
    calls: Vec<Call>,
    cancel_on_download: Option<(usize, CancellationToken)>,
    downloads: usize,
}

/// A camera media server holding objects in memory
#[derive(Default)]
pub(crate) struct FakeCamera {
    state: Mutex<FakeState>,
}

impl FakeCamera {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// List `object` and serve `payload` for its primary resource
    pub fn add(&self, object: RemoteObject, payload: &[u8]) {
        let mut state = self.state.lock();
        if let Some(res) = object.primary_resource() {
            state.payloads.insert(res.uri.clone(), payload.to_vec());
        }
        state.objects.push(object);
    }

    /// Serve bytes at a URL that is not listed, like an unlisted RAW sibling
    pub fn serve(&self, url: &str, payload: &[u8]) {
        self.state.lock().payloads.insert(url.to_string(), payload.to_vec());
    }

    pub fn fail_download(&self, url: &str) {
        self.state.lock().failing_downloads.insert(url.to_string());
    }

    pub fn fail_delete(&self, object_id: &str) {
        self.state.lock().failing_deletes.insert(object_id.to_string());
    }

    pub fn fail_next_browses(&self, count: u32) {
        self.state.lock().browse_failures = count;
    }

    /// Cancel `token` once the `nth` download (1-based) has completed
    pub fn cancel_after_downloads(&self, nth: usize, token: CancellationToken) {
        self.state.lock().cancel_on_download = Some((nth, token));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Destroy(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Download(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn remaining(&self) -> Vec<String> {
        self.state.lock().objects.iter().map(|o| o.id.clone()).collect()
    }
}

#[async_trait]
impl CameraClient for FakeCamera {
    async fn browse(&self, request: &BrowseRequest) -> Result<BrowseResponse, ContentDirectoryError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Browse {
            start: request.starting_index,
            count: request.requested_count,
        });
        if state.browse_failures > 0 {
            state.browse_failures -= 1;
            return Err(ContentDirectoryError::Transport {
                action: "Browse".to_string(),
                details: "connection refused".to_string(),
            });
        }

        let total = state.objects.len();
        let start = (request.starting_index as usize).min(total);
        let end = (start + request.requested_count as usize).min(total);
        let page = &state.objects[start..end];
        Ok(BrowseResponse {
            result: render_didl(page),
            number_returned: page.len() as u32,
            total_matches: total as u32,
            update_id: None,
        })
    }

    async fn destroy_object(&self, object_id: &str) -> Result<(), ContentDirectoryError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Destroy(object_id.to_string()));
        let position = state.objects.iter().position(|o| o.id == object_id);
        match position {
            Some(_) if state.failing_deletes.contains(object_id) => {
                Err(ContentDirectoryError::Fault {
                    action: "DestroyObject".to_string(),
                    code: 501,
                    description: "Action Failed".to_string(),
                })
            }
            Some(index) => {
                state.objects.remove(index);
                Ok(())
            }
            None => Err(ContentDirectoryError::Fault {
                action: "DestroyObject".to_string(),
                code: 701,
                description: "No such object".to_string(),
            }),
        }
    }

    async fn download(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, FetchError> {
        let (payload, failing) = {
            let mut state = self.state.lock();
            state.calls.push(Call::Download(url.to_string()));
            (
                state.payloads.get(url).cloned(),
                state.failing_downloads.contains(url),
            )
        };

        let Some(payload) = payload else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };

        let write = |source: std::io::Error| FetchError::Write {
            url: url.to_string(),
            source,
        };
        if failing {
            let half = payload.len() / 2;
            sink.write_all(&payload[..half]).await.map_err(write)?;
            return Err(FetchError::Transport {
                url: url.to_string(),
                details: "connection reset".to_string(),
            });
        }
        sink.write_all(&payload).await.map_err(write)?;

        let cancel = {
            let mut state = self.state.lock();
            state.downloads += 1;
            match &state.cancel_on_download {
                Some((nth, token)) if *nth == state.downloads => Some(token.clone()),
                _ => None,
            }
        };
        if let Some(token) = cancel {
            token.cancel();
        }
        Ok(payload.len() as u64)
    }
}

/// Discovery that replays scripted rounds, then keeps returning the last one
pub(crate) struct FakeDiscovery {
    rounds: Mutex<VecDeque<Vec<Camera>>>,
    last: Mutex<Vec<Camera>>,
    calls: Mutex<usize>,
}

impl FakeDiscovery {
    pub fn new(rounds: Vec<Vec<Camera>>) -> Arc<Self> {
        Arc::new(Self {
            rounds: Mutex::new(rounds.into()),
            last: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl CameraDiscovery for FakeDiscovery {
    async fn discover(&self, _timeout: Duration) -> Vec<Camera> {
        *self.calls.lock() += 1;
        match self.rounds.lock().pop_front() {
            Some(round) => {
                *self.last.lock() = round.clone();
                round
            }
            None => self.last.lock().clone(),
        }
    }
}

pub(crate) fn device(name: &str) -> DeviceInfo {
    DeviceInfo {
        friendly_name: name.to_string(),
        location: format!("http://{}.local:60606/Server0/ddd", name.to_lowercase()),
        manufacturer: "Panasonic".to_string(),
        device_type: "urn:schemas-upnp-org:device:MediaServer:1".to_string(),
        model_name: "LUMIX".to_string(),
        udn: None,
        content_directory: Some(ServiceEndpoint {
            service_type: CONTENT_DIRECTORY_SERVICE.to_string(),
            control_url: format!("http://{}.local:60606/Server0/CDS_control", name.to_lowercase()),
        }),
    }
}

pub(crate) fn camera(name: &str, client: Arc<FakeCamera>) -> Camera {
    Camera::new(device(name), client)
}

fn object(id: &str, title: &str, class: MediaClass, uri: String, mime: &str) -> RemoteObject {
    RemoteObject {
        id: id.to_string(),
        title: title.to_string(),
        class,
        resources: vec![Resource {
            uri,
            size: Some(1024),
            protocol_info: Some(format!("http-get:*:{}:*", mime)),
        }],
    }
}

pub(crate) fn jpeg(id: &str, title: &str) -> RemoteObject {
    object(id, title, MediaClass::Image, format!("http://cam/{}.JPG", title), "image/jpeg")
}

pub(crate) fn rw2(id: &str, title: &str) -> RemoteObject {
    object(id, title, MediaClass::Image, format!("http://cam/{}.RW2", title), "image/x-panasonic-rw2")
}

pub(crate) fn mp4(id: &str, title: &str) -> RemoteObject {
    object(id, title, MediaClass::Video, format!("http://cam/{}.MP4", title), "video/mp4")
}

/// Command executor that records commands instead of running them
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    pub commands: Mutex<Vec<String>>,
    pub exit_code: Option<i32>,
    pub fail_to_start: bool,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, String> {
        self.commands.lock().push(command.to_string());
        if self.fail_to_start {
            return Err("sh: not found".to_string());
        }
        Ok(CommandOutcome {
            code: Some(self.exit_code.unwrap_or(0)),
        })
    }
}
