//! [`RemoteFs`] over the file service's HTTP API.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response};
use rfe_core::{
    ClientConfig, Entry, MetaUpdate, MoveReceipt, ProgressFn, RemoteError, RemoteFs, RemoteResult,
    ShareRequest, ShareResponse, StatInfo, SystemStats, UploadFile,
};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use url::Url;

use crate::wire::{
    PathBody, RenameBody, SaveBody, SearchBody, TransferBody, UndoBody, ZipMultipleBody,
    status_error, transport_error,
};

/// HTTP client for one file service.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base: Url,
    chunk_size: usize,
}

impl HttpRemote {
    /// Create a client for `config.base_url`.
    pub fn new(config: &ClientConfig) -> RemoteResult<Self> {
        let base = parse_base(&config.base_url)?;
        let client = Client::builder()
            .user_agent(concat!("rfe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            base,
            chunk_size: config.upload_chunk_size.max(1),
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of an API endpoint such as `list` or `zip/multiple`.
    pub fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("api");
            segments.extend(name.split('/'));
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        trace!(url = %response.url(), %status, "Response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        let response = self.send(request).await?;
        let text = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&text).map_err(|e| RemoteError::decode(e.to_string()))
    }

    async fn bytes(&self, request: RequestBuilder) -> RemoteResult<Vec<u8>> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    async fn unit(&self, request: RequestBuilder) -> RemoteResult<()> {
        self.send(request).await.map(|_| ())
    }

    fn get(&self, name: &str) -> RequestBuilder {
        self.client.get(self.endpoint(name))
    }

    fn post(&self, name: &str) -> RequestBuilder {
        self.client.post(self.endpoint(name))
    }
}

/// Parse and validate a server base URL.
pub fn parse_base(base_url: &str) -> RemoteResult<Url> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| RemoteError::transport(format!("Invalid server URL {base_url}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RemoteError::transport(format!(
            "Unsupported scheme {other} in {base_url}"
        ))),
    }
}

/// Split `data` into owned chunks of at most `size` bytes.
fn chunked(data: &[u8], size: usize) -> Vec<Vec<u8>> {
    data.chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}

#[async_trait]
impl RemoteFs for HttpRemote {
    async fn list(&self, path: &str, only_dirs: bool) -> RemoteResult<Vec<Entry>> {
        let request = self
            .get("list")
            .query(&[("path", path), ("only_dirs", if only_dirs { "true" } else { "false" })]);
        self.json(request).await
    }

    async fn search(&self, path: &str, query: &str) -> RemoteResult<Vec<Entry>> {
        self.json(self.post("search").json(&SearchBody { path, query }))
            .await
    }

    async fn read(&self, path: &str) -> RemoteResult<String> {
        let response = self.send(self.get("read").query(&[("path", path)])).await?;
        response.text().await.map_err(transport_error)
    }

    async fn save(&self, path: &str, content: &str) -> RemoteResult<()> {
        self.unit(self.post("save").json(&SaveBody { path, content }))
            .await
    }

    async fn mkdir(&self, path: &str) -> RemoteResult<()> {
        self.unit(self.post("mkdir").json(&PathBody { path })).await
    }

    async fn rename(&self, path: &str, new_name: &str) -> RemoteResult<()> {
        self.unit(self.post("rename").json(&RenameBody { path, new_name }))
            .await
    }

    async fn delete(&self, path: &str) -> RemoteResult<()> {
        self.unit(self.post("delete").json(&PathBody { path })).await
    }

    async fn move_to(&self, source: &str, destination: &str) -> RemoteResult<MoveReceipt> {
        self.json(self.post("move").json(&TransferBody {
            source,
            destination,
        }))
        .await
    }

    async fn copy_to(&self, source: &str, destination: &str) -> RemoteResult<()> {
        self.unit(self.post("copy").json(&TransferBody {
            source,
            destination,
        }))
        .await
    }

    async fn undo(&self, token: &str) -> RemoteResult<()> {
        self.unit(self.post("undo").json(&UndoBody { token })).await
    }

    async fn upload(
        &self,
        dest: &str,
        file: &UploadFile,
        progress: &ProgressFn,
    ) -> RemoteResult<()> {
        let total = file.len();
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let stream = futures::stream::iter(chunked(&file.data, self.chunk_size)).map(move |chunk| {
            let _ = tx.send(chunk.len() as u64);
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.name.clone());
        let mut form = Form::new().part("file", part);
        if let Some(rel_path) = &file.rel_path {
            form = form.text("rel_path", rel_path.clone());
        }

        let request = self.post("upload").query(&[("dest", dest)]).multipart(form);
        let response = request.send();
        tokio::pin!(response);

        progress(0, total);
        let mut sent = 0u64;
        let result = loop {
            tokio::select! {
                Some(n) = rx.recv() => {
                    sent += n;
                    progress(sent.min(total), total);
                }
                result = &mut response => break result,
            }
        };

        let response = result.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }
        progress(total, total);
        debug!(dest, name = %file.name, bytes = total, "Uploaded");
        Ok(())
    }

    async fn stat(&self, path: &str) -> RemoteResult<StatInfo> {
        self.json(self.get("stat").query(&[("path", path)])).await
    }

    async fn update_meta(&self, update: &MetaUpdate) -> RemoteResult<()> {
        self.unit(self.post("update_meta").json(update)).await
    }

    async fn download(&self, path: &str) -> RemoteResult<Vec<u8>> {
        self.bytes(self.get("file").query(&[("path", path)])).await
    }

    async fn zip(&self, path: &str, fast: bool) -> RemoteResult<Vec<u8>> {
        let request = self
            .get("zip")
            .query(&[("path", path), ("fast", if fast { "true" } else { "false" })]);
        self.bytes(request).await
    }

    async fn zip_multiple(&self, paths: &[String]) -> RemoteResult<Vec<u8>> {
        self.bytes(self.post("zip/multiple").json(&ZipMultipleBody { paths, fast: false }))
            .await
    }

    async fn pins(&self) -> RemoteResult<Vec<String>> {
        self.json(self.get("pins")).await
    }

    async fn pin(&self, path: &str) -> RemoteResult<()> {
        self.unit(self.post("pins").json(&PathBody { path })).await
    }

    async fn unpin(&self, path: &str) -> RemoteResult<()> {
        let request = self
            .client
            .delete(self.endpoint("pins"))
            .query(&[("path", path)]);
        self.unit(request).await
    }

    async fn roots(&self) -> RemoteResult<Vec<String>> {
        self.json(self.get("roots")).await
    }

    async fn create_share(&self, request: &ShareRequest) -> RemoteResult<ShareResponse> {
        self.json(self.post("share/create").json(request)).await
    }

    async fn monitor_stats(&self, path: &str) -> RemoteResult<SystemStats> {
        self.json(self.get("monitor/stats").query(&[("path", path)]))
            .await
    }

    fn resource_url(&self, path: &str) -> String {
        let mut url = self.endpoint("open");
        url.query_pairs_mut().append_pair("path", path);
        url.into()
    }
}
