//! Test server wrapper that starts Quill on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use quill_config::Config;
use quill_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    stt: Arc<stt::Server>,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(&config)?;
        let stt = server.stt();
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            addr,
            shutdown,
            client,
            stt,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Upload `data` as the `audio` field of `POST /stt`
    pub async fn upload(&self, filename: &str, content_type: &str, data: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_owned())
            .mime_str(content_type)
            .expect("valid content type");
        let form = reqwest::multipart::Form::new().part("audio", part);

        self.client
            .post(self.url("/stt"))
            .multipart(form)
            .send()
            .await
            .expect("request reaches test server")
    }

    /// Wait for every in-flight relay and deferred cleanup to finish
    pub async fn settle(&self) {
        self.stt.drain().await;
    }

    /// Number of files currently in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.stt.store().dir()).map_or(0, Iterator::count)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
