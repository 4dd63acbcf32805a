//! A minimal in-process HTTP server standing in for the CMS.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use songbook_lib::CmsClient;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use url::Url;

type Handler = Arc<dyn Fn(&Url) -> (u16, String) + Send + Sync>;

/// Serves canned responses and records every requested URL.
pub struct FakeCms {
    base: Url,
    requests: Arc<Mutex<Vec<Url>>>,
    server: JoinHandle<()>,
}

impl FakeCms {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Url) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = Url::parse(&format!("http://{}", addr)).unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let server = {
            let base = base.clone();
            let requests = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let base = base.clone();
                    let requests = Arc::clone(&requests);
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        serve(stream, &base, &requests, &handler).await;
                    });
                }
            })
        };

        Self {
            base,
            requests,
            server,
        }
    }

    pub fn client(&self) -> CmsClient {
        CmsClient::builder().url(self.base.as_str()).build().unwrap()
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    /// Value of a query parameter of the `n`th request.
    pub fn param(&self, n: usize, name: &str) -> Option<String> {
        let requests = self.requests();
        requests[n]
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

impl Drop for FakeCms {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve(mut stream: TcpStream, base: &Url, requests: &Mutex<Vec<Url>>, handler: &Handler) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let target = head.split_whitespace().nth(1).unwrap_or("/");
    let url = base.join(target).unwrap();
    requests.lock().unwrap().push(url.clone());

    let (status, body) = handler(&url);
    let response = format!(
        "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Lets spawned tasks run.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
