/*!
 * Minimal HTTP server answering every request with the same canned response.
 *
 * Used to drive the lookup client through success and failure paths without
 * reaching a real violation service.
 */

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the server does with each request
#[derive(Debug, Clone)]
pub enum CannedResponse {
    /// Answer with a status and a JSON body
    Json(u16, String),
    /// Answer with a status and a plain text body
    Text(u16, String),
    /// Accept the connection and never answer
    Silent,
}

/// Running canned server; stops when dropped
pub struct CannedServer {
    addr: SocketAddr,
    request_lines: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl CannedServer {
    /// Bind to an ephemeral local port and start answering
    pub async fn start(response: CannedResponse) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let request_lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&request_lines);

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let response = response.clone();
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    let _ = serve(stream, response, captured).await;
                });
            }
        });

        Ok(Self {
            addr,
            request_lines,
            handle,
        })
    }

    /// Base URL with the `/api` prefix the service uses
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Request lines received so far, e.g. `GET /api/test HTTP/1.1`
    pub fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().unwrap().clone()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    response: CannedResponse,
    captured: Arc<Mutex<Vec<String>>>,
) -> Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }

    let text = String::from_utf8_lossy(&request);
    if let Some(line) = text.lines().next() {
        captured.lock().unwrap().push(line.to_string());
    }

    let (status, content_type, body) = match response {
        CannedResponse::Json(status, body) => (status, "application/json", body),
        CannedResponse::Text(status, body) => (status, "text/plain", body),
        CannedResponse::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return Ok(());
        }
    };

    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        content_type,
        body.len(),
        body
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A local address nothing is listening on
pub async fn refused_base_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/api", addr))
}
