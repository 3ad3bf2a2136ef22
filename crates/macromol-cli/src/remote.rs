use crate::error::{CliError, Result};
use futures_util::StreamExt;
use reqwest::StatusCode;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://files.rcsb.org/view";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub base_url: String,
    /// Reject unknown codes with an error instead of reporting nothing found.
    pub strict: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FetchProgress {
    Started { total_size: Option<u64> },
    Downloading { downloaded: u64 },
}

/// Uppercased code, or `None` when it cannot name a structure.
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    (!code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())).then(|| code.to_ascii_uppercase())
}

pub fn url_for(base_url: &str, code: &str) -> String {
    format!("{}/{}.pdb", base_url.trim_end_matches('/'), code)
}

/// Only a successful response holding a PDB file counts as found.
pub fn accepts(status: StatusCode, body: &str) -> bool {
    status == StatusCode::OK && body.starts_with("HEADER")
}

fn rejected(code: &str, strict: bool) -> Result<Option<String>> {
    if strict {
        return Err(CliError::InvalidCode {
            code: code.to_string(),
        });
    }
    info!("No structure found for code '{}'.", code);
    Ok(None)
}

/// Downloads the PDB file for `code`, returning `None` if the server does not have it.
pub async fn fetch(
    code: &str,
    settings: &FetchSettings,
    mut progress_callback: impl FnMut(FetchProgress),
) -> Result<Option<String>> {
    let Some(normalized) = normalize_code(code) else {
        return rejected(code, settings.strict);
    };
    let url = url_for(&settings.base_url, &normalized);

    info!("Sending request to {}", url);
    let client = reqwest::Client::new();
    let response = client.get(&url).send().await?;
    let status = response.status();
    debug!(%status, "Received response");

    let total_size = response.content_length();
    progress_callback(FetchProgress::Started { total_size });

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::with_capacity(total_size.unwrap_or(0) as usize);

    while let Some(item) = stream.next().await {
        let chunk = item?;
        buffer.extend_from_slice(&chunk);
        downloaded += chunk.len() as u64;
        progress_callback(FetchProgress::Downloading { downloaded });
    }

    let body = String::from_utf8_lossy(&buffer).into_owned();
    if accepts(status, &body) {
        info!("Downloaded {} bytes for {}", downloaded, normalized);
        Ok(Some(body))
    } else {
        rejected(&normalized, settings.strict)
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single HTTP request with `status_line` and `body`; returns the base URL.
    pub(crate) async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}", address)
    }
}
