use anyhow::{anyhow, Context, Result};
use log::debug;
use tivoo_core::Document;

/// Reads a feed from a local path or an `http(s)://` URL.
pub async fn fetch(source: &str) -> Result<Document> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        debug!("Sending HTTP request to {source}");
        let resp = reqwest::get(source).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Got response status {status} from {source}"));
        }

        debug!("Reading response body");
        resp.text().await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {source}"))?
    };

    Ok(Document::new(source, text))
}
