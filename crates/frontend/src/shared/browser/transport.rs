use crate::shared::analysis::fetch::{HttpResponse, Transport};
use async_trait::async_trait;
use gloo_net::http::Request;

/// `fetch`-backed transport
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let response = Request::get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let status_text = response.status_text();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}
