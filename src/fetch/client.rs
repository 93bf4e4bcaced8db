use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Lets the handover provider run against a
/// plain client in production and any wrapper in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
