use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;

/// Transport used for every feed GET. Swapped for an in-memory fake in
/// tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
