use reqwest::Url;

/// Provides access to the clients used to talk to systems outside the application, so
/// driven adapters don't need to know how those clients were built
pub trait ExternalConnectivity: Sync {
    /// The HTTP client every backend request goes through
    fn http_client(&self) -> &reqwest_middleware::ClientWithMiddleware;

    /// Resolves a backend path (such as "/tasks/") against the configured API base URL
    fn endpoint(&self, path: &str) -> Result<Url, anyhow::Error>;
}
