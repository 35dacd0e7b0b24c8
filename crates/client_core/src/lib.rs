use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{FoodId, FoodItem},
    error::ApiError,
    protocol::{food_route, CreateFoodRequest, UpdateFoodRequest, FOODS_ROUTE},
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod error;
pub mod view;

pub use controller::{DashboardEvent, DashboardState, FoodListController};
pub use error::RemoteCallError;
pub use view::{AddDialogView, DashboardView, EditDialogView, FoodAction, FoodCardView};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The remote collection of food items.
#[async_trait]
pub trait FoodApi: Send + Sync {
    async fn list_foods(&self) -> Result<Vec<FoodItem>, RemoteCallError>;
    async fn create_food(&self, request: &CreateFoodRequest) -> Result<FoodItem, RemoteCallError>;
    async fn update_food(
        &self,
        food_id: FoodId,
        request: &UpdateFoodRequest,
    ) -> Result<FoodItem, RemoteCallError>;
    async fn delete_food(&self, food_id: FoodId) -> Result<(), RemoteCallError>;
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn parse(base_url: &str) -> Result<Self, RemoteCallError> {
        Ok(Self::new(Url::parse(base_url.trim())?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct HttpFoodApi {
    http: Client,
    base_url: String,
}

impl HttpFoodApi {
    pub fn new(config: ApiConfig) -> Result<Self, RemoteCallError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteCallError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }
}

/// Passes 2xx responses through; turns anything else into a
/// [`RemoteCallError`], decoding the server's error body when there is one.
async fn ensure_success(response: Response) -> Result<Response, RemoteCallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let bytes = response.bytes().await?;
    match serde_json::from_slice::<ApiError>(&bytes) {
        Ok(api_error) => Err(RemoteCallError::Rejected {
            status: status.as_u16(),
            source: api_error.into(),
        }),
        Err(_) => Err(RemoteCallError::Status {
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl FoodApi for HttpFoodApi {
    async fn list_foods(&self) -> Result<Vec<FoodItem>, RemoteCallError> {
        let url = self.endpoint(FOODS_ROUTE)?;
        debug!(%url, "GET foods");
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_food(&self, request: &CreateFoodRequest) -> Result<FoodItem, RemoteCallError> {
        let url = self.endpoint(FOODS_ROUTE)?;
        debug!(%url, name = %request.name, "POST food");
        let response = self.http.post(url).json(request).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn update_food(
        &self,
        food_id: FoodId,
        request: &UpdateFoodRequest,
    ) -> Result<FoodItem, RemoteCallError> {
        let url = self.endpoint(&food_route(food_id))?;
        debug!(%url, "PUT food");
        let response = self.http.put(url).json(request).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete_food(&self, food_id: FoodId) -> Result<(), RemoteCallError> {
        let url = self.endpoint(&food_route(food_id))?;
        debug!(%url, "DELETE food");
        let response = self.http.delete(url).send().await?;
        // The response body carries nothing the client needs.
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
