//! HTTP implementation of [`JudgeApi`] against the judging backend.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, Response, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    api::{
        JudgeApi,
        error::{ApiError, ApiResult},
    },
    config::ClientConfig,
    dto::{
        catalog::{
            CompetitionDraft, CompetitionPatch, CriterionDraft, CriterionPatch, PromptDraft,
            PromptPatch,
        },
        judgement::{JudgementWire, PhotoUpload},
    },
    state::model::{Competition, Criterion, EntityId, Judgement, Prompt},
};

/// Backend client for the judging REST API.
#[derive(Clone)]
pub struct HttpJudgeApi {
    client: Client,
    base_url: Arc<str>,
}

#[derive(Serialize)]
struct GuidelinesRequest {
    competition_name: String,
}

#[derive(Deserialize)]
struct GuidelinesResponse {
    guidelines: String,
}

/// FastAPI-style error payload.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl HttpJudgeApi {
    /// Build a client against the configured backend URL.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.api_url().trim_end_matches('/')),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client.request(method, url)
    }

    async fn get_json<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|source| ApiError::Send {
                path: path.to_string(),
                source,
            })?;

        let response = into_success(response, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode {
                path: path.to_string(),
                source,
            })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Send {
                path: path.to_string(),
                source,
            })?;

        let response = into_success(response, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode {
                path: path.to_string(),
                source,
            })
    }

    /// DELETE the target, discarding whatever body the backend answers with.
    async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self
            .request(Method::DELETE, path)
            .send()
            .await
            .map_err(|source| ApiError::Send {
                path: path.to_string(),
                source,
            })?;

        into_success(response, path).await.map(|_| ())
    }
}

async fn into_success(response: Response, path: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Surface the backend's `detail` message when it sends one.
    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    Err(ApiError::Status {
        path: path.to_string(),
        status,
        detail: body.detail.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        }),
    })
}

impl JudgeApi for HttpJudgeApi {
    fn list_competitions(&self) -> BoxFuture<'static, ApiResult<Vec<Competition>>> {
        let api = self.clone();
        Box::pin(async move { api.get_json("competitions/").await })
    }

    fn create_competition(
        &self,
        draft: CompetitionDraft,
    ) -> BoxFuture<'static, ApiResult<Competition>> {
        let api = self.clone();
        Box::pin(async move { api.send_json(Method::POST, "competitions/", &draft).await })
    }

    fn update_competition(
        &self,
        id: EntityId,
        patch: CompetitionPatch,
    ) -> BoxFuture<'static, ApiResult<Competition>> {
        let api = self.clone();
        Box::pin(async move {
            api.send_json(Method::PUT, &format!("competitions/{id}"), &patch)
                .await
        })
    }

    fn delete_competition(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move { api.delete(&format!("competitions/{id}")).await })
    }

    fn generate_guidelines(
        &self,
        competition_name: String,
    ) -> BoxFuture<'static, ApiResult<String>> {
        let api = self.clone();
        Box::pin(async move {
            let request = GuidelinesRequest { competition_name };
            let response: GuidelinesResponse = api
                .send_json(Method::POST, "competitions/generate-guidelines", &request)
                .await?;
            Ok(response.guidelines)
        })
    }

    fn list_criteria(&self) -> BoxFuture<'static, ApiResult<Vec<Criterion>>> {
        let api = self.clone();
        Box::pin(async move { api.get_json("criteria/").await })
    }

    fn create_criterion(&self, draft: CriterionDraft) -> BoxFuture<'static, ApiResult<Criterion>> {
        let api = self.clone();
        Box::pin(async move { api.send_json(Method::POST, "criteria/", &draft).await })
    }

    fn update_criterion(
        &self,
        id: EntityId,
        patch: CriterionPatch,
    ) -> BoxFuture<'static, ApiResult<Criterion>> {
        let api = self.clone();
        Box::pin(async move {
            api.send_json(Method::PUT, &format!("criteria/{id}"), &patch)
                .await
        })
    }

    fn delete_criterion(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move { api.delete(&format!("criteria/{id}")).await })
    }

    fn list_prompts(&self) -> BoxFuture<'static, ApiResult<Vec<Prompt>>> {
        let api = self.clone();
        Box::pin(async move { api.get_json("prompts/").await })
    }

    fn create_prompt(&self, draft: PromptDraft) -> BoxFuture<'static, ApiResult<Prompt>> {
        let api = self.clone();
        Box::pin(async move { api.send_json(Method::POST, "prompts/", &draft).await })
    }

    fn update_prompt(
        &self,
        id: EntityId,
        patch: PromptPatch,
    ) -> BoxFuture<'static, ApiResult<Prompt>> {
        let api = self.clone();
        Box::pin(async move {
            api.send_json(Method::PUT, &format!("prompts/{id}"), &patch)
                .await
        })
    }

    fn delete_prompt(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move { api.delete(&format!("prompts/{id}")).await })
    }

    fn submit_batch(
        &self,
        competition_id: EntityId,
        photos: Vec<PhotoUpload>,
    ) -> BoxFuture<'static, ApiResult<Vec<Judgement>>> {
        const PATH: &str = "judge-batch/";

        let api = self.clone();
        Box::pin(async move {
            debug!(competition_id, photos = photos.len(), "submitting photo batch");

            let mut form =
                multipart::Form::new().text("competition_id", competition_id.to_string());
            for photo in photos {
                let part = multipart::Part::bytes(photo.bytes)
                    .file_name(photo.file_name)
                    .mime_str(&photo.media_type)
                    .map_err(|source| ApiError::Send {
                        path: PATH.to_string(),
                        source,
                    })?;
                form = form.part("files", part);
            }

            let response = api
                .request(Method::POST, PATH)
                .multipart(form)
                .send()
                .await
                .map_err(|source| ApiError::Send {
                    path: PATH.to_string(),
                    source,
                })?;

            let response = into_success(response, PATH).await?;
            let wires =
                response
                    .json::<Vec<JudgementWire>>()
                    .await
                    .map_err(|source| ApiError::Decode {
                        path: PATH.to_string(),
                        source,
                    })?;
            Ok(wires.into_iter().map(Judgement::from).collect())
        })
    }

    fn list_judgements(
        &self,
        competition_id: EntityId,
    ) -> BoxFuture<'static, ApiResult<Vec<Judgement>>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("competitions/{competition_id}/judgements");
            let wires = api.get_json::<Vec<JudgementWire>>(&path).await?;
            Ok(wires.into_iter().map(Judgement::from).collect())
        })
    }

    fn delete_judgement(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move { api.delete(&format!("judgements/{id}")).await })
    }

    fn image_url(&self, stored_filename: &str) -> Option<String> {
        Some(format!("{}/images/{}", self.base_url, stored_filename))
    }
}
