use reqwest::{multipart, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use agentchat_logging::{log_request, log_response};
use agentchat_types::{Conversation, KbFile, KnowledgeBase, Message, QuickUploadResult};

use crate::models::{
    ConversationsResponse, CreateKbRequest, CreateUserResponse, FilesResponse, HistoryResponse,
    KnowledgeBasesResponse, StreamRequest, TitleUpdate, UploadFile,
};
use crate::sse::{consume_stream, StreamObserver, StreamOutcome};
use crate::ApiError;

/// Client for the agent server's REST and streaming endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    verbose: bool,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
            verbose: false,
        }
    }

    /// Print request and stream debug banners to stderr
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request<B: Serialize>(&self, method: Method, url: Url, body: Option<&B>) -> RequestBuilder {
        let json = body.and_then(|b| serde_json::to_value(b).ok());
        log_request(method.as_str(), url.as_str(), json.as_ref(), self.verbose);

        let builder = self.client.request(method, url);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    /// Send and fail on non-2xx, reading the `{error}` body into the message
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        log_response(status, &url, Some(body.as_str()), self.verbose);

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;
        log_response(status, &url, Some(body.as_str()), self.verbose);
        Ok(serde_json::from_str(&body)?)
    }

    // ========================================================================
    // Users and conversations
    // ========================================================================

    /// Register an anonymous user and return the server-issued id
    pub async fn create_user(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&["api", "user", "create"])?;
        let builder = self.request::<()>(Method::POST, url, None);
        let created: CreateUserResponse = self.send_json(builder).await?;
        Ok(created.user_id)
    }

    /// Post a message and stream the reply into `observer`
    pub async fn stream_message<O>(
        &self,
        request: &StreamRequest,
        observer: &mut O,
    ) -> Result<StreamOutcome, ApiError>
    where
        O: StreamObserver + ?Sized,
    {
        let url = self.endpoint(&["api", "finance-assistant", "stream"])?;
        let builder = self.request(Method::POST, url, Some(request));
        let response = self.send(builder).await?;
        log_response(response.status(), response.url().as_str(), None, self.verbose);

        consume_stream(response.bytes_stream(), observer, self.verbose).await
    }

    pub async fn list_conversations(
        &self,
        user_id: &str,
        agent_name: &str,
    ) -> Result<Vec<Conversation>, ApiError> {
        let mut url = self.endpoint(&["api", "user", user_id, "conversations"])?;
        url.query_pairs_mut().append_pair("agentName", agent_name);
        let builder = self.request::<()>(Method::GET, url, None);
        let listed: ConversationsResponse = self.send_json(builder).await?;
        Ok(listed.conversations.into_iter().map(Conversation::from).collect())
    }

    pub async fn conversation_history(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let url = self.endpoint(&["api", "conversation", conversation_id, "history"])?;
        let builder = self.request::<()>(Method::GET, url, None);
        let history: HistoryResponse = self.send_json(builder).await?;
        Ok(history.messages.into_iter().map(Message::from).collect())
    }

    pub async fn update_conversation_title(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "conversation", conversation_id])?;
        let builder = self.request(Method::PATCH, url, Some(&TitleUpdate { title }));
        self.send(builder).await?;
        Ok(())
    }

    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "conversation", conversation_id])?;
        let builder = self.request::<()>(Method::DELETE, url, None);
        self.send(builder).await?;
        Ok(())
    }

    // ========================================================================
    // Knowledge bases
    // ========================================================================

    /// Single-file upload used from the chat screen
    pub async fn quick_upload(&self, file: &UploadFile) -> Result<QuickUploadResult, ApiError> {
        let url = self.endpoint(&["api", "kb", "upload"])?;
        let form = multipart::Form::new().part("file", file_part(file));
        let builder = self.request::<()>(Method::POST, url, None).multipart(form);
        self.send_json(builder).await
    }

    pub async fn list_knowledge_bases(&self, agent_name: &str) -> Result<Vec<KnowledgeBase>, ApiError> {
        let url = self.endpoint(&["api", "kb", "list", agent_name])?;
        let builder = self.request::<()>(Method::GET, url, None);
        let listed: KnowledgeBasesResponse = self.send_json(builder).await?;
        Ok(listed.knowledge_bases)
    }

    pub async fn list_kb_files(&self, kb_id: &str) -> Result<Vec<KbFile>, ApiError> {
        let url = self.endpoint(&["api", "kb", kb_id, "files"])?;
        let builder = self.request::<()>(Method::GET, url, None);
        let listed: FilesResponse = self.send_json(builder).await?;
        Ok(listed.files)
    }

    pub async fn create_knowledge_base(
        &self,
        agent_name: &str,
        name: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "kb", "create"])?;
        let body = CreateKbRequest {
            agent_name,
            name,
            description,
        };
        let builder = self.request(Method::POST, url, Some(&body));
        self.send(builder).await?;
        Ok(())
    }

    /// Upload one file with its tags, sent as a JSON array form field
    pub async fn upload_kb_file(
        &self,
        kb_id: &str,
        file: &UploadFile,
        tags: &[String],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "kb", kb_id, "upload"])?;
        let tags_json = serde_json::to_string(tags)?;
        let form = multipart::Form::new()
            .part("file", file_part(file))
            .text("tags", tags_json);
        let builder = self.request::<()>(Method::POST, url, None).multipart(form);
        self.send(builder).await?;
        Ok(())
    }

    pub async fn delete_kb_file(&self, kb_id: &str, file_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "kb", kb_id, "files", file_id])?;
        let builder = self.request::<()>(Method::DELETE, url, None);
        self.send(builder).await?;
        Ok(())
    }
}

fn file_part(file: &UploadFile) -> multipart::Part {
    multipart::Part::bytes(file.data.clone()).file_name(file.name.clone())
}
