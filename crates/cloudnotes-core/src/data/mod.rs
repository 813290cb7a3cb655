//! GraphQL data API client for note records.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::{DataApi, TokenSource};
use crate::models::{NoteId, NoteRecord};
use crate::util::{compact_text, is_http_url, normalize_text_option};
use crate::{Error, Result};

const NOTE_FIELDS: &str = "id name description image";

/// Data API over a GraphQL endpoint, authorized with the signed-in user's
/// access token.
#[derive(Clone)]
pub struct GraphQlDataApi {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl GraphQlDataApi {
    pub fn new(endpoint: &str, api_key: &str, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            api_key: api_key.trim().to_string(),
            client: reqwest::Client::builder().build()?,
            tokens,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: String,
        variables: Value,
    ) -> Result<T> {
        let session = self.tokens.current_session().await?;
        let body = GraphQlRequest { query, variables };

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(http_error_message(status, &body)));
        }

        let payload = response.json::<GraphQlResponse>().await?;
        payload.into_field(operation)
    }
}

#[async_trait]
impl DataApi for GraphQlDataApi {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        let query = format!("query ListNotes {{ listNotes {{ items {{ {NOTE_FIELDS} }} }} }}");
        let page: NotePage = self.execute("listNotes", query, json!({})).await?;
        Ok(page.items.into_iter().flatten().collect())
    }

    async fn create_note(&self, note: NoteRecord) -> Result<NoteRecord> {
        let query = format!(
            "mutation CreateNote($input: CreateNoteInput!) {{ createNote(input: $input) {{ {NOTE_FIELDS} }} }}"
        );
        self.execute("createNote", query, json!({ "input": note }))
            .await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<NoteRecord> {
        let query = format!(
            "mutation DeleteNote($input: DeleteNoteInput!) {{ deleteNote(input: $input) {{ {NOTE_FIELDS} }} }}"
        );
        self.execute("deleteNote", query, json!({ "input": { "id": id } }))
            .await
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: String,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphQlResponse {
    fn into_field<T: DeserializeOwned>(self, field: &str) -> Result<T> {
        if !self.errors.is_empty() {
            let messages = self
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Api(compact_text(&messages)));
        }

        let value = self
            .data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .filter(|value| !value.is_null())
            .ok_or_else(|| Error::Api(format!("response did not include '{field}'")))?;
        Ok(serde_json::from_value(value)?)
    }
}

/// `listNotes` connection page. Items may be null for records the caller
/// cannot read.
#[derive(Debug, Deserialize)]
struct NotePage {
    #[serde(default)]
    items: Vec<Option<NoteRecord>>,
}

fn normalize_endpoint(raw: &str) -> Result<String> {
    let endpoint = normalize_text_option(Some(raw.to_string())).ok_or_else(|| {
        Error::Configuration("GraphQL endpoint must not be empty".to_string())
    })?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(Error::Configuration(
            "GraphQL endpoint must include http:// or https://".to_string(),
        ))
    }
}

fn http_error_message(status: StatusCode, body: &str) -> String {
    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
