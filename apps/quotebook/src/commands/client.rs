//! # Client Commands

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::commands::quote::QuoteSummary;
use crate::error::{ApiError, ApiResult};
use crate::state::DbState;
use quotebook_core::{Client, ClientPatch, CoreError};

/// Input for `client add`.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// A client with the quotes written for them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub quotes: Vec<QuoteSummary>,
}

pub async fn add_client(db: &DbState, input: NewClient) -> ApiResult<Client> {
    let mut client = Client::new(input.name.trim());
    client.email = input.email;
    client.phone = input.phone;
    client.address = input.address;
    client.notes = input.notes;

    db.inner().clients().put(&client).await?;

    info!(id = %client.id, name = %client.name, "Client added");
    Ok(client)
}

pub async fn list_clients(db: &DbState) -> ApiResult<Vec<Client>> {
    Ok(db.inner().clients().list().await?)
}

pub async fn get_client(db: &DbState, id: &str) -> ApiResult<ClientDetail> {
    let client = db
        .inner()
        .clients()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ClientNotFound(id.to_string()))?;

    let quotes = db
        .inner()
        .quotes()
        .list_for_client(id)
        .await?
        .iter()
        .map(QuoteSummary::from)
        .collect();

    Ok(ClientDetail { client, quotes })
}

pub async fn update_client(db: &DbState, id: &str, patch: ClientPatch) -> ApiResult<Client> {
    if patch.is_empty() {
        return Err(ApiError::validation("Nothing to update"));
    }

    Ok(db.inner().clients().update(id, patch, Utc::now()).await?)
}

/// Deletes a client that has no quotes.
pub async fn delete_client(db: &DbState, id: &str) -> ApiResult<()> {
    let quotes = db.inner().quotes().list_for_client(id).await?;
    if !quotes.is_empty() {
        return Err(ApiError::validation(format!(
            "Client {} still has {} quote(s); delete them first",
            id,
            quotes.len()
        )));
    }

    db.inner().clients().delete(id).await?;
    info!(id = %id, "Client deleted");
    Ok(())
}
