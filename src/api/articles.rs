use crate::api::error::ApiError;
use crate::api::session::ApiSession;
use crate::api::upload::{self, Media, UploadError};
use crate::models::{ArticleCreated, ArticleUpdated, Envelope, ResponseStatus, ValidationErrors};
use reqwest::multipart::Form;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Article form as submitted by the editor. Validation happens server-side;
/// the client only relays the outcome.
#[derive(Debug, Clone, Default)]
pub struct ArticleForm {
    pub fields: Vec<(String, String)>,
    pub content: String,
}

impl ArticleForm {
    fn into_multipart(self) -> Form {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        form.text("content", self.content)
    }
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(ArticleCreated),
    Invalid(ValidationErrors),
    Rejected { message: String },
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(ArticleUpdated),
    Invalid(ValidationErrors),
    Rejected { message: String },
}

#[derive(Debug)]
pub enum PublishOutcome {
    /// Final navigation target after the create/upload/update chain
    Published { article_url: String },
    Invalid(ValidationErrors),
    Rejected { message: String },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

async fn post_form(session: &ApiSession, path: &str, form: Form) -> Result<Envelope, ApiError> {
    let start = Instant::now();

    let response = session
        .post(path)
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            error!(path = %path, error = %e, "Article request transport failure");
            ApiError::Network(e)
        })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        warn!(path = %path, status = %status, "Article request failed");
        return Err(ApiError::Status { status });
    }

    let envelope: Envelope = response
        .json()
        .await
        .map_err(|e| ApiError::Malformed(e.to_string()))?;

    debug!(
        path = %path,
        duration_ms = start.elapsed().as_millis() as u64,
        "Article request completed"
    );

    Ok(envelope)
}

fn validation_errors(envelope: Envelope) -> ValidationErrors {
    envelope
        .data
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

#[instrument(skip(session, form))]
pub async fn create(session: &ApiSession, form: ArticleForm) -> Result<CreateOutcome, ApiError> {
    let envelope = post_form(session, "/articles/create", form.into_multipart()).await?;

    match envelope.status {
        ResponseStatus::Success => {
            let created: ArticleCreated = envelope
                .data
                .ok_or_else(|| ApiError::Malformed("create envelope without data".into()))
                .and_then(|v| {
                    serde_json::from_value(v).map_err(|e| ApiError::Malformed(e.to_string()))
                })?;
            info!(
                article_id = %created.article_id,
                article_slug = %created.article_slug,
                "✓ Article created"
            );
            Ok(CreateOutcome::Created(created))
        }
        ResponseStatus::Fail => Ok(CreateOutcome::Invalid(validation_errors(envelope))),
        ResponseStatus::Error => Ok(CreateOutcome::Rejected {
            message: envelope.message.unwrap_or_default(),
        }),
    }
}

#[instrument(skip(session, form), fields(slug = %slug))]
pub async fn update(
    session: &ApiSession,
    slug: &str,
    form: ArticleForm,
) -> Result<UpdateOutcome, ApiError> {
    let envelope = post_form(
        session,
        &format!("/articles/{}/edit", slug),
        form.into_multipart(),
    )
    .await?;

    match envelope.status {
        ResponseStatus::Success => {
            let updated: ArticleUpdated = envelope
                .data
                .ok_or_else(|| ApiError::Malformed("update envelope without data".into()))
                .and_then(|v| {
                    serde_json::from_value(v).map_err(|e| ApiError::Malformed(e.to_string()))
                })?;
            info!(article_url = %updated.article_url, "✓ Article updated");
            Ok(UpdateOutcome::Updated(updated))
        }
        ResponseStatus::Fail => Ok(UpdateOutcome::Invalid(validation_errors(envelope))),
        ResponseStatus::Error => Ok(UpdateOutcome::Rejected {
            message: envelope.message.unwrap_or_default(),
        }),
    }
}

/// Full publish chain: create the article, upload any pending editor media
/// against the new id, then push the final content through the edit
/// endpoint. Returns the URL to navigate to.
#[instrument(skip(session, form, media), fields(media_count = media.len()))]
pub async fn publish(
    session: &ApiSession,
    form: ArticleForm,
    media: Vec<Media>,
    upload_timeout_secs: u64,
) -> Result<PublishOutcome, PublishError> {
    let created = match create(session, form.clone()).await? {
        CreateOutcome::Created(created) => created,
        CreateOutcome::Invalid(errors) => return Ok(PublishOutcome::Invalid(errors)),
        CreateOutcome::Rejected { message } => return Ok(PublishOutcome::Rejected { message }),
    };

    for item in &media {
        let location = upload::send(
            session,
            item,
            Some(&created.article_id),
            upload_timeout_secs,
        )
        .await?;
        debug!(filename = %item.filename, location = %location, "Editor media uploaded");
    }

    match update(session, &created.article_slug, form).await? {
        UpdateOutcome::Updated(updated) => Ok(PublishOutcome::Published {
            article_url: updated.article_url,
        }),
        UpdateOutcome::Invalid(errors) => Ok(PublishOutcome::Invalid(errors)),
        UpdateOutcome::Rejected { message } => Ok(PublishOutcome::Rejected { message }),
    }
}
