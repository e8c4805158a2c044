//! Finding, submitting and waiting for documents.
//!
//! The platform is eventually consistent: a document that was just
//! broadcast may not be visible to queries yet. [`wait_for`] polls until it
//! shows up or a deadline passes, and reports the three outcomes (found,
//! not yet visible, failed) distinctly.

use crate::connection::Connection;
use crate::error::{PlatformError, PlatformResult};
use crate::retry;
use dashmachine_types::{Document, DocumentBatch, DocumentQuery, NewDocument};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

/// Attempts per submission: the first try plus three retries.
pub const SUBMIT_ATTEMPTS: u32 = 4;

/// Upper bound on a wait deadline (one year).
const MAX_WAIT_SECS: u64 = 365 * 24 * 60 * 60;

/// Polling parameters for [`wait_for`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Give up after this long (ms).
    pub timeout_ms: u64,
    /// Pause between polls (ms).
    pub poll_interval_ms: u64,
    /// Attempts per poll before a query error is treated as fatal.
    pub find_attempts: u32,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            poll_interval_ms: 1_000,
            find_attempts: 3,
        }
    }
}

impl WaitOptions {
    /// Options with the given timeout and default polling.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn poll_every(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of waiting for documents.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// At least one matching document became visible.
    Found(Vec<Document>),
    /// Nothing matched before the deadline. Not an error.
    TimedOut,
}

impl WaitOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, WaitOutcome::Found(_))
    }

    pub fn documents(&self) -> &[Document] {
        match self {
            WaitOutcome::Found(docs) => docs,
            WaitOutcome::TimedOut => &[],
        }
    }

    /// The found documents; empty when timed out.
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            WaitOutcome::Found(docs) => docs,
            WaitOutcome::TimedOut => Vec::new(),
        }
    }
}

/// Runs one document query. An empty result is a success.
pub async fn find(
    conn: &Connection,
    locator: &str,
    query: &DocumentQuery,
) -> PlatformResult<Vec<Document>> {
    let client = conn.client()?;
    debug!(locator, ?query, "finding documents");

    client.is_ready().await.map_err(PlatformError::Query)?;
    let found = client
        .query_documents(locator, query)
        .await
        .map_err(PlatformError::Query)?;

    debug!(locator, count = found.len(), "documents found");
    Ok(found)
}

/// Creates and broadcasts `document` as its owner.
///
/// The whole sequence (resolve owner, create, broadcast) is retried on any
/// failure. A broadcast that reached the network but whose acknowledgement
/// was lost will be repeated; use [`submit_idempotent`] when duplicates
/// matter.
pub async fn submit(conn: &Connection, document: &NewDocument) -> PlatformResult<Document> {
    submit_with(conn, document, None).await
}

/// Like [`submit`], but before every retry checks `dedupe_query` at
/// `locator` for a document by the same owner, and returns it instead of
/// broadcasting again.
pub async fn submit_idempotent(
    conn: &Connection,
    document: &NewDocument,
    locator: &str,
    dedupe_query: &DocumentQuery,
) -> PlatformResult<Document> {
    submit_with(conn, document, Some((locator, dedupe_query))).await
}

async fn submit_with(
    conn: &Connection,
    document: &NewDocument,
    dedupe: Option<(&str, &DocumentQuery)>,
) -> PlatformResult<Document> {
    debug!(
        contract = %document.contract_id,
        document_type = %document.document_type,
        owner = %document.owner_id,
        "submitting document"
    );

    let submitted = retry::with_attempts("document submit", SUBMIT_ATTEMPTS, move |attempt| async move {
        if attempt > 1 {
            if let Some((locator, query)) = dedupe {
                if let Some(existing) = prior_write(conn, document, locator, query).await? {
                    info!(id = %existing.id, attempt, "document already written, not rebroadcasting");
                    return Ok(existing);
                }
            }
        }
        submit_once(conn, document).await
    })
    .await
    .map_err(|e| PlatformError::Submit {
        attempts: e.attempts,
        source: Box::new(e.last_error),
    })?;

    info!(id = %submitted.id, "document submitted");
    Ok(submitted)
}

async fn prior_write(
    conn: &Connection,
    document: &NewDocument,
    locator: &str,
    query: &DocumentQuery,
) -> PlatformResult<Option<Document>> {
    let found = find(conn, locator, query).await?;
    Ok(found.into_iter().find(|d| d.owner_id == document.owner_id))
}

async fn submit_once(conn: &Connection, document: &NewDocument) -> PlatformResult<Document> {
    let client = conn.client()?;
    client.is_ready().await?;

    let identity = client
        .get_identity(&document.owner_id)
        .await?
        .ok_or_else(|| PlatformError::IdentityNotFound(document.owner_id.clone()))?;
    debug!(identity = %identity.id, "owner identity resolved");

    let created = client
        .create_document(
            &document.contract_id,
            &document.document_type,
            &identity,
            document.data.clone(),
        )
        .await?;

    let batch = DocumentBatch::create_one(created);
    debug!(transitions = batch.len(), "broadcasting batch");

    let confirmed = client.broadcast_documents(&batch, &identity).await?;
    confirmed
        .create
        .into_iter()
        .next()
        .ok_or_else(|| PlatformError::Malformed("broadcast confirmed no document".to_string()))
}

/// Polls [`find`] until a document matches or `options.timeout_ms` passes.
///
/// A poll in progress finishes its retries before the deadline is checked,
/// so a query that keeps failing is reported as an error, never as
/// [`WaitOutcome::TimedOut`]. Errors that are not retryable end the wait at
/// once.
pub async fn wait_for(
    conn: &Connection,
    locator: &str,
    query: &DocumentQuery,
    options: &WaitOptions,
) -> PlatformResult<WaitOutcome> {
    let (_cancel, cancelled) = watch::channel(false);
    wait_for_with_cancel(conn, locator, query, options, cancelled).await
}

/// [`wait_for`] that also stops with [`PlatformError::Cancelled`] as soon
/// as `true` is sent on `cancel`.
pub async fn wait_for_with_cancel(
    conn: &Connection,
    locator: &str,
    query: &DocumentQuery,
    options: &WaitOptions,
    mut cancel: watch::Receiver<bool>,
) -> PlatformResult<WaitOutcome> {
    let started = Instant::now();
    let deadline = started
        .checked_add(options.timeout())
        .unwrap_or_else(|| started + Duration::from_secs(MAX_WAIT_SECS));
    debug!(locator, timeout_ms = options.timeout_ms, "waiting for documents");

    let mut polls = 0u32;
    loop {
        polls += 1;
        // A poll runs its whole retry series; the deadline is checked after.
        let attempt = retry::with_attempts_while(
            "document find",
            options.find_attempts,
            PlatformError::is_retryable,
            |_| find(conn, locator, query),
        );

        let found = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return Err(PlatformError::Cancelled),
            result = attempt => result.map_err(|e| e.last_error)?,
        };

        if !found.is_empty() {
            info!(
                locator,
                polls,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "documents found"
            );
            return Ok(WaitOutcome::Found(found));
        }

        let now = Instant::now();
        if now >= deadline {
            info!(locator, polls, "no documents within timeout");
            return Ok(WaitOutcome::TimedOut);
        }

        let pause = options.poll_interval().min(deadline - now);
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return Err(PlatformError::Cancelled),
            _ = tokio::time::sleep(pause) => {}
        }
    }
}

/// Resolves once `true` is observed. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
