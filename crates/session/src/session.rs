//! The staged form session.
//!
//! A [`FormSession`] drives one flow: it validates and stages each step,
//! rebuilds prior steps when a later step is entered, and runs the
//! submission protocol for the final step.
//!
//! # Submission protocol
//!
//! 1. A second submit while one is in flight is ignored.
//! 2. The submit step's own fields are validated.
//! 3. Every staged step is read back; a missing one routes to that step.
//! 4. The credential and profile are loaded together; no credential routes
//!    to login without sending anything.
//! 5. The merged record is checked for missing required fields locally.
//! 6. The record is sent. On success exactly the consumed staging keys are
//!    removed. On authentication expiry the whole local session is cleared.
//!    Any other failure leaves the staged payloads for a retry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ranch_client::ApiClient;
use ranch_forms::{
    validate_step, Fields, FlowDefinition, MediaAttachment, RecordBuilder, StepPayload,
    ValidationState,
};
use ranch_storage::KeyValueStore;
use serde_json::Value;

use crate::auth;
use crate::staging;
use crate::FlowError;

/// Signals that whoever started a session no longer wants its results.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the confirmation view receives after a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub flow: String,
    pub params: BTreeMap<String, String>,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Confirmed(Confirmation),
    /// Another submission was already in flight; nothing was sent.
    Ignored,
    /// The session was cancelled while the request was outstanding. Storage
    /// side effects still happened; the result is dropped.
    Discarded,
}

/// Clears the in-flight flag when the submission finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct FormSession {
    flow: FlowDefinition,
    store: Arc<dyn KeyValueStore>,
    api: ApiClient,
    submitting: AtomicBool,
    cancel: CancelToken,
}

impl FormSession {
    pub fn new(flow: FlowDefinition, store: Arc<dyn KeyValueStore>, api: ApiClient) -> Self {
        Self {
            flow,
            store,
            api,
            submitting: AtomicBool::new(false),
            cancel: CancelToken::new(),
        }
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    fn unknown_step(&self, key: &str) -> FlowError {
        FlowError::UnknownStep {
            flow: self.flow.id.clone(),
            key: key.to_string(),
        }
    }

    /// Validate a staged step and persist its full payload.
    ///
    /// Every earlier step must already be staged; a missing one routes back
    /// to it. On any failure nothing is written.
    pub async fn advance(&self, step_key: &str, fields: Fields) -> Result<ValidationState, FlowError> {
        let (_, step) = self
            .flow
            .step(step_key)
            .ok_or_else(|| self.unknown_step(step_key))?;
        if self.flow.is_submit_step(step_key) {
            return Err(FlowError::NotStaged {
                key: step_key.to_string(),
            });
        }
        self.resume(step_key).await?;

        let state = validate_step(&step.fields, &fields).inspect_err(|rejected| {
            tracing::debug!(flow = %self.flow.id, step = step_key, field = %rejected.field, "step rejected");
        })?;

        let payload = StepPayload::new(step_key, fields);
        staging::save(self.store.as_ref(), &payload).await?;
        tracing::info!(
            flow = %self.flow.id,
            step = step_key,
            fields = payload.fields.len(),
            "step persisted"
        );
        Ok(state)
    }

    /// Load the payloads of every step before `step_key`, in flow order.
    pub async fn resume(&self, step_key: &str) -> Result<Vec<StepPayload>, FlowError> {
        let (index, _) = self
            .flow
            .step(step_key)
            .ok_or_else(|| self.unknown_step(step_key))?;

        let mut payloads = Vec::with_capacity(index);
        for step in &self.flow.steps[..index] {
            let payload = staging::load(self.store.as_ref(), &step.session_key)
                .await?
                .ok_or_else(|| FlowError::MissingStep {
                    key: step.session_key.clone(),
                })?;
            payloads.push(payload);
        }
        Ok(payloads)
    }

    /// Remove this flow's staged payloads without submitting.
    pub async fn abandon(&self) -> Result<(), FlowError> {
        let keys = self.flow.staged_keys();
        self.store.multi_remove(&keys).await?;
        tracing::info!(flow = %self.flow.id, keys = keys.len(), "flow abandoned");
        Ok(())
    }

    /// Run the submission protocol with the submit step's input.
    pub async fn submit(
        &self,
        fields: Fields,
        attachments: Vec<MediaAttachment>,
    ) -> Result<SubmitOutcome, FlowError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(flow = %self.flow.id, "submit ignored: already in flight");
            return Ok(SubmitOutcome::Ignored);
        }
        let _in_flight = InFlight(&self.submitting);
        self.run_submit(fields, attachments).await
    }

    async fn run_submit(
        &self,
        fields: Fields,
        attachments: Vec<MediaAttachment>,
    ) -> Result<SubmitOutcome, FlowError> {
        let submit_step = self
            .flow
            .submit_step()
            .ok_or_else(|| self.unknown_step("<submit>"))?;
        validate_step(&submit_step.fields, &fields)?;

        let staged = self.resume(&submit_step.session_key).await?;
        let (token, profile) = auth::credentials(self.store.as_ref()).await?;

        let mut builder = RecordBuilder::new(&self.flow);
        for payload in staged {
            builder.add_step(payload);
        }
        builder.add_fields(fields);
        let record = builder.build(profile.as_ref(), attachments);

        let missing = record.missing_required();
        if !missing.is_empty() {
            tracing::warn!(flow = %self.flow.id, missing = ?missing, "submission blocked locally");
            return Err(FlowError::MissingFields(missing));
        }

        tracing::info!(flow = %self.flow.id, "submission started");
        match self.api.submit(&record, &token).await {
            Ok(response) => {
                let consumed: Vec<&str> = record.consumed_keys.iter().map(String::as_str).collect();
                self.store.multi_remove(&consumed).await?;
                tracing::info!(flow = %self.flow.id, cleared = consumed.len(), "submission accepted");
                if self.cancel.is_cancelled() {
                    return Ok(SubmitOutcome::Discarded);
                }
                Ok(SubmitOutcome::Confirmed(Confirmation {
                    flow: self.flow.id.clone(),
                    params: record.confirmation_params(),
                    response,
                }))
            }
            Err(err) => {
                tracing::warn!(flow = %self.flow.id, error = %err, "submission failed");
                let err = auth::on_api_error(self.store.as_ref(), err).await;
                if self.cancel.is_cancelled() {
                    return Ok(SubmitOutcome::Discarded);
                }
                Err(err)
            }
        }
    }
}
