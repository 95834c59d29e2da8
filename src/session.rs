//! Per-document conversations and the active-document selection.
//!
//! [`Workspace`] is the only writer of this state. The GUI drives it from its
//! `update` function and the terminal client from its input loop; nothing else
//! holds a mutable reference.

use std::collections::HashMap;

use log::{debug, warn};
use uuid::Uuid;

use crate::client::DocumentService;
use crate::error::ApiError;
use crate::models::{Document, Message};

/// A question that has been recorded locally and still needs an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub document_id: String,
    /// Id of the user message that asked it.
    pub message_id: Uuid,
    pub text: String,
}

/// Result of [`Workspace::send_user_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent: blank text, no active document, or an answer is pending.
    Skipped,
    Answered,
    Failed(ApiError),
}

#[derive(Debug, Default)]
pub struct Workspace {
    documents: Vec<Document>,
    sessions: HashMap<String, Vec<Message>>,
    active: Option<String>,
    /// Document id to the id of its unanswered user message.
    in_flight: HashMap<String, Uuid>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, document_id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == document_id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active_id().and_then(|id| self.document(id))
    }

    pub fn session(&self, document_id: &str) -> Option<&[Message]> {
        self.sessions.get(document_id).map(Vec::as_slice)
    }

    pub fn active_session(&self) -> &[Message] {
        self.active_id()
            .and_then(|id| self.session(id))
            .unwrap_or_default()
    }

    pub fn is_awaiting(&self, document_id: &str) -> bool {
        self.in_flight.contains_key(document_id)
    }

    /// True when a new question may be sent to the active document.
    pub fn can_send(&self) -> bool {
        self.active_id().is_some_and(|id| !self.is_awaiting(id))
    }

    /// Seeds a session with one assistant message unless it already exists.
    pub fn ensure_session(&mut self, document_id: &str, welcome: &str) {
        self.sessions
            .entry(document_id.to_string())
            .or_insert_with(|| vec![Message::assistant(welcome)]);
    }

    /// Appends to an existing session. Unknown ids are ignored.
    pub fn append_message(&mut self, document_id: &str, message: Message) {
        match self.sessions.get_mut(document_id) {
            Some(session) => session.push(message),
            None => warn!("Dropping message for unknown document {}", document_id),
        }
    }

    /// Records a freshly uploaded document. It becomes active if nothing is.
    pub fn add_document(&mut self, document: Document, welcome: &str) {
        let id = document.id.clone();
        if self.document(&id).is_some() {
            debug!("Document {} already present", id);
        } else {
            self.documents.push(document);
        }
        self.ensure_session(&id, welcome);
        if self.active.is_none() {
            self.active = Some(id);
        }
    }

    /// Makes `document_id` active and makes sure it has a session.
    /// Returns false, leaving the selection alone, if the id is not in the list.
    pub fn select_document(&mut self, document_id: &str, welcome: &str) -> bool {
        if self.document(document_id).is_none() {
            warn!("Cannot select unknown document {}", document_id);
            return false;
        }
        self.ensure_session(document_id, welcome);
        self.active = Some(document_id.to_string());
        true
    }

    /// Drops the document and its session. If it was active, the first
    /// remaining document takes over (with `welcome` if it has no session yet).
    pub fn remove_document(
        &mut self,
        document_id: &str,
        welcome: impl Fn(&Document) -> String,
    ) -> Option<Document> {
        let index = self.documents.iter().position(|d| d.id == document_id)?;
        let removed = self.documents.remove(index);
        self.sessions.remove(document_id);
        self.in_flight.remove(document_id);

        if self.active.as_deref() == Some(document_id) {
            self.active = None;
            if let Some(next) = self.documents.first() {
                let next_id = next.id.clone();
                let text = welcome(next);
                self.ensure_session(&next_id, &text);
                self.active = Some(next_id);
            }
        }
        Some(removed)
    }

    /// First half of sending: records the user's message and marks the active
    /// document as awaiting. Returns `None` when nothing should be sent.
    pub fn begin_question(&mut self, text: &str) -> Option<Question> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let document_id = self.active.clone()?;
        if self.is_awaiting(&document_id) {
            debug!("Ignoring question while {} is awaiting an answer", document_id);
            return None;
        }
        let message = Message::user(text);
        let message_id = message.id;
        self.append_message(&document_id, message);
        self.in_flight.insert(document_id.clone(), message_id);
        Some(Question {
            document_id,
            message_id,
            text: text.to_string(),
        })
    }

    /// Second half of sending. The answer goes to the session the question came
    /// from, whether or not it is still active. It is dropped when the question
    /// is no longer the pending one for that document, e.g. the document was
    /// removed (and possibly uploaded again) in the meantime. On failure nothing
    /// is appended.
    pub fn finish_question(
        &mut self,
        question: &Question,
        answer: Result<String, ApiError>,
    ) -> Result<(), ApiError> {
        if self.in_flight.get(&question.document_id) != Some(&question.message_id) {
            debug!(
                "Discarding answer to stale question {} for {}",
                question.message_id, question.document_id
            );
            return Ok(());
        }
        self.in_flight.remove(&question.document_id);
        let answer = answer?;
        self.append_message(&question.document_id, Message::assistant(answer));
        Ok(())
    }

    pub async fn send_user_message(
        &mut self,
        service: &dyn DocumentService,
        text: &str,
    ) -> SendOutcome {
        let Some(question) = self.begin_question(text) else {
            return SendOutcome::Skipped;
        };
        let answer = service
            .submit_question(&question.document_id, &question.text)
            .await
            .map(|response| response.answer);
        match self.finish_question(&question, answer) {
            Ok(()) => SendOutcome::Answered,
            Err(e) => SendOutcome::Failed(e),
        }
    }
}
