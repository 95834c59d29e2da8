use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use iced::widget::scrollable;
use iced::{event, executor, window, Application, Command, Element, Event, Subscription, Theme};
use log::{error, info};

use crate::client::{self, DocumentService, HttpDocumentService};
use crate::config::Config;
use crate::error::{ApiError, StageError};
use crate::models::Document;
use crate::notice::Notices;
use crate::session::{Question, Workspace};
use crate::staging::{StagedFile, Staging};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Chat,
}

#[derive(Debug, Clone)]
pub enum AppMessage {
    PathInputChanged(String),
    AddPath,
    FileDropped(PathBuf),
    FileLoaded(Result<StagedFile, StageError>),
    UnstageFile(usize),
    StartChatting,
    /// Carries the upload's position in selection order.
    Uploaded(usize, StagedFile, Result<Document, ApiError>),
    SelectDocument(String),
    RemoveDocument(String),
    MessageInputChanged(String),
    SendMessage,
    Answered(Question, Result<String, ApiError>),
    ToggleSidebar,
    BackToLanding,
    DismissNotice(u64),
    Tick(Instant),
}

/// Flags handed to the application at start-up.
pub struct Flags {
    pub service: Arc<dyn DocumentService>,
}

impl Flags {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Flags {
            service: Arc::new(HttpDocumentService::new(config)?),
        })
    }
}

pub struct App {
    pub(crate) service: Arc<dyn DocumentService>,
    pub(crate) screen: Screen,
    pub(crate) workspace: Workspace,
    pub(crate) staging: Staging,
    pub(crate) notices: Notices,
    pub(crate) uploads_pending: usize,
    pub(crate) next_upload: usize,
    pub(crate) finished_uploads: Vec<(usize, Document)>,
    pub(crate) path_input: String,
    pub(crate) message_input: String,
    pub(crate) sidebar_open: bool,
    pub(crate) scroll_id: scrollable::Id,
}

impl App {
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        App {
            service,
            screen: Screen::Landing,
            workspace: Workspace::new(),
            staging: Staging::default(),
            notices: Notices::default(),
            uploads_pending: 0,
            next_upload: 0,
            finished_uploads: Vec::new(),
            path_input: String::new(),
            message_input: String::new(),
            sidebar_open: true,
            scroll_id: scrollable::Id::new("chat_scroll"),
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads_pending > 0
    }

    fn upload(&mut self, file: StagedFile) -> Command<AppMessage> {
        let position = self.next_upload;
        self.next_upload += 1;
        self.uploads_pending += 1;
        let service = Arc::clone(&self.service);
        Command::perform(
            async move {
                let result = client::upload(service.as_ref(), &file).await;
                (file, result)
            },
            move |(file, result)| AppMessage::Uploaded(position, file, result),
        )
    }

    /// Adds the documents of the finished uploads in the order they were
    /// selected, so the first selected file becomes active.
    fn add_finished_uploads(&mut self) -> usize {
        let mut finished = std::mem::take(&mut self.finished_uploads);
        finished.sort_by_key(|(position, _)| *position);
        let count = finished.len();
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            self.notices
                .info("Files Added", format!("Added {} PDF{}", count, plural));
        }
        for (_, document) in finished {
            let welcome = document.welcome_text();
            self.workspace.add_document(document, &welcome);
        }
        count
    }

    fn snap_to_latest(&self) -> Command<AppMessage> {
        scrollable::snap_to(
            self.scroll_id.clone(),
            scrollable::RelativeOffset { x: 0.0, y: 1.0 },
        )
    }

    fn load_file(path: PathBuf) -> Command<AppMessage> {
        Command::perform(StagedFile::load(path), AppMessage::FileLoaded)
    }
}

impl Application for App {
    type Executor = executor::Default;
    type Message = AppMessage;
    type Theme = Theme;
    type Flags = Flags;

    fn new(flags: Flags) -> (Self, Command<AppMessage>) {
        (App::new(flags.service), Command::none())
    }

    fn title(&self) -> String {
        match self.workspace.active_document() {
            Some(document) if self.screen == Screen::Chat => {
                format!("DocuMate - {}", document.display_name)
            }
            _ => String::from("DocuMate"),
        }
    }

    fn update(&mut self, message: AppMessage) -> Command<AppMessage> {
        match message {
            AppMessage::PathInputChanged(path) => {
                self.path_input = path;
                Command::none()
            }
            AppMessage::AddPath => {
                let path = self.path_input.trim();
                if path.is_empty() {
                    return Command::none();
                }
                let path = PathBuf::from(path);
                self.path_input.clear();
                Self::load_file(path)
            }
            AppMessage::FileDropped(path) => Self::load_file(path),
            AppMessage::FileLoaded(Ok(file)) => match self.screen {
                Screen::Landing => {
                    self.staging.push(file);
                    Command::none()
                }
                Screen::Chat => self.upload(file),
            },
            AppMessage::FileLoaded(Err(e)) => {
                error!("{}", e);
                let title = match e {
                    StageError::NotPdf { .. } => "PDF files only",
                    StageError::Io { .. } => "Could not read file",
                };
                self.notices.error(title, e.to_string());
                Command::none()
            }
            AppMessage::UnstageFile(index) => {
                self.staging.remove(index);
                Command::none()
            }
            AppMessage::StartChatting => {
                if self.is_uploading() {
                    return Command::none();
                }
                if self.staging.is_empty() {
                    if !self.workspace.documents().is_empty() {
                        self.screen = Screen::Chat;
                    }
                    return Command::none();
                }
                let files = self.staging.take_all();
                info!("Uploading {} staged file(s)", files.len());
                let uploads: Vec<_> = files.into_iter().map(|file| self.upload(file)).collect();
                Command::batch(uploads)
            }
            AppMessage::Uploaded(position, file, result) => {
                self.uploads_pending = self.uploads_pending.saturating_sub(1);
                match result {
                    Ok(document) => self.finished_uploads.push((position, document)),
                    Err(e) => {
                        error!("Upload of {} failed: {}", file.name, e);
                        self.notices
                            .error(format!("Could not upload {}", file.name), e.to_string());
                        if self.screen == Screen::Landing {
                            self.staging.push(file);
                        }
                    }
                }
                if self.is_uploading() {
                    return Command::none();
                }
                let added = self.add_finished_uploads();
                if self.screen == Screen::Landing && added > 0 {
                    self.screen = Screen::Chat;
                }
                Command::none()
            }
            AppMessage::SelectDocument(id) => {
                let Some(document) = self.workspace.document(&id) else {
                    return Command::none();
                };
                let welcome = document.welcome_text();
                let name = document.display_name.clone();
                if self.workspace.select_document(&id, &welcome) {
                    self.notices
                        .info("PDF Selected", format!("Now analyzing: {}", name));
                }
                self.snap_to_latest()
            }
            AppMessage::RemoveDocument(id) => {
                if let Some(removed) = self.workspace.remove_document(&id, Document::welcome_text) {
                    info!("Removed {} ({})", removed.display_name, removed.id);
                }
                Command::none()
            }
            AppMessage::MessageInputChanged(text) => {
                self.message_input = text;
                Command::none()
            }
            AppMessage::SendMessage => {
                let Some(question) = self.workspace.begin_question(&self.message_input) else {
                    return Command::none();
                };
                self.message_input.clear();
                let service = Arc::clone(&self.service);
                Command::batch(vec![
                    Command::perform(
                        async move {
                            let answer = service
                                .submit_question(&question.document_id, &question.text)
                                .await
                                .map(|response| response.answer);
                            (question, answer)
                        },
                        |(question, answer)| AppMessage::Answered(question, answer),
                    ),
                    self.snap_to_latest(),
                ])
            }
            AppMessage::Answered(question, answer) => {
                if let Err(e) = self.workspace.finish_question(&question, answer) {
                    error!("Query for {} failed: {}", question.document_id, e);
                    self.notices.error("Query failed", e.to_string());
                }
                self.snap_to_latest()
            }
            AppMessage::ToggleSidebar => {
                self.sidebar_open = !self.sidebar_open;
                Command::none()
            }
            AppMessage::BackToLanding => {
                self.screen = Screen::Landing;
                Command::none()
            }
            AppMessage::DismissNotice(id) => {
                self.notices.dismiss(id);
                Command::none()
            }
            AppMessage::Tick(now) => {
                self.notices.expire(now);
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<AppMessage> {
        match self.screen {
            Screen::Landing => ui::landing(self),
            Screen::Chat => ui::chat(self),
        }
    }

    fn subscription(&self) -> Subscription<AppMessage> {
        let drops = event::listen_with(|event, _status| match event {
            Event::Window(_, window::Event::FileDropped(path)) => Some(AppMessage::FileDropped(path)),
            _ => None,
        });
        if self.notices.is_empty() {
            drops
        } else {
            Subscription::batch(vec![
                drops,
                iced::time::every(Duration::from_millis(500)).map(AppMessage::Tick),
            ])
        }
    }
}
