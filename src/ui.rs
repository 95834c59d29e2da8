use chrono::{DateTime, Local, Utc};
use iced::alignment::Horizontal;
use iced::widget::{
    button, column, container, row, scrollable, text, text_input, Column, Space,
};
use iced::{theme, Alignment, Background, Color, Element, Length, Theme};

use crate::app::{App, AppMessage};
use crate::models::{Author, Message};
use crate::notice::Level;

const MUTED: Color = Color { r: 0.5, g: 0.5, b: 0.5, a: 1.0 };
const BORDER: Color = Color { r: 0.7, g: 0.7, b: 0.7, a: 1.0 };
const ACCENT: Color = Color { r: 0.2, g: 0.6, b: 1.0, a: 1.0 };
const DANGER: Color = Color { r: 0.85, g: 0.2, b: 0.2, a: 1.0 };

pub fn landing(app: &App) -> Element<'_, AppMessage> {
    if app.is_uploading() {
        return container(
            column![
                text("Processing your PDFs...").size(24),
                text(format!("{} upload(s) in progress", app.uploads_pending))
                    .size(14)
                    .style(MUTED),
            ]
            .spacing(10)
            .align_items(Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into();
    }

    let drop_zone = container(
        column![
            text("Drag and drop your PDFs here").size(20),
            text("or enter a file path below").size(14).style(MUTED),
            text("PDF files only").size(12).style(MUTED),
        ]
        .spacing(8)
        .align_items(Alignment::Center),
    )
    .padding(30)
    .width(Length::Fixed(500.0))
    .center_x()
    .style(bordered);

    let path_row = row![
        text_input("Path to a PDF", &app.path_input)
            .on_input(AppMessage::PathInputChanged)
            .on_submit(AppMessage::AddPath)
            .padding(10)
            .width(Length::Fill)
            .style(theme::TextInput::Default),
        button("Add").on_press(AppMessage::AddPath).padding(10),
    ]
    .spacing(10)
    .width(Length::Fixed(500.0));

    let mut content = column![
        text("DocuMate").size(30),
        text("Your AI-powered PDF assistant").size(24),
        text("Upload your PDFs and start an intelligent conversation with your documents.")
            .size(16)
            .style(MUTED),
        drop_zone,
        path_row,
    ]
    .spacing(20)
    .align_items(Alignment::Center);

    if !app.staging.is_empty() {
        let files = app
            .staging
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| {
                row![
                    column![
                        text(&file.name).size(16),
                        text(format_size(file.byte_size())).size(12).style(MUTED),
                    ]
                    .width(Length::Fill),
                    button(text("x"))
                        .on_press(AppMessage::UnstageFile(index))
                        .style(theme::Button::Text),
                ]
                .spacing(10)
                .align_items(Alignment::Center)
                .into()
            })
            .collect::<Vec<_>>();
        content = content
            .push(text(format!("Selected files ({})", app.staging.len())).size(16))
            .push(column(files).spacing(8).width(Length::Fixed(500.0)));
    }

    if !app.staging.is_empty() || !app.workspace.documents().is_empty() {
        content = content.push(
            button(text(start_label(app.staging.len())))
                .on_press(AppMessage::StartChatting)
                .padding(10),
        );
    }

    container(column![content, notices(app)].spacing(20).align_items(Alignment::Center))
        .padding(20)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .into()
}

pub fn chat(app: &App) -> Element<'_, AppMessage> {
    let workspace = &app.workspace;

    let mut header = row![
        button(text("Back"))
            .on_press(AppMessage::BackToLanding)
            .style(theme::Button::Text),
        text("DocuMate").size(24),
    ]
    .spacing(10)
    .align_items(Alignment::Center);
    if let Some(document) = workspace.active_document() {
        header = header.push(
            container(text(&document.display_name).size(14).style(ACCENT))
                .padding([4, 12])
                .style(bordered),
        );
    }
    header = header.push(Space::with_width(Length::Fill)).push(
        button(text(if app.sidebar_open {
            "Hide documents"
        } else {
            "Show documents"
        }))
        .on_press(AppMessage::ToggleSidebar)
        .style(theme::Button::Text),
    );

    let awaiting = workspace
        .active_id()
        .is_some_and(|id| workspace.is_awaiting(id));
    let mut history = Column::new().spacing(10).padding(10).width(Length::Fill);
    if workspace.active_id().is_none() {
        history = history.push(
            text("Upload a PDF or pick one from the sidebar to start chatting.")
                .size(16)
                .style(MUTED),
        );
    }
    for message in workspace.active_session() {
        history = history.push(bubble(message));
    }
    if awaiting {
        history = history.push(
            container(text("DocuMate is thinking...").size(14).style(MUTED))
                .padding(10)
                .style(bordered),
        );
    }
    let history = scrollable(history)
        .height(Length::Fill)
        .id(app.scroll_id.clone());

    let placeholder = if workspace.documents().is_empty() {
        "Upload PDFs to start chatting..."
    } else {
        "Ask anything about your PDFs..."
    };
    let mut input = text_input(placeholder, &app.message_input)
        .padding(10)
        .width(Length::Fill)
        .style(theme::TextInput::Default);
    // Without on_input the field is disabled.
    if workspace.can_send() {
        input = input
            .on_input(AppMessage::MessageInputChanged)
            .on_submit(AppMessage::SendMessage);
    }
    let ready = workspace.can_send() && !app.message_input.trim().is_empty();
    let send = button("Send")
        .padding(10)
        .on_press_maybe(ready.then_some(AppMessage::SendMessage));

    let main = column![header, history, row![input, send].spacing(10), notices(app)]
        .spacing(10)
        .padding(10)
        .width(Length::Fill)
        .height(Length::Fill);

    if app.sidebar_open {
        row![sidebar(app), main].into()
    } else {
        main.into()
    }
}

fn sidebar(app: &App) -> Element<'_, AppMessage> {
    let active = app.workspace.active_id();
    let entries = app
        .workspace
        .documents()
        .iter()
        .map(|document| {
            let style = if active == Some(document.id.as_str()) {
                theme::Button::Primary
            } else {
                theme::Button::Text
            };
            row![
                button(text(&document.display_name).size(14))
                    .on_press(AppMessage::SelectDocument(document.id.clone()))
                    .width(Length::Fill)
                    .style(style),
                button(text("x").size(14))
                    .on_press(AppMessage::RemoveDocument(document.id.clone()))
                    .style(theme::Button::Destructive),
            ]
            .spacing(5)
            .align_items(Alignment::Center)
            .into()
        })
        .collect::<Vec<_>>();

    let mut panel = column![
        text("Your PDFs").size(20),
        scrollable(column(entries).spacing(5)).height(Length::Fill),
        text_input("Path to a PDF", &app.path_input)
            .on_input(AppMessage::PathInputChanged)
            .on_submit(AppMessage::AddPath)
            .padding(8)
            .style(theme::TextInput::Default),
        button("Add PDF")
            .on_press(AppMessage::AddPath)
            .width(Length::Fill),
    ]
    .spacing(10);
    if app.is_uploading() {
        panel = panel.push(text("Uploading...").size(12).style(MUTED));
    }

    container(panel)
        .padding(10)
        .width(Length::Fixed(250.0))
        .height(Length::Fill)
        .style(bordered)
        .into()
}

fn bubble(message: &Message) -> Element<'_, AppMessage> {
    let from_user = message.author == Author::User;
    let body = column![
        text(&message.text).size(16),
        text(format_timestamp(message.sent_at, Local::now()))
            .size(12)
            .style(MUTED),
    ]
    .spacing(4);

    let bubble = container(body)
        .padding(10)
        .max_width(500.0)
        .style(move |_theme: &Theme| container::Appearance {
            background: Some(Background::Color(if from_user {
                ACCENT
            } else {
                Color::WHITE
            })),
            border: iced::Border {
                color: BORDER,
                width: 1.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        });

    container(bubble)
        .width(Length::Fill)
        .align_x(if from_user {
            Horizontal::Right
        } else {
            Horizontal::Left
        })
        .into()
}

fn notices(app: &App) -> Element<'_, AppMessage> {
    let items = app
        .notices
        .iter()
        .map(|notice| {
            let accent = match notice.level {
                Level::Info => ACCENT,
                Level::Error => DANGER,
            };
            container(
                row![
                    column![
                        text(&notice.title).size(14).style(accent),
                        text(&notice.body).size(12),
                    ]
                    .spacing(2)
                    .width(Length::Fill),
                    button(text("x").size(12))
                        .on_press(AppMessage::DismissNotice(notice.id))
                        .style(theme::Button::Text),
                ]
                .spacing(10)
                .align_items(Alignment::Center),
            )
            .padding(8)
            .width(Length::Fixed(360.0))
            .style(bordered)
            .into()
        })
        .collect::<Vec<_>>();
    column(items).spacing(6).into()
}

fn bordered(_theme: &Theme) -> container::Appearance {
    container::Appearance {
        border: iced::Border {
            color: BORDER,
            width: 1.0,
            radius: 8.0.into(),
        },
        ..Default::default()
    }
}

fn start_label(staged: usize) -> String {
    match staged {
        0 => "Continue chatting".to_string(),
        1 => "Start Chatting with 1 PDF".to_string(),
        n => format!("Start Chatting with {} PDFs", n),
    }
}

pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

pub fn format_timestamp(sent_at: DateTime<Utc>, now: DateTime<Local>) -> String {
    let local_datetime: DateTime<Local> = sent_at.with_timezone(&Local);
    let today = now.date_naive();
    let message_date = local_datetime.date_naive();

    if message_date == today {
        local_datetime.format("%I:%M %p").to_string()
    } else if (today - message_date).num_days() == 1 {
        format!("Yesterday, {}", local_datetime.format("%I:%M %p"))
    } else {
        local_datetime.format("%b %d, %I:%M %p").to_string()
    }
}
