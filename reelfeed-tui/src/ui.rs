use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, ComposerMode, Screen};
use reelfeed_types::{FeedItem, Notification, NotificationKind};

pub fn render(frame: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Auth => render_auth(frame, app),
        Screen::Main => render_main(frame, app),
    }
}

fn render_auth(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(frame.area());

    let title = Paragraph::new("Reelfeed: pick a user, Enter to sign in, q to quit")
        .block(Block::default().borders(Borders::ALL).title(" Sign in "));
    frame.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = app
        .auth_state
        .test_users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.auth_state.selected_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(user.username.clone(), style),
                Span::raw("  "),
                Span::styled(
                    user.bio.clone().unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let body = if let Some(error) = &app.auth_state.error {
        Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" Error "))
    } else if app.auth_state.loading {
        Paragraph::new("Loading users...").block(Block::default().borders(Borders::ALL))
    } else {
        frame.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL).title(" Users ")),
            chunks[1],
        );
        return;
    };
    frame.render_widget(body, chunks[1]);
}

fn render_main(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(frame.area());

    render_feed(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);

    if app.notifications.show_modal {
        render_notifications_modal(frame, app);
    }
    if app.composer.is_open() {
        render_composer(frame, app);
    }
}

fn feed_line(item: &FeedItem) -> ListItem<'static> {
    let year = item
        .release_year
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();

    let mut reaction_bits: Vec<String> = item
        .reaction_counts
        .iter()
        .map(|(kind, count)| format!("{} {}", kind, count))
        .collect();
    reaction_bits.sort();
    let reactions = if reaction_bits.is_empty() {
        String::new()
    } else {
        format!("  [{}]", reaction_bits.join("  "))
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{}/10 ", item.rating),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("{}{}", item.movie_title, year),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  — {}", item.author_username),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{}  comments: {}", reactions, item.comment_count),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    if let Some(body) = &item.body {
        lines.push(Line::from(Span::raw(format!("    {}", body))));
    }

    ListItem::new(lines)
}

fn render_feed(frame: &mut Frame, app: &mut App, area: Rect) {
    if let Some(error) = &app.feed_state.error {
        let message = Paragraph::new(format!("Feed failed: {}\n\nPress r to retry.", error))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Feed "));
        frame.render_widget(message, area);
        return;
    }

    if app.feed_state.items.is_empty() {
        let text = if app.feed_state.loading {
            "Loading feed..."
        } else {
            "Nothing here yet. Follow some reviewers to fill your feed."
        };
        let message = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" Feed "));
        frame.render_widget(message, area);
        return;
    }

    let items: Vec<ListItem> = app.feed_state.items.iter().map(feed_line).collect();
    let mut title = String::from(" Feed ");
    if app.feed_state.loading {
        title.push_str("(loading...) ");
    } else if app.feed_state.at_end_of_feed {
        title.push_str("(end) ");
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.feed_state.list_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left = if let Some(message) = &app.status_message {
        message.text.clone()
    } else {
        "j/k move · 1-4 react · x unreact · c comment · w review · f follow · n notifications · r refresh · q quit".to_string()
    };

    let unread = app.notifications.unread_count;
    let right = if unread > 0 {
        format!(" {} unread ", unread)
    } else {
        String::new()
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(right.len() as u16)])
        .split(area);

    frame.render_widget(
        Paragraph::new(left).style(Style::default().fg(Color::DarkGray)),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(right).style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        columns[1],
    );
}

fn notification_line(notification: &Notification) -> ListItem<'static> {
    let verb = match notification.kind {
        NotificationKind::NewFollower => "followed you",
        NotificationKind::NewReaction => "reacted to your review",
        NotificationKind::NewComment => "commented on your review",
    };
    let style = if notification.read {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{} {}", notification.sender_username, verb),
            style,
        ),
        Span::styled(
            format!("  {}", notification.created_at.format("%b %d %H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn render_notifications_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    if app.notifications.items.is_empty() {
        let text = if app.notifications.loading {
            "Loading..."
        } else {
            "No notifications yet."
        };
        frame.render_widget(
            Paragraph::new(text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Notifications (Esc close) "),
            ),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app.notifications.items.iter().map(notification_line).collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Notifications (m mark read · Esc close) "),
    );
    frame.render_widget(list, area);
}

fn render_composer(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(70, 30, frame.area());
    frame.render_widget(Clear, area);

    let title = match app.composer.mode {
        Some(ComposerMode::Comment { .. }) => " Comment (Enter send · Esc cancel) ",
        Some(ComposerMode::NewReview) => " New review: <tmdb_id> <rating> [text] (Enter send) ",
        None => return,
    };

    app.composer
        .textarea
        .set_block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(&app.composer.textarea, area);
}

/// Centered sub-rectangle, sized as a percentage of the surrounding area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
