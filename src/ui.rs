use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use terp_core::ChatRole;
use crate::app::{App, InputMode};

const UMD_RED: Color = Color::Rgb(224, 58, 62);
const UMD_GOLD: Color = Color::Rgb(255, 210, 0);

const SIDEBAR_WIDTH: u16 = 42;

const HOW_TO_USE: [(&str, [&str; 3]); 2] = [
    (
        "Ask about courses:",
        [
            "Search by course ID (e.g. \"Tell me about CMSC131\")",
            "Get professor ratings for specific courses",
            "Find prerequisites and course descriptions",
        ],
    ),
    (
        "Learn about professors:",
        [
            "Ask about teaching styles and ratings",
            "Compare professors for the same course",
            "Find what courses a professor teaches",
        ],
    ),
];

const QUICK_LINKS: [(&str, &str); 4] = [
    ("ELMS", "https://elms.umd.edu"),
    ("Testudo", "https://testudo.umd.edu"),
    ("Classes (SOC)", "https://app.testudo.umd.edu/soc/"),
    ("Dining", "https://dining.umd.edu"),
];

const IMPORTANT_DATES: [(&str, &str); 4] = [
    ("Spring Break", "March 16-23"),
    ("Registration", "April 1-15, 2025"),
    ("Finals Exams", "May 15-21, 2025"),
    ("Commencement", "May 21, 2025"),
];

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            // Push any accumulated plain text
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [main_area, sidebar_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SIDEBAR_WIDTH.min(body_area.width / 2)),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_main(app, frame, main_area);
    render_sidebar(app, frame, sidebar_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.session.state();

    let mut title = vec![
        Span::styled(" PlanetTerp Assistant ", Style::default().fg(UMD_RED).bold()),
    ];
    if let Some(name) = state.chat_name() {
        title.push(Span::styled(format!("· {} ", name), Style::default().fg(Color::White)));
    }
    title.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));
    if !state.backend_healthy() {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            " ! Connection issues ",
            Style::default().bg(Color::Yellow).fg(Color::Black).bold(),
        ));
    }

    let subtitle = if state.greeting().is_empty() {
        Line::from(Span::styled(
            format!(" Connecting to {}...", app.api_url),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            format!(" {}! I'm here to help with your UMD journey.", state.greeting()),
            Style::default().fg(Color::Gray),
        ))
    };

    let header = Paragraph::new(vec![Line::from(title), subtitle])
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(header, area);
}

fn render_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let show_quick_replies = app.session.quick_replies_visible();

    let [chat_area, replies_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(if show_quick_replies { 3 } else { 0 }),
        Constraint::Length(3),
    ])
    .areas(area);

    render_chat(app, frame, chat_area);

    if show_quick_replies {
        render_quick_replies(app, frame, replies_area);
    } else {
        app.quick_reply_areas = [None, None];
    }

    render_input(app, frame, input_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store areas for mouse hit-testing and scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let state = app.session.state();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat_text = if state.messages().is_empty() && !state.is_loading() {
        Text::from(vec![
            Line::default(),
            Line::from(Span::styled("Welcome to PlanetTerp", Style::default().fg(UMD_RED).bold())),
            Line::default(),
            Line::from(Span::styled(
                "Your assistant for everything UMD. From course selection to campus life,",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "I'm here to help you navigate your academic journey.",
                Style::default().fg(Color::Gray),
            )),
            Line::default(),
            Line::from(Span::styled("Ready to get started?", Style::default().fg(Color::DarkGray))),
        ])
        .centered()
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in state.messages() {
            let time = msg.timestamp().format("%-I:%M:%S %p").to_string();
            match msg.role() {
                ChatRole::User => {
                    lines.push(Line::from(vec![
                        Span::styled("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                        Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
                    ]));
                    for line in msg.content().lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(vec![
                        Span::styled("Terp", Style::default().fg(UMD_RED).add_modifier(Modifier::BOLD)),
                        Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
                    ]));
                    for line in msg.content().lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if state.is_loading() {
            lines.push(Line::from(Span::styled(
                "Terp",
                Style::default().fg(UMD_RED).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_quick_replies(app: &mut App, frame: &mut Frame, area: Rect) {
    let [left, right] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(area);

    let enabled = app.input_enabled();
    let window = app.session.quick_replies();

    for (slot, (reply, slot_area)) in window.items().into_iter().zip([left, right]).enumerate() {
        app.quick_reply_areas[slot] = Some(slot_area);

        let style = if enabled {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let button = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", slot + 1), Style::default().bg(UMD_RED).fg(Color::White)),
            Span::raw(" "),
            Span::styled(reply.label, style),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(if slot == 0 { " Quick Start " } else { "" }),
        );
        frame.render_widget(button, slot_area);
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.session.state();
    let editing = app.input_mode == InputMode::Editing;

    let (title, border_color) = if !state.backend_healthy() {
        (" Chat unavailable ", Color::DarkGray)
    } else if state.is_loading() {
        (" Waiting for reply... ", Color::DarkGray)
    } else if editing {
        (" Ask (Enter to send, Esc to stop typing) ", Color::Yellow)
    } else {
        (" Ask (i to type) ", Color::Gray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() && !editing {
        Paragraph::new(Span::styled("Ask about UMD courses...", Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = app.input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let fact_lines = (app.session.fact().chars().count() as u16 / area.width.saturating_sub(4).max(1)) + 3;

    let [fact_area, info_area] = Layout::vertical([
        Constraint::Length(fact_lines.min(area.height / 2)),
        Constraint::Min(0),
    ])
    .areas(area);

    app.fact_area = Some(fact_area);

    // Fun fact
    let fact_title = if app.session.is_loading_fact() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!(" Fun Fact (loading{}) ", dots)
    } else {
        " Fun Fact (r to refresh) ".to_string()
    };
    let fact = Paragraph::new(Span::styled(
        format!("\"{}\"", app.session.fact()),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(UMD_GOLD))
            .title(fact_title),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(fact, fact_area);

    // Static info panel
    let heading = Style::default().fg(UMD_RED).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = vec![Line::from(Span::styled("How to Use", heading))];
    for (topic, tips) in HOW_TO_USE {
        lines.push(Line::from(Span::styled(topic, Style::default().bold())));
        for tip in tips {
            lines.push(Line::from(format!("  • {}", tip)));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Quick UMD Links", heading)));
    for (name, url) in QUICK_LINKS {
        lines.push(Line::from(vec![
            Span::raw(format!("  {} ", name)),
            Span::styled(url, Style::default().fg(Color::DarkGray)),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Important Dates", heading)));
    for (event, when) in IMPORTANT_DATES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", event), Style::default().bold()),
            Span::raw(when),
        ]));
    }

    let info = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .wrap(Wrap { trim: false });
    frame.render_widget(info, info_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => {
            let mut hints = Vec::new();
            if app.input_enabled() {
                hints.extend(vec![
                    Span::styled(" i ", key_style),
                    Span::styled(" type ", label_style),
                ]);
            }
            if app.session.quick_replies_visible() {
                hints.extend(vec![
                    Span::styled(" 1/2 ", key_style),
                    Span::styled(" quick start ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" r ", key_style),
                Span::styled(" new fact ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_markdown_bold() {
        let line = parse_markdown_line("Take **CMSC131** first");
        assert_eq!(span_texts(&line), vec!["Take ", "CMSC131", " first"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_bold_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(span_texts(&line).concat(), "a **b");
    }

    #[test]
    fn test_markdown_empty_line() {
        assert!(parse_markdown_line("").spans.is_empty());
    }
}
