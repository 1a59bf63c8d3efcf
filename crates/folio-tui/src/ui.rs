use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use folio_core::ChatRole;
use crate::app::App;

const GREETING: &str = "Greetings. Use the input below or voice protocol to query \
    Suyash's architecture, design philosophy, or project availability.";
const PLACEHOLDER: &str = "Message Suyash's Neural...";

// Chat widget size limits, anchored bottom-right like a floating panel
const WIDGET_MAX_WIDTH: u16 = 64;
const WIDGET_MAX_HEIGHT: u16 = 30;

/// Split a line into spans, styling `**bold**` and `*italic*` runs.
/// An unmatched marker is kept as literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(start) = rest.find('*') {
        let (marker, modifier) = if rest[start..].starts_with("**") {
            ("**", Modifier::BOLD)
        } else {
            ("*", Modifier::ITALIC)
        };
        let body_start = start + marker.len();
        // "* item" is a bullet, not emphasis
        let opens = rest[body_start..]
            .chars()
            .next()
            .is_some_and(|c| !c.is_whitespace());

        match rest[body_start..].find(marker) {
            Some(len) if len > 0 && opens => {
                plain.push_str(&rest[..start]);
                if !plain.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut plain)));
                }
                spans.push(Span::styled(
                    rest[body_start..body_start + len].to_string(),
                    Style::default().add_modifier(modifier),
                ));
                rest = &rest[body_start + len + marker.len()..];
            }
            _ => {
                plain.push_str(&rest[..body_start]);
                rest = &rest[body_start..];
            }
        }
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        spans.push(Span::raw(plain));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_landing(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.chat.is_open() {
        render_chat_widget(app, frame, widget_area(body_area));
    } else {
        app.chat_area = None;
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", app.persona.name),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled("| Portfolio ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.chat.is_open() {
        "Enter send | Ctrl+R voice | Up/Down scroll | Esc close | Ctrl+C quit"
    } else {
        "c open assistant | q quit"
    };

    let status = if app.assistant_configured {
        Span::styled(" ONLINE ", Style::default().fg(Color::Black).bg(Color::Green))
    } else {
        Span::styled(" NO API KEY ", Style::default().fg(Color::Black).bg(Color::Yellow))
    };

    let footer = Line::from(vec![
        status,
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}

fn render_landing(app: &App, frame: &mut Frame, area: Rect) {
    let persona = &app.persona;
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            persona.name.to_uppercase(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(persona.headline, Style::default().bold())),
        Line::from(Span::styled(persona.location, label)),
        Line::default(),
        Line::from(vec![Span::styled("Education   ", label), Span::raw(persona.education)]),
        Line::from(vec![Span::styled("Currently   ", label), Span::raw(persona.current_role)]),
        Line::from(vec![Span::styled("Expertise   ", label), Span::raw(persona.expertise)]),
        Line::from(vec![Span::styled("Philosophy  ", label), Span::raw(persona.philosophy)]),
        Line::default(),
    ];

    for link in persona.links {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", link.label), label),
            Span::styled(link.url, Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Press ", label),
        Span::styled("c", Style::default().fg(Color::Yellow).bold()),
        Span::styled(" to talk to the assistant", label),
    ]));

    let landing = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    let [_, inner, _] = Layout::horizontal([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(area);

    frame.render_widget(landing, inner);
}

/// Bottom-right floating panel inside `area`.
fn widget_area(area: Rect) -> Rect {
    let width = area.width.min(WIDGET_MAX_WIDTH);
    let height = area.height.min(WIDGET_MAX_HEIGHT);
    Rect {
        x: area.x + area.width - width,
        y: area.y + area.height - height,
        width,
        height,
    }
}

fn render_chat_widget(app: &mut App, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(" SUYASH AGENT ", Style::default().bold()))
        .title(Span::styled(
            format!(" {} ", app.model),
            Style::default().fg(Color::DarkGray),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [transcript_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    // Store transcript dimensions for scroll calculations and hit-testing
    app.chat_area = Some(transcript_area);
    app.chat_height = transcript_area.height;
    app.chat_width = transcript_area.width;

    render_transcript(app, frame, transcript_area);
    render_input_row(app, frame, input_row);
}

/// Transcript as drawn, without the scroll offset. Line counting for
/// autoscroll goes through the same paragraph so wrapping always agrees.
fn transcript_paragraph(app: &App) -> Paragraph<'_> {
    let loading = app.chat.is_loading();

    let text = if app.chat.messages().is_empty() && !loading {
        Text::from(Span::styled(GREETING, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.chat.messages() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.as_str()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    // Split response into lines and parse markdown
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if loading {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Analysing response{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(text).wrap(Wrap { trim: true })
}

/// Rows the transcript occupies when wrapped to `width` columns.
pub fn transcript_line_count(app: &App, width: u16) -> usize {
    transcript_paragraph(app).line_count(width)
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let transcript = transcript_paragraph(app).scroll((app.chat_scroll, 0));
    frame.render_widget(transcript, area);
}

fn render_input_row(app: &App, frame: &mut Frame, area: Rect) {
    let [input_area, mic_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(7),
    ])
    .areas(area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Ask ");

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat.cursor();

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else {
        (cursor_pos + 1).saturating_sub(inner_width)
    };

    let input = if app.chat.input().is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = app
            .chat
            .input()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), input_area);

    let mic_style = if app.chat.is_listening() {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else if app.chat.voice_available() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mic = Paragraph::new(Span::styled(" MIC ", mic_style))
        .block(Block::default().borders(Borders::ALL).border_style(mic_style));
    frame.render_widget(mic, mic_area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
}
