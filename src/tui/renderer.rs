//! TUI rendering system
//!
//! Draws the search and detail screens from an `&App` and reports the
//! areas it used, so mouse events can be resolved against the last frame.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{ToastState, ToastType};
use crate::app::{App, FrameLayout, HitRegions, Route};
use crate::controller::SearchController;
use crate::detail::{DetailState, DetailView, NOT_FOUND_TITLE};
use crate::format::{format_timestamp, PriceFormat};
use crate::types::{Candidate, ItemDetail};

const BACK_LABEL: &str = "← Back to Search";
const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Central renderer for TUI application
pub struct TuiRenderer;

impl TuiRenderer {
    /// Render the complete TUI interface
    pub fn render(f: &mut Frame, app: &App, frame_count: usize) -> FrameLayout {
        let layout = match app.route() {
            Route::Search => Self::render_search_screen(f, app, frame_count),
            Route::Detail(_) => match app.detail() {
                Some(detail) => Self::render_detail_screen(f, app, detail),
                None => FrameLayout::default(),
            },
        };

        if app.toast.visible {
            Self::render_toast(f, &app.toast);
        }
        if app.show_help {
            Self::render_help_overlay(f);
        }
        layout
    }

    fn render_search_screen(f: &mut Frame, app: &App, frame_count: usize) -> FrameLayout {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Length(3), // Input box
                Constraint::Min(1),    // Suggestions
                Constraint::Length(3), // Status bar
            ])
            .split(f.size());

        Self::render_header(f, chunks[0]);
        let controller = app.controller();
        Self::render_input_box(
            f,
            chunks[1],
            controller,
            app.editor().cursor_position,
            frame_count,
        );

        let mut layout = FrameLayout {
            hit: HitRegions {
                input: Some(chunks[1]),
                ..HitRegions::default()
            },
            panel_rows: 0,
        };

        if controller.shows_suggestions() {
            let (panel, rows, panel_rows) = Self::render_suggestions(
                f,
                chunks[2],
                controller,
                app.viewport().visible_range(controller.results().len()),
                &app.config.price_format,
            );
            layout.hit.panel = Some(panel);
            layout.hit.rows = rows;
            layout.panel_rows = panel_rows;
        } else if controller.shows_no_results() {
            let panel = Rect {
                height: chunks[2].height.min(3),
                ..chunks[2]
            };
            let no_results = Paragraph::new("No results found")
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(Color::Gray));
            f.render_widget(no_results, panel);
            layout.hit.panel = Some(panel);
        }

        Self::render_status_bar(f, chunks[3], app);
        layout
    }

    fn render_header(f: &mut Frame, area: Rect) {
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "Search with Autocomplete",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Type to search, typos welcome",
                Style::default().fg(Color::Gray),
            )),
        ]);
        f.render_widget(header, area);
    }

    /// Render the input box with a visible caret and the loading spinner
    fn render_input_box(
        f: &mut Frame,
        area: Rect,
        controller: &SearchController,
        cursor_pos: usize,
        frame_count: usize,
    ) {
        let title = if controller.is_loading() {
            format!("Search {}", SPINNER_FRAMES[frame_count % SPINNER_FRAMES.len()])
        } else {
            "Search".to_string()
        };

        let text = controller.text();
        let line = if text.is_empty() {
            Line::from(vec![
                Span::raw("█"),
                Span::styled(
                    "Search items... (try typing 'laptp' or 'keybord')",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(insert_caret(text, cursor_pos))
        };

        let input = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::White));
        f.render_widget(input, area);
    }

    /// Render the suggestion rows in view. Returns the panel area, the
    /// rect of each drawn row and how many rows fit.
    fn render_suggestions(
        f: &mut Frame,
        area: Rect,
        controller: &SearchController,
        visible: std::ops::Range<usize>,
        price_format: &PriceFormat,
    ) -> (Rect, Vec<(usize, Rect)>, usize) {
        let results = controller.results();
        let capacity = area.height.saturating_sub(2) as usize;
        let panel_height = (results.len().min(capacity) + 2).min(area.height as usize) as u16;
        let panel = Rect {
            height: panel_height,
            ..area
        };
        let inner = Block::default().borders(Borders::ALL).inner(panel);

        let start = visible.start;
        let end = visible.end.max(start + capacity).min(results.len());
        let inner_width = inner.width as usize;

        let items: Vec<ListItem> = results[start..end]
            .iter()
            .map(|candidate| ListItem::new(Self::suggestion_line(candidate, price_format, inner_width)))
            .collect();

        let title = match controller.cursor() {
            Some(index) => format!("Suggestions ({}/{})", index + 1, results.len()),
            None => format!("Suggestions ({})", results.len()),
        };

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));

        let mut list_state = ListState::default();
        list_state.select(
            controller
                .cursor()
                .filter(|index| (start..end).contains(index))
                .map(|index| index - start),
        );

        f.render_widget(Clear, panel);
        f.render_stateful_widget(list, panel, &mut list_state);

        let rows = (start..end)
            .map(|index| {
                let rect = Rect {
                    x: inner.x,
                    y: inner.y + (index - start) as u16,
                    width: inner.width,
                    height: 1,
                };
                (index, rect)
            })
            .collect();

        (panel, rows, capacity)
    }

    /// Name and category on the left, price flush right
    pub fn suggestion_line(candidate: &Candidate, price_format: &PriceFormat, width: usize) -> Line<'static> {
        let price = price_format.format(candidate.price);
        let left_len = candidate.name.chars().count() + 2 + candidate.category.chars().count();
        let padding = width.saturating_sub(left_len + price.chars().count()).max(1);

        Line::from(vec![
            Span::styled(
                candidate.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(candidate.category.clone(), Style::default().fg(Color::Gray)),
            Span::raw(" ".repeat(padding)),
            Span::styled(price, Style::default().fg(Color::Green)),
        ])
    }

    fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
        let help_text = "↑↓/C-p/C-n: Navigate | Enter: Select | Esc: Close | C-a/e: Start/End | C-k/y: Kill/Yank | F1: Help | C-c: Quit";
        let title = format!("{} | {}", app.config.api_base_url, phase_label(app.controller()));
        let help_status = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::Gray));
        f.render_widget(help_status, area);
    }

    fn render_detail_screen(f: &mut Frame, app: &App, detail: &DetailView) -> FrameLayout {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(f.size());

        let back_button = Rect {
            width: (BACK_LABEL.chars().count() as u16 + 4).min(chunks[0].width),
            ..chunks[0]
        };
        let back = Paragraph::new(BACK_LABEL)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Cyan));
        f.render_widget(back, back_button);

        let body = match detail.state() {
            DetailState::Loading => {
                let mut lines = vec![Line::from(""), Line::from("Loading item details...")];
                if let Some(selected) = app.last_selection().filter(|c| c.id == detail.id()) {
                    lines.push(Line::from(Span::styled(
                        format!("Selected: {}", selected.name),
                        Style::default().fg(Color::Gray),
                    )));
                }
                Paragraph::new(lines)
                    .block(Block::default().borders(Borders::ALL))
                    .alignment(Alignment::Center)
            }
            DetailState::Loaded(item) => {
                Paragraph::new(Self::detail_text(item, &app.config.price_format))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(item.name.clone()),
                    )
                    .wrap(Wrap { trim: false })
            }
            DetailState::NotFound | DetailState::Failed => {
                let message = detail.failure_message().unwrap_or_default();
                Paragraph::new(vec![
                    Line::from(""),
                    Line::from(message),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Press Esc or click Back to Search",
                        Style::default().fg(Color::Gray),
                    )),
                ])
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(NOT_FOUND_TITLE)
                        .border_style(Style::default().fg(Color::Red)),
                )
                .alignment(Alignment::Center)
            }
        };
        f.render_widget(body, chunks[1]);

        FrameLayout {
            hit: HitRegions {
                back_button: Some(back_button),
                ..HitRegions::default()
            },
            panel_rows: 0,
        }
    }

    /// Body of a loaded item
    pub fn detail_text(item: &ItemDetail, price_format: &PriceFormat) -> Text<'static> {
        let label = Style::default().fg(Color::Gray);
        let heading = Style::default().add_modifier(Modifier::BOLD);
        let price = price_format.format(item.price);

        let mut lines = vec![
            Line::from(vec![
                Span::styled(item.name.clone(), heading),
                Span::raw("  "),
                Span::styled(
                    format!(" {} ", item.category),
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                price.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Description", heading)),
            Line::from(item.description.clone()),
        ];

        if !item.tags.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Tags", heading)));
            let mut tags = Vec::new();
            for tag in &item.tags {
                tags.push(Span::styled(
                    format!("[{}]", tag),
                    Style::default().fg(Color::Yellow),
                ));
                tags.push(Span::raw(" "));
            }
            lines.push(Line::from(tags));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Category: ", label),
            Span::raw(item.category.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Price: ", label),
            Span::raw(price),
        ]));
        if let Some(created_at) = &item.created_at {
            lines.push(Line::from(vec![
                Span::styled("Added: ", label),
                Span::raw(format_timestamp(created_at, price_format.locale)),
            ]));
        }

        Text::from(lines)
    }

    /// Render toast notification
    fn render_toast(f: &mut Frame, toast_state: &ToastState) {
        let (width_chars, height_lines) = Self::calculate_toast_size_absolute(toast_state, f.size());
        let popup_area = Self::top_right_rect_absolute(width_chars, height_lines, f.size());

        f.render_widget(Clear, popup_area);

        let (border_color, text_color, title) = match toast_state.toast_type {
            ToastType::Info => (Color::Blue, Color::White, "Info"),
            ToastType::Warning => (Color::Yellow, Color::White, "Warning"),
            ToastType::Error => (Color::Red, Color::White, "Error"),
        };

        let toast = Paragraph::new(toast_state.message.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(border_color)),
            )
            .style(Style::default().fg(text_color))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });

        f.render_widget(toast, popup_area);
    }

    fn render_help_overlay(f: &mut Frame) {
        let area = Self::centered_rect(60, 60, f.size());
        f.render_widget(Clear, area);

        let help = Paragraph::new(vec![
            Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  type            search as you type"),
            Line::from("  Enter           search now / open highlighted item"),
            Line::from("  ↑ ↓  C-p C-n    move highlight"),
            Line::from("  Esc             close suggestions / back"),
            Line::from("  mouse           hover to highlight, click to open"),
            Line::from("  C-c             quit"),
            Line::from(""),
            Line::from(Span::styled("Features", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  Fuzzy matching: results even with typos and partial words"),
            Line::from("  Real-time search: suggestions while typing, debounced"),
            Line::from("  Keyboard navigation over the suggestion list"),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help (F1)")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

        f.render_widget(help, area);
    }

    /// Calculate toast size in absolute character dimensions
    pub fn calculate_toast_size_absolute(toast_state: &ToastState, screen_size: Rect) -> (u16, u16) {
        let max_width = screen_size.width.saturating_sub(4);
        let min_width = 20;

        // Borders and padding take 4 columns
        let content_width = toast_state.message.chars().count() as u16;
        let width = content_width.saturating_add(4).max(min_width).min(max_width);

        let text_area_width = width.saturating_sub(4);
        let height =
            Self::calculate_wrapped_lines(&toast_state.message, text_area_width as usize) as u16 + 2;

        (width, height)
    }

    /// Create a top-right positioned rectangle with absolute dimensions
    pub fn top_right_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
        let x = r.width.saturating_sub(width.saturating_add(1));
        let y = 1;

        Rect {
            x: r.x + x,
            y: r.y + y,
            width: width.min(r.width),
            height: height.min(r.height),
        }
    }

    /// Create a centered rectangle with percentage-based sizing.
    /// Odd leftover space goes below and to the right.
    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let width = (r.width as u32 * percent_x.min(100) as u32 / 100) as u16;
        let height = (r.height as u32 * percent_y.min(100) as u32 / 100) as u16;

        Rect {
            x: r.x + (r.width - width) / 2,
            y: r.y + (r.height - height) / 2,
            width,
            height,
        }
    }

    /// Calculate number of lines needed for text when wrapped to given width
    pub fn calculate_wrapped_lines(text: &str, width: usize) -> usize {
        if width == 0 {
            return text.lines().count().max(1);
        }

        text.lines()
            .map(|line| {
                if line.is_empty() {
                    1
                } else {
                    let char_count = line.chars().count();
                    (char_count + width - 1) / width
                }
            })
            .sum::<usize>()
            .max(1)
    }
}

fn phase_label(controller: &SearchController) -> &'static str {
    use crate::controller::PanelPhase;
    match controller.phase() {
        PanelPhase::Idle => "Ready",
        PanelPhase::Typing => "Searching",
        PanelPhase::Open => "Results",
        PanelPhase::Closed => "Closed",
    }
}

/// Query text with a block caret at `cursor_pos` (in chars)
fn insert_caret(text: &str, cursor_pos: usize) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let position = cursor_pos.min(chars.len());
    chars.insert(position, '█');
    chars.into_iter().collect()
}
