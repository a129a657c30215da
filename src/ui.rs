use crate::app::{App, Category, MenuItem, Screen, WriteFocus, WriteForm, EMOTION_SLOTS};
use crate::diary_entry::DiaryEntry;
use crate::emotion::Emotion;
use crate::stats::MONTH_NAMES;
use color_eyre::Result;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Archive cards come in three fixed heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSize {
    Small,
    Medium,
    Large,
}

impl CardSize {
    /// Archive layout repeats large, small, small, medium.
    pub fn for_position(index: usize) -> Self {
        match index % 4 {
            0 => CardSize::Large,
            3 => CardSize::Medium,
            _ => CardSize::Small,
        }
    }

    pub fn height(self) -> usize {
        match self {
            CardSize::Small => 3,
            CardSize::Medium => 4,
            CardSize::Large => 5,
        }
    }
}

pub fn emotion_color(emotion: Emotion) -> Color {
    let (r, g, b) = emotion.rgb();
    Color::Rgb(r, g, b)
}

/// Cuts `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn display_date(entry: &DiaryEntry) -> String {
    entry
        .day()
        .map(|d| d.format("%a, %b %-d %Y").to_string())
        .unwrap_or_else(|| entry.date.clone())
}

fn tag_spans(entry: &DiaryEntry, people_limit: usize, with_emotions: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(location) = entry.location() {
        spans.push(Span::styled(format!("@{location} "), Style::default().fg(Color::Green)));
    }
    if let Some(place) = entry.place() {
        spans.push(Span::styled(format!("#{place} "), Style::default().fg(Color::Cyan)));
    }
    for person in entry.people().into_iter().take(people_limit) {
        spans.push(Span::styled(format!("+{person} "), Style::default().fg(Color::Magenta)));
    }
    if with_emotions {
        for emotion in &entry.emotions {
            spans.push(Span::styled(
                format!("{} ", emotion.label()),
                Style::default()
                    .fg(Color::Black)
                    .bg(emotion_color(*emotion)),
            ));
        }
    }
    spans
}

/// Lines of one archive card, padded to the card's height.
pub fn card_lines(entry: &DiaryEntry, size: CardSize, width: usize) -> Vec<Line<'static>> {
    let date = Line::from(Span::styled(
        display_date(entry),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let mut lines = match size {
        CardSize::Small => vec![date, Line::from(tag_spans(entry, 2, true))],
        CardSize::Medium => {
            let text = entry.text.as_deref().unwrap_or("").lines().next().unwrap_or("");
            vec![
                date,
                Line::from(Span::styled(
                    truncate(text, width),
                    Style::default().fg(Color::Gray),
                )),
            ]
        }
        CardSize::Large => vec![
            date,
            Line::from(Span::raw(truncate(
                entry.thumbnail_url().unwrap_or("(no photo)"),
                width,
            ))),
            Line::from(tag_spans(entry, usize::MAX, false)),
        ],
    };
    lines.resize(size.height(), Line::default());
    lines
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|f| render(f, app))?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_heading(f, app, chunks[0]);
    match app.screen {
        Screen::Home => render_home(f, app, chunks[1]),
        Screen::Archive => render_archive(f, app, chunks[1]),
        Screen::Entry => render_entry(f, app, chunks[1]),
        Screen::Insights => render_insights(f, app, chunks[1]),
        Screen::PersonDiaries => render_person_diaries(f, app, chunks[1]),
        Screen::Write => render_write(f, &app.write, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    if let Some(cursor) = app.write.picker.filter(|_| app.screen == Screen::Write) {
        render_picker(f, &app.write, cursor);
    }
    if let Some(cursor) = app.menu {
        render_menu(f, cursor, chunks[0]);
    }
    if let Some(message) = &app.alert {
        render_alert(f, message);
    }
}

fn heading_title(app: &App) -> String {
    match app.screen {
        Screen::Home => "MindLog. ▾".to_string(),
        Screen::Archive => format!("Archive ▾   📅 {}", app.filter.label()),
        Screen::Entry => "Log".to_string(),
        Screen::Insights => format!("Insights ▾   {}", app.stats_year),
        Screen::PersonDiaries => app
            .person_diaries
            .as_ref()
            .map(|p| format!("With {}", p.person_name))
            .unwrap_or_else(|| "Companion".to_string()),
        Screen::Write => format!("New Log   {}", app.write.date.format("%a, %b %-d")),
    }
}

fn render_heading(f: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(heading_title(app))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hint = match app.screen {
        Screen::Home => "w: write  a: archive  i: insights  Enter: open  r: refresh  m: menu  q: quit",
        Screen::Archive if app.filter.editing => "Left/Right: month  Up/Down: year  Enter: apply  Esc: cancel",
        Screen::Archive if app.searching => "Type to search  Enter: done  Esc: clear",
        Screen::Archive => "c: calendar  /: search  Enter: open  w: write  i: insights  Esc: home",
        Screen::Entry => "Esc: back",
        Screen::Insights => "Left/Right: category  Up/Down: select  [ ]: year  Enter: open  Esc: home",
        Screen::PersonDiaries => "Up/Down: navigate  Enter: open  Esc: back",
        Screen::Write => "Tab: next section  Enter: add / pick  Ctrl-S: save  Esc: discard",
    };

    let mut spans = Vec::new();
    if app.is_loading() {
        spans.push(Span::styled("⟳ loading  ", Style::default().fg(Color::LightBlue)));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("{status}  "), Style::default().fg(Color::Green)));
    }
    spans.push(Span::raw(hint));

    let footer = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

fn highlighted_list<'a>(items: Vec<ListItem<'a>>, title: &'a str) -> List<'a> {
    List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ")
}

fn render_home(f: &mut Frame, app: &App, area: Rect) {
    if app.recent.is_empty() {
        let empty = Paragraph::new("No recent logs yet. Press w to write your first one.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Recent activity"));
        f.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = app
        .recent
        .iter()
        .map(|a| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    a.date.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::raw(truncate(a.text.as_deref().unwrap_or(""), width))),
            ])
        })
        .collect();

    f.render_stateful_widget(
        highlighted_list(items, "Recent activity"),
        area,
        &mut ListState::default().with_selected(Some(app.recent_selected)),
    );
}

fn render_archive(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search_style = if app.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(app.search.as_str())
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    f.render_widget(search, chunks[0]);

    let entries = app.visible_entries();
    let width = chunks[1].width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| ListItem::new(card_lines(e, CardSize::for_position(i), width)))
        .collect();

    let title = format!("Logs ({})", entries.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        chunks[1],
        &mut ListState::default().with_selected(Some(app.archive_selected)),
    );
}

fn render_entry(f: &mut Frame, app: &App, area: Rect) {
    let Some(entry) = &app.entry else {
        let waiting = Paragraph::new("Loading…")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(waiting, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            display_date(entry),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(tag_spans(entry, usize::MAX, true)),
        Line::default(),
    ];
    for text_line in entry.text.as_deref().unwrap_or("").lines() {
        lines.push(Line::from(text_line.to_string()));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Photos",
        Style::default().add_modifier(Modifier::UNDERLINED),
    )));
    for url in entry.image_urls() {
        lines.push(Line::from(format!("  {url}")));
    }

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Entry"));
    f.render_widget(detail, area);
}

fn render_insights(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let titles: Vec<&str> = Category::ALL.iter().map(|c| c.title()).collect();
    let selected = Category::ALL
        .iter()
        .position(|c| *c == app.category)
        .unwrap_or_default();
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    match app.category {
        Category::Emotion => render_emotion_stats(f, app, chunks[1]),
        Category::People => render_people(f, app, chunks[1]),
        Category::Place => render_places(f, app, chunks[1]),
    }
}

fn render_emotion_stats(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let bar_width = chunks[0].width.saturating_sub(22) as usize;
    let mut lines = vec![Line::from(match app.dominant_emotion() {
        Some(e) => format!("Most felt this year: {} ({})", e.label(), e.english()),
        None => "No entries for this year".to_string(),
    })];
    lines.push(Line::default());
    for emotion in Emotion::ALL {
        let share = app.ratio.map_or(0.0, |r| r.get(emotion));
        let filled = ((share / 100.0) * bar_width as f64).round() as usize;
        let marker = if emotion == app.selected_emotion { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker}{} ", emotion.label())),
            Span::styled("█".repeat(filled), Style::default().fg(emotion_color(emotion))),
            Span::raw(format!(" {share:.1}%")),
        ]));
    }
    let ratio = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Emotion ratio"));
    f.render_widget(ratio, chunks[0]);

    let counts = app.monthly.map(|m| m.counts()).unwrap_or_default();
    let data: Vec<(&str, u64)> = MONTH_NAMES
        .iter()
        .zip(counts)
        .map(|(name, count)| (*name, u64::from(count)))
        .collect();
    let label = app.selected_emotion.label();
    let title = match app.monthly.and_then(|m| m.peak_month().map(|peak| (m, peak))) {
        Some((monthly, peak)) => format!(
            "{label} by month, {} total, peak {} ({})",
            monthly.total(),
            MONTH_NAMES[peak as usize - 1],
            monthly.month(peak).unwrap_or(0)
        ),
        None => format!("{label} by month"),
    };
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(data.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(emotion_color(app.selected_emotion)));
    f.render_widget(chart, chunks[1]);
}

fn render_people(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .people
        .iter()
        .map(|p| {
            ListItem::new(Line::from(vec![
                Span::styled(p.person_name.clone(), Style::default().fg(Color::Magenta)),
                Span::raw(format!("  {} logs", p.diary_count)),
            ]))
        })
        .collect();
    f.render_stateful_widget(
        highlighted_list(items, "Companions"),
        area,
        &mut ListState::default().with_selected(Some(app.people_selected)),
    );
}

fn render_places(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .place_groups()
        .into_iter()
        .map(|g| {
            ListItem::new(Line::from(vec![
                Span::styled(g.place_name, Style::default().fg(Color::Cyan)),
                Span::raw(format!("  {} logs", g.diary_count)),
            ]))
        })
        .collect();
    f.render_stateful_widget(
        highlighted_list(items, "Places"),
        area,
        &mut ListState::default().with_selected(Some(app.place_selected)),
    );
}

fn render_person_diaries(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = app
        .person_diaries
        .iter()
        .flat_map(|p| p.diaries.iter())
        .map(|d| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    d.date.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(truncate(&d.text, width)),
            ])
        })
        .collect();
    f.render_stateful_widget(
        highlighted_list(items, "Logs together"),
        area,
        &mut ListState::default().with_selected(Some(app.person_selected)),
    );
}

fn section_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn render_write(f: &mut Frame, form: &WriteForm, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Min(5),
        ])
        .split(area);

    let mut photo_lines: Vec<Line> = form
        .image_paths
        .iter()
        .enumerate()
        .map(|(i, p)| Line::from(format!("{}. {}", i + 1, p.display())))
        .collect();
    let cursor = if form.focus == WriteFocus::Photos { "|" } else { "" };
    photo_lines.push(Line::from(Span::styled(
        format!("+ {}{cursor}", form.path_input),
        Style::default().fg(Color::Gray),
    )));
    let photos = Paragraph::new(photo_lines).block(section_block(
        "Photos (type a path, Enter to add)",
        form.focus == WriteFocus::Photos,
    ));
    f.render_widget(photos, chunks[0]);

    let mut slot_spans = Vec::new();
    for i in 0..EMOTION_SLOTS {
        let label = form.slots[i].map_or("  +  ".to_string(), |e| format!(" {} ", e.label()));
        let mut style = match form.slots[i] {
            Some(e) => Style::default().fg(Color::Black).bg(emotion_color(e)),
            None => Style::default().fg(Color::Gray),
        };
        if form.focus == WriteFocus::Emotions && i == form.slot {
            style = style.add_modifier(Modifier::REVERSED);
        }
        slot_spans.push(Span::styled(format!("[{label}]"), style));
        slot_spans.push(Span::raw(" "));
    }
    let emotions = Paragraph::new(Line::from(slot_spans))
        .block(section_block("Emotions", form.focus == WriteFocus::Emotions));
    f.render_widget(emotions, chunks[1]);

    let caption_text = if form.focus == WriteFocus::Caption {
        format!("{}|", form.caption)
    } else {
        form.caption.clone()
    };
    let caption = Paragraph::new(caption_text)
        .wrap(Wrap { trim: false })
        .block(section_block("Caption", form.focus == WriteFocus::Caption));
    f.render_widget(caption, chunks[2]);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_picker(f: &mut Frame, form: &WriteForm, cursor: usize) {
    let mut items = vec![ListItem::new("None")];
    for emotion in Emotion::ALL {
        let style = if form.is_disabled(emotion) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(emotion_color(emotion))
        };
        items.push(ListItem::new(Span::styled(
            format!("{} ({})", emotion.label(), emotion.english()),
            style,
        )));
    }

    let area = centered(f.area(), 30, 12);
    f.render_widget(Clear, area);
    f.render_stateful_widget(
        highlighted_list(items, "Pick an emotion"),
        area,
        &mut ListState::default().with_selected(Some(cursor)),
    );
}

fn render_menu(f: &mut Frame, cursor: usize, heading: Rect) {
    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .map(|item| ListItem::new(item.title()))
        .collect();
    let area = Rect {
        x: heading.x,
        y: heading.y + heading.height,
        width: 20.min(heading.width),
        height: 5,
    }
    .intersection(f.area());
    f.render_widget(Clear, area);
    f.render_stateful_widget(
        highlighted_list(items, "Menu"),
        area,
        &mut ListState::default().with_selected(Some(cursor)),
    );
}

fn render_alert(f: &mut Frame, message: &str) {
    let area = centered(f.area(), 50, 5);
    f.render_widget(Clear, area);
    let alert = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title("Server connection failed"),
    );
    f.render_widget(alert, area);
}
