use crate::archive::{group_by_place, DiaryActivity, PersonDiaries, PersonGroup, PlaceGroup};
use crate::diary_entry::{validate_selection, DiaryEntry};
use crate::emotion::Emotion;
use crate::error::{ServiceError, ServiceResult};
use crate::stats::{DominantEmotion, EmotionRatio, MonthlyEmotionCount};
use chrono::{Datelike, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use tracing::warn;

pub const ALERT_MESSAGE: &str = "Could not reach the server. Please try again shortly.";
pub const EMOTION_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Archive,
    Entry,
    Insights,
    PersonDiaries,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Emotion,
    People,
    Place,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Emotion, Category::People, Category::Place];

    pub fn title(self) -> &'static str {
        match self {
            Category::Emotion => "Emotion",
            Category::People => "People",
            Category::Place => "Place",
        }
    }

    fn index(self) -> usize {
        Category::ALL.iter().position(|c| *c == self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Home,
    Archive,
    Logout,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Home, MenuItem::Archive, MenuItem::Logout];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Home => "MindLog.",
            MenuItem::Archive => "Archive",
            MenuItem::Logout => "Logout",
        }
    }
}

/// A diary submission as collected by the write screen. Photos are read and
/// compressed by the task that sends it.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub date: NaiveDate,
    pub image_paths: Vec<PathBuf>,
    pub emotions: Vec<Emotion>,
    pub text: String,
}

/// Work the UI asks for. Each command is answered by one or more [`AppEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadRecent,
    LoadDiaries { year: Option<i32>, month: Option<u32> },
    LoadEntry(String),
    LoadStats { year: i32 },
    LoadMonthly { emotion: Emotion, year: i32 },
    LoadPeople,
    LoadPersonDiaries(String),
    Submit(Submission),
    Logout,
}

impl Command {
    pub fn expected_events(&self) -> usize {
        match self {
            Command::LoadStats { .. } => 2,
            _ => 1,
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    RecentLoaded(ServiceResult<Vec<DiaryActivity>>),
    DiariesLoaded(ServiceResult<Vec<DiaryEntry>>),
    EntryLoaded(ServiceResult<DiaryEntry>),
    RatioLoaded(ServiceResult<EmotionRatio>),
    DominantLoaded(ServiceResult<DominantEmotion>),
    MonthlyLoaded(Emotion, ServiceResult<MonthlyEmotionCount>),
    PeopleLoaded(ServiceResult<Vec<PersonGroup>>),
    PersonDiariesLoaded(ServiceResult<PersonDiaries>),
    DiaryCreated(ServiceResult<DiaryEntry>),
    LoggedOut(ServiceResult<()>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub year: i32,
    pub month: Option<u32>,
    pub editing: bool,
}

impl DateFilter {
    fn next_month(&mut self) {
        self.month = match self.month {
            None => Some(1),
            Some(12) => None,
            Some(m) => Some(m + 1),
        };
    }

    fn previous_month(&mut self) {
        self.month = match self.month {
            None => Some(12),
            Some(1) => None,
            Some(m) => Some(m - 1),
        };
    }

    pub fn label(&self) -> String {
        match self.month {
            Some(m) => format!("{}-{:02}", self.year, m),
            None => self.year.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFocus {
    Photos,
    Emotions,
    Caption,
}

impl WriteFocus {
    fn next(self) -> Self {
        match self {
            WriteFocus::Photos => WriteFocus::Emotions,
            WriteFocus::Emotions => WriteFocus::Caption,
            WriteFocus::Caption => WriteFocus::Photos,
        }
    }

    fn previous(self) -> Self {
        match self {
            WriteFocus::Photos => WriteFocus::Caption,
            WriteFocus::Emotions => WriteFocus::Photos,
            WriteFocus::Caption => WriteFocus::Emotions,
        }
    }
}

/// State of the new-entry editor: photo list, three emotion slots and a
/// caption.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteForm {
    pub date: NaiveDate,
    pub image_paths: Vec<PathBuf>,
    pub path_input: String,
    pub slots: [Option<Emotion>; EMOTION_SLOTS],
    pub slot: usize,
    /// Cursor into the picker when open; 0 is "none", then [`Emotion::ALL`].
    pub picker: Option<usize>,
    pub caption: String,
    pub focus: WriteFocus,
    pub submitting: bool,
}

impl WriteForm {
    pub fn new(date: NaiveDate) -> Self {
        WriteForm {
            date,
            image_paths: Vec::new(),
            path_input: String::new(),
            slots: [None; EMOTION_SLOTS],
            slot: 0,
            picker: None,
            caption: String::new(),
            focus: WriteFocus::Photos,
            submitting: false,
        }
    }

    pub fn emotions(&self) -> Vec<Emotion> {
        self.slots.iter().flatten().copied().collect()
    }

    /// An emotion already chosen in another slot cannot be picked again.
    pub fn is_disabled(&self, emotion: Emotion) -> bool {
        self.slots
            .iter()
            .enumerate()
            .any(|(i, s)| i != self.slot && *s == Some(emotion))
    }

    pub fn picker_choice(cursor: usize) -> Option<Emotion> {
        cursor.checked_sub(1).and_then(|i| Emotion::ALL.get(i).copied())
    }

    fn open_picker(&mut self) {
        let cursor = self.slots[self.slot].map_or(0, |e| e.index() + 1);
        self.picker = Some(cursor);
    }

    fn choose(&mut self, cursor: usize) -> bool {
        let choice = Self::picker_choice(cursor);
        if choice.is_some_and(|e| self.is_disabled(e)) {
            return false;
        }
        self.slots[self.slot] = choice;
        self.picker = None;
        true
    }

    fn commit_path(&mut self) {
        let path = self.path_input.trim();
        if !path.is_empty() {
            self.image_paths.push(PathBuf::from(path));
        }
        self.path_input.clear();
    }

    fn submission(&self) -> Submission {
        Submission {
            date: self.date,
            image_paths: self.image_paths.clone(),
            emotions: self.emotions(),
            text: self.caption.trim_end().to_string(),
        }
    }
}

/// Everything the screens render. Only the UI loop mutates it, through
/// [`App::handle_key`] and [`App::apply`].
#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: Screen,
    pub return_to: Screen,
    pub loading: usize,
    pub alert: Option<String>,
    pub status: Option<String>,
    pub menu: Option<usize>,
    pub today: NaiveDate,

    pub recent: Vec<DiaryActivity>,
    pub recent_selected: usize,

    pub entries: Vec<DiaryEntry>,
    pub archive_selected: usize,
    pub filter: DateFilter,
    pub search: String,
    pub searching: bool,

    pub entry: Option<DiaryEntry>,

    pub category: Category,
    pub stats_year: i32,
    pub ratio: Option<EmotionRatio>,
    pub dominant: Option<Emotion>,
    pub selected_emotion: Emotion,
    pub monthly: Option<MonthlyEmotionCount>,
    pub people: Vec<PersonGroup>,
    pub people_selected: usize,
    pub person_diaries: Option<PersonDiaries>,
    pub person_selected: usize,
    pub place_selected: usize,

    pub write: WriteForm,
}

impl App {
    pub fn new(today: NaiveDate) -> Self {
        App {
            running: true,
            screen: Screen::Home,
            return_to: Screen::Home,
            loading: 0,
            alert: None,
            status: None,
            menu: None,
            today,
            recent: Vec::new(),
            recent_selected: 0,
            entries: Vec::new(),
            archive_selected: 0,
            filter: DateFilter {
                year: today.year(),
                month: None,
                editing: false,
            },
            search: String::new(),
            searching: false,
            entry: None,
            category: Category::Emotion,
            stats_year: today.year(),
            ratio: None,
            dominant: None,
            selected_emotion: Emotion::Joy,
            monthly: None,
            people: Vec::new(),
            people_selected: 0,
            person_diaries: None,
            person_selected: 0,
            place_selected: 0,
            write: WriteForm::new(today),
        }
    }

    pub fn start(&mut self) -> Vec<Command> {
        self.issue(vec![Command::LoadRecent])
    }

    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    /// Archive entries narrowed by the current search query.
    pub fn visible_entries(&self) -> Vec<&DiaryEntry> {
        let query = self.search.trim();
        self.entries
            .iter()
            .filter(|e| query.is_empty() || e.matches(query))
            .collect()
    }

    /// The server's answer when it has one, else the largest share in the
    /// loaded ratio.
    pub fn dominant_emotion(&self) -> Option<Emotion> {
        self.dominant
            .or_else(|| self.ratio.as_ref().and_then(EmotionRatio::strongest))
    }

    pub fn place_groups(&self) -> Vec<PlaceGroup> {
        group_by_place(&self.entries)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return Vec::new();
        }
        if self.alert.is_some() {
            self.alert = None;
            return Vec::new();
        }
        if let Some(cursor) = self.menu {
            let commands = self.menu_key(key.code, cursor);
            return self.issue(commands);
        }

        let commands = match self.screen {
            Screen::Home => self.home_key(key.code),
            Screen::Archive => self.archive_key(key.code),
            Screen::Entry => self.entry_key(key.code),
            Screen::Insights => self.insights_key(key.code),
            Screen::PersonDiaries => self.person_diaries_key(key.code),
            Screen::Write => self.write_key(key),
        };
        self.issue(commands)
    }

    /// Folds a finished task back into the state. May ask for follow-up work.
    pub fn apply(&mut self, event: AppEvent) -> Vec<Command> {
        self.loading = self.loading.saturating_sub(1);
        let mut follow_up = Vec::new();

        match event {
            AppEvent::RecentLoaded(result) => {
                if let Some(recent) = self.ok(result) {
                    self.recent = recent;
                    self.recent_selected = clamp(self.recent_selected, self.recent.len());
                }
            }
            AppEvent::DiariesLoaded(result) => {
                if let Some(entries) = self.ok(result) {
                    self.entries = entries;
                    self.archive_selected = clamp(self.archive_selected, self.entries.len());
                    self.place_selected = clamp(self.place_selected, self.place_groups().len());
                }
            }
            AppEvent::EntryLoaded(result) => match self.ok(result) {
                Some(entry) => self.entry = Some(entry),
                None if self.screen == Screen::Entry => self.screen = self.return_to,
                None => {}
            },
            AppEvent::RatioLoaded(result) => {
                self.ratio = self.ok_or_empty(result);
            }
            AppEvent::DominantLoaded(result) => {
                self.dominant = self.ok_or_empty(result).map(|d| d.emotion);
            }
            AppEvent::MonthlyLoaded(emotion, result) => {
                let monthly = self.ok_or_empty(result);
                if emotion == self.selected_emotion {
                    self.monthly = monthly;
                }
            }
            AppEvent::PeopleLoaded(result) => {
                if let Some(people) = self.ok(result) {
                    self.people = people;
                    self.people_selected = clamp(self.people_selected, self.people.len());
                }
            }
            AppEvent::PersonDiariesLoaded(result) => match self.ok(result) {
                Some(diaries) => {
                    self.person_diaries = Some(diaries);
                    self.person_selected = 0;
                }
                None if self.screen == Screen::PersonDiaries => self.screen = Screen::Insights,
                None => {}
            },
            AppEvent::DiaryCreated(result) => {
                self.write.submitting = false;
                if let Some(entry) = self.ok(result) {
                    self.write = WriteForm::new(self.today);
                    if self.screen == Screen::Write {
                        self.entry = Some(entry);
                        self.screen = Screen::Entry;
                        self.return_to = Screen::Home;
                    }
                    self.status = Some("Diary saved".to_string());
                    follow_up.push(Command::LoadRecent);
                }
            }
            AppEvent::LoggedOut(result) => {
                if self.ok(result).is_some() {
                    self.recent.clear();
                    self.entries.clear();
                    self.people.clear();
                    self.entry = None;
                    self.ratio = None;
                    self.dominant = None;
                    self.monthly = None;
                    self.person_diaries = None;
                    self.screen = Screen::Home;
                    self.status = Some("Signed out".to_string());
                }
            }
        }

        self.issue(follow_up)
    }

    fn issue(&mut self, commands: Vec<Command>) -> Vec<Command> {
        self.loading += commands.iter().map(Command::expected_events).sum::<usize>();
        commands
    }

    fn ok<T>(&mut self, result: ServiceResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.fail(&e);
                None
            }
        }
    }

    /// Statistics endpoints answer 404 when a year has no entries; that is
    /// shown as an empty chart rather than an alert.
    fn ok_or_empty<T>(&mut self, result: ServiceResult<T>) -> Option<T> {
        match result {
            Err(ServiceError::ServerResponse { status: 404, .. }) => None,
            other => self.ok(other),
        }
    }

    fn fail(&mut self, error: &ServiceError) {
        warn!(error = %error, server_side = error.is_server_side(), "request failed");
        self.alert = Some(match error {
            ServiceError::AuthenticationRequired => {
                "You are signed out. Store a token and try again.".to_string()
            }
            ServiceError::FixedCredentials => error.to_string(),
            _ => ALERT_MESSAGE.to_string(),
        });
    }

    fn menu_key(&mut self, code: KeyCode, cursor: usize) -> Vec<Command> {
        match code {
            KeyCode::Up => self.menu = Some(cursor.saturating_sub(1)),
            KeyCode::Down => self.menu = Some((cursor + 1).min(MenuItem::ALL.len() - 1)),
            KeyCode::Esc | KeyCode::Char('m') => self.menu = None,
            KeyCode::Enter => {
                self.menu = None;
                return match MenuItem::ALL[cursor] {
                    MenuItem::Home => self.go_home(),
                    MenuItem::Archive => self.open_archive(),
                    MenuItem::Logout => vec![Command::Logout],
                };
            }
            _ => {}
        }
        Vec::new()
    }

    fn go_home(&mut self) -> Vec<Command> {
        self.screen = Screen::Home;
        vec![Command::LoadRecent]
    }

    fn open_archive(&mut self) -> Vec<Command> {
        self.screen = Screen::Archive;
        vec![self.load_diaries()]
    }

    fn load_diaries(&self) -> Command {
        Command::LoadDiaries {
            year: Some(self.filter.year),
            month: self.filter.month,
        }
    }

    fn open_write(&mut self) -> Vec<Command> {
        if !self.write.submitting {
            self.write = WriteForm::new(self.today);
        }
        self.screen = Screen::Write;
        Vec::new()
    }

    fn open_entry(&mut self, id: String) -> Vec<Command> {
        self.return_to = self.screen;
        self.entry = None;
        self.screen = Screen::Entry;
        vec![Command::LoadEntry(id)]
    }

    fn open_insights(&mut self) -> Vec<Command> {
        self.screen = Screen::Insights;
        self.category_commands()
    }

    fn category_commands(&self) -> Vec<Command> {
        match self.category {
            Category::Emotion => vec![
                Command::LoadStats {
                    year: self.stats_year,
                },
                Command::LoadMonthly {
                    emotion: self.selected_emotion,
                    year: self.stats_year,
                },
            ],
            Category::People => vec![Command::LoadPeople],
            Category::Place if self.entries.is_empty() => vec![self.load_diaries()],
            Category::Place => Vec::new(),
        }
    }

    fn home_key(&mut self, code: KeyCode) -> Vec<Command> {
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('m') => self.menu = Some(0),
            KeyCode::Up => self.recent_selected = self.recent_selected.saturating_sub(1),
            KeyCode::Down => self.recent_selected = step(self.recent_selected, self.recent.len()),
            KeyCode::Enter => {
                if let Some(activity) = self.recent.get(self.recent_selected) {
                    let id = activity.id.clone();
                    return self.open_entry(id);
                }
            }
            KeyCode::Char('w') => return self.open_write(),
            KeyCode::Char('a') => return self.open_archive(),
            KeyCode::Char('i') => return self.open_insights(),
            KeyCode::Char('r') => return vec![Command::LoadRecent],
            _ => {}
        }
        Vec::new()
    }

    fn archive_key(&mut self, code: KeyCode) -> Vec<Command> {
        if self.filter.editing {
            match code {
                KeyCode::Left => self.filter.previous_month(),
                KeyCode::Right => self.filter.next_month(),
                KeyCode::Up => self.filter.year += 1,
                KeyCode::Down => self.filter.year -= 1,
                KeyCode::Enter => {
                    self.filter.editing = false;
                    self.archive_selected = 0;
                    return vec![self.load_diaries()];
                }
                KeyCode::Esc => self.filter.editing = false,
                _ => {}
            }
            return Vec::new();
        }

        if self.searching {
            match code {
                KeyCode::Char(c) => self.search.push(c),
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Enter => self.searching = false,
                KeyCode::Esc => {
                    self.search.clear();
                    self.searching = false;
                }
                _ => {}
            }
            self.archive_selected = 0;
            return Vec::new();
        }

        let visible = self.visible_entries().len();
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('m') => self.menu = Some(0),
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Up => self.archive_selected = self.archive_selected.saturating_sub(1),
            KeyCode::Down => self.archive_selected = step(self.archive_selected, visible),
            KeyCode::Enter => {
                let id = self
                    .visible_entries()
                    .get(self.archive_selected)
                    .map(|e| e.id.clone());
                if let Some(id) = id {
                    return self.open_entry(id);
                }
            }
            KeyCode::Char('c') => self.filter.editing = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('w') => return self.open_write(),
            KeyCode::Char('i') => return self.open_insights(),
            KeyCode::Char('r') => return vec![self.load_diaries()],
            _ => {}
        }
        Vec::new()
    }

    fn entry_key(&mut self, code: KeyCode) -> Vec<Command> {
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Esc | KeyCode::Backspace => {
                self.screen = self.return_to;
                if self.screen == Screen::Home && self.recent.is_empty() {
                    return vec![Command::LoadRecent];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn insights_key(&mut self, code: KeyCode) -> Vec<Command> {
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('m') => self.menu = Some(0),
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Left | KeyCode::Right => {
                let i = self.category.index();
                let n = Category::ALL.len();
                let next = if code == KeyCode::Left { (i + n - 1) % n } else { (i + 1) % n };
                self.category = Category::ALL[next];
                return self.category_commands();
            }
            _ => {
                return match self.category {
                    Category::Emotion => self.emotion_tab_key(code),
                    Category::People => self.people_tab_key(code),
                    Category::Place => self.place_tab_key(code),
                }
            }
        }
        Vec::new()
    }

    fn emotion_tab_key(&mut self, code: KeyCode) -> Vec<Command> {
        let index = self.selected_emotion.index();
        match code {
            KeyCode::Up | KeyCode::Down => {
                let next = if code == KeyCode::Up {
                    index.saturating_sub(1)
                } else {
                    (index + 1).min(Emotion::ALL.len() - 1)
                };
                if next == index {
                    return Vec::new();
                }
                self.selected_emotion = Emotion::ALL[next];
                self.monthly = None;
                vec![Command::LoadMonthly {
                    emotion: self.selected_emotion,
                    year: self.stats_year,
                }]
            }
            KeyCode::Char('[') | KeyCode::Char(']') => {
                self.stats_year += if code == KeyCode::Char('[') { -1 } else { 1 };
                self.ratio = None;
                self.dominant = None;
                self.monthly = None;
                self.category_commands()
            }
            _ => Vec::new(),
        }
    }

    fn people_tab_key(&mut self, code: KeyCode) -> Vec<Command> {
        match code {
            KeyCode::Up => self.people_selected = self.people_selected.saturating_sub(1),
            KeyCode::Down => self.people_selected = step(self.people_selected, self.people.len()),
            KeyCode::Enter => {
                if let Some(person) = self.people.get(self.people_selected) {
                    let name = person.person_name.clone();
                    self.person_diaries = None;
                    self.screen = Screen::PersonDiaries;
                    return vec![Command::LoadPersonDiaries(name)];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn place_tab_key(&mut self, code: KeyCode) -> Vec<Command> {
        let count = self.place_groups().len();
        match code {
            KeyCode::Up => self.place_selected = self.place_selected.saturating_sub(1),
            KeyCode::Down => self.place_selected = step(self.place_selected, count),
            KeyCode::Char('r') => return vec![self.load_diaries()],
            _ => {}
        }
        Vec::new()
    }

    fn person_diaries_key(&mut self, code: KeyCode) -> Vec<Command> {
        let count = self.person_diaries.as_ref().map_or(0, |p| p.diaries.len());
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Esc => self.screen = Screen::Insights,
            KeyCode::Up => self.person_selected = self.person_selected.saturating_sub(1),
            KeyCode::Down => self.person_selected = step(self.person_selected, count),
            KeyCode::Enter => {
                let id = self
                    .person_diaries
                    .as_ref()
                    .and_then(|p| p.diaries.get(self.person_selected))
                    .map(|d| d.id.clone());
                if let Some(id) = id {
                    return self.open_entry(id);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn write_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return self.submit();
        }

        if let Some(cursor) = self.write.picker {
            match key.code {
                KeyCode::Up => self.write.picker = Some(cursor.saturating_sub(1)),
                KeyCode::Down => self.write.picker = Some((cursor + 1).min(Emotion::ALL.len())),
                KeyCode::Enter => {
                    self.write.choose(cursor);
                }
                KeyCode::Esc => self.write.picker = None,
                _ => {}
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Tab => self.write.focus = self.write.focus.next(),
            KeyCode::BackTab => self.write.focus = self.write.focus.previous(),
            code => match self.write.focus {
                WriteFocus::Photos => match code {
                    KeyCode::Char(c) => self.write.path_input.push(c),
                    KeyCode::Backspace => {
                        if self.write.path_input.pop().is_none() {
                            self.write.image_paths.pop();
                        }
                    }
                    KeyCode::Enter => self.write.commit_path(),
                    _ => {}
                },
                WriteFocus::Emotions => match code {
                    KeyCode::Left => self.write.slot = self.write.slot.saturating_sub(1),
                    KeyCode::Right => self.write.slot = (self.write.slot + 1).min(EMOTION_SLOTS - 1),
                    KeyCode::Enter => self.write.open_picker(),
                    KeyCode::Backspace | KeyCode::Delete => self.write.slots[self.write.slot] = None,
                    _ => {}
                },
                WriteFocus::Caption => match code {
                    KeyCode::Char(c) => self.write.caption.push(c),
                    KeyCode::Backspace => {
                        self.write.caption.pop();
                    }
                    KeyCode::Enter => self.write.caption.push('\n'),
                    _ => {}
                },
            },
        }
        Vec::new()
    }

    fn submit(&mut self) -> Vec<Command> {
        if self.write.submitting {
            return Vec::new();
        }
        self.write.commit_path();
        let submission = self.write.submission();
        if let Err(e) = validate_selection(submission.image_paths.len(), &submission.emotions) {
            self.alert = Some(format!("Cannot save yet: {e}"));
            return Vec::new();
        }
        self.write.submitting = true;
        vec![Command::Submit(submission)]
    }
}

fn step(current: usize, len: usize) -> usize {
    if current + 1 < len {
        current + 1
    } else {
        current
    }
}

fn clamp(current: usize, len: usize) -> usize {
    current.min(len.saturating_sub(1))
}
