//! Runs [`Command`]s as background tasks and reports back over a channel.
//!
//! Each command becomes one tokio task. Results are only sent, never applied
//! here; the UI loop owns the state and applies them in arrival order.

use crate::app::{AppEvent, Command, Submission};
use crate::credentials::TokenStore;
use crate::diary_entry::{DiaryEntry, NewDiaryEntry};
use crate::diary_service::DiaryService;
use crate::error::{ServiceError, ServiceResult};
use crate::image_upload::ImageUpload;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Clone)]
pub struct TaskContext {
    pub service: DiaryService,
    /// Local storage to clear on logout; absent when the token came from the
    /// environment.
    pub store: Option<Arc<TokenStore>>,
    pub events: UnboundedSender<AppEvent>,
}

impl TaskContext {
    pub fn dispatch_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&self, command: Command) {
        debug!(?command, "dispatching");
        let service = self.service.clone();
        let events = self.events.clone();

        match command {
            Command::LoadRecent => spawn(events, async move {
                AppEvent::RecentLoaded(service.get_recent_activities().await)
            }),
            Command::LoadDiaries { year, month } => spawn(events, async move {
                AppEvent::DiariesLoaded(service.get_diaries_by_date(year, month).await)
            }),
            Command::LoadEntry(id) => spawn(events, async move {
                AppEvent::EntryLoaded(service.get_diary(&id).await)
            }),
            Command::LoadStats { year } => {
                let ratio_service = service.clone();
                spawn(events.clone(), async move {
                    AppEvent::RatioLoaded(ratio_service.get_feeling_ratio(year).await)
                });
                spawn(events, async move {
                    AppEvent::DominantLoaded(service.get_dominant_emotion(year).await)
                });
            }
            Command::LoadMonthly { emotion, year } => spawn(events, async move {
                AppEvent::MonthlyLoaded(
                    emotion,
                    service.get_monthly_emotion_count(emotion, year).await,
                )
            }),
            Command::LoadPeople => spawn(events, async move {
                AppEvent::PeopleLoaded(service.get_grouped_by_person().await)
            }),
            Command::LoadPersonDiaries(name) => spawn(events, async move {
                AppEvent::PersonDiariesLoaded(service.get_diaries_by_person(&name).await)
            }),
            Command::Submit(submission) => spawn(events, async move {
                AppEvent::DiaryCreated(submit(&service, submission).await)
            }),
            Command::Logout => {
                let result = match &self.store {
                    Some(store) => store.clear_token(),
                    None => Err(ServiceError::FixedCredentials),
                };
                let _ = events.send(AppEvent::LoggedOut(result));
            }
        }
    }
}

fn spawn<F>(events: UnboundedSender<AppEvent>, task: F)
where
    F: std::future::Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        // the receiver is gone only when the UI has shut down
        let _ = events.send(task.await);
    });
}

/// Reads and compresses each photo off the async workers, then creates the
/// diary entry.
pub async fn submit(service: &DiaryService, submission: Submission) -> ServiceResult<DiaryEntry> {
    let Submission {
        date,
        image_paths,
        emotions,
        text,
    } = submission;

    let images = tokio::task::spawn_blocking(move || {
        image_paths
            .iter()
            .map(|path| ImageUpload::from_path(path))
            .collect::<ServiceResult<Vec<_>>>()
    })
    .await??;

    let draft = NewDiaryEntry::new(date, images, emotions, text);
    service.create_diary(&draft).await
}
