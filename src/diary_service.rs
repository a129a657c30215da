//! Client for the MindLog REST backend.
//!
//! Every operation reads the bearer token first and fails with
//! [`ServiceError::AuthenticationRequired`] before any I/O when none is
//! available, then issues exactly one request. There are no retries.

use crate::archive::{DiaryActivity, PersonDiaries, PersonGroup, PersonGroups, RecentActivity};
use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::diary_entry::{DiaryEntry, NewDiaryEntry};
use crate::emotion::Emotion;
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::image_upload::{ImageUpload, JPEG_MIME};
use crate::multipart::MultipartBody;
use crate::stats::{DominantEmotion, EmotionRatio, MonthlyEmotionCount};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Diary creation uploads several photos and gets a longer budget.
pub const CREATE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Created,
    Success,
}

impl Expect {
    fn accepts(self, response: &HttpResponse) -> bool {
        match self {
            Expect::Created => response.status == 201,
            Expect::Success => response.is_success(),
        }
    }
}

#[derive(Clone)]
pub struct DiaryService {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
}

impl DiaryService {
    pub fn new(
        base_url: Url,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        DiaryService {
            base_url,
            transport,
            credentials,
        }
    }

    pub fn from_config(
        config: &Config,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ServiceResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(
            config.base_url.clone(),
            Arc::new(transport),
            credentials,
        ))
    }

    /// `POST /diary/` as multipart form data. Only `201 Created` is accepted.
    pub async fn create_diary(&self, draft: &NewDiaryEntry) -> ServiceResult<DiaryEntry> {
        let token = self.token()?;
        draft.validate()?;

        let url = self.endpoint(&["diary", ""], &[])?;
        let body = diary_form(draft, MultipartBody::new());
        let mut request = self.authorized(Method::POST, url, &token)?;
        request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&body.content_type())?,
        );
        let bytes = body.finish();
        debug!(
            images = draft.images.len(),
            emotions = draft.emotions.len(),
            photo_bytes = draft.images.iter().map(ImageUpload::len).sum::<usize>(),
            size = bytes.len(),
            "encoded diary form"
        );
        request.body = Some(bytes);
        request.timeout = Some(CREATE_TIMEOUT);

        let entry: DiaryEntry = self.execute(request, Expect::Created).await?;
        info!(id = %entry.id, "diary created");
        Ok(entry)
    }

    /// `GET /diary/`, newest first as ordered by the server.
    pub async fn get_diaries(&self) -> ServiceResult<Vec<DiaryEntry>> {
        self.get_diaries_by_date(None, None).await
    }

    /// `GET /diary/` filtered by year and/or month; absent filters are omitted
    /// from the query string.
    pub async fn get_diaries_by_date(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> ServiceResult<Vec<DiaryEntry>> {
        let token = self.token()?;
        if let Some(m) = month.filter(|m| !(1..=12).contains(m)) {
            return Err(ValidationError::InvalidMonth(m).into());
        }
        let url = self.endpoint(&["diary", ""], &date_query(year, month))?;
        let entries: Vec<DiaryEntry> = self.get(url, &token).await?;
        debug!(count = entries.len(), "diaries loaded");
        Ok(entries)
    }

    /// `GET /diary/{id}`
    pub async fn get_diary(&self, id: &str) -> ServiceResult<DiaryEntry> {
        let token = self.token()?;
        let url = self.endpoint(&["diary", id], &[])?;
        self.get(url, &token).await
    }

    /// `GET /feeling?year=`
    pub async fn get_feeling_ratio(&self, year: i32) -> ServiceResult<EmotionRatio> {
        let token = self.token()?;
        let url = self.endpoint(&["feeling"], &[("year", year.to_string())])?;
        self.get(url, &token).await
    }

    /// `GET /archive/feeling?year=`
    pub async fn get_dominant_emotion(&self, year: i32) -> ServiceResult<DominantEmotion> {
        let token = self.token()?;
        let url = self.endpoint(&["archive", "feeling"], &[("year", year.to_string())])?;
        self.get(url, &token).await
    }

    /// `GET /feeling/{emotion}?year=`
    pub async fn get_monthly_emotion_count(
        &self,
        emotion: Emotion,
        year: i32,
    ) -> ServiceResult<MonthlyEmotionCount> {
        let token = self.token()?;
        let url = self.endpoint(
            &["feeling", emotion.label()],
            &[("year", year.to_string())],
        )?;
        self.get(url, &token).await
    }

    /// `GET /diary/grouped-by-person`
    pub async fn get_grouped_by_person(&self) -> ServiceResult<Vec<PersonGroup>> {
        let token = self.token()?;
        let url = self.endpoint(&["diary", "grouped-by-person"], &[])?;
        let groups: PersonGroups = self.get(url, &token).await?;
        debug!(people = groups.people.len(), "companion groups loaded");
        Ok(groups.people)
    }

    /// `GET /diary/recent-activity`
    pub async fn get_recent_activities(&self) -> ServiceResult<Vec<DiaryActivity>> {
        let token = self.token()?;
        let url = self.endpoint(&["diary", "recent-activity"], &[])?;
        let feed: RecentActivity = self.get(url, &token).await?;
        Ok(feed.recent_activity)
    }

    /// `GET /diary/by-person/{name}`; the name is percent-encoded as one path
    /// segment.
    pub async fn get_diaries_by_person(&self, name: &str) -> ServiceResult<PersonDiaries> {
        let token = self.token()?;
        let url = self.endpoint(&["diary", "by-person", name], &[])?;
        self.get(url, &token).await
    }

    fn token(&self) -> ServiceResult<String> {
        self.credentials.bearer_token().ok_or_else(|| {
            warn!("no bearer token available");
            ServiceError::AuthenticationRequired
        })
    }

    /// Appends path segments (each percent-encoded) and query pairs to the
    /// base URL. An empty trailing segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url, token: &str) -> ServiceResult<HttpRequest> {
        let mut request = HttpRequest::new(method, url);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))?;
        bearer.set_sensitive(true);
        request.headers.insert(AUTHORIZATION, bearer);
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(request)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, token: &str) -> ServiceResult<T> {
        let request = self.authorized(Method::GET, url, token)?;
        self.execute(request, Expect::Success).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        expect: Expect,
    ) -> ServiceResult<T> {
        let method = request.method.clone();
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "request failed");
            e
        })?;
        debug!(status = response.status, size = response.body.len(), "response received");

        if !expect.accepts(&response) {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            warn!(%method, %url, status = response.status, %body, "unexpected response status");
            return Err(ServiceError::ServerResponse {
                status: response.status,
                body,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(%method, %url, error = %e, "response did not match expected shape");
            ServiceError::Decoding(e)
        })
    }
}

fn date_query(year: Option<i32>, month: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(year) = year {
        query.push(("year", year.to_string()));
    }
    if let Some(month) = month {
        query.push(("month", month.to_string()));
    }
    query
}

/// Field order: date, one `emotions` field per label, text, then one JPEG
/// file part per image.
fn diary_form(draft: &NewDiaryEntry, mut body: MultipartBody) -> MultipartBody {
    body.text("date", &draft.date_string());
    for emotion in &draft.emotions {
        body.text("emotions", emotion.label());
    }
    body.text("text", &draft.text);
    for (index, image) in draft.images.iter().enumerate() {
        body.file(
            "images",
            &format!("image{index}.jpg"),
            JPEG_MIME,
            image.bytes(),
        );
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticToken;
    use crate::diary_entry::tests::ENTRY_JSON;
    use crate::image_upload::tests::sample_upload;
    use crate::transport::fake::{unreachable, FakeTransport};
    use chrono::NaiveDate;

    struct NoToken;

    impl CredentialProvider for NoToken {
        fn bearer_token(&self) -> Option<String> {
            None
        }
    }

    fn service(transport: &Arc<FakeTransport>) -> DiaryService {
        DiaryService::new(
            Url::parse("http://diary.test:8000").unwrap(),
            transport.clone(),
            Arc::new(StaticToken::new("secret-token")),
        )
    }

    fn draft(images: usize, emotions: Vec<Emotion>) -> NewDiaryEntry {
        NewDiaryEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            (0..images).map(|_| sample_upload()).collect(),
            emotions,
            "Picnic by the river",
        )
    }

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_bytes())
            .count()
    }

    #[tokio::test]
    async fn every_operation_requires_a_token_before_io() {
        let transport = Arc::new(FakeTransport::new());
        let service = DiaryService::new(
            Url::parse("http://diary.test").unwrap(),
            transport.clone(),
            Arc::new(NoToken),
        );

        let results = vec![
            service
                .create_diary(&draft(1, vec![Emotion::Joy]))
                .await
                .map(|_| ()),
            service.get_diaries().await.map(|_| ()),
            service.get_diaries_by_date(Some(2024), Some(5)).await.map(|_| ()),
            service.get_diary("abc").await.map(|_| ()),
            service.get_feeling_ratio(2024).await.map(|_| ()),
            service.get_dominant_emotion(2024).await.map(|_| ()),
            service
                .get_monthly_emotion_count(Emotion::Joy, 2024)
                .await
                .map(|_| ()),
            service.get_grouped_by_person().await.map(|_| ()),
            service.get_recent_activities().await.map(|_| ()),
            service.get_diaries_by_person("민지").await.map(|_| ()),
        ];

        assert_eq!(results.len(), 10);
        for result in results {
            assert!(matches!(result, Err(ServiceError::AuthenticationRequired)));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn create_diary_decodes_created_entry() {
        let transport = Arc::new(FakeTransport::new().respond(201, ENTRY_JSON));
        let service = service(&transport);

        let entry = service
            .create_diary(&draft(2, vec![Emotion::Joy, Emotion::Longing]))
            .await
            .unwrap();

        assert_eq!(entry.id, "3f1c2a9e-6d1b-4c55-9a57-0b8f7c4e2d10");
        assert_eq!(entry.emotions, vec![Emotion::Joy, Emotion::Longing]);
        assert_eq!(entry.images.len(), 2);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "http://diary.test:8000/diary/");
        assert_eq!(request.timeout, Some(CREATE_TIMEOUT));
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "Bearer secret-token"
        );
        let content_type = request.headers.get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test]
    async fn create_diary_requires_exactly_201() {
        let transport = Arc::new(FakeTransport::new().respond(200, ENTRY_JSON));
        let err = service(&transport)
            .create_diary(&draft(1, vec![Emotion::Trust]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ServerResponse { status: 200, .. }));
    }

    #[tokio::test]
    async fn invalid_draft_sends_nothing() {
        let transport = Arc::new(FakeTransport::new());
        let service = service(&transport);

        let no_images = service.create_diary(&draft(0, vec![Emotion::Joy])).await;
        assert!(matches!(
            no_images,
            Err(ServiceError::Validation(ValidationError::NoImages))
        ));
        let no_emotions = service.create_diary(&draft(1, vec![])).await;
        assert!(matches!(
            no_emotions,
            Err(ServiceError::Validation(ValidationError::NoEmotions))
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn multipart_body_has_one_part_per_image_and_emotion() {
        let transport = Arc::new(FakeTransport::new().respond(201, ENTRY_JSON));
        let service = service(&transport);
        let emotions = vec![Emotion::Joy, Emotion::Sadness, Emotion::Rage];
        service.create_diary(&draft(3, emotions)).await.unwrap();

        let request = &transport.requests()[0];
        let content_type = request.headers.get(CONTENT_TYPE).unwrap().to_str().unwrap();
        let boundary = content_type.split("boundary=").nth(1).unwrap();
        let body = request.body.as_ref().unwrap();

        assert_eq!(count(body, "filename=\"image"), 3);
        assert_eq!(count(body, "Content-Type: image/jpeg"), 3);
        assert_eq!(count(body, "name=\"emotions\"\r\n"), 3);
        assert_eq!(count(body, "name=\"date\"\r\n\r\n2024-05-03\r\n"), 1);
        assert_eq!(count(body, "name=\"text\"\r\n\r\nPicnic by the river\r\n"), 1);
        assert_eq!(count(body, &format!("--{boundary}\r\n")), 3 + 3 + 2);
        assert!(body.ends_with(format!("--{boundary}--\r\n").as_bytes()));
        assert_eq!(count(body, "\r\n\r\n격노\r\n"), 1);
    }

    #[test]
    fn form_field_order_is_date_emotions_text_images() {
        let draft = draft(1, vec![Emotion::Trust]);
        let bytes = diary_form(&draft, MultipartBody::with_boundary("B")).finish();
        let text = String::from_utf8_lossy(&bytes);
        let date = text.find("name=\"date\"").unwrap();
        let emotion = text.find("name=\"emotions\"").unwrap();
        let caption = text.find("name=\"text\"").unwrap();
        let image = text.find("name=\"images\"").unwrap();
        assert!(date < emotion && emotion < caption && caption < image);
        assert!(text.contains("filename=\"image0.jpg\""));
    }

    #[tokio::test]
    async fn server_error_is_reported_whatever_the_body() {
        for body in [&b"{}"[..], ENTRY_JSON.as_bytes(), b"<html>oops</html>"] {
            let transport = Arc::new(FakeTransport::new().respond(500, body.to_vec()));
            let err = service(&transport).get_diary("x").await.unwrap_err();
            match err {
                ServiceError::ServerResponse { status, .. } => assert_eq!(status, 500),
                other => panic!("expected server response error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let transport = Arc::new(FakeTransport::new().fail(unreachable()));
        let err = service(&transport).get_diary("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
        assert!(!err.is_server_side());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn missing_field_is_a_decoding_error() {
        let mut value: serde_json::Value = serde_json::from_str(ENTRY_JSON).unwrap();
        value.as_object_mut().unwrap().remove("created_at");
        let transport = Arc::new(FakeTransport::new().respond(200, value.to_string()));
        let err = service(&transport).get_diary("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Decoding(_)));
        assert!(err.is_server_side());
    }

    #[tokio::test]
    async fn date_filter_omits_absent_month() {
        let transport = Arc::new(FakeTransport::new().respond(200, "[]"));
        let entries = service(&transport)
            .get_diaries_by_date(Some(2024), None)
            .await
            .unwrap();
        assert!(entries.is_empty());

        let url = &transport.requests()[0].url;
        assert_eq!(url.path(), "/diary/");
        assert_eq!(url.query(), Some("year=2024"));
    }

    #[tokio::test]
    async fn date_filters_and_plain_list() {
        let transport = Arc::new(FakeTransport::new().respond(200, "[]").respond(200, "[]"));
        let service = service(&transport);
        service.get_diaries_by_date(Some(2023), Some(11)).await.unwrap();
        service.get_diaries().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url.query(), Some("year=2023&month=11"));
        assert_eq!(requests[1].url.as_str(), "http://diary.test:8000/diary/");
    }

    #[tokio::test]
    async fn out_of_range_month_is_rejected_locally() {
        let transport = Arc::new(FakeTransport::new());
        let err = service(&transport)
            .get_diaries_by_date(Some(2024), Some(13))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidMonth(13))
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn statistics_endpoints() {
        let ratio = r#"{"기쁨":50.0,"신뢰":0.0,"긴장":0.0,"놀람":0.0,
                        "슬픔":50.0,"혐오":0.0,"격노":0.0,"열망":0.0}"#;
        let monthly = r#"{"JAN":0,"FEB":2,"MAR":0,"APR":0,"MAY":0,"JUN":0,
                          "JUL":0,"AUG":0,"SEP":0,"OCT":0,"NOV":0,"DEC":1}"#;
        let transport = Arc::new(
            FakeTransport::new()
                .respond(200, ratio)
                .respond(200, r#"{"emotion":"기쁨"}"#)
                .respond(200, monthly),
        );
        let service = service(&transport);

        let ratio = service.get_feeling_ratio(2024).await.unwrap();
        assert_eq!(ratio.sadness, 50.0);
        let dominant = service.get_dominant_emotion(2024).await.unwrap();
        assert_eq!(dominant.emotion, Emotion::Joy);
        let monthly = service
            .get_monthly_emotion_count(Emotion::Joy, 2024)
            .await
            .unwrap();
        assert_eq!(monthly.total(), 3);

        let urls: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| r.url.to_string())
            .collect();
        assert_eq!(urls[0], "http://diary.test:8000/feeling?year=2024");
        assert_eq!(urls[1], "http://diary.test:8000/archive/feeling?year=2024");
        assert_eq!(
            urls[2],
            "http://diary.test:8000/feeling/%EA%B8%B0%EC%81%A8?year=2024"
        );
    }

    #[tokio::test]
    async fn companion_and_activity_endpoints() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(
                    200,
                    r#"{"people":[{"person_name":"민지","thumbnail_url":"t.jpg","diary_count":2}]}"#,
                )
                .respond(
                    200,
                    r#"{"recent_activity":[{"id":"1","date":"2024-05-01","thumbnail_url":"a.jpg","text":"hi"}]}"#,
                )
                .respond(
                    200,
                    r#"{"person_name":"Kim Min/ji","diaries":[{"id":"1","date":"2024-05-01","thumbnail_url":"a.jpg","text":"hi"}]}"#,
                ),
        );
        let service = service(&transport);

        let people = service.get_grouped_by_person().await.unwrap();
        assert_eq!(people[0].person_name, "민지");
        let recent = service.get_recent_activities().await.unwrap();
        assert_eq!(recent[0].text.as_deref(), Some("hi"));
        let by_person = service.get_diaries_by_person("Kim Min/ji").await.unwrap();
        assert_eq!(by_person.diaries.len(), 1);

        let requests = transport.requests();
        assert_eq!(requests[0].url.path(), "/diary/grouped-by-person");
        assert_eq!(requests[1].url.path(), "/diary/recent-activity");
        assert_eq!(requests[2].url.path(), "/diary/by-person/Kim%20Min%2Fji");
        for request in &requests {
            assert_eq!(request.method, Method::GET);
            assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");
            assert!(request.timeout.is_none());
        }
    }

    #[tokio::test]
    async fn base_path_prefix_is_kept() {
        let transport = Arc::new(FakeTransport::new().respond(200, "[]"));
        let service = DiaryService::new(
            Url::parse("https://api.example/v1/").unwrap(),
            transport.clone(),
            Arc::new(StaticToken::new("t")),
        );
        service.get_diaries().await.unwrap();
        assert_eq!(
            transport.requests()[0].url.as_str(),
            "https://api.example/v1/diary/"
        );
    }
}
