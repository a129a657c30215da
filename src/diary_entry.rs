use crate::emotion::Emotion;
use crate::error::ValidationError;
use crate::image_upload::ImageUpload;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    #[serde(rename = "인물")]
    Person,
    #[serde(rename = "장소")]
    Place,
    #[serde(rename = "지역")]
    Location,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TagKind,
    pub tag_name: String,
}

/// A diary entry as the server returns it. Entries are created server-side
/// and never modified by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    pub date: String,
    pub images: Vec<ImageInfo>,
    pub emotions: Vec<Emotion>,
    pub text: Option<String>,
    pub tags: Vec<Tag>,
    pub created_at: String,
}

impl DiaryEntry {
    /// Calendar day of the entry. The server may send either a bare date or a
    /// full timestamp.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.image_url.as_str())
    }

    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|i| i.image_url.as_str())
    }

    fn tag_names(&self, kind: TagKind) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(move |t| t.kind == kind)
            .map(|t| t.tag_name.as_str())
    }

    pub fn people(&self) -> Vec<&str> {
        self.tag_names(TagKind::Person).collect()
    }

    pub fn place(&self) -> Option<&str> {
        self.tag_names(TagKind::Place).next()
    }

    pub fn location(&self) -> Option<&str> {
        self.tag_names(TagKind::Location).next()
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.text
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&query))
            || self
                .tags
                .iter()
                .any(|t| t.tag_name.to_lowercase().contains(&query))
            || self
                .emotions
                .iter()
                .any(|e| e.label() == query || e.english() == query)
    }
}

/// A diary draft about to be submitted.
#[derive(Debug, Clone)]
pub struct NewDiaryEntry {
    pub date: NaiveDate,
    pub images: Vec<ImageUpload>,
    pub emotions: Vec<Emotion>,
    pub text: String,
}

impl NewDiaryEntry {
    pub fn new(
        date: NaiveDate,
        images: Vec<ImageUpload>,
        emotions: Vec<Emotion>,
        text: impl Into<String>,
    ) -> Self {
        NewDiaryEntry {
            date,
            images,
            emotions,
            text: text.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_selection(self.images.len(), &self.emotions)
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Checks a draft's shape before any image is read or request is built.
pub fn validate_selection(image_count: usize, emotions: &[Emotion]) -> Result<(), ValidationError> {
    if image_count == 0 {
        return Err(ValidationError::NoImages);
    }
    if emotions.is_empty() {
        return Err(ValidationError::NoEmotions);
    }
    for (i, emotion) in emotions.iter().enumerate() {
        if emotions[..i].contains(emotion) {
            return Err(ValidationError::DuplicateEmotion(*emotion));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ENTRY_JSON: &str = r#"{
        "id": "3f1c2a9e-6d1b-4c55-9a57-0b8f7c4e2d10",
        "date": "2024-05-03T00:00:00",
        "images": [
            {"image_url": "https://cdn.example/a.jpg"},
            {"image_url": "https://cdn.example/b.jpg"}
        ],
        "emotions": ["기쁨", "열망"],
        "text": "Picnic by the river",
        "tags": [
            {"id": "t1", "type": "인물", "tag_name": "친구"},
            {"id": "t2", "type": "장소", "tag_name": "카페"},
            {"id": "t3", "type": "지역", "tag_name": "서울"}
        ],
        "created_at": "2024-05-03T12:30:00"
    }"#;

    pub(crate) fn sample_entry() -> DiaryEntry {
        serde_json::from_str(ENTRY_JSON).unwrap()
    }

    #[test]
    fn decodes_server_entry() {
        let entry = sample_entry();
        assert_eq!(entry.images.len(), 2);
        assert_eq!(entry.emotions, vec![Emotion::Joy, Emotion::Longing]);
        assert_eq!(entry.day(), NaiveDate::from_ymd_opt(2024, 5, 3));
        assert_eq!(entry.thumbnail_url(), Some("https://cdn.example/a.jpg"));
        assert_eq!(entry.people(), vec!["친구"]);
        assert_eq!(entry.place(), Some("카페"));
        assert_eq!(entry.location(), Some("서울"));
    }

    #[test]
    fn null_text_is_allowed() {
        let json = ENTRY_JSON.replace("\"Picnic by the river\"", "null");
        let entry: DiaryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry.text, None);
    }

    #[test]
    fn missing_images_field_is_an_error() {
        let mut value: serde_json::Value = serde_json::from_str(ENTRY_JSON).unwrap();
        value.as_object_mut().unwrap().remove("images");
        assert!(serde_json::from_value::<DiaryEntry>(value).is_err());
    }

    #[test]
    fn unknown_tag_type_is_kept_as_other() {
        let json = ENTRY_JSON.replace("\"지역\"", "\"날씨\"");
        let entry: DiaryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry.tags[2].kind, TagKind::Other);
        assert_eq!(entry.location(), None);
    }

    #[test]
    fn search_matches_text_tags_and_emotions() {
        let entry = sample_entry();
        assert!(entry.matches("picnic"));
        assert!(entry.matches("카페"));
        assert!(entry.matches("joy"));
        assert!(!entry.matches("mountain"));
    }

    #[test]
    fn selection_needs_images_and_distinct_emotions() {
        assert_eq!(
            validate_selection(0, &[Emotion::Joy]),
            Err(ValidationError::NoImages)
        );
        assert_eq!(validate_selection(2, &[]), Err(ValidationError::NoEmotions));
        assert_eq!(
            validate_selection(1, &[Emotion::Joy, Emotion::Trust, Emotion::Joy]),
            Err(ValidationError::DuplicateEmotion(Emotion::Joy))
        );
        assert_eq!(validate_selection(1, &[Emotion::Rage, Emotion::Trust]), Ok(()));
    }

    #[test]
    fn draft_date_is_formatted_as_iso_day() {
        let draft = NewDiaryEntry::new(
            NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
            Vec::new(),
            vec![Emotion::Joy],
            "",
        );
        assert_eq!(draft.date_string(), "2024-02-09");
        assert_eq!(draft.validate(), Err(ValidationError::NoImages));
    }
}
