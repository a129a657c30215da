use crate::diary_entry::DiaryEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonGroup {
    pub person_name: String,
    pub thumbnail_url: String,
    pub diary_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PersonGroups {
    pub people: Vec<PersonGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDiary {
    pub id: String,
    pub date: String,
    pub thumbnail_url: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDiaries {
    pub person_name: String,
    pub diaries: Vec<PersonDiary>,
}

/// One line of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryActivity {
    pub id: String,
    pub date: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecentActivity {
    pub recent_activity: Vec<DiaryActivity>,
}

/// Entries sharing a place (or, failing that, a location) tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceGroup {
    pub place_name: String,
    pub thumbnail_url: Option<String>,
    pub diary_count: u32,
}

/// Groups entries by place, most populated first. The thumbnail is the first
/// image of the most recent entry in the group.
pub fn group_by_place(entries: &[DiaryEntry]) -> Vec<PlaceGroup> {
    let mut groups: Vec<(PlaceGroup, String)> = Vec::new();

    for entry in entries {
        let Some(name) = entry.place().or_else(|| entry.location()) else {
            continue;
        };
        match groups.iter_mut().find(|(g, _)| g.place_name == name) {
            Some((group, newest)) => {
                group.diary_count += 1;
                if entry.date > *newest {
                    *newest = entry.date.clone();
                    group.thumbnail_url = entry.thumbnail_url().map(str::to_string);
                }
            }
            None => groups.push((
                PlaceGroup {
                    place_name: name.to_string(),
                    thumbnail_url: entry.thumbnail_url().map(str::to_string),
                    diary_count: 1,
                },
                entry.date.clone(),
            )),
        }
    }

    let mut groups: Vec<PlaceGroup> = groups.into_iter().map(|(g, _)| g).collect();
    groups.sort_by(|a, b| {
        b.diary_count
            .cmp(&a.diary_count)
            .then_with(|| a.place_name.cmp(&b.place_name))
    });
    groups
}
