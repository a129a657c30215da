use crate::emotion::Emotion;
use serde::{Deserialize, Serialize};

/// Share of each emotion, in percent, across one year of entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionRatio {
    #[serde(rename = "기쁨")]
    pub joy: f64,
    #[serde(rename = "신뢰")]
    pub trust: f64,
    #[serde(rename = "긴장")]
    pub tension: f64,
    #[serde(rename = "놀람")]
    pub surprise: f64,
    #[serde(rename = "슬픔")]
    pub sadness: f64,
    #[serde(rename = "혐오")]
    pub disgust: f64,
    #[serde(rename = "격노")]
    pub rage: f64,
    #[serde(rename = "열망")]
    pub longing: f64,
}

impl EmotionRatio {
    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Trust => self.trust,
            Emotion::Tension => self.tension,
            Emotion::Surprise => self.surprise,
            Emotion::Sadness => self.sadness,
            Emotion::Disgust => self.disgust,
            Emotion::Rage => self.rage,
            Emotion::Longing => self.longing,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    /// Highest share; ties go to the emotion listed first.
    pub fn strongest(&self) -> Option<Emotion> {
        self.iter()
            .filter(|(_, share)| *share > 0.0)
            .fold(None, |best: Option<(Emotion, f64)>, (e, share)| match best {
                Some((_, top)) if top >= share => best,
                _ => Some((e, share)),
            })
            .map(|(e, _)| e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantEmotion {
    pub emotion: Emotion,
}

pub const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Occurrences of one emotion per calendar month of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct MonthlyEmotionCount {
    pub jan: u32,
    pub feb: u32,
    pub mar: u32,
    pub apr: u32,
    pub may: u32,
    pub jun: u32,
    pub jul: u32,
    pub aug: u32,
    pub sep: u32,
    pub oct: u32,
    pub nov: u32,
    pub dec: u32,
}

impl MonthlyEmotionCount {
    pub fn counts(&self) -> [u32; 12] {
        [
            self.jan, self.feb, self.mar, self.apr, self.may, self.jun, self.jul, self.aug,
            self.sep, self.oct, self.nov, self.dec,
        ]
    }

    /// Count for a 1-based month number.
    pub fn month(&self, month: u32) -> Option<u32> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.counts().get(index).copied()
    }

    pub fn total(&self) -> u32 {
        self.counts().iter().sum()
    }

    /// 1-based month with the most occurrences, earliest on ties.
    pub fn peak_month(&self) -> Option<u32> {
        let counts = self.counts();
        let max = *counts.iter().max()?;
        if max == 0 {
            return None;
        }
        counts
            .iter()
            .position(|c| *c == max)
            .map(|i| i as u32 + 1)
    }
}
