use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of eight emotion labels. Wire names are the Korean labels
/// the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "기쁨")]
    Joy,
    #[serde(rename = "신뢰")]
    Trust,
    #[serde(rename = "긴장")]
    Tension,
    #[serde(rename = "놀람")]
    Surprise,
    #[serde(rename = "슬픔")]
    Sadness,
    #[serde(rename = "혐오")]
    Disgust,
    #[serde(rename = "격노")]
    Rage,
    #[serde(rename = "열망")]
    Longing,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Tension,
        Emotion::Surprise,
        Emotion::Sadness,
        Emotion::Disgust,
        Emotion::Rage,
        Emotion::Longing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Emotion::Joy => "기쁨",
            Emotion::Trust => "신뢰",
            Emotion::Tension => "긴장",
            Emotion::Surprise => "놀람",
            Emotion::Sadness => "슬픔",
            Emotion::Disgust => "혐오",
            Emotion::Rage => "격노",
            Emotion::Longing => "열망",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Trust => "trust",
            Emotion::Tension => "tension",
            Emotion::Surprise => "surprise",
            Emotion::Sadness => "sadness",
            Emotion::Disgust => "disgust",
            Emotion::Rage => "rage",
            Emotion::Longing => "longing",
        }
    }

    /// Accent colour used when the emotion is drawn as a tag or a bar.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Emotion::Joy => (0xFF, 0xD7, 0x00),
            Emotion::Trust => (0x4A, 0x90, 0xE2),
            Emotion::Tension => (0x4A, 0x4A, 0x4A),
            Emotion::Surprise => (0xFF, 0x9F, 0x1C),
            Emotion::Sadness => (0x5C, 0x85, 0xD6),
            Emotion::Disgust => (0x6B, 0x8E, 0x23),
            Emotion::Rage => (0xE6, 0x39, 0x46),
            Emotion::Longing => (0x9B, 0x59, 0xB6),
        }
    }

    pub fn index(self) -> usize {
        Emotion::ALL
            .iter()
            .position(|e| *e == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
