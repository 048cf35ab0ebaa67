use std::fmt;

/// Facial expression assigned by the mouth-geometry heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    Happy,
    Sad,
    Surprised,
    Neutral,
}

impl EmotionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "Happy",
            EmotionLabel::Sad => "Sad",
            EmotionLabel::Surprised => "Surprised",
            EmotionLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label reported by the emotion pipeline, including degraded outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionVerdict {
    Emotion(EmotionLabel),
    LoadFailed,
    ProcessingFailed,
}

impl EmotionVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionVerdict::Emotion(label) => label.as_str(),
            EmotionVerdict::LoadFailed => "Error loading image",
            EmotionVerdict::ProcessingFailed => "Processing error",
        }
    }
}

impl fmt::Display for EmotionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
