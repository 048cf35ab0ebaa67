use std::fmt;

/// Label reported by the region pipeline, including degraded outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionVerdict {
    AnomalyDetected,
    NoAnomaly,
    LoadFailed,
    ProcessingFailed,
}

impl RegionVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionVerdict::AnomalyDetected => "Anomaly detected",
            RegionVerdict::NoAnomaly => "No anomaly",
            RegionVerdict::LoadFailed => "Error loading image",
            RegionVerdict::ProcessingFailed => "Processing error",
        }
    }
}

impl fmt::Display for RegionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
