use crate::models::{
    DecodedPayload, EnrolledStudentsPayload, ReportKind, ReportPayload, SectionPerformancePayload,
    StudentProgressPayload,
};

pub const CORRUPTED_PAYLOAD: &str = "ERROR: payload could not be parsed";

pub fn encode(payload: &ReportPayload) -> Result<String, serde_json::Error> {
    serde_json::to_string(payload)
}

/// Reads never fail on a bad payload: text that does not decode as the shape of its report kind
/// comes back as [`CORRUPTED_PAYLOAD`].
pub fn decode(kind: ReportKind, text: &str) -> DecodedPayload {
    let parsed = match kind {
        ReportKind::EnrolledStudents => {
            serde_json::from_str::<EnrolledStudentsPayload>(text).map(ReportPayload::EnrolledStudents)
        }
        ReportKind::SectionPerformance => serde_json::from_str::<SectionPerformancePayload>(text)
            .map(ReportPayload::SectionPerformance),
        ReportKind::StudentProgress => {
            serde_json::from_str::<StudentProgressPayload>(text).map(ReportPayload::StudentProgress)
        }
    };

    match parsed {
        Ok(payload) => DecodedPayload::Parsed(payload),
        Err(err) => {
            tracing::debug!("stored {} payload did not decode: {}", kind, err);
            DecodedPayload::Corrupted(CORRUPTED_PAYLOAD)
        }
    }
}
