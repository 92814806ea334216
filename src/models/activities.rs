use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generation contract spoken by this crate. Earlier backend revisions
/// answered with a flat activity set; version 2 is the extended shape
/// (staged lesson plan plus the activity set). Replies carrying any
/// other version are rejected outright instead of sniffing fields.
pub const GENERATION_SCHEMA_VERSION: u16 = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub schema_version: u16,
    pub request_id: Uuid,
}

impl GenerationRequest {
    pub fn new() -> Self {
        Self {
            schema_version: GENERATION_SCHEMA_VERSION,
            request_id: Uuid::new_v4(),
        }
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedActivities {
    pub summary: String,
    pub objectives: Vec<String>,
    pub exercises: Vec<String>,
    #[serde(default)]
    pub multiple_choice: Vec<MultipleChoiceQuestion>,
    #[serde(default)]
    pub essay_questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanStage {
    pub name: String,
    pub duration_minutes: i32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub title: String,
    pub total_duration_minutes: i32,
    pub stages: Vec<LessonPlanStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub content_length: i64,
    pub extracted_from_file: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRef {
    pub id: String,
    pub title: String,
    pub discipline: String,
    pub grade: String,
}

/// One full generation result. Ephemeral: it lives as long as the view
/// that requested it and is replaced, never merged, on re-generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub schema_version: u16,
    pub material: MaterialRef,
    pub lesson_plan: LessonPlan,
    pub activities: GeneratedActivities,
    pub metadata: GenerationMetadata,
}
