use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use validator::{Validate, ValidationError};

use super::pagination::PageQuery;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialType {
    LessonPlan,
    Exercise,
    Presentation,
    Video,
    Document,
    Worksheet,
    Quiz,
    Project,
    Game,
    Other,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonPlan => "LESSON_PLAN",
            Self::Exercise => "EXERCISE",
            Self::Presentation => "PRESENTATION",
            Self::Video => "VIDEO",
            Self::Document => "DOCUMENT",
            Self::Worksheet => "WORKSHEET",
            Self::Quiz => "QUIZ",
            Self::Project => "PROJECT",
            Self::Game => "GAME",
            Self::Other => "OTHER",
        }
    }

    /// Display label shown to teachers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LessonPlan => "Plano de Aula",
            Self::Exercise => "Exercício",
            Self::Presentation => "Apresentação",
            Self::Video => "Vídeo",
            Self::Document => "Documento",
            Self::Worksheet => "Folha de Atividades",
            Self::Quiz => "Quiz/Questionário",
            Self::Project => "Projeto",
            Self::Game => "Jogo Educativo",
            Self::Other => "Outros",
        }
    }
}

impl std::str::FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LESSON_PLAN" => Ok(Self::LessonPlan),
            "EXERCISE" => Ok(Self::Exercise),
            "PRESENTATION" => Ok(Self::Presentation),
            "VIDEO" => Ok(Self::Video),
            "DOCUMENT" => Ok(Self::Document),
            "WORKSHEET" => Ok(Self::Worksheet),
            "QUIZ" => Ok(Self::Quiz),
            "PROJECT" => Ok(Self::Project),
            "GAME" => Ok(Self::Game),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Invalid material type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Fácil",
            Self::Medium => "Médio",
            Self::Hard => "Difícil",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EASY" => Ok(Self::Easy),
            "MEDIUM" => Ok(Self::Medium),
            "HARD" => Ok(Self::Hard),
            _ => Err(format!("Invalid difficulty: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialAuthor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    pub description: String,
    pub discipline: String,
    pub grade: String,
    pub material_type: MaterialType,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub avg_rating: f64,
    #[serde(default)]
    pub total_ratings: i64,
    #[serde(default)]
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub author: MaterialAuthor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortBy {
    CreatedAt,
    Title,
    AvgRating,
    DownloadCount,
    TotalRatings,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Title => "title",
            Self::AvgRating => "avgRating",
            Self::DownloadCount => "downloadCount",
            Self::TotalRatings => "totalRatings",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Search filters; every set field is ANDed by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFilters {
    pub discipline: Option<String>,
    pub grade: Option<String>,
    pub material_type: Option<MaterialType>,
    pub difficulty: Option<Difficulty>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

impl MaterialFilters {
    /// Query-string pairs in a fixed order. The same list feeds both
    /// the request and the cache key, so one canonical form covers both.
    pub fn to_query_pairs(&self, page: &PageQuery) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), page.page.to_string()),
            ("limit".to_string(), page.limit.to_string()),
        ];
        if let Some(discipline) = &self.discipline {
            if !discipline.is_empty() {
                pairs.push(("discipline".to_string(), discipline.clone()));
            }
        }
        if let Some(grade) = &self.grade {
            if !grade.is_empty() {
                pairs.push(("grade".to_string(), grade.clone()));
            }
        }
        if let Some(material_type) = self.material_type {
            pairs.push(("materialType".to_string(), material_type.as_str().to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty".to_string(), difficulty.as_str().to_string()));
        }
        if let Some(min_rating) = self.min_rating {
            pairs.push(("minRating".to_string(), min_rating.to_string()));
        }
        if let Some(search) = &self.search {
            if !search.trim().is_empty() {
                pairs.push(("search".to_string(), search.trim().to_string()));
            }
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder".to_string(), sort_order.as_str().to_string()));
        }
        pairs
    }

    pub fn cache_token(&self, page: &PageQuery) -> String {
        self.to_query_pairs(page)
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Partial metadata edit; only set fields travel on the wire.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_title")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_description")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Disciplina é obrigatória"))]
    pub discipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Série é obrigatória"))]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<MaterialType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_topic: Option<String>,
}

// Title and description limits are user-visible text, so they count
// graphemes, not bytes.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let length = title.graphemes(true).count();
    if !(3..=100).contains(&length) {
        let mut error = ValidationError::new("title_length");
        error.message = Some("Título deve ter entre 3 e 100 caracteres".into());
        return Err(error);
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let length = description.graphemes(true).count();
    if !(10..=1000).contains(&length) {
        let mut error = ValidationError::new("description_length");
        error.message = Some("Descrição deve ter entre 10 e 1000 caracteres".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    #[test]
    fn wire_names_are_screaming_snake_case() {
        let encoded = serde_json::to_string(&MaterialType::LessonPlan).unwrap();
        assert_eq!(encoded, r#""LESSON_PLAN""#);
        let decoded: Difficulty = serde_json::from_str(r#""MEDIUM""#).unwrap();
        assert_eq!(decoded, Difficulty::Medium);
    }

    #[test]
    fn query_pairs_skip_unset_and_blank_filters() {
        let filters = MaterialFilters {
            discipline: Some("Matemática".to_string()),
            search: Some("   ".to_string()),
            sort_by: Some(SortBy::AvgRating),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let page = PageQuery::new(2, 12);

        let pairs = filters.to_query_pairs(&page);
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "12".to_string()),
                ("discipline".to_string(), "Matemática".to_string()),
                ("sortBy".to_string(), "avgRating".to_string()),
                ("sortOrder".to_string(), "desc".to_string()),
            ]
        );
    }

    #[test]
    fn cache_token_is_stable_for_equal_filters() {
        let filters = MaterialFilters {
            grade: Some("7º Ano".to_string()),
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        let page = PageQuery::new(1, 12);

        assert_eq!(filters.cache_token(&page), filters.clone().cache_token(&page));
        assert_eq!(
            filters.cache_token(&page),
            "page=1&limit=12&grade=7º Ano&difficulty=HARD"
        );
    }

    #[test]
    fn title_length_counts_graphemes() {
        // 3 graphemes, more than 3 bytes
        assert_ok!(validate_title("çãé"));
        assert_err!(validate_title("ab"));
        assert_err!(validate_title(&"x".repeat(101)));
    }

    #[test]
    fn partial_update_validates_only_present_fields() {
        let payload = UpdateMaterialPayload {
            title: Some("Frações no cotidiano".to_string()),
            ..Default::default()
        };
        assert_ok!(payload.validate());

        let bad = UpdateMaterialPayload {
            description: Some("curta".to_string()),
            ..Default::default()
        };
        assert_err!(bad.validate());
    }
}
