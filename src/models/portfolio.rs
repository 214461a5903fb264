use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `portfolios` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub skills: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub experience: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub education: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body as it arrives, before sanitization. Every field is optional;
/// the sanitizer decides what "missing" means per field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPortfolio {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
}

/// Canonical create shape produced by the sanitizer. `name` and `skills` are
/// always present (possibly empty, so validation owns the missing-field
/// error); optional fields are `None` rather than empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePortfolio {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: String,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
}

impl From<CreatePortfolio> for RawPortfolio {
    fn from(data: CreatePortfolio) -> Self {
        Self {
            name: Some(data.name),
            email: data.email,
            phone: data.phone,
            skills: Some(data.skills),
            description: data.description,
            experience: data.experience,
            education: data.education,
        }
    }
}

/// Partial-update shape: identity plus only the fields the caller supplied.
/// An omitted field means "no change"; a supplied-but-empty `name`/`skills`
/// is still validated and rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePortfolio {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
}

/// Query parameters accepted by the listing endpoint. Sort fields are kept as
/// raw strings and mapped leniently; unknown values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioFilters {
    pub search: Option<String>,
    /// Comma-separated skill terms; a portfolio matches if any term matches.
    pub skills: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Paginated listing payload.
#[derive(Debug, Serialize)]
pub struct PortfolioList {
    pub data: Vec<Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: u64,
}

/// Aggregate statistics over the whole table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total: u64,
    pub with_email: u64,
    pub with_phone: u64,
    pub with_description: u64,
    pub top_skills: Vec<SkillCount>,
    pub created_this_month: u64,
    pub created_this_year: u64,
}
