use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::models::portfolio::{
    self, CreatePortfolio, PortfolioFilters, PortfolioStats, SkillCount, UpdatePortfolio,
};

/// Insert a new portfolio; the store assigns the id and creation timestamp.
pub async fn insert_portfolio(
    db: &DatabaseConnection,
    input: CreatePortfolio,
) -> Result<portfolio::Model, DbErr> {
    let new_portfolio = portfolio::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone),
        skills: Set(input.skills),
        description: Set(input.description),
        experience: Set(input.experience),
        education: Set(input.education),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    };

    new_portfolio.insert(db).await
}

/// Fetch a filtered, sorted page of portfolios plus the total match count.
pub async fn find_portfolios(
    db: &DatabaseConnection,
    filters: &PortfolioFilters,
    page: u64,
    limit: u64,
) -> Result<(Vec<portfolio::Model>, u64), DbErr> {
    let mut select = portfolio::Entity::find();

    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        select = select.filter(
            Condition::any()
                .add(Expr::col(portfolio::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(portfolio::Column::Skills).ilike(pattern)),
        );
    }

    if let Some(skills) = filters.skills.as_deref() {
        let terms: Vec<&str> = skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !terms.is_empty() {
            let mut any = Condition::any();
            for term in terms {
                any = any.add(Expr::col(portfolio::Column::Skills).ilike(format!("%{term}%")));
            }
            select = select.filter(any);
        }
    }

    let total = select.clone().count(db).await?;

    let (column, order) = sort_params(filters);
    let items = select
        .order_by(column, order)
        .offset((page - 1) * limit)
        .limit(limit)
        .all(db)
        .await?;

    Ok((items, total))
}

/// Unknown sort fields fall back to the creation timestamp, descending.
fn sort_params(filters: &PortfolioFilters) -> (portfolio::Column, Order) {
    let column = match filters.sort_by.as_deref() {
        Some("name") => portfolio::Column::Name,
        Some("skills") => portfolio::Column::Skills,
        _ => portfolio::Column::CreatedAt,
    };
    let order = match filters.sort_order.as_deref() {
        Some("asc") => Order::Asc,
        _ => Order::Desc,
    };
    (column, order)
}

/// Fetch a single portfolio by id.
pub async fn find_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<portfolio::Model>, DbErr> {
    portfolio::Entity::find_by_id(id).one(db).await
}

/// Apply the supplied fields of a partial update to an existing row.
/// Supplying an empty string for an optional field clears the column.
pub async fn update_portfolio(
    db: &DatabaseConnection,
    existing: portfolio::Model,
    input: UpdatePortfolio,
) -> Result<portfolio::Model, DbErr> {
    let mut active: portfolio::ActiveModel = existing.into();

    if let Some(name) = input.name {
        active.name = Set(name);
    }
    if let Some(email) = input.email {
        active.email = Set(non_empty(email));
    }
    if let Some(phone) = input.phone {
        active.phone = Set(non_empty(phone));
    }
    if let Some(skills) = input.skills {
        active.skills = Set(skills);
    }
    if let Some(description) = input.description {
        active.description = Set(non_empty(description));
    }
    if let Some(experience) = input.experience {
        active.experience = Set(non_empty(experience));
    }
    if let Some(education) = input.education {
        active.education = Set(non_empty(education));
    }
    active.updated_at = Set(Some(Utc::now()));

    active.update(db).await
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Delete a portfolio by id.
pub async fn delete_portfolio(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    portfolio::Entity::delete_by_id(id).exec(db).await
}

/// Aggregate counts plus the ten most frequent skill tokens.
pub async fn collect_stats(db: &DatabaseConnection) -> Result<PortfolioStats, DbErr> {
    let total = portfolio::Entity::find().count(db).await?;
    let with_email = portfolio::Entity::find()
        .filter(portfolio::Column::Email.is_not_null())
        .count(db)
        .await?;
    let with_phone = portfolio::Entity::find()
        .filter(portfolio::Column::Phone.is_not_null())
        .count(db)
        .await?;
    let with_description = portfolio::Entity::find()
        .filter(portfolio::Column::Description.is_not_null())
        .count(db)
        .await?;

    let today = Utc::now().date_naive();
    let month_start = today
        .with_day(1)
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc();
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc();

    let created_this_month = portfolio::Entity::find()
        .filter(portfolio::Column::CreatedAt.gte(month_start))
        .count(db)
        .await?;
    let created_this_year = portfolio::Entity::find()
        .filter(portfolio::Column::CreatedAt.gte(year_start))
        .count(db)
        .await?;

    // Skills are free-text comma-separated tokens; count them client-side.
    let skill_rows: Vec<String> = portfolio::Entity::find()
        .select_only()
        .column(portfolio::Column::Skills)
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<String, u64> = HashMap::new();
    for row in &skill_rows {
        for skill in row.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            *counts.entry(skill.to_string()).or_insert(0) += 1;
        }
    }

    let mut top_skills: Vec<SkillCount> = counts
        .into_iter()
        .map(|(skill, count)| SkillCount { skill, count })
        .collect();
    top_skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    top_skills.truncate(10);

    Ok(PortfolioStats {
        total,
        with_email,
        with_phone,
        with_description,
        top_skills,
        created_this_month,
        created_this_year,
    })
}
