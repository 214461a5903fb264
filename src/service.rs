use sea_orm::DatabaseConnection;

use crate::db::portfolio as portfolio_db;
use crate::error::ServiceError;
use crate::models::envelope::ApiResponse;
use crate::models::portfolio::{
    CreatePortfolio, Model, PortfolioFilters, PortfolioList, PortfolioStats, UpdatePortfolio,
};
use crate::validation;

/// Shaping layer between the HTTP handlers and the store: validates DTOs,
/// translates filters into queries and wraps results in the success
/// envelope. Constructed once in `main` and shared through app data.
#[derive(Clone)]
pub struct PortfolioService {
    db: DatabaseConnection,
}

impl PortfolioService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(
        &self,
        filters: PortfolioFilters,
    ) -> Result<ApiResponse<PortfolioList>, ServiceError> {
        let page = filters.page.unwrap_or(1).max(1);
        let limit = filters.limit.unwrap_or(10).clamp(1, 100);

        let (items, total) = portfolio_db::find_portfolios(&self.db, &filters, page, limit).await?;

        Ok(ApiResponse::ok(
            PortfolioList {
                data: items,
                total,
                page,
                limit,
            },
            "Portfólios buscados com sucesso",
        ))
    }

    pub async fn get(&self, id: i32) -> Result<ApiResponse<Model>, ServiceError> {
        let item = portfolio_db::find_by_id(&self.db, id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        Ok(ApiResponse::ok(item, "Portfólio encontrado com sucesso"))
    }

    pub async fn create(&self, data: CreatePortfolio) -> Result<ApiResponse<Model>, ServiceError> {
        let errors = validation::validate_create_portfolio(&data);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let item = portfolio_db::insert_portfolio(&self.db, data).await?;
        Ok(ApiResponse::ok(item, "Portfólio criado com sucesso"))
    }

    pub async fn update(&self, data: UpdatePortfolio) -> Result<ApiResponse<Model>, ServiceError> {
        let errors = validation::validate_update_portfolio(&data);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let existing = portfolio_db::find_by_id(&self.db, data.id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let item = portfolio_db::update_portfolio(&self.db, existing, data).await?;
        Ok(ApiResponse::ok(item, "Portfólio atualizado com sucesso"))
    }

    pub async fn delete(&self, id: i32) -> Result<ApiResponse<serde_json::Value>, ServiceError> {
        let result = portfolio_db::delete_portfolio(&self.db, id).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound);
        }

        Ok(ApiResponse::ok(
            serde_json::json!({ "message": "Portfólio deletado com sucesso" }),
            "Portfólio deletado com sucesso",
        ))
    }

    pub async fn stats(&self) -> Result<ApiResponse<PortfolioStats>, ServiceError> {
        let stats = portfolio_db::collect_stats(&self.db).await?;
        Ok(ApiResponse::ok(stats, "Estatísticas buscadas com sucesso"))
    }
}
