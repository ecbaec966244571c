use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{AdCampaign, CampaignStatus, CreateCampaignRequest, Page, PageParams},
};

const CAMPAIGN_COLUMNS: &str =
    "id, advertiser, name, budget_cents, starts_at, ends_at, paused, created_at";

/// WHERE clause matching [`AdCampaign::status_at`], so filtered listings and
/// the computed response field can never disagree
fn status_filter(status: CampaignStatus) -> &'static str {
    match status {
        CampaignStatus::Ended => "now() >= ends_at",
        CampaignStatus::Scheduled => "now() < starts_at",
        CampaignStatus::Paused => "paused AND now() >= starts_at AND now() < ends_at",
        CampaignStatus::Active => "NOT paused AND now() >= starts_at AND now() < ends_at",
    }
}

/// Lists campaigns, newest window first, optionally filtered by computed
/// lifecycle status
pub async fn list_campaigns(
    pool: &PgPool,
    params: &PageParams,
    status: Option<CampaignStatus>,
) -> AppResult<Page<AdCampaign>> {
    let filter = match status {
        Some(status) => status_filter(status),
        None => "TRUE",
    };

    let count_sql = format!("SELECT COUNT(*) FROM ad_campaigns WHERE {}", filter);
    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .fetch_one(pool)
        .await?;

    let list_sql = format!(
        "SELECT {} FROM ad_campaigns WHERE {} ORDER BY starts_at DESC, id DESC LIMIT $1 OFFSET $2",
        CAMPAIGN_COLUMNS, filter
    );
    let campaigns = sqlx::query_as::<_, AdCampaign>(&list_sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    Ok(Page::new(campaigns, params, total))
}

pub async fn get_campaign(pool: &PgPool, campaign_id: i64) -> AppResult<AdCampaign> {
    let sql = format!("SELECT {} FROM ad_campaigns WHERE id = $1", CAMPAIGN_COLUMNS);

    sqlx::query_as::<_, AdCampaign>(&sql)
        .bind(campaign_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campaign {} not found", campaign_id)))
}

/// Validates and stores a new campaign
pub async fn create_campaign(
    pool: &PgPool,
    request: CreateCampaignRequest,
) -> AppResult<AdCampaign> {
    let advertiser = request.advertiser.trim().to_string();
    let name = request.name.trim().to_string();

    if advertiser.is_empty() {
        return Err(AppError::InvalidInput(
            "Advertiser cannot be empty".to_string(),
        ));
    }
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }
    if request.budget_cents <= 0 {
        return Err(AppError::InvalidInput("Budget must be positive".to_string()));
    }
    if request.ends_at <= request.starts_at {
        return Err(AppError::InvalidInput(
            "Campaign must end after it starts".to_string(),
        ));
    }

    let sql = format!(
        "INSERT INTO ad_campaigns (advertiser, name, budget_cents, starts_at, ends_at, paused)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        CAMPAIGN_COLUMNS
    );

    let campaign = sqlx::query_as::<_, AdCampaign>(&sql)
        .bind(&advertiser)
        .bind(&name)
        .bind(request.budget_cents)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.paused)
        .fetch_one(pool)
        .await?;

    tracing::info!(campaign_id = campaign.id, advertiser = %campaign.advertiser, "Campaign created");

    Ok(campaign)
}
