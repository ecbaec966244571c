use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a campaign, derived from its window and pause flag.
/// Ended wins over everything, then scheduled, then paused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Scheduled,
    Active,
    Paused,
    Ended,
}

/// Ad campaign row; status is never stored, always computed
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdCampaign {
    pub id: i64,
    pub advertiser: String,
    pub name: String,
    pub budget_cents: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub paused: bool,
    pub created_at: DateTime<Utc>,
}

impl AdCampaign {
    pub fn status_at(&self, now: DateTime<Utc>) -> CampaignStatus {
        if now >= self.ends_at {
            CampaignStatus::Ended
        } else if now < self.starts_at {
            CampaignStatus::Scheduled
        } else if self.paused {
            CampaignStatus::Paused
        } else {
            CampaignStatus::Active
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub advertiser: String,
    pub name: String,
    pub budget_cents: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub id: i64,
    pub advertiser: String,
    pub name: String,
    pub budget_cents: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&AdCampaign> for CampaignResponse {
    fn from(campaign: &AdCampaign) -> Self {
        Self {
            id: campaign.id,
            advertiser: campaign.advertiser.clone(),
            name: campaign.name.clone(),
            budget_cents: campaign.budget_cents,
            starts_at: campaign.starts_at,
            ends_at: campaign.ends_at,
            status: campaign.status_at(Utc::now()),
            created_at: campaign.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn campaign(starts_in_hours: i64, ends_in_hours: i64, paused: bool) -> (AdCampaign, DateTime<Utc>) {
        let now = Utc::now();
        let campaign = AdCampaign {
            id: 1,
            advertiser: "Crunchy Cola".to_string(),
            name: "Summer push".to_string(),
            budget_cents: 500_000,
            starts_at: now + Duration::hours(starts_in_hours),
            ends_at: now + Duration::hours(ends_in_hours),
            paused,
            created_at: now,
        };
        (campaign, now)
    }

    #[test]
    fn test_status_scheduled_before_window() {
        let (campaign, now) = campaign(2, 10, false);
        assert_eq!(campaign.status_at(now), CampaignStatus::Scheduled);
    }

    #[test]
    fn test_status_active_inside_window() {
        let (campaign, now) = campaign(-2, 10, false);
        assert_eq!(campaign.status_at(now), CampaignStatus::Active);
    }

    #[test]
    fn test_status_paused_inside_window() {
        let (campaign, now) = campaign(-2, 10, true);
        assert_eq!(campaign.status_at(now), CampaignStatus::Paused);
    }

    #[test]
    fn test_status_ended_after_window_even_if_paused() {
        let (campaign, now) = campaign(-10, -2, true);
        assert_eq!(campaign.status_at(now), CampaignStatus::Ended);
    }

    #[test]
    fn test_status_scheduled_wins_over_paused() {
        let (campaign, now) = campaign(2, 10, true);
        assert_eq!(campaign.status_at(now), CampaignStatus::Scheduled);
    }

    #[test]
    fn test_status_ended_at_exact_boundary() {
        let (campaign, _) = campaign(-10, 0, false);
        assert_eq!(campaign.status_at(campaign.ends_at), CampaignStatus::Ended);
    }
}
