use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub price: Decimal,
    pub total_tickets: i32,
    pub available_tickets: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.event_date <= now
    }
}

/// Event row joined with its organizer, as shown in listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub price: Decimal,
    pub total_tickets: i32,
    pub available_tickets: i32,
    pub tickets_sold: i32,
    pub is_published: bool,
    pub organizer_id: Uuid,
    pub organizer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventImage {
    pub id: Uuid,
    pub event_id: Uuid,
    pub image_url: String,
    pub display_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(starts_in: Duration) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Harbour Lights".into(),
            description: "Open-air concert".into(),
            venue: "Pier 4".into(),
            event_date: now + starts_in,
            price: Decimal::new(2500, 2),
            total_tickets: 100,
            available_tickets: 100,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_started() {
        let now = Utc::now();
        assert!(!event(Duration::hours(2)).has_started(now));
        assert!(event(Duration::hours(-2)).has_started(now));
    }
}
