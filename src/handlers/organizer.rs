use axum::{extract::State, response::Response};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::RequireOrganizer;
use crate::services::events::{self, NewEvent};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::AppJson;
use crate::utils::response::{created, success};
use crate::utils::validation;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub price: Decimal,
    pub total_tickets: i32,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl CreateEventRequest {
    fn validate(self, now: DateTime<Utc>) -> AppResult<NewEvent> {
        let title = validation::required(&self.title, "Event title")?;
        let description = validation::required(&self.description, "Event description")?;
        let venue = validation::required(&self.venue, "Venue")?;
        validation::future_date(self.event_date, now)?;
        validation::price(self.price)?;
        validation::total_tickets(self.total_tickets)?;
        let image_urls = validation::image_urls(&self.image_urls)?;

        Ok(NewEvent {
            title,
            description,
            venue,
            event_date: self.event_date,
            price: self.price,
            total_tickets: self.total_tickets,
            image_urls,
        })
    }
}

pub async fn my_events(
    State(state): State<AppState>,
    RequireOrganizer(organizer): RequireOrganizer,
) -> AppResult<Response> {
    let events = events::organizer_events(&state.pool, organizer.id).await?;
    Ok(success(events, "Organizer events loaded"))
}

pub async fn create_event(
    State(state): State<AppState>,
    RequireOrganizer(organizer): RequireOrganizer,
    AppJson(request): AppJson<CreateEventRequest>,
) -> AppResult<Response> {
    let new_event = request.validate(Utc::now())?;
    let event = events::create_event(&state.pool, organizer.id, new_event).await?;
    Ok(created(event, "Event created successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request() -> CreateEventRequest {
        CreateEventRequest {
            title: " Spring Fair ".into(),
            description: "Stalls and rides".into(),
            venue: "Central Park".into(),
            event_date: Utc::now() + Duration::days(30),
            price: Decimal::new(1500, 2),
            total_tickets: 200,
            image_urls: vec!["https://img.example.com/fair.jpg".into(), "".into()],
        }
    }

    #[test]
    fn test_valid_request() {
        let event = request().validate(Utc::now()).unwrap();
        assert_eq!(event.title, "Spring Fair");
        assert_eq!(event.image_urls.len(), 1);
    }

    #[test]
    fn test_rejects_past_date_and_bad_counts() {
        let mut past = request();
        past.event_date = Utc::now() - Duration::days(1);
        assert!(past.validate(Utc::now()).is_err());

        let mut no_tickets = request();
        no_tickets.total_tickets = 0;
        assert!(no_tickets.validate(Utc::now()).is_err());

        let mut negative = request();
        negative.price = Decimal::new(-500, 2);
        assert!(negative.validate(Utc::now()).is_err());
    }

    #[test]
    fn test_request_deserializes_numeric_price() {
        let json = r#"{
            "title": "Gig",
            "description": "Live set",
            "venue": "Basement",
            "event_date": "2099-05-01T20:00:00Z",
            "price": 12.5,
            "total_tickets": 80
        }"#;
        let request: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.price, Decimal::new(125, 1));
        assert!(request.image_urls.is_empty());
    }
}
