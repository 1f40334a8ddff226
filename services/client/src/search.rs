//! Client-side event search

use crate::models::Event;

/// Query and category filter over a fetched event list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub query: String,
    pub category_id: Option<i64>,
}

impl EventFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category_id: None,
        }
    }

    /// Select a category, or clear it when it is already selected
    pub fn toggle_category(&mut self, category_id: i64) {
        self.category_id = match self.category_id {
            Some(current) if current == category_id => None,
            _ => Some(category_id),
        };
    }

    /// Whether one event passes the filter
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category_id) = self.category_id {
            if event.category_key() != Some(category_id) {
                return false;
            }
        }

        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || event.title.to_lowercase().contains(&query)
            || event.location.to_lowercase().contains(&query)
    }

    /// Events that pass the filter, in their original order
    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|event| self.matches(event)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, title: &str, location: &str, category_id: i64) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "location": location,
            "category_id": category_id,
        }))
        .unwrap()
    }

    fn events() -> Vec<Event> {
        vec![
            event(1, "Jazz Night", "Kinshasa", 2),
            event(2, "Rock Festival", "Lubumbashi", 3),
            event(3, "Comedy Club", "Kinshasa", 4),
        ]
    }

    #[test]
    fn test_query_matches_title_and_location_case_insensitively() {
        let events = events();
        let ids = |filter: &EventFilter| -> Vec<i64> {
            filter.apply(&events).iter().map(|event| event.id).collect()
        };

        assert_eq!(ids(&EventFilter::new("jazz")), vec![1]);
        assert_eq!(ids(&EventFilter::new("KINSHASA")), vec![1, 3]);
        assert_eq!(ids(&EventFilter::new("  ")), vec![1, 2, 3]);
    }

    #[test]
    fn test_category_toggle_and_combination() {
        let events = events();
        let mut filter = EventFilter::new("kinshasa");

        filter.toggle_category(4);
        assert_eq!(filter.apply(&events).len(), 1);

        filter.toggle_category(4);
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.apply(&events).len(), 2);
    }
}
