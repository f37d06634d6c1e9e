use serde::{Deserialize, Serialize, Serializer};
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::countdown::Countdown;
use crate::recipients::repo::Recipient;

/// Interests/likes arrive either as a plain string or as an array that is
/// joined with commas before storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn join(self) -> String {
        match self {
            StringOrList::One(s) => s.trim().to_string(),
            StringOrList::Many(v) => v
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipientRequest {
    pub name: String,
    pub birthday: String,
    pub gender: Option<String>,
    pub interests: Option<StringOrList>,
    pub likes: Option<StringOrList>,
    pub budget: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipientRequest {
    pub name: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub interests: Option<StringOrList>,
    pub likes: Option<StringOrList>,
    pub budget: Option<f64>,
}

fn serialize_iso_date<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
    let fmt = format_description!("[year]-[month]-[day]");
    let text = date.format(&fmt).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

#[derive(Debug, Serialize)]
pub struct RecipientResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(serialize_with = "serialize_iso_date")]
    pub birthday: Date,
    pub age: i32,
    pub gender: Option<String>,
    pub interests: Option<String>,
    pub likes: Option<String>,
    pub budget: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    #[serde(flatten)]
    pub countdown: Countdown,
}

impl RecipientResponse {
    pub fn from_row(row: Recipient, today: Date) -> Self {
        let countdown = Countdown::compute(row.birthday, today);
        Self {
            id: row.id,
            name: row.name,
            birthday: row.birthday,
            age: row.age,
            gender: row.gender,
            interests: row.interests,
            likes: row.likes,
            budget: row.budget,
            created_at: row.created_at,
            updated_at: row.updated_at,
            countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn sample_row(birthday: Date) -> Recipient {
        Recipient {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Dana".into(),
            birthday,
            age: 24,
            gender: None,
            interests: Some("books,tea".into()),
            likes: None,
            budget: Some(50.0),
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn interests_accept_string_or_array() {
        let one: StringOrList = serde_json::from_str("\"books, tea\"").unwrap();
        assert_eq!(one.join(), "books, tea");

        let many: StringOrList = serde_json::from_str(r#"["books", " tea ", ""]"#).unwrap();
        assert_eq!(many.join(), "books,tea");
    }

    #[test]
    fn response_carries_countdown_fields_and_iso_birthday() {
        let row = sample_row(date!(2000 - 03 - 20));
        let response = RecipientResponse::from_row(row, date!(2024 - 03 - 14));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["birthday"], "2000-03-20");
        assert_eq!(json["days_until"], 6);
        assert_eq!(json["tier"], "soon");
        assert_eq!(json["display_date"], "March 20");
    }

    #[test]
    fn update_request_tolerates_missing_fields() {
        let patch: UpdateRecipientRequest = serde_json::from_str(r#"{"name":"Dana"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Dana"));
        assert!(patch.birthday.is_none());
        assert!(patch.budget.is_none());
    }
}
