use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// An enrollable activity as returned by `GET /activities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

impl Activity {
    /// Remaining capacity. Negative when the server has over-enrolled.
    pub fn spots_left(&self) -> i64 {
        i64::from(self.max_participants) - self.participants.len() as i64
    }
}

// The per-activity body of the listing; the name is the map key.
#[derive(Debug, Deserialize)]
struct ActivityDetails {
    #[serde(default)]
    description: String,
    #[serde(default)]
    schedule: String,
    max_participants: u32,
    #[serde(default)]
    participants: Vec<String>,
}

/// The activity listing, kept in the order the server wrote its keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCatalog(pub Vec<Activity>);

impl ActivityCatalog {
    pub fn into_inner(self) -> Vec<Activity> {
        self.0
    }
}

impl<'de> Deserialize<'de> for ActivityCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = ActivityCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of activity name to activity details")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut activities = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, details)) = map.next_entry::<String, ActivityDetails>()? {
                    activities.push(Activity {
                        name,
                        description: details.description,
                        schedule: details.schedule,
                        max_participants: details.max_participants,
                        participants: details.participants,
                    });
                }
                Ok(ActivityCatalog(activities))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Body of `POST /admin/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Reply to a login attempt. Some servers answer 2xx with `{success: false, message}` and
/// no token, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to signup and unregister.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub message: String,
}

/// Reply to `GET /auth/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub teacher_name: Option<String>,
}

/// Failure body. `detail` is usually a string but validation errors carry a list of
/// `{loc, msg, type}` objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }
}

/// One participant line under an activity card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub activity: String,
    pub email: String,
    pub unregister_enabled: bool,
}

/// What gets drawn for one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: Vec<ParticipantRow>,
}

impl ActivityCard {
    pub fn new(activity: &Activity, admin: bool) -> Self {
        ActivityCard {
            name: activity.name.clone(),
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            spots_left: activity.spots_left(),
            participants: activity
                .participants
                .iter()
                .map(|email| ParticipantRow {
                    activity: activity.name.clone(),
                    email: email.clone(),
                    unregister_enabled: admin,
                })
                .collect(),
        }
    }

    pub fn availability(&self) -> String {
        format!("{} spots left", self.spots_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chess_club(participants: &[&str], max: u32) -> Activity {
        Activity {
            name: "Chess Club".to_string(),
            description: "Learn strategies".to_string(),
            schedule: "Fridays".to_string(),
            max_participants: max,
            participants: participants.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_spots_left() {
        assert_eq!(chess_club(&["a@x.com", "b@x.com"], 10).spots_left(), 8);
        // Full.
        assert_eq!(chess_club(&["a@x.com", "b@x.com"], 2).spots_left(), 0);
        // Over-enrolled is shown as-is.
        assert_eq!(chess_club(&["a@x.com", "b@x.com", "c@x.com"], 1).spots_left(), -2);
        assert_eq!(chess_club(&[], 0).spots_left(), 0);
    }

    #[test]
    fn test_catalog_keeps_server_order() {
        let json = r#"{
            "Programming Class": {"description": "d", "schedule": "s", "max_participants": 20, "participants": []},
            "Chess Club": {"description": "d", "schedule": "s", "max_participants": 12, "participants": ["a@x.com"]},
            "Art Club": {"description": "d", "schedule": "s", "max_participants": 15, "participants": ["b@x.com", "b@x.com"]}
        }"#;
        let catalog: ActivityCatalog = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = catalog.0.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Programming Class", "Chess Club", "Art Club"]);
        // Duplicates are not collapsed client-side.
        assert_eq!(catalog.0[2].participants.len(), 2);
    }

    #[test]
    fn test_catalog_rejects_non_map() {
        assert!(serde_json::from_str::<ActivityCatalog>("[]").is_err());
    }

    #[test]
    fn test_card_rows_carry_activity_and_email() {
        let card = ActivityCard::new(&chess_club(&["a@x.com", "b@x.com"], 10), false);
        assert_eq!(card.availability(), "8 spots left");
        assert_eq!(card.participants.len(), 2);
        assert_eq!(card.participants[1].activity, "Chess Club");
        assert_eq!(card.participants[1].email, "b@x.com");
        assert!(card.participants.iter().all(|p| !p.unregister_enabled));

        let card = ActivityCard::new(&chess_club(&["a@x.com"], 10), true);
        assert!(card.participants[0].unregister_enabled);
    }

    #[test]
    fn test_error_body_detail_text() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Activity not found"}"#).unwrap();
        assert_eq!(body.detail_text().as_deref(), Some("Activity not found"));

        let body: ErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["query", "email"], "msg": "field required", "type": "missing"}]}"#,
        )
        .unwrap();
        assert_eq!(body.detail_text().as_deref(), Some("field required"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.detail_text(), None);
    }

    #[test]
    fn test_login_reply_without_token() {
        let reply: LoginReply =
            serde_json::from_str(r#"{"success": false, "message": "Invalid email or password"}"#)
                .unwrap();
        assert!(reply.token.is_none());
        assert_eq!(reply.message.as_deref(), Some("Invalid email or password"));
    }
}
