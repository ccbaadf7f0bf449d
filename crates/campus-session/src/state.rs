//! Session lifecycle state and partial-update types.

use campus_types::UserRecord;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Session lifecycle as consumers observe it.
///
/// A freshly built store is `Loading` until `load_initial` completes;
/// consumers must defer rendering and routing decisions until then.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Loading,
    LoggedOut,
    LoggedIn(UserRecord),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }

    /// The logged-in user, if any.
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            SessionState::LoggedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// A partial update to the logged-in user.
///
/// Fields left `None` keep their current value; a shallow merge never
/// removes anything. Unknown fields in `extra` are merged key-wise over
/// the record's side-map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub enrollment_status: Option<String>,
    pub evaluation_status: Option<String>,
    pub academic_year: Option<String>,
    pub account_status: Option<String>,
    pub avatar: Option<String>,
    pub avatar_url: Option<String>,
    pub avatar_data: Option<String>,
    pub contact_number: Option<String>,
    pub join_date: Option<String>,
    pub year_level_id: Option<i64>,
    pub year_level_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserPatch {
    /// Shallow-merge this patch over `user`.
    pub fn apply(self, user: &mut UserRecord) {
        if let Some(v) = self.first_name {
            user.first_name = v;
        }
        if let Some(v) = self.last_name {
            user.last_name = v;
        }
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.status {
            user.status = v;
        }
        if let Some(v) = self.enrollment_status {
            user.enrollment_status = v;
        }
        if let Some(v) = self.evaluation_status {
            user.evaluation_status = v;
        }
        if let Some(v) = self.academic_year {
            user.academic_year = v;
        }
        if let Some(v) = self.account_status {
            user.account_status = Some(v);
        }
        if let Some(v) = self.avatar {
            user.avatar = Some(v);
        }
        if let Some(v) = self.avatar_url {
            user.avatar_url = Some(v);
        }
        if let Some(v) = self.avatar_data {
            user.avatar_data = Some(v);
        }
        if let Some(v) = self.contact_number {
            user.contact_number = Some(v);
        }
        if let Some(v) = self.join_date {
            user.join_date = Some(v);
        }
        if let Some(v) = self.year_level_id {
            user.year_level_id = Some(v);
        }
        if let Some(v) = self.year_level_name {
            user.year_level_name = Some(v);
        }
        for (key, value) in self.extra {
            user.extra.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_user() -> UserRecord {
        serde_json::from_value(json!({
            "id": 7,
            "student_id": "2021-00123",
            "first_name": "Maria",
            "last_name": "Santos",
            "email": "maria@example.edu",
            "contact_number": "0917-555-0199",
            "nickname": "Mia",
        }))
        .unwrap()
    }

    #[test]
    fn apply_overwrites_only_provided_fields() {
        let mut user = test_user();
        let patch = UserPatch {
            email: Some("maria.santos@example.edu".to_string()),
            ..UserPatch::default()
        };
        patch.apply(&mut user);

        assert_eq!(user.email, "maria.santos@example.edu");
        assert_eq!(user.first_name, "Maria");
        assert_eq!(user.contact_number.as_deref(), Some("0917-555-0199"));
    }

    #[test]
    fn apply_merges_extra_keywise() {
        let mut user = test_user();
        let patch: UserPatch = serde_json::from_value(json!({
            "dorm_building": "West Hall",
        }))
        .unwrap();
        patch.apply(&mut user);

        assert_eq!(user.extra["nickname"], json!("Mia"));
        assert_eq!(user.extra["dorm_building"], json!("West Hall"));
    }

    #[test]
    fn state_accessors() {
        assert!(SessionState::Loading.is_loading());
        assert!(!SessionState::LoggedOut.is_logged_in());
        assert!(SessionState::LoggedOut.user().is_none());

        let state = SessionState::LoggedIn(test_user());
        assert!(state.is_logged_in());
        assert_eq!(state.user().map(|u| u.id), Some(7));
    }
}
