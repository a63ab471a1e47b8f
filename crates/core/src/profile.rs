//! User profile document stored per uid in the `users` collection.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::types::{Timestamp, Uid};

// ---------------------------------------------------------------------------
// Tech careers
// ---------------------------------------------------------------------------

/// Career paths offered during onboarding and in settings.
pub const TECH_CAREERS: &[&str] = &[
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "Data Scientist",
    "UI/UX Designer",
    "DevOps Engineer",
    "Mobile Developer",
];

/// Validate that `value` names one of [`TECH_CAREERS`].
pub fn validate_tech_career(value: &str) -> Result<(), FieldError> {
    if TECH_CAREERS.contains(&value) {
        Ok(())
    } else {
        Err(FieldError::new(
            "techCareer",
            format!(
                "Unknown tech career '{value}'. Must be one of: {}",
                TECH_CAREERS.join(", ")
            ),
        ))
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Mentor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Mentor => "mentor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: Uid,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_career: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl UserProfile {
    /// A profile counts as complete once onboarding recorded a career.
    pub fn is_complete(&self) -> bool {
        self.tech_career
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// Build a document from a create write. Missing required fields fall
    /// back to empty strings, the student role and the current time.
    pub fn from_write(uid: impl Into<Uid>, write: ProfileWrite) -> Self {
        Self {
            uid: uid.into(),
            display_name: write.display_name.unwrap_or_default(),
            email: write.email.unwrap_or_default(),
            photo_url: write.photo_url,
            role: write.role.unwrap_or_default(),
            tech_career: write.tech_career,
            bio: write.bio,
            phone_number: write.phone_number,
            created_at: write.created_at.unwrap_or_else(Utc::now),
            updated_at: write.updated_at,
        }
    }

    /// Apply a merge write: only fields present in `write` replace stored
    /// values.
    pub fn merged(mut self, write: ProfileWrite) -> Self {
        if let Some(v) = write.display_name {
            self.display_name = v;
        }
        if let Some(v) = write.email {
            self.email = v;
        }
        if write.photo_url.is_some() {
            self.photo_url = write.photo_url;
        }
        if let Some(v) = write.role {
            self.role = v;
        }
        if write.tech_career.is_some() {
            self.tech_career = write.tech_career;
        }
        if write.bio.is_some() {
            self.bio = write.bio;
        }
        if write.phone_number.is_some() {
            self.phone_number = write.phone_number;
        }
        if let Some(v) = write.created_at {
            self.created_at = v;
        }
        if write.updated_at.is_some() {
            self.updated_at = write.updated_at;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Partial profile document. Absent fields are left alone by merge writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_career: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl ProfileWrite {
    /// Document for a freshly created account. New accounts are always
    /// students.
    pub fn new_student(
        display_name: impl Into<String>,
        email: impl Into<String>,
        photo_url: Option<String>,
        phone_number: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            display_name: Some(display_name.into()),
            email: Some(email.into()),
            photo_url,
            role: Some(Role::Student),
            phone_number,
            created_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Names of the fields this write sets, in document-store spelling.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        let present = [
            ("displayName", self.display_name.is_some()),
            ("email", self.email.is_some()),
            ("photoURL", self.photo_url.is_some()),
            ("role", self.role.is_some()),
            ("techCareer", self.tech_career.is_some()),
            ("bio", self.bio.is_some()),
            ("phoneNumber", self.phone_number.is_some()),
            ("createdAt", self.created_at.is_some()),
            ("updatedAt", self.updated_at.is_some()),
        ];
        for (name, set) in present {
            if set {
                paths.push(name);
            }
        }
        paths
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> UserProfile {
        UserProfile::from_write(
            "u1",
            ProfileWrite::new_student("Ada", "ada@example.com", None, None),
        )
    }

    #[test]
    fn new_profiles_are_incomplete_students() {
        let p = profile();
        assert_eq!(p.role, Role::Student);
        assert!(!p.is_complete());
        assert!(p.updated_at.is_some());
    }

    #[test]
    fn blank_career_is_incomplete() {
        let mut p = profile();
        p.tech_career = Some("  ".into());
        assert!(!p.is_complete());
        p.tech_career = Some("Data Scientist".into());
        assert!(p.is_complete());
    }

    #[test]
    fn merge_only_touches_present_fields() {
        let p = profile().merged(ProfileWrite {
            tech_career: Some("DevOps Engineer".into()),
            ..Default::default()
        });
        assert_eq!(p.display_name, "Ada");
        assert_eq!(p.email, "ada@example.com");
        assert_eq!(p.tech_career.as_deref(), Some("DevOps Engineer"));
    }

    #[test]
    fn serializes_with_document_field_names() {
        let mut p = profile();
        p.photo_url = Some("https://img".into());
        p.tech_career = Some("Mobile Developer".into());
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["displayName"], json!("Ada"));
        assert_eq!(value["photoURL"], json!("https://img"));
        assert_eq!(value["techCareer"], json!("Mobile Developer"));
        assert_eq!(value["role"], json!("student"));
        assert!(value.get("bio").is_none());
    }

    #[test]
    fn field_paths_list_only_set_fields() {
        let write = ProfileWrite {
            display_name: Some("Ada".into()),
            bio: Some("hi".into()),
            ..Default::default()
        };
        assert_eq!(write.field_paths(), vec!["displayName", "bio"]);
    }

    #[test]
    fn tech_career_validation() {
        assert!(validate_tech_career("UI/UX Designer").is_ok());
        let err = validate_tech_career("Astronaut").unwrap_err();
        assert_eq!(err.field, "techCareer");
    }
}
