//! User model and related functionality

use serde::{Deserialize, Serialize};

use crate::models::deserialize_id;

/// Profile details of a user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Server-side path of the profile picture
    #[serde(default)]
    pub picture: Option<String>,
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Displayable URL of the profile picture
    ///
    /// The backend reports pictures as storage paths containing a
    /// `/public/` segment; the public URL is `app_url` followed by what comes
    /// after that segment.
    pub fn picture_url(&self, app_url: &str) -> Option<String> {
        let path = self.profile.as_ref()?.picture.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }

        match path.split_once("/public/") {
            Some((_, relative)) => Some(format!("{}/{}", app_url.trim_end_matches('/'), relative)),
            None if path.starts_with("http://") || path.starts_with("https://") => {
                Some(path.to_string())
            }
            None => None,
        }
    }

    /// Merge a partial profile returned by the backend
    pub fn apply_profile_patch(&mut self, patch: ProfilePatch) {
        let profile = self.profile.get_or_insert_with(Profile::default);

        if let Some(picture) = patch.picture {
            profile.picture = Some(picture);
        }
        if let Some(first_name) = patch.first_name {
            profile.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            profile.last_name = Some(last_name);
        }
        if let Some(name) = patch.name {
            profile.name = Some(name);
        }
    }
}

/// Profile fields sent to `POST /profile`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
}

/// Partial profile returned by picture uploads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Image selected for upload as the profile picture
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl PictureUpload {
    /// JPEG upload, the format the picker produces
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "profile.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_picture(picture: Option<&str>) -> User {
        User {
            id: 1,
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            profile: Some(Profile {
                picture: picture.map(str::to_string),
                ..Profile::default()
            }),
            created_at: None,
        }
    }

    #[test]
    fn test_picture_url_from_storage_path() {
        let user = user_with_picture(Some("/var/www/bticket/public/uploads/profiles/1.jpg"));
        assert_eq!(
            user.picture_url("https://bticket.example/").as_deref(),
            Some("https://bticket.example/uploads/profiles/1.jpg")
        );
    }

    #[test]
    fn test_picture_url_without_public_segment() {
        assert_eq!(
            user_with_picture(Some("https://cdn.example/p.jpg"))
                .picture_url("https://bticket.example")
                .as_deref(),
            Some("https://cdn.example/p.jpg")
        );
        assert_eq!(
            user_with_picture(Some("uploads/p.jpg")).picture_url("https://bticket.example"),
            None
        );
        assert_eq!(user_with_picture(None).picture_url("https://bticket.example"), None);
    }

    #[test]
    fn test_user_accepts_string_id() {
        let user: User = serde_json::from_str(
            r#"{"id": "42", "name": "Jane", "email": "jane@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.id, 42);
        assert!(user.profile.is_none());
    }

    #[test]
    fn test_apply_profile_patch_keeps_untouched_fields() {
        let mut user = user_with_picture(Some("old.jpg"));
        user.profile.as_mut().unwrap().first_name = Some("Jane".to_string());

        user.apply_profile_patch(ProfilePatch {
            picture: Some("/srv/public/new.jpg".to_string()),
            ..ProfilePatch::default()
        });

        let profile = user.profile.unwrap();
        assert_eq!(profile.picture.as_deref(), Some("/srv/public/new.jpg"));
        assert_eq!(profile.first_name.as_deref(), Some("Jane"));
    }
}
