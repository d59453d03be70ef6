//! Avatars and talking photos offered by the provider.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub avatar_id: String,
    #[serde(default)]
    pub avatar_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_video_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TalkingPhoto {
    pub talking_photo_id: String,
    #[serde(default)]
    pub talking_photo_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
}

/// Everything the avatar listing returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarCatalog {
    #[serde(default)]
    pub avatars: Vec<Avatar>,
    #[serde(default)]
    pub talking_photos: Vec<TalkingPhoto>,
}
