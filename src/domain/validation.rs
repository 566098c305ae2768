//! Post form validation.
//!
//! Every check produces a per-field message instead of failing early, so a
//! form can show all problems at once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::domain::post::{Community, NewPostInput, PostUpdateInput};

pub type FieldErrors = BTreeMap<String, String>;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const SECRET_KEY_REQUIRED: &str = "Secret key is required";
pub const INVALID_URL: &str = "Please enter a valid URL";
pub const COMMUNITY_REQUIRED: &str = "Please select a community";

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub community: String,
    pub location: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormValidation {
    pub errors: FieldErrors,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }
}

pub fn validate_post_form(form: &PostForm) -> FormValidation {
    let mut validation = validate_post_edit(form);
    if is_blank(&form.secret_key) {
        validation.reject("secret_key", SECRET_KEY_REQUIRED);
    }
    validation
}

/// Same checks as [`validate_post_form`] minus the secret key, which edit
/// forms do not carry.
pub fn validate_post_edit(form: &PostForm) -> FormValidation {
    let mut validation = FormValidation::default();

    if is_blank(&form.title) {
        validation.reject("title", TITLE_REQUIRED);
    }

    if !is_blank(&form.image_url) && !is_absolute_url(form.image_url.trim()) {
        validation.reject("image_url", INVALID_URL);
    }

    validation
}

pub fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn optional(value: String) -> Option<String> {
    if is_blank(&value) {
        None
    } else {
        Some(value)
    }
}

impl PostForm {
    /// Validates the form and converts it into store input.
    pub fn into_new_post(self) -> Result<NewPostInput, FieldErrors> {
        let mut validation = validate_post_form(&self);
        let community = self.community.parse::<Community>();
        if community.is_err() {
            validation.reject("community", COMMUNITY_REQUIRED);
        }

        match community {
            Ok(community) if validation.is_valid() => Ok(NewPostInput {
                title: self.title.trim().to_string(),
                content: optional(self.content),
                image_url: optional(self.image_url).map(|url| url.trim().to_string()),
                community,
                location: optional(self.location),
                secret_key: self.secret_key,
            }),
            _ => Err(validation.errors),
        }
    }

    /// Validates an edit form and converts it into a full replacement of
    /// the editable fields.
    pub fn into_update(self) -> Result<PostUpdateInput, FieldErrors> {
        let mut validation = validate_post_edit(&self);
        let community = self.community.parse::<Community>();
        if community.is_err() {
            validation.reject("community", COMMUNITY_REQUIRED);
        }

        match community {
            Ok(community) if validation.is_valid() => Ok(PostUpdateInput {
                title: Some(self.title.trim().to_string()),
                content: Some(optional(self.content)),
                image_url: Some(optional(self.image_url).map(|url| url.trim().to_string())),
                community: Some(community),
                location: Some(optional(self.location)),
            }),
            _ => Err(validation.errors),
        }
    }
}
