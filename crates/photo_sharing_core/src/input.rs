//! crates/photo_sharing_core/src/input.rs
//!
//! Validated inputs for the core operations. Transport adapters build these
//! from request payloads so nothing unvalidated reaches the engine.

/// Image MIME types accepted for upload.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upload size ceiling used when none is configured.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Comment cannot be empty")]
    EmptyComment,
    #[error("No photo uploaded")]
    EmptyUpload,
    #[error("Invalid file type '{0}'. Only JPEG, PNG, GIF, WEBP allowed.")]
    UnsupportedImageType(String),
    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    ImageTooLarge { size: usize, limit: usize },
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

//=========================================================================================
// Registration
//=========================================================================================

/// Raw registration fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub login_name: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub occupation: Option<String>,
}

/// A registration that passed every field rule.
///
/// Names are trimmed and non-empty. The password is non-empty, kept exactly
/// as typed, and matched its confirmation.
#[derive(Debug, Clone)]
pub struct Registration {
    login_name: String,
    password: String,
    first_name: String,
    last_name: String,
    location: String,
    description: String,
    occupation: String,
}

impl Registration {
    pub fn try_from_form(form: RegistrationForm) -> Result<Self, ValidationError> {
        let login_name = required(&form.login_name, "login_name")?;
        if form.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        let first_name = required(&form.first_name, "first_name")?;
        let last_name = required(&form.last_name, "last_name")?;
        if form.password != form.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(Self {
            login_name,
            password: form.password,
            first_name,
            last_name,
            location: form.location.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            occupation: form.occupation.unwrap_or_default(),
        })
    }

    pub fn login_name(&self) -> &str {
        &self.login_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn occupation(&self) -> &str {
        &self.occupation
    }
}

//=========================================================================================
// Login
//=========================================================================================

#[derive(Debug, Clone)]
pub struct LoginCredentials {
    login_name: String,
    password: String,
}

impl LoginCredentials {
    pub fn try_from_parts(login_name: &str, password: &str) -> Result<Self, ValidationError> {
        let login_name = required(login_name, "login_name")?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(Self {
            login_name,
            password: password.to_string(),
        })
    }

    pub fn login_name(&self) -> &str {
        &self.login_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

//=========================================================================================
// Comment text
//=========================================================================================

/// Comment text that is not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(Self(text.to_string()))
    }

    /// The text exactly as submitted.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn trimmed(&self) -> &str {
        self.0.trim()
    }
}

//=========================================================================================
// Image upload
//=========================================================================================

/// An uploaded image that has an accepted type and fits the size ceiling.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageUpload {
    pub fn try_new(bytes: Vec<u8>, mime_type: &str, max_bytes: usize) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::EmptyUpload);
        }
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(ValidationError::UnsupportedImageType(mime_type));
        }
        if bytes.len() > max_bytes {
            return Err(ValidationError::ImageTooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }
        Ok(Self { bytes, mime_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// File extension for an accepted image MIME type.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn form() -> RegistrationForm {
        RegistrationForm {
            login_name: "alice".into(),
            password: "p".into(),
            confirm_password: "p".into(),
            first_name: "A".into(),
            last_name: "L".into(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_registration() {
        let reg = Registration::try_from_form(form()).expect("valid form");
        assert_eq!(reg.login_name(), "alice");
        assert_eq!(reg.location(), "");
    }

    #[test]
    fn trims_names_but_not_password() {
        let mut f = form();
        f.login_name = "  alice ".into();
        f.password = " p ".into();
        f.confirm_password = " p ".into();
        let reg = Registration::try_from_form(f).expect("valid form");
        assert_eq!(reg.login_name(), "alice");
        assert_eq!(reg.password(), " p ");
    }

    #[rstest]
    #[case::login(|f: &mut RegistrationForm| f.login_name = "  ".into(), ValidationError::MissingField("login_name"))]
    #[case::password(|f: &mut RegistrationForm| f.password = "".into(), ValidationError::MissingField("password"))]
    #[case::first(|f: &mut RegistrationForm| f.first_name = "".into(), ValidationError::MissingField("first_name"))]
    #[case::last(|f: &mut RegistrationForm| f.last_name = "\t".into(), ValidationError::MissingField("last_name"))]
    #[case::mismatch(|f: &mut RegistrationForm| f.confirm_password = "q".into(), ValidationError::PasswordMismatch)]
    fn rejects_invalid_registration(
        #[case] mutate: fn(&mut RegistrationForm),
        #[case] expected: ValidationError,
    ) {
        let mut f = form();
        mutate(&mut f);
        let err = Registration::try_from_form(f).expect_err("invalid form must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t ")]
    fn blank_comment_text_is_rejected(#[case] text: &str) {
        assert_eq!(CommentText::parse(text), Err(ValidationError::EmptyComment));
    }

    #[test]
    fn comment_text_keeps_raw_text_and_offers_trimmed() {
        let text = CommentText::parse("  hi ").expect("not blank");
        assert_eq!(text.as_str(), "  hi ");
        assert_eq!(text.trimmed(), "hi");
    }

    #[rstest]
    #[case("image/jpeg")]
    #[case("image/png")]
    #[case("IMAGE/GIF")]
    #[case("image/webp")]
    fn accepts_allowed_image_types(#[case] mime: &str) {
        let upload = ImageUpload::try_new(vec![1, 2, 3], mime, 10).expect("allowed type");
        assert!(extension_for(upload.mime_type()).is_some());
    }

    #[test]
    fn rejects_disallowed_image_type() {
        let err = ImageUpload::try_new(vec![1], "application/pdf", 10).expect_err("pdf rejected");
        assert_eq!(err, ValidationError::UnsupportedImageType("application/pdf".into()));
    }

    #[test]
    fn rejects_oversized_and_empty_uploads() {
        let err = ImageUpload::try_new(vec![0; 11], "image/png", 10).expect_err("too large");
        assert_eq!(err, ValidationError::ImageTooLarge { size: 11, limit: 10 });
        let err = ImageUpload::try_new(Vec::new(), "image/png", 10).expect_err("empty");
        assert_eq!(err, ValidationError::EmptyUpload);
    }

    #[test]
    fn login_requires_both_parts() {
        assert!(LoginCredentials::try_from_parts("", "p").is_err());
        assert!(LoginCredentials::try_from_parts("alice", "").is_err());
        assert!(LoginCredentials::try_from_parts("alice", "p").is_ok());
    }
}
