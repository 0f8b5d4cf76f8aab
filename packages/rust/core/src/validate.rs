//! Form validation: raw command-line values into an [`InputRecord`].
//!
//! Every rule is checked and all failures are reported together, each with
//! a bilingual (Japanese / English) message.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use schoolprompt_shared::{
    Curriculum, InputRecord, OTHER_COUNTRY, Purpose, SchoolPromptError, SchoolType,
    split_url_list,
};

use crate::reference::ReferenceTable;

const SCHOOL_NAME_MIN: usize = 2;
const SCHOOL_NAME_MAX: usize = 200;
const COUNTRY_NAME_MIN: usize = 2;

const MSG_SCHOOL_NAME_REQUIRED: &str = "高校名を入力してください / Please enter school name";
const MSG_SCHOOL_NAME_SHORT: &str = "高校名は2文字以上 / School name: 2+ characters required";
const MSG_SCHOOL_NAME_LONG: &str = "高校名は200文字以内 / School name: max 200 characters";
const MSG_COUNTRY_REQUIRED: &str = "所在国を選択してください / Please select a country";
const MSG_COUNTRY_UNSUPPORTED: &str =
    "対応していない国です。Otherを選択してください / Unsupported country, choose Other";
const MSG_OTHER_COUNTRY_REQUIRED: &str =
    "その他の国名を入力してください / Please enter country name";
const MSG_OTHER_COUNTRY_SHORT: &str = "国名は2文字以上 / Country name: 2+ characters required";
const MSG_PURPOSE_REQUIRED: &str =
    "調査目的を選択してください / Please select a research purpose";
const MSG_URL_SCHEME: &str =
    "URLはhttp://またはhttps://形式で / URL must start with http:// or https://";

/// Form values exactly as entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawForm {
    pub school_name: String,
    pub country: String,
    pub other_country: String,
    pub city_state: String,
    pub school_type: String,
    pub curriculum: Vec<String>,
    pub purpose: String,
    pub include_local_search: bool,
    pub additional_urls: String,
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All failed rules for one form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` has at least one error.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for SchoolPromptError {
    fn from(errors: ValidationErrors) -> Self {
        SchoolPromptError::validation(errors.to_string())
    }
}

/// Check every rule and build the [`InputRecord`], or return all failures.
pub fn validate(
    form: &RawForm,
    table: &ReferenceTable,
) -> std::result::Result<InputRecord, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let school_name = form.school_name.trim();
    match school_name.chars().count() {
        0 => errors.push("school_name", MSG_SCHOOL_NAME_REQUIRED),
        n if n < SCHOOL_NAME_MIN => errors.push("school_name", MSG_SCHOOL_NAME_SHORT),
        n if n > SCHOOL_NAME_MAX => errors.push("school_name", MSG_SCHOOL_NAME_LONG),
        _ => {}
    }

    let country = form.country.trim();
    let other_country = form.other_country.trim();
    if country.is_empty() {
        errors.push("country", MSG_COUNTRY_REQUIRED);
    } else if country == OTHER_COUNTRY {
        match other_country.chars().count() {
            0 => errors.push("other_country", MSG_OTHER_COUNTRY_REQUIRED),
            n if n < COUNTRY_NAME_MIN => errors.push("other_country", MSG_OTHER_COUNTRY_SHORT),
            _ => {}
        }
    } else if !table.is_known(country) {
        errors.push("country", format!("{MSG_COUNTRY_UNSUPPORTED}: {country}"));
    }

    let purpose = Purpose::parse(form.purpose.trim());
    if purpose.is_none() {
        errors.push("purpose", MSG_PURPOSE_REQUIRED);
    }

    let urls = split_url_list(&form.additional_urls);
    for url in urls.iter().filter(|url| !is_http_url(url)) {
        errors.push("additional_urls", format!("{MSG_URL_SCHEME}: {url}"));
    }

    let Some(purpose) = purpose.filter(|_| errors.is_empty()) else {
        debug!(errors = errors.errors.len(), "form rejected");
        return Err(errors);
    };

    Ok(InputRecord {
        school_name: school_name.to_string(),
        country: country.to_string(),
        other_country: (country == OTHER_COUNTRY).then(|| other_country.to_string()),
        city_state: non_empty(&form.city_state),
        school_type: non_empty(&form.school_type).map(|t| SchoolType::from(t.as_str())),
        curriculum: form
            .curriculum
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(Curriculum::from)
            .collect(),
        purpose,
        include_local_search: form.include_local_search,
        additional_urls: (!urls.is_empty()).then(|| urls.join(", ")),
    })
}

/// Whether `url` starts with `http://` or `https://` (any case) and has more after it.
pub fn is_http_url(url: &str) -> bool {
    static HTTP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)^https?://.+").expect("valid regex"));

    HTTP_RE.is_match(url)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
