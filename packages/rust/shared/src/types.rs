//! Core domain types: country reference records and generation input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of the fallback record used for any unsupported country.
pub const OTHER_COUNTRY: &str = "Other";

// ---------------------------------------------------------------------------
// CountryRecord
// ---------------------------------------------------------------------------

/// Static reference bundle of education-system facts for one country.
///
/// Every optional collection defaults to empty, so renderers only ever have
/// to ask "is this sequence empty".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Lookup key (`"China"`, `"Japan"`, `"Other"`, ...).
    pub key: String,
    /// Country name in the local language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    /// Display name of the language(s) used for local searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_language: Option<String>,
    /// Free-text caution strings, in display order.
    #[serde(default)]
    pub warnings: Vec<String>,
    pub education_system: EducationSystem,
    #[serde(default)]
    pub search_queries: SearchQueries,
    /// Named school-type buckets, in record order.
    #[serde(default)]
    pub school_types: Vec<SchoolTypeBucket>,
    #[serde(default)]
    pub official_sources: Vec<OfficialSource>,
    #[serde(default)]
    pub eligibility_notes: Vec<EligibilityNote>,
    #[serde(default)]
    pub special_cases: Vec<SpecialCase>,
    #[serde(default)]
    pub vocabulary_reference: Vec<VocabularyEntry>,
}

impl CountryRecord {
    /// Whether this is the generic fallback record.
    pub fn is_fallback(&self) -> bool {
        self.key == OTHER_COUNTRY
    }

    /// Find a school-type bucket by name.
    pub fn school_type_bucket(&self, name: &str) -> Option<&SchoolTypeBucket> {
        self.school_types.iter().find(|b| b.name == name)
    }

    /// Find the eligibility note for a category.
    pub fn eligibility_note(&self, category: &str) -> Option<&str> {
        self.eligibility_notes
            .iter()
            .find(|n| n.category == category)
            .map(|n| n.text.as_str())
    }
}

/// Shape of a country's school system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationSystem {
    pub total_years: TotalYears,
    pub structure: String,
    /// Local term for "high school".
    pub high_school_name: String,
    pub graduation_month: String,
    pub academic_calendar: String,
}

/// Total years of schooling: a number, or a description when it varies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalYears {
    Years(u32),
    Described(String),
}

impl fmt::Display for TotalYears {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Years(n) => write!(f, "{n}"),
            Self::Described(text) => f.write_str(text),
        }
    }
}

/// Query templates for the search-strategy section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQueries {
    /// English templates with `[School Name]`, `[City]` and `[Country]` tokens.
    #[serde(default)]
    pub english: Vec<String>,
    /// Already-localized templates, rendered verbatim.
    #[serde(default)]
    pub local: Vec<String>,
}

/// A named group of school categories (`academic`, `vocational`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolTypeBucket {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<String>,
}

impl SchoolTypeBucket {
    /// Heading shown above the bucket's entries.
    pub fn label(&self) -> String {
        match self.name.as_str() {
            "academic" => "Academic (Generally Standard A Eligible)".to_string(),
            "vocational" => "Vocational (Requires Review or NOT Eligible)".to_string(),
            "international" => "International".to_string(),
            other => humanize_key(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialSource {
    pub name: String,
    pub url: String,
}

/// Eligibility guidance for one category (`standardA`, `vocationalWarning`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityNote {
    pub category: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCase {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
}

/// One row of the vocabulary table. `romanization` is `"-"` when not applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub english: String,
    pub local: String,
    pub romanization: String,
}

/// Turn a camelCase data key into a title: `reviewRequired` -> `Review Required`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Label dictionaries
// ---------------------------------------------------------------------------

/// Why the school is being researched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    New,
    Update,
    Verify,
}

impl Purpose {
    /// Strict parse used by input validation.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "new" => Some(Self::New),
            "update" => Some(Self::Update),
            "verify" => Some(Self::Verify),
            _ => None,
        }
    }

    /// Total parse: unrecognized tags fall back to [`Purpose::New`].
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Update => "update",
            Self::Verify => "verify",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::New => "New School Registration",
            Self::Update => "Information Update",
            Self::Verify => "Eligibility Verification",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::New => {
                "Collect comprehensive information for initial database entry. \
                 Verify all core fields and determine eligibility standard."
            }
            Self::Update => {
                "Update existing school record with current information. \
                 Verify contact details, accreditation status, and any changes to programs."
            }
            Self::Verify => {
                "Confirm school credentials and determine applicable Ritsumeikan entrance \
                 eligibility standard (A, B, C, D, etc.). Focus on accreditation and program \
                 verification."
            }
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// School funding/type tag. Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchoolType {
    Public,
    Private,
    International,
    Other(String),
}

impl SchoolType {
    pub fn label(&self) -> &str {
        match self {
            Self::Public => "Public (公立)",
            Self::Private => "Private (私立)",
            Self::International => "International School",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for SchoolType {
    fn from(tag: &str) -> Self {
        match tag {
            "Public" => Self::Public,
            "Private" => Self::Private,
            "International" => Self::International,
            raw => Self::Other(raw.to_string()),
        }
    }
}

/// Curriculum tag. Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Curriculum {
    Ib,
    ALevel,
    Ap,
    National,
    Unknown,
    Other(String),
}

impl Curriculum {
    pub fn label(&self) -> &str {
        match self {
            Self::Ib => "International Baccalaureate (IB)",
            Self::ALevel => "A-Level / Cambridge",
            Self::Ap => "Advanced Placement (AP)",
            Self::National => "National Curriculum",
            Self::Unknown => "Unknown",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Curriculum {
    fn from(tag: &str) -> Self {
        match tag {
            "IB" => Self::Ib,
            "A-Level" => Self::ALevel,
            "AP" => Self::Ap,
            "National" => Self::National,
            "Unknown" => Self::Unknown,
            raw => Self::Other(raw.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// InputRecord
// ---------------------------------------------------------------------------

/// Validated parameters for one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub school_name: String,
    /// A reference-table key, or [`OTHER_COUNTRY`].
    pub country: String,
    /// Free-text country name, used when `country` is [`OTHER_COUNTRY`].
    pub other_country: Option<String>,
    pub city_state: Option<String>,
    pub school_type: Option<SchoolType>,
    pub curriculum: Vec<Curriculum>,
    pub purpose: Purpose,
    pub include_local_search: bool,
    /// Comma-separated extra URLs, as entered.
    pub additional_urls: Option<String>,
}

impl InputRecord {
    /// A minimal record; the remaining fields take their defaults.
    pub fn new(school_name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            school_name: school_name.into(),
            country: country.into(),
            other_country: None,
            city_state: None,
            school_type: None,
            curriculum: Vec::new(),
            purpose: Purpose::default(),
            include_local_search: false,
            additional_urls: None,
        }
    }

    /// Country name shown in the prompt: the free-text name for `"Other"`.
    pub fn resolved_country(&self) -> &str {
        if self.country == OTHER_COUNTRY {
            self.other_country.as_deref().unwrap_or(OTHER_COUNTRY)
        } else {
            &self.country
        }
    }

    /// Extra URLs, split and trimmed, with empty entries dropped.
    pub fn extra_urls(&self) -> Vec<&str> {
        self.additional_urls
            .as_deref()
            .map(split_url_list)
            .unwrap_or_default()
    }
}

/// Split a comma-separated URL list, trimming entries and dropping empties.
pub fn split_url_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .collect()
}
