//! Research prompt assembler.
//!
//! Renders an [`InputRecord`] and its [`CountryRecord`] into one Markdown
//! document made of nine sections, always in the same order:
//!
//! ```text
//! 1. role preamble          6. search strategy
//! 2. school to investigate  7. official sources
//! 3. investigation purpose  8. output format
//! 4. education context*     9. important notes
//! 5. required information
//! ```
//!
//! (*) only for supported countries, never for the `"Other"` fallback.
//!
//! Assembly is pure: same inputs, byte-identical output, no I/O, no errors.
//! Sections backed by empty data degrade to nothing rather than failing.

use tracing::{debug, instrument};

use schoolprompt_shared::{
    CountryRecord, InputRecord, Purpose, SchoolTypeBucket, TotalYears, humanize_key,
};

use crate::reference::ReferenceTable;

/// Marker prefixed to each country warning.
pub const WARNING_ICON: &str = "⚠️";

/// Substituted for `[City]` when no city was given.
const CITY_PLACEHOLDER: &str = "[City]";

/// Eligibility categories rendered first, in this order, with these labels.
const ELIGIBILITY_CATEGORIES: [(&str, &str); 5] = [
    ("standardA", "Standard A"),
    ("standardB", "Standard B"),
    ("standardD", "Standard D"),
    ("standardI", "Standard I"),
    ("vocationalWarning", "⚠️ Vocational"),
];

/// School-type buckets rendered before all others.
const LEADING_BUCKETS: [&str; 2] = ["academic", "vocational"];

// ---------------------------------------------------------------------------
// Accreditation bodies
// ---------------------------------------------------------------------------

/// An organization whose directory is searched during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccreditationBody {
    pub name: &'static str,
    pub url: &'static str,
    /// "Accreditation", or a note that the body only grants membership.
    pub kind: &'static str,
}

/// Directories checked for every country.
pub const ACCREDITATION_BODIES: [AccreditationBody; 6] = [
    AccreditationBody {
        name: "WASC",
        url: "https://www.acswasc.org/wasc/schools-directory/",
        kind: "Accreditation",
    },
    AccreditationBody {
        name: "NEASC/ACE",
        url: "https://www.aceisglobal.org/",
        kind: "Accreditation",
    },
    AccreditationBody {
        name: "Cognia",
        url: "https://www.cognia.org/institutions/",
        kind: "Accreditation",
    },
    AccreditationBody {
        name: "CIS",
        url: "https://www.cis.org/find-a-cis-school",
        kind: "Accreditation",
    },
    AccreditationBody {
        name: "ACSI",
        url: "https://www.acsi.org/school-services/accreditation",
        kind: "Accreditation",
    },
    AccreditationBody {
        name: "COBIS",
        url: "https://www.cobis.org.uk/membership/our-members",
        kind: "Membership (NOT Accreditation)",
    },
];

/// Membership is not accreditation.
pub const ACCREDITATION_NOTE: &str = "COBIS is primarily a MEMBERSHIP organization, not \
     accreditation. COBIS membership alone does NOT qualify for Standard B.";

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Assembles prompts against a reference table.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler<'a> {
    table: &'a ReferenceTable,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self { table }
    }

    /// Look up the input's country and render the full prompt.
    #[instrument(skip_all, fields(country = %input.country, purpose = %input.purpose))]
    pub fn assemble(&self, input: &InputRecord) -> String {
        let record = self.table.lookup(&input.country);
        let prompt = build_prompt(input, record);

        debug!(
            record = %record.key,
            fallback = record.is_fallback(),
            len = prompt.len(),
            "prompt assembled"
        );

        prompt
    }
}

/// Render the complete prompt for `input` using `country`'s reference data.
pub fn build_prompt(input: &InputRecord, country: &CountryRecord) -> String {
    let resolved = input.resolved_country();
    let mut prompt = String::with_capacity(8 * 1024);

    prompt.push_str(&role_section(resolved, country));
    prompt.push_str(&school_section(input));
    prompt.push_str(&purpose_section(input.purpose));
    if !country.is_fallback() {
        prompt.push_str(&education_context_section(country));
    }
    prompt.push_str(REQUIRED_INFO_SECTION);
    prompt.push_str(&search_strategy_section(input, country));
    prompt.push_str(&sources_section(country, &input.extra_urls()));
    prompt.push_str(OUTPUT_FORMAT_SECTION);
    prompt.push_str(&warnings_section(country));

    prompt
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// 1. Who the researcher is and what the task is.
pub fn role_section(country_name: &str, country: &CountryRecord) -> String {
    let mut section =
        String::from("You are an expert researcher specializing in international education systems");

    match country.local_name.as_deref() {
        Some(local) => section.push_str(&format!(
            ", with particular expertise in the {country_name} ({local}) education system"
        )),
        None => section.push_str(&format!(", conducting research on schools in {country_name}")),
    }

    section.push_str(
        ". Your task is to investigate and collect comprehensive information about a high \
         school for university admissions records at Ritsumeikan University, Japan.\n\n",
    );
    section
}

/// 2. The school being researched.
pub fn school_section(input: &InputRecord) -> String {
    let mut section = String::from("## School to Investigate\n\n");
    section.push_str(&format!("- **School Name:** {}\n", input.school_name));
    section.push_str(&format!("- **Country:** {}\n", input.resolved_country()));

    if let Some(city) = input.city_state.as_deref().filter(|c| !c.is_empty()) {
        section.push_str(&format!("- **City/State/Province:** {city}\n"));
    }

    if let Some(school_type) = &input.school_type {
        section.push_str(&format!(
            "- **School Type (if known):** {}\n",
            school_type.label()
        ));
    }

    if !input.curriculum.is_empty() {
        let curricula = input
            .curriculum
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ");
        section.push_str(&format!("- **Curriculum (if known):** {curricula}\n"));
    }

    section.push('\n');
    section
}

/// 3. Why the school is being researched.
pub fn purpose_section(purpose: Purpose) -> String {
    format!(
        "## Investigation Purpose\n\n**{}**\n\n{}\n\n",
        purpose.title(),
        purpose.description()
    )
}

/// 4. The country's school system and school categories.
pub fn education_context_section(country: &CountryRecord) -> String {
    let edu = &country.education_system;

    let mut section = String::from("## ");
    if let Some(local) = country.local_name.as_deref() {
        section.push_str(&format!("{local} / "));
    }
    section.push_str("Education System Context\n\n");

    section.push_str("### Education Structure\n");
    section.push_str(&format!("- **Total Years:** {}\n", total_years_text(country)));
    section.push_str(&format!("- **Structure:** {}\n", edu.structure));
    section.push_str(&format!("- **High School Term:** {}\n", edu.high_school_name));
    section.push_str(&format!("- **Graduation Month:** {}\n", edu.graduation_month));
    section.push_str(&format!("- **Academic Calendar:** {}\n\n", edu.academic_calendar));

    let buckets = ordered_school_types(country);
    if !buckets.is_empty() {
        section.push_str("### School Types\n\n");
        for bucket in buckets {
            section.push_str(&format!("**{}:**\n", bucket.label()));
            for entry in &bucket.entries {
                section.push_str(&format!("- {entry}\n"));
            }
            section.push('\n');
        }
    }

    section
}

/// 5. Fields to collect, by priority. Identical for every input.
pub const REQUIRED_INFO_SECTION: &str = "\
## Required Information to Collect

### Priority 1 (必須 - Critical for Eligibility)
| Field | Description |
|-------|-------------|
| SchoolName_EN | Official English name |
| SchoolName_Local | Name in local language |
| Country | Country name |
| YearsOfEducation | Total years in education system (e.g., 12) |
| SchoolCategory | Academic / Vocational / International |
| SchoolType | High School, Secondary School, etc. |
| Curricula | National, IB, A-Level, AP, etc. |

### Priority 2 (重要 - Supports Assessment)
| Field | Description |
|-------|-------------|
| PublicPrivate | Public or Private |
| Accreditation | WASC, CIS, Cognia, etc. |
| DiplomaExams | National exams, SAT, AP exams, etc. |
| DiplomaIssued | Name of diploma/certificate issued |
| State_EN / City_EN | Location details |
| URL | Official website |

### Priority 3 (補足 - When Available)
| Field | Description |
|-------|-------------|
| Address_EN | Full address |
| Phone / Email | Contact information |
| Founded | Year established |
| TotalStudents | Enrollment |
| Coed | Coeducational / Boys / Girls |

";

/// 6. Search queries and accreditation directories.
pub fn search_strategy_section(input: &InputRecord, country: &CountryRecord) -> String {
    let city = input
        .city_state
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(CITY_PLACEHOLDER);
    let country_name = input.resolved_country();

    let mut section = String::from("## Search Strategy\n\n");

    section.push_str("### English Searches\n```\n");
    for query in &country.search_queries.english {
        section.push_str(&fill_query(query, &input.school_name, city, country_name));
        section.push('\n');
    }
    section.push_str("```\n\n");

    if input.include_local_search && !country.search_queries.local.is_empty() {
        let language = country.local_language.as_deref().unwrap_or("Local Language");
        section.push_str(&format!("### {language} Searches\n```\n"));
        for query in &country.search_queries.local {
            section.push_str(query);
            section.push('\n');
        }
        section.push_str("```\n");
        section.push_str(
            "*Replace [学校名]/[학교명]/[tên trường] with the school name in local language \
             if known.*\n\n",
        );
    }

    section.push_str("### Accreditation Verification\n");
    section.push_str("Search these databases to verify international accreditation:\n");
    for body in &ACCREDITATION_BODIES {
        section.push_str(&format!("- **{}** ({}): {}\n", body.name, body.kind, body.url));
    }
    section.push_str(&format!("\n{WARNING_ICON} **Note:** {ACCREDITATION_NOTE}\n\n"));

    section
}

/// 7. Official sources plus any user-supplied URLs.
pub fn sources_section(country: &CountryRecord, extra_urls: &[&str]) -> String {
    let mut section = String::from("## Official Sources to Check\n\n");

    for source in &country.official_sources {
        section.push_str(&format!("- **{}:** {}\n", source.name, source.url));
    }

    if !extra_urls.is_empty() {
        section.push_str("\n### Additional URLs to Check\n");
        for url in extra_urls {
            section.push_str(&format!("- {url}\n"));
        }
    }

    section.push('\n');
    section
}

/// 8. The result template the researcher fills in. Identical for every input.
pub const OUTPUT_FORMAT_SECTION: &str = "\
## Output Format

Provide your findings in the following structured format:

```
## School Investigation Results

### Basic Information
| Field | Value | Source URL |
|-------|-------|------------|
| SchoolName_EN | | |
| SchoolName_Local | | |
| Country | | |
| State/Province | | |
| City | | |
| Address | | |
| Phone | | |
| Email | | |
| Website | | |

### School Classification
| Field | Value |
|-------|-------|
| SchoolType | |
| PublicPrivate | |
| SchoolCategory | Academic / Vocational / International |
| Founded | |
| Coed | |

### Academic Program
| Field | Value |
|-------|-------|
| YearsOfEducation | |
| Curricula | |
| DiplomaExams | |
| DiplomaIssued | |
| GraduationMonth | |

### Accreditation Status
| Organization | Status | Verification Source |
|--------------|--------|---------------------|
| WASC | Found / Not Found | |
| CIS | Found / Not Found | |
| Cognia | Found / Not Found | |
| NEASC | Found / Not Found | |
| ACSI | Found / Not Found | |
| IBO (IB) | Found / Not Found | |

### Eligibility Assessment
- **Recommended Standard:** Standard A / B / D / Requires Review
- **Confidence Level:** High / Medium / Low
- **Reasoning:** [Explanation]

### Notes and Concerns
[Any issues, missing information, or recommendations]

### Sources Used
1. [URL] - [What was found]
2. [URL] - [What was found]
```

";

/// 9. Warnings, eligibility notes, special cases, vocabulary.
pub fn warnings_section(country: &CountryRecord) -> String {
    let mut section = String::from("## Important Notes\n\n");

    for warning in &country.warnings {
        if warning.starts_with(WARNING_ICON) {
            section.push_str(warning);
        } else {
            section.push_str(&format!("{WARNING_ICON} {warning}"));
        }
        section.push_str("\n\n");
    }

    let notes = ordered_eligibility_notes(country);
    if !notes.is_empty() {
        section.push_str("### Eligibility Guidelines\n\n");
        for (label, text) in notes {
            section.push_str(&format!("- **{label}:** {text}\n"));
        }
        section.push('\n');
    }

    if !country.special_cases.is_empty() {
        section.push_str("### Special Cases\n\n");
        for case in &country.special_cases {
            section.push_str(&format!("**{}:**\n{}\n", case.kind, case.description));
            if let Some(identification) = &case.identification {
                section.push_str(&format!("*Identification:* {identification}\n"));
            }
            if let Some(examples) = &case.examples {
                section.push_str(&format!("*Examples:* {examples}\n"));
            }
            section.push('\n');
        }
    }

    if !country.vocabulary_reference.is_empty() {
        section.push_str("### Key Vocabulary Reference\n\n");
        section.push_str("| English | Local | Romanization |\n");
        section.push_str("|---------|-------|---------------|\n");
        for vocab in &country.vocabulary_reference {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                vocab.english, vocab.local, vocab.romanization
            ));
        }
        section.push('\n');
    }

    section
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Substitute the English query tokens in one pass. Every occurrence is
/// replaced; inserted values are copied literally and never rescanned.
fn fill_query(template: &str, school_name: &str, city: &str, country_name: &str) -> String {
    let tokens = [
        ("[School Name]", school_name),
        ("[City]", city),
        ("[Country]", country_name),
    ];

    let mut filled = String::with_capacity(template.len() + school_name.len());
    let mut rest = template;

    loop {
        let next = tokens
            .iter()
            .filter_map(|&(token, value)| rest.find(token).map(|pos| (pos, token, value)))
            .min_by_key(|&(pos, _, _)| pos);
        let Some((pos, token, value)) = next else {
            break;
        };

        filled.push_str(&rest[..pos]);
        filled.push_str(value);
        rest = &rest[pos + token.len()..];
    }

    filled.push_str(rest);
    filled
}

fn total_years_text(country: &CountryRecord) -> String {
    match &country.education_system.total_years {
        TotalYears::Years(n) => format!("{n} years"),
        TotalYears::Described(text) => text.clone(),
    }
}

/// Non-empty buckets: academic, vocational, then the rest in record order.
fn ordered_school_types(country: &CountryRecord) -> Vec<&SchoolTypeBucket> {
    let leading = LEADING_BUCKETS
        .iter()
        .filter_map(|name| country.school_type_bucket(name));
    let rest = country
        .school_types
        .iter()
        .filter(|b| !LEADING_BUCKETS.contains(&b.name.as_str()));

    leading.chain(rest).filter(|b| !b.entries.is_empty()).collect()
}

/// `(label, text)` pairs: known categories in fixed order, then the rest.
fn ordered_eligibility_notes(country: &CountryRecord) -> Vec<(String, &str)> {
    let known = ELIGIBILITY_CATEGORIES.iter().filter_map(|(category, label)| {
        country
            .eligibility_note(category)
            .map(|text| ((*label).to_string(), text))
    });
    let rest = country
        .eligibility_notes
        .iter()
        .filter(|n| !ELIGIBILITY_CATEGORIES.iter().any(|(c, _)| *c == n.category))
        .map(|n| (humanize_key(&n.category), n.text.as_str()));

    known.chain(rest).filter(|(_, text)| !text.is_empty()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
