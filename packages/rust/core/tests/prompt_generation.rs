//! End-to-end generation: raw form through validation and assembly.

use schoolprompt_core::{PromptAssembler, RawForm, ReferenceTable, validate};

fn table() -> ReferenceTable {
    ReferenceTable::embedded().expect("embedded reference data")
}

fn form(country: &str) -> RawForm {
    RawForm {
        school_name: "Example High School".into(),
        country: country.into(),
        purpose: "new".into(),
        include_local_search: true,
        ..RawForm::default()
    }
}

#[test]
fn japan_form_generates_complete_prompt() {
    let table = table();
    let input = validate(
        &RawForm {
            city_state: "Tokyo".into(),
            curriculum: vec!["IB".into()],
            ..form("Japan")
        },
        &table,
    )
    .expect("valid form");

    let prompt = PromptAssembler::new(&table).assemble(&input);

    assert!(prompt.contains("Japan (日本)"));
    assert!(prompt.contains("## 日本 / Education System Context"));
    assert!(prompt.contains("### Japanese Searches"));
    assert!(prompt.contains("Example High School Japan high school"));
    assert!(prompt.contains("https://www.mext.go.jp/"));
    assert!(prompt.contains("International Baccalaureate (IB)"));
    for warning in &table.lookup("Japan").warnings {
        assert!(prompt.contains(warning.as_str()));
    }
}

#[test]
fn every_supported_country_generates() {
    let table = table();
    let assembler = PromptAssembler::new(&table);

    for key in table.known_keys() {
        let input = validate(&form(key), &table).expect("valid form");
        let prompt = assembler.assemble(&input);

        assert!(prompt.contains("Education System Context"), "{key}");
        assert!(prompt.contains(&format!("- **Country:** {key}\n")), "{key}");
        assert!(!prompt.contains("[School Name]"), "{key}");
        assert!(prompt.ends_with("\n\n"), "{key}");
    }
}

#[test]
fn other_country_uses_free_text_name() {
    let table = table();
    let input = validate(
        &RawForm {
            other_country: "France".into(),
            ..form("Other")
        },
        &table,
    )
    .expect("valid form");

    let prompt = PromptAssembler::new(&table).assemble(&input);
    assert!(prompt.contains("conducting research on schools in France"));
    assert!(prompt.contains("- **Country:** France\n"));
    assert!(!prompt.contains("Education System Context"));
    assert!(!prompt.contains("[Country]"));
}

#[test]
fn repeated_generation_is_byte_identical() {
    let table = table();
    let input = validate(&form("Korea"), &table).expect("valid form");
    let assembler = PromptAssembler::new(&table);
    assert_eq!(assembler.assemble(&input), assembler.assemble(&input));
}

#[test]
fn records_serialize_to_json() {
    let table = table();
    let value = serde_json::to_value(table.lookup("Korea")).expect("serialize record");

    assert_eq!(value["key"], "Korea");
    assert!(value["special_cases"][0]["type"].is_string());
    assert!(value["search_queries"]["english"].is_array());
}
