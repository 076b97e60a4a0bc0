use l10nkit::formats::FormatType;
use l10nkit::types::{Entry, Resource};
use l10nkit::{FormatHandler, FormatRegistry};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9]{0,15}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9]([A-Za-z0-9 _\\-\\.,!\\?]{0,28}[A-Za-z0-9])?")
        .expect("valid value regex")
}

/// Lines separated by one or two newlines, so values carry embedded blank lines.
fn multiline_value_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((value_strategy(), 1usize..3), 1..4).prop_map(|parts| {
        let mut value = String::new();
        for (i, (line, gap)) in parts.iter().enumerate() {
            if i > 0 {
                value.push_str(&"\n".repeat(*gap));
            }
            value.push_str(line);
        }
        value
    })
}

fn dataset_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 1..8)
}

fn values_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(value_strategy(), 1..8)
}

fn build_resource(format: FormatType, pairs: &[(String, String)]) -> Resource {
    Resource::new(
        format!("seed.en.{}", format.extension()),
        Some("en".to_string()),
        format.id(),
        pairs
            .iter()
            .map(|(k, v)| Entry::text_entry(k.clone(), v.clone()))
            .collect(),
    )
}

fn roundtrip(format: FormatType, pairs: &[(String, String)]) -> Result<BTreeMap<String, String>, TestCaseError> {
    let handler = format.handler();
    let written = handler
        .write_to_string(&build_resource(format, pairs))
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let parsed = handler
        .parse(&written, None)
        .map_err(|e| TestCaseError::fail(format!("{}\n---\n{}", e, written)))?;
    Ok(parsed
        .entries
        .iter()
        .map(|e| (e.key.clone(), e.text().to_string()))
        .collect())
}

fn as_map(pairs: &[(String, String)]) -> BTreeMap<String, String> {
    pairs.iter().cloned().collect()
}

fn flat(values: &BTreeMap<String, String>) -> Vec<(String, String)> {
    values.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn nested(values: &BTreeMap<String, String>) -> Vec<(String, String)> {
    values
        .iter()
        .enumerate()
        .map(|(i, (k, v))| (format!("group{}.{}", i % 2, k), v.clone()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn json_family_roundtrip_preserves_nested_keys(values in dataset_strategy()) {
        for format in [FormatType::Json, FormatType::I18next, FormatType::Yaml] {
            let pairs = nested(&values);
            prop_assert_eq!(roundtrip(format, &pairs)?, as_map(&pairs), "{}", format);
        }
    }

    #[test]
    fn keyed_formats_roundtrip_preserves_entries(values in dataset_strategy()) {
        for format in [FormatType::Po, FormatType::Xliff, FormatType::Csv, FormatType::Ftl, FormatType::Vtt] {
            let pairs = flat(&values);
            prop_assert_eq!(roundtrip(format, &pairs)?, as_map(&pairs), "{}", format);
        }
    }

    #[test]
    fn ftl_roundtrip_keeps_blank_lines_inside_values(
        values in prop::collection::btree_map(key_strategy(), multiline_value_strategy(), 1..6)
    ) {
        let pairs = flat(&values);
        prop_assert_eq!(roundtrip(FormatType::Ftl, &pairs)?, as_map(&pairs));
    }

    #[test]
    fn resx_roundtrip_maps_dots_through_underscores(values in dataset_strategy()) {
        let pairs = nested(&values);
        let handler = FormatType::Resx.handler();
        let written = handler
            .write_to_string(&build_resource(FormatType::Resx, &pairs))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(written.contains("group0_"));
        prop_assert_eq!(roundtrip(FormatType::Resx, &pairs)?, as_map(&pairs));
    }

    #[test]
    fn srt_roundtrip_preserves_cue_text(values in values_strategy()) {
        let pairs: Vec<(String, String)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), v.clone()))
            .collect();
        prop_assert_eq!(roundtrip(FormatType::Srt, &pairs)?, as_map(&pairs));
    }

    #[test]
    fn conversion_through_registry_preserves_pairs(values in dataset_strategy()) {
        let tmp = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let registry = FormatRegistry::default();
        let pairs = flat(&values);

        let seed = tmp.path().join("seed.en.json");
        FormatType::Json
            .handler()
            .write_to(&build_resource(FormatType::Json, &pairs), &seed)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mut previous = seed;
        for format in [FormatType::Po, FormatType::Xliff, FormatType::Yaml, FormatType::Csv] {
            let next = tmp.path().join(format!("seed.en.{}", format.extension()));
            l10nkit::Converter::new(&registry)
                .convert(&previous, &next, &l10nkit::ConvertOptions::new())
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            previous = next;
        }

        let back = registry
            .read_file(&previous)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let map: BTreeMap<String, String> = back
            .entries
            .iter()
            .map(|e| (e.key.clone(), e.text().to_string()))
            .collect();
        prop_assert_eq!(map, values);
    }
}

#[test]
fn read_only_vb_is_rejected_for_write() {
    let handler = FormatType::Vb.handler();
    assert!(!handler.is_writable());
    let resource = build_resource(FormatType::Vb, &[("a".to_string(), "b".to_string())]);
    assert!(handler.write_to_string(&resource).is_err());
}
