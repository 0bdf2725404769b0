use gearshift_markdown::{
    extract_headings, find_section, following_list, parse, BlockKind, Document, SectionQuery,
};
use gearshift_test_utils::fixtures::{LOGIN_FEATURE_DOC, SAMPLE_CONSTITUTION_DOC, SAMPLE_FEATURES_DOC};

#[test]
fn constitution_fixture_sections_are_addressable() {
    let nodes = parse(SAMPLE_CONSTITUTION_DOC).unwrap();

    for title in ["Purpose", "Core Values", "Technical Stack", "Code Quality", "Performance"] {
        assert!(
            find_section(&nodes, &SectionQuery::new(title)).is_some(),
            "missing section {}",
            title
        );
    }

    let values = find_section(&nodes, &SectionQuery::new("core values")).unwrap();
    assert_eq!(following_list(&nodes, values.index).len(), 4);
}

#[test]
fn features_fixture_has_three_level_two_features() {
    let doc = Document::parse("features.md", SAMPLE_FEATURES_DOC).unwrap();
    let features = doc.find_section(&SectionQuery::new("features")).unwrap();
    let names: Vec<_> = extract_headings(features.children, 2)
        .iter()
        .map(|n| n.text())
        .collect();
    assert_eq!(
        names,
        vec!["User Authentication", "Data Export", "Notifications", "Non-Functional Requirements"]
    );
}

#[test]
fn checkbox_syntax_survives_parsing() {
    let nodes = parse(LOGIN_FEATURE_DOC).unwrap();
    let items: Vec<_> = nodes
        .iter()
        .filter_map(|n| match &n.kind {
            BlockKind::ListItem { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(items, vec!["[x] Can submit credentials", "[ ] Can recover password"]);
}
