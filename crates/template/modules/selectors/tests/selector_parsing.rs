use template_selectors::{CssSelector, ParseError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn parses_element_classes_and_attributes() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("div.foo.bar[baz=qux]")?;
    assert_eq!(selectors.len(), 1);
    let selector = &selectors[0];
    assert_eq!(selector.element(), Some("div"));
    assert_eq!(selector.class_names(), ["foo", "bar"]);
    assert_eq!(selector.attr_tokens().collect::<Vec<_>>(), ["baz", "qux"]);
    assert!(selector.not_selectors().is_empty());
    Ok(())
}

#[test]
fn splits_on_top_level_commas() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("di,v")?;
    let elements: Vec<_> = selectors.iter().map(CssSelector::element).collect();
    assert_eq!(elements, [Some("di"), Some("v")]);

    let spaced = CssSelector::parse("a.x ,  [b] ,c")?;
    let rendered: Vec<_> = spaced.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["a.x", "[b]", "c"]);
    Ok(())
}

#[test]
fn lowercases_classes_and_attribute_values_only() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("myComp.Foo[someAttr=SomeValue]")?;
    let selector = &selectors[0];
    assert_eq!(selector.element(), Some("myComp"));
    assert_eq!(selector.class_names(), ["foo"]);
    assert_eq!(
        selector.attrs(),
        [("someAttr".to_owned(), "somevalue".to_owned())]
    );
    Ok(())
}

#[test]
fn attribute_without_value_is_empty() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("[disabled][role=]")?;
    assert_eq!(
        selectors[0].attr_tokens().collect::<Vec<_>>(),
        ["disabled", "", "role", ""]
    );
    Ok(())
}

#[test]
fn only_negation_becomes_wildcard() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse(":not(div)")?;
    assert_eq!(selectors.len(), 1);
    let selector = &selectors[0];
    assert_eq!(selector.element(), Some("*"));
    assert_eq!(selector.not_selectors().len(), 1);
    assert_eq!(selector.not_selectors()[0].element(), Some("div"));
    assert_eq!(selector.to_string(), "*:not(div)");
    Ok(())
}

#[test]
fn wildcard_next_to_other_tokens_is_dropped() -> anyhow::Result<()> {
    init_logging();
    let rendered: Vec<_> = CssSelector::parse("*.foo, *[x], *.foo:not(.bar), *")?
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(rendered, [".foo", "[x]", ".foo:not(.bar)", "*"]);

    // Inside a negation `*` narrows nothing, so the clause is empty.
    let selectors = CssSelector::parse("div:not(*), span:not(*")?;
    for selector in &selectors {
        assert_eq!(selector.not_selectors(), [CssSelector::new()]);
    }
    assert_eq!(selectors[0].to_string(), "div:not()");
    Ok(())
}

#[test]
fn negation_applies_to_its_own_selector() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("input:not([type=hidden]):not(.ghost).field")?;
    let selector = &selectors[0];
    assert_eq!(selector.element(), Some("input"));
    assert_eq!(selector.class_names(), ["field"]);
    assert_eq!(selector.not_selectors().len(), 2);
    assert_eq!(selector.to_string(), "input.field:not([type=hidden]):not(.ghost)");
    Ok(())
}

#[test]
fn unclosed_negation_is_kept() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("p:not(.a")?;
    assert_eq!(selectors[0].to_string(), "p:not(.a)");
    Ok(())
}

#[test]
fn nested_negation_is_rejected() {
    init_logging();
    assert_eq!(
        CssSelector::parse(":not(:not(div))"),
        Err(ParseError::NestedNot)
    );
}

#[test]
fn comma_inside_negation_is_rejected() {
    init_logging();
    assert_eq!(
        CssSelector::parse("div:not(a, b)"),
        Err(ParseError::MultipleNotSelectors)
    );
}

#[test]
fn empty_input_yields_one_empty_selector() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("")?;
    assert_eq!(selectors, [CssSelector::new()]);
    Ok(())
}

#[test]
fn display_reparses_to_same_structure() -> anyhow::Result<()> {
    init_logging();
    for text in [
        "div",
        "*",
        ".a.b",
        "[x][y=z]",
        "my-el.Cls[data-Id=7]:not(.off)",
        ":not([hidden])",
        "a, b.c, [d=e]",
    ] {
        for selector in CssSelector::parse(text)? {
            let reparsed = CssSelector::parse(&selector.to_string())?;
            assert_eq!(reparsed, [selector], "round trip of {text:?}");
        }
    }
    Ok(())
}

#[test]
fn element_templates() -> anyhow::Result<()> {
    init_logging();
    let selectors = CssSelector::parse("button.primary.large[type=submit][disabled], .card")?;
    assert_eq!(
        selectors[0].matching_element_template(),
        r#"<button class="primary large" type="submit" disabled></button>"#
    );
    assert_eq!(
        selectors[1].matching_element_template(),
        r#"<div class="card"></div>"#
    );
    assert!(CssSelector::parse("span")?[0].is_element_selector());
    assert!(!CssSelector::parse("span.x")?[0].is_element_selector());
    Ok(())
}
