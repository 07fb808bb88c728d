// ABOUTME: End-to-end extraction tests across the HTML (CSS and XPath), JSON and compose loaders.
// ABOUTME: Exercises nested selection, JMESPath filters and compiled record specs.

use pretty_assertions::assert_eq;
use serde_json::json;
use sift_core::processors::{RegexFind, Split, Strip};
use sift_core::{Identity, JoinReducer, Pipeline, Value};
use sift_loader::{ComposeLoader, HtmlLoader, JsonLoader, RecordSpec, XPathLoader};

fn people() -> JsonLoader {
    JsonLoader::new(json!({
        "people": [
            {"first": "James", "last": "d"},
            {"missing": "1111"},
            {"first": "Jacob", "last": "e"},
            {"first": "Jayden", "last": "f"},
            {"missing": "different"}
        ],
        "foo": {"bar": "baz"},
        "bar": 1
    }))
}

#[test]
fn jmespath_filter_then_per_item_fields() {
    let loader = people();
    let items = loader.node("people[?keys(@)[?starts_with(@, 'first')]]");
    assert_eq!(items.len(), 3);

    let upper = |v: &Value| v.as_str().map(|s| Value::from(s.to_uppercase()));
    let rows: Vec<_> = items
        .iter()
        .map(|item| {
            (
                item.node("first").proc(&Pipeline::new().then(upper).reduce(Identity)),
                item.node("firsts").proc(&Pipeline::new()),
                item.node("last").proc(&Pipeline::new()),
                item.node("last").getall(),
            )
        })
        .collect();

    assert_eq!(
        rows[0],
        (
            Some(Value::list(["JAMES"])),
            None,
            Some(Value::from("d")),
            vec![json!("d")]
        )
    );
    assert_eq!(rows[2].0, Some(Value::list(["JAYDEN"])));
}

#[test]
fn jmespath_flatten_joined() {
    let joined = people()
        .node("people[][first, missing][]")
        .proc(&Pipeline::new().reduce(JoinReducer::new(" ")));
    assert_eq!(joined, Some(Value::from("James 1111 Jacob Jayden different")));
}

#[test]
fn jmespath_filter_with_quoted_literal() {
    let data = JsonLoader::new(json!({
        "data": [
            {"object": {"type": "question", "title": "q1"}},
            {"object": {"type": "answer", "title": "a1"}},
            {"object": {"type": "question", "title": "q2"}}
        ]
    }));
    let titles = data
        .node("data[?object.type=='question']")
        .node("object.title")
        .proc(&Pipeline::new().reduce(Identity));
    assert_eq!(titles, Some(Value::list(["q1", "q2"])));
}

const TABLE: &str = r#"
<table class="standard-table">
  <tbody>
    <tr><td> <span>rust</span> 1.75 </td><td>Mozilla Foundation</td><td>systems/web</td></tr>
    <tr><td> <span>go</span> 1.22 </td><td>Google</td><td>cloud</td></tr>
  </tbody>
</table>
"#;

#[test]
fn table_rows_with_different_reducers() {
    let page = HtmlLoader::parse(TABLE);
    let words = Pipeline::new().then(RegexFind::new(r"\S+").unwrap());
    let joined = Pipeline::new()
        .then(RegexFind::new(r"\S+").unwrap())
        .reduce(JoinReducer::new(" "));
    let parts = Pipeline::new().then(Split::new("/")).reduce(Identity);

    let rows: Vec<_> = page
        .css(".standard-table tbody tr")
        .iter()
        .map(|tr| {
            (
                tr.css("td:nth-child(1) ::text").proc(&words),
                tr.css("td:nth-child(2)::text").proc(&joined),
                tr.css("td:nth-child(3)::text").proc(&parts),
            )
        })
        .collect();

    assert_eq!(
        rows,
        vec![
            (
                Some(Value::from("rust")),
                Some(Value::from("Mozilla Foundation")),
                Some(Value::list(["systems", "web"])),
            ),
            (
                Some(Value::from("go")),
                Some(Value::from("Google")),
                Some(Value::list(["cloud"])),
            ),
        ]
    );
}

#[test]
fn compiled_record_over_html_and_json() {
    let spec = RecordSpec::from_json(
        r#"{
          "fields": {
            "lang": {"query": "td:nth-child(1) span::text"},
            "version": {
              "query": "td:nth-child(1)::text",
              "processors": [{"type": "strip"}, {"type": "to_float"}]
            },
            "tags": {
              "query": "td:nth-child(3)::text",
              "processors": [{"type": "split", "sep": "/"}],
              "reduce": {"type": "all_truthy"}
            },
            "missing": {"query": "td.nope::text"}
          }
        }"#,
    )
    .unwrap();
    spec.precompile_selectors();
    let record = spec.compile().unwrap();
    assert_eq!(record.len(), 4);

    let page = HtmlLoader::parse(TABLE);
    let rows = page.css("tr");
    let first = record.extract(rows.node(0).unwrap());
    assert_eq!(
        serde_json::Value::Object(first),
        json!({
            "lang": "rust",
            "version": 1.75,
            "tags": ["systems", "web"],
            "missing": null
        })
    );

    let json_record = RecordSpec::from_json(
        r#"{"fields": {"who": {"query": "people[].first", "reduce": {"type": "index", "index": -1}}}}"#,
    )
    .unwrap()
    .compile()
    .unwrap();
    assert_eq!(
        serde_json::Value::Object(json_record.extract(&people())),
        json!({"who": "Jayden"})
    );
}

#[test]
fn xpath_and_css_agree_on_table_rows() {
    let record = RecordSpec::from_json(
        r#"{
          "fields": {
            "lang": {"query": "./td[1]/span/text()"},
            "tags": {
              "query": "./td[3]/text()",
              "processors": [{"type": "regex_split", "pattern": "(/)"}],
              "reduce": {"type": "all_truthy"}
            }
          }
        }"#,
    )
    .unwrap()
    .compile()
    .unwrap();

    let page = XPathLoader::parse(TABLE);
    let rows: Vec<_> = page
        .xpath("//table[@class='standard-table']//tr")
        .iter()
        .map(|tr| serde_json::Value::Object(record.extract(tr)))
        .collect();
    assert_eq!(
        rows,
        vec![
            json!({"lang": "rust", "tags": ["systems", "/", "web"]}),
            json!({"lang": "go", "tags": ["cloud"]}),
        ]
    );

    let css = HtmlLoader::parse(TABLE);
    let langs = Pipeline::new().reduce(Identity);
    assert_eq!(
        css.css("td:nth-child(1) span::text").proc(&langs),
        page.xpath("//td[1]/span/text()").proc(&langs)
    );
}

#[test]
fn compose_loader_matches_selector_semantics() {
    let strip = Pipeline::new().then(Strip::new()).reduce(Identity);
    let raw = ComposeLoader::new(Value::list(["  a ", "", " b"]));
    assert_eq!(raw.proc(&strip), Some(Value::list(["a", "b"])));
    assert_eq!(ComposeLoader::new(None).proc(&strip), Some(Value::list(Vec::<Value>::new())));
}
