//! The logic, string and container helper libraries used from templates

use hbs::dom::{Object, Value};
use hbs::hbs::helpers;
use hbs::{Handlebars, RenderOptions};
use insta::assert_snapshot;
use rstest::rstest;
use serde_json::json;

fn engine() -> Handlebars {
    let mut hbs = Handlebars::new();
    helpers::register_all(hbs.helpers_mut());
    hbs
}

fn context() -> Value {
    Value::from(json!({
        "name": "ada lovelace",
        "n": 41,
        "empty": "",
        "tags": ["b", "a", "c", "a"],
        "people": [
            { "name": "cy", "team": "red" },
            { "name": "al", "team": "blue" },
            { "name": "bo", "team": "red" }
        ],
        "html": "<p>Hi <em>there</em></p>",
        "symbol": "std::vector<std::string>",
    }))
}

#[rstest]
#[case::and("{{#if (and n name)}}y{{else}}n{{/if}}", "y")]
#[case::or("{{#if (or empty missing)}}y{{else}}n{{/if}}", "n")]
#[case::eq("{{#if (eq n 41)}}y{{/if}}", "y")]
#[case::ne("{{#if (ne n 41)}}y{{else}}n{{/if}}", "n")]
#[case::not("{{#if (not empty)}}y{{/if}}", "y")]
#[case::increment("{{increment n}}", "42")]
#[case::detag("{{detag html}}", "Hi there")]
fn test_logic_helpers(#[case] template: &str, #[case] expected: &str) {
    assert_eq!(engine().render(template, &context()).unwrap(), expected);
}

#[rstest]
#[case::capitalize("{{capitalize name}}", "Ada lovelace")]
#[case::upper_block("{{#upper}}{{name}}{{/upper}}", "ADA LOVELACE")]
#[case::pad_start("[{{pad_start \"41\" 5 \"0\"}}]", "[00041]")]
#[case::padding_block("[{{#pad_end 4 \".\"}}ab{{/pad_end}}]", "[ab..]")]
#[case::replace("{{replace name \" \" \"_\"}}", "ada_lovelace")]
#[case::split_join("{{join \"/\" (split name \" \")}}", "ada/lovelace")]
#[case::slice("{{slice name 0 3}}", "ada")]
#[case::slice_negative("{{slice name -8}}", "lovelace")]
#[case::starts_with("{{#if (starts_with name \"ada\")}}y{{/if}}", "y")]
#[case::anchor("{{safe_anchor_id name}}", "ada-lovelace")]
#[case::namespace("{{strip_namespace symbol}}", "vector&lt;std::string&gt;")]
#[case::index_of("{{index_of name \"love\"}}", "4")]
#[case::count("{{count name \"a\"}}", "3")]
#[case::to_json("{{{to_json n}}}", "41")]
#[case::bad_argument("{{upper n}}", "upper: expected a string, found integer")]
#[case::find("{{find name \"a\"}}", "0")]
#[case::rfind("{{rfind name \"a\"}}", "9")]
#[case::last_index_of("{{last_index_of name \"l\"}}", "8")]
#[case::char_at("{{char_at name 4}}", "l")]
#[case::is_alpha("{{#if (is_alpha name)}}y{{else}}n{{/if}}", "n")]
#[case::is_lower("{{#if (is_lower \"ada\")}}y{{/if}}", "y")]
#[case::is_title("{{#if (is_title (capitalize name))}}y{{else}}n{{/if}}", "n")]
#[case::swap_case("{{swap_case \"Ada\"}}", "aDA")]
#[case::partition("{{join \"|\" (partition name \" \")}}", "ada| |lovelace")]
#[case::rpartition("{{at (rpartition symbol \"::\") 0}}", "std::vector&lt;std")]
#[case::rsplit("{{join \"|\" (rsplit symbol \"::\" 1)}}", "std::vector&lt;std|string&gt;")]
#[case::implode_explode("{{implode \"-\" (explode name \" \")}}", "ada-lovelace")]
fn test_string_helpers(#[case] template: &str, #[case] expected: &str) {
    assert_eq!(engine().render(template, &context()).unwrap(), expected);
}

#[rstest]
#[case::size("{{size tags}} {{len name}}", "4 12")]
#[case::first_last("{{first tags}}{{last tags}}", "ba")]
#[case::sort_unique("{{join \",\" (unique tags)}}", "a,b,c")]
#[case::reverse("{{join \",\" (reverse tags)}}", "a,c,a,b")]
#[case::at("{{at tags -1}}", "a")]
#[case::has("{{#if (has tags \"c\")}}y{{/if}}", "y")]
#[case::pluck("{{join \" \" (pluck people \"name\")}}", "cy al bo")]
#[case::get("{{get (at people 0) \"age\" \"?\"}}", "?")]
#[case::concat("{{concat \"a\" \"b\" \"+\"}}", "a+b")]
#[case::keys("{{join \",\" (keys (at people 1))}}", "name,team")]
#[case::list("{{join \",\" (list (at people 1))}}", "name,team")]
#[case::head_tail("{{head tags}}{{tail tags}}{{front tags}}{{back tags}}", "baba")]
#[case::reversed("{{join \",\" (reversed tags)}}", "a,c,a,b")]
#[case::exist("{{#if (exist (at people 0) \"team\")}}y{{/if}}", "y")]
#[case::has_any("{{#if (has_any tags (split \"x,c\" \",\"))}}y{{/if}}", "y")]
#[case::get_or("{{get_or (at people 0) \"age\" 0}}", "0")]
#[case::del("{{join \",\" (del tags \"a\")}}", "b,c")]
#[case::entries("{{#each (entries (at people 2))}}{{at this 0}}={{at this 1}};{{/each}}", "name=bo;team=red;")]
#[case::merge("{{get (merge (at people 0) (at people 1)) \"name\"}}", "al")]
#[case::update_arrays("{{join \",\" (update tags (split \"c,d\" \",\"))}}", "b,a,c,a,d")]
#[case::fill("{{join \",\" (fill tags \"-\" 1 3)}}", "b,-,-,a")]
#[case::container_count("{{count tags \"a\"}}", "2")]
#[case::container_replace("{{join \",\" (replace tags \"a\" \"z\")}}", "b,z,c,z")]
fn test_container_helpers(#[case] template: &str, #[case] expected: &str) {
    assert_eq!(engine().render(template, &context()).unwrap(), expected);
}

#[test]
fn test_sort_by_in_each() {
    let out = engine()
        .render(
            "{{#each (sort_by people \"name\")}}{{name}} {{/each}}",
            &context(),
        )
        .unwrap();
    assert_eq!(out, "al bo cy ");
}

#[test]
fn test_group_by_and_chunk() {
    let template = "{{#each (group_by people \"team\")}}{{@key}}:{{#each this}} {{name}}{{/each}}\n{{/each}}{{#each (chunk tags 3)}}[{{join \",\" this}}]{{/each}}";
    let out = engine().render(template, &context()).unwrap();
    assert_snapshot!(out, @r###"
    red: cy bo
    blue: al
    [b,a,c][a]
    "###);
}

#[test]
fn test_relativize_against_page_url() {
    let site = Value::from(json!({
        "page": { "url": "/docs/guide/intro.html" },
        "site": { "path": "/base" },
    }));
    let hbs = engine();
    assert_eq!(
        hbs.render("{{relativize \"/docs/api/index.html\"}}", &site).unwrap(),
        "../api/index.html"
    );
    assert_eq!(
        hbs.render("{{relativize \"/docs/guide/intro.html#top\"}}", &site).unwrap(),
        "#top"
    );
    assert_eq!(hbs.render("{{relativize \"\"}}", &site).unwrap(), "#");
    assert_eq!(hbs.render("{{relativize \"http://x\"}}", &site).unwrap(), "http://x");
}

#[test]
fn test_relativize_without_page_uses_site_path() {
    let site = Value::from(json!({ "site": { "path": "/base" } }));
    let out = engine().render("{{relativize \"/a.html\"}}", &site).unwrap();
    assert_eq!(out, "/base/a.html");
}

#[test]
fn test_year_and_isdefined() {
    let out = engine()
        .render("{{#if (isdefined n)}}{{year}}{{/if}}", &context())
        .unwrap();
    let year: i64 = out.parse().unwrap();
    assert!(year >= 2024);
}

#[test]
fn test_log_defaults_to_data_level() {
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut hbs = engine();
    hbs.register_logger(move |level, _| sink.lock().unwrap().push(level.to_output_string()));
    let options = RenderOptions::default().with_data(Object::from([("level", "error")]));
    hbs.render_with("{{log \"x\"}}{{log \"y\" level=\"debug\"}}", &Value::Null, &options)
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["error".to_string(), "debug".to_string()]);
}
