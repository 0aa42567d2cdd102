//! HTML escaping for interpolated output

use hbs_dom::dom::{Array, Value};

/// Replace `& < > " ' ` =` with HTML entities
pub fn escape_expression(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

/// Append the escaped form of `text` to `out`
pub fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            c => out.push(c),
        }
    }
}

/// Append the escaped output text of `value` to `out`
///
/// Array elements are escaped one by one so that safe strings inside an array stay raw.
pub fn escape_value_into(out: &mut String, value: &Value) {
    write_value(out, value, &mut Vec::new());
}

fn write_value(out: &mut String, value: &Value, path: &mut Vec<Array>) {
    match value {
        Value::SafeString(s) => out.push_str(s),
        Value::Array(array) => {
            if path.iter().any(|open| open.ptr_eq(array)) {
                return;
            }
            path.push(array.clone());
            out.push('[');
            for (i, element) in array.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, &element, path);
            }
            out.push(']');
            path.pop();
        }
        other => escape_into(out, &other.to_output_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("<b>", "&lt;b&gt;")]
    #[case("a & b", "a &amp; b")]
    #[case("\"q\" 'a'", "&quot;q&quot; &#x27;a&#x27;")]
    #[case("`x=1`", "&#x60;x&#x3D;1&#x60;")]
    #[case("plain", "plain")]
    #[case("", "")]
    fn test_escape(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_expression(input), expected);
    }

    #[test]
    fn test_array_elements_are_escaped_one_by_one() {
        let array = Array::from_values(vec![
            Value::from("<a>"),
            Value::safe_string("<b>"),
            Value::from(1),
        ]);
        let mut out = String::new();
        escape_value_into(&mut out, &Value::from(array));
        assert_eq!(out, "[&lt;a&gt;,<b>,1]");
    }

    #[test]
    fn test_self_referential_array_terminates() {
        let array = Array::new();
        array.push("<").unwrap();
        array.push(array.clone()).unwrap();
        let mut out = String::new();
        escape_value_into(&mut out, &Value::from(array));
        assert_eq!(out, "[&lt;,]");
    }

    proptest! {
        #[test]
        fn escaped_output_has_no_markup(text in "\\PC*") {
            let escaped = escape_expression(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }
    }
}
