//! Canonical JSON for narration and comparison.
//!
//! Values are serialized through `serde_json::Value`, whose object map is
//! key-sorted, so two equal values always produce the same text regardless
//! of struct field order or map iteration order.

use crate::result::{DocTestError, DocTestResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// JSON conversion and comparison helper
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComparator;

impl JsonComparator {
    /// Create a comparator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Serialize to canonical JSON; `pretty` only changes indentation
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T, pretty: bool) -> DocTestResult<String> {
        let canonical = to_canonical_value(value)?;
        render(&canonical, pretty)
    }

    /// Serialize to canonical JSON without the named top-level fields
    ///
    /// Fields nested below the top level are kept. Names that do not occur
    /// are ignored.
    pub fn to_json_skipping_fields<T, S>(
        &self,
        value: &T,
        excluded: &[S],
        pretty: bool,
    ) -> DocTestResult<String>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let mut canonical = to_canonical_value(value)?;
        if let Value::Object(map) = &mut canonical {
            for name in excluded {
                let _ = map.remove(name.as_ref());
            }
        }
        render(&canonical, pretty)
    }

    /// Parse JSON into a typed value
    pub fn from_json<T: DeserializeOwned>(&self, json: &str) -> DocTestResult<T> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `text` is well-formed JSON
    #[must_use]
    pub fn is_json_valid(&self, text: &str) -> bool {
        serde_json::from_str::<Value>(text).is_ok()
    }

    /// Re-indent valid JSON; `None` when `text` is not JSON
    #[must_use]
    pub fn pretty_print(&self, text: &str) -> Option<String> {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
    }

    /// Compare two values as pretty canonical JSON
    ///
    /// Returns the expected JSON when both sides match, an
    /// [`DocTestError::AssertionFailed`] showing both documents otherwise.
    pub fn assert_json_equals<E, A, S>(
        &self,
        expected: &E,
        actual: &A,
        excluded: &[S],
    ) -> DocTestResult<String>
    where
        E: Serialize + ?Sized,
        A: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let (expected_json, actual_json) = if excluded.is_empty() {
            (self.to_json(expected, true)?, self.to_json(actual, true)?)
        } else {
            (
                self.to_json_skipping_fields(expected, excluded, true)?,
                self.to_json_skipping_fields(actual, excluded, true)?,
            )
        };

        if expected_json == actual_json {
            Ok(expected_json)
        } else {
            Err(DocTestError::AssertionFailed {
                message: format!("JSON differs\nexpected:\n{expected_json}\nactual:\n{actual_json}"),
            })
        }
    }
}

fn to_canonical_value<T: Serialize + ?Sized>(value: &T) -> DocTestResult<Value> {
    serde_json::to_value(value).map_err(|e| DocTestError::Serialization {
        message: e.to_string(),
    })
}

fn render(value: &Value, pretty: bool) -> DocTestResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: u32,
        customer: String,
        created_at: String,
        lines: Vec<Line>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Line {
        sku: String,
        created_at: String,
    }

    fn order(created_at: &str) -> Order {
        Order {
            id: 1,
            customer: "ada".to_string(),
            created_at: created_at.to_string(),
            lines: vec![Line {
                sku: "X-1".to_string(),
                created_at: created_at.to_string(),
            }],
        }
    }

    mod serialization_tests {
        use super::*;

        #[test]
        fn test_compact_and_pretty_differ_only_in_whitespace() {
            let json = JsonComparator::new();
            let compact = json.to_json(&order("t1"), false).unwrap();
            let pretty = json.to_json(&order("t1"), true).unwrap();
            assert!(!compact.contains('\n'));
            assert!(pretty.contains('\n'));
            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            assert_eq!(strip(&compact), strip(&pretty));
        }

        #[test]
        fn test_key_order_is_canonical() {
            let json = JsonComparator::new();
            let mut a = HashMap::new();
            let _ = a.insert("zeta", 1);
            let _ = a.insert("alpha", 2);
            assert_eq!(json.to_json(&a, false).unwrap(), r#"{"alpha":2,"zeta":1}"#);
        }

        #[test]
        fn test_skip_top_level_only() {
            let json = JsonComparator::new();
            let out = json
                .to_json_skipping_fields(&order("t1"), &["created_at"], false)
                .unwrap();
            let value: Value = serde_json::from_str(&out).unwrap();
            assert!(value.get("created_at").is_none());
            assert_eq!(value["lines"][0]["created_at"], "t1");
        }

        #[test]
        fn test_skip_unknown_field_is_noop() {
            let json = JsonComparator::new();
            let plain = json.to_json(&order("t1"), true).unwrap();
            let skipped = json
                .to_json_skipping_fields(&order("t1"), &["nope"], true)
                .unwrap();
            assert_eq!(plain, skipped);
        }

        #[test]
        fn test_unserializable_value() {
            let json = JsonComparator::new();
            let mut bad = HashMap::new();
            let _ = bad.insert(vec![1u8], 1);
            let err = json.to_json(&bad, false).unwrap_err();
            assert!(matches!(err, DocTestError::Serialization { .. }));
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_is_json_valid() {
            let json = JsonComparator::new();
            assert!(json.is_json_valid(r#"{"abc":"a"}"#));
            assert!(json.is_json_valid("[1,2]"));
            assert!(!json.is_json_valid("<p>some Html content</p>"));
            assert!(!json.is_json_valid("{'abc':'a'}"));
        }

        #[test]
        fn test_pretty_print() {
            let json = JsonComparator::new();
            assert_eq!(
                json.pretty_print(r#"{"a":1}"#).as_deref(),
                Some("{\n  \"a\": 1\n}")
            );
            assert!(json.pretty_print("plain").is_none());
        }
    }

    mod comparison_tests {
        use super::*;

        #[test]
        fn test_equal_returns_expected_json() {
            let json = JsonComparator::new();
            let none: &[&str] = &[];
            let out = json.assert_json_equals(&order("t1"), &order("t1"), none).unwrap();
            assert_eq!(out, json.to_json(&order("t1"), true).unwrap());
        }

        #[test]
        fn test_mismatch_fails() {
            let json = JsonComparator::new();
            let none: &[&str] = &[];
            let err = json
                .assert_json_equals(&order("t1"), &order("t2"), none)
                .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("t2"));
        }

        #[test]
        fn test_excluded_field_ignored_in_comparison() {
            let json = JsonComparator::new();
            let mut other = order("t1");
            other.customer = "bob".to_string();
            assert!(json
                .assert_json_equals(&order("t1"), &other, &["customer"])
                .is_ok());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_order() -> impl Strategy<Value = Order> {
            (
                any::<u32>(),
                "[a-z ]{0,12}",
                "[0-9T:-]{0,20}",
                prop::collection::vec(("[A-Z0-9-]{1,6}", "[0-9]{0,4}"), 0..4),
            )
                .prop_map(|(id, customer, created_at, lines)| Order {
                    id,
                    customer,
                    created_at,
                    lines: lines
                        .into_iter()
                        .map(|(sku, created_at)| Line { sku, created_at })
                        .collect(),
                })
        }

        proptest! {
            #[test]
            fn prop_round_trip(value in arb_order(), pretty in any::<bool>()) {
                let json = JsonComparator::new();
                let text = json.to_json(&value, pretty).unwrap();
                let back: Order = json.from_json(&text).unwrap();
                prop_assert_eq!(back, value);
            }

            #[test]
            fn prop_excluded_field_never_present(
                value in arb_order(),
                field in prop::sample::select(vec!["id", "customer", "created_at", "lines"])
            ) {
                let json = JsonComparator::new();
                let text = json.to_json_skipping_fields(&value, &[field], false).unwrap();
                let parsed: Value = serde_json::from_str(&text).unwrap();
                prop_assert!(parsed.get(field).is_none());
            }
        }
    }
}
