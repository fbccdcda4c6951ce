use alloc::string::String;

/// Decorator words stripped by default, see [`demangle`].
pub const DEFAULT_DECORATORS: [&str; 5] = ["struct", "class", "enum", "union", "dyn"];

const SPECIAL_CHARS: [char; 9] = [' ', '<', '>', '(', ')', '[', ']', ',', ';'];

/// Collapses a raw type name into the stable display form used as a registry key.
///
/// - Every path segment keeps only its last `::` component.
/// - A decorator word followed by a space (`struct Foo`, `dyn Trait`) is dropped.
/// - Generic, tuple and array punctuation is preserved.
///
/// # Examples
///
/// ```
/// use vc_meta::info::{DEFAULT_DECORATORS, demangle};
///
/// let name = demangle("alloc::vec::Vec<app::model::Date>", &DEFAULT_DECORATORS);
/// assert_eq!(name, "Vec<Date>");
///
/// let name = demangle("vc_meta::ptr::Ptr<dyn app::Shape>", &DEFAULT_DECORATORS);
/// assert_eq!(name, "Ptr<Shape>");
///
/// assert_eq!(demangle("class Point", &DEFAULT_DECORATORS), "Point");
/// ```
pub fn demangle<S: AsRef<str>>(raw: &str, decorators: &[S]) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw.trim();

    while !rest.is_empty() {
        match rest.find(|c| SPECIAL_CHARS.contains(&c)) {
            Some(index) => {
                let word = collapse_path(&rest[..index]);
                let special = &rest[index..=index];
                rest = &rest[(index + 1)..];

                if special == " " && is_decorator(word, decorators) {
                    continue;
                }
                out.push_str(word);
                out.push_str(special);
            }
            None => {
                out.push_str(collapse_path(rest));
                break;
            }
        }
    }

    out
}

#[inline]
fn collapse_path(segment: &str) -> &str {
    segment.rsplit("::").next().unwrap_or(segment)
}

#[inline]
fn is_decorator<S: AsRef<str>>(word: &str, decorators: &[S]) -> bool {
    !word.is_empty() && decorators.iter().any(|d| d.as_ref() == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(raw: &str) -> String {
        demangle(raw, &DEFAULT_DECORATORS)
    }

    #[test]
    fn collapses_paths_and_decorators() {
        assert_eq!(short("alloc::string::String"), "String");
        assert_eq!(short("f64"), "f64");
        assert_eq!(short("struct app::Point"), "Point");
        assert_eq!(short("  union Raw "), "Raw");
        assert_eq!(
            short("std::collections::HashMap<alloc::string::String, app::Date>"),
            "HashMap<String, Date>"
        );
        assert_eq!(short("[app::Date; 4]"), "[Date; 4]");
        assert_eq!(short("(u8, dyn core::any::Any)"), "(u8, Any)");
    }

    #[test]
    fn custom_decorators() {
        assert_eq!(demangle("interface Shape", &["interface"]), "Shape");
        assert_eq!(demangle("interface Shape", &DEFAULT_DECORATORS), "interface Shape");
        let none: [&str; 0] = [];
        assert_eq!(demangle("dyn app::Shape", &none), "dyn Shape");
    }
}
