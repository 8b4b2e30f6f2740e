//! String utility functions

/// Turn a snake_case column name into a display label.
///
/// `created_at` becomes `Created At`; already-spaced names keep their words.
pub fn humanize_column(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
