/// First segment of a dotted or slashed module path
/// (`package.sub.mod` -> `package`, `lodash/fp` -> `lodash`).
pub fn root_segment(name: &str, separator: char) -> Option<String> {
    let first = name.split(separator).next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Macro to define a thread-local parser with a given language.
/// Usage: `define_parser!(PARSER_NAME, language_fn)`
#[macro_export]
macro_rules! define_parser {
    ($name:ident, $language:expr) => {
        thread_local! {
            static $name: std::cell::RefCell<tree_sitter::Parser> = std::cell::RefCell::new({
                let mut parser = tree_sitter::Parser::new();
                parser.set_language(&$language.into()).expect(concat!("Failed to set ", stringify!($name), " language"));
                parser
            });
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_segment() {
        assert_eq!(root_segment("package.sub.mod", '.'), Some("package".to_string()));
        assert_eq!(root_segment("lodash/fp", '/'), Some("lodash".to_string()));
        assert_eq!(root_segment("react", '/'), Some("react".to_string()));
        assert_eq!(root_segment(".hidden", '.'), None);
    }
}
