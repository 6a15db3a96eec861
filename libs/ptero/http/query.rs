use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URL component
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Query options accepted by list/get endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub filter: Option<(String, String)>,
    pub include: Vec<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some((key.into(), value.into()));
        self
    }

    pub fn include<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Render as a query string (`?...`), or an empty string when unset
    pub fn resolve(&self) -> String {
        let mut params = Vec::new();

        if let Some((key, value)) = &self.filter {
            params.push(format!(
                "{}={}",
                encode_component(&format!("filter[{}]", key)),
                encode_component(value)
            ));
        }
        if !self.include.is_empty() {
            params.push(format!("include={}", encode_component(&self.include.join(","))));
        }
        if let Some(page) = self.page {
            params.push(format!("page={}", page));
        }
        if let Some(per_page) = self.per_page {
            params.push(format!("per_page={}", per_page));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_resolve_to_nothing() {
        assert_eq!(FetchOptions::new().resolve(), "");
        assert!(FetchOptions::new().is_empty());
    }

    #[test]
    fn test_resolve_all_fields() {
        let q = FetchOptions::new()
            .filter("email", "a@b.c")
            .include(["servers", "location"])
            .page(2)
            .per_page(50)
            .resolve();

        assert_eq!(
            q,
            "?filter%5Bemail%5D=a%40b.c&include=servers%2Clocation&page=2&per_page=50"
        );
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("my file (1).txt"), "my%20file%20(1).txt");
        assert_eq!(encode_component("/plugins/a&b"), "%2Fplugins%2Fa%26b");
    }
}
