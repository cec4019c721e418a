/// Deepest reference expansion the delivery API accepts.
pub const MAX_INCLUDE_DEPTH: u8 = 10;

/// Delivery-side entry search: one content type, one field filter, bounded include depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    content_type: String,
    field_filters: Vec<(String, String)>,
    include: u8,
}

impl EntryQuery {
    pub fn content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            field_filters: Vec::new(),
            include: 0,
        }
    }

    /// Adds an equality filter; `field` is the full path, e.g. `fields.slug`.
    pub fn field_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_filters.push((field.into(), value.into()));
        self
    }

    pub fn include(mut self, depth: u8) -> Self {
        self.include = depth.min(MAX_INCLUDE_DEPTH);
        self
    }

    pub fn include_depth(&self) -> u8 {
        self.include
    }

    pub fn content_type_id(&self) -> &str {
        &self.content_type
    }

    pub fn field_filters(&self) -> &[(String, String)] {
        &self.field_filters
    }

    /// Query parameters in the order the CMS documents them.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("content_type".to_string(), self.content_type.clone())];
        params.extend(self.field_filters.iter().cloned());
        params.push(("include".to_string(), self.include.to_string()));
        params
    }

    /// Human-readable query string, used for logging.
    pub fn build(&self) -> String {
        let pairs: Vec<String> = self
            .to_params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("?{}", pairs.join("&"))
    }
}
