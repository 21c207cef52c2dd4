//! Absolute URLs of the barrels and measurements resources

/// URL builder over a resolved base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrls {
    base: String,
}

impl ApiUrls {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Collection endpoint for barrels (list and create).
    #[must_use]
    pub fn barrels(&self) -> String {
        format!("{}/barrels/", self.base)
    }

    #[must_use]
    pub fn barrel(&self, id: &str) -> String {
        format!("{}/barrels/{id}", self.base)
    }

    /// Collection endpoint for measurements (list and create).
    #[must_use]
    pub fn measurements(&self) -> String {
        format!("{}/measurements/", self.base)
    }

    #[must_use]
    pub fn measurement(&self, id: &str) -> String {
        format!("{}/measurements/{id}", self.base)
    }
}
