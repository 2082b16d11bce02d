use url::Url;

use crate::errors::TrackerError;
use crate::workout::Category;

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// The single path segment all gateway endpoints live under.
    pub(crate) api_path: String,

    /// `api_path` with a trailing slash, ready for joining.
    api_prefix: String,
}

impl Urls {
    /// Create a new instance. `api_path` must be a single path segment;
    /// surrounding slashes are ignored.
    pub fn new(base: impl AsRef<str>, api_path: impl AsRef<str>) -> Result<Self, TrackerError> {
        let mut base = base.as_ref().trim().to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|source| TrackerError::InvalidUrl { source })?;

        let api_path = api_path.as_ref().trim().trim_matches('/').to_owned();
        if api_path.is_empty() || api_path.contains('/') {
            return Err(TrackerError::invalid(
                "api_path",
                format!("{:?} is not a single path segment", api_path),
            ));
        }
        let api_prefix = format!("{}/", api_path);

        Ok(Urls {
            base,
            api_path,
            api_prefix,
        })
    }

    pub fn api_path(&self) -> &str {
        &self.api_path
    }

    pub fn api(&self) -> Result<Url, TrackerError> {
        self.base
            .join(&self.api_prefix)
            .map_err(|source| TrackerError::InvalidUrl { source })
    }

    pub fn workouts(&self) -> Result<Url, TrackerError> {
        self.endpoint("workouts")
    }

    /// The history of one user.
    pub fn workouts_for(&self, user_email: &str) -> Result<Url, TrackerError> {
        let mut url = self.workouts()?;
        url.query_pairs_mut().append_pair("user", user_email);
        Ok(url)
    }

    pub fn summary(&self, user_email: &str) -> Result<Url, TrackerError> {
        let mut url = self.endpoint("workouts/summary")?;
        url.query_pairs_mut().append_pair("user", user_email);
        Ok(url)
    }

    pub fn records(&self, user_email: &str, limit: Option<usize>) -> Result<Url, TrackerError> {
        let mut url = self.endpoint("records")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("user", user_email);
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    pub fn exercises(&self, category: Option<Category>) -> Result<Url, TrackerError> {
        let mut url = self.endpoint("exercises")?;
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("category", category.as_str());
        }
        Ok(url)
    }

    pub fn login(&self) -> Result<Url, TrackerError> {
        self.endpoint("login")
    }

    fn endpoint(&self, path: &str) -> Result<Url, TrackerError> {
        self.api()?
            .join(path)
            .map_err(|source| TrackerError::InvalidUrl { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls() {
        let urls = Urls::new("http://localhost:8080", "/api/").expect("build URLs");

        assert_eq!(urls.api_path(), "api");
        assert_eq!(
            urls.workouts().expect("workouts URL").as_str(),
            "http://localhost:8080/api/workouts"
        );
        assert_eq!(
            urls.workouts_for("ana@example.com").expect("history URL").as_str(),
            "http://localhost:8080/api/workouts?user=ana%40example.com"
        );
        assert_eq!(
            urls.records("ana@example.com", Some(3)).expect("records URL").as_str(),
            "http://localhost:8080/api/records?user=ana%40example.com&limit=3"
        );
        assert_eq!(
            urls.exercises(Some(Category::Cardio)).expect("catalog URL").as_str(),
            "http://localhost:8080/api/exercises?category=cardio"
        );
    }

    #[test]
    fn keeps_base_paths() {
        let urls = Urls::new("https://example.com/tracker", "api").expect("build URLs");

        assert_eq!(
            urls.summary("a@b.c").expect("summary URL").as_str(),
            "https://example.com/tracker/api/workouts/summary?user=a%40b.c"
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Urls::new("not a url", "api"),
            Err(TrackerError::InvalidUrl { .. })
        ));
        assert!(Urls::new("http://localhost", "").is_err());
        assert!(Urls::new("http://localhost", "v1/api").is_err());
    }
}
