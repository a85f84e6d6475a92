/// Adds a `with_base_url` builder to a client wrapping a `GeminiHttpClient`.
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            pub fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}
pub(crate) use impl_with_gemini_base_url;

pub mod analysis;
pub mod client;
pub mod image;
pub mod types;
pub mod video;

pub use analysis::GeminiAnalysisClient;
pub use client::GeminiHttpClient;
pub use image::GeminiImageClient;
pub use video::GeminiVideoClient;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path_regex};
    use wiremock::MockBuilder;

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";
    pub const PREDICT_LONG_RUNNING_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:predictLongRunning$";

    pub fn post_path_regex(pattern: &str) -> MockBuilder {
        wiremock::Mock::given(method("POST")).and(path_regex(pattern))
    }
}
