//! Endpoint construction for the Gemini REST API.

/// Joins a base URL and a relative endpoint with exactly one slash between
/// them.
///
/// # Examples
///
/// ```
/// use geechat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://generativelanguage.googleapis.com/v1beta/", "/models"),
///     "https://generativelanguage.googleapis.com/v1beta/models"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", base, endpoint)
}

/// Relative path of a model method such as `generateContent`.
///
/// Accepts both bare model ids and the `models/`-qualified names the API
/// returns from its listing endpoint.
///
/// ```
/// use geechat::utils::url::model_method_path;
///
/// assert_eq!(
///     model_method_path("gemini-2.5-flash", "generateContent"),
///     "models/gemini-2.5-flash:generateContent"
/// );
/// assert_eq!(
///     model_method_path("models/gemini-2.5-flash", "streamGenerateContent"),
///     "models/gemini-2.5-flash:streamGenerateContent"
/// );
/// ```
pub fn model_method_path(model: &str, method: &str) -> String {
    let model = model.trim().trim_start_matches("models/");
    format!("models/{model}:{method}")
}
