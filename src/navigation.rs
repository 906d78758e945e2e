// SPDX-License-Identifier: GPL-3.0-only

//! Navigation surface
//!
//! Routing itself lives outside this crate; screens only need to push a
//! path and read a parameter from the current one. [`HistoryNavigator`] is
//! an in-memory implementation used by the CLI and tests.

use crate::app::scan::ProductCode;
use tracing::debug;

/// Route templates known to the app. `[name]` marks a path parameter.
pub const ROUTE_TEMPLATES: [&str; 4] = ["/", "/scan", "/settings", "/product/[id]"];

/// Name of the path parameter carrying the product code
pub const PRODUCT_ID_PARAM: &str = "id";

/// Screens of the app, as addressed by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Intro screen with the scan button
    Entry,
    /// Live camera scanner
    Scan,
    Settings,
    /// Product details for a scanned code
    Product(ProductCode),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Entry => "/".to_string(),
            Route::Scan => "/scan".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Product(code) => format!("/product/{}", encode_segment(code.as_str())),
        }
    }

    /// Resolve a path back to a route
    pub fn parse(path: &str) -> Option<Self> {
        match path {
            "/" | "" => return Some(Route::Entry),
            "/scan" => return Some(Route::Scan),
            "/settings" => return Some(Route::Settings),
            _ => {}
        }
        let id = match_template("/product/[id]", path)?
            .into_iter()
            .find(|(name, _)| name == PRODUCT_ID_PARAM)?
            .1;
        ProductCode::new(id).map(Route::Product)
    }
}

/// The two navigation operations screens depend on
pub trait Navigator {
    /// Push `path` as the current location
    fn navigate(&mut self, path: &str);

    /// Read a path parameter from the current location
    fn current_path_param(&self, name: &str) -> Option<String>;

    fn navigate_to(&mut self, route: &Route) {
        self.navigate(&route.path());
    }
}

/// In-memory navigation stack
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    history: Vec<String>,
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryNavigator {
    /// Start at the entry screen
    pub fn new() -> Self {
        Self {
            history: vec![Route::Entry.path()],
        }
    }

    pub fn current_path(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("/")
    }

    pub fn current_route(&self) -> Option<Route> {
        Route::parse(self.current_path())
    }

    /// Every path pushed so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&mut self, path: &str) {
        debug!(from = %self.current_path(), to = %path, "Navigating");
        self.history.push(path.to_string());
    }

    fn current_path_param(&self, name: &str) -> Option<String> {
        let path = self.current_path();
        ROUTE_TEMPLATES
            .iter()
            .find_map(|template| match_template(template, path))?
            .into_iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }
}

/// Match `path` against a template, returning decoded parameters
fn match_template(template: &str, path: &str) -> Option<Vec<(String, String)>> {
    let template_segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if template_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Vec::new();
    for (expected, actual) in template_segments.iter().zip(path_segments.iter()) {
        match expected
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(name) => params.push((name.to_string(), decode_segment(actual))),
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

/// Percent-encode a single path segment
pub fn encode_segment(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

/// Reverse of [`encode_segment`]; malformed escapes are kept literally
pub fn decode_segment(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_round_trip() {
        let code = ProductCode::new("3017620422003").unwrap();
        let route = Route::Product(code.clone());
        assert_eq!(route.path(), "/product/3017620422003");
        assert_eq!(Route::parse("/product/3017620422003"), Some(route));
        assert_eq!(Route::parse("/"), Some(Route::Entry));
        assert_eq!(Route::parse("/scan"), Some(Route::Scan));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_current_path_param() {
        let mut nav = HistoryNavigator::new();
        assert_eq!(nav.current_path_param("id"), None);

        nav.navigate("/product/0049000028911");
        assert_eq!(nav.current_path_param("id").as_deref(), Some("0049000028911"));
        assert_eq!(nav.current_path_param("other"), None);
    }

    #[test]
    fn test_qr_payload_survives_path() {
        // QR payloads can hold anything, including slashes
        let raw = "https://example.com/p?x=1 2";
        let route = Route::Product(ProductCode::new(raw).unwrap());

        let mut nav = HistoryNavigator::new();
        nav.navigate_to(&route);
        assert_eq!(nav.current_path_param("id").as_deref(), Some(raw));
    }

    #[test]
    fn test_decode_malformed_escape() {
        assert_eq!(decode_segment("100%"), "100%");
        assert_eq!(decode_segment("%zz1"), "%zz1");
        assert_eq!(decode_segment("caf%C3%A9"), "café");
    }
}
