//! Cookie access for CDP page session.

use rednote_protocols::Cookie;
use serde_json::{Value, json};
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// All browser cookies.
    pub async fn get_all_cookies(&self) -> Result<Vec<Cookie>, CdpError> {
        let result = self.call("Network.getAllCookies", None).await?;
        let cookies: Vec<Cookie> = serde_json::from_value(result["cookies"].clone())?;
        Ok(cookies)
    }

    /// Install cookies into the browser.
    pub async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), CdpError> {
        if cookies.is_empty() {
            return Ok(());
        }
        let params: Vec<Value> = cookies.iter().map(Self::cookie_param).collect();
        self.call("Network.setCookies", Some(json!({"cookies": params})))
            .await?;
        debug!("Restored {} cookies", cookies.len());
        Ok(())
    }

    /// Convert a stored cookie into a `Network.CookieParam`.
    ///
    /// Session cookies are stored with `expires <= 0` and must be sent
    /// without an expiry.
    pub(super) fn cookie_param(cookie: &Cookie) -> Value {
        let mut param = json!({
            "name": cookie.name,
            "value": cookie.value,
            "domain": cookie.domain,
            "path": cookie.path,
            "httpOnly": cookie.http_only,
            "secure": cookie.secure,
        });
        if let Some(expires) = cookie.expires.filter(|e| *e > 0.0) {
            param["expires"] = json!(expires);
        }
        if let Some(same_site) = &cookie.same_site {
            param["sameSite"] = json!(same_site);
        }
        param
    }
}
