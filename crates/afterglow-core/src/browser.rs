//! Browser sniffing used for compatibility classes

use crate::dom::ElementNode;

/// Platform substrings identifying iOS devices
const IOS_PLATFORMS: [&str; 4] = ["iPad", "iPhone", "iPod", "iOS"];

/// Internet Explorer version from a user agent string.
///
/// IE 10 and older announce `MSIE <version>`, IE 11 only `Trident/7.0` with
/// an `rv:11.0` token.
pub fn ie_version(user_agent: &str) -> Option<u32> {
    if let Some(pos) = user_agent.find("MSIE ") {
        return leading_number(&user_agent[pos + 5..]);
    }
    if user_agent.contains("Trident/") {
        if let Some(pos) = user_agent.find("rv:") {
            return leading_number(&user_agent[pos + 3..]);
        }
    }
    None
}

/// IE 8 to 11 need the legacy styling and native controls
pub fn is_legacy_ie(user_agent: &str) -> bool {
    matches!(ie_version(user_agent), Some(8..=11))
}

pub fn is_ios(platform: &str) -> bool {
    IOS_PLATFORMS.iter().any(|name| platform.contains(name))
}

/// Whether the element is backed by a YouTube source
pub fn is_youtube_player<E: ElementNode>(element: &E) -> bool {
    element.non_empty_attribute("data-youtube-id").is_some()
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
