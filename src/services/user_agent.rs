//! Heuristic user-agent classification
//!
//! Ordered substring checks, first match wins. Anything unrecognised falls
//! through to `Desktop` / `Unknown`; a missing header yields no
//! classification at all so the caller leaves the fields unset.

use serde::Serialize;
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum OperatingSystem {
    Windows,
    #[strum(serialize = "macOS")]
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    Android,
    #[strum(serialize = "iOS")]
    #[serde(rename = "iOS")]
    Ios,
    Unknown,
}

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub device: DeviceType,
    pub browser: Browser,
    pub os: OperatingSystem,
}

impl ClientInfo {
    pub fn device_label(&self) -> String {
        self.device.to_string()
    }

    pub fn browser_label(&self) -> String {
        self.browser.to_string()
    }

    pub fn os_label(&self) -> String {
        self.os.to_string()
    }
}

/// Classify a raw `User-Agent` header value.
pub fn classify(user_agent: Option<&str>) -> Option<ClientInfo> {
    let ua = user_agent?;
    Some(ClientInfo {
        device: detect_device(ua),
        browser: detect_browser(ua),
        os: detect_os(ua),
    })
}

fn detect_device(ua: &str) -> DeviceType {
    if ["Mobile", "Android", "iPhone"].iter().any(|m| ua.contains(m)) {
        DeviceType::Mobile
    } else if ["Tablet", "iPad"].iter().any(|m| ua.contains(m)) {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    }
}

// Edge/Opera UAs also contain "Chrome", and Chrome UAs contain "Safari";
// the check order decides.
fn detect_browser(ua: &str) -> Browser {
    if ua.contains("Chrome") {
        Browser::Chrome
    } else if ua.contains("Firefox") {
        Browser::Firefox
    } else if ua.contains("Safari") {
        Browser::Safari
    } else if ua.contains("Edge") {
        Browser::Edge
    } else {
        Browser::Unknown
    }
}

fn detect_os(ua: &str) -> OperatingSystem {
    if ua.contains("Windows") {
        OperatingSystem::Windows
    } else if ua.contains("Mac") {
        OperatingSystem::MacOs
    } else if ua.contains("Linux") {
        OperatingSystem::Linux
    } else if ua.contains("Android") {
        OperatingSystem::Android
    } else if ua.contains("iOS") {
        OperatingSystem::Ios
    } else {
        OperatingSystem::Unknown
    }
}
