//! GitHub release payloads

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A single downloadable file attached to a release
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

impl Asset {
    #[cfg(test)]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            download_url: format!("https://example.invalid/download/{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_release() {
        let json = r#"{
            "tag_name": "v1.2.3",
            "name": "1.2.3",
            "assets": [
                {
                    "name": "tool-linux-x86_64.tar.gz",
                    "size": 1024,
                    "browser_download_url": "https://github.com/o/r/releases/download/v1.2.3/tool-linux-x86_64.tar.gz"
                }
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v1.2.3");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "tool-linux-x86_64.tar.gz");
        assert!(release.assets[0].download_url.ends_with("tool-linux-x86_64.tar.gz"));
    }

    #[test]
    fn test_deserialize_release_without_assets() {
        let release: Release = serde_json::from_str(r#"{"tag_name": "v0"}"#).unwrap();
        assert!(release.assets.is_empty());
    }
}
