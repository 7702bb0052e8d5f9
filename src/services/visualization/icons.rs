//! Lookup table from marker category to the icon used to draw it
use crate::track::MarkerCategory;
use serde::Serialize;

/// Static description of a category's icon image
struct IconSpec {
    image: &'static str,
    size: [u32; 2],
    anchor: Option<[u32; 2]>,
}

static START: IconSpec = IconSpec {
    image: "start-icon.png",
    size: [32, 32],
    anchor: Some([16, 32]),
};

static FINISH: IconSpec = IconSpec {
    image: "finish-icon.png",
    size: [32, 32],
    anchor: Some([16, 32]),
};

static PARKED: IconSpec = IconSpec {
    image: "parking-icon.png",
    size: [24, 24],
    anchor: Some([12, 24]),
};

static STOPPED: IconSpec = IconSpec {
    image: "stop-icon.png",
    size: [24, 24],
    anchor: Some([12, 24]),
};

// small dot centered on the point, so no anchor
static MOVING: IconSpec = IconSpec {
    image: "small-icon.png",
    size: [15, 15],
    anchor: None,
};

fn icon_spec(category: MarkerCategory) -> &'static IconSpec {
    match category {
        MarkerCategory::Start => &START,
        MarkerCategory::Finish => &FINISH,
        MarkerCategory::Parked => &PARKED,
        MarkerCategory::Stopped => &STOPPED,
        MarkerCategory::Moving => &MOVING,
    }
}

/// Icon options in the shape Leaflet's `L.icon` expects
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconConfig {
    icon_url: String,
    icon_size: [u32; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_anchor: Option<[u32; 2]>,
}

impl IconConfig {
    pub fn url(&self) -> &str {
        &self.icon_url
    }

    pub fn size(&self) -> [u32; 2] {
        self.icon_size
    }

    pub fn anchor(&self) -> Option<[u32; 2]> {
        self.icon_anchor
    }
}

/// Resolves category icons against the directory the images are served from
#[derive(Clone, Debug)]
pub struct IconTable {
    asset_base: String,
}

impl IconTable {
    pub fn new(asset_base: &str) -> Self {
        IconTable {
            asset_base: asset_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn icon(&self, category: MarkerCategory) -> IconConfig {
        let spec = icon_spec(category);
        IconConfig {
            icon_url: format!("{}/{}", self.asset_base, spec.image),
            icon_size: spec.size,
            icon_anchor: spec.anchor,
        }
    }
}

impl Default for IconTable {
    fn default() -> Self {
        IconTable::new("/static/img")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_category_has_its_own_image() {
        let table = IconTable::default();
        let urls: HashSet<String> = MarkerCategory::ALL
            .iter()
            .map(|c| table.icon(*c).url().to_string())
            .collect();
        assert_eq!(urls.len(), MarkerCategory::ALL.len());
    }

    #[test]
    fn resolves_against_asset_base() {
        let table = IconTable::new("https://cdn.example.com/img/");
        let icon = table.icon(MarkerCategory::Parked);
        assert_eq!(icon.url(), "https://cdn.example.com/img/parking-icon.png");
        assert_eq!(icon.size(), [24, 24]);
        assert_eq!(icon.anchor(), Some([12, 24]));
        assert_eq!(table.icon(MarkerCategory::Moving).anchor(), None);
    }

    #[test]
    fn serializes_as_leaflet_options() {
        let json = serde_json::to_value(IconTable::default().icon(MarkerCategory::Start)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "iconUrl": "/static/img/start-icon.png",
                "iconSize": [32, 32],
                "iconAnchor": [16, 32]
            })
        );
    }
}
