// Panel layout domain models
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of grid columns at every breakpoint
pub const GRID_COLUMNS: u32 = 12;

pub const TEMPERATURE_CHART: &str = "temperature-chart";
pub const LIVE_TEMPERATURE: &str = "live-temperature";
pub const PANEL_1: &str = "panel-1";
pub const PANEL_2: &str = "panel-2";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("panel {0:?} appears more than once in a layout")]
    DuplicatePanel(String),
}

/// Viewport width tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Breakpoint {
    #[serde(rename = "lg")]
    Large,
    #[serde(rename = "md")]
    Medium,
    #[serde(rename = "sm")]
    Small,
    #[serde(rename = "xs")]
    ExtraSmall,
}

impl Breakpoint {
    /// Widest first
    pub const ALL: [Breakpoint; 4] = [
        Breakpoint::Large,
        Breakpoint::Medium,
        Breakpoint::Small,
        Breakpoint::ExtraSmall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Breakpoint::Large => "lg",
            Breakpoint::Medium => "md",
            Breakpoint::Small => "sm",
            Breakpoint::ExtraSmall => "xs",
        }
    }

    /// Minimum viewport width in pixels at which this tier applies
    pub fn min_width(&self) -> u32 {
        match self {
            Breakpoint::Large => 1200,
            Breakpoint::Medium => 996,
            Breakpoint::Small => 768,
            Breakpoint::ExtraSmall => 480,
        }
    }

    pub fn columns(&self) -> u32 {
        GRID_COLUMNS
    }

    /// Widest tier whose minimum fits `width`; anything narrower than the
    /// smallest tier still renders as extra-small.
    pub fn for_width(width: u32) -> Breakpoint {
        Self::ALL
            .into_iter()
            .find(|bp| width >= bp.min_width())
            .unwrap_or(Breakpoint::ExtraSmall)
    }
}

/// A panel rectangle in grid units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPlacement {
    #[serde(alias = "i")]
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PanelPlacement {
    pub fn new(id: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
        }
    }
}

/// Ordered panel placements for one breakpoint, unique by panel id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<PanelPlacement>", into = "Vec<PanelPlacement>")]
pub struct LayoutDescriptor {
    placements: Vec<PanelPlacement>,
}

impl LayoutDescriptor {
    pub fn new(placements: Vec<PanelPlacement>) -> Result<Self, LayoutError> {
        for (idx, placement) in placements.iter().enumerate() {
            if placements[..idx].iter().any(|p| p.id == placement.id) {
                return Err(LayoutError::DuplicatePanel(placement.id.clone()));
            }
        }
        Ok(Self { placements })
    }

    pub fn placements(&self) -> &[PanelPlacement] {
        &self.placements
    }

    pub fn get(&self, id: &str) -> Option<&PanelPlacement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Replaces the placement with the same id in place, or appends it
    pub fn with_placement(mut self, placement: PanelPlacement) -> Self {
        match self.placements.iter_mut().find(|p| p.id == placement.id) {
            Some(existing) => *existing = placement,
            None => self.placements.push(placement),
        }
        self
    }
}

impl TryFrom<Vec<PanelPlacement>> for LayoutDescriptor {
    type Error = LayoutError;

    fn try_from(placements: Vec<PanelPlacement>) -> Result<Self, Self::Error> {
        Self::new(placements)
    }
}

impl From<LayoutDescriptor> for Vec<PanelPlacement> {
    fn from(descriptor: LayoutDescriptor) -> Self {
        descriptor.placements
    }
}

/// One descriptor per breakpoint.
///
/// Every breakpoint is always present: a stored document that omits one is
/// completed from the default layout when it is read back. A key that is not
/// a breakpoint name makes the document unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSet {
    #[serde(rename = "lg", default = "wide_layout")]
    large: LayoutDescriptor,
    #[serde(rename = "md", default = "wide_layout")]
    medium: LayoutDescriptor,
    #[serde(rename = "sm", default = "stacked_layout")]
    small: LayoutDescriptor,
    #[serde(rename = "xs", default = "stacked_layout")]
    extra_small: LayoutDescriptor,
}

impl LayoutSet {
    pub fn get(&self, breakpoint: Breakpoint) -> &LayoutDescriptor {
        match breakpoint {
            Breakpoint::Large => &self.large,
            Breakpoint::Medium => &self.medium,
            Breakpoint::Small => &self.small,
            Breakpoint::ExtraSmall => &self.extra_small,
        }
    }

    pub fn set(&mut self, breakpoint: Breakpoint, descriptor: LayoutDescriptor) {
        match breakpoint {
            Breakpoint::Large => self.large = descriptor,
            Breakpoint::Medium => self.medium = descriptor,
            Breakpoint::Small => self.small = descriptor,
            Breakpoint::ExtraSmall => self.extra_small = descriptor,
        }
    }

    pub fn with_layout(mut self, breakpoint: Breakpoint, descriptor: LayoutDescriptor) -> Self {
        self.set(breakpoint, descriptor);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Breakpoint, &LayoutDescriptor)> {
        Breakpoint::ALL.into_iter().map(move |bp| (bp, self.get(bp)))
    }
}

impl Default for LayoutSet {
    fn default() -> Self {
        Self {
            large: wide_layout(),
            medium: wide_layout(),
            small: stacked_layout(),
            extra_small: stacked_layout(),
        }
    }
}

// Chart and live value side by side, two empty panels below.
fn wide_layout() -> LayoutDescriptor {
    LayoutDescriptor {
        placements: vec![
            PanelPlacement::new(TEMPERATURE_CHART, 0, 0, 8, 8),
            PanelPlacement::new(LIVE_TEMPERATURE, 8, 0, 4, 8),
            PanelPlacement::new(PANEL_1, 0, 8, 6, 6),
            PanelPlacement::new(PANEL_2, 6, 8, 6, 6),
        ],
    }
}

// Single full-width column.
fn stacked_layout() -> LayoutDescriptor {
    LayoutDescriptor {
        placements: vec![
            PanelPlacement::new(TEMPERATURE_CHART, 0, 0, 12, 8),
            PanelPlacement::new(LIVE_TEMPERATURE, 0, 8, 12, 8),
            PanelPlacement::new(PANEL_1, 0, 16, 12, 6),
            PanelPlacement::new(PANEL_2, 0, 22, 12, 6),
        ],
    }
}

/// Bumped on every layout reset so the renderer rebuilds its grid from scratch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct LayoutVersion(pub u64);

impl LayoutVersion {
    pub fn next(self) -> Self {
        LayoutVersion(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wide_breakpoints() {
        let layouts = LayoutSet::default();
        for bp in [Breakpoint::Large, Breakpoint::Medium] {
            let d = layouts.get(bp);
            assert_eq!(d.get(TEMPERATURE_CHART), Some(&PanelPlacement::new(TEMPERATURE_CHART, 0, 0, 8, 8)));
            assert_eq!(d.get(LIVE_TEMPERATURE), Some(&PanelPlacement::new(LIVE_TEMPERATURE, 8, 0, 4, 8)));
            assert_eq!(d.get(PANEL_1), Some(&PanelPlacement::new(PANEL_1, 0, 8, 6, 6)));
            assert_eq!(d.get(PANEL_2), Some(&PanelPlacement::new(PANEL_2, 6, 8, 6, 6)));
        }
    }

    #[test]
    fn test_default_stacked_breakpoints() {
        let layouts = LayoutSet::default();
        for bp in [Breakpoint::Small, Breakpoint::ExtraSmall] {
            let d = layouts.get(bp);
            let ys: Vec<u32> = d.placements().iter().map(|p| p.y).collect();
            let hs: Vec<u32> = d.placements().iter().map(|p| p.h).collect();
            assert_eq!(ys, vec![0, 8, 16, 22]);
            assert_eq!(hs, vec![8, 8, 6, 6]);
            assert!(d.placements().iter().all(|p| p.x == 0 && p.w == GRID_COLUMNS));
        }
    }

    #[test]
    fn test_for_width() {
        assert_eq!(Breakpoint::for_width(1920), Breakpoint::Large);
        assert_eq!(Breakpoint::for_width(1200), Breakpoint::Large);
        assert_eq!(Breakpoint::for_width(1000), Breakpoint::Medium);
        assert_eq!(Breakpoint::for_width(800), Breakpoint::Small);
        assert_eq!(Breakpoint::for_width(500), Breakpoint::ExtraSmall);
        assert_eq!(Breakpoint::for_width(320), Breakpoint::ExtraSmall);
    }

    #[test]
    fn test_document_shape() {
        let json = serde_json::to_value(LayoutSet::default()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
        for bp in Breakpoint::ALL {
            assert!(json.get(bp.name()).is_some());
        }
        assert_eq!(
            json["lg"][0],
            serde_json::json!({ "id": "temperature-chart", "x": 0, "y": 0, "w": 8, "h": 8 })
        );
    }

    #[test]
    fn test_accepts_grid_item_key_and_extra_fields() {
        let doc = r#"{
            "lg": [{ "i": "panel-1", "x": 1, "y": 2, "w": 3, "h": 4, "moved": false, "static": false }]
        }"#;
        let layouts: LayoutSet = serde_json::from_str(doc).unwrap();

        assert_eq!(
            layouts.get(Breakpoint::Large).placements(),
            &[PanelPlacement::new(PANEL_1, 1, 2, 3, 4)]
        );
        // Missing breakpoints come from the default
        assert_eq!(layouts.get(Breakpoint::Small), LayoutSet::default().get(Breakpoint::Small));
    }

    #[test]
    fn test_rejects_duplicate_panels() {
        let dup = vec![
            PanelPlacement::new(PANEL_1, 0, 0, 1, 1),
            PanelPlacement::new(PANEL_1, 1, 1, 1, 1),
        ];
        assert_eq!(
            LayoutDescriptor::new(dup),
            Err(LayoutError::DuplicatePanel(PANEL_1.to_string()))
        );

        let doc = r#"{ "lg": [
            { "id": "a", "x": 0, "y": 0, "w": 1, "h": 1 },
            { "id": "a", "x": 0, "y": 0, "w": 1, "h": 1 }
        ] }"#;
        assert!(serde_json::from_str::<LayoutSet>(doc).is_err());
    }

    #[test]
    fn test_rejects_unknown_breakpoint() {
        let doc = r#"{
            "lg": [{ "id": "a", "x": 0, "y": 0, "w": 1, "h": 1 }],
            "xl": [{ "id": "a", "x": 0, "y": 0, "w": 1, "h": 1 }]
        }"#;
        assert!(serde_json::from_str::<LayoutSet>(doc).is_err());
    }

    #[test]
    fn test_rejects_negative_coordinates() {
        let doc = r#"{ "lg": [{ "id": "a", "x": -1, "y": 0, "w": 1, "h": 1 }] }"#;
        assert!(serde_json::from_str::<LayoutSet>(doc).is_err());
    }

    #[test]
    fn test_with_placement_replaces_by_id() {
        let moved = PanelPlacement::new(PANEL_1, 6, 20, 6, 6);
        let d = LayoutSet::default()
            .get(Breakpoint::Large)
            .clone()
            .with_placement(moved.clone());

        assert_eq!(d.len(), 4);
        assert_eq!(d.get(PANEL_1), Some(&moved));
        assert_eq!(d.placements()[2].id, PANEL_1);
    }

    #[test]
    fn test_version_next() {
        assert_eq!(LayoutVersion::default().next(), LayoutVersion(1));
        assert_eq!(LayoutVersion(41).next(), LayoutVersion(42));
    }
}
