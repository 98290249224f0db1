use serde::{Deserialize, Serialize};

/// Grid rectangle in column/row units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// First free row below this rectangle
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// Persisted rectangle of one widget, stored as a JSON array under `layout_{analysis key}`.
///
/// Grid serializers omit zero coordinates, so `x`/`y` default to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "default_size")]
    pub w: u32,
    #[serde(default = "default_size")]
    pub h: u32,
}

fn default_size() -> u32 {
    1
}

impl LayoutEntry {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Storage key of the saved layout for an analysis
pub fn storage_key(analysis_key: &str) -> String {
    format!("layout_{}", analysis_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_parses_without_zero_coordinates() {
        let entries: Vec<LayoutEntry> =
            serde_json::from_str(r#"[{"id":"mainChart1","w":6,"h":5,"content":"x"}]"#).unwrap();
        assert_eq!(entries[0].rect(), Rect::new(0, 0, 6, 5));
        assert_eq!(storage_key("Contratos"), "layout_Contratos");
    }
}
