use serde::Serialize;

use crate::model::PollutantKind;

/// Label shown for a station that has no reading for the selected pollutant.
pub const NO_DATA_LABEL: &str = "No data";

/// Grey used for the no-data state. Never one of the palette colors.
pub const NO_DATA_COLOR: &str = "#9ca3af";

/// EPA health categories, in ascending order of severity.
///
/// | Category                       | Color     |
/// |--------------------------------|-----------|
/// | Good                           | `#00e400` |
/// | Moderate                       | `#ffff00` |
/// | Unhealthy for Sensitive Groups | `#ff7e00` |
/// | Unhealthy                      | `#ff0000` |
/// | Very Unhealthy                 | `#8f3f97` |
/// | Hazardous                      | `#7e0023` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    /// All categories, least severe first. Index `i` is the band below
    /// breakpoint `i`.
    pub const ORDERED: [Category; 6] = [
        Category::Good,
        Category::Moderate,
        Category::UnhealthyForSensitiveGroups,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Category::Good => "#00e400",
            Category::Moderate => "#ffff00",
            Category::UnhealthyForSensitiveGroups => "#ff7e00",
            Category::Unhealthy => "#ff0000",
            Category::VeryUnhealthy => "#8f3f97",
            Category::Hazardous => "#7e0023",
        }
    }

    /// Severity rank, 0 for Good through 5 for Hazardous.
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

/// Result of classifying one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub color: &'static str,
    pub label: &'static str,
}

impl From<Category> for Classification {
    fn from(category: Category) -> Self {
        Self {
            category,
            color: category.color(),
            label: category.label(),
        }
    }
}

/// Foreground color for a value badge drawn on top of the category color.
///
/// Light text switches on above 70 (AQI), 35 (PM2.5) or 60 (PM10), where
/// the badge background gets dark enough to need it.
pub fn contrast_text_color(value: f64, kind: PollutantKind) -> &'static str {
    let threshold = match kind {
        PollutantKind::Aqi => 70.0,
        PollutantKind::Pm25 => 35.0,
        PollutantKind::Pm10 => 60.0,
    };
    if value > threshold { "#ffffff" } else { "#101828" }
}
