use crate::error::LedgerlyError;
use crate::layout::schema::LayoutDef;
use crate::layout::validate_layout;

const STANDARD_JSON: &str = include_str!("../../../../layouts/standard.json");
const SLASH_JSON: &str = include_str!("../../../../layouts/slash.json");

/// Available predefined layouts.
pub const PRESETS: &[&str] = &["standard", "slash"];

/// Preset used when no layout is requested.
pub const DEFAULT_PRESET: &str = "standard";

/// Load a predefined layout by name.
pub fn load_preset(name: &str) -> Result<LayoutDef, LedgerlyError> {
    let json = match name {
        "standard" => STANDARD_JSON,
        "slash" => SLASH_JSON,
        _ => {
            return Err(LedgerlyError::LayoutInvalid(format!(
                "unknown preset '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    let layout: LayoutDef = serde_json::from_str(json)?;
    validate_layout(&layout)?;
    Ok(layout)
}
