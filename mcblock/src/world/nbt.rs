use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level record stored for each column.
///
/// Worlds before data version 2844 wrap the column in a `Level` compound; later worlds store its
/// fields directly in the record.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct ColumnRecord {
    #[serde(rename = "DataVersion", default)]
    pub data_version: i32,
    #[serde(rename = "Level", skip_serializing_if = "Option::is_none")]
    pub level: Option<LegacyLevel>,
    #[serde(rename = "xPos", skip_serializing_if = "Option::is_none")]
    pub x_pos: Option<i32>,
    #[serde(rename = "zPos", skip_serializing_if = "Option::is_none")]
    pub z_pos: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<FlatSection>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct LegacyLevel {
    #[serde(rename = "xPos")]
    pub x_pos: i32,
    #[serde(rename = "zPos")]
    pub z_pos: i32,
    #[serde(rename = "Sections", default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<LegacySection>,
}

#[derive(Deserialize, Serialize, derive_more::Debug)]
pub(crate) struct LegacySection {
    #[serde(rename = "Y")]
    pub y: i8,
    #[serde(rename = "Palette", default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<PaletteEntry>,
    #[serde(rename = "BlockStates", skip_serializing_if = "Option::is_none")]
    #[debug(ignore)]
    pub block_states: Option<fastnbt::LongArray>,
    #[serde(rename = "BlockLight", skip_serializing_if = "Option::is_none")]
    #[debug(ignore)]
    pub block_light: Option<fastnbt::ByteArray>,
    #[serde(rename = "SkyLight", skip_serializing_if = "Option::is_none")]
    #[debug(ignore)]
    pub sky_light: Option<fastnbt::ByteArray>,
}

#[derive(Deserialize, Serialize, derive_more::Debug)]
pub(crate) struct FlatSection {
    #[serde(rename = "Y")]
    pub y: i8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_states: Option<FlatBlockStates>,
    #[serde(rename = "BlockLight", skip_serializing_if = "Option::is_none")]
    #[debug(ignore)]
    pub block_light: Option<fastnbt::ByteArray>,
    #[serde(rename = "SkyLight", skip_serializing_if = "Option::is_none")]
    #[debug(ignore)]
    pub sky_light: Option<fastnbt::ByteArray>,
}

#[derive(Deserialize, Serialize, derive_more::Debug)]
pub(crate) struct FlatBlockStates {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<PaletteEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[debug(ignore)]
    pub data: Option<fastnbt::LongArray>,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct PaletteEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Properties", skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}
