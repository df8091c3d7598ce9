//! Session configuration and map loading.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use lane_defense_core::{CellKind, GateIndex, HighlightColor, LaneId};
use lane_defense_system_bootstrap::LaneSpec;
use lane_defense_world::GridLayout;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;
const DEFAULT_VISION_RANGE: u32 = 3;
const LEGEND_DEFAULT_KEY: &str = "default";
const LANE_PALETTE: [(u8, u8, u8); 3] = [
    (0xc8, 0x2a, 0x36),
    (0x2a, 0x6f, 0xc8),
    (0x8e, 0x44, 0xad),
];

/// Configuration used when no file is provided on the command line.
pub(crate) const DEFAULT_CONFIG: &str = r##"
version = 1
vision_range = 3

[legend]
"." = "plain"
"#" = "block"
"G" = "gate"
"T" = "tower"
" " = "empty"
default = "plain"

[[lanes]]
start_gate = 0
end_gate = 1
"##;

/// Resolved session configuration.
#[derive(Clone, Debug)]
pub(crate) struct Config {
    /// Range used by the vision tool when none is given explicitly.
    pub(crate) vision_range: u32,
    /// Symbol table used to read map files.
    pub(crate) legend: Legend,
    /// Lanes reserved when the session starts.
    pub(crate) lanes: Vec<LaneSpec>,
}

impl Config {
    /// Loads the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        parse_config(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }

    /// Built-in configuration.
    pub(crate) fn builtin() -> Result<Self> {
        parse_config(DEFAULT_CONFIG).context("built-in configuration is invalid")
    }

    /// Reads the map file at `path` using this configuration's legend.
    pub(crate) fn load_map(&self, path: &Path) -> Result<GridLayout> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read map at {}", path.display()))?;
        self.parse_map(&contents)
            .with_context(|| format!("invalid map at {}", path.display()))
    }

    /// Parses map text, one grid row per line.
    pub(crate) fn parse_map(&self, contents: &str) -> Result<GridLayout> {
        let layout = GridLayout::from_text(contents, |symbol| self.legend.kind_for(symbol))?;
        Ok(layout)
    }
}

/// Mapping from map symbols to cell kinds. `None` leaves the slot absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Legend {
    symbols: BTreeMap<char, Option<CellKind>>,
    default: Option<CellKind>,
}

impl Legend {
    /// Kind assigned to `symbol`, falling back to the legend's default.
    pub(crate) fn kind_for(&self, symbol: char) -> Option<CellKind> {
        self.symbols.get(&symbol).copied().unwrap_or(self.default)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    vision_range: Option<u32>,
    #[serde(default)]
    legend: BTreeMap<String, String>,
    #[serde(default)]
    lanes: Vec<LaneEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LaneEntry {
    start_gate: u32,
    end_gate: u32,
    #[serde(default)]
    color: Option<[u8; 3]>,
}

fn parse_config(contents: &str) -> Result<Config> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    if manifest.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported configuration version {}; expected {}",
            manifest.version,
            SUPPORTED_CONFIG_VERSION
        );
    }

    let legend = parse_legend(manifest.legend)?;
    let mut lanes = Vec::with_capacity(manifest.lanes.len());
    for (index, entry) in manifest.lanes.into_iter().enumerate() {
        let id = u32::try_from(index).context("too many lanes in configuration")?;
        let (red, green, blue) = match entry.color {
            Some([red, green, blue]) => (red, green, blue),
            None => LANE_PALETTE[index % LANE_PALETTE.len()],
        };
        lanes.push(LaneSpec {
            id: LaneId::new(id),
            start_gate: GateIndex::new(entry.start_gate),
            end_gate: GateIndex::new(entry.end_gate),
            highlight: HighlightColor::from_rgb(red, green, blue),
        });
    }

    Ok(Config {
        vision_range: manifest.vision_range.unwrap_or(DEFAULT_VISION_RANGE),
        legend,
        lanes,
    })
}

fn parse_legend(entries: BTreeMap<String, String>) -> Result<Legend> {
    let mut symbols = BTreeMap::new();
    let mut default = Some(CellKind::Plain);

    for (key, name) in entries {
        let kind = parse_slot(&name)
            .with_context(|| format!("unknown cell kind `{name}` for legend key {key:?}"))?;
        if key == LEGEND_DEFAULT_KEY {
            default = kind;
            continue;
        }

        let mut chars = key.chars();
        let (Some(symbol), None) = (chars.next(), chars.next()) else {
            bail!("legend key {key:?} must be a single character");
        };
        let _ = symbols.insert(symbol, kind);
    }

    Ok(Legend { symbols, default })
}

fn parse_slot(name: &str) -> Result<Option<CellKind>> {
    match name {
        "plain" => Ok(Some(CellKind::Plain)),
        "tower" => Ok(Some(CellKind::Tower)),
        "gate" => Ok(Some(CellKind::Gate)),
        "block" => Ok(Some(CellKind::Block)),
        "empty" => Ok(Some(CellKind::Empty)),
        "absent" => Ok(None),
        _ => bail!("unknown cell kind `{name}`"),
    }
}
