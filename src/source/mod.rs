//! Input resolution: participant table, template, font and image assets

pub mod assets;
pub mod resolver;
pub mod table;

pub use assets::{load as load_asset, locate as locate_asset, AssetOutcome};
pub use resolver::{resolve_font, resolve_template, ResolvedFont, ResolvedTemplate};
pub use table::{read_table, CellValue, ParticipantRecord, Table};
