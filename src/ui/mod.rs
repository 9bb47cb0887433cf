pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, header, info, relation_label, relation_row, section, success, summary_row, warn,
};
pub use table::{TableBuilder, move_table, pokemon_table, stats_table, type_table};
pub use theme::{Theme, theme};
