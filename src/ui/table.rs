use tabled::{Table, Tabled, settings::Style};
use crate::dictify::{MoveSummary, PokemonSummary, TypeSummary};
use crate::storage::DbStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        render(&self.rows)
    }
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn or_dash(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Types", &stats.types.to_string());
    builder.add_row("Pokemon", &stats.pokemon.to_string());
    builder.add_row("Moves", &stats.moves.to_string());
    builder.add_row("Pokemon moves", &stats.pokemon_moves.to_string());
    builder.add_row("Type relations", &stats.relations.to_string());
    builder.build()
}

#[derive(Tabled)]
struct PokemonRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Primary")]
    primary_type: i64,
    #[tabled(rename = "Secondary")]
    secondary_type: String,
    #[tabled(rename = "Avg")]
    average_stats: i64,
}

pub fn pokemon_table(records: &[PokemonSummary]) -> String {
    let rows: Vec<PokemonRow> = records
        .iter()
        .map(|p| PokemonRow {
            id: p.id,
            name: p.name.clone(),
            primary_type: p.primary_type,
            secondary_type: or_dash(p.secondary_type),
            average_stats: p.average_stats,
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct MoveRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "PP")]
    pp: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Type")]
    move_type: i64,
}

pub fn move_table(records: &[MoveSummary]) -> String {
    let rows: Vec<MoveRow> = records
        .iter()
        .map(|m| MoveRow {
            id: m.id,
            name: m.name.clone(),
            accuracy: or_dash(m.accuracy),
            pp: or_dash(m.pp),
            power: or_dash(m.power),
            move_type: m.move_type,
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gen")]
    generation: i64,
    #[tabled(rename = "Primary")]
    num_primary: usize,
    #[tabled(rename = "Secondary")]
    num_secondary: usize,
    #[tabled(rename = "Moves")]
    num_moves: usize,
}

pub fn type_table(records: &[TypeSummary]) -> String {
    let rows: Vec<TypeRow> = records
        .iter()
        .map(|t| TypeRow {
            id: t.id,
            name: t.name.clone(),
            generation: t.generation,
            num_primary: t.num_primary,
            num_secondary: t.num_secondary,
            num_moves: t.num_moves,
        })
        .collect();
    render(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_renders_nothing() {
        assert_eq!(TableBuilder::new().build(), "");
        assert_eq!(pokemon_table(&[]), "");
    }

    #[test]
    fn test_move_table_marks_missing_stats() {
        let table = move_table(&[MoveSummary {
            id: 45,
            name: "Growl".to_string(),
            accuracy: Some(100),
            pp: Some(40),
            power: None,
            move_type: 1,
        }]);
        assert!(table.contains("Growl"));
        assert!(table.contains("Power"));
        assert!(table.contains('-'));
    }
}
