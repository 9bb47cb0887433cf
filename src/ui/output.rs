use crate::relation::RelationKind;
use crate::ui::{Icons, theme};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::BOOK, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

fn describe_relation(kind: RelationKind) -> String {
    let arrow = if kind.is_outgoing() { "->" } else { "<-" };
    format!("{} {} x{}", kind, arrow, kind.multiplier())
}

/// Relation kind with its direction and multiplier, styled by effectiveness
pub fn relation_label(kind: RelationKind) -> String {
    describe_relation(kind).style(theme().relation(kind).clone()).to_string()
}

pub fn relation_row(kind: RelationKind, names: &[String]) {
    let value = if names.is_empty() { dim("-") } else { names.join(", ") };
    let label = format!("{:<26}", describe_relation(kind));
    println!("  {} {}", label.style(theme().relation(kind).clone()), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_description() {
        assert_eq!(describe_relation(RelationKind::DoubleDamageTo), "double_damage_to -> x2");
        assert_eq!(describe_relation(RelationKind::HalfDamageFrom), "half_damage_from <- x0.5");
        assert_eq!(describe_relation(RelationKind::NoDamageTo), "no_damage_to -> x0");
    }
}
