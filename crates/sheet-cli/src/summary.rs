use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sheet_model::{CellValue, EntityType, ErrorCategory, ValidationError};
use sheet_repair::{RepairReview, RuleBook, Suggestion};
use sheet_validate::ValidationSummary;

use crate::commands::{FileReport, ReviewOutcome, ValidateReport};

pub fn print_validate_report(report: &ValidateReport) {
    println!("{}", files_table(&report.files));
    println!("{}", summary_table(&report.summary));
    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        println!("{}", errors_table(&report.errors));
    }
}

pub fn print_review_outcome(outcome: &ReviewOutcome) {
    match outcome {
        ReviewOutcome::Cell {
            entity,
            row_index,
            field,
            suggestions,
            applied,
            remaining,
        } => {
            println!("Suggestions for {entity} row {row_index}, {field}:");
            if suggestions.is_empty() {
                println!("(no usable suggestions)");
            } else {
                println!("{}", suggestions_table(suggestions));
            }
            if let Some(suggestion) = applied {
                println!("Applied: {}", suggestion.value);
                println!("{}", summary_table(remaining));
            }
        }
        ReviewOutcome::Rows {
            review,
            applied,
            remaining,
        } => {
            let Some(review) = review else {
                println!("(no usable suggestion)");
                return;
            };
            if !review.row_count_matches() {
                eprintln!(
                    "warning: suggestion has {} rows, table has {}",
                    review.suggested_rows().len(),
                    review.current_rows
                );
            }
            if review.is_empty() {
                println!("Suggestion matches the current rows.");
            } else {
                println!("{}", changes_table(review));
            }
            if *applied > 0 {
                println!("Applied {applied} change(s).");
                println!("{}", summary_table(remaining));
            }
        }
    }
}

pub fn files_table(files: &[FileReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for file in files {
        let status = match (&file.error, &file.note) {
            (Some(error), _) => Cell::new(error).fg(Color::Red),
            (None, Some(note)) => Cell::new(note).fg(Color::Yellow),
            (None, None) => Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
        };
        table.add_row(vec![
            Cell::new(file.path.display()),
            match file.table {
                Some(entity) => entity_cell(entity),
                None => dim_cell("-"),
            },
            match file.rows {
                Some(rows) => Cell::new(rows),
                None => dim_cell("-"),
            },
            status,
        ]);
    }
    table
}

/// Error counts per table and category, with a total row.
pub fn summary_table(summary: &ValidationSummary) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Table")];
    header.extend(ErrorCategory::ALL.iter().map(|category| header_cell(category.label())));
    header.push(header_cell("Rows"));
    header.push(header_cell("Errors"));
    table.set_header(header);
    apply_summary_table_style(&mut table);
    for index in 1..=ErrorCategory::ALL.len() + 2 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    for entity in EntityType::ALL {
        let mut row = vec![entity_cell(entity)];
        row.extend(
            ErrorCategory::ALL
                .iter()
                .map(|category| count_cell(Some(summary.count_in(entity, *category)), Color::Red)),
        );
        row.push(count_cell(
            summary.rows_with_errors.get(&entity).copied(),
            Color::Yellow,
        ));
        row.push(count_cell(Some(summary.count_for(entity)), Color::Red));
        table.add_row(row);
    }

    let mut total = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    total.extend(ErrorCategory::ALL.iter().map(|category| {
        count_cell(summary.by_category.get(category).copied(), Color::Red)
            .add_attribute(Attribute::Bold)
    }));
    total.push(
        count_cell(
            Some(summary.rows_with_errors.values().sum()),
            Color::Yellow,
        )
        .add_attribute(Attribute::Bold),
    );
    total.push(count_cell(Some(summary.total), Color::Red).add_attribute(Attribute::Bold));
    table.add_row(total);
    table
}

pub fn errors_table(errors: &[ValidationError]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Category"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for error in errors {
        table.add_row(vec![
            entity_cell(error.entity),
            Cell::new(error.row_index),
            Cell::new(&error.field),
            category_cell(error.category),
            Cell::new(&error.message),
        ]);
    }
    table
}

pub fn changes_table(review: &RepairReview) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Current"),
        header_cell("Suggested"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for (idx, change) in review.changes().iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx),
            Cell::new(change.row_index),
            Cell::new(&change.field),
            value_cell(change.current.as_ref()),
            value_cell(change.suggested.as_ref()).fg(Color::Green),
        ]);
    }
    table
}

pub fn suggestions_table(suggestions: &[Suggestion]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Label"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    for (idx, suggestion) in suggestions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx),
            Cell::new(&suggestion.label),
            Cell::new(&suggestion.value).fg(Color::Green),
        ]);
    }
    table
}

/// All rules, or the active rules for `entity` in prompt order.
pub fn rules_table(book: &RuleBook, entity: Option<EntityType>) -> Table {
    let rules = match entity {
        Some(entity) => book.active_rules(Some(entity)),
        None => book.rules.iter().collect(),
    };
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Scope"),
        header_cell("Field"),
        header_cell("Priority"),
        header_cell("Active"),
        header_cell("Rule"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for rule in rules {
        table.add_row(vec![
            Cell::new(&rule.id),
            Cell::new(&rule.name).add_attribute(Attribute::Bold),
            Cell::new(rule.scope),
            match &rule.field {
                Some(field) => Cell::new(field),
                None => dim_cell("-"),
            },
            Cell::new(rule.priority),
            if rule.is_active {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            Cell::new(&rule.rule),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn entity_cell(entity: EntityType) -> Cell {
    Cell::new(entity.label())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn category_cell(category: ErrorCategory) -> Cell {
    let color = match category {
        ErrorCategory::Schema | ErrorCategory::List | ErrorCategory::Json => Color::Red,
        ErrorCategory::Duplicate | ErrorCategory::Reference => Color::Magenta,
        ErrorCategory::Capacity => Color::Yellow,
    };
    Cell::new(category.label()).fg(color)
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn value_cell(value: Option<&CellValue>) -> Cell {
    match value {
        Some(value) => Cell::new(value.as_text()),
        None => dim_cell("(none)"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
