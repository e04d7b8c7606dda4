//! Terminal renderings of the dashboard tabs.

use cadasil_analytics::{
    CognitivePoint, CompletenessOverview, CompletionLevel, Distribution, GeneticConfirmation,
    RiskFactorShare, ScoredRecord, SnapshotComparison, Summaries,
};
use cadasil_ingest::RedcapField;
use cadasil_model::{FilterState, Selector, Sex, format_numeric, province_name, provinces};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub const OVERVIEW_TITLE: &str = "Resumen Ejecutivo";
pub const DEMOGRAPHICS_TITLE: &str = "Demografía Clínica";
pub const GENETICS_TITLE: &str = "Análisis Genético";
pub const CLINICAL_TITLE: &str = "Progresión Clínica";
pub const GEOGRAPHY_TITLE: &str = "Distribución Nacional";
pub const PATIENTS_TITLE: &str = "Tabla de Pacientes";
pub const QUALITY_TITLE: &str = "Calidad de Datos";

/// Every summary tab, as printed by `cadasil summary`.
pub fn summary_report(summaries: &Summaries) -> String {
    let sections = [
        section(OVERVIEW_TITLE, &[overview_table(summaries)]),
        section(
            DEMOGRAPHICS_TITLE,
            &[
                distribution_table("Sexo", &summaries.sex, summaries.total),
                distribution_table("Grupo Etario", &summaries.age_groups, summaries.total),
                distribution_table("Dominancia", &summaries.handedness, summaries.total),
            ],
        ),
        section(
            GENETICS_TITLE,
            &[
                genetic_confirmation_table(&summaries.genetic_confirmation),
                distribution_table("Exón", &summaries.exon, summaries.total),
            ],
        ),
        section(
            CLINICAL_TITLE,
            &[
                distribution_table(
                    "Combinación de Síntomas",
                    &summaries.symptom_combinations,
                    summaries.total,
                ),
                risk_factor_table(&summaries.vascular_risk_factors),
                cognitive_table(&summaries.cognitive_progression),
            ],
        ),
        section(
            GEOGRAPHY_TITLE,
            &[distribution_table("Provincia", &summaries.province, summaries.total)],
        ),
    ];
    sections.join("\n")
}

fn section(title: &str, tables: &[Table]) -> String {
    let mut text = format!("{title}\n");
    for table in tables {
        text.push_str(&table.to_string());
        text.push('\n');
    }
    text
}

pub fn overview_table(summaries: &Summaries) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Indicador"), header_cell("Valor")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let span = if summaries.total == 0 {
        "-".to_string()
    } else {
        format!(
            "{} - {} años",
            format_numeric(summaries.age_span.min),
            format_numeric(summaries.age_span.max)
        )
    };
    table.add_row(vec![
        Cell::new("Total Pacientes"),
        Cell::new(summaries.total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Edad Promedio"),
        Cell::new(format!("{:.1} años", summaries.mean_age)),
    ]);
    table.add_row(vec![Cell::new("Rango de Edad"), Cell::new(span)]);
    table.add_row(vec![
        Cell::new("MMSE Promedio"),
        Cell::new(format!("{:.1}", summaries.mean_first_score)),
    ]);
    table.add_row(vec![
        Cell::new("Confirmación Genética"),
        Cell::new(percent(summaries.genetic_confirmation.genetic_percentage())),
    ]);
    table.add_row(vec![
        Cell::new("Provincias"),
        Cell::new(summaries.province.len()),
    ]);
    table
}

/// Label / count / share table; buckets keep the distribution's order.
pub fn distribution_table(heading: &str, distribution: &Distribution, total: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(heading),
        header_cell("Pacientes"),
        header_cell("%"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    if distribution.is_empty() {
        table.add_row(vec![dim_cell("Sin datos"), dim_cell("-"), dim_cell("-")]);
        return table;
    }
    for bucket in distribution {
        table.add_row(vec![
            Cell::new(&bucket.label),
            count_cell(bucket.count),
            Cell::new(percent(share(bucket.count, total))),
        ]);
    }
    table
}

pub fn genetic_confirmation_table(confirmation: &GeneticConfirmation) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Método de Confirmación"),
        header_cell("Pacientes"),
        header_cell("%"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (label, count) in [
        ("Genético", confirmation.genetic),
        ("Biopsia de Piel", confirmation.skin_biopsy),
        ("Clínico", confirmation.clinical),
    ] {
        table.add_row(vec![
            Cell::new(label),
            count_cell(count),
            Cell::new(percent(share(count, confirmation.total))),
        ]);
    }
    table
}

pub fn risk_factor_table(factors: &[RiskFactorShare]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Factor de Riesgo Vascular"),
        header_cell("Pacientes"),
        header_cell("%"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for factor in factors {
        table.add_row(vec![
            Cell::new(&factor.label),
            count_cell(factor.count),
            Cell::new(percent(factor.percentage)),
        ]);
    }
    table
}

pub fn cognitive_table(points: &[CognitivePoint]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Edad"),
        header_cell("MMSE inicial"),
        header_cell("MMSE seguimiento"),
        header_cell("Declive"),
    ]);
    apply_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    if points.is_empty() {
        table.add_row(vec![dim_cell("Sin evaluaciones cognitivas")]);
        return table;
    }
    for point in points {
        let decline = if point.decline > 0.0 {
            Cell::new(format_numeric(point.decline)).fg(Color::Red)
        } else {
            dim_cell(format_numeric(point.decline))
        };
        table.add_row(vec![
            Cell::new(point.record_id.to_string()),
            Cell::new(format_numeric(point.age)),
            Cell::new(format_numeric(point.first_score)),
            point
                .second_score
                .map_or_else(|| dim_cell("-"), |score| Cell::new(format_numeric(score))),
            decline,
        ]);
    }
    table
}

// =============================================================================
// DATA QUALITY
// =============================================================================

pub const fn level_title(level: CompletionLevel) -> &'static str {
    match level {
        CompletionLevel::High => "Alta Completitud (≥80%)",
        CompletionLevel::Medium => "Completitud Media (50-79%)",
        CompletionLevel::Low => "Baja Completitud (<50%)",
    }
}

const fn level_color(level: CompletionLevel) -> Color {
    match level {
        CompletionLevel::High => Color::Green,
        CompletionLevel::Medium => Color::Yellow,
        CompletionLevel::Low => Color::Red,
    }
}

pub fn completeness_overview_table(overview: &CompletenessOverview) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Nivel"),
        header_cell("Pacientes"),
        header_cell("%"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for level in [
        CompletionLevel::High,
        CompletionLevel::Medium,
        CompletionLevel::Low,
    ] {
        let count = overview.count(level);
        table.add_row(vec![
            Cell::new(level_title(level)).fg(level_color(level)),
            count_cell(count),
            Cell::new(percent(share(count, overview.total))),
        ]);
    }
    table
}

/// Per-patient completeness, in the order given (least complete first).
pub fn completeness_table(scored: &[ScoredRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Paciente"),
        header_cell("ID"),
        header_cell("Datos Críticos"),
        header_cell("Datos Secundarios"),
        header_cell("Completitud Total"),
        header_cell("Estado"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for entry in scored {
        let record = &entry.record;
        let score = &entry.score;
        let sex = record.sex().map_or("No esp.", Sex::label);
        let patient = match record.onset_age {
            Some(age) => format!("{sex}, {} años", format_numeric(age)),
            None => sex.to_string(),
        };
        let name = record.full_name.as_deref().unwrap_or("Sin nombre");
        table.add_row(vec![
            Cell::new(format!("{name}\n{patient}")),
            Cell::new(record.record_id.to_string()),
            Cell::new(format!(
                "{}/{} ({:.0}%)",
                score.critical_complete, score.critical_total, score.critical_percentage
            )),
            Cell::new(format!(
                "{}/{} ({:.0}%)",
                score.secondary_complete, score.secondary_total, score.secondary_percentage
            )),
            Cell::new(format!("{:.0}%", score.overall_percentage)).add_attribute(Attribute::Bold),
            Cell::new(score.level.label()).fg(level_color(score.level)),
        ]);
    }
    table
}

// =============================================================================
// SESSION
// =============================================================================

/// Banner printed after an upload replaces the snapshot.
pub fn comparison_banner(comparison: &SnapshotComparison) -> String {
    let sign = if comparison.grew() { "+" } else { "" };
    format!(
        "Comparación con Datos Actualizados\n\
         Pacientes: {} → {} ({sign}{} pacientes)\n\
         Edad Promedio: {:.1} años\n\
         MMSE Promedio: {:.1}\n\
         Confirmación Genética: {:.1}%",
        comparison.previous_total,
        comparison.current_total,
        comparison.delta(),
        comparison.mean_age,
        comparison.mean_first_score,
        comparison.genetic_confirmation_percentage,
    )
}

/// One line describing the active filters, `None` when none are set.
pub fn describe_filters(filters: &FilterState) -> Option<String> {
    if filters.is_default() {
        return None;
    }
    let mut parts = vec![format!(
        "edad {}-{}",
        format_numeric(filters.age_range.min),
        format_numeric(filters.age_range.max)
    )];
    if !filters.sex.is_all() {
        parts.push(format!("sexo {}", filters.sex));
    }
    if let Selector::Only(code) = filters.province {
        parts.push(format!(
            "provincia {}",
            province_name(code).map_or_else(|| code.to_string(), ToString::to_string)
        ));
    }
    if !filters.symptom.is_all() {
        parts.push(format!("síntoma {}", filters.symptom));
    }
    if !filters.diagnosis_method.is_all() {
        parts.push(format!("método dx {}", filters.diagnosis_method));
    }
    if !filters.family_history.is_all() {
        parts.push(format!("ant. familiares {}", filters.family_history));
    }
    Some(format!("Filtros: {}", parts.join(", ")))
}

pub fn province_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Código"), header_cell("Provincia")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (code, name) in provinces() {
        table.add_row(vec![Cell::new(code), Cell::new(name)]);
    }
    table
}

/// The REDCap data dictionary.
pub fn metadata_table(fields: &[RedcapField]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Campo"),
        header_cell("Formulario"),
        header_cell("Tipo"),
        header_cell("Etiqueta"),
        header_cell("Opciones"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for field in fields {
        let choices = field.choices().len();
        table.add_row(vec![
            Cell::new(&field.field_name).add_attribute(Attribute::Bold),
            Cell::new(&field.form_name),
            Cell::new(&field.field_type),
            Cell::new(&field.field_label),
            if choices == 0 {
                dim_cell("-")
            } else {
                Cell::new(choices)
            },
        ]);
    }
    table
}

// =============================================================================
// HELPERS
// =============================================================================

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth);
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

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn percent(value: f64) -> String {
    format!("{value:.1}%")
}
