use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::rank::{RankedTable, RankingKind, TOP_N};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Ranked tables (central panel)
// ---------------------------------------------------------------------------

/// Render every ranking, with a notice for the ones the dataset cannot offer.
pub fn ranked_tables(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(eval)) = (&state.dataset, &state.evaluation) else {
        return;
    };

    for kind in RankingKind::ALL {
        ui.add_space(6.0);
        ui.heading(format!("{} (top {TOP_N})", kind.title()));

        if !kind.is_available(&dataset.schema) {
            ui.label(RichText::new("Not available: the dataset lacks this column.").weak());
            continue;
        }
        match eval.tables.iter().find(|t| t.kind == kind) {
            Some(table) if !table.rows.is_empty() => ranked_table(ui, table),
            _ => {
                ui.label("No matching hotels.");
            }
        }
    }
}

fn ranked_table(ui: &mut Ui, table: &RankedTable) {
    ui.push_id(table.kind, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(TableColumn::auto().at_least(60.0), table.columns.len())
            .header(ROW_HEIGHT, |mut header| {
                for column in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column.header());
                    });
                }
            })
            .body(|mut body| {
                for row in &table.rows {
                    body.row(ROW_HEIGHT, |mut table_row| {
                        for (column, cell) in table.columns.iter().zip(row) {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(column.format(cell));
                            });
                        }
                    });
                }
            });
    });
}
