use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_phosphor::regular as icons;

use flight_gantt_app::model::{ColorBy, ColorSettings, Flight};
use flight_gantt_app::schedule::GanttEngine;

use crate::ui::theme;

/// Actions that the flight table can request.
pub enum FlightTableAction {
    None,
    Open(String),
    Delete(String),
}

const ROW_HEIGHT: f32 = 22.0;

/// Render the flight list. Rows with an unsaved change show a clock.
pub fn show_flight_table(
    flights: &[Flight],
    engine: &GanttEngine,
    colors: &ColorSettings,
    color_by: ColorBy,
    selected: Option<&str>,
    ui: &mut Ui,
) -> FlightTableAction {
    let mut action = FlightTableAction::None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("Flights").strong().size(15.0));
        ui.label(RichText::new(format!("({})", flights.len())).size(11.0).weak());
    });
    ui.add_space(4.0);

    let headers = [
        "", "Flight", "Reg", "Date", "Wk", "STD", "STA", "Route", "Status", "Type",
        "Positioning", "Operator", "Client", "Revenue", "Load", "",
    ];

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .sense(egui::Sense::click())
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(14.0))
        .columns(Column::auto().at_least(60.0), 2)
        .column(Column::auto().at_least(48.0))
        .column(Column::exact(28.0))
        .columns(Column::exact(44.0), 2)
        .column(Column::auto().at_least(80.0))
        .columns(Column::auto().at_least(70.0), 5)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in headers {
                header.col(|ui| {
                    ui.label(RichText::new(title).size(11.0).strong());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, flights.len(), |mut row| {
                let flight = &flights[row.index()];
                row.set_selected(selected == Some(flight.id.as_str()));

                row.col(|ui| {
                    let (dot, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                    ui.painter()
                        .circle_filled(dot.center(), 4.0, colors.color_for(flight, color_by));
                });
                row.col(|ui| {
                    if engine.pending(&flight.id).is_some() {
                        ui.label(icons::CLOCK).on_hover_text("Saving…");
                    }
                    ui.label(RichText::new(&flight.flight_no).strong());
                });
                row.col(|ui| {
                    ui.label(&flight.registration);
                });
                row.col(|ui| {
                    ui.label(&flight.date);
                });
                row.col(|ui| {
                    ui.label(flight.week_number.to_string());
                });
                row.col(|ui| {
                    ui.monospace(&flight.std);
                });
                row.col(|ui| {
                    ui.monospace(&flight.sta);
                });
                row.col(|ui| {
                    ui.label(format!("{} → {}", flight.adep, flight.ades));
                });
                row.col(|ui| {
                    ui.label(
                        RichText::new(flight.status.label()).color(colors.status(flight.status)),
                    );
                });
                row.col(|ui| {
                    ui.label(flight.flight_type.label());
                });
                row.col(|ui| {
                    ui.label(flight.flight_positioning.label());
                });
                row.col(|ui| {
                    ui.label(&flight.operator);
                });
                row.col(|ui| {
                    ui.label(&flight.client_name);
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", flight.revenue));
                });
                row.col(|ui| {
                    ui.label(format!("{}/{}", flight.capacity_used, flight.total_capacity));
                });
                row.col(|ui| {
                    let del = ui.add(
                        egui::Button::new(RichText::new(icons::TRASH).size(11.0).color(theme::ERROR))
                            .frame(false),
                    );
                    if del.on_hover_text("Delete flight").clicked() {
                        action = FlightTableAction::Delete(flight.id.clone());
                    }
                });

                if row.response().clicked() && matches!(action, FlightTableAction::None) {
                    action = FlightTableAction::Open(flight.id.clone());
                }
            });
        });

    action
}
