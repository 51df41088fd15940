use egui::{Color32, Context, RichText, Window};
use egui_phosphor::regular as icons;

use flight_gantt_app::model::{
    ColorStore, Flight, FlightField, FlightPositioning, FlightStatus, FlightType,
};
use flight_gantt_app::notify::{Notice, Notifier};
use flight_gantt_app::schedule::confirm::{resolve_reason, OTHER_REASON};
use flight_gantt_app::schedule::{Edit, REASONS};

use crate::app::FlightGanttApp;
use crate::ui::theme;

/// Reason picked in the confirmation dialog.
#[derive(Debug, Default)]
pub struct ReasonDraft {
    pub selected: Option<String>,
    pub custom: String,
}

impl ReasonDraft {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

const TEXT_FIELDS: [FlightField; 6] = [
    FlightField::FlightNo,
    FlightField::Registration,
    FlightField::Date,
    FlightField::WeekNumber,
    FlightField::Adep,
    FlightField::Ades,
];

/// Editable copy of one flight for the details window.
#[derive(Debug, Clone)]
pub struct DetailsDraft {
    pub flight_id: String,
    pub std: String,
    pub sta: String,
    values: Vec<(FlightField, String)>,
}

impl DetailsDraft {
    pub fn of(flight: &Flight) -> Self {
        let values = TEXT_FIELDS
            .iter()
            .chain(&[
                FlightField::Status,
                FlightField::FlightType,
                FlightField::FlightPositioning,
            ])
            .map(|field| (*field, flight.field_value(*field)))
            .collect();
        Self {
            flight_id: flight.id.clone(),
            std: flight.std.clone(),
            sta: flight.sta.clone(),
            values,
        }
    }

    fn value_mut(&mut self, field: FlightField) -> Option<&mut String> {
        self.values
            .iter_mut()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    /// Edits that turn `flight` into this draft.
    pub fn edits(&self, flight: &Flight) -> Vec<Edit> {
        let mut edits = Vec::new();
        let (std, sta) = (self.std.trim(), self.sta.trim());
        if std != flight.std || sta != flight.sta {
            edits.push(Edit::Times {
                std: std.to_string(),
                sta: sta.to_string(),
            });
        }
        for (field, value) in &self.values {
            if value.trim() != flight.field_value(*field) {
                edits.push(Edit::field(*field, value.trim()));
            }
        }
        edits
    }
}

/// Render the reason dialog for the open change request.
pub fn show_reason_dialog(app: &mut FlightGanttApp, ctx: &Context) {
    let Some(request) = app.engine.open_request().cloned() else {
        return;
    };
    let mut confirm: Option<String> = None;
    let mut cancel = false;

    Window::new(RichText::new("Confirm change").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([420.0, 0.0])
        .show(ctx, |ui| {
            ui.label(RichText::new(format!("Flight {}", request.flight_no)).strong());
            ui.add_space(4.0);
            for change in &request.changes {
                ui.label(format!("{}  {change}", icons::ARROW_RIGHT));
            }
            ui.add_space(8.0);

            let reason = if request.is_delete() {
                ui.label(RichText::new("Reason (optional)").weak());
                ui.add(
                    egui::TextEdit::singleline(&mut app.reason.custom)
                        .desired_width(f32::INFINITY),
                );
                Some(app.reason.custom.trim().to_string())
            } else {
                ui.label(RichText::new("Reason").weak());
                egui::ComboBox::from_id_salt("change_reason")
                    .selected_text(app.reason.selected.as_deref().unwrap_or("Select a reason"))
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for reason in REASONS {
                            ui.selectable_value(
                                &mut app.reason.selected,
                                Some(reason.to_string()),
                                *reason,
                            );
                        }
                    });
                if app.reason.selected.as_deref() == Some(OTHER_REASON) {
                    ui.add(
                        egui::TextEdit::singleline(&mut app.reason.custom)
                            .hint_text("Describe the reason")
                            .desired_width(f32::INFINITY),
                    );
                }
                resolve_reason(app.reason.selected.as_deref(), &app.reason.custom)
            };

            ui.add_space(6.0);
            ui.separator();
            ui.horizontal(|ui| {
                let label = if request.is_delete() { "Delete" } else { "Confirm" };
                let fill = if request.is_delete() { theme::ERROR } else { theme::ACCENT };
                let btn = egui::Button::new(RichText::new(label).color(Color32::WHITE)).fill(fill);
                if ui
                    .add_enabled(reason.is_some(), btn)
                    .on_disabled_hover_text("Pick a reason first")
                    .clicked()
                {
                    confirm = reason;
                }
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

    if let Some(reason) = confirm {
        if let Err(e) = app.engine.confirm(&reason, &mut app.toasts) {
            tracing::debug!(error = %e, "change was not dispatched");
        }
        app.reason.clear();
    } else if cancel || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.engine.cancel();
        app.reason.clear();
        app.toasts.notify(Notice::info("Change cancelled"));
    }
}

/// Render the flight details editor.
pub fn show_details_dialog(app: &mut FlightGanttApp, ctx: &Context) {
    let Some(mut draft) = app.details.take() else {
        return;
    };
    let Some(flight) = app.flights.iter().find(|f| f.id == draft.flight_id).cloned() else {
        app.toasts.notify(Notice::error("Flight no longer exists"));
        return;
    };
    let pending = app.engine.pending(&flight.id).is_some();
    let mut open = true;
    let mut save = false;
    let mut delete = false;
    let mut activity = false;

    Window::new(RichText::new(format!("{} Flight {}", icons::AIRPLANE_TILT, flight.flight_no)).strong())
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            egui::Grid::new("details_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for field in TEXT_FIELDS {
                        ui.label(RichText::new(field.label()).weak());
                        if let Some(value) = draft.value_mut(field) {
                            ui.text_edit_singleline(value);
                        }
                        ui.end_row();
                    }

                    ui.label(RichText::new("STD / STA").weak());
                    ui.horizontal(|ui| {
                        ui.add(egui::TextEdit::singleline(&mut draft.std).desired_width(56.0));
                        ui.label("→");
                        ui.add(egui::TextEdit::singleline(&mut draft.sta).desired_width(56.0));
                    });
                    ui.end_row();

                    enum_row(ui, &mut draft, FlightField::Status, FlightStatus::all().iter().map(|s| (s.as_str(), s.label())));
                    enum_row(ui, &mut draft, FlightField::FlightType, FlightType::all().iter().map(|t| (t.as_str(), t.label())));
                    enum_row(
                        ui,
                        &mut draft,
                        FlightField::FlightPositioning,
                        FlightPositioning::all().iter().map(|p| (p.as_str(), p.label())),
                    );

                    ui.label(RichText::new("Operator").weak());
                    ui.label(format!("{}  ·  {}", flight.operator, flight.client_name));
                    ui.end_row();
                    ui.label(RichText::new("Load").weak());
                    ui.label(format!(
                        "{} / {} ({} free) · {:.0} revenue",
                        flight.capacity_used,
                        flight.total_capacity,
                        flight.capacity_available,
                        flight.revenue
                    ));
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.horizontal(|ui| {
                if pending {
                    ui.label(format!("{} Saving…", icons::CLOCK));
                }
                ui.add_enabled_ui(!pending, |ui| {
                    let btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                        .fill(theme::ACCENT);
                    save = ui.add(btn).clicked();
                    delete = ui
                        .button(RichText::new(format!("{} Delete", icons::TRASH)).color(theme::ERROR))
                        .clicked();
                });
                activity = ui.button(format!("{} History", icons::CLOCK_COUNTER_CLOCKWISE)).clicked();
            });
        });

    if save {
        match app.engine.request_edit(&flight, draft.edits(&flight)) {
            Ok(true) => return,
            Ok(false) => app.toasts.notify(Notice::info("Nothing to save")),
            Err(e) => app.toasts.notify(Notice::error(e.to_string())),
        }
    } else if delete {
        match app.engine.request_delete(&flight) {
            Ok(()) => return,
            Err(e) => app.toasts.notify(Notice::error(e.to_string())),
        }
    } else if activity {
        app.show_activity_for(Some(flight.id.clone()));
        return;
    }

    if open && !ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.details = Some(draft);
    }
}

fn enum_row<'a>(
    ui: &mut egui::Ui,
    draft: &mut DetailsDraft,
    field: FlightField,
    options: impl Iterator<Item = (&'a str, &'a str)>,
) {
    ui.label(RichText::new(field.label()).weak());
    if let Some(value) = draft.value_mut(field) {
        let options: Vec<_> = options.collect();
        let current = options
            .iter()
            .find(|(key, _)| *key == value.as_str())
            .map_or(value.clone(), |(_, label)| label.to_string());
        egui::ComboBox::from_id_salt(field.as_str())
            .selected_text(current)
            .show_ui(ui, |ui| {
                for (key, label) in options {
                    ui.selectable_value(value, key.to_string(), label);
                }
            });
    }
    ui.end_row();
}

/// Render the color preferences window.
pub fn show_colors_dialog(app: &mut FlightGanttApp, ctx: &Context) {
    let mut open = true;
    let mut save = false;
    Window::new("Colors")
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(RichText::new("Status").strong());
            for (status, color) in app.colors.statuses.iter_mut() {
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgba(color);
                    ui.label(status.label());
                });
            }
            ui.add_space(4.0);
            ui.label(RichText::new("Flight type").strong());
            for (flight_type, color) in app.colors.flight_types.iter_mut() {
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgba(color);
                    ui.label(flight_type.label());
                });
            }
            ui.add_space(4.0);
            ui.label(RichText::new("Positioning").strong());
            for (positioning, color) in app.colors.positioning.iter_mut() {
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgba(color);
                    ui.label(positioning.label());
                });
            }
            ui.separator();
            ui.horizontal(|ui| {
                save = ui.button("Save").clicked();
                if ui.button("Reset to defaults").clicked() {
                    app.colors.reset();
                }
            });
        });

    if save {
        match app.color_store.save(&app.colors) {
            Ok(()) => app.toasts.notify(Notice::success("Colors saved")),
            Err(e) => app.toasts.notify(Notice::error(format!("Could not save colors: {e}"))),
        }
    }
    if !open {
        app.show_colors = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut FlightGanttApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 160.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Flight Gantt").strong());
                ui.label(RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).weak());
                ui.add_space(10.0);
                ui.label("Cargo flight scheduling with a");
                ui.label("drag-to-reschedule timeline.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight() -> Flight {
        Flight::new("ROM001", "YR-ABC", "15/01", "10:00", "11:00").unwrap()
    }

    #[test]
    fn test_untouched_draft_has_no_edits() {
        let f = flight();
        assert!(DetailsDraft::of(&f).edits(&f).is_empty());
    }

    #[test]
    fn test_draft_collects_changed_times_and_fields() {
        let f = flight();
        let mut draft = DetailsDraft::of(&f);
        draft.sta = " 11:30 ".into();
        if let Some(reg) = draft.value_mut(FlightField::Registration) {
            *reg = "YR-XYZ".into();
        }

        assert_eq!(
            draft.edits(&f),
            vec![
                Edit::Times {
                    std: "10:00".into(),
                    sta: "11:30".into()
                },
                Edit::field(FlightField::Registration, "YR-XYZ"),
            ]
        );
    }
}
