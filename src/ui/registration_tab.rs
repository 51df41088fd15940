use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_phosphor::regular as icons;

use flight_gantt_app::model::registration::{AIRCRAFT_TYPES, OPERATORS};
use flight_gantt_app::model::{Registration, RegistrationDraft, RegistrationStatus};

use crate::ui::theme;

/// Changes the registrations tab asks the app to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationAction {
    None,
    Add(RegistrationDraft),
    Update(String, RegistrationDraft),
    SetStatus(String, RegistrationStatus),
    Delete(String),
}

/// Add/edit form plus the pending delete confirmation.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub draft: RegistrationDraft,
    /// Id of the registration being edited; `None` while adding.
    pub editing: Option<String>,
    /// (id, tail) awaiting delete confirmation.
    pub confirm_delete: Option<(String, String)>,
}

impl RegistrationForm {
    pub fn edit(&mut self, registration: &Registration) {
        self.draft = RegistrationDraft::of(registration);
        self.editing = Some(registration.id.clone());
    }

    pub fn reset(&mut self) {
        self.draft = RegistrationDraft::default();
        self.editing = None;
    }

    /// The action for the form's submit button; blank tails submit nothing.
    pub fn submit(&self) -> RegistrationAction {
        if self.draft.registration.trim().is_empty() {
            return RegistrationAction::None;
        }
        match &self.editing {
            Some(id) => RegistrationAction::Update(id.clone(), self.draft.clone()),
            None => RegistrationAction::Add(self.draft.clone()),
        }
    }
}

const ROW_HEIGHT: f32 = 24.0;

/// Render the fleet register with its add/edit form.
pub fn show_registration_tab(
    registrations: &[Registration],
    form: &mut RegistrationForm,
    ui: &mut Ui,
) -> RegistrationAction {
    let mut action = RegistrationAction::None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("Aircraft Registrations").strong().size(15.0));
        let active = registrations.iter().filter(|r| r.is_active()).count();
        ui.label(
            RichText::new(format!("({} total, {active} active)", registrations.len()))
                .size(11.0)
                .weak(),
        );
    });
    ui.label(
        RichText::new("Active registrations always get a row in the Gantt view.")
            .size(11.0)
            .weak(),
    );
    ui.add_space(6.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        let title = if form.editing.is_some() { "Edit registration" } else { "Add registration" };
        ui.label(RichText::new(title).strong());
        egui::Grid::new("registration_form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Registration");
                ui.add(
                    egui::TextEdit::singleline(&mut form.draft.registration)
                        .hint_text("e.g. YR-ABC")
                        .char_limit(20)
                        .desired_width(140.0),
                );
                ui.end_row();

                ui.label("Status");
                egui::ComboBox::from_id_salt("registration_status")
                    .selected_text(form.draft.status.label())
                    .show_ui(ui, |ui| {
                        for status in RegistrationStatus::all() {
                            ui.selectable_value(&mut form.draft.status, *status, status.label());
                        }
                    });
                ui.end_row();

                ui.label("Aircraft type");
                choice(ui, "registration_type", &mut form.draft.aircraft_type, &AIRCRAFT_TYPES);
                ui.end_row();

                ui.label("Operator");
                choice(ui, "registration_operator", &mut form.draft.operator, &OPERATORS);
                ui.end_row();
            });

        ui.horizontal(|ui| {
            let (icon, verb) = if form.editing.is_some() {
                (icons::FLOPPY_DISK, "Update")
            } else {
                (icons::PLUS, "Add")
            };
            let can_submit = !form.draft.registration.trim().is_empty();
            if ui
                .add_enabled(can_submit, egui::Button::new(format!("{icon} {verb}")))
                .clicked()
            {
                action = form.submit();
            }
            if form.editing.is_some() && ui.button("Cancel").clicked() {
                form.reset();
            }
        });
    });
    ui.add_space(8.0);

    if registrations.is_empty() {
        ui.label(RichText::new("No registrations yet. Add one above.").weak());
        return action;
    }

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Registration", "Status", "Type", "Operator", "Updated", ""] {
                header.col(|ui| {
                    ui.label(RichText::new(title).size(11.0).strong());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, registrations.len(), |mut row| {
                let r = &registrations[row.index()];
                row.set_selected(form.editing.as_deref() == Some(r.id.as_str()));

                row.col(|ui| {
                    ui.label(RichText::new(&r.registration).strong().monospace());
                });
                row.col(|ui| {
                    let color = if r.is_active() { theme::SUCCESS } else { egui::Color32::GRAY };
                    ui.label(RichText::new(r.status.label()).color(color));
                });
                row.col(|ui| {
                    ui.label(&r.aircraft_type);
                });
                row.col(|ui| {
                    ui.label(&r.operator);
                });
                row.col(|ui| {
                    ui.label(r.updated_at.format("%d/%m/%Y").to_string());
                });
                row.col(|ui| {
                    if ui.small_button(icons::PENCIL_SIMPLE).on_hover_text("Edit").clicked() {
                        form.edit(r);
                    }
                    let (icon, hint) = if r.is_active() {
                        (icons::PAUSE_CIRCLE, "Deactivate")
                    } else {
                        (icons::PLAY_CIRCLE, "Activate")
                    };
                    if ui.small_button(icon).on_hover_text(hint).clicked() {
                        action = RegistrationAction::SetStatus(r.id.clone(), r.status.toggled());
                    }
                    let del = ui.add(
                        egui::Button::new(RichText::new(icons::TRASH).color(theme::ERROR)).small(),
                    );
                    if del.on_hover_text("Delete").clicked() {
                        form.confirm_delete = Some((r.id.clone(), r.registration.clone()));
                    }
                });
            });
        });

    if let Some((id, tail)) = form.confirm_delete.clone() {
        let mut open = true;
        egui::Window::new("Delete registration")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ui.ctx(), |ui| {
                ui.label(format!("Delete registration {tail}? Its flights are kept."));
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui
                        .button(RichText::new(format!("{} Delete", icons::TRASH)).color(theme::ERROR))
                        .clicked()
                    {
                        action = RegistrationAction::Delete(id.clone());
                        form.confirm_delete = None;
                    }
                    if ui.button("Cancel").clicked() {
                        form.confirm_delete = None;
                    }
                });
            });
        if !open {
            form.confirm_delete = None;
        }
    }

    action
}

fn choice(ui: &mut Ui, id: &str, value: &mut String, options: &[&str]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.as_str())
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, option.to_string(), *option);
            }
        });
}
