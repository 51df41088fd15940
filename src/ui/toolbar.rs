use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

use flight_gantt_app::model::ColorBy;

use crate::app::{FlightGanttApp, Tab};
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut FlightGanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{}  Import CSV...", icons::FILE_ARROW_DOWN)).clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button(format!("{}  Export CSV...", icons::FILE_ARROW_UP)).clicked() {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Open Data Folder", icons::FOLDER_OPEN)).clicked() {
                app.open_data_folder();
                ui.close_menu();
            }
            if ui.button("  Reload").clicked() {
                app.reload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.engine.viewport.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.engine.viewport.zoom_out();
                ui.close_menu();
            }
            if ui.button("  Reset Zoom").clicked() {
                app.engine.viewport.reset_zoom();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Color bars by").small().weak());
            for by in ColorBy::all() {
                if ui.radio_value(&mut app.config.color_by, *by, by.label()).clicked() {
                    app.save_config();
                    ui.close_menu();
                }
            }
            if ui.button(format!("{}  Colors...", icons::PALETTE)).clicked() {
                app.show_colors = true;
                ui.close_menu();
            }
            ui.separator();
            if ui.checkbox(&mut app.config.dark_mode, "Dark mode").changed() {
                app.save_config();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();
        for tab in Tab::all() {
            ui.selectable_value(&mut app.tab, *tab, tab.label());
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{:.0}%", app.engine.viewport.zoom_percent()))
                    .size(11.0)
                    .weak(),
            );
            if app.engine.is_busy() {
                ui.spinner();
                ui.label(RichText::new("Saving…").size(11.0).weak());
            }
        });
    });
}
