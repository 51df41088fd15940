use egui::{RichText, Ui};
use egui_phosphor::regular as icons;

use flight_gantt_app::filter::{self, FlightFilter, TimelineFilter};
use flight_gantt_app::model::{Flight, FlightStatus, FlightType};

/// Render the filter side panel. `timeline` is shown only on the Gantt tab.
pub fn show_filter_panel(
    flight_filter: &mut FlightFilter,
    timeline: Option<&mut TimelineFilter>,
    flights: &[Flight],
    ui: &mut Ui,
) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{}  Filters", icons::FUNNEL)).strong().size(14.0));
        if flight_filter.is_active() {
            ui.label(RichText::new(format!("({})", flight_filter.active_count())).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Clear").clicked() {
                    flight_filter.clear();
                }
            });
        }
    });
    ui.add_space(4.0);

    ui.add(
        egui::TextEdit::singleline(&mut flight_filter.search)
            .hint_text(format!("{} Flight no or operator", icons::MAGNIFYING_GLASS))
            .desired_width(f32::INFINITY),
    );
    ui.add_space(6.0);

    if let Some(timeline) = timeline {
        ui.label(RichText::new("Timeline").small().weak());
        let weeks = filter::available_weeks(flights);
        let week_text = timeline
            .week
            .map_or_else(|| "All weeks".to_string(), |w| format!("Week {w}"));
        egui::ComboBox::from_id_salt("timeline_week")
            .selected_text(week_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                if ui.selectable_value(&mut timeline.week, None, "All weeks").clicked() {
                    timeline.date = None;
                }
                for week in weeks {
                    if ui
                        .selectable_value(&mut timeline.week, Some(week), format!("Week {week}"))
                        .clicked()
                    {
                        timeline.date = None;
                    }
                }
            });

        let in_week: Vec<Flight> = TimelineFilter {
            week: timeline.week,
            date: None,
        }
        .apply(flights);
        let dates = filter::available_dates(&in_week);
        egui::ComboBox::from_id_salt("timeline_date")
            .selected_text(timeline.date.clone().unwrap_or_else(|| "All dates".into()))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut timeline.date, None, "All dates");
                for date in dates {
                    ui.selectable_value(&mut timeline.date, Some(date.clone()), date);
                }
            });
        ui.add_space(6.0);
    }

    option_combo(ui, "Registration", &mut flight_filter.registration, filter::registrations(flights));
    option_combo(ui, "Operator", &mut flight_filter.operator, filter::operators(flights));
    option_combo(ui, "Client", &mut flight_filter.client, filter::clients(flights));
    ui.add_space(6.0);

    ui.label(RichText::new("Status").small().weak());
    for status in FlightStatus::all() {
        let mut on = flight_filter.statuses.contains(status);
        if ui.checkbox(&mut on, status.label()).changed() {
            flight_filter.toggle_status(*status);
        }
    }
    ui.add_space(6.0);

    ui.label(RichText::new("Flight type").small().weak());
    for flight_type in FlightType::all() {
        let mut on = flight_filter.flight_types.contains(flight_type);
        if ui.checkbox(&mut on, flight_type.label()).changed() {
            flight_filter.toggle_flight_type(*flight_type);
        }
    }
}

fn option_combo(ui: &mut Ui, label: &str, value: &mut Option<String>, options: Vec<String>) {
    ui.label(RichText::new(label).small().weak());
    egui::ComboBox::from_id_salt(label)
        .selected_text(value.clone().unwrap_or_else(|| "All".into()))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            ui.selectable_value(value, None, "All");
            for option in options {
                ui.selectable_value(value, Some(option.clone()), option);
            }
        });
}
