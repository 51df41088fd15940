use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use flight_gantt_app::model::{ActivityEntry, Flight};
use flight_gantt_app::summary::{self, DashboardStats, Period};

use crate::ui::theme;

/// Stat tiles shown above every tab.
pub fn show_dashboard(stats: &DashboardStats, ui: &mut Ui) {
    ui.horizontal(|ui| {
        tile(ui, "Flights", stats.total.to_string());
        tile(ui, "Operational", stats.operational.to_string());
        tile(ui, "AOG", stats.aog.to_string());
        tile(
            ui,
            "Capacity",
            format!("{} / {}", stats.capacity_used, stats.total_capacity),
        );
        tile(ui, "Utilization", format!("{}%", stats.utilization));
    });
}

fn tile(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style())
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(egui::Margin::symmetric(12.0, 6.0))
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(label).small().weak());
                ui.label(RichText::new(value).strong().size(16.0));
            });
        });
}

/// Weekly or monthly roll-up with a totals footer.
pub fn show_period_summary(flights: &[Flight], period: Period, ui: &mut Ui) {
    let summaries = summary::summarize(flights, period);
    let totals = summary::totals(&summaries);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for s in &summaries {
                let title = match period {
                    Period::Week => format!("Week {}", s.period),
                    Period::Month => summary::month_name(s.period).to_string(),
                };
                egui::CollapsingHeader::new(
                    RichText::new(format!(
                        "{title}  ·  {} flights  ·  {} aircraft  ·  {}h {}m block  ·  {:.0} revenue",
                        s.flights,
                        s.unique_aircraft(),
                        s.block_minutes / 60,
                        s.block_minutes % 60,
                        s.revenue
                    ))
                    .strong(),
                )
                .id_salt(("period", s.period))
                .show(ui, |ui| {
                    ui.label(RichText::new(s.aircraft.join(", ")).small().weak());
                    for (date, day) in &s.by_date {
                        ui.label(RichText::new(format!("{date}  ({} flights)", day.len())).strong());
                        for f in day {
                            ui.label(format!(
                                "    {}  {}  {}-{}  {} → {}",
                                f.flight_no, f.registration, f.std, f.sta, f.adep, f.ades
                            ));
                        }
                    }
                });
            }

            ui.separator();
            ui.label(
                RichText::new(format!(
                    "Total: {} flights · max {} aircraft · {}h {}m block · {:.0} revenue",
                    totals.flights,
                    totals.max_aircraft,
                    totals.block_hours,
                    totals.block_mins,
                    totals.revenue
                ))
                .strong(),
            );
        });
}

/// Activity entries, newest first.
pub fn show_activity_log(entries: &[ActivityEntry], flight_label: Option<&str>, ui: &mut Ui) {
    ui.label(
        RichText::new(match flight_label {
            Some(label) => format!("Activity for {label}"),
            None => "Activity log".to_string(),
        })
        .strong()
        .size(15.0),
    );
    if entries.is_empty() {
        ui.label(RichText::new("No changes recorded yet").weak());
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(90.0), 2)
        .column(Column::auto().at_least(70.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["When", "Field", "Old", "New", "By", "Reason"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, entries.len(), |mut row| {
                let entry = &entries[row.index()];
                row.col(|ui| {
                    ui.label(entry.changed_at.format("%d/%m %H:%M:%S").to_string());
                });
                row.col(|ui| {
                    ui.label(&entry.field_name);
                });
                row.col(|ui| {
                    ui.label(&entry.old_value);
                });
                row.col(|ui| {
                    let color = if entry.new_value == "DELETED" {
                        theme::ERROR
                    } else {
                        theme::SUCCESS
                    };
                    ui.label(RichText::new(&entry.new_value).color(color));
                });
                row.col(|ui| {
                    ui.label(&entry.changed_by);
                });
                row.col(|ui| {
                    ui.label(entry.reason.as_deref().unwrap_or("—"));
                });
            });
        });
}
