use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{RichText, Stroke};
use egui_phosphor::regular as icons;

use flight_gantt_app::config::{AppConfig, ConfigPaths};
use flight_gantt_app::filter::{FlightFilter, TimelineFilter};
use flight_gantt_app::model::{
    ActivityEntry, ColorSettings, ColorStore, Flight, FlightDataset, JsonColorStore, Registration,
};
use flight_gantt_app::notify::{Notice, NoticeKind, Notifier, Toasts};
use flight_gantt_app::schedule::GanttEngine;
use flight_gantt_app::model::registration::active_tails;
use flight_gantt_app::store::{DatasetStore, FlightStore, RegistrationStore};
use flight_gantt_app::summary::{DashboardStats, Period};

use crate::ui;
use crate::ui::dialogs::{DetailsDraft, ReasonDraft};
use crate::ui::gantt_chart::{ChartEvent, ChartStyle};
use crate::ui::registration_tab::{RegistrationAction, RegistrationForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Gantt,
    Flights,
    Weekly,
    Monthly,
    Registrations,
    Activity,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Gantt,
            Tab::Flights,
            Tab::Weekly,
            Tab::Monthly,
            Tab::Registrations,
            Tab::Activity,
        ]
    }

    pub fn label(&self) -> String {
        let (icon, name) = match self {
            Tab::Gantt => (icons::CHART_BAR_HORIZONTAL, "Gantt"),
            Tab::Flights => (icons::TABLE, "Flights"),
            Tab::Weekly => (icons::CALENDAR, "Weekly"),
            Tab::Monthly => (icons::CALENDAR_BLANK, "Monthly"),
            Tab::Registrations => (icons::AIRPLANE, "Registrations"),
            Tab::Activity => (icons::CLOCK_COUNTER_CLOCKWISE, "Activity"),
        };
        format!("{icon} {name}")
    }
}

/// Main application state.
pub struct FlightGanttApp {
    pub engine: GanttEngine,
    /// Last list fetched from the store; replaced wholesale, never edited.
    pub flights: Vec<Flight>,
    /// Fleet register, sorted by tail.
    pub registrations: Vec<Registration>,
    pub registration_form: RegistrationForm,
    pub config: AppConfig,
    paths: ConfigPaths,
    store: Arc<DatasetStore>,

    pub colors: ColorSettings,
    pub color_store: JsonColorStore,
    pub toasts: Toasts,

    pub filter: FlightFilter,
    pub timeline: TimelineFilter,
    pub tab: Tab,

    // Dialog state
    pub details: Option<DetailsDraft>,
    pub reason: ReasonDraft,
    pub show_colors: bool,
    pub show_about: bool,

    activity: Vec<ActivityEntry>,
    activity_flight: Option<String>,
}

impl FlightGanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let paths = ConfigPaths::resolve();
        let config = AppConfig::load(&paths.settings_file());
        let mut toasts = Toasts::default();

        let data_file = config.data_file(&paths);
        let store = match DatasetStore::open(data_file.clone()) {
            Ok(store) => store,
            Err(e) => {
                toasts.notify(Notice::error(format!(
                    "Could not open {}: {e}. Showing sample data.",
                    data_file.display()
                )));
                DatasetStore::in_memory(FlightDataset::sample())
            }
        };
        let store = Arc::new(store);

        let color_store = JsonColorStore::new(paths.colors_file());
        let colors = color_store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default colors");
            ColorSettings::default()
        });

        let engine = GanttEngine::new(store.clone())
            .with_viewport(config.viewport())
            .with_options(config.layout_options())
            .with_drag_threshold(config.drag_threshold)
            .with_changed_by(config.changed_by.clone());

        let mut app = Self {
            engine,
            flights: Vec::new(),
            registrations: Vec::new(),
            registration_form: RegistrationForm::default(),
            config,
            paths,
            store,
            colors,
            color_store,
            toasts,
            filter: FlightFilter::default(),
            timeline: TimelineFilter::default(),
            tab: Tab::Gantt,
            details: None,
            reason: ReasonDraft::default(),
            show_colors: false,
            show_about: false,
            activity: Vec::new(),
            activity_flight: None,
        };
        app.reload();
        app
    }

    // --- Data ---

    pub fn reload(&mut self) {
        match self.store.fetch_flights() {
            Ok(flights) => self.flights = flights,
            Err(e) => self
                .toasts
                .notify(Notice::error(format!("Could not load flights: {e}"))),
        }
        self.reload_registrations();
    }

    fn reload_registrations(&mut self) {
        match self.store.list_registrations() {
            Ok(list) => {
                self.engine.set_fleet(active_tails(&list));
                self.registrations = list;
            }
            Err(e) => self
                .toasts
                .notify(Notice::error(format!("Could not load registrations: {e}"))),
        }
    }

    fn apply_registration(&mut self, action: RegistrationAction) {
        let from_form = matches!(action, RegistrationAction::Add(_) | RegistrationAction::Update(..));
        let result = match action {
            RegistrationAction::None => return,
            RegistrationAction::Add(draft) => self
                .store
                .add_registration(&draft)
                .map(|r| format!("Registration {} added", r.registration)),
            RegistrationAction::Update(id, draft) => self
                .store
                .update_registration(&id, &draft)
                .map(|r| format!("Registration {} updated", r.registration)),
            RegistrationAction::SetStatus(id, status) => self
                .store
                .set_registration_status(&id, status)
                .map(|()| format!("Registration set {}", status.as_str())),
            RegistrationAction::Delete(id) => self
                .store
                .delete_registration(&id)
                .map(|()| "Registration deleted".to_string()),
        };
        match result {
            Ok(message) => {
                if from_form {
                    self.registration_form.reset();
                }
                self.toasts.notify(Notice::success(message));
            }
            Err(e) => self.toasts.notify(Notice::error(e.to_string())),
        }
        self.reload_registrations();
        let editing_gone = self
            .registration_form
            .editing
            .as_ref()
            .is_some_and(|id| !self.registrations.iter().any(|r| &r.id == id));
        if editing_gone {
            self.registration_form.reset();
        }
    }

    pub fn import_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        let imported = flight_gantt_app::io::import_csv(&path)
            .and_then(|(flights, skipped)| Ok((self.store.append_flights(flights)?, skipped)));
        match imported {
            Ok((count, 0)) => self
                .toasts
                .notify(Notice::success(format!("Imported {count} flights"))),
            Ok((count, skipped)) => self.toasts.notify(Notice::success(format!(
                "Imported {count} flights ({skipped} rows skipped)"
            ))),
            Err(e) => self
                .toasts
                .notify(Notice::error(format!("CSV import failed: {e}"))),
        }
        self.reload();
    }

    pub fn export_csv(&mut self) {
        let flights = self.filter.apply(&self.flights);
        if flights.is_empty() {
            self.toasts.notify(Notice::info("Nothing to export"));
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("flights.csv")
            .save_file()
        {
            match flight_gantt_app::io::export_csv(&flights, &path) {
                Ok(count) => self
                    .toasts
                    .notify(Notice::success(format!("Exported {count} flights to CSV"))),
                Err(e) => self
                    .toasts
                    .notify(Notice::error(format!("CSV export failed: {e}"))),
            }
        }
    }

    pub fn open_data_folder(&mut self) {
        let dir = self
            .store
            .path()
            .and_then(|p| p.parent())
            .map_or_else(|| self.paths.data_dir.clone(), |p| p.to_path_buf());
        if let Err(e) = open::that(&dir) {
            self.toasts
                .notify(Notice::error(format!("Could not open {}: {e}", dir.display())));
        }
    }

    pub fn save_config(&mut self) {
        if let Err(e) = self.config.save(&self.paths.settings_file()) {
            self.toasts
                .notify(Notice::error(format!("Could not save settings: {e}")));
        }
    }

    /// Keep the persisted zoom in step with the chart.
    fn sync_zoom(&mut self) {
        if (self.engine.viewport.zoom - self.config.zoom).abs() > f32::EPSILON {
            self.config.zoom = self.engine.viewport.zoom;
            self.save_config();
        }
    }

    // --- Activity ---

    pub fn show_activity_for(&mut self, flight_id: Option<String>) {
        self.activity_flight = flight_id;
        self.refresh_activity();
        self.tab = Tab::Activity;
    }

    fn refresh_activity(&mut self) {
        match self.store.activity_log(self.activity_flight.as_deref()) {
            Ok(entries) => self.activity = entries,
            Err(e) => self
                .toasts
                .notify(Notice::error(format!("Could not load activity: {e}"))),
        }
    }

    fn open_details(&mut self, id: &str) {
        match self.flights.iter().find(|f| f.id == id) {
            Some(flight) => self.details = Some(DetailsDraft::of(flight)),
            None => self.toasts.notify(Notice::error("Flight no longer exists")),
        }
    }

    fn delete_flight(&mut self, id: &str) {
        let Some(flight) = self.flights.iter().find(|f| f.id == id).cloned() else {
            return;
        };
        if let Err(e) = self.engine.request_delete(&flight) {
            self.toasts.notify(Notice::error(e.to_string()));
        }
    }

    fn show_activity_tab(&mut self, ui: &mut egui::Ui) {
        let label = self.activity_flight.as_ref().map(|id| {
            self.flights
                .iter()
                .find(|f| &f.id == id)
                .map_or_else(|| "deleted flight".to_string(), |f| f.flight_no.clone())
        });
        ui.horizontal(|ui| {
            if ui.button(format!("{} Refresh", icons::ARROWS_CLOCKWISE)).clicked() {
                self.refresh_activity();
            }
            if self.activity_flight.is_some() && ui.button("All flights").clicked() {
                self.show_activity_for(None);
            }
        });
        ui.add_space(4.0);
        ui::summary_view::show_activity_log(&self.activity, label.as_deref(), ui);
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let notices: Vec<Notice> = self.toasts.visible(Instant::now()).cloned().collect();
        if notices.is_empty() {
            return;
        }
        ctx.request_repaint_after(Duration::from_millis(250));

        let mut dismiss = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (i, notice) in notices.iter().enumerate() {
                    let (icon, color) = match notice.kind {
                        NoticeKind::Success => (icons::CHECK_CIRCLE, ui::theme::SUCCESS),
                        NoticeKind::Error => (icons::WARNING_CIRCLE, ui::theme::ERROR),
                        NoticeKind::Info => (icons::INFO, ui::theme::ACCENT),
                    };
                    let response = egui::Frame::popup(ui.style())
                        .stroke(Stroke::new(1.0, color))
                        .show(ui, |ui| {
                            ui.label(RichText::new(format!("{icon}  {}", notice.message)).color(color));
                        })
                        .response
                        .interact(egui::Sense::click());
                    if response.clicked() {
                        dismiss = Some(i);
                    }
                }
            });
        if let Some(i) = dismiss {
            self.toasts.dismiss(i);
        }
    }
}

impl eframe::App for FlightGanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx, self.config.dark_mode);

        // Settled changes arrive with a freshly fetched list.
        if let Some(flights) = self.engine.poll(&mut self.toasts) {
            self.flights = flights;
            if self.tab == Tab::Activity {
                self.refresh_activity();
            }
        }
        if self.engine.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });
        self.sync_zoom();

        let filtered = self.filter.apply(&self.flights);
        egui::TopBottomPanel::top("dashboard").show(ctx, |ui| {
            ui.add_space(4.0);
            ui::summary_view::show_dashboard(&DashboardStats::compute(&filtered), ui);
            ui.add_space(4.0);
        });

        if !matches!(self.tab, Tab::Activity | Tab::Registrations) {
            egui::SidePanel::left("filters")
                .default_width(200.0)
                .resizable(true)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        let timeline = (self.tab == Tab::Gantt).then_some(&mut self.timeline);
                        ui::filter_panel::show_filter_panel(&mut self.filter, timeline, &self.flights, ui);
                    });
                });
        }

        let mut open_details: Option<String> = None;
        let mut delete: Option<String> = None;
        let mut registration_action = RegistrationAction::None;
        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Gantt => {
                let visible = self.timeline.apply(&filtered);
                let style = ChartStyle {
                    colors: &self.colors,
                    color_by: self.config.color_by,
                    palette: ui::theme::palette(self.config.dark_mode),
                };
                if let ChartEvent::OpenDetails(id) = ui::gantt_chart::show_gantt_chart(
                    &mut self.engine,
                    &visible,
                    &self.flights,
                    &style,
                    &mut self.toasts,
                    ui,
                ) {
                    open_details = Some(id);
                }
            }
            Tab::Flights => {
                let shown = self.engine.display_flights(&filtered);
                let selected = self.details.as_ref().map(|d| d.flight_id.as_str());
                match ui::flight_table::show_flight_table(
                    &shown,
                    &self.engine,
                    &self.colors,
                    self.config.color_by,
                    selected,
                    ui,
                ) {
                    ui::flight_table::FlightTableAction::Open(id) => open_details = Some(id),
                    ui::flight_table::FlightTableAction::Delete(id) => delete = Some(id),
                    ui::flight_table::FlightTableAction::None => {}
                }
            }
            Tab::Weekly => ui::summary_view::show_period_summary(&filtered, Period::Week, ui),
            Tab::Monthly => ui::summary_view::show_period_summary(&filtered, Period::Month, ui),
            Tab::Registrations => {
                registration_action = ui::registration_tab::show_registration_tab(
                    &self.registrations,
                    &mut self.registration_form,
                    ui,
                );
            }
            Tab::Activity => self.show_activity_tab(ui),
        });
        self.apply_registration(registration_action);

        if let Some(id) = open_details {
            self.open_details(&id);
        }
        if let Some(id) = delete {
            self.delete_flight(&id);
        }

        // Dialogs
        ui::dialogs::show_details_dialog(self, ctx);
        ui::dialogs::show_reason_dialog(self, ctx);
        if self.show_colors {
            ui::dialogs::show_colors_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        self.show_toasts(ctx);
    }
}
