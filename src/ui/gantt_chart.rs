use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use egui_phosphor::regular as icons;

use flight_gantt_app::model::{ColorBy, ColorSettings, Flight};
use flight_gantt_app::notify::{Notice, Notifier};
use flight_gantt_app::schedule::layout::GanttLayout;
use flight_gantt_app::schedule::time;
use flight_gantt_app::schedule::{GanttEngine, PointerOutcome};

use crate::ui::theme::{self, Palette};

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const LABEL_WIDTH: f32 = theme::LABEL_WIDTH;

/// What the chart asks of the app after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartEvent {
    None,
    OpenDetails(String),
}

pub struct ChartStyle<'a> {
    pub colors: &'a ColorSettings,
    pub color_by: ColorBy,
    pub palette: Palette,
}

/// Render the timeline for `visible` flights. `all` is the unfiltered list
/// the engine resolves dropped flights against.
pub fn show_gantt_chart(
    engine: &mut GanttEngine,
    visible: &[Flight],
    all: &[Flight],
    style: &ChartStyle<'_>,
    notifier: &mut dyn Notifier,
    ui: &mut Ui,
) -> ChartEvent {
    let mut event = ChartEvent::None;

    // Handle zoom with scroll wheel
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            engine.viewport.zoom_in();
        } else if scroll_delta.y < 0.0 {
            engine.viewport.zoom_out();
        }
    }
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) && engine.gesture().is_active() {
        engine.cancel_drag();
    }

    let grid_size = engine.relayout(visible).size;
    if engine.layout().rows.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new(format!("{}  No flights for this selection", icons::AIRPLANE_TILT))
                    .color(style.palette.text_dim),
            );
        });
        return event;
    }

    let available = ui.available_size();
    let canvas_size = Vec2::new(
        (grid_size.x + LABEL_WIDTH).max(available.x),
        (grid_size.y + HEADER_HEIGHT + 40.0).max(available.y),
    );

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(canvas_size, Sense::click_and_drag());
            let origin = response.rect.min;
            let grid_origin = origin + Vec2::new(LABEL_WIDTH, HEADER_HEIGHT);
            let to_grid = |p: Pos2| Pos2::new(p.x - grid_origin.x, p.y - grid_origin.y);

            // Pointer → engine, in grid coordinates.
            let (pressed, released, pointer) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.interact_pos(),
                )
            });
            if let Some(pos) = pointer {
                if pressed && response.hovered() {
                    if let Err(e) = engine.press(to_grid(pos)) {
                        notifier.notify(Notice::info(e.to_string()));
                    }
                } else if engine.gesture().is_active() {
                    engine.drag(to_grid(pos));
                }
                if released && engine.gesture().is_active() {
                    match engine.release(to_grid(pos), all) {
                        Ok(PointerOutcome::OpenDetails(id)) => event = ChartEvent::OpenDetails(id),
                        Ok(_) => {}
                        Err(e) => notifier.notify(Notice::error(e.to_string())),
                    }
                }
            }
            if engine.gesture().is_dragging() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
            }

            let shown = engine.display_flights(visible);
            let by_id: HashMap<&str, &Flight> = shown.iter().map(|f| (f.id.as_str(), f)).collect();
            let layout = engine.layout();
            let p = &style.palette;

            painter.rect_filled(response.rect, 0.0, p.bg_canvas);
            draw_rows(&painter, origin, grid_origin, layout, canvas_size.x, p);
            draw_grid(&painter, grid_origin, layout, engine, canvas_size.y, p);
            draw_timeline_header(&painter, origin, grid_origin, layout, engine, canvas_size.x, p);

            if let Some(session) = engine.gesture().session().filter(|_| engine.gesture().is_dragging()) {
                if let Some(cell) = layout.cells.iter().find(|c| &c.key == session.target_cell()) {
                    painter.rect_stroke(
                        cell.rect.translate(grid_origin.to_vec2()),
                        Rounding::same(2.0),
                        Stroke::new(1.5, p.drop_target),
                    );
                }
            }

            let mut hovered: Option<&Flight> = None;
            for bar in &layout.bars {
                let Some(&flight) = by_id.get(bar.flight_id.as_str()) else {
                    continue;
                };
                let rect = bar.rect.translate(grid_origin.to_vec2());
                let color = style.colors.color_for(flight, style.color_by);
                let pending = engine.pending(&flight.id).is_some();

                match engine.drag_preview(&flight.id) {
                    Some((delta, offset)) => {
                        draw_bar(&painter, rect, color.gamma_multiply(0.3), &flight.flight_no, false);
                        let moved = rect.translate(offset);
                        let label = match (
                            time::shift_time(&flight.std, delta),
                            time::shift_time(&flight.sta, delta),
                        ) {
                            (Ok(std), Ok(sta)) => format!("{} {std}-{sta}", flight.flight_no),
                            _ => flight.flight_no.clone(),
                        };
                        draw_bar(&painter, moved, color, &label, false);
                        painter.rect_stroke(
                            moved.expand(1.0),
                            Rounding::same(theme::BAR_ROUNDING + 1.0),
                            Stroke::new(1.5, Color32::WHITE),
                        );
                    }
                    None => {
                        let label = if rect.width() > 90.0 {
                            format!("{} {}-{}", flight.flight_no, flight.std, flight.sta)
                        } else {
                            flight.flight_no.clone()
                        };
                        draw_bar(&painter, rect, color, &label, pending);
                    }
                }

                if !engine.gesture().is_dragging() && pointer.is_some_and(|pos| rect.contains(pos)) {
                    hovered = Some(flight);
                }
            }

            if let Some(flight) = hovered {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    egui::Id::new(("flight-tip", &flight.id)),
                    |ui| {
                        ui.strong(format!("{}  {}", flight.flight_no, flight.registration));
                        ui.label(format!("{}  {} → {}", flight.date, flight.std, flight.sta));
                        if !flight.adep.is_empty() || !flight.ades.is_empty() {
                            ui.label(format!("{} → {}", flight.adep, flight.ades));
                        }
                        ui.label(format!(
                            "{} · {} · {}",
                            flight.status.label(),
                            flight.flight_type.label(),
                            flight.flight_positioning.label()
                        ));
                        if engine.pending(&flight.id).is_some() {
                            ui.label(format!("{} Saving…", icons::CLOCK));
                        }
                    },
                );
            }
        });

    event
}

fn draw_rows(
    painter: &egui::Painter,
    origin: Pos2,
    grid_origin: Pos2,
    layout: &GanttLayout,
    width: f32,
    p: &Palette,
) {
    for (i, row) in layout.rows.iter().enumerate() {
        let top = grid_origin.y + row.top;
        let row_rect = Rect::from_min_size(Pos2::new(origin.x, top), Vec2::new(width, row.height));
        if i % 2 == 1 {
            painter.rect_filled(row_rect, 0.0, p.bg_row_alt);
        }
        painter.line_segment(
            [row_rect.left_bottom(), row_rect.right_bottom()],
            Stroke::new(0.5, p.border),
        );

        painter.text(
            Pos2::new(origin.x + 8.0, top + row.height / 2.0 - 6.0),
            egui::Align2::LEFT_CENTER,
            &row.registration,
            theme::font_header(),
            p.text_primary,
        );
        painter.text(
            Pos2::new(origin.x + 8.0, top + row.height / 2.0 + 8.0),
            egui::Align2::LEFT_CENTER,
            format!("{} flights", row.flight_count),
            theme::font_sub(),
            p.text_dim,
        );
    }

    painter.line_segment(
        [
            Pos2::new(grid_origin.x, origin.y),
            Pos2::new(grid_origin.x, grid_origin.y + layout.size.y),
        ],
        Stroke::new(1.0, p.border),
    );
}

fn draw_grid(
    painter: &egui::Painter,
    grid_origin: Pos2,
    layout: &GanttLayout,
    engine: &GanttEngine,
    height: f32,
    p: &Palette,
) {
    let hour_width = engine.viewport.hour_width();
    let bottom = grid_origin.y - HEADER_HEIGHT + height;
    for col in 0..layout.dates.len() {
        let day_x = grid_origin.x + col as f32 * layout.day_width;
        for hour in 1..24 {
            let x = day_x + hour as f32 * hour_width;
            painter.line_segment(
                [Pos2::new(x, grid_origin.y), Pos2::new(x, bottom)],
                Stroke::new(0.5, p.grid_hour),
            );
        }
        painter.line_segment(
            [Pos2::new(day_x, grid_origin.y), Pos2::new(day_x, bottom)],
            Stroke::new(1.0, p.grid_day),
        );
    }
}

fn draw_timeline_header(
    painter: &egui::Painter,
    origin: Pos2,
    grid_origin: Pos2,
    layout: &GanttLayout,
    engine: &GanttEngine,
    width: f32,
    p: &Palette,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        p.bg_header,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, grid_origin.y),
            Pos2::new(origin.x + width, grid_origin.y),
        ],
        Stroke::new(1.0, p.border),
    );
    painter.text(
        Pos2::new(origin.x + 8.0, origin.y + HEADER_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        "Aircraft",
        theme::font_header(),
        p.text_secondary,
    );

    let hour_width = engine.viewport.hour_width();
    // Label every hour when there is room, otherwise every third.
    let step = if hour_width >= 28.0 { 1 } else { 3 };
    for (col, date) in layout.dates.iter().enumerate() {
        let day_x = grid_origin.x + col as f32 * layout.day_width;
        painter.text(
            Pos2::new(day_x + 6.0, origin.y + 12.0),
            egui::Align2::LEFT_CENTER,
            date,
            theme::font_header(),
            p.text_primary,
        );
        for hour in (0..24).step_by(step) {
            painter.text(
                Pos2::new(day_x + hour as f32 * hour_width + 2.0, origin.y + 31.0),
                egui::Align2::LEFT_CENTER,
                format!("{hour:02}"),
                theme::font_sub(),
                p.text_dim,
            );
        }
    }
}

fn draw_bar(painter: &egui::Painter, rect: Rect, color: Color32, label: &str, pending: bool) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(rect.translate(Vec2::new(1.0, 1.5)), rounding, Color32::from_black_alpha(35));
    let fill = if pending { color.gamma_multiply(0.6) } else { color };
    painter.rect_filled(rect, rounding, fill);
    if pending {
        painter.rect_stroke(rect, rounding, Stroke::new(1.0, Color32::from_white_alpha(160)));
    }

    if rect.width() > 24.0 {
        let text = if pending {
            format!("{} {label}", icons::CLOCK)
        } else {
            label.to_string()
        };
        let galley = painter.layout_no_wrap(text, theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(rect.shrink(1.0));
        clipped.galley(
            Pos2::new(rect.left() + 4.0, rect.center().y - galley.size().y / 2.0),
            galley,
            Color32::TRANSPARENT,
        );
    }
}
