//! Operating-room grid for one day.
//!
//! Paints the hour gutter, one column per room and the scheduled blocks on top.
//! Every column rect is registered in [`DropZones`] so the page can resolve a
//! released drag after the frame is laid out.

use chrono::{Timelike, Utc};
use egui::{Color32, Id, Pos2, Rect, RichText, Sense, Stroke, Vec2};

use super::palette::{drop_preview_color, priority_color, status_color, with_alpha};
use crate::models::surgery::ScheduledSurgery;
use crate::scheduling::store::scheduled_start;
use crate::scheduling::{
    minutes_to_time, DragController, GridGeometry, ScheduleStore, TimeSpan,
};
use crate::ui_egui::drag::DropZones;

const TIME_LABEL_WIDTH: f32 = 56.0;
const HEADER_HEIGHT: f32 = 26.0;
const MIN_COLUMN_WIDTH: f32 = 130.0;
const BLOCK_MARGIN: f32 = 3.0;

/// Vertical placement of a block inside its column, clipped to the grid
pub fn block_span(geometry: &GridGeometry, start_minutes: u32, duration: u32) -> Option<(f32, f32)> {
    let open = geometry.start_of_day_minutes();
    let close = geometry.end_of_day_minutes();
    let end = start_minutes + duration;
    if end <= open || start_minutes >= close {
        return None;
    }

    let top = (start_minutes.max(open) - open) as f32 * geometry.pixels_per_minute();
    let bottom = (end.min(close) - open) as f32 * geometry.pixels_per_minute();
    Some((top, bottom - top))
}

pub fn show(
    ui: &mut egui::Ui,
    store: &mut ScheduleStore,
    controller: &mut DragController,
    zones: &mut DropZones,
) {
    let rooms = controller.rooms().to_vec();
    if rooms.is_empty() {
        ui.label("No hay pabellones configurados");
        return;
    }

    let geometry = *controller.geometry();
    let column_width =
        ((ui.available_width() - TIME_LABEL_WIDTH) / rooms.len() as f32).max(MIN_COLUMN_WIDTH);

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.add_space(TIME_LABEL_WIDTH);
        for room in &rooms {
            ui.allocate_ui_with_layout(
                Vec2::new(column_width, HEADER_HEIGHT),
                egui::Layout::centered_and_justified(egui::Direction::TopDown),
                |ui| {
                    ui.label(RichText::new(room).strong());
                },
            );
        }
    });

    egui::ScrollArea::both()
        .id_source("room_grid_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let size = Vec2::new(
                TIME_LABEL_WIDTH + column_width * rooms.len() as f32,
                geometry.total_height(),
            );
            let (grid_rect, _) = ui.allocate_exact_size(size, Sense::hover());
            let clip = ui.clip_rect();

            paint_background(ui, grid_rect, &geometry, rooms.len(), column_width);

            for (index, room) in rooms.iter().enumerate() {
                zones.register_room(room.clone(), column_rect(grid_rect, index, column_width), clip);
            }

            paint_now_line(ui, grid_rect, &geometry, controller, column_width * rooms.len() as f32);
            paint_blocks(ui, grid_rect, &geometry, store, controller, &rooms, column_width);
            paint_drop_preview(ui, grid_rect, &geometry, store, controller, &rooms, column_width);
        });
}

fn column_rect(grid_rect: Rect, index: usize, column_width: f32) -> Rect {
    let left = grid_rect.left() + TIME_LABEL_WIDTH + index as f32 * column_width;
    Rect::from_min_size(
        Pos2::new(left, grid_rect.top()),
        Vec2::new(column_width, grid_rect.height()),
    )
}

fn paint_background(
    ui: &egui::Ui,
    grid_rect: Rect,
    geometry: &GridGeometry,
    room_count: usize,
    column_width: f32,
) {
    let painter = ui.painter();
    let visuals = ui.visuals();
    let line = Stroke::new(1.0, visuals.widgets.noninteractive.bg_stroke.color);
    let faint = Stroke::new(0.5, with_alpha(line.color, 80));
    let label_color = visuals.weak_text_color();
    let grid_left = grid_rect.left() + TIME_LABEL_WIDTH;

    let half_hour = 30.0 * geometry.pixels_per_minute();
    for (label, offset) in geometry.hour_labels() {
        let y = grid_rect.top() + offset;
        painter.line_segment([Pos2::new(grid_left, y), Pos2::new(grid_rect.right(), y)], line);
        if offset + half_hour < grid_rect.height() {
            let half = y + half_hour;
            painter.line_segment(
                [Pos2::new(grid_left, half), Pos2::new(grid_rect.right(), half)],
                faint,
            );
        }
        painter.text(
            Pos2::new(grid_left - 6.0, y),
            egui::Align2::RIGHT_TOP,
            label,
            egui::FontId::proportional(12.0),
            label_color,
        );
    }

    for index in 0..=room_count {
        let x = grid_left + index as f32 * column_width;
        painter.line_segment([Pos2::new(x, grid_rect.top()), Pos2::new(x, grid_rect.bottom())], line);
    }
}

fn paint_now_line(
    ui: &egui::Ui,
    grid_rect: Rect,
    geometry: &GridGeometry,
    controller: &DragController,
    width: f32,
) {
    let now = Utc::now();
    if now.date_naive() != controller.visible_date() {
        return;
    }

    let minutes = now.hour() * 60 + now.minute();
    let Some((offset, _)) = block_span(geometry, minutes, 1) else {
        return;
    };

    let y = grid_rect.top() + offset;
    let left = grid_rect.left() + TIME_LABEL_WIDTH;
    let color = Color32::from_rgb(255, 100, 100);
    let painter = ui.painter();
    painter.circle_filled(Pos2::new(left - 4.0, y), 3.0, color);
    painter.line_segment([Pos2::new(left, y), Pos2::new(left + width, y)], Stroke::new(2.0, color));
}

fn block_label(surgery: &ScheduledSurgery, start_minutes: u32) -> String {
    format!(
        "{} {}\n{}\n{}",
        minutes_to_time(start_minutes),
        surgery.surgery.patient_name,
        surgery.surgery.surgery_type,
        surgery.surgery.doctor_name
    )
}

fn paint_blocks(
    ui: &mut egui::Ui,
    grid_rect: Rect,
    geometry: &GridGeometry,
    store: &mut ScheduleStore,
    controller: &mut DragController,
    rooms: &[String],
    column_width: f32,
) {
    let visible: Vec<ScheduledSurgery> = store
        .surgeries_for_date(controller.visible_date())
        .into_iter()
        .cloned()
        .collect();
    let dragged_id = controller.state().dragged_id().map(str::to_string);

    for surgery in visible {
        let Some(index) = rooms.iter().position(|room| *room == surgery.operating_room) else {
            continue;
        };
        let Some((_, start_minutes)) = scheduled_start(surgery.scheduled_date.as_deref()) else {
            continue;
        };
        let Some((top, height)) = block_span(geometry, start_minutes, surgery.duration_minutes()) else {
            continue;
        };

        let column = column_rect(grid_rect, index, column_width);
        let rect = Rect::from_min_size(
            Pos2::new(column.left() + BLOCK_MARGIN, column.top() + top),
            Vec2::new(column_width - 2.0 * BLOCK_MARGIN, height.max(14.0)),
        );

        let in_flight = store
            .lifecycle(surgery.id())
            .is_some_and(|lifecycle| lifecycle.is_in_flight());
        let being_dragged = dragged_id.as_deref() == Some(surgery.id());
        let selected = store.selected_id() == Some(surgery.id());

        let alpha = if being_dragged {
            70
        } else if in_flight {
            140
        } else {
            220
        };
        let fill = with_alpha(priority_color(surgery.surgery.priority), alpha);
        let stroke = if selected {
            Stroke::new(2.5, ui.visuals().selection.stroke.color)
        } else {
            Stroke::new(1.0, status_color(surgery.status))
        };

        let painter = ui.painter();
        painter.rect_filled(rect, 4.0, fill);
        painter.rect_stroke(rect, 4.0, stroke);
        painter.with_clip_rect(rect.shrink(3.0)).text(
            rect.left_top() + Vec2::new(5.0, 3.0),
            egui::Align2::LEFT_TOP,
            block_label(&surgery, start_minutes),
            egui::FontId::proportional(11.5),
            Color32::WHITE,
        );

        let response = ui
            .interact(rect, Id::new(("surgery_block", surgery.id())), Sense::click_and_drag())
            .on_hover_text(format!(
                "{} · {} · {}",
                surgery.surgery.surgery_type,
                surgery.surgery.duration_label(),
                surgery.status.label()
            ));

        if response.drag_started() && !in_flight {
            controller.begin_scheduled_drag(surgery.clone());
        } else if response.clicked() {
            store.select(Some(surgery.id()));
        }
        if response.hovered() && !in_flight {
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::Grab);
        }
    }
}

fn paint_drop_preview(
    ui: &egui::Ui,
    grid_rect: Rect,
    geometry: &GridGeometry,
    store: &ScheduleStore,
    controller: &DragController,
    rooms: &[String],
    column_width: f32,
) {
    if !controller.is_dragging() {
        return;
    }
    let Some(pointer) = ui.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    if !ui.clip_rect().contains(pointer) {
        return;
    }

    let Some((index, column)) = rooms
        .iter()
        .enumerate()
        .map(|(index, _)| (index, column_rect(grid_rect, index, column_width)))
        .find(|(_, column)| column.contains(pointer))
    else {
        return;
    };

    let state = controller.state();
    let duration = state.duration_minutes();
    let start = geometry.start_of_day_minutes() + geometry.snap_to_interval(pointer.y - column.top());
    let conflicting = store
        .conflict_for(
            controller.visible_date(),
            &rooms[index],
            TimeSpan::new(start, duration),
            state.dragged_id(),
        )
        .is_some();

    let Some((top, height)) = block_span(geometry, start, duration) else {
        return;
    };
    let rect = Rect::from_min_size(
        Pos2::new(column.left() + BLOCK_MARGIN, column.top() + top),
        Vec2::new(column_width - 2.0 * BLOCK_MARGIN, height),
    );

    let painter = ui.painter();
    painter.rect_filled(rect, 4.0, drop_preview_color(conflicting));
    painter.text(
        rect.left_top() + Vec2::new(5.0, 3.0),
        egui::Align2::LEFT_TOP,
        minutes_to_time(start),
        egui::FontId::proportional(12.0),
        Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        GridGeometry::new(8, 24, 15, 1.0)
    }

    #[test]
    fn test_block_span_inside_grid() {
        assert_eq!(block_span(&geometry(), 9 * 60, 90), Some((60.0, 90.0)));
    }

    #[test]
    fn test_block_span_clipped_at_opening() {
        assert_eq!(block_span(&geometry(), 7 * 60 + 30, 60), Some((0.0, 30.0)));
    }

    #[test]
    fn test_block_span_outside_grid() {
        assert_eq!(block_span(&geometry(), 6 * 60, 60), None);
        assert_eq!(block_span(&geometry(), 8 * 60, 0), None);
    }
}
