use egui::{Context, Id, Pos2, Rect, RichText, Vec2};

/// Where a released drag lands
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    PendingList,
    /// `offset_y` is measured from the top of the room column (grid opening time)
    Room { room: String, offset_y: f32 },
    Outside,
}

/// Screen rectangles that accept drops, collected while rendering a frame
#[derive(Debug, Clone, Default)]
pub struct DropZones {
    pending: Option<Rect>,
    rooms: Vec<RoomZone>,
}

#[derive(Debug, Clone)]
struct RoomZone {
    room: String,
    /// Full column; its top edge is the grid opening time
    column: Rect,
    /// Part of the column currently on screen
    visible: Rect,
}

impl DropZones {
    pub fn clear(&mut self) {
        self.pending = None;
        self.rooms.clear();
    }

    pub fn register_pending(&mut self, rect: Rect) {
        self.pending = Some(rect);
    }

    pub fn register_room(&mut self, room: impl Into<String>, column: Rect, visible: Rect) {
        self.rooms.push(RoomZone {
            room: room.into(),
            column,
            visible: column.intersect(visible),
        });
    }

    pub fn room_rect(&self, room: &str) -> Option<Rect> {
        self.rooms
            .iter()
            .find(|zone| zone.room == room)
            .map(|zone| zone.column)
    }

    pub fn target_at(&self, pos: Pos2) -> DropTarget {
        if self.pending.is_some_and(|rect| rect.contains(pos)) {
            return DropTarget::PendingList;
        }

        self.rooms
            .iter()
            .find(|zone| zone.visible.contains(pos))
            .map(|zone| DropTarget::Room {
                room: zone.room.clone(),
                offset_y: pos.y - zone.column.top(),
            })
            .unwrap_or(DropTarget::Outside)
    }
}

/// Label that follows the pointer while something is being dragged
pub fn show_drag_badge(ctx: &Context, pointer: Pos2, text: &str) {
    egui::Area::new(Id::new("surgery_drag_badge"))
        .fixed_pos(pointer + Vec2::new(12.0, 12.0))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(RichText::new(text).strong());
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn zones() -> DropZones {
        let mut zones = DropZones::default();
        zones.register_pending(Rect::from_min_max(pos2(0.0, 0.0), pos2(200.0, 800.0)));
        let screen = Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 1200.0));
        zones.register_room("Pabellón 1", Rect::from_min_max(pos2(260.0, 100.0), pos2(400.0, 1060.0)), screen);
        zones.register_room("Pabellón 2", Rect::from_min_max(pos2(400.0, 100.0), pos2(540.0, 1060.0)), screen);
        zones
    }

    #[test]
    fn test_pointer_over_room_reports_offset() {
        assert_eq!(
            zones().target_at(pos2(450.0, 160.0)),
            DropTarget::Room {
                room: "Pabellón 2".to_string(),
                offset_y: 60.0,
            }
        );
    }

    #[test]
    fn test_scrolled_column_measures_from_column_top() {
        let mut zones = DropZones::default();
        let column = Rect::from_min_max(pos2(260.0, -300.0), pos2(400.0, 660.0));
        let viewport = Rect::from_min_max(pos2(200.0, 100.0), pos2(900.0, 600.0));
        zones.register_room("Pabellón 1", column, viewport);

        assert_eq!(
            zones.target_at(pos2(300.0, 120.0)),
            DropTarget::Room {
                room: "Pabellón 1".to_string(),
                offset_y: 420.0,
            }
        );
        assert_eq!(zones.target_at(pos2(300.0, 50.0)), DropTarget::Outside);
        assert_eq!(zones.room_rect("Pabellón 1"), Some(column));
    }

    #[test]
    fn test_pointer_over_pending_list() {
        assert_eq!(zones().target_at(pos2(50.0, 50.0)), DropTarget::PendingList);
    }

    #[test]
    fn test_pointer_elsewhere_is_outside() {
        assert_eq!(zones().target_at(pos2(230.0, 300.0)), DropTarget::Outside);

        let mut zones = zones();
        zones.clear();
        assert_eq!(zones.target_at(pos2(450.0, 160.0)), DropTarget::Outside);
    }
}
