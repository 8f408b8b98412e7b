//! Transient notices in the bottom-right corner.
//!
//! Posting a message that is already on screen refreshes that notice and bumps
//! its repeat count instead of stacking a copy, so a background refresh that
//! keeps failing shows up once. At most `MAX_VISIBLE` notices are kept and the
//! oldest one goes first.

use std::time::{Duration, Instant};

use egui::{Color32, Context, RichText};

use crate::ui_egui::views::palette::{with_alpha, ERROR_TEXT, SUCCESS_TEXT};

pub const MAX_VISIBLE: usize = 4;

const WIDTH: f32 = 340.0;
const MARGIN: f32 = 12.0;
const FADE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    fn accent(self) -> Color32 {
        match self {
            NoticeKind::Success => SUCCESS_TEXT,
            NoticeKind::Info => Color32::from_rgb(66, 133, 244),
            NoticeKind::Warning => Color32::from_rgb(230, 126, 0),
            NoticeKind::Error => ERROR_TEXT,
        }
    }

    /// Failures stay up long enough to be read
    fn lifetime(self) -> Duration {
        match self {
            NoticeKind::Error | NoticeKind::Warning => Duration::from_secs(6),
            NoticeKind::Success | NoticeKind::Info => Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
struct Notice {
    kind: NoticeKind,
    message: String,
    repeats: u32,
    expires_at: Instant,
}

impl Notice {
    fn text(&self) -> String {
        if self.repeats > 1 {
            format!("{} (×{})", self.message, self.repeats)
        } else {
            self.message.clone()
        }
    }

    /// 1.0 until the final fade, then down to 0.0 at expiry
    fn opacity(&self, now: Instant) -> f32 {
        let left = self.expires_at.saturating_duration_since(now);
        if left >= FADE {
            1.0
        } else {
            left.as_secs_f32() / FADE.as_secs_f32()
        }
    }
}

#[derive(Debug, Default)]
pub struct ToastManager {
    notices: Vec<Notice>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Success, message.into(), Instant::now());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Info, message.into(), Instant::now());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Warning, message.into(), Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Error, message.into(), Instant::now());
    }

    fn post(&mut self, kind: NoticeKind, message: String, now: Instant) {
        self.retain_live(now);
        let expires_at = now + kind.lifetime();

        if let Some(index) = self
            .notices
            .iter()
            .position(|notice| notice.kind == kind && notice.message == message)
        {
            let mut notice = self.notices.remove(index);
            notice.repeats += 1;
            notice.expires_at = expires_at;
            self.notices.push(notice);
            return;
        }

        if self.notices.len() >= MAX_VISIBLE {
            self.notices.remove(0);
        }
        self.notices.push(Notice {
            kind,
            message,
            repeats: 1,
            expires_at,
        });
    }

    fn retain_live(&mut self, now: Instant) {
        self.notices.retain(|notice| notice.expires_at > now);
    }

    pub fn has_toasts(&self) -> bool {
        !self.notices.is_empty()
    }

    pub fn render(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.retain_live(now);
        if self.notices.is_empty() {
            return;
        }
        if self.notices.iter().any(|notice| notice.opacity(now) < 1.0) {
            ctx.request_repaint();
        }

        egui::Area::new(egui::Id::new("clinic_notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-MARGIN, -MARGIN))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.spacing_mut().item_spacing.y = 6.0;
                for notice in &self.notices {
                    let alpha = notice.opacity(now);
                    let accent = with_alpha(notice.kind.accent(), (255.0 * alpha) as u8);
                    egui::Frame::none()
                        .fill(with_alpha(Color32::WHITE, (240.0 * alpha) as u8))
                        .stroke(egui::Stroke::new(1.5, accent))
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                        .show(ui, |ui| {
                            ui.set_width(WIDTH - 24.0);
                            ui.label(RichText::new(notice.text()).color(accent));
                        });
                }
            });
    }
}
