//! Time geometry for the scheduling grid.
//!
//! Pure conversions between clock time (`HH:MM`), minutes since midnight and
//! vertical pixel offsets inside a room column. Nothing here touches state.

use thiserror::Error;

use crate::models::settings::ScheduleConfig;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Raised for anything that is not a 24-hour `HH:MM` string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time '{input}': expected HH:MM (24-hour)")]
pub struct TimeFormatError {
    pub input: String,
}

impl TimeFormatError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Parse `HH:MM` into minutes since midnight.
///
/// `24:00` is accepted so the grid's closing edge can be expressed.
pub fn time_to_minutes(time: &str) -> Result<u32, TimeFormatError> {
    let (hours, minutes) = time
        .trim()
        .split_once(':')
        .ok_or_else(|| TimeFormatError::new(time))?;

    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(TimeFormatError::new(time));
    }

    let hours: u32 = hours.parse().map_err(|_| TimeFormatError::new(time))?;
    let minutes: u32 = minutes.parse().map_err(|_| TimeFormatError::new(time))?;

    if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(TimeFormatError::new(time));
    }

    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as zero-padded `HH:MM`. Does not wrap: 1440 is `24:00`.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Number of one-hour rows a surgery covers in fixed-row layouts
pub fn row_span(duration_minutes: u32) -> u32 {
    duration_minutes.div_ceil(60)
}

/// Vertical layout of one day in the room grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    start_minutes: u32,
    end_minutes: u32,
    snap_interval: u32,
    pixels_per_minute: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(8, 24, 15, 1.0)
    }
}

impl GridGeometry {
    pub fn new(start_hour: u32, end_hour: u32, snap_interval: u32, pixels_per_minute: f32) -> Self {
        let start_minutes = start_hour.min(23) * 60;
        let end_minutes = (end_hour.min(24) * 60).max(start_minutes + 60);
        Self {
            start_minutes,
            end_minutes,
            snap_interval: snap_interval.max(1),
            pixels_per_minute: if pixels_per_minute > 0.0 {
                pixels_per_minute
            } else {
                1.0
            },
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            config.start_hour,
            config.end_hour,
            config.snap_interval_minutes,
            config.pixels_per_minute,
        )
    }

    pub fn start_of_day_minutes(&self) -> u32 {
        self.start_minutes
    }

    pub fn end_of_day_minutes(&self) -> u32 {
        self.end_minutes
    }

    pub fn snap_interval(&self) -> u32 {
        self.snap_interval
    }

    pub fn pixels_per_minute(&self) -> f32 {
        self.pixels_per_minute
    }

    /// Minutes covered by the grid
    pub fn total_minutes(&self) -> u32 {
        self.end_minutes - self.start_minutes
    }

    pub fn total_height(&self) -> f32 {
        self.total_minutes() as f32 * self.pixels_per_minute
    }

    /// Pixel offset of a clock time from the grid's top edge; negative before opening
    pub fn grid_position(&self, time: &str) -> Result<f32, TimeFormatError> {
        let minutes = time_to_minutes(time)?;
        Ok((minutes as f32 - self.start_minutes as f32) * self.pixels_per_minute)
    }

    /// Snap a pointer offset (pixels from the column top) to the interval grid.
    ///
    /// Returns minutes from the grid start, always a multiple of the snap interval
    /// and within `[0, total - interval]`.
    pub fn snap_to_interval(&self, pixel_offset: f32) -> u32 {
        let interval = self.snap_interval as f32;
        let minutes = pixel_offset / self.pixels_per_minute;
        let snapped = if minutes.is_finite() {
            ((minutes / interval).round() * interval).max(0.0)
        } else {
            0.0
        };
        let max_start = self.total_minutes().saturating_sub(self.snap_interval);
        (snapped as u32).min(max_start) / self.snap_interval * self.snap_interval
    }

    /// Clock time for a snapped offset returned by [`Self::snap_to_interval`]
    pub fn time_from_position(&self, snapped_minutes: u32) -> String {
        minutes_to_time(self.start_minutes + snapped_minutes)
    }

    /// Height of a surgery block with continuous (per-minute) rendering
    pub fn block_height(&self, duration_minutes: u32) -> f32 {
        duration_minutes as f32 * self.pixels_per_minute
    }

    /// Hour labels down the left edge, including the closing hour
    pub fn hour_labels(&self) -> Vec<(String, f32)> {
        (self.start_minutes..=self.end_minutes)
            .step_by(60)
            .map(|minutes| {
                (
                    minutes_to_time(minutes),
                    (minutes - self.start_minutes) as f32 * self.pixels_per_minute,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("08:00", 480 ; "grid opening")]
    #[test_case("00:00", 0 ; "midnight")]
    #[test_case("9:30", 570 ; "single digit hour")]
    #[test_case("23:59", 1439 ; "last minute")]
    #[test_case("24:00", 1440 ; "grid closing")]
    fn test_time_to_minutes(input: &str, expected: u32) {
        assert_eq!(time_to_minutes(input), Ok(expected));
    }

    #[test_case("" ; "empty")]
    #[test_case("0800" ; "no separator")]
    #[test_case("08:5" ; "single digit minutes")]
    #[test_case("08:60" ; "minutes overflow")]
    #[test_case("24:15" ; "past closing")]
    #[test_case("ab:cd" ; "letters")]
    #[test_case("-1:00" ; "negative")]
    fn test_time_to_minutes_rejects(input: &str) {
        assert!(time_to_minutes(input).is_err());
    }

    #[test]
    fn test_minutes_to_time_pads() {
        assert_eq!(minutes_to_time(5), "00:05");
        assert_eq!(minutes_to_time(545), "09:05");
        assert_eq!(minutes_to_time(1440), "24:00");
    }

    #[test]
    fn test_grid_position_relative_to_opening() {
        let grid = GridGeometry::default();
        assert_eq!(grid.grid_position("08:00").unwrap(), 0.0);
        assert_eq!(grid.grid_position("10:30").unwrap(), 150.0);
        assert_eq!(grid.grid_position("07:00").unwrap(), -60.0);
    }

    #[test]
    fn test_snap_rounds_to_nearest_interval() {
        let grid = GridGeometry::default();
        assert_eq!(grid.snap_to_interval(0.0), 0);
        assert_eq!(grid.snap_to_interval(7.0), 0);
        assert_eq!(grid.snap_to_interval(8.0), 15);
        assert_eq!(grid.snap_to_interval(61.0), 60);
        assert_eq!(grid.time_from_position(grid.snap_to_interval(61.0)), "09:00");
    }

    #[test]
    fn test_snap_clamps_to_grid() {
        let grid = GridGeometry::default();
        assert_eq!(grid.snap_to_interval(-40.0), 0);
        assert_eq!(grid.snap_to_interval(10_000.0), 16 * 60 - 15);
        assert_eq!(grid.snap_to_interval(f32::NAN), 0);
    }

    #[test]
    fn test_snap_respects_scale() {
        let grid = GridGeometry::new(8, 24, 15, 2.0);
        assert_eq!(grid.snap_to_interval(120.0), 60);
        assert_eq!(grid.block_height(90), 180.0);
    }

    #[test]
    fn test_row_span_rounds_up() {
        assert_eq!(row_span(60), 1);
        assert_eq!(row_span(61), 2);
        assert_eq!(row_span(135), 3);
    }

    #[test]
    fn test_hour_labels_cover_grid() {
        let labels = GridGeometry::default().hour_labels();
        assert_eq!(labels.len(), 17);
        assert_eq!(labels.first().unwrap().0, "08:00");
        assert_eq!(labels.last().unwrap(), &("24:00".to_string(), 960.0));
    }
}
