// Dashboard module
// Aggregates computed by the backend analytics endpoints

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `GET /api/dashboard/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub total_surgeries: u64,
    pub pending_surgeries: u64,
    pub scheduled_surgeries: u64,
    pub completed_surgeries: u64,
    pub cancelled_surgeries: u64,
    pub total_doctors: u64,
    pub active_doctors: u64,
    pub total_users: u64,
    pub active_users: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelinePoint {
    pub date: String,
    pub count: u64,
    pub completed: u64,
    pub cancelled: u64,
}

/// `GET /api/dashboard/surgery-analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurgeryAnalytics {
    pub period: String,
    pub total_surgeries: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub by_operating_room: BTreeMap<String, u64>,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentPatient {
    pub id: serde_json::Value,
    pub full_name: String,
    pub rut: String,
    pub created_at: String,
    #[serde(rename = "totalSurgeries")]
    pub total_surgeries: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthCount {
    pub month: String,
    pub count: u64,
}

/// `GET /api/dashboard/patient-analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientAnalytics {
    pub total_patients: u64,
    pub active_patients: u64,
    pub inactive_patients: u64,
    pub new_patients_this_month: u64,
    pub new_patients_this_week: u64,
    pub recent_patients: Vec<RecentPatient>,
    pub patients_by_month: Vec<MonthCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorStat {
    pub id: serde_json::Value,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "totalSurgeries")]
    pub total_surgeries: Option<u64>,
    #[serde(rename = "completedSurgeries")]
    pub completed_surgeries: Option<u64>,
    #[serde(rename = "pendingSurgeries")]
    pub pending_surgeries: Option<u64>,
    #[serde(rename = "averageDuration")]
    pub average_duration: f64,
    #[serde(rename = "successRate")]
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopPerformer {
    pub doctor_id: serde_json::Value,
    pub doctor_name: String,
    pub total_surgeries: Option<u64>,
    pub success_rate: f64,
}

/// `GET /api/dashboard/doctor-performance`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorPerformance {
    pub total_doctors: u64,
    pub active_doctors: u64,
    pub doctor_stats: Vec<DoctorStat>,
    pub top_performers: Vec<TopPerformer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSurgery {
    pub id: String,
    pub surgery_type: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub start_time: String,
    pub duration: u32,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomUsage {
    pub name: String,
    pub total_slots: u32,
    pub occupied_slots: u32,
    pub utilization_rate: f64,
    pub surgeries: Vec<RoomSurgery>,
}

/// `GET /api/dashboard/room-utilization`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomUtilization {
    pub date: String,
    pub rooms: Vec<RoomUsage>,
    pub overall_utilization: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenuePeriod {
    pub total_revenue: f64,
    pub total_surgeries: u64,
    pub average_per_surgery: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenueGrowth {
    pub revenue_growth: f64,
    pub surgeries_growth: f64,
}

/// `GET /api/dashboard/revenue-analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenueAnalytics {
    pub this_month: RevenuePeriod,
    pub last_month: RevenuePeriod,
    pub growth: RevenueGrowth,
    pub by_month: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodayStats {
    pub scheduled_surgeries: u64,
    pub completed_surgeries: u64,
    pub in_progress_surgeries: u64,
    pub pending_surgeries: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpcomingSurgery {
    pub id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub surgery_type: String,
    pub scheduled_time: String,
    pub operating_room: String,
    pub priority: String,
}

/// `GET /api/dashboard/realtime`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeDashboard {
    pub current_date_time: String,
    pub today_stats: TodayStats,
    pub active_doctors: u64,
    pub busy_operating_rooms: u64,
    pub next_surgeries: Vec<UpcomingSurgery>,
}

/// `GET /api/dashboard/alerts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardAlerts {
    pub alerts: Vec<serde_json::Value>,
    pub unread_count: u64,
}

/// Period accepted by the surgery analytics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyticsPeriod {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl AnalyticsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsPeriod::Week => "week",
            AnalyticsPeriod::Month => "month",
            AnalyticsPeriod::Quarter => "quarter",
            AnalyticsPeriod::Year => "year",
        }
    }
}

/// Everything the dashboard screen shows, fetched together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: Option<DashboardStats>,
    pub surgery_analytics: Option<SurgeryAnalytics>,
    pub patient_analytics: Option<PatientAnalytics>,
    pub doctor_performance: Option<DoctorPerformance>,
    pub room_utilization: Option<RoomUtilization>,
    pub revenue_analytics: Option<RevenueAnalytics>,
    pub realtime: Option<RealtimeDashboard>,
    pub alerts: Option<DashboardAlerts>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_dashboard_parses_camel_case() {
        let json = r#"{
            "currentDateTime": "2025-03-10T12:00:00Z",
            "todayStats": {"scheduledSurgeries": 4, "completedSurgeries": 1, "inProgressSurgeries": 1, "pendingSurgeries": 2},
            "activeDoctors": 6,
            "busyOperatingRooms": 2,
            "nextSurgeries": [{"id": "9", "patient_name": "Juan", "doctor_name": "Dr. Silva",
                               "surgery_type": "Artroscopia", "scheduled_time": "14:00",
                               "operating_room": "Pabellón 2", "priority": "high"}]
        }"#;
        let realtime: RealtimeDashboard = serde_json::from_str(json).unwrap();
        assert_eq!(realtime.today_stats.scheduled_surgeries, 4);
        assert_eq!(realtime.next_surgeries.len(), 1);
        assert_eq!(realtime.next_surgeries[0].operating_room, "Pabellón 2");
    }

    #[test]
    fn test_doctor_stats_tolerate_null_counts() {
        let json = r#"{"totalDoctors": 2, "activeDoctors": 1, "doctorStats": [
            {"id": 1, "first_name": "Ana", "last_name": "Silva", "totalSurgeries": null,
             "completedSurgeries": null, "pendingSurgeries": 3, "averageDuration": 95.5, "successRate": 0.0}
        ], "topPerformers": []}"#;
        let performance: DoctorPerformance = serde_json::from_str(json).unwrap();
        assert_eq!(performance.doctor_stats[0].total_surgeries, None);
        assert_eq!(performance.doctor_stats[0].pending_surgeries, Some(3));
    }
}
