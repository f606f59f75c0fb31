//! Pure derivations behind the dashboard: visible list, summary cards and the
//! specialty filter options. Recomputed from scratch on every call.

use std::collections::HashSet;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::models::{Appointment, AppointmentStatus, FilterState, SpecialtyFilter};
use crate::store::StoreSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub scheduled_today: usize,
    pub completed: usize,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub visible: Vec<Appointment>,
    pub stats: SummaryStats,
    pub specialties: Vec<SpecialtyFilter>,
    pub filters: FilterState,
    pub loading: bool,
}

impl Dashboard {
    pub fn from_snapshot<Tz: TimeZone>(snapshot: &StoreSnapshot, now: &DateTime<Tz>) -> Self {
        Self {
            visible: visible(&snapshot.appointments, &snapshot.filters),
            stats: summarize_at(&snapshot.appointments, now),
            specialties: specialty_options(&snapshot.appointments),
            filters: snapshot.filters.clone(),
            loading: snapshot.loading,
        }
    }
}

/// Search hits patient or doctor name (case-insensitive), AND status, AND specialty.
pub fn matches(appointment: &Appointment, filters: &FilterState) -> bool {
    let needle = filters.search_text.to_lowercase();
    let search_hit = appointment.patient_name.to_lowercase().contains(&needle)
        || appointment.doctor_name.to_lowercase().contains(&needle);

    search_hit
        && filters.status_filter.accepts(appointment.status)
        && filters.specialty_filter.accepts(&appointment.specialty)
}

/// Matching records, most recent `scheduled_at` first. Ties keep collection order.
pub fn visible(appointments: &[Appointment], filters: &FilterState) -> Vec<Appointment> {
    let mut out: Vec<Appointment> = appointments
        .iter()
        .filter(|a| matches(a, filters))
        .cloned()
        .collect();
    out.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
    out
}

/// Stats where "today" is the calendar date of `now` in `now`'s time zone.
pub fn summarize_at<Tz: TimeZone>(appointments: &[Appointment], now: &DateTime<Tz>) -> SummaryStats {
    let tz = now.timezone();
    let today = now.date_naive();

    let scheduled_today = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Scheduled)
        .filter(|a| a.scheduled_at.with_timezone(&tz).date_naive() == today)
        .count();
    let completed = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .count();

    SummaryStats {
        total: appointments.len(),
        scheduled_today,
        completed,
    }
}

/// Stats against the local clock.
pub fn summarize(appointments: &[Appointment]) -> SummaryStats {
    summarize_at(appointments, &Local::now())
}

/// `All`, then each distinct specialty in first-seen order.
pub fn specialty_options(appointments: &[Appointment]) -> Vec<SpecialtyFilter> {
    let mut seen = HashSet::new();
    std::iter::once(SpecialtyFilter::All)
        .chain(
            appointments
                .iter()
                .filter(|a| seen.insert(a.specialty.as_str()))
                .map(|a| SpecialtyFilter::Only(a.specialty.clone())),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, FixedOffset, Utc};

    use crate::models::{AppointmentId, StatusFilter};

    fn at(id: i64, patient: &str, doctor: &str, specialty: &str, ts: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: AppointmentId(id),
            patient_name: patient.into(),
            doctor_name: doctor.into(),
            specialty: specialty.into(),
            scheduled_at: ts,
            status,
            notes: None,
        }
    }

    fn day(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, 0, 0).unwrap()
    }

    fn sample() -> Vec<Appointment> {
        vec![
            at(1, "John Doe", "Dr. House", "Cardiology", day(9), AppointmentStatus::Scheduled),
            at(2, "Anna", "Dr. Grey", "Dermatology", day(11), AppointmentStatus::Scheduled),
            at(3, "Carl Jonas", "Dr. House", "Cardiology", day(8), AppointmentStatus::Cancelled),
            at(4, "Maria", "Dr. Jo Park", "Neurology", day(7) - Duration::days(1), AppointmentStatus::Completed),
        ]
    }

    fn ids(list: &[Appointment]) -> Vec<i64> {
        list.iter().map(|a| a.id.0).collect()
    }

    #[test]
    fn search_matches_patient_or_doctor_case_insensitively() {
        let filters = FilterState {
            search_text: "JO".into(),
            ..FilterState::default()
        };
        // John Doe, Carl Jonas (patients) and Dr. Jo Park (doctor); newest first.
        assert_eq!(ids(&visible(&sample(), &filters)), vec![1, 3, 4]);
    }

    #[test]
    fn search_only_excludes_non_matching_patient() {
        let records = vec![
            at(1, "John Doe", "Dr. Smith", "Cardiology", day(9), AppointmentStatus::Scheduled),
            at(2, "Anna", "Dr. Smith", "Cardiology", day(10), AppointmentStatus::Scheduled),
        ];
        let filters = FilterState {
            search_text: "jo".into(),
            ..FilterState::default()
        };
        let out = visible(&records, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].patient_name, "John Doe");
    }

    #[test]
    fn search_whitespace_is_matched_literally() {
        let records = vec![
            at(1, "Anna", "Dr. Smith", "Cardiology", day(9), AppointmentStatus::Scheduled),
            at(2, "Maria Silva", "Dr. Smith", "Cardiology", day(10), AppointmentStatus::Scheduled),
        ];
        let with = |text: &str| FilterState {
            search_text: text.into(),
            ..FilterState::default()
        };

        // "a " only occurs inside "Maria Silva".
        assert_eq!(ids(&visible(&records, &with("a "))), vec![2]);
        assert!(!matches(&records[0], &with("a ")));
        // Blank search is not the same as empty search.
        assert!(visible(&records, &with("   ")).is_empty());
        assert_eq!(visible(&records, &with("")).len(), 2);
    }

    #[test]
    fn status_filter_selects_exact_status() {
        let records = vec![
            at(1, "John Doe", "Dr. Smith", "Cardiology", day(9), AppointmentStatus::Scheduled),
            at(2, "Anna", "Dr. Smith", "Cardiology", day(10), AppointmentStatus::Scheduled),
            at(3, "Carl", "Dr. Smith", "Cardiology", day(11), AppointmentStatus::Cancelled),
        ];
        let filters = FilterState {
            status_filter: StatusFilter::Only(AppointmentStatus::Cancelled),
            ..FilterState::default()
        };
        assert_eq!(ids(&visible(&records, &filters)), vec![3]);
    }

    #[test]
    fn filters_combine_with_and() {
        let filters = FilterState {
            search_text: "house".into(),
            status_filter: StatusFilter::Only(AppointmentStatus::Scheduled),
            specialty_filter: SpecialtyFilter::Only("Cardiology".into()),
        };
        assert_eq!(ids(&visible(&sample(), &filters)), vec![1]);
    }

    #[test]
    fn visible_is_exact_subset_and_repeatable() {
        let records = sample();
        let filters = FilterState {
            specialty_filter: SpecialtyFilter::Only("Cardiology".into()),
            ..FilterState::default()
        };

        let first = visible(&records, &filters);
        let second = visible(&records, &filters);
        assert_eq!(first, second);

        let expected: Vec<&Appointment> = records.iter().filter(|a| matches(a, &filters)).collect();
        assert_eq!(first.len(), expected.len());
        assert!(first.iter().all(|a| records.contains(a) && matches(a, &filters)));
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn default_filters_show_everything_newest_first() {
        assert_eq!(ids(&visible(&sample(), &FilterState::default())), vec![2, 1, 3, 4]);
    }

    #[test]
    fn scheduled_today_counts_only_scheduled_on_current_date() {
        let now = day(15);
        let stats = summarize_at(&sample(), &now);
        assert_eq!(
            stats,
            SummaryStats {
                total: 4,
                scheduled_today: 2,
                completed: 1,
            }
        );
    }

    #[test]
    fn single_record_scheduled_today() {
        let records = vec![at(1, "John Doe", "Dr. House", "Cardiology", day(10), AppointmentStatus::Scheduled)];
        assert_eq!(summarize_at(&records, &day(16)).scheduled_today, 1);
    }

    #[test]
    fn today_follows_the_clock_time_zone() {
        // 23:00 UTC on the 9th is already the 10th at UTC+3.
        let late = Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap();
        let records = vec![at(1, "John Doe", "Dr. House", "Cardiology", late, AppointmentStatus::Scheduled)];

        let utc_now = day(12);
        assert_eq!(summarize_at(&records, &utc_now).scheduled_today, 0);

        let plus3 = utc_now.with_timezone(&FixedOffset::east_opt(3 * 3600).unwrap());
        assert_eq!(summarize_at(&records, &plus3).scheduled_today, 1);
    }

    #[test]
    fn local_clock_summary_counts_totals() {
        let stats = summarize(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn specialty_options_start_with_all_and_are_distinct() {
        let opts = specialty_options(&sample());
        assert_eq!(
            opts,
            vec![
                SpecialtyFilter::All,
                SpecialtyFilter::Only("Cardiology".into()),
                SpecialtyFilter::Only("Dermatology".into()),
                SpecialtyFilter::Only("Neurology".into()),
            ]
        );
        assert_eq!(specialty_options(&[]), vec![SpecialtyFilter::All]);
    }
}
