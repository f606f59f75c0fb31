use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/* -------------------------
   Identifiers & status
--------------------------*/

/// Backend-assigned appointment id.
///
/// Serialized as a JSON number. Some json-server releases hand out string ids
/// (`"7"`), so numeric strings are accepted on input too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppointmentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(AppointmentId)
    }
}

impl From<i64> for AppointmentId {
    fn from(v: i64) -> Self {
        AppointmentId(v)
    }
}

impl Serialize for AppointmentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for AppointmentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(AppointmentId(n)),
            RawId::Text(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid appointment id {s:?}"))),
        }
    }
}

/// Appointment lifecycle state. The wire uses the backend's Portuguese labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "Agendada", alias = "Scheduled")]
    Scheduled,
    #[serde(rename = "Realizada", alias = "Completed")]
    Completed,
    #[serde(rename = "Cancelada", alias = "Cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    /// Value stored by the backend.
    pub fn wire_name(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendada",
            AppointmentStatus::Completed => "Realizada",
            AppointmentStatus::Cancelled => "Cancelada",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown appointment status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    /// Accepts English labels and backend values, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        AppointmentStatus::ALL
            .into_iter()
            .find(|st| {
                st.label().eq_ignore_ascii_case(needle) || st.wire_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownStatus(needle.to_string()))
    }
}

/* -------------------------
   Records
--------------------------*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(rename = "paciente")]
    pub patient_name: String,
    #[serde(rename = "medico")]
    pub doctor_name: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    #[serde(rename = "data", with = "wire_timestamp")]
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(rename = "notas", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields of a record that does not exist yet. Always created as `Scheduled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_name: String,
    pub doctor_name: String,
    pub specialty: String,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewAppointment {
    /// The record the backend is expected to hand back once it assigned `id`.
    pub fn assign(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            patient_name: self.patient_name,
            doctor_name: self.doctor_name,
            specialty: self.specialty,
            scheduled_at: self.scheduled_at,
            status: AppointmentStatus::Scheduled,
            notes: self.notes,
        }
    }
}

/// Request body for `POST /consultas` (record minus `id`).
#[derive(Debug, Serialize)]
pub struct NewAppointmentBody<'a> {
    #[serde(rename = "paciente")]
    pub patient_name: &'a str,
    #[serde(rename = "medico")]
    pub doctor_name: &'a str,
    #[serde(rename = "especialidade")]
    pub specialty: &'a str,
    #[serde(rename = "data", with = "wire_timestamp")]
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(rename = "notas", skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

impl<'a> From<&'a NewAppointment> for NewAppointmentBody<'a> {
    fn from(draft: &'a NewAppointment) -> Self {
        Self {
            patient_name: &draft.patient_name,
            doctor_name: &draft.doctor_name,
            specialty: &draft.specialty,
            scheduled_at: draft.scheduled_at,
            status: AppointmentStatus::Scheduled,
            notes: draft.notes.as_deref(),
        }
    }
}

/* -------------------------
   Filter state
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn accepts(self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_all_sentinel(s) {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All statuses"),
            StatusFilter::Only(st) => fmt::Display::fmt(st, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SpecialtyFilter {
    #[default]
    All,
    Only(String),
}

impl SpecialtyFilter {
    pub fn accepts(&self, specialty: &str) -> bool {
        match self {
            SpecialtyFilter::All => true,
            SpecialtyFilter::Only(wanted) => wanted == specialty,
        }
    }
}

impl From<&str> for SpecialtyFilter {
    fn from(s: &str) -> Self {
        if is_all_sentinel(s) {
            SpecialtyFilter::All
        } else {
            SpecialtyFilter::Only(s.to_string())
        }
    }
}

impl fmt::Display for SpecialtyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecialtyFilter::All => f.write_str("All specialties"),
            SpecialtyFilter::Only(s) => f.write_str(s),
        }
    }
}

/// Dashboard filters. UI scoped; never sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub specialty_filter: SpecialtyFilter,
}

/* -------------------------
   Helpers
--------------------------*/

// The old dashboards used "Todos"/"Todas" as the select sentinel.
fn is_all_sentinel(s: &str) -> bool {
    let s = s.trim();
    s.is_empty()
        || s.eq_ignore_ascii_case("all")
        || s.eq_ignore_ascii_case("todos")
        || s.eq_ignore_ascii_case("todas")
}

/// Parse a timestamp the way the forms and the backend produce them.
///
/// Accepts RFC 3339, `datetime-local` values (`2025-03-10T14:30`, optional
/// seconds) and bare dates (`2025-03-10`, midnight). Values without an offset
/// are read in the local time zone.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `datetime-local` rendering of a stored timestamp, used to prefill forms.
pub fn format_local_input(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%dT%H:%M").to_string()
}

/// Serde adapter for the `data` field: RFC 3339 out, lenient in.
pub(crate) mod wire_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appointment_uses_backend_field_names() {
        let raw = json!({
            "id": 3,
            "paciente": "John Doe",
            "medico": "Dr. House",
            "especialidade": "Cardiology",
            "data": "2025-03-10T14:30:00Z",
            "status": "Realizada"
        });

        let appt: Appointment = serde_json::from_value(raw).unwrap();
        assert_eq!(appt.id, AppointmentId(3));
        assert_eq!(appt.patient_name, "John Doe");
        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert_eq!(appt.notes, None);

        let back = serde_json::to_value(&appt).unwrap();
        assert_eq!(back["data"], "2025-03-10T14:30:00Z");
        assert_eq!(back["status"], "Realizada");
        assert!(back.get("notas").is_none());
    }

    #[test]
    fn string_ids_and_english_statuses_are_accepted() {
        let raw = json!({
            "id": "12",
            "paciente": "Anna",
            "medico": "Dr. Who",
            "especialidade": "Neurology",
            "data": "2025-03-10",
            "status": "Cancelled",
            "notas": "bring exams"
        });

        let appt: Appointment = serde_json::from_value(raw).unwrap();
        assert_eq!(appt.id, AppointmentId(12));
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
        assert_eq!(appt.notes.as_deref(), Some("bring exams"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let raw = json!({
            "id": 1,
            "paciente": "Anna",
            "medico": "Dr. Who",
            "especialidade": "Neurology",
            "data": "2025-03-10",
            "status": "Pending"
        });
        assert!(serde_json::from_value::<Appointment>(raw).is_err());
        assert!("pending".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn status_parses_both_languages() {
        assert_eq!("agendada".parse(), Ok(AppointmentStatus::Scheduled));
        assert_eq!("Completed".parse(), Ok(AppointmentStatus::Completed));
        assert_eq!(" CANCELADA ".parse(), Ok(AppointmentStatus::Cancelled));
    }

    #[test]
    fn filter_sentinels() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("Todos".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Cancelled".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(AppointmentStatus::Cancelled))
        );
        assert_eq!(SpecialtyFilter::from("Todas"), SpecialtyFilter::All);
        assert_eq!(
            SpecialtyFilter::from("Cardiology"),
            SpecialtyFilter::Only("Cardiology".into())
        );
    }

    #[test]
    fn timestamps_parse_leniently() {
        let rfc = parse_timestamp("2025-03-10T14:30:00-03:00").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 3, 10, 17, 30, 0).unwrap());

        let local = parse_timestamp("2025-03-10T14:30").unwrap();
        assert_eq!(format_local_input(local), "2025-03-10T14:30");

        let date_only = parse_timestamp("2025-03-10").unwrap();
        assert_eq!(format_local_input(date_only), "2025-03-10T00:00");

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("tomorrow").is_none());
        assert!(parse_timestamp("2025-13-40").is_none());
    }

    #[test]
    fn new_appointment_body_forces_scheduled() {
        let draft = NewAppointment {
            patient_name: "John Doe".into(),
            doctor_name: "Dr. House".into(),
            specialty: "Cardiology".into(),
            scheduled_at: Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap(),
            notes: None,
        };
        let body = serde_json::to_value(NewAppointmentBody::from(&draft)).unwrap();
        assert_eq!(body["status"], "Agendada");
        assert!(body.get("id").is_none());
    }
}
