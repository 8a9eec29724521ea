//! In-memory calendar store.
//!
//! Owns the booked appointments, always sorted ascending by start time.
//! Conflict detection and slot enumeration live here; validation does not.
//! `add` performs no re-validation, so callers must run the business-hours
//! check and `find_conflicts` first, within the same turn.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use slotwise_domain::business;
use slotwise_domain::constants::SLOT_GRID_HOURS;
use slotwise_domain::Appointment;

/// Ordered collection of booked appointments for one calendar.
#[derive(Debug, Default, Clone)]
pub struct CalendarStore {
    appointments: Vec<Appointment>,
}

impl CalendarStore {
    /// Create an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// All appointments, ascending by start time.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    /// Insert an appointment and restore start-time ordering.
    pub fn add(&mut self, appointment: Appointment) {
        self.appointments.push(appointment);
        self.appointments.sort_by_key(|a| a.start);
    }

    /// Remove the first appointment matching (title, start) exactly.
    ///
    /// Returns false when nothing matched.
    pub fn remove(&mut self, title: &str, start: NaiveDateTime) -> bool {
        match self.appointments.iter().position(|a| a.title == title && a.start == start) {
            Some(index) => {
                self.appointments.remove(index);
                true
            }
            None => false,
        }
    }

    /// Every stored appointment whose interval overlaps the candidate's.
    pub fn find_conflicts(&self, candidate: &Appointment) -> Vec<Appointment> {
        self.appointments.iter().filter(|a| a.overlaps(candidate)).cloned().collect()
    }

    /// Enumerate free (start, end) slots of the requested duration on a date.
    ///
    /// Candidates come from the fixed half-hour grid; each one must pass the
    /// business-hours validator on its own and conflict with nothing already
    /// stored. Weekend and holiday dates yield no slots at all.
    pub fn available_slots(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        if !business::is_weekday(date) || business::is_holiday(date) {
            return Vec::new();
        }

        let duration = Duration::minutes(duration_minutes);
        let mut slots = Vec::new();

        for start_time in slot_grid() {
            let start = date.and_time(start_time);
            let end = start + duration;
            if end.date() != date || end.time() > business::work_end() {
                continue;
            }
            let trial = Appointment::new("", start, end);
            if business::check_business_hours(&trial).is_ok()
                && self.find_conflicts(&trial).is_empty()
            {
                slots.push((start, end));
            }
        }

        slots
    }

    /// Search day by day for the first free slot after the candidate.
    ///
    /// Walks the slot grid from the candidate's date through `horizon_days`
    /// inclusive. On the candidate's own day only strictly later starts are
    /// considered. The suggestion keeps the candidate's title, location,
    /// notes, and duration. `None` means the horizon is exhausted, which the
    /// caller must treat as "no alternative available" rather than an error.
    pub fn suggest_next_free_slot(
        &self,
        candidate: &Appointment,
        horizon_days: i64,
    ) -> Option<Appointment> {
        let duration = candidate.duration();
        let start_date = candidate.start.date();

        for day_offset in 0..=horizon_days {
            let day = start_date + Duration::days(day_offset);
            if !business::is_weekday(day) || business::is_holiday(day) {
                continue;
            }

            for start_time in slot_grid() {
                let trial_start = day.and_time(start_time);
                let trial_end = trial_start + duration;
                if trial_end.date() != day || trial_end.time() > business::work_end() {
                    continue;
                }
                if day == start_date && trial_start <= candidate.start {
                    continue;
                }

                let trial = Appointment {
                    title: candidate.title.clone(),
                    start: trial_start,
                    end: trial_end,
                    location: candidate.location.clone(),
                    notes: candidate.notes.clone(),
                };
                if business::check_business_hours(&trial).is_ok()
                    && self.find_conflicts(&trial).is_empty()
                {
                    return Some(trial);
                }
            }
        }

        None
    }
}

/// Half-hour start-of-slot candidates: {08:00, 08:30, ..., 12:30, 14:00,
/// ..., 16:30}. Starts after the last-start cutoff or inside the lunch
/// window are excluded.
fn slot_grid() -> Vec<NaiveTime> {
    let mut grid = Vec::new();
    for &hour in SLOT_GRID_HOURS {
        for minute in [0u32, 30] {
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                if time > business::last_start() {
                    continue;
                }
                if time >= business::lunch_start() && time < business::lunch_end() {
                    continue;
                }
                grid.push(time);
            }
        }
    }
    grid
}
