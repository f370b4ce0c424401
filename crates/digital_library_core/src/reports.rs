//! crates/digital_library_core/src/reports.rs
//!
//! Read-only views over the store for staff: the teacher's per-student
//! activity dashboard and the admin's aggregate report.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use crate::domain::{ActivityLog, ActivityStatus, Role, User, UserId};
use crate::error::{LibraryError, LibraryResult};
use crate::policy::{can_perform, Action};
use crate::store::EntityStore;

/// Shown for logs whose resource is no longer in the catalog.
pub const UNKNOWN_RESOURCE_TITLE: &str = "Recurso Desconhecido";

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub log: ActivityLog,
    pub resource_title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentActivity {
    pub student_id: UserId,
    pub student_name: String,
    pub student_email: String,
    /// Newest session first.
    pub entries: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeacherDashboard {
    pub teacher_id: UserId,
    pub students: Vec<StudentActivity>,
}

/// The students assigned to `teacher`, each with their sessions.
pub fn teacher_dashboard(store: &EntityStore, teacher: &User) -> LibraryResult<TeacherDashboard> {
    if !can_perform(teacher, Action::ViewTeacherDashboard) {
        return Err(LibraryError::NotAuthorized);
    }

    let students = store
        .students_of(teacher.id)
        .map(|student| student_activity(store, student))
        .collect();

    Ok(TeacherDashboard {
        teacher_id: teacher.id,
        students,
    })
}

/// One student's sessions, for a teacher allowed to see them.
pub fn student_activity_for(
    store: &EntityStore,
    teacher: &User,
    student_id: UserId,
) -> LibraryResult<StudentActivity> {
    let student = store.require_user(student_id)?;
    if !can_perform(teacher, Action::ViewStudentActivity(student)) {
        return Err(LibraryError::NotAuthorized);
    }
    Ok(student_activity(store, student))
}

fn student_activity(store: &EntityStore, student: &User) -> StudentActivity {
    let mut entries: Vec<ActivityEntry> = store
        .logs_for_student(student.id)
        .map(|log| ActivityEntry {
            resource_title: store
                .resource(log.resource_id)
                .map(|r| r.title.clone())
                .unwrap_or_else(|| UNKNOWN_RESOURCE_TITLE.to_string()),
            log: log.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.log.start_time.cmp(&a.log.start_time));

    StudentActivity {
        student_id: student.id,
        student_name: student.name.clone(),
        student_email: student.email.clone(),
        entries,
    }
}

//=========================================================================================
// Admin report
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReading {
    pub day: Weekday,
    pub completed_sessions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentTime {
    pub student_id: UserId,
    pub student_name: String,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminReport {
    pub total_users: usize,
    pub students: usize,
    pub teachers: usize,
    pub admins: usize,
    pub total_resources: usize,
    pub borrowed_resources: usize,
    /// Sessions completed in the last seven days, per weekday, Monday first.
    pub weekly_reading: Vec<DailyReading>,
    pub completed_this_week: usize,
    pub time_per_student: Vec<StudentTime>,
    pub average_minutes: f64,
}

/// Aggregates the store for the admin dashboard. The weekly figures cover the
/// seven days up to `now`.
pub fn admin_report(
    store: &EntityStore,
    admin: &User,
    now: DateTime<Utc>,
) -> LibraryResult<AdminReport> {
    if !can_perform(admin, Action::ViewAdminDashboard) {
        return Err(LibraryError::NotAuthorized);
    }

    let week_start = now - Duration::days(7);
    let completed_recently: Vec<&ActivityLog> = store
        .activity_logs()
        .iter()
        .filter(|l| l.status == ActivityStatus::Completed && l.start_time > week_start)
        .collect();

    let count_role = |role: Role| store.users().iter().filter(|u| u.role == role).count();

    let weekly_reading: Vec<DailyReading> = WEEK
        .iter()
        .map(|&day| DailyReading {
            day,
            completed_sessions: completed_recently
                .iter()
                .filter(|l| l.start_time.weekday() == day)
                .count(),
        })
        .collect();
    let completed_this_week = weekly_reading.iter().map(|d| d.completed_sessions).sum();

    let time_per_student: Vec<StudentTime> = store
        .users()
        .iter()
        .filter(|u| u.is_student())
        .map(|student| StudentTime {
            student_id: student.id,
            student_name: student.name.clone(),
            minutes: store
                .logs_for_student(student.id)
                .map(|l| l.duration_seconds)
                .sum::<u64>()
                / 60,
        })
        .collect();
    let total_minutes: u64 = time_per_student.iter().map(|s| s.minutes).sum();
    let average_minutes = total_minutes as f64 / time_per_student.len().max(1) as f64;

    Ok(AdminReport {
        total_users: store.users().len(),
        students: count_role(Role::Student),
        teachers: count_role(Role::Teacher),
        admins: count_role(Role::Admin),
        total_resources: store.resources().len(),
        borrowed_resources: store.resources().iter().filter(|r| !r.is_available()).count(),
        weekly_reading,
        completed_this_week,
        time_per_student,
        average_minutes,
    })
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// `"45 s"` under a minute, otherwise `"3 min 5 s"`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{} s", seconds)
    } else {
        format!("{} min {} s", seconds / 60, seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_lists_only_the_teachers_students_and_their_logs() {
        let store = EntityStore::seeded(Utc::now());
        let ana = store.user(1).unwrap();

        let dashboard = teacher_dashboard(&store, ana).unwrap();
        let ids: Vec<UserId> = dashboard.students.iter().map(|s| s.student_id).collect();
        assert_eq!(ids, vec![101, 102]);
        for student in &dashboard.students {
            assert!(student.entries.iter().all(|e| e.log.student_id == student.student_id));
        }
        assert_eq!(dashboard.students[0].entries.len(), 1);
        assert_eq!(dashboard.students[0].entries[0].resource_title, "O Guia do Mochileiro das Galáxias");
        assert!(dashboard.students[1].entries.is_empty());
    }

    #[test]
    fn dashboard_requires_a_teacher() {
        let store = EntityStore::seeded(Utc::now());
        for id in [0, 101] {
            let user = store.user(id).unwrap();
            assert_eq!(teacher_dashboard(&store, user), Err(LibraryError::NotAuthorized));
        }
    }

    #[test]
    fn entries_are_newest_first_and_tolerate_missing_resources() {
        let now = Utc::now();
        let mut store = EntityStore::seeded(now);
        store.insert_activity_log(ActivityLog {
            id: 500,
            student_id: 102,
            resource_id: 4242,
            start_time: now - Duration::hours(3),
            end_time: Some(now - Duration::hours(2)),
            duration_seconds: 3600,
            progress: 20.0,
            status: ActivityStatus::InProgress,
        }).unwrap();
        store.insert_activity_log(ActivityLog {
            id: 501,
            student_id: 102,
            resource_id: 2,
            start_time: now - Duration::hours(1),
            end_time: None,
            duration_seconds: 60,
            progress: 5.0,
            status: ActivityStatus::InProgress,
        }).unwrap();

        let ana = store.user(1).unwrap().clone();
        let maria = student_activity_for(&store, &ana, 102).unwrap();
        let ids: Vec<i64> = maria.entries.iter().map(|e| e.log.id).collect();
        assert_eq!(ids, vec![501, 500]);
        assert_eq!(maria.entries[1].resource_title, UNKNOWN_RESOURCE_TITLE);

        assert_eq!(
            student_activity_for(&store, &ana, 103),
            Err(LibraryError::NotAuthorized)
        );
    }

    #[test]
    fn admin_report_aggregates_the_store() {
        let now = Utc::now();
        let store = EntityStore::seeded(now);
        let admin = store.user(0).unwrap();

        let report = admin_report(&store, admin, now).unwrap();
        assert_eq!(report.total_users, 6);
        assert_eq!((report.students, report.teachers, report.admins), (3, 2, 1));
        assert_eq!(report.total_resources, 6);
        assert_eq!(report.borrowed_resources, 2);
        assert_eq!(report.weekly_reading.len(), 7);
        assert_eq!(report.weekly_reading[0].day, Weekday::Mon);
        assert_eq!(report.completed_this_week, 1);

        let joao = report.time_per_student.iter().find(|s| s.student_id == 101).unwrap();
        assert_eq!(joao.minutes, 20);
        let pedro = report.time_per_student.iter().find(|s| s.student_id == 103).unwrap();
        assert_eq!(pedro.minutes, 9);
        assert!((report.average_minutes - 29.0 / 3.0).abs() < 1e-9);

        let teacher = store.user(1).unwrap();
        assert_eq!(admin_report(&store, teacher, now), Err(LibraryError::NotAuthorized));
    }

    #[test]
    fn weekly_figures_ignore_older_sessions() {
        let now = Utc::now();
        let mut store = EntityStore::seeded(now);
        let started = now - Duration::days(60);
        store
            .insert_activity_log(ActivityLog {
                id: 600,
                student_id: 102,
                resource_id: 2,
                start_time: started,
                end_time: Some(started + Duration::minutes(30)),
                duration_seconds: 1800,
                progress: 100.0,
                status: ActivityStatus::Completed,
            })
            .unwrap();
        let admin = store.user(0).unwrap();

        let report = admin_report(&store, admin, now).unwrap();
        assert_eq!(report.completed_this_week, 1);
        let day = (now - Duration::days(2)).weekday();
        let counted: Vec<usize> = report.weekly_reading.iter().map(|d| d.completed_sessions).collect();
        assert_eq!(counted.iter().sum::<usize>(), 1);
        assert_eq!(report.weekly_reading[day.num_days_from_monday() as usize].completed_sessions, 1);

        // Old sessions still count towards time spent.
        let maria = report.time_per_student.iter().find(|s| s.student_id == 102).unwrap();
        assert_eq!(maria.minutes, 30);
    }

    #[test]
    fn durations_format_like_the_dashboard() {
        assert_eq!(format_duration(0), "0 s");
        assert_eq!(format_duration(59), "59 s");
        assert_eq!(format_duration(60), "1 min 0 s");
        assert_eq!(format_duration(1234), "20 min 34 s");
    }
}
