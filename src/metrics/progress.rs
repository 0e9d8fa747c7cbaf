//! Attendance and progress rollups

use serde::{Deserialize, Serialize};

/// Attendance share, rounded. No classes yet counts as full attendance.
pub fn attendance_percentage(present: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    rounded_share(present, total)
}

/// Share of mastered chapters, rounded. An empty syllabus is 0%.
pub fn study_progress(mastered: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    rounded_share(mastered, total)
}

/// Share of completed milestones, rounded. No milestones is 0%.
pub fn milestone_progress(completed: usize, total: usize) -> u32 {
    study_progress(completed, total)
}

/// Share of tasks no longer pending, rounded. No tasks is 0%.
pub fn task_completion(pending: usize, total: usize) -> u32 {
    study_progress(total.saturating_sub(pending), total)
}

fn rounded_share(part: usize, total: usize) -> u32 {
    let part = part.min(total);
    ((part as f64 / total as f64) * 100.0).round() as u32
}

pub fn is_below_target(percentage: u32, target: u32) -> bool {
    percentage < target
}

/// Colour band of an attendance dial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceBand {
    Good,
    Warning,
    Critical,
}

impl AttendanceBand {
    pub fn for_percentage(percentage: u32) -> Self {
        if percentage < 60 {
            AttendanceBand::Critical
        } else if percentage < 75 {
            AttendanceBand::Warning
        } else {
            AttendanceBand::Good
        }
    }
}
