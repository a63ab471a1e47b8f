//! Static seed catalog: experts, courses, tasks, and scheduled mentorship
//! sessions.
//!
//! These records are compile-time data. Nothing in the platform creates,
//! updates, or deletes them; in particular the booking wizard never appends
//! to [`SESSIONS`].

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Price;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The default session an expert advertises on their profile card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionOffer {
    /// Length in minutes.
    pub duration: u32,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub company: &'static str,
    pub expertise: &'static [&'static str],
    pub about: &'static str,
    pub image_url: &'static str,
    pub rating: f32,
    pub reviews: u32,
    pub session: SessionOffer,
}

impl Expert {
    /// Whether the expert lists `topic` among their expertise tags.
    pub fn has_expertise(&self, topic: &str) -> bool {
        self.expertise.iter().any(|t| *t == topic)
    }

    /// Case-insensitive expertise match used by catalog filtering.
    pub fn matches_expertise(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.expertise
            .iter()
            .any(|t| t.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Completion percentage, 0..=100.
    pub progress: u8,
    pub tasks_completed: u32,
    pub total_tasks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    Pending,
    Submitted,
    Reviewed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: &'static str,
    pub title: &'static str,
    /// Title of the owning course.
    pub course: &'static str,
    pub status: TaskStatus,
    /// ISO-8601 calendar date.
    pub due_date: &'static str,
}

impl Task {
    /// Background sentence handed to the AI reviewer for this task.
    pub fn review_context(&self) -> String {
        format!("This is a task from the \"{}\" course.", self.course)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Upcoming,
    Completed,
    Canceled,
}

/// A scheduled (seeded) mentorship call shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorSession {
    pub id: &'static str,
    pub mentor_name: &'static str,
    pub mentor_image_url: &'static str,
    /// RFC 3339 start time.
    pub date_time: &'static str,
    pub duration: u32,
    pub status: SessionStatus,
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub static EXPERTS: &[Expert] = &[
    Expert {
        id: "1",
        name: "IBRAHIM FONYUY",
        role: "Staff Engineer",
        company: "Innovate Inc.",
        expertise: &["React", "TypeScript", "Node.js", "Web Performance"],
        about: "Ibrahim is a seasoned engineer with a passion for building scalable and performant web applications. He loves mentoring and helping developers grow.",
        image_url: "https://picsum.photos/seed/expert-1/200/200",
        rating: 4.9,
        reviews: 120,
        session: SessionOffer { duration: 60, price: 150 },
    },
    Expert {
        id: "2",
        name: "YONDO JONES",
        role: "Principal Architect",
        company: "CloudFlow",
        expertise: &["AWS", "Serverless", "DevOps", "Microservices"],
        about: "Yondo is a cloud expert who specializes in designing robust and scalable cloud-native architectures on AWS. He enjoys solving complex infrastructure challenges.",
        image_url: "https://picsum.photos/seed/expert-2/200/200",
        rating: 4.8,
        reviews: 95,
        session: SessionOffer { duration: 60, price: 200 },
    },
    Expert {
        id: "3",
        name: "ABARA SPENCER",
        role: "UX Lead",
        company: "DesignFirst",
        expertise: &["UI/UX", "Figma", "User Research", "Design Systems"],
        about: "Abara is a creative and user-centric UX leader who believes in crafting intuitive and beautiful digital experiences. She has a keen eye for detail.",
        image_url: "https://picsum.photos/seed/expert-3/200/200",
        rating: 5.0,
        reviews: 210,
        session: SessionOffer { duration: 45, price: 120 },
    },
    Expert {
        id: "4",
        name: "MOFIRO JEAN",
        role: "AI/ML Scientist",
        company: "DataMind AI",
        expertise: &["Python", "TensorFlow", "NLP", "Computer Vision"],
        about: "Mofiro is an AI researcher dedicated to pushing the boundaries of machine learning. He is passionate about applying AI to solve real-world problems.",
        image_url: "https://picsum.photos/seed/expert-4/200/200",
        rating: 4.9,
        reviews: 78,
        session: SessionOffer { duration: 60, price: 180 },
    },
    Expert {
        id: "5",
        name: "YUMBI LEO",
        role: "Senior Frontend Dev",
        company: "WebWeave",
        expertise: &["Vue.js", "GraphQL", "Animations", "Frontend Architecture"],
        about: "Yumbi is a frontend wizard who loves creating silky-smooth user interfaces with modern technologies. He is an advocate for clean and maintainable code.",
        image_url: "https://picsum.photos/seed/expert-5/200/200",
        rating: 4.7,
        reviews: 88,
        session: SessionOffer { duration: 60, price: 130 },
    },
    Expert {
        id: "6",
        name: "SOH TALLA ERICK",
        role: "Cybersecurity Expert",
        company: "SecureNet",
        expertise: &["Penetration Testing", "Network Security", "Ethical Hacking"],
        about: "Soh is a cybersecurity professional with a knack for finding vulnerabilities before the bad guys do. He is committed to making the digital world a safer place.",
        image_url: "https://picsum.photos/seed/expert-6/200/200",
        rating: 4.8,
        reviews: 65,
        session: SessionOffer { duration: 90, price: 250 },
    },
];

pub static COURSES: &[Course] = &[
    Course {
        id: "c1",
        title: "Advanced React Patterns",
        description: "Master reusable components and state management.",
        progress: 75,
        tasks_completed: 9,
        total_tasks: 12,
    },
    Course {
        id: "c2",
        title: "Cloud-Native DevOps",
        description: "Build and deploy scalable applications with CI/CD.",
        progress: 40,
        tasks_completed: 4,
        total_tasks: 10,
    },
    Course {
        id: "c3",
        title: "UI/UX for Developers",
        description: "Learn design principles to build beautiful interfaces.",
        progress: 10,
        tasks_completed: 1,
        total_tasks: 10,
    },
];

pub static TASKS: &[Task] = &[
    Task {
        id: "t1",
        title: "Create a custom hook for data fetching",
        course: "Advanced React Patterns",
        status: TaskStatus::Reviewed,
        due_date: "2024-07-20",
    },
    Task {
        id: "t2",
        title: "Set up a CI/CD pipeline with GitHub Actions",
        course: "Cloud-Native DevOps",
        status: TaskStatus::Submitted,
        due_date: "2024-07-25",
    },
    Task {
        id: "t3",
        title: "Design a login form in Figma",
        course: "UI/UX for Developers",
        status: TaskStatus::Pending,
        due_date: "2024-07-28",
    },
    Task {
        id: "t4",
        title: "Implement component composition pattern",
        course: "Advanced React Patterns",
        status: TaskStatus::Pending,
        due_date: "2024-08-02",
    },
];

pub static SESSIONS: &[MentorSession] = &[
    MentorSession {
        id: "s1",
        mentor_name: "IBRAHIM FONYUY",
        mentor_image_url: "https://picsum.photos/seed/expert-1/200/200",
        date_time: "2024-08-05T14:00:00Z",
        duration: 60,
        status: SessionStatus::Upcoming,
    },
    MentorSession {
        id: "s2",
        mentor_name: "YONDO JONES",
        mentor_image_url: "https://picsum.photos/seed/expert-2/200/200",
        date_time: "2024-07-15T10:00:00Z",
        duration: 60,
        status: SessionStatus::Completed,
    },
    MentorSession {
        id: "s3",
        mentor_name: "ABARA SPENCER",
        mentor_image_url: "https://picsum.photos/seed/expert-3/200/200",
        date_time: "2024-08-10T11:00:00Z",
        duration: 45,
        status: SessionStatus::Upcoming,
    },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub fn experts() -> &'static [Expert] {
    EXPERTS
}

pub fn find_expert(id: &str) -> Result<&'static Expert, CoreError> {
    EXPERTS
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| CoreError::not_found("expert", id))
}

/// Experts whose expertise tags contain `query` (case-insensitive).
pub fn experts_with_expertise(query: &str) -> Vec<&'static Expert> {
    EXPERTS
        .iter()
        .filter(|e| e.matches_expertise(query))
        .collect()
}

pub fn courses() -> &'static [Course] {
    COURSES
}

pub fn find_course_by_title(title: &str) -> Option<&'static Course> {
    COURSES.iter().find(|c| c.title == title)
}

pub fn tasks() -> &'static [Task] {
    TASKS
}

pub fn find_task(id: &str) -> Result<&'static Task, CoreError> {
    TASKS
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CoreError::not_found("task", id))
}

pub fn sessions() -> &'static [MentorSession] {
    SESSIONS
}

pub fn upcoming_sessions() -> Vec<&'static MentorSession> {
    SESSIONS
        .iter()
        .filter(|s| s.status == SessionStatus::Upcoming)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn expert_ids_are_unique() {
        let mut ids: Vec<_> = EXPERTS.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), EXPERTS.len());
    }

    #[test]
    fn find_expert_known_and_unknown() {
        assert_eq!(find_expert("3").unwrap().name, "ABARA SPENCER");
        assert_matches!(
            find_expert("99"),
            Err(CoreError::NotFound { entity: "expert", .. })
        );
    }

    #[test]
    fn expertise_filter_is_case_insensitive() {
        let found = experts_with_expertise("aws");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
        assert!(experts_with_expertise("quantum").is_empty());
    }

    #[test]
    fn every_task_belongs_to_a_seeded_course() {
        for task in TASKS {
            assert!(
                find_course_by_title(task.course).is_some(),
                "task {} references unknown course {}",
                task.id,
                task.course
            );
        }
    }

    #[test]
    fn review_context_names_the_course() {
        let task = find_task("t1").unwrap();
        assert_eq!(
            task.review_context(),
            "This is a task from the \"Advanced React Patterns\" course."
        );
    }

    #[test]
    fn upcoming_sessions_excludes_completed() {
        let upcoming = upcoming_sessions();
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming.iter().all(|s| s.status == SessionStatus::Upcoming));
    }
}
