//! Shared fixtures for the scenario tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coursemart_domain::{CourseSummary, EntityRef, UserSummary};

use crate::config::ClientConfig;
use crate::infrastructure::cms::InMemoryCms;
use crate::ports::outbound::{CmsPort, Notice, NoticeLevel};
use crate::Session;

pub const OWNER: u64 = 1;
pub const GENERIC: &str = "Something went wrong. Please try again.";

pub fn owner() -> EntityRef {
    EntityRef::server(OWNER)
}

/// Catalog with three courses and two other users
pub fn catalog_cms() -> InMemoryCms {
    InMemoryCms::new(owner())
        .with_course(7, "course-7", "Rust for Designers", 3_900)
        .with_course(9, "course-9", "Async in Practice", 5_900)
        .with_course(11, "course-11", "Parsing by Hand", 2_900)
        .with_user(12, "user-12", "Ada")
        .with_user(13, "user-13", "Grace")
}

pub fn course(id: u64) -> CourseSummary {
    CourseSummary::new(
        EntityRef::server(id),
        format!("Course {}", id),
        4_900,
    )
}

pub fn user(id: u64) -> UserSummary {
    UserSummary::new(EntityRef::server(id), format!("User {}", id))
}

pub fn session_over(cms: Arc<InMemoryCms>) -> Session {
    let cms: Arc<dyn CmsPort> = cms;
    Session::new(cms, ClientConfig::new().generic_error_message(GENERIC))
}

pub fn session_with_timeout(cms: Arc<InMemoryCms>, timeout: Duration) -> Session {
    let cms: Arc<dyn CmsPort> = cms;
    Session::new(
        cms,
        ClientConfig::new()
            .generic_error_message(GENERIC)
            .mutation_timeout(timeout),
    )
}

/// Collects every notice published in a session
#[derive(Clone, Default)]
pub struct NoticeLog {
    seen: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn attach(session: &Session) -> Self {
        let log = Self::default();
        let seen = Arc::clone(&log.seen);
        session
            .notices()
            .subscribe(move |notice: &Notice| seen.lock().unwrap().push(notice.clone()));
        log
    }

    pub fn all(&self) -> Vec<Notice> {
        self.seen.lock().unwrap().clone()
    }

    pub fn at(&self, level: NoticeLevel) -> Vec<Notice> {
        self.all().into_iter().filter(|n| n.level == level).collect()
    }
}
