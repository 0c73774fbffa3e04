//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with external systems without
//! depending on concrete implementations.

pub mod clock_port;
pub mod cms_port;
pub mod session_events;

pub use clock_port::ClockPort;
pub use cms_port::{CmsError, CmsPort, ParseRecord, ServerRecord};
pub use session_events::{CollectionChange, CollectionEvent, Notice, NoticeLevel, ViewId};

#[cfg(any(test, feature = "testing"))]
pub use clock_port::MockClockPort;
#[cfg(any(test, feature = "testing"))]
pub use cms_port::MockCmsPort;
